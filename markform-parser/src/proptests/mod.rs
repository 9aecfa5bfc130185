//! Property-based tests for scope references and sentinels
//!
//! These check properties that must hold for any input, complementing the
//! hand-picked cases in each module's unit tests.

mod generators;
mod invariants;
