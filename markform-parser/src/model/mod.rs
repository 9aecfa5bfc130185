//! The data models for markform documents.

mod fields;
mod form;
pub mod node;
mod values;

pub use fields::*;
pub use form::*;
pub use node::{AttributeValue, Attributes, Node};
pub use values::*;
