//! Typed form fields embedded in markup documents.
//!
//! A markup parser upstream turns the document into a tree of [`Node`]s. This
//! crate reads the form tags in that tree:
//!
//! - [`parse_form`] walks a whole document, [`parse_field`] parses one field
//!   tag into a [`FieldDefinition`] and its [`FieldResponse`].
//! - [`validate_form`] checks responses against their constraints and
//!   collects every problem as a [`ValidationIssue`].
//! - [`parse_scope_ref`] and [`validate_scope_ref`] handle references to
//!   fields, options, table columns and cells.
//! - [`compute_progress_summary`] derives how far along a form is.
//!
//! # Example
//!
//! ```
//! use markform_parser::{Node, Options, parse_form, validate_form};
//!
//! let root = Node::new("document").with_child(
//!     Node::tag("form").with_attribute("id", "intake").with_child(
//!         Node::tag("string-field")
//!             .with_attribute("id", "name")
//!             .with_attribute("label", "Name")
//!             .with_attribute("required", true)
//!             .with_child(Node::fence("value", "Ada Lovelace\n")),
//!     ),
//! );
//! let form = parse_form(&root, &Options::default())?;
//! assert!(validate_form(&form.schema, &form.responses).is_empty());
//! # Ok::<(), markform_parser::Error>(())
//! ```
mod accessors;
mod coerce;
mod constants;
mod content;
mod document;
mod error;
mod fields;
mod model;
mod options;
mod progress;
mod scope_ref;
mod sentinel;
mod table;
mod validate;

#[cfg(test)]
mod proptests;

pub use accessors::{
    get_boolean_attr, get_number_attr, get_string_array_attr, get_string_attr, get_validator_refs,
};
pub use content::{OptionItem, extract_fence_value, extract_option_items, extract_table_text};
pub use document::parse_form;
pub use error::{Detail as ErrorDetail, Error, LineDisplay};
pub use fields::{FieldTag, parse_field};
pub use model::*;
pub use options::{Options, OptionsBuilder};
pub use progress::{
    FieldProgress, ProgressCounts, ProgressState, ProgressSummary, Qualified, StructureSummary,
    compute_field_progress, compute_form_state, compute_progress_summary,
    compute_structure_summary, is_form_complete, is_submitted,
};
pub use scope_ref::{
    ScopeRef, ScopeRefError, is_identifier, parse_scope_ref, row_counts, validate_scope_ref,
};
pub use sentinel::{Sentinel, SentinelKind, detect_sentinel, parse_sentinel};
pub use table::{
    ParsedTable, coerce_cell, explicit_columns, is_separator_row, parse_cell_value, parse_table,
    slugify, split_row,
};
pub use validate::{
    IssueCode, Severity, ValidationIssue, validate_field, validate_form, validate_table,
};
