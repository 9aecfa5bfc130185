//! Whole-form containers: the schema of every field plus the parsed responses.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{FieldDefinition, FieldResponse, FieldValue};

/// A `FieldGroup` is one `{% field-group %}`, or the implicit group that
/// collects fields written directly inside the form.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldGroup {
    /// `None` for the implicit group.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub fields: Vec<FieldDefinition>,
}

impl FieldGroup {
    #[must_use]
    pub fn is_implicit(&self) -> bool {
        self.id.is_none()
    }
}

/// The schema of a whole form.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FormSchema {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub groups: Vec<FieldGroup>,
}

impl FormSchema {
    /// Every field, in document order.
    pub fn fields(&self) -> impl Iterator<Item = &FieldDefinition> {
        self.groups.iter().flat_map(|group| group.fields.iter())
    }

    #[must_use]
    pub fn field(&self, id: &str) -> Option<&FieldDefinition> {
        self.fields().find(|field| field.id == id)
    }
}

/// A warning raised while parsing. Never fatal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseWarning {
    pub field_id: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
}

/// The outcome of parsing a single field tag.
#[derive(Clone, Debug, PartialEq)]
pub struct ParsedField {
    pub definition: FieldDefinition,
    pub response: FieldResponse,
    pub warnings: Vec<ParseWarning>,
}

/// The outcome of parsing a whole form.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedForm {
    pub schema: FormSchema,
    /// Responses keyed by field id.
    pub responses: BTreeMap<String, FieldResponse>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<ParseWarning>,
}

impl ParsedForm {
    #[must_use]
    pub fn response(&self, field_id: &str) -> Option<&FieldResponse> {
        self.responses.get(field_id)
    }

    /// The answered value of a field, if any.
    #[must_use]
    pub fn value(&self, field_id: &str) -> Option<&FieldValue> {
        self.responses.get(field_id)?.value()
    }
}
