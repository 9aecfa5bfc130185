//! Field definitions: the schema half of a parsed field.

use std::{collections::BTreeMap, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use super::AttributeValue;

/// The kind of a field, one per field tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    String,
    Number,
    StringList,
    SingleSelect,
    MultiSelect,
    Checkboxes,
    Url,
    UrlList,
    Date,
    Year,
    Table,
}

impl FieldKind {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::String => "string",
            FieldKind::Number => "number",
            FieldKind::StringList => "string_list",
            FieldKind::SingleSelect => "single_select",
            FieldKind::MultiSelect => "multi_select",
            FieldKind::Checkboxes => "checkboxes",
            FieldKind::Url => "url",
            FieldKind::UrlList => "url_list",
            FieldKind::Date => "date",
            FieldKind::Year => "year",
            FieldKind::Table => "table",
        }
    }

    /// Kinds whose value is a choice among declared options.
    #[must_use]
    pub fn is_chooser(&self) -> bool {
        matches!(
            self,
            FieldKind::SingleSelect | FieldKind::MultiSelect | FieldKind::Checkboxes
        )
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Advisory importance of a field.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            _ => Err(format!(
                "invalid priority: '{s}', expected: high, medium, low"
            )),
        }
    }
}

/// Which checkbox states are allowed, and what "complete" means.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckboxMode {
    /// Five-state task list: todo, done, incomplete, active, na.
    #[default]
    Multi,
    /// Plain two-state checklist: todo, done.
    Simple,
    /// Every option must be explicitly answered yes or no.
    Explicit,
}

impl CheckboxMode {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckboxMode::Multi => "multi",
            CheckboxMode::Simple => "simple",
            CheckboxMode::Explicit => "explicit",
        }
    }
}

impl FromStr for CheckboxMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "multi" => Ok(Self::Multi),
            "simple" => Ok(Self::Simple),
            "explicit" => Ok(Self::Explicit),
            _ => Err(format!(
                "invalid checkbox mode: '{s}', expected: multi, simple, explicit"
            )),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalMode {
    #[default]
    None,
    /// The checkboxes gate whatever follows them.
    Blocking,
}

impl FromStr for ApprovalMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Self::None),
            "blocking" => Ok(Self::Blocking),
            _ => Err(format!(
                "invalid approval mode: '{s}', expected: none, blocking"
            )),
        }
    }
}

/// Cell type of a table column.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    #[default]
    String,
    Number,
    Url,
    Date,
    Year,
}

impl ColumnType {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::String => "string",
            ColumnType::Number => "number",
            ColumnType::Url => "url",
            ColumnType::Date => "date",
            ColumnType::Year => "year",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColumnType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "string" => Ok(Self::String),
            "number" => Ok(Self::Number),
            "url" => Ok(Self::Url),
            "date" => Ok(Self::Date),
            "year" => Ok(Self::Year),
            _ => Err(format!(
                "invalid column type: '{s}', expected: string, number, url, date, year"
            )),
        }
    }
}

/// A named choice within a select or checkboxes field.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldOption {
    pub id: String,
    pub label: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableColumn {
    pub id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    #[serde(default)]
    pub required: bool,
}

/// A reference to an external validator, as written in `validate=...`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ValidatorRef {
    Id(String),
    WithParams {
        id: String,
        #[serde(flatten)]
        params: BTreeMap<String, AttributeValue>,
    },
}

impl ValidatorRef {
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            ValidatorRef::Id(id) | ValidatorRef::WithParams { id, .. } => id,
        }
    }
}

/// Informational hints shown to whoever fills the field in.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hints {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StringConstraints {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(flatten)]
    pub hints: Hints,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NumberConstraints {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default)]
    pub integer: bool,
    #[serde(flatten)]
    pub hints: Hints,
}

/// Constraints shared by `string_list` and `url_list`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListConstraints {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_items: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_items: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_min_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_max_length: Option<usize>,
    #[serde(default)]
    pub unique_items: bool,
    #[serde(flatten)]
    pub hints: Hints,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlConstraints {
    #[serde(flatten)]
    pub hints: Hints,
}

/// Dates are kept in their ISO `YYYY-MM-DD` spelling.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateConstraints {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<String>,
    #[serde(flatten)]
    pub hints: Hints,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearConstraints {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<i32>,
    #[serde(flatten)]
    pub hints: Hints,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SingleSelectConstraints {
    pub options: Vec<FieldOption>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiSelectConstraints {
    pub options: Vec<FieldOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_selections: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_selections: Option<usize>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckboxesConstraints {
    pub options: Vec<FieldOption>,
    pub checkbox_mode: CheckboxMode,
    pub approval_mode: ApprovalMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_done: Option<usize>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableConstraints {
    pub columns: Vec<TableColumn>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_rows: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_rows: Option<usize>,
}

impl TableConstraints {
    #[must_use]
    pub fn column(&self, id: &str) -> Option<&TableColumn> {
        self.columns.iter().find(|column| column.id == id)
    }

    #[must_use]
    pub fn column_ids(&self) -> Vec<&str> {
        self.columns.iter().map(|column| column.id.as_str()).collect()
    }
}

/// The kind-specific payload of a field definition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Constraints {
    String(StringConstraints),
    Number(NumberConstraints),
    StringList(ListConstraints),
    SingleSelect(SingleSelectConstraints),
    MultiSelect(MultiSelectConstraints),
    Checkboxes(CheckboxesConstraints),
    Url(UrlConstraints),
    UrlList(ListConstraints),
    Date(DateConstraints),
    Year(YearConstraints),
    Table(TableConstraints),
}

impl Constraints {
    #[must_use]
    pub fn kind(&self) -> FieldKind {
        match self {
            Constraints::String(_) => FieldKind::String,
            Constraints::Number(_) => FieldKind::Number,
            Constraints::StringList(_) => FieldKind::StringList,
            Constraints::SingleSelect(_) => FieldKind::SingleSelect,
            Constraints::MultiSelect(_) => FieldKind::MultiSelect,
            Constraints::Checkboxes(_) => FieldKind::Checkboxes,
            Constraints::Url(_) => FieldKind::Url,
            Constraints::UrlList(_) => FieldKind::UrlList,
            Constraints::Date(_) => FieldKind::Date,
            Constraints::Year(_) => FieldKind::Year,
            Constraints::Table(_) => FieldKind::Table,
        }
    }

    /// Declared options, for chooser kinds.
    #[must_use]
    pub fn options(&self) -> Option<&[FieldOption]> {
        match self {
            Constraints::SingleSelect(c) => Some(&c.options),
            Constraints::MultiSelect(c) => Some(&c.options),
            Constraints::Checkboxes(c) => Some(&c.options),
            Constraints::String(_)
            | Constraints::Number(_)
            | Constraints::StringList(_)
            | Constraints::Url(_)
            | Constraints::UrlList(_)
            | Constraints::Date(_)
            | Constraints::Year(_)
            | Constraints::Table(_) => None,
        }
    }

    #[must_use]
    pub fn table(&self) -> Option<&TableConstraints> {
        if let Constraints::Table(table) = self {
            Some(table)
        } else {
            None
        }
    }
}

/// A `FieldDefinition` is the immutable schema of one field.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub id: String,
    pub label: String,
    pub required: bool,
    pub priority: Priority,
    pub role: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub validators: Vec<ValidatorRef>,
    #[serde(flatten)]
    pub constraints: Constraints,
    /// Source line of the field tag, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
}

impl FieldDefinition {
    #[must_use]
    pub fn kind(&self) -> FieldKind {
        self.constraints.kind()
    }

    #[must_use]
    pub fn options(&self) -> Option<&[FieldOption]> {
        self.constraints.options()
    }

    #[must_use]
    pub fn option(&self, id: &str) -> Option<&FieldOption> {
        self.options()?.iter().find(|option| option.id == id)
    }

    /// The checkbox mode, for checkboxes fields.
    #[must_use]
    pub fn checkbox_mode(&self) -> Option<CheckboxMode> {
        if let Constraints::Checkboxes(c) = &self.constraints {
            Some(c.checkbox_mode)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str() -> Result<(), String> {
        assert_eq!(Priority::from_str("high")?, Priority::High);
        assert_eq!(CheckboxMode::from_str("explicit")?, CheckboxMode::Explicit);
        assert_eq!(ApprovalMode::from_str("blocking")?, ApprovalMode::Blocking);
        assert_eq!(ColumnType::from_str("year")?, ColumnType::Year);
        assert!(Priority::from_str("HIGH").is_err());
        assert!(ColumnType::from_str("integer").is_err());
        Ok(())
    }

    #[test]
    fn test_definition_serializes_kind_inline() -> Result<(), serde_json::Error> {
        let definition = FieldDefinition {
            id: "age".to_string(),
            label: "Age".to_string(),
            required: true,
            priority: Priority::Medium,
            role: "agent".to_string(),
            validators: vec![],
            constraints: Constraints::Number(NumberConstraints {
                min: Some(0.0),
                ..NumberConstraints::default()
            }),
            line: None,
        };
        let json = serde_json::to_value(&definition)?;
        assert_eq!(json["kind"], "number");
        assert_eq!(json["min"], 0.0);
        assert_eq!(json["priority"], "medium");
        let back: FieldDefinition = serde_json::from_value(json)?;
        assert_eq!(back, definition);
        Ok(())
    }
}
