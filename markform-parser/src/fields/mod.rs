//! Field parsers, one per field tag, behind a single dispatcher.

mod checkboxes;
mod common;
mod date;
mod list;
mod number;
mod select;
mod string;
mod table;
mod url;

use crate::{
    Options,
    error::Error,
    model::{FieldKind, Node, ParsedField},
};

use common::FieldContext;

/// The closed set of field tags.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FieldTag {
    StringField,
    NumberField,
    StringList,
    SingleSelect,
    MultiSelect,
    Checkboxes,
    UrlField,
    UrlList,
    DateField,
    YearField,
    TableField,
}

impl FieldTag {
    pub const ALL: [FieldTag; 11] = [
        FieldTag::StringField,
        FieldTag::NumberField,
        FieldTag::StringList,
        FieldTag::SingleSelect,
        FieldTag::MultiSelect,
        FieldTag::Checkboxes,
        FieldTag::UrlField,
        FieldTag::UrlList,
        FieldTag::DateField,
        FieldTag::YearField,
        FieldTag::TableField,
    ];

    #[must_use]
    pub fn from_tag_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tag| tag.tag_name() == name)
    }

    #[must_use]
    pub fn tag_name(&self) -> &'static str {
        match self {
            FieldTag::StringField => "string-field",
            FieldTag::NumberField => "number-field",
            FieldTag::StringList => "string-list",
            FieldTag::SingleSelect => "single-select",
            FieldTag::MultiSelect => "multi-select",
            FieldTag::Checkboxes => "checkboxes",
            FieldTag::UrlField => "url-field",
            FieldTag::UrlList => "url-list",
            FieldTag::DateField => "date-field",
            FieldTag::YearField => "year-field",
            FieldTag::TableField => "table-field",
        }
    }

    #[must_use]
    pub fn kind(&self) -> FieldKind {
        match self {
            FieldTag::StringField => FieldKind::String,
            FieldTag::NumberField => FieldKind::Number,
            FieldTag::StringList => FieldKind::StringList,
            FieldTag::SingleSelect => FieldKind::SingleSelect,
            FieldTag::MultiSelect => FieldKind::MultiSelect,
            FieldTag::Checkboxes => FieldKind::Checkboxes,
            FieldTag::UrlField => FieldKind::Url,
            FieldTag::UrlList => FieldKind::UrlList,
            FieldTag::DateField => FieldKind::Date,
            FieldTag::YearField => FieldKind::Year,
            FieldTag::TableField => FieldKind::Table,
        }
    }
}

/// Parse one field tag into its definition and response.
///
/// Returns `Ok(None)` for nodes that are not field tags.
///
/// # Errors
///
/// Any malformed or contradictory declaration is an [`Error`] carrying the
/// field id (when known) and source line.
#[tracing::instrument(level = "trace", skip_all, fields(tag = node.tag_name()))]
pub fn parse_field(node: &Node, options: &Options) -> Result<Option<ParsedField>, Error> {
    let Some(tag_name) = node.tag_name() else {
        return Ok(None);
    };
    let Some(tag) = FieldTag::from_tag_name(tag_name) else {
        tracing::debug!(tag = tag_name, "not a field tag, ignoring");
        return Ok(None);
    };
    let ctx = FieldContext::new(node, options, tag_name, tag.kind())?;
    let parsed = match tag {
        FieldTag::StringField => string::parse(ctx),
        FieldTag::NumberField => number::parse(ctx),
        FieldTag::StringList | FieldTag::UrlList => list::parse(ctx),
        FieldTag::SingleSelect => select::parse_single(ctx),
        FieldTag::MultiSelect => select::parse_multi(ctx),
        FieldTag::Checkboxes => checkboxes::parse(ctx),
        FieldTag::UrlField => url::parse(ctx),
        FieldTag::DateField => date::parse_date_field(ctx),
        FieldTag::YearField => date::parse_year_field(ctx),
        FieldTag::TableField => table::parse(ctx),
    }?;
    Ok(Some(parsed))
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;
    use crate::{
        error::Detail,
        model::{
            CellValue, CheckboxMode, CheckboxState, Constraints, FieldResponse, FieldValue,
            Priority, Response,
        },
    };

    fn field(tag: FieldTag) -> Node {
        let node = Node::tag(tag.tag_name())
            .with_attribute("id", "subject")
            .with_attribute("label", "Subject")
            .with_line(10);
        match tag {
            FieldTag::SingleSelect | FieldTag::MultiSelect | FieldTag::Checkboxes => node
                .with_child(Node::list(vec![
                    Node::item(Some("first"), "[ ] First"),
                    Node::item(Some("second"), "[ ] Second"),
                ])),
            FieldTag::TableField => node.with_attribute("columnIds", vec!["title"]),
            FieldTag::StringField
            | FieldTag::NumberField
            | FieldTag::StringList
            | FieldTag::UrlField
            | FieldTag::UrlList
            | FieldTag::DateField
            | FieldTag::YearField => node,
        }
    }

    /// A field of the given kind with a non-empty answer.
    fn filled(tag: FieldTag) -> Node {
        let node = Node::tag(tag.tag_name())
            .with_attribute("id", "subject")
            .with_attribute("label", "Subject");
        let value = |content: &str| node.clone().with_child(Node::fence("value", content));
        match tag {
            FieldTag::StringField => value("Acme"),
            FieldTag::NumberField => value("42"),
            FieldTag::StringList => value("- a\n- b"),
            FieldTag::UrlField => value("https://example.com"),
            FieldTag::UrlList => value("https://example.com"),
            FieldTag::DateField => value("2024-01-31"),
            FieldTag::YearField => value("1999"),
            FieldTag::TableField => value("| Title |\n|---|\n| Alien |")
                .with_attribute("columnIds", vec!["title"]),
            FieldTag::SingleSelect | FieldTag::MultiSelect | FieldTag::Checkboxes => node
                .with_child(Node::list(vec![
                    Node::item(Some("first"), "[x] First"),
                    Node::item(Some("second"), "[ ] Second"),
                ])),
        }
    }

    fn parse(node: &Node) -> Result<ParsedField, Error> {
        parse_field(node, &Options::default())?.ok_or(Error::MissingForm)
    }

    fn response(node: &Node) -> Result<FieldResponse, Error> {
        parse(node).map(|parsed| parsed.response)
    }

    #[test]
    fn test_dispatch_ignores_unknown_tags() -> Result<(), Error> {
        let options = Options::default();
        assert_eq!(parse_field(&Node::tag("instructions"), &options)?, None);
        assert_eq!(parse_field(&Node::text("hello"), &options)?, None);
        for tag in FieldTag::ALL {
            assert_eq!(FieldTag::from_tag_name(tag.tag_name()), Some(tag));
        }
        Ok(())
    }

    #[rstest]
    fn test_skip_sentinel_on_every_kind(
        #[values(
            FieldTag::StringField,
            FieldTag::NumberField,
            FieldTag::StringList,
            FieldTag::SingleSelect,
            FieldTag::MultiSelect,
            FieldTag::Checkboxes,
            FieldTag::UrlField,
            FieldTag::UrlList,
            FieldTag::DateField,
            FieldTag::YearField,
            FieldTag::TableField
        )]
        tag: FieldTag,
    ) -> Result<(), Error> {
        let node = field(tag).with_child(Node::fence("value", "%SKIP% (not relevant)\n"));
        assert_eq!(
            response(&node)?,
            Response::Skipped {
                reason: Some("not relevant".to_string())
            }
        );

        let required = node.with_attribute("required", true);
        assert_eq!(
            response(&required),
            Err(Error::SkipRequired(Detail::new(Some("subject"), Some(10))))
        );
        Ok(())
    }

    #[rstest]
    fn test_state_answered_needs_a_value(
        #[values(
            FieldTag::StringField,
            FieldTag::NumberField,
            FieldTag::StringList,
            FieldTag::SingleSelect,
            FieldTag::MultiSelect,
            FieldTag::Checkboxes,
            FieldTag::UrlField,
            FieldTag::UrlList,
            FieldTag::DateField,
            FieldTag::YearField,
            FieldTag::TableField
        )]
        tag: FieldTag,
    ) -> Result<(), Error> {
        let empty = field(tag).with_attribute("state", "answered");
        assert_eq!(
            response(&empty),
            Err(Error::AnsweredWithoutValue(Detail::new(Some("subject"), Some(10))))
        );

        let answered = filled(tag).with_attribute("state", "answered");
        let response = response(&answered)?;
        let value = response.value().ok_or(Error::MissingForm)?;
        assert_eq!(value.kind(), tag.kind());
        assert!(!value.is_empty(Some(CheckboxMode::Multi)));
        Ok(())
    }

    #[test]
    fn test_abort_sentinel_on_required_field() -> Result<(), Error> {
        let node = field(FieldTag::StringField)
            .with_attribute("required", true)
            .with_child(Node::fence("value", "%ABORT% (source offline)"));
        assert_eq!(
            response(&node)?,
            Response::Aborted {
                reason: Some("source offline".to_string())
            }
        );
        Ok(())
    }

    #[test]
    fn test_string_field() -> Result<(), Error> {
        let node = field(FieldTag::StringField)
            .with_attribute("minLength", 2)
            .with_attribute("maxLength", 50)
            .with_attribute("priority", "high")
            .with_attribute("placeholder", "Company name")
            .with_child(Node::fence("value", "  Acme Corp  \n"));
        let parsed = parse(&node)?;
        assert_eq!(parsed.definition.priority, Priority::High);
        assert_eq!(parsed.definition.role, "agent");
        assert_eq!(
            parsed.response,
            Response::Answered {
                value: FieldValue::String {
                    value: Some("Acme Corp".to_string())
                }
            }
        );
        let Constraints::String(constraints) = parsed.definition.constraints else {
            return Err(Error::MissingForm);
        };
        assert_eq!(constraints.min_length, Some(2));
        assert_eq!(constraints.hints.placeholder.as_deref(), Some("Company name"));
        Ok(())
    }

    #[test]
    fn test_bounds_must_be_ordered() {
        let node = field(FieldTag::StringField)
            .with_attribute("minLength", 10)
            .with_attribute("maxLength", 5);
        assert_eq!(
            response(&node),
            Err(Error::InvalidBounds(
                Detail::new(Some("subject"), Some(10)),
                "minLength",
                "maxLength"
            ))
        );
    }

    #[test]
    fn test_number_field_unparseable_is_empty_with_warning() -> Result<(), Error> {
        let node = field(FieldTag::NumberField).with_child(Node::fence("value", "forty-two"));
        let parsed = parse(&node)?;
        assert_eq!(parsed.response, Response::Unanswered);
        assert_eq!(parsed.warnings.len(), 1);
        Ok(())
    }

    #[test]
    fn test_number_examples_are_checked_eagerly() {
        let node = field(FieldTag::NumberField).with_attribute("examples", vec!["1", "two"]);
        assert_eq!(
            response(&node),
            Err(Error::InvalidExample(
                Detail::new(Some("subject"), Some(10)),
                "two".to_string(),
                FieldKind::Number
            ))
        );
    }

    #[test]
    fn test_placeholder_mismatch_warns_unless_strict() -> Result<(), Error> {
        let node = field(FieldTag::UrlField).with_attribute("placeholder", "your website");
        let parsed = parse(&node)?;
        assert_eq!(parsed.warnings.len(), 1);

        let strict = Options::builder().with_strict().build();
        assert!(matches!(
            parse_field(&node, &strict),
            Err(Error::InvalidPlaceholder(..))
        ));
        Ok(())
    }

    #[rstest]
    #[case(FieldTag::SingleSelect, "placeholder")]
    #[case(FieldTag::MultiSelect, "examples")]
    #[case(FieldTag::Checkboxes, "placeholder")]
    fn test_choosers_reject_hints(#[case] tag: FieldTag, #[case] attribute: &'static str) {
        let node = field(tag).with_attribute(attribute, "x");
        assert_eq!(
            response(&node),
            Err(Error::ForbiddenAttribute(
                Detail::new(Some("subject"), Some(10)),
                attribute,
                tag.kind()
            ))
        );
    }

    #[test]
    fn test_single_select_takes_first_checked() -> Result<(), Error> {
        let node = Node::tag("single-select")
            .with_attribute("id", "rating")
            .with_attribute("label", "Rating")
            .with_child(Node::list(vec![
                Node::item(Some("bullish"), "[ ] Bullish"),
                Node::item(Some("neutral"), "[x] Neutral"),
                Node::item(Some("bearish"), "[X] Bearish"),
            ]));
        let parsed = parse(&node)?;
        assert_eq!(
            parsed.response.value(),
            Some(&FieldValue::SingleSelect {
                selected: Some("neutral".to_string())
            })
        );
        assert_eq!(parsed.warnings.len(), 1);
        assert_eq!(parsed.definition.options().map(<[_]>::len), Some(3));
        Ok(())
    }

    #[test]
    fn test_multi_select_collects_checked() -> Result<(), Error> {
        let node = field(FieldTag::MultiSelect).with_child(Node::list(vec![
            Node::item(Some("third"), "[x] Third"),
        ]));
        let parsed = parse(&node)?;
        assert_eq!(
            parsed.response.value(),
            Some(&FieldValue::MultiSelect {
                selected: vec!["third".to_string()]
            })
        );
        Ok(())
    }

    #[test]
    fn test_option_errors() {
        let missing_id = Node::tag("single-select")
            .with_attribute("id", "rating")
            .with_attribute("label", "Rating")
            .with_child(Node::list(vec![Node::item(None, "[ ] Bullish")]));
        assert!(matches!(response(&missing_id), Err(Error::MissingOptionId(..))));

        let duplicate = field(FieldTag::MultiSelect)
            .with_child(Node::list(vec![Node::item(Some("first"), "[ ] Again")]));
        assert!(matches!(response(&duplicate), Err(Error::DuplicateOptionId(..))));

        let bad_marker = field(FieldTag::SingleSelect)
            .with_child(Node::list(vec![Node::item(Some("third"), "[/] Third")]));
        assert!(matches!(response(&bad_marker), Err(Error::InvalidMarker(..))));
    }

    #[test]
    fn test_checkboxes_multi_markers() -> Result<(), Error> {
        let node = Node::tag("checkboxes")
            .with_attribute("id", "tasks")
            .with_attribute("label", "Tasks")
            .with_child(Node::list(vec![
                Node::item(Some("a"), "[x] A"),
                Node::item(Some("b"), "[/] B"),
                Node::item(Some("c"), "[*] C"),
                Node::item(Some("d"), "[-] D"),
                Node::item(Some("e"), "[ ] E"),
                Node::item(Some("f"), "F"),
            ]));
        let parsed = parse(&node)?;
        let expected = BTreeMap::from([
            ("a".to_string(), CheckboxState::Done),
            ("b".to_string(), CheckboxState::Incomplete),
            ("c".to_string(), CheckboxState::Active),
            ("d".to_string(), CheckboxState::Na),
            ("e".to_string(), CheckboxState::Todo),
            ("f".to_string(), CheckboxState::Todo),
        ]);
        assert_eq!(
            parsed.response.value(),
            Some(&FieldValue::Checkboxes { values: expected })
        );
        Ok(())
    }

    #[test]
    fn test_checkboxes_explicit_mode() -> Result<(), Error> {
        let node = Node::tag("checkboxes")
            .with_attribute("id", "checks")
            .with_attribute("label", "Checks")
            .with_attribute("checkboxMode", "explicit")
            .with_child(Node::list(vec![
                Node::item(Some("a"), "[ ] A"),
                Node::item(Some("b"), "B"),
            ]));
        let parsed = parse(&node)?;
        assert!(parsed.definition.required);
        assert_eq!(parsed.response, Response::Unanswered);

        let answered = node
            .clone()
            .with_child(Node::list(vec![Node::item(Some("c"), "[y] C")]));
        let parsed = parse(&answered)?;
        let Some(FieldValue::Checkboxes { values }) = parsed.response.value() else {
            return Err(Error::MissingForm);
        };
        assert_eq!(values.get("a"), Some(&CheckboxState::Unfilled));
        assert_eq!(values.get("c"), Some(&CheckboxState::Yes));

        let not_required = node.clone().with_attribute("required", false);
        assert!(matches!(
            response(&not_required),
            Err(Error::ExplicitNotRequired(..))
        ));

        let done_marker = node.with_child(Node::list(vec![Node::item(Some("c"), "[x] C")]));
        assert!(matches!(response(&done_marker), Err(Error::InvalidMarker(..))));
        Ok(())
    }

    #[test]
    fn test_invalid_checkbox_mode() {
        let node = field(FieldTag::Checkboxes).with_attribute("checkboxMode", "binary");
        assert!(matches!(
            response(&node),
            Err(Error::InvalidAttributeValue(_, "checkboxMode", _))
        ));
    }

    #[test]
    fn test_list_fields() -> Result<(), Error> {
        let node = field(FieldTag::UrlList)
            .with_attribute("uniqueItems", true)
            .with_child(Node::fence("value", "- https://a.example\n\n- https://b.example\n"));
        assert_eq!(
            response(&node)?.value(),
            Some(&FieldValue::UrlList {
                items: vec![
                    "https://a.example".to_string(),
                    "https://b.example".to_string()
                ]
            })
        );
        Ok(())
    }

    #[test]
    fn test_date_and_year_fields() -> Result<(), Error> {
        let date = field(FieldTag::DateField)
            .with_attribute("min", "2020-01-01")
            .with_child(Node::fence("value", "2024-03-01"));
        assert_eq!(
            response(&date)?.value(),
            Some(&FieldValue::Date {
                value: Some("2024-03-01".to_string())
            })
        );

        let bad_min = field(FieldTag::DateField).with_attribute("min", "01/01/2020");
        assert!(matches!(
            response(&bad_min),
            Err(Error::InvalidAttributeValue(_, "min", _))
        ));

        let reversed = field(FieldTag::YearField)
            .with_attribute("min", 2000)
            .with_attribute("max", 1990);
        assert!(matches!(response(&reversed), Err(Error::InvalidBounds(..))));

        let year = field(FieldTag::YearField).with_child(Node::fence("value", "1987"));
        assert_eq!(
            response(&year)?.value(),
            Some(&FieldValue::Year { value: Some(1987) })
        );
        Ok(())
    }

    #[test]
    fn test_table_field_with_inline_schema() -> Result<(), Error> {
        let node = Node::tag("table-field")
            .with_attribute("id", "films")
            .with_attribute("label", "Films")
            .with_attribute("minRows", 1)
            .with_child(Node::fence(
                "value",
                "| Title | Year |\n| string | year |\n|---|---|\n| Alien | 1979 |\n| Heat | %SKIP:unknown% |\n",
            ));
        let parsed = parse(&node)?;
        let Some(table) = parsed.definition.constraints.table() else {
            return Err(Error::MissingForm);
        };
        assert_eq!(table.column_ids(), vec!["title", "year"]);
        assert_eq!(table.min_rows, Some(1));
        let Some(FieldValue::Table { rows }) = parsed.response.value() else {
            return Err(Error::MissingForm);
        };
        assert_eq!(rows.len(), 2);
        assert_eq!(
            rows.first().and_then(|row| row.get("year")),
            Some(&Response::Answered {
                value: CellValue::Integer(1979)
            })
        );
        assert_eq!(
            rows.get(1).and_then(|row| row.get("year")),
            Some(&Response::Skipped {
                reason: Some("unknown".to_string())
            })
        );
        Ok(())
    }

    #[rstest]
    #[case::skip_sentinel(Some("%SKIP% (none seen)"), None, Response::Skipped { reason: Some("none seen".to_string()) })]
    #[case::abort_sentinel(Some("%ABORT%"), None, Response::Aborted { reason: None })]
    #[case::skipped_state(None, Some("skipped"), Response::Skipped { reason: None })]
    #[case::aborted_state(Some(""), Some("aborted"), Response::Aborted { reason: None })]
    fn test_skipped_table_without_column_ids(
        #[case] content: Option<&str>,
        #[case] state: Option<&str>,
        #[case] expected: FieldResponse,
    ) -> Result<(), Error> {
        let mut node = Node::tag("table-field")
            .with_attribute("id", "films")
            .with_attribute("label", "Films");
        if let Some(content) = content {
            node = node.with_child(Node::fence("value", content));
        }
        if let Some(state) = state {
            node = node.with_attribute("state", state);
        }
        let parsed = parse(&node)?;
        assert_eq!(parsed.response, expected);
        assert_eq!(
            parsed
                .definition
                .constraints
                .table()
                .map(|table| table.columns.len()),
            Some(0)
        );
        Ok(())
    }

    #[test]
    fn test_table_field_without_schema() {
        let empty = Node::tag("table-field")
            .with_attribute("id", "films")
            .with_attribute("label", "Films");
        assert!(matches!(response(&empty), Err(Error::MissingTableSchema(..))));

        let answered = empty.with_attribute("state", "answered");
        assert!(matches!(response(&answered), Err(Error::MissingTableSchema(..))));
    }
}
