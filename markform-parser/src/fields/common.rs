//! Attribute handling and response resolution shared by every field parser.

use std::str::FromStr;

use crate::{
    Options,
    accessors::{
        get_boolean_attr, get_count_attr, get_number_attr, get_string_array_attr,
        get_string_attr, get_validator_refs,
    },
    constants::{STATE_ABORTED, STATE_ANSWERED, STATE_EMPTY, STATE_SKIPPED},
    error::{Detail, Error},
    model::{
        CheckboxMode, Constraints, FieldDefinition, FieldKind, FieldResponse, FieldValue, Hints,
        Node, ParseWarning, ParsedField, Priority, Response,
    },
    scope_ref::is_identifier,
    sentinel::{SentinelKind, parse_sentinel},
};

/// Everything a field parser needs while it works through one tag.
pub(crate) struct FieldContext<'a> {
    pub(crate) node: &'a Node,
    pub(crate) options: &'a Options,
    pub(crate) kind: FieldKind,
    pub(crate) id: String,
    pub(crate) label: String,
    pub(crate) line: Option<usize>,
    warnings: Vec<ParseWarning>,
}

impl<'a> FieldContext<'a> {
    /// Read and check `id` and `label`.
    pub(crate) fn new(
        node: &'a Node,
        options: &'a Options,
        tag_name: &str,
        kind: FieldKind,
    ) -> Result<Self, Error> {
        let line = node.start_line();
        let Some(id) = get_string_attr(node, "id") else {
            return Err(Error::MissingAttribute(
                Detail::new(None, line),
                "id",
                tag_name.to_string(),
            ));
        };
        if !is_identifier(id) {
            return Err(Error::InvalidId(Detail::new(None, line), id.to_string()));
        }
        let Some(label) = get_string_attr(node, "label") else {
            return Err(Error::MissingAttribute(
                Detail::new(Some(id), line),
                "label",
                tag_name.to_string(),
            ));
        };
        Ok(Self {
            node,
            options,
            kind,
            id: id.to_string(),
            label: label.to_string(),
            line,
            warnings: Vec::new(),
        })
    }

    pub(crate) fn detail(&self) -> Detail {
        Detail::new(Some(&self.id), self.line)
    }

    pub(crate) fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(field = %self.id, line = ?self.line, "{message}");
        self.warnings.push(ParseWarning {
            field_id: self.id.clone(),
            message,
            line: self.line,
        });
    }

    /// `required=...`, defaulting to false.
    pub(crate) fn required(&self) -> Result<bool, Error> {
        self.flag("required")
    }

    /// A boolean attribute, defaulting to false.
    pub(crate) fn flag(&self, name: &'static str) -> Result<bool, Error> {
        match get_boolean_attr(self.node, name) {
            Some(value) => Ok(value),
            None => self.absent(name).map(|()| false),
        }
    }

    pub(crate) fn count(&self, name: &'static str) -> Result<Option<usize>, Error> {
        match get_count_attr(self.node, name) {
            Some(value) => Ok(Some(value)),
            None => self.absent(name).map(|()| None),
        }
    }

    pub(crate) fn number(&self, name: &'static str) -> Result<Option<f64>, Error> {
        match get_number_attr(self.node, name) {
            Some(value) => Ok(Some(value)),
            None => self.absent(name).map(|()| None),
        }
    }

    pub(crate) fn string(&self, name: &'static str) -> Result<Option<&'a str>, Error> {
        match get_string_attr(self.node, name) {
            Some(value) => Ok(Some(value)),
            None => self.absent(name).map(|()| None),
        }
    }

    /// An enumerated string attribute such as `checkboxMode`.
    pub(crate) fn enumerated<T: FromStr + Default>(&self, name: &'static str) -> Result<T, Error> {
        match self.string(name)? {
            Some(value) => T::from_str(value).map_err(|_| self.invalid(name)),
            None => Ok(T::default()),
        }
    }

    /// Ok when the attribute is truly absent, an error when it is present
    /// with the wrong type.
    fn absent(&self, name: &'static str) -> Result<(), Error> {
        if self.node.attributes.contains_key(name) {
            Err(self.invalid(name))
        } else {
            Ok(())
        }
    }

    pub(crate) fn invalid(&self, name: &'static str) -> Error {
        let value = self
            .node
            .attributes
            .get(name)
            .map(ToString::to_string)
            .unwrap_or_default();
        Error::InvalidAttributeValue(self.detail(), name, value)
    }

    pub(crate) fn check_bounds<T: PartialOrd>(
        &self,
        min: Option<T>,
        max: Option<T>,
        min_name: &'static str,
        max_name: &'static str,
    ) -> Result<(), Error> {
        if let (Some(min), Some(max)) = (min, max)
            && min > max
        {
            return Err(Error::InvalidBounds(self.detail(), min_name, max_name));
        }
        Ok(())
    }

    /// `placeholder` and `examples`.
    ///
    /// With a `check`, every example must pass it. A placeholder that fails
    /// is only a warning unless the parse is strict.
    pub(crate) fn hints(&mut self, check: Option<fn(&str) -> bool>) -> Result<Hints, Error> {
        let placeholder = self.string("placeholder")?.map(str::to_string);
        let examples = match get_string_array_attr(self.node, "examples") {
            Some(examples) => examples,
            None => {
                self.absent("examples")?;
                Vec::new()
            }
        };
        if let Some(check) = check {
            if let Some(example) = examples.iter().find(|example| !check(example)) {
                return Err(Error::InvalidExample(
                    self.detail(),
                    example.clone(),
                    self.kind,
                ));
            }
            if let Some(placeholder) = &placeholder
                && !check(placeholder)
            {
                if self.options.strict {
                    return Err(Error::InvalidPlaceholder(
                        self.detail(),
                        placeholder.clone(),
                        self.kind,
                    ));
                }
                self.warn(format!(
                    "placeholder '{placeholder}' is not a valid {}",
                    self.kind
                ));
            }
        }
        Ok(Hints {
            placeholder,
            examples,
        })
    }

    /// Chooser kinds have nothing to type in, so no hints either.
    pub(crate) fn forbid_hints(&self) -> Result<(), Error> {
        for name in ["placeholder", "examples"] {
            if self.node.attributes.contains_key(name) {
                return Err(Error::ForbiddenAttribute(self.detail(), name, self.kind));
            }
        }
        Ok(())
    }

    pub(crate) fn definition(
        &self,
        required: bool,
        constraints: Constraints,
    ) -> Result<FieldDefinition, Error> {
        let priority = match self.string("priority")? {
            Some(priority) => Priority::from_str(priority).map_err(|_| self.invalid("priority"))?,
            None => self.options.default_priority,
        };
        let role = self
            .string("role")?
            .map_or_else(|| self.options.default_role.clone(), str::to_string);
        Ok(FieldDefinition {
            id: self.id.clone(),
            label: self.label.clone(),
            required,
            priority,
            role,
            validators: get_validator_refs(self.node),
            constraints,
            line: self.line,
        })
    }

    /// Turn raw content into a response.
    ///
    /// A canonical sentinel in `raw` wins over everything and is returned
    /// before `coerce` runs. Otherwise the coerced value is reconciled with an
    /// explicit `state` attribute, or its emptiness decides.
    pub(crate) fn resolve(
        &self,
        required: bool,
        raw: Option<&str>,
        mode: Option<CheckboxMode>,
        coerce: impl FnOnce(Option<&str>) -> Result<FieldValue, Error>,
    ) -> Result<FieldResponse, Error> {
        let state = self.string("state")?;

        if let Some(sentinel) = raw.and_then(parse_sentinel) {
            if let Some(state) = state
                && state != sentinel.kind.state()
            {
                return Err(Error::SentinelStateConflict(
                    self.detail(),
                    sentinel.kind.state(),
                    state.to_string(),
                ));
            }
            if sentinel.kind == SentinelKind::Skip && required {
                return Err(Error::SkipRequired(self.detail()));
            }
            tracing::debug!(field = %self.id, kind = ?sentinel.kind, "sentinel content");
            return Ok(sentinel.into_response());
        }

        let value = coerce(raw)?;
        let empty = value.is_empty(mode);

        match state {
            None if empty => Ok(Response::Unanswered),
            None => Ok(Response::Answered { value }),
            Some(STATE_EMPTY) => Ok(Response::Unanswered),
            Some(STATE_ANSWERED) if empty => Err(Error::AnsweredWithoutValue(self.detail())),
            Some(STATE_ANSWERED) => Ok(Response::Answered { value }),
            Some(state @ (STATE_SKIPPED | STATE_ABORTED)) if !empty => Err(
                Error::StateRequiresEmpty(self.detail(), state.to_string()),
            ),
            Some(STATE_SKIPPED) if required => Err(Error::SkipRequired(self.detail())),
            Some(STATE_SKIPPED) => Ok(Response::Skipped { reason: None }),
            Some(STATE_ABORTED) => Ok(Response::Aborted { reason: None }),
            Some(other) => Err(Error::InvalidState(self.detail(), other.to_string())),
        }
    }

    pub(crate) fn finish(self, definition: FieldDefinition, response: FieldResponse) -> ParsedField {
        ParsedField {
            definition,
            response,
            warnings: self.warnings,
        }
    }
}

/// Trimmed content, `None` when blank.
pub(crate) fn trimmed(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}

/// One item per non-blank line, bullets stripped.
pub(crate) fn list_items(raw: Option<&str>) -> Vec<String> {
    raw.unwrap_or_default()
        .lines()
        .map(str::trim)
        .map(|line| {
            line.strip_prefix("- ")
                .or_else(|| line.strip_prefix("* "))
                .unwrap_or(line)
                .trim()
        })
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
