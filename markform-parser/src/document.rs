//! Walks a document tree and assembles the form it contains.

use std::collections::BTreeMap;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::{
    Options,
    accessors::get_string_attr,
    constants::{FORM_TAG, GROUP_TAG},
    error::{Detail, Error, LineDisplay},
    fields::parse_field,
    model::{FieldGroup, FieldResponse, FormSchema, Node, ParseWarning, ParsedForm},
    scope_ref::is_identifier,
};

/// Parse the first `form` tag found in `root`.
///
/// Fields inside a `field-group` belong to that group. Fields written
/// directly in the form are collected into one implicit group, placed where
/// the first of them appears.
///
/// # Errors
///
/// Returns an error if there is no form, if any field fails to parse, or if
/// field or group ids are duplicated.
#[tracing::instrument(level = "trace", skip_all)]
pub fn parse_form(root: &Node, options: &Options) -> Result<ParsedForm, Error> {
    let form = find_form(root).ok_or(Error::MissingForm)?;
    let line = form.start_line();
    let id = get_string_attr(form, "id").ok_or_else(|| {
        Error::MissingAttribute(Detail::new(None, line), "id", FORM_TAG.to_string())
    })?;
    if !is_identifier(id) {
        return Err(Error::InvalidId(Detail::new(None, line), id.to_string()));
    }

    let mut walker = Walker {
        options,
        groups: Vec::new(),
        implicit: None,
        field_lines: FxHashMap::default(),
        group_ids: FxHashSet::default(),
        responses: BTreeMap::new(),
        warnings: Vec::new(),
    };
    for child in &form.children {
        walker.walk(child, None)?;
    }

    tracing::debug!(
        form = id,
        groups = walker.groups.len(),
        fields = walker.responses.len(),
        "parsed form"
    );
    Ok(ParsedForm {
        schema: FormSchema {
            id: id.to_string(),
            title: get_string_attr(form, "title").map(str::to_string),
            groups: walker.groups,
        },
        responses: walker.responses,
        warnings: walker.warnings,
    })
}

fn find_form(node: &Node) -> Option<&Node> {
    if node.is_tag(FORM_TAG) {
        return Some(node);
    }
    node.children.iter().find_map(find_form)
}

struct Walker<'a> {
    options: &'a Options,
    groups: Vec<FieldGroup>,
    /// Index of the implicit group, once a loose field has been seen.
    implicit: Option<usize>,
    field_lines: FxHashMap<String, Option<usize>>,
    group_ids: FxHashSet<String>,
    responses: BTreeMap<String, FieldResponse>,
    warnings: Vec<ParseWarning>,
}

impl Walker<'_> {
    /// Visit `node`. `group` is the index of the enclosing explicit group.
    fn walk(&mut self, node: &Node, group: Option<usize>) -> Result<(), Error> {
        if node.is_tag(GROUP_TAG) {
            return self.group(node, group);
        }
        if let Some(parsed) = parse_field(node, self.options)? {
            let definition = parsed.definition;
            if let Some(first) = self.field_lines.get(&definition.id) {
                return Err(Error::DuplicateFieldId(
                    Detail::new(Some(&definition.id), definition.line),
                    definition.id.clone(),
                    LineDisplay(*first),
                ));
            }
            self.field_lines
                .insert(definition.id.clone(), definition.line);
            self.responses
                .insert(definition.id.clone(), parsed.response);
            self.warnings.extend(parsed.warnings);

            let index = match group {
                Some(index) => index,
                None => self.implicit_group(),
            };
            if let Some(group) = self.groups.get_mut(index) {
                group.fields.push(definition);
            }
            return Ok(());
        }
        for child in &node.children {
            self.walk(child, group)?;
        }
        Ok(())
    }

    fn group(&mut self, node: &Node, enclosing: Option<usize>) -> Result<(), Error> {
        let line = node.start_line();
        if enclosing.is_some() {
            return Err(Error::NestedGroup(Detail::new(None, line)));
        }
        let id = get_string_attr(node, "id").ok_or_else(|| {
            Error::MissingAttribute(Detail::new(None, line), "id", GROUP_TAG.to_string())
        })?;
        if !is_identifier(id) {
            return Err(Error::InvalidId(Detail::new(None, line), id.to_string()));
        }
        if !self.group_ids.insert(id.to_string()) {
            return Err(Error::DuplicateGroupId(
                Detail::new(None, line),
                id.to_string(),
            ));
        }

        self.groups.push(FieldGroup {
            id: Some(id.to_string()),
            title: get_string_attr(node, "title").map(str::to_string),
            fields: Vec::new(),
        });
        let index = self.groups.len() - 1;
        for child in &node.children {
            self.walk(child, Some(index))?;
        }
        Ok(())
    }

    fn implicit_group(&mut self) -> usize {
        if let Some(index) = self.implicit {
            return index;
        }
        self.groups.push(FieldGroup::default());
        let index = self.groups.len() - 1;
        self.implicit = Some(index);
        index
    }
}
