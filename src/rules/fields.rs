use std::collections::BTreeMap;

use serde::Deserialize;

use super::Record;
use super::matcher::RuleMatch;
use super::template::{Template, TemplateError};
use crate::util::percent_decode;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct Rename {
    when: RuleMatch,
    track: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct Assignment {
    when: RuleMatch,
    #[serde(default)]
    set: BTreeMap<String, Template>,
    #[serde(default)]
    clear: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct DescriptionRule {
    when: RuleMatch,
    value: Template,
    #[serde(default)]
    trim: bool,
    #[serde(default)]
    only_if_empty: bool,
}

/// Corrections applied to run records around artifact derivation.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldBook {
    renames: Vec<Rename>,
    pre_assign: Vec<Assignment>,
    description: Vec<DescriptionRule>,
    description_from_year: i32,
    post_assign: Vec<Assignment>,
}

impl FieldBook {
    pub fn rename_track(&self, record: &mut Record) {
        if let Some(rename) = self.renames.iter().find(|rule| rule.when.matches(&*record)) {
            record.set("track", rename.track.clone());
        }
    }

    /// Moves values the submission form stored in the wrong column.
    pub fn apply_pre_assignments(&self, record: &mut Record) -> Result<(), TemplateError> {
        apply_assignments(&self.pre_assign, record)
    }

    pub fn apply_post_assignments(&self, record: &mut Record) -> Result<(), TemplateError> {
        apply_assignments(&self.post_assign, record)
    }

    /// Selects the description source for the record's edition and track, then
    /// cleans it for markdown output.
    pub fn assemble_description(&self, record: &mut Record) -> Result<(), TemplateError> {
        let current = record.value_str("description").unwrap_or_default().to_string();
        let mut description = Some(current.clone());

        if let Some(rule) = self.description.iter().find(|rule| rule.when.matches(&*record)) {
            if !rule.only_if_empty || current.is_empty() {
                let rendered = rule.value.render(&*record, None)?;
                description = Some(if rule.trim {
                    rendered.trim().to_string()
                } else {
                    rendered
                });
            }
        }

        if record.year() < self.description_from_year {
            description = None;
        }

        match description.filter(|text| !text.is_empty()) {
            Some(text) => record.set("description", clean_description(&text)),
            None => {
                record.remove("description");
            }
        }
        Ok(())
    }
}

fn apply_assignments(rules: &[Assignment], record: &mut Record) -> Result<(), TemplateError> {
    for rule in rules {
        if !rule.when.matches(&*record) {
            continue;
        }
        // Render against the record as it was before this rule, so swaps work.
        let mut values = Vec::with_capacity(rule.set.len());
        for (field, template) in &rule.set {
            values.push((field.clone(), template.render(&*record, None)?));
        }
        for (field, value) in values {
            record.set(&field, value);
        }
        for field in &rule.clear {
            record.remove(field);
        }
    }
    Ok(())
}

/// Percent-decodes, drops non-ASCII characters and breaks `](` so free text
/// cannot form a markdown link.
pub fn clean_description(text: &str) -> String {
    percent_decode(text)
        .chars()
        .filter(char::is_ascii)
        .collect::<String>()
        .replace("](", "] (")
}
