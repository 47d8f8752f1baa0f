use std::collections::BTreeMap;

use serde::Deserialize;

use super::Record;
use super::matcher::RuleMatch;
use super::template::Template;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct OtherRule {
    when: RuleMatch,
    set: BTreeMap<String, Template>,
    #[serde(default)]
    merge: bool,
    #[serde(default)]
    optional: bool,
    #[serde(default)]
    only_if_contains: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OtherOutcome {
    pub bag: Option<BTreeMap<String, String>>,
    pub warnings: Vec<String>,
}

/// Ordered rules building the free-form `other` map of a run.
///
/// A matching rule replaces the bag built so far unless it is marked
/// `merge`. A key whose template fails is dropped with a warning; an
/// `optional` rule is dropped whole, silently.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OtherBook {
    rules: Vec<OtherRule>,
}

impl OtherBook {
    pub fn assemble(&self, record: &Record) -> OtherOutcome {
        let mut bag: Option<BTreeMap<String, String>> = None;
        let mut warnings = Vec::new();

        for rule in self.rules.iter().filter(|rule| rule.when.matches(record)) {
            let mut entries = BTreeMap::new();
            let mut rule_warnings = Vec::new();

            for (key, template) in &rule.set {
                match template.render(record, None) {
                    Ok(value) => {
                        let wanted = rule
                            .only_if_contains
                            .as_deref()
                            .is_none_or(|needle| value.contains(needle));
                        if wanted {
                            entries.insert(key.clone(), value);
                        }
                    }
                    Err(err) => rule_warnings.push(format!("other.{key}: {err}")),
                }
            }

            if rule.optional && !rule_warnings.is_empty() {
                continue;
            }
            warnings.extend(rule_warnings);

            match (&mut bag, rule.merge) {
                (Some(existing), true) => existing.extend(entries),
                _ => bag = Some(entries),
            }
        }

        let bag = bag
            .map(|entries| {
                entries
                    .into_iter()
                    .filter(|(_, value)| !value.trim().is_empty())
                    .collect::<BTreeMap<_, _>>()
            })
            .filter(|entries| !entries.is_empty());

        OtherOutcome { bag, warnings }
    }
}
