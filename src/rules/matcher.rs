use regex::Regex;
use serde::Deserialize;

use super::template::RecordView;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    pub fn contains(&self, value: &str) -> bool {
        let value = value.trim();
        match self {
            Self::One(expected) => expected == value,
            Self::Many(options) => options.iter().any(|option| option == value),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "String")]
pub struct RunIdPattern(Regex);

impl TryFrom<String> for RunIdPattern {
    type Error = regex::Error;

    fn try_from(pattern: String) -> Result<Self, Self::Error> {
        Regex::new(&pattern).map(Self)
    }
}

/// Conditions a record must satisfy for a rule to apply. Every present
/// condition must hold; an absent record field fails every positive
/// condition and passes every negated one.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleMatch {
    #[serde(default)]
    pub trec: Option<OneOrMany>,
    #[serde(default)]
    pub track: Option<OneOrMany>,
    #[serde(default)]
    pub not_track: Option<OneOrMany>,
    #[serde(default)]
    pub task: Option<OneOrMany>,
    #[serde(default)]
    pub not_task: Option<OneOrMany>,
    #[serde(default, rename = "type")]
    pub run_type: Option<OneOrMany>,
    #[serde(default)]
    pub pid: Option<OneOrMany>,
    #[serde(default)]
    pub runid: Option<OneOrMany>,
    #[serde(default)]
    pub runid_pattern: Option<RunIdPattern>,
}

impl RuleMatch {
    pub fn matches(&self, record: &dyn RecordView) -> bool {
        let positive = [
            ("trec", &self.trec),
            ("track", &self.track),
            ("task", &self.task),
            ("type", &self.run_type),
            ("pid", &self.pid),
            ("runid", &self.runid),
        ];
        for (field, expected) in positive {
            if let Some(expected) = expected {
                match record.value(field) {
                    Some(value) if expected.contains(value) => {}
                    _ => return false,
                }
            }
        }

        let negative = [("track", &self.not_track), ("task", &self.not_task)];
        for (field, excluded) in negative {
            if let (Some(excluded), Some(value)) = (excluded, record.value(field)) {
                if excluded.contains(value) {
                    return false;
                }
            }
        }

        if let Some(RunIdPattern(pattern)) = &self.runid_pattern {
            match record.value("runid") {
                Some(runid) if pattern.is_match(runid) => {}
                _ => return false,
            }
        }

        true
    }
}

/// Just the (edition, track) identity, for rules keyed on the pair only.
#[derive(Debug, Clone, Copy)]
pub struct EditionTrack<'a> {
    pub trec: &'a str,
    pub track: &'a str,
}

impl RecordView for EditionTrack<'_> {
    fn value(&self, field: &str) -> Option<&str> {
        match field {
            "trec" => Some(self.trec),
            "track" => Some(self.track),
            _ => None,
        }
    }
}
