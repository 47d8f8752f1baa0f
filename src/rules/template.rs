use std::fmt;

use serde::Deserialize;

use crate::conventions::{PUBS_BASE_URL, RESULTS_BASE_URL};
use crate::util::percent_decode;

/// Read access to the named attributes of a record.
pub trait RecordView {
    fn value(&self, field: &str) -> Option<&str>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    MissingField(String),
    MissingSegment { field: String, filter: String },
    MissingFile,
}

impl fmt::Display for TemplateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingField(field) => write!(f, "record has no field `{field}`"),
            Self::MissingSegment { field, filter } => {
                write!(f, "field `{field}` has no segment for filter `{filter}`")
            }
            Self::MissingFile => write!(f, "template uses {{file}} but no file name is bound"),
        }
    }
}

impl std::error::Error for TemplateError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Filter {
    Lower,
    Upper,
    Trim,
    /// Everything before the last `.`, re-joined with `.`.
    Stem,
    /// Same as `Stem` but re-joined without separators.
    StemJoined,
    Head,
    Dash(usize),
    LastDash,
    Unquote,
    DropParens,
}

impl Filter {
    fn parse(name: &str) -> Result<Self, String> {
        let filter = match name {
            "lower" => Self::Lower,
            "upper" => Self::Upper,
            "trim" => Self::Trim,
            "stem" => Self::Stem,
            "stem_joined" => Self::StemJoined,
            "head" => Self::Head,
            "last_dash" => Self::LastDash,
            "unquote" => Self::Unquote,
            "drop_parens" => Self::DropParens,
            other => match other.strip_prefix("dash").map(str::parse::<usize>) {
                Some(Ok(index)) => Self::Dash(index),
                _ => return Err(format!("unknown template filter `{other}`")),
            },
        };
        Ok(filter)
    }

    fn name(self) -> String {
        match self {
            Self::Lower => "lower".to_string(),
            Self::Upper => "upper".to_string(),
            Self::Trim => "trim".to_string(),
            Self::Stem => "stem".to_string(),
            Self::StemJoined => "stem_joined".to_string(),
            Self::Head => "head".to_string(),
            Self::Dash(index) => format!("dash{index}"),
            Self::LastDash => "last_dash".to_string(),
            Self::Unquote => "unquote".to_string(),
            Self::DropParens => "drop_parens".to_string(),
        }
    }

    fn apply(self, input: &str) -> Option<String> {
        let output = match self {
            Self::Lower => input.to_lowercase(),
            Self::Upper => input.to_uppercase(),
            Self::Trim => input.trim().to_string(),
            Self::Stem | Self::StemJoined => {
                let segments: Vec<&str> = input.split('.').collect();
                let head = &segments[..segments.len().saturating_sub(1)];
                if self == Self::Stem {
                    head.join(".")
                } else {
                    head.concat()
                }
            }
            Self::Head => input.split('.').next().unwrap_or_default().to_string(),
            Self::Dash(index) => input.split('-').nth(index)?.to_string(),
            Self::LastDash => input.rsplit('-').next().unwrap_or_default().to_string(),
            Self::Unquote => percent_decode(input),
            Self::DropParens => drop_parenthesized(input),
        };
        Some(output)
    }
}

fn drop_parenthesized(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut depth = 0_usize;
    for ch in input.chars() {
        match ch {
            '(' => depth += 1,
            ')' if depth > 0 => depth -= 1,
            _ if depth == 0 => out.push(ch),
            _ => {}
        }
    }
    out
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Part {
    Literal(String),
    Field {
        name: String,
        filters: Vec<Filter>,
        default: Option<String>,
    },
}

/// A string with `{field[:filter...][|default]}` placeholders.
///
/// `{results}`, `{pubs}` and `{file}` are built in; every other name is
/// looked up on the record.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct Template {
    parts: Vec<Part>,
}

impl TryFrom<String> for Template {
    type Error = String;

    fn try_from(source: String) -> Result<Self, Self::Error> {
        Self::parse(&source)
    }
}

impl Template {
    pub fn parse(source: &str) -> Result<Self, String> {
        let mut parts = Vec::new();
        let mut rest = source;

        while let Some(open) = rest.find('{') {
            if open > 0 {
                parts.push(Part::Literal(rest[..open].to_string()));
            }
            let after = &rest[open + 1..];
            let close = after
                .find('}')
                .ok_or_else(|| format!("unterminated placeholder in `{source}`"))?;
            parts.push(parse_placeholder(&after[..close])?);
            rest = &after[close + 1..];
        }
        if !rest.is_empty() {
            parts.push(Part::Literal(rest.to_string()));
        }

        Ok(Self { parts })
    }

    pub fn uses_file(&self) -> bool {
        self.parts
            .iter()
            .any(|part| matches!(part, Part::Field { name, .. } if name == "file"))
    }

    pub fn render(
        &self,
        record: &dyn RecordView,
        file: Option<&str>,
    ) -> Result<String, TemplateError> {
        let mut out = String::new();
        for part in &self.parts {
            match part {
                Part::Literal(text) => out.push_str(text),
                Part::Field {
                    name,
                    filters,
                    default,
                } => out.push_str(&render_field(record, file, name, filters, default.as_deref())?),
            }
        }
        Ok(out)
    }
}

fn parse_placeholder(body: &str) -> Result<Part, String> {
    let (spec, default) = match body.split_once('|') {
        Some((spec, default)) => (spec, Some(default.to_string())),
        None => (body, None),
    };
    let mut pieces = spec.split(':');
    let name = pieces.next().unwrap_or_default().trim();
    if name.is_empty() {
        return Err(format!("empty placeholder `{{{body}}}`"));
    }
    let filters = pieces.map(Filter::parse).collect::<Result<Vec<_>, _>>()?;

    Ok(Part::Field {
        name: name.to_string(),
        filters,
        default,
    })
}

fn render_field(
    record: &dyn RecordView,
    file: Option<&str>,
    name: &str,
    filters: &[Filter],
    default: Option<&str>,
) -> Result<String, TemplateError> {
    let raw = match name {
        "results" => Some(RESULTS_BASE_URL),
        "pubs" => Some(PUBS_BASE_URL),
        "file" => Some(file.ok_or(TemplateError::MissingFile)?),
        _ => record.value(name),
    };

    let Some(raw) = raw else {
        return default
            .map(ToOwned::to_owned)
            .ok_or_else(|| TemplateError::MissingField(name.to_string()));
    };

    let mut value = raw.to_string();
    for filter in filters {
        match filter.apply(&value) {
            Some(next) => value = next,
            None => {
                return default.map(ToOwned::to_owned).ok_or_else(|| {
                    TemplateError::MissingSegment {
                        field: name.to_string(),
                        filter: filter.name(),
                    }
                });
            }
        }
    }
    Ok(value)
}
