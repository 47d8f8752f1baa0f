use std::collections::BTreeMap;

use serde::Deserialize;

use super::matcher::RuleMatch;
use super::template::{RecordView, Template, TemplateError};
use crate::model::Link;

/// What a matching file or URL rule produces.
#[derive(Debug, Clone, Copy)]
enum Target<'a> {
    Single(&'a Template),
    Variants(&'a [(String, Template)]),
    Absent,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct ArtifactRule {
    when: RuleMatch,
    #[serde(default, alias = "url")]
    file: Option<Template>,
    #[serde(default)]
    variants: Option<Vec<(String, Template)>>,
    #[serde(default)]
    absent: bool,
}

impl ArtifactRule {
    fn target(&self) -> Target<'_> {
        if self.absent {
            return Target::Absent;
        }
        match (&self.file, &self.variants) {
            (Some(template), _) => Target::Single(template),
            (None, Some(variants)) => Target::Variants(variants),
            (None, None) => Target::Absent,
        }
    }
}

/// File-name and URL rules for one artifact kind (input, summary or appendix).
///
/// The first file rule matching the record names the file (or a labeled set
/// of files); the first URL rule matching places it. Tracks listed in
/// `absent` never have the artifact.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ArtifactBook {
    absent: Vec<(String, String)>,
    default_file: Template,
    default_url: Template,
    files: Vec<ArtifactRule>,
    urls: Vec<ArtifactRule>,
}

impl ArtifactBook {
    pub fn is_absent_track(&self, trec: &str, track: &str) -> bool {
        self.absent
            .iter()
            .any(|(absent_trec, absent_track)| absent_trec == trec && absent_track == track)
    }

    pub fn resolve(&self, record: &dyn RecordView) -> Result<Option<Link>, TemplateError> {
        let trec = record.value("trec").unwrap_or_default();
        let track = record.value("track").unwrap_or_default();
        if self.is_absent_track(trec, track) {
            return Ok(None);
        }

        let file = first_target(&self.files, record).unwrap_or(Target::Single(&self.default_file));
        let url = first_target(&self.urls, record).unwrap_or(Target::Single(&self.default_url));

        match url {
            Target::Absent => Ok(None),
            Target::Variants(variants) => {
                let mut labeled = BTreeMap::new();
                for (label, template) in variants {
                    labeled.insert(label.clone(), template.render(record, None)?);
                }
                Ok(Some(Link::Labeled(labeled)))
            }
            Target::Single(template) if !template.uses_file() => {
                Ok(Some(Link::Url(template.render(record, None)?)))
            }
            Target::Single(template) => match file {
                Target::Absent => Ok(None),
                Target::Single(file_template) => {
                    let file_name = file_template.render(record, None)?;
                    Ok(Some(Link::Url(template.render(record, Some(&file_name))?)))
                }
                Target::Variants(variants) => {
                    let mut labeled = BTreeMap::new();
                    for (label, file_template) in variants {
                        let file_name = file_template.render(record, None)?;
                        labeled.insert(label.clone(), template.render(record, Some(&file_name))?);
                    }
                    Ok(Some(Link::Labeled(labeled)))
                }
            },
        }
    }
}

fn first_target<'a>(rules: &'a [ArtifactRule], record: &dyn RecordView) -> Option<Target<'a>> {
    rules
        .iter()
        .find(|rule| rule.when.matches(record))
        .map(ArtifactRule::target)
}
