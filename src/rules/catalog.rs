use serde::Deserialize;

use super::matcher::{EditionTrack, RuleMatch};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EvalTypeRule {
    when: RuleMatch,
    patterns: Vec<(String, String)>,
}

/// Track lists the page builder needs on top of the stored tables.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PageCatalog {
    pub unparsed_summary_tracks: Vec<(String, String)>,
    pub summary_exceptions: Vec<(String, String)>,
    pub editions_without_proceedings_page: Vec<String>,
}

/// Vocabularies and small lookup lists shared by the assembler stages.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Catalog {
    pub excluded_tracks: Vec<String>,
    pub ignored_tasks: Vec<String>,
    pub run_types: Vec<String>,
    pub summary_affixes: Vec<String>,
    pub trec_eval_measures: Vec<String>,
    pub sample_eval_measures: Vec<String>,
    pub legacy_summary_tracks: Vec<(String, String)>,
    pub unparsed_summary_tracks: Vec<(String, String)>,
    pub eval_types: Vec<EvalTypeRule>,
    pub pages: PageCatalog,
}

impl Catalog {
    pub fn is_excluded_track(&self, track: &str) -> bool {
        self.excluded_tracks.iter().any(|excluded| excluded == track)
    }

    pub fn is_ignored_task(&self, task: &str) -> bool {
        let task = task.trim();
        self.ignored_tasks.iter().any(|ignored| ignored == task)
    }

    pub fn is_known_run_type(&self, run_type: &str) -> bool {
        let run_type = run_type.trim();
        self.run_types.iter().any(|known| known == run_type)
    }

    /// Recovers a run id from a summary file name.
    pub fn strip_summary_affixes(&self, file_name: &str) -> String {
        let base = file_name.rsplit('/').next().unwrap_or(file_name);
        self.summary_affixes
            .iter()
            .fold(base.to_string(), |name, affix| name.replace(affix.as_str(), ""))
    }

    /// Evaluation method implied by a summary file name; the last matching pattern wins.
    pub fn eval_type(&self, file_name: &str, trec: &str, track: &str) -> String {
        let pair = EditionTrack { trec, track };
        let mut eval = "trec_eval".to_string();
        for rule in self.eval_types.iter().filter(|rule| rule.when.matches(&pair)) {
            for (needle, name) in &rule.patterns {
                if file_name.contains(needle.as_str()) {
                    eval = name.clone();
                }
            }
        }
        eval
    }

    pub fn measures_for(&self, eval: &str) -> &[String] {
        if eval == "sample-eval" {
            &self.sample_eval_measures
        } else {
            &self.trec_eval_measures
        }
    }

    pub fn is_legacy_summary_track(&self, trec: &str, track: &str) -> bool {
        contains_pair(&self.legacy_summary_tracks, trec, track)
    }

    pub fn is_unparsed_summary_track(&self, trec: &str, track: &str) -> bool {
        contains_pair(&self.unparsed_summary_tracks, trec, track)
    }
}

pub fn contains_pair(pairs: &[(String, String)], trec: &str, track: &str) -> bool {
    pairs.iter().any(|(a, b)| a == trec && b == track)
}
