//! Derived "missing metadata" sets. Computed from the tables, never stored,
//! so the assembler and the page builder always agree.

use std::collections::{BTreeSet, HashMap};

use crate::model::{AbsenceCounts, Run, Tables};
use crate::rules::{PageCatalog, contains_pair};

type Pair = (String, String);

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AbsenceSets {
    pub no_runs: BTreeSet<Pair>,
    pub no_participants: BTreeSet<Pair>,
    pub no_proceedings: BTreeSet<Pair>,
    pub no_data: BTreeSet<Pair>,
    pub no_input: BTreeSet<Pair>,
    pub no_summary: BTreeSet<Pair>,
    pub no_appendix: BTreeSet<Pair>,
}

fn pair(trec: &str, track: &str) -> Pair {
    (trec.to_string(), track.to_string())
}

fn contains(set: &BTreeSet<Pair>, trec: &str, track: &str) -> bool {
    set.iter().any(|(a, b)| a == trec && b == track)
}

impl AbsenceSets {
    pub fn compute(tables: &Tables, pages: &PageCatalog) -> Self {
        let mut runs_by_track: HashMap<(&str, &str), Vec<&Run>> = HashMap::new();
        for run in &tables.runs {
            runs_by_track
                .entry((run.trec.as_str(), run.track.as_str()))
                .or_default()
                .push(run);
        }
        let published: BTreeSet<(&str, &str)> = tables
            .publications
            .iter()
            .map(|publication| (publication.trec.as_str(), publication.track.as_str()))
            .collect();
        let with_data: BTreeSet<(&str, &str)> = tables
            .datasets
            .iter()
            .filter(|dataset| !dataset.is_empty())
            .map(|dataset| (dataset.trec.as_str(), dataset.track.as_str()))
            .collect();

        let mut sets = Self::default();
        for track in &tables.tracks {
            let key = (track.trec.as_str(), track.track.as_str());
            let runs = runs_by_track.get(&key).map(Vec::as_slice).unwrap_or_default();
            let none_have = |link: fn(&Run) -> bool| !runs.iter().any(|run| link(run));
            let current = pair(key.0, key.1);

            if runs.is_empty() {
                sets.no_runs.insert(current.clone());
                sets.no_participants.insert(current.clone());
            }
            if !published.contains(&key) {
                sets.no_proceedings.insert(current.clone());
            }
            if !with_data.contains(&key) {
                sets.no_data.insert(current.clone());
            }
            if none_have(|run| run.input_url.is_some()) {
                sets.no_input.insert(current.clone());
            }
            if none_have(|run| run.appendix_url.is_some()) {
                sets.no_appendix.insert(current.clone());
            }
            if none_have(|run| run.summary_url.is_some())
                && !contains_pair(&pages.summary_exceptions, key.0, key.1)
            {
                sets.no_summary.insert(current);
            }
        }

        for (trec, track) in &pages.unparsed_summary_tracks {
            sets.no_summary.insert(pair(trec, track));
        }

        sets
    }

    pub fn has_runs(&self, trec: &str, track: &str) -> bool {
        !contains(&self.no_runs, trec, track)
    }

    pub fn has_participants(&self, trec: &str, track: &str) -> bool {
        !contains(&self.no_participants, trec, track)
    }

    pub fn has_proceedings(&self, trec: &str, track: &str) -> bool {
        !contains(&self.no_proceedings, trec, track)
    }

    pub fn has_data(&self, trec: &str, track: &str) -> bool {
        !contains(&self.no_data, trec, track)
    }

    pub fn has_input(&self, trec: &str, track: &str) -> bool {
        !contains(&self.no_input, trec, track)
    }

    pub fn has_summary(&self, trec: &str, track: &str) -> bool {
        !contains(&self.no_summary, trec, track)
    }

    pub fn has_appendix(&self, trec: &str, track: &str) -> bool {
        !contains(&self.no_appendix, trec, track)
    }

    pub fn counts(&self) -> AbsenceCounts {
        AbsenceCounts {
            no_runs: self.no_runs.len(),
            no_participants: self.no_participants.len(),
            no_proceedings: self.no_proceedings.len(),
            no_data: self.no_data.len(),
            no_input: self.no_input.len(),
            no_summary: self.no_summary.len(),
            no_appendix: self.no_appendix.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Dataset, Link, Publication, Track};

    fn track(trec: &str, name: &str) -> Track {
        Track {
            trec: trec.to_string(),
            track: name.to_string(),
            fullname: None,
            description: None,
            coordinators: None,
            tasks: None,
            webpage: None,
        }
    }

    fn run(trec: &str, track: &str, input: bool) -> Run {
        Run {
            trec: trec.to_string(),
            track: track.to_string(),
            runid: "r1".to_string(),
            pid: "org".to_string(),
            year: 2020,
            run_type: None,
            fields: None,
            task: None,
            date: None,
            judge: None,
            description: None,
            md5: None,
            input_url: input.then(|| Link::Url("https://example.org/input".to_string())),
            summary_url: None,
            appendix_url: None,
            other: None,
        }
    }

    fn pages() -> PageCatalog {
        PageCatalog {
            unparsed_summary_tracks: vec![("trec8".to_string(), "qa".to_string())],
            summary_exceptions: vec![("trec29".to_string(), "deep".to_string())],
            editions_without_proceedings_page: vec!["trec-covid".to_string()],
        }
    }

    #[test]
    fn tracks_without_runs_are_absent_everywhere() {
        let tables = Tables {
            tracks: vec![track("trec29", "deep"), track("trec29", "misinfo")],
            runs: vec![run("trec29", "deep", true)],
            ..Tables::default()
        };
        let sets = AbsenceSets::compute(&tables, &pages());

        assert!(sets.has_runs("trec29", "deep"));
        assert!(sets.has_input("trec29", "deep"));
        assert!(!sets.has_appendix("trec29", "deep"));
        assert!(sets.has_summary("trec29", "deep"));

        assert!(!sets.has_runs("trec29", "misinfo"));
        assert!(!sets.has_participants("trec29", "misinfo"));
        assert!(!sets.has_input("trec29", "misinfo"));
        assert!(!sets.has_summary("trec29", "misinfo"));
        assert!(!sets.has_summary("trec8", "qa"));
    }

    #[test]
    fn empty_dataset_rows_and_missing_rows_mean_no_data() {
        let tables = Tables {
            tracks: vec![track("trec30", "deep"), track("trec30", "podcast"), track("trec30", "cast")],
            datasets: vec![
                Dataset {
                    trec: "trec30".to_string(),
                    track: "deep".to_string(),
                    corpus: Some(Link::Url("https://example.org/corpus".to_string())),
                    topics: None,
                    qrels: None,
                    ir_datasets: None,
                    trec_webpage: None,
                    other: None,
                },
                Dataset {
                    trec: "trec30".to_string(),
                    track: "podcast".to_string(),
                    corpus: None,
                    topics: None,
                    qrels: None,
                    ir_datasets: None,
                    trec_webpage: None,
                    other: None,
                },
            ],
            publications: vec![Publication {
                trec: "trec30".to_string(),
                track: "deep".to_string(),
                key: "craswell2021".to_string(),
                pid: "overview".to_string(),
                title: None,
                author: None,
                abstract_text: None,
                url: None,
                biburl: None,
                bibtex: None,
                doi: None,
            }],
            ..Tables::default()
        };
        let sets = AbsenceSets::compute(&tables, &pages());

        assert!(sets.has_data("trec30", "deep"));
        assert!(!sets.has_data("trec30", "podcast"));
        assert!(!sets.has_data("trec30", "cast"));
        assert!(sets.has_proceedings("trec30", "deep"));
        assert!(!sets.has_proceedings("trec30", "cast"));
        assert_eq!(sets.counts().no_data, 2);
    }
}
