use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// An artifact link: either a single URL or a labeled set of URLs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Link {
    Url(String),
    Labeled(BTreeMap<String, String>),
}

impl Link {
    /// Flat text form used by the SQLite store. Labeled links become a JSON object.
    pub fn to_text(&self) -> String {
        match self {
            Self::Url(url) => url.clone(),
            Self::Labeled(map) => serde_json::to_string(map).unwrap_or_default(),
        }
    }

    pub fn from_text(text: &str) -> Option<Self> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return None;
        }
        if trimmed.starts_with('{') {
            if let Ok(map) = serde_json::from_str::<BTreeMap<String, String>>(trimmed) {
                return Some(Self::Labeled(map));
            }
        }
        Some(Self::Url(trimmed.to_string()))
    }

    /// Re-reads a `Url` that actually carries a serialized label map.
    pub fn normalized(self) -> Option<Self> {
        match self {
            Self::Url(text) => Self::from_text(&text),
            Self::Labeled(map) if map.is_empty() => None,
            labeled => Some(labeled),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub trec: String,
    pub track: String,
    #[serde(default)]
    pub fullname: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub coordinators: Option<String>,
    #[serde(default)]
    pub tasks: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub webpage: Option<String>,
}

impl Track {
    pub fn display_name(&self) -> &str {
        self.fullname.as_deref().unwrap_or(&self.track)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Run {
    pub trec: String,
    pub track: String,
    pub runid: String,
    pub pid: String,
    pub year: i32,
    #[serde(default, rename = "type")]
    pub run_type: Option<String>,
    #[serde(default)]
    pub fields: Option<String>,
    #[serde(default)]
    pub task: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub judge: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub md5: Option<String>,
    #[serde(default)]
    pub input_url: Option<Link>,
    #[serde(default)]
    pub summary_url: Option<Link>,
    #[serde(default)]
    pub appendix_url: Option<Link>,
    #[serde(default)]
    pub other: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub trec: String,
    pub pid: String,
    #[serde(default)]
    pub organization: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Publication {
    pub trec: String,
    pub track: String,
    pub key: String,
    pub pid: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default, rename = "abstract")]
    pub abstract_text: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub biburl: Option<String>,
    #[serde(default)]
    pub bibtex: Option<String>,
    #[serde(default)]
    pub doi: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dataset {
    pub trec: String,
    pub track: String,
    #[serde(default)]
    pub corpus: Option<Link>,
    #[serde(default)]
    pub topics: Option<Link>,
    #[serde(default)]
    pub qrels: Option<Link>,
    #[serde(default)]
    pub ir_datasets: Option<Link>,
    #[serde(default)]
    pub trec_webpage: Option<Link>,
    #[serde(default)]
    pub other: Option<Link>,
}

impl Dataset {
    pub fn fields(&self) -> [(&'static str, Option<&Link>); 6] {
        [
            ("corpus", self.corpus.as_ref()),
            ("topics", self.topics.as_ref()),
            ("qrels", self.qrels.as_ref()),
            ("ir_datasets", self.ir_datasets.as_ref()),
            ("trec_webpage", self.trec_webpage.as_ref()),
            ("other", self.other.as_ref()),
        ]
    }

    pub fn is_empty(&self) -> bool {
        self.fields().iter().all(|(_, value)| value.is_none())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultRow {
    pub trec: String,
    pub track: String,
    pub runid: String,
    pub eval: String,
    pub topic: String,
    pub measure: String,
    pub score: String,
}

/// The six metadata tables shared by the store, the assembler and the page builder.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tables {
    pub tracks: Vec<Track>,
    pub runs: Vec<Run>,
    pub participants: Vec<Participant>,
    pub publications: Vec<Publication>,
    pub datasets: Vec<Dataset>,
    pub results: Vec<ResultRow>,
}

impl Tables {
    /// Sorts every table into a stable order so stores compare equal after a round trip.
    pub fn normalize(&mut self) {
        self.tracks
            .sort_by(|a, b| (&a.trec, &a.track).cmp(&(&b.trec, &b.track)));
        self.runs
            .sort_by(|a, b| (&a.trec, &a.track, &a.runid).cmp(&(&b.trec, &b.track, &b.runid)));
        self.participants
            .sort_by(|a, b| (&a.trec, &a.pid).cmp(&(&b.trec, &b.pid)));
        self.publications
            .sort_by(|a, b| (&a.trec, &a.track, &a.key).cmp(&(&b.trec, &b.track, &b.key)));
        self.datasets
            .sort_by(|a, b| (&a.trec, &a.track).cmp(&(&b.trec, &b.track)));
        self.results.sort_by(|a, b| {
            (&a.trec, &a.track, &a.runid, &a.eval, &a.topic, &a.measure).cmp(&(
                &b.trec, &b.track, &b.runid, &b.eval, &b.topic, &b.measure,
            ))
        });
    }

    pub fn counts(&self) -> TableCounts {
        TableCounts {
            tracks: self.tracks.len(),
            runs: self.runs.len(),
            participants: self.participants.len(),
            publications: self.publications.len(),
            datasets: self.datasets.len(),
            results: self.results.len(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableCounts {
    pub tracks: usize,
    pub runs: usize,
    pub participants: usize,
    pub publications: usize,
    pub datasets: usize,
    pub results: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableFileEntry {
    pub trec: String,
    pub kind: String,
    pub path: String,
    pub sha256: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveInventoryManifest {
    pub manifest_version: u32,
    pub generated_at: String,
    pub source_directory: String,
    pub edition_count: usize,
    pub editions: Vec<String>,
    pub table_count: usize,
    pub tables: Vec<TableFileEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDbPaths {
    pub archive_root: String,
    pub json_root: String,
    pub bibtex_path: String,
    pub db_path: String,
    pub manifest_dir: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AbsenceCounts {
    pub no_runs: usize,
    pub no_participants: usize,
    pub no_proceedings: usize,
    pub no_data: usize,
    pub no_input: usize,
    pub no_summary: usize,
    pub no_appendix: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDbRunManifest {
    pub manifest_version: u32,
    pub run_id: String,
    pub db_schema_version: String,
    pub status: String,
    pub started_at: String,
    pub updated_at: String,
    pub paths: CreateDbPaths,
    pub counts: TableCounts,
    pub absence: AbsenceCounts,
    pub skipped_records: usize,
    pub skipped_summary_files: usize,
    pub source_hashes: Vec<TableFileEntry>,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildRunManifest {
    pub manifest_version: u32,
    pub run_id: String,
    pub status: String,
    pub started_at: String,
    pub updated_at: String,
    pub source: String,
    pub docs_root: String,
    pub mkdocs_path: String,
    pub editions: Vec<String>,
    pub pages_written: usize,
    pub pages_failed: usize,
    pub warnings: Vec<String>,
}
