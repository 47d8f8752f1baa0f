use super::*;

/// An `abstracts.json` entry: the paper's participant and its abstract.
#[derive(Debug, Clone, Deserialize)]
pub(super) struct AbstractEntry {
    pid: String,
    #[serde(default, rename = "abstract")]
    abstract_text: Option<String>,
}

pub(super) type AbstractsFile = BTreeMap<String, BTreeMap<String, BTreeMap<String, AbstractEntry>>>;

#[derive(Debug, Default)]
pub(super) struct PublicationHarvest {
    pub(super) publications: Vec<Publication>,
    pub(super) warnings: Vec<String>,
}

/// Keeps URLs intact: only escapes and grouping braces are removed.
fn latex_url(url: &str) -> String {
    let mut out = String::with_capacity(url.len());
    let mut chars = url.chars();
    while let Some(ch) = chars.next() {
        match ch {
            '\\' => out.extend(chars.next()),
            '{' | '}' => {}
            _ => out.push(ch),
        }
    }
    out
}

pub(super) fn clean_title(raw: &str) -> String {
    collapse_whitespace(&latex_to_text(raw))
}

pub(super) fn clean_authors(raw: &str) -> String {
    collapse_whitespace(&latex_to_text(&raw.replace('\n', " "))).replace(" and ", ", ")
}

/// Joins curated abstracts with their bibliography entries. A paper whose
/// key is missing from the bibliography is skipped with a warning.
pub(super) fn assemble_publications(abstracts: AbstractsFile, bibliography: &[BibEntry]) -> PublicationHarvest {
    let by_key: HashMap<&str, &BibEntry> = bibliography
        .iter()
        .map(|entry| (entry.key.as_str(), entry))
        .collect();
    let mut harvest = PublicationHarvest::default();

    for (trec, tracks) in abstracts {
        for (track, papers) in tracks {
            for (key, paper) in papers {
                let Some(entry) = by_key.get(key.as_str()) else {
                    warn!(trec = %trec, track = %track, key = %key, "publication missing from bibliography");
                    harvest
                        .warnings
                        .push(format!("{trec}/{track}/{key}: missing from bibliography"));
                    continue;
                };

                let pid = if paper.pid == "coordinators" {
                    OVERVIEW_PID.to_string()
                } else {
                    paper.pid
                };

                harvest.publications.push(Publication {
                    trec: trec.clone(),
                    track: track.clone(),
                    pid,
                    title: entry.field("title").map(clean_title),
                    author: entry.field("author").map(clean_authors),
                    abstract_text: non_empty(paper.abstract_text.as_deref()),
                    url: non_empty(entry.field("url")).map(|url| latex_url(&url)),
                    biburl: non_empty(entry.field("biburl")),
                    bibtex: Some(entry.to_bibtex()),
                    doi: non_empty(entry.field("doi")),
                    key,
                });
            }
        }
    }

    harvest
}

/// Nested `edition -> track -> key` form written to `json/publications.json`.
pub(super) fn publications_by_edition(
    publications: &[Publication],
) -> BTreeMap<&str, BTreeMap<&str, BTreeMap<&str, &Publication>>> {
    let mut nested: BTreeMap<&str, BTreeMap<&str, BTreeMap<&str, &Publication>>> = BTreeMap::new();
    for publication in publications {
        nested
            .entry(publication.trec.as_str())
            .or_default()
            .entry(publication.track.as_str())
            .or_default()
            .insert(publication.key.as_str(), publication);
    }
    nested
}

pub(super) fn load_publications(abstracts_path: &Path, bibtex_path: &Path) -> Result<PublicationHarvest> {
    let abstracts: AbstractsFile = read_json(abstracts_path)?;
    let bib_text = read_lossy_text(bibtex_path)?;
    let bibliography = parse_bibliography(&bib_text);
    info!(
        entries = bibliography.entries.len(),
        skipped = bibliography.warnings.len(),
        path = %bibtex_path.display(),
        "parsed bibliography"
    );
    let mut harvest = assemble_publications(abstracts, &bibliography.entries);
    harvest.warnings.splice(0..0, bibliography.warnings);
    Ok(harvest)
}
