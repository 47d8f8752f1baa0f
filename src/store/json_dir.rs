use super::*;

type ResultsTree = BTreeMap<String, BTreeMap<String, BTreeMap<String, BTreeMap<String, BTreeMap<String, Scores>>>>>;

/// Scores of one measure. A measure reported more than once for the same
/// topic keeps every score, in row order.
#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum Scores {
    One(String),
    Many(Vec<String>),
}

impl Scores {
    fn push(&mut self, score: String) {
        match self {
            Self::One(first) => *self = Self::Many(vec![std::mem::take(first), score]),
            Self::Many(scores) => scores.push(score),
        }
    }

    fn into_vec(self) -> Vec<String> {
        match self {
            Self::One(score) => vec![score],
            Self::Many(scores) => scores,
        }
    }
}

#[derive(Default)]
struct EditionTables<'a> {
    tracks: BTreeMap<&'a str, &'a Track>,
    runs: BTreeMap<&'a str, Vec<&'a Run>>,
    participants: BTreeMap<&'a str, &'a Participant>,
    publications: BTreeMap<&'a str, BTreeMap<&'a str, &'a Publication>>,
    datasets: BTreeMap<&'a str, &'a Dataset>,
    results: ResultsTree,
}

fn group_by_edition(tables: &Tables) -> BTreeMap<&str, EditionTables<'_>> {
    let mut editions: BTreeMap<&str, EditionTables<'_>> = BTreeMap::new();

    for track in &tables.tracks {
        editions
            .entry(&track.trec)
            .or_default()
            .tracks
            .insert(&track.track, track);
    }
    for run in &tables.runs {
        editions
            .entry(&run.trec)
            .or_default()
            .runs
            .entry(&run.track)
            .or_default()
            .push(run);
    }
    for participant in &tables.participants {
        editions
            .entry(&participant.trec)
            .or_default()
            .participants
            .insert(&participant.pid, participant);
    }
    for publication in &tables.publications {
        editions
            .entry(&publication.trec)
            .or_default()
            .publications
            .entry(&publication.track)
            .or_default()
            .insert(&publication.key, publication);
    }
    for dataset in &tables.datasets {
        editions
            .entry(&dataset.trec)
            .or_default()
            .datasets
            .insert(&dataset.track, dataset);
    }
    for row in &tables.results {
        editions
            .entry(&row.trec)
            .or_default()
            .results
            .entry(row.track.clone())
            .or_default()
            .entry(row.runid.clone())
            .or_default()
            .entry(row.eval.clone())
            .or_default()
            .entry(row.topic.clone())
            .or_default()
            .entry(row.measure.clone())
            .and_modify(|scores| scores.push(row.score.clone()))
            .or_insert_with(|| Scores::One(row.score.clone()));
    }

    editions
}

fn write_table<T: Serialize>(dir: &Path, name: &str, value: &T) -> Result<()> {
    write_json_pretty(&dir.join(format!("{name}.json")), value)
}

/// Writes `<root>/<edition>/{tracks,runs,participants,publications,datasets,results}.json`.
pub fn write_json_dir(root: &Path, tables: &Tables) -> Result<usize> {
    ensure_directory(root)?;
    let editions = group_by_edition(tables);

    for (trec, edition) in &editions {
        let dir = root.join(trec);
        ensure_directory(&dir)?;
        write_table(&dir, "tracks", &edition.tracks)?;
        write_table(&dir, "runs", &edition.runs)?;
        write_table(&dir, "participants", &edition.participants)?;
        write_table(&dir, "publications", &edition.publications)?;
        write_table(&dir, "datasets", &edition.datasets)?;
        write_table(&dir, "results", &edition.results)?;
    }

    info!(root = %root.display(), editions = editions.len(), "wrote json metadata directory");
    Ok(editions.len())
}

fn read_table<T: DeserializeOwned + Default>(dir: &Path, name: &str) -> Result<T> {
    let path = dir.join(format!("{name}.json"));
    if !path.exists() {
        return Ok(T::default());
    }
    read_json(&path)
}

/// Loads every edition directory under `root` back into tables.
pub fn read_json_dir(root: &Path) -> Result<Tables> {
    let mut tables = Tables::default();
    let entries =
        fs::read_dir(root).with_context(|| format!("failed to list {}", root.display()))?;

    let mut dirs = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("failed to list {}", root.display()))?;
        if entry.file_type().is_ok_and(|kind| kind.is_dir()) {
            dirs.push(entry.path());
        }
    }
    dirs.sort();

    for dir in &dirs {
        let tracks: BTreeMap<String, Track> = read_table(dir, "tracks")?;
        tables.tracks.extend(tracks.into_values());

        let runs: BTreeMap<String, Vec<Run>> = read_table(dir, "runs")?;
        tables.runs.extend(runs.into_values().flatten());

        let participants: BTreeMap<String, Participant> = read_table(dir, "participants")?;
        tables.participants.extend(participants.into_values());

        let publications: BTreeMap<String, BTreeMap<String, Publication>> =
            read_table(dir, "publications")?;
        tables
            .publications
            .extend(publications.into_values().flat_map(BTreeMap::into_values));

        let datasets: BTreeMap<String, Dataset> = read_table(dir, "datasets")?;
        tables.datasets.extend(datasets.into_values());

        let trec = dir
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let results: ResultsTree = read_table(dir, "results")?;
        for (track, runs) in results {
            for (runid, evals) in runs {
                for (eval, topics) in evals {
                    for (topic, measures) in topics {
                        for (measure, scores) in measures {
                            for score in scores.into_vec() {
                                tables.results.push(ResultRow {
                                    trec: trec.clone(),
                                    track: track.clone(),
                                    runid: runid.clone(),
                                    eval: eval.clone(),
                                    topic: topic.clone(),
                                    measure: measure.clone(),
                                    score,
                                });
                            }
                        }
                    }
                }
            }
        }
    }

    for run in &mut tables.runs {
        run.input_url = run.input_url.take().and_then(Link::normalized);
        run.summary_url = run.summary_url.take().and_then(Link::normalized);
        run.appendix_url = run.appendix_url.take().and_then(Link::normalized);
    }
    tables.normalize();
    info!(root = %root.display(), editions = dirs.len(), "read json metadata directory");
    Ok(tables)
}
