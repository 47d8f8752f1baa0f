use super::*;

use serde_json::Value;

/// Curated track description as stored in `json/tracks.json`.
#[derive(Debug, Default, Deserialize)]
struct CuratedTrack {
    #[serde(default)]
    fullname: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    coordinators: Option<String>,
    #[serde(default)]
    tasks: Option<Value>,
    #[serde(default)]
    webpage: Option<String>,
}

type ByEdition<T> = BTreeMap<String, BTreeMap<String, T>>;

fn text_of(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// A string becomes a URL, an object a labeled set; empty values are absent.
pub(super) fn link_from_value(value: &Value) -> Option<Link> {
    match value {
        Value::String(url) => non_empty(Some(url.as_str())).map(Link::Url),
        Value::Object(entries) if !entries.is_empty() => Some(Link::Labeled(
            entries
                .iter()
                .map(|(label, url)| (label.clone(), text_of(url)))
                .collect(),
        )),
        _ => None,
    }
}

fn tasks_from_value(value: Option<&Value>) -> Option<BTreeMap<String, String>> {
    match value? {
        Value::Object(entries) if !entries.is_empty() => Some(
            entries
                .iter()
                .map(|(task, description)| (task.clone(), text_of(description)))
                .collect(),
        ),
        _ => None,
    }
}

pub(super) fn load_tracks(path: &Path) -> Result<Vec<Track>> {
    let curated: ByEdition<CuratedTrack> = read_json(path)?;
    let mut tracks = Vec::new();
    for (trec, edition) in curated {
        for (track, fields) in edition {
            tracks.push(Track {
                trec: trec.clone(),
                track,
                fullname: non_empty(fields.fullname.as_deref()),
                description: non_empty(fields.description.as_deref()),
                coordinators: non_empty(fields.coordinators.as_deref()),
                tasks: tasks_from_value(fields.tasks.as_ref()),
                webpage: non_empty(fields.webpage.as_deref()),
            });
        }
    }
    Ok(tracks)
}

pub(super) fn load_datasets(path: &Path) -> Result<Vec<Dataset>> {
    let curated: ByEdition<BTreeMap<String, Value>> = read_json(path)?;
    let mut datasets = Vec::new();
    for (trec, edition) in curated {
        for (track, fields) in edition {
            let link = |name: &str| fields.get(name).and_then(link_from_value);
            datasets.push(Dataset {
                trec: trec.clone(),
                corpus: link("corpus"),
                topics: link("topics"),
                qrels: link("qrels"),
                ir_datasets: link("ir_datasets"),
                trec_webpage: link("trec_webpage"),
                other: link("other"),
                track,
            });
        }
    }
    Ok(datasets)
}
