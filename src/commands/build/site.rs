use super::*;

/// Rows keyed by edition, then by track or participant id.
type ByPair<'a, V> = BTreeMap<&'a str, BTreeMap<&'a str, V>>;

fn lookup<'m, V>(map: &'m ByPair<'_, V>, outer: &str, inner: &str) -> Option<&'m V> {
    map.get(outer).and_then(|entries| entries.get(inner))
}

/// The loaded tables indexed by edition and track, with the absence sets
/// that gate which pages and links exist.
pub(super) struct SiteData<'a> {
    pub(super) absence: AbsenceSets,
    pages: &'a PageCatalog,
    editions: Vec<&'a str>,
    tracks: BTreeMap<&'a str, Vec<&'a Track>>,
    runs: ByPair<'a, Vec<&'a Run>>,
    publications: ByPair<'a, Vec<&'a Publication>>,
    participants: ByPair<'a, &'a Participant>,
    datasets: ByPair<'a, &'a Dataset>,
    summaries: ByPair<'a, Vec<&'a ResultRow>>,
}

impl<'a> SiteData<'a> {
    pub(super) fn new(tables: &'a Tables, pages: &'a PageCatalog) -> Self {
        let mut tracks: BTreeMap<&str, Vec<&Track>> = BTreeMap::new();
        for track in &tables.tracks {
            tracks.entry(track.trec.as_str()).or_default().push(track);
        }
        let mut editions: Vec<&str> = tracks.keys().copied().collect();
        editions.sort_by(|a, b| edition_order(a, b));

        let mut runs: ByPair<'_, Vec<&Run>> = BTreeMap::new();
        for run in &tables.runs {
            runs.entry(run.trec.as_str())
                .or_default()
                .entry(run.track.as_str())
                .or_default()
                .push(run);
        }
        for track_runs in runs.values_mut().flat_map(BTreeMap::values_mut) {
            track_runs.sort_by_key(|run| run.runid.to_lowercase());
        }

        let mut publications: ByPair<'_, Vec<&Publication>> = BTreeMap::new();
        for publication in &tables.publications {
            publications
                .entry(publication.trec.as_str())
                .or_default()
                .entry(publication.track.as_str())
                .or_default()
                .push(publication);
        }

        let mut participants: ByPair<'_, &Participant> = BTreeMap::new();
        for participant in &tables.participants {
            participants
                .entry(participant.trec.as_str())
                .or_default()
                .entry(participant.pid.as_str())
                .or_insert(participant);
        }

        let mut datasets: ByPair<'_, &Dataset> = BTreeMap::new();
        for dataset in &tables.datasets {
            datasets
                .entry(dataset.trec.as_str())
                .or_default()
                .insert(dataset.track.as_str(), dataset);
        }

        let mut summaries: ByPair<'_, Vec<&ResultRow>> = BTreeMap::new();
        for row in tables.results.iter().filter(|row| row.measure == "summary") {
            summaries
                .entry(row.trec.as_str())
                .or_default()
                .entry(row.track.as_str())
                .or_default()
                .push(row);
        }

        Self {
            absence: AbsenceSets::compute(tables, pages),
            pages,
            editions,
            tracks,
            runs,
            publications,
            participants,
            datasets,
            summaries,
        }
    }

    /// Editions with at least one track, newest first.
    pub(super) fn editions(&self) -> &[&'a str] {
        &self.editions
    }

    pub(super) fn has_edition(&self, trec: &str) -> bool {
        self.tracks.contains_key(trec)
    }

    pub(super) fn tracks_of(&self, trec: &str) -> &[&'a Track] {
        self.tracks.get(trec).map(Vec::as_slice).unwrap_or_default()
    }

    pub(super) fn all_tracks(&self) -> impl Iterator<Item = &'a Track> + '_ {
        self.editions
            .iter()
            .flat_map(|trec| self.tracks_of(trec).iter().copied())
    }

    pub(super) fn track(&self, trec: &str, track: &str) -> Result<&'a Track> {
        self.tracks_of(trec)
            .iter()
            .find(|row| row.track == track)
            .copied()
            .with_context(|| format!("no track row for {trec}/{track}"))
    }

    /// Runs of a track, ordered by case-insensitive run id.
    pub(super) fn runs_of(&self, trec: &str, track: &str) -> &[&'a Run] {
        lookup(&self.runs, trec, track)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub(super) fn publications_of(&self, trec: &str, track: &str) -> &[&'a Publication] {
        lookup(&self.publications, trec, track)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// The paper a participant wrote for a track, if any.
    pub(super) fn publication_for(&self, trec: &str, track: &str, pid: &str) -> Option<&'a Publication> {
        self.publications_of(trec, track)
            .iter()
            .find(|publication| publication.pid == pid)
            .copied()
    }

    pub(super) fn participant(&self, trec: &str, pid: &str) -> Option<&'a Participant> {
        lookup(&self.participants, trec, pid).copied()
    }

    pub(super) fn dataset(&self, trec: &str, track: &str) -> Result<&'a Dataset> {
        lookup(&self.datasets, trec, track)
            .copied()
            .with_context(|| format!("no dataset row for {trec}/{track}"))
    }

    pub(super) fn summaries_of(&self, trec: &str, track: &str) -> &[&'a ResultRow] {
        lookup(&self.summaries, trec, track)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Editions listed in the page catalog get no proceedings page; others
    /// get one only when they have at least one paper.
    pub(super) fn has_edition_proceedings(&self, trec: &str) -> bool {
        !self
            .pages
            .editions_without_proceedings_page
            .iter()
            .any(|edition| edition == trec)
            && self
                .publications
                .get(trec)
                .is_some_and(|tracks| !tracks.is_empty())
    }
}
