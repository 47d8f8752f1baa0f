use super::*;

/// A rendered page, relative to the docs root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct Page {
    pub(super) path: PathBuf,
    pub(super) content: String,
}

impl Page {
    pub(super) fn new(path: impl Into<PathBuf>, content: String) -> Self {
        Self {
            path: path.into(),
            content,
        }
    }
}

/// The sub-pages a track can have, in quick-access order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum TrackPage {
    Overview,
    Proceedings,
    Data,
    Results,
    Runs,
    Participants,
}

impl TrackPage {
    pub(super) fn file_name(self) -> &'static str {
        match self {
            Self::Overview => "overview.md",
            Self::Proceedings => "proceedings.md",
            Self::Data => "data.md",
            Self::Results => "results.md",
            Self::Runs => "runs.md",
            Self::Participants => "participants.md",
        }
    }

    pub(super) fn label(self) -> &'static str {
        match self {
            Self::Overview => "Overview",
            Self::Proceedings => "Proceedings",
            Self::Data => "Data",
            Self::Results => "Results",
            Self::Runs => "Runs",
            Self::Participants => "Participants",
        }
    }

    pub(super) fn is_available(self, absence: &AbsenceSets, trec: &str, track: &str) -> bool {
        match self {
            Self::Overview => true,
            Self::Proceedings => absence.has_proceedings(trec, track),
            Self::Data => absence.has_data(trec, track),
            Self::Results => absence.has_summary(trec, track),
            Self::Runs => absence.has_runs(trec, track),
            Self::Participants => absence.has_participants(trec, track),
        }
    }
}

const QUICK_ACCESS_ORDER: [TrackPage; 5] = [
    TrackPage::Proceedings,
    TrackPage::Data,
    TrackPage::Results,
    TrackPage::Runs,
    TrackPage::Participants,
];

/// ``[`Proceedings`](./proceedings.md) | ...`` for the pages a track has.
/// `prefix` is the path from the linking page to the track directory.
pub(super) fn quick_access(
    absence: &AbsenceSets,
    trec: &str,
    track: &str,
    prefix: &str,
    with_overview: bool,
) -> String {
    let overview = with_overview.then_some(TrackPage::Overview);
    overview
        .into_iter()
        .chain(QUICK_ACCESS_ORDER)
        .filter(|page| page.is_available(absence, trec, track))
        .map(|page| format!("[`{}`]({prefix}{})", page.label(), page.file_name()))
        .collect::<Vec<_>>()
        .join(" | ")
}

/// Markdown for an artifact link. A labeled link renders one entry per
/// label; a plain URL shows `single_key` as its text when given.
pub(super) fn link_markdown(link: &Link, bold: bool, single_key: Option<&str>) -> String {
    let label = |text: &str| {
        if bold {
            format!("**`{text}`**")
        } else {
            format!("`{text}`")
        }
    };
    match link {
        Link::Url(url) => format!("[{}]({url})", label(single_key.unwrap_or(url))),
        Link::Labeled(entries) => entries
            .iter()
            .map(|(key, url)| format!("[{}]({url})", label(key)))
            .collect::<Vec<_>>()
            .join(" | "),
    }
}

pub(super) fn heading(level: usize, text: &str, id: &str) -> String {
    format!("{} {text} {{#{id}}}\n", "#".repeat(level))
}

/// Critic-markup highlighted description block.
pub(super) fn description_block(description: Option<&str>) -> String {
    format!("{{==\n\n{}\n\n==}}\n\n", description.unwrap_or_default())
}

/// Colon-separated coordinator list as bullets.
pub(super) fn coordinators_block(coordinators: Option<&str>) -> String {
    let Some(coordinators) = coordinators else {
        return String::new();
    };
    let bullets = coordinators
        .split(':')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(|name| format!("- {name}"))
        .collect::<Vec<_>>();
    if bullets.is_empty() {
        return String::new();
    }
    format!(
        ":fontawesome-solid-user-group: **Track coordinator(s):**\n\n{}\n\n",
        bullets.join("\n")
    )
}

pub(super) fn webpage_block(webpage: Option<&str>) -> String {
    webpage
        .map(|url| format!(":fontawesome-solid-globe: **Track Web Page:** [`{url}`]({url})\n\n"))
        .unwrap_or_default()
}

pub(super) fn abstract_block(abstract_text: Option<&str>) -> String {
    abstract_text
        .map(|text| format!("??? abstract \"Abstract\"\n\t\n\t{text}\n\t\n\n"))
        .unwrap_or_default()
}

pub(super) fn bibtex_block(bibtex: Option<&str>, biburl: Option<&str>) -> String {
    let Some(bibtex) = bibtex else {
        return String::new();
    };
    let bibtex = bibtex.trim().replace('\n', "\n\t");
    format!(
        "??? quote \"Bibtex [:material-link-variant:]({})\"\n\t```\n\t{bibtex}\n\t```\n\n",
        biburl.unwrap_or_default()
    )
}

/// `# {kind} - {track name} {year}` page title.
pub(super) fn track_title(kind: &str, track: &Track) -> String {
    format!(
        "# {kind} - {} {}\n\n",
        track.display_name(),
        edition_year(&track.trec).unwrap_or_default()
    )
}
