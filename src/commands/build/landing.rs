use super::*;

const INDEX_HEADER: &str = "<center>\n\n<h1>Text REtrieval Conference (TREC)</h1>\n\n\
<img src=\"./assets/logo.png\" alt=\"logo\" width=\"50%\"/>\n\n\
[`Proceedings`](./proceedings.md) __|__ [`Data`](./data.md) __|__ [`trec.nist.gov`](https://trec.nist.gov/)\n\n\
<img src=\"./assets/tracks.png\" alt=\"tracks\"/>\n\n</center>\n\n";

const DATA_HEADER: &str = "# Data\n\n:fontawesome-solid-globe: **`trec.nist.gov`:** \
[`https://trec.nist.gov/data.html`](https://trec.nist.gov/data.html)\n\n";

/// Track names mapped to their per-edition links, ordered case-insensitively.
#[derive(Debug, Default)]
struct TrackGroups {
    groups: BTreeMap<String, (String, Vec<String>)>,
}

impl TrackGroups {
    fn push(&mut self, name: &str, link: String) {
        self.groups
            .entry(name.to_lowercase())
            .or_insert_with(|| (name.to_string(), Vec::new()))
            .1
            .push(link);
    }

    fn render(&self) -> String {
        self.groups
            .values()
            .map(|(name, links)| format!("#### {name}\n{}\n", links.join(" | ")))
            .collect()
    }
}

/// Landing page: every track with links to the editions that ran it.
pub(super) fn index_page(site: &SiteData<'_>) -> Page {
    let mut groups = TrackGroups::default();
    for track in site.all_tracks().filter(|track| !is_covid_edition(&track.trec)) {
        groups.push(
            track.display_name(),
            format!(
                "[`{}`](./{}/{}/overview.md)",
                edition_label(&track.trec),
                track.trec,
                track.track
            ),
        );
    }
    Page::new("index.md", format!("{INDEX_HEADER}{}", groups.render()))
}

/// Data landing page: tracks with data, plus the TREC-COVID rounds.
pub(super) fn data_index_page(site: &SiteData<'_>) -> Page {
    let mut groups = TrackGroups::default();
    for track in site.all_tracks() {
        if !site.absence.has_data(&track.trec, &track.track) {
            continue;
        }
        if is_covid_edition(&track.trec) {
            let round = track
                .track
                .strip_prefix("round")
                .map(|number| format!("Round {number}"))
                .unwrap_or_else(|| track.display_name().to_string());
            groups.push(
                "TREC-COVID",
                format!("[`{round}`]({COVID_EDITION}/{}/data.md)", track.track),
            );
        } else {
            groups.push(
                track.display_name(),
                format!(
                    "[`{}`](./{}/{}/data.md)",
                    edition_label(&track.trec),
                    track.trec,
                    track.track
                ),
            );
        }
    }
    Page::new("data.md", format!("{DATA_HEADER}{}", groups.render()))
}
