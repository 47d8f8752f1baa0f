use super::*;

/// Edition-level pages followed by the pages of each of its tracks.
pub(super) fn edition_pages(site: &SiteData<'_>, trec: &str) -> Vec<Result<Page>> {
    let mut pages = vec![if is_covid_edition(trec) {
        covid_overview_page(site)
    } else {
        Ok(edition_overview_page(site, trec))
    }];
    if site.has_edition_proceedings(trec) {
        pages.push(Ok(edition_proceedings_page(site, trec)));
    }
    for track in site.tracks_of(trec) {
        pages.extend(track_pages(site, track));
    }
    pages
}

pub(super) fn edition_page_path(trec: &str, page: TrackPage) -> PathBuf {
    PathBuf::from(trec).join(page.file_name())
}

/// Tracks of an edition ordered by display name.
pub(super) fn tracks_by_name<'a>(site: &SiteData<'a>, trec: &str) -> Vec<&'a Track> {
    let mut tracks = site.tracks_of(trec).to_vec();
    tracks.sort_by_key(|track| track.display_name().to_lowercase());
    tracks
}

fn edition_overview_page(site: &SiteData<'_>, trec: &str) -> Page {
    let mut content = format!(
        "# Text REtrieval Conference (TREC) {}\n\n",
        edition_year(trec).unwrap_or_default()
    );
    for track in tracks_by_name(site, trec) {
        let prefix = format!("./{}/", track.track);
        content.push_str(&format!("## {}\n\n", track.display_name()));
        content.push_str(&format!(
            "{}\n\n",
            quick_access(&site.absence, trec, &track.track, &prefix, true)
        ));
        content.push_str(&description_block(track.description.as_deref()));
    }
    Page::new(edition_page_path(trec, TrackPage::Overview), content)
}

/// TREC-COVID ran in rounds; each round is a track with its own pages.
fn covid_overview_page(site: &SiteData<'_>) -> Result<Page> {
    let first_round = site.track(COVID_EDITION, "round1")?;
    let mut content = String::from("# TREC-COVID 2020\n\n");

    let mut rounds = site.tracks_of(COVID_EDITION).to_vec();
    rounds.sort_by(|a, b| a.track.cmp(&b.track));
    for round in rounds {
        let prefix = format!("./{}/", round.track);
        content.push_str(&format!(
            "**{}:** {}\n\n",
            round.display_name(),
            quick_access(&site.absence, COVID_EDITION, &round.track, &prefix, true)
        ));
    }

    content.push_str(&description_block(first_round.description.as_deref()));
    content.push_str(&coordinators_block(first_round.coordinators.as_deref()));
    content.push_str(&webpage_block(first_round.webpage.as_deref()));
    Ok(Page::new(
        edition_page_path(COVID_EDITION, TrackPage::Overview),
        content,
    ))
}

fn edition_proceedings_page(site: &SiteData<'_>, trec: &str) -> Page {
    let mut content = format!(
        "# Proceedings {}\n\n",
        edition_year(trec).unwrap_or_default()
    );

    for publication in site
        .publications_of(trec, OVERVIEW_PID)
        .iter()
        .filter(|publication| is_overview_paper(&publication.pid))
    {
        content.push_str(&paper_section(site, publication, "./", 2));
    }

    for track in tracks_by_name(site, trec) {
        let publications = site.publications_of(trec, &track.track);
        if publications.is_empty() {
            continue;
        }
        let prefix = format!("./{}/", track.track);
        content.push_str(&format!("## {}\n\n", track.display_name()));
        let (overviews, papers): (Vec<&Publication>, Vec<&Publication>) = publications
            .iter()
            .copied()
            .partition(|publication| is_overview_paper(&publication.pid));
        for publication in overviews.into_iter().chain(papers) {
            content.push_str(&paper_section(site, publication, &prefix, 3));
        }
    }

    Page::new(edition_page_path(trec, TrackPage::Proceedings), content)
}
