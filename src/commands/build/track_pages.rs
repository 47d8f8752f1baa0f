use super::*;

/// Every page of one track. Each entry fails on its own when an upstream
/// row it needs is missing.
pub(super) fn track_pages(site: &SiteData<'_>, track: &Track) -> Vec<Result<Page>> {
    let (trec, name) = (track.trec.as_str(), track.track.as_str());
    let absence = &site.absence;
    let mut pages = vec![Ok(overview_page(site, track))];

    if absence.has_proceedings(trec, name) {
        pages.push(Ok(proceedings_page(site, track)));
    }
    if absence.has_runs(trec, name) {
        pages.push(Ok(runs_page(site, track)));
    }
    if absence.has_summary(trec, name) {
        pages.push(Ok(results_page(site, track)));
    }
    if absence.has_participants(trec, name) {
        pages.push(Ok(participants_page(site, track)));
    }
    if absence.has_data(trec, name) {
        pages.push(data_page(site, track));
    }
    pages
}

pub(super) fn track_page_path(trec: &str, track: &str, page: TrackPage) -> PathBuf {
    PathBuf::from(trec).join(track).join(page.file_name())
}

fn overview_page(site: &SiteData<'_>, track: &Track) -> Page {
    let mut content = track_title("Overview", track);
    let quick = quick_access(&site.absence, &track.trec, &track.track, "./", false);
    if !quick.is_empty() {
        content.push_str(&format!("{quick}\n\n"));
    }
    content.push_str(&description_block(track.description.as_deref()));
    content.push_str(&coordinators_block(track.coordinators.as_deref()));
    content.push_str(&tasks_block(track.tasks.as_ref()));
    content.push_str(&webpage_block(track.webpage.as_deref()));
    content.push_str("---\n\n");
    Page::new(track_page_path(&track.trec, &track.track, TrackPage::Overview), content)
}

fn tasks_block(tasks: Option<&BTreeMap<String, String>>) -> String {
    let Some(tasks) = tasks.filter(|tasks| !tasks.is_empty()) else {
        return String::new();
    };
    let mut block = String::from(":material-text-search: **Tasks:**\n\n");
    for (key, value) in tasks {
        block.push_str(&format!("- `{key}`: {value}\n"));
    }
    block.push('\n');
    block
}

fn proceedings_page(site: &SiteData<'_>, track: &Track) -> Page {
    let mut content = track_title("Proceedings", track);
    let publications = site.publications_of(&track.trec, &track.track);
    let (overviews, papers): (Vec<&Publication>, Vec<&Publication>) = publications
        .iter()
        .copied()
        .partition(|publication| is_overview_paper(&publication.pid));
    for publication in overviews.into_iter().chain(papers) {
        content.push_str(&paper_section(site, publication, "./", 4));
    }
    Page::new(
        track_page_path(&track.trec, &track.track, TrackPage::Proceedings),
        content,
    )
}

/// One paper: title heading, authors, links, abstract and bibtex.
/// `prefix` points from the rendering page into the track directory.
pub(super) fn paper_section(
    site: &SiteData<'_>,
    publication: &Publication,
    prefix: &str,
    level: usize,
) -> String {
    let (trec, track, pid) = (
        publication.trec.as_str(),
        publication.track.as_str(),
        publication.pid.as_str(),
    );
    let title = publication.title.as_deref().unwrap_or(&publication.key);
    let mut section = format!("{}\n", heading(level, title, &title_id(title)));

    if let Some(author) = publication.author.as_deref() {
        section.push_str(&format!("_{author}_\n\n"));
    }
    if let Some(url) = publication.url.as_deref() {
        section.push_str(&format!("- :material-file-pdf-box: **Paper:** [{url}]({url})\n"));
    }
    if let Some(doi) = publication.doi.as_deref() {
        section.push_str(&format!(
            "- :material-link-variant: **DOI:** [{doi}](https://doi.org/{doi})\n"
        ));
    }

    if !is_overview_paper(pid) {
        let has_runs = site.runs_of(trec, track).iter().any(|run| run.pid == pid);
        if has_runs && site.absence.has_participants(trec, track) {
            section.push_str(&format!(
                "- :fontawesome-solid-user-group: **Participant:** [{pid}]({prefix}participants.md#{})\n",
                anchor_slug(pid)
            ));
        }
        let runs = site
            .runs_of(trec, track)
            .iter()
            .filter(|run| run.pid == pid)
            .map(|run| {
                format!(
                    "[{}]({prefix}runs.md#{})",
                    run.runid,
                    anchor_slug(results_run_id(track, &run.runid))
                )
            })
            .collect::<Vec<_>>();
        if !runs.is_empty() {
            section.push_str(&format!(
                "- :material-format-list-bulleted: **Runs:** {}\n",
                runs.join(" | ")
            ));
        }
    }

    section.push('\n');
    section.push_str(&abstract_block(publication.abstract_text.as_deref()));
    section.push_str(&bibtex_block(
        publication.bibtex.as_deref(),
        publication.biburl.as_deref(),
    ));
    section
}

/// Runs grouped under the id their page block uses; on the session track
/// the reformulation levels share one block.
fn logical_runs<'a>(runs: &[&'a Run], track: &str) -> Vec<(&'a str, Vec<&'a Run>)> {
    let mut groups: Vec<(&str, Vec<&Run>)> = Vec::new();
    for run in runs.iter().copied() {
        let id = results_run_id(track, &run.runid);
        match groups.iter_mut().find(|(existing, _)| *existing == id) {
            Some((_, members)) => members.push(run),
            None => groups.push((id, vec![run])),
        }
    }
    groups
}

/// Page links shown under a run or results heading.
fn page_links(site: &SiteData<'_>, run: &Run, to: TrackPage) -> Vec<String> {
    let (trec, track) = (run.trec.as_str(), run.track.as_str());
    let anchor = results_anchor(track, &run.runid);
    let mut links = Vec::new();

    match to {
        TrackPage::Results if site.absence.has_summary(trec, track) => {
            links.push(format!("[**`Results`**](./results.md#{anchor})"));
        }
        TrackPage::Runs => links.push(format!("[**`Metadata`**](./runs.md#{anchor})")),
        _ => {}
    }
    if site.absence.has_participants(trec, track) {
        links.push(format!(
            "[**`Participants`**](./participants.md#{})",
            anchor_slug(&run.pid)
        ));
    }
    if let Some(title) = site
        .publication_for(trec, track, &run.pid)
        .and_then(|publication| publication.title.as_deref())
    {
        links.push(format!("[**`Proceedings`**](./proceedings.md#{})", title_id(title)));
    }
    links
}

/// Input, summary and appendix links of one physical run.
fn artifact_links(site: &SiteData<'_>, run: &Run) -> Vec<String> {
    let (trec, track) = (run.trec.as_str(), run.track.as_str());
    [
        ("Input", run.input_url.as_ref(), site.absence.has_input(trec, track)),
        ("Summary", run.summary_url.as_ref(), true),
        ("Appendix", run.appendix_url.as_ref(), site.absence.has_appendix(trec, track)),
    ]
    .into_iter()
    .filter_map(|(key, link, available)| {
        link.filter(|_| available)
            .map(|link| link_markdown(link, true, Some(key)))
    })
    .collect()
}

fn run_links(site: &SiteData<'_>, run: &Run, to: TrackPage) -> String {
    let mut links = page_links(site, run, to);
    links.extend(artifact_links(site, run));
    links.join(" | ")
}

/// Submission details of one physical run, as list items.
fn run_details(run: &Run) -> String {
    let mut details = String::new();
    if let Some(date) = run.date.as_deref() {
        details.push_str(&format!("- :material-upload: **Submission:** {date}\n"));
    }
    if let Some(run_type) = run.run_type.as_deref() {
        details.push_str(&format!("- :octicons-person-24: **Type:** {run_type}\n"));
    }
    if let Some(task) = run.task.as_deref() {
        details.push_str(&format!("- :octicons-book-24: **Task:** {task}\n"));
    }
    if let Some(md5) = run.md5.as_deref().filter(|md5| md5.len() == 32) {
        details.push_str(&format!("- :material-fingerprint: **MD5:** `{md5}`\n"));
    }
    if let Some(description) = run.description.as_deref() {
        details.push_str(&format!(
            "- :material-text: **Run description:** {}\n",
            description.replace('\n', " ")
        ));
    }
    if let Some(repository) = run.other.as_ref().and_then(|other| other.get("repository")) {
        details.push_str(&format!(
            "- :material-code-braces: **Code:** [{repository}]({repository})\n"
        ));
    }
    details
}

/// One block per logical run. Session levels keep their own links and
/// details under the shared heading.
fn runs_page(site: &SiteData<'_>, track: &Track) -> Page {
    let mut content = track_title("Runs", track);
    let year = edition_year(&track.trec).unwrap_or_default();

    for (id, members) in logical_runs(site.runs_of(&track.trec, &track.track), &track.track) {
        let Some(run) = members.first().copied() else {
            continue;
        };
        let shared = if let [single] = members.as_slice() {
            run_links(site, single, TrackPage::Results)
        } else {
            page_links(site, run, TrackPage::Results).join(" | ")
        };
        content.push_str(&heading(4, id, &anchor_slug(id)));
        content.push_str(&format!("{shared}\n\n"));
        content.push_str(&format!("- :material-rename: **Run ID:** {id}\n"));
        content.push_str(&format!(
            "- :fontawesome-solid-user-group: **Participant:** {}\n",
            run.pid
        ));
        content.push_str(&format!(
            "- :material-format-text: **Track:** {}\n",
            track.display_name()
        ));
        content.push_str(&format!("- :material-calendar: **Year:** {year}\n"));

        if members.len() == 1 {
            content.push_str(&run_details(run));
        } else {
            for member in &members {
                content.push_str(&format!(
                    "\n**`{}`** {}\n\n",
                    member.runid,
                    artifact_links(site, member).join(" | ")
                ));
                content.push_str(&run_details(member));
            }
        }
        content.push_str("\n---\n");
    }

    Page::new(track_page_path(&track.trec, &track.track, TrackPage::Runs), content)
}

fn results_page(site: &SiteData<'_>, track: &Track) -> Page {
    let mut content = String::from("---\nsearch:\n  exclude: true\n---\n\n");
    content.push_str(&track_title("Results", track));

    let mut by_run: BTreeMap<String, (&str, Vec<&ResultRow>)> = BTreeMap::new();
    for row in site.summaries_of(&track.trec, &track.track).iter().copied() {
        let id = results_run_id(&track.track, &row.runid);
        by_run
            .entry(id.to_lowercase())
            .or_insert_with(|| (id, Vec::new()))
            .1
            .push(row);
    }

    let runs = site.runs_of(&track.trec, &track.track);
    for (id, rows) in by_run.values() {
        content.push_str(&heading(4, id, &anchor_slug(id)));
        let run = runs
            .iter()
            .find(|run| results_run_id(&track.track, &run.runid) == *id);
        if let Some(run) = run {
            content.push_str(&format!("{}\n\n", run_links(site, run, TrackPage::Runs)));
        }
        for row in rows {
            content.push_str(&format!(
                "??? example \"summary ({})\"\n\t```\n{}\n\t```\n",
                row.eval,
                row.score.trim_end()
            ));
        }
        content.push_str("---\n");
    }

    Page::new(track_page_path(&track.trec, &track.track, TrackPage::Results), content)
}

fn participants_page(site: &SiteData<'_>, track: &Track) -> Page {
    let mut content = track_title("Participants", track);
    let runs = site.runs_of(&track.trec, &track.track);

    let mut pids: Vec<&str> = runs
        .iter()
        .map(|run| run.pid.as_str())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    pids.sort_by_key(|pid| pid.to_lowercase());

    for pid in pids {
        content.push_str(&heading(4, pid, &anchor_slug(pid)));
        let participant = site.participant(&track.trec, pid);
        if let Some(name) = participant.and_then(|row| row.name.as_deref()) {
            content.push_str(&format!("- :fontawesome-solid-user-group: **Name:** {name}\n"));
        }
        if let Some(organization) = participant.and_then(|row| row.organization.as_deref()) {
            content.push_str(&format!(
                "- :octicons-organization-24: **Organization:** {organization}\n"
            ));
        }
        let runs_of_pid = logical_runs(runs, &track.track)
            .into_iter()
            .filter(|(_, members)| members.iter().any(|run| run.pid == pid))
            .map(|(id, _)| format!("[{id}](./runs.md#{})", anchor_slug(id)))
            .collect::<Vec<_>>();
        content.push_str(&format!(
            "- :material-format-list-bulleted: **Runs:** {}\n",
            runs_of_pid.join(" | ")
        ));
        if let Some(title) = site
            .publication_for(&track.trec, &track.track, pid)
            .and_then(|publication| publication.title.as_deref())
        {
            content.push_str(&format!(
                "- :material-file-pdf-box: **Proceedings:** [{title}](./proceedings.md#{})\n",
                title_id(title)
            ));
        }
        content.push_str("\n---\n");
    }

    Page::new(
        track_page_path(&track.trec, &track.track, TrackPage::Participants),
        content,
    )
}

fn data_page(site: &SiteData<'_>, track: &Track) -> Result<Page> {
    let dataset = site.dataset(&track.trec, &track.track)?;
    let mut content = track_title("Data", track);

    if let Some(webpage) = dataset.trec_webpage.as_ref() {
        content.push_str(&format!(
            ":fontawesome-solid-globe: **`trec.nist.gov`**: {}\n\n---\n\n",
            link_markdown(webpage, false, None)
        ));
    }

    let mut listed = false;
    for (label, link) in [
        (":material-database: **Corpus:**", dataset.corpus.as_ref()),
        (":material-magnify: **Topics:**", dataset.topics.as_ref()),
        (":material-check-all: **Qrels:**", dataset.qrels.as_ref()),
        (":simple-python: **ir_datasets:**", dataset.ir_datasets.as_ref()),
    ] {
        if let Some(link) = link {
            content.push_str(&format!("{label} {}\n\n", link_markdown(link, false, None)));
            listed = true;
        }
    }
    if listed {
        content.push_str("\n---\n\n");
    }
    if let Some(other) = dataset.other.as_ref() {
        content.push_str(&format!("**Other:** {}\n", link_markdown(other, false, None)));
    }

    Ok(Page::new(
        track_page_path(&track.trec, &track.track, TrackPage::Data),
        content,
    ))
}
