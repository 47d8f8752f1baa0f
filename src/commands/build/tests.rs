use super::*;
use super::run::build_pages;

fn track(trec: &str, name: &str, fullname: &str) -> Track {
    Track {
        trec: trec.to_string(),
        track: name.to_string(),
        fullname: Some(fullname.to_string()),
        ..Track::default()
    }
}

fn run_row(trec: &str, track: &str, runid: &str, pid: &str) -> Run {
    Run {
        trec: trec.to_string(),
        track: track.to_string(),
        runid: runid.to_string(),
        pid: pid.to_string(),
        year: edition_year(trec).unwrap_or_default(),
        ..Run::default()
    }
}

fn summary_row(trec: &str, track: &str, runid: &str, eval: &str, score: &str) -> ResultRow {
    ResultRow {
        trec: trec.to_string(),
        track: track.to_string(),
        runid: runid.to_string(),
        eval: eval.to_string(),
        topic: "all".to_string(),
        measure: "summary".to_string(),
        score: score.to_string(),
    }
}

const DEEP_PAPER: &str = "Dense Retrieval at Scale: Café Notes";

fn fixture() -> Tables {
    let mut deep = track("trec30", "deep", "Deep Learning");
    deep.description = Some("Ranking with large training data.".to_string());
    deep.coordinators = Some("Nick Craswell:Bhaskar Mitra".to_string());
    deep.tasks = Some(BTreeMap::from([("docs".to_string(), "Document ranking".to_string())]));
    deep.webpage = Some("https://microsoft.github.io/msmarco/".to_string());

    let mut round1 = track(COVID_EDITION, "round1", "Round 1");
    round1.description = Some("Pandemic retrieval.".to_string());

    let mut run_a = run_row("trec30", "deep", "runA", "org1");
    run_a.summary_url = Some(Link::Url(
        "https://trec.nist.gov/results/trec30/deep/summary.trec_eval.runA".to_string(),
    ));
    run_a.md5 = Some("d41d8cd98f00b204e9800998ecf8427e".to_string());
    run_a.other = Some(BTreeMap::from([(
        "repository".to_string(),
        "https://github.com/org1/code".to_string(),
    )]));

    let mut session_rl1 = run_row("trec22", "session", "s1.RL1", "org1");
    session_rl1.summary_url = Some(Link::Url("https://example.org/summary.s1".to_string()));
    let session_rl2 = run_row("trec22", "session", "s1.RL2", "org1");

    Tables {
        tracks: vec![
            deep,
            track("trec30", "fair", "Fair Ranking"),
            track("trec28", "cast", "Conversational Assistance"),
            track("trec22", "session", "Session"),
            track("trec2", "adhoc", "Ad Hoc"),
            round1,
            track(COVID_EDITION, "round2", "Round 2"),
        ],
        runs: vec![
            run_a,
            run_row("trec30", "deep", "runB", "org2"),
            run_row("trec28", "cast", "castRun", "org3"),
            session_rl1,
            session_rl2,
        ],
        participants: vec![Participant {
            trec: "trec30".to_string(),
            pid: "org1".to_string(),
            organization: Some("Example University".to_string()),
            name: Some("Jane Doe".to_string()),
        }],
        publications: vec![
            Publication {
                trec: "trec30".to_string(),
                track: "deep".to_string(),
                key: "org1paper".to_string(),
                pid: "org1".to_string(),
                title: Some(DEEP_PAPER.to_string()),
                author: Some("Jane Doe".to_string()),
                abstract_text: Some("We scale.".to_string()),
                url: Some("https://trec.nist.gov/pubs/trec30/papers/org1.pdf".to_string()),
                bibtex: Some("@inproceedings{org1paper,\n  title = {x}\n}".to_string()),
                ..Publication::default()
            },
            Publication {
                trec: "trec30".to_string(),
                track: "deep".to_string(),
                key: "overview30".to_string(),
                pid: OVERVIEW_PID.to_string(),
                title: Some("Overview of the Deep Learning Track".to_string()),
                ..Publication::default()
            },
        ],
        datasets: vec![Dataset {
            trec: "trec30".to_string(),
            track: "deep".to_string(),
            corpus: Some(Link::Url("https://msmarco.blob.core.windows.net/".to_string())),
            trec_webpage: Some(Link::Url("https://trec.nist.gov/data/deep2021.html".to_string())),
            ..Dataset::default()
        }],
        results: vec![
            summary_row("trec30", "deep", "runA", "trec_eval", "\tmap\t\t\t\tall\t0.1234\n"),
            summary_row("trec22", "session", "s1", "RL1", "\tmap all 0.2\n"),
            summary_row("trec22", "session", "s1", "RL2", "\tmap all 0.3\n"),
        ],
    }
}

fn page_catalog() -> PageCatalog {
    embedded_page_catalog().expect("embedded page catalog parses")
}

fn rendered(pages: Vec<Result<Page>>) -> BTreeMap<String, String> {
    pages
        .into_iter()
        .map(|page| page.expect("page renders"))
        .map(|page| (page.path.to_string_lossy().replace('\\', "/"), page.content))
        .collect()
}

#[test]
fn anchors_slug_identifiers_and_titles() {
    assert_eq!(anchor_slug("UoG.Run_1-b"), "uogrun_1-b");
    assert_eq!(title_id("Überblick: The 2021 Track!"), "uberblick-the-2021-track");
    assert_eq!(title_id("2021 Overview of QA"), "overview-of-qa");
    assert_eq!(title_id(DEEP_PAPER), "dense-retrieval-at-scale-cafe-notes");
    assert_eq!(results_anchor("session", "CWI.run.RL2"), "cwirun");
    assert_eq!(results_anchor("web", "CWI.run.RL2"), "cwirunrl2");
}

#[test]
fn edition_without_runs_gets_overview_and_bare_navigation() {
    let tables = fixture();
    let catalog = page_catalog();
    let site = SiteData::new(&tables, &catalog);

    let pages = rendered(edition_pages(&site, "trec2"));
    assert_eq!(
        pages.keys().map(String::as_str).collect::<Vec<_>>(),
        vec!["trec2/adhoc/overview.md", "trec2/overview.md"]
    );
    assert!(pages["trec2/overview.md"].starts_with("# Text REtrieval Conference (TREC) 1993\n\n## Ad Hoc\n"));

    let nav = navigation(&site);
    let trec2 = nav
        .iter()
        .find_map(|entry| entry.get("TREC-2 (1993)"))
        .expect("trec2 nav entry");
    let expected = NavItem::Section(vec![
        BTreeMap::from([(
            "Overview".to_string(),
            NavItem::Page("trec2/overview.md".to_string()),
        )]),
        BTreeMap::from([(
            "Ad Hoc".to_string(),
            NavItem::Section(vec![BTreeMap::from([(
                "Overview".to_string(),
                NavItem::Page("trec2/adhoc/overview.md".to_string()),
            )])]),
        )]),
    ]);
    assert_eq!(trec2, &expected);
}

#[test]
fn navigation_lists_editions_newest_first() {
    let tables = fixture();
    let catalog = page_catalog();
    let site = SiteData::new(&tables, &catalog);

    let labels: Vec<String> = navigation(&site)
        .iter()
        .flat_map(|entry| entry.keys().cloned())
        .collect();
    assert_eq!(
        labels,
        vec!["Home", "TREC-30 (2021)", "TREC-COVID", "TREC-28 (2019)", "TREC-22 (2013)", "TREC-2 (1993)"]
    );
}

#[test]
fn track_pages_link_runs_results_participants_and_papers() {
    let tables = fixture();
    let catalog = page_catalog();
    let site = SiteData::new(&tables, &catalog);
    let deep = site.track("trec30", "deep").expect("deep track");
    let pages = rendered(track_pages(&site, deep));

    let overview = &pages["trec30/deep/overview.md"];
    assert!(overview.starts_with("# Overview - Deep Learning 2021\n\n[`Proceedings`](./proceedings.md) | [`Data`](./data.md) | [`Results`](./results.md) | [`Runs`](./runs.md) | [`Participants`](./participants.md)\n\n"));
    assert!(overview.contains("- Nick Craswell\n- Bhaskar Mitra\n"));
    assert!(overview.contains("- `docs`: Document ranking\n"));

    let runs = &pages["trec30/deep/runs.md"];
    assert!(runs.contains("#### runA {#runa}\n[**`Results`**](./results.md#runa) | [**`Participants`**](./participants.md#org1) | [**`Proceedings`**](./proceedings.md#dense-retrieval-at-scale-cafe-notes) | [**`Summary`**](https://trec.nist.gov/results/trec30/deep/summary.trec_eval.runA)\n"));
    assert!(runs.contains("- :material-fingerprint: **MD5:** `d41d8cd98f00b204e9800998ecf8427e`\n"));
    assert!(runs.contains("- :material-code-braces: **Code:** [https://github.com/org1/code](https://github.com/org1/code)\n"));
    assert!(runs.find("#### runA").expect("runA") < runs.find("#### runB").expect("runB"));

    let proceedings = &pages["trec30/deep/proceedings.md"];
    let overview_at = proceedings.find("Overview of the Deep Learning Track").expect("overview paper");
    let paper_at = proceedings.find(DEEP_PAPER).expect("participant paper");
    assert!(overview_at < paper_at);
    assert!(proceedings.contains("- :fontawesome-solid-user-group: **Participant:** [org1](./participants.md#org1)\n"));
    assert!(proceedings.contains("\t```\n\t@inproceedings{org1paper,\n\t  title = {x}\n\t}\n\t```\n"));

    let participants = &pages["trec30/deep/participants.md"];
    assert!(participants.contains("#### org1 {#org1}\n- :fontawesome-solid-user-group: **Name:** Jane Doe\n"));
    assert!(participants.contains("#### org2 {#org2}\n- :material-format-list-bulleted: **Runs:** [runB](./runs.md#runb)\n"));

    let data = &pages["trec30/deep/data.md"];
    assert!(data.contains(":fontawesome-solid-globe: **`trec.nist.gov`**: [`https://trec.nist.gov/data/deep2021.html`](https://trec.nist.gov/data/deep2021.html)\n"));
    assert!(data.contains(":material-database: **Corpus:**"));
}

#[test]
fn results_page_shows_the_summary_block() {
    let tables = fixture();
    let catalog = page_catalog();
    let site = SiteData::new(&tables, &catalog);
    let deep = site.track("trec30", "deep").expect("deep track");
    let pages = rendered(track_pages(&site, deep));

    let results = &pages["trec30/deep/results.md"];
    assert!(results.starts_with("---\nsearch:\n  exclude: true\n---\n\n# Results - Deep Learning 2021\n\n"));
    assert!(results.contains("#### runA {#runa}\n[**`Metadata`**](./runs.md#runa)"));
    assert!(results.contains("??? example \"summary (trec_eval)\"\n\t```\n\tmap\t\t\t\tall\t0.1234\n\t```\n"));
    assert!(!results.contains("#### runB"));
}

#[test]
fn session_levels_share_one_block() {
    let tables = fixture();
    let catalog = page_catalog();
    let site = SiteData::new(&tables, &catalog);
    let session = site.track("trec22", "session").expect("session track");
    let pages = rendered(track_pages(&site, session));

    let runs = &pages["trec22/session/runs.md"];
    assert_eq!(runs.matches("#### ").count(), 1);
    assert!(runs.contains("#### s1 {#s1}\n"));

    let results = &pages["trec22/session/results.md"];
    assert_eq!(results.matches("#### ").count(), 1);
    assert!(results.contains("summary (RL1)"));
    assert!(results.contains("summary (RL2)"));
}

#[test]
fn renamed_track_pages_live_under_the_new_name() {
    let tables = fixture();
    let catalog = page_catalog();
    let site = SiteData::new(&tables, &catalog);
    let pages = rendered(edition_pages(&site, "trec28"));

    assert!(pages.contains_key("trec28/cast/runs.md"));
    assert!(pages.contains_key("trec28/cast/participants.md"));
    assert!(pages["trec28/cast/runs.md"].contains("#### castRun {#castrun}\n"));
    assert!(pages.keys().all(|path| !path.contains("converse")));
}

#[test]
fn covid_overview_lists_rounds_without_proceedings() {
    let tables = fixture();
    let catalog = page_catalog();
    let site = SiteData::new(&tables, &catalog);
    let pages = rendered(edition_pages(&site, COVID_EDITION));

    let overview = &pages["trec-covid/overview.md"];
    assert!(overview.starts_with("# TREC-COVID 2020\n\n**Round 1:** [`Overview`](./round1/overview.md)"));
    assert!(overview.contains("**Round 2:** [`Overview`](./round2/overview.md)"));
    assert!(overview.contains("Pandemic retrieval."));
    assert!(!pages.contains_key("trec-covid/proceedings.md"));
}

#[test]
fn missing_upstream_row_fails_only_that_page() {
    let mut tables = fixture();
    tables.tracks.retain(|row| row.track != "round1");
    let catalog = page_catalog();
    let site = SiteData::new(&tables, &catalog);

    let pages = edition_pages(&site, COVID_EDITION);
    assert!(pages[0].is_err());
    assert!(pages[1..].iter().all(Result::is_ok));
}

#[test]
fn landing_pages_group_tracks_by_name() {
    let tables = fixture();
    let catalog = page_catalog();
    let site = SiteData::new(&tables, &catalog);

    let index = index_page(&site);
    assert!(index.content.contains("#### Deep Learning\n[`TREC-30 (2021)`](./trec30/deep/overview.md)\n"));
    assert!(!index.content.contains("trec-covid"));
    let ad_hoc = index.content.find("#### Ad Hoc").expect("ad hoc group");
    let session = index.content.find("#### Session").expect("session group");
    assert!(ad_hoc < session);

    let data = data_index_page(&site);
    assert!(data.content.starts_with("# Data\n\n"));
    assert!(data.content.contains("#### Deep Learning\n[`TREC-30 (2021)`](./trec30/deep/data.md)\n"));
    assert!(!data.content.contains("Ad Hoc"));
}

#[test]
fn mkdocs_config_keeps_python_tags_unquoted() {
    let tables = fixture();
    let catalog = page_catalog();
    let site = SiteData::new(&tables, &catalog);
    let config = mkdocs_config(&site).expect("config renders");

    assert!(config.contains("site_name: TREC Browser"));
    assert!(config.contains("emoji_index: !!python/name:material.extensions.emoji.twemoji"));
    assert!(config.contains("nav:"));
    assert!(config.contains("not_in_nav:"));
    assert!(config.contains("trec30/deep/results.md"));
}

#[test]
fn build_all_writes_pages_config_and_manifest() {
    let temp = tempfile::tempdir().expect("tempdir");
    let metadata_root = temp.path().join("metadata");
    store::write_json_dir(&metadata_root, &fixture()).expect("write metadata");

    let source = PageSourceArgs {
        from: TableSource::Json,
        metadata_root,
        db_path: temp.path().join("trec.sqlite"),
        docs_root: temp.path().join("docs"),
        mkdocs_path: temp.path().join("mkdocs.yml"),
        manifest_dir: temp.path().join("manifests"),
    };

    let manifest = build_pages(&source, None).expect("build-all succeeds");
    assert_eq!(manifest.status, "completed");
    assert_eq!(manifest.pages_failed, 0);
    assert_eq!(manifest.editions.first().map(String::as_str), Some("trec30"));
    assert!(source.docs_root.join("index.md").is_file());
    assert!(source.docs_root.join("data.md").is_file());
    assert!(source.docs_root.join("trec30/deep/results.md").is_file());
    assert!(source.docs_root.join("trec30/proceedings.md").is_file());
    assert!(!source.docs_root.join("trec2/adhoc/runs.md").exists());
    assert!(source.mkdocs_path.is_file());

    let manifests = std::fs::read_dir(&source.manifest_dir)
        .expect("manifest dir")
        .count();
    assert_eq!(manifests, 1);

    let single = build_pages(&source, Some("trec2")).expect("single edition build");
    assert_eq!(single.editions, vec!["trec2".to_string()]);
    assert!(build_pages(&source, Some("trec99")).is_err());
}

#[test]
fn build_from_missing_source_is_fatal() {
    let temp = tempfile::tempdir().expect("tempdir");
    let source = PageSourceArgs {
        from: TableSource::Sqlite,
        metadata_root: temp.path().join("metadata"),
        db_path: temp.path().join("missing.sqlite"),
        docs_root: temp.path().join("docs"),
        mkdocs_path: temp.path().join("mkdocs.yml"),
        manifest_dir: temp.path().join("manifests"),
    };
    assert!(build_pages(&source, None).is_err());
}

#[test]
fn papers_link_participants_only_when_they_have_runs_in_the_track() {
    let mut tables = fixture();
    tables.participants.push(Participant {
        trec: "trec30".to_string(),
        pid: "org9".to_string(),
        organization: Some("No Runs Lab".to_string()),
        name: None,
    });
    tables.publications.push(Publication {
        trec: "trec30".to_string(),
        track: "deep".to_string(),
        key: "org9paper".to_string(),
        pid: "org9".to_string(),
        title: Some("Notes Without Runs".to_string()),
        ..Publication::default()
    });
    let catalog = page_catalog();
    let site = SiteData::new(&tables, &catalog);
    let deep = site.track("trec30", "deep").expect("deep track");
    let pages = rendered(track_pages(&site, deep));

    let proceedings = &pages["trec30/deep/proceedings.md"];
    assert!(proceedings.contains("#### Notes Without Runs {#notes-without-runs}"));
    assert!(!proceedings.contains("participants.md#org9"));
    assert!(proceedings.contains("participants.md#org1"));
    assert!(!pages["trec30/deep/participants.md"].contains("{#org9}"));
}

#[test]
fn session_runs_page_keeps_every_level() {
    let mut tables = fixture();
    for run in tables.runs.iter_mut().filter(|run| run.track == "session") {
        run.input_url = Some(Link::Url(format!("https://example.org/input.{}", run.runid)));
        run.md5 = Some(format!("{:0>32}", run.runid.len()));
    }
    tables
        .runs
        .iter_mut()
        .filter(|run| run.runid == "s1.RL2")
        .for_each(|run| run.description = Some("second\nlevel".to_string()));
    let catalog = page_catalog();
    let site = SiteData::new(&tables, &catalog);
    let session = site.track("trec22", "session").expect("session track");
    let pages = rendered(track_pages(&site, session));

    let runs = &pages["trec22/session/runs.md"];
    assert_eq!(runs.matches("#### ").count(), 1);
    assert!(runs.contains("#### s1 {#s1}\n[**`Results`**](./results.md#s1)"));
    assert!(runs.contains("**`s1.RL1`** [**`Input`**](https://example.org/input.s1.RL1)"));
    assert!(runs.contains("**`s1.RL2`** [**`Input`**](https://example.org/input.s1.RL2)"));
    assert!(runs.contains("- :material-text: **Run description:** second level\n"));
    assert_eq!(runs.matches(":material-fingerprint:").count(), 2);
}
