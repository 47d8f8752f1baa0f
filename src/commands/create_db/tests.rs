use super::*;

use crate::util::write_text;

fn books() -> RuleBooks {
    RuleBooks::embedded().expect("embedded rule books parse")
}

fn run_line(runid: &str, track: &str, run_type: &str, task: &str, md5: &str) -> String {
    [
        runid, "org", "a@b.c", track, run_type, "title", task, "2021-07-01", "", "", "", "yes", "",
        "", "", "BM25 baseline", md5, "",
    ]
    .join(":")
}

#[test]
fn table_parser_skips_noise_lines() {
    let books = books();
    let text = [
        "# header comment".to_string(),
        String::new(),
        run_line("DROPOUT-1", "deep", "auto", "docs", ""),
        run_line("runA", "deep", "auto", "registration", ""),
        run_line("runB", "proceedings", "auto", "docs", ""),
        run_line("runC", "deep", "auto", "docs", ""),
    ]
    .join("\n");

    let records = parse_table_text(&text, "trec30", TableSchema::Runs, &books.catalog);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].value_str("runid"), Some("runC"));
    assert_eq!(records[0].value_str("year"), Some("2021"));
}

#[test]
fn participant_lines_are_truncated_and_names_repaired() {
    let books = books();
    let line = "org:Example Univ:Jane:Doe:addr:ph:fax:ti:date:ad:tip:d4:d5:notes:extra:more";
    let records = parse_table_text(line, "trec8", TableSchema::Participants, &books.catalog);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].value_str("notes"), Some("notes"));

    let participant = participant_from_record(records[0].clone()).expect("participant");
    assert_eq!(participant.name.as_deref(), Some("Doe Jane"));
    assert_eq!(participant.organization.as_deref(), Some("Example Univ"));

    let records = parse_table_text(line, "trec16", TableSchema::Participants, &books.catalog);
    let participant = participant_from_record(records[0].clone()).expect("participant");
    assert_eq!(participant.name.as_deref(), Some("Jane"));
}

#[test]
fn duplicate_participants_keep_the_first_row() {
    let participant = |name: &str| Participant {
        trec: "trec-covid".to_string(),
        pid: "org".to_string(),
        organization: None,
        name: Some(name.to_string()),
    };
    let kept = dedup_participants(vec![participant("first"), participant("second")]);
    assert_eq!(kept.len(), 1);
    assert_eq!(kept[0].name.as_deref(), Some("first"));
}

#[test]
fn md5_is_kept_only_with_a_single_checksum() {
    let books = books();
    let assembler = RunAssembler::new(&books).expect("assembler");
    let assemble = |md5: &str| {
        let text = run_line("runA", "deep", "auto", "docs", md5);
        let record = parse_table_text(&text, "trec30", TableSchema::Runs, &books.catalog)
            .pop()
            .expect("record");
        assembler.assemble(record).expect("assembled").run.md5
    };

    assert_eq!(
        assemble("d41d8cd98f00b204e9800998ecf8427e").as_deref(),
        Some("d41d8cd98f00b204e9800998ecf8427e")
    );
    assert_eq!(assemble("bad"), None);
    assert_eq!(assemble(""), None);
}

#[test]
fn assembled_run_applies_renames_and_vocabularies() {
    let books = books();
    let assembler = RunAssembler::new(&books).expect("assembler");

    let text = run_line("castA", "converse", "automatic", "N/A", "");
    let record = parse_table_text(&text, "trec28", TableSchema::Runs, &books.catalog)
        .pop()
        .expect("record");
    let run = assembler.assemble(record).expect("assembled").run;
    assert_eq!(run.track, "cast");
    assert_eq!(run.run_type.as_deref(), Some("automatic"));
    assert_eq!(run.task, None);
    assert_eq!(run.year, 2019);
    assert_eq!(run.description.as_deref(), Some("BM25 baseline"));

    let text = run_line("deepA", "deep", "sideways", "docs", "");
    let record = parse_table_text(&text, "trec30", TableSchema::Runs, &books.catalog)
        .pop()
        .expect("record");
    let run = assembler.assemble(record).expect("assembled").run;
    assert_eq!(run.run_type, None);
    assert_eq!(run.task.as_deref(), Some("docs"));
    assert_eq!(
        run.summary_url,
        Some(Link::Url(
            "https://trec.nist.gov/results/trec30/deep/summary.treceval.deepA".to_string()
        ))
    );
}

#[test]
fn covid_runs_use_round_tracks_without_summaries() {
    let books = books();
    let assembler = RunAssembler::new(&books).expect("assembler");
    let text = "covidA:org:a@b.c:task:2020-05-01:automatic:1:yes:::covid run:d41d8cd98f00b204e9800998ecf8427e:";
    let record = parse_table_text(text, COVID_EDITION, TableSchema::CovidRuns, &books.catalog)
        .pop()
        .expect("record");

    let run = assembler
        .assemble_covid(record, "round2")
        .expect("assembled")
        .run;
    assert_eq!(run.track, "round2");
    assert_eq!(run.summary_url, None);
    assert_eq!(run.task, None);
    assert_eq!(run.year, 2020);
}

#[test]
fn trec_eval_summary_yields_rows_and_summary_block() {
    let books = books();
    let text = "runid\tall\tdeepA\nmap\tall\t0.1234\nP_10\tall\t0.5000\nmap\t301\t0.2\nbpref\tall\t0.3\n";
    let rows = parse_summary_file(&books.catalog, "trec30", "deep", "summary.treceval.deepA", text)
        .expect("parsed");

    let map = rows.iter().find(|row| row.measure == "map").expect("map row");
    assert_eq!(map.runid, "deepA");
    assert_eq!(map.topic, "all");
    assert_eq!(map.score, "0.1234");
    assert_eq!(map.eval, "trec_eval");

    let summary = rows.iter().find(|row| row.measure == "summary").expect("summary row");
    assert_eq!(
        summary.score,
        "\tmap\t\t\t\tall\t0.1234\n\tP_10\t\t\tall\t0.5000\n\tbpref\t\t\tall\t0.3\n"
    );
    assert_eq!(rows.len(), 4);
}

#[test]
fn summary_without_measures_has_no_summary_row() {
    let books = books();
    let rows = parse_summary_file(&books.catalog, "trec30", "deep", "summary.treceval.x", "no scores here\n")
        .expect("parsed");
    assert!(rows.is_empty());
}

#[test]
fn truncated_summary_is_an_error() {
    let books = books();
    let result = parse_summary_file(&books.catalog, "trec30", "deep", "summary.x", "map\tall\n");
    assert!(result.is_err());
}

#[test]
fn misinfo_measures_carry_their_qrels() {
    let books = books();
    let text = "runA\thelpful\tndcg\tall\t0.41\nrunA\thelpful\tndcg\t1\t0.1\nrunA\tharmful\tcompatibility\tall\t0.05\n";
    let rows = parse_summary_file(&books.catalog, "trec30", "misinfo", "summary.runA", text)
        .expect("parsed");

    let measures: Vec<&str> = rows.iter().map(|row| row.measure.as_str()).collect();
    assert_eq!(measures, vec!["ndcg (helpful)", "compatibility (harmful)", "summary"]);
    assert_eq!(
        rows[2].score,
        "\trunA\thelpful\tndcg\tall\t0.41\n\trunA\tharmful\tcompatibility\tall\t0.05\n"
    );
}

#[test]
fn session_summary_splits_reformulation_levels() {
    let books = books();
    let mut columns = vec!["all".to_string()];
    columns.extend((1..=24).map(|idx| format!("0.{idx:02}")));
    let text = format!("topic {}\n{}\n", "header ".repeat(24), columns.join(" "));

    let rows = parse_summary_file(&books.catalog, "trec22", "session", "summary.runS", &text)
        .expect("parsed");
    let rl2_map = rows
        .iter()
        .find(|row| row.eval == "RL2" && row.measure == "map")
        .expect("RL2 map");
    assert_eq!(rl2_map.score, "0.02");
    let rl3_pk = rows
        .iter()
        .find(|row| row.eval == "RL3" && row.measure == "P_k")
        .expect("RL3 P_k");
    assert_eq!(rl3_pk.score, "0.24");
    assert_eq!(rows.iter().filter(|row| row.measure == "summary").count(), 3);
    let summary = rows
        .iter()
        .find(|row| row.eval == "RL1" && row.measure == "summary")
        .expect("RL1 summary");
    assert!(summary.score.starts_with("\tmap\t\t\tall 0.01\n"));
}

#[test]
fn summary_file_filters_skip_archives_and_variants() {
    assert!(is_parsed_summary_file("summary.trec_eval.runA"));
    assert!(!is_parsed_summary_file("summary.runA.tar.gz"));
    assert!(!is_parsed_summary_file("summary.runA.pdf"));
    assert!(!is_parsed_summary_file("summary.trec_eval(2).runA"));
    assert!(!is_parsed_summary_file("summary.runA.short"));
    assert!(!is_parsed_summary_file(".DS_Store"));
}

#[test]
fn csv_summaries_use_the_amean_row() {
    let books = books();
    let text = "runid,topic,ndcg@20,err@20\nrunW,201,0.1,0.2\nrunW,amean,0.3456,0.1234\n";
    let rows = parse_summary_file(&books.catalog, "trec22", "web", "summary.gdeval.runW", text);
    // gdeval is not among the trec22 web patterns, so the file falls through to trec_eval.
    assert!(rows.expect("parsed").is_empty());

    let rows = parse_summary_file(&books.catalog, "trec22", "web", "summary.std-gd.runW", text)
        .expect("parsed");
    let err = rows.iter().find(|row| row.measure == "err").expect("err row");
    assert_eq!(err.score, "0.1234");
    assert_eq!(err.eval, "std-gd");
}

#[test]
fn covid_means_join_on_run_id() {
    let columns = vec![
        ("bpref", parse_means("runA 0.5\nrunB 0.4\n")),
        ("map", parse_means("runB 0.2\nrunA 0.3\n")),
        ("P_5", parse_means("runA 0.7\n")),
    ];
    let joined = join_round_means(&columns);
    assert_eq!(joined.len(), 1);
    let (runid, measures) = &joined[0];
    assert_eq!(runid, "runA");
    assert_eq!(summary_block(measures, '\t'), "\tbpref\t\tall\t0.5\n\tmap\t\t\tall\t0.3\n\tP_5\t\t\tall\t0.7\n");
}

#[test]
fn bibliography_entries_parse_and_render() {
    let text = r#"
@comment{ignored}
@inproceedings{DBLP:conf/trec/Doe21,
  author    = {Jane Doe and
               John M{\"u}ller},
  title     = {{Dense} Retrieval at {TREC} -- a study},
  booktitle = "Proceedings",
  year      = 2021,
  url       = {https://trec.nist.gov/pubs/trec30/papers/org-DL.pdf},
  biburl    = {https://dblp.org/rec/conf/trec/Doe21.bib}
}
"#;
    let entries = parse_bibliography(text).entries;
    assert_eq!(entries.len(), 1);
    let entry = &entries[0];
    assert_eq!(entry.key, "DBLP:conf/trec/Doe21");
    assert_eq!(entry.field("year"), Some("2021"));
    assert_eq!(clean_title(entry.field("title").expect("title")), "Dense Retrieval at TREC – a study");
    assert_eq!(clean_authors(entry.field("author").expect("author")), "Jane Doe, John Müller");
    assert!(entry.to_bibtex().starts_with("@inproceedings{DBLP:conf/trec/Doe21,\n\tauthor = {Jane Doe and John M{\\\"u}ller},"));
}

#[test]
fn malformed_bibtex_entry_is_skipped_between_good_ones() {
    let text = "@article{good1, title={First}}\n\
                @article{bad, title={Never closed}\n\
                @article{good2, title={Second}}\n";
    let bibliography = parse_bibliography(text);
    let keys: Vec<&str> = bibliography
        .entries
        .iter()
        .map(|entry| entry.key.as_str())
        .collect();
    assert_eq!(keys, vec!["good1", "good2"]);
    assert_eq!(bibliography.warnings.len(), 1);
    assert!(bibliography.warnings[0].starts_with("bibtex bad:"));
    assert_eq!(bibliography.entries[1].field("title"), Some("Second"));
}

#[test]
fn publications_join_abstracts_with_bibliography() {
    let bibliography = parse_bibliography(
        "@article{overview30, title={Overview of the Deep Learning Track}, author={A and B}, doi={10.1/x}}",
    )
    .entries;
    let abstracts: AbstractsFile = serde_json::from_str(
        r#"{"trec30": {"deep": {
            "overview30": {"pid": "coordinators", "abstract": "We summarize."},
            "missing21": {"pid": "org", "abstract": ""}
        }}}"#,
    )
    .expect("abstracts parse");

    let harvest = assemble_publications(abstracts, &bibliography);
    assert_eq!(harvest.publications.len(), 1);
    assert_eq!(harvest.warnings.len(), 1);
    let publication = &harvest.publications[0];
    assert_eq!(publication.pid, "overview");
    assert_eq!(publication.author.as_deref(), Some("A, B"));
    assert_eq!(publication.doi.as_deref(), Some("10.1/x"));
    assert_eq!(publication.abstract_text.as_deref(), Some("We summarize."));
}

#[test]
fn create_db_builds_store_and_manifest() {
    let dir = tempfile::tempdir().expect("tempdir");
    let root = dir.path();
    let archive = root.join("trec");
    let json = root.join("json");

    write_text(
        &archive.join("trec30/reports/runs_table"),
        &format!(
            "{}\n{}\n",
            run_line("deepA", "deep", "auto", "docs", "d41d8cd98f00b204e9800998ecf8427e"),
            run_line("deepB", "deep", "manual", "docs", "")
        ),
    )
    .expect("runs table");
    write_text(
        &archive.join("trec30/reports/participants_table"),
        "org:Example University:a@b.c:Jane Doe\n",
    )
    .expect("participants table");
    write_text(
        &archive.join("trec30/deep/summaries/summary.treceval.deepA"),
        "map\tall\t0.1234\nP_10\tall\t0.4\n",
    )
    .expect("summary");
    write_text(&archive.join("trec30/deep/summaries/summary.treceval.deepB"), "map\tall\n")
        .expect("broken summary");
    write_text(
        &json.join("tracks.json"),
        r#"{"trec30": {"deep": {"fullname": "Deep Learning", "tasks": {"docs": "Document ranking"}}, "fair": {"fullname": "Fair Ranking"}}}"#,
    )
    .expect("tracks");
    write_text(
        &json.join("datasets.json"),
        r#"{"trec30": {"deep": {"corpus": "https://msmarco.org", "topics": {"docs": "https://x/topics"}, "qrels": ""}}}"#,
    )
    .expect("datasets");
    write_text(
        &json.join("abstracts.json"),
        r#"{"trec30": {"deep": {"craswell30": {"pid": "coordinators", "abstract": "Overview."}}}}"#,
    )
    .expect("abstracts");
    write_text(
        &root.join("bibtex/trec.bib"),
        "@inproceedings{craswell30, title={Overview of the TREC 2021 Deep Learning Track}, author={Nick Craswell}}\n",
    )
    .expect("bibtex");

    let args = CreateDbArgs {
        archive_root: archive,
        json_root: json.clone(),
        bibtex_path: root.join("bibtex/trec.bib"),
        db_path: root.join("trec.sqlite"),
        manifest_dir: root.join("manifests"),
        skip_results: false,
    };
    run(args).expect("create-db");

    let connection = store::open_database(&root.join("trec.sqlite")).expect("open");
    let tables = store::read_tables(&connection).expect("tables");
    assert_eq!(tables.runs.len(), 2);
    assert_eq!(tables.tracks.len(), 2);
    assert_eq!(tables.participants.len(), 1);
    assert_eq!(tables.publications[0].pid, "overview");
    assert_eq!(tables.results.len(), 3);
    assert_eq!(
        tables.datasets[0].topics,
        Some(Link::Labeled(BTreeMap::from([(
            "docs".to_string(),
            "https://x/topics".to_string()
        )])))
    );
    assert_eq!(tables.datasets[0].qrels, None);
    assert!(json.join("publications.json").exists());

    let manifests: Vec<_> = std::fs::read_dir(root.join("manifests"))
        .expect("manifest dir")
        .filter_map(|entry| entry.ok())
        .collect();
    assert_eq!(manifests.len(), 1);
    let manifest: CreateDbRunManifest = read_json(&manifests[0].path()).expect("manifest");
    assert_eq!(manifest.skipped_summary_files, 1);
    assert_eq!(manifest.absence.no_runs, 1);
}

#[test]
fn missing_archive_root_is_fatal() {
    let dir = tempfile::tempdir().expect("tempdir");
    let args = CreateDbArgs {
        archive_root: dir.path().join("missing"),
        json_root: dir.path().to_path_buf(),
        bibtex_path: dir.path().join("trec.bib"),
        db_path: dir.path().join("trec.sqlite"),
        manifest_dir: dir.path().join("manifests"),
        skip_results: false,
    };
    assert!(run(args).is_err());
}
