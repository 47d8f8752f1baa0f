use super::*;

pub fn run(args: CreateDbArgs) -> Result<()> {
    let started_ts = Utc::now();
    let started_at = now_utc_string();
    let run_id = format!("run-{}", utc_compact_string(started_ts));

    for (label, path) in [("archive root", &args.archive_root), ("json root", &args.json_root)] {
        if !path.is_dir() {
            bail!("{label} does not exist: {}", path.display());
        }
    }

    info!(
        archive_root = %args.archive_root.display(),
        db_path = %args.db_path.display(),
        run_id = %run_id,
        "starting create-db"
    );

    let books = RuleBooks::embedded()?;
    let archive = inventory::build_manifest(&args.archive_root)?;
    let mut warnings = Vec::new();

    let publications_path = args.json_root.join("publications.json");
    let publications = load_publications(&args.json_root.join("abstracts.json"), &args.bibtex_path)?;
    write_json_pretty(
        &publications_path,
        &publications_by_edition(&publications.publications),
    )?;
    info!(
        path = %publications_path.display(),
        publications = publications.publications.len(),
        "wrote publications json"
    );
    warnings.extend(publications.warnings);

    let tracks = load_tracks(&args.json_root.join("tracks.json"))?;
    let datasets = load_datasets(&args.json_root.join("datasets.json"))?;

    let assembled = assemble_run_tables(&books, &args.archive_root, &archive.editions)?;
    warnings.extend(assembled.warnings);

    let mut skipped_summary_files = 0;
    let results = if args.skip_results {
        info!("skipping result summaries");
        Vec::new()
    } else {
        let harvest = harvest_results(&books, &args.archive_root, &tracks);
        skipped_summary_files = harvest.skipped_files.len();
        warnings.extend(harvest.skipped_files);
        harvest.rows
    };

    let mut tables = Tables {
        tracks,
        runs: assembled.runs,
        participants: assembled.participants,
        publications: publications.publications,
        datasets,
        results,
    };
    tables.normalize();
    warnings.extend(check_cross_references(&tables));

    let absence = AbsenceSets::compute(&tables, &books.catalog.pages);
    let generated_at = now_utc_string();

    let mut connection = store::open_database(&args.db_path)?;
    store::write_tables(
        &mut connection,
        &tables,
        &[
            ("db_schema_version", store::DB_SCHEMA_VERSION.to_string()),
            ("run_id", run_id.clone()),
            ("generated_at", generated_at.clone()),
        ],
    )?;

    let manifest_path = args
        .manifest_dir
        .join(format!("create_db_run_{}.json", utc_compact_string(started_ts)));
    let manifest = CreateDbRunManifest {
        manifest_version: 1,
        run_id,
        db_schema_version: store::DB_SCHEMA_VERSION.to_string(),
        status: "completed".to_string(),
        started_at,
        updated_at: generated_at,
        paths: CreateDbPaths {
            archive_root: args.archive_root.display().to_string(),
            json_root: args.json_root.display().to_string(),
            bibtex_path: args.bibtex_path.display().to_string(),
            db_path: args.db_path.display().to_string(),
            manifest_dir: args.manifest_dir.display().to_string(),
        },
        counts: tables.counts(),
        absence: absence.counts(),
        skipped_records: assembled.skipped_records,
        skipped_summary_files,
        source_hashes: archive.tables,
        warnings,
    };
    write_json_pretty(&manifest_path, &manifest)?;

    info!(path = %manifest_path.display(), "wrote create-db run manifest");
    info!(
        runs = manifest.counts.runs,
        results = manifest.counts.results,
        skipped_records = manifest.skipped_records,
        skipped_summary_files,
        "create-db completed"
    );

    Ok(())
}

#[derive(Debug, Default)]
pub(super) struct RunTables {
    pub(super) runs: Vec<Run>,
    pub(super) participants: Vec<Participant>,
    pub(super) warnings: Vec<String>,
    pub(super) skipped_records: usize,
}

impl RunTables {
    fn skip(&mut self, trec: &str, track: &str, runid: &str, err: &anyhow::Error) {
        warn!(trec, track, runid, error = %format!("{err:#}"), "skipping run record");
        self.warnings
            .push(format!("{trec}/{track}/{runid}: {err:#}"));
        self.skipped_records += 1;
    }

    fn push_run(&mut self, assembled: AssembledRun) {
        for warning in assembled.warnings {
            warn!(
                trec = %assembled.run.trec,
                track = %assembled.run.track,
                runid = %assembled.run.runid,
                warning = %warning,
                "incomplete other metadata"
            );
            self.warnings.push(format!(
                "{}/{}/{}: {warning}",
                assembled.run.trec, assembled.run.track, assembled.run.runid
            ));
        }
        self.runs.push(assembled.run);
    }
}

fn record_label(record: &Record, field: &str) -> String {
    record.value_str(field).unwrap_or_default().to_string()
}

/// Parses and corrects the runs and participants tables of every edition.
pub(super) fn assemble_run_tables(
    books: &RuleBooks,
    archive_root: &Path,
    editions: &[String],
) -> Result<RunTables> {
    let assembler = RunAssembler::new(books)?;
    let mut out = RunTables::default();
    let mut participants = Vec::new();

    for trec in editions {
        if is_covid_edition(trec) {
            continue;
        }
        let reports = archive_root.join(trec).join("reports");

        let runs_path = reports.join("runs_table");
        if runs_path.is_file() {
            let records = read_table(&runs_path, trec, TableSchema::Runs, &books.catalog)?;
            let before = out.runs.len();
            for record in records {
                let track = record_label(&record, "track");
                let runid = record_label(&record, "runid");
                match assembler.assemble(record) {
                    Ok(assembled) => out.push_run(assembled),
                    Err(err) => out.skip(trec, &track, &runid, &err),
                }
            }
            info!(trec = %trec, runs = out.runs.len() - before, "assembled runs");
        }

        let participants_path = reports.join("participants_table");
        if participants_path.is_file() {
            let records =
                read_table(&participants_path, trec, TableSchema::Participants, &books.catalog)?;
            for record in records {
                match participant_from_record(record) {
                    Ok(participant) => participants.push(participant),
                    Err(err) => out.skip(trec, "", "", &err),
                }
            }
        }
    }

    for round in (1..=COVID_ROUNDS).map(covid_round) {
        let path = covid_runs_table(archive_root, &round);
        if !path.is_file() {
            continue;
        }
        let text = read_lossy_text(&path)?;
        for record in parse_table_text(&text, COVID_EDITION, TableSchema::CovidRuns, &books.catalog) {
            let runid = record_label(&record, "runid");
            match assembler.assemble_covid(record, &round) {
                Ok(assembled) => out.push_run(assembled),
                Err(err) => out.skip(COVID_EDITION, &round, &runid, &err),
            }
        }
        for record in
            parse_table_text(&text, COVID_EDITION, TableSchema::CovidParticipants, &books.catalog)
        {
            match covid_participant_from_record(&record) {
                Ok(participant) => participants.push(participant),
                Err(err) => out.skip(COVID_EDITION, &round, "", &err),
            }
        }
    }

    out.participants = dedup_participants(participants);
    Ok(out)
}

/// Parses the result summaries of every curated track.
pub(super) fn harvest_results(books: &RuleBooks, archive_root: &Path, tracks: &[Track]) -> SummaryHarvest {
    let mut by_edition: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for track in tracks {
        by_edition
            .entry(track.trec.as_str())
            .or_default()
            .push(track.track.as_str());
    }

    let mut harvest = SummaryHarvest::default();
    for (trec, edition_tracks) in by_edition {
        if is_covid_edition(trec) {
            for round in &edition_tracks {
                match covid_round_results(archive_root, round) {
                    Ok(rows) => harvest.rows.extend(rows),
                    Err(err) => {
                        warn!(trec, track = %round, error = %format!("{err:#}"), "skipping covid evaluation");
                        harvest.skipped_files.push(format!("{trec}/{round}: {err:#}"));
                    }
                }
            }
            continue;
        }

        let edition = harvest_edition(books, archive_root, trec, &edition_tracks);
        info!(trec, results = edition.rows.len(), "parsed result summaries");
        harvest.rows.extend(edition.rows);
        harvest.skipped_files.extend(edition.skipped_files);
    }
    harvest
}

/// Runs without a curated track and results without a run are reported, not removed.
pub(super) fn check_cross_references(tables: &Tables) -> Vec<String> {
    let known_tracks: HashSet<(&str, &str)> = tables
        .tracks
        .iter()
        .map(|track| (track.trec.as_str(), track.track.as_str()))
        .collect();
    let known_runs: HashSet<(&str, &str, &str)> = tables
        .runs
        .iter()
        .map(|run| {
            (
                run.trec.as_str(),
                run.track.as_str(),
                results_run_id(&run.track, &run.runid),
            )
        })
        .collect();

    let orphan_tracks: BTreeSet<(&str, &str)> = tables
        .runs
        .iter()
        .map(|run| (run.trec.as_str(), run.track.as_str()))
        .filter(|key| !known_tracks.contains(key))
        .collect();

    let mut orphan_results: BTreeMap<(&str, &str), BTreeSet<&str>> = BTreeMap::new();
    for row in &tables.results {
        if !known_runs.contains(&(row.trec.as_str(), row.track.as_str(), row.runid.as_str())) {
            orphan_results
                .entry((row.trec.as_str(), row.track.as_str()))
                .or_default()
                .insert(row.runid.as_str());
        }
    }

    let mut warnings = Vec::new();
    for (trec, track) in orphan_tracks {
        warn!(trec, track, "runs reference a track missing from tracks.json");
        warnings.push(format!("{trec}/{track}: runs without a curated track"));
    }
    for ((trec, track), runids) in orphan_results {
        warn!(trec, track, runs = runids.len(), "results without a matching run");
        warnings.push(format!(
            "{trec}/{track}: results for {} unknown run ids",
            runids.len()
        ));
    }
    warnings
}
