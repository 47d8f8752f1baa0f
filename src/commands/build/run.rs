use super::*;

pub fn run(args: BuildArgs) -> Result<()> {
    build_pages(&args.source, Some(&args.trec)).map(|_| ())
}

pub fn run_all(args: BuildAllArgs) -> Result<()> {
    build_pages(&args.source, None).map(|_| ())
}

/// Page counts of a build. Write errors are fatal; a page that cannot be
/// rendered is logged and counted.
#[derive(Debug, Default)]
struct PageReport {
    written: usize,
    failed: usize,
    warnings: Vec<String>,
}

impl PageReport {
    fn record(&mut self, docs_root: &Path, trec: &str, page: Result<Page>) -> Result<()> {
        match page {
            Ok(page) => {
                write_text(&docs_root.join(&page.path), &page.content)?;
                self.written += 1;
            }
            Err(err) => {
                warn!(trec, error = %format!("{err:#}"), "skipping page");
                self.warnings.push(format!("{trec}: {err:#}"));
                self.failed += 1;
            }
        }
        Ok(())
    }
}

/// Renders one edition (`only`) or the whole site, and writes the build manifest.
pub(super) fn build_pages(source: &PageSourceArgs, only: Option<&str>) -> Result<BuildRunManifest> {
    let started_ts = Utc::now();
    let started_at = now_utc_string();
    let run_id = format!("run-{}", utc_compact_string(started_ts));
    let command = if only.is_some() { "build" } else { "build-all" };

    info!(
        command,
        from = source.from.as_str(),
        docs_root = %source.docs_root.display(),
        run_id = %run_id,
        "starting page build"
    );

    let tables = load_tables(source)?;
    let catalog = embedded_page_catalog()?;
    let site = SiteData::new(&tables, &catalog);

    let editions: Vec<&str> = match only {
        Some(trec) if site.has_edition(trec) => vec![trec],
        Some(trec) => bail!("edition {trec} has no tracks in the {} tables", source.from.as_str()),
        None => site.editions().to_vec(),
    };

    let mut report = PageReport::default();
    for trec in editions.iter().copied() {
        let before = (report.written, report.failed);
        for page in edition_pages(&site, trec) {
            report.record(&source.docs_root, trec, page)?;
        }
        info!(
            trec,
            written = report.written - before.0,
            failed = report.failed - before.1,
            "rendered edition pages"
        );
    }

    if only.is_none() {
        report.record(&source.docs_root, "site", Ok(index_page(&site)))?;
        report.record(&source.docs_root, "site", Ok(data_index_page(&site)))?;
        write_text(&source.mkdocs_path, &mkdocs_config(&site)?)?;
        info!(path = %source.mkdocs_path.display(), "wrote mkdocs config");
    }

    let status = if report.failed == 0 {
        "completed"
    } else {
        "completed_with_failures"
    };
    let manifest = BuildRunManifest {
        manifest_version: 1,
        run_id,
        status: status.to_string(),
        started_at,
        updated_at: now_utc_string(),
        source: source.from.as_str().to_string(),
        docs_root: source.docs_root.display().to_string(),
        mkdocs_path: source.mkdocs_path.display().to_string(),
        editions: editions.iter().map(|trec| trec.to_string()).collect(),
        pages_written: report.written,
        pages_failed: report.failed,
        warnings: report.warnings,
    };
    let manifest_path = source
        .manifest_dir
        .join(format!("build_run_{}.json", utc_compact_string(started_ts)));
    write_json_pretty(&manifest_path, &manifest)?;

    info!(path = %manifest_path.display(), "wrote build run manifest");
    info!(
        command,
        editions = manifest.editions.len(),
        pages_written = manifest.pages_written,
        pages_failed = manifest.pages_failed,
        "page build completed"
    );

    Ok(manifest)
}

fn load_tables(source: &PageSourceArgs) -> Result<Tables> {
    let tables = match source.from {
        TableSource::Json => {
            if !source.metadata_root.is_dir() {
                bail!(
                    "metadata root does not exist: {}",
                    source.metadata_root.display()
                );
            }
            store::read_json_dir(&source.metadata_root)?
        }
        TableSource::Sqlite => {
            if !source.db_path.is_file() {
                bail!("database does not exist: {}", source.db_path.display());
            }
            let connection = store::open_database(&source.db_path)?;
            store::read_tables(&connection)?
        }
    };
    let counts = tables.counts();
    info!(
        tracks = counts.tracks,
        runs = counts.runs,
        publications = counts.publications,
        results = counts.results,
        "loaded tables"
    );
    Ok(tables)
}
