use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::cli::StatusArgs;
use crate::commands::inventory::INVENTORY_MANIFEST;
use crate::model::{ArchiveInventoryManifest, BuildRunManifest, CreateDbRunManifest};
use crate::store::{self, TABLE_NAMES};
use crate::util::read_json;

const CREATE_DB_MANIFEST_PREFIX: &str = "create_db_run_";
const BUILD_MANIFEST_PREFIX: &str = "build_run_";

pub fn run(args: StatusArgs) -> Result<()> {
    info!(
        db_path = %args.db_path.display(),
        manifest_dir = %args.manifest_dir.display(),
        "status requested"
    );

    let inventory_path = args.manifest_dir.join(INVENTORY_MANIFEST);
    if inventory_path.exists() {
        let inventory: ArchiveInventoryManifest = read_json(&inventory_path)?;
        info!(
            generated_at = %inventory.generated_at,
            editions = inventory.edition_count,
            tables = inventory.table_count,
            "loaded inventory manifest"
        );
    } else {
        warn!(path = %inventory_path.display(), "inventory manifest missing");
    }

    match latest_manifest(&args.manifest_dir, CREATE_DB_MANIFEST_PREFIX)? {
        Some(path) => {
            let manifest: CreateDbRunManifest = read_json(&path)?;
            info!(
                run_id = %manifest.run_id,
                status = %manifest.status,
                updated_at = %manifest.updated_at,
                runs = manifest.counts.runs,
                results = manifest.counts.results,
                skipped_records = manifest.skipped_records,
                skipped_summary_files = manifest.skipped_summary_files,
                warnings = manifest.warnings.len(),
                "loaded create-db run manifest"
            );
        }
        None => warn!(dir = %args.manifest_dir.display(), "create-db run manifest missing"),
    }

    match latest_manifest(&args.manifest_dir, BUILD_MANIFEST_PREFIX)? {
        Some(path) => {
            let manifest: BuildRunManifest = read_json(&path)?;
            info!(
                run_id = %manifest.run_id,
                status = %manifest.status,
                source = %manifest.source,
                editions = manifest.editions.len(),
                pages_written = manifest.pages_written,
                pages_failed = manifest.pages_failed,
                "loaded build run manifest"
            );
        }
        None => warn!(dir = %args.manifest_dir.display(), "build run manifest missing"),
    }

    if args.db_path.exists() {
        let connection = store::open_database(&args.db_path)?;
        let schema_version = store::read_metadata(&connection, "db_schema_version")
            .unwrap_or_default()
            .unwrap_or_default();
        info!(path = %args.db_path.display(), schema_version = %schema_version, "database status");
        for table in TABLE_NAMES {
            let rows = store::query_count(&connection, &format!("SELECT COUNT(*) FROM {table}"))
                .unwrap_or(0);
            info!(table, rows, "table status");
        }
    } else {
        warn!(path = %args.db_path.display(), "database file missing");
    }

    if args.metadata_root.is_dir() {
        let editions = fs::read_dir(&args.metadata_root)
            .with_context(|| format!("failed to read {}", args.metadata_root.display()))?
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_dir())
            .count();
        info!(path = %args.metadata_root.display(), editions, "json metadata status");
    } else {
        warn!(path = %args.metadata_root.display(), "json metadata directory missing");
    }

    Ok(())
}

/// Newest manifest with the given file-name prefix; timestamps sort lexically.
fn latest_manifest(dir: &Path, prefix: &str) -> Result<Option<PathBuf>> {
    if !dir.is_dir() {
        return Ok(None);
    }
    let mut matches: Vec<_> = fs::read_dir(dir)
        .with_context(|| format!("failed to read {}", dir.display()))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.starts_with(prefix) && name.ends_with(".json"))
        })
        .collect();
    matches.sort();
    Ok(matches.pop())
}
