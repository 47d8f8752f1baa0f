use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use regex::Regex;
use tracing::info;

use crate::cli::InventoryArgs;
use crate::conventions::{COVID_EDITION, edition_order};
use crate::model::{ArchiveInventoryManifest, TableFileEntry};
use crate::util::{now_utc_string, sha256_file, write_json_pretty};

pub const INVENTORY_MANIFEST: &str = "archive_inventory.json";

const TABLE_FILES: [(&str, &str); 2] = [
    ("runs_table", "runs"),
    ("participants_table", "participants"),
];

pub fn run(args: InventoryArgs) -> Result<()> {
    let manifest = build_manifest(&args.archive_root)?;

    if args.dry_run {
        info!(
            editions = manifest.edition_count,
            tables = manifest.table_count,
            source = %manifest.source_directory,
            "inventory dry-run complete"
        );
        return Ok(());
    }

    let manifest_path = args.manifest_dir.join(INVENTORY_MANIFEST);
    write_json_pretty(&manifest_path, &manifest)?;
    info!(path = %manifest_path.display(), "wrote inventory manifest");
    info!(
        editions = manifest.edition_count,
        tables = manifest.table_count,
        "inventory completed"
    );

    Ok(())
}

/// Hashes every report table of the archive, newest edition first.
pub fn build_manifest(archive_root: &Path) -> Result<ArchiveInventoryManifest> {
    let editions = discover_editions(archive_root)?;
    if editions.is_empty() {
        bail!("no TREC editions found in {}", archive_root.display());
    }

    let mut tables = Vec::new();
    for trec in &editions {
        for (path, kind) in table_paths(archive_root, trec)? {
            tables.push(TableFileEntry {
                trec: trec.clone(),
                kind: kind.to_string(),
                sha256: sha256_file(&path)?,
                path: path.display().to_string(),
            });
        }
    }

    Ok(ArchiveInventoryManifest {
        manifest_version: 1,
        generated_at: now_utc_string(),
        source_directory: archive_root.display().to_string(),
        edition_count: editions.len(),
        editions,
        table_count: tables.len(),
        tables,
    })
}

/// Edition directories (`trecN` and `trec-covid`) directly under the archive root.
pub fn discover_editions(archive_root: &Path) -> Result<Vec<String>> {
    let pattern = Regex::new(r"^trec\d+$").context("failed to compile edition regex")?;
    let entries = fs::read_dir(archive_root)
        .with_context(|| format!("failed to read {}", archive_root.display()))?;

    let mut editions = Vec::new();
    for entry in entries {
        let entry =
            entry.with_context(|| format!("failed to read entry in {}", archive_root.display()))?;
        let path = entry.path();
        if !entry
            .file_type()
            .with_context(|| format!("failed to inspect file type: {}", path.display()))?
            .is_dir()
        {
            continue;
        }

        let name = entry.file_name().to_string_lossy().into_owned();
        if pattern.is_match(&name) || name == COVID_EDITION {
            editions.push(name);
        }
    }

    editions.sort_by(|a, b| edition_order(a, b));
    Ok(editions)
}

fn table_paths(archive_root: &Path, trec: &str) -> Result<Vec<(PathBuf, &'static str)>> {
    let mut paths = Vec::new();

    if trec == COVID_EDITION {
        let mut rounds: Vec<PathBuf> = fs::read_dir(archive_root.join(trec))
            .with_context(|| format!("failed to read {}", archive_root.join(trec).display()))?
            .filter_map(|entry| entry.ok().map(|entry| entry.path()))
            .filter(|path| path.is_dir())
            .collect();
        rounds.sort();
        for round in rounds {
            let path = round.join("reports").join("runs_table");
            if path.is_file() {
                paths.push((path, "runs"));
            }
        }
        return Ok(paths);
    }

    for (file, kind) in TABLE_FILES {
        let path = archive_root.join(trec).join("reports").join(file);
        if path.is_file() {
            paths.push((path, kind));
        }
    }
    Ok(paths)
}
