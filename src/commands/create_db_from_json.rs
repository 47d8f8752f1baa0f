use anyhow::{Result, bail};
use chrono::Utc;
use tracing::info;

use crate::cli::CreateDbFromJsonArgs;
use crate::store;
use crate::util::{now_utc_string, utc_compact_string};

/// Rebuilds the SQLite tables from the per-edition JSON directory.
pub fn run(args: CreateDbFromJsonArgs) -> Result<()> {
    let run_id = format!("run-{}", utc_compact_string(Utc::now()));
    if !args.metadata_root.is_dir() {
        bail!(
            "metadata directory does not exist: {}",
            args.metadata_root.display()
        );
    }

    info!(
        metadata_root = %args.metadata_root.display(),
        db_path = %args.db_path.display(),
        run_id = %run_id,
        "starting create-db-from-json"
    );

    let tables = store::read_json_dir(&args.metadata_root)?;
    let mut connection = store::open_database(&args.db_path)?;
    store::write_tables(
        &mut connection,
        &tables,
        &[
            ("db_schema_version", store::DB_SCHEMA_VERSION.to_string()),
            ("run_id", run_id),
            ("generated_at", now_utc_string()),
            ("source", args.metadata_root.display().to_string()),
        ],
    )?;

    let counts = tables.counts();
    info!(
        tracks = counts.tracks,
        runs = counts.runs,
        participants = counts.participants,
        publications = counts.publications,
        datasets = counts.datasets,
        results = counts.results,
        "create-db-from-json completed"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::model::{ResultRow, Tables, Track};

    #[test]
    fn json_directory_round_trips_into_sqlite() {
        let dir = tempfile::tempdir().expect("tempdir");
        let metadata_root = dir.path().join("metadata");
        let mut tables = Tables {
            tracks: vec![Track {
                trec: "trec30".to_string(),
                track: "deep".to_string(),
                ..Track::default()
            }],
            results: vec![ResultRow {
                trec: "trec30".to_string(),
                track: "deep".to_string(),
                runid: "runA".to_string(),
                eval: "trec_eval".to_string(),
                topic: "all".to_string(),
                measure: "map".to_string(),
                score: "0.1234".to_string(),
            }],
            ..Tables::default()
        };
        tables.normalize();
        store::write_json_dir(&metadata_root, &tables).expect("write json");

        let db_path = dir.path().join("trec.sqlite");
        run(CreateDbFromJsonArgs {
            metadata_root: metadata_root.clone(),
            db_path: db_path.clone(),
        })
        .expect("import");

        let connection = store::open_database(&db_path).expect("open");
        assert_eq!(store::read_tables(&connection).expect("read"), tables);
        assert_eq!(
            store::read_metadata(&connection, "source").expect("metadata"),
            Some(metadata_root.display().to_string())
        );
    }
}
