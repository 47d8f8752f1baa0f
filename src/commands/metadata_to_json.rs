use anyhow::{Result, bail};
use tracing::info;

use crate::cli::MetadataToJsonArgs;
use crate::store;

/// Exports the SQLite tables as the per-edition JSON directory.
pub fn run(args: MetadataToJsonArgs) -> Result<()> {
    if !args.db_path.is_file() {
        bail!("database does not exist: {}", args.db_path.display());
    }

    info!(
        db_path = %args.db_path.display(),
        metadata_root = %args.metadata_root.display(),
        "starting metadata-to-json"
    );

    let connection = store::open_database(&args.db_path)?;
    let tables = store::read_tables(&connection)?;
    let editions = store::write_json_dir(&args.metadata_root, &tables)?;

    let counts = tables.counts();
    info!(
        editions,
        tracks = counts.tracks,
        runs = counts.runs,
        results = counts.results,
        "metadata-to-json completed"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::model::{Run, Tables, Track};

    #[test]
    fn exports_every_edition_of_the_database() {
        let dir = tempfile::tempdir().expect("tempdir");
        let db_path = dir.path().join("trec.sqlite");
        let tables = Tables {
            tracks: vec![Track {
                trec: "trec30".to_string(),
                track: "deep".to_string(),
                fullname: Some("Deep Learning".to_string()),
                ..Track::default()
            }],
            runs: vec![Run {
                trec: "trec29".to_string(),
                track: "deep".to_string(),
                runid: "runA".to_string(),
                pid: "org".to_string(),
                year: 2020,
                ..Run::default()
            }],
            ..Tables::default()
        };
        let mut connection = store::open_database(&db_path).expect("open");
        store::write_tables(&mut connection, &tables, &[]).expect("write");

        let metadata_root = dir.path().join("metadata");
        run(MetadataToJsonArgs {
            db_path,
            metadata_root: metadata_root.clone(),
        })
        .expect("export");

        assert!(metadata_root.join("trec30/tracks.json").is_file());
        assert!(metadata_root.join("trec29/runs.json").is_file());
    }

    #[test]
    fn missing_database_is_fatal() {
        let dir = tempfile::tempdir().expect("tempdir");
        let result = run(MetadataToJsonArgs {
            db_path: dir.path().join("missing.sqlite"),
            metadata_root: dir.path().join("metadata"),
        });
        assert!(result.is_err());
    }
}
