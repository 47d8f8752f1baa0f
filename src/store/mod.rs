//! Persistence of the six metadata tables: a SQLite database and a
//! directory of per-edition JSON files.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension, Row, params};
use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;
use tracing::info;

use crate::model::{Dataset, Link, Participant, Publication, ResultRow, Run, Tables, Track};
use crate::util::{ensure_directory, read_json, write_json_pretty};

mod json_dir;
mod sqlite;

pub use json_dir::{read_json_dir, write_json_dir};
pub use sqlite::{
    DB_SCHEMA_VERSION, open_database, query_count, read_metadata, read_tables, write_tables,
};

pub const TABLE_NAMES: [&str; 6] = [
    "tracks",
    "runs",
    "participants",
    "publications",
    "datasets",
    "results",
];
