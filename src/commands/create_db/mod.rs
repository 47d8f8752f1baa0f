use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use chrono::Utc;
use regex::Regex;
use serde::Deserialize;
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::absence::AbsenceSets;
use crate::cli::CreateDbArgs;
use crate::commands::inventory;
use crate::conventions::{COVID_EDITION, OVERVIEW_PID, is_covid_edition, is_session_track, results_run_id};
use crate::model::{
    CreateDbPaths, CreateDbRunManifest, Dataset, Link, Participant, Publication, ResultRow, Run,
    Tables, Track,
};
use crate::rules::{Catalog, Record, RuleBooks};
use crate::store;
use crate::util::{
    non_empty, now_utc_string, read_json, read_lossy_text, utc_compact_string, write_json_pretty,
};

mod bibtex;
mod covid;
mod curated;
mod publications;
mod records;
mod run;
mod runs;
mod summaries;
mod summary_formats;
#[cfg(test)]
mod tests;

pub use run::run;

use bibtex::*;
use covid::*;
use curated::*;
use publications::*;
use records::*;
use runs::*;
use summaries::*;
use summary_formats::*;
