use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::absence::AbsenceSets;
use crate::cli::{BuildAllArgs, BuildArgs, PageSourceArgs, TableSource};
use crate::conventions::{
    COVID_EDITION, OVERVIEW_PID, edition_label, edition_order, edition_year, is_covid_edition,
    is_overview_paper, results_run_id,
};
use crate::model::{
    BuildRunManifest, Dataset, Link, Participant, Publication, ResultRow, Run, Tables, Track,
};
use crate::rules::{PageCatalog, embedded_page_catalog};
use crate::store;
use crate::util::{now_utc_string, utc_compact_string, write_json_pretty, write_text};

mod anchors;
mod edition_pages;
mod landing;
mod markdown;
mod navigation;
mod run;
mod site;
#[cfg(test)]
mod tests;
mod track_pages;

pub use run::{run, run_all};

use anchors::*;
use edition_pages::*;
use landing::*;
use markdown::*;
use navigation::*;
use site::*;
use track_pages::*;
