use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(
    name = "trec-browser",
    version,
    about = "TREC run, result and publication metadata pipeline"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Inventory(InventoryArgs),
    CreateDb(CreateDbArgs),
    MetadataToJson(MetadataToJsonArgs),
    CreateDbFromJson(CreateDbFromJsonArgs),
    Build(BuildArgs),
    BuildAll(BuildAllArgs),
    Status(StatusArgs),
}

#[derive(Args, Debug, Clone)]
pub struct InventoryArgs {
    #[arg(long, default_value = "trec")]
    pub archive_root: PathBuf,

    #[arg(long, default_value = "manifests")]
    pub manifest_dir: PathBuf,

    #[arg(long, default_value_t = false)]
    pub dry_run: bool,
}

#[derive(Args, Debug, Clone)]
pub struct CreateDbArgs {
    #[arg(long, default_value = "trec")]
    pub archive_root: PathBuf,

    #[arg(long, default_value = "json")]
    pub json_root: PathBuf,

    #[arg(long, default_value = "bibtex/trec.bib")]
    pub bibtex_path: PathBuf,

    #[arg(long, default_value = "trec.sqlite")]
    pub db_path: PathBuf,

    #[arg(long, default_value = "manifests")]
    pub manifest_dir: PathBuf,

    /// Skip parsing result summaries.
    #[arg(long, default_value_t = false)]
    pub skip_results: bool,
}

#[derive(Args, Debug, Clone)]
pub struct MetadataToJsonArgs {
    #[arg(long, default_value = "trec.sqlite")]
    pub db_path: PathBuf,

    #[arg(long, default_value = "metadata")]
    pub metadata_root: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct CreateDbFromJsonArgs {
    #[arg(long, default_value = "metadata")]
    pub metadata_root: PathBuf,

    #[arg(long, default_value = "trec.sqlite")]
    pub db_path: PathBuf,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum TableSource {
    Json,
    Sqlite,
}

impl TableSource {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Sqlite => "sqlite",
        }
    }
}

/// Where the page builder reads tables from and writes pages to.
#[derive(Args, Debug, Clone)]
pub struct PageSourceArgs {
    #[arg(long, value_enum, default_value_t = TableSource::Json)]
    pub from: TableSource,

    #[arg(long, default_value = "metadata")]
    pub metadata_root: PathBuf,

    #[arg(long, default_value = "trec.sqlite")]
    pub db_path: PathBuf,

    #[arg(long, default_value = "browser/src/docs")]
    pub docs_root: PathBuf,

    #[arg(long, default_value = "browser/src/mkdocs.yml")]
    pub mkdocs_path: PathBuf,

    #[arg(long, default_value = "manifests")]
    pub manifest_dir: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct BuildArgs {
    /// Edition to build, e.g. `trec33` or `trec-covid`.
    #[arg(long)]
    pub trec: String,

    #[command(flatten)]
    pub source: PageSourceArgs,
}

#[derive(Args, Debug, Clone)]
pub struct BuildAllArgs {
    #[command(flatten)]
    pub source: PageSourceArgs,
}

#[derive(Args, Debug, Clone)]
pub struct StatusArgs {
    #[arg(long, default_value = "trec.sqlite")]
    pub db_path: PathBuf,

    #[arg(long, default_value = "metadata")]
    pub metadata_root: PathBuf,

    #[arg(long, default_value = "manifests")]
    pub manifest_dir: PathBuf,
}
