//! facemap: newgen portrait mapping file generator for Football Manager.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::str::FromStr;

use clap::{Parser, Subcommand};
use log::{error, info};
use thiserror::Error;

use fm_cli::{ConfigError, FileConfig, image_path_prefix};
use fm_core::{
    DriverError, GameVersion, ImagePool, MappingStore, NationEthnicTable, OverrideError,
    PoolError, ReportError, RunOptions, StoreError, allocate, read_players,
};

/// Creates the newgen portrait mapping file for Football Manager.
#[derive(Parser, Debug)]
#[command(name = "facemap")]
#[command(author, version, about = "Creates the newgen portrait mapping file for Football Manager", long_about = None)]
struct Args {
    /// Preserve players already present in the mapping document
    #[arg(short = 'p', long = "preserve")]
    preserve: bool,

    /// Allow the same image to be assigned to more than one player
    #[arg(long = "allow-duplicates")]
    allow_duplicates: bool,

    /// Mapping XML file path
    #[arg(long = "xml")]
    xml: Option<PathBuf>,

    /// Player report (RTF export) path
    #[arg(long = "rtf")]
    rtf: Option<PathBuf>,

    /// Image directory root (one subfolder per ethnic category)
    #[arg(long = "img")]
    img: Option<PathBuf>,

    /// Game version (2020..2024)
    #[arg(long = "ver")]
    version: Option<String>,

    /// Config file path
    #[arg(long = "config", default_value = "./facemap.json")]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Rewrites the config file with sorted override nations
    Format {
        /// Config file to format (defaults to --config)
        path: Option<PathBuf>,
    },
}

#[derive(Error, Debug)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Override(#[from] OverrideError),
    #[error(transparent)]
    Report(#[from] ReportError),
    #[error(transparent)]
    Pool(#[from] PoolError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Driver(#[from] DriverError),
    #[error("cannot resolve {0}: {1}")]
    Path(&'static str, #[source] std::io::Error),
    #[error("{0} could not be found: {1}")]
    Missing(&'static str, PathBuf),
    #[error("unknown game version: {0}")]
    BadVersion(String),
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            let mut source = std::error::Error::source(&err);
            while let Some(cause) = source {
                error!("caused by: {cause}");
                source = cause.source();
            }
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), CliError> {
    if let Some(Command::Format { path }) = args.command {
        return format_config(&path.unwrap_or(args.config));
    }

    let config = FileConfig::load(&args.config)?;

    let xml_path = args
        .xml
        .or(config.xml_path)
        .unwrap_or_else(|| PathBuf::from("./config.xml"));
    let rtf_path = args
        .rtf
        .or(config.rtf_path)
        .unwrap_or_else(|| PathBuf::from("./newgen.rtf"));
    let img_dir = args
        .img
        .or(config.img_path)
        .unwrap_or_else(|| PathBuf::from("./"));

    let version_name = args
        .version
        .or(config.version)
        .unwrap_or_else(|| GameVersion::default().to_string());
    let version = GameVersion::from_str(&version_name)
        .map_err(|_| CliError::BadVersion(version_name))?;

    let preserve = args.preserve || config.preserve.unwrap_or(false);
    let allow_duplicates = args.allow_duplicates || config.allow_duplicates.unwrap_or(false);

    require_exists("image directory", &img_dir)?;
    require_exists("mapping XML file", &xml_path)?;
    require_exists("player report file", &rtf_path)?;

    let mut table = NationEthnicTable::default();
    if let Some(overrides) = &config.mapping_override {
        table.apply_overrides(overrides)?;
    }

    let mut store = MappingStore::load(&xml_path, version)?;

    let mut pool = ImagePool::build(&img_dir)?;
    let assigned = store.assigned_images();
    pool.exclude(assigned.iter().map(String::as_str));

    let players = read_players(&rtf_path, &table)?;
    info!(
        "parsed {} newgen players from {}",
        players.len(),
        rtf_path.display()
    );

    let prefix = image_path_prefix(&xml_path, &img_dir)
        .map_err(|err| CliError::Path("image path prefix", err))?;

    let opts = RunOptions {
        preserve_existing: preserve,
        allow_duplicate_images: allow_duplicates,
        image_path_prefix: prefix,
    };

    let mut rng = rand::thread_rng();
    allocate(&players, &mut store, &mut pool, &xml_path, &opts, &mut rng)?;

    info!("mapping written to {}", xml_path.display());
    Ok(())
}

fn format_config(path: &Path) -> Result<(), CliError> {
    require_exists("config file", path)?;
    let config = FileConfig::load(path)?;
    config.save(path)?;
    info!("config rewritten to {}", path.display());
    Ok(())
}

fn require_exists(what: &'static str, path: &Path) -> Result<(), CliError> {
    if path.exists() {
        Ok(())
    } else {
        Err(CliError::Missing(what, path.to_path_buf()))
    }
}
