use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use songplays_etl::config::{
    parse_db_path, parse_path, DEFAULT_DB_PATH, DEFAULT_FILE_EXTENSION, DEFAULT_LOG_DATA,
    DEFAULT_SONG_DATA,
};
use songplays_etl::{open_warehouse, run_pipeline, AppConfig, CliConfig, FileConfig};

#[derive(Parser, Debug)]
#[command(about = "Load song metadata and activity logs into the songplays warehouse")]
struct CliArgs {
    /// Path to the SQLite warehouse database file (":memory:" for a throwaway run).
    #[clap(long, default_value = DEFAULT_DB_PATH)]
    pub db_path: String,

    /// Root directory of the song metadata files.
    #[clap(long, default_value = DEFAULT_SONG_DATA, value_parser = parse_path)]
    pub song_data: PathBuf,

    /// Root directory of the activity log files.
    #[clap(long, default_value = DEFAULT_LOG_DATA, value_parser = parse_path)]
    pub log_data: PathBuf,

    /// Path to a TOML config file. Values found there override CLI arguments.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// Only create missing tables instead of dropping and recreating the schema.
    #[clap(long)]
    pub keep_schema: bool,

    /// Roll back a failing file and keep going instead of stopping the run.
    #[clap(long)]
    pub continue_on_error: bool,

    /// Fail a log file on its first malformed record instead of skipping it.
    #[clap(long)]
    pub strict_records: bool,

    /// Extension of the data files to pick up.
    #[clap(long, default_value = DEFAULT_FILE_EXTENSION)]
    pub file_extension: String,
}

impl CliArgs {
    fn to_cli_config(&self) -> Result<CliConfig> {
        Ok(CliConfig {
            db_path: parse_db_path(&self.db_path)?,
            song_data: self.song_data.clone(),
            log_data: self.log_data.clone(),
            file_extension: self.file_extension.clone(),
            keep_schema: self.keep_schema,
            continue_on_error: self.continue_on_error,
            strict_records: self.strict_records,
        })
    }
}

fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading config from {:?}", path);
            Some(FileConfig::load(path)?)
        }
        None => None,
    };
    let config = AppConfig::resolve(&cli_args.to_cli_config()?, file_config)?;

    let mut conn = open_warehouse(&config.db_path)?;
    let summary = run_pipeline(&mut conn, &config)?;

    info!(
        "Done: {} song files and {} log files loaded into {:?}",
        summary.songs.files_processed, summary.logs.files_processed, config.db_path
    );
    Ok(())
}
