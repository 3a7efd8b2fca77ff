mod file_config;

pub use file_config::FileConfig;

use crate::ingest::BatchOptions;
use crate::transform::MalformedRecordPolicy;
use anyhow::{bail, Context, Result};
use std::path::PathBuf;

pub const DEFAULT_DB_PATH: &str = "sparkify.db";
pub const DEFAULT_SONG_DATA: &str = "data/song_data";
pub const DEFAULT_LOG_DATA: &str = "data/log_data";
pub const DEFAULT_FILE_EXTENSION: &str = "json";

/// In-memory database marker accepted wherever a database path is.
pub const MEMORY_DB: &str = ":memory:";

/// Resolve `s` to an absolute path, canonical when it exists.
pub fn parse_path(s: &str) -> Result<PathBuf> {
    let path_buf = PathBuf::from(s);
    let resolved = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(msg).with_context(|| format!("Error resolving path: {}", s));
            }
        }
    };
    if resolved.is_absolute() {
        return Ok(resolved);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(resolved))
}

/// Like `parse_path`, but leaves `:memory:` untouched.
pub fn parse_db_path(s: &str) -> Result<PathBuf> {
    if s == MEMORY_DB {
        return Ok(PathBuf::from(s));
    }
    parse_path(s)
}

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub db_path: PathBuf,
    pub song_data: PathBuf,
    pub log_data: PathBuf,
    pub file_extension: String,
    pub keep_schema: bool,
    pub continue_on_error: bool,
    pub strict_records: bool,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            song_data: PathBuf::from(DEFAULT_SONG_DATA),
            log_data: PathBuf::from(DEFAULT_LOG_DATA),
            file_extension: DEFAULT_FILE_EXTENSION.to_string(),
            keep_schema: false,
            continue_on_error: false,
            strict_records: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub song_data: PathBuf,
    pub log_data: PathBuf,
    pub file_extension: String,
    /// Create missing tables only, instead of dropping and recreating them.
    pub keep_schema: bool,
    pub continue_on_error: bool,
    pub record_policy: MalformedRecordPolicy,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present. TOML paths are
    /// resolved against the working directory, the same way CLI paths are.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let db_path = match file.db_path {
            Some(path) => parse_db_path(&path)?,
            None => cli.db_path.clone(),
        };
        let song_data = match file.song_data {
            Some(path) => parse_path(&path)?,
            None => cli.song_data.clone(),
        };
        let log_data = match file.log_data {
            Some(path) => parse_path(&path)?,
            None => cli.log_data.clone(),
        };

        let file_extension = file
            .file_extension
            .unwrap_or_else(|| cli.file_extension.clone());
        let file_extension = file_extension.trim_start_matches('.').to_string();
        if file_extension.is_empty() {
            bail!("file_extension must not be empty");
        }

        let strict_records = file.strict_records.unwrap_or(cli.strict_records);
        let record_policy = if strict_records {
            MalformedRecordPolicy::Abort
        } else {
            MalformedRecordPolicy::Skip
        };

        Ok(Self {
            db_path,
            song_data,
            log_data,
            file_extension,
            keep_schema: file.keep_schema.unwrap_or(cli.keep_schema),
            continue_on_error: file.continue_on_error.unwrap_or(cli.continue_on_error),
            record_policy,
        })
    }

    pub fn batch_options(&self) -> BatchOptions {
        BatchOptions {
            extension: self.file_extension.clone(),
            continue_on_error: self.continue_on_error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_cli_defaults() {
        let config = AppConfig::resolve(&CliConfig::default(), None).unwrap();

        assert_eq!(config.db_path, PathBuf::from("sparkify.db"));
        assert_eq!(config.song_data, PathBuf::from("data/song_data"));
        assert_eq!(config.log_data, PathBuf::from("data/log_data"));
        assert_eq!(config.file_extension, "json");
        assert!(!config.keep_schema);
        assert!(!config.continue_on_error);
        assert_eq!(config.record_policy, MalformedRecordPolicy::Skip);
    }

    #[test]
    fn test_resolve_toml_overrides_cli() {
        let cli = CliConfig {
            db_path: PathBuf::from("/cli/etl.db"),
            song_data: PathBuf::from("/cli/songs"),
            keep_schema: true,
            strict_records: true,
            ..Default::default()
        };

        let file_config = FileConfig {
            db_path: Some("/toml/etl.db".to_string()),
            file_extension: Some(".ndjson".to_string()),
            keep_schema: Some(false),
            continue_on_error: Some(true),
            ..Default::default()
        };

        let config = AppConfig::resolve(&cli, Some(file_config)).unwrap();

        // TOML values should override CLI
        assert_eq!(config.db_path, PathBuf::from("/toml/etl.db"));
        assert_eq!(config.file_extension, "ndjson");
        assert!(!config.keep_schema);
        assert!(config.continue_on_error);
        // CLI value used when TOML doesn't specify
        assert_eq!(config.song_data, PathBuf::from("/cli/songs"));
        assert_eq!(config.log_data, PathBuf::from("data/log_data"));
        assert_eq!(config.record_policy, MalformedRecordPolicy::Abort);
    }

    #[test]
    fn test_resolve_relative_toml_paths_against_cwd() {
        let file_config = FileConfig {
            db_path: Some(MEMORY_DB.to_string()),
            song_data: Some("rel/songs".to_string()),
            log_data: Some("/abs/logs".to_string()),
            ..Default::default()
        };

        let config = AppConfig::resolve(&CliConfig::default(), Some(file_config)).unwrap();

        let cwd = std::env::current_dir().unwrap();
        assert_eq!(config.db_path, PathBuf::from(":memory:"));
        assert_eq!(config.song_data, cwd.join("rel/songs"));
        assert_eq!(config.log_data, PathBuf::from("/abs/logs"));
    }

    #[test]
    fn test_parse_path_matches_for_toml_and_cli_input() {
        let from_cli = parse_path("data/song_data").unwrap();
        let file_config = FileConfig {
            song_data: Some("data/song_data".to_string()),
            ..Default::default()
        };
        let config = AppConfig::resolve(&CliConfig::default(), Some(file_config)).unwrap();

        assert!(from_cli.is_absolute());
        assert_eq!(config.song_data, from_cli);
    }

    #[test]
    fn test_resolve_empty_extension_error() {
        let cli = CliConfig {
            file_extension: ".".to_string(),
            ..Default::default()
        };
        let result = AppConfig::resolve(&cli, None);
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("file_extension must not be empty"));
    }

    #[test]
    fn test_batch_options() {
        let cli = CliConfig {
            continue_on_error: true,
            ..Default::default()
        };
        let options = AppConfig::resolve(&cli, None).unwrap().batch_options();
        assert_eq!(options.extension, "json");
        assert!(options.continue_on_error);
    }
}
