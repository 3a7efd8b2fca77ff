//! Temp-dir warehouse and data tree.

#![allow(dead_code)]

use rusqlite::Connection;
use songplays_etl::{open_warehouse, run_pipeline, AppConfig, CliConfig, PipelineSummary};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

pub struct TestWarehouse {
    // Keeps the directory alive for the duration of the test
    _dir: TempDir,
    pub root: PathBuf,
    pub cli: CliConfig,
}

impl TestWarehouse {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let root = dir.path().to_path_buf();
        fs::create_dir_all(root.join("song_data")).expect("Failed to create song_data");
        fs::create_dir_all(root.join("log_data")).expect("Failed to create log_data");

        let cli = CliConfig {
            db_path: root.join("sparkify.db"),
            song_data: root.join("song_data"),
            log_data: root.join("log_data"),
            ..Default::default()
        };

        Self {
            _dir: dir,
            root,
            cli,
        }
    }

    /// Write a song file under `song_data/<rel_path>`, creating parents.
    pub fn add_song_file(&self, rel_path: &str, content: &str) {
        self.write(self.root.join("song_data").join(rel_path), content);
    }

    /// Write a log file under `log_data/<rel_path>`, one record per line.
    pub fn add_log_file(&self, rel_path: &str, lines: &[String]) {
        self.write(self.root.join("log_data").join(rel_path), &lines.join("\n"));
    }

    fn write(&self, path: PathBuf, content: &str) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent dir");
        }
        fs::write(&path, content).expect("Failed to write data file");
    }

    pub fn config(&self) -> AppConfig {
        AppConfig::resolve(&self.cli, None).expect("Failed to resolve config")
    }

    pub fn connect(&self) -> Connection {
        open_warehouse(&self.cli.db_path).expect("Failed to open warehouse")
    }

    pub fn run(&self) -> anyhow::Result<PipelineSummary> {
        self.run_with(self.config())
    }

    pub fn run_with(&self, config: AppConfig) -> anyhow::Result<PipelineSummary> {
        let mut conn = self.connect();
        run_pipeline(&mut conn, &config)
    }
}
