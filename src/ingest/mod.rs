mod processors;
mod runner;
mod walker;

pub use processors::{FileProcessor, FileStats, InsertCounts, LogFileProcessor, SongFileProcessor};
pub use runner::{run_batch, BatchOptions, BatchReport};
pub use walker::discover_files;
