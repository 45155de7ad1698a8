use chrono::NaiveDate;
use clap::Parser;
use std::path::PathBuf;

use crate::error::{Result, WrappedError};

// ── ReportConfig (CLI) ────────────────────────────────────────────────────────

/// Generate a multi-page listening report from a streaming-history export
#[derive(Parser, Debug, Clone)]
#[command(
    name = "wrapped-maker",
    about = "Generate a multi-page listening report from a streaming-history export",
    version
)]
pub struct ReportConfig {
    /// Directory containing the exported history JSON files
    #[arg(long, default_value = "./StreamingHistory")]
    pub input_dir: PathBuf,

    /// Path of the report document to write
    #[arg(long, default_value = "./Wrapped.html")]
    pub output: PathBuf,

    /// First day of the report period (clamped to the available data)
    #[arg(long, default_value = "0001-01-01")]
    pub start_date: NaiveDate,

    /// Last day of the report period (clamped to the available data)
    #[arg(long, default_value = "4000-12-31")]
    pub end_date: NaiveDate,

    /// Number of artists on the top-artist pages
    #[arg(long, default_value_t = 5)]
    pub top_artists: usize,

    /// Number of songs on the top-song pages
    #[arg(long, default_value_t = 10)]
    pub top_songs: usize,

    /// Rolling-mean window (days) for the total play-time chart
    #[arg(long, default_value_t = 7)]
    pub play_time_rolling: usize,

    /// Rolling-mean window (days) for the top-songs chart
    #[arg(long, default_value_t = 7)]
    pub top_songs_rolling: usize,

    /// Rolling-mean window (days) for the top-artists chart
    #[arg(long, default_value_t = 7)]
    pub top_artists_rolling: usize,

    /// Rolling-mean window (days) for the per-device chart
    #[arg(long, default_value_t = 7)]
    pub device_rolling: usize,

    /// Minimum play count for a track to appear in the skip-rate rankings
    #[arg(long, default_value_t = 5)]
    pub min_listens: u64,

    /// Number of tracks on each skip-rate page
    #[arg(long, default_value_t = 10)]
    pub skip_rank_count: usize,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"])]
    pub log_level: String,
}

impl ReportConfig {
    /// Check the configured paths before the pipeline starts.
    ///
    /// The input directory must exist and be a directory; the output's
    /// parent directory must exist. Violations surface as configuration
    /// errors so the run aborts before any page is written.
    pub fn validate(&self) -> Result<()> {
        if !self.input_dir.exists() {
            return Err(WrappedError::Configuration(format!(
                "input directory does not exist: {}",
                self.input_dir.display()
            )));
        }
        if !self.input_dir.is_dir() {
            return Err(WrappedError::Configuration(format!(
                "input path is not a directory: {}",
                self.input_dir.display()
            )));
        }
        if let Some(parent) = self.output.parent() {
            if !parent.as_os_str().is_empty() && !parent.is_dir() {
                return Err(WrappedError::Configuration(format!(
                    "output directory does not exist: {}",
                    parent.display()
                )));
            }
        }
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
