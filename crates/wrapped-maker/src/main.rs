mod bootstrap;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use wrapped_core::config::ReportConfig;
use wrapped_core::error::WrappedError;
use wrapped_data::aggregator::Aggregator;
use wrapped_data::loader;
use wrapped_render::chart;
use wrapped_render::document::ReportDocument;
use wrapped_render::sections;

fn main() -> Result<()> {
    let config = ReportConfig::parse();
    bootstrap::setup_logging(&config.log_level)?;

    tracing::info!("wrapped-maker v{} starting", env!("CARGO_PKG_VERSION"));
    config.validate()?;

    let (pages, path) = run(&config)?;
    tracing::info!("Report complete: {} pages", pages);
    println!("{}", path.display());
    Ok(())
}

/// The whole pipeline, strictly sequential: load, aggregate, build and
/// render each section, finalize the document once.
///
/// A section that needs extended data on a simple-only export is skipped
/// with a warning; any other error aborts before the document is written.
fn run(config: &ReportConfig) -> wrapped_core::error::Result<(usize, PathBuf)> {
    let events = loader::load_event_set(&config.input_dir, config.start_date, config.end_date)?;
    tracing::info!(
        "Report period {} to {}, {} events",
        events.range().start,
        events.range().end,
        events.len()
    );

    let mut aggregator = Aggregator::new(&events);
    let mut document = ReportDocument::new(&config.output, "Listening Wrapped");

    for section in sections::CATALOGUE {
        match section.build(&mut aggregator, config) {
            Ok(pages) => {
                for page in pages {
                    tracing::debug!("Rendering page '{}'", page.title());
                    document.append_page(chart::render_page(&page)?);
                }
            }
            Err(WrappedError::UnsupportedSection(name)) => {
                tracing::warn!(
                    "Skipping section '{}': requires the extended export format",
                    name
                );
            }
            Err(err) => return Err(err),
        }
    }

    let pages = document.page_count();
    let path = document.finish()?;
    Ok((pages, path))
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn config_for(dir: &TempDir) -> ReportConfig {
        let mut config = ReportConfig::parse_from(["wrapped-maker"]);
        config.input_dir = dir.path().join("history");
        config.output = dir.path().join("Wrapped.html");
        std::fs::create_dir_all(&config.input_dir).unwrap();
        config
    }

    fn write_extended_export(config: &ReportConfig) {
        let records = json!([
            {
                "ts": "2023-06-01T10:00:00Z",
                "platform": "Linux; web player",
                "ms_played": 3_600_000,
                "master_metadata_track_name": "SongX",
                "master_metadata_album_artist_name": "ArtistA",
                "skipped": false,
            },
            {
                "ts": "2023-06-02T11:00:00Z",
                "platform": "Android OS 11",
                "ms_played": 1_800_000,
                "master_metadata_track_name": "SongY",
                "master_metadata_album_artist_name": "ArtistB",
                "skipped": true,
            },
        ]);
        std::fs::write(
            config.input_dir.join("Streaming_History_Audio_2023_0.json"),
            records.to_string(),
        )
        .unwrap();
    }

    fn write_simple_export(config: &ReportConfig) {
        let records = json!([
            {
                "endTime": "2023-06-01 10:00",
                "artistName": "ArtistA",
                "trackName": "SongX",
                "msPlayed": 3_600_000,
            },
        ]);
        std::fs::write(
            config.input_dir.join("StreamingHistory_music_0.json"),
            records.to_string(),
        )
        .unwrap();
    }

    #[test]
    fn test_run_extended_export_renders_all_pages() {
        let dir = TempDir::new().unwrap();
        let config = config_for(&dir);
        write_extended_export(&config);

        let (pages, path) = run(&config).unwrap();
        // Eleven sections, skip-stats contributes two pages.
        assert_eq!(pages, 12);
        let content = std::fs::read_to_string(path).unwrap();
        assert_eq!(content.matches("<div class=\"page\">").count(), 12);
        assert!(content.contains("Listening Wrapped"));
    }

    #[test]
    fn test_run_simple_export_skips_extended_sections() {
        let dir = TempDir::new().unwrap();
        let config = config_for(&dir);
        write_simple_export(&config);

        let (pages, _) = run(&config).unwrap();
        // Skip-stats (2 pages), device-breakdown and device-chart are skipped.
        assert_eq!(pages, 8);
    }

    #[test]
    fn test_run_empty_directory_still_finalizes_document() {
        let dir = TempDir::new().unwrap();
        let config = config_for(&dir);

        let (pages, path) = run(&config).unwrap();
        assert_eq!(pages, 8);
        assert!(path.exists());
    }

    #[test]
    fn test_run_malformed_export_aborts_before_writing() {
        let dir = TempDir::new().unwrap();
        let config = config_for(&dir);
        std::fs::write(
            config.input_dir.join("StreamingHistory_music_0.json"),
            "{not json",
        )
        .unwrap();

        assert!(run(&config).is_err());
        assert!(!config.output.exists());
    }
}
