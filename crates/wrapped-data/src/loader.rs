//! Export-file discovery and loading.
//!
//! Scans one directory for the two recognized filename patterns, parses
//! every matching file into normalized [`PlayEvent`] records, deduplicates
//! them and applies the clamped date filter, producing the run's single
//! [`EventSet`].

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;
use serde_json::Value;
use tracing::{debug, info, warn};

use wrapped_core::error::{Result, WrappedError};
use wrapped_core::models::{DateRange, EventSet, PlayEvent};

use crate::normalizer;

fn simple_name_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^StreamingHistory_music_\d+\.json$").expect("static regex"))
}

fn extended_name_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^Streaming_History_Audio_\d{4}(-\d{4})?_\d+\.json$").expect("static regex")
    })
}

// ── Discovery ─────────────────────────────────────────────────────────────────

/// Export files found in the input directory, split by schema.
#[derive(Debug, Default)]
pub struct DiscoveredFiles {
    /// `StreamingHistory_music_<N>.json` files (4-field records).
    pub simple: Vec<PathBuf>,
    /// `Streaming_History_Audio_<YYYY[-YYYY]>_<N>.json` files (20+-field records).
    pub extended: Vec<PathBuf>,
}

impl DiscoveredFiles {
    pub fn is_empty(&self) -> bool {
        self.simple.is_empty() && self.extended.is_empty()
    }
}

/// Find export files directly under `dir`, sorted by filename for a
/// deterministic load order. Files matching neither pattern are ignored.
pub fn discover_history_files(dir: &Path) -> Result<DiscoveredFiles> {
    let mut found = DiscoveredFiles::default();

    for entry in walkdir::WalkDir::new(dir).max_depth(1).follow_links(true) {
        let entry = entry.map_err(|e| {
            WrappedError::Configuration(format!("cannot scan {}: {e}", dir.display()))
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
            continue;
        };
        if simple_name_re().is_match(&name) {
            found.simple.push(entry.into_path());
        } else if extended_name_re().is_match(&name) {
            found.extended.push(entry.into_path());
        } else {
            debug!("Ignoring non-export file {}", name);
        }
    }

    found.simple.sort();
    found.extended.sort();
    Ok(found)
}

// ── Loading ───────────────────────────────────────────────────────────────────

/// Load, normalize, deduplicate and date-filter every export in `dir`.
///
/// Extended files load before simple files so the extended schema takes
/// precedence for shared semantics. A directory with zero matching files
/// yields an empty set, never an error; every downstream aggregate must
/// tolerate that.
pub fn load_event_set(
    dir: &Path,
    requested_start: NaiveDate,
    requested_end: NaiveDate,
) -> Result<EventSet> {
    let files = discover_history_files(dir)?;
    if files.is_empty() {
        warn!("No export files found in {}", dir.display());
    }

    let mut raw: Vec<PlayEvent> = Vec::new();
    for path in &files.extended {
        let records = read_records(path)?;
        let before = raw.len();
        for record in &records {
            if let Some(event) = normalizer::normalize_extended(record, path)? {
                raw.push(event);
            }
        }
        debug!(
            "File {}: {} records, {} music events",
            path.display(),
            records.len(),
            raw.len() - before
        );
    }
    for path in &files.simple {
        let records = read_records(path)?;
        for record in &records {
            raw.push(normalizer::normalize_simple(record, path)?);
        }
        debug!("File {}: {} records", path.display(), records.len());
    }

    // Collapse identical events, keeping the first occurrence so ranking
    // tie-breaks stay input-order dependent.
    let mut seen: HashSet<PlayEvent> = HashSet::with_capacity(raw.len());
    let mut events: Vec<PlayEvent> = Vec::with_capacity(raw.len());
    for event in raw {
        if seen.insert(event.clone()) {
            events.push(event);
        }
    }

    let extent = data_extent(&events);
    let range = DateRange::from_request(requested_start, requested_end, extent);
    let before_filter = events.len();
    events.retain(|e| range.contains(e.end_time));

    info!(
        "Loaded {} events ({} dropped outside {} .. {}) from {} extended / {} simple files",
        events.len(),
        before_filter - events.len(),
        range.start,
        range.end,
        files.extended.len(),
        files.simple.len()
    );

    Ok(EventSet::new(events, !files.extended.is_empty(), range))
}

/// Parse one export file as a JSON array of records.
fn read_records(path: &Path) -> Result<Vec<Value>> {
    let content = std::fs::read_to_string(path).map_err(|source| WrappedError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| WrappedError::JsonParse {
        path: path.to_path_buf(),
        source,
    })
}

/// Min/max event dates, `None` for an empty collection.
fn data_extent(events: &[PlayEvent]) -> Option<(NaiveDate, NaiveDate)> {
    let min = events.iter().map(|e| e.end_time.date()).min()?;
    let max = events.iter().map(|e| e.end_time.date()).max()?;
    Some((min, max))
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn wide_start() -> NaiveDate {
        date(1, 1, 1)
    }

    fn wide_end() -> NaiveDate {
        date(4000, 12, 31)
    }

    fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    fn simple_record(end_time: &str, artist: &str, track: &str, ms: u64) -> Value {
        json!({
            "endTime": end_time,
            "artistName": artist,
            "trackName": track,
            "msPlayed": ms,
        })
    }

    fn extended_record(ts: &str, artist: &str, track: &str, ms: u64) -> Value {
        json!({
            "ts": ts,
            "platform": "Linux; web player",
            "ms_played": ms,
            "conn_country": "SE",
            "master_metadata_track_name": track,
            "master_metadata_album_artist_name": artist,
            "master_metadata_album_album_name": "Album",
            "skipped": false,
            "shuffle": false,
            "offline": false,
            "incognito_mode": false,
        })
    }

    // ── discover_history_files ────────────────────────────────────────────

    #[test]
    fn test_discovery_recognizes_both_patterns() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "StreamingHistory_music_0.json", "[]");
        write_file(dir.path(), "StreamingHistory_music_12.json", "[]");
        write_file(dir.path(), "Streaming_History_Audio_2022_0.json", "[]");
        write_file(dir.path(), "Streaming_History_Audio_2022-2023_1.json", "[]");

        let found = discover_history_files(dir.path()).unwrap();
        assert_eq!(found.simple.len(), 2);
        assert_eq!(found.extended.len(), 2);
    }

    #[test]
    fn test_discovery_ignores_unmatched_files() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "notes.txt", "hi");
        write_file(dir.path(), "StreamingHistory_podcast_0.json", "[]");
        write_file(dir.path(), "Streaming_History_Video_2022_0.json", "[]");
        write_file(dir.path(), "StreamingHistory_music_0.json.bak", "[]");

        let found = discover_history_files(dir.path()).unwrap();
        assert!(found.is_empty());
    }

    #[test]
    fn test_discovery_sorted_by_filename() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "StreamingHistory_music_2.json", "[]");
        write_file(dir.path(), "StreamingHistory_music_0.json", "[]");
        write_file(dir.path(), "StreamingHistory_music_1.json", "[]");

        let found = discover_history_files(dir.path()).unwrap();
        let names: Vec<&str> = found
            .simple
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(
            names,
            vec![
                "StreamingHistory_music_0.json",
                "StreamingHistory_music_1.json",
                "StreamingHistory_music_2.json"
            ]
        );
    }

    // ── load_event_set ────────────────────────────────────────────────────

    #[test]
    fn test_load_concatenates_all_matching_files() {
        let dir = TempDir::new().unwrap();
        write_file(
            dir.path(),
            "StreamingHistory_music_0.json",
            &json!([simple_record("2023-06-01 10:00", "A", "X", 1000)]).to_string(),
        );
        write_file(
            dir.path(),
            "StreamingHistory_music_1.json",
            &json!([simple_record("2023-06-02 11:00", "B", "Y", 2000)]).to_string(),
        );

        let set = load_event_set(dir.path(), wide_start(), wide_end()).unwrap();
        assert_eq!(set.len(), 2);
        assert!(!set.extended());
    }

    #[test]
    fn test_load_deduplicates_identical_records() {
        let dir = TempDir::new().unwrap();
        let record = simple_record("2023-06-01 10:00", "A", "X", 1000);
        write_file(
            dir.path(),
            "StreamingHistory_music_0.json",
            &json!([record.clone(), record.clone()]).to_string(),
        );
        // Same record again in a second file.
        write_file(
            dir.path(),
            "StreamingHistory_music_1.json",
            &json!([record]).to_string(),
        );

        let set = load_event_set(dir.path(), wide_start(), wide_end()).unwrap();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_load_clamps_range_to_data_extent() {
        let dir = TempDir::new().unwrap();
        write_file(
            dir.path(),
            "StreamingHistory_music_0.json",
            &json!([
                simple_record("2023-03-10 08:00", "A", "X", 1000),
                simple_record("2023-09-20 22:00", "B", "Y", 2000),
            ])
            .to_string(),
        );

        let set = load_event_set(dir.path(), wide_start(), wide_end()).unwrap();
        assert_eq!(set.range().start, date(2023, 3, 10));
        assert_eq!(set.range().end, date(2023, 9, 20));
    }

    #[test]
    fn test_load_filters_events_outside_requested_range() {
        let dir = TempDir::new().unwrap();
        write_file(
            dir.path(),
            "StreamingHistory_music_0.json",
            &json!([
                simple_record("2023-05-31 23:59", "A", "Early", 1000),
                simple_record("2023-06-15 12:00", "A", "Inside", 1000),
                simple_record("2023-07-01 00:00", "A", "Late", 1000),
            ])
            .to_string(),
        );

        let set =
            load_event_set(dir.path(), date(2023, 6, 1), date(2023, 6, 30)).unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set.events()[0].track_name, "Inside");
    }

    #[test]
    fn test_load_mixed_schemas_sets_extended_and_keeps_simple_events() {
        let dir = TempDir::new().unwrap();
        write_file(
            dir.path(),
            "StreamingHistory_music_0.json",
            &json!([simple_record("2023-06-01 10:00", "A", "X", 1000)]).to_string(),
        );
        write_file(
            dir.path(),
            "Streaming_History_Audio_2023_0.json",
            &json!([extended_record("2023-06-02T11:00:00Z", "B", "Y", 2000)]).to_string(),
        );

        let set = load_event_set(dir.path(), wide_start(), wide_end()).unwrap();
        assert_eq!(set.len(), 2);
        assert!(set.extended());
        // Extended files load first.
        assert_eq!(set.events()[0].artist_name, "B");
        assert!(set.events()[0].extended.is_some());
        assert!(set.events()[1].extended.is_none());
    }

    #[test]
    fn test_load_empty_directory_yields_empty_set() {
        let dir = TempDir::new().unwrap();
        let set = load_event_set(dir.path(), wide_start(), wide_end()).unwrap();
        assert!(set.is_empty());
        assert!(!set.extended());
        assert_eq!(set.total_ms(), 0);
    }

    #[test]
    fn test_load_podcast_rows_are_dropped() {
        let dir = TempDir::new().unwrap();
        let mut podcast = extended_record("2023-06-01T09:00:00Z", "", "", 500);
        podcast["master_metadata_track_name"] = Value::Null;
        podcast["master_metadata_album_artist_name"] = Value::Null;
        podcast["episode_name"] = json!("Episode 1");
        write_file(
            dir.path(),
            "Streaming_History_Audio_2023_0.json",
            &json!([
                podcast,
                extended_record("2023-06-02T11:00:00Z", "B", "Y", 2000)
            ])
            .to_string(),
        );

        let set = load_event_set(dir.path(), wide_start(), wide_end()).unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set.events()[0].artist_name, "B");
    }

    #[test]
    fn test_load_invalid_json_is_a_parse_error() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "StreamingHistory_music_0.json", "{not json[");

        let err = load_event_set(dir.path(), wide_start(), wide_end()).unwrap_err();
        assert!(matches!(err, WrappedError::JsonParse { .. }));
    }

    #[test]
    fn test_load_malformed_record_aborts() {
        let dir = TempDir::new().unwrap();
        write_file(
            dir.path(),
            "StreamingHistory_music_0.json",
            &json!([{
                "endTime": "2023-06-01 10:00",
                "artistName": "A",
                "trackName": "X",
                "msPlayed": "not-a-number",
            }])
            .to_string(),
        );

        let err = load_event_set(dir.path(), wide_start(), wide_end()).unwrap_err();
        assert!(matches!(err, WrappedError::MalformedRecord { .. }));
    }
}
