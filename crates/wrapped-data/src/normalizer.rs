//! Schema normalization for the two export formats.
//!
//! The "simple" schema carries four fields per record (`endTime`,
//! `artistName`, `trackName`, `msPlayed`). The "extended" schema carries
//! twenty-plus fields with different names; only the canonical four plus
//! `platform` and `skipped` survive normalization, everything else
//! (connection country, IP, episode/audiobook metadata, offline markers)
//! is dropped.

use std::path::Path;
use std::sync::OnceLock;

use chrono::NaiveDateTime;
use regex::Regex;
use serde_json::Value;

use wrapped_core::error::{Result, WrappedError};
use wrapped_core::models::{ExtendedFields, PlayEvent};

/// Timestamp shapes accepted after offset stripping.
const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

fn offset_suffix_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[+-]\d{2}:?\d{2}$").expect("static regex"))
}

// ── Timestamp handling ────────────────────────────────────────────────────────

/// Strip a trailing UTC designator or numeric offset from a timestamp
/// string.
///
/// The strip is purely textual: the wall-clock fields are preserved as
/// written, no instant is converted between zones. Mixed offsets across a
/// file therefore cannot reorder events relative to their written form.
pub fn strip_offset(raw: &str) -> &str {
    let trimmed = raw.trim();
    if let Some(stripped) = trimmed.strip_suffix(['Z', 'z']) {
        return stripped;
    }
    match offset_suffix_re().find(trimmed) {
        Some(m) => &trimmed[..m.start()],
        None => trimmed,
    }
}

/// Parse a timestamp from either schema into a timezone-naive value.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let bare = strip_offset(raw);
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(bare, fmt).ok())
}

// ── Field extraction ──────────────────────────────────────────────────────────

/// Convert an `msPlayed` value to a non-negative integer.
///
/// Accepts JSON integers, whole non-negative floats and numeric strings.
fn parse_ms_played(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| *f >= 0.0 && f.fract() == 0.0)
                .map(|f| f as u64)
        }),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    }
}

fn string_field<'a>(record: &'a Value, name: &str) -> Option<&'a str> {
    record.get(name).and_then(|v| v.as_str())
}

fn malformed(path: &Path, detail: impl Into<String>) -> WrappedError {
    WrappedError::MalformedRecord {
        path: path.to_path_buf(),
        detail: detail.into(),
    }
}

// ── Simple schema ─────────────────────────────────────────────────────────────

/// Normalize one simple-schema record.
///
/// Every field is required; an untypeable `endTime` or `msPlayed` is a hard
/// failure since aggregation operates on fully-typed data only.
pub fn normalize_simple(record: &Value, path: &Path) -> Result<PlayEvent> {
    let raw_end = string_field(record, "endTime")
        .ok_or_else(|| malformed(path, "missing endTime"))?;
    let end_time = parse_timestamp(raw_end)
        .ok_or_else(|| malformed(path, format!("untypeable endTime '{raw_end}'")))?;

    let ms_value = record
        .get("msPlayed")
        .ok_or_else(|| malformed(path, "missing msPlayed"))?;
    let ms_played = parse_ms_played(ms_value)
        .ok_or_else(|| malformed(path, format!("untypeable msPlayed '{ms_value}'")))?;

    let artist_name = string_field(record, "artistName")
        .ok_or_else(|| malformed(path, "missing artistName"))?
        .to_string();
    let track_name = string_field(record, "trackName")
        .ok_or_else(|| malformed(path, "missing trackName"))?
        .to_string();

    Ok(PlayEvent {
        end_time,
        ms_played,
        artist_name,
        track_name,
        extended: None,
    })
}

// ── Extended schema ───────────────────────────────────────────────────────────

/// Normalize one extended-schema record.
///
/// Returns `Ok(None)` for non-music rows: extended exports interleave
/// podcast/audiobook plays whose track metadata fields are null. Those rows
/// carry no usable artist/track identity and are filtered out rather than
/// rejected.
pub fn normalize_extended(record: &Value, path: &Path) -> Result<Option<PlayEvent>> {
    let artist_name = match string_field(record, "master_metadata_album_artist_name") {
        Some(s) => s.to_string(),
        None => return Ok(None),
    };
    let track_name = match string_field(record, "master_metadata_track_name") {
        Some(s) => s.to_string(),
        None => return Ok(None),
    };

    let raw_end = string_field(record, "ts").ok_or_else(|| malformed(path, "missing ts"))?;
    let end_time = parse_timestamp(raw_end)
        .ok_or_else(|| malformed(path, format!("untypeable ts '{raw_end}'")))?;

    let ms_value = record
        .get("ms_played")
        .ok_or_else(|| malformed(path, "missing ms_played"))?;
    let ms_played = parse_ms_played(ms_value)
        .ok_or_else(|| malformed(path, format!("untypeable ms_played '{ms_value}'")))?;

    // Null platform/skipped appear in older exports; they degrade to an
    // unmatchable platform and a non-skip rather than failing the record.
    let platform = string_field(record, "platform").unwrap_or("").to_string();
    let skipped = record
        .get("skipped")
        .and_then(|v| v.as_bool())
        .unwrap_or(false);

    Ok(Some(PlayEvent {
        end_time,
        ms_played,
        artist_name,
        track_name,
        extended: Some(ExtendedFields { platform, skipped }),
    }))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
