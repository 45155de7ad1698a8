//! The aggregation engine: grouped counts, rankings and daily series over
//! one [`EventSet`].
//!
//! Every operation is pure over the immutable event collection and
//! tolerates an empty set by returning empty/zero results. The only state
//! is the monotonic top-N cache: a ranking is recomputed when a larger N
//! is requested than previously cached, otherwise the cached ranking is
//! truncated.

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate, Timelike};

use wrapped_core::calculations;
use wrapped_core::error::{Result, WrappedError};
use wrapped_core::models::{EventSet, GroupKey, PlayEvent, RankedAggregate, TimeSeries};

// ── Device buckets ────────────────────────────────────────────────────────────

/// Fixed device classification table: bucket label and the case-insensitive
/// substrings that map a free-text platform string into it.
///
/// Buckets match independently, so a platform string containing several
/// markers contributes to several buckets; the "Other" bucket is derived as
/// `total - sum(matched)` and absorbs the difference (which can go negative
/// in that case).
pub const DEVICE_BUCKETS: &[(&str, &[&str])] = &[
    ("Windows", &["windows"]),
    ("Linux", &["linux"]),
    ("PlayStation", &["ps5", "ps4", "ps3", "ps2", "playstation"]),
    ("Android", &["android"]),
    ("iOS", &["ios"]),
    ("macOS", &["macos", "osx", "os x"]),
];

/// Label of the derived remainder bucket.
pub const OTHER_BUCKET: &str = "Other";

/// Listening time attributed to one device bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceUsage {
    pub label: String,
    pub hours: f64,
}

// ── Skip statistics ───────────────────────────────────────────────────────────

/// Skip behaviour of one track.
#[derive(Debug, Clone, PartialEq)]
pub struct SkipEntry {
    pub artist: String,
    pub track: String,
    /// Plays counted for this track (skipped and completed).
    pub total: u64,
    /// Plays flagged as skipped.
    pub skipped: u64,
    /// `skipped / total * 100`, in `[0, 100]`.
    pub percent_skipped: f64,
}

/// Both skip-rate rankings over tracks with at least `min_listens` plays.
#[derive(Debug, Clone, Default)]
pub struct SkipStatistics {
    /// Descending by skip percentage, ties broken by higher play count.
    pub most_skipped: Vec<SkipEntry>,
    /// Ascending by skip percentage, ties broken by higher play count.
    pub least_skipped: Vec<SkipEntry>,
}

// ── Aggregator ────────────────────────────────────────────────────────────────

/// Aggregation engine over one event set.
pub struct Aggregator<'a> {
    set: &'a EventSet,
    top_songs_cache: Option<(usize, RankedAggregate)>,
    top_artists_cache: Option<(usize, RankedAggregate)>,
}

impl<'a> Aggregator<'a> {
    pub fn new(set: &'a EventSet) -> Self {
        Self {
            set,
            top_songs_cache: None,
            top_artists_cache: None,
        }
    }

    pub fn event_set(&self) -> &EventSet {
        self.set
    }

    // ── Rankings ──────────────────────────────────────────────────────────

    /// Top `n` artists by play count, descending. Ties break by first
    /// appearance in the event set.
    pub fn top_artists(&mut self, n: usize) -> RankedAggregate {
        if let Some((cached_n, agg)) = &self.top_artists_cache {
            if *cached_n >= n {
                return agg.truncated(n);
            }
        }
        let agg = ranked(self.set.events(), n, |e| {
            GroupKey::Artist(e.artist_name.clone())
        });
        let out = agg.clone();
        self.top_artists_cache = Some((n, agg));
        out
    }

    /// Top `n` (artist, track) pairs by play count, descending.
    pub fn top_songs(&mut self, n: usize) -> RankedAggregate {
        if let Some((cached_n, agg)) = &self.top_songs_cache {
            if *cached_n >= n {
                return agg.truncated(n);
            }
        }
        let agg = ranked(self.set.events(), n, |e| GroupKey::Track {
            artist: e.artist_name.clone(),
            track: e.track_name.clone(),
        });
        let out = agg.clone();
        self.top_songs_cache = Some((n, agg));
        out
    }

    // ── Series ────────────────────────────────────────────────────────────

    /// Daily play counts for one group over the full report range,
    /// zero-filled for days without plays.
    pub fn daily_series_for(&self, key: &GroupKey) -> TimeSeries {
        if self.set.is_empty() {
            return TimeSeries::default();
        }
        let mut per_day: HashMap<NaiveDate, f64> = HashMap::new();
        for event in self.set.events().iter().filter(|e| key.matches(e)) {
            *per_day.entry(event.end_time.date()).or_default() += 1.0;
        }
        self.zero_filled(&per_day)
    }

    /// Daily total play time in hours, zero-filled.
    pub fn daily_play_hours(&self) -> TimeSeries {
        if self.set.is_empty() {
            return TimeSeries::default();
        }
        let mut per_day: HashMap<NaiveDate, f64> = HashMap::new();
        for event in self.set.events() {
            *per_day.entry(event.end_time.date()).or_default() +=
                calculations::ms_to_hours(event.ms_played);
        }
        self.zero_filled(&per_day)
    }

    // ── Totals and distributions ──────────────────────────────────────────

    /// Total listening time in hours.
    pub fn total_play_hours(&self) -> f64 {
        calculations::ms_to_hours(self.set.total_ms())
    }

    /// Listening-time share per hour of day, 24 buckets, percentages of
    /// the total. All zeros when the set is empty.
    pub fn hourly_distribution(&self) -> Vec<f64> {
        let mut ms = [0.0f64; 24];
        for event in self.set.events() {
            ms[event.end_time.hour() as usize] += event.ms_played as f64;
        }
        calculations::percentages(&ms)
    }

    /// Listening-time share per weekday, Monday=0 .. Sunday=6, percentages
    /// of the total.
    pub fn weekday_distribution(&self) -> Vec<f64> {
        let mut ms = [0.0f64; 7];
        for event in self.set.events() {
            ms[event.end_time.weekday().num_days_from_monday() as usize] +=
                event.ms_played as f64;
        }
        calculations::percentages(&ms)
    }

    // ── Extended-only operations ──────────────────────────────────────────

    /// Skip-rate rankings per track. Requires extended data; only events
    /// carrying extended fields are counted.
    pub fn skip_statistics(&self, min_listens: u64) -> Result<SkipStatistics> {
        self.require_extended("skip-stats")?;

        let mut counts: HashMap<(String, String), (u64, u64, usize)> = HashMap::new();
        for event in self.set.events() {
            let Some(ext) = &event.extended else {
                continue;
            };
            let key = (event.artist_name.clone(), event.track_name.clone());
            let next_index = counts.len();
            let entry = counts.entry(key).or_insert((0, 0, next_index));
            entry.0 += 1;
            if ext.skipped {
                entry.1 += 1;
            }
        }

        let mut entries: Vec<(SkipEntry, usize)> = counts
            .into_iter()
            .filter(|(_, (total, _, _))| *total >= min_listens)
            .map(|((artist, track), (total, skipped, index))| {
                (
                    SkipEntry {
                        artist,
                        track,
                        total,
                        skipped,
                        percent_skipped: skipped as f64 / total as f64 * 100.0,
                    },
                    index,
                )
            })
            .collect();

        // Most skipped: percent desc, then play count desc, then first
        // appearance for full determinism.
        entries.sort_by(|(a, ai), (b, bi)| {
            b.percent_skipped
                .total_cmp(&a.percent_skipped)
                .then(b.total.cmp(&a.total))
                .then(ai.cmp(bi))
        });
        let most_skipped: Vec<SkipEntry> = entries.iter().map(|(e, _)| e.clone()).collect();

        entries.sort_by(|(a, ai), (b, bi)| {
            a.percent_skipped
                .total_cmp(&b.percent_skipped)
                .then(b.total.cmp(&a.total))
                .then(ai.cmp(bi))
        });
        let least_skipped: Vec<SkipEntry> = entries.into_iter().map(|(e, _)| e).collect();

        Ok(SkipStatistics {
            most_skipped,
            least_skipped,
        })
    }

    /// Listening hours per device bucket, descending, with the derived
    /// "Other" remainder. Requires extended data.
    pub fn device_breakdown(&self) -> Result<Vec<DeviceUsage>> {
        self.require_extended("device-breakdown")?;

        let mut usage: Vec<DeviceUsage> = DEVICE_BUCKETS
            .iter()
            .map(|(label, patterns)| DeviceUsage {
                label: (*label).to_string(),
                hours: self.bucket_hours(patterns),
            })
            .collect();

        let matched: f64 = usage.iter().map(|u| u.hours).sum();
        usage.push(DeviceUsage {
            label: OTHER_BUCKET.to_string(),
            hours: self.total_play_hours() - matched,
        });

        usage.sort_by(|a, b| b.hours.total_cmp(&a.hours));
        Ok(usage)
    }

    /// Daily listening hours for one device bucket, zero-filled. The
    /// "Other" bucket is the daily remainder `total - sum(matched)`.
    pub fn device_daily_series(&self, bucket_label: &str) -> Result<TimeSeries> {
        self.require_extended("device-chart")?;
        if self.set.is_empty() {
            return Ok(TimeSeries::default());
        }

        let mut per_day: HashMap<NaiveDate, f64> = HashMap::new();
        if bucket_label == OTHER_BUCKET {
            for event in self.set.events() {
                let hours = calculations::ms_to_hours(event.ms_played);
                let matched: f64 = DEVICE_BUCKETS
                    .iter()
                    .filter(|(_, patterns)| event_matches(event, patterns))
                    .count() as f64
                    * hours;
                *per_day.entry(event.end_time.date()).or_default() += hours - matched;
            }
        } else {
            let patterns = DEVICE_BUCKETS
                .iter()
                .find(|(label, _)| *label == bucket_label)
                .map(|(_, patterns)| *patterns)
                .unwrap_or(&[]);
            for event in self.set.events().iter().filter(|e| event_matches(e, patterns)) {
                *per_day.entry(event.end_time.date()).or_default() +=
                    calculations::ms_to_hours(event.ms_played);
            }
        }
        Ok(self.zero_filled(&per_day))
    }

    // ── Private ───────────────────────────────────────────────────────────

    fn require_extended(&self, section: &str) -> Result<()> {
        if self.set.extended() {
            Ok(())
        } else {
            Err(WrappedError::UnsupportedSection(section.to_string()))
        }
    }

    fn bucket_hours(&self, patterns: &[&str]) -> f64 {
        self.set
            .events()
            .iter()
            .filter(|e| event_matches(e, patterns))
            .map(|e| calculations::ms_to_hours(e.ms_played))
            .sum()
    }

    fn zero_filled(&self, per_day: &HashMap<NaiveDate, f64>) -> TimeSeries {
        TimeSeries {
            points: self
                .set
                .range()
                .iter_days()
                .map(|day| (day, per_day.get(&day).copied().unwrap_or(0.0)))
                .collect(),
        }
    }
}

/// Case-insensitive substring match of an event's platform against a
/// bucket's pattern list. Events without extended fields match nothing.
fn event_matches(event: &PlayEvent, patterns: &[&str]) -> bool {
    match &event.extended {
        Some(ext) => {
            let platform = ext.platform.to_lowercase();
            patterns.iter().any(|p| platform.contains(p))
        }
        None => false,
    }
}

/// Group events, count plays per key, rank descending with first-appearance
/// tie-breaking, truncate to `n`.
fn ranked(
    events: &[PlayEvent],
    n: usize,
    key_fn: impl Fn(&PlayEvent) -> GroupKey,
) -> RankedAggregate {
    let mut counts: HashMap<GroupKey, (u64, usize)> = HashMap::new();
    for event in events {
        let key = key_fn(event);
        let next_index = counts.len();
        counts.entry(key).or_insert((0, next_index)).0 += 1;
    }

    let mut entries: Vec<(GroupKey, u64, usize)> = counts
        .into_iter()
        .map(|(key, (count, index))| (key, count, index))
        .collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));
    entries.truncate(n);

    RankedAggregate {
        entries: entries.into_iter().map(|(key, count, _)| (key, count)).collect(),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
