use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::calculations;

// ── PlayEvent ─────────────────────────────────────────────────────────────────

/// Fields only present in events sourced from the extended export format.
///
/// Either all extended fields are present for an event or none are; the
/// normalizer never produces a partially-populated set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExtendedFields {
    /// Free-text device/OS description, e.g. `"Android OS 11 API 30"`.
    pub platform: String,
    /// Whether the track was skipped before completion.
    pub skipped: bool,
}

/// One listening event from a streaming-history export.
///
/// Identity is structural: two events with all fields equal are duplicates
/// and are collapsed to one during loading.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayEvent {
    /// Timezone-naive completion time of the play.
    pub end_time: NaiveDateTime,
    /// Milliseconds actually played. Never negative.
    pub ms_played: u64,
    /// Performing artist.
    pub artist_name: String,
    /// Track title.
    pub track_name: String,
    /// Extended-schema fields, absent for simple-schema events.
    pub extended: Option<ExtendedFields>,
}

// ── DateRange ─────────────────────────────────────────────────────────────────

/// Inclusive report period `[start, end]`, clamped to the intersection of
/// the user-requested range and the data extent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Clamp the requested period to the actual data extent.
    ///
    /// With no data the range collapses to the requested start date so that
    /// downstream day iteration stays bounded. A request disjoint from the
    /// data produces a crossed range (`end < start`) which filters and
    /// iterates as empty.
    pub fn from_request(
        requested_start: NaiveDate,
        requested_end: NaiveDate,
        data_extent: Option<(NaiveDate, NaiveDate)>,
    ) -> Self {
        match data_extent {
            Some((data_min, data_max)) => Self {
                start: requested_start.max(data_min),
                end: requested_end.min(data_max),
            },
            None => Self {
                start: requested_start,
                end: requested_start,
            },
        }
    }

    /// Whether `ts` falls inside `[start, end + 1 day)`.
    pub fn contains(&self, ts: NaiveDateTime) -> bool {
        let day = ts.date();
        day >= self.start && day <= self.end
    }

    /// Number of calendar days covered, minimum 1.
    ///
    /// Crossed ranges clamp to 1 so that per-day averages never divide by
    /// zero or a negative count.
    pub fn days(&self) -> i64 {
        ((self.end - self.start).num_days() + 1).max(1)
    }

    /// Iterate every calendar day in the range, in order. Empty for
    /// crossed ranges.
    pub fn iter_days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        let end = self.end;
        std::iter::successors(Some(self.start), |d| d.succ_opt()).take_while(move |d| *d <= end)
    }
}

// ── EventSet ──────────────────────────────────────────────────────────────────

/// The deduplicated, normalized, date-filtered event collection for one run.
///
/// Immutable after construction. Event order is load order (extended files
/// before simple files, records in file order), which downstream ranking
/// relies on for tie-breaking.
#[derive(Debug, Clone)]
pub struct EventSet {
    events: Vec<PlayEvent>,
    extended: bool,
    range: DateRange,
}

impl EventSet {
    /// Build an event set from already-filtered events.
    pub fn new(events: Vec<PlayEvent>, extended: bool, range: DateRange) -> Self {
        Self {
            events,
            extended,
            range,
        }
    }

    /// All events, in load order.
    pub fn events(&self) -> &[PlayEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Whether every report section can be served: true iff at least one
    /// extended-schema file contributed events.
    pub fn extended(&self) -> bool {
        self.extended
    }

    /// The clamped report period.
    pub fn range(&self) -> DateRange {
        self.range
    }

    /// Sum of `ms_played` across all events.
    pub fn total_ms(&self) -> u64 {
        self.events.iter().map(|e| e.ms_played).sum()
    }
}

// ── GroupKey ──────────────────────────────────────────────────────────────────

/// Grouping key for ranked aggregates: an artist, or an (artist, track) pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GroupKey {
    Artist(String),
    Track { artist: String, track: String },
}

impl GroupKey {
    /// Human-readable label used on chart axes and legends.
    pub fn label(&self) -> String {
        match self {
            GroupKey::Artist(artist) => artist.clone(),
            GroupKey::Track { artist, track } => format!("{track} - {artist}"),
        }
    }

    /// Short label for chart legends: the track title alone for track keys.
    pub fn short_label(&self) -> &str {
        match self {
            GroupKey::Artist(artist) => artist,
            GroupKey::Track { track, .. } => track,
        }
    }

    /// Whether `event` belongs to this group.
    pub fn matches(&self, event: &PlayEvent) -> bool {
        match self {
            GroupKey::Artist(artist) => event.artist_name == *artist,
            GroupKey::Track { artist, track } => {
                event.artist_name == *artist && event.track_name == *track
            }
        }
    }
}

// ── RankedAggregate ───────────────────────────────────────────────────────────

/// An ordered `(group key, play count)` ranking, descending by count,
/// truncated to the requested top N.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RankedAggregate {
    pub entries: Vec<(GroupKey, u64)>,
}

impl RankedAggregate {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The first `n` entries as a new aggregate.
    pub fn truncated(&self, n: usize) -> Self {
        Self {
            entries: self.entries.iter().take(n).cloned().collect(),
        }
    }
}

// ── TimeSeries ────────────────────────────────────────────────────────────────

/// A daily series with one point per calendar day, missing days filled
/// with zero.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeSeries {
    pub points: Vec<(NaiveDate, f64)>,
}

impl TimeSeries {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Trailing rolling mean of the series.
    ///
    /// The first `window - 1` positions have no fully-covered window and are
    /// dropped, so the smoothed series starts on the first day with `window`
    /// points behind it.
    pub fn rolling_mean(&self, window: usize) -> TimeSeries {
        let values: Vec<f64> = self.points.iter().map(|(_, v)| *v).collect();
        let smoothed = calculations::rolling_mean(&values, window);
        TimeSeries {
            points: self
                .points
                .iter()
                .zip(smoothed)
                .filter_map(|((date, _), mean)| mean.map(|m| (*date, m)))
                .collect(),
        }
    }

    /// Largest value in the series, 0.0 when empty.
    pub fn max_value(&self) -> f64 {
        self.points.iter().map(|(_, v)| *v).fold(0.0, f64::max)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
