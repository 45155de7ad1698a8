//! The fixed report-section catalogue.
//!
//! Each section turns aggregation results into one or two page descriptors
//! and performs no I/O of its own. The catalogue order is the page order of
//! the final document. Sections that need extended-schema data surface
//! [`WrappedError::UnsupportedSection`] so the pipeline can warn and skip
//! them without aborting the run.

use wrapped_core::calculations;
use wrapped_core::config::ReportConfig;
use wrapped_core::error::Result;
use wrapped_core::models::RankedAggregate;
use wrapped_data::aggregator::{Aggregator, OTHER_BUCKET};

use crate::page::{Bar, BarChart, BarOrientation, LineChart, Page, SeriesLine, TextPage};

/// Weekday axis labels, Monday first to match the weekday bucket order.
pub const WEEKDAY_LABELS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

// ── Catalogue ─────────────────────────────────────────────────────────────────

/// One report section. Variants are listed in invocation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    FrontPage,
    TopSongs,
    TopSongsChart,
    TopArtists,
    TopArtistsChart,
    SkipStats,
    PlayTime,
    HourlyDistribution,
    WeekdayDistribution,
    DeviceBreakdown,
    DeviceChart,
}

/// Every section in the order its pages are appended to the document.
pub const CATALOGUE: [Section; 11] = [
    Section::FrontPage,
    Section::TopSongs,
    Section::TopSongsChart,
    Section::TopArtists,
    Section::TopArtistsChart,
    Section::SkipStats,
    Section::PlayTime,
    Section::HourlyDistribution,
    Section::WeekdayDistribution,
    Section::DeviceBreakdown,
    Section::DeviceChart,
];

impl Section {
    /// Stable name used in logs and skip warnings.
    pub fn name(self) -> &'static str {
        match self {
            Section::FrontPage => "front-page",
            Section::TopSongs => "top-songs",
            Section::TopSongsChart => "top-songs-chart",
            Section::TopArtists => "top-artists",
            Section::TopArtistsChart => "top-artists-chart",
            Section::SkipStats => "skip-stats",
            Section::PlayTime => "play-time",
            Section::HourlyDistribution => "hourly-distribution",
            Section::WeekdayDistribution => "weekday-distribution",
            Section::DeviceBreakdown => "device-breakdown",
            Section::DeviceChart => "device-chart",
        }
    }

    /// Build the section's page descriptors.
    pub fn build(self, agg: &mut Aggregator<'_>, config: &ReportConfig) -> Result<Vec<Page>> {
        match self {
            Section::FrontPage => Ok(vec![front_page(agg)]),
            Section::TopSongs => Ok(vec![top_songs(agg, config)]),
            Section::TopSongsChart => Ok(vec![top_songs_chart(agg, config)]),
            Section::TopArtists => Ok(vec![top_artists(agg, config)]),
            Section::TopArtistsChart => Ok(vec![top_artists_chart(agg, config)]),
            Section::SkipStats => skip_stats(agg, config),
            Section::PlayTime => Ok(vec![play_time(agg, config)]),
            Section::HourlyDistribution => Ok(vec![hourly_distribution(agg)]),
            Section::WeekdayDistribution => Ok(vec![weekday_distribution(agg)]),
            Section::DeviceBreakdown => device_breakdown(agg),
            Section::DeviceChart => device_chart(agg, config),
        }
    }
}

// ── Section builders ──────────────────────────────────────────────────────────

fn front_page(agg: &Aggregator<'_>) -> Page {
    let range = agg.event_set().range();
    let total = agg.total_play_hours();
    let average = calculations::average_per_day(total, range.days());

    Page::Text(TextPage {
        title: "Listening Wrapped".to_string(),
        lines: vec![
            format!("Stats for period {} to {}", range.start, range.end),
            format!("Total listening time: {total:.2}h"),
            format!("Average listening time per day: {average:.2}h"),
        ],
    })
}

/// Ranked entries as horizontal bars, ascending so the largest bar lands on
/// top, with the play count centered in each bar.
fn ranked_bars(ranked: &RankedAggregate) -> Vec<Bar> {
    let mut bars: Vec<Bar> = ranked
        .entries
        .iter()
        .map(|(key, count)| Bar {
            label: key.label(),
            value: *count as f64,
            value_label: Some(count.to_string()),
        })
        .collect();
    bars.reverse();
    bars
}

fn top_songs(agg: &mut Aggregator<'_>, config: &ReportConfig) -> Page {
    let ranked = agg.top_songs(config.top_songs);
    Page::Bars(BarChart {
        title: format!("Top {} songs", config.top_songs),
        x_label: "Play Count".to_string(),
        y_label: "Song Title".to_string(),
        orientation: BarOrientation::Horizontal,
        bars: ranked_bars(&ranked),
    })
}

fn top_artists(agg: &mut Aggregator<'_>, config: &ReportConfig) -> Page {
    let ranked = agg.top_artists(config.top_artists);
    Page::Bars(BarChart {
        title: format!("Top {} artists", config.top_artists),
        x_label: "Play Count".to_string(),
        y_label: "Artist name".to_string(),
        orientation: BarOrientation::Horizontal,
        bars: ranked_bars(&ranked),
    })
}

fn top_songs_chart(agg: &mut Aggregator<'_>, config: &ReportConfig) -> Page {
    let ranked = agg.top_songs(config.top_songs);
    let series = ranked
        .entries
        .iter()
        .map(|(key, _)| SeriesLine {
            label: key.short_label().to_string(),
            points: agg
                .daily_series_for(key)
                .rolling_mean(config.top_songs_rolling)
                .points,
        })
        .collect();

    Page::Lines(LineChart {
        title: format!(
            "Top {} songs play count, rolling {} day average",
            config.top_songs, config.top_songs_rolling
        ),
        x_label: "Date".to_string(),
        y_label: "Play Count".to_string(),
        series,
        legend: true,
    })
}

fn top_artists_chart(agg: &mut Aggregator<'_>, config: &ReportConfig) -> Page {
    let ranked = agg.top_artists(config.top_artists);
    let series = ranked
        .entries
        .iter()
        .map(|(key, _)| SeriesLine {
            label: key.short_label().to_string(),
            points: agg
                .daily_series_for(key)
                .rolling_mean(config.top_artists_rolling)
                .points,
        })
        .collect();

    Page::Lines(LineChart {
        title: format!(
            "Top {} artists play count, rolling {} day average",
            config.top_artists, config.top_artists_rolling
        ),
        x_label: "Date".to_string(),
        y_label: "Play Count".to_string(),
        series,
        legend: true,
    })
}

fn skip_stats(agg: &Aggregator<'_>, config: &ReportConfig) -> Result<Vec<Page>> {
    let stats = agg.skip_statistics(config.min_listens)?;

    let bars_for = |entries: &[wrapped_data::aggregator::SkipEntry]| -> Vec<Bar> {
        let mut bars: Vec<Bar> = entries
            .iter()
            .take(config.skip_rank_count)
            .map(|entry| Bar {
                label: format!("{} - {}", entry.track, entry.artist),
                value: entry.percent_skipped,
                value_label: Some(format!(
                    "{:.1}% of {} plays",
                    entry.percent_skipped, entry.total
                )),
            })
            .collect();
        bars.reverse();
        bars
    };

    let most = Page::Bars(BarChart {
        title: format!("Top {} most skipped songs", config.skip_rank_count),
        x_label: "Percent skipped".to_string(),
        y_label: "Song Title".to_string(),
        orientation: BarOrientation::Horizontal,
        bars: bars_for(&stats.most_skipped),
    });
    let least = Page::Bars(BarChart {
        title: format!("Top {} least skipped songs", config.skip_rank_count),
        x_label: "Percent skipped".to_string(),
        y_label: "Song Title".to_string(),
        orientation: BarOrientation::Horizontal,
        bars: bars_for(&stats.least_skipped),
    });

    Ok(vec![most, least])
}

fn play_time(agg: &Aggregator<'_>, config: &ReportConfig) -> Page {
    let series = agg
        .daily_play_hours()
        .rolling_mean(config.play_time_rolling);

    Page::Lines(LineChart {
        title: format!(
            "Total playtime rolling {} day average",
            config.play_time_rolling
        ),
        x_label: "Date".to_string(),
        y_label: "Play Time (h)".to_string(),
        series: vec![SeriesLine {
            label: "Play time".to_string(),
            points: series.points,
        }],
        legend: false,
    })
}

/// Distribution bars carry a percentage label only when the share is above
/// one percent, keeping near-empty buckets unlabelled.
fn distribution_bars<L: ToString>(labels: impl Iterator<Item = L>, values: &[f64]) -> Vec<Bar> {
    labels
        .zip(values.iter())
        .map(|(label, value)| Bar {
            label: label.to_string(),
            value: *value,
            value_label: (*value > 1.0).then(|| format!("{value:.2}%")),
        })
        .collect()
}

fn hourly_distribution(agg: &Aggregator<'_>) -> Page {
    let dist = agg.hourly_distribution();
    Page::Bars(BarChart {
        title: "Listening spread per hour of the day".to_string(),
        x_label: "Hour of the Day".to_string(),
        y_label: "Percent of listening time".to_string(),
        orientation: BarOrientation::Vertical,
        bars: distribution_bars(0..24, &dist),
    })
}

fn weekday_distribution(agg: &Aggregator<'_>) -> Page {
    let dist = agg.weekday_distribution();
    Page::Bars(BarChart {
        title: "Percent of listening time per weekday".to_string(),
        x_label: "Days".to_string(),
        y_label: "Percent of total listening time".to_string(),
        orientation: BarOrientation::Vertical,
        bars: distribution_bars(WEEKDAY_LABELS.iter(), &dist),
    })
}

fn device_breakdown(agg: &Aggregator<'_>) -> Result<Vec<Page>> {
    let usage = agg.device_breakdown()?;
    let max = usage.iter().map(|u| u.hours).fold(0.0, f64::max);

    let bars = usage
        .iter()
        .map(|u| Bar {
            label: u.label.clone(),
            value: u.hours,
            value_label: (u.hours >= max / 10.0).then(|| format!("{:.1}h", u.hours)),
        })
        .collect();

    Ok(vec![Page::Bars(BarChart {
        title: "Listening time per device".to_string(),
        x_label: "Device".to_string(),
        y_label: "Play Time (h)".to_string(),
        orientation: BarOrientation::Vertical,
        bars,
    })])
}

fn device_chart(agg: &Aggregator<'_>, config: &ReportConfig) -> Result<Vec<Page>> {
    let usage = agg.device_breakdown()?;
    let mut series = Vec::new();
    for device in usage
        .iter()
        .filter(|u| u.label != OTHER_BUCKET && u.hours > 0.0)
    {
        series.push(SeriesLine {
            label: device.label.clone(),
            points: agg
                .device_daily_series(&device.label)?
                .rolling_mean(config.device_rolling)
                .points,
        });
    }

    Ok(vec![Page::Lines(LineChart {
        title: format!(
            "Per-device listening rolling {} day average",
            config.device_rolling
        ),
        x_label: "Date".to_string(),
        y_label: "Play Time (h)".to_string(),
        series,
        legend: true,
    })])
}

// ── Tests ─────────────────────────────────────────────────────────────────────
