//! Abstract page descriptors.
//!
//! A report section produces these plain-data drawing programs; only the
//! chart renderer knows how to turn them into pixels. Sections never touch
//! the backend directly.

use chrono::NaiveDate;

/// One report page, ready to be rendered.
#[derive(Debug, Clone, PartialEq)]
pub enum Page {
    Text(TextPage),
    Bars(BarChart),
    Lines(LineChart),
}

impl Page {
    /// The page caption, used for logging.
    pub fn title(&self) -> &str {
        match self {
            Page::Text(p) => &p.title,
            Page::Bars(p) => &p.title,
            Page::Lines(p) => &p.title,
        }
    }
}

/// A text-only page: a large centered title and centered body lines.
#[derive(Debug, Clone, PartialEq)]
pub struct TextPage {
    pub title: String,
    pub lines: Vec<String>,
}

/// Bar direction. Horizontal bars grow rightwards with the first bar at
/// the bottom, so a list sorted ascending puts the largest bar on top.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarOrientation {
    Horizontal,
    Vertical,
}

/// One bar with an optional label drawn centered inside it.
#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub label: String,
    pub value: f64,
    pub value_label: Option<String>,
}

/// A single-series bar chart page.
#[derive(Debug, Clone, PartialEq)]
pub struct BarChart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub orientation: BarOrientation,
    pub bars: Vec<Bar>,
}

/// One named line of dated points.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesLine {
    pub label: String,
    pub points: Vec<(NaiveDate, f64)>,
}

/// A (possibly multi-series) line chart page.
#[derive(Debug, Clone, PartialEq)]
pub struct LineChart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub series: Vec<SeriesLine>,
    /// Draw a legend box naming each series.
    pub legend: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_title_dispatch() {
        let text = Page::Text(TextPage {
            title: "Front".to_string(),
            lines: vec![],
        });
        assert_eq!(text.title(), "Front");

        let bars = Page::Bars(BarChart {
            title: "Bars".to_string(),
            x_label: String::new(),
            y_label: String::new(),
            orientation: BarOrientation::Horizontal,
            bars: vec![],
        });
        assert_eq!(bars.title(), "Bars");

        let lines = Page::Lines(LineChart {
            title: "Lines".to_string(),
            x_label: String::new(),
            y_label: String::new(),
            series: vec![],
            legend: false,
        });
        assert_eq!(lines.title(), "Lines");
    }
}
