//! Report surface for the streaming-history report generator.
//!
//! Report sections turn aggregation results into abstract page descriptors;
//! the chart module renders each descriptor to one SVG page; the document
//! module accumulates rendered pages into the final paginated artifact.

pub mod chart;
pub mod document;
pub mod page;
pub mod sections;
