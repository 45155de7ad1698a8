//! The multi-page document writer.
//!
//! Accumulates rendered SVG pages and writes them as one paginated HTML
//! artifact. Each page sits in its own print block with a CSS page break,
//! so printing the artifact yields the PDF. `finish` is called exactly once
//! at the end of a run.

use std::path::{Path, PathBuf};

use tracing::info;
use wrapped_core::error::Result;

/// Accumulator for rendered report pages.
#[derive(Debug)]
pub struct ReportDocument {
    output: PathBuf,
    title: String,
    pages: Vec<String>,
}

impl ReportDocument {
    pub fn new(output: impl Into<PathBuf>, title: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            title: title.into(),
            pages: Vec::new(),
        }
    }

    /// Append one rendered SVG page.
    pub fn append_page(&mut self, svg: String) {
        self.pages.push(svg);
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Write the accumulated pages to the output path and consume the
    /// document.
    pub fn finish(self) -> Result<PathBuf> {
        let html = self.render_html();
        std::fs::write(&self.output, html)?;
        info!(
            "Wrote {} pages to {}",
            self.pages.len(),
            self.output.display()
        );
        Ok(self.output)
    }

    pub fn output_path(&self) -> &Path {
        &self.output
    }

    fn render_html(&self) -> String {
        let mut html = String::with_capacity(self.pages.iter().map(String::len).sum::<usize>() + 1024);
        html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
        html.push_str(&format!("<title>{}</title>\n", self.title));
        html.push_str(
            "<style>\n\
             body { margin: 0; background: #f0f0f0; }\n\
             .page { page-break-after: always; background: #ffffff; margin: 8px auto; max-width: 1600px; }\n\
             .page svg { display: block; width: 100%; height: auto; }\n\
             @media print { body { background: #ffffff; } .page { margin: 0; } }\n\
             </style>\n</head>\n<body>\n",
        );
        for page in &self.pages {
            html.push_str("<div class=\"page\">\n");
            html.push_str(page);
            html.push_str("\n</div>\n");
        }
        html.push_str("</body>\n</html>\n");
        html
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn fake_svg(marker: &str) -> String {
        format!("<svg xmlns=\"http://www.w3.org/2000/svg\"><text>{marker}</text></svg>")
    }

    #[test]
    fn test_finish_writes_every_appended_page() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Wrapped.html");

        let mut doc = ReportDocument::new(&path, "Wrapped");
        doc.append_page(fake_svg("page-one"));
        doc.append_page(fake_svg("page-two"));
        assert_eq!(doc.page_count(), 2);

        let written = doc.finish().unwrap();
        assert_eq!(written, path);

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("page-one"));
        assert!(content.contains("page-two"));
        assert_eq!(content.matches("<div class=\"page\">").count(), 2);
        assert!(content.contains("<title>Wrapped</title>"));
    }

    #[test]
    fn test_finish_with_no_pages_still_writes_document() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Wrapped.html");

        let doc = ReportDocument::new(&path, "Wrapped");
        doc.finish().unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("<html>"));
        assert!(!content.contains("<div class=\"page\">"));
    }

    #[test]
    fn test_finish_fails_on_missing_directory() {
        let doc = ReportDocument::new("/no/such/dir/Wrapped.html", "Wrapped");
        assert!(doc.finish().is_err());
    }
}
