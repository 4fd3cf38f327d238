//! Document export: a loaded CV rendered to a downloadable file.
//!
//! `layout` decides what is printed and in which order, `pdf` decides where it
//! lands on the page. `DocumentExporter` is the seam handlers depend on.

pub mod font_metrics;
pub mod layout;
pub mod pdf;

use bytes::Bytes;
use thiserror::Error;
use tracing::debug;

use crate::cv::manager::ResumeAggregate;
use crate::export::layout::layout_document;
use crate::export::pdf::{encode_pages, paginate, PdfTheme};

pub const PDF_CONTENT_TYPE: &str = "application/pdf";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("document encoding failed: {0}")]
    Encode(String),

    #[error("export task failed: {0}")]
    Task(String),
}

/// Renders a CV aggregate into a complete document.
///
/// Rendering is synchronous and CPU-bound; run it under `spawn_blocking`.
pub trait DocumentExporter: Send + Sync {
    fn render(&self, aggregate: &ResumeAggregate) -> Result<Bytes, ExportError>;
    fn content_type(&self) -> &'static str;
    fn file_extension(&self) -> &'static str;
}

/// Paginated PDF with the template's fonts and colours.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfExporter;

impl DocumentExporter for PdfExporter {
    fn render(&self, aggregate: &ResumeAggregate) -> Result<Bytes, ExportError> {
        let theme = PdfTheme::from_template(aggregate.template.as_ref());
        let lines = layout_document(aggregate);
        let pages = paginate(&lines, &theme);
        debug!(
            "Rendering CV {}: {} lines on {} page(s)",
            aggregate.resume.id,
            lines.len(),
            pages.len()
        );
        let bytes = encode_pages(&pages, &theme, &aggregate.resume.title)?;
        Ok(Bytes::from(bytes))
    }

    fn content_type(&self) -> &'static str {
        PDF_CONTENT_TYPE
    }

    fn file_extension(&self) -> &'static str {
        "pdf"
    }
}

/// Download filename for a CV: whitespace becomes `_`, quotes and path
/// separators are dropped. An empty title falls back to `resume`.
pub fn export_filename(title: &str, extension: &str) -> String {
    let stem: String = title
        .trim()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .chars()
        .filter(|c| !matches!(c, '"' | '/' | '\\') && !c.is_control())
        .collect();
    let stem = if stem.is_empty() { "resume" } else { stem.as_str() };
    format!("{stem}.{extension}")
}
