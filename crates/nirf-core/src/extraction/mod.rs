pub mod pdftotext;
pub mod table;
pub mod workbook;

use crate::error::NirfError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Content extracted from a single page of a PDF.
///
/// `lines` are layout-preserving: horizontal position is encoded as
/// leading/internal whitespace, which the table locator relies on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageContent {
    pub page_number: usize,
    pub lines: Vec<String>,
}

/// Trait for PDF text extraction backends.
pub trait PdfExtractor: Send + Sync {
    /// Extract text content from PDF bytes, returning one PageContent per page.
    fn extract_pages(&self, pdf_bytes: &[u8]) -> Result<Vec<PageContent>, NirfError>;

    /// Name of this extraction backend (for diagnostics).
    fn backend_name(&self) -> &str;
}

/// The kinds of source document the pipeline accepts, by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Pdf,
    Workbook,
    /// Pre-extracted pages serialized as JSON.
    PageDump,
}

impl SourceKind {
    pub fn from_file_name(name: &str) -> Option<SourceKind> {
        let ext = Path::new(name).extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "pdf" => Some(SourceKind::Pdf),
            "xlsx" => Some(SourceKind::Workbook),
            "json" => Some(SourceKind::PageDump),
            _ => None,
        }
    }
}

/// Decode a page dump written by `nirf extract -o pages` or by hand.
pub fn parse_page_dump(bytes: &[u8]) -> Result<Vec<PageContent>, NirfError> {
    let pages: Vec<PageContent> = serde_json::from_slice(bytes)?;
    Ok(pages)
}
