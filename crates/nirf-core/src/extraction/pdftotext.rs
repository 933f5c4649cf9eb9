use crate::error::NirfError;
use crate::extraction::{PageContent, PdfExtractor};
use std::io::Write;
use std::process::Command;

/// PDF extraction backend using pdftotext (from poppler-utils).
///
/// Uses `pdftotext -layout` so that table columns stay aligned as
/// character positions, which the table locator reads back as geometry.
pub struct PdftotextExtractor {
    binary: String,
}

impl PdftotextExtractor {
    /// Use a specific pdftotext executable (name on PATH or full path).
    pub fn with_binary(binary: impl Into<String>) -> Self {
        PdftotextExtractor {
            binary: binary.into(),
        }
    }

    /// Whether the configured pdftotext executable can be run.
    pub fn is_available(&self) -> bool {
        Command::new(&self.binary)
            .arg("-v")
            .output()
            .map(|o| o.status.success() || !o.stderr.is_empty())
            .unwrap_or(false)
    }
}

impl PdfExtractor for PdftotextExtractor {
    fn extract_pages(&self, pdf_bytes: &[u8]) -> Result<Vec<PageContent>, NirfError> {
        let mut tmpfile =
            tempfile::NamedTempFile::new().map_err(|e| NirfError::Extraction(e.to_string()))?;
        tmpfile
            .write_all(pdf_bytes)
            .map_err(|e| NirfError::Extraction(e.to_string()))?;

        let output = Command::new(&self.binary)
            .arg("-layout")
            .arg(tmpfile.path())
            .arg("-") // output to stdout
            .output()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    NirfError::PdftotextNotFound
                } else {
                    NirfError::Extraction(format!("pdftotext failed: {}", e))
                }
            })?;

        if !output.status.success() {
            let code = output.status.code().unwrap_or(-1);
            let stderr = String::from_utf8_lossy(&output.stderr).to_string();
            return Err(NirfError::PdftotextFailed { code, stderr });
        }

        let text = String::from_utf8_lossy(&output.stdout);
        let pages = split_pages(&text);
        log::debug!("{} produced {} page(s)", self.backend_name(), pages.len());
        Ok(pages)
    }

    fn backend_name(&self) -> &str {
        "pdftotext"
    }
}

/// Split pdftotext output into pages on form feed.
///
/// Blank pages in the middle are kept so that page indices stay positional;
/// only the blank tail after the final form feed is dropped.
fn split_pages(text: &str) -> Vec<PageContent> {
    let mut pages: Vec<PageContent> = text
        .split('\x0c')
        .enumerate()
        .map(|(i, page_text)| PageContent {
            page_number: i + 1,
            lines: page_text.lines().map(|l| l.to_string()).collect(),
        })
        .collect();

    while pages.len() > 1
        && pages
            .last()
            .is_some_and(|p| p.lines.iter().all(|l| l.trim().is_empty()))
    {
        pages.pop();
    }

    pages
}
