pub mod batch;
pub mod config;
pub mod error;
pub mod extraction;
pub mod model;
pub mod parsing;
pub mod store;
pub mod xml;

use std::path::Path;

use config::PipelineConfig;
use error::NirfError;
use extraction::{PdfExtractor, SourceKind};
use model::ExtractionResult;

/// Main API entry point: extract one source document into section records.
///
/// The source kind is chosen by the extension of `file_name`: PDFs go
/// through `extractor` and the table pipeline, page dumps skip the
/// extractor, workbooks are read sheet by sheet.
pub fn extract_document(
    bytes: &[u8],
    file_name: &str,
    extractor: &dyn PdfExtractor,
    config: &PipelineConfig,
) -> Result<ExtractionResult, NirfError> {
    let kind = SourceKind::from_file_name(file_name)
        .ok_or_else(|| NirfError::UnsupportedSource(file_name.to_string()))?;

    match kind {
        SourceKind::Pdf => {
            log::debug!("{file_name}: extracting with {}", extractor.backend_name());
            let pages = extractor.extract_pages(bytes)?;
            parsing::assemble(&pages, file_name, config)
        }
        SourceKind::PageDump => {
            let pages = extraction::parse_page_dump(bytes)?;
            parsing::assemble(&pages, file_name, config)
        }
        SourceKind::Workbook => extraction::workbook::parse_workbook(bytes, file_name),
    }
}

/// Read and extract a document from disk.
///
/// Failure to read the file is reported as `DocumentOpen`, as is any
/// failure of the PDF backend to open it.
pub fn extract_file(
    path: &Path,
    extractor: &dyn PdfExtractor,
    config: &PipelineConfig,
) -> Result<ExtractionResult, NirfError> {
    let open_error = |reason: String| NirfError::DocumentOpen {
        path: path.to_path_buf(),
        reason,
    };

    let bytes = std::fs::read(path).map_err(|e| open_error(e.to_string()))?;
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| open_error("file name is not valid UTF-8".into()))?;

    extract_document(&bytes, file_name, extractor, config).map_err(|e| match e {
        NirfError::Extraction(reason) => open_error(reason),
        NirfError::PdftotextFailed { stderr, .. } => open_error(stderr),
        other => other,
    })
}
