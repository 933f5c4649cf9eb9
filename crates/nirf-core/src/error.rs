use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum NirfError {
    #[error("PDF extraction failed: {0}")]
    Extraction(String),

    #[error("pdftotext not found. Install poppler: brew install poppler (macOS) or apt install poppler-utils (Linux)")]
    PdftotextNotFound,

    #[error("pdftotext failed with exit code {code}: {stderr}")]
    PdftotextFailed { code: i32, stderr: String },

    #[error("failed to open {path}: {reason}")]
    DocumentOpen { path: PathBuf, reason: String },

    #[error("document has no pages")]
    EmptyDocument,

    #[error("document has {found} page(s), the report template needs {expected}")]
    IncompleteDocument { found: usize, expected: usize },

    #[error("unsupported source document: {0}")]
    UnsupportedSource(String),

    #[error("invalid number '{0}'")]
    InvalidNumber(String),

    #[error("failed to read workbook: {0}")]
    Workbook(String),

    #[error("XML error: {0}")]
    Xml(String),

    #[error("store error: {0}")]
    Store(String),

    #[error("failed to load config from {path}: {reason}")]
    ConfigLoad { path: PathBuf, reason: String },

    #[error("invalid config: {0}")]
    ConfigInvalid(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
