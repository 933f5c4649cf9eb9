use crate::error::NirfError;
use crate::parsing::identity::DEFAULT_SCAN_LINES;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// What to do with a document that has fewer pages than the report
/// template's rule table reads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PagePolicy {
    /// Extract what is there; missing sections stay empty.
    Ignore,
    /// Extract what is there and record a page-count warning.
    #[default]
    Warn,
    /// Fail the document.
    Reject,
}

/// Pipeline settings, loadable from a JSON file. Every field is optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    pub page_policy: PagePolicy,
    /// How many leading text lines of page 1 are scanned for the institute name.
    pub identity_scan_lines: usize,
    /// pdftotext executable (name on PATH or absolute path).
    pub pdftotext_binary: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            page_policy: PagePolicy::default(),
            identity_scan_lines: DEFAULT_SCAN_LINES,
            pdftotext_binary: "pdftotext".into(),
        }
    }
}

/// Load a pipeline config from a JSON file.
pub fn load_config(path: &Path) -> Result<PipelineConfig, NirfError> {
    let content = std::fs::read_to_string(path).map_err(|e| NirfError::ConfigLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let config: PipelineConfig =
        serde_json::from_str(&content).map_err(|e| NirfError::ConfigLoad {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
    validate_config(&config)?;
    Ok(config)
}

/// Parse a pipeline config from a JSON string (no file path context).
pub fn parse_config_str(json: &str) -> Result<PipelineConfig, NirfError> {
    let config: PipelineConfig = serde_json::from_str(json).map_err(NirfError::Json)?;
    validate_config(&config)?;
    Ok(config)
}

pub fn validate_config(config: &PipelineConfig) -> Result<(), NirfError> {
    if config.identity_scan_lines == 0 {
        return Err(NirfError::ConfigInvalid(
            "identity_scan_lines must be at least 1".into(),
        ));
    }
    if config.pdftotext_binary.trim().is_empty() {
        return Err(NirfError::ConfigInvalid(
            "pdftotext_binary must not be empty".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_object_gives_defaults() {
        let config = parse_config_str("{}").unwrap();
        assert_eq!(config, PipelineConfig::default());
        assert_eq!(config.page_policy, PagePolicy::Warn);
        assert_eq!(config.identity_scan_lines, 15);
    }

    #[test]
    fn test_parse_full_config() {
        let json = r#"{
            "page_policy": "reject",
            "identity_scan_lines": 30,
            "pdftotext_binary": "/opt/poppler/bin/pdftotext"
        }"#;
        let config = parse_config_str(json).unwrap();
        assert_eq!(config.page_policy, PagePolicy::Reject);
        assert_eq!(config.identity_scan_lines, 30);
        assert_eq!(config.pdftotext_binary, "/opt/poppler/bin/pdftotext");
    }

    #[test]
    fn test_unknown_field_rejected() {
        assert!(parse_config_str(r#"{ "page_count": 4 }"#).is_err());
    }

    #[test]
    fn test_zero_scan_lines_rejected() {
        assert!(parse_config_str(r#"{ "identity_scan_lines": 0 }"#).is_err());
    }

    #[test]
    fn test_load_config_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nirf.json");
        std::fs::write(&path, "not json").unwrap();
        match load_config(&path) {
            Err(NirfError::ConfigLoad { path: p, .. }) => assert_eq!(p, path),
            other => panic!("unexpected: {other:?}"),
        }
    }
}
