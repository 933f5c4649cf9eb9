pub mod batch;
pub mod extract;
pub mod load;

use nirf_core::config::{load_config, PipelineConfig};
use nirf_core::error::NirfError;
use nirf_core::extraction::pdftotext::PdftotextExtractor;
use std::path::PathBuf;

/// Pipeline config from `--config`, or the defaults.
pub fn pipeline_config(path: Option<PathBuf>) -> Result<PipelineConfig, NirfError> {
    match path {
        Some(p) => load_config(&p),
        None => Ok(PipelineConfig::default()),
    }
}

pub fn extractor(config: &PipelineConfig) -> PdftotextExtractor {
    PdftotextExtractor::with_binary(config.pdftotext_binary.clone())
}
