use nirf_core::error::NirfError;
use nirf_core::extraction::{PdfExtractor, SourceKind};
use std::path::{Path, PathBuf};

use crate::output;

pub fn run(
    input_file: PathBuf,
    output_format: &str,
    output_file: Option<PathBuf>,
    config_file: Option<PathBuf>,
) -> Result<(), NirfError> {
    let config = super::pipeline_config(config_file)?;
    let extractor = super::extractor(&config);

    let output_str = match output_format {
        "pages" => dump_pages(&input_file, &extractor)?,
        "json" | "xml" | "table" => {
            let result = nirf_core::extract_file(&input_file, &extractor, &config)?;
            for w in &result.warnings {
                eprintln!("  warning: {w}");
            }
            match output_format {
                "json" => output::json::format_result(&result)?,
                "xml" => nirf_core::xml::to_xml(&result)?,
                _ => output::table::format_result(&result),
            }
        }
        other => {
            return Err(NirfError::ConfigInvalid(format!(
                "unknown output format '{other}' (expected table, json, xml or pages)"
            )))
        }
    };

    match output_file {
        Some(path) => {
            std::fs::write(&path, output_str)?;
            eprintln!("Written to {}", path.display());
        }
        None => println!("{output_str}"),
    }

    Ok(())
}

/// Raw layout pages as JSON, replayable later as a `.json` source.
fn dump_pages(input_file: &Path, extractor: &dyn PdfExtractor) -> Result<String, NirfError> {
    let file_name = input_file
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    if SourceKind::from_file_name(file_name) != Some(SourceKind::Pdf) {
        return Err(NirfError::UnsupportedSource(format!(
            "{file_name}: page dumps are only produced from PDFs"
        )));
    }
    let bytes = std::fs::read(input_file).map_err(|e| NirfError::DocumentOpen {
        path: input_file.to_path_buf(),
        reason: e.to_string(),
    })?;
    let pages = extractor.extract_pages(&bytes)?;
    Ok(serde_json::to_string_pretty(&pages)?)
}
