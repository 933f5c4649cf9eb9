use nirf_core::batch::{collect_inputs, run_batch};
use nirf_core::error::NirfError;
use nirf_core::extraction::SourceKind;
use std::path::{Path, PathBuf};

/// Extract every document in `input_dir` to `<stem>.xml`. Returns the
/// process exit code for the batch outcome.
pub fn run(
    input_dir: &Path,
    xml_dir: Option<PathBuf>,
    config_file: Option<PathBuf>,
) -> Result<i32, NirfError> {
    let config = super::pipeline_config(config_file)?;
    let extractor = super::extractor(&config);

    let inputs = collect_inputs(input_dir)?;
    if inputs.is_empty() {
        return Err(NirfError::UnsupportedSource(format!(
            "no PDF, XLSX or JSON files in {}",
            input_dir.display()
        )));
    }

    let has_pdfs = inputs.iter().any(|p| {
        p.file_name()
            .and_then(|n| n.to_str())
            .and_then(SourceKind::from_file_name)
            == Some(SourceKind::Pdf)
    });
    if has_pdfs && !extractor.is_available() {
        return Err(NirfError::PdftotextNotFound);
    }

    let out_dir = xml_dir.unwrap_or_else(|| input_dir.to_path_buf());
    std::fs::create_dir_all(&out_dir)?;

    let report = run_batch(&inputs, &extractor, &config, |path, result| {
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("document");
        let target = out_dir.join(format!("{stem}.xml"));
        std::fs::write(&target, nirf_core::xml::to_xml(&result)?)?;
        eprintln!(
            "  {} -> {} ({} records, {} warnings)",
            path.display(),
            target.display(),
            result.records.total(),
            result.warnings.len()
        );
        Ok(())
    });

    eprintln!(
        "\nProcessed {} of {} document(s)",
        report.succeeded,
        report.total()
    );
    for failure in &report.failed {
        eprintln!("  failed: {}: {}", failure.path.display(), failure.error);
    }

    Ok(report.outcome().exit_code())
}
