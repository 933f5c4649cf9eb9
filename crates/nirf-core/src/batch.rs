use std::path::{Path, PathBuf};

use crate::config::PipelineConfig;
use crate::error::NirfError;
use crate::extraction::{PdfExtractor, SourceKind};
use crate::extract_file;
use crate::model::ExtractionResult;

/// A document the batch gave up on.
#[derive(Debug)]
pub struct BatchFailure {
    pub path: PathBuf,
    pub error: NirfError,
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub succeeded: usize,
    pub failed: Vec<BatchFailure>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchOutcome {
    Complete,
    Partial,
    Failed,
}

impl BatchOutcome {
    /// Process exit code: 0 complete, 2 partial, 1 nothing succeeded.
    pub fn exit_code(self) -> i32 {
        match self {
            BatchOutcome::Complete => 0,
            BatchOutcome::Partial => 2,
            BatchOutcome::Failed => 1,
        }
    }
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.succeeded + self.failed.len()
    }

    pub fn outcome(&self) -> BatchOutcome {
        if self.succeeded == 0 {
            BatchOutcome::Failed
        } else if self.failed.is_empty() {
            BatchOutcome::Complete
        } else {
            BatchOutcome::Partial
        }
    }
}

/// Supported source documents directly inside `dir`, sorted by file name.
pub fn collect_inputs(dir: &Path) -> Result<Vec<PathBuf>, NirfError> {
    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file())
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .and_then(SourceKind::from_file_name)
                .is_some()
        })
        .collect();
    paths.sort();
    Ok(paths)
}

/// Extract every document in `paths`, one at a time.
///
/// Each result is handed to `sink`. A document that fails to extract, or
/// whose result the sink rejects, is recorded and skipped; the rest of the
/// batch still runs.
pub fn run_batch<F>(
    paths: &[PathBuf],
    extractor: &dyn PdfExtractor,
    config: &PipelineConfig,
    mut sink: F,
) -> BatchReport
where
    F: FnMut(&Path, ExtractionResult) -> Result<(), NirfError>,
{
    let mut report = BatchReport::default();

    for path in paths {
        let outcome = extract_file(path, extractor, config).and_then(|result| sink(path, result));
        match outcome {
            Ok(()) => report.succeeded += 1,
            Err(error) => {
                log::warn!("skipping {}: {error}", path.display());
                report.failed.push(BatchFailure {
                    path: path.clone(),
                    error,
                });
            }
        }
    }

    log::info!(
        "batch finished: {} of {} document(s) succeeded",
        report.succeeded,
        report.total()
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(succeeded: usize, failed: usize) -> BatchReport {
        BatchReport {
            succeeded,
            failed: (0..failed)
                .map(|i| BatchFailure {
                    path: PathBuf::from(format!("{i}.pdf")),
                    error: NirfError::EmptyDocument,
                })
                .collect(),
        }
    }

    #[test]
    fn test_outcomes_and_exit_codes() {
        assert_eq!(report(5, 0).outcome(), BatchOutcome::Complete);
        assert_eq!(report(4, 1).outcome(), BatchOutcome::Partial);
        assert_eq!(report(0, 5).outcome(), BatchOutcome::Failed);
        assert_eq!(report(0, 0).outcome(), BatchOutcome::Failed);
        assert_eq!(BatchOutcome::Complete.exit_code(), 0);
        assert_eq!(BatchOutcome::Partial.exit_code(), 2);
        assert_eq!(BatchOutcome::Failed.exit_code(), 1);
    }

    #[test]
    fn test_collect_inputs_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.pdf", "a.xlsx", "notes.txt", "c.json"] {
            std::fs::write(dir.path().join(name), b"").unwrap();
        }
        std::fs::create_dir(dir.path().join("sub.pdf")).unwrap();

        let names: Vec<String> = collect_inputs(dir.path())
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.xlsx", "b.pdf", "c.json"]);
    }
}
