use nirf_core::batch::{BatchFailure, BatchReport};
use nirf_core::error::NirfError;
use nirf_core::store::loader::parse_document;
use nirf_core::store::{AggregateStore, UpsertOutcome};
use std::path::{Path, PathBuf};

/// Load every `.xml` file in `input_dir` into the store at `store_path`.
pub fn run(input_dir: &Path, store_path: &Path, dry_run: bool) -> Result<i32, NirfError> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(input_dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("xml"))
        })
        .collect();
    files.sort();

    if files.is_empty() {
        return Err(NirfError::UnsupportedSource(format!(
            "no XML files in {}",
            input_dir.display()
        )));
    }

    let mut store = if dry_run {
        AggregateStore::in_memory()
    } else {
        AggregateStore::open(store_path)?
    };

    let mut report = BatchReport::default();
    for path in &files {
        match load_one(&mut store, path) {
            Ok(UpsertOutcome::Skipped) => {
                eprintln!(
                    "  {}: no institute name or id, kept as individual only",
                    path.display()
                );
                report.succeeded += 1;
            }
            Ok(UpsertOutcome::Created(id)) => {
                eprintln!("  {} -> new institute {id}", path.display());
                report.succeeded += 1;
            }
            Ok(UpsertOutcome::Updated(id)) => {
                eprintln!("  {} -> updated institute {id}", path.display());
                report.succeeded += 1;
            }
            Err(error) => {
                log::warn!("skipping {}: {error}", path.display());
                report.failed.push(BatchFailure {
                    path: path.clone(),
                    error,
                });
            }
        }
    }

    if dry_run {
        eprintln!("\nDry run: store not written");
    } else if report.succeeded > 0 {
        store.save()?;
        eprintln!("\nStore written to {}", store_path.display());
    }

    eprintln!(
        "Loaded {} of {} file(s), {} institute(s) in store",
        report.succeeded,
        report.total(),
        store.master().count()
    );
    for failure in &report.failed {
        eprintln!("  failed: {}: {}", failure.path.display(), failure.error);
    }

    Ok(report.outcome().exit_code())
}

fn load_one(store: &mut AggregateStore, path: &Path) -> Result<UpsertOutcome, NirfError> {
    let xml = std::fs::read_to_string(path).map_err(|e| NirfError::DocumentOpen {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    let doc = parse_document(&xml, file_name)?;
    log::debug!("{file_name}: {} entries", doc.entry_count());
    Ok(store.import(&doc))
}
