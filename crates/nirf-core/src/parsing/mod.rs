pub mod context;
pub mod dispatch;
pub mod identity;
pub mod sections;
pub mod values;

use crate::config::{PagePolicy, PipelineConfig};
use crate::error::NirfError;
use crate::extraction::table::{locate, LocatedPage};
use crate::extraction::PageContent;
use crate::model::{ExtractionResult, ExtractionWarning, WarningKind};
use context::DocumentContext;
use dispatch::{required_pages, RULES};
use identity::{is_unresolved, resolve_identity};

/// Assemble one document's records from its extracted pages.
///
/// Runs the locator once per page, resolves the institute identity from the
/// first page, then applies `RULES` in order. Per-table problems become
/// warnings on the result; only an empty document (or, under
/// `PagePolicy::Reject`, a short one) is an error.
pub fn assemble(
    pages: &[PageContent],
    file_name: &str,
    config: &PipelineConfig,
) -> Result<ExtractionResult, NirfError> {
    if pages.iter().all(|p| p.lines.iter().all(|l| l.trim().is_empty())) {
        return Err(NirfError::EmptyDocument);
    }

    let located: Vec<LocatedPage> = pages
        .iter()
        .enumerate()
        .map(|(i, page)| locate(i, page))
        .collect();

    let first_lines = located
        .first()
        .map(|p| p.text_lines.as_slice())
        .unwrap_or(&[]);
    let identity = resolve_identity(first_lines, file_name, config.identity_scan_lines);
    let mut ctx = DocumentContext::new(identity);

    if is_unresolved(ctx.identity()) {
        ctx.warn(ExtractionWarning {
            kind: WarningKind::UnresolvableIdentity,
            section: None,
            page: Some(0),
            message: "no institute name label found on the first page".into(),
        });
    }

    check_page_count(&mut ctx, located.len(), config.page_policy)?;

    let mut claimed: Vec<Vec<bool>> = located
        .iter()
        .map(|p| vec![false; p.tables.len()])
        .collect();

    for rule in RULES {
        for &page_index in rule.pages {
            let Some(page) = located.get(page_index) else {
                continue;
            };
            let selected = rule.select(&page.tables, &mut claimed[page_index]);

            if selected.is_empty() {
                if rule.expects_table() {
                    ctx.warn(ExtractionWarning {
                        kind: WarningKind::MissingTable,
                        section: Some(rule.section),
                        page: Some(page_index),
                        message: format!(
                            "no {} table among {} detected",
                            rule.name,
                            page.tables.len()
                        ),
                    });
                }
                continue;
            }

            for index in selected {
                log::debug!(
                    "{file_name}: page {} table {index} -> {}",
                    page_index + 1,
                    rule.section
                );
                let mut scope = ctx.scope(rule.section, page_index);
                (rule.extract)(&page.tables[index], &mut scope);
            }
        }
    }

    let result = ctx.finish();
    log::info!(
        "{file_name}: {} records for '{}' ({} warnings)",
        result.records.total(),
        result.identity.display_name,
        result.warnings.len()
    );
    Ok(result)
}

fn check_page_count(
    ctx: &mut DocumentContext,
    found: usize,
    policy: PagePolicy,
) -> Result<(), NirfError> {
    let expected = required_pages();
    if found >= expected {
        return Ok(());
    }
    match policy {
        PagePolicy::Ignore => Ok(()),
        PagePolicy::Warn => {
            ctx.warn(ExtractionWarning {
                kind: WarningKind::PageCountMismatch,
                section: None,
                page: None,
                message: format!("document has {found} pages, template reads {expected}"),
            });
            Ok(())
        }
        PagePolicy::Reject => Err(NirfError::IncompleteDocument { found, expected }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Section, Value};

    fn page(n: usize, lines: &[&str]) -> PageContent {
        PageContent {
            page_number: n,
            lines: lines.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn first_page() -> PageContent {
        page(
            1,
            &[
                "Institute Name: ABC Institute of Technology [IR-E-C-1234]",
                "",
                "Sanctioned (Approved) Intake",
                "",
                "Academic Year      2022-23     2021-22",
                "UG [4 Years]       120         -",
                "",
                "Total Actual Student Strength",
                "",
                "(All programs)     No. of Male   No. of Female   Total",
                "UG [4 Years]       300           120             420",
            ],
        )
    }

    #[test]
    fn test_empty_document_is_error() {
        let pages = vec![page(1, &["", "  "])];
        assert!(matches!(
            assemble(&pages, "x.pdf", &PipelineConfig::default()),
            Err(NirfError::EmptyDocument)
        ));
        assert!(matches!(
            assemble(&[], "x.pdf", &PipelineConfig::default()),
            Err(NirfError::EmptyDocument)
        ));
    }

    #[test]
    fn test_short_document_warns_by_default() {
        let result = assemble(&[first_page()], "abc.pdf", &PipelineConfig::default()).unwrap();
        assert_eq!(result.identity.display_name, "ABC Institute of Technology [IR-E-C-1234]");
        assert_eq!(result.identity.short_code.as_deref(), Some("IR-E-C-1234"));
        assert_eq!(result.warnings_of(WarningKind::PageCountMismatch).count(), 1);

        let intake = result.records.get(Section::SanctionedIntake);
        assert_eq!(intake.len(), 1);
        assert_eq!(intake[0].get("ApprovedIntake"), Some(&Value::Integer(120)));

        let strength = result.records.get(Section::StudentStrength);
        assert_eq!(strength.len(), 1);
        assert_eq!(strength[0].get("Total"), Some(&Value::Integer(420)));

        // the intake header starts with "Academic Year" but is already claimed
        assert!(result.records.get(Section::PlacementData).is_empty());
    }

    #[test]
    fn test_reject_policy_fails_short_document() {
        let config = PipelineConfig {
            page_policy: PagePolicy::Reject,
            ..PipelineConfig::default()
        };
        match assemble(&[first_page()], "abc.pdf", &config) {
            Err(NirfError::IncompleteDocument { found, expected }) => {
                assert_eq!((found, expected), (1, 4));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_ignore_policy_is_silent() {
        let config = PipelineConfig {
            page_policy: PagePolicy::Ignore,
            ..PipelineConfig::default()
        };
        let result = assemble(&[first_page()], "abc.pdf", &config).unwrap();
        assert_eq!(result.warnings_of(WarningKind::PageCountMismatch).count(), 0);
    }

    #[test]
    fn test_unknown_identity_and_missing_tables_warn() {
        let pages = vec![
            page(1, &["Some cover text"]),
            page(2, &["more prose"]),
            page(3, &["-"]),
            page(4, &["end"]),
        ];
        let result = assemble(&pages, "cover.pdf", &PipelineConfig::default()).unwrap();
        assert_eq!(result.identity.display_name, "Unknown Institute");
        assert_eq!(result.warnings_of(WarningKind::UnresolvableIdentity).count(), 1);
        // intake, strength and ph.d
        assert_eq!(result.warnings_of(WarningKind::MissingTable).count(), 3);
        assert_eq!(result.records.total(), 0);
    }
}
