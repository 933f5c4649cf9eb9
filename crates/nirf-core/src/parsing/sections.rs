//! Per-section extraction rules.
//!
//! Each rule reads one located table through fixed grid positions tuned to
//! the NIRF report template and emits records into its section.

use crate::extraction::table::Table;
use crate::model::{Value, WarningKind};
use crate::parsing::context::TableScope;
use crate::parsing::values::{is_year_label, parse_number, present, SENTINEL};

/// Student strength columns, zipped against cells 1..=12 of each row.
pub const STRENGTH_COLUMNS: [&str; 12] = [
    "Male",
    "Female",
    "Total",
    "WithinState",
    "OutsideState",
    "Abroad",
    "EconomicallyBackward",
    "SociallyChallenged",
    "FeeReimb_State",
    "FeeReimb_Inst",
    "FeeReimb_Private",
    "NoReimbursement",
];

/// Canonical position of the graduating-year label in a placement row.
pub const GRADUATING_YEAR_COL: usize = 5;

pub const LIFTS_QUESTION: &str = "1. Do your institution buildings";
pub const SPECIAL_CELL_QUESTION: &str = "2. Do you offer any separate cell";
pub const LIFTS_FEATURE: &str = "Lifts/Ramps in Buildings";
pub const SPECIAL_FEATURE: &str = "Special Facilities for Challenged";

fn label(table: &Table, row: usize, col: usize) -> Value {
    Value::text_or_absent(present(table.cell(row, col)))
}

/// Whether any cell after the label column holds a count or the sentinel.
/// Header text wrapped onto extra lines carries only words.
fn has_counts(table: &Table, row: usize) -> bool {
    (1..table.row_len(row)).any(|col| {
        table.cell(row, col).is_some_and(|t| {
            let t = t.trim();
            t == SENTINEL || matches!(parse_number(t), Ok(Some(_)))
        })
    })
}

/// Sanctioned intake: header row holds year labels from column 1; each
/// data row is a program with one intake count per year.
pub fn extract_intake(table: &Table, scope: &mut TableScope<'_>) {
    let width = table.row_len(0);
    if width < 2 {
        scope.warn(WarningKind::MalformedRow, "intake header has no year columns");
        return;
    }

    for row in 1..table.row_count() {
        if table.row_is_blank(row) {
            continue;
        }
        if table.row_len(row) < width {
            scope.warn(
                WarningKind::MalformedRow,
                format!("intake row {row} has {} of {width} cells", table.row_len(row)),
            );
        }

        for col in 1..width {
            let Some(intake) = scope.number(table.cell(row, col), "ApprovedIntake") else {
                continue;
            };
            let record = scope
                .record()
                .with("Program", label(table, row, 0))
                .with("Year", label(table, 0, col))
                .with("ApprovedIntake", intake);
            scope.emit(record);
        }
    }
}

/// Student strength: program label plus twelve positional counts.
pub fn extract_strength(table: &Table, scope: &mut TableScope<'_>) {
    for row in 1..table.row_count() {
        if table.row_is_blank(row) {
            continue;
        }
        if !has_counts(table, row) {
            log::debug!("strength row {row} has no counts, skipped as header text");
            continue;
        }
        let len = table.row_len(row);
        if len < STRENGTH_COLUMNS.len() + 1 {
            scope.warn(
                WarningKind::MalformedRow,
                format!("strength row {row} has {len} of 13 cells"),
            );
        }

        let mut record = scope.record().with("Program", label(table, row, 0));
        for (i, field) in STRENGTH_COLUMNS.into_iter().enumerate() {
            let value = scope
                .number(table.cell(row, i + 1), field)
                .unwrap_or(Value::Absent);
            record.set(field, value);
        }
        scope.emit(record);
    }
}

/// Where the graduating cohort starts in a placement row: the first year
/// label at or after the canonical column. Extra empty columns split off by
/// the locator shift it right.
fn graduating_column(table: &Table, row: usize) -> usize {
    (GRADUATING_YEAR_COL..table.row_len(row))
        .find(|&col| table.cell(row, col).is_some_and(is_year_label))
        .unwrap_or(GRADUATING_YEAR_COL)
}

/// Placement and higher studies: one record per academic-year row. Rows
/// that do not open with a year label are wrapped header text.
pub fn extract_placement(table: &Table, scope: &mut TableScope<'_>) {
    for row in 1..table.row_count() {
        if table.row_is_blank(row) {
            continue;
        }
        if !table.cell(row, 0).is_some_and(is_year_label) {
            log::debug!("placement row {row} has no academic year, skipped");
            continue;
        }
        let grad = graduating_column(table, row);
        let len = table.row_len(row);
        if len < grad + 5 {
            scope.warn(
                WarningKind::MalformedRow,
                format!("placement row {row} has {len} cells, expected {}", grad + 5),
            );
        }

        let mut record = scope.record().with("AcademicYear", label(table, row, 0));
        let positions = [
            ("FirstYearIntake", 1),
            ("FirstYearAdmitted", 2),
            ("GraduatingStudents", grad + 1),
            ("Placed", grad + 2),
            ("MedianSalary", grad + 3),
            ("HigherStudies", grad + 4),
        ];
        for (field, col) in positions {
            let value = scope
                .number(table.cell(row, col), field)
                .unwrap_or(Value::Absent);
            record.set(field, value);
            if field == "FirstYearAdmitted" {
                record.set("GraduatingYear", label(table, row, grad));
            }
        }
        scope.emit(record);
    }
}

/// Ph.D: enrolment totals at fixed offsets, then a year-by-mode grid of
/// graduation counts.
pub fn extract_phd(table: &Table, scope: &mut TableScope<'_>) {
    for (row, kind) in [(2, "FullTime_Total"), (3, "PartTime_Total")] {
        match scope.number(table.cell(row, 2), "Count") {
            Some(count) if !count.is_absent() => {
                let record = scope
                    .record()
                    .with("Type", Value::Text(kind.into()))
                    .with("Count", count);
                scope.emit(record);
            }
            _ => {}
        }
    }

    const YEAR_ROW: usize = 5;
    let years = table.row_len(YEAR_ROW);
    for row in YEAR_ROW + 1..table.row_count() {
        if table.row_is_blank(row) {
            continue;
        }
        for col in 1..years {
            let Some(graduated) = scope.number(table.cell(row, col), "Graduated") else {
                continue;
            };
            let record = scope
                .record()
                .with("Type", label(table, row, 0))
                .with("Year", label(table, YEAR_ROW, col))
                .with("Graduated", graduated);
            scope.emit(record);
        }
    }
}

/// Capital / operational expenditure: year labels across row 0, one
/// category per row from row 3.
pub fn extract_finance(table: &Table, scope: &mut TableScope<'_>) {
    let width = table.row_len(0);
    for row in 3..table.row_count() {
        if table.row_is_blank(row) {
            continue;
        }
        for col in 1..width {
            let Some(amount) = scope.number(table.cell(row, col), "Amount") else {
                continue;
            };
            let record = scope
                .record()
                .with("Category", label(table, row, 0))
                .with("Year", label(table, 0, col))
                .with("Amount", amount);
            scope.emit(record);
        }
    }
}

/// Sponsored research / consultancy: three category rows, each expanded
/// across the year columns. A missing value is still emitted, as null.
pub fn extract_projects(table: &Table, scope: &mut TableScope<'_>) {
    let width = table.row_len(0);
    for row in 1..=3 {
        if row >= table.row_count() {
            break;
        }
        for col in 1..width.min(table.row_len(row)) {
            let value = scope
                .number(table.cell(row, col), "Value")
                .unwrap_or(Value::Absent);
            let record = scope
                .record()
                .with("Type", label(table, row, 0))
                .with("Year", label(table, 0, col))
                .with("Value", value);
            scope.emit(record);
        }
    }
}

/// Facilities for the physically challenged: two yes/no questions laid out
/// side by side in one row.
pub fn extract_facilities(table: &Table, scope: &mut TableScope<'_>) {
    let questions = [
        (0, LIFTS_QUESTION, LIFTS_FEATURE),
        (2, SPECIAL_CELL_QUESTION, SPECIAL_FEATURE),
    ];
    for (col, question, feature) in questions {
        if !table.cell_starts_with(0, col, question) {
            continue;
        }
        if table.row_len(0) <= col + 1 {
            scope.warn(
                WarningKind::MalformedRow,
                format!("no answer column for '{question}'"),
            );
            continue;
        }
        let record = scope
            .record()
            .with("Feature", Value::Text(feature.into()))
            .with("Available", label(table, 0, col + 1));
        scope.emit(record);
    }
}

/// Faculty count: a single labelled number.
pub fn extract_faculty(table: &Table, scope: &mut TableScope<'_>) {
    if let Some(total) = scope.number(table.cell(0, 1), "TotalFaculty") {
        if !total.is_absent() {
            let record = scope.record().with("TotalFaculty", total);
            scope.emit(record);
        }
    }
}
