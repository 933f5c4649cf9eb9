use std::io::Cursor;

use calamine::{Data, Reader, Xlsx};
use rust_decimal::Decimal;

use crate::error::NirfError;
use crate::model::{ExtractionResult, ExtractionWarning, Record, Section, Value, WarningKind};
use crate::parsing::context::DocumentContext;
use crate::parsing::identity::{identity_for, name_from_file_name};
use crate::parsing::values::coerce;

/// Read a workbook with one sheet per section into an extraction result.
///
/// Sheets are matched by name (`Section::from_tag`); row 0 of each is the
/// header. Sheets with other names are skipped.
pub fn parse_workbook(bytes: &[u8], file_name: &str) -> Result<ExtractionResult, NirfError> {
    let cursor = Cursor::new(bytes);
    let mut workbook: Xlsx<_> = calamine::open_workbook_from_rs(cursor)
        .map_err(|e| NirfError::Workbook(format!("failed to open xlsx: {e}")))?;

    let identity = identity_for(name_from_file_name(file_name), file_name);
    let mut ctx = DocumentContext::new(identity);

    for sheet_name in workbook.sheet_names() {
        let Some(section) = Section::from_tag(&sheet_name) else {
            log::debug!("{file_name}: skipping sheet '{sheet_name}'");
            continue;
        };
        let range = workbook
            .worksheet_range(&sheet_name)
            .map_err(|e| NirfError::Workbook(format!("sheet '{sheet_name}': {e}")))?;

        let mut rows = range.rows();
        let Some(header) = rows.next() else {
            continue;
        };
        let columns = map_columns(&mut ctx, section, header);

        for row in rows {
            read_row(&mut ctx, section, &columns, row);
        }
    }

    Ok(ctx.finish())
}

/// One data row into a record. Blank rows are skipped; a cell that is not
/// a valid number is kept as absent with an UnparseableNumber warning.
fn read_row(
    ctx: &mut DocumentContext,
    section: Section,
    columns: &[Option<&'static str>],
    row: &[Data],
) {
    if row.iter().all(|c| matches!(cell_value(c), Ok(Value::Absent))) {
        return;
    }
    let mut record = Record::new(&ctx.identity().display_name);
    for (col, field) in columns.iter().enumerate() {
        let Some(field) = *field else {
            continue;
        };
        let value = match row.get(col).map(cell_value) {
            None => Value::Absent,
            Some(Ok(v)) => v,
            Some(Err(e)) => {
                ctx.warn(ExtractionWarning {
                    kind: WarningKind::UnparseableNumber,
                    section: Some(section),
                    page: None,
                    message: format!("{field}: {e}"),
                });
                Value::Absent
            }
        };
        record.set(field, value);
    }
    ctx.push(section, record);
}

/// Header cells to canonical field names. `Institute` and unknown columns
/// map to None; unknown ones are reported.
fn map_columns(
    ctx: &mut DocumentContext,
    section: Section,
    header: &[Data],
) -> Vec<Option<&'static str>> {
    header
        .iter()
        .map(|cell| {
            let name = cell_as_string(cell)?;
            match section.field(&name) {
                Some("Institute") => None,
                Some(field) => Some(field),
                None => {
                    ctx.warn(ExtractionWarning {
                        kind: WarningKind::UnknownColumn,
                        section: Some(section),
                        page: None,
                        message: format!("column '{name}' is not a {section} field"),
                    });
                    None
                }
            }
        })
        .collect()
}

fn cell_as_string(cell: &Data) -> Option<String> {
    match cell {
        Data::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        Data::Empty => None,
        _ => Some(format!("{cell}")),
    }
}

/// Convert one workbook cell to a record value. Negative numbers are
/// rejected the same way the PDF path rejects them.
fn cell_value(cell: &Data) -> Result<Value, NirfError> {
    match cell {
        Data::Int(i) if *i < 0 => Err(NirfError::InvalidNumber(i.to_string())),
        Data::Int(i) => Ok(Value::Integer(*i)),
        Data::Float(f) => float_value(*f),
        Data::Bool(b) => Ok(Value::Text(if *b { "Yes" } else { "No" }.into())),
        Data::String(s) => Ok(coerce(Some(s.as_str()))),
        Data::Empty | Data::Error(_) => Ok(Value::Absent),
        other => Ok(Value::Text(format!("{other}"))),
    }
}

/// Integral floats (calamine reads every number as f64) become integers.
fn float_value(f: f64) -> Result<Value, NirfError> {
    if f.is_sign_negative() && f != 0.0 {
        return Err(NirfError::InvalidNumber(f.to_string()));
    }
    if f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
        return Ok(Value::Integer(f as i64));
    }
    Ok(f64_to_decimal(f).map_or(Value::Absent, Value::Decimal))
}

/// Convert f64 to Decimal through its shortest string form, so 0.0035
/// stays 0.0035 instead of 0.00349999... None when it has no decimal form.
fn f64_to_decimal(f: f64) -> Option<Decimal> {
    format!("{f}")
        .parse::<Decimal>()
        .ok()
        .or_else(|| Decimal::try_from(f).ok())
}
