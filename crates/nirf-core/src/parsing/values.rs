use crate::error::NirfError;
use crate::model::Value;
use rust_decimal::Decimal;
use std::str::FromStr;

/// The literal cell text meaning "no data" (distinct from zero).
pub const SENTINEL: &str = "-";

/// Trimmed text of a present cell: None for missing, blank or sentinel.
pub fn present(cell: Option<&str>) -> Option<&str> {
    let t = cell?.trim();
    if t.is_empty() || t == SENTINEL {
        None
    } else {
        Some(t)
    }
}

/// Parse a numeric cell from a report table.
///
/// Handles formats like:
/// - "120" -> Integer(120)
/// - "12.5" -> Decimal(12.5)
/// - "450000 (per annum)" -> Integer(450000), annotation after `(` ignored
/// - "-" or "" -> None
/// - "abc", "1,200" or "-5" -> error (negative counts are not valid data)
pub fn parse_number(s: &str) -> Result<Option<Value>, NirfError> {
    let s = s.trim();
    if s.is_empty() || s == SENTINEL {
        return Ok(None);
    }

    let head = s.split('(').next().unwrap_or(s).trim();
    if !is_numeric_looking(head) {
        return Err(NirfError::InvalidNumber(s.to_string()));
    }
    if head.starts_with('-') {
        return Err(NirfError::InvalidNumber(s.to_string()));
    }

    if head.contains('.') {
        return parse_decimal(head).map(|d| Some(Value::Decimal(d)));
    }

    match head.parse::<i64>() {
        Ok(i) => Ok(Some(Value::Integer(i))),
        // Too wide for i64; fall back to decimal before giving up.
        Err(_) => parse_decimal(head).map(|d| Some(Value::Decimal(d))),
    }
}

/// Coerce free cell text: numbers become numbers, other present text stays
/// text, missing/sentinel becomes absent.
pub fn coerce(cell: Option<&str>) -> Value {
    match present(cell) {
        None => Value::Absent,
        Some(t) => match parse_number(t) {
            Ok(Some(v)) => v,
            _ => Value::Text(t.to_string()),
        },
    }
}

/// Digits with an optional leading minus and at most one decimal point.
pub fn is_numeric_looking(s: &str) -> bool {
    let body = s.strip_prefix('-').unwrap_or(s);
    !body.is_empty()
        && body.chars().all(|c| c.is_ascii_digit() || c == '.')
        && body.chars().filter(|c| *c == '.').count() <= 1
        && body.chars().any(|c| c.is_ascii_digit())
}

/// Whether a header cell looks like an academic/financial year label
/// such as "2021-22".
pub fn is_year_label(s: &str) -> bool {
    let s = s.trim();
    let Some((start, end)) = s.split_once('-') else {
        return false;
    };
    start.len() == 4
        && end.len() == 2
        && start.chars().all(|c| c.is_ascii_digit())
        && end.chars().all(|c| c.is_ascii_digit())
}

fn parse_decimal(s: &str) -> Result<Decimal, NirfError> {
    let mut normalized = s.to_string();
    if normalized.starts_with('.') {
        normalized.insert(0, '0');
    }
    if normalized.ends_with('.') {
        normalized.push('0');
    }
    Decimal::from_str(&normalized).map_err(|_| NirfError::InvalidNumber(s.to_string()))
}
