use nirf_core::model::{ExtractionResult, Record};
use std::fmt::Write;

pub fn format_result(result: &ExtractionResult) -> String {
    let mut out = String::new();
    let id = &result.identity;

    let _ = writeln!(out, "Institute: {}", id.display_name);
    if let Some(code) = &id.short_code {
        let _ = writeln!(out, "Code:      {code}");
    }
    let _ = writeln!(out, "Source:    {}", id.source_file);

    for (section, records) in result.records.iter() {
        let _ = writeln!(out, "\n=== {section} ({}) ===\n", records.len());
        if records.is_empty() {
            let _ = writeln!(out, "  (no records)");
            continue;
        }

        // Institute is the same on every row; it is printed once above.
        let columns: Vec<&str> = section
            .fields()
            .iter()
            .copied()
            .filter(|f| *f != "Institute")
            .collect();
        let cells: Vec<Vec<String>> = records.iter().map(|r| row(r, &columns)).collect();

        let widths: Vec<usize> = columns
            .iter()
            .enumerate()
            .map(|(i, name)| {
                cells
                    .iter()
                    .map(|r| r[i].chars().count())
                    .max()
                    .unwrap_or(0)
                    .max(name.len())
            })
            .collect();

        let header: Vec<String> = columns.iter().map(|c| c.to_string()).collect();
        write_row(&mut out, &header, &widths);
        for r in &cells {
            write_row(&mut out, r, &widths);
        }
    }

    if !result.warnings.is_empty() {
        let _ = writeln!(out, "\n{} warning(s):", result.warnings.len());
        for w in &result.warnings {
            let _ = writeln!(out, "  {w}");
        }
    }

    out
}

fn row(record: &Record, columns: &[&str]) -> Vec<String> {
    columns
        .iter()
        .map(|c| {
            record
                .get(c)
                .map(|v| v.to_string())
                .unwrap_or_else(|| "-".into())
        })
        .collect()
}

fn write_row(out: &mut String, cells: &[String], widths: &[usize]) {
    let mut line = String::from(" ");
    for (cell, width) in cells.iter().zip(widths) {
        let _ = write!(line, " {cell:<width$} ", width = *width);
    }
    let _ = writeln!(out, "{}", line.trim_end());
}
