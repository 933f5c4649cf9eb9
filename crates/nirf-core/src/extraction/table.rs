use crate::extraction::PageContent;
use serde::Serialize;

/// Reconstruct tables from pdftotext -layout output.
///
/// pdftotext -layout preserves column alignment using spaces, so a
/// character column is a stand-in for horizontal page position. This
/// module turns runs of aligned text back into 2-D cell grids.
///
/// A detected table: row-major grid of optional cell text.
///
/// Rows are not guaranteed to have equal length; every accessor treats an
/// out-of-range index as an absent cell.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Table {
    rows: Vec<Vec<Option<String>>>,
}

impl Table {
    pub fn new(rows: Vec<Vec<Option<String>>>) -> Self {
        Table { rows }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of cells in `row` (0 when the row does not exist).
    pub fn row_len(&self, row: usize) -> usize {
        self.rows.get(row).map(Vec::len).unwrap_or(0)
    }

    /// Raw cell text, or None when the cell is missing.
    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.rows.get(row)?.get(col)?.as_deref()
    }

    /// Whether every cell of `row` is missing or blank.
    pub fn row_is_blank(&self, row: usize) -> bool {
        self.rows.get(row).map_or(true, |cells| {
            cells
                .iter()
                .all(|c| c.as_deref().map_or(true, |t| t.trim().is_empty()))
        })
    }

    /// Whether cell (row, col) starts with `prefix`, ignoring leading whitespace.
    pub fn cell_starts_with(&self, row: usize, col: usize, prefix: &str) -> bool {
        self.cell(row, col)
            .is_some_and(|t| t.trim_start().starts_with(prefix))
    }

    pub fn cell_contains(&self, row: usize, col: usize, needle: &str) -> bool {
        self.cell(row, col).is_some_and(|t| t.contains(needle))
    }
}

impl<S: AsRef<str>> From<Vec<Vec<S>>> for Table {
    fn from(rows: Vec<Vec<S>>) -> Self {
        Table::new(
            rows.into_iter()
                .map(|r| r.into_iter().map(|c| Some(c.as_ref().to_string())).collect())
                .collect(),
        )
    }
}

/// What the locator found on one page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocatedPage {
    /// 0-based page index.
    pub page_index: usize,
    /// Trimmed, non-empty lines with whitespace runs collapsed.
    pub text_lines: Vec<String>,
    /// Tables in detection order (top to bottom).
    pub tables: Vec<Table>,
}

/// Detect the text lines and tables of one page.
pub fn locate(page_index: usize, page: &PageContent) -> LocatedPage {
    let text_lines = page
        .lines
        .iter()
        .map(|l| normalize_ws(l))
        .filter(|l| !l.is_empty())
        .collect();

    let tables = find_blocks(&page.lines)
        .into_iter()
        .filter(|block| is_table_block(block))
        .map(|block| build_table(&block))
        .collect();

    LocatedPage {
        page_index,
        text_lines,
        tables,
    }
}

/// A run of text on one line, bounded by gaps of 2+ whitespace characters.
#[derive(Debug, Clone, PartialEq)]
struct Segment {
    /// First character column (inclusive).
    start: usize,
    /// Last character column (exclusive).
    end: usize,
    text: String,
}

/// Split a line into segments at gaps of 2+ whitespace characters,
/// recording character columns.
fn segments(line: &str) -> Vec<Segment> {
    let mut out = Vec::new();
    let mut open: Option<Segment> = None;
    let mut gap = 0;

    for (col, c) in line.chars().enumerate() {
        if c.is_whitespace() {
            gap += 1;
            if gap == 2 {
                if let Some(seg) = open.take() {
                    out.push(seg);
                }
            }
            continue;
        }

        match open.as_mut() {
            Some(seg) => {
                if gap == 1 {
                    seg.text.push(' ');
                }
                seg.text.push(c);
                seg.end = col + 1;
            }
            None => {
                open = Some(Segment {
                    start: col,
                    end: col + 1,
                    text: c.to_string(),
                })
            }
        }
        gap = 0;
    }

    if let Some(seg) = open {
        out.push(seg);
    }
    out
}

/// Group lines into blocks separated by blank lines.
fn find_blocks(lines: &[String]) -> Vec<Vec<Vec<Segment>>> {
    let mut blocks = Vec::new();
    let mut current: Vec<Vec<Segment>> = Vec::new();

    for line in lines {
        let segs = segments(line);
        if segs.is_empty() {
            if !current.is_empty() {
                blocks.push(std::mem::take(&mut current));
            }
            continue;
        }
        current.push(segs);
    }

    if !current.is_empty() {
        blocks.push(current);
    }
    blocks
}

/// A block is a table when some line has 2+ columns. A lone
/// "Label:   value" line is running text, not a table.
fn is_table_block(block: &[Vec<Segment>]) -> bool {
    if !block.iter().any(|l| l.len() >= 2) {
        return false;
    }
    if let [only] = block {
        if only[0].text.ends_with(':') {
            return false;
        }
    }
    true
}

/// Column spans: the union of overlapping segment intervals over the
/// block's multi-segment lines, left to right.
fn column_spans(block: &[Vec<Segment>]) -> Vec<(usize, usize)> {
    let mut intervals: Vec<(usize, usize)> = block
        .iter()
        .filter(|l| l.len() >= 2)
        .flatten()
        .map(|s| (s.start, s.end))
        .collect();
    intervals.sort_unstable();

    let mut spans: Vec<(usize, usize)> = Vec::new();
    for (start, end) in intervals {
        match spans.last_mut() {
            Some(last) if start < last.1 => last.1 = last.1.max(end),
            _ => spans.push((start, end)),
        }
    }
    spans
}

/// Index of the right-most span starting at or before `col`.
fn column_for(spans: &[(usize, usize)], col: usize) -> usize {
    spans.iter().rposition(|(start, _)| *start <= col).unwrap_or(0)
}

fn build_table(block: &[Vec<Segment>]) -> Table {
    let spans = column_spans(block);
    let width = spans.len().max(1);

    let rows = block
        .iter()
        .map(|line| {
            let mut row: Vec<Option<String>> = vec![None; width];
            for seg in line {
                let idx = column_for(&spans, seg.start);
                row[idx] = Some(match row[idx].take() {
                    Some(prev) => format!("{prev} {}", seg.text),
                    None => seg.text.clone(),
                });
            }
            row
        })
        .collect();

    Table::new(rows)
}

fn normalize_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(lines: &[&str]) -> PageContent {
        PageContent {
            page_number: 1,
            lines: lines.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_segments_split_on_wide_gaps() {
        let segs = segments("  UG [4 Years]     120    -");
        let texts: Vec<&str> = segs.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, vec!["UG [4 Years]", "120", "-"]);
        assert_eq!(segs[0].start, 2);
        assert_eq!(segs[0].end, 14);
        assert_eq!(segs[1].start, 19);
    }

    #[test]
    fn test_segments_count_chars_not_bytes() {
        let segs = segments("₹ 500   12");
        assert_eq!(segs[0].text, "₹ 500");
        assert_eq!(segs[1].start, 8);
    }

    #[test]
    fn test_locate_single_table() {
        let p = page(&[
            "Institute Name: ABC Institute of Technology",
            "",
            "Academic Year     2022-23    2021-22",
            "UG [4 Years]      120        -",
            "PG [2 Years]      60         60",
            "",
            "Footer text",
        ]);
        let located = locate(0, &p);
        assert_eq!(located.text_lines[0], "Institute Name: ABC Institute of Technology");
        assert_eq!(located.tables.len(), 1);

        let t = &located.tables[0];
        assert_eq!(t.row_count(), 3);
        assert_eq!(t.cell(0, 0), Some("Academic Year"));
        assert_eq!(t.cell(0, 2), Some("2021-22"));
        assert_eq!(t.cell(1, 0), Some("UG [4 Years]"));
        assert_eq!(t.cell(1, 2), Some("-"));
        assert_eq!(t.cell(2, 1), Some("60"));
    }

    #[test]
    fn test_locate_blank_cells_are_absent() {
        let p = page(&[
            "Program     A      B      C",
            "UG          1             3",
        ]);
        let t = &locate(0, &p).tables[0];
        assert_eq!(t.row_len(1), 4);
        assert_eq!(t.cell(1, 2), None);
        assert_eq!(t.cell(1, 3), Some("3"));
    }

    #[test]
    fn test_locate_title_row_does_not_merge_columns() {
        let p = page(&[
            "Ph.D (Student pursuing doctoral program till 2022-23)",
            "                     2022-23     2021-22",
            "Full Time            12          -",
        ]);
        let t = &locate(0, &p).tables[0];
        assert_eq!(t.row_len(0), 3);
        assert_eq!(
            t.cell(0, 0),
            Some("Ph.D (Student pursuing doctoral program till 2022-23)")
        );
        assert_eq!(t.cell(1, 0), None);
        assert_eq!(t.cell(1, 1), Some("2022-23"));
        assert_eq!(t.cell(2, 2), Some("-"));
    }

    #[test]
    fn test_label_value_line_is_not_a_table() {
        let p = page(&["Institute Name:   ABC Institute", "", "Number of faculty   45"]);
        let located = locate(0, &p);
        assert_eq!(located.tables.len(), 1);
        assert_eq!(located.tables[0].cell(0, 1), Some("45"));
    }

    #[test]
    fn test_prose_is_not_a_table() {
        let p = page(&["Some paragraph of text", "that wraps onto a second line"]);
        assert!(locate(0, &p).tables.is_empty());
    }

    #[test]
    fn test_tables_in_detection_order() {
        let p = page(&["A   1", "", "B   2", "", "C   3"]);
        let tables = locate(0, &p).tables;
        let firsts: Vec<_> = tables.iter().map(|t| t.cell(0, 0)).collect();
        assert_eq!(firsts, vec![Some("A"), Some("B"), Some("C")]);
    }

    #[test]
    fn test_ragged_access_is_absent() {
        let t = Table::from(vec![vec!["a", "b"], vec!["c"]]);
        assert_eq!(t.cell(1, 1), None);
        assert_eq!(t.cell(5, 0), None);
        assert_eq!(t.row_len(7), 0);
        assert!(t.row_is_blank(9));
    }
}
