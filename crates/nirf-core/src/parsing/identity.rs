use crate::model::InstituteIdentity;
use std::path::Path;

/// Display name used when no label pattern matches.
pub const UNKNOWN_INSTITUTE: &str = "Unknown Institute";

/// Label patterns, in priority order. `"Institution:"` is a substring of
/// `"Name of Institution:"`, so the longer label must be tried first.
pub const LABEL_PATTERNS: [&str; 3] = ["Institute Name:", "Name of Institution:", "Institution:"];

/// Default number of leading text lines scanned for a label.
pub const DEFAULT_SCAN_LINES: usize = 15;

/// Resolve the institute identity from the first page's text lines.
///
/// First match wins: lines are scanned top-down and, within a line, the
/// patterns in `LABEL_PATTERNS` order. A label with nothing after it does
/// not count as a match.
pub fn resolve_identity(lines: &[String], file_name: &str, scan_lines: usize) -> InstituteIdentity {
    let display_name = lines
        .iter()
        .take(scan_lines)
        .find_map(|line| name_after_label(line))
        .unwrap_or_else(|| UNKNOWN_INSTITUTE.to_string());

    identity_for(display_name, file_name)
}

/// Build an identity around an already-known display name.
pub fn identity_for(display_name: String, file_name: &str) -> InstituteIdentity {
    let short_code = derive_short_code(Some(&display_name), file_name);
    InstituteIdentity {
        display_name,
        source_file: file_name.to_string(),
        short_code,
    }
}

pub fn is_unresolved(identity: &InstituteIdentity) -> bool {
    identity.display_name == UNKNOWN_INSTITUTE
}

fn name_after_label(line: &str) -> Option<String> {
    let pattern = LABEL_PATTERNS.iter().find(|p| line.contains(*p))?;
    let idx = line.find(pattern)?;
    let value = line[idx + pattern.len()..].trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Institute short code: the token inside the first `[...]` of the display
/// name (e.g. "IIT Madras [IR-E-U-0456]"), else a zero-padded ordering
/// prefix `001` to `100` on the file name ("007-IIT Madras.pdf" -> "007").
pub fn derive_short_code(display_name: Option<&str>, file_name: &str) -> Option<String> {
    if let Some(code) = display_name.and_then(bracketed_token) {
        return Some(code);
    }

    let base = Path::new(file_name)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(file_name);
    ordering_prefix(base).map(str::to_string)
}

/// Exactly three leading digits in 001..=100, not followed by another digit.
fn ordering_prefix(base: &str) -> Option<&str> {
    let prefix = base.get(..3)?;
    if !prefix.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    if base[3..].starts_with(|c: char| c.is_ascii_digit()) {
        return None;
    }
    match prefix.parse::<u32>() {
        Ok(1..=100) => Some(prefix),
        _ => None,
    }
}

fn bracketed_token(name: &str) -> Option<String> {
    let start = name.find('[')? + 1;
    let end = start + name[start..].find(']')?;
    let token = name[start..end].trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

/// Institute name from a file name: the stem with a leading `NNN-`
/// ordering prefix removed ("012-NIT Trichy.xlsx" -> "NIT Trichy").
pub fn name_from_file_name(file_name: &str) -> String {
    let stem = Path::new(file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(file_name);
    match stem.split_once('-') {
        Some((prefix, rest))
            if !prefix.is_empty() && prefix.chars().all(|c| c.is_ascii_digit()) =>
        {
            rest.trim().to_string()
        }
        _ => stem.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_institute_name_label() {
        let id = resolve_identity(
            &lines(&["NIRF 2024", "Institute Name: ABC Institute of Technology"]),
            "abc.pdf",
            DEFAULT_SCAN_LINES,
        );
        assert_eq!(id.display_name, "ABC Institute of Technology");
        assert_eq!(id.source_file, "abc.pdf");
        assert!(!is_unresolved(&id));
    }

    #[test]
    fn test_name_of_institution_beats_institution() {
        let id = resolve_identity(
            &lines(&["Name of Institution: XYZ College"]),
            "x.pdf",
            DEFAULT_SCAN_LINES,
        );
        assert_eq!(id.display_name, "XYZ College");
    }

    #[test]
    fn test_plain_institution_label() {
        let id = resolve_identity(&lines(&["Institution: PQR"]), "x.pdf", DEFAULT_SCAN_LINES);
        assert_eq!(id.display_name, "PQR");
    }

    #[test]
    fn test_first_line_wins() {
        let id = resolve_identity(
            &lines(&["Institution: First", "Institute Name: Second"]),
            "x.pdf",
            DEFAULT_SCAN_LINES,
        );
        assert_eq!(id.display_name, "First");
    }

    #[test]
    fn test_fallback_to_unknown() {
        let id = resolve_identity(&lines(&["nothing here"]), "x.pdf", DEFAULT_SCAN_LINES);
        assert_eq!(id.display_name, UNKNOWN_INSTITUTE);
        assert!(is_unresolved(&id));
    }

    #[test]
    fn test_label_beyond_scan_depth_ignored() {
        let mut v = vec!["filler".to_string(); 15];
        v.push("Institute Name: Too Late".into());
        let id = resolve_identity(&v, "x.pdf", DEFAULT_SCAN_LINES);
        assert_eq!(id.display_name, UNKNOWN_INSTITUTE);
    }

    #[test]
    fn test_empty_label_keeps_scanning() {
        let id = resolve_identity(
            &lines(&["Institute Name:", "Institution: Real Name"]),
            "x.pdf",
            DEFAULT_SCAN_LINES,
        );
        assert_eq!(id.display_name, "Real Name");
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let text = lines(&["Institute Name: IIT Madras [IR-E-U-0456]"]);
        let a = resolve_identity(&text, "001-iitm.pdf", DEFAULT_SCAN_LINES);
        let b = resolve_identity(&text, "001-iitm.pdf", DEFAULT_SCAN_LINES);
        assert_eq!(a, b);
    }

    #[test]
    fn test_short_code_prefers_bracket() {
        assert_eq!(
            derive_short_code(Some("IIT Madras [IR-E-U-0456]"), "001-iitm.pdf"),
            Some("IR-E-U-0456".into())
        );
        assert_eq!(
            derive_short_code(Some("IIT Madras"), "dir/001-iitm.pdf"),
            Some("001".into())
        );
        assert_eq!(derive_short_code(Some("IIT Madras"), "iitm.pdf"), None);
        assert_eq!(derive_short_code(Some("A []"), "abc-def.pdf"), None);
    }

    #[test]
    fn test_short_code_prefix_is_zero_padded_ordinal() {
        assert_eq!(derive_short_code(None, "100-x.xml"), Some("100".into()));
        assert_eq!(derive_short_code(None, "042_x.xml"), Some("042".into()));
        assert_eq!(derive_short_code(None, "2023-IITM.xml"), None);
        assert_eq!(derive_short_code(None, "2023-NITT.xml"), None);
        assert_eq!(derive_short_code(None, "000-x.xml"), None);
        assert_eq!(derive_short_code(None, "101-x.xml"), None);
        assert_eq!(derive_short_code(None, "42-x.xml"), None);
        assert_eq!(derive_short_code(None, "ré-x.xml"), None);
    }

    #[test]
    fn test_name_from_file_name() {
        assert_eq!(name_from_file_name("012-NIT Trichy.xlsx"), "NIT Trichy");
        assert_eq!(name_from_file_name("NIT-Trichy.xlsx"), "NIT-Trichy");
        assert_eq!(name_from_file_name("plain.xlsx"), "plain");
    }
}
