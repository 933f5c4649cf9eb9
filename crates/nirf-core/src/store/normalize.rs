use std::collections::HashMap;
use std::sync::LazyLock;

/// Normalize a serialized field name to its store key.
///
/// Lowercases and trims, then maps known spelling variants onto one
/// standard name. Names without an alias pass through lowercased.
pub fn normalize_field(raw: &str) -> String {
    let key = raw.trim().to_lowercase();
    match SYNONYMS.get(key.as_str()) {
        Some(standard) => standard.to_string(),
        None => key,
    }
}

/// Store key for a section element: its tag, lowercased.
pub fn section_key(tag: &str) -> String {
    tag.trim().to_lowercase()
}

static SYNONYMS: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    let mut m = HashMap::new();

    // Year columns, including a common misspelling
    m.insert("acadmic_year", "academic_year");
    m.insert("academicyear", "academic_year");
    m.insert("acad_year", "academic_year");
    m.insert("year", "academic_year");

    m.insert("program", "program_name");
    m.insert("programname", "program_name");
    m.insert("prog", "program_name");

    m.insert("dept", "department");
    m.insert("department", "department");

    m.insert("male", "male_count");
    m.insert("female", "female_count");
    m.insert("total", "total_count");

    m.insert("approved_intake", "approved_intake");
    m.insert("approvedintake", "approved_intake");
    m.insert("sanctioned_intake", "approved_intake");

    m.insert("median_salary", "median_salary");
    m.insert("mediansalary", "median_salary");
    m.insert("salary", "median_salary");

    m
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aliases() {
        assert_eq!(normalize_field("Year"), "academic_year");
        assert_eq!(normalize_field("AcademicYear"), "academic_year");
        assert_eq!(normalize_field("Program"), "program_name");
        assert_eq!(normalize_field("ApprovedIntake"), "approved_intake");
        assert_eq!(normalize_field("MedianSalary"), "median_salary");
        assert_eq!(normalize_field("Male"), "male_count");
    }

    #[test]
    fn test_whitespace_handling() {
        assert_eq!(normalize_field("  Total "), "total_count");
    }

    #[test]
    fn test_unknown_field_passthrough() {
        assert_eq!(normalize_field("FeeReimb_State"), "feereimb_state");
        assert_eq!(normalize_field("Institute"), "institute");
    }

    #[test]
    fn test_section_key() {
        assert_eq!(section_key("PhDData"), "phddata");
    }
}
