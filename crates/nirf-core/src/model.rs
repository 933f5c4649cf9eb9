use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// One semantic category of institute data, in report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Section {
    SanctionedIntake,
    StudentStrength,
    PlacementData,
    PhDData,
    CapitalExpenditure,
    OperationalExpenditure,
    SponsoredProjects,
    ConsultancyProjects,
    Facilities,
    FacultyCount,
}

const INTAKE_FIELDS: &[&str] = &["Institute", "Program", "Year", "ApprovedIntake"];

const STRENGTH_FIELDS: &[&str] = &[
    "Institute",
    "Program",
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

const PLACEMENT_FIELDS: &[&str] = &[
    "Institute",
    "AcademicYear",
    "FirstYearIntake",
    "FirstYearAdmitted",
    "GraduatingYear",
    "GraduatingStudents",
    "Placed",
    "MedianSalary",
    "HigherStudies",
];

const PHD_FIELDS: &[&str] = &["Institute", "Type", "Count", "Year", "Graduated"];
const FINANCE_FIELDS: &[&str] = &["Institute", "Category", "Year", "Amount"];
const PROJECT_FIELDS: &[&str] = &["Institute", "Type", "Year", "Value"];
const FACILITY_FIELDS: &[&str] = &["Institute", "Feature", "Available"];
const FACULTY_FIELDS: &[&str] = &["Institute", "TotalFaculty"];

impl Section {
    pub const ALL: [Section; 10] = [
        Section::SanctionedIntake,
        Section::StudentStrength,
        Section::PlacementData,
        Section::PhDData,
        Section::CapitalExpenditure,
        Section::OperationalExpenditure,
        Section::SponsoredProjects,
        Section::ConsultancyProjects,
        Section::Facilities,
        Section::FacultyCount,
    ];

    /// Element / sheet name used in serialized documents.
    pub fn tag(self) -> &'static str {
        match self {
            Section::SanctionedIntake => "SanctionedIntake",
            Section::StudentStrength => "StudentStrength",
            Section::PlacementData => "PlacementData",
            Section::PhDData => "PhDData",
            Section::CapitalExpenditure => "CapitalExpenditure",
            Section::OperationalExpenditure => "OperationalExpenditure",
            Section::SponsoredProjects => "SponsoredProjects",
            Section::ConsultancyProjects => "ConsultancyProjects",
            Section::Facilities => "Facilities",
            Section::FacultyCount => "FacultyCount",
        }
    }

    /// Look up a section by its tag. Accepts the short `OpExpenditure`
    /// sheet name used by older workbooks.
    pub fn from_tag(tag: &str) -> Option<Section> {
        let tag = tag.trim();
        if tag == "OpExpenditure" {
            return Some(Section::OperationalExpenditure);
        }
        Section::ALL.into_iter().find(|s| s.tag() == tag)
    }

    /// The closed set of field names a record of this section may carry,
    /// in serialization order.
    pub fn fields(self) -> &'static [&'static str] {
        match self {
            Section::SanctionedIntake => INTAKE_FIELDS,
            Section::StudentStrength => STRENGTH_FIELDS,
            Section::PlacementData => PLACEMENT_FIELDS,
            Section::PhDData => PHD_FIELDS,
            Section::CapitalExpenditure | Section::OperationalExpenditure => FINANCE_FIELDS,
            Section::SponsoredProjects | Section::ConsultancyProjects => PROJECT_FIELDS,
            Section::Facilities => FACILITY_FIELDS,
            Section::FacultyCount => FACULTY_FIELDS,
        }
    }

    /// Resolve a column header to this section's canonical field name
    /// (case-insensitive).
    pub fn field(self, name: &str) -> Option<&'static str> {
        let name = name.trim();
        self.fields()
            .iter()
            .copied()
            .find(|f| f.eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// A single extracted cell value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Integer(i64),
    Decimal(Decimal),
    Text(String),
    Absent,
}

impl Value {
    pub fn is_absent(&self) -> bool {
        matches!(self, Value::Absent)
    }

    /// Text or absent, for label cells.
    pub fn text_or_absent(text: Option<&str>) -> Value {
        text.map(|t| Value::Text(t.to_string()))
            .unwrap_or(Value::Absent)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(i) => write!(f, "{i}"),
            Value::Decimal(d) => write!(f, "{d}"),
            Value::Text(s) => f.write_str(s),
            Value::Absent => f.write_str("-"),
        }
    }
}

/// One extracted row: field name to value, in insertion order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Record {
    fields: IndexMap<&'static str, Value>,
}

impl Record {
    /// Start a record tagged with the institute's display name.
    pub fn new(institute: &str) -> Self {
        let mut fields = IndexMap::new();
        fields.insert("Institute", Value::Text(institute.to_string()));
        Record { fields }
    }

    pub fn set(&mut self, field: &'static str, value: Value) {
        self.fields.insert(field, value);
    }

    pub fn with(mut self, field: &'static str, value: Value) -> Self {
        self.set(field, value);
        self
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Fields in insertion order, including explicitly absent ones.
    pub fn fields(&self) -> impl Iterator<Item = (&'static str, &Value)> {
        self.fields.iter().map(|(k, v)| (*k, v))
    }

    /// Fields that carry a value.
    pub fn present_fields(&self) -> impl Iterator<Item = (&'static str, &Value)> {
        self.fields().filter(|(_, v)| !v.is_absent())
    }

    pub fn conforms_to(&self, section: Section) -> bool {
        let allowed = section.fields();
        self.fields.keys().all(|k| allowed.contains(k))
    }
}

/// Section → ordered records for one document.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SectionRecords {
    by_section: BTreeMap<Section, Vec<Record>>,
}

impl SectionRecords {
    pub fn push(&mut self, section: Section, record: Record) {
        debug_assert!(
            record.conforms_to(section),
            "record carries fields foreign to {section}"
        );
        self.by_section.entry(section).or_default().push(record);
    }

    pub fn get(&self, section: Section) -> &[Record] {
        self.by_section
            .get(&section)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Every section in report order, including empty ones.
    pub fn iter(&self) -> impl Iterator<Item = (Section, &[Record])> {
        Section::ALL.into_iter().map(|s| (s, self.get(s)))
    }

    pub fn total(&self) -> usize {
        self.by_section.values().map(Vec::len).sum()
    }
}

/// Who a document describes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstituteIdentity {
    pub display_name: String,
    pub source_file: String,
    /// Bracketed institute ID or numeric file-name prefix, when found.
    pub short_code: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    MissingTable,
    MalformedRow,
    UnparseableNumber,
    UnresolvableIdentity,
    PageCountMismatch,
    UnknownColumn,
}

impl fmt::Display for WarningKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            WarningKind::MissingTable => "missing table",
            WarningKind::MalformedRow => "malformed row",
            WarningKind::UnparseableNumber => "unparseable number",
            WarningKind::UnresolvableIdentity => "unresolvable identity",
            WarningKind::PageCountMismatch => "page count mismatch",
            WarningKind::UnknownColumn => "unknown column",
        };
        f.write_str(s)
    }
}

/// A problem absorbed during extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractionWarning {
    pub kind: WarningKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<Section>,
    /// 0-based page index.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<usize>,
    pub message: String,
}

impl fmt::Display for ExtractionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if let Some(section) = self.section {
            write!(f, " [{section}]")?;
        }
        if let Some(page) = self.page {
            write!(f, " (page {})", page + 1)?;
        }
        write!(f, ": {}", self.message)
    }
}

/// Everything extracted from one source document.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionResult {
    pub identity: InstituteIdentity,
    pub records: SectionRecords,
    pub warnings: Vec<ExtractionWarning>,
}

impl ExtractionResult {
    pub fn warnings_of(&self, kind: WarningKind) -> impl Iterator<Item = &ExtractionWarning> {
        self.warnings.iter().filter(move |w| w.kind == kind)
    }
}
