//! Which table on which page feeds which section.
//!
//! The report template is positional: the first two tables of page 1 are
//! intake and strength, everything else is recognised by the text of its
//! leading cells. `RULES` is that protocol written down, applied in order.

use crate::extraction::table::Table;
use crate::model::Section;
use crate::parsing::context::TableScope;
use crate::parsing::sections::{self, LIFTS_QUESTION, SPECIAL_CELL_QUESTION};

pub const PLACEMENT_HEADER: &str = "Academic Year";
pub const PHD_HEADER: &str = "Ph.D";
pub const FINANCE_HEADER: &str = "Financial Year";
pub const CAPITAL_CAPTION: &str = "Annual Capital";
pub const OPERATIONAL_CAPTION: &str = "Annual Operational";
pub const SPONSORED_MARKER: &str = "Sponsored Projects";
pub const CONSULTANCY_MARKER: &str = "Consultancy Projects";
pub const FACULTY_LABEL: &str = "Number of faculty";

/// How a rule picks tables from a page.
#[derive(Clone, Copy)]
pub enum Selector {
    /// The table at this detection index. Claims it, so later
    /// discriminator rules on the same page skip it.
    Nth(usize),
    /// Every unclaimed table the discriminator accepts.
    Every(fn(&Table) -> bool),
    /// The first unclaimed table the discriminator accepts.
    First(fn(&Table) -> bool),
}

pub type ExtractFn = fn(&Table, &mut TableScope<'_>);

pub struct TableRule {
    pub name: &'static str,
    pub section: Section,
    /// 0-based page indices scanned by this rule.
    pub pages: &'static [usize],
    pub selector: Selector,
    pub extract: ExtractFn,
}

impl TableRule {
    /// Indices of the tables this rule reads, in detection order.
    /// `claimed` has one flag per table and is updated by `Nth` selectors.
    pub fn select(&self, tables: &[Table], claimed: &mut [bool]) -> Vec<usize> {
        match self.selector {
            Selector::Nth(n) => {
                if n < tables.len() {
                    claimed[n] = true;
                    vec![n]
                } else {
                    Vec::new()
                }
            }
            Selector::Every(accept) => tables
                .iter()
                .enumerate()
                .filter(|(i, t)| !claimed[*i] && accept(t))
                .map(|(i, _)| i)
                .collect(),
            Selector::First(accept) => tables
                .iter()
                .enumerate()
                .find(|(i, t)| !claimed[*i] && accept(t))
                .map(|(i, _)| vec![i])
                .unwrap_or_default(),
        }
    }

    /// Whether finding nothing on a page counts as a missing table.
    pub fn expects_table(&self) -> bool {
        !matches!(self.selector, Selector::Every(_))
    }
}

pub fn is_placement(t: &Table) -> bool {
    t.cell_starts_with(0, 0, PLACEMENT_HEADER)
}

pub fn is_phd(t: &Table) -> bool {
    t.cell_starts_with(0, 0, PHD_HEADER)
}

fn is_finance(t: &Table, caption: &str) -> bool {
    t.cell_starts_with(0, 0, FINANCE_HEADER) && t.cell_starts_with(2, 0, caption)
}

pub fn is_capital(t: &Table) -> bool {
    is_finance(t, CAPITAL_CAPTION)
}

pub fn is_operational(t: &Table) -> bool {
    is_finance(t, OPERATIONAL_CAPTION)
}

fn is_project(t: &Table, marker: &str) -> bool {
    t.cell(0, 0).is_some_and(|c| c.trim() == FINANCE_HEADER) && t.cell_contains(1, 0, marker)
}

pub fn is_sponsored(t: &Table) -> bool {
    is_project(t, SPONSORED_MARKER)
}

pub fn is_consultancy(t: &Table) -> bool {
    is_project(t, CONSULTANCY_MARKER)
}

pub fn is_facilities(t: &Table) -> bool {
    t.cell_starts_with(0, 0, LIFTS_QUESTION) || t.cell_starts_with(0, 2, SPECIAL_CELL_QUESTION)
}

pub fn is_faculty(t: &Table) -> bool {
    t.cell_starts_with(0, 0, FACULTY_LABEL)
}

pub const RULES: &[TableRule] = &[
    TableRule {
        name: "sanctioned intake",
        section: Section::SanctionedIntake,
        pages: &[0],
        selector: Selector::Nth(0),
        extract: sections::extract_intake,
    },
    TableRule {
        name: "student strength",
        section: Section::StudentStrength,
        pages: &[0],
        selector: Selector::Nth(1),
        extract: sections::extract_strength,
    },
    TableRule {
        name: "placement",
        section: Section::PlacementData,
        pages: &[0, 1],
        selector: Selector::Every(is_placement),
        extract: sections::extract_placement,
    },
    TableRule {
        name: "ph.d",
        section: Section::PhDData,
        pages: &[1],
        selector: Selector::First(is_phd),
        extract: sections::extract_phd,
    },
    TableRule {
        name: "capital expenditure",
        section: Section::CapitalExpenditure,
        pages: &[2],
        selector: Selector::Every(is_capital),
        extract: sections::extract_finance,
    },
    TableRule {
        name: "operational expenditure",
        section: Section::OperationalExpenditure,
        pages: &[2],
        selector: Selector::Every(is_operational),
        extract: sections::extract_finance,
    },
    TableRule {
        name: "sponsored research",
        section: Section::SponsoredProjects,
        pages: &[2],
        selector: Selector::Every(is_sponsored),
        extract: sections::extract_projects,
    },
    TableRule {
        name: "consultancy",
        section: Section::ConsultancyProjects,
        pages: &[2],
        selector: Selector::Every(is_consultancy),
        extract: sections::extract_projects,
    },
    TableRule {
        name: "facilities",
        section: Section::Facilities,
        pages: &[3],
        selector: Selector::Every(is_facilities),
        extract: sections::extract_facilities,
    },
    TableRule {
        name: "faculty count",
        section: Section::FacultyCount,
        pages: &[3],
        selector: Selector::Every(is_faculty),
        extract: sections::extract_faculty,
    },
];

/// Number of pages the rule table reads.
pub fn required_pages() -> usize {
    RULES
        .iter()
        .flat_map(|r| r.pages.iter())
        .max()
        .map_or(0, |p| p + 1)
}
