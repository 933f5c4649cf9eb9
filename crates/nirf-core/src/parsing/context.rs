use crate::model::{
    ExtractionResult, ExtractionWarning, InstituteIdentity, Record, Section, SectionRecords,
    Value, WarningKind,
};
use crate::parsing::values::parse_number;

/// Per-document accumulator threaded through the extraction rules.
///
/// One is created per source document and consumed by `finish`; nothing in
/// it outlives the document.
pub struct DocumentContext {
    identity: InstituteIdentity,
    records: SectionRecords,
    warnings: Vec<ExtractionWarning>,
}

impl DocumentContext {
    pub fn new(identity: InstituteIdentity) -> Self {
        DocumentContext {
            identity,
            records: SectionRecords::default(),
            warnings: Vec::new(),
        }
    }

    pub fn identity(&self) -> &InstituteIdentity {
        &self.identity
    }

    pub fn push(&mut self, section: Section, record: Record) {
        self.records.push(section, record);
    }

    pub fn warn(&mut self, warning: ExtractionWarning) {
        log::warn!("{}: {warning}", self.identity.source_file);
        self.warnings.push(warning);
    }

    /// Rule-facing view for one table of `section` on `page`.
    pub fn scope(&mut self, section: Section, page: usize) -> TableScope<'_> {
        TableScope {
            ctx: self,
            section,
            page,
        }
    }

    pub fn finish(self) -> ExtractionResult {
        ExtractionResult {
            identity: self.identity,
            records: self.records,
            warnings: self.warnings,
        }
    }
}

/// What an extraction rule sees while reading one table.
pub struct TableScope<'a> {
    ctx: &'a mut DocumentContext,
    section: Section,
    page: usize,
}

impl TableScope<'_> {
    /// A fresh record tagged with the institute's display name.
    pub fn record(&self) -> Record {
        Record::new(&self.ctx.identity.display_name)
    }

    pub fn emit(&mut self, record: Record) {
        self.ctx.push(self.section, record);
    }

    pub fn warn(&mut self, kind: WarningKind, message: impl Into<String>) {
        let warning = ExtractionWarning {
            kind,
            section: Some(self.section),
            page: Some(self.page),
            message: message.into(),
        };
        self.ctx.warn(warning);
    }

    /// Read a numeric cell for `field`.
    ///
    /// Returns None when the cell is missing, blank or the sentinel, and
    /// `Some(Value::Absent)` when it holds text that is not a valid number
    /// (an UnparseableNumber warning is recorded).
    pub fn number(&mut self, cell: Option<&str>, field: &str) -> Option<Value> {
        match parse_number(cell?) {
            Ok(v) => v,
            Err(e) => {
                self.warn(WarningKind::UnparseableNumber, format!("{field}: {e}"));
                Some(Value::Absent)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::identity::identity_for;

    #[test]
    fn test_scope_tags_records_and_warnings() {
        let mut ctx = DocumentContext::new(identity_for("ABC".into(), "abc.pdf"));
        {
            let mut scope = ctx.scope(Section::FacultyCount, 3);
            let v = scope.number(Some("forty"), "TotalFaculty");
            assert_eq!(v, Some(Value::Absent));
            assert_eq!(scope.number(Some("-"), "TotalFaculty"), None);
            assert_eq!(scope.number(None, "TotalFaculty"), None);
            let rec = scope.record().with("TotalFaculty", Value::Integer(40));
            scope.emit(rec);
        }
        let result = ctx.finish();
        let recs = result.records.get(Section::FacultyCount);
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].get("Institute"), Some(&Value::Text("ABC".into())));
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].kind, WarningKind::UnparseableNumber);
        assert_eq!(result.warnings[0].page, Some(3));
        assert_eq!(result.warnings[0].section, Some(Section::FacultyCount));
    }
}
