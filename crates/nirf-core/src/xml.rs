use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::error::NirfError;
use crate::model::{ExtractionResult, Record};

pub const ROOT_TAG: &str = "NIRF_Data";
pub const IDENTITY_TAG: &str = "Institute";
pub const NAME_TAG: &str = "Name";
pub const SOURCE_TAG: &str = "SourceFile";
pub const ENTRY_TAG: &str = "Entry";

/// Render one document as the interchange XML.
///
/// Every section gets an element, in report order, even when it has no
/// entries. Absent fields are left out of their entry.
pub fn to_xml(result: &ExtractionResult) -> Result<String, NirfError> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    write_document(&mut writer, result).map_err(|e| NirfError::Xml(e.to_string()))?;
    String::from_utf8(writer.into_inner()).map_err(|e| NirfError::Xml(e.to_string()))
}

fn write_document(writer: &mut Writer<Vec<u8>>, result: &ExtractionResult) -> std::io::Result<()> {
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    writer.write_event(Event::Start(BytesStart::new(ROOT_TAG)))?;

    writer.write_event(Event::Start(BytesStart::new(IDENTITY_TAG)))?;
    writer
        .create_element(NAME_TAG)
        .write_text_content(BytesText::new(&result.identity.display_name))?;
    writer
        .create_element(SOURCE_TAG)
        .write_text_content(BytesText::new(&result.identity.source_file))?;
    writer.write_event(Event::End(BytesEnd::new(IDENTITY_TAG)))?;

    for (section, records) in result.records.iter() {
        if records.is_empty() {
            writer.create_element(section.tag()).write_empty()?;
            continue;
        }
        writer.write_event(Event::Start(BytesStart::new(section.tag())))?;
        for record in records {
            write_entry(writer, record)?;
        }
        writer.write_event(Event::End(BytesEnd::new(section.tag())))?;
    }

    writer.write_event(Event::End(BytesEnd::new(ROOT_TAG)))?;
    Ok(())
}

fn write_entry(writer: &mut Writer<Vec<u8>>, record: &Record) -> std::io::Result<()> {
    writer.write_event(Event::Start(BytesStart::new(ENTRY_TAG)))?;
    for (field, value) in record.present_fields() {
        let text = value.to_string();
        writer
            .create_element(field)
            .write_text_content(BytesText::new(&text))?;
    }
    writer.write_event(Event::End(BytesEnd::new(ENTRY_TAG)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Section, SectionRecords, Value};
    use crate::parsing::identity::identity_for;
    use rust_decimal_macros::dec;

    fn result_with(records: SectionRecords) -> ExtractionResult {
        ExtractionResult {
            identity: identity_for("R&D Institute <Main>".into(), "001-rd.pdf"),
            records,
            warnings: Vec::new(),
        }
    }

    #[test]
    fn test_every_section_present_and_text_escaped() {
        let xml = to_xml(&result_with(SectionRecords::default())).unwrap();
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(xml.contains("<Name>R&amp;D Institute &lt;Main&gt;</Name>"));
        assert!(xml.contains("<SourceFile>001-rd.pdf</SourceFile>"));
        for section in Section::ALL {
            assert!(xml.contains(&format!("<{}/>", section.tag())), "{section}");
        }
        let intake = xml.find("<SanctionedIntake/>").unwrap();
        let faculty = xml.find("<FacultyCount/>").unwrap();
        assert!(intake < faculty);
    }

    #[test]
    fn test_entries_omit_absent_fields() {
        let mut records = SectionRecords::default();
        records.push(
            Section::SponsoredProjects,
            Record::new("X")
                .with("Type", Value::Text("Total no. of Sponsored Projects".into()))
                .with("Year", Value::Text("2021-22".into()))
                .with("Value", Value::Absent),
        );
        records.push(
            Section::CapitalExpenditure,
            Record::new("X").with("Amount", Value::Decimal(dec!(1250.50))),
        );
        let xml = to_xml(&result_with(records)).unwrap();
        assert!(xml.contains("<Year>2021-22</Year>"));
        assert!(!xml.contains("<Value>"));
        assert!(xml.contains("<Amount>1250.50</Amount>"));
        assert!(xml.contains("\n    <Entry>\n      <Institute>X</Institute>"));
    }
}
