use indexmap::IndexMap;
use quick_xml::events::Event;
use quick_xml::Reader;
use serde::{Deserialize, Serialize};

use crate::error::NirfError;
use crate::model::Section;
use crate::parsing::identity::derive_short_code;
use crate::store::normalize::{normalize_field, section_key};
use crate::xml::{ENTRY_TAG, IDENTITY_TAG, NAME_TAG, ROOT_TAG, SOURCE_TAG};

/// One loaded entry: normalized field name to coerced JSON value.
pub type Entry = IndexMap<String, serde_json::Value>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InstituteInfo {
    pub name: Option<String>,
    pub source_file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub college_id: Option<String>,
}

/// A serialized document read back into store form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoadedDocument {
    pub institute: InstituteInfo,
    /// Lowercased section name to entries, in document order.
    pub sections: IndexMap<String, Vec<Entry>>,
    /// The XML file this was read from.
    pub file_name: String,
}

impl LoadedDocument {
    pub fn entry_count(&self) -> usize {
        self.sections.values().map(Vec::len).sum()
    }
}

/// Where the reader is inside the document.
enum Cursor {
    Outside,
    Identity,
    IdentityField(String),
    Section(String),
    Entry(String, Entry),
    Field(String, Entry, String, String),
}

/// Parse one interchange XML document.
///
/// Elements other than the identity block and the known section elements
/// are ignored. `college_id` comes from the bracketed token of the name or
/// the numeric prefix of `file_name`.
pub fn parse_document(xml: &str, file_name: &str) -> Result<LoadedDocument, NirfError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut doc = LoadedDocument {
        file_name: file_name.to_string(),
        ..LoadedDocument::default()
    };
    let mut saw_root = false;
    let mut cursor = Cursor::Outside;
    let mut skip_depth = 0usize;
    let mut open = 0usize;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| NirfError::Xml(format!("{file_name}: {e}")))?;

        match event {
            Event::Start(ref e) | Event::Empty(ref e) => {
                let empty = matches!(event, Event::Empty(_));
                if !empty {
                    open += 1;
                }
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();

                if !saw_root {
                    if name != ROOT_TAG {
                        return Err(NirfError::Xml(format!(
                            "{file_name}: root element is <{name}>, expected <{ROOT_TAG}>"
                        )));
                    }
                    saw_root = true;
                    continue;
                }
                if skip_depth > 0 {
                    if !empty {
                        skip_depth += 1;
                    }
                    continue;
                }

                // Aliased section tags share the canonical key.
                let section = Section::from_tag(&name).map(|s| section_key(s.tag()));
                cursor = match (cursor, section) {
                    (Cursor::Outside, _) if name == IDENTITY_TAG => {
                        if empty {
                            Cursor::Outside
                        } else {
                            Cursor::Identity
                        }
                    }
                    (Cursor::Outside, Some(key)) => {
                        doc.sections.entry(key.clone()).or_default();
                        if empty {
                            Cursor::Outside
                        } else {
                            Cursor::Section(key)
                        }
                    }
                    (Cursor::Identity, _) if !empty => Cursor::IdentityField(name),
                    (Cursor::Section(key), _) if name == ENTRY_TAG && !empty => {
                        Cursor::Entry(key, Entry::new())
                    }
                    (Cursor::Entry(key, mut entry), _) => {
                        if empty {
                            entry.insert(normalize_field(&name), serde_json::Value::Null);
                            Cursor::Entry(key, entry)
                        } else {
                            Cursor::Field(key, entry, name, String::new())
                        }
                    }
                    (other, _) => {
                        if !empty {
                            skip_depth = 1;
                        }
                        other
                    }
                };
            }
            Event::Text(_) | Event::CData(_) if skip_depth > 0 => {}
            Event::Text(e) => {
                let text = e
                    .unescape()
                    .map_err(|e| NirfError::Xml(format!("{file_name}: {e}")))?;
                append_text(&mut cursor, &mut doc, &text);
            }
            Event::CData(e) => {
                let text = String::from_utf8_lossy(&e).into_owned();
                append_text(&mut cursor, &mut doc, &text);
            }
            Event::End(_) => {
                open = open.saturating_sub(1);
                if skip_depth > 0 {
                    skip_depth -= 1;
                    continue;
                }
                cursor = match cursor {
                    Cursor::Field(key, mut entry, name, text) => {
                        entry.insert(normalize_field(&name), coerce_text(&text));
                        Cursor::Entry(key, entry)
                    }
                    Cursor::Entry(key, entry) => {
                        if !entry.is_empty() {
                            doc.sections.entry(key.clone()).or_default().push(entry);
                        }
                        Cursor::Section(key)
                    }
                    Cursor::IdentityField(_) => Cursor::Identity,
                    Cursor::Identity | Cursor::Section(_) | Cursor::Outside => Cursor::Outside,
                };
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !saw_root {
        return Err(NirfError::Xml(format!("{file_name}: no <{ROOT_TAG}> element")));
    }
    if open > 0 {
        return Err(NirfError::Xml(format!(
            "{file_name}: document ends with {open} unclosed element(s)"
        )));
    }

    doc.institute.college_id = derive_short_code(doc.institute.name.as_deref(), file_name);
    Ok(doc)
}

fn append_text(cursor: &mut Cursor, doc: &mut LoadedDocument, text: &str) {
    match cursor {
        Cursor::Field(_, _, _, buf) => buf.push_str(text),
        Cursor::IdentityField(name) => {
            let slot = match name.as_str() {
                NAME_TAG => &mut doc.institute.name,
                SOURCE_TAG => &mut doc.institute.source_file,
                _ => return,
            };
            slot.get_or_insert_with(String::new).push_str(text.trim());
        }
        _ => {}
    }
}

/// Coerce element text for the store.
///
/// Thousands separators and currency symbols are dropped; what remains is
/// an integer or float when it is all digits apart from `-` and `.`, and
/// the trimmed text otherwise. Empty text is null.
pub fn coerce_text(raw: &str) -> serde_json::Value {
    let text = raw.trim();
    if text.is_empty() {
        return serde_json::Value::Null;
    }

    let cleaned: String = text
        .chars()
        .filter(|c| !matches!(c, ',' | '₹' | '$'))
        .collect();
    let cleaned = cleaned.trim();
    let mut digits = cleaned.chars().filter(|c| !matches!(c, '-' | '.')).peekable();
    let looks_numeric = digits.peek().is_some() && digits.all(|c| c.is_ascii_digit());

    if looks_numeric {
        if cleaned.contains('.') {
            if let Some(n) = cleaned
                .parse::<f64>()
                .ok()
                .and_then(serde_json::Number::from_f64)
            {
                return serde_json::Value::Number(n);
            }
        } else if let Ok(i) = cleaned.parse::<i64>() {
            return serde_json::Value::from(i);
        }
    }
    serde_json::Value::String(text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<NIRF_Data>
  <Institute>
    <Name>IIT Madras [IR-E-U-0456]</Name>
    <SourceFile>001-iitm.pdf</SourceFile>
  </Institute>
  <SanctionedIntake>
    <Entry>
      <Institute>IIT Madras [IR-E-U-0456]</Institute>
      <Program>UG [4 Years]</Program>
      <Year>2022-23</Year>
      <ApprovedIntake>1,200</ApprovedIntake>
    </Entry>
    <Entry/>
  </SanctionedIntake>
  <PlacementData>
    <Entry>
      <MedianSalary>₹ 612000.50</MedianSalary>
      <Notes><Inner>ignored</Inner></Notes>
      <Remarks/>
    </Entry>
  </PlacementData>
  <FacultyCount/>
  <Appendix><Entry><X>1</X></Entry></Appendix>
</NIRF_Data>"#;

    #[test]
    fn test_parse_document_sections_and_identity() {
        let doc = parse_document(SAMPLE, "001-iitm.xml").unwrap();
        assert_eq!(doc.institute.name.as_deref(), Some("IIT Madras [IR-E-U-0456]"));
        assert_eq!(doc.institute.source_file.as_deref(), Some("001-iitm.pdf"));
        assert_eq!(doc.institute.college_id.as_deref(), Some("IR-E-U-0456"));

        let keys: Vec<&str> = doc.sections.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["sanctionedintake", "placementdata", "facultycount"]);

        let intake = &doc.sections["sanctionedintake"];
        assert_eq!(intake.len(), 1);
        assert_eq!(intake[0]["program_name"], json!("UG [4 Years]"));
        assert_eq!(intake[0]["academic_year"], json!("2022-23"));
        assert_eq!(intake[0]["approved_intake"], json!(1200));
        assert_eq!(intake[0]["institute"], json!("IIT Madras [IR-E-U-0456]"));

        let placement = &doc.sections["placementdata"][0];
        assert_eq!(placement["median_salary"], json!(612000.5));
        assert_eq!(placement["notes"], serde_json::Value::Null);
        assert_eq!(placement["remarks"], serde_json::Value::Null);

        assert!(doc.sections["facultycount"].is_empty());
        assert_eq!(doc.entry_count(), 2);
    }

    #[test]
    fn test_section_alias_uses_canonical_key() {
        let xml = "<NIRF_Data><OpExpenditure><Entry><Amount>5</Amount></Entry>\
                   </OpExpenditure></NIRF_Data>";
        let doc = parse_document(xml, "x.xml").unwrap();
        let keys: Vec<&str> = doc.sections.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["operationalexpenditure"]);
        assert_eq!(doc.sections["operationalexpenditure"][0]["amount"], json!(5));
    }

    #[test]
    fn test_college_id_from_file_prefix() {
        let xml = "<NIRF_Data><Institute><Name>Some College</Name></Institute></NIRF_Data>";
        let doc = parse_document(xml, "042-some.xml").unwrap();
        assert_eq!(doc.institute.college_id.as_deref(), Some("042"));
        let doc = parse_document(xml, "some.xml").unwrap();
        assert_eq!(doc.institute.college_id, None);
    }

    #[test]
    fn test_wrong_root_rejected() {
        assert!(matches!(
            parse_document("<Other/>", "x.xml"),
            Err(NirfError::Xml(_))
        ));
        assert!(parse_document("", "x.xml").is_err());
        assert!(parse_document("<NIRF_Data><Entry>", "x.xml").is_err());
    }

    #[test]
    fn test_coerce_text() {
        assert_eq!(coerce_text(" 120 "), json!(120));
        assert_eq!(coerce_text("$1,250.75"), json!(1250.75));
        assert_eq!(coerce_text("2021-22"), json!("2021-22"));
        assert_eq!(coerce_text("Yes"), json!("Yes"));
        assert_eq!(coerce_text("-"), json!("-"));
        assert_eq!(coerce_text(""), serde_json::Value::Null);
    }
}
