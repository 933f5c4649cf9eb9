pub mod loader;
pub mod normalize;

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::NirfError;
use loader::{Entry, LoadedDocument};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportMetadata {
    pub imported_at: DateTime<Utc>,
    pub source_file: String,
}

/// One loaded document, kept as imported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndividualRecord {
    pub id: String,
    #[serde(flatten)]
    pub document: LoadedDocument,
    pub metadata: ImportMetadata,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MasterMetadata {
    pub created_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
    pub source_files: Vec<String>,
}

/// The merged view of one institute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MasterRecord {
    pub college_id: String,
    pub college_name: String,
    pub sections: IndexMap<String, Vec<Entry>>,
    pub metadata: MasterMetadata,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct StoreData {
    individuals: Vec<IndividualRecord>,
    master: BTreeMap<String, MasterRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created(String),
    Updated(String),
    /// The document had neither a college id nor a name.
    Skipped,
}

/// JSON-file-backed aggregate store: every imported document plus one
/// merged record per institute.
#[derive(Debug)]
pub struct AggregateStore {
    path: Option<PathBuf>,
    data: StoreData,
    seq: usize,
}

impl AggregateStore {
    /// A store that is never written to disk.
    pub fn in_memory() -> Self {
        AggregateStore {
            path: None,
            data: StoreData::default(),
            seq: 0,
        }
    }

    /// Open the store at `path`, starting empty when the file does not exist.
    pub fn open(path: &Path) -> Result<Self, NirfError> {
        let data = match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content)
                .map_err(|e| NirfError::Store(format!("{}: {e}", path.display())))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => StoreData::default(),
            Err(e) => return Err(NirfError::Io(e)),
        };
        let seq = data.individuals.len();
        Ok(AggregateStore {
            path: Some(path.to_path_buf()),
            data,
            seq,
        })
    }

    pub fn individuals(&self) -> &[IndividualRecord] {
        &self.data.individuals
    }

    pub fn master(&self) -> impl Iterator<Item = &MasterRecord> {
        self.data.master.values()
    }

    pub fn get(&self, college_id: &str) -> Option<&MasterRecord> {
        self.data.master.get(college_id)
    }

    /// Record a loaded document as imported. Returns its id.
    pub fn insert_individual(&mut self, doc: &LoadedDocument, now: DateTime<Utc>) -> String {
        self.seq += 1;
        let key = master_key(doc).unwrap_or_else(|| "unknown".into());
        let id = format!(
            "individual_{key}_{}_{}",
            now.format("%Y%m%d%H%M%S"),
            self.seq
        );
        self.data.individuals.push(IndividualRecord {
            id: id.clone(),
            document: doc.clone(),
            metadata: ImportMetadata {
                imported_at: now,
                source_file: source_file(doc),
            },
        });
        id
    }

    /// Merge a loaded document into its institute's master record.
    ///
    /// Incoming sections replace stored ones wholesale; sections the
    /// document does not carry are kept.
    pub fn upsert_institute(&mut self, doc: &LoadedDocument, now: DateTime<Utc>) -> UpsertOutcome {
        let Some(key) = master_key(doc) else {
            log::warn!("{}: no college id or name, not merged", doc.file_name);
            return UpsertOutcome::Skipped;
        };
        let source = source_file(doc);

        if let Some(existing) = self.data.master.get_mut(&key) {
            for (section, entries) in &doc.sections {
                existing.sections.insert(section.clone(), entries.clone());
            }
            if !existing.metadata.source_files.contains(&source) {
                existing.metadata.source_files.push(source);
            }
            existing.metadata.last_updated = now;
            log::debug!("updated master record {key}");
            return UpsertOutcome::Updated(key);
        }

        let college_name = doc.institute.name.clone().unwrap_or_default();
        self.data.master.insert(
            key.clone(),
            MasterRecord {
                college_id: key.clone(),
                college_name,
                sections: doc.sections.clone(),
                metadata: MasterMetadata {
                    created_at: now,
                    last_updated: now,
                    source_files: vec![source],
                },
            },
        );
        log::debug!("created master record {key}");
        UpsertOutcome::Created(key)
    }

    /// Insert and merge in one step, stamped with the current time.
    pub fn import(&mut self, doc: &LoadedDocument) -> UpsertOutcome {
        let now = Utc::now();
        self.insert_individual(doc, now);
        self.upsert_institute(doc, now)
    }

    /// Write the store back to its file, replacing it atomically.
    pub fn save(&self) -> Result<(), NirfError> {
        let path = self
            .path
            .as_deref()
            .ok_or_else(|| NirfError::Store("in-memory store has no file".into()))?;
        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };

        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        serde_json::to_writer_pretty(&mut tmp, &self.data)?;
        tmp.flush()?;
        tmp.persist(path).map_err(|e| NirfError::Io(e.error))?;
        Ok(())
    }
}

/// Master key for a document: its college id, else a slug of its name.
pub fn master_key(doc: &LoadedDocument) -> Option<String> {
    if let Some(id) = &doc.institute.college_id {
        return Some(id.clone());
    }
    let name = doc.institute.name.as_deref()?.trim();
    if name.is_empty() {
        return None;
    }
    Some(format!("unnamed_{}", slug(name)))
}

fn source_file(doc: &LoadedDocument) -> String {
    doc.institute
        .source_file
        .clone()
        .unwrap_or_else(|| doc.file_name.clone())
}

fn slug(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_alphanumeric() {
            out.extend(c.to_lowercase());
        } else if !out.ends_with('_') {
            out.push('_');
        }
    }
    out.trim_matches('_').to_string()
}
