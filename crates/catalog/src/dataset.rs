use std::collections::BTreeSet;
use std::sync::Arc;

use crate::model::{DatasetEntry, DatasetEntryRecord, EntryDefect, Region};

#[derive(Debug, Clone, PartialEq)]
pub enum DatasetError {
    Parse(String),
    MalformedEntry { index: usize, id: String, defect: EntryDefect },
    DuplicateId(String),
}

impl std::fmt::Display for DatasetError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DatasetError::Parse(msg) => write!(f, "dataset JSON parse error: {msg}"),
            DatasetError::MalformedEntry { index, id, defect } => {
                write!(f, "malformed dataset entry {index} ({id:?}): {defect}")
            }
            DatasetError::DuplicateId(id) => write!(f, "duplicate dataset entry id {id:?}"),
        }
    }
}

impl std::error::Error for DatasetError {}

/// Immutable snapshot of the dataset for one render cycle.
///
/// Cloning is cheap (shared slice). Filtering builds a new snapshot; nothing
/// mutates entries in place. The blake3 `fingerprint` identifies the content so
/// dependents can tell a new snapshot from a re-delivered one.
#[derive(Debug, Clone)]
pub struct Dataset {
    entries: Arc<[DatasetEntry]>,
    fingerprint: String,
}

/// Borrowed view of one region together with its owning entry.
#[derive(Debug, Copy, Clone)]
pub struct RegionRef<'a> {
    pub entry_index: usize,
    pub region_index: usize,
    pub entry: &'a DatasetEntry,
    pub region: &'a Region,
}

impl PartialEq for Dataset {
    fn eq(&self, other: &Self) -> bool {
        self.fingerprint == other.fingerprint
    }
}

impl Default for Dataset {
    fn default() -> Self {
        Self::from_validated(Vec::new())
    }
}

impl Dataset {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a snapshot, rejecting duplicate ids.
    pub fn try_new(entries: Vec<DatasetEntry>) -> Result<Self, DatasetError> {
        let mut seen = BTreeSet::new();
        for entry in &entries {
            if !seen.insert(entry.id.as_str()) {
                return Err(DatasetError::DuplicateId(entry.id.clone()));
            }
        }
        Ok(Self::from_validated(entries))
    }

    /// Parses the JSON wire form (array of entries). The first malformed entry
    /// fails the whole load; partial data is never rendered.
    pub fn from_json_str(payload: &str) -> Result<Self, DatasetError> {
        let records: Vec<DatasetEntryRecord> =
            serde_json::from_str(payload).map_err(|e| DatasetError::Parse(e.to_string()))?;
        Self::from_records(records)
    }

    pub fn from_records(records: Vec<DatasetEntryRecord>) -> Result<Self, DatasetError> {
        let mut entries = Vec::with_capacity(records.len());
        for (index, record) in records.into_iter().enumerate() {
            let id = record.id.clone();
            let entry = DatasetEntry::try_from(record).map_err(|defect| {
                tracing::warn!(index, id = %id, %defect, "rejecting dataset entry");
                DatasetError::MalformedEntry { index, id, defect }
            })?;
            entries.push(entry);
        }
        Self::try_new(entries)
    }

    pub fn to_json_string(&self) -> Result<String, DatasetError> {
        let records: Vec<DatasetEntryRecord> =
            self.entries.iter().map(DatasetEntry::to_record).collect();
        serde_json::to_string(&records).map_err(|e| DatasetError::Parse(e.to_string()))
    }

    pub(crate) fn from_validated(entries: Vec<DatasetEntry>) -> Self {
        let fingerprint = fingerprint_entries(&entries);
        Self {
            entries: entries.into(),
            fingerprint,
        }
    }

    pub fn entries(&self) -> &[DatasetEntry] {
        &self.entries
    }

    pub fn entry(&self, id: &str) -> Option<&DatasetEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn region_count(&self) -> usize {
        self.entries.iter().map(|e| e.regions.len()).sum()
    }

    /// All regions in entry order, then region order.
    pub fn regions(&self) -> impl Iterator<Item = RegionRef<'_>> + '_ {
        self.entries
            .iter()
            .enumerate()
            .flat_map(|(entry_index, entry)| {
                entry
                    .regions
                    .iter()
                    .enumerate()
                    .map(move |(region_index, region)| RegionRef {
                        entry_index,
                        region_index,
                        entry,
                        region,
                    })
            })
    }

    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }
}

fn fingerprint_entries(entries: &[DatasetEntry]) -> String {
    let mut hasher = blake3::Hasher::new();
    for entry in entries {
        hash_str(&mut hasher, &entry.id);
        hash_str(&mut hasher, &entry.name);
        hasher.update(&[entry.color.r, entry.color.g, entry.color.b]);
        hasher.update(&(entry.regions.len() as u64).to_le_bytes());
        for region in &entry.regions {
            hash_str(&mut hasher, &region.country);
            hasher.update(&region.location.longitude.to_bits().to_le_bytes());
            hasher.update(&region.location.latitude.to_bits().to_le_bytes());
            hasher.update(&region.prevalence.to_bits().to_le_bytes());
            hash_str(&mut hasher, &region.population);
        }
    }
    hasher.finalize().to_hex().to_string()
}

fn hash_str(hasher: &mut blake3::Hasher, s: &str) {
    hasher.update(&(s.len() as u64).to_le_bytes());
    hasher.update(s.as_bytes());
}
