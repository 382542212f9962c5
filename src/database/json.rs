//! JSON program database snapshots.
//!
//! A snapshot is an export of a disassembler database: functions with
//! their comment slots, cross-references and defined string literals.
//! The annotation pass updates it in memory, and [`JsonDatabase::save`]
//! writes it back atomically.

use super::{DecodeError, ProgramDatabase};
use crate::models::{Address, CommentKind, FunctionHandle};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::debug;

/// Serialized form of a program database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    /// Whether the exporting tool finished auto-analysis.
    #[serde(default = "default_true")]
    pub analysis_complete: bool,

    /// All functions, in database order.
    #[serde(default)]
    pub functions: Vec<FunctionRecord>,

    /// Cross-references between addresses.
    #[serde(default)]
    pub xrefs: Vec<XrefRecord>,

    /// Defined string literals.
    #[serde(default)]
    pub strings: Vec<StringRecord>,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            analysis_complete: true,
            functions: Vec::new(),
            xrefs: Vec::new(),
            strings: Vec::new(),
        }
    }
}

fn default_true() -> bool {
    true
}

/// One function of the snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FunctionRecord {
    pub name: String,
    pub start: Address,
    pub end: Address,

    /// Instruction head addresses. When empty, every byte of the body is visited.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub heads: Vec<Address>,

    /// Regular (non-sticky) comment.
    #[serde(default)]
    pub comment: String,

    /// Repeatable (sticky) comment.
    #[serde(default)]
    pub repeatable_comment: String,
}

/// Kind of cross-reference.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum XrefKind {
    #[default]
    Data,
    Code,
}

/// A reference from one address to another.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct XrefRecord {
    pub from: Address,
    pub to: Address,
    #[serde(default)]
    pub kind: XrefKind,
}

/// Storage encoding of a raw string literal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StringEncoding {
    /// NUL-terminated, one byte per character.
    #[default]
    C,
    /// NUL-terminated UTF-16 little-endian.
    Utf16le,
}

/// A string literal defined at an address.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StringRecord {
    pub address: Address,

    /// Already-decoded text. Takes precedence over `bytes`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// Raw literal bytes, decoded according to `encoding`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bytes: Option<Vec<u8>>,

    #[serde(default)]
    pub encoding: StringEncoding,
}

impl StringRecord {
    /// Decode the literal's content.
    pub fn decode(&self) -> Result<String, DecodeError> {
        if let Some(ref text) = self.text {
            return Ok(text.clone());
        }

        let bytes = self.bytes.as_deref().ok_or(DecodeError::Empty(self.address))?;

        match self.encoding {
            StringEncoding::C => Ok(bytes
                .iter()
                .take_while(|&&b| b != 0)
                .map(|&b| char::from(b))
                .collect()),
            StringEncoding::Utf16le => {
                if bytes.len() % 2 != 0 {
                    return Err(DecodeError::OddLength(self.address, bytes.len()));
                }

                let units = bytes
                    .chunks_exact(2)
                    .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
                    .take_while(|&unit| unit != 0);

                char::decode_utf16(units)
                    .collect::<Result<String, _>>()
                    .map_err(|_| DecodeError::InvalidUtf16(self.address))
            }
        }
    }
}

/// A [`ProgramDatabase`] backed by an in-memory snapshot.
#[derive(Debug, Clone)]
pub struct JsonDatabase {
    snapshot: Snapshot,
    /// Data reference targets keyed by source address.
    data_refs: BTreeMap<Address, Vec<Address>>,
    /// Position in `snapshot.strings` keyed by literal address.
    strings: HashMap<Address, usize>,
}

impl JsonDatabase {
    /// Wrap a snapshot, building the lookup indexes.
    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        let mut data_refs: BTreeMap<Address, Vec<Address>> = BTreeMap::new();
        for xref in snapshot.xrefs.iter().filter(|x| x.kind == XrefKind::Data) {
            data_refs.entry(xref.from).or_default().push(xref.to);
        }

        let strings = snapshot
            .strings
            .iter()
            .enumerate()
            .map(|(i, s)| (s.address, i))
            .collect();

        Self {
            snapshot,
            data_refs,
            strings,
        }
    }

    /// Parse a snapshot from JSON text.
    pub fn from_json(content: &str) -> Result<Self> {
        let snapshot: Snapshot =
            serde_json::from_str(content).context("Failed to parse program database")?;
        Ok(Self::from_snapshot(snapshot))
    }

    /// Load a snapshot file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read program database: {}", path.display()))?;

        let db = Self::from_json(&content)
            .with_context(|| format!("Invalid program database: {}", path.display()))?;

        debug!(
            "Loaded {} functions, {} xrefs, {} strings from {}",
            db.snapshot.functions.len(),
            db.snapshot.xrefs.len(),
            db.snapshot.strings.len(),
            path.display()
        );

        Ok(db)
    }

    /// Serialize the current snapshot as pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.snapshot).context("Failed to serialize program database")
    }

    /// Write the snapshot to `path` through a temporary file and a rename,
    /// so an interrupted write never leaves a truncated database behind.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = self.to_json()?;

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut temp = NamedTempFile::new_in(dir)
            .with_context(|| format!("Failed to create temporary file in {}", dir.display()))?;
        temp.write_all(json.as_bytes())
            .context("Failed to write program database")?;
        temp.persist(path)
            .map_err(|e| e.error)
            .with_context(|| format!("Failed to save program database: {}", path.display()))?;

        debug!("Saved program database to {}", path.display());
        Ok(())
    }

    /// The underlying snapshot.
    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    fn record(&self, function: &FunctionHandle) -> Option<&FunctionRecord> {
        self.snapshot.functions.get(function.index)
    }
}

impl ProgramDatabase for JsonDatabase {
    fn is_analysis_complete(&self) -> bool {
        self.snapshot.analysis_complete
    }

    fn function_count(&self) -> usize {
        self.snapshot.functions.len()
    }

    fn function(&self, index: usize) -> Option<FunctionHandle> {
        self.snapshot.functions.get(index).map(|f| FunctionHandle {
            index,
            name: f.name.clone(),
            start: f.start,
            end: f.end,
        })
    }

    fn body<'a>(&'a self, function: &FunctionHandle) -> Box<dyn Iterator<Item = Address> + 'a> {
        match self.record(function) {
            Some(record) if !record.heads.is_empty() => Box::new(record.heads.iter().copied()),
            Some(record) => Box::new(record.start..record.end),
            None => Box::new(std::iter::empty()),
        }
    }

    fn data_refs_from(&self, address: Address) -> Vec<Address> {
        self.data_refs.get(&address).cloned().unwrap_or_default()
    }

    fn is_string_literal(&self, address: Address) -> bool {
        self.strings.contains_key(&address)
    }

    fn decode_string(&self, address: Address) -> Result<String, DecodeError> {
        let index = self
            .strings
            .get(&address)
            .ok_or(DecodeError::NotAString(address))?;
        self.snapshot.strings[*index].decode()
    }

    fn comment(&self, function: &FunctionHandle, kind: CommentKind) -> String {
        match self.record(function) {
            Some(record) => match kind {
                CommentKind::Regular => record.comment.clone(),
                CommentKind::Repeatable => record.repeatable_comment.clone(),
            },
            None => String::new(),
        }
    }

    fn set_comment(&mut self, function: &FunctionHandle, text: &str, kind: CommentKind) {
        if let Some(record) = self.snapshot.functions.get_mut(function.index) {
            match kind {
                CommentKind::Regular => record.comment = text.to_string(),
                CommentKind::Repeatable => record.repeatable_comment = text.to_string(),
            }
        }
    }
}
