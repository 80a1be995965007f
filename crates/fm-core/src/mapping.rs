//! Mapping store: the XML document the game reads to pair players with images.
//!
//! The document is a `<record>` root holding passthrough `<boolean>` flags
//! and a `<list>` of `<record from=".." to=".."/>` entries. The `to` path
//! embeds the player identifier; game versions up to 2023 embed it as a bare
//! digit run, 2024 prefixes it with `r-`.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};
use thiserror::Error;

use crate::report::PlayerId;

static PREFIXED_ID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"r-\d+").expect("prefixed id pattern")
});
static BARE_ID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\d+").expect("bare id pattern")
});

/// Game versions the tool knows how to write mappings for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumIter, EnumString)]
pub enum GameVersion {
    #[strum(serialize = "2020")]
    V2020,
    #[strum(serialize = "2021")]
    V2021,
    #[strum(serialize = "2022")]
    V2022,
    #[strum(serialize = "2023")]
    V2023,
    #[default]
    #[strum(serialize = "2024")]
    V2024,
}

impl GameVersion {
    /// 2024 switched the in-document identifier encoding to `r-<digits>`.
    fn uses_prefixed_ids(self) -> bool {
        matches!(self, GameVersion::V2024)
    }
}

/// Extracts the player identifier embedded in a `to` path.
///
/// Prefixed encoding: first `r-<digits>` run, prefix stripped. Legacy
/// encoding: first digit run. A path carrying neither decodes to the empty
/// identifier, as in historical documents with hand-edited entries.
pub fn decode_to_path(to_path: &str, version: GameVersion) -> PlayerId {
    let raw = if version.uses_prefixed_ids() {
        PREFIXED_ID_RE
            .find(to_path)
            .map(|found| found.as_str().trim_start_matches("r-"))
    } else {
        BARE_ID_RE.find(to_path).map(|found| found.as_str())
    };

    PlayerId(raw.unwrap_or_default().to_string())
}

/// Builds the game-internal `to` path for a player identifier.
pub fn encode_to_path(id: &PlayerId, version: GameVersion) -> String {
    if version.uses_prefixed_ids() {
        format!("graphics/pictures/person/r-{id}/portrait")
    } else {
        format!("graphics/pictures/person/{id}/portrait")
    }
}

/// One persisted image assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingRecord {
    #[serde(rename = "@from")]
    pub from: String,
    #[serde(rename = "@to")]
    pub to: String,
}

/// Passthrough flag the game interprets but this tool never does.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BooleanFlag {
    #[serde(rename = "@id")]
    pub id: String,
    #[serde(rename = "@value")]
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordList {
    #[serde(rename = "@id", default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(rename = "record", default)]
    pub records: Vec<MappingRecord>,
}

/// The XML-shaped aggregate, preserved verbatim apart from the record list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename = "record")]
pub struct MappingDocument {
    #[serde(rename = "boolean", default, skip_serializing_if = "Vec::is_empty")]
    pub booleans: Vec<BooleanFlag>,
    #[serde(default)]
    pub list: RecordList,
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("cannot read mapping document: {0}")]
    Io(#[from] std::io::Error),
    #[error("cannot parse mapping document: {0}")]
    Parse(#[from] quick_xml::DeError),
    #[error("cannot serialize mapping document: {0}")]
    Serialize(#[source] quick_xml::SeError),
    #[error("cannot write mapping document: {0}")]
    Persist(#[source] std::io::Error),
    #[error("mapping store was never loaded")]
    NotLoaded,
}

/// In-memory view of the mapping document plus the id → image lookup.
///
/// The lookup is the single source of truth at write time: `save` rebuilds
/// the document's record list from it wholesale rather than appending.
#[derive(Debug, Clone)]
pub struct MappingStore {
    document: Option<MappingDocument>,
    id_to_image: HashMap<PlayerId, String>,
    version: GameVersion,
}

impl MappingStore {
    /// Store without a backing document. `save` and `write` fail on it; used
    /// when a caller only needs the lookup side.
    pub fn unloaded(version: GameVersion) -> Self {
        Self {
            document: None,
            id_to_image: HashMap::new(),
            version,
        }
    }

    /// Parses the document at `path` and decodes every existing record's
    /// identifier with the version's encoding.
    pub fn load(path: impl AsRef<Path>, version: GameVersion) -> Result<Self, StoreError> {
        let content = fs::read_to_string(path)?;
        let document: MappingDocument = quick_xml::de::from_str(&content)?;

        let mut id_to_image = HashMap::new();
        for record in &document.list.records {
            let id = decode_to_path(&record.to, version);
            id_to_image.insert(id, record.from.clone());
        }

        Ok(Self {
            document: Some(document),
            id_to_image,
            version,
        })
    }

    pub fn version(&self) -> GameVersion {
        self.version
    }

    pub fn exists(&self, id: &PlayerId) -> bool {
        self.id_to_image.contains_key(id)
    }

    /// Image paths currently mapped to some player; used to seed pool
    /// exclusions so earlier runs' picks are not reused.
    pub fn assigned_images(&self) -> Vec<String> {
        self.id_to_image.values().cloned().collect()
    }

    /// Inserts or overwrites the record for `id`.
    pub fn assign(&mut self, id: PlayerId, image_path: String) {
        self.id_to_image.insert(id, image_path);
    }

    /// Rebuilds the document's record list from the lookup, re-encoding every
    /// identifier. In-memory only; `write` puts it on disk.
    ///
    /// Records are ordered by `to` path so repeated saves of the same state
    /// serialize identically.
    pub fn save(&mut self) -> Result<(), StoreError> {
        let document = self.document.as_mut().ok_or(StoreError::NotLoaded)?;

        let mut records: Vec<MappingRecord> = self
            .id_to_image
            .iter()
            .map(|(id, image)| MappingRecord {
                from: image.clone(),
                to: encode_to_path(id, self.version),
            })
            .collect();
        records.sort_by(|a, b| a.to.cmp(&b.to));

        document.list.records = records;
        Ok(())
    }

    /// Serializes the document (tab-indented) and overwrites `path`.
    ///
    /// The destination is only touched after serialization succeeded, so a
    /// serialize failure leaves the previous file intact.
    pub fn write(&self, path: impl AsRef<Path>) -> Result<(), StoreError> {
        let document = self.document.as_ref().ok_or(StoreError::NotLoaded)?;

        let mut out = String::new();
        let mut serializer = quick_xml::se::Serializer::new(&mut out);
        serializer.indent('\t', 1);
        document
            .serialize(serializer)
            .map_err(StoreError::Serialize)?;

        fs::write(path, out).map_err(StoreError::Persist)?;
        Ok(())
    }
}
