//! # Chat Archive
//!
//! The exported archive as it sits on disk (`processed_data.json`):
//!
//! ```text
//! Archive
//! ├── ownerId: String                      // id of the archive owner
//! ├── contacts: { chat_id → display name | null }
//! └── chats:    { chat_id → [Message] }    // each list sorted by timestamp
//! ```
//!
//! Maps are kept key-sorted so that an export of the same state is always
//! byte-identical. Writes go through `.tmp` + `rename()`.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

use chrono::{DateTime, NaiveDateTime, Utc};
use log::{debug, info};
use serde::{Deserialize, Deserializer, Serialize};

/// File name the archive is read from and exported as.
pub const ARCHIVE_FILE_NAME: &str = "processed_data.json";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct Archive {
    #[serde(rename = "ownerId", default)]
    pub owner_id: String,
    /// `null` names are kept so an export writes them back unchanged.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub contacts: BTreeMap<String, Option<String>>,
    #[serde(default)]
    pub chats: BTreeMap<String, Vec<Message>>,
}

/// A single chat message. Immutable once loaded; merges only reorder.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct Message {
    #[serde(default)]
    pub from: String,
    /// RFC 3339 arrival time. `null` when the source export had none.
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    /// Attachment path relative to the archive, never checked for existence.
    #[serde(default)]
    pub media_path: Option<String>,
}

impl Message {
    /// Parsed timestamp, `None` if missing or malformed.
    pub fn sent_at(&self) -> Option<DateTime<Utc>> {
        self.timestamp.as_deref().and_then(parse_timestamp)
    }
}

/// Parse an archive timestamp. Accepts RFC 3339 and, as a fallback, a naive
/// `YYYY-MM-DDTHH:MM:SS[.fff]` which is taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|ndt| ndt.and_utc())
        })
}

/// A `null` contacts section reads as empty.
fn null_as_empty<'de, D>(deserializer: D) -> Result<BTreeMap<String, Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug)]
pub enum ArchiveError {
    Io(io::Error),
    Parse(serde_json::Error),
}

impl fmt::Display for ArchiveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArchiveError::Io(e) => write!(f, "archive I/O error: {e}"),
            ArchiveError::Parse(e) => write!(f, "archive parse error: {e}"),
        }
    }
}

impl std::error::Error for ArchiveError {}

impl From<io::Error> for ArchiveError {
    fn from(e: io::Error) -> Self {
        ArchiveError::Io(e)
    }
}

impl From<serde_json::Error> for ArchiveError {
    fn from(e: serde_json::Error) -> Self {
        ArchiveError::Parse(e)
    }
}

impl Archive {
    /// Read and parse an archive file.
    pub fn load(path: &Path) -> Result<Self, ArchiveError> {
        let json = fs::read_to_string(path)?;
        let archive = Self::from_json(&json)?;
        info!(
            "Loaded archive from {}: {} chats, {} contacts, {} messages",
            path.display(),
            archive.chats.len(),
            archive.contacts.len(),
            archive.message_count()
        );
        Ok(archive)
    }

    pub fn from_json(json: &str) -> Result<Self, ArchiveError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Pretty-printed JSON with a two-space indent.
    pub fn to_pretty_json(&self) -> Result<String, ArchiveError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Atomically write the archive to `path` (via `.tmp` + rename),
    /// creating the parent directory if needed.
    pub fn save(&self, path: &Path) -> Result<(), ArchiveError> {
        let json = self.to_pretty_json()?;
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let tmp_path = path.with_extension("tmp");
        fs::write(&tmp_path, json)?;
        fs::rename(&tmp_path, path)?;
        debug!("Archive written to {}", path.display());
        Ok(())
    }

    pub fn contact_name(&self, id: &str) -> Option<&str> {
        self.contacts.get(id).and_then(Option::as_deref)
    }

    pub fn messages(&self, chat_id: &str) -> Option<&[Message]> {
        self.chats.get(chat_id).map(Vec::as_slice)
    }

    /// Ids of chats that have at least one message, in key order.
    pub fn chat_ids_with_messages(&self) -> impl Iterator<Item = &str> {
        self.chats
            .iter()
            .filter(|(_, messages)| !messages.is_empty())
            .map(|(id, _)| id.as_str())
    }

    /// Total number of messages across all chats.
    pub fn message_count(&self) -> usize {
        self.chats.values().map(Vec::len).sum()
    }
}
