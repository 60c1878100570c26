//! # Application State
//!
//! Core business state for chatview. This module contains domain logic only -
//! no TUI-specific types. Presentation state lives in the `tui` module.
//!
//! ```text
//! App
//! ├── archive: Archive                 // loaded archive, mutated by merges
//! ├── overrides: BTreeMap              // pending renames, cleared on export
//! ├── active_chat_id: Option<String>   // selected chat
//! ├── is_data_modified: bool           // renames or merges not yet exported
//! ├── status_message: String           // title bar text
//! ├── notice: Option<String>           // modal notice awaiting dismissal
//! ├── load_error: Option<String>       // archive could not be read
//! └── archive_path / export_path
//! ```
//!
//! State changes only happen through `update(state, action)` in action.rs
//! and the merge/export controllers it delegates to.

use std::collections::BTreeMap;
use std::path::PathBuf;

use log::{info, warn};

use crate::core::archive::Archive;
use crate::core::config::ResolvedConfig;

/// Sender label shown for messages written by the archive owner.
pub const OWNER_LABEL: &str = "You";

pub struct App {
    pub archive: Archive,
    pub overrides: BTreeMap<String, String>,
    pub active_chat_id: Option<String>,
    /// Set by renames and merges, cleared by a successful export.
    pub is_data_modified: bool,
    pub status_message: String,
    pub notice: Option<String>,
    pub load_error: Option<String>,
    pub archive_path: PathBuf,
    pub export_path: PathBuf,
}

/// Result of committing an inline rename.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenameOutcome {
    Renamed,
    /// Trimmed value equals the current effective name.
    Unchanged,
    Empty,
    /// The chat was removed (e.g. merged away) while the editor was open.
    UnknownChat,
}

impl App {
    pub fn new(archive: Archive) -> Self {
        Self {
            archive,
            overrides: BTreeMap::new(),
            active_chat_id: None,
            is_data_modified: false,
            status_message: String::new(),
            notice: None,
            load_error: None,
            archive_path: PathBuf::new(),
            export_path: PathBuf::new(),
        }
    }

    /// Load the archive named by the config. A load failure is recorded in
    /// `load_error` and leaves an empty archive, so the UI can still start.
    pub fn from_config(config: &ResolvedConfig) -> Self {
        let (archive, load_error) = match Archive::load(&config.archive_path) {
            Ok(archive) => (archive, None),
            Err(e) => {
                warn!(
                    "Failed to load archive {}: {}",
                    config.archive_path.display(),
                    e
                );
                (Archive::default(), Some(e.to_string()))
            }
        };

        let mut app = Self::new(archive);
        app.archive_path = config.archive_path.clone();
        app.export_path = config.export_path.clone();
        app.load_error = load_error;
        app.status_message = if app.load_error.is_some() {
            String::from("Archive not loaded")
        } else {
            format!("{} chats loaded", app.archive.chat_ids_with_messages().count())
        };
        app
    }

    /// Display name for a chat id: pending rename, then contact name, then the id itself.
    pub fn effective_name<'a>(&'a self, chat_id: &'a str) -> &'a str {
        self.overrides
            .get(chat_id)
            .map(String::as_str)
            .or_else(|| self.archive.contact_name(chat_id))
            .unwrap_or(chat_id)
    }

    /// Label for a message sender.
    pub fn sender_name<'a>(&'a self, from: &'a str) -> &'a str {
        if self.is_owner(from) {
            OWNER_LABEL
        } else {
            self.effective_name(from)
        }
    }

    pub fn is_owner(&self, from: &str) -> bool {
        from == self.archive.owner_id
    }

    pub fn has_chat(&self, chat_id: &str) -> bool {
        self.archive.chats.contains_key(chat_id)
    }

    /// Make `chat_id` the active chat. Unknown ids are ignored.
    pub fn select_chat(&mut self, chat_id: &str) -> bool {
        if !self.has_chat(chat_id) {
            warn!("Ignoring selection of unknown chat {}", chat_id);
            return false;
        }
        self.active_chat_id = Some(chat_id.to_string());
        true
    }

    /// Commit an inline rename. The value is trimmed; empty or unchanged
    /// names leave the state untouched.
    pub fn rename_chat(&mut self, chat_id: &str, new_name: &str) -> RenameOutcome {
        if !self.has_chat(chat_id) {
            return RenameOutcome::UnknownChat;
        }
        let new_name = new_name.trim();
        if new_name.is_empty() {
            return RenameOutcome::Empty;
        }
        if new_name == self.effective_name(chat_id) {
            return RenameOutcome::Unchanged;
        }

        info!("Renaming chat {} to {:?}", chat_id, new_name);
        self.overrides
            .insert(chat_id.to_string(), new_name.to_string());
        self.is_data_modified = true;
        RenameOutcome::Renamed
    }
}
