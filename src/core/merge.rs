//! # Chat Merging
//!
//! Merging moves every message of a source chat into a target chat and
//! deletes the source. It is driven by drag and drop in the chat list:
//!
//! ```text
//!            drag_start(A)
//!   Idle ─────────────────────► Dragging { source: A, hover: None }
//!    ▲                               │  drag_over(B)  → hover = B (B ≠ A)
//!    │                               │  drag_leave(B) → hover = None
//!    │          drag_end()           │  drop(B)       → Confirm(A → B)
//!    └───────────────────────────────┘  drop(A)       → Ignored
//! ```
//!
//! A confirmed [`MergeRequest`] is applied with [`merge_chats`].

use log::info;

use crate::core::state::App;

/// Drag-and-drop state of the chat list. At most one chat is dragged at a time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DragState {
    source: Option<String>,
    hover: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeRequest {
    pub source: String,
    pub target: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropOutcome {
    /// Nothing dragged, or dropped onto itself.
    Ignored,
    /// Ask the user to confirm this merge.
    Confirm(MergeRequest),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    Merged { moved: usize },
    /// Source and target are the same, or one of them no longer exists.
    Skipped,
}

impl DragState {
    pub fn drag_start(&mut self, chat_id: &str) {
        self.source = Some(chat_id.to_string());
        self.hover = None;
    }

    pub fn drag_over(&mut self, chat_id: &str) {
        match &self.source {
            Some(source) if source != chat_id => self.hover = Some(chat_id.to_string()),
            Some(_) => self.hover = None,
            None => {}
        }
    }

    pub fn drag_leave(&mut self, chat_id: &str) {
        if self.hover.as_deref() == Some(chat_id) {
            self.hover = None;
        }
    }

    /// Clears the dragged chat and any hover highlight.
    pub fn drag_end(&mut self) {
        self.source = None;
        self.hover = None;
    }

    pub fn drop(&mut self, target: &str) -> DropOutcome {
        self.hover = None;
        match &self.source {
            Some(source) if source != target => DropOutcome::Confirm(MergeRequest {
                source: source.clone(),
                target: target.to_string(),
            }),
            _ => DropOutcome::Ignored,
        }
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn hover(&self) -> Option<&str> {
        self.hover.as_deref()
    }

    pub fn is_dragging(&self) -> bool {
        self.source.is_some()
    }
}

impl MergeRequest {
    /// Confirmation text naming both chats.
    pub fn prompt(&self, app: &App) -> String {
        let source = app.effective_name(&self.source);
        let target = app.effective_name(&self.target);
        format!(
            "Merge chat \"{source}\" into chat \"{target}\"?\n\nChat \"{source}\" will be deleted."
        )
    }
}

/// Move all messages of `source` into `target`, keep them in timestamp
/// order, and delete `source` from chats, contacts and pending renames.
///
/// Messages without a parseable timestamp sort first. The sort is stable.
pub fn merge_chats(app: &mut App, request: &MergeRequest) -> MergeOutcome {
    let MergeRequest { source, target } = request;
    if source == target || !app.has_chat(target) {
        return MergeOutcome::Skipped;
    }
    let Some(source_messages) = app.archive.chats.remove(source) else {
        return MergeOutcome::Skipped;
    };

    let moved = source_messages.len();
    if let Some(target_messages) = app.archive.chats.get_mut(target) {
        let mut merged = source_messages;
        merged.append(target_messages);
        merged.sort_by_cached_key(|message| message.sent_at());
        *target_messages = merged;
    }

    app.archive.contacts.remove(source);
    app.overrides.remove(source);
    app.is_data_modified = true;
    if app.active_chat_id.as_deref() == Some(source.as_str()) {
        app.active_chat_id = Some(target.clone());
    }

    info!("Merged chat {} into {} ({} messages moved)", source, target, moved);
    MergeOutcome::Merged { moved }
}
