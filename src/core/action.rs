//! # Actions
//!
//! Everything the user can do in chatview becomes an `Action`.
//! Pressing Enter on a chat? That's `Action::SelectChat(id)`.
//! Confirming a merge dialog? That's `Action::MergeChats(request)`.
//!
//! `update()` applies an action to the `App` and returns an `Effect`: the
//! I/O the adapter must perform next. No file or terminal access happens here.
//!
//! ```text
//! App + Action  →  update()  →  App' + Effect
//!                                        │
//!                     Effect::Export ────┴─► export_archive() ─► Action::ExportFinished
//! ```

use log::{debug, info, warn};

use crate::core::export::ExportOutcome;
use crate::core::merge::{MergeOutcome, MergeRequest, merge_chats};
use crate::core::state::{App, RenameOutcome};

pub const NOTHING_TO_SAVE: &str = "No changes to save.";
pub const MERGE_ONLY_HINT: &str = "Merges are written together with the next rename.";

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    SelectChat(String),
    RenameChat { chat_id: String, name: String },
    /// A merge the user has already confirmed.
    MergeChats(MergeRequest),
    RequestExport,
    ExportFinished(Result<ExportOutcome, String>),
    DismissNotice,
    /// Quit unless there are unsaved changes.
    RequestQuit,
    /// Quit unconditionally.
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    None,
    /// Write the export file, then report back with `ExportFinished`.
    Export,
    /// Ask the user whether to discard unsaved changes.
    ConfirmQuit,
    Quit,
}

pub fn update(app: &mut App, action: Action) -> Effect {
    debug!("update: {:?}", action);
    match action {
        Action::SelectChat(chat_id) => {
            if app.select_chat(&chat_id) {
                app.status_message = app.effective_name(&chat_id).to_string();
            }
            Effect::None
        }
        Action::RenameChat { chat_id, name } => {
            match app.rename_chat(&chat_id, &name) {
                RenameOutcome::Renamed => {
                    app.status_message =
                        format!("Renamed to \"{}\"", app.effective_name(&chat_id));
                }
                RenameOutcome::UnknownChat => {
                    warn!("Rename of missing chat {} ignored", chat_id);
                }
                RenameOutcome::Empty | RenameOutcome::Unchanged => {}
            }
            Effect::None
        }
        Action::MergeChats(request) => {
            match merge_chats(app, &request) {
                MergeOutcome::Merged { moved } => {
                    app.status_message = format!(
                        "Moved {} messages into \"{}\"",
                        moved,
                        app.effective_name(&request.target)
                    );
                }
                MergeOutcome::Skipped => {
                    warn!(
                        "Merge of {} into {} skipped",
                        request.source, request.target
                    );
                }
            }
            Effect::None
        }
        Action::RequestExport => {
            if app.load_error.is_some() {
                app.notice = Some(String::from("No archive loaded, nothing to export."));
                return Effect::None;
            }
            Effect::Export
        }
        Action::ExportFinished(result) => {
            app.notice = Some(match result {
                Ok(ExportOutcome::NothingToSave) if app.is_data_modified => {
                    format!("{NOTHING_TO_SAVE} {MERGE_ONLY_HINT}")
                }
                Ok(ExportOutcome::NothingToSave) => NOTHING_TO_SAVE.to_string(),
                Ok(ExportOutcome::Saved(path)) => {
                    app.status_message = String::from("Changes exported");
                    format!(
                        "processed_data.json with your changes was written to {}. \
                         Replace the original file with it.",
                        path.display()
                    )
                }
                Err(e) => {
                    app.status_message = String::from("Export failed");
                    format!("Export failed: {e}")
                }
            });
            Effect::None
        }
        Action::DismissNotice => {
            app.notice = None;
            Effect::None
        }
        Action::RequestQuit => {
            if app.is_data_modified {
                Effect::ConfirmQuit
            } else {
                Effect::Quit
            }
        }
        Action::Quit => {
            info!("Quit requested");
            Effect::Quit
        }
    }
}
