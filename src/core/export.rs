//! # Export
//!
//! Writes the in-memory archive, with pending renames applied, back to a
//! `processed_data.json` the user can swap in for the original.
//!
//! Only pending renames decide whether there is anything to save. Merges
//! change the live archive directly, so they are part of every export that
//! does happen, but a merge on its own does not trigger one.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use log::info;

use crate::core::archive::{Archive, ArchiveError};
use crate::core::state::App;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    NothingToSave,
    Saved(PathBuf),
}

/// Copy of `archive` with every override written into `contacts`.
/// Overrides for ids missing from `contacts` are not applied.
pub fn build_export(archive: &Archive, overrides: &BTreeMap<String, String>) -> Archive {
    let mut export = archive.clone();
    for (chat_id, name) in overrides {
        if let Some(contact) = export.contacts.get_mut(chat_id) {
            *contact = Some(name.clone());
        }
    }
    export
}

/// Export the app state to `path`. On success the exported snapshot becomes
/// the live archive, pending renames are cleared and the modified flag is
/// reset; on failure nothing changes.
pub fn export_archive(app: &mut App, path: &Path) -> Result<ExportOutcome, ArchiveError> {
    if app.overrides.is_empty() {
        info!("Export requested with no pending renames");
        return Ok(ExportOutcome::NothingToSave);
    }

    let export = build_export(&app.archive, &app.overrides);
    export.save(path)?;

    info!(
        "Exported archive with {} renames to {}",
        app.overrides.len(),
        path.display()
    );
    app.archive = export;
    app.overrides.clear();
    app.is_data_modified = false;
    Ok(ExportOutcome::Saved(path.to_path_buf()))
}
