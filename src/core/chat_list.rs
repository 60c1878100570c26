//! # Chat List
//!
//! Computes the ordered, filtered list of chats shown in the sidebar.
//!
//! Ordering is by script group first, then alphabetically:
//!
//! ```text
//! 1. Latin     "alice", "Bob"
//! 2. Cyrillic  "Иван", "Команда"
//! 3. Other     "42 things", "8:live:someone", "😀 party"
//! ```
//!
//! Inside a group names compare with the Russian collation at primary
//! strength: case and accents are ignored, punctuation sorts before digits
//! and Cyrillic before Latin anywhere in the name.

use std::cmp::Ordering;
use std::sync::LazyLock;

use icu_collator::options::{CollatorOptions, Strength};
use icu_collator::{Collator, CollatorBorrowed};
use icu_locale_core::locale;

use crate::core::state::App;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SortGroup {
    Latin = 1,
    Cyrillic = 2,
    Other = 3,
}

/// One row of the chat list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatEntry {
    pub chat_id: String,
    pub name: String,
    pub message_count: usize,
    pub is_active: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatListView {
    pub entries: Vec<ChatEntry>,
    /// Number of chats shown after filtering.
    pub count: usize,
}

impl ChatListView {
    pub fn position(&self, chat_id: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.chat_id == chat_id)
    }
}

fn is_cyrillic_letter(c: char) -> bool {
    matches!(c, 'а'..='я' | 'А'..='Я' | 'ё' | 'Ё')
}

pub fn sort_group(name: &str) -> SortGroup {
    match name.chars().next() {
        Some(c) if c.is_ascii_alphabetic() => SortGroup::Latin,
        Some(c) if is_cyrillic_letter(c) => SortGroup::Cyrillic,
        _ => SortGroup::Other,
    }
}

static RUSSIAN_COLLATOR: LazyLock<Option<CollatorBorrowed<'static>>> = LazyLock::new(|| {
    let mut options = CollatorOptions::default();
    options.strength = Some(Strength::Primary);
    Collator::try_new(locale!("ru").into(), options)
        .inspect_err(|e| log::warn!("Russian collation unavailable, using lowercase order: {e}"))
        .ok()
});

fn collate(a: &str, b: &str) -> Ordering {
    match RUSSIAN_COLLATOR.as_ref() {
        Some(collator) => collator.compare(a, b),
        None => a.to_lowercase().cmp(&b.to_lowercase()),
    }
}

/// Total order over display names: group, collation, then the raw name
/// so that names differing only in case still order deterministically.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    sort_group(a)
        .cmp(&sort_group(b))
        .then_with(|| collate(a, b))
        .then_with(|| a.cmp(b))
}

/// Build the chat list for the given filter text.
///
/// Chats without messages are never listed. The filter is a case-insensitive
/// substring match against the effective name.
pub fn chat_list(app: &App, filter_text: &str) -> ChatListView {
    let needle = filter_text.to_lowercase();

    let mut named: Vec<(&str, &str, usize)> = app
        .archive
        .chats
        .iter()
        .map(|(id, messages)| (id.as_str(), app.effective_name(id), messages.len()))
        .collect();

    named.sort_by(|(id_a, name_a, _), (id_b, name_b, _)| {
        compare_names(name_a, name_b).then_with(|| id_a.cmp(id_b))
    });

    let entries: Vec<ChatEntry> = named
        .into_iter()
        .filter(|(_, name, count)| *count > 0 && name.to_lowercase().contains(&needle))
        .map(|(id, name, message_count)| ChatEntry {
            chat_id: id.to_string(),
            name: name.to_string(),
            message_count,
            is_active: app.active_chat_id.as_deref() == Some(id),
        })
        .collect();

    ChatListView {
        count: entries.len(),
        entries,
    }
}
