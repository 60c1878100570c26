//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use crate::core::archive::Archive;
use crate::core::state::App;

/// A small archive covering every sort group, an empty chat, a chat with no
/// contact entry, a direct chat and a group chat.
pub const SAMPLE_ARCHIVE: &str = r#"{
  "ownerId": "u1",
  "contacts": {
    "u1": "Me",
    "u2": "Bob",
    "8:alice": "alice smith",
    "8:ivan": "Иван",
    "19:team@thread.skype": "Команда",
    "8:empty": "Alice Empty",
    "8:num": "42 things"
  },
  "chats": {
    "u2": [
      { "from": "u2", "timestamp": "2024-01-01T10:00:00Z", "content": "hi", "media_path": null }
    ],
    "8:alice": [
      { "from": "alice", "timestamp": "2023-05-02T08:00:00Z", "content": "morning" },
      { "from": "u1", "timestamp": "2023-05-02T09:30:00Z", "content": "hello &amp; welcome" }
    ],
    "8:ivan": [
      { "from": "ivan", "timestamp": "2022-12-31T23:59:00Z", "content": "С Новым годом!" }
    ],
    "19:team@thread.skype": [
      { "from": "ivan", "timestamp": "2023-01-10T12:00:00Z", "content": "meeting at 5" },
      { "from": "alice", "timestamp": "2023-01-10T12:01:00Z", "media_path": "media/plan.png" }
    ],
    "8:empty": [],
    "8:num": [
      { "from": "u1", "timestamp": "2021-06-01T00:00:00Z", "content": "count" }
    ],
    "8:nocontact": [
      { "from": "nocontact", "timestamp": "2020-02-02T02:02:02Z", "content": "who am I" }
    ]
  }
}"#;

pub fn sample_archive() -> Archive {
    Archive::from_json(SAMPLE_ARCHIVE).expect("sample archive is valid JSON")
}

/// Creates a test App over the sample archive.
pub fn test_app() -> App {
    App::new(sample_archive())
}
