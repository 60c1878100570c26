//! # TUI Components
//!
//! All UI components for the terminal interface.
//!
//! ## Component Architecture
//!
//! ### Stateless Components (Props-Based Rendering)
//!
//! - `TitleBar`: archive name, chat count, status, unsaved marker
//! - `MessageBubble`: a single message of the transcript
//! - `Dialog`: confirmation and notice overlay
//!
//! ### Stateful Components (Event-Driven)
//!
//! - `SearchBox`: filter field above the chat list
//! - `ChatListState` / `ChatList`: sidebar with rename and drag-to-merge
//! - `TranscriptState` / `TranscriptPane`: scrollable transcript with layout caching
//!
//! Each component file holds its state types, event types, rendering,
//! event handling and tests.
//!
//! ```text
//! components/
//! ├── mod.rs          (this file)
//! ├── title_bar.rs    (Top status bar)
//! ├── search_box.rs   (Chat filter)
//! ├── text_field.rs   (Single-line editor shared by search and rename)
//! ├── chat_list.rs    (Sidebar)
//! ├── message.rs      (Single message renderer)
//! ├── transcript.rs   (Scrollable message container)
//! └── dialog.rs       (Modal overlays)
//! ```

pub mod chat_list;
pub mod dialog;
pub mod message;
pub mod search_box;
pub mod text_field;
mod title_bar;
pub mod transcript;

pub use chat_list::{ChatList, ChatListEvent, ChatListState};
pub use dialog::{Confirm, ConfirmDialog, Dialog, DialogEvent};
pub use search_box::{SearchBox, SearchEvent};
pub use title_bar::TitleBar;
pub use transcript::{TranscriptPane, TranscriptState};
