//! # Core Application Logic
//!
//! This module contains chatview's business logic.
//! It knows nothing about any specific UI technology.
//!
//! ```text
//!                    ┌──────────────────────────┐
//!                    │          CORE            │
//!                    │  (this module)           │
//!                    │                          │
//!                    │  • Archive (data model)  │
//!                    │  • App (state)           │
//!                    │  • View-models           │
//!                    │  • update() (reducer)    │
//!                    │                          │
//!                    │  No terminal. No UI.     │
//!                    └────────────┬─────────────┘
//!                                 │
//!                                 ▼
//!                          ┌────────────┐
//!                          │    TUI     │
//!                          │  Adapter   │
//!                          │ (ratatui)  │
//!                          └────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`archive`]: The `processed_data.json` document and its file I/O
//! - [`state`]: The `App` struct, all application state in one place
//! - [`action`]: The `Action` enum and the `update()` reducer
//! - [`chat_list`], [`transcript`]: view-models the adapter draws
//! - [`text`]: message content pipeline (entities, links, lines)
//! - [`merge`], [`export`]: drag-and-drop merging and writing the result
//! - [`config`]: layered configuration

pub mod action;
pub mod archive;
pub mod chat_list;
pub mod config;
pub mod export;
pub mod merge;
pub mod state;
pub mod text;
pub mod transcript;
