//! Chuleta Core - Headless Study Reference Engine
//!
//! This crate holds the whole behavior of the chuleta viewer (an English study
//! cheat sheet for Spanish speakers), independent of any UI framework. A
//! surface feeds it events and draws the view tree it hands back.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                          Surfaces                             │
//! │     ┌──────────────┐            ┌──────────────────────┐     │
//! │     │     TUI      │            │  Tests / Headless    │     │
//! │     │  (ratatui)   │            │                      │     │
//! │     └──────┬───────┘            └──────────┬───────────┘     │
//! │            └──────────────┬────────────────┘                 │
//! │                  ViewerEvent (up)                             │
//! │                  ViewTree    (down)                           │
//! └───────────────────────────┼──────────────────────────────────┘
//!                             │
//! ┌───────────────────────────┼──────────────────────────────────┐
//! │                      CHULETA CORE                             │
//! │  ┌────────────────────────┴───────────────────────────────┐  │
//! │  │                       Viewer                            │  │
//! │  │  ┌────────┐ ┌───────────┐ ┌──────┐ ┌────────┐ ┌──────┐ │  │
//! │  │  │ Corpus │ │ Favorites │ │ Quiz │ │ Render │ │Speak │ │  │
//! │  │  └────────┘ └───────────┘ └──────┘ └────────┘ └──────┘ │  │
//! │  └────────────────────────────────────────────────────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Key Types
//!
//! - [`Viewer`]: Owns all state and routes every event
//! - [`ViewerEvent`]: Events sent from a surface to the viewer
//! - [`ViewTree`]: The complete rendered content, rebuilt on every change
//! - [`Intent`]: Marker on each activatable element of the tree
//! - [`Corpus`]: The study sections
//! - [`Quiz`]: The practice-and-feedback state machine
//!
//! # Quick Start
//!
//! ```ignore
//! use chuleta_core::{
//!     Corpus, EspeakEngine, FileStore, Viewer, ViewerEvent, load_config,
//! };
//!
//! let config = load_config()?;
//! let store = FileStore::open("store.json").shared();
//! let engine = Box::new(EspeakEngine::new(&config.speech_program));
//! let mut viewer = Viewer::new(Corpus::builtin()?, store, engine, &config);
//!
//! viewer.handle_event(ViewerEvent::Search("went".into()));
//! for table in &viewer.tree().reference().unwrap().tables {
//!     println!("{}: {} rows", table.title, table.rows.len());
//! }
//! ```
//!
//! # Module Overview
//!
//! - [`corpus`]: Sections, rows and row identities
//! - [`store`]: Persistent key-value strings
//! - [`favorites`]: The persisted favorite set
//! - [`search`]: Row visibility filter
//! - [`policy`]: Speak columns per section
//! - [`state`]: Active view, search term and quiz form
//! - [`view`]: The view tree and intents
//! - [`render`]: State to view tree
//! - [`quiz`]: Quiz state machine
//! - [`speech`]: Speech capability and voice preferences
//! - [`transfer`]: Row import and corpus export
//! - [`config`]: TOML configuration
//! - [`events`]: Events, notices and reactions
//! - [`viewer`]: The state owner and event router
//!
//! # No TUI Dependencies
//!
//! This crate has **zero** dependencies on ratatui, crossterm, or any other
//! UI framework.

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod corpus;
pub mod events;
pub mod favorites;
pub mod policy;
pub mod quiz;
pub mod render;
pub mod search;
pub mod speech;
pub mod state;
pub mod store;
pub mod transfer;
pub mod view;
pub mod viewer;

// Re-exports for convenience
pub use config::{
    default_config_path, default_log_path, default_store_path, load_config,
    load_config_from_path, ConfigError, ViewerConfig,
};
pub use corpus::{Corpus, CorpusError, Row, RowId, Section};
pub use events::{Notice, NoticeLevel, Reaction, ViewerEvent};
pub use favorites::Favorites;
pub use policy::PresentationPolicy;
pub use quiz::{Feedback, Question, Quiz, QuizPhase};
pub use render::render;
pub use speech::{EspeakEngine, SpeechEngine, SpeechError, Speaker, Utterance, Voice};
pub use state::{AppState, QuizSetup, View};
pub use store::{FileStore, KeyValueStore, MemoryStore, SharedStore, StoreError};
pub use transfer::{TransferError, EXPORT_FILE_NAME};
pub use view::{Intent, ViewTree};
pub use viewer::Viewer;
