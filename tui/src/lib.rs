//! Chuleta TUI - Terminal interface for the chuleta study reference
//!
//! A full-screen terminal surface over [`chuleta_core::Viewer`]: a section
//! menu on the left, the rendered tables or quiz on the right, an input line
//! for search and answers, and a status bar for notices.
//!
//! # Architecture
//!
//! - **App**: Event loop, key bindings, focus and scrolling
//! - **Display**: Lays out the viewer's tree into styled lines and focus targets
//! - **Widgets**: Borderless scrollable text blocks
//! - **Theme**: Colors per span role

pub mod app;
pub mod display;
pub mod theme;
pub mod widgets;

pub use app::App;
