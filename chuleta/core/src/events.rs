//! Viewer Events
//!
//! Events sent from a surface to the [`Viewer`](crate::Viewer). These are
//! all the ways a surface can report what the user did.
//!
//! # Design Philosophy
//!
//! Surfaces are "dumb" renderers that forward user actions. Activating an
//! element just hands its [`Intent`] back; the viewer decides whether the
//! intent is still live and what it means.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::state::View;
use crate::view::Intent;

/// Events from a surface to the viewer
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ViewerEvent {
    // ============================================
    // Tree Elements
    // ============================================
    /// An element of the current tree was activated
    Activate(Intent),

    // ============================================
    // Surface Commands
    // ============================================
    /// Switch view (select-section, home, quiz)
    Navigate(View),

    /// Search input changed
    Search(String),

    /// Answer field changed (live, no re-render)
    QuizInput(String),

    /// Answer field submitted (same as check)
    QuizSubmit,

    /// Select the next quiz source section
    CycleQuizSource,

    /// Change the quiz question count
    AdjustQuizCount(i32),

    /// Select the next available voice
    CycleVoice,

    /// Change the speech rate multiplier
    AdjustRate(f32),

    /// Append rows from a file to a section
    Import {
        /// Target section id
        section_id: String,
        /// CSV or JSON file
        path: PathBuf,
    },

    /// Write the corpus to a file
    Export {
        /// Destination file
        path: PathBuf,
    },
}

/// Severity of a notice
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoticeLevel {
    /// Confirmation of a completed action
    Info,
    /// Degraded capability
    Warning,
    /// Failed action
    Error,
}

/// A user-visible message produced while handling an event
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    /// Severity
    pub level: NoticeLevel,
    /// Message text
    pub text: String,
}

impl Notice {
    /// Informational notice
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            text: text.into(),
        }
    }

    /// Warning notice
    pub fn warning(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            text: text.into(),
        }
    }

    /// Error notice
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            text: text.into(),
        }
    }
}

/// What handling an event did to the view tree
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reaction {
    /// A new tree replaced the previous one
    Rerendered,
    /// The tree was left as it was
    Unchanged,
    /// The intent was not part of the current tree
    Stale,
}
