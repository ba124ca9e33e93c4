//! Comment records and display modes

use crate::{Color, Error, Result};

/// Default comment lifetime in milliseconds
pub const DEFAULT_DURATION_MS: u64 = 8000;

/// Default comment text size
pub const DEFAULT_SIZE: u32 = 25;

/// Default comment font name
pub const DEFAULT_FONT: &str = "SimHei";

/// How a comment is displayed on screen
///
/// Only `Scroll` comments are scheduled for motion; the other modes are
/// accepted into the timeline but never activated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CommentMode {
    /// Scrolls right-to-left across the screen
    Scroll,
    /// Pinned to the bottom of the screen
    Bottom,
    /// Pinned to the top of the screen
    Top,
    /// Scrolls left-to-right across the screen
    Reverse,
}

impl CommentMode {
    /// Decodes the raw mode integer used by the source format
    pub fn from_raw(raw: u32) -> Result<Self> {
        match raw {
            1..=3 => Ok(CommentMode::Scroll),
            4 => Ok(CommentMode::Bottom),
            5 => Ok(CommentMode::Top),
            6 => Ok(CommentMode::Reverse),
            other => Err(Error::UnknownMode(other)),
        }
    }

    /// Returns true for the scrolling mode
    pub fn is_scrolling(&self) -> bool {
        matches!(self, CommentMode::Scroll)
    }
}

/// A single timed text annotation
///
/// Records are created by the parser, handed to the timeline in bulk and
/// never mutated once stored; all playback state lives on the engine side.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CommentRecord {
    /// Display mode
    pub mode: CommentMode,
    /// Display text
    pub text: String,
    /// Playback-timeline timestamp in milliseconds; the timeline sort key
    pub start_time_ms: u64,
    /// Display color
    pub color: Color,
    /// Text size in pixels
    pub size: u32,
    /// Total time-to-live in milliseconds
    pub duration_ms: u64,
    /// Font name used to build the renderer font descriptor
    pub font: String,
}

impl CommentRecord {
    /// Creates a new comment record with the default duration and font
    pub fn new(
        mode: CommentMode,
        text: impl Into<String>,
        start_time_ms: u64,
        color: Color,
        size: u32,
    ) -> Self {
        Self {
            mode,
            text: text.into(),
            start_time_ms,
            color,
            size,
            duration_ms: DEFAULT_DURATION_MS,
            font: DEFAULT_FONT.to_string(),
        }
    }

    /// Builds the renderer font descriptor, e.g. `"SimHei 25px"`
    pub fn font_string(&self) -> String {
        format!("{} {}px", self.font, self.size)
    }
}
