//! Danmaku Core Library
//!
//! This library provides the core data structures for the danmaku overlay
//! engine: comment records, display colors and the time-ordered comment
//! timeline.

pub mod color;
pub mod comment;
pub mod timeline;

pub use color::Color;
pub use comment::{CommentMode, CommentRecord};
pub use timeline::Timeline;

/// Result type for danmaku-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for danmaku-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unknown comment mode: {0}")]
    UnknownMode(u32),
}
