//! Danmaku Parser Library
//!
//! This library turns raw XML-like comment streams into
//! [`CommentRecord`](danmaku_core::CommentRecord)s. Individual malformed
//! entries are skipped; only a stream that is not valid UTF-8 fails as a
//! whole. Network retrieval and decompression are the caller's concern;
//! the parser accepts already-decoded bytes.

pub mod bilibili;

pub use bilibili::{parse, parse_str};

/// Result type for danmaku-parser operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for danmaku-parser operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("comment stream is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),
}
