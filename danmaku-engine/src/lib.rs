//! Danmaku Engine Library
//!
//! This library provides the comment scheduling engine: lane-based
//! collision avoidance, playback-synchronized activation and per-tick
//! aging and motion of on-screen comments.

pub mod comment_manager;
pub mod lane_allocator;
pub mod live_comment;
pub mod render;

pub use comment_manager::CommentManager;
pub use lane_allocator::{LaneAllocator, Placement};
pub use live_comment::LiveComment;
pub use render::{Extents, RenderBackend};

/// Result type for danmaku-engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for danmaku-engine operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("no conflict-free slot within the first {0} lanes")]
    LanesExhausted(usize),

    #[error("comment {id} not found in lane {lane} pool")]
    MissingFromLane { lane: usize, id: u32 },
}
