//! Playback state of an on-screen comment

use crate::render::Extents;
use danmaku_core::CommentRecord;

/// A comment in flight between activation and expiry
///
/// The timeline keeps its records immutable; everything that changes
/// during playback (remaining lifetime, lane, position) lives here.
#[derive(Debug, Clone)]
pub struct LiveComment {
    /// Activation handle, shared with the render backend
    pub id: u32,
    /// The activated record
    pub record: CommentRecord,
    /// Remaining lifetime in milliseconds; may go negative
    pub ttl_ms: i64,
    /// Assigned lane; `None` renders unconditionally, excluded from
    /// collision tracking
    pub lane: Option<usize>,
    /// Horizontal position, recomputed every tick
    pub x: f64,
    /// Vertical offset assigned by the lane allocator
    pub y: u32,
    /// Rendered extents measured at mount time
    pub extents: Extents,
}

impl LiveComment {
    /// Creates the live state for a newly activated record
    pub fn new(id: u32, record: CommentRecord, extents: Extents) -> Self {
        let ttl_ms = record.duration_ms as i64;
        Self {
            id,
            record,
            ttl_ms,
            lane: None,
            x: 0.0,
            y: 0,
            extents,
        }
    }

    /// Rendered width in pixels
    pub fn width(&self) -> u32 {
        self.extents.width
    }

    /// Rendered height in pixels
    pub fn height(&self) -> u32 {
        self.extents.height
    }

    /// Right edge of the rendered span
    pub fn right(&self) -> f64 {
        self.x + self.extents.width as f64
    }

    /// Bottom edge of the rendered span
    pub fn bottom(&self) -> u32 {
        self.y + self.extents.height
    }

    /// True once the remaining lifetime has elapsed
    pub fn is_expired(&self) -> bool {
        self.ttl_ms <= 0
    }

    /// Overrides the total lifetime, optionally resetting the countdown
    pub fn set_duration(&mut self, duration_ms: u64, reset_ttl: bool) {
        self.record.duration_ms = duration_ms;
        if reset_ttl {
            self.ttl_ms = duration_ms as i64;
        }
    }

    /// Horizontal position for the current remaining lifetime
    ///
    /// Linear transit from fully off-screen right (`x = viewport_width`
    /// at `ttl = duration`) to fully off-screen left (`x = -width` at
    /// `ttl = 0`).
    pub fn scroll_x(&self, viewport_width: u32) -> f64 {
        let width = self.extents.width as f64;
        if self.record.duration_ms == 0 {
            return -width;
        }
        let progress = self.ttl_ms as f64 / self.record.duration_ms as f64;
        progress * (viewport_width as f64 + width) - width
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use danmaku_core::{Color, CommentMode};

    fn live(duration_ms: u64, width: u32) -> LiveComment {
        let mut record =
            CommentRecord::new(CommentMode::Scroll, "test", 0, Color::default(), 25);
        record.duration_ms = duration_ms;
        LiveComment::new(0, record, Extents::new(width, 25))
    }

    #[test]
    fn test_scroll_x_endpoints() {
        let mut comment = live(8000, 100);

        comment.ttl_ms = 8000;
        assert_eq!(comment.scroll_x(1280), 1280.0);

        comment.ttl_ms = 0;
        assert_eq!(comment.scroll_x(1280), -100.0);
    }

    #[test]
    fn test_scroll_x_midpoint() {
        let mut comment = live(8000, 100);
        comment.ttl_ms = 4000;
        assert_eq!(comment.scroll_x(1280), 0.5 * (1280.0 + 100.0) - 100.0);
    }

    #[test]
    fn test_scroll_x_zero_duration_is_off_screen() {
        let comment = live(0, 100);
        assert_eq!(comment.scroll_x(1280), -100.0);
    }

    #[test]
    fn test_set_duration_with_and_without_reset() {
        let mut comment = live(8000, 100);
        comment.ttl_ms = 1200;

        comment.set_duration(4000, false);
        assert_eq!(comment.record.duration_ms, 4000);
        assert_eq!(comment.ttl_ms, 1200);

        comment.set_duration(4000, true);
        assert_eq!(comment.ttl_ms, 4000);
    }

    #[test]
    fn test_is_expired() {
        let mut comment = live(8000, 100);
        assert!(!comment.is_expired());
        comment.ttl_ms = 0;
        assert!(comment.is_expired());
        comment.ttl_ms = -5;
        assert!(comment.is_expired());
    }
}
