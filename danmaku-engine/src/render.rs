//! Rendering contract between the engine and the host renderer

use danmaku_core::CommentRecord;

/// Measured extents of a rendered comment in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Extents {
    pub width: u32,
    pub height: u32,
}

impl Extents {
    /// Creates new extents
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Backend that owns actual glyph drawing
///
/// The engine emits placement instructions through this trait and never
/// draws anything itself. Positions must be applied verbatim; text,
/// color and the font descriptor (`CommentRecord::font_string`) are
/// available on the mounted record.
pub trait RenderBackend {
    /// Mounts a new comment on screen and returns its rendered extents
    fn mount(&mut self, id: u32, comment: &CommentRecord) -> Extents;

    /// Moves a mounted comment to the given position
    fn set_position(&mut self, id: u32, x: f64, y: f64);

    /// Removes a retired comment from the screen
    fn unmount(&mut self, id: u32);
}
