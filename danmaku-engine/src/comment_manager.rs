//! Playback-synchronized comment scheduling

use crate::lane_allocator::LaneAllocator;
use crate::live_comment::LiveComment;
use crate::render::RenderBackend;
use danmaku_core::{CommentRecord, Timeline};
use log::warn;
use std::time::Instant;

/// Owns the timeline, the lane allocator and the active set ("runline")
///
/// The host drives it from two callback points on one event loop:
/// playback-time updates via [`advance`](CommentManager::advance) and a
/// periodic timer via [`tick`](CommentManager::tick). Nothing here
/// blocks or spawns work.
pub struct CommentManager<R: RenderBackend> {
    timeline: Timeline,
    allocator: LaneAllocator,
    renderer: R,
    runline: Vec<LiveComment>,
    cursor: usize,
    playtime_ms: u64,
    playing: bool,
    last_tick: Option<Instant>,
    next_id: u32,
}

impl<R: RenderBackend> CommentManager<R> {
    /// Creates a manager with an empty session
    pub fn new(renderer: R) -> Self {
        Self {
            timeline: Timeline::new(),
            allocator: LaneAllocator::new(),
            renderer,
            runline: Vec::new(),
            cursor: 0,
            playtime_ms: 0,
            playing: false,
            last_tick: None,
            next_id: 0,
        }
    }

    /// Replaces the session: unmounts every live comment, clears the
    /// lane pools and loads the new timeline
    pub fn load(&mut self, records: Vec<CommentRecord>) {
        for comment in self.runline.drain(..) {
            self.renderer.unmount(comment.id);
        }
        self.allocator.clear();
        self.timeline.load(records);
        self.cursor = 0;
        self.playtime_ms = 0;
        self.last_tick = None;
    }

    /// Announces the viewport bounding box
    ///
    /// Comments already on screen keep their positions; only future
    /// placements use the new box.
    pub fn set_bounds(&mut self, width: u32, height: u32) {
        self.allocator.set_bounds(width, height);
    }

    /// Synchronizes with the playback position
    ///
    /// Activates every record that became due since the previous call
    /// (forward direction only), then retires comments whose lifetime
    /// has elapsed. A no-op until the viewport bounds are known.
    ///
    /// Seeking to `time_ms + 1` makes the activation window exactly
    /// `(previous_time, time_ms]`, so records starting at `time_ms`
    /// activate on this call. Backward jumps move the cursor without
    /// retracting live comments; records between the two positions may
    /// replay on a later forward pass.
    pub fn advance(&mut self, time_ms: u64) {
        if self.allocator.bounds().is_none() {
            return;
        }

        let previous = self.cursor;
        self.cursor = self.timeline.seek(time_ms.saturating_add(1));
        if self.cursor > previous {
            for index in previous..self.cursor {
                if let Some(record) = self.timeline.get(index).cloned() {
                    self.send(record);
                }
            }
        }

        self.retire_expired();
        self.playtime_ms = time_ms;
    }

    /// Starts playback
    pub fn resume(&mut self) {
        self.playing = true;
    }

    /// Pauses playback; live comments freeze in place
    pub fn stop(&mut self) {
        self.playing = false;
        self.last_tick = None;
    }

    /// Periodic wall-clock tick
    ///
    /// While paused this only resets the elapsed-time reference. While
    /// playing it ages and repositions the runline by the measured
    /// milliseconds since the previous tick, so animation speed is
    /// independent of timer jitter.
    pub fn tick(&mut self) {
        if !self.playing {
            self.last_tick = None;
            return;
        }
        let now = Instant::now();
        let elapsed_ms = match self.last_tick {
            Some(previous) => now.duration_since(previous).as_millis() as u64,
            None => 0,
        };
        self.last_tick = Some(now);
        self.tick_by(elapsed_ms);
    }

    /// Tick variant for hosts that measure elapsed time themselves
    pub fn tick_by(&mut self, elapsed_ms: u64) {
        if !self.playing {
            return;
        }
        let Some((width, _)) = self.allocator.bounds() else {
            return;
        };
        for comment in &mut self.runline {
            comment.x = comment.scroll_x(width);
            self.renderer.set_position(comment.id, comment.x, comment.y as f64);
            comment.ttl_ms -= elapsed_ms as i64;
        }
    }

    /// The currently active comments
    pub fn active(&self) -> &[LiveComment] {
        &self.runline
    }

    /// True while playback is running
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Last observed playback timestamp
    pub fn playtime_ms(&self) -> u64 {
        self.playtime_ms
    }

    /// Current timeline cursor
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// The render backend
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Activates one record
    ///
    /// Non-scrolling modes are accepted into the timeline but never
    /// scheduled, so they are skipped here without error. An allocator
    /// failure is isolated to this comment: it is logged and the
    /// comment falls back to an untracked placement.
    fn send(&mut self, record: CommentRecord) {
        if !record.mode.is_scrolling() {
            return;
        }
        let Some((width, _)) = self.allocator.bounds() else {
            return;
        };

        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);

        let extents = self.renderer.mount(id, &record);
        let mut comment = LiveComment::new(id, record, extents);
        comment.x = comment.scroll_x(width);

        match self.allocator.allocate(&comment, &self.runline) {
            Ok(placement) => {
                comment.lane = placement.lane;
                comment.y = placement.y;
            }
            Err(err) => {
                warn!("comment {id}: lane allocation failed ({err}), rendering untracked");
                comment.lane = None;
                comment.y = 0;
            }
        }

        self.renderer.set_position(comment.id, comment.x, comment.y as f64);
        self.runline.push(comment);
    }

    /// Removes every expired comment, unmounting it and freeing its lane
    fn retire_expired(&mut self) {
        let renderer = &mut self.renderer;
        let allocator = &mut self.allocator;
        self.runline.retain(|comment| {
            if !comment.is_expired() {
                return true;
            }
            renderer.unmount(comment.id);
            if let Err(err) = allocator.release(comment) {
                warn!("comment {}: {err}", comment.id);
            }
            false
        });
    }
}
