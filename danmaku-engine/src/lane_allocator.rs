//! Lane-based collision avoidance for scrolling comments

use crate::live_comment::LiveComment;
use crate::{Error, Result};

/// Upper bound on the lane arena, so pathological sessions fail fast
/// instead of growing lanes forever
pub const MAX_LANES: usize = 64;

/// Where a comment was placed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    /// Lane index, or `None` for an untracked overflow placement
    pub lane: Option<usize>,
    /// Assigned vertical offset
    pub y: u32,
}

impl Placement {
    /// Placement for a comment excluded from collision tracking
    pub fn untracked() -> Self {
        Self { lane: None, y: 0 }
    }
}

/// Assigns each newly activated comment a vertical slot that will not
/// collide with other comments sharing the lane over its whole transit
///
/// Each lane keeps a pool of resident comment ids. A candidate is tried
/// at the top of lane 0 first, then one pixel below each resident's
/// bottom edge, then in the next lane, up to [`MAX_LANES`]. Residents
/// are looked up in the caller's runline so collision checks always see
/// current positions.
#[derive(Debug, Default)]
pub struct LaneAllocator {
    lanes: Vec<Vec<u32>>,
    bounds: Option<(u32, u32)>,
}

impl LaneAllocator {
    /// Creates an allocator with no viewport bounds yet
    pub fn new() -> Self {
        Self::default()
    }

    /// Updates the bounding box used by future placements
    ///
    /// Already-placed comments are not repositioned.
    pub fn set_bounds(&mut self, width: u32, height: u32) {
        self.bounds = Some((width, height));
    }

    /// Current bounding box, `None` until the viewport is announced
    pub fn bounds(&self) -> Option<(u32, u32)> {
        self.bounds
    }

    /// Drops all lane pools
    pub fn clear(&mut self) {
        self.lanes.clear();
    }

    /// True when no lane holds a resident
    pub fn is_empty(&self) -> bool {
        self.lanes.iter().all(Vec::is_empty)
    }

    /// Finds a conflict-free slot for `candidate` and records it
    ///
    /// `runline` must hold the currently active comments the pools refer
    /// to. A candidate taller than the bounding height is placed
    /// untracked. Returns [`Error::LanesExhausted`] when no lane below
    /// [`MAX_LANES`] has a conflict-free offset.
    pub fn allocate(
        &mut self,
        candidate: &LiveComment,
        runline: &[LiveComment],
    ) -> Result<Placement> {
        let Some((_, bound_height)) = self.bounds else {
            return Ok(Placement::untracked());
        };
        if candidate.height() > bound_height {
            return Ok(Placement::untracked());
        }

        for lane in 0..MAX_LANES {
            if lane == self.lanes.len() {
                self.lanes.push(Vec::new());
            }

            let chosen = {
                let pool = &self.lanes[lane];
                if pool.is_empty() || lane_is_clear(0, candidate, pool, runline) {
                    Some(0)
                } else {
                    // One pixel below each resident's bottom edge, lowest
                    // offsets first.
                    let mut offsets: Vec<u32> = pool
                        .iter()
                        .filter_map(|&id| find_member(runline, id))
                        .map(|member| member.bottom() + 1)
                        .collect();
                    offsets.sort_unstable();
                    offsets.into_iter().find(|&y| {
                        y + candidate.height() <= bound_height
                            && lane_is_clear(y, candidate, pool, runline)
                    })
                }
            };

            if let Some(y) = chosen {
                self.lanes[lane].push(candidate.id);
                return Ok(Placement {
                    lane: Some(lane),
                    y,
                });
            }
        }

        Err(Error::LanesExhausted(MAX_LANES))
    }

    /// Removes a retired comment from its lane's pool
    ///
    /// Untracked comments free as a no-op. A tracked comment missing
    /// from its recorded pool indicates a bookkeeping bug and is
    /// surfaced as [`Error::MissingFromLane`].
    pub fn release(&mut self, comment: &LiveComment) -> Result<()> {
        let Some(lane) = comment.lane else {
            return Ok(());
        };
        let missing = Error::MissingFromLane {
            lane,
            id: comment.id,
        };
        let pool = self.lanes.get_mut(lane).ok_or(missing)?;
        match pool.iter().position(|&id| id == comment.id) {
            Some(index) => {
                pool.remove(index);
                Ok(())
            }
            None => Err(Error::MissingFromLane {
                lane,
                id: comment.id,
            }),
        }
    }
}

/// True when `candidate` at vertical offset `y` conflicts with no pool
/// resident
fn lane_is_clear(y: u32, candidate: &LiveComment, pool: &[u32], runline: &[LiveComment]) -> bool {
    for &id in pool {
        let Some(member) = find_member(runline, id) else {
            continue;
        };
        if member.y > y + candidate.height() || member.bottom() < y {
            // Vertical extents do not intersect.
            continue;
        }
        if member.right() < candidate.x || member.x > candidate.right() {
            // Spans are currently disjoint; conflict only if the resident
            // outlives the candidate's transit midpoint.
            if will_collide(member, candidate) {
                return false;
            }
            continue;
        }
        return false;
    }
    true
}

/// Motion-aware overlap heuristic: the resident is still on screen past
/// the midpoint of the candidate's transit
///
/// Deliberately one-directional; the reverse pairing is never tested.
fn will_collide(member: &LiveComment, candidate: &LiveComment) -> bool {
    member.record.start_time_ms + member.record.duration_ms
        >= candidate.record.start_time_ms + candidate.record.duration_ms / 2
}

fn find_member(runline: &[LiveComment], id: u32) -> Option<&LiveComment> {
    runline.iter().find(|comment| comment.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::Extents;
    use danmaku_core::{Color, CommentMode, CommentRecord};

    const WIDTH: u32 = 1280;
    const HEIGHT: u32 = 720;

    fn live(id: u32, start_time_ms: u64, duration_ms: u64, height: u32) -> LiveComment {
        let mut record = CommentRecord::new(
            CommentMode::Scroll,
            format!("comment {id}"),
            start_time_ms,
            Color::default(),
            25,
        );
        record.duration_ms = duration_ms;
        let mut comment = LiveComment::new(id, record, Extents::new(200, height));
        comment.x = comment.scroll_x(WIDTH);
        comment
    }

    fn place(
        allocator: &mut LaneAllocator,
        runline: &mut Vec<LiveComment>,
        mut comment: LiveComment,
    ) -> Placement {
        let placement = allocator.allocate(&comment, runline).unwrap();
        comment.lane = placement.lane;
        comment.y = placement.y;
        runline.push(comment);
        placement
    }

    #[test]
    fn test_first_comment_takes_lane_zero_top() {
        let mut allocator = LaneAllocator::new();
        allocator.set_bounds(WIDTH, HEIGHT);
        let mut runline = Vec::new();

        let placement = place(&mut allocator, &mut runline, live(0, 0, 8000, 30));
        assert_eq!(placement, Placement { lane: Some(0), y: 0 });
    }

    #[test]
    fn test_overlapping_spans_stack_below() {
        let mut allocator = LaneAllocator::new();
        allocator.set_bounds(WIDTH, HEIGHT);
        let mut runline = Vec::new();

        // Both comments sit at the right edge, so their spans overlap at
        // placement time and the second must not share y = 0.
        place(&mut allocator, &mut runline, live(0, 1000, 8000, 30));
        let second = place(&mut allocator, &mut runline, live(1, 1000, 2000, 30));

        assert_eq!(second, Placement { lane: Some(0), y: 31 });
    }

    #[test]
    fn test_same_start_differing_durations_never_overlap() {
        let mut allocator = LaneAllocator::new();
        allocator.set_bounds(WIDTH, HEIGHT);
        let mut runline = Vec::new();

        place(&mut allocator, &mut runline, live(0, 0, 20_000, 30));
        place(&mut allocator, &mut runline, live(1, 0, 1000, 30));

        let (a, b) = (&runline[0], &runline[1]);
        assert_eq!(a.lane, b.lane);
        // Vertical extents must be disjoint.
        assert!(a.bottom() < b.y || b.bottom() < a.y);
    }

    #[test]
    fn test_departed_resident_blocks_top_when_long_lived() {
        let mut allocator = LaneAllocator::new();
        allocator.set_bounds(WIDTH, HEIGHT);
        let mut runline = Vec::new();

        // Resident has fully entered the screen (span disjoint from the
        // right edge) but lives well past the candidate's midpoint.
        let mut resident = live(0, 0, 60_000, 30);
        resident.ttl_ms = 30_000;
        resident.x = resident.scroll_x(WIDTH);
        assert!(resident.right() < WIDTH as f64);
        runline.push(resident.clone());
        allocator.allocate(&resident, &[]).unwrap();

        let candidate = live(1, 30_000, 8000, 30);
        let placement = allocator.allocate(&candidate, &runline).unwrap();
        assert_eq!(placement, Placement { lane: Some(0), y: 31 });
    }

    #[test]
    fn test_departed_short_lived_resident_is_ignored() {
        let mut allocator = LaneAllocator::new();
        allocator.set_bounds(WIDTH, HEIGHT);
        let mut runline = Vec::new();

        // Resident exits long before the candidate's midpoint, so the top
        // slot is reused even though vertical extents would intersect.
        // The check is a one-way approximation: only the resident's
        // lifetime is tested against the candidate's midpoint.
        let mut resident = live(0, 9000, 3000, 30);
        resident.ttl_ms = 2000;
        resident.x = resident.scroll_x(WIDTH);
        assert!(resident.right() < WIDTH as f64);
        runline.push(resident.clone());
        allocator.allocate(&resident, &[]).unwrap();

        let candidate = live(1, 10_000, 8000, 30);
        let placement = allocator.allocate(&candidate, &runline).unwrap();
        assert_eq!(placement, Placement { lane: Some(0), y: 0 });
    }

    #[test]
    fn test_full_lane_spills_into_next() {
        let mut allocator = LaneAllocator::new();
        // Room for exactly one 30px comment per lane.
        allocator.set_bounds(WIDTH, 40);
        let mut runline = Vec::new();

        let first = place(&mut allocator, &mut runline, live(0, 0, 8000, 30));
        let second = place(&mut allocator, &mut runline, live(1, 0, 8000, 30));

        assert_eq!(first.lane, Some(0));
        assert_eq!(second.lane, Some(1));
        assert_eq!(second.y, 0);
    }

    #[test]
    fn test_oversized_comment_is_untracked() {
        let mut allocator = LaneAllocator::new();
        allocator.set_bounds(WIDTH, HEIGHT);

        let giant = live(0, 0, 8000, HEIGHT + 1);
        let placement = allocator.allocate(&giant, &[]).unwrap();
        assert_eq!(placement, Placement::untracked());
        assert!(allocator.is_empty());
    }

    #[test]
    fn test_lanes_exhausted_fails_fast() {
        let mut allocator = LaneAllocator::new();
        allocator.set_bounds(WIDTH, 40);
        let mut runline = Vec::new();

        for id in 0..MAX_LANES as u32 {
            place(&mut allocator, &mut runline, live(id, 0, 8000, 30));
        }

        let overflow = live(MAX_LANES as u32, 0, 8000, 30);
        assert!(matches!(
            allocator.allocate(&overflow, &runline),
            Err(Error::LanesExhausted(MAX_LANES))
        ));
    }

    #[test]
    fn test_release_returns_slot_for_reuse() {
        let mut allocator = LaneAllocator::new();
        allocator.set_bounds(WIDTH, HEIGHT);
        let mut runline = Vec::new();

        place(&mut allocator, &mut runline, live(0, 0, 8000, 30));
        let departed = runline.pop().unwrap();
        allocator.release(&departed).unwrap();
        assert!(allocator.is_empty());

        let next = place(&mut allocator, &mut runline, live(1, 0, 8000, 30));
        assert_eq!(next, Placement { lane: Some(0), y: 0 });
    }

    #[test]
    fn test_release_untracked_is_noop() {
        let mut allocator = LaneAllocator::new();
        allocator.set_bounds(WIDTH, HEIGHT);

        let giant = live(0, 0, 8000, HEIGHT + 1);
        // Never allocated a lane; freeing must not error.
        assert!(allocator.release(&giant).is_ok());
    }

    #[test]
    fn test_release_missing_reports_inconsistency() {
        let mut allocator = LaneAllocator::new();
        allocator.set_bounds(WIDTH, HEIGHT);

        let mut stray = live(7, 0, 8000, 30);
        stray.lane = Some(3);
        assert!(matches!(
            allocator.release(&stray),
            Err(Error::MissingFromLane { lane: 3, id: 7 })
        ));
    }

    #[test]
    fn test_allocate_without_bounds_is_untracked() {
        let mut allocator = LaneAllocator::new();
        let comment = live(0, 0, 8000, 30);
        let placement = allocator.allocate(&comment, &[]).unwrap();
        assert_eq!(placement, Placement::untracked());
    }
}
