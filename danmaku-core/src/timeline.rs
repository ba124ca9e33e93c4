//! Time-ordered comment timeline with binary-search seek

use crate::CommentRecord;

/// Holds every comment record of a loaded session, sorted by start time
///
/// The store is loaded in bulk and read-only afterwards. Seeking is pure:
/// it computes an index without touching the stored records, so the
/// playback cursor belongs to the caller.
#[derive(Debug, Default)]
pub struct Timeline {
    records: Vec<CommentRecord>,
}

impl Timeline {
    /// Creates an empty timeline
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the stored sequence, sorted ascending by start time
    ///
    /// The sort is stable, so records sharing a start time keep their
    /// stream order (no relative order is guaranteed by contract).
    pub fn load(&mut self, mut records: Vec<CommentRecord>) {
        records.sort_by_key(|record| record.start_time_ms);
        self.records = records;
    }

    /// Returns the index of the first record with `start_time_ms >= time_ms`
    ///
    /// Lower-bound semantics over the full integer range: times before the
    /// first record yield 0 and times past the last record yield `len()`.
    pub fn seek(&self, time_ms: u64) -> usize {
        self.records
            .partition_point(|record| record.start_time_ms < time_ms)
    }

    /// Gets a record by index
    pub fn get(&self, index: usize) -> Option<&CommentRecord> {
        self.records.get(index)
    }

    /// Returns the stored records in timeline order
    pub fn records(&self) -> &[CommentRecord] {
        &self.records
    }

    /// Returns the number of stored records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true when no session is loaded
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
