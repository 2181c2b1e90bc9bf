//! Transform History
//!
//! Motion vectors need each object's *previous-frame* model matrix. The
//! opaque pass records every drawn object's current matrix here; next
//! frame the recorded value becomes the previous matrix.
//!
//! Destroyed objects would otherwise accumulate forever, so the table is
//! swept periodically: every `cleanup_interval` frames, entries not
//! touched in the current frame are evicted.

use glam::Mat4;
use rustc_hash::FxHashMap;

#[derive(Debug, Clone)]
struct HistoryEntry {
    current: Mat4,
    previous: Mat4,
    last_touched_frame: u64,
}

/// Per-object previous-frame transform tracking.
#[derive(Debug)]
pub struct TransformHistory {
    entries: FxHashMap<u64, HistoryEntry>,
    frame: u64,
    cleanup_interval: u64,
}

impl TransformHistory {
    #[must_use]
    pub fn new(cleanup_interval: u64) -> Self {
        Self {
            entries: FxHashMap::default(),
            frame: 0,
            cleanup_interval: cleanup_interval.max(1),
        }
    }

    /// Records `object_id`'s model matrix for the current frame.
    ///
    /// Ids of 0 are reserved for "untracked" and ignored.
    pub fn record(&mut self, object_id: u64, model_matrix: Mat4) {
        if object_id == 0 {
            return;
        }
        let frame = self.frame;
        self.entries
            .entry(object_id)
            .and_modify(|entry| {
                if entry.last_touched_frame != frame {
                    entry.previous = entry.current;
                }
                entry.current = model_matrix;
                entry.last_touched_frame = frame;
            })
            .or_insert(HistoryEntry {
                current: model_matrix,
                // First sighting: previous == current, zero motion.
                previous: model_matrix,
                last_touched_frame: frame,
            });
    }

    /// Previous-frame model matrix, if the object is tracked.
    #[must_use]
    pub fn previous(&self, object_id: u64) -> Option<Mat4> {
        self.entries.get(&object_id).map(|e| e.previous)
    }

    /// Advances the frame counter and runs the periodic sweep.
    ///
    /// Call once per frame *after* all draws recorded. On sweep frames,
    /// every entry not touched this frame is evicted.
    pub fn end_frame(&mut self) {
        if self.frame % self.cleanup_interval == 0 && self.frame > 0 {
            let frame = self.frame;
            self.entries
                .retain(|_, entry| entry.last_touched_frame == frame);
        }
        self.frame += 1;
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn frame(&self) -> u64 {
        self.frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn previous_matrix_lags_one_frame() {
        let mut history = TransformHistory::new(120);
        let m1 = Mat4::from_translation(glam::Vec3::X);
        let m2 = Mat4::from_translation(glam::Vec3::Y);

        history.record(1, m1);
        history.end_frame();
        history.record(1, m2);

        assert_eq!(history.previous(1), Some(m1));
    }

    #[test]
    fn sweep_evicts_untouched_entries() {
        let mut history = TransformHistory::new(4);
        history.record(1, Mat4::IDENTITY);

        // Drawn never again; sweep frame must evict it.
        for _ in 0..8 {
            history.end_frame();
        }
        assert!(history.previous(1).is_none());
    }
}
