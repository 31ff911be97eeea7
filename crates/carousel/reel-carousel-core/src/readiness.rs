//! Readiness tracker: which slide videos have reported loaded metadata.
//!
//! The set only grows. Play commands are withheld until it holds at least
//! `min_ready` slides so the carousel never starts on an unbuffered element.

use hashbrown::HashSet;

use crate::error::CarouselError;

#[derive(Debug, Clone)]
pub struct ReadinessTracker {
    ready: HashSet<usize>,
    slide_count: usize,
    min_ready: usize,
}

impl ReadinessTracker {
    pub fn new(slide_count: usize, min_ready: usize) -> Self {
        Self {
            ready: HashSet::with_capacity(slide_count),
            slide_count,
            min_ready,
        }
    }

    /// Record that `index` finished loading metadata.
    /// Returns true only when the index is new to the set.
    pub fn mark_ready(&mut self, index: usize) -> crate::Result<bool> {
        if index >= self.slide_count {
            return Err(CarouselError::SlideOutOfRange {
                index,
                len: self.slide_count,
            });
        }
        Ok(self.ready.insert(index))
    }

    #[inline]
    pub fn is_ready(&self, index: usize) -> bool {
        self.ready.contains(&index)
    }

    #[inline]
    pub fn ready_count(&self) -> usize {
        self.ready.len()
    }

    #[inline]
    pub fn min_ready(&self) -> usize {
        self.min_ready
    }

    /// True once enough slides are ready for play commands to go out.
    #[inline]
    pub fn is_playback_unlocked(&self) -> bool {
        self.ready.len() >= self.min_ready
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mark_ready_is_idempotent() {
        let mut tracker = ReadinessTracker::new(4, 3);
        assert!(tracker.mark_ready(1).unwrap());
        assert!(!tracker.mark_ready(1).unwrap());
        assert_eq!(tracker.ready_count(), 1);
        assert!(tracker.is_ready(1));
        assert!(!tracker.is_ready(0));
    }

    #[test]
    fn unlocks_at_threshold() {
        let mut tracker = ReadinessTracker::new(4, 3);
        tracker.mark_ready(0).unwrap();
        tracker.mark_ready(1).unwrap();
        assert!(!tracker.is_playback_unlocked());
        tracker.mark_ready(2).unwrap();
        assert!(tracker.is_playback_unlocked());
    }

    #[test]
    fn out_of_range_indices_never_count() {
        let mut tracker = ReadinessTracker::new(2, 1);
        let err = tracker.mark_ready(5).unwrap_err();
        assert_eq!(err, CarouselError::SlideOutOfRange { index: 5, len: 2 });
        assert!(err.is_recoverable());
        assert_eq!(tracker.ready_count(), 0);
        assert!(!tracker.is_playback_unlocked());
    }

    #[test]
    fn zero_threshold_is_unlocked_immediately() {
        let tracker = ReadinessTracker::new(3, 0);
        assert!(tracker.is_playback_unlocked());
    }
}
