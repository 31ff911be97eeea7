//! Identifiers and simple allocators for core entities.

use serde::{Deserialize, Serialize};

/// Deck-assigned slide id (stable across reorders, unlike the slide index).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct SlideId(pub u32);

/// Handle for one tick subscription on a [`Ticker`](crate::host::Ticker).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct TickToken(pub u32);

/// Monotonic allocator for TickToken.
#[derive(Default, Debug)]
pub struct IdAllocator {
    next_tick: u32,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn alloc_tick(&mut self) -> TickToken {
        let id = TickToken(self.next_tick);
        self.next_tick = self.next_tick.wrapping_add(1);
        id
    }

    #[inline]
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alloc_monotonic() {
        let mut alloc = IdAllocator::new();
        assert_eq!(alloc.alloc_tick(), TickToken(0));
        assert_eq!(alloc.alloc_tick(), TickToken(1));
        alloc.reset();
        assert_eq!(alloc.alloc_tick(), TickToken(0));
    }
}
