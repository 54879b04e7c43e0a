//! Per-session result slot pool (§4.G). The device has no notion of slot
//! ownership; allocating and recycling slot indices is entirely the host
//! client's job, so two sessions against the same adaptor never collide on
//! the same slot.

use swd_proto::SLOT_COUNT;

/// A free-list of the 256 result-slot indices.
pub struct SlotPool {
    free: Vec<u8>,
}

impl SlotPool {
    pub fn new() -> Self {
        Self {
            free: (0..SLOT_COUNT as u16).map(|i| i as u8).rev().collect(),
        }
    }

    /// Claims a slot, if one is free.
    pub fn alloc(&mut self) -> Option<u8> {
        self.free.pop()
    }

    /// Returns a slot to the pool once its result has been consumed.
    pub fn free(&mut self, slot: u8) {
        debug_assert!(
            !self.free.contains(&slot),
            "slot {slot} freed twice"
        );
        self.free.push(slot);
    }
}

impl Default for SlotPool {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_hands_out_every_slot_exactly_once() {
        let mut pool = SlotPool::new();
        let mut seen = std::collections::HashSet::new();
        while let Some(slot) = pool.alloc() {
            assert!(seen.insert(slot), "slot {slot} handed out twice");
        }
        assert_eq!(seen.len(), SLOT_COUNT);
    }

    #[test]
    fn freed_slot_can_be_reallocated() {
        let mut pool = SlotPool::new();
        let slot = pool.alloc().unwrap();
        pool.free(slot);
        let mut reallocated = false;
        while let Some(s) = pool.alloc() {
            if s == slot {
                reallocated = true;
            }
        }
        assert!(reallocated);
    }
}
