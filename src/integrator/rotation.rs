//! Slot rotation over a ring of `stage_count + 1` state buffers.
//!
//! One slot holds the committed state ("main"). Stage `s` writes slot
//! `main + 1 + s`, modulo the ring, so a stage never writes a slot it reads.
//! Committing a step only moves the `main` index; no state is copied.

/// Ring-buffer bookkeeping shared by the texture arena and the host arena
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotRotation {
    main: usize,
    slot_count: usize,
}

impl SlotRotation {
    /// Rotation for a scheme with `stage_count` stages (at least one)
    pub fn new(stage_count: usize) -> Self {
        Self {
            main: 0,
            slot_count: stage_count.max(1) + 1,
        }
    }

    #[inline]
    pub fn main(&self) -> usize {
        self.main
    }

    #[inline]
    pub fn slot_count(&self) -> usize {
        self.slot_count
    }

    #[inline]
    pub fn stage_count(&self) -> usize {
        self.slot_count - 1
    }

    /// Slot written by stage `stage`
    #[inline]
    pub fn stage_target(&self, stage: usize) -> usize {
        (self.main + 1 + stage) % self.slot_count
    }

    /// Slot read as `prev` by stage `stage`
    #[inline]
    pub fn stage_source(&self, stage: usize) -> usize {
        if stage == 0 {
            self.main
        } else {
            self.stage_target(stage - 1)
        }
    }

    /// Free slot for writes outside a time step, e.g. injection
    #[inline]
    pub fn scratch(&self) -> usize {
        self.stage_target(0)
    }

    /// Make `slot` the committed state
    pub fn commit(&mut self, slot: usize) {
        debug_assert!(slot < self.slot_count);
        self.main = slot % self.slot_count;
    }

    /// Commit the output of the last stage
    pub fn commit_stages(&mut self) {
        let last = self.stage_target(self.stage_count() - 1);
        self.commit(last);
    }
}
