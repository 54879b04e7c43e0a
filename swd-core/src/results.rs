//! Result record storage — the device side of the ownership contract in
//! `spec.md` §3/§5: whichever context writes `done` last hands ownership of
//! `result`/`data` to the reader. The bus controller is the sole writer of
//! `result`/`data`, and writes them before `done`, with a fence in between;
//! the USB transport is the sole reader, and always loads `done` first.
//!
//! Each cell is independently atomic — there is no single struct behind a
//! lock, so the transport can poll `done` from endpoint-0 handling without
//! ever taking a critical section against the bus controller's ISR
//! context.

use core::sync::atomic::{fence, AtomicI8, AtomicU32, AtomicU8, Ordering};

use swd_proto::{StatusCode, SwdResult};

/// One addressable result slot.
pub struct ResultSlot {
    done: AtomicU8,
    result: AtomicI8,
    data: AtomicU32,
}

impl ResultSlot {
    pub const fn new() -> Self {
        Self {
            done: AtomicU8::new(1),
            result: AtomicI8::new(StatusCode::Ok.to_i8()),
            data: AtomicU32::new(0),
        }
    }

    /// Marks the slot pending. Called by the submission API (component E)
    /// at BEGIN time, before the command reaches the queue.
    pub fn begin(&self) {
        self.done.store(0, Ordering::Release);
    }

    /// Publishes a final outcome. Called by the bus controller once a
    /// transaction completes.
    ///
    /// Writes `data` and `result` with `Relaxed` ordering, then a `Release`
    /// fence, then `done` with `Release` — so any reader that observes
    /// `done == 1` via an `Acquire` load is guaranteed to see the `data`/
    /// `result` written here, never a torn or stale value.
    pub fn publish(&self, status: StatusCode, data: u32) {
        self.data.store(data, Ordering::Relaxed);
        self.result.store(status.to_i8(), Ordering::Relaxed);
        fence(Ordering::Release);
        self.done.store(1, Ordering::Release);
    }

    /// Reads the current state. Loads `done` first with `Acquire`; only
    /// trusts `result`/`data` once `done` reads back set.
    pub fn read(&self) -> SwdResult {
        let done = self.done.load(Ordering::Acquire);
        if done == 0 {
            return SwdResult::PENDING;
        }
        let result = self.result.load(Ordering::Relaxed);
        let data = self.data.load(Ordering::Relaxed);
        SwdResult { done: 1, result, data }
    }

    /// `true` if a BEGIN has been issued and no outcome has been published
    /// yet.
    pub fn is_pending(&self) -> bool {
        self.done.load(Ordering::Acquire) == 0
    }
}

impl Default for ResultSlot {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixed-size array of [`ResultSlot`]s, addressed by the 8-bit slot index
/// carried in `wIndex` (§6). Intended to be instantiated as
/// `ResultArray<{ swd_proto::SLOT_COUNT }>`.
pub struct ResultArray<const M: usize> {
    slots: [ResultSlot; M],
}

impl<const M: usize> ResultArray<M> {
    pub const fn new() -> Self {
        Self {
            slots: [const { ResultSlot::new() }; M],
        }
    }

    pub fn get(&self, index: u8) -> Option<&ResultSlot> {
        self.slots.get(index as usize)
    }
}

impl<const M: usize> Default for ResultArray<M> {
    fn default() -> Self {
        Self::new()
    }
}
