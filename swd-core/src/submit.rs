//! Component E — Submission API.
//!
//! `begin_read`/`begin_write` are the only way a command reaches the
//! queue. Both are non-blocking (§5): if the queue is full, or if the
//! caller names a slot that already has a transaction in flight, the
//! command is rejected immediately rather than retried internally.

use core::fmt;

use swd_proto::{CommandKind, StatusCode};

use crate::engine::Command;
use crate::queue::CommandQueue;
use crate::results::ResultArray;

/// Submission-time failures (§7).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitError {
    /// The command queue had no free capacity. The slot's result has
    /// already been published with [`StatusCode::Busy`] — wire-compatible
    /// with a target WAIT, per Design Notes §9.
    QueueFull,
    /// The named slot already has a transaction in flight.
    SlotBusy,
    /// The slot index does not exist.
    InvalidSlot,
}

impl fmt::Display for SubmitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SubmitError::QueueFull => "command queue full",
            SubmitError::SlotBusy => "result slot already has a transaction in flight",
            SubmitError::InvalidSlot => "result slot index out of range",
        };
        write!(f, "{s}")
    }
}

fn begin<const N: usize, const M: usize>(
    queue: &CommandQueue<N>,
    results: &ResultArray<M>,
    slot: u8,
    kind: CommandKind,
    request: u8,
    data: u32,
) -> Result<(), SubmitError> {
    let result_slot = results.get(slot).ok_or(SubmitError::InvalidSlot)?;
    if result_slot.is_pending() {
        return Err(SubmitError::SlotBusy);
    }
    result_slot.begin();

    let command = Command {
        kind,
        request,
        data,
        result_slot: slot,
    };
    if let Err(_rejected) = queue.push(command) {
        result_slot.publish(StatusCode::Busy, 0);
        return Err(SubmitError::QueueFull);
    }
    Ok(())
}

/// Begins a READ transaction using the given pre-built request byte,
/// publishing its outcome to `slot`.
pub fn begin_read<const N: usize, const M: usize>(
    queue: &CommandQueue<N>,
    results: &ResultArray<M>,
    slot: u8,
    request: u8,
) -> Result<(), SubmitError> {
    begin(queue, results, slot, CommandKind::Read, request, 0)
}

/// Begins a WRITE transaction carrying `data`, publishing its outcome to
/// `slot`.
pub fn begin_write<const N: usize, const M: usize>(
    queue: &CommandQueue<N>,
    results: &ResultArray<M>,
    slot: u8,
    request: u8,
    data: u32,
) -> Result<(), SubmitError> {
    begin(queue, results, slot, CommandKind::Write, request, data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn begin_read_enqueues_and_marks_slot_pending() {
        let queue: CommandQueue<4> = CommandQueue::new();
        let results: ResultArray<4> = ResultArray::new();
        begin_read(&queue, &results, 2, 0xA5).unwrap();
        assert!(results.get(2).unwrap().is_pending());
        let command = queue.pop().unwrap();
        assert_eq!(command.kind, CommandKind::Read);
        assert_eq!(command.request, 0xA5);
        assert_eq!(command.result_slot, 2);
    }

    #[test]
    fn begin_write_carries_data() {
        let queue: CommandQueue<4> = CommandQueue::new();
        let results: ResultArray<4> = ResultArray::new();
        begin_write(&queue, &results, 0, 0x11, 0xDEAD_BEEF).unwrap();
        let command = queue.pop().unwrap();
        assert_eq!(command.kind, CommandKind::Write);
        assert_eq!(command.data, 0xDEAD_BEEF);
    }

    #[test]
    fn reusing_a_pending_slot_is_rejected() {
        let queue: CommandQueue<4> = CommandQueue::new();
        let results: ResultArray<4> = ResultArray::new();
        begin_read(&queue, &results, 5, 0).unwrap();
        let err = begin_read(&queue, &results, 5, 0).unwrap_err();
        assert_eq!(err, SubmitError::SlotBusy);
    }

    #[test]
    fn full_queue_publishes_busy_and_rejects() {
        let queue: CommandQueue<1> = CommandQueue::new();
        let results: ResultArray<4> = ResultArray::new();
        begin_read(&queue, &results, 0, 0).unwrap();
        let err = begin_read(&queue, &results, 1, 0).unwrap_err();
        assert_eq!(err, SubmitError::QueueFull);
        let result = results.get(1).unwrap().read();
        assert_eq!(result.status(), Some(StatusCode::Busy));
    }

    #[test]
    fn invalid_slot_is_rejected_without_touching_queue() {
        let queue: CommandQueue<4> = CommandQueue::new();
        let results: ResultArray<4> = ResultArray::new();
        let err = begin_read(&queue, &results, 200, 0).unwrap_err();
        assert_eq!(err, SubmitError::InvalidSlot);
        assert!(queue.is_empty());
    }
}
