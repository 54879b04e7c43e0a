//! swd-core — the interrupt-driven SWD master.
//!
//! Components A-F of the adaptor firmware: a hardware-agnostic line driver
//! trait, a per-bit SWD protocol engine, a macro bus controller driven from
//! a timer ISR, a lock-free command queue, a non-blocking submission API,
//! and USB transport glue. Everything here is `no_std`; unit tests link
//! `std` via `cfg_attr` so the mock line driver (`pins::mock`) can use
//! ordinary collections, in the style of hubris's `circq` crate.
//!
//! Out of scope, per the governing specification: USB enumeration and
//! descriptor construction, a host CLI, MCU register layouts, higher-level
//! ARM debug operations (AP/DP register abstractions), JTAG, multi-drop
//! targets, and any runtime bit-rate negotiation over the wire.

#![cfg_attr(not(test), no_std)]

use core::fmt;

pub mod bus;
pub mod engine;
pub mod pins;
pub mod queue;
pub mod results;
pub mod submit;
pub mod transport;

pub use bus::SwdBus;
pub use engine::{BitEngine, Command};
pub use pins::{Direction, SwdLineDriver};
pub use queue::CommandQueue;
pub use results::{ResultArray, ResultSlot};
pub use submit::{begin_read, begin_write, SubmitError};
pub use transport::SwdTransport;

/// Crate-wide error taxonomy for anything that is not a per-submission
/// [`SubmitError`] (§7). Kept `Debug + Clone + PartialEq`, `Display`-only —
/// no `std::error::Error` impl, matching `airfrog_swd::SwdError`'s shape
/// for a `no_std` crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoreError {
    /// Wraps a submission-time rejection.
    Submit(SubmitError),
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoreError::Submit(e) => write!(f, "{e}"),
        }
    }
}

impl From<SubmitError> for CoreError {
    fn from(e: SubmitError) -> Self {
        CoreError::Submit(e)
    }
}

/// Board-integration clock speed, chosen once when a `SwdBus` is built.
///
/// Carried over from `airfrog_swd::protocol::Speed`: a compile/
/// integration-time constant, never a wire-level runtime knob (§6 — no
/// runtime bit-rate negotiation). A board-support crate reads
/// [`Speed::half_period_ns`] to program whatever timer peripheral drives
/// `on_rising_edge`/`on_falling_edge`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Speed {
    Slow,
    #[default]
    Medium,
    Fast,
    Turbo,
}

impl Speed {
    /// Target clock half-period, in nanoseconds, for the chosen speed.
    pub const fn half_period_ns(self) -> u32 {
        match self {
            Speed::Slow => 10_000,
            Speed::Medium => 2_000,
            Speed::Fast => 500,
            Speed::Turbo => 125,
        }
    }
}

impl fmt::Display for Speed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Speed::Slow => "slow",
            Speed::Medium => "medium",
            Speed::Fast => "fast",
            Speed::Turbo => "turbo",
        };
        write!(f, "{s}")
    }
}
