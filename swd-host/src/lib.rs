//! swd-host — host-side client library for the SWD USB adaptor.
//!
//! Wraps `rusb` (the maintained continuation of the `libusb` bindings this
//! workspace's dependency stack is otherwise grounded on) to discover the
//! adaptor by VID/PID/identity string, submit READ/WRITE requests through
//! a per-session slot pool, and poll results to a caller-chosen deadline.
//! Component G of the governing specification; everything else in this
//! workspace is device-side.

pub mod client;
pub mod device;
pub mod error;
pub mod slots;

pub use client::SwdProbe;
pub use error::HostError;
pub use slots::SlotPool;
