//! swd-proto — shared wire protocol for the SWD USB adaptor
//!
//! This crate is the single source of truth for anything that must agree
//! bit-for-bit between the device firmware (`swd-core`) and the host client
//! (`swd-host`): USB device identity, vendor control request codes, the
//! packed little-endian payload layouts, and the status codes carried in a
//! completed result record.
//!
//! It is `no_std` and has no platform dependencies, so it can be linked into
//! both a `no_std` firmware image and a hosted client binary unchanged.

#![no_std]

#[allow(unused_imports)]
use log::trace;

/// USB vendor ID the adaptor enumerates under.
pub const USB_VENDOR_ID: u16 = 0x16C0;

/// USB product ID the adaptor enumerates under.
pub const USB_PRODUCT_ID: u16 = 0x05DC;

/// `iManufacturer` string the host client matches on.
pub const USB_MANUFACTURER: &str = "kevincuzner.com";

/// `iProduct` string the host client matches on.
pub const USB_PRODUCT: &str = "SWD Adaptor";

/// Capacity of the device-side command queue (§3/§4.D). Fixed at compile
/// time; not a runtime knob.
pub const QUEUE_CAPACITY: usize = 64;

/// Number of result-record slots, addressed by the 8-bit command index
/// carried in `wIndex`.
pub const SLOT_COUNT: usize = 256;

/// Vendor control request codes (`bRequest`), endpoint 0 only.
pub mod request {
    /// OUT, `read_req` payload. Begin a READ into the slot named by `wIndex`.
    pub const BEGIN_READ: u8 = 0x20;

    /// OUT, `write_req` payload. Begin a WRITE into the slot named by
    /// `wIndex`.
    pub const BEGIN_WRITE: u8 = 0x21;

    /// IN, `swd_result` payload. Return the status of the slot named by
    /// `wIndex`.
    pub const READ_STATUS: u8 = 0x22;

    /// OUT, no payload. Turn the adaptor's activity LED on.
    ///
    /// Not part of the distilled spec's three core requests — carried over
    /// from the original firmware's `Programmer::setLed(true)` control
    /// transfer, which the SWD data path does not depend on.
    pub const LED_ON: u8 = 0x10;

    /// OUT, no payload. Turn the adaptor's activity LED off. See
    /// [`LED_ON`].
    pub const LED_OFF: u8 = 0x11;
}

/// Status codes carried in a completed [`SwdResult`], signed 8-bit (§6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// Success.
    Ok,
    /// SWD WAIT response from the target, or the queue was full at
    /// submission time. The spec preserves this dual use for wire
    /// compatibility (§9).
    Busy,
    /// Reserved synonym of [`StatusCode::Busy`] in some protocol variants.
    /// Never produced by this implementation; accepted on decode.
    Wait,
    /// SWD FAULT response from the target.
    Fault,
    /// Protocol violation: unknown ACK value, or an internal state machine
    /// inconsistency.
    Bus,
}

impl StatusCode {
    /// Encodes as the signed byte carried on the wire.
    pub const fn to_i8(self) -> i8 {
        match self {
            StatusCode::Ok => 0,
            StatusCode::Busy => -2,
            StatusCode::Wait => -3,
            StatusCode::Fault => -4,
            StatusCode::Bus => -5,
        }
    }

    /// Decodes a wire byte, if it names a known status.
    pub const fn from_i8(value: i8) -> Option<Self> {
        match value {
            0 => Some(StatusCode::Ok),
            -2 => Some(StatusCode::Busy),
            -3 => Some(StatusCode::Wait),
            -4 => Some(StatusCode::Fault),
            -5 => Some(StatusCode::Bus),
            _ => None,
        }
    }
}

impl core::fmt::Display for StatusCode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let s = match self {
            StatusCode::Ok => "ok",
            StatusCode::Busy => "busy",
            StatusCode::Wait => "wait",
            StatusCode::Fault => "fault",
            StatusCode::Bus => "bus error",
        };
        write!(f, "{s}")
    }
}

/// The 3-bit SWD acknowledgement, sampled LSB-first (§4.B).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ack {
    /// `0b001` — target accepted the request.
    Ok,
    /// `0b010` — target is busy; retry later.
    Wait,
    /// `0b100` — target is in a fault state.
    Fault,
}

impl Ack {
    /// Decodes 3 sampled bits (already assembled LSB-first into `bits`,
    /// i.e. `bits & 0b111`).
    ///
    /// Returns `Ok(Ack)` for a recognized acknowledgement, or `Err(bits)`
    /// with the raw value for anything else (§4.B "anything else -> abort
    /// with BUS-ERROR status").
    pub const fn decode(bits: u8) -> Result<Ack, u8> {
        match bits & 0b111 {
            0b001 => Ok(Ack::Ok),
            0b010 => Ok(Ack::Wait),
            0b100 => Ok(Ack::Fault),
            other => Err(other),
        }
    }

    /// The [`StatusCode`] an aborted transaction terminates with, for
    /// non-OK acknowledgements.
    pub const fn abort_status(self) -> StatusCode {
        match self {
            Ack::Ok => StatusCode::Ok,
            Ack::Wait => StatusCode::Busy,
            Ack::Fault => StatusCode::Fault,
        }
    }
}

/// Command kind (§3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Read,
    Write,
}

/// `read_req` wire payload: 1 byte (§6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadReq {
    pub request: u8,
}

impl ReadReq {
    pub const WIRE_LEN: usize = 1;

    pub const fn to_bytes(self) -> [u8; Self::WIRE_LEN] {
        [self.request]
    }

    pub const fn from_bytes(buf: &[u8]) -> Option<Self> {
        if buf.len() < Self::WIRE_LEN {
            return None;
        }
        Some(ReadReq { request: buf[0] })
    }
}

/// `write_req` wire payload: 5 bytes, little-endian `data` (§6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteReq {
    pub request: u8,
    pub data: u32,
}

impl WriteReq {
    pub const WIRE_LEN: usize = 5;

    pub fn to_bytes(self) -> [u8; Self::WIRE_LEN] {
        let d = self.data.to_le_bytes();
        [self.request, d[0], d[1], d[2], d[3]]
    }

    pub fn from_bytes(buf: &[u8]) -> Option<Self> {
        if buf.len() < Self::WIRE_LEN {
            return None;
        }
        Some(WriteReq {
            request: buf[0],
            data: u32::from_le_bytes([buf[1], buf[2], buf[3], buf[4]]),
        })
    }
}

/// `swd_result` wire payload: 6 bytes (§6). `result` is only meaningful
/// when `done == 1`; `data` is only meaningful on a `done` READ that
/// completed OK (§3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwdResult {
    pub done: u8,
    pub result: i8,
    pub data: u32,
}

impl SwdResult {
    pub const WIRE_LEN: usize = 6;

    /// A still-pending result, as written by the device at BEGIN time.
    pub const PENDING: SwdResult = SwdResult {
        done: 0,
        result: 0,
        data: 0,
    };

    pub fn to_bytes(self) -> [u8; Self::WIRE_LEN] {
        let d = self.data.to_le_bytes();
        [self.done, self.result as u8, d[0], d[1], d[2], d[3]]
    }

    pub fn from_bytes(buf: &[u8]) -> Option<Self> {
        if buf.len() < Self::WIRE_LEN {
            return None;
        }
        Some(SwdResult {
            done: buf[0],
            result: buf[1] as i8,
            data: u32::from_le_bytes([buf[2], buf[3], buf[4], buf[5]]),
        })
    }

    /// `true` once the device has published a final outcome.
    pub const fn is_done(&self) -> bool {
        self.done != 0
    }

    /// The decoded [`StatusCode`], if `result` names a known one.
    pub const fn status(&self) -> Option<StatusCode> {
        StatusCode::from_i8(self.result)
    }
}

/// JTAG-to-SWD switchover preamble (§4.C): 7 bytes of ones, the 16-bit
/// switchover key `0x79E7` (`0x79` transmitted first, each byte LSB-first
/// on the wire), then 7 more bytes of ones. 17 bytes = 136 bits total.
pub const JTAG_TO_SWD_PREAMBLE: [u8; 17] = [
    0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x79, 0xE7, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
    0xFF,
];

/// Minimum additional idle-high clocks the bus controller emits in STOP
/// before returning to IDLE (§4.C).
pub const STOP_IDLE_CYCLES: u32 = 8;

/// Computes the SWD parity bit for a 32-bit word using the fold-XOR trick
/// named in §4.B, rather than a population-count loop.
pub const fn fold_parity(value: u32) -> bool {
    let mut x = value;
    x ^= x >> 16;
    x ^= x >> 8;
    x ^= x >> 4;
    ((0x6996u32 >> (x & 0xF)) & 1) != 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_code_round_trips() {
        for code in [
            StatusCode::Ok,
            StatusCode::Busy,
            StatusCode::Wait,
            StatusCode::Fault,
            StatusCode::Bus,
        ] {
            assert_eq!(StatusCode::from_i8(code.to_i8()), Some(code));
        }
    }

    #[test]
    fn unknown_status_byte_decodes_to_none() {
        assert_eq!(StatusCode::from_i8(1), None);
        assert_eq!(StatusCode::from_i8(-1), None);
    }

    #[test]
    fn ack_decode_matches_spec_table() {
        assert_eq!(Ack::decode(0b001), Ok(Ack::Ok));
        assert_eq!(Ack::decode(0b010), Ok(Ack::Wait));
        assert_eq!(Ack::decode(0b100), Ok(Ack::Fault));
        assert_eq!(Ack::decode(0b111), Err(0b111));
        assert_eq!(Ack::decode(0b000), Err(0b000));
    }

    #[test]
    fn write_req_wire_layout_is_little_endian() {
        let req = WriteReq {
            request: 0xA5,
            data: 0x2BA0_1477,
        };
        let bytes = req.to_bytes();
        assert_eq!(bytes, [0xA5, 0x77, 0x14, 0xA0, 0x2B]);
        assert_eq!(WriteReq::from_bytes(&bytes), Some(req));
    }

    #[test]
    fn swd_result_wire_layout_round_trips() {
        let result = SwdResult {
            done: 1,
            result: -2,
            data: 0xDEAD_BEEF,
        };
        let bytes = result.to_bytes();
        assert_eq!(bytes.len(), SwdResult::WIRE_LEN);
        assert_eq!(SwdResult::from_bytes(&bytes), Some(result));
        assert_eq!(result.status(), Some(StatusCode::Busy));
    }

    #[test]
    fn pending_result_is_not_done() {
        assert!(!SwdResult::PENDING.is_done());
    }

    #[test]
    fn fold_parity_matches_population_count() {
        for value in [0u32, 1, 0xFFFF_FFFF, 0x2BA0_1477, 0x8000_0000] {
            let expected = value.count_ones() % 2 == 1;
            assert_eq!(fold_parity(value), expected, "value=0x{value:08X}");
        }
    }

    #[test]
    fn jtag_preamble_is_136_bits_with_documented_key() {
        assert_eq!(JTAG_TO_SWD_PREAMBLE.len() * 8, 136);
        assert_eq!(JTAG_TO_SWD_PREAMBLE[7], 0x79);
        assert_eq!(JTAG_TO_SWD_PREAMBLE[8], 0xE7);
    }
}
