//! Component G — Host Client.
//!
//! `SwdProbe` owns one session's slot pool and drives the three vendor
//! control requests: BEGIN_READ/BEGIN_WRITE to submit, READ_STATUS polled
//! to a caller-supplied deadline. No request is retried silently (§4.G) —
//! every non-OK status and every transport error is handed back to the
//! caller verbatim.

use std::thread;
use std::time::{Duration, Instant};

use swd_proto::{request, ReadReq, StatusCode, SwdResult, WriteReq};

use crate::device::open_adaptor;
use crate::error::HostError;
use crate::slots::SlotPool;

const CONTROL_TIMEOUT: Duration = Duration::from_millis(500);
const POLL_INTERVAL: Duration = Duration::from_micros(200);

/// A session against one SWD adaptor.
pub struct SwdProbe {
    handle: rusb::DeviceHandle<rusb::GlobalContext>,
    slots: SlotPool,
}

impl SwdProbe {
    /// Opens the first matching adaptor found on the bus.
    pub fn open() -> Result<Self, HostError> {
        Ok(Self {
            handle: open_adaptor()?,
            slots: SlotPool::new(),
        })
    }

    /// Issues the ADIv5 request byte `request_byte` as a READ, waiting up
    /// to `deadline` for the adaptor to complete it.
    pub fn read(&mut self, request_byte: u8, deadline: Duration) -> Result<u32, HostError> {
        let slot = self.slots.alloc().ok_or(HostError::SlotsExhausted)?;
        let outcome = (|| {
            self.begin_read_raw(slot, request_byte)?;
            self.wait_for_result(slot, deadline)
        })();
        self.slots.free(slot);
        let result = outcome?;
        match result.status() {
            Some(StatusCode::Ok) => Ok(result.data),
            Some(other) => Err(HostError::Protocol(status_message(other))),
            None => Err(HostError::Protocol("unrecognized status byte")),
        }
    }

    /// Issues the ADIv5 request byte `request_byte` as a WRITE of `data`,
    /// waiting up to `deadline` for the adaptor to complete it.
    pub fn write(&mut self, request_byte: u8, data: u32, deadline: Duration) -> Result<(), HostError> {
        let slot = self.slots.alloc().ok_or(HostError::SlotsExhausted)?;
        let outcome = (|| {
            self.begin_write_raw(slot, request_byte, data)?;
            self.wait_for_result(slot, deadline)
        })();
        self.slots.free(slot);
        let result = outcome?;
        match result.status() {
            Some(StatusCode::Ok) => Ok(()),
            Some(other) => Err(HostError::Protocol(status_message(other))),
            None => Err(HostError::Protocol("unrecognized status byte")),
        }
    }

    /// Turns the adaptor's activity LED on. Supplemental request, carried
    /// over from `original_source`; unrelated to the SWD data path.
    pub fn led_on(&mut self) -> Result<(), HostError> {
        self.no_data_out(request::LED_ON)
    }

    /// Turns the adaptor's activity LED off.
    pub fn led_off(&mut self) -> Result<(), HostError> {
        self.no_data_out(request::LED_OFF)
    }

    fn no_data_out(&mut self, request_code: u8) -> Result<(), HostError> {
        let request_type = rusb::request_type(
            rusb::Direction::Out,
            rusb::RequestType::Vendor,
            rusb::Recipient::Device,
        );
        self.handle
            .write_control(request_type, request_code, 0, 0, &[], CONTROL_TIMEOUT)?;
        Ok(())
    }

    fn begin_read_raw(&mut self, slot: u8, request_byte: u8) -> Result<(), HostError> {
        let payload = ReadReq {
            request: request_byte,
        }
        .to_bytes();
        let request_type = rusb::request_type(
            rusb::Direction::Out,
            rusb::RequestType::Vendor,
            rusb::Recipient::Device,
        );
        self.handle.write_control(
            request_type,
            request::BEGIN_READ,
            0,
            slot as u16,
            &payload,
            CONTROL_TIMEOUT,
        )?;
        Ok(())
    }

    fn begin_write_raw(&mut self, slot: u8, request_byte: u8, data: u32) -> Result<(), HostError> {
        let payload = WriteReq {
            request: request_byte,
            data,
        }
        .to_bytes();
        let request_type = rusb::request_type(
            rusb::Direction::Out,
            rusb::RequestType::Vendor,
            rusb::Recipient::Device,
        );
        self.handle.write_control(
            request_type,
            request::BEGIN_WRITE,
            0,
            slot as u16,
            &payload,
            CONTROL_TIMEOUT,
        )?;
        Ok(())
    }

    fn read_status_raw(&mut self, slot: u8) -> Result<SwdResult, HostError> {
        let request_type = rusb::request_type(
            rusb::Direction::In,
            rusb::RequestType::Vendor,
            rusb::Recipient::Device,
        );
        let mut buf = [0u8; SwdResult::WIRE_LEN];
        let read = self.handle.read_control(
            request_type,
            request::READ_STATUS,
            0,
            slot as u16,
            &mut buf,
            CONTROL_TIMEOUT,
        )?;
        if read != SwdResult::WIRE_LEN {
            return Err(HostError::Protocol("short swd_result read"));
        }
        SwdResult::from_bytes(&buf).ok_or(HostError::Protocol("malformed swd_result"))
    }

    fn wait_for_result(&mut self, slot: u8, deadline: Duration) -> Result<SwdResult, HostError> {
        let start = Instant::now();
        loop {
            let result = self.read_status_raw(slot)?;
            if result.is_done() {
                return Ok(result);
            }
            if start.elapsed() >= deadline {
                return Err(HostError::Timeout);
            }
            thread::sleep(POLL_INTERVAL);
        }
    }
}

fn status_message(status: StatusCode) -> &'static str {
    match status {
        StatusCode::Ok => "ok",
        StatusCode::Busy | StatusCode::Wait => "target WAIT (or queue was full)",
        StatusCode::Fault => "target FAULT",
        StatusCode::Bus => "bus error",
    }
}
