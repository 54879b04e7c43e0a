//! Component F — USB Transport.
//!
//! Maps the three vendor control requests (§6) onto the submission API and
//! result array, plus two supplemental LED requests carried over from
//! `original_source/host/src/Programmer.cpp`'s `setLed()` (§4.F). STALL
//! discipline (queue full, slot busy, malformed payload, unknown request)
//! is implemented by rejecting the control transfer rather than returning
//! any other status out of band.

use usb_device::class_prelude::{ControlIn, ControlOut, UsbBus, UsbClass};
use usb_device::control::RequestType;

use swd_proto::{request, ReadReq, SwdResult, WriteReq};

use crate::queue::CommandQueue;
use crate::results::ResultArray;
use crate::submit::{begin_read, begin_write};

/// LED control hook. A board-support crate supplies a plain function
/// pointer rather than a second generic parameter, keeping this type's
/// signature stable across boards.
pub type LedControl = fn(on: bool);

fn no_led(_on: bool) {}

/// The USB vendor interface the adaptor exposes at endpoint 0.
pub struct SwdTransport<'q, 'r, const N: usize, const M: usize> {
    queue: &'q CommandQueue<N>,
    results: &'r ResultArray<M>,
    led: LedControl,
}

impl<'q, 'r, const N: usize, const M: usize> SwdTransport<'q, 'r, N, M> {
    pub fn new(queue: &'q CommandQueue<N>, results: &'r ResultArray<M>) -> Self {
        Self {
            queue,
            results,
            led: no_led,
        }
    }

    pub fn with_led_control(mut self, led: LedControl) -> Self {
        self.led = led;
        self
    }
}

impl<'q, 'r, B: UsbBus, const N: usize, const M: usize> UsbClass<B> for SwdTransport<'q, 'r, N, M> {
    fn control_out(&mut self, xfer: ControlOut<B>) {
        let request_packet = xfer.request();
        if request_packet.request_type != RequestType::Vendor {
            return;
        }
        let slot = request_packet.index as u8;

        match request_packet.request {
            request::BEGIN_READ => match ReadReq::from_bytes(xfer.data()) {
                Some(read) => match begin_read(self.queue, self.results, slot, read.request) {
                    Ok(()) => {
                        let _ = xfer.accept();
                    }
                    Err(_) => {
                        let _ = xfer.reject();
                    }
                },
                None => {
                    let _ = xfer.reject();
                }
            },
            request::BEGIN_WRITE => match WriteReq::from_bytes(xfer.data()) {
                Some(write) => {
                    match begin_write(self.queue, self.results, slot, write.request, write.data) {
                        Ok(()) => {
                            let _ = xfer.accept();
                        }
                        Err(_) => {
                            let _ = xfer.reject();
                        }
                    }
                }
                None => {
                    let _ = xfer.reject();
                }
            },
            request::LED_ON => {
                (self.led)(true);
                let _ = xfer.accept();
            }
            request::LED_OFF => {
                (self.led)(false);
                let _ = xfer.accept();
            }
            _ => {}
        }
    }

    fn control_in(&mut self, xfer: ControlIn<B>) {
        let request_packet = xfer.request();
        if request_packet.request_type != RequestType::Vendor {
            return;
        }
        if request_packet.request != request::READ_STATUS {
            return;
        }
        let slot = request_packet.index as u8;
        let result = self
            .results
            .get(slot)
            .map(|s| s.read())
            .unwrap_or(SwdResult::PENDING);
        let _ = xfer.accept_with(&result.to_bytes());
    }
}
