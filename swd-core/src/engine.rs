//! Component B — Bit Engine.
//!
//! Drives one SWD request/ACK/data transaction a single bit at a time,
//! advanced by exactly one call to [`BitEngine::step`] per falling edge
//! (§4.C). The cursor is the tagged [`Phase`] variant Design Notes §9 asks
//! for in place of an `if/else if` chain over a raw bit counter.

use swd_proto::{fold_parity, Ack, CommandKind, StatusCode};

use crate::pins::{Direction, SwdLineDriver};

/// One command as seen by the bit engine: the full pre-built ADIv5 request
/// byte (start/APnDP/RnW/A\[2:3\]/parity/stop/park, already assembled by the
/// caller — this crate never interprets AP/DP addressing, per §1's
/// Non-goals), the write payload (ignored for reads), and the result slot
/// to publish into when the transaction completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Command {
    pub kind: CommandKind,
    pub request: u8,
    pub data: u32,
    pub result_slot: u8,
}

/// The bit engine's cursor through one transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Shifting out the 8-bit request byte, LSB first.
    Req(u8),
    /// Turnaround before the target drives ACK.
    TrnToAck,
    /// Sampling the 3-bit ACK, LSB first.
    Ack(u8),
    /// Turnaround consumed after a non-OK ACK, before returning to idle.
    TrnAbort,
    /// Turnaround before the host drives DATA (write only).
    TrnToData,
    /// Shifting the 32-bit data word, LSB first (direction depends on
    /// [`CommandKind`]).
    Data(u8),
    /// The single parity bit that follows DATA.
    Parity,
    /// Turnaround after the target drove DATA+parity on a read, before the
    /// bus returns to host-driven idle.
    TrnFromRead,
}

/// What a single [`BitEngine::step`] call produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// The transaction is still in progress.
    Continue,
    /// The transaction finished; `status`/`data` are ready to publish to
    /// the command's result slot.
    Done { status: StatusCode, data: u32 },
}

/// Drives one command through the ADIv5 SWD request/ack/data sequence.
pub struct BitEngine {
    command: Command,
    phase: Phase,
    shift: u32,
    ack_bits: u8,
    abort_status: StatusCode,
    verify_read_parity: bool,
}

impl BitEngine {
    pub fn new(command: Command, verify_read_parity: bool) -> Self {
        Self {
            command,
            phase: Phase::Req(0),
            shift: 0,
            ack_bits: 0,
            abort_status: StatusCode::Bus,
            verify_read_parity,
        }
    }

    /// The command this engine is driving.
    pub fn command(&self) -> Command {
        self.command
    }

    /// Performs the line work for the current phase, then advances to the
    /// next one. Must be called from the falling-edge callback only
    /// (§4.C): rising edges belong to the bus controller's macro-state
    /// machine, never to the bit engine.
    pub fn step(&mut self, driver: &mut impl SwdLineDriver) -> StepOutcome {
        match self.phase {
            Phase::Req(bit) => {
                let value = (self.command.request >> bit) & 1 != 0;
                driver.set_dio(value);
                self.phase = if bit == 7 {
                    Phase::TrnToAck
                } else {
                    Phase::Req(bit + 1)
                };
                StepOutcome::Continue
            }
            Phase::TrnToAck => {
                driver.set_dio_direction(Direction::Input);
                self.ack_bits = 0;
                self.phase = Phase::Ack(0);
                StepOutcome::Continue
            }
            Phase::Ack(bit) => {
                if driver.read_dio() {
                    self.ack_bits |= 1 << bit;
                }
                if bit < 2 {
                    self.phase = Phase::Ack(bit + 1);
                    return StepOutcome::Continue;
                }
                match Ack::decode(self.ack_bits) {
                    Ok(Ack::Ok) => {
                        self.shift = 0;
                        self.phase = match self.command.kind {
                            CommandKind::Write => Phase::TrnToData,
                            CommandKind::Read => Phase::Data(0),
                        };
                    }
                    Ok(ack) => {
                        self.abort_status = ack.abort_status();
                        self.phase = Phase::TrnAbort;
                    }
                    Err(_) => {
                        self.abort_status = StatusCode::Bus;
                        self.phase = Phase::TrnAbort;
                    }
                }
                StepOutcome::Continue
            }
            Phase::TrnAbort => {
                driver.set_dio_direction(Direction::Output);
                StepOutcome::Done {
                    status: self.abort_status,
                    data: 0,
                }
            }
            Phase::TrnToData => {
                driver.set_dio_direction(Direction::Output);
                self.shift = self.command.data;
                self.phase = Phase::Data(0);
                StepOutcome::Continue
            }
            Phase::Data(bit) => {
                match self.command.kind {
                    CommandKind::Write => {
                        let value = (self.shift >> bit) & 1 != 0;
                        driver.set_dio(value);
                    }
                    CommandKind::Read => {
                        if driver.read_dio() {
                            self.shift |= 1 << bit;
                        }
                    }
                }
                self.phase = if bit == 31 { Phase::Parity } else { Phase::Data(bit + 1) };
                StepOutcome::Continue
            }
            Phase::Parity => match self.command.kind {
                CommandKind::Write => {
                    driver.set_dio(fold_parity(self.shift));
                    StepOutcome::Done {
                        status: StatusCode::Ok,
                        data: 0,
                    }
                }
                CommandKind::Read => {
                    let parity_ok = !self.verify_read_parity || driver.read_dio() == fold_parity(self.shift);
                    self.phase = Phase::TrnFromRead;
                    self.abort_status = if parity_ok { StatusCode::Ok } else { StatusCode::Bus };
                    StepOutcome::Continue
                }
            },
            Phase::TrnFromRead => {
                driver.set_dio_direction(Direction::Output);
                StepOutcome::Done {
                    status: self.abort_status,
                    data: self.shift,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pins::mock::MockLineDriver;

    fn run_to_completion(engine: &mut BitEngine, driver: &mut MockLineDriver) -> (StatusCode, u32) {
        loop {
            if let StepOutcome::Done { status, data } = engine.step(driver) {
                return (status, data);
            }
        }
    }

    #[test]
    fn successful_read_transaction() {
        let request = 0b1010_0111; // arbitrary well-formed request byte
        let idcode = 0x2BA0_1477u32;
        let mut driver = MockLineDriver::new();
        driver.queue_response_byte(0b001, 3); // ACK = OK
        for i in 0..32 {
            driver.queue_response_bits([(idcode >> i) & 1 != 0]);
        }
        driver.queue_response_bits([fold_parity(idcode)]);

        let command = Command {
            kind: CommandKind::Read,
            request,
            data: 0,
            result_slot: 3,
        };
        let mut engine = BitEngine::new(command, true);
        let (status, data) = run_to_completion(&mut engine, &mut driver);

        assert_eq!(status, StatusCode::Ok);
        assert_eq!(data, idcode);
        assert_eq!(&driver.written_bits[0..8], &request_bits(request)[..]);
    }

    #[test]
    fn read_with_bad_parity_is_flagged_when_verification_enabled() {
        let idcode = 0x1234_5678u32;
        let mut driver = MockLineDriver::new();
        driver.queue_response_byte(0b001, 3);
        for i in 0..32 {
            driver.queue_response_bits([(idcode >> i) & 1 != 0]);
        }
        driver.queue_response_bits([!fold_parity(idcode)]); // deliberately wrong

        let command = Command {
            kind: CommandKind::Read,
            request: 0,
            data: 0,
            result_slot: 0,
        };
        let mut engine = BitEngine::new(command, true);
        let (status, _) = run_to_completion(&mut engine, &mut driver);
        assert_eq!(status, StatusCode::Bus);
    }

    #[test]
    fn bad_read_parity_ignored_when_verification_disabled() {
        let idcode = 0x1234_5678u32;
        let mut driver = MockLineDriver::new();
        driver.queue_response_byte(0b001, 3);
        for i in 0..32 {
            driver.queue_response_bits([(idcode >> i) & 1 != 0]);
        }
        driver.queue_response_bits([!fold_parity(idcode)]);

        let command = Command {
            kind: CommandKind::Read,
            request: 0,
            data: 0,
            result_slot: 0,
        };
        let mut engine = BitEngine::new(command, false);
        let (status, data) = run_to_completion(&mut engine, &mut driver);
        assert_eq!(status, StatusCode::Ok);
        assert_eq!(data, idcode);
    }

    #[test]
    fn successful_write_transaction_drives_data_and_parity() {
        let data = 0xCAFE_F00Du32;
        let mut driver = MockLineDriver::new();
        driver.queue_response_byte(0b001, 3); // ACK = OK

        let command = Command {
            kind: CommandKind::Write,
            request: 0,
            data,
            result_slot: 7,
        };
        let mut engine = BitEngine::new(command, false);
        let (status, _) = run_to_completion(&mut engine, &mut driver);

        assert_eq!(status, StatusCode::Ok);
        // 8 request bits + 32 data bits + 1 parity bit were driven.
        assert_eq!(driver.written_bits.len(), 8 + 32 + 1);
        for i in 0..32u8 {
            assert_eq!(
                driver.written_bits[8 + i as usize],
                (data >> i) & 1 != 0,
                "data bit {i}"
            );
        }
        assert_eq!(*driver.written_bits.last().unwrap(), fold_parity(data));
    }

    #[test]
    fn wait_ack_aborts_without_data_phase() {
        let mut driver = MockLineDriver::new();
        driver.queue_response_byte(0b010, 3); // ACK = WAIT

        let command = Command {
            kind: CommandKind::Read,
            request: 0,
            data: 0,
            result_slot: 1,
        };
        let mut engine = BitEngine::new(command, false);
        let (status, data) = run_to_completion(&mut engine, &mut driver);
        assert_eq!(status, StatusCode::Busy);
        assert_eq!(data, 0);
    }

    #[test]
    fn fault_ack_surfaces_as_fault_status() {
        let mut driver = MockLineDriver::new();
        driver.queue_response_byte(0b100, 3); // ACK = FAULT

        let command = Command {
            kind: CommandKind::Write,
            request: 0,
            data: 0,
            result_slot: 1,
        };
        let mut engine = BitEngine::new(command, false);
        let (status, _) = run_to_completion(&mut engine, &mut driver);
        assert_eq!(status, StatusCode::Fault);
    }

    #[test]
    fn garbled_ack_surfaces_as_bus_error() {
        let mut driver = MockLineDriver::new();
        driver.queue_response_byte(0b111, 3); // not a valid ACK

        let command = Command {
            kind: CommandKind::Read,
            request: 0,
            data: 0,
            result_slot: 1,
        };
        let mut engine = BitEngine::new(command, false);
        let (status, _) = run_to_completion(&mut engine, &mut driver);
        assert_eq!(status, StatusCode::Bus);
    }

    fn request_bits(byte: u8) -> [bool; 8] {
        core::array::from_fn(|i| (byte >> i) & 1 != 0)
    }
}
