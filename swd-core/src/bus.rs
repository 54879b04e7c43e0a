//! Component C — Bus Controller.
//!
//! The macro state machine that sits above the bit engine: IDLE waits for
//! a command, INIT drives the fixed JTAG-to-SWD switchover preamble, RUN
//! steps the bit engine once per falling edge, STOP holds the line idle
//! for a minimum number of clocks before the next command may start.
//!
//! Per §4.C, macro-state transitions happen once per timer overflow,
//! before the bit engine's own work happens on the falling edge — so this
//! type exposes two entry points, [`SwdBus::on_rising_edge`] and
//! [`SwdBus::on_falling_edge`], rather than one combined callback. The
//! original firmware this spec was distilled from drove both halves from
//! a single callback invoked only at overflow; splitting it this way is a
//! deliberate divergence, not an oversight.

use swd_proto::{JTAG_TO_SWD_PREAMBLE, STOP_IDLE_CYCLES};

use crate::engine::{BitEngine, Command, StepOutcome};
use crate::pins::{Direction, SwdLineDriver};
use crate::queue::CommandQueue;
use crate::results::ResultArray;

const PREAMBLE_BITS: u16 = (JTAG_TO_SWD_PREAMBLE.len() * 8) as u16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BusState {
    Idle,
    Init,
    Run,
    Stop,
}

/// Drives the SWD bus for one line driver, one command queue, and one
/// result array.
pub struct SwdBus<'q, 'r, D, const N: usize, const M: usize> {
    driver: D,
    queue: &'q CommandQueue<N>,
    results: &'r ResultArray<M>,
    state: BusState,
    engine: Option<BitEngine>,
    current: Option<Command>,
    counter: u16,
    verify_read_parity: bool,
}

impl<'q, 'r, D: SwdLineDriver, const N: usize, const M: usize> SwdBus<'q, 'r, D, N, M> {
    pub fn new(
        driver: D,
        queue: &'q CommandQueue<N>,
        results: &'r ResultArray<M>,
        verify_read_parity: bool,
    ) -> Self {
        Self {
            driver,
            queue,
            results,
            state: BusState::Idle,
            engine: None,
            current: None,
            counter: 0,
            verify_read_parity,
        }
    }

    /// Releases the line driver back to the caller, e.g. to reconfigure it
    /// outside of a transaction.
    pub fn into_driver(self) -> D {
        self.driver
    }

    /// Macro-state transitions. Call once per timer overflow, before
    /// [`Self::on_falling_edge`].
    pub fn on_rising_edge(&mut self) {
        self.driver.set_clk(true);
        match self.state {
            BusState::Idle => {
                if let Some(command) = self.queue.pop() {
                    self.current = Some(command);
                    self.engine = Some(BitEngine::new(command, self.verify_read_parity));
                    self.counter = 0;
                    self.driver.set_dio_direction(Direction::Output);
                    self.state = BusState::Init;
                }
            }
            BusState::Init => {
                if self.counter >= PREAMBLE_BITS {
                    self.state = BusState::Run;
                }
            }
            BusState::Run => {}
            BusState::Stop => {
                if self.counter >= STOP_IDLE_CYCLES as u16 {
                    self.state = BusState::Idle;
                    self.counter = 0;
                }
            }
        }
    }

    /// Bit-level work for the current phase. Call once per timer overflow,
    /// after [`Self::on_rising_edge`].
    pub fn on_falling_edge(&mut self) {
        self.driver.set_clk(false);
        match self.state {
            BusState::Idle => {
                self.driver.set_dio(true);
            }
            BusState::Init => {
                let bit_index = self.counter as usize;
                let byte = JTAG_TO_SWD_PREAMBLE[bit_index / 8];
                let bit = (byte >> (bit_index % 8)) & 1 != 0;
                self.driver.set_dio(bit);
                self.counter += 1;
            }
            BusState::Run => {
                let outcome = match self.engine.as_mut() {
                    Some(engine) => engine.step(&mut self.driver),
                    None => return,
                };
                if let StepOutcome::Done { status, data } = outcome {
                    if let Some(command) = self.current.take() {
                        if let Some(slot) = self.results.get(command.result_slot) {
                            slot.publish(status, data);
                        }
                    }
                    self.engine = None;
                    self.counter = 0;
                    self.state = BusState::Stop;
                }
            }
            BusState::Stop => {
                self.driver.set_dio(true);
                self.counter += 1;
            }
        }
    }

    /// `true` once a command is actively being driven (not IDLE).
    pub fn is_busy(&self) -> bool {
        self.state != BusState::Idle
    }
}
