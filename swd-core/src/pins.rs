//! Component A — Line Driver.
//!
//! The bit engine and bus controller are generic over [`SwdLineDriver`] so
//! neither ever touches a GPIO register directly. A board-support crate
//! supplies the concrete implementation; this crate only needs the four
//! primitives the SWD line protocol is built from.

use core::fmt;

/// Direction of the bidirectional SWDIO line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Output,
    Input,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Output => write!(f, "output"),
            Direction::Input => write!(f, "input"),
        }
    }
}

/// The primitive operations the bit engine and bus controller drive from a
/// timer ISR context.
///
/// Every method is expected to be infallible and fast enough to complete
/// well within one clock half-period; an implementation that can fail
/// (e.g. a GPIO expander over I2C) should latch the error and surface it
/// through a side channel rather than here.
pub trait SwdLineDriver {
    /// Drives SWCLK to the given level.
    fn set_clk(&mut self, high: bool);

    /// Switches SWDIO's direction. Must be called before driving or
    /// sampling in the new direction.
    fn set_dio_direction(&mut self, direction: Direction);

    /// Drives SWDIO. Only meaningful while direction is
    /// [`Direction::Output`].
    fn set_dio(&mut self, high: bool);

    /// Samples SWDIO. Only meaningful while direction is
    /// [`Direction::Input`].
    fn read_dio(&mut self) -> bool;
}

#[cfg(test)]
pub(crate) mod mock {
    use super::{Direction, SwdLineDriver};
    use std::collections::VecDeque;
    use std::vec::Vec;

    /// A line driver double for bus-controller/bit-engine tests.
    ///
    /// It does not emulate SWD protocol semantics itself: it records every
    /// bit driven while the direction is `Output`, and replays a
    /// pre-programmed bit sequence for every sample taken while the
    /// direction is `Input`. Tests program the response queue with the
    /// exact bits a real target would drive back (ACK, read data, parity)
    /// and assert on the bits the engine under test drove.
    #[derive(Default)]
    pub struct MockLineDriver {
        pub clk_history: Vec<bool>,
        pub direction_history: Vec<Direction>,
        pub written_bits: Vec<bool>,
        pub response_bits: VecDeque<bool>,
        direction: Direction,
    }

    impl Default for Direction {
        fn default() -> Self {
            Direction::Input
        }
    }

    impl MockLineDriver {
        pub fn new() -> Self {
            Self {
                direction: Direction::Input,
                ..Default::default()
            }
        }

        /// Queues bits (LSB describing the first bit sampled) for the next
        /// `read_dio` calls.
        pub fn queue_response_bits(&mut self, bits: impl IntoIterator<Item = bool>) {
            self.response_bits.extend(bits);
        }

        /// Queues the bits of a byte, LSB first, `count` bits long.
        pub fn queue_response_byte(&mut self, byte: u8, count: u8) {
            for i in 0..count {
                self.response_bits.push_back((byte >> i) & 1 != 0);
            }
        }
    }

    impl SwdLineDriver for MockLineDriver {
        fn set_clk(&mut self, high: bool) {
            self.clk_history.push(high);
        }

        fn set_dio_direction(&mut self, direction: Direction) {
            self.direction = direction;
            self.direction_history.push(direction);
        }

        fn set_dio(&mut self, high: bool) {
            assert_eq!(
                self.direction,
                Direction::Output,
                "set_dio called while SWDIO direction was input"
            );
            self.written_bits.push(high);
        }

        fn read_dio(&mut self) -> bool {
            assert_eq!(
                self.direction,
                Direction::Input,
                "read_dio called while SWDIO direction was output"
            );
            self.response_bits.pop_front().unwrap_or(false)
        }
    }
}
