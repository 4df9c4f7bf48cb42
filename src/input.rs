//! Seams between the decoder and the surrounding hardware.
//!
//! The decoder never talks to a HAL directly. It reads instantaneous pin
//! levels through [`QuadratureSource`] and timestamps through
//! [`MicrosClock`]; attaching the edge interrupts themselves is platform
//! glue outside this crate (see the crate docs).

use embedded_hal::digital::v2::InputPin;

use crate::decoder::Channel;

/// Abstraction of something providing two pins as source for a quadrature
/// pair.
pub trait QuadratureSource {
    /// Instantaneous level of channel A's pin.
    fn level_a(&self) -> bool;

    /// Instantaneous level of channel B's pin.
    fn level_b(&self) -> bool;

    /// Whether the pin behind the channel can deliver edge interrupts.
    /// Platforms where only some pins are interrupt-capable override this.
    fn has_edge_events(&self, channel: Channel) -> bool {
        let _ = channel;
        true
    }
}

/// Monotonically increasing microsecond timestamps.
///
/// Wrapping around is fine; elapsed time is always computed with wrapping
/// subtraction.
pub trait MicrosClock {
    fn now_micros(&self) -> u32;
}

/// A quadrature source over two embedded-hal input pins.
///
/// A pin read that errors is reported as low.
pub struct InputPinSource<A, B> {
    pin_a: A,
    pin_b: B,
}

impl<A, B> InputPinSource<A, B>
where
    A: InputPin,
    B: InputPin,
{
    pub fn new(pin_a: A, pin_b: B) -> Self {
        InputPinSource { pin_a, pin_b }
    }

    /// Hand the pins back.
    pub fn free(self) -> (A, B) {
        (self.pin_a, self.pin_b)
    }
}

impl<A, B> QuadratureSource for InputPinSource<A, B>
where
    A: InputPin,
    B: InputPin,
{
    fn level_a(&self) -> bool {
        self.pin_a.is_high().unwrap_or(false)
    }

    fn level_b(&self) -> bool {
        self.pin_b.is_high().unwrap_or(false)
    }
}
