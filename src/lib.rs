//! Robust reading of quadrature encoders.
//!
//! ```ignore
//!    +----+    +----+
//!    |    |    |    |       A
//!  --+    +----+    +----
//!       +----+    +----+
//!       |    |    |    |    B
//!   ----+    +----+    +--
//! ```
//!
//! Two digital channels, 90° out of phase. Which channel leads encodes the
//! direction of rotation, the edges encode the distance. On every edge the
//! triggering channel's handler samples the *other* channel's level; that
//! sign is both the direction for a count due now and a stored claim the
//! other channel consumes on its own next edge.
//!
//! Real signals bounce. A glitched or missed edge leaves a channel without
//! its paired claim, and a naive decoder silently drops the movement. This
//! decoder keeps a *putative* claim per channel: the direction a recovery
//! would assume, negated after every resolved edge to match the alternation
//! of continuous rotation. When an edge arrives disarmed and more than the
//! holdoff window has passed since that channel's previous edge, the
//! putative claim is recovered and the count still happens.
//!
//! Three [`Resolution`] modes pick how many of the four edges per
//! electrical cycle produce a count: one, two or all four.
//!
//! # Wiring
//!
//! The decoder never talks to a HAL. It reads levels through
//! [`QuadratureSource`], timestamps through [`MicrosClock`], and expects
//! the platform to call [`QuadratureDecoder::on_edge_a`] and
//! [`QuadratureDecoder::on_edge_b`] from the two pins' edge interrupts.
//! On a typical single-core target that looks like:
//!
//! ```ignore
//! static DECODER: Lock<Option<QuadratureDecoder<Pins, Micros>>> = Lock::new(None);
//!
//! fn setup(pins: Pins, micros: Micros) {
//!     let decoder = QuadratureDecoder::new(pins, micros, Resolution::Double);
//!     assert!(decoder.is_valid());
//!
//!     critical_section::with(|cs| {
//!         *DECODER.get(cs) = Some(decoder);
//!     });
//!
//!     // attach isr_a/isr_b to the two pins' change interrupts here
//! }
//!
//! fn isr_a() {
//!     critical_section::with(|cs| {
//!         if let Some(decoder) = DECODER.get(cs).as_mut() {
//!             decoder.on_edge_a();
//!         }
//!     });
//! }
//!
//! fn position() -> i32 {
//!     DECODER.read().as_ref().map_or(0, |d| d.position())
//! }
//! ```

#![no_std]

#[macro_use]
extern crate log;

mod cell;
mod decoder;
mod error;
mod input;
mod lock;

pub use crate::cell::PositionCell;
pub use crate::decoder::{Channel, QuadratureDecoder, Resolution};
pub use crate::error::Error;
pub use crate::input::{InputPinSource, MicrosClock, QuadratureSource};
pub use crate::lock::{Lock, LockGuard};
