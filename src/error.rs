//! Wrapper for the errors the decoder can report.

use crate::decoder::Channel;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The pin backing this channel cannot deliver edge interrupts, so a
    /// handler for it can never be registered.
    EdgeEventsUnsupported(Channel),
}
