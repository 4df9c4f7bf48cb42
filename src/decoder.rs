//! The decode engine: per-channel bookkeeping, the counting rules for the
//! three resolution modes and the holdoff recovery that rides out glitched
//! or missed edges.
//!
//! Everything here is driven from the two edge handlers. The only state
//! shared with the foreground is the position counter, which lives in a
//! [`PositionCell`] so it can be read without stopping the handlers.

use crate::cell::PositionCell;
use crate::error::Error;
use crate::input::MicrosClock;
use crate::input::QuadratureSource;

/// One of the two digital signals forming a quadrature pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    A,
    B,
}

/// How many counts are produced per full electrical cycle of the pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// One count per cycle. Only one of the four edges counts.
    Standard,
    /// Two counts per cycle. Every channel A edge counts.
    Double,
    /// Four counts per cycle. Every edge on either channel counts.
    Quadruple,
}

impl Resolution {
    /// Holdoff window applied at construction, in µs. Standard starts out
    /// with pure edge-paired decoding until told otherwise.
    pub fn default_holdoff(self) -> u32 {
        match self {
            Resolution::Standard => 0,
            Resolution::Double | Resolution::Quadruple => 1000,
        }
    }

    fn rule_a(self) -> CountRule {
        match self {
            Resolution::Standard => CountRule::ArmedHigh,
            Resolution::Double | Resolution::Quadruple => CountRule::EitherArm,
        }
    }

    fn rule_b(self) -> Option<CountRule> {
        match self {
            Resolution::Quadruple => Some(CountRule::EitherArmInverted),
            _ => None,
        }
    }
}

/// Counting policy for one channel's handler.
#[derive(Clone, Copy)]
enum CountRule {
    /// Count only when the armed claim is positive, sign following the
    /// fresh side sample.
    ArmedHigh,
    /// Count on either claim polarity, negating the side sample for a
    /// negative claim.
    EitherArm,
    /// Like `EitherArm` with the opposite sign convention. Channel B uses
    /// this so both rotation senses keep a consistent direction.
    EitherArmInverted,
}

/// Bookkeeping for one channel.
#[derive(Clone, Copy)]
struct ChannelState {
    /// Pending directional claim. 0 is disarmed, otherwise the sign of this
    /// channel's level as last sampled by the opposite handler.
    arm: i8,
    /// The claim a holdoff recovery would assume. Negated after every
    /// resolved edge, matching the alternation of continuous rotation.
    putative: i8,
    /// Timestamp of this channel's last handled edge, in µs.
    last_edge: u32,
}

impl ChannelState {
    fn seed(level: bool, now: u32) -> Self {
        ChannelState {
            arm: level_sign(level),
            putative: 0,
            last_edge: now,
        }
    }

    /// Resolve one edge on this channel. `side` is the sign of the other
    /// channel's level, sampled at entry. Returns the counter step, if any.
    fn resolve(&mut self, side: i8, now: u32, holdoff: u32, rule: CountRule) -> Option<i8> {
        if self.arm == 0 && holdoff != 0 && now.wrapping_sub(self.last_edge) >= holdoff {
            // The paired edge never arrived, but enough time has passed
            // that we trust the predicted claim instead of dropping the
            // movement.
            self.arm = self.putative;
        }

        let mut step = None;

        if self.arm != 0 {
            step = match rule {
                CountRule::ArmedHigh => {
                    if self.arm > 0 {
                        Some(side)
                    } else {
                        None
                    }
                }
                CountRule::EitherArm => Some(if self.arm > 0 { side } else { -side }),
                CountRule::EitherArmInverted => Some(if self.arm > 0 { -side } else { side }),
            };
            self.putative = -self.arm;
            self.arm = 0;
        }

        self.last_edge = now;

        step
    }

    /// The non-counting path: consume any stored claim and stamp the time.
    fn disarm(&mut self, now: u32) -> Option<i8> {
        self.arm = 0;
        self.last_edge = now;
        None
    }
}

fn level_sign(high: bool) -> i8 {
    if high {
        1
    } else {
        -1
    }
}

/// Decoder for one quadrature pair.
///
/// Feed it the two channels' edge interrupts via [`on_edge_a`] and
/// [`on_edge_b`], read the position from the foreground via [`position`].
/// See the crate docs for the interrupt wiring recipe.
///
/// [`on_edge_a`]: QuadratureDecoder::on_edge_a
/// [`on_edge_b`]: QuadratureDecoder::on_edge_b
/// [`position`]: QuadratureDecoder::position
pub struct QuadratureDecoder<S, C> {
    source: S,
    clock: C,
    resolution: Resolution,
    holdoff: u32,
    a: ChannelState,
    b: ChannelState,
    counter: PositionCell,
    listener: Option<fn(i32)>,
}

impl<S, C> QuadratureDecoder<S, C>
where
    S: QuadratureSource,
    C: MicrosClock,
{
    /// Create a decoder over a quadrature source, seeding both channels'
    /// claims from the current pin levels.
    pub fn new(source: S, clock: C, resolution: Resolution) -> Self {
        let now = clock.now_micros();
        let a = ChannelState::seed(source.level_a(), now);
        let b = ChannelState::seed(source.level_b(), now);
        let holdoff = resolution.default_holdoff();

        debug!("decoder start {:?}, holdoff {}µs", resolution, holdoff);

        QuadratureDecoder {
            source,
            clock,
            resolution,
            holdoff,
            a,
            b,
            counter: PositionCell::new(0),
            listener: None,
        }
    }

    /// Handle one logic transition on the given channel. Must be invoked
    /// from that channel's edge interrupt, once per transition.
    pub fn on_edge(&mut self, channel: Channel) {
        let now = self.clock.now_micros();

        let (side, rule) = match channel {
            Channel::A => (
                level_sign(self.source.level_b()),
                Some(self.resolution.rule_a()),
            ),
            Channel::B => (level_sign(self.source.level_a()), self.resolution.rule_b()),
        };

        let (own, other) = match channel {
            Channel::A => (&mut self.a, &mut self.b),
            Channel::B => (&mut self.b, &mut self.a),
        };

        // The fresh side sample doubles as the opposite channel's claim,
        // consumed on its own next edge.
        other.arm = side;

        let step = match rule {
            Some(rule) => own.resolve(side, now, self.holdoff, rule),
            None => own.disarm(now),
        };

        if let Some(step) = step {
            let position = self.counter.add(step as i32);
            if let Some(listener) = self.listener {
                listener(position);
            }
        }
    }

    /// Edge interrupt entry point for channel A.
    pub fn on_edge_a(&mut self) {
        self.on_edge(Channel::A);
    }

    /// Edge interrupt entry point for channel B.
    pub fn on_edge_b(&mut self) {
        self.on_edge(Channel::B);
    }

    /// Current position. Safe to call outside the edge handlers; never
    /// blocks and never allocates.
    pub fn position(&self) -> i32 {
        self.counter.read()
    }

    /// Update the debounce window. 0 disables holdoff recovery for all
    /// subsequent edges.
    pub fn set_holdoff(&mut self, micros: u32) {
        debug!("holdoff {}µs", micros);
        self.holdoff = micros;
    }

    /// The active debounce window in µs.
    pub fn holdoff(&self) -> u32 {
        self.holdoff
    }

    /// Install or replace the step listener.
    ///
    /// The listener runs in handler context with the new position after
    /// every accepted step, so it must not block nor call back into the
    /// decoder. Replacing it while an edge is in flight is a benign race:
    /// the handler invokes either the old or the new listener.
    pub fn set_listener(&mut self, listener: Option<fn(i32)>) {
        self.listener = listener;
    }

    /// The resolution mode fixed at construction.
    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    /// Whether both channels can deliver edge interrupts on this platform.
    ///
    /// A decoder over pins without edge support stays inert: the handlers
    /// are never registered, so it produces no counts.
    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Like [`is_valid`](QuadratureDecoder::is_valid), naming the first
    /// channel that cannot deliver edge events.
    pub fn validate(&self) -> Result<(), Error> {
        for &channel in &[Channel::A, Channel::B] {
            if !self.source.has_edge_events(channel) {
                return Err(Error::EdgeEventsUnsupported(channel));
            }
        }
        Ok(())
    }

    /// Detach, handing back the source and the clock.
    pub fn free(self) -> (S, C) {
        (self.source, self.clock)
    }
}
