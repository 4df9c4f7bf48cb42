//! Scenario tests driving the public surface with a simulated encoder.

use std::cell::Cell;
use std::rc::Rc;

use robust_quadrature::{
    Channel, Lock, MicrosClock, QuadratureDecoder, QuadratureSource, Resolution,
};

/// Simulated quadrature signal plus a microsecond clock.
#[derive(Clone, Default)]
struct Signal {
    a: Rc<Cell<bool>>,
    b: Rc<Cell<bool>>,
    now: Rc<Cell<u32>>,
}

impl Signal {
    /// Both channels high, the idle state between detents.
    fn idle() -> Self {
        let signal = Signal::default();
        signal.a.set(true);
        signal.b.set(true);
        signal
    }
}

impl QuadratureSource for Signal {
    fn level_a(&self) -> bool {
        self.a.get()
    }

    fn level_b(&self) -> bool {
        self.b.get()
    }
}

impl MicrosClock for Signal {
    fn now_micros(&self) -> u32 {
        self.now.get()
    }
}

struct Bench {
    signal: Signal,
    decoder: QuadratureDecoder<Signal, Signal>,
}

impl Bench {
    fn new(resolution: Resolution) -> Self {
        let signal = Signal::idle();
        let decoder = QuadratureDecoder::new(signal.clone(), signal.clone(), resolution);
        Bench { signal, decoder }
    }

    /// Toggle the channel's level `dt` µs later and run its handler.
    fn edge(&mut self, channel: Channel, dt: u32) {
        self.toggle(channel, dt);
        self.decoder.on_edge(channel);
    }

    /// A lost edge: the level flips but no handler runs.
    fn glitch(&mut self, channel: Channel, dt: u32) {
        self.toggle(channel, dt);
    }

    fn toggle(&mut self, channel: Channel, dt: u32) {
        let level = match channel {
            Channel::A => &self.signal.a,
            Channel::B => &self.signal.b,
        };
        level.set(!level.get());
        self.signal.now.set(self.signal.now.get().wrapping_add(dt));
    }

    fn cycle_cw(&mut self, dt: u32) {
        self.edge(Channel::A, dt);
        self.edge(Channel::B, dt);
        self.edge(Channel::A, dt);
        self.edge(Channel::B, dt);
    }

    fn cycle_ccw(&mut self, dt: u32) {
        self.edge(Channel::B, dt);
        self.edge(Channel::A, dt);
        self.edge(Channel::B, dt);
        self.edge(Channel::A, dt);
    }

    fn position(&self) -> i32 {
        self.decoder.position()
    }
}

#[test]
fn resolutions_scale_one_two_four() {
    let cases = [
        (Resolution::Standard, 5),
        (Resolution::Double, 10),
        (Resolution::Quadruple, 20),
    ];

    for &(resolution, expected) in &cases {
        let mut bench = Bench::new(resolution);

        for _ in 0..5 {
            bench.cycle_cw(5_000);
        }
        assert_eq!(bench.position(), expected, "{:?} cw", resolution);

        for _ in 0..5 {
            bench.cycle_ccw(5_000);
        }
        assert_eq!(bench.position(), 0, "{:?} back ccw", resolution);
    }
}

#[test]
fn contact_bounce_is_absorbed() {
    let mut bench = Bench::new(Resolution::Double);

    bench.cycle_cw(5_000);
    assert_eq!(bench.position(), 2);

    // Channel A falls and the contact bounces twice within the holdoff
    // window. Only the legitimate transition counts.
    bench.edge(Channel::A, 5_000);
    assert_eq!(bench.position(), 3);
    bench.edge(Channel::A, 30);
    bench.edge(Channel::A, 30);
    assert_eq!(bench.position(), 3);

    // The rotation continues undisturbed.
    bench.edge(Channel::B, 5_000);
    bench.edge(Channel::A, 5_000);
    bench.edge(Channel::B, 5_000);
    assert_eq!(bench.position(), 4);
}

#[test]
fn missed_edge_is_recovered_through_holdoff() {
    let mut bench = Bench::new(Resolution::Double);

    bench.cycle_cw(5_000);
    bench.edge(Channel::A, 5_000);
    assert_eq!(bench.position(), 3);

    // The next B edge never reaches the handler.
    bench.glitch(Channel::B, 5_000);

    bench.edge(Channel::A, 5_000);
    assert_eq!(bench.position(), 4);
}

#[test]
fn recovery_works_across_timestamp_wrap() {
    let mut bench = Bench::new(Resolution::Double);

    bench.cycle_cw(5_000);
    assert_eq!(bench.position(), 2);

    // Park the clock just below the wrap point before the next A edge.
    bench.signal.now.set(u32::MAX - 2_000);
    bench.edge(Channel::A, 0);
    assert_eq!(bench.position(), 3);

    bench.glitch(Channel::B, 1_000);

    // The clock wraps between the two A edges; the elapsed-time check
    // still sees 5000µs and recovers.
    bench.edge(Channel::A, 4_000);
    assert_eq!(bench.position(), 4);
}

#[test]
fn lock_shares_the_decoder_with_handler_context() {
    let signal = Signal::idle();
    let decoder = QuadratureDecoder::new(signal.clone(), signal.clone(), Resolution::Standard);
    let lock = Lock::new(decoder);
    let isr_handle = lock.clone();

    signal.a.set(false);
    critical_section::with(|cs| {
        isr_handle.get(cs).on_edge_a();
    });

    // The foreground reads through the original handle, no critical
    // section needed.
    assert_eq!(lock.read().position(), 1);

    // Locks are meant to live in statics; dropping would panic.
    std::mem::forget(isr_handle);
    std::mem::forget(lock);
}
