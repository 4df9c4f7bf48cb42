//! Storage for the position counter that is safe to read outside the edge
//! handlers.
//!
//! Two strategies, resolved at build time. Targets with native atomic
//! 32-bit access use a plain relaxed atomic. Narrower targets fall back to
//! touching the value inside a critical section, the portable equivalent
//! of suspending interrupts around the access.

#[cfg(target_has_atomic = "32")]
mod imp {
    use core::sync::atomic::{AtomicI32, Ordering};

    pub struct PositionCell(AtomicI32);

    impl PositionCell {
        pub const fn new(value: i32) -> Self {
            PositionCell(AtomicI32::new(value))
        }

        pub fn read(&self) -> i32 {
            self.0.load(Ordering::Relaxed)
        }

        /// Add `delta` and return the new value. Wraps at the extremes.
        pub fn add(&self, delta: i32) -> i32 {
            self.0.fetch_add(delta, Ordering::Relaxed).wrapping_add(delta)
        }
    }
}

#[cfg(not(target_has_atomic = "32"))]
mod imp {
    use core::cell::Cell;

    pub struct PositionCell(Cell<i32>);

    // Safety: every access goes through a critical section, so two
    // execution contexts can never touch the cell at the same time.
    unsafe impl Sync for PositionCell {}

    impl PositionCell {
        pub const fn new(value: i32) -> Self {
            PositionCell(Cell::new(value))
        }

        pub fn read(&self) -> i32 {
            critical_section::with(|_| self.0.get())
        }

        /// Add `delta` and return the new value. Wraps at the extremes.
        pub fn add(&self, delta: i32) -> i32 {
            critical_section::with(|_| {
                let value = self.0.get().wrapping_add(delta);
                self.0.set(value);
                value
            })
        }
    }
}

pub use self::imp::PositionCell;
