//! A "lock" based on critical sections, for sharing one decoder between
//! the two edge interrupt handlers and foreground code.

use core::cell::UnsafeCell;
use core::fmt;
use core::ops::Deref;
use core::ops::DerefMut;

use critical_section::CriticalSection;

/// Critical-section guarded container.
///
/// One instance holds the actual data; clones are cheap pointers back to
/// it, which is how the same decoder ends up reachable from both ISRs and
/// the foreground.
///
/// # Safety
///
/// * Only sound on single-core systems, where a critical section excludes
///   every other execution context.
/// * Instances must live for the whole program. Dropping one panics; a
///   `static` (where statics never drop) is the natural home.
pub struct Lock<T> {
    inner: Inner<T>,
}

// Safety: mutation goes through critical sections, and anything read via
// `read` must itself tolerate a concurrent handler write.
unsafe impl<T: Send> Sync for Lock<T> {}

/// One instance is the _actual_ data, every clone is a pointer back to it.
/// The `UnsafeCell` makes the interior mutability visible to the compiler,
/// so a `static` instance is not placed in read-only memory.
enum Inner<T> {
    Instance(UnsafeCell<T>),
    Pointer(*mut T),
}

impl<T: Unpin> Lock<T> {
    /// Create a new instance of a lock. `const`, so the instance can be
    /// bound directly in a `static`, typically wrapping an `Option` filled
    /// in during setup.
    pub const fn new(value: T) -> Self {
        Lock {
            inner: Inner::Instance(UnsafeCell::new(value)),
        }
    }
}

impl<T> Lock<T> {
    fn as_ptr(&self) -> *mut T {
        match &self.inner {
            Inner::Instance(i) => i.get(),
            Inner::Pointer(p) => *p,
        }
    }

    /// Mutable access for the duration of the critical section.
    pub fn get<'cs>(&self, _cs: CriticalSection<'cs>) -> LockGuard<'cs, T> {
        // Within a critical section on a single core there can be no other
        // live reference into the data, so handing out this mutable
        // reference for the lifetime of the section is fine.
        let data = unsafe { &mut *self.as_ptr() };
        LockGuard { data }
    }

    /// Read the value without entering a critical section.
    ///
    /// Anything reached through this reference must itself be safe against
    /// a concurrent handler write, like
    /// [`PositionCell`](crate::PositionCell).
    pub fn read(&self) -> &T {
        unsafe { &*self.as_ptr() }
    }
}

/// Cloning hands out a pointer to the original, not a copy of the data.
impl<T> Clone for Lock<T> {
    fn clone(&self) -> Self {
        Lock {
            inner: Inner::Pointer(self.as_ptr()),
        }
    }
}

/// Locks must live for the entire lifetime of the program.
impl<T> Drop for Lock<T> {
    fn drop(&mut self) {
        panic!("Lock instances are not allowed to drop");
    }
}

pub struct LockGuard<'cs, T> {
    data: &'cs mut T,
}

impl<'cs, T> Deref for LockGuard<'cs, T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.data
    }
}

impl<'cs, T> DerefMut for LockGuard<'cs, T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.data
    }
}

impl<T: fmt::Debug> fmt::Debug for LockGuard<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&**self, f)
    }
}
