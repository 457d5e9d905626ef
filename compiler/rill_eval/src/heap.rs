//! Shared ownership of heap payloads.
//!
//! `Heap<T>` wraps `Rc<T>` and is the only way a value payload owns heap
//! memory. Copying a value clones the handle (one more reference);
//! dropping a value releases it and frees the object with the last
//! reference. Types that need teardown beyond freeing memory get it from
//! their own `Drop`.
//!
//! The runtime is single-threaded, so the count is a plain `Rc` count.

use std::fmt;
use std::ops::Deref;
use std::rc::Rc;

/// A reference-counted heap payload.
#[repr(transparent)]
pub struct Heap<T: ?Sized>(Rc<T>);

impl<T> Heap<T> {
    /// Allocate a new payload. Only value constructors call this.
    #[inline]
    pub(crate) fn new(value: T) -> Self {
        Heap(Rc::new(value))
    }
}

impl<T: ?Sized> Heap<T> {
    #[inline]
    pub(crate) fn from_rc(rc: Rc<T>) -> Self {
        Heap(rc)
    }

    /// Number of live references, this one included.
    #[inline]
    pub fn refs(&self) -> usize {
        Rc::strong_count(&self.0)
    }

    /// Identity comparison.
    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl<T: ?Sized> Deref for Heap<T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T: ?Sized> Clone for Heap<T> {
    #[inline]
    fn clone(&self) -> Self {
        Heap(Rc::clone(&self.0))
    }
}

impl<T: ?Sized + fmt::Debug> fmt::Debug for Heap<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
