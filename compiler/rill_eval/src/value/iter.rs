//! Single-pass iterators over values.

use std::fmt;

use super::Value;

/// A lazy, non-restartable sequence of values.
pub struct ValueIter {
    inner: Box<dyn Iterator<Item = Value>>,
}

impl ValueIter {
    pub fn new(iter: impl Iterator<Item = Value> + 'static) -> Self {
        ValueIter {
            inner: Box::new(iter),
        }
    }
}

impl Iterator for ValueIter {
    type Item = Value;

    fn next(&mut self) -> Option<Value> {
        self.inner.next()
    }
}

impl fmt::Debug for ValueIter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ValueIter")
    }
}
