//! Ordered tables.

use std::cmp::Ordering;

use super::Value;

/// Map from value to value, kept sorted by key.
///
/// Key order comes from the runtime's `cmp`, which can fail for keys that
/// do not support ordering, so every lookup takes a fallible comparator.
#[derive(Clone, Debug, Default)]
pub struct Table {
    entries: Vec<(Value, Value)>,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    fn find<E>(
        &self,
        key: &Value,
        cmp: &mut impl FnMut(&Value, &Value) -> Result<Ordering, E>,
    ) -> Result<Result<usize, usize>, E> {
        let (mut lo, mut hi) = (0, self.entries.len());
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            match cmp(&self.entries[mid].0, key)? {
                Ordering::Less => lo = mid + 1,
                Ordering::Greater => hi = mid,
                Ordering::Equal => return Ok(Ok(mid)),
            }
        }
        Ok(Err(lo))
    }

    pub fn get<E>(
        &self,
        key: &Value,
        mut cmp: impl FnMut(&Value, &Value) -> Result<Ordering, E>,
    ) -> Result<Option<&Value>, E> {
        Ok(self.find(key, &mut cmp)?.ok().map(|i| &self.entries[i].1))
    }

    /// Insert or replace. Returns the replaced value.
    pub fn put<E>(
        &mut self,
        key: Value,
        val: Value,
        mut cmp: impl FnMut(&Value, &Value) -> Result<Ordering, E>,
    ) -> Result<Option<Value>, E> {
        match self.find(&key, &mut cmp)? {
            Ok(i) => Ok(Some(std::mem::replace(&mut self.entries[i].1, val))),
            Err(i) => {
                self.entries.insert(i, (key, val));
                Ok(None)
            }
        }
    }

    pub fn delete<E>(
        &mut self,
        key: &Value,
        mut cmp: impl FnMut(&Value, &Value) -> Result<Ordering, E>,
    ) -> Result<Option<(Value, Value)>, E> {
        Ok(self
            .find(key, &mut cmp)?
            .ok()
            .map(|i| self.entries.remove(i)))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in key order.
    pub fn entries(&self) -> &[(Value, Value)] {
        &self.entries
    }

    pub(crate) fn from_sorted(entries: Vec<(Value, Value)>) -> Self {
        Table { entries }
    }
}
