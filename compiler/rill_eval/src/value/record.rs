//! Record instances.

use rill_ir::Name;
use rustc_hash::FxHashMap;

use super::Value;

/// Field values of one record instance. Unset fields are absent.
#[derive(Clone, Debug, Default)]
pub struct RecordValue {
    fields: FxHashMap<Name, Value>,
}

impl RecordValue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: Name) -> Option<&Value> {
        self.fields.get(&field)
    }

    /// Set a field, returning the value it replaces.
    pub fn put(&mut self, field: Name, value: Value) -> Option<Value> {
        self.fields.insert(field, value)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Name, &Value)> {
        self.fields.iter().map(|(k, v)| (*k, v))
    }
}
