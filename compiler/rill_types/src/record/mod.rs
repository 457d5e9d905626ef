//! Record field tables.

use rill_ir::Name;
use rustc_hash::FxHashMap;

use crate::TypeId;

/// One declared field.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct FieldDef {
    pub name: Name,
    pub ty: TypeId,
    /// Copied from a parent record rather than declared here.
    pub inherited: bool,
}

/// Field table of a record type, in declaration order.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RecordDef {
    fields: Vec<FieldDef>,
    index: FxHashMap<Name, usize>,
}

impl RecordDef {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: Name) -> Option<&FieldDef> {
        self.index.get(&name).map(|&i| &self.fields[i])
    }

    pub fn field_type(&self, name: Name) -> Option<TypeId> {
        self.get(name).map(|f| f.ty)
    }

    pub fn contains(&self, name: Name) -> bool {
        self.index.contains_key(&name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldDef> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Declare a field. An inherited field is overridden by its own
    /// declaration; declaring an own field twice fails and returns `false`.
    pub(crate) fn declare(&mut self, name: Name, ty: TypeId) -> bool {
        match self.index.get(&name) {
            Some(&i) if self.fields[i].inherited => {
                self.fields[i] = FieldDef {
                    name,
                    ty,
                    inherited: false,
                };
                true
            }
            Some(_) => false,
            None => {
                self.push(FieldDef {
                    name,
                    ty,
                    inherited: false,
                });
                true
            }
        }
    }

    /// Copy fields of a parent record that are not declared here.
    pub(crate) fn inherit(&mut self, parent: &RecordDef) {
        for field in &parent.fields {
            if !self.index.contains_key(&field.name) {
                self.push(FieldDef {
                    inherited: true,
                    ..*field
                });
            }
        }
    }

    pub(crate) fn clear(&mut self) {
        self.fields.clear();
        self.index.clear();
    }

    fn push(&mut self, field: FieldDef) {
        self.index.insert(field.name, self.fields.len());
        self.fields.push(field);
    }
}
