//! Registry of all runtime types.
//!
//! # Design
//!
//! - Entries live in a `Vec` indexed by tag; names map to tags through an
//!   `FxHashMap` for O(1) lookup.
//! - Each entry stores its ancestor closure (itself included). A derive
//!   edge ORs the parent's closure into the child and into every type
//!   that already has the child as an ancestor, so subtype queries are a
//!   single bit test.
//! - `generation` changes whenever the relation changes, letting dispatch
//!   caches notice stale answers.

use rill_ir::{Name, SharedInterner};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::{AncestorSet, Capabilities, RecordDef, TypeError, TypeId};

/// A registered type.
#[derive(Clone, Debug)]
pub struct TypeEntry {
    pub name: Name,
    pub id: TypeId,
    /// Abstract supertype; never the type of a concrete value.
    pub is_trait: bool,
    /// Direct parents in derive order.
    pub parents: SmallVec<[TypeId; 4]>,
    pub caps: Capabilities,
    ancestors: AncestorSet,
    record: Option<RecordDef>,
}

impl TypeEntry {
    pub fn ancestors(&self) -> &AncestorSet {
        &self.ancestors
    }

    pub fn record(&self) -> Option<&RecordDef> {
        self.record.as_ref()
    }

    pub fn is_record(&self) -> bool {
        self.record.is_some()
    }
}

/// Registry for all types, built-in and user-defined.
#[derive(Debug)]
pub struct TypeRegistry {
    interner: SharedInterner,
    entries: Vec<TypeEntry>,
    by_name: FxHashMap<Name, TypeId>,
    generation: u64,
}

impl TypeRegistry {
    pub fn new(interner: SharedInterner) -> Self {
        TypeRegistry {
            interner,
            entries: Vec::new(),
            by_name: FxHashMap::default(),
            generation: 0,
        }
    }

    /// Register a concrete type deriving from `parents`.
    pub fn register(&mut self, name: &str, parents: &[TypeId]) -> Result<TypeId, TypeError> {
        self.insert(name, parents, false, None)
    }

    /// Register a trait deriving from `parents`.
    pub fn register_trait(
        &mut self,
        name: &str,
        parents: &[TypeId],
    ) -> Result<TypeId, TypeError> {
        self.insert(name, parents, true, None)
    }

    /// Register a record type with an empty field table.
    ///
    /// Record parents are added later with [`Self::derive`], which also
    /// copies their fields.
    pub fn register_record(
        &mut self,
        name: &str,
        parents: &[TypeId],
    ) -> Result<TypeId, TypeError> {
        self.insert(name, parents, false, Some(RecordDef::new()))
    }

    fn insert(
        &mut self,
        name: &str,
        parents: &[TypeId],
        is_trait: bool,
        record: Option<RecordDef>,
    ) -> Result<TypeId, TypeError> {
        let sym = self.interner.intern(name);
        if self.by_name.contains_key(&sym) {
            return Err(TypeError::DuplicateType {
                name: name.to_owned(),
            });
        }
        for &parent in parents {
            self.check(parent)?;
        }

        let raw = u32::try_from(self.entries.len()).map_err(|_| TypeError::UnknownType {
            name: name.to_owned(),
        })?;
        let id = TypeId::from_raw(raw);
        let caps = if record.is_some() {
            Capabilities::RECORD
        } else {
            Capabilities::empty()
        };
        self.entries.push(TypeEntry {
            name: sym,
            id,
            is_trait,
            parents: SmallVec::new(),
            caps,
            ancestors: AncestorSet::single(id),
            record,
        });
        self.by_name.insert(sym, id);
        debug!(ty = name, tag = raw, is_trait, "registered type");

        for &parent in parents {
            // A fresh type has no descendants, so no edge into it can cycle.
            self.derive(id, parent)?;
        }
        Ok(id)
    }

    /// Add a derive edge `child -> parent`.
    ///
    /// Deriving from an existing parent is a no-op. Record children inherit
    /// the fields of record parents.
    pub fn derive(&mut self, child: TypeId, parent: TypeId) -> Result<(), TypeError> {
        self.check(child)?;
        self.check(parent)?;
        if self.is_subtype(parent, child) {
            return Err(TypeError::CycleDetected {
                child: self.name(child).to_owned(),
                parent: self.name(parent).to_owned(),
            });
        }
        if self.entries[child.index()].parents.contains(&parent) {
            return Ok(());
        }

        self.entries[child.index()].parents.push(parent);
        let closure = self.entries[parent.index()].ancestors.clone();
        let mut touched = 0usize;
        for entry in &mut self.entries {
            if entry.ancestors.contains(child) && entry.ancestors.union_with(&closure) {
                touched += 1;
            }
        }

        if let Some(parent_fields) = self.entries[parent.index()].record.clone() {
            if let Some(fields) = self.entries[child.index()].record.as_mut() {
                fields.inherit(&parent_fields);
            }
        }

        self.generation += 1;
        trace!(
            child = self.name(child),
            parent = self.name(parent),
            touched,
            "derived"
        );
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Option<TypeId> {
        self.interner
            .get(name)
            .and_then(|sym| self.by_name.get(&sym).copied())
    }

    pub fn lookup_name(&self, name: Name) -> Option<TypeId> {
        self.by_name.get(&name).copied()
    }

    /// `true` iff `ancestor` is `ty` or reachable through parent edges.
    #[inline]
    pub fn is_subtype(&self, ty: TypeId, ancestor: TypeId) -> bool {
        self.entries
            .get(ty.index())
            .is_some_and(|e| e.ancestors.contains(ancestor))
    }

    /// Declare a field on a record type.
    pub fn add_field(&mut self, rec: TypeId, field: Name, ty: TypeId) -> Result<(), TypeError> {
        self.check(ty)?;
        let fields = self.record_mut(rec)?;
        if !fields.declare(field, ty) {
            return Err(TypeError::DuplicateField {
                record: self.name(rec).to_owned(),
                field: self.interner.lookup(field).to_owned(),
            });
        }
        Ok(())
    }

    /// Clear a record's field table in place. Tag, name and parent edges
    /// are kept.
    pub fn reinit(&mut self, rec: TypeId) -> Result<(), TypeError> {
        self.record_mut(rec)?.clear();
        debug!(ty = self.name(rec), "reinit record");
        Ok(())
    }

    pub fn record(&self, rec: TypeId) -> Option<&RecordDef> {
        self.entries.get(rec.index()).and_then(TypeEntry::record)
    }

    fn record_mut(&mut self, rec: TypeId) -> Result<&mut RecordDef, TypeError> {
        self.check(rec)?;
        let name = self.name(rec);
        self.entries[rec.index()]
            .record
            .as_mut()
            .ok_or_else(|| TypeError::NotARecord {
                name: name.to_owned(),
            })
    }

    pub fn set_capabilities(&mut self, ty: TypeId, caps: Capabilities) -> Result<(), TypeError> {
        self.check(ty)?;
        self.entries[ty.index()].caps = caps;
        Ok(())
    }

    pub fn capabilities(&self, ty: TypeId) -> Capabilities {
        self.entries
            .get(ty.index())
            .map_or(Capabilities::empty(), |e| e.caps)
    }

    pub fn has(&self, ty: TypeId, cap: Capabilities) -> bool {
        self.capabilities(ty).contains(cap)
    }

    pub fn get(&self, ty: TypeId) -> Option<&TypeEntry> {
        self.entries.get(ty.index())
    }

    /// Type name. Foreign handles render as `?`.
    pub fn name(&self, ty: TypeId) -> &'static str {
        self.entries
            .get(ty.index())
            .map_or("?", |e| self.interner.lookup(e.name))
    }

    pub fn is_trait(&self, ty: TypeId) -> bool {
        self.entries.get(ty.index()).is_some_and(|e| e.is_trait)
    }

    /// Bumped by every new derive edge.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn interner(&self) -> &SharedInterner {
        &self.interner
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries in tag order.
    pub fn iter(&self) -> impl Iterator<Item = &TypeEntry> {
        self.entries.iter()
    }

    fn check(&self, ty: TypeId) -> Result<(), TypeError> {
        if ty.index() < self.entries.len() {
            Ok(())
        } else {
            Err(TypeError::UnknownType {
                name: ty.to_string(),
            })
        }
    }
}
