//! Value cells.
//!
//! A [`Value`] pairs a type with a payload. Scalars are stored inline;
//! heap payloads are [`Heap`] handles, so `Value::clone` is the cheap
//! ownership-sharing copy and dropping a value is its teardown. Deep
//! duplication, equality, ordering and rendering need the type registry
//! and live in [`crate::ops`].

mod heap_object;
mod iter;
mod lambda;
mod rational;
mod record;
mod table;

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use rill_ir::Name;
use rill_types::TypeId;
use uuid::Uuid;

pub use heap_object::{HeapObject, Unsupported};
pub use iter::ValueIter;
pub use lambda::Lambda;
pub use rational::Rat;
pub use record::RecordValue;
pub use table::Table;

use crate::func::{CodeRange, ImplRef};
use crate::scope::ScopeRef;
use crate::Heap;

/// Shared, mutable vector storage.
pub type VectRef = Heap<RefCell<Vec<Value>>>;

/// Payload of a value cell.
#[derive(Clone, Debug)]
pub enum Payload {
    Nil,
    Bool(bool),
    Int(i64),
    Rat(Rat),
    Char(char),
    Guid(Uuid),
    Sym(Name),
    /// A type used as a value.
    Meta(TypeId),
    Str(Heap<str>),
    Vect(VectRef),
    Table(Heap<RefCell<Table>>),
    Rec(Heap<RefCell<RecordValue>>),
    Lambda(Heap<Lambda>),
    Func(Name),
    Fimp(ImplRef),
    Iter(Heap<RefCell<ValueIter>>),
    /// Heap type added by library code.
    Object(Heap<dyn HeapObject>),
}

/// A type-tagged value.
#[derive(Clone)]
pub struct Value {
    ty: TypeId,
    payload: Payload,
}

impl Value {
    #[inline]
    pub fn new(ty: TypeId, payload: Payload) -> Self {
        Value { ty, payload }
    }

    pub fn string(ty: TypeId, s: &str) -> Self {
        Value::new(ty, Payload::Str(Heap::from_rc(Rc::from(s))))
    }

    pub fn vect(ty: TypeId, items: Vec<Value>) -> Self {
        Value::new(ty, Payload::Vect(Heap::new(RefCell::new(items))))
    }

    pub fn table(ty: TypeId, table: Table) -> Self {
        Value::new(ty, Payload::Table(Heap::new(RefCell::new(table))))
    }

    pub fn record(ty: TypeId, rec: RecordValue) -> Self {
        Value::new(ty, Payload::Rec(Heap::new(RefCell::new(rec))))
    }

    /// A closure over `scope`. Holds one reference to the scope for as
    /// long as any copy of the value lives.
    pub fn lambda(ty: TypeId, scope: ScopeRef, code: CodeRange) -> Self {
        Value::new(ty, Payload::Lambda(Heap::new(Lambda { scope, code })))
    }

    pub fn iter(ty: TypeId, iter: ValueIter) -> Self {
        Value::new(ty, Payload::Iter(Heap::new(RefCell::new(iter))))
    }

    pub fn object(ty: TypeId, obj: impl HeapObject + 'static) -> Self {
        let rc: Rc<dyn HeapObject> = Rc::new(obj);
        Value::new(ty, Payload::Object(Heap::from_rc(rc)))
    }

    #[inline]
    pub fn ty(&self) -> TypeId {
        self.ty
    }

    #[inline]
    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn into_payload(self) -> Payload {
        self.payload
    }

    /// Live references to the heap payload; `None` for inline payloads.
    pub fn refs(&self) -> Option<usize> {
        match &self.payload {
            Payload::Str(h) => Some(h.refs()),
            Payload::Vect(h) => Some(h.refs()),
            Payload::Table(h) => Some(h.refs()),
            Payload::Rec(h) => Some(h.refs()),
            Payload::Lambda(h) => Some(h.refs()),
            Payload::Iter(h) => Some(h.refs()),
            Payload::Object(h) => Some(h.refs()),
            Payload::Fimp(imp) => Some(imp.refs()),
            _ => None,
        }
    }

    pub fn is_nil(&self) -> bool {
        matches!(self.payload, Payload::Nil)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self.payload {
            Payload::Bool(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self.payload {
            Payload::Int(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match &self.payload {
            Payload::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_sym(&self) -> Option<Name> {
        match self.payload {
            Payload::Sym(name) => Some(name),
            _ => None,
        }
    }

    pub fn as_meta(&self) -> Option<TypeId> {
        match self.payload {
            Payload::Meta(ty) => Some(ty),
            _ => None,
        }
    }

    pub fn as_vect(&self) -> Option<&VectRef> {
        match &self.payload {
            Payload::Vect(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_rec(&self) -> Option<&Heap<RefCell<RecordValue>>> {
        match &self.payload {
            Payload::Rec(r) => Some(r),
            _ => None,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Value({}, {:?})", self.ty, self.payload)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "Tests can panic")]
mod tests;
