//! The value ownership protocol.
//!
//! Copy and teardown are `Value::clone` and `Drop`. Everything else a type
//! may or may not support goes through [`ValueOps`], which checks the
//! type's capability flags first: a missing capability is an
//! `UnsupportedOperation` error, never a fallback guess. There are two
//! exceptions: `clone` of a type without deep clone is a copy, and
//! `eqval` of a type without structural equality is identity.
//!
//! Container operations recurse through contained values, guarded by
//! `ensure_sufficient_stack`.

mod format;

use std::cell::RefCell;
use std::cmp::Ordering;

use rill_stack::ensure_sufficient_stack;
use rill_types::{Capabilities, TypeRegistry};

pub use format::Render;

use crate::errors::{type_mismatch, unsupported};
use crate::runtime::Builtins;
use crate::value::{HeapObject, Payload, RecordValue, Table, Unsupported, ValueIter};
use crate::{EvalErrorKind, Heap, Value};

type OpResult<T> = Result<T, EvalErrorKind>;

/// Value operations against one type registry.
#[derive(Clone, Copy)]
pub struct ValueOps<'a> {
    pub types: &'a TypeRegistry,
    pub builtins: &'a Builtins,
}

impl<'a> ValueOps<'a> {
    pub fn new(types: &'a TypeRegistry, builtins: &'a Builtins) -> Self {
        ValueOps { types, builtins }
    }

    fn require(&self, v: &Value, cap: Capabilities) -> OpResult<()> {
        if self.types.has(v.ty(), cap) {
            Ok(())
        } else {
            Err(self.unsupported(v, cap))
        }
    }

    fn unsupported(&self, v: &Value, cap: Capabilities) -> EvalErrorKind {
        unsupported(cap.op_name(), self.types.name(v.ty()))
    }

    fn lift<T>(&self, v: &Value, cap: Capabilities, r: Result<T, Unsupported>) -> OpResult<T> {
        r.map_err(|Unsupported| self.unsupported(v, cap))
    }

    /// Identity: same scalar, or same heap object.
    pub fn equid(&self, a: &Value, b: &Value) -> OpResult<bool> {
        self.require(a, Capabilities::EQUID)?;
        if a.ty() != b.ty() {
            return Ok(false);
        }
        Ok(match (a.payload(), b.payload()) {
            (Payload::Nil, Payload::Nil) => true,
            (Payload::Bool(x), Payload::Bool(y)) => x == y,
            (Payload::Int(x), Payload::Int(y)) => x == y,
            (Payload::Rat(x), Payload::Rat(y)) => x == y,
            (Payload::Char(x), Payload::Char(y)) => x == y,
            (Payload::Guid(x), Payload::Guid(y)) => x == y,
            (Payload::Sym(x), Payload::Sym(y)) => x == y,
            (Payload::Meta(x), Payload::Meta(y)) => x == y,
            (Payload::Func(x), Payload::Func(y)) => x == y,
            (Payload::Fimp(x), Payload::Fimp(y)) => x.ptr_eq(y),
            (Payload::Str(x), Payload::Str(y)) => x.ptr_eq(y),
            (Payload::Vect(x), Payload::Vect(y)) => x.ptr_eq(y),
            (Payload::Table(x), Payload::Table(y)) => x.ptr_eq(y),
            (Payload::Rec(x), Payload::Rec(y)) => x.ptr_eq(y),
            (Payload::Lambda(x), Payload::Lambda(y)) => x.ptr_eq(y),
            (Payload::Iter(x), Payload::Iter(y)) => x.ptr_eq(y),
            (Payload::Object(x), Payload::Object(y)) => x.ptr_eq(y),
            _ => false,
        })
    }

    /// Structural equality, recursing through contained values.
    pub fn eqval(&self, a: &Value, b: &Value) -> OpResult<bool> {
        if !self.types.has(a.ty(), Capabilities::EQVAL) {
            if self.types.has(a.ty(), Capabilities::EQUID) {
                return self.equid(a, b);
            }
            return Err(self.unsupported(a, Capabilities::EQVAL));
        }
        if a.ty() != b.ty() {
            return Ok(false);
        }
        ensure_sufficient_stack(|| self.eqval_payload(a, b))
    }

    fn eqval_payload(&self, a: &Value, b: &Value) -> OpResult<bool> {
        match (a.payload(), b.payload()) {
            (Payload::Str(x), Payload::Str(y)) => Ok(**x == **y),
            (Payload::Vect(x), Payload::Vect(y)) => {
                if x.ptr_eq(y) {
                    return Ok(true);
                }
                let (x, y) = (x.borrow(), y.borrow());
                self.eqval_all(x.iter(), y.iter(), x.len() == y.len())
            }
            (Payload::Table(x), Payload::Table(y)) => {
                if x.ptr_eq(y) {
                    return Ok(true);
                }
                let (x, y) = (x.borrow(), y.borrow());
                if x.len() != y.len() {
                    return Ok(false);
                }
                for ((xk, xv), (yk, yv)) in x.entries().iter().zip(y.entries()) {
                    if !self.eqval(xk, yk)? || !self.eqval(xv, yv)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            (Payload::Rec(x), Payload::Rec(y)) => {
                if x.ptr_eq(y) {
                    return Ok(true);
                }
                let (x, y) = (x.borrow(), y.borrow());
                if x.len() != y.len() {
                    return Ok(false);
                }
                for (field, xv) in x.iter() {
                    match y.get(field) {
                        Some(yv) if self.eqval(xv, yv)? => {}
                        _ => return Ok(false),
                    }
                }
                Ok(true)
            }
            (Payload::Object(x), Payload::Object(y)) => {
                self.lift(a, Capabilities::EQVAL, x.eqval(&**y))
            }
            _ => self.equid(a, b),
        }
    }

    fn eqval_all<'v>(
        &self,
        xs: impl Iterator<Item = &'v Value>,
        ys: impl Iterator<Item = &'v Value>,
        same_len: bool,
    ) -> OpResult<bool> {
        if !same_len {
            return Ok(false);
        }
        for (x, y) in xs.zip(ys) {
            if !self.eqval(x, y)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Three-way ordering between values of the same type.
    pub fn cmp(&self, a: &Value, b: &Value) -> OpResult<Ordering> {
        self.require(a, Capabilities::CMP)?;
        if a.ty() != b.ty() {
            return Err(type_mismatch(
                self.types.name(a.ty()),
                self.types.name(b.ty()),
            ));
        }
        ensure_sufficient_stack(|| self.cmp_payload(a, b))
    }

    fn cmp_payload(&self, a: &Value, b: &Value) -> OpResult<Ordering> {
        Ok(match (a.payload(), b.payload()) {
            (Payload::Bool(x), Payload::Bool(y)) => x.cmp(y),
            (Payload::Int(x), Payload::Int(y)) => x.cmp(y),
            (Payload::Rat(x), Payload::Rat(y)) => x.cmp(y),
            (Payload::Char(x), Payload::Char(y)) => x.cmp(y),
            (Payload::Str(x), Payload::Str(y)) => (**x).cmp(&**y),
            (Payload::Guid(x), Payload::Guid(y)) => x.cmp(y),
            (Payload::Sym(x), Payload::Sym(y)) => {
                let interner = self.types.interner();
                interner.lookup(*x).cmp(interner.lookup(*y))
            }
            (Payload::Vect(x), Payload::Vect(y)) => {
                if x.ptr_eq(y) {
                    return Ok(Ordering::Equal);
                }
                let (x, y) = (x.borrow(), y.borrow());
                for (xe, ye) in x.iter().zip(y.iter()) {
                    match self.cmp(xe, ye)? {
                        Ordering::Equal => {}
                        unequal => return Ok(unequal),
                    }
                }
                x.len().cmp(&y.len())
            }
            (Payload::Object(x), Payload::Object(y)) => {
                return self.lift(a, Capabilities::CMP, HeapObject::cmp(&**x, &**y));
            }
            _ => return Err(self.unsupported(a, Capabilities::CMP)),
        })
    }

    /// Truthiness.
    /// Fails unless `v`'s type can be called.
    pub fn callable(&self, v: &Value) -> OpResult<()> {
        self.require(v, Capabilities::CALL)
    }

    pub fn ok(&self, v: &Value) -> OpResult<bool> {
        self.require(v, Capabilities::OK)?;
        Ok(match v.payload() {
            Payload::Nil => false,
            Payload::Bool(b) => *b,
            Payload::Int(n) => *n != 0,
            Payload::Rat(r) => !r.is_zero(),
            Payload::Str(s) => !s.is_empty(),
            Payload::Vect(items) => !items.borrow().is_empty(),
            Payload::Table(t) => !t.borrow().is_empty(),
            Payload::Rec(r) => !r.borrow().is_empty(),
            Payload::Object(o) => return self.lift(v, Capabilities::OK, o.ok()),
            _ => true,
        })
    }

    /// Deep, independent duplicate. Types without deep clone are copied.
    pub fn deep_clone(&self, v: &Value) -> OpResult<Value> {
        if !self.types.has(v.ty(), Capabilities::CLONE) {
            return Ok(v.clone());
        }
        ensure_sufficient_stack(|| self.clone_payload(v))
    }

    fn clone_payload(&self, v: &Value) -> OpResult<Value> {
        Ok(match v.payload() {
            Payload::Vect(items) => {
                let items = items
                    .borrow()
                    .iter()
                    .map(|item| self.deep_clone(item))
                    .collect::<OpResult<Vec<_>>>()?;
                Value::vect(v.ty(), items)
            }
            Payload::Table(t) => {
                let entries = t
                    .borrow()
                    .entries()
                    .iter()
                    .map(|(k, val)| Ok((self.deep_clone(k)?, self.deep_clone(val)?)))
                    .collect::<OpResult<Vec<_>>>()?;
                Value::table(v.ty(), Table::from_sorted(entries))
            }
            Payload::Rec(r) => {
                let mut copy = RecordValue::new();
                for (field, value) in r.borrow().iter() {
                    copy.put(field, self.deep_clone(value)?);
                }
                Value::record(v.ty(), copy)
            }
            Payload::Object(o) => {
                let cloned = self.lift(v, Capabilities::CLONE, o.clone_object())?;
                Value::new(v.ty(), Payload::Object(Heap::from_rc(cloned)))
            }
            _ => v.clone(),
        })
    }

    /// Lazy iterator over the value's elements.
    ///
    /// Vectors and tables are iterated live: elements pushed before the
    /// iterator reaches the end are seen.
    pub fn iter(&self, v: &Value) -> OpResult<ValueIter> {
        self.require(v, Capabilities::ITER)?;
        let b = *self.builtins;
        Ok(match v.payload() {
            Payload::Int(n) => {
                let int = b.int_type;
                ValueIter::new((0..*n).map(move |i| Value::new(int, Payload::Int(i))))
            }
            Payload::Str(s) => {
                let ch = b.char_type;
                let chars: Vec<char> = s.chars().collect();
                ValueIter::new(
                    chars
                        .into_iter()
                        .map(move |c| Value::new(ch, Payload::Char(c))),
                )
            }
            Payload::Vect(items) => {
                let items = items.clone();
                let mut i = 0;
                ValueIter::new(std::iter::from_fn(move || {
                    let item = items.borrow().get(i).cloned();
                    i += 1;
                    item
                }))
            }
            Payload::Table(t) => {
                let t = t.clone();
                let vect = b.vect_type;
                let mut i = 0;
                ValueIter::new(std::iter::from_fn(move || {
                    let pair = t
                        .borrow()
                        .entries()
                        .get(i)
                        .map(|(k, val)| Value::vect(vect, vec![k.clone(), val.clone()]));
                    i += 1;
                    pair
                }))
            }
            Payload::Iter(it) => {
                let it: Heap<RefCell<ValueIter>> = it.clone();
                ValueIter::new(std::iter::from_fn(move || it.borrow_mut().next()))
            }
            Payload::Object(o) => self.lift(v, Capabilities::ITER, o.iter())?,
            _ => return Err(self.unsupported(v, Capabilities::ITER)),
        })
    }

    /// Key comparator for tables.
    pub fn table_cmp(&self) -> impl FnMut(&Value, &Value) -> OpResult<Ordering> + '_ {
        move |a, b| {
            if a.ty() == b.ty() {
                self.cmp(a, b)
            } else {
                Ok(a.ty().cmp(&b.ty()))
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "Tests can panic")]
mod tests;
