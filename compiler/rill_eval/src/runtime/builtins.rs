//! Built-in type hierarchy.
//!
//! ```text
//! Opt ─┬─ Nil
//!      └─ A ─┬─ Cmp ─┬─ Num ─┬─ Int
//!            │       │       └─ Rat
//!            │       ├─ Char
//!            │       ├─ Str (also Seq)
//!            │       └─ Vect (also Seq)
//!            ├─ Seq ─── Table, Iter
//!            ├─ Rec (also Cmp)
//!            └─ Meta, Bool, Sym, Guid, Func, Fimp, Lambda
//! ```

use rill_types::{Capabilities as C, TypeError, TypeId, TypeRegistry};
use uuid::Uuid;

use crate::value::{Payload, Rat, Table};
use crate::Value;

/// Tags of the built-in types.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Builtins {
    pub opt_type: TypeId,
    pub any_type: TypeId,
    pub cmp_type: TypeId,
    pub seq_type: TypeId,
    pub num_type: TypeId,
    pub rec_type: TypeId,
    pub nil_type: TypeId,
    pub meta_type: TypeId,
    pub bool_type: TypeId,
    pub int_type: TypeId,
    pub rat_type: TypeId,
    pub char_type: TypeId,
    pub str_type: TypeId,
    pub sym_type: TypeId,
    pub guid_type: TypeId,
    pub vect_type: TypeId,
    pub table_type: TypeId,
    pub iter_type: TypeId,
    pub func_type: TypeId,
    pub fimp_type: TypeId,
    pub lambda_type: TypeId,
}

impl Builtins {
    /// Register the hierarchy into an empty registry.
    pub fn register(types: &mut TypeRegistry) -> Result<Self, TypeError> {
        let opt_type = types.register_trait("Opt", &[])?;
        let any_type = types.register_trait("A", &[opt_type])?;
        let cmp_type = types.register_trait("Cmp", &[any_type])?;
        let seq_type = types.register_trait("Seq", &[any_type])?;
        let num_type = types.register_trait("Num", &[cmp_type])?;
        let rec_type = types.register_trait("Rec", &[any_type, cmp_type])?;

        let mut concrete = |name: &str, parents: &[TypeId], caps: C| {
            let ty = types.register(name, parents)?;
            types.set_capabilities(ty, caps)?;
            Ok::<_, TypeError>(ty)
        };

        let fmt = C::FORMAT;
        Ok(Builtins {
            opt_type,
            any_type,
            cmp_type,
            seq_type,
            num_type,
            rec_type,
            nil_type: concrete("Nil", &[opt_type], C::EQUID | C::OK | fmt)?,
            meta_type: concrete("Meta", &[any_type], C::EQUID | fmt)?,
            bool_type: concrete("Bool", &[any_type], C::NEW | C::EQUID | C::CMP | C::OK | fmt)?,
            int_type: concrete(
                "Int",
                &[num_type],
                C::NEW | C::EQUID | C::CMP | C::OK | C::ITER | fmt,
            )?,
            rat_type: concrete("Rat", &[num_type], C::EQUID | C::CMP | C::OK | fmt)?,
            char_type: concrete("Char", &[cmp_type], C::EQUID | C::CMP | fmt)?,
            str_type: concrete(
                "Str",
                &[cmp_type, seq_type],
                C::EQUID | C::EQVAL | C::CMP | C::OK | C::ITER | fmt,
            )?,
            sym_type: concrete("Sym", &[any_type], C::EQUID | C::CMP | fmt)?,
            guid_type: concrete("Guid", &[any_type], C::NEW | C::EQUID | C::CMP | fmt)?,
            vect_type: concrete(
                "Vect",
                &[cmp_type, seq_type],
                C::NEW | C::CLONE | C::EQUID | C::EQVAL | C::CMP | C::OK | C::ITER | fmt,
            )?,
            table_type: concrete(
                "Table",
                &[seq_type],
                C::NEW | C::CLONE | C::EQUID | C::EQVAL | C::OK | C::ITER | fmt,
            )?,
            iter_type: concrete("Iter", &[seq_type], C::EQUID | C::ITER | C::DUMP)?,
            func_type: concrete("Func", &[any_type], C::EQUID | C::CALL | fmt)?,
            fimp_type: concrete("Fimp", &[any_type], C::EQUID | C::CALL | fmt)?,
            lambda_type: concrete("Lambda", &[any_type], C::EQUID | C::CALL | C::DUMP)?,
        })
    }

    /// Default value of a built-in type with `NEW`.
    pub(crate) fn default_value(&self, ty: TypeId) -> Option<Value> {
        Some(match ty {
            t if t == self.bool_type => self.boolean(false),
            t if t == self.int_type => self.int(0),
            t if t == self.guid_type => self.guid(Uuid::new_v4()),
            t if t == self.vect_type => self.vect(Vec::new()),
            t if t == self.table_type => Value::table(ty, Table::new()),
            _ => return None,
        })
    }

    pub fn nil(&self) -> Value {
        Value::new(self.nil_type, Payload::Nil)
    }

    pub fn boolean(&self, b: bool) -> Value {
        Value::new(self.bool_type, Payload::Bool(b))
    }

    pub fn int(&self, n: i64) -> Value {
        Value::new(self.int_type, Payload::Int(n))
    }

    pub fn rat(&self, r: Rat) -> Value {
        Value::new(self.rat_type, Payload::Rat(r))
    }

    pub fn char(&self, c: char) -> Value {
        Value::new(self.char_type, Payload::Char(c))
    }

    pub fn string(&self, s: &str) -> Value {
        Value::string(self.str_type, s)
    }

    pub fn sym(&self, name: rill_ir::Name) -> Value {
        Value::new(self.sym_type, Payload::Sym(name))
    }

    pub fn guid(&self, id: Uuid) -> Value {
        Value::new(self.guid_type, Payload::Guid(id))
    }

    pub fn meta(&self, ty: TypeId) -> Value {
        Value::new(self.meta_type, Payload::Meta(ty))
    }

    pub fn vect(&self, items: Vec<Value>) -> Value {
        Value::vect(self.vect_type, items)
    }
}
