//! Rendering values as text.
//!
//! - `write` is re-readable source: `'abc'`, `` `sym ``, `([1 2])`.
//! - `dump` reveals implementation detail, such as live reference counts
//!   (`[1 2]@3`).
//! - `print` is the user-facing form: strings unquoted, vectors
//!   concatenated.

use std::fmt::Write;

use rill_stack::ensure_sufficient_stack;
use rill_types::Capabilities;

use super::{OpResult, ValueOps};
use crate::value::{HeapObject, Payload};
use crate::Value;

/// Rendering mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Render {
    Write,
    Dump,
    Print,
}

impl Render {
    fn capability(self) -> Capabilities {
        match self {
            Render::Write => Capabilities::WRITE,
            Render::Dump => Capabilities::DUMP,
            Render::Print => Capabilities::PRINT,
        }
    }
}

impl ValueOps<'_> {
    pub fn write(&self, v: &Value, out: &mut String) -> OpResult<()> {
        self.render(v, Render::Write, out)
    }

    pub fn dump(&self, v: &Value, out: &mut String) -> OpResult<()> {
        self.render(v, Render::Dump, out)
    }

    pub fn print(&self, v: &Value, out: &mut String) -> OpResult<()> {
        self.render(v, Render::Print, out)
    }

    pub fn render_to_string(&self, v: &Value, mode: Render) -> OpResult<String> {
        let mut out = String::new();
        self.render(v, mode, &mut out)?;
        Ok(out)
    }

    pub fn render(&self, v: &Value, mode: Render, out: &mut String) -> OpResult<()> {
        self.require(v, mode.capability())?;
        ensure_sufficient_stack(|| self.render_payload(v, mode, out))
    }

    /// Elements rendered one after another, separated by `sep`.
    fn render_seq<'v>(
        &self,
        items: impl Iterator<Item = &'v Value>,
        mode: Render,
        sep: &str,
        out: &mut String,
    ) -> OpResult<()> {
        for (i, item) in items.enumerate() {
            if i > 0 {
                out.push_str(sep);
            }
            self.render(item, mode, out)?;
        }
        Ok(())
    }

    fn render_payload(&self, v: &Value, mode: Render, out: &mut String) -> OpResult<()> {
        let interner = self.types.interner();
        match v.payload() {
            Payload::Nil => out.push_str("#nil"),
            Payload::Bool(b) => out.push_str(if *b { "#t" } else { "#f" }),
            Payload::Int(n) => {
                let _ = write!(out, "{n}");
            }
            Payload::Rat(r) => {
                let _ = write!(out, "{r}");
            }
            Payload::Char(c) => match mode {
                Render::Print => out.push(*c),
                Render::Write | Render::Dump => {
                    out.push('\\');
                    out.push(*c);
                }
            },
            Payload::Str(s) => match mode {
                Render::Print => out.push_str(s),
                Render::Write | Render::Dump => {
                    let _ = write!(out, "'{}'", &**s);
                }
            },
            Payload::Sym(name) => {
                if mode != Render::Print {
                    out.push('`');
                }
                out.push_str(interner.lookup(*name));
            }
            Payload::Guid(id) => match mode {
                Render::Write => {
                    let _ = write!(out, "'{id}' guid");
                }
                Render::Dump | Render::Print => {
                    let _ = write!(out, "{id}");
                }
            },
            Payload::Meta(ty) => out.push_str(self.types.name(*ty)),
            Payload::Func(name) => {
                let _ = write!(out, "&{}", interner.lookup(*name));
            }
            Payload::Fimp(imp) => {
                let _ = write!(out, "&{}<{}>", interner.lookup(imp.func), imp.signature);
            }
            Payload::Vect(items) => {
                let items = items.borrow();
                match mode {
                    Render::Write => {
                        out.push_str("([");
                        self.render_seq(items.iter(), mode, " ", out)?;
                        out.push_str("])");
                    }
                    Render::Dump => {
                        out.push('[');
                        self.render_seq(items.iter(), mode, " ", out)?;
                        out.push(']');
                    }
                    Render::Print => self.render_seq(items.iter(), mode, "", out)?,
                }
            }
            Payload::Table(t) => {
                out.push('{');
                for (i, (key, val)) in t.borrow().entries().iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    self.render(key, mode, out)?;
                    out.push(' ');
                    self.render(val, mode, out)?;
                }
                out.push('}');
            }
            Payload::Rec(r) => {
                let r = r.borrow();
                let _ = write!(out, "({}", self.types.name(v.ty()));
                if let Some(def) = self.types.record(v.ty()) {
                    for field in def.iter() {
                        if let Some(value) = r.get(field.name) {
                            let _ = write!(out, " {} ", interner.lookup(field.name));
                            self.render(value, mode, out)?;
                        }
                    }
                }
                out.push(')');
            }
            Payload::Lambda(l) => {
                let _ = write!(out, "Lambda({}:{})", l.code.start, l.code.len);
            }
            Payload::Iter(_) => out.push_str(self.types.name(v.ty())),
            Payload::Object(o) => {
                let r = match mode {
                    Render::Write => o.write(out),
                    Render::Dump => HeapObject::dump(&**o, out),
                    Render::Print => HeapObject::print(&**o, out),
                };
                return self.lift(v, mode.capability(), r);
            }
        }
        if mode == Render::Dump {
            if let Some(refs) = v.refs() {
                if !matches!(v.payload(), Payload::Str(_) | Payload::Fimp(_)) {
                    let _ = write!(out, "@{refs}");
                }
            }
        }
        Ok(())
    }
}
