//! Built-in functions registered into every runtime.
//!
//! Native actions find their arguments on the current stack, deepest
//! first, and pop them themselves.

use std::cmp::Ordering;

use rill_types::TypeId;
use uuid::Uuid;

use crate::errors::type_mismatch;
use crate::ops::Render;
use crate::value::Payload;
use crate::{EvalErrorKind, EvalResult, Runtime, Value};

pub(crate) fn register(rt: &mut Runtime) -> EvalResult<()> {
    let b = *rt.builtins();
    let opt = b.opt_type;
    let bool_ty = b.bool_type;

    rt.add_native("new", &[("t", b.meta_type)], &[b.any_type], new)?;
    rt.add_native("call", &[("act", b.any_type)], &[], call)?;
    rt.add_native("test", &[("v", opt)], &[], test)?;
    rt.add_native("fail", &[("msg", b.str_type)], &[], fail)?;
    rt.add_native("=", &[("x", opt), ("y", opt)], &[bool_ty], eqval)?;
    rt.add_native("==", &[("x", opt), ("y", opt)], &[bool_ty], equid)?;
    rt.add_native("<", &[("x", b.cmp_type), ("y", b.cmp_type)], &[bool_ty], lt)?;
    rt.add_native(">", &[("x", b.cmp_type), ("y", b.cmp_type)], &[bool_ty], gt)?;
    rt.add_native("?", &[("v", opt)], &[bool_ty], ok)?;
    rt.add_native("clone", &[("v", b.any_type)], &[b.any_type], clone)?;
    rt.add_native("type", &[("v", opt)], &[b.meta_type], type_of)?;
    rt.add_native("is", &[("x", b.meta_type), ("y", b.meta_type)], &[bool_ty], is)?;
    rt.add_native("get", &[("rec", b.rec_type), ("fld", b.sym_type)], &[opt], get)?;
    rt.add_native(
        "put",
        &[("rec", b.rec_type), ("fld", b.sym_type), ("val", opt)],
        &[],
        put,
    )?;
    rt.add_native("guid", &[("s", b.str_type)], &[b.guid_type], guid)?;
    rt.add_native("str", &[("id", b.guid_type)], &[b.str_type], guid_str)?;
    rt.add_native("len", &[("v", b.vect_type)], &[b.int_type], len)?;
    rt.add_native("push", &[("v", b.vect_type), ("x", opt)], &[], push)?;
    rt.add_native("pop", &[("v", b.vect_type)], &[opt], pop)?;
    rt.add_native("print", &[("v", opt)], &[], print)?;
    rt.add_native("write", &[("v", opt)], &[], write)?;
    rt.add_native("dump", &[("v", opt)], &[], dump)?;
    Ok(())
}

/// Extract a payload the signature promised; direct implementation calls
/// skip dispatch, so it may still be missing.
fn expect<T>(
    rt: &mut Runtime,
    v: &Value,
    expected: TypeId,
    get: impl FnOnce(&Value) -> Option<T>,
) -> EvalResult<T> {
    match get(v) {
        Some(x) => Ok(x),
        None => {
            let kind = type_mismatch(rt.type_name(expected), rt.type_name(v.ty()));
            Err(rt.raise(kind))
        }
    }
}

fn pop_meta(rt: &mut Runtime) -> EvalResult<TypeId> {
    let v = rt.pop()?;
    let meta = rt.builtins().meta_type;
    expect(rt, &v, meta, Value::as_meta)
}

fn pop_pair(rt: &mut Runtime) -> EvalResult<(Value, Value)> {
    let y = rt.pop()?;
    let x = rt.pop()?;
    Ok((x, y))
}

fn new(rt: &mut Runtime) -> EvalResult<()> {
    let ty = pop_meta(rt)?;
    let value = rt.new_value(ty)?;
    rt.push(value);
    Ok(())
}

fn call(rt: &mut Runtime) -> EvalResult<()> {
    let act = rt.pop()?;
    rt.call(&act)
}

fn test(rt: &mut Runtime) -> EvalResult<()> {
    let v = rt.pop()?;
    if rt.ok(&v)? {
        Ok(())
    } else {
        Err(rt.raise(EvalErrorKind::TestFailed))
    }
}

fn fail(rt: &mut Runtime) -> EvalResult<()> {
    let msg = rt.pop()?;
    let str_ty = rt.builtins().str_type;
    let message = expect(rt, &msg, str_ty, |v| v.as_str().map(str::to_owned))?;
    Err(rt.raise(EvalErrorKind::Custom { message }))
}

fn eqval(rt: &mut Runtime) -> EvalResult<()> {
    let (x, y) = pop_pair(rt)?;
    let eq = rt.eqval(&x, &y)?;
    let result = rt.boolean(eq);
    rt.push(result);
    Ok(())
}

fn equid(rt: &mut Runtime) -> EvalResult<()> {
    let (x, y) = pop_pair(rt)?;
    let eq = rt.equid(&x, &y)?;
    let result = rt.boolean(eq);
    rt.push(result);
    Ok(())
}

fn compare(rt: &mut Runtime, want: Ordering) -> EvalResult<()> {
    let (x, y) = pop_pair(rt)?;
    let ord = rt.cmp(&x, &y)?;
    let result = rt.boolean(ord == want);
    rt.push(result);
    Ok(())
}

fn lt(rt: &mut Runtime) -> EvalResult<()> {
    compare(rt, Ordering::Less)
}

fn gt(rt: &mut Runtime) -> EvalResult<()> {
    compare(rt, Ordering::Greater)
}

fn ok(rt: &mut Runtime) -> EvalResult<()> {
    let v = rt.pop()?;
    let ok = rt.ok(&v)?;
    let result = rt.boolean(ok);
    rt.push(result);
    Ok(())
}

fn clone(rt: &mut Runtime) -> EvalResult<()> {
    let v = rt.pop()?;
    let copy = rt.clone_value(&v)?;
    rt.push(copy);
    Ok(())
}

fn type_of(rt: &mut Runtime) -> EvalResult<()> {
    let v = rt.pop()?;
    let meta = rt.meta(v.ty());
    rt.push(meta);
    Ok(())
}

fn is(rt: &mut Runtime) -> EvalResult<()> {
    let parent = pop_meta(rt)?;
    let child = pop_meta(rt)?;
    let result = rt.boolean(rt.is_subtype(child, parent));
    rt.push(result);
    Ok(())
}

fn get(rt: &mut Runtime) -> EvalResult<()> {
    let fld = rt.pop()?;
    let rec = rt.pop()?;
    let sym_ty = rt.builtins().sym_type;
    let field = expect(rt, &fld, sym_ty, Value::as_sym)?;
    let value = rt.rec_get(&rec, field)?;
    rt.push(value);
    Ok(())
}

fn put(rt: &mut Runtime) -> EvalResult<()> {
    let val = rt.pop()?;
    let fld = rt.pop()?;
    let rec = rt.pop()?;
    let sym_ty = rt.builtins().sym_type;
    let field = expect(rt, &fld, sym_ty, Value::as_sym)?;
    rt.rec_put(&rec, field, val)
}

fn guid(rt: &mut Runtime) -> EvalResult<()> {
    let s = rt.pop()?;
    let str_ty = rt.builtins().str_type;
    let text = expect(rt, &s, str_ty, |v| v.as_str().map(str::to_owned))?;
    match Uuid::parse_str(&text) {
        Ok(id) => {
            let value = rt.builtins().guid(id);
            rt.push(value);
            Ok(())
        }
        Err(_) => Err(rt.raise(EvalErrorKind::InvalidValue {
            what: "guid",
            input: text,
        })),
    }
}

fn guid_str(rt: &mut Runtime) -> EvalResult<()> {
    let v = rt.pop()?;
    let guid_ty = rt.builtins().guid_type;
    let id = expect(rt, &v, guid_ty, |v| match v.payload() {
        Payload::Guid(id) => Some(*id),
        _ => None,
    })?;
    let value = rt.string(&id.to_string());
    rt.push(value);
    Ok(())
}

fn len(rt: &mut Runtime) -> EvalResult<()> {
    let v = rt.pop()?;
    let vect_ty = rt.builtins().vect_type;
    let items = expect(rt, &v, vect_ty, |v| v.as_vect().cloned())?;
    let n = i64::try_from(items.borrow().len()).unwrap_or(i64::MAX);
    let value = rt.int(n);
    rt.push(value);
    Ok(())
}

fn push(rt: &mut Runtime) -> EvalResult<()> {
    let x = rt.pop()?;
    let v = rt.pop()?;
    let vect_ty = rt.builtins().vect_type;
    let items = expect(rt, &v, vect_ty, |v| v.as_vect().cloned())?;
    items.borrow_mut().push(x);
    Ok(())
}

/// Remove the last item; an empty vector yields nil.
fn pop(rt: &mut Runtime) -> EvalResult<()> {
    let v = rt.pop()?;
    let vect_ty = rt.builtins().vect_type;
    let items = expect(rt, &v, vect_ty, |v| v.as_vect().cloned())?;
    let last = items.borrow_mut().pop();
    let value = last.unwrap_or_else(|| rt.nil());
    rt.push(value);
    Ok(())
}

fn emit(rt: &mut Runtime, mode: Render) -> EvalResult<()> {
    let v = rt.pop()?;
    let text = rt.render(&v, mode)?;
    rt.print_handler().print(&text);
    Ok(())
}

fn print(rt: &mut Runtime) -> EvalResult<()> {
    emit(rt, Render::Print)
}

fn write(rt: &mut Runtime) -> EvalResult<()> {
    emit(rt, Render::Write)
}

fn dump(rt: &mut Runtime) -> EvalResult<()> {
    emit(rt, Render::Dump)
}
