use super::*;
use crate::value::Payload;
use pretty_assertions::assert_eq;
use rill_ir::SharedInterner;
use rill_types::TypeId;

fn int(n: i64) -> Value {
    Value::new(TypeId::from_raw(0), Payload::Int(n))
}

fn ints(values: &[Value]) -> Vec<i64> {
    values.iter().filter_map(Value::as_int).collect()
}

fn root() -> ScopeRef {
    ScopeRef::new(Scope::new(None, true))
}

#[test]
fn push_pop_peek() {
    let mut scope = Scope::new(None, true);
    assert_eq!(scope.pop().unwrap_err(), ScopeError::EmptyStack);
    assert_eq!(scope.peek().unwrap_err(), ScopeError::EmptyStack);

    scope.push(int(1));
    scope.push(int(2));
    assert_eq!(scope.peek().unwrap().as_int(), Some(2));
    assert_eq!(scope.pop().unwrap().as_int(), Some(2));
    assert_eq!(scope.pop().unwrap().as_int(), Some(1));
    assert!(scope.stack().is_empty());
}

#[test]
fn top_and_pop_n_are_deepest_first() {
    let mut scope = Scope::new(None, true);
    for n in 1..=4 {
        scope.push(int(n));
    }
    assert_eq!(ints(scope.top(2).unwrap()), vec![3, 4]);
    assert!(scope.top(5).is_none());
    assert_eq!(ints(scope.top(0).unwrap()), Vec::<i64>::new());

    assert_eq!(ints(&scope.pop_n(3).unwrap()), vec![2, 3, 4]);
    assert_eq!(scope.pop_n(2).unwrap_err(), ScopeError::EmptyStack);
    assert_eq!(ints(scope.stack()), vec![1]);
}

#[test]
fn get_var_searches_ancestors() {
    let interner = SharedInterner::new();
    let x = interner.intern("x");
    let y = interner.intern("y");

    let parent = root();
    parent.borrow_mut().put_var(x, int(1), false).unwrap();
    let child = Scope::new(Some(parent.clone()), true);
    let grandchild = Scope::new(Some(ScopeRef::new(child)), true);

    assert_eq!(grandchild.get_var(x).unwrap().as_int(), Some(1));
    assert_eq!(grandchild.get_var(y).unwrap_err(), ScopeError::UnknownVar(y));
    assert!(!grandchild.has_local(x));
}

#[test]
fn local_binding_shadows_parent() {
    let interner = SharedInterner::new();
    let x = interner.intern("x");
    let parent = root();
    parent.borrow_mut().put_var(x, int(1), false).unwrap();

    let mut child = Scope::new(Some(parent.clone()), true);
    child.put_var(x, int(2), false).unwrap();
    assert_eq!(child.get_var(x).unwrap().as_int(), Some(2));
    assert_eq!(parent.borrow().get_var(x).unwrap().as_int(), Some(1));
}

#[test]
fn rebinding_requires_force() {
    let interner = SharedInterner::new();
    let x = interner.intern("x");
    let mut scope = Scope::new(None, true);
    scope.put_var(x, int(1), false).unwrap();

    assert_eq!(
        scope.put_var(x, int(2), false).unwrap_err(),
        ScopeError::RebindRefused(x)
    );
    assert_eq!(scope.get_var(x).unwrap().as_int(), Some(1));

    scope.put_var(x, int(3), true).unwrap();
    assert_eq!(scope.get_var(x).unwrap().as_int(), Some(3));
}

#[test]
fn forced_rebind_releases_old_value() {
    let interner = SharedInterner::new();
    let x = interner.intern("x");
    let vect = Value::vect(TypeId::from_raw(1), vec![]);
    let mut scope = Scope::new(None, true);

    scope.put_var(x, vect.clone(), false).unwrap();
    assert_eq!(vect.refs(), Some(2));
    scope.put_var(x, int(0), true).unwrap();
    assert_eq!(vect.refs(), Some(1));
}

#[test]
fn delete_var() {
    let interner = SharedInterner::new();
    let x = interner.intern("x");
    let mut scope = Scope::new(None, true);
    scope.put_var(x, int(7), false).unwrap();

    assert_eq!(scope.delete_var(x).unwrap().as_int(), Some(7));
    assert_eq!(scope.delete_var(x).unwrap_err(), ScopeError::UnknownVar(x));
    assert_eq!(scope.get_var(x).unwrap_err(), ScopeError::UnknownVar(x));
}

#[test]
fn cut_hides_values_below_it() {
    let mut scope = Scope::new(None, true);
    scope.push(int(1));
    scope.push(int(2));

    let cut = scope.begin_cut(1);
    assert_eq!(cut, Cut { offset: 2, depth: 1 });
    assert_eq!(scope.visible_len(), 0);
    assert_eq!(scope.pop().unwrap_err(), ScopeError::EmptyStack);
    assert_eq!(scope.peek().unwrap_err(), ScopeError::EmptyStack);
    assert!(scope.top(1).is_none());

    scope.push(int(3));
    assert_eq!(scope.visible_len(), 1);
    assert_eq!(scope.pop().unwrap().as_int(), Some(3));
    assert_eq!(scope.pop().unwrap_err(), ScopeError::EmptyStack);

    assert!(scope.end_cut(cut));
    assert_eq!(scope.pop().unwrap().as_int(), Some(2));
}

#[test]
fn cuts_end_innermost_first() {
    let mut scope = Scope::new(None, true);
    let outer = scope.begin_cut(1);
    scope.push(int(1));
    let inner = scope.begin_cut(2);

    assert!(!scope.end_cut(outer));
    assert_eq!(scope.cuts().len(), 2);
    assert!(scope.end_cut(inner));
    assert!(scope.end_cut(outer));
    assert!(scope.cuts().is_empty());
}

#[test]
fn child_keeps_parent_alive() {
    let parent = root();
    let weak = parent.downgrade();
    let child = ScopeRef::new(Scope::new(Some(parent.clone()), true));
    assert_eq!(parent.refs(), 2);

    drop(parent);
    assert!(weak.is_alive());
    assert!(child.borrow().parent().unwrap().ptr_eq(&weak.upgrade().unwrap()));

    drop(child);
    assert!(!weak.is_alive());
}

#[test]
fn teardown_releases_stack_and_variables() {
    let interner = SharedInterner::new();
    let x = interner.intern("x");
    let on_stack = Value::vect(TypeId::from_raw(1), vec![]);
    let in_var = Value::vect(TypeId::from_raw(1), vec![]);

    let scope = root();
    scope.borrow_mut().push(on_stack.clone());
    scope.borrow_mut().put_var(x, in_var.clone(), false).unwrap();
    assert_eq!(on_stack.refs(), Some(2));
    assert_eq!(in_var.refs(), Some(2));

    drop(scope);
    assert_eq!(on_stack.refs(), Some(1));
    assert_eq!(in_var.refs(), Some(1));
}

#[test]
fn deep_parent_chain_drops_without_recursion() {
    let base = root();
    let weak = base.downgrade();
    let mut leaf = base;
    for _ in 0..200_000 {
        leaf = ScopeRef::new(Scope::new(Some(leaf), true));
    }
    assert!(weak.is_alive());
    drop(leaf);
    assert!(!weak.is_alive());
}

#[test]
fn shared_ancestor_survives_partial_teardown() {
    let base = root();
    let weak = base.downgrade();
    let a = ScopeRef::new(Scope::new(Some(base.clone()), true));
    let b = ScopeRef::new(Scope::new(Some(base), true));

    drop(a);
    assert!(weak.is_alive());
    drop(b);
    assert!(!weak.is_alive());
}
