use super::*;
use crate::value::Rat;
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rill_ir::SharedInterner;

struct Fixture {
    types: TypeRegistry,
    b: Builtins,
}

impl Fixture {
    fn new() -> Self {
        let mut types = TypeRegistry::new(SharedInterner::new());
        let b = Builtins::register(&mut types).unwrap();
        Fixture { types, b }
    }

    fn ops(&self) -> ValueOps<'_> {
        ValueOps::new(&self.types, &self.b)
    }

    fn ints(&self, items: &[i64]) -> Value {
        self.b.vect(items.iter().map(|&n| self.b.int(n)).collect())
    }

    fn text(&self, v: &Value, mode: Render) -> String {
        self.ops().render_to_string(v, mode).unwrap()
    }
}

#[test]
fn equal_vectors_are_eqval_but_not_equid() {
    let fx = Fixture::new();
    let ops = fx.ops();
    let a = fx.ints(&[1, 2, 3]);
    let b = fx.ints(&[1, 2, 3]);

    assert!(ops.eqval(&a, &b).unwrap());
    assert!(!ops.equid(&a, &b).unwrap());
    assert!(ops.equid(&a, &a.clone()).unwrap());
    assert!(!ops.eqval(&a, &fx.ints(&[1, 2])).unwrap());
}

#[test]
fn eqval_recurses_into_nested_vectors() {
    let fx = Fixture::new();
    let ops = fx.ops();
    let a = fx.b.vect(vec![fx.ints(&[1]), fx.b.string("x")]);
    let b = fx.b.vect(vec![fx.ints(&[1]), fx.b.string("x")]);
    let c = fx.b.vect(vec![fx.ints(&[2]), fx.b.string("x")]);
    assert!(ops.eqval(&a, &b).unwrap());
    assert!(!ops.eqval(&a, &c).unwrap());
}

#[test]
fn eqval_falls_back_to_identity() {
    let fx = Fixture::new();
    let ops = fx.ops();
    assert!(ops.eqval(&fx.b.int(4), &fx.b.int(4)).unwrap());
    assert!(!ops.eqval(&fx.b.int(4), &fx.b.int(5)).unwrap());
    assert!(!ops.eqval(&fx.b.int(4), &fx.b.boolean(true)).unwrap());
    assert!(ops.eqval(&fx.b.nil(), &fx.b.nil()).unwrap());
}

#[test]
fn strings_compare_by_content_for_eqval_only() {
    let fx = Fixture::new();
    let ops = fx.ops();
    let a = fx.b.string("abc");
    let b = fx.b.string("abc");
    assert!(ops.eqval(&a, &b).unwrap());
    assert!(!ops.equid(&a, &b).unwrap());
}

#[test]
fn missing_capability_is_unsupported() {
    let mut fx = Fixture::new();
    let any = fx.b.any_type;
    let opaque = fx.types.register("Opaque", &[any]).unwrap();
    let v = Value::new(opaque, Payload::Int(0));
    let ops = fx.ops();

    assert_eq!(
        ops.equid(&v, &v).unwrap_err(),
        EvalErrorKind::UnsupportedOperation {
            op: "equid",
            ty: "Opaque".to_string(),
        }
    );
    assert_eq!(
        ops.eqval(&v, &v).unwrap_err().to_string(),
        "Opaque does not support eqval"
    );
    assert_eq!(
        ops.render_to_string(&v, Render::Print).unwrap_err().to_string(),
        "Opaque does not support print"
    );
    // Clone without deep clone is a copy.
    assert!(ops.deep_clone(&v).is_ok());
}

#[test]
fn cmp_orders_scalars_and_vectors() {
    let fx = Fixture::new();
    let ops = fx.ops();
    assert_eq!(ops.cmp(&fx.b.int(1), &fx.b.int(2)).unwrap(), Ordering::Less);
    assert_eq!(
        ops.cmp(&fx.b.string("b"), &fx.b.string("a")).unwrap(),
        Ordering::Greater
    );
    let third = fx.b.rat(Rat::new(1, 3).unwrap());
    let half = fx.b.rat(Rat::new(1, 2).unwrap());
    assert_eq!(ops.cmp(&third, &half).unwrap(), Ordering::Less);

    assert_eq!(
        ops.cmp(&fx.ints(&[1, 2]), &fx.ints(&[1, 3])).unwrap(),
        Ordering::Less
    );
    assert_eq!(
        ops.cmp(&fx.ints(&[1, 2]), &fx.ints(&[1])).unwrap(),
        Ordering::Greater
    );
    assert_eq!(
        ops.cmp(&fx.ints(&[1]), &fx.ints(&[1])).unwrap(),
        Ordering::Equal
    );
}

#[test]
fn symbols_compare_by_text() {
    let fx = Fixture::new();
    let ops = fx.ops();
    // Interned in the opposite order of their text.
    let zed = fx.b.sym(fx.types.interner().intern("zed"));
    let abe = fx.b.sym(fx.types.interner().intern("abe"));
    assert_eq!(ops.cmp(&abe, &zed).unwrap(), Ordering::Less);
}

#[test]
fn cmp_of_different_types_is_a_mismatch() {
    let fx = Fixture::new();
    let err = fx
        .ops()
        .cmp(&fx.b.int(1), &fx.b.string("1"))
        .unwrap_err();
    assert_eq!(
        err,
        EvalErrorKind::TypeMismatch {
            expected: "Int".to_string(),
            found: "Str".to_string(),
        }
    );
}

#[test]
fn truthiness() {
    let fx = Fixture::new();
    let ops = fx.ops();
    assert!(!ops.ok(&fx.b.nil()).unwrap());
    assert!(!ops.ok(&fx.b.int(0)).unwrap());
    assert!(ops.ok(&fx.b.int(-1)).unwrap());
    assert!(!ops.ok(&fx.b.string("")).unwrap());
    assert!(!ops.ok(&fx.ints(&[])).unwrap());
    assert!(ops.ok(&fx.ints(&[0])).unwrap());
    assert!(!ops.ok(&fx.b.rat(Rat::ZERO)).unwrap());
}

#[test]
fn clone_is_independent_of_original() {
    let fx = Fixture::new();
    let ops = fx.ops();
    let inner = fx.ints(&[1]);
    let original = fx.b.vect(vec![inner.clone()]);
    let copy = ops.deep_clone(&original).unwrap();

    assert!(ops.eqval(&original, &copy).unwrap());
    assert!(!ops.equid(&original, &copy).unwrap());

    let copied_inner = copy.as_vect().unwrap().borrow()[0].clone();
    copied_inner.as_vect().unwrap().borrow_mut().push(fx.b.int(2));
    assert_eq!(inner.as_vect().unwrap().borrow().len(), 1);
    assert!(!ops.eqval(&original, &copy).unwrap());
}

#[test]
fn clone_without_deep_clone_shares() {
    let fx = Fixture::new();
    let ops = fx.ops();
    let s = fx.b.string("shared");
    let copy = ops.deep_clone(&s).unwrap();
    assert!(ops.equid(&s, &copy).unwrap());
    assert_eq!(s.refs(), Some(2));
}

#[test]
fn iterate_int_str_and_vect() {
    let fx = Fixture::new();
    let ops = fx.ops();

    let counts: Vec<i64> = ops
        .iter(&fx.b.int(3))
        .unwrap()
        .filter_map(|v| v.as_int())
        .collect();
    assert_eq!(counts, vec![0, 1, 2]);

    let chars: Vec<String> = ops
        .iter(&fx.b.string("ab"))
        .unwrap()
        .map(|v| fx.text(&v, Render::Print))
        .collect();
    assert_eq!(chars, vec!["a".to_string(), "b".to_string()]);

    let v = fx.ints(&[1]);
    let mut it = ops.iter(&v).unwrap();
    assert_eq!(it.next().and_then(|v| v.as_int()), Some(1));
    v.as_vect().unwrap().borrow_mut().push(fx.b.int(2));
    assert_eq!(it.next().and_then(|v| v.as_int()), Some(2));
    assert!(it.next().is_none());

    assert!(ops.iter(&fx.b.boolean(true)).is_err());
}

#[test]
fn iter_of_iter_shares_position() {
    let fx = Fixture::new();
    let ops = fx.ops();
    let it = Value::iter(fx.b.iter_type, ops.iter(&fx.b.int(3)).unwrap());
    let mut a = ops.iter(&it).unwrap();
    let mut b = ops.iter(&it).unwrap();
    assert_eq!(a.next().and_then(|v| v.as_int()), Some(0));
    assert_eq!(b.next().and_then(|v| v.as_int()), Some(1));
    assert_eq!(a.next().and_then(|v| v.as_int()), Some(2));
    assert!(b.next().is_none());
}

#[test]
fn table_iteration_yields_pairs_in_key_order() {
    let fx = Fixture::new();
    let ops = fx.ops();
    let mut table = Table::new();
    table
        .put(fx.b.int(2), fx.b.string("two"), ops.table_cmp())
        .unwrap();
    table
        .put(fx.b.int(1), fx.b.string("one"), ops.table_cmp())
        .unwrap();
    let value = Value::table(fx.b.table_type, table);

    let pairs: Vec<String> = ops
        .iter(&value)
        .unwrap()
        .map(|pair| fx.text(&pair, Render::Write))
        .collect();
    assert_eq!(pairs, vec!["([1 'one'])", "([2 'two'])"]);
    assert_eq!(fx.text(&value, Render::Write), "{1 'one', 2 'two'}");
}

#[test]
fn table_keys_of_different_types_order_by_tag() {
    let fx = Fixture::new();
    let ops = fx.ops();
    let mut table = Table::new();
    table
        .put(fx.b.string("k"), fx.b.nil(), ops.table_cmp())
        .unwrap();
    table.put(fx.b.int(9), fx.b.nil(), ops.table_cmp()).unwrap();
    let first = &table.entries()[0].0;
    assert_eq!(first.ty(), fx.b.int_type);
}

#[test]
fn render_modes() {
    let fx = Fixture::new();
    let interner = fx.types.interner();
    let v = fx.b.vect(vec![
        fx.b.int(1),
        fx.b.string("x"),
        fx.b.boolean(true),
        fx.b.nil(),
        fx.b.char('c'),
        fx.b.sym(interner.intern("s")),
    ]);

    assert_eq!(fx.text(&v, Render::Write), "([1 'x' #t #nil \\c `s])");
    assert_eq!(fx.text(&v, Render::Dump), "[1 'x' #t #nil \\c `s]@1");
    assert_eq!(fx.text(&v, Render::Print), "1x#t#nilcs");
    assert_eq!(fx.text(&fx.b.meta(fx.b.int_type), Render::Print), "Int");
    assert_eq!(
        fx.text(&fx.b.rat(Rat::new(-2, 4).unwrap()), Render::Write),
        "-1/2"
    );
}

#[test]
fn guid_write_is_rereadable() {
    let fx = Fixture::new();
    let id = uuid::Uuid::nil();
    let v = fx.b.guid(id);
    assert_eq!(
        fx.text(&v, Render::Write),
        format!("'{id}' guid")
    );
    assert_eq!(fx.text(&v, Render::Print), id.to_string());
}

#[test]
fn dump_shows_live_references() {
    let fx = Fixture::new();
    let v = fx.ints(&[7]);
    let _alias = v.clone();
    assert_eq!(fx.text(&v, Render::Dump), "[7]@2");
}

fn int_vects() -> impl Strategy<Value = Vec<Vec<i64>>> {
    prop::collection::vec(prop::collection::vec(-3i64..3, 0..4), 0..4)
}

proptest! {
    #[test]
    fn eqval_is_reflexive_and_symmetric(xs in int_vects(), ys in int_vects()) {
        let fx = Fixture::new();
        let ops = fx.ops();
        let build = |rows: &[Vec<i64>]| fx.b.vect(rows.iter().map(|r| fx.ints(r)).collect());
        let a = build(&xs);
        let a2 = build(&xs);
        let b = build(&ys);

        prop_assert!(ops.eqval(&a, &a).unwrap());
        prop_assert!(ops.eqval(&a, &a2).unwrap());
        prop_assert_eq!(ops.eqval(&a, &b).unwrap(), ops.eqval(&b, &a).unwrap());
        prop_assert_eq!(ops.eqval(&a, &b).unwrap(), xs == ys);
    }

    #[test]
    fn cmp_matches_slice_ordering(xs in prop::collection::vec(-5i64..5, 0..5),
                                  ys in prop::collection::vec(-5i64..5, 0..5)) {
        let fx = Fixture::new();
        let ordering = fx.ops().cmp(&fx.ints(&xs), &fx.ints(&ys)).unwrap();
        prop_assert_eq!(ordering, xs.cmp(&ys));
    }
}
