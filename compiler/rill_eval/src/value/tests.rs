use super::*;
use pretty_assertions::assert_eq;
use rill_ir::SharedInterner;

const INT: TypeId = TypeId::from_raw(0);
const VECT: TypeId = TypeId::from_raw(1);

fn int(n: i64) -> Value {
    Value::new(INT, Payload::Int(n))
}

fn int_cmp(a: &Value, b: &Value) -> Result<std::cmp::Ordering, ()> {
    match (a.as_int(), b.as_int()) {
        (Some(x), Some(y)) => Ok(x.cmp(&y)),
        _ => Err(()),
    }
}

#[test]
fn inline_payloads_have_no_refcount() {
    assert_eq!(int(1).refs(), None);
    assert_eq!(Value::new(INT, Payload::Nil).refs(), None);
}

#[test]
fn copy_then_drop_restores_refcount() {
    let v = Value::vect(VECT, vec![int(1)]);
    assert_eq!(v.refs(), Some(1));
    let copy = v.clone();
    assert_eq!(v.refs(), Some(2));
    drop(copy);
    assert_eq!(v.refs(), Some(1));
}

#[test]
fn copies_share_mutations() {
    let v = Value::vect(VECT, vec![]);
    let alias = v.clone();
    alias.as_vect().unwrap().borrow_mut().push(int(5));
    assert_eq!(v.as_vect().unwrap().borrow().len(), 1);
}

#[test]
fn dropping_container_releases_elements() {
    let inner = Value::vect(VECT, vec![]);
    let outer = Value::vect(VECT, vec![inner.clone(), inner.clone()]);
    assert_eq!(inner.refs(), Some(3));
    drop(outer);
    assert_eq!(inner.refs(), Some(1));
}

#[test]
fn accessors_match_payload() {
    let interner = SharedInterner::new();
    let name = interner.intern("x");

    assert_eq!(Value::new(INT, Payload::Bool(true)).as_bool(), Some(true));
    assert_eq!(int(3).as_bool(), None);
    assert_eq!(Value::string(INT, "hi").as_str(), Some("hi"));
    assert_eq!(Value::new(INT, Payload::Sym(name)).as_sym(), Some(name));
    assert_eq!(Value::new(INT, Payload::Meta(VECT)).as_meta(), Some(VECT));
    assert!(Value::new(INT, Payload::Nil).is_nil());
    assert!(int(0).as_vect().is_none());
    assert!(Value::record(INT, RecordValue::new()).as_rec().is_some());
}

#[test]
fn rationals_are_normalized() {
    let half = Rat::new(2, 4).unwrap();
    assert_eq!((half.num(), half.den()), (1, 2));
    let neg = Rat::new(3, -6).unwrap();
    assert_eq!((neg.num(), neg.den()), (-1, 2));
    assert_eq!(Rat::new(0, -5), Some(Rat::ZERO));
    assert_eq!(Rat::new(1, 0), None);
    assert_eq!(neg.to_string(), "-1/2");
    assert_eq!(Rat::integer(4).to_string(), "4/1");
}

#[test]
fn rational_ordering_cross_multiplies() {
    let third = Rat::new(1, 3).unwrap();
    let half = Rat::new(1, 2).unwrap();
    assert!(third < half);
    assert!(Rat::new(-1, 2).unwrap() < Rat::ZERO);
    assert_eq!(Rat::new(2, 6).unwrap(), third);
}

#[test]
fn table_keeps_keys_sorted() {
    let mut table = Table::new();
    for n in [3, 1, 2] {
        assert!(table.put(int(n), int(n * 10), int_cmp).unwrap().is_none());
    }
    let keys: Vec<i64> = table.entries().iter().filter_map(|(k, _)| k.as_int()).collect();
    assert_eq!(keys, vec![1, 2, 3]);

    let old = table.put(int(2), int(99), int_cmp).unwrap();
    assert_eq!(old.and_then(|v| v.as_int()), Some(20));
    assert_eq!(table.get(&int(2), int_cmp).unwrap().and_then(Value::as_int), Some(99));
    assert!(table.get(&int(7), int_cmp).unwrap().is_none());
}

#[test]
fn table_delete_and_comparator_errors() {
    let mut table = Table::new();
    table.put(int(1), int(10), int_cmp).unwrap();
    table.put(int(2), int(20), int_cmp).unwrap();

    let (k, v) = table.delete(&int(1), int_cmp).unwrap().unwrap();
    assert_eq!((k.as_int(), v.as_int()), (Some(1), Some(10)));
    assert_eq!(table.len(), 1);
    assert!(table.delete(&int(1), int_cmp).unwrap().is_none());

    let nil = Value::new(INT, Payload::Nil);
    assert_eq!(table.get(&nil, int_cmp).unwrap_err(), ());
}

#[test]
fn record_put_returns_replaced_value() {
    let interner = SharedInterner::new();
    let x = interner.intern("x");
    let mut rec = RecordValue::new();
    assert!(rec.is_empty());
    assert!(rec.put(x, int(1)).is_none());
    assert_eq!(rec.put(x, int(2)).and_then(|v| v.as_int()), Some(1));
    assert_eq!(rec.get(x).and_then(Value::as_int), Some(2));
    assert_eq!(rec.len(), 1);
}

#[test]
fn value_iter_is_single_pass() {
    let mut it = ValueIter::new((0..2).map(int));
    assert_eq!(it.next().and_then(|v| v.as_int()), Some(0));
    assert_eq!(it.next().and_then(|v| v.as_int()), Some(1));
    assert!(it.next().is_none());
    assert!(it.next().is_none());
}

#[derive(Debug)]
struct Counter(i64);

impl HeapObject for Counter {
    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn ok(&self) -> Result<bool, Unsupported> {
        Ok(self.0 != 0)
    }
}

#[test]
fn heap_object_defaults_to_unsupported() {
    let counter = Counter(1);
    assert_eq!(counter.ok(), Ok(true));
    assert_eq!(counter.eqval(&Counter(1)).unwrap_err(), Unsupported);
    assert!(counter.clone_object().is_err());
    let mut out = String::new();
    assert_eq!(counter.dump(&mut out), Err(Unsupported));

    let v = Value::object(INT, Counter(2));
    assert_eq!(v.refs(), Some(1));
    match v.payload() {
        Payload::Object(obj) => {
            let counter = obj.as_any().downcast_ref::<Counter>().unwrap();
            assert_eq!(counter.0, 2);
        }
        other => panic!("expected object payload, got {other:?}"),
    }
}
