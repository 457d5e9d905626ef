use super::*;
use pretty_assertions::assert_eq;

fn noop(_: &mut Runtime) -> EvalResult<()> {
    Ok(())
}

struct Fixture {
    interner: SharedInterner,
    types: TypeRegistry,
    funcs: FunctionRegistry,
    any: TypeId,
    num: TypeId,
    int: TypeId,
    str: TypeId,
}

impl Fixture {
    fn new() -> Self {
        let interner = SharedInterner::new();
        let mut types = TypeRegistry::new(interner.clone());
        let any = types.register_trait("A", &[]).unwrap();
        let num = types.register_trait("Num", &[any]).unwrap();
        let int = types.register("Int", &[num]).unwrap();
        let str = types.register("Str", &[any]).unwrap();
        Fixture {
            funcs: FunctionRegistry::new(interner.clone()),
            interner,
            types,
            any,
            num,
            int,
            str,
        }
    }

    fn add(&mut self, name: &str, params: &[TypeId]) -> ImplRef {
        let name = self.interner.intern(name);
        let params: Vec<Param> = params.iter().map(|&ty| Param::unnamed(ty)).collect();
        self.funcs
            .add_implementation(&self.types, name, &params, &[], Action::Native(noop))
            .unwrap()
    }

    fn resolve(&mut self, name: &str, args: &[TypeId]) -> Result<ImplRef, EvalErrorKind> {
        let name = self.interner.intern(name);
        self.funcs.resolve(&self.types, name, args)
    }
}

#[test]
fn declare_is_idempotent() {
    let mut fx = Fixture::new();
    let f = fx.interner.intern("f");
    fx.funcs.declare(f, 2).unwrap();
    let func = fx.funcs.declare(f, 2).unwrap();
    assert_eq!(func.arity, 2);
    assert_eq!(fx.funcs.len(), 1);
}

#[test]
fn arity_mismatch_is_rejected() {
    let mut fx = Fixture::new();
    fx.add("f", &[fx.int, fx.int]);
    let f = fx.interner.intern("f");
    let params = [Param::unnamed(fx.int)];
    let err = fx
        .funcs
        .add_implementation(&fx.types, f, &params, &[], Action::Native(noop))
        .unwrap_err();
    assert_eq!(
        err,
        EvalErrorKind::ArityMismatch {
            func: "f".to_string(),
            expected: 2,
            found: 1,
        }
    );
    assert_eq!(fx.funcs.get(f).unwrap().imps().len(), 1);
}

#[test]
fn signature_joins_type_names() {
    let fx = Fixture::new();
    assert_eq!(
        signature_of(&fx.types, [fx.int, fx.any].into_iter()),
        "Int A"
    );
    assert_eq!(signature_of(&fx.types, std::iter::empty()), "");
}

#[test]
fn most_specific_implementation_wins() {
    let mut fx = Fixture::new();
    let generic = fx.add("f", &[fx.num, fx.num]);
    let specific = fx.add("f", &[fx.int, fx.int]);

    assert_eq!(fx.resolve("f", &[fx.int, fx.int]).unwrap(), specific);
    assert!(generic.ptr_eq(&fx.funcs.lookup("f").unwrap().imps()[0]));
}

#[test]
fn specificity_does_not_depend_on_registration_order() {
    let mut fx = Fixture::new();
    let specific = fx.add("f", &[fx.int, fx.int]);
    fx.add("f", &[fx.num, fx.num]);
    assert_eq!(fx.resolve("f", &[fx.int, fx.int]).unwrap(), specific);
}

#[test]
fn no_match_is_not_applicable() {
    let mut fx = Fixture::new();
    fx.add("f", &[fx.num]);
    let err = fx.resolve("f", &[fx.str]).unwrap_err();
    assert_eq!(
        err,
        EvalErrorKind::NotApplicable {
            func: "f".to_string(),
            args: "Str".to_string(),
            ambiguous: None,
        }
    );
    assert_eq!(err.to_string(), "Func not applicable: f");
}

#[test]
fn unknown_function_is_reported() {
    let mut fx = Fixture::new();
    let err = fx.resolve("missing", &[]).unwrap_err();
    assert_eq!(
        err,
        EvalErrorKind::UnknownFunction {
            name: "missing".to_string()
        }
    );
}

#[test]
fn incomparable_matches_resolve_to_first_registered() {
    let mut fx = Fixture::new();
    let first = fx.add("f", &[fx.int, fx.num]);
    fx.add("f", &[fx.num, fx.int]);
    assert_eq!(fx.resolve("f", &[fx.int, fx.int]).unwrap(), first);
}

#[test]
fn reject_ambiguous_reports_both_candidates() {
    let mut fx = Fixture::new();
    fx.funcs.configure(TieBreak::RejectAmbiguous, true);
    fx.add("f", &[fx.int, fx.num]);
    fx.add("f", &[fx.num, fx.int]);

    let err = fx.resolve("f", &[fx.int, fx.int]).unwrap_err();
    assert_eq!(
        err,
        EvalErrorKind::NotApplicable {
            func: "f".to_string(),
            args: "Int Int".to_string(),
            ambiguous: Some("f<Int Num> and f<Num Int>".to_string()),
        }
    );
}

#[test]
fn reject_ambiguous_accepts_a_dominating_match() {
    let mut fx = Fixture::new();
    fx.funcs.configure(TieBreak::RejectAmbiguous, true);
    fx.add("f", &[fx.num, fx.num]);
    let specific = fx.add("f", &[fx.int, fx.int]);
    assert_eq!(fx.resolve("f", &[fx.int, fx.int]).unwrap(), specific);
}

#[test]
fn same_signature_replaces_in_place() {
    let mut fx = Fixture::new();
    fx.add("f", &[fx.num]);
    let old = fx.add("f", &[fx.int]);
    assert_eq!(fx.resolve("f", &[fx.int]).unwrap(), old);

    let new = fx.add("f", &[fx.int]);
    let func = fx.funcs.lookup("f").unwrap();
    assert_eq!(func.imps().len(), 2);
    assert!(func.imps()[1].ptr_eq(&new));
    // The cached resolution was dropped with the replaced implementation.
    assert_eq!(fx.resolve("f", &[fx.int]).unwrap(), new);
}

#[test]
fn derive_invalidates_cached_resolution() {
    let mut fx = Fixture::new();
    let generic = fx.add("f", &[fx.any]);
    let on_num = fx.add("f", &[fx.num]);
    let text = fx.types.register("Text", &[fx.any]).unwrap();

    assert_eq!(fx.resolve("f", &[text]).unwrap(), generic);
    fx.types.derive(text, fx.num).unwrap();
    assert_eq!(fx.resolve("f", &[text]).unwrap(), on_num);
}

#[test]
fn uncached_dispatch_resolves_the_same() {
    let mut fx = Fixture::new();
    fx.funcs.configure(TieBreak::FirstRegistered, false);
    fx.add("f", &[fx.num]);
    let specific = fx.add("f", &[fx.int]);
    assert_eq!(fx.resolve("f", &[fx.int]).unwrap(), specific);
    assert_eq!(fx.resolve("f", &[fx.int]).unwrap(), specific);
}

#[test]
fn resolve_direct_uses_signature_index() {
    let mut fx = Fixture::new();
    let on_num = fx.add("f", &[fx.num]);
    fx.add("f", &[fx.int]);
    let f = fx.interner.intern("f");

    assert_eq!(fx.funcs.resolve_direct(f, "Num").unwrap(), on_num);
    let err = fx.funcs.resolve_direct(f, "Str").unwrap_err();
    assert_eq!(
        err,
        EvalErrorKind::UnknownImplementation {
            func: "f".to_string(),
            signature: "Str".to_string(),
        }
    );
}

#[test]
fn implementation_records_signature_and_returns() {
    let mut fx = Fixture::new();
    let f = fx.interner.intern("f");
    let x = fx.interner.intern("x");
    let imp = fx
        .funcs
        .add_implementation(
            &fx.types,
            f,
            &[Param::new(x, fx.int), Param::unnamed(fx.str)],
            &[fx.int],
            Action::Native(noop),
        )
        .unwrap();
    assert_eq!(imp.signature, "Int Str");
    assert_eq!(imp.arity(), 2);
    assert_eq!(imp.params[0].name, x);
    assert_eq!(imp.rets.as_slice(), &[fx.int]);
}
