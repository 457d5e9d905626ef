//! Multi-argument dispatch.
//!
//! An implementation is applicable when every argument type is a subtype
//! of the matching parameter type. Among applicable implementations the
//! first registered one is kept unless a later one is strictly more
//! specific: a subtype at every position and a proper subtype at one or
//! more. Incomparable matches therefore resolve to registration order,
//! which [`TieBreak::RejectAmbiguous`] turns into an error instead.

use rill_ir::Name;
use rill_types::{TypeId, TypeRegistry};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use tracing::{debug, trace};

use super::{FunctionRegistry, ImplRef, Implementation};
use crate::EvalErrorKind;

/// Policy for applicable implementations that no single one dominates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TieBreak {
    /// Keep the first registered match.
    #[default]
    FirstRegistered,
    /// Report the call as not applicable.
    RejectAmbiguous,
}

type CacheKey = (Name, SmallVec<[TypeId; 4]>);

/// Resolved implementations keyed by function and argument types.
///
/// Valid for one type-registry generation; a new derive edge can change
/// which implementations apply.
#[derive(Debug, Default)]
pub(super) struct DispatchCache {
    generation: u64,
    map: FxHashMap<CacheKey, ImplRef>,
}

impl DispatchCache {
    fn get(&mut self, generation: u64, key: &CacheKey) -> Option<ImplRef> {
        if self.generation != generation {
            self.map.clear();
            self.generation = generation;
            return None;
        }
        self.map.get(key).cloned()
    }

    fn insert(&mut self, key: CacheKey, imp: ImplRef) {
        self.map.insert(key, imp);
    }

    pub(super) fn forget(&mut self, name: Name) {
        self.map.retain(|(func, _), _| *func != name);
    }

    pub(super) fn clear(&mut self) {
        self.map.clear();
    }
}

fn applicable(types: &TypeRegistry, imp: &Implementation, args: &[TypeId]) -> bool {
    imp.arity() == args.len()
        && imp
            .param_types()
            .zip(args)
            .all(|(param, &arg)| types.is_subtype(arg, param))
}

/// `a` is at least as specific as `b` at every position.
fn dominates(types: &TypeRegistry, a: &Implementation, b: &Implementation) -> bool {
    a.param_types()
        .zip(b.param_types())
        .all(|(pa, pb)| types.is_subtype(pa, pb))
}

/// `a` is strictly more specific than `b`.
fn more_specific(types: &TypeRegistry, a: &Implementation, b: &Implementation) -> bool {
    dominates(types, a, b)
        && a.param_types()
            .zip(b.param_types())
            .any(|(pa, pb)| pa != pb)
}

impl FunctionRegistry {
    /// Select the implementation of `name` for `args` (deepest first).
    pub fn resolve(
        &mut self,
        types: &TypeRegistry,
        name: Name,
        args: &[TypeId],
    ) -> Result<ImplRef, EvalErrorKind> {
        let key: CacheKey = (name, args.iter().copied().collect());
        if self.use_cache {
            if let Some(imp) = self.cache.get(types.generation(), &key) {
                trace!(func = self.interner.lookup(name), "dispatch cache hit");
                return Ok(imp);
            }
        }

        let func_name = self.interner.lookup(name);
        let func = self
            .funcs
            .get(&name)
            .ok_or_else(|| EvalErrorKind::UnknownFunction {
                name: func_name.to_owned(),
            })?;

        let not_applicable = |ambiguous: Option<String>| EvalErrorKind::NotApplicable {
            func: func_name.to_owned(),
            args: super::signature_of(types, args.iter().copied()),
            ambiguous,
        };

        let mut best: Option<&ImplRef> = None;
        for imp in func.imps.iter().filter(|imp| applicable(types, imp, args)) {
            match best {
                Some(current) if !more_specific(types, imp, current) => {}
                _ => best = Some(imp),
            }
        }
        let Some(best) = best.cloned() else {
            return Err(not_applicable(None));
        };

        if self.tie_break == TieBreak::RejectAmbiguous {
            let rival = func.imps.iter().find(|imp| {
                !imp.ptr_eq(&best) && applicable(types, imp, args) && !dominates(types, &best, imp)
            });
            if let Some(rival) = rival {
                debug!(
                    func = func_name,
                    first = %best.signature,
                    second = %rival.signature,
                    "ambiguous dispatch rejected"
                );
                return Err(not_applicable(Some(format!(
                    "{func_name}<{}> and {func_name}<{}>",
                    best.signature, rival.signature
                ))));
            }
        }

        trace!(func = func_name, signature = %best.signature, "dispatched");
        if self.use_cache {
            self.cache.insert(key, best.clone());
        }
        Ok(best)
    }
}
