//! Function registry.
//!
//! A function is a name plus a fixed arity, grouping implementations
//! (overloads) that differ by parameter types. Implementations are kept in
//! registration order, which is also the dispatch tie-break order, and are
//! indexed by their canonical signature for explicit-overload references.

mod dispatch;

use std::fmt;
use std::rc::Rc;

use rill_ir::{Name, SharedInterner};
use rill_types::{TypeId, TypeRegistry};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use tracing::debug;

pub use dispatch::TieBreak;

use crate::scope::ScopeRef;
use crate::{EvalErrorKind, EvalResult, Runtime};

/// Contiguous range of compiled instructions, opaque to the runtime.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CodeRange {
    pub start: usize,
    pub len: usize,
}

impl CodeRange {
    pub const fn new(start: usize, len: usize) -> Self {
        CodeRange { start, len }
    }
}

/// Runs compiled code on behalf of the runtime.
///
/// The compiler owns instruction encoding; the runtime only knows ranges.
/// `run` executes `code` in the runtime's current scope.
pub trait CodeRunner {
    fn run(&self, rt: &mut Runtime, code: CodeRange) -> EvalResult<()>;
}

/// Native implementation body. Arguments are still on the current stack.
pub type NativeFn = fn(&mut Runtime) -> EvalResult<()>;

/// What an implementation does when called.
#[derive(Clone)]
pub enum Action {
    Native(NativeFn),
    /// Compiled body run in a child of `scope`.
    Compiled { scope: ScopeRef, code: CodeRange },
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Native(_) => f.write_str("Native"),
            Action::Compiled { code, .. } => write!(f, "Compiled({}+{})", code.start, code.len),
        }
    }
}

/// One parameter. Unnamed parameters use [`Name::EMPTY`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Param {
    pub name: Name,
    pub ty: TypeId,
}

impl Param {
    pub const fn new(name: Name, ty: TypeId) -> Self {
        Param { name, ty }
    }

    pub const fn unnamed(ty: TypeId) -> Self {
        Param {
            name: Name::EMPTY,
            ty,
        }
    }
}

/// One overload of a function.
#[derive(Debug)]
pub struct Implementation {
    pub func: Name,
    pub params: SmallVec<[Param; 4]>,
    /// Declared return types. Documentation only.
    pub rets: SmallVec<[TypeId; 2]>,
    /// Parameter type names joined by spaces, e.g. `Int Int`.
    pub signature: String,
    pub action: Action,
}

impl Implementation {
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    pub fn param_types(&self) -> impl Iterator<Item = TypeId> + '_ {
        self.params.iter().map(|p| p.ty)
    }
}

/// Shared handle to an implementation. Equality is identity.
#[derive(Clone, Debug)]
pub struct ImplRef(Rc<Implementation>);

impl ImplRef {
    pub fn refs(&self) -> usize {
        Rc::strong_count(&self.0)
    }

    pub fn ptr_eq(&self, other: &ImplRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl std::ops::Deref for ImplRef {
    type Target = Implementation;

    fn deref(&self) -> &Implementation {
        &self.0
    }
}

impl PartialEq for ImplRef {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for ImplRef {}

/// A named group of same-arity implementations.
#[derive(Debug)]
pub struct Function {
    pub name: Name,
    pub arity: usize,
    imps: Vec<ImplRef>,
    by_signature: FxHashMap<String, ImplRef>,
}

impl Function {
    /// Implementations in registration order.
    pub fn imps(&self) -> &[ImplRef] {
        &self.imps
    }

    pub fn get_imp(&self, signature: &str) -> Option<&ImplRef> {
        self.by_signature.get(signature)
    }
}

/// Registry of all functions, with a dispatch cache.
#[derive(Debug)]
pub struct FunctionRegistry {
    interner: SharedInterner,
    funcs: FxHashMap<Name, Function>,
    cache: dispatch::DispatchCache,
    tie_break: TieBreak,
    use_cache: bool,
}

impl FunctionRegistry {
    pub fn new(interner: SharedInterner) -> Self {
        FunctionRegistry {
            interner,
            funcs: FxHashMap::default(),
            cache: dispatch::DispatchCache::default(),
            tie_break: TieBreak::default(),
            use_cache: true,
        }
    }

    /// Set the ambiguity policy and whether resolutions are cached.
    pub fn configure(&mut self, tie_break: TieBreak, use_cache: bool) {
        self.tie_break = tie_break;
        self.use_cache = use_cache;
        self.cache.clear();
    }

    pub fn tie_break(&self) -> TieBreak {
        self.tie_break
    }

    /// Create the function group on first use. Redeclaring with the same
    /// arity is a no-op.
    pub fn declare(&mut self, name: Name, arity: usize) -> Result<&Function, EvalErrorKind> {
        let text = self.interner.lookup(name);
        let func = self.funcs.entry(name).or_insert_with(|| {
            debug!(func = text, arity, "declared function");
            Function {
                name,
                arity,
                imps: Vec::new(),
                by_signature: FxHashMap::default(),
            }
        });
        if func.arity != arity {
            return Err(EvalErrorKind::ArityMismatch {
                func: text.to_owned(),
                expected: func.arity,
                found: arity,
            });
        }
        Ok(func)
    }

    /// Add an implementation, declaring the function if needed.
    ///
    /// An implementation with the same signature as an existing one
    /// replaces it in place, keeping its registration position.
    pub fn add_implementation(
        &mut self,
        types: &TypeRegistry,
        name: Name,
        params: &[Param],
        rets: &[TypeId],
        action: Action,
    ) -> Result<ImplRef, EvalErrorKind> {
        let signature = signature_of(types, params.iter().map(|p| p.ty));
        self.declare(name, params.len())?;
        let imp = ImplRef(Rc::new(Implementation {
            func: name,
            params: params.iter().copied().collect(),
            rets: rets.iter().copied().collect(),
            signature: signature.clone(),
            action,
        }));

        let text = self.interner.lookup(name);
        let Some(func) = self.funcs.get_mut(&name) else {
            return Err(EvalErrorKind::UnknownFunction {
                name: text.to_owned(),
            });
        };
        match func.by_signature.insert(signature.clone(), imp.clone()) {
            Some(old) => {
                if let Some(slot) = func.imps.iter_mut().find(|i| i.ptr_eq(&old)) {
                    *slot = imp.clone();
                }
                debug!(func = text, %signature, "replaced implementation");
            }
            None => {
                func.imps.push(imp.clone());
                debug!(func = text, %signature, "added implementation");
            }
        }
        self.cache.forget(name);
        Ok(imp)
    }

    pub fn get(&self, name: Name) -> Option<&Function> {
        self.funcs.get(&name)
    }

    pub fn lookup(&self, name: &str) -> Option<&Function> {
        self.interner.get(name).and_then(|n| self.funcs.get(&n))
    }

    /// Select an implementation by explicit signature, skipping dispatch.
    pub fn resolve_direct(&self, name: Name, signature: &str) -> Result<ImplRef, EvalErrorKind> {
        let func = self.funcs.get(&name).ok_or_else(|| EvalErrorKind::UnknownFunction {
            name: self.interner.lookup(name).to_owned(),
        })?;
        func.get_imp(signature)
            .cloned()
            .ok_or_else(|| EvalErrorKind::UnknownImplementation {
                func: self.interner.lookup(name).to_owned(),
                signature: signature.to_owned(),
            })
    }

    pub fn len(&self) -> usize {
        self.funcs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.funcs.is_empty()
    }
}

/// Canonical signature string for a parameter type list.
pub fn signature_of(types: &TypeRegistry, params: impl Iterator<Item = TypeId>) -> String {
    let mut sig = String::new();
    for (i, ty) in params.enumerate() {
        if i > 0 {
            sig.push(' ');
        }
        sig.push_str(types.name(ty));
    }
    sig
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "Tests can panic")]
mod tests;
