//! The runtime context.
//!
//! One [`Runtime`] owns everything evaluation touches: the type and
//! function registries, the open-scope sequence, the constant table and
//! the accumulated diagnostics. It is single-threaded and explicitly
//! passed; several runtimes can coexist, optionally sharing an interner.
//!
//! # Errors
//!
//! Failures are recorded once, where they originate, through
//! [`Runtime::raise`]. The returned [`EvalError`] then travels up with `?`
//! and is never recorded again, so the queue holds exactly one diagnostic
//! per failure.

mod builder;
mod builtins;
mod call_stack;
mod invoke;

use std::cell::RefCell;
use std::rc::Rc;

use rill_diagnostic::queue::too_many_errors;
use rill_diagnostic::{invariant_violation, Diagnostic, DiagnosticConfig, DiagnosticQueue};
use rill_ir::{Name, Pos, SharedInterner};
use rill_types::{Capabilities, TypeError, TypeId, TypeRegistry};
use rustc_hash::FxHashMap;
use tracing::{debug, trace};

pub use builder::{RuntimeBuilder, RuntimeConfig};
pub use builtins::Builtins;
pub use call_stack::CallStack;

use crate::errors::{type_mismatch, unsupported};
use crate::func::{
    Action, CodeRange, CodeRunner, Function, FunctionRegistry, ImplRef, NativeFn, Param,
};
use crate::ops::{Render, ValueOps};
use crate::scope::{Cut, Scope, ScopeError, ScopeRef};
use crate::value::{Payload, RecordValue, Table, ValueIter};
use crate::{EvalError, EvalErrorKind, EvalResult, Heap, SharedPrintHandler, Value};

/// Builds the default value of a type for `new`.
pub type Constructor = Rc<dyn Fn(TypeId) -> Value>;

/// Evaluation context.
pub struct Runtime {
    interner: SharedInterner,
    types: TypeRegistry,
    funcs: FunctionRegistry,
    builtins: Builtins,
    /// Outermost scope; never closed.
    root: ScopeRef,
    /// Scopes opened on top of the root, innermost last.
    open: Vec<ScopeRef>,
    errors: DiagnosticQueue,
    pos: Option<Pos>,
    cut_depth: usize,
    consts: FxHashMap<Name, Value>,
    constructors: FxHashMap<TypeId, Constructor>,
    runner: Option<Rc<dyn CodeRunner>>,
    print: SharedPrintHandler,
    call_stack: CallStack,
    config: RuntimeConfig,
}

impl Runtime {
    /// Runtime with default configuration, printing to stdout.
    pub fn new() -> Self {
        RuntimeBuilder::new().build()
    }

    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    fn from_parts(
        config: RuntimeConfig,
        interner: SharedInterner,
        print: SharedPrintHandler,
        runner: Option<Rc<dyn CodeRunner>>,
    ) -> Self {
        let mut types = TypeRegistry::new(interner.clone());
        let builtins = match Builtins::register(&mut types) {
            Ok(builtins) => builtins,
            Err(e) => invariant_violation(&format!("built-in types failed to register: {e}")),
        };
        let mut funcs = FunctionRegistry::new(interner.clone());
        funcs.configure(config.tie_break, config.dispatch_cache);

        let mut rt = Runtime {
            interner,
            types,
            funcs,
            builtins,
            root: ScopeRef::new(Scope::new(None, config.safe)),
            open: Vec::new(),
            errors: DiagnosticQueue::with_config(DiagnosticConfig {
                error_limit: config.error_limit,
                deduplicate: config.deduplicate_errors,
            }),
            pos: None,
            cut_depth: 0,
            consts: FxHashMap::default(),
            constructors: FxHashMap::default(),
            runner,
            print,
            call_stack: CallStack::new(config.max_call_depth),
            config,
        };
        if let Err(e) = crate::library::register(&mut rt) {
            invariant_violation(&format!("built-in functions failed to register: {e}"));
        }
        debug!(
            types = rt.types.len(),
            funcs = rt.funcs.len(),
            "runtime initialized"
        );
        rt
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn interner(&self) -> &SharedInterner {
        &self.interner
    }

    /// Intern a symbol.
    pub fn sym(&self, s: &str) -> Name {
        self.interner.intern(s)
    }

    pub fn types(&self) -> &TypeRegistry {
        &self.types
    }

    pub fn funcs(&self) -> &FunctionRegistry {
        &self.funcs
    }

    pub fn builtins(&self) -> &Builtins {
        &self.builtins
    }

    pub fn ops(&self) -> ValueOps<'_> {
        ValueOps::new(&self.types, &self.builtins)
    }

    pub fn print_handler(&self) -> &SharedPrintHandler {
        &self.print
    }

    pub fn set_runner(&mut self, runner: Rc<dyn CodeRunner>) {
        self.runner = Some(runner);
    }

    // Diagnostics

    /// Position stamped onto diagnostics raised from now on.
    pub fn set_pos(&mut self, pos: Option<Pos>) {
        self.pos = pos;
    }

    pub fn pos(&self) -> Option<Pos> {
        self.pos
    }

    /// Record a failure and return it for propagation.
    #[cold]
    pub fn raise(&mut self, kind: EvalErrorKind) -> EvalError {
        let diag = kind.to_diagnostic(self.pos);
        debug!(code = %diag.code, message = %diag.message, "error raised");
        self.errors.push(diag);
        EvalError::new(kind, self.pos)
    }

    fn raise_scope(&mut self, e: ScopeError) -> EvalError {
        let kind = match e {
            ScopeError::EmptyStack => EvalErrorKind::EmptyStack,
            ScopeError::UnknownVar(name) => EvalErrorKind::UnknownVar {
                name: self.interner.lookup(name).to_owned(),
            },
            ScopeError::RebindRefused(name) => EvalErrorKind::RebindRefused {
                name: self.interner.lookup(name).to_owned(),
            },
        };
        self.raise(kind)
    }

    fn raise_type(&mut self, e: TypeError) -> EvalError {
        self.raise(EvalErrorKind::Type(e))
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.errors.peek()
    }

    pub fn error_count(&self) -> usize {
        self.errors.error_count()
    }

    pub fn has_errors(&self) -> bool {
        self.errors.has_errors()
    }

    /// Drain the accumulated diagnostics.
    pub fn take_errors(&mut self) -> Vec<Diagnostic> {
        self.errors.flush()
    }

    /// All accumulated diagnostics, one per line.
    pub fn report(&self) -> String {
        let mut out = String::new();
        for diag in self.errors.peek() {
            out.push_str(&diag.to_string());
            out.push('\n');
        }
        if self.errors.suppressed() > 0 {
            let summary = too_many_errors(self.config.error_limit, self.errors.suppressed());
            out.push_str(&summary.to_string());
            out.push('\n');
        }
        out
    }

    // Types

    pub fn add_type(&mut self, name: &str, parents: &[TypeId]) -> EvalResult<TypeId> {
        self.types
            .register(name, parents)
            .map_err(|e| self.raise_type(e))
    }

    pub fn add_trait(&mut self, name: &str, parents: &[TypeId]) -> EvalResult<TypeId> {
        self.types
            .register_trait(name, parents)
            .map_err(|e| self.raise_type(e))
    }

    /// Register a record type. Every record type derives from `Rec`.
    pub fn add_record_type(&mut self, name: &str, parents: &[TypeId]) -> EvalResult<TypeId> {
        let rec = self.builtins.rec_type;
        let ty = self
            .types
            .register_record(name, &[rec])
            .map_err(|e| self.raise_type(e))?;
        for &parent in parents {
            self.derive(ty, parent)?;
        }
        Ok(ty)
    }

    pub fn derive(&mut self, child: TypeId, parent: TypeId) -> EvalResult<()> {
        self.types
            .derive(child, parent)
            .map_err(|e| self.raise_type(e))
    }

    pub fn add_field(&mut self, rec: TypeId, field: &str, ty: TypeId) -> EvalResult<()> {
        let field = self.sym(field);
        self.types
            .add_field(rec, field, ty)
            .map_err(|e| self.raise_type(e))
    }

    /// Clear a record type's fields for redefinition.
    pub fn reinit_record(&mut self, rec: TypeId) -> EvalResult<()> {
        self.types.reinit(rec).map_err(|e| self.raise_type(e))
    }

    pub fn set_capabilities(&mut self, ty: TypeId, caps: Capabilities) -> EvalResult<()> {
        self.types
            .set_capabilities(ty, caps)
            .map_err(|e| self.raise_type(e))
    }

    pub fn lookup_type(&self, name: &str) -> Option<TypeId> {
        self.types.lookup(name)
    }

    pub fn is_subtype(&self, ty: TypeId, ancestor: TypeId) -> bool {
        self.types.is_subtype(ty, ancestor)
    }

    pub fn type_name(&self, ty: TypeId) -> &'static str {
        self.types.name(ty)
    }

    // Functions

    pub fn declare(&mut self, name: &str, arity: usize) -> EvalResult<()> {
        let name = self.sym(name);
        let result = self.funcs.declare(name, arity).map(|_| ());
        result.map_err(|kind| self.raise(kind))
    }

    pub fn add_implementation(
        &mut self,
        name: &str,
        params: &[Param],
        rets: &[TypeId],
        action: Action,
    ) -> EvalResult<ImplRef> {
        let name = self.sym(name);
        self.funcs
            .add_implementation(&self.types, name, params, rets, action)
            .map_err(|kind| self.raise(kind))
    }

    /// Register a native implementation with named parameters.
    pub fn add_native(
        &mut self,
        name: &str,
        params: &[(&str, TypeId)],
        rets: &[TypeId],
        f: NativeFn,
    ) -> EvalResult<ImplRef> {
        let params: Vec<Param> = params
            .iter()
            .map(|&(p, ty)| Param::new(self.sym(p), ty))
            .collect();
        self.add_implementation(name, &params, rets, Action::Native(f))
    }

    /// Register an implementation whose body is compiled code run in a
    /// child of `scope`.
    pub fn add_compiled(
        &mut self,
        name: &str,
        params: &[Param],
        rets: &[TypeId],
        scope: ScopeRef,
        code: CodeRange,
    ) -> EvalResult<ImplRef> {
        self.add_implementation(name, params, rets, Action::Compiled { scope, code })
    }

    pub fn lookup_function(&self, name: &str) -> Option<&Function> {
        self.funcs.lookup(name)
    }

    /// Explicit overload reference by signature, e.g. `"Int Int"`.
    pub fn resolve_direct(&mut self, name: &str, signature: &str) -> EvalResult<ImplRef> {
        let name = self.sym(name);
        self.funcs
            .resolve_direct(name, signature)
            .map_err(|kind| self.raise(kind))
    }

    // Scopes

    /// Innermost open scope.
    pub fn scope(&self) -> &ScopeRef {
        self.open.last().unwrap_or(&self.root)
    }

    pub fn root(&self) -> &ScopeRef {
        &self.root
    }

    /// Number of open scopes, the root included.
    pub fn scope_depth(&self) -> usize {
        self.open.len() + 1
    }

    /// Open a scope under `parent`, or under nothing for a detached
    /// scope. The safe flag comes from the parent, or from the current
    /// scope when there is none.
    pub fn begin(&mut self, parent: Option<ScopeRef>) -> ScopeRef {
        let safe = match &parent {
            Some(p) => p.borrow().safe,
            None => self.scope().borrow().safe,
        };
        let scope = ScopeRef::new(Scope::new(parent, safe));
        self.open.push(scope.clone());
        trace!(depth = self.scope_depth(), "scope opened");
        scope
    }

    /// Open a child of the current scope.
    pub fn begin_child(&mut self) -> ScopeRef {
        let parent = self.scope().clone();
        self.begin(Some(parent))
    }

    /// Close the innermost scope, moving its top value (if any) onto the
    /// scope below. Values under the top stay with the closed scope.
    pub fn end(&mut self) -> EvalResult<()> {
        if self.close_innermost() {
            Ok(())
        } else {
            Err(self.raise(EvalErrorKind::NoOpenScope))
        }
    }

    /// Close open scopes until `open` scopes remain above the root.
    fn close_to(&mut self, open: usize) {
        while self.open.len() > open && self.close_innermost() {}
    }

    /// Cuts still active in the closed scope end with it.
    fn close_innermost(&mut self) -> bool {
        let Some(scope) = self.open.pop() else {
            return false;
        };
        let (result, cuts) = {
            let mut closed = scope.borrow_mut();
            (closed.take_result(), closed.cuts().len())
        };
        self.cut_depth = self.cut_depth.saturating_sub(cuts);
        if let Some(value) = result {
            self.scope().borrow_mut().push(value);
        }
        trace!(depth = self.scope_depth(), refs = scope.refs(), "scope closed");
        true
    }

    // Operand stack

    pub fn push(&mut self, value: Value) {
        self.scope().borrow_mut().push(value);
    }

    pub fn pop(&mut self) -> EvalResult<Value> {
        let result = self.scope().borrow_mut().pop();
        result.map_err(|e| self.raise_scope(e))
    }

    pub fn peek(&mut self) -> EvalResult<Value> {
        let result = self.scope().borrow().peek().cloned();
        result.map_err(|e| self.raise_scope(e))
    }

    /// Values visible above the innermost cut of the current scope.
    pub fn stack_len(&self) -> usize {
        self.scope().borrow().visible_len()
    }

    /// Current stack rendered like a vector, e.g. `[1 'x' #t]`.
    pub fn stack_dump(&self) -> String {
        let ops = self.ops();
        let scope = self.scope().borrow();
        let mut out = String::from("[");
        for (i, value) in scope.stack().iter().enumerate() {
            if i > 0 {
                out.push(' ');
            }
            match ops.render_to_string(value, Render::Dump) {
                Ok(text) => out.push_str(&text),
                Err(_) => out.push_str(self.types.name(value.ty())),
            }
        }
        out.push(']');
        out
    }

    // Variables

    pub fn get_var(&mut self, name: Name) -> EvalResult<Value> {
        let result = self.scope().borrow().get_var(name);
        result.map_err(|e| self.raise_scope(e))
    }

    pub fn put_var(&mut self, name: Name, value: Value, force: bool) -> EvalResult<()> {
        let result = self.scope().borrow_mut().put_var(name, value, force);
        result.map_err(|e| self.raise_scope(e))
    }

    pub fn delete_var(&mut self, name: Name) -> EvalResult<Value> {
        let result = self.scope().borrow_mut().delete_var(name);
        result.map_err(|e| self.raise_scope(e))
    }

    // Cuts

    /// Hide everything currently on the stack from pops until
    /// [`Self::end_cut`].
    pub fn begin_cut(&mut self) -> Cut {
        self.cut_depth += 1;
        let depth = self.cut_depth;
        self.scope().borrow_mut().begin_cut(depth)
    }

    /// End the innermost cut. Cuts must end in the scope they began in,
    /// innermost first.
    pub fn end_cut(&mut self, cut: Cut) {
        if self.cut_depth == 0 {
            invariant_violation("cut ended with no cut active");
        }
        if !self.scope().borrow_mut().end_cut(cut) {
            invariant_violation("cut ended out of order");
        }
        self.cut_depth -= 1;
    }

    /// Runtime-wide cut nesting.
    pub fn cut_depth(&self) -> usize {
        self.cut_depth
    }

    // Constants

    pub fn get_const(&mut self, name: Name) -> EvalResult<Value> {
        match self.consts.get(&name) {
            Some(value) => Ok(value.clone()),
            None => Err(self.raise(EvalErrorKind::UnknownConst {
                name: self.interner.lookup(name).to_owned(),
            })),
        }
    }

    pub fn set_const(&mut self, name: Name, value: Value, force: bool) -> EvalResult<()> {
        if !force && self.consts.contains_key(&name) {
            return Err(self.raise(EvalErrorKind::RebindConst {
                name: self.interner.lookup(name).to_owned(),
            }));
        }
        self.consts.insert(name, value);
        Ok(())
    }

    // Values

    pub fn nil(&self) -> Value {
        self.builtins.nil()
    }

    pub fn int(&self, n: i64) -> Value {
        self.builtins.int(n)
    }

    pub fn boolean(&self, b: bool) -> Value {
        self.builtins.boolean(b)
    }

    pub fn string(&self, s: &str) -> Value {
        self.builtins.string(s)
    }

    pub fn symbol(&self, s: &str) -> Value {
        self.builtins.sym(self.sym(s))
    }

    pub fn vect(&self, items: Vec<Value>) -> Value {
        self.builtins.vect(items)
    }

    pub fn meta(&self, ty: TypeId) -> Value {
        self.builtins.meta(ty)
    }

    pub fn func_value(&self, name: &str) -> Value {
        Value::new(self.builtins.func_type, Payload::Func(self.sym(name)))
    }

    pub fn fimp_value(&self, imp: ImplRef) -> Value {
        Value::new(self.builtins.fimp_type, Payload::Fimp(imp))
    }

    /// Closure over the current scope.
    pub fn lambda(&self, code: CodeRange) -> Value {
        Value::lambda(self.builtins.lambda_type, self.scope().clone(), code)
    }

    /// Install the default-value constructor of `ty`.
    pub fn set_constructor(&mut self, ty: TypeId, ctor: Constructor) -> EvalResult<()> {
        let caps = self.types.capabilities(ty) | Capabilities::NEW;
        self.set_capabilities(ty, caps)?;
        self.constructors.insert(ty, ctor);
        Ok(())
    }

    /// Default value of `ty`.
    pub fn new_value(&mut self, ty: TypeId) -> EvalResult<Value> {
        let name = self.types.name(ty);
        if !self.types.has(ty, Capabilities::NEW) || self.types.is_trait(ty) {
            return Err(self.raise(unsupported("new", name)));
        }
        if self.types.record(ty).is_some() {
            return Ok(Value::record(ty, RecordValue::new()));
        }
        if let Some(ctor) = self.constructors.get(&ty) {
            return Ok(ctor(ty));
        }
        match self.builtins.default_value(ty) {
            Some(value) => Ok(value),
            None => Err(self.raise(unsupported("new", name))),
        }
    }

    fn record_field_type(&mut self, rec: &Value, field: Name) -> EvalResult<TypeId> {
        let record = self.types.name(rec.ty());
        if rec.as_rec().is_none() {
            let expected = self.types.name(self.builtins.rec_type);
            return Err(self.raise(type_mismatch(expected, record)));
        }
        match self.types.record(rec.ty()).and_then(|def| def.field_type(field)) {
            Some(ty) => Ok(ty),
            None => Err(self.raise(EvalErrorKind::InvalidField {
                record: record.to_owned(),
                field: self.interner.lookup(field).to_owned(),
            })),
        }
    }

    /// Field value; unset fields read as nil.
    pub fn rec_get(&mut self, rec: &Value, field: Name) -> EvalResult<Value> {
        self.record_field_type(rec, field)?;
        let value = rec
            .as_rec()
            .and_then(|r| r.borrow().get(field).cloned())
            .unwrap_or_else(|| self.nil());
        Ok(value)
    }

    /// Set a field. The value must be a subtype of the declared field type.
    pub fn rec_put(&mut self, rec: &Value, field: Name, value: Value) -> EvalResult<()> {
        let field_ty = self.record_field_type(rec, field)?;
        if !self.types.is_subtype(value.ty(), field_ty) {
            let kind = type_mismatch(self.types.name(field_ty), self.types.name(value.ty()));
            return Err(self.raise(kind));
        }
        if let Some(r) = rec.as_rec() {
            r.borrow_mut().put(field, value);
        }
        Ok(())
    }

    fn table_of(&mut self, table: &Value) -> EvalResult<Heap<RefCell<Table>>> {
        match table.payload() {
            Payload::Table(t) => Ok(t.clone()),
            _ => {
                let expected = self.types.name(self.builtins.table_type);
                let kind = type_mismatch(expected, self.types.name(table.ty()));
                Err(self.raise(kind))
            }
        }
    }

    pub fn table_get(&mut self, table: &Value, key: &Value) -> EvalResult<Option<Value>> {
        let t = self.table_of(table)?;
        let result = t.borrow().get(key, self.ops().table_cmp()).map(|v| v.cloned());
        result.map_err(|k| self.raise(k))
    }

    /// Insert or replace; returns the replaced value.
    pub fn table_put(&mut self, table: &Value, key: Value, val: Value) -> EvalResult<Option<Value>> {
        let t = self.table_of(table)?;
        let result = t.borrow_mut().put(key, val, self.ops().table_cmp());
        result.map_err(|k| self.raise(k))
    }

    pub fn table_delete(&mut self, table: &Value, key: &Value) -> EvalResult<Option<Value>> {
        let t = self.table_of(table)?;
        let result = t
            .borrow_mut()
            .delete(key, self.ops().table_cmp())
            .map(|entry| entry.map(|(_, v)| v));
        result.map_err(|k| self.raise(k))
    }

    // Value operations

    pub fn equid(&mut self, a: &Value, b: &Value) -> EvalResult<bool> {
        let result = self.ops().equid(a, b);
        result.map_err(|k| self.raise(k))
    }

    pub fn eqval(&mut self, a: &Value, b: &Value) -> EvalResult<bool> {
        let result = self.ops().eqval(a, b);
        result.map_err(|k| self.raise(k))
    }

    pub fn cmp(&mut self, a: &Value, b: &Value) -> EvalResult<std::cmp::Ordering> {
        let result = self.ops().cmp(a, b);
        result.map_err(|k| self.raise(k))
    }

    pub fn ok(&mut self, v: &Value) -> EvalResult<bool> {
        let result = self.ops().ok(v);
        result.map_err(|k| self.raise(k))
    }

    pub fn clone_value(&mut self, v: &Value) -> EvalResult<Value> {
        let result = self.ops().deep_clone(v);
        result.map_err(|k| self.raise(k))
    }

    pub fn iter(&mut self, v: &Value) -> EvalResult<ValueIter> {
        let result = self.ops().iter(v);
        result.map_err(|k| self.raise(k))
    }

    /// Iterator wrapped as an `Iter` value.
    pub fn iter_value(&mut self, v: &Value) -> EvalResult<Value> {
        let iter = self.iter(v)?;
        Ok(Value::iter(self.builtins.iter_type, iter))
    }

    pub fn render(&mut self, v: &Value, mode: Render) -> EvalResult<String> {
        let result = self.ops().render_to_string(v, mode);
        result.map_err(|k| self.raise(k))
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}
