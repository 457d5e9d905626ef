//! Function calls: dispatch, implementation invocation and closures.

use rill_ir::Name;
use rill_stack::ensure_sufficient_stack;
use rill_types::TypeId;
use smallvec::SmallVec;
use tracing::trace;

use super::Runtime;
use crate::errors::unsupported;
use crate::func::{Action, CodeRange, ImplRef};
use crate::scope::ScopeRef;
use crate::value::Payload;
use crate::{EvalErrorKind, EvalResult, Value};

impl Runtime {
    /// Call function `name` with its arguments taken from the top of the
    /// current stack.
    ///
    /// When dispatch fails the stack is left as it was.
    pub fn funcall(&mut self, name: Name) -> EvalResult<()> {
        let Some(arity) = self.funcs.get(name).map(|f| f.arity) else {
            return Err(self.raise(EvalErrorKind::UnknownFunction {
                name: self.interner.lookup(name).to_owned(),
            }));
        };

        let arg_types: Option<SmallVec<[TypeId; 4]>> = self
            .scope()
            .borrow()
            .top(arity)
            .map(|args| args.iter().map(Value::ty).collect());
        let Some(arg_types) = arg_types else {
            let visible: Vec<TypeId> = {
                let scope = self.scope().borrow();
                let stack = scope.stack();
                stack[stack.len() - scope.visible_len()..]
                    .iter()
                    .map(Value::ty)
                    .collect()
            };
            let kind = self.not_applicable(name, &visible);
            return Err(self.raise(kind));
        };

        let imp = match self.funcs.resolve(&self.types, name, &arg_types) {
            Ok(imp) => imp,
            Err(kind) => return Err(self.raise(kind)),
        };
        self.call_imp(&imp)
    }

    /// [`Self::funcall`] by function name.
    pub fn funcall_str(&mut self, name: &str) -> EvalResult<()> {
        let name = self.sym(name);
        self.funcall(name)
    }

    fn not_applicable(&self, func: Name, args: &[TypeId]) -> EvalErrorKind {
        EvalErrorKind::NotApplicable {
            func: self.interner.lookup(func).to_owned(),
            args: crate::func::signature_of(&self.types, args.iter().copied()),
            ambiguous: None,
        }
    }

    /// Invoke one implementation, bypassing dispatch.
    pub fn call_imp(&mut self, imp: &ImplRef) -> EvalResult<()> {
        self.enter_call(imp.func)?;
        trace!(
            func = self.interner.lookup(imp.func),
            signature = %imp.signature,
            "call"
        );
        let result = ensure_sufficient_stack(|| match &imp.action {
            Action::Native(f) => f(self),
            Action::Compiled { scope, code } => self.run_compiled(imp, scope.clone(), *code),
        });
        self.call_stack.pop();
        result
    }

    /// Arguments move from the caller's stack into a fresh child of the
    /// definition scope: named parameters become variables, unnamed ones
    /// stay on the stack in order.
    fn run_compiled(&mut self, imp: &ImplRef, scope: ScopeRef, code: CodeRange) -> EvalResult<()> {
        let args = self.scope().borrow_mut().pop_n(imp.arity());
        let args = args.map_err(|e| self.raise_scope(e))?;

        let base = self.open.len();
        let child = self.begin(Some(scope));
        {
            let mut child = child.borrow_mut();
            for (param, arg) in imp.params.iter().zip(args) {
                if param.name.is_empty() {
                    child.push(arg);
                } else {
                    // Forced binds cannot fail.
                    let _ = child.put_var(param.name, arg, true);
                }
            }
        }
        let result = self.run_code(code);
        self.close_to(base);
        result
    }

    /// Call a callable value: a function (dispatching), an implementation
    /// or a closure.
    pub fn call(&mut self, value: &Value) -> EvalResult<()> {
        let callable = self.ops().callable(value);
        callable.map_err(|k| self.raise(k))?;
        match value.payload() {
            Payload::Func(name) => self.funcall(*name),
            Payload::Fimp(imp) => self.call_imp(imp),
            Payload::Lambda(lambda) => {
                self.enter_call(Name::EMPTY)?;
                let base = self.open.len();
                self.begin(Some(lambda.scope.clone()));
                let result = ensure_sufficient_stack(|| self.run_code(lambda.code));
                self.close_to(base);
                self.call_stack.pop();
                result
            }
            _ => {
                let kind = unsupported("call", self.types.name(value.ty()));
                Err(self.raise(kind))
            }
        }
    }

    fn enter_call(&mut self, func: Name) -> EvalResult<()> {
        match self.call_stack.push(func) {
            Ok(()) => Ok(()),
            Err(depth) => Err(self.raise(EvalErrorKind::StackOverflow { depth })),
        }
    }

    /// Current call nesting.
    pub fn call_depth(&self) -> usize {
        self.call_stack.depth()
    }

    fn run_code(&mut self, code: CodeRange) -> EvalResult<()> {
        let Some(runner) = self.runner.clone() else {
            return Err(self.raise(unsupported("run", "compiled code")));
        };
        runner.run(self, code)
    }
}
