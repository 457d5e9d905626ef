//! Lexical scopes.
//!
//! A scope owns an operand stack and a variable table and holds a strong
//! reference to its parent. Scopes are shared through [`ScopeRef`]: the
//! runtime's open-scope sequence holds one reference, each child scope
//! one, and each closure capturing the scope one. Closures point at
//! scopes, never the other way round.
//!
//! Cut markers bound how far down the stack a sub-evaluation may pop.

use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

use rill_ir::Name;
use rustc_hash::FxHashMap;

use crate::Value;

/// Scope operation failure, converted to a diagnostic by the runtime.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScopeError {
    /// Nothing above the innermost cut.
    EmptyStack,
    UnknownVar(Name),
    RebindRefused(Name),
}

/// Saved stack boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cut {
    /// Stack length when the cut began.
    pub offset: usize,
    /// Runtime-wide nesting depth at the time, counting this cut.
    pub depth: usize,
}

/// One lexical environment.
pub struct Scope {
    stack: Vec<Value>,
    vars: FxHashMap<Name, Value>,
    parent: Option<ScopeRef>,
    cuts: Vec<Cut>,
    /// Propagated flag marking scopes where unsafe operations are refused.
    pub safe: bool,
}

impl Scope {
    pub fn new(parent: Option<ScopeRef>, safe: bool) -> Self {
        Scope {
            stack: Vec::new(),
            vars: FxHashMap::default(),
            parent,
            cuts: Vec::new(),
            safe,
        }
    }

    pub fn parent(&self) -> Option<&ScopeRef> {
        self.parent.as_ref()
    }

    /// Lowest stack index visible to pops.
    #[inline]
    fn floor(&self) -> usize {
        self.cuts.last().map_or(0, |c| c.offset)
    }

    pub fn push(&mut self, value: Value) {
        self.stack.push(value);
    }

    pub fn pop(&mut self) -> Result<Value, ScopeError> {
        if self.stack.len() <= self.floor() {
            return Err(ScopeError::EmptyStack);
        }
        self.stack.pop().ok_or(ScopeError::EmptyStack)
    }

    pub fn peek(&self) -> Result<&Value, ScopeError> {
        if self.stack.len() <= self.floor() {
            return Err(ScopeError::EmptyStack);
        }
        self.stack.last().ok_or(ScopeError::EmptyStack)
    }

    /// The top `n` visible values, deepest first.
    pub fn top(&self, n: usize) -> Option<&[Value]> {
        let len = self.stack.len();
        if len < self.floor() + n {
            return None;
        }
        Some(&self.stack[len - n..])
    }

    /// Remove and return the top `n` visible values, deepest first.
    pub fn pop_n(&mut self, n: usize) -> Result<Vec<Value>, ScopeError> {
        let len = self.stack.len();
        if len < self.floor() + n {
            return Err(ScopeError::EmptyStack);
        }
        Ok(self.stack.split_off(len - n))
    }

    /// Whole stack, cuts ignored.
    pub fn stack(&self) -> &[Value] {
        &self.stack
    }

    /// Number of values visible above the innermost cut.
    pub fn visible_len(&self) -> usize {
        self.stack.len() - self.floor()
    }

    /// Take the top value regardless of cuts. Used when the scope closes.
    pub(crate) fn take_result(&mut self) -> Option<Value> {
        self.stack.pop()
    }

    /// Look the variable up here, then in each ancestor.
    pub fn get_var(&self, name: Name) -> Result<Value, ScopeError> {
        if let Some(value) = self.vars.get(&name) {
            return Ok(value.clone());
        }
        let mut next = self.parent.clone();
        while let Some(scope) = next {
            let scope = scope.borrow();
            if let Some(value) = scope.vars.get(&name) {
                return Ok(value.clone());
            }
            next = scope.parent.clone();
        }
        Err(ScopeError::UnknownVar(name))
    }

    /// Bind in this scope. An existing local binding is only replaced
    /// (and its old value released) when `force` is set.
    pub fn put_var(&mut self, name: Name, value: Value, force: bool) -> Result<(), ScopeError> {
        match self.vars.get_mut(&name) {
            Some(_) if !force => Err(ScopeError::RebindRefused(name)),
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => {
                self.vars.insert(name, value);
                Ok(())
            }
        }
    }

    pub fn delete_var(&mut self, name: Name) -> Result<Value, ScopeError> {
        self.vars.remove(&name).ok_or(ScopeError::UnknownVar(name))
    }

    pub fn has_local(&self, name: Name) -> bool {
        self.vars.contains_key(&name)
    }

    pub(crate) fn begin_cut(&mut self, depth: usize) -> Cut {
        let cut = Cut {
            offset: self.stack.len(),
            depth,
        };
        self.cuts.push(cut);
        cut
    }

    /// Remove the innermost cut if it is `cut`.
    pub(crate) fn end_cut(&mut self, cut: Cut) -> bool {
        if self.cuts.last() == Some(&cut) {
            self.cuts.pop();
            true
        } else {
            false
        }
    }

    pub fn cuts(&self) -> &[Cut] {
        &self.cuts
    }
}

impl Drop for Scope {
    fn drop(&mut self) {
        // Release the parent chain iteratively: dropping a long chain of
        // sole-owner parents recursively would overflow the native stack.
        let mut next = self.parent.take();
        while let Some(scope) = next {
            next = match Rc::try_unwrap(scope.0) {
                Ok(cell) => cell.into_inner().parent.take(),
                Err(_) => None,
            };
        }
    }
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scope")
            .field("stack", &self.stack.len())
            .field("vars", &self.vars.len())
            .field("has_parent", &self.parent.is_some())
            .field("cuts", &self.cuts)
            .field("safe", &self.safe)
            .finish()
    }
}

/// Shared handle to a scope.
///
/// Cloning takes a reference; dropping releases it. The scope is torn down
/// (stack and variables released, parent released) with the last handle.
#[repr(transparent)]
pub struct ScopeRef(Rc<RefCell<Scope>>);

impl ScopeRef {
    pub fn new(scope: Scope) -> Self {
        ScopeRef(Rc::new(RefCell::new(scope)))
    }

    #[inline]
    pub fn borrow(&self) -> Ref<'_, Scope> {
        self.0.borrow()
    }

    #[inline]
    pub fn borrow_mut(&self) -> RefMut<'_, Scope> {
        self.0.borrow_mut()
    }

    /// Live handles to this scope.
    pub fn refs(&self) -> usize {
        Rc::strong_count(&self.0)
    }

    pub fn ptr_eq(&self, other: &ScopeRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Handle that does not keep the scope alive.
    pub fn downgrade(&self) -> WeakScope {
        WeakScope(Rc::downgrade(&self.0))
    }
}

impl Clone for ScopeRef {
    #[inline]
    fn clone(&self) -> Self {
        ScopeRef(Rc::clone(&self.0))
    }
}

impl fmt::Debug for ScopeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ScopeRef@{}", self.refs())
    }
}

/// Observer handle, for checking whether a scope is still alive.
#[derive(Clone, Debug)]
pub struct WeakScope(std::rc::Weak<RefCell<Scope>>);

impl WeakScope {
    pub fn upgrade(&self) -> Option<ScopeRef> {
        self.0.upgrade().map(ScopeRef)
    }

    pub fn is_alive(&self) -> bool {
        self.0.strong_count() > 0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "Tests can panic")]
mod tests;
