//! Closures.

use std::fmt;

use crate::func::CodeRange;
use crate::scope::ScopeRef;

/// Compiled code plus the scope it runs relative to.
///
/// The edge points from closure to scope only; scopes never refer back to
/// the closures that capture them.
pub struct Lambda {
    pub scope: ScopeRef,
    pub code: CodeRange,
}

impl fmt::Debug for Lambda {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lambda")
            .field("code", &self.code)
            .field("scope_refs", &self.scope.refs())
            .finish()
    }
}
