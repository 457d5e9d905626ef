//! Error codes for all runtime diagnostics.
//!
//! The first digit names the component that raised the error.

use std::fmt;

/// Error codes for all runtime diagnostics.
///
/// Format: E#### where first digit indicates component:
/// - E1xxx: Type registry errors
/// - E2xxx: Function registry and dispatch errors
/// - E3xxx: Scope and operand stack errors
/// - E4xxx: Value and record errors
/// - E5xxx: User-raised errors
/// - E9xxx: Internal errors
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ErrorCode {
    // Type Registry Errors (E1xxx)
    /// Type name already registered
    E1001,
    /// Derive edge would create a cycle
    E1002,
    /// Record field declared twice
    E1003,
    /// Type name not registered
    E1004,
    /// Record operation on a non-record type
    E1005,

    // Dispatch Errors (E2xxx)
    /// Implementation arity differs from function arity
    E2001,
    /// No implementation matches the arguments
    E2002,
    /// Function name not declared
    E2003,
    /// No implementation with the given signature
    E2004,
    /// Call depth limit exceeded
    E2005,

    // Scope Errors (E3xxx)
    /// Variable not bound in any enclosing scope
    E3001,
    /// Variable already bound
    E3002,
    /// Attempt to close the root scope
    E3003,
    /// Operand stack empty (or exhausted up to a cut)
    E3004,

    // Value Errors (E4xxx)
    /// Type lacks the capability for an operation
    E4001,
    /// Value type does not match the required type
    E4002,
    /// Record type declares no such field
    E4003,
    /// Constant not defined
    E4004,
    /// Constant already defined
    E4005,
    /// Value cannot be converted or parsed
    E4006,

    // User Errors (E5xxx)
    /// Test assertion failed
    E5001,
    /// Error raised by user code
    E5002,

    // Internal Errors (E9xxx)
    /// Internal invariant violated
    E9001,
    /// Too many errors
    E9002,
}

impl ErrorCode {
    pub const ALL: &'static [ErrorCode] = &[
        ErrorCode::E1001,
        ErrorCode::E1002,
        ErrorCode::E1003,
        ErrorCode::E1004,
        ErrorCode::E1005,
        ErrorCode::E2001,
        ErrorCode::E2002,
        ErrorCode::E2003,
        ErrorCode::E2004,
        ErrorCode::E2005,
        ErrorCode::E3001,
        ErrorCode::E3002,
        ErrorCode::E3003,
        ErrorCode::E3004,
        ErrorCode::E4001,
        ErrorCode::E4002,
        ErrorCode::E4003,
        ErrorCode::E4004,
        ErrorCode::E4005,
        ErrorCode::E4006,
        ErrorCode::E5001,
        ErrorCode::E5002,
        ErrorCode::E9001,
        ErrorCode::E9002,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E1001 => "E1001",
            ErrorCode::E1002 => "E1002",
            ErrorCode::E1003 => "E1003",
            ErrorCode::E1004 => "E1004",
            ErrorCode::E1005 => "E1005",
            ErrorCode::E2001 => "E2001",
            ErrorCode::E2002 => "E2002",
            ErrorCode::E2003 => "E2003",
            ErrorCode::E2004 => "E2004",
            ErrorCode::E2005 => "E2005",
            ErrorCode::E3001 => "E3001",
            ErrorCode::E3002 => "E3002",
            ErrorCode::E3003 => "E3003",
            ErrorCode::E3004 => "E3004",
            ErrorCode::E4001 => "E4001",
            ErrorCode::E4002 => "E4002",
            ErrorCode::E4003 => "E4003",
            ErrorCode::E4004 => "E4004",
            ErrorCode::E4005 => "E4005",
            ErrorCode::E4006 => "E4006",
            ErrorCode::E5001 => "E5001",
            ErrorCode::E5002 => "E5002",
            ErrorCode::E9001 => "E9001",
            ErrorCode::E9002 => "E9002",
        }
    }

    /// One-line description, used by `--explain`-style tooling.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::E1001 => "duplicate type",
            ErrorCode::E1002 => "cyclic type derivation",
            ErrorCode::E1003 => "duplicate record field",
            ErrorCode::E1004 => "unknown type",
            ErrorCode::E1005 => "not a record type",
            ErrorCode::E2001 => "wrong number of arguments",
            ErrorCode::E2002 => "function not applicable",
            ErrorCode::E2003 => "unknown function",
            ErrorCode::E2004 => "unknown implementation",
            ErrorCode::E2005 => "call depth exceeded",
            ErrorCode::E3001 => "unknown variable",
            ErrorCode::E3002 => "attempt to rebind variable",
            ErrorCode::E3003 => "no open scopes",
            ErrorCode::E3004 => "stack is empty",
            ErrorCode::E4001 => "unsupported operation",
            ErrorCode::E4002 => "type mismatch",
            ErrorCode::E4003 => "invalid record field",
            ErrorCode::E4004 => "unknown constant",
            ErrorCode::E4005 => "attempt to rebind constant",
            ErrorCode::E4006 => "invalid value",
            ErrorCode::E5001 => "test failed",
            ErrorCode::E5002 => "user error",
            ErrorCode::E9001 => "internal invariant violated",
            ErrorCode::E9002 => "too many errors",
        }
    }

    pub fn is_type_error(&self) -> bool {
        self.as_str().starts_with("E1")
    }

    pub fn is_dispatch_error(&self) -> bool {
        self.as_str().starts_with("E2")
    }

    pub fn is_scope_error(&self) -> bool {
        self.as_str().starts_with("E3")
    }

    pub fn is_value_error(&self) -> bool {
        self.as_str().starts_with("E4")
    }

    pub fn is_user_error(&self) -> bool {
        self.as_str().starts_with("E5")
    }

    pub fn is_internal_error(&self) -> bool {
        self.as_str().starts_with("E9")
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Parse an error code string like `"E2002"`. Case-insensitive.
impl std::str::FromStr for ErrorCode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.to_uppercase();
        Self::ALL
            .iter()
            .find(|code| code.as_str() == upper)
            .copied()
            .ok_or(())
    }
}

#[cfg(test)]
mod tests;
