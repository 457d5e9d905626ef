//! Error types for evaluation.
//!
//! `EvalErrorKind` carries structured data for each failure so callers can
//! match on it; its `Display` is the message recorded in the runtime's
//! diagnostic queue. [`EvalError`] adds the source position that was
//! current when the failure was raised.

use std::fmt;

use rill_diagnostic::{Diagnostic, ErrorCode};
use rill_ir::Pos;
use rill_types::TypeError;
use thiserror::Error;

/// Result of a runtime operation.
pub type EvalResult<T> = Result<T, EvalError>;

/// Typed error category.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum EvalErrorKind {
    // Registry
    #[error(transparent)]
    Type(#[from] TypeError),
    #[error("Wrong number of args for {func}: expected {expected}, actual {found}")]
    ArityMismatch {
        func: String,
        expected: usize,
        found: usize,
    },

    // Dispatch
    #[error("Func not applicable: {func}")]
    NotApplicable {
        func: String,
        /// Argument types as seen on the stack, deepest first.
        args: String,
        /// Signatures that tied when ambiguity is rejected.
        ambiguous: Option<String>,
    },
    #[error("Unknown func: {name}")]
    UnknownFunction { name: String },
    #[error("Unknown implementation: {func}<{signature}>")]
    UnknownImplementation { func: String, signature: String },
    #[error("Call depth exceeded: {depth}")]
    StackOverflow { depth: usize },

    // Scope
    #[error("Unknown var: {name}")]
    UnknownVar { name: String },
    #[error("Attempt to rebind var: {name}")]
    RebindRefused { name: String },
    #[error("No open scopes")]
    NoOpenScope,
    #[error("Stack is empty")]
    EmptyStack,

    // Values
    #[error("{ty} does not support {op}")]
    UnsupportedOperation { op: &'static str, ty: String },
    #[error("Expected type {expected}, actual: {found}")]
    TypeMismatch { expected: String, found: String },
    #[error("Invalid field: {field} in {record}")]
    InvalidField { record: String, field: String },
    #[error("Unknown const: {name}")]
    UnknownConst { name: String },
    #[error("Attempt to rebind const: {name}")]
    RebindConst { name: String },
    #[error("Invalid {what}: '{input}'")]
    InvalidValue { what: &'static str, input: String },

    // User
    #[error("Test failed")]
    TestFailed,
    #[error("{message}")]
    Custom { message: String },
}

impl EvalErrorKind {
    pub fn code(&self) -> ErrorCode {
        match self {
            EvalErrorKind::Type(e) => e.code(),
            EvalErrorKind::ArityMismatch { .. } => ErrorCode::E2001,
            EvalErrorKind::NotApplicable { .. } => ErrorCode::E2002,
            EvalErrorKind::UnknownFunction { .. } => ErrorCode::E2003,
            EvalErrorKind::UnknownImplementation { .. } => ErrorCode::E2004,
            EvalErrorKind::StackOverflow { .. } => ErrorCode::E2005,
            EvalErrorKind::UnknownVar { .. } => ErrorCode::E3001,
            EvalErrorKind::RebindRefused { .. } => ErrorCode::E3002,
            EvalErrorKind::NoOpenScope => ErrorCode::E3003,
            EvalErrorKind::EmptyStack => ErrorCode::E3004,
            EvalErrorKind::UnsupportedOperation { .. } => ErrorCode::E4001,
            EvalErrorKind::TypeMismatch { .. } => ErrorCode::E4002,
            EvalErrorKind::InvalidField { .. } => ErrorCode::E4003,
            EvalErrorKind::UnknownConst { .. } => ErrorCode::E4004,
            EvalErrorKind::RebindConst { .. } => ErrorCode::E4005,
            EvalErrorKind::InvalidValue { .. } => ErrorCode::E4006,
            EvalErrorKind::TestFailed => ErrorCode::E5001,
            EvalErrorKind::Custom { .. } => ErrorCode::E5002,
        }
    }

    /// Build the diagnostic recorded for this failure.
    pub fn to_diagnostic(&self, pos: Option<Pos>) -> Diagnostic {
        let diag = Diagnostic::error(self.code())
            .with_message(self.to_string())
            .with_pos(pos);
        match self {
            EvalErrorKind::NotApplicable {
                args, ambiguous, ..
            } => {
                let diag = diag.with_note(format!("argument types: ({args})"));
                match ambiguous {
                    Some(sigs) => diag.with_note(format!("ambiguous between {sigs}")),
                    None => diag,
                }
            }
            _ => diag,
        }
    }
}

/// A raised failure. By the time one of these exists its diagnostic has
/// already been recorded; propagate it with `?`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EvalError {
    pub kind: EvalErrorKind,
    pub pos: Option<Pos>,
}

impl EvalError {
    pub fn new(kind: EvalErrorKind, pos: Option<Pos>) -> Self {
        EvalError { kind, pos }
    }

    pub fn code(&self) -> ErrorCode {
        self.kind.code()
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.pos {
            Some(pos) => write!(f, "{} at {pos}", self.kind),
            None => write!(f, "{}", self.kind),
        }
    }
}

impl std::error::Error for EvalError {}

/// Shorthand for an unsupported-operation error.
#[cold]
pub fn unsupported(op: &'static str, ty: &str) -> EvalErrorKind {
    EvalErrorKind::UnsupportedOperation {
        op,
        ty: ty.to_owned(),
    }
}

/// Shorthand for a type mismatch.
#[cold]
pub fn type_mismatch(expected: &str, found: &str) -> EvalErrorKind {
    EvalErrorKind::TypeMismatch {
        expected: expected.to_owned(),
        found: found.to_owned(),
    }
}
