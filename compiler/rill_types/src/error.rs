//! Type registry errors.

use rill_diagnostic::ErrorCode;
use thiserror::Error;

/// Failure of a registry operation. The registry is unchanged afterwards.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum TypeError {
    #[error("Duplicate type: {name}")]
    DuplicateType { name: String },

    #[error("Deriving {child} from {parent} would create a cycle")]
    CycleDetected { child: String, parent: String },

    #[error("Duplicate field {field} in {record}")]
    DuplicateField { record: String, field: String },

    #[error("Unknown type: {name}")]
    UnknownType { name: String },

    #[error("{name} is not a record type")]
    NotARecord { name: String },
}

impl TypeError {
    pub fn code(&self) -> ErrorCode {
        match self {
            TypeError::DuplicateType { .. } => ErrorCode::E1001,
            TypeError::CycleDetected { .. } => ErrorCode::E1002,
            TypeError::DuplicateField { .. } => ErrorCode::E1003,
            TypeError::UnknownType { .. } => ErrorCode::E1004,
            TypeError::NotARecord { .. } => ErrorCode::E1005,
        }
    }
}
