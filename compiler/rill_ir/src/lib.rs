//! Shared identifiers for the Rill runtime.
//!
//! Everything the runtime keys by identifier (variables, record fields,
//! function names, symbol values) uses an interned [`Name`]. Diagnostics
//! point at a [`Pos`] handed in by the compiler front end.

mod interner;
mod name;
mod pos;

pub use interner::{InternError, SharedInterner, StringInterner};
pub use name::Name;
pub use pos::Pos;
