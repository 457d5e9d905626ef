//! Type registry for the Rill runtime.
//!
//! Types form a DAG through multiple inheritance. Traits are types that
//! only ever act as supertypes. Every dispatch and runtime type check
//! reduces to [`TypeRegistry::is_subtype`], so each type keeps its full
//! ancestor set as a bitset that derive edges update eagerly.
//!
//! Record types additionally own a field table that can be cleared and
//! re-declared in place without changing the type's identity.

mod ancestors;
mod error;
mod flags;
mod idx;
mod record;
mod registry;

pub use ancestors::AncestorSet;
pub use error::TypeError;
pub use flags::Capabilities;
pub use idx::TypeId;
pub use record::{FieldDef, RecordDef};
pub use registry::{TypeEntry, TypeRegistry};
