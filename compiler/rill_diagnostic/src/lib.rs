//! Diagnostics for the Rill runtime.
//!
//! Every recoverable failure becomes one [`Diagnostic`] carrying an
//! [`ErrorCode`], a message and the source position the compiler handed
//! the runtime. Diagnostics accumulate in a [`DiagnosticQueue`] so a
//! failing evaluation can report everything that went wrong, not just the
//! first error.
//!
//! Broken runtime invariants are not diagnostics: [`invariant_violation`]
//! logs and aborts.

mod diagnostic;
mod error_code;
pub mod queue;

pub use diagnostic::{Diagnostic, Severity};
pub use error_code::ErrorCode;
pub use queue::{DiagnosticConfig, DiagnosticQueue};

/// Abort the process after a broken runtime invariant.
///
/// Reference counts going negative or an operand stack released twice
/// mean the runtime state is already corrupt; continuing would only
/// produce wrong answers later.
#[cold]
#[inline(never)]
pub fn invariant_violation(msg: &str) -> ! {
    tracing::error!(code = %ErrorCode::E9001, "internal invariant violated: {msg}");
    eprintln!("error[{}]: internal invariant violated: {msg}", ErrorCode::E9001);
    std::process::abort()
}
