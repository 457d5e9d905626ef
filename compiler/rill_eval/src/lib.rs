//! Rill Eval - runtime core for the Rill concatenative language.
//!
//! # Architecture
//!
//! - `Runtime`: the explicit evaluation context owning both registries,
//!   the open-scope sequence, constants and accumulated diagnostics
//! - `Value`: a type tag plus payload; copy is `Clone`, teardown is `Drop`
//! - `ValueOps`: capability-checked equality, ordering, cloning,
//!   iteration and formatting
//! - `FunctionRegistry`: multi-argument dispatch over the type registry
//! - `Scope`: an operand stack plus variables, chained to a parent
//!
//! Compiled code is opaque here; hosts plug in a [`CodeRunner`] to execute
//! implementation bodies and closures.

pub mod errors;
mod func;
mod heap;
mod library;
mod ops;
mod print_handler;
mod runtime;
mod scope;
pub mod value;

pub use errors::{EvalError, EvalErrorKind, EvalResult};
pub use func::{
    signature_of, Action, CodeRange, CodeRunner, Function, FunctionRegistry, ImplRef,
    Implementation, NativeFn, Param, TieBreak,
};
pub use heap::Heap;
pub use ops::{Render, ValueOps};
pub use print_handler::{
    buffer_handler, silent_handler, stdout_handler, PrintHandler, SharedPrintHandler,
};
pub use runtime::{Builtins, CallStack, Constructor, Runtime, RuntimeBuilder, RuntimeConfig};
pub use scope::{Cut, Scope, ScopeError, ScopeRef, WeakScope};
pub use value::{Payload, Value};

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for debug output.
///
/// Safe to call multiple times. Enable with `RUST_LOG=rill_eval=debug` or
/// `RUST_LOG=rill_eval=trace`.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}
