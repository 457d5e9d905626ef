//! `RuntimeBuilder` for creating configured runtimes.

use std::rc::Rc;

use rill_ir::SharedInterner;

use super::Runtime;
use crate::func::{CodeRunner, TieBreak};
use crate::{stdout_handler, SharedPrintHandler};

/// Runtime settings.
#[derive(Clone)]
pub struct RuntimeConfig {
    /// Maximum number of recorded errors (0 = unlimited).
    pub error_limit: usize,
    /// Drop an error identical to the one just recorded.
    pub deduplicate_errors: bool,
    pub tie_break: TieBreak,
    /// Cache dispatch results per argument-type tuple.
    pub dispatch_cache: bool,
    /// Nested implementation/closure calls allowed (`None` = unlimited).
    pub max_call_depth: Option<usize>,
    /// Safe flag of the root scope, inherited by every scope opened under it.
    pub safe: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        RuntimeConfig {
            error_limit: 0,
            deduplicate_errors: false,
            tie_break: TieBreak::FirstRegistered,
            dispatch_cache: true,
            max_call_depth: Some(10_000),
            safe: true,
        }
    }
}

/// Builder for [`Runtime`].
///
/// ```text
/// let rt = RuntimeBuilder::new()
///     .tie_break(TieBreak::RejectAmbiguous)
///     .print_handler(buffer_handler())
///     .build();
/// ```
#[derive(Default)]
pub struct RuntimeBuilder {
    config: RuntimeConfig,
    interner: Option<SharedInterner>,
    print_handler: Option<SharedPrintHandler>,
    runner: Option<Rc<dyn CodeRunner>>,
}

impl RuntimeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn error_limit(mut self, limit: usize) -> Self {
        self.config.error_limit = limit;
        self
    }

    #[must_use]
    pub fn deduplicate_errors(mut self, enabled: bool) -> Self {
        self.config.deduplicate_errors = enabled;
        self
    }

    #[must_use]
    pub fn tie_break(mut self, tie_break: TieBreak) -> Self {
        self.config.tie_break = tie_break;
        self
    }

    #[must_use]
    pub fn dispatch_cache(mut self, enabled: bool) -> Self {
        self.config.dispatch_cache = enabled;
        self
    }

    #[must_use]
    pub fn max_call_depth(mut self, depth: Option<usize>) -> Self {
        self.config.max_call_depth = depth;
        self
    }

    #[must_use]
    pub fn safe(mut self, safe: bool) -> Self {
        self.config.safe = safe;
        self
    }

    /// Share an interner with other runtimes or the compiler.
    #[must_use]
    pub fn interner(mut self, interner: SharedInterner) -> Self {
        self.interner = Some(interner);
        self
    }

    /// Where `print`, `write` and `dump` output goes. Default is stdout.
    #[must_use]
    pub fn print_handler(mut self, handler: SharedPrintHandler) -> Self {
        self.print_handler = Some(handler);
        self
    }

    /// Executor for compiled implementation bodies and closures.
    #[must_use]
    pub fn runner(mut self, runner: Rc<dyn CodeRunner>) -> Self {
        self.runner = Some(runner);
        self
    }

    pub fn build(self) -> Runtime {
        Runtime::from_parts(
            self.config,
            self.interner.unwrap_or_default(),
            self.print_handler.unwrap_or_else(stdout_handler),
            self.runner,
        )
    }
}
