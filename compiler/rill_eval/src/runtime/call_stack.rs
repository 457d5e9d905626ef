//! Call depth tracking.

use rill_ir::Name;

/// Active implementation and closure calls, innermost last.
///
/// Closures are recorded under [`Name::EMPTY`].
#[derive(Clone, Debug)]
pub struct CallStack {
    frames: Vec<Name>,
    max_depth: Option<usize>,
}

impl CallStack {
    /// `None` means unlimited.
    pub fn new(max_depth: Option<usize>) -> Self {
        CallStack {
            frames: Vec::new(),
            max_depth,
        }
    }

    /// Push a frame, or report the limit that would be exceeded.
    pub fn push(&mut self, func: Name) -> Result<(), usize> {
        if let Some(max) = self.max_depth {
            if self.frames.len() >= max {
                return Err(max);
            }
        }
        self.frames.push(func);
        Ok(())
    }

    pub fn pop(&mut self) {
        debug_assert!(!self.frames.is_empty(), "CallStack::pop() on empty stack");
        self.frames.pop();
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn frames(&self) -> &[Name] {
        &self.frames
    }
}
