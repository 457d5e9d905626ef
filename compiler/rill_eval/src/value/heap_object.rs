//! Extension point for heap types defined outside the runtime.

use std::any::Any;
use std::cmp::Ordering;
use std::fmt;
use std::rc::Rc;

use super::ValueIter;

/// Marker returned by capabilities a heap object does not implement.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Unsupported;

/// A library-defined heap payload.
///
/// Copy shares the object and dropping the last copy drops it, so only the
/// optional capabilities need implementing. Each defaults to
/// [`Unsupported`]; the type must also carry the matching
/// [`Capabilities`](rill_types::Capabilities) flag for the runtime to call
/// it.
pub trait HeapObject: fmt::Debug {
    fn as_any(&self) -> &dyn Any;

    fn clone_object(&self) -> Result<Rc<dyn HeapObject>, Unsupported> {
        Err(Unsupported)
    }

    /// `other` has the same type as `self`.
    fn eqval(&self, _other: &dyn HeapObject) -> Result<bool, Unsupported> {
        Err(Unsupported)
    }

    fn cmp(&self, _other: &dyn HeapObject) -> Result<Ordering, Unsupported> {
        Err(Unsupported)
    }

    fn ok(&self) -> Result<bool, Unsupported> {
        Err(Unsupported)
    }

    fn iter(&self) -> Result<ValueIter, Unsupported> {
        Err(Unsupported)
    }

    fn write(&self, _out: &mut String) -> Result<(), Unsupported> {
        Err(Unsupported)
    }

    fn dump(&self, out: &mut String) -> Result<(), Unsupported> {
        self.write(out)
    }

    fn print(&self, out: &mut String) -> Result<(), Unsupported> {
        self.write(out)
    }
}
