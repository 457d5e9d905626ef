//! Per-type capability flags.
//!
//! A type supports an optional value operation only if its entry carries
//! the matching flag. The runtime checks the flag before touching the
//! payload, so "this type cannot be compared" surfaces as an ordinary
//! unsupported-operation error instead of a fallback behavior.

use bitflags::bitflags;

bitflags! {
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct Capabilities: u16 {
        /// Default construction.
        const NEW = 1 << 0;
        /// Deep, independent duplication.
        const CLONE = 1 << 1;
        /// O(1) identity comparison.
        const EQUID = 1 << 2;
        /// Structural equality.
        const EQVAL = 1 << 3;
        /// Three-way ordering.
        const CMP = 1 << 4;
        /// Truthiness.
        const OK = 1 << 5;
        /// Produce an iterator.
        const ITER = 1 << 6;
        /// Re-readable rendering.
        const WRITE = 1 << 7;
        /// Debug rendering.
        const DUMP = 1 << 8;
        /// User-facing rendering.
        const PRINT = 1 << 9;
        /// Invocable.
        const CALL = 1 << 10;

        /// Write, dump and print.
        const FORMAT = Self::WRITE.bits() | Self::DUMP.bits() | Self::PRINT.bits();

        /// What every record type supports.
        const RECORD = Self::NEW.bits()
            | Self::CLONE.bits()
            | Self::EQUID.bits()
            | Self::EQVAL.bits()
            | Self::OK.bits()
            | Self::FORMAT.bits();
    }
}

impl Capabilities {
    /// Operation name for error messages. Only meaningful for single flags.
    pub fn op_name(self) -> &'static str {
        match self {
            c if c == Self::NEW => "new",
            c if c == Self::CLONE => "clone",
            c if c == Self::EQUID => "equid",
            c if c == Self::EQVAL => "eqval",
            c if c == Self::CMP => "cmp",
            c if c == Self::OK => "ok",
            c if c == Self::ITER => "iter",
            c if c == Self::WRITE => "write",
            c if c == Self::DUMP => "dump",
            c if c == Self::PRINT => "print",
            c if c == Self::CALL => "call",
            _ => "operation",
        }
    }
}
