//! Version tokens.

use std::fmt;

/// Opaque token identifying one point-in-time value of a cell.
///
/// A cell starts at [`Version::INITIAL`] and bumps the counter on every
/// write, so two equal versions read from the same cell always refer to the
/// same stored value. Versions from different cells are not comparable in
/// any meaningful way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version(u64);

impl Version {
    /// The version of a freshly seeded cell.
    pub const INITIAL: Version = Version(0);

    /// The version that follows this one.
    pub(crate) fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }

    /// Get the raw counter value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}
