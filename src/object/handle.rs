//! Handle Translation
//!
//! Unprivileged tasks never see a kernel object's real address. They hold an
//! [`ExternalHandle`]: the object's pool index plus [`INDEX_OFFSET`], so that
//! zero stays free to mean "no object".
//!
//! ```text
//!   external handle   0      1      2     ...   POOL_SIZE
//!                     │      │      │              │
//!                    NULL    ▼      ▼              ▼
//!   pool index              0      1     ...   POOL_SIZE - 1
//! ```

use crate::config::POOL_SIZE;

/// Offset between a pool index and the external handle that names it.
pub const INDEX_OFFSET: usize = 1;

/// An opaque object handle as seen by application code.
///
/// The raw value travels through system call registers untouched, so it is
/// kept at register width. Truncating it would let an out-of-range value
/// alias a valid one.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
#[repr(transparent)]
pub struct ExternalHandle(usize);

impl ExternalHandle {
    /// The null handle. Never names an object.
    pub const NULL: Self = Self(0);

    /// Wrap a raw handle value received from application code.
    #[inline]
    pub const fn from_raw(raw: usize) -> Self {
        Self(raw)
    }

    /// Raw handle value for returning to application code.
    #[inline]
    pub const fn raw(self) -> usize {
        self.0
    }

    #[inline]
    pub const fn is_null(self) -> bool {
        self.0 == 0
    }

    /// Check that this handle lies in the range the pool can name.
    ///
    /// Says nothing about whether the slot is live.
    #[inline]
    pub const fn is_valid(self) -> bool {
        self.0 >= INDEX_OFFSET && self.0 < POOL_SIZE + INDEX_OFFSET
    }

    /// Translate to the pool index this handle names.
    ///
    /// Returns None for null and out-of-range handles.
    #[inline]
    pub const fn to_internal(self) -> Option<PoolIndex> {
        if self.is_valid() {
            Some(PoolIndex(self.0 - INDEX_OFFSET))
        } else {
            None
        }
    }
}

impl Default for ExternalHandle {
    fn default() -> Self {
        Self::NULL
    }
}

/// An index into the kernel object pool.
///
/// Constructed only from in-range values, so indexing the pool with it never
/// goes out of bounds.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
#[repr(transparent)]
pub struct PoolIndex(usize);

impl PoolIndex {
    /// Create a pool index.
    ///
    /// Returns None if the index is out of range.
    #[inline]
    pub const fn new(index: usize) -> Option<Self> {
        if index < POOL_SIZE {
            Some(Self(index))
        } else {
            None
        }
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0
    }

    /// The external handle that names this slot.
    #[inline]
    pub const fn to_external(self) -> ExternalHandle {
        ExternalHandle(self.0 + INDEX_OFFSET)
    }
}
