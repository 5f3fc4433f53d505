//! Per-Task Access Control
//!
//! Records which pool slots each task may use. Rows are keyed by the pool
//! index of the task itself, so only tasks that live in the pool can hold
//! grants.
//!
//! # Security Properties
//! - Deny by default: a fresh table grants nothing
//! - Freeing a slot clears both its row and its column, so a recycled index
//!   never inherits the previous occupant's grants

use crate::config::{ACL_WORDS, POOL_SIZE};
use crate::object::PoolIndex;

/// Bitmap of pool slots one task may access.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct AccessBitmap([u32; ACL_WORDS]);

impl AccessBitmap {
    pub const EMPTY: Self = Self([0; ACL_WORDS]);

    #[inline]
    const fn position(object: PoolIndex) -> (usize, u32) {
        (object.index() / 32, 1 << (object.index() % 32))
    }

    #[inline]
    pub fn insert(&mut self, object: PoolIndex) {
        let (word, bit) = Self::position(object);
        self.0[word] |= bit;
    }

    #[inline]
    pub fn remove(&mut self, object: PoolIndex) {
        let (word, bit) = Self::position(object);
        self.0[word] &= !bit;
    }

    #[inline]
    pub fn contains(&self, object: PoolIndex) -> bool {
        let (word, bit) = Self::position(object);
        self.0[word] & bit != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|&word| word == 0)
    }
}

/// Access table for every task in the pool.
#[derive(Debug)]
pub struct AccessTable {
    rows: [AccessBitmap; POOL_SIZE],
}

impl AccessTable {
    pub const fn new() -> Self {
        Self {
            rows: [AccessBitmap::EMPTY; POOL_SIZE],
        }
    }

    /// Allow `task` to use `object`.
    pub fn grant(&mut self, task: PoolIndex, object: PoolIndex) {
        self.rows[task.index()].insert(object);
    }

    /// Withdraw a grant. Revoking an absent grant is a no-op.
    pub fn revoke(&mut self, task: PoolIndex, object: PoolIndex) {
        self.rows[task.index()].remove(object);
    }

    #[inline]
    pub fn is_granted(&self, task: PoolIndex, object: PoolIndex) -> bool {
        self.rows[task.index()].contains(object)
    }

    /// Drop every grant held by or naming `slot`.
    pub fn forget(&mut self, slot: PoolIndex) {
        self.rows[slot.index()] = AccessBitmap::EMPTY;
        for row in self.rows.iter_mut() {
            row.remove(slot);
        }
    }

    pub fn grants_of(&self, task: PoolIndex) -> &AccessBitmap {
        &self.rows[task.index()]
    }
}

impl Default for AccessTable {
    fn default() -> Self {
        Self::new()
    }
}
