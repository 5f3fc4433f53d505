//! Kernel Object Pool
//!
//! A fixed table mapping pool indices to kernel objects.
//!
//! # Design
//! - Fixed-size array of slots, one per nameable object
//! - Creation is two-phase: `allocate_slot` reserves, `store` fills
//! - A reserved slot is never returned by lookups
//! - All lookups are bounded scans or direct indexing; nothing allocates
//!
//! # Invariants
//! - A slot is Free, Reserved, or holds exactly one live object
//! - No two live slots hold the same internal handle
//!
//! The pool does no locking of its own. Callers serialize access.

use crate::config::POOL_SIZE;

use super::handle::PoolIndex;
use super::kind::{KernelObject, ObjectKind, PoolObject, TimerCallback, TimerHandle};

/// The kernel object pool.
#[derive(Debug)]
pub struct ObjectPool {
    slots: [KernelObject; POOL_SIZE],
}

impl ObjectPool {
    /// Create a pool with every slot free.
    pub const fn new() -> Self {
        const FREE: KernelObject = KernelObject::Free;
        Self {
            slots: [FREE; POOL_SIZE],
        }
    }

    /// Reserve the first free slot.
    ///
    /// Returns None when every slot is reserved or live.
    pub fn allocate_slot(&mut self) -> Option<PoolIndex> {
        let index = self.slots.iter().position(KernelObject::is_free)?;
        self.slots[index] = KernelObject::Reserved;
        PoolIndex::new(index)
    }

    /// Return a reserved or live slot to the free state.
    ///
    /// # Panics
    /// Panics if the slot is already free (double free).
    pub fn free_slot(&mut self, index: PoolIndex) {
        let slot = &mut self.slots[index.index()];
        if slot.is_free() {
            panic!("double free of pool slot {}", index.index());
        }
        *slot = KernelObject::Free;
    }

    /// Free the slot at `index` only if it still holds `handle`.
    ///
    /// Returns false, leaving the slot alone, if it is free or has been
    /// reused for another object.
    pub fn free_if<T: PoolObject>(&mut self, index: PoolIndex, handle: T) -> bool {
        if self.get::<T>(index) != Some(handle) {
            return false;
        }
        self.slots[index.index()] = KernelObject::Free;
        true
    }

    /// Fill a reserved slot with a newly created object.
    ///
    /// # Panics
    /// Panics if the slot was not reserved, if `object` is not a live
    /// object, or if the object is already stored elsewhere. Each of these
    /// means the caller's bookkeeping is corrupt.
    pub fn store(&mut self, index: PoolIndex, object: KernelObject) {
        if !matches!(self.slots[index.index()], KernelObject::Reserved) {
            panic!("store into unreserved pool slot {}", index.index());
        }
        let Some(raw) = object.raw() else {
            panic!("store of non-object into pool slot {}", index.index());
        };
        let kind = object.kind();
        if self
            .slots
            .iter()
            .any(|slot| slot.kind() == kind && slot.raw() == Some(raw))
        {
            panic!("{:?} {:#x} already stored in pool", kind, raw);
        }
        self.slots[index.index()] = object;
    }

    /// Find the slot holding `handle`.
    pub fn lookup_by_handle<T: PoolObject>(&self, handle: T) -> Option<PoolIndex> {
        self.slots
            .iter()
            .position(|slot| T::from_slot(slot) == Some(handle))
            .and_then(PoolIndex::new)
    }

    /// Get the handle at `index` if the slot holds an object of kind `T`.
    #[inline]
    pub fn get<T: PoolObject>(&self, index: PoolIndex) -> Option<T> {
        T::from_slot(&self.slots[index.index()])
    }

    /// Kind of the object at `index`.
    #[inline]
    pub fn kind(&self, index: PoolIndex) -> ObjectKind {
        self.slots[index.index()].kind()
    }

    /// Find a timer and the application callback registered for it.
    pub fn lookup_timer(&self, timer: TimerHandle) -> Option<(PoolIndex, TimerCallback)> {
        let index = self.lookup_by_handle(timer)?;
        let callback = self.slots[index.index()].timer_callback()?;
        Some((index, callback))
    }

    /// Number of slots holding live objects.
    pub fn live_count(&self) -> usize {
        self.slots
            .iter()
            .filter(|slot| slot.kind() != ObjectKind::Invalid)
            .count()
    }
}

impl Default for ObjectPool {
    fn default() -> Self {
        Self::new()
    }
}
