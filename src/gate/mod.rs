//! Kernel Object Gate
//!
//! Every kernel call made on behalf of an unprivileged task passes through
//! a [`Gateway`]. It translates external handles, enforces per-object
//! access control, checks every buffer against the caller's MPU regions,
//! and only then forwards to the trusted kernel primitive.
//!
//! # Design
//! - The object pool and access table share one lock
//! - An access check and the lookup it guards run under one acquisition
//! - The lock is only taken inside a port critical section, so interrupt
//!   handlers can use it without deadlocking against a preempted task
//! - The lock is never held across a kernel primitive
//! - Slot reservation also suspends the scheduler so concurrent creators
//!   serialize without masking interrupts for longer than the scan
//!
//! # Call Shape
//! ```text
//! external handle ──► range check ──► access check ──► kind-checked get
//!                                                            │
//!               failure value ◄── reject          kernel primitive
//! ```
//!
//! Rejections are logged at debug level and collapsed to the failure value
//! of the call, so an unprivileged caller cannot learn why it failed.

#[cfg(feature = "event-groups")]
mod event_group;
mod queue;
#[cfg(feature = "stream-buffers")]
mod stream_buffer;
mod task;
#[cfg(feature = "timers")]
mod timer;

use log::{debug, trace};
use spin::Mutex;

use crate::access::AccessTable;
use crate::config::ACCESS_CONTROL_LIST;
use crate::error::{GateError, GateResult};
use crate::kernel::{Kernel, Port, Regions};
use crate::object::{ExternalHandle, KernelObject, ObjectPool, PoolIndex, PoolObject, TaskHandle, TimerHandle};
use crate::syscall::validate::{self, Permissions, UserPtr};

/// Pool and access table, guarded together.
#[derive(Debug)]
struct GateState {
    pool: ObjectPool,
    access: AccessTable,
}

/// The kernel object gate.
///
/// # Type Parameters
/// * `K` - Trusted kernel primitives
/// * `P` - Architecture port
pub struct Gateway<K, P> {
    kernel: K,
    port: P,
    state: Mutex<GateState>,
}

impl GateState {
    /// Whether `task` holds a grant for `object`.
    fn may_use(&self, task: Option<TaskHandle>, object: PoolIndex) -> bool {
        task.and_then(|task| self.pool.lookup_by_handle(task))
            .is_some_and(|row| self.access.is_granted(row, object))
    }
}

/// Holds the scheduler suspended for its lifetime.
struct SchedulerSuspended<'a, K: Kernel>(&'a K);

impl<'a, K: Kernel> SchedulerSuspended<'a, K> {
    fn new(kernel: &'a K) -> Self {
        kernel.suspend_all();
        Self(kernel)
    }
}

impl<K: Kernel> Drop for SchedulerSuspended<'_, K> {
    fn drop(&mut self) {
        self.0.resume_all();
    }
}

/// Collapse a rejection to the failure value of the call.
pub(crate) trait OrFail<T> {
    fn or_fail(self, call: &'static str, failure: T) -> T;
}

impl<T> OrFail<T> for GateResult<T> {
    #[inline]
    fn or_fail(self, call: &'static str, failure: T) -> T {
        match self {
            Ok(value) => value,
            Err(error) => {
                debug!("{}: rejected: {}", call, error);
                failure
            }
        }
    }
}

/// Fail with `error` unless `condition` holds.
#[inline]
pub(crate) fn ensure(condition: bool, error: GateError) -> GateResult<()> {
    if condition {
        Ok(())
    } else {
        Err(error)
    }
}

impl<K: Kernel, P: Port> Gateway<K, P> {
    /// Create a gate with an empty pool.
    pub const fn new(kernel: K, port: P) -> Self {
        Self {
            kernel,
            port,
            state: Mutex::new(GateState {
                pool: ObjectPool::new(),
                access: AccessTable::new(),
            }),
        }
    }

    pub fn kernel(&self) -> &K {
        &self.kernel
    }

    pub fn port(&self) -> &P {
        &self.port
    }

    #[inline]
    fn with_state<R>(&self, f: impl FnOnce(&mut GateState) -> R) -> R {
        self.port.critical_section(|| f(&mut self.state.lock()))
    }

    // ---------------------------------------------------------------------
    // Pool bookkeeping
    // ---------------------------------------------------------------------

    fn reserve_slot(&self) -> GateResult<PoolIndex> {
        let _suspended = SchedulerSuspended::new(&self.kernel);
        self.with_state(|state| state.pool.allocate_slot())
            .ok_or(GateError::PoolExhausted)
    }

    /// Free a reserved slot and drop every grant that mentions it.
    fn release_slot(&self, index: PoolIndex) {
        self.with_state(|state| {
            state.pool.free_slot(index);
            state.access.forget(index);
        });
        trace!("released pool slot {}", index.index());
    }

    /// Free the slot of a deleted object, unless it has been reused.
    fn release_object<T: PoolObject>(&self, index: PoolIndex, handle: T) {
        let released = self.with_state(|state| {
            let released = state.pool.free_if(index, handle);
            if released {
                state.access.forget(index);
            }
            released
        });
        if released {
            trace!("released pool slot {}", index.index());
        } else {
            debug!("pool slot {} no longer holds {:?}", index.index(), handle);
        }
    }

    /// Reserve a slot, create the object, and record it.
    ///
    /// The reservation is returned to the pool if `create` fails.
    fn install(&self, create: impl FnOnce() -> Option<KernelObject>) -> GateResult<PoolIndex> {
        let index = self.reserve_slot()?;
        match create() {
            Some(object) => {
                self.with_state(|state| state.pool.store(index, object));
                trace!("installed {:?} at pool slot {}", object.kind(), index.index());
                Ok(index)
            }
            None => {
                self.release_slot(index);
                Err(GateError::Kernel)
            }
        }
    }

    fn index_of<T: PoolObject>(&self, handle: T) -> Option<PoolIndex> {
        self.with_state(|state| state.pool.lookup_by_handle(handle))
    }

    /// External handle for an internal one; null if it is not in the pool.
    fn externalize<T: PoolObject>(&self, handle: Option<T>) -> ExternalHandle {
        handle
            .and_then(|handle| self.index_of(handle))
            .map_or(ExternalHandle::NULL, PoolIndex::to_external)
    }

    fn calling_task_index(&self) -> Option<PoolIndex> {
        let current = self.kernel.current_task()?;
        self.index_of(current)
    }

    /// Number of live objects in the pool.
    pub fn live_objects(&self) -> usize {
        self.with_state(|state| state.pool.live_count())
    }

    // ---------------------------------------------------------------------
    // Handle resolution
    // ---------------------------------------------------------------------

    /// Range-check `handle`, then check access and kind in one critical
    /// section so the slot cannot be reused between the two.
    fn resolve_entry<T: PoolObject>(
        &self,
        handle: ExternalHandle,
        check_access: bool,
    ) -> GateResult<(PoolIndex, T)> {
        let index = handle.to_internal().ok_or(GateError::BadHandle)?;
        let caller = (check_access && self.access_enforced()).then(|| self.kernel.current_task());
        self.with_state(|state| -> GateResult<(PoolIndex, T)> {
            if let Some(current) = caller {
                ensure(state.may_use(current, index), GateError::Unauthorized)?;
            }
            let object = state.pool.get::<T>(index).ok_or(GateError::BadHandle)?;
            Ok((index, object))
        })
    }

    /// Resolve a handle held by the calling task.
    fn resolve<T: PoolObject>(&self, handle: ExternalHandle) -> GateResult<T> {
        self.resolve_entry(handle, true).map(|(_, object)| object)
    }

    /// Resolve a handle without an access check, for interrupt handlers and
    /// privileged-only calls.
    pub(crate) fn resolve_trusted<T: PoolObject>(&self, handle: ExternalHandle) -> GateResult<T> {
        self.resolve_entry(handle, false).map(|(_, object)| object)
    }

    /// Resolve a task handle where null means the calling task.
    fn resolve_task(&self, handle: ExternalHandle) -> GateResult<Option<TaskHandle>> {
        if handle.is_null() {
            Ok(None)
        } else {
            self.resolve(handle).map(Some)
        }
    }

    fn resolve_task_trusted(&self, handle: ExternalHandle) -> GateResult<Option<TaskHandle>> {
        if handle.is_null() {
            Ok(None)
        } else {
            self.resolve_trusted(handle).map(Some)
        }
    }

    /// True while the scheduler is suspended; blocking is forbidden then.
    fn scheduler_suspended(&self) -> bool {
        self.kernel.scheduler_state() == crate::kernel::SchedulerState::Suspended
    }

    // ---------------------------------------------------------------------
    // Access control
    // ---------------------------------------------------------------------

    /// Whether grants are enforced for the current call.
    ///
    /// Start-up code and privileged tasks may use everything.
    fn access_enforced(&self) -> bool {
        ACCESS_CONTROL_LIST && self.port.scheduler_running() && !self.port.is_privileged()
    }

    /// Whether the calling task may use the object at `object`.
    pub fn is_authorized(&self, object: PoolIndex) -> bool {
        if !self.access_enforced() {
            return true;
        }
        let current = self.kernel.current_task();
        self.with_state(|state| state.may_use(current, object))
    }

    fn access_row(&self, task: ExternalHandle) -> GateResult<PoolIndex> {
        if task.is_null() {
            self.calling_task_index().ok_or(GateError::BadHandle)
        } else {
            self.resolve_entry::<TaskHandle>(task, false).map(|(index, _)| index)
        }
    }

    /// Allow `task` to use `object`. A null task means the calling task.
    pub fn grant_access(&self, task: ExternalHandle, object: ExternalHandle) {
        let result = object
            .to_internal()
            .ok_or(GateError::BadHandle)
            .and_then(|object| Ok((self.access_row(task)?, object)));
        match result {
            Ok((task, object)) => self.with_state(|state| state.access.grant(task, object)),
            Err(error) => debug!("grant_access: rejected: {}", error),
        }
    }

    /// Withdraw a grant. A null task means the calling task.
    pub fn revoke_access(&self, task: ExternalHandle, object: ExternalHandle) {
        let result = object
            .to_internal()
            .ok_or(GateError::BadHandle)
            .and_then(|object| Ok((self.access_row(task)?, object)));
        match result {
            Ok((task, object)) => self.with_state(|state| state.access.revoke(task, object)),
            Err(error) => debug!("revoke_access: rejected: {}", error),
        }
    }

    // ---------------------------------------------------------------------
    // Buffer authorization
    // ---------------------------------------------------------------------

    /// Whether the calling task may access `len` bytes at `addr`.
    pub fn authorize(&self, addr: usize, len: u32, access: Permissions) -> bool {
        if addr == 0 {
            return false;
        }
        if !self.port.scheduler_running() || self.port.is_privileged() {
            return true;
        }
        validate::within_regions(Regions::new(&self.port), addr, len, access)
    }

    fn check_user<T>(&self, ptr: UserPtr<T>, len: u32, access: Permissions) -> GateResult<()> {
        ensure(ptr.is_aligned() && self.authorize(ptr.addr(), len, access), GateError::BadBuffer)
    }

    /// Copy a structure in from application memory.
    pub(crate) fn user_read<T: Copy>(&self, ptr: UserPtr<T>) -> GateResult<T> {
        self.check_user(ptr, validate::size_of_u32::<T>(), Permissions::READ)?;
        // SAFETY: The caller may read the whole structure, the pointer is
        // aligned, and `T` is plain data valid for any bit pattern.
        Ok(unsafe { ptr.read() })
    }

    /// Borrow a structure in application memory with `access`.
    fn user_mut<T>(&self, ptr: UserPtr<T>, access: Permissions) -> GateResult<&mut T> {
        self.check_user(ptr, validate::size_of_u32::<T>(), access)?;
        // SAFETY: The caller may access the whole structure, the pointer is
        // aligned, and `T` is plain data valid for any bit pattern.
        Ok(unsafe { ptr.assume_mut() })
    }

    /// As [`user_mut`](Self::user_mut), with null mapping to None.
    fn user_opt_mut<T>(&self, ptr: UserPtr<T>, access: Permissions) -> GateResult<Option<&mut T>> {
        if ptr.is_null() {
            Ok(None)
        } else {
            self.user_mut(ptr, access).map(Some)
        }
    }

    fn user_bytes(&self, ptr: UserPtr<u8>, len: u32) -> GateResult<&[u8]> {
        self.check_user(ptr, len, Permissions::READ)?;
        // SAFETY: The caller may read all `len` bytes.
        Ok(unsafe { ptr.assume_slice(len as usize) })
    }

    fn user_bytes_mut(&self, ptr: UserPtr<u8>, len: u32) -> GateResult<&mut [u8]> {
        self.check_user(ptr, len, Permissions::WRITE)?;
        // SAFETY: The caller may write all `len` bytes.
        Ok(unsafe { ptr.assume_slice_mut(len as usize) })
    }

    /// Borrow an array of `count` elements for writing.
    ///
    /// The byte length is overflow-checked before any region lookup.
    fn user_array_mut<T>(&self, ptr: UserPtr<T>, count: u32) -> GateResult<&mut [T]> {
        let len = validate::array_byte_len(count, validate::size_of_u32::<T>())
            .ok_or(GateError::BadBuffer)?;
        self.check_user(ptr, len, Permissions::WRITE)?;
        // SAFETY: The caller may write `count` aligned elements of plain data.
        Ok(unsafe { ptr.assume_slice_mut(count as usize) })
    }

    // ---------------------------------------------------------------------
    // Timer expiry
    // ---------------------------------------------------------------------

    /// Shared expiry callback for every timer created through the gate.
    ///
    /// Invokes the application callback with the timer's external handle.
    ///
    /// # Panics
    /// Panics if `timer` was not created through the gate.
    pub fn timer_expired(&self, timer: TimerHandle) {
        let Some((index, callback)) = self.with_state(|state| state.pool.lookup_timer(timer)) else {
            panic!("expiry of unregistered timer {:?}", timer);
        };
        callback(index.to_external());
    }
}

/// Reject overlapping user buffers that would alias as two `&mut`.
pub(crate) fn ensure_disjoint(a: usize, a_len: usize, b: usize, b_len: usize) -> GateResult<()> {
    let a_end = a.saturating_add(a_len);
    let b_end = b.saturating_add(b_len);
    ensure(a_end <= b || b_end <= a, GateError::BadBuffer)
}
