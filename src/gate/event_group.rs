//! Event group wrappers.
//!
//! The top byte of an event group's bits belongs to the kernel; callers may
//! neither wait on it nor change it.

use crate::error::{GateError, GateResult};
use crate::kernel::*;
use crate::object::{EventGroupHandle, ExternalHandle, KernelObject};

use super::{ensure, Gateway, OrFail};

#[inline]
fn user_bits(bits: EventBits) -> bool {
    bits & EVENT_BITS_CONTROL_BYTES == 0
}

impl<K: Kernel, P: Port> Gateway<K, P> {
    fn install_event_group(&self, create: impl FnOnce() -> Option<EventGroupHandle>) -> ExternalHandle {
        self.install(|| create().map(KernelObject::EventGroup))
            .map(|index| index.to_external())
            .or_fail("event_group_create", ExternalHandle::NULL)
    }

    pub fn event_group_create(&self) -> ExternalHandle {
        self.install_event_group(|| self.kernel.event_group_create(None))
    }

    pub fn event_group_create_static(&self, storage: StaticStorage) -> ExternalHandle {
        self.install_event_group(|| self.kernel.event_group_create(Some(storage)))
    }

    pub fn event_group_delete(&self, group: ExternalHandle) {
        match self.resolve_entry::<EventGroupHandle>(group, true) {
            Ok((index, handle)) => {
                self.kernel.event_group_delete(handle);
                self.release_object(index, handle);
            }
            Err(error) => log::debug!("event_group_delete: rejected: {}", error),
        }
    }

    /// Block until some or all of `bits_to_wait_for` are set.
    ///
    /// # Preconditions
    /// - `bits_to_wait_for` is nonzero and avoids the control byte
    /// - No blocking while the scheduler is suspended
    pub fn event_group_wait_bits(
        &self,
        group: ExternalHandle,
        bits_to_wait_for: EventBits,
        clear_on_exit: bool,
        wait_for_all_bits: bool,
        ticks_to_wait: TickType,
    ) -> EventBits {
        let result = (|| -> GateResult<_> {
            ensure(bits_to_wait_for != 0 && user_bits(bits_to_wait_for), GateError::Precondition)?;
            ensure(!(self.scheduler_suspended() && ticks_to_wait != 0), GateError::Precondition)?;
            let group = self.resolve::<EventGroupHandle>(group)?;
            Ok(self.kernel.event_group_wait_bits(
                group,
                bits_to_wait_for,
                clear_on_exit,
                wait_for_all_bits,
                ticks_to_wait,
            ))
        })();
        result.or_fail("event_group_wait_bits", 0)
    }

    pub fn event_group_clear_bits(&self, group: ExternalHandle, bits: EventBits) -> EventBits {
        ensure(user_bits(bits), GateError::Precondition)
            .and_then(|()| self.resolve::<EventGroupHandle>(group))
            .map(|group| self.kernel.event_group_clear_bits(group, bits))
            .or_fail("event_group_clear_bits", 0)
    }

    pub fn event_group_set_bits(&self, group: ExternalHandle, bits: EventBits) -> EventBits {
        ensure(user_bits(bits), GateError::Precondition)
            .and_then(|()| self.resolve::<EventGroupHandle>(group))
            .map(|group| self.kernel.event_group_set_bits(group, bits))
            .or_fail("event_group_set_bits", 0)
    }

    /// Set `bits_to_set`, then wait for all of `bits_to_wait_for`.
    pub fn event_group_sync(
        &self,
        group: ExternalHandle,
        bits_to_set: EventBits,
        bits_to_wait_for: EventBits,
        ticks_to_wait: TickType,
    ) -> EventBits {
        let result = (|| -> GateResult<_> {
            ensure(
                bits_to_wait_for != 0 && user_bits(bits_to_wait_for) && user_bits(bits_to_set),
                GateError::Precondition,
            )?;
            ensure(!(self.scheduler_suspended() && ticks_to_wait != 0), GateError::Precondition)?;
            let group = self.resolve::<EventGroupHandle>(group)?;
            Ok(self
                .kernel
                .event_group_sync(group, bits_to_set, bits_to_wait_for, ticks_to_wait))
        })();
        result.or_fail("event_group_sync", 0)
    }

    #[cfg(feature = "trace-facility")]
    pub fn event_group_get_number(&self, group: ExternalHandle) -> UBaseType {
        self.resolve::<EventGroupHandle>(group)
            .map(|group| self.kernel.event_group_number(group))
            .or_fail("event_group_get_number", 0)
    }

    #[cfg(feature = "trace-facility")]
    pub fn event_group_set_number(&self, group: ExternalHandle, number: UBaseType) {
        self.resolve::<EventGroupHandle>(group)
            .map(|group| self.kernel.event_group_set_number(group, number))
            .or_fail("event_group_set_number", ())
    }

    pub fn event_group_clear_bits_from_isr(&self, group: ExternalHandle, bits: EventBits) -> bool {
        self.resolve_trusted::<EventGroupHandle>(group)
            .map(|group| self.kernel.event_group_clear_bits_from_isr(group, bits))
            .or_fail("event_group_clear_bits_from_isr", false)
    }

    pub fn event_group_set_bits_from_isr(
        &self,
        group: ExternalHandle,
        bits: EventBits,
        higher_priority_task_woken: Option<&mut bool>,
    ) -> bool {
        self.resolve_trusted::<EventGroupHandle>(group)
            .map(|group| {
                self.kernel
                    .event_group_set_bits_from_isr(group, bits, higher_priority_task_woken)
            })
            .or_fail("event_group_set_bits_from_isr", false)
    }

    pub fn event_group_get_bits_from_isr(&self, group: ExternalHandle) -> EventBits {
        self.resolve_trusted::<EventGroupHandle>(group)
            .map(|group| self.kernel.event_group_bits_from_isr(group))
            .or_fail("event_group_get_bits_from_isr", 0)
    }
}
