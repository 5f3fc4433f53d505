//! Software timer wrappers.
//!
//! Every timer is created with the gate's shared expiry callback; the
//! application callback is kept in the timer's pool slot and invoked by
//! [`Gateway::timer_expired`].

use crate::error::{GateError, GateResult};
use crate::kernel::*;
use crate::object::{ExternalHandle, KernelObject, TaskHandle, TimerCallback, TimerHandle};
use crate::syscall::validate::{Permissions, UserPtr};

use super::{ensure, Gateway, OrFail};

impl<K: Kernel, P: Port> Gateway<K, P> {
    fn install_timer(
        &self,
        callback: TimerCallback,
        create: impl FnOnce() -> Option<TimerHandle>,
    ) -> GateResult<ExternalHandle> {
        self.install(|| create().map(|timer| KernelObject::Timer(timer, callback)))
            .map(|index| index.to_external())
    }

    pub fn timer_create(
        &self,
        name: usize,
        period: TickType,
        auto_reload: bool,
        timer_id: usize,
        callback: TimerCallback,
    ) -> ExternalHandle {
        self.install_timer(callback, || {
            self.kernel.timer_create(name, period, auto_reload, timer_id, None)
        })
        .or_fail("timer_create", ExternalHandle::NULL)
    }

    pub fn timer_create_static(
        &self,
        name: usize,
        period: TickType,
        auto_reload: bool,
        timer_id: usize,
        callback: TimerCallback,
        storage: StaticStorage,
    ) -> ExternalHandle {
        self.install_timer(callback, || {
            self.kernel
                .timer_create(name, period, auto_reload, timer_id, Some(storage))
        })
        .or_fail("timer_create_static", ExternalHandle::NULL)
    }

    /// Free the slot of a timer the kernel has finished deleting.
    ///
    /// Delete commands are processed asynchronously, so the kernel reports
    /// completion here rather than the command wrapper freeing the slot.
    pub fn timer_deleted(&self, timer: TimerHandle) {
        match self.index_of(timer) {
            Some(index) => self.release_object(index, timer),
            None => log::warn!("deletion of unregistered timer {:?}", timer),
        }
    }

    pub fn timer_get_timer_id(&self, timer: ExternalHandle) -> usize {
        self.resolve::<TimerHandle>(timer)
            .map(|timer| self.kernel.timer_id(timer))
            .or_fail("timer_get_timer_id", 0)
    }

    pub fn timer_set_timer_id(&self, timer: ExternalHandle, id: usize) {
        self.resolve::<TimerHandle>(timer)
            .map(|timer| self.kernel.timer_set_id(timer, id))
            .or_fail("timer_set_timer_id", ())
    }

    pub fn timer_is_timer_active(&self, timer: ExternalHandle) -> bool {
        self.resolve::<TimerHandle>(timer)
            .map(|timer| self.kernel.timer_is_active(timer))
            .or_fail("timer_is_timer_active", false)
    }

    /// External handle of the timer daemon, null if it is not in the pool.
    pub fn timer_get_timer_daemon_task_handle(&self) -> ExternalHandle {
        self.externalize::<TaskHandle>(self.kernel.timer_daemon_task())
    }

    /// Queue a command for the timer daemon.
    ///
    /// # Preconditions
    /// - `command` must be one a task may issue
    /// - A non-null `higher_priority_task_woken` must be writable
    pub fn timer_generic_command_from_task(
        &self,
        timer: ExternalHandle,
        command: BaseType,
        optional_value: TickType,
        higher_priority_task_woken: UserPtr<BaseType>,
        ticks_to_wait: TickType,
    ) -> bool {
        let result = (|| -> GateResult<_> {
            ensure(
                (timer_command::START_DONT_TRACE..timer_command::FIRST_FROM_ISR).contains(&command),
                GateError::Precondition,
            )?;
            let woken = self.user_opt_mut(higher_priority_task_woken, Permissions::WRITE)?;
            let timer = self.resolve::<TimerHandle>(timer)?;
            Ok(self
                .kernel
                .timer_command(timer, command, optional_value, woken, ticks_to_wait))
        })();
        result.or_fail("timer_generic_command_from_task", false)
    }

    pub fn timer_generic_command_from_isr(
        &self,
        timer: ExternalHandle,
        command: BaseType,
        optional_value: TickType,
        higher_priority_task_woken: Option<&mut bool>,
    ) -> bool {
        self.resolve_trusted::<TimerHandle>(timer)
            .map(|timer| {
                self.kernel
                    .timer_command_from_isr(timer, command, optional_value, higher_priority_task_woken)
            })
            .or_fail("timer_generic_command_from_isr", false)
    }

    /// Address of the timer's name. Zero on failure.
    pub fn timer_get_name(&self, timer: ExternalHandle) -> usize {
        self.resolve::<TimerHandle>(timer)
            .map(|timer| self.kernel.timer_name(timer))
            .or_fail("timer_get_name", 0)
    }

    pub fn timer_set_reload_mode(&self, timer: ExternalHandle, auto_reload: bool) {
        self.resolve::<TimerHandle>(timer)
            .map(|timer| self.kernel.timer_set_reload_mode(timer, auto_reload))
            .or_fail("timer_set_reload_mode", ())
    }

    pub fn timer_get_reload_mode(&self, timer: ExternalHandle) -> bool {
        self.resolve::<TimerHandle>(timer)
            .map(|timer| self.kernel.timer_reload_mode(timer))
            .or_fail("timer_get_reload_mode", false)
    }

    /// Reload mode as an unsigned flag.
    pub fn timer_get_reload_mode_flag(&self, timer: ExternalHandle) -> UBaseType {
        self.resolve::<TimerHandle>(timer)
            .map(|timer| UBaseType::from(self.kernel.timer_reload_mode(timer)))
            .or_fail("timer_get_reload_mode_flag", 0)
    }

    pub fn timer_get_period(&self, timer: ExternalHandle) -> TickType {
        self.resolve::<TimerHandle>(timer)
            .map(|timer| self.kernel.timer_period(timer))
            .or_fail("timer_get_period", 0)
    }

    pub fn timer_get_expiry_time(&self, timer: ExternalHandle) -> TickType {
        self.resolve::<TimerHandle>(timer)
            .map(|timer| self.kernel.timer_expiry_time(timer))
            .or_fail("timer_get_expiry_time", 0)
    }
}
