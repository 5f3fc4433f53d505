//! Task wrappers.

use crate::config::{MAX_PRIORITIES, NUM_THREAD_LOCAL_STORAGE_POINTERS, TASK_NOTIFICATION_ARRAY_ENTRIES};
use crate::error::{GateError, GateResult};
use crate::kernel::*;
use crate::object::{ExternalHandle, KernelObject, TaskHandle};
use crate::syscall::validate::{MpuRegion, Permissions, UserPtr};

use super::{ensure, ensure_disjoint, Gateway, OrFail};

const RW: Permissions = Permissions::READ.union(Permissions::WRITE);

impl<K: Kernel, P: Port> Gateway<K, P> {
    // ---------------------------------------------------------------------
    // Creation and deletion (privileged callers)
    // ---------------------------------------------------------------------

    /// Create a privileged task.
    ///
    /// Unprivileged tasks must be created with
    /// [`task_create_restricted`](Self::task_create_restricted).
    pub fn task_create(&self, params: &TaskParameters<'_>) -> ExternalHandle {
        ensure(params.is_privileged(), GateError::Precondition)
            .and_then(|()| self.install_task(params, || self.kernel.task_create(params, None)))
            .or_fail("task_create", ExternalHandle::NULL)
    }

    pub fn task_create_static(&self, params: &TaskParameters<'_>, storage: StaticStorage) -> ExternalHandle {
        self.install_task(params, || self.kernel.task_create(params, Some(storage)))
            .or_fail("task_create_static", ExternalHandle::NULL)
    }

    /// Create a task with its own MPU regions.
    pub fn task_create_restricted(
        &self,
        params: &TaskParameters<'_>,
        storage: Option<StaticStorage>,
    ) -> ExternalHandle {
        self.install_task(params, || self.kernel.task_create_restricted(params, storage))
            .or_fail("task_create_restricted", ExternalHandle::NULL)
    }

    /// Record a new task. An unprivileged task is granted access to itself.
    fn install_task(
        &self,
        params: &TaskParameters<'_>,
        create: impl FnOnce() -> Option<TaskHandle>,
    ) -> GateResult<ExternalHandle> {
        let index = self.install(|| create().map(KernelObject::Task))?;
        if !params.is_privileged() {
            self.with_state(|state| state.access.grant(index, index));
        }
        Ok(index.to_external())
    }

    /// Delete a task. Null deletes the calling task.
    pub fn task_delete(&self, task: ExternalHandle) {
        let current = self.kernel.current_task();
        let target = if task.is_null() {
            current.map(|current| (self.index_of(current), current))
        } else {
            match self.resolve_entry::<TaskHandle>(task, false) {
                Ok((index, handle)) => Some((Some(index), handle)),
                Err(error) => {
                    log::debug!("task_delete: rejected: {}", error);
                    None
                }
            }
        };
        let Some((index, handle)) = target else {
            return;
        };

        if Some(handle) == current {
            // Deleting ourselves does not return.
            if let Some(index) = index {
                self.release_object(index, handle);
            }
            self.kernel.task_delete(handle);
        } else {
            self.kernel.task_delete(handle);
            if let Some(index) = index {
                self.release_object(index, handle);
            }
        }
    }

    // ---------------------------------------------------------------------
    // Delays
    // ---------------------------------------------------------------------

    pub fn task_delay(&self, ticks: TickType) {
        self.kernel.task_delay(ticks);
    }

    /// Block until `*previous_wake_time + increment`.
    pub fn task_delay_until(&self, previous_wake_time: UserPtr<TickType>, increment: TickType) -> bool {
        let result = (|| -> GateResult<_> {
            ensure(!previous_wake_time.is_null() && increment > 0, GateError::Precondition)?;
            let previous = self.user_mut(previous_wake_time, RW)?;
            Ok(self.kernel.task_delay_until(previous, increment))
        })();
        result.or_fail("task_delay_until", false)
    }

    pub fn task_abort_delay(&self, task: ExternalHandle) -> bool {
        self.resolve::<TaskHandle>(task)
            .map(|task| self.kernel.task_abort_delay(task))
            .or_fail("task_abort_delay", false)
    }

    // ---------------------------------------------------------------------
    // Priority and state
    // ---------------------------------------------------------------------

    /// Priority of a task. Fails with `MAX_PRIORITIES`.
    pub fn task_priority_get(&self, task: ExternalHandle) -> UBaseType {
        self.resolve_task(task)
            .map(|task| self.kernel.task_priority_get(task))
            .or_fail("task_priority_get", MAX_PRIORITIES)
    }

    pub fn task_priority_get_from_isr(&self, task: ExternalHandle) -> UBaseType {
        self.resolve_task_trusted(task)
            .map(|task| self.kernel.task_priority_get_from_isr(task))
            .or_fail("task_priority_get_from_isr", MAX_PRIORITIES)
    }

    pub fn task_base_priority_get(&self, task: ExternalHandle) -> UBaseType {
        self.resolve_task(task)
            .map(|task| self.kernel.task_base_priority_get(task))
            .or_fail("task_base_priority_get", MAX_PRIORITIES)
    }

    pub fn task_base_priority_get_from_isr(&self, task: ExternalHandle) -> UBaseType {
        self.resolve_task_trusted(task)
            .map(|task| self.kernel.task_base_priority_get_from_isr(task))
            .or_fail("task_base_priority_get_from_isr", MAX_PRIORITIES)
    }

    pub fn task_priority_set(&self, task: ExternalHandle, priority: UBaseType) {
        self.resolve_task(task)
            .map(|task| self.kernel.task_priority_set(task, priority))
            .or_fail("task_priority_set", ())
    }

    pub fn task_get_state(&self, task: ExternalHandle) -> TaskState {
        self.resolve::<TaskHandle>(task)
            .map(|task| self.kernel.task_state(task))
            .or_fail("task_get_state", TaskState::Invalid)
    }

    /// Fill a status report in application memory.
    #[cfg(feature = "trace-facility")]
    pub fn task_get_info(
        &self,
        task: ExternalHandle,
        status: UserPtr<TaskStatus>,
        include_free_stack: bool,
        state: TaskState,
    ) {
        let result = (|| -> GateResult<_> {
            let status = self.user_mut(status, Permissions::WRITE)?;
            let task = self.resolve_task(task)?;
            let mut report = TaskStatus::default();
            self.kernel.task_info(task, &mut report, include_free_stack, state);
            report.handle = self.externalize(TaskHandle::new(report.handle)).raw();
            *status = report;
            Ok(())
        })();
        result.or_fail("task_get_info", ());
    }

    /// Fill an array of status reports. Returns the number filled.
    #[cfg(feature = "trace-facility")]
    pub fn task_get_system_state(
        &self,
        statuses: UserPtr<TaskStatus>,
        count: UBaseType,
        total_run_time: UserPtr<RunTimeCounter>,
    ) -> UBaseType {
        let result = (|| -> GateResult<_> {
            let array = self.user_array_mut(statuses, count)?;
            let total = self.user_opt_mut(total_run_time, Permissions::WRITE)?;
            if total.is_some() {
                ensure_disjoint(
                    statuses.addr(),
                    count as usize * core::mem::size_of::<TaskStatus>(),
                    total_run_time.addr(),
                    core::mem::size_of::<RunTimeCounter>(),
                )?;
            }
            let mut slots = array.iter_mut();
            let mut visit = |mut report: TaskStatus| {
                report.handle = self.externalize(TaskHandle::new(report.handle)).raw();
                if let Some(slot) = slots.next() {
                    *slot = report;
                }
            };
            Ok(self.kernel.task_system_state(count, &mut visit, total))
        })();
        result.or_fail("task_get_system_state", 0)
    }

    // ---------------------------------------------------------------------
    // Suspend and resume
    // ---------------------------------------------------------------------

    /// Suspend a task. Null suspends the calling task.
    ///
    /// Once the scheduler runs, only privileged tasks may suspend others.
    pub fn task_suspend(&self, task: ExternalHandle) {
        if task.is_null() {
            self.kernel.task_suspend(None);
            return;
        }
        let result = ensure(
            self.kernel.scheduler_state() == SchedulerState::NotStarted || self.port.is_privileged(),
            GateError::Precondition,
        )
        .and_then(|()| self.resolve::<TaskHandle>(task));
        match result {
            Ok(task) => self.kernel.task_suspend(Some(task)),
            Err(error) => log::debug!("task_suspend: rejected: {}", error),
        }
    }

    pub fn task_resume(&self, task: ExternalHandle) {
        self.resolve::<TaskHandle>(task)
            .map(|task| self.kernel.task_resume(task))
            .or_fail("task_resume", ())
    }

    pub fn task_resume_from_isr(&self, task: ExternalHandle) -> bool {
        self.resolve_trusted::<TaskHandle>(task)
            .map(|task| self.kernel.task_resume_from_isr(task))
            .or_fail("task_resume_from_isr", false)
    }

    // ---------------------------------------------------------------------
    // Handles and names
    // ---------------------------------------------------------------------

    pub fn task_get_current_task_handle(&self) -> ExternalHandle {
        self.externalize(self.kernel.current_task())
    }

    pub fn task_get_idle_task_handle(&self) -> ExternalHandle {
        self.externalize(self.kernel.idle_task())
    }

    pub fn task_get_handle(&self, name: &str) -> ExternalHandle {
        self.externalize(self.kernel.task_by_name(name))
    }

    /// Address of the task's name. Zero on failure.
    pub fn task_get_name(&self, task: ExternalHandle) -> usize {
        self.resolve_task(task)
            .map(|task| self.kernel.task_name(task))
            .or_fail("task_get_name", 0)
    }

    pub fn task_get_tick_count(&self) -> TickType {
        self.kernel.tick_count()
    }

    pub fn task_get_number_of_tasks(&self) -> UBaseType {
        self.kernel.number_of_tasks()
    }

    pub fn task_get_scheduler_state(&self) -> SchedulerState {
        self.kernel.scheduler_state()
    }

    pub fn task_allocate_mpu_regions(&self, task: ExternalHandle, regions: &[MpuRegion]) {
        self.resolve_task(task)
            .map(|task| self.kernel.task_allocate_regions(task, regions))
            .or_fail("task_allocate_mpu_regions", ())
    }

    // ---------------------------------------------------------------------
    // Stack and run-time statistics
    // ---------------------------------------------------------------------

    pub fn task_get_stack_high_water_mark(&self, task: ExternalHandle) -> UBaseType {
        self.resolve_task(task)
            .map(|task| self.kernel.task_stack_high_water_mark(task))
            .or_fail("task_get_stack_high_water_mark", 0)
    }

    pub fn task_get_stack_high_water_mark2(&self, task: ExternalHandle) -> StackDepth {
        self.resolve_task(task)
            .map(|task| self.kernel.task_stack_high_water_mark2(task))
            .or_fail("task_get_stack_high_water_mark2", 0)
    }

    #[cfg(feature = "run-time-stats")]
    pub fn task_get_run_time_counter(&self, task: ExternalHandle) -> RunTimeCounter {
        self.resolve_task(task)
            .map(|task| self.kernel.task_run_time_counter(task))
            .or_fail("task_get_run_time_counter", 0)
    }

    #[cfg(feature = "run-time-stats")]
    pub fn task_get_run_time_percent(&self, task: ExternalHandle) -> RunTimeCounter {
        self.resolve_task(task)
            .map(|task| self.kernel.task_run_time_percent(task))
            .or_fail("task_get_run_time_percent", 0)
    }

    #[cfg(feature = "run-time-stats")]
    pub fn task_get_idle_run_time_counter(&self) -> RunTimeCounter {
        self.kernel.idle_run_time_counter()
    }

    #[cfg(feature = "run-time-stats")]
    pub fn task_get_idle_run_time_percent(&self) -> RunTimeCounter {
        self.kernel.idle_run_time_percent()
    }

    // ---------------------------------------------------------------------
    // Application tags and thread-local storage
    // ---------------------------------------------------------------------

    pub fn task_set_application_task_tag(&self, task: ExternalHandle, tag: usize) {
        self.resolve_task(task)
            .map(|task| self.kernel.task_set_application_tag(task, tag))
            .or_fail("task_set_application_task_tag", ())
    }

    pub fn task_get_application_task_tag(&self, task: ExternalHandle) -> usize {
        self.resolve_task(task)
            .map(|task| self.kernel.task_application_tag(task))
            .or_fail("task_get_application_task_tag", 0)
    }

    pub fn task_get_application_task_tag_from_isr(&self, task: ExternalHandle) -> usize {
        self.resolve_task_trusted(task)
            .map(|task| self.kernel.task_application_tag_from_isr(task))
            .or_fail("task_get_application_task_tag_from_isr", 0)
    }

    pub fn task_call_application_task_hook(&self, task: ExternalHandle, parameter: usize) -> BaseType {
        self.resolve_task(task)
            .map(|task| self.kernel.task_call_application_hook(task, parameter))
            .or_fail("task_call_application_task_hook", 0)
    }

    pub fn task_set_thread_local_storage_pointer(&self, task: ExternalHandle, index: BaseType, value: usize) {
        ensure(tls_index_valid(index), GateError::Precondition)
            .and_then(|()| self.resolve_task(task))
            .map(|task| self.kernel.task_set_thread_local_pointer(task, index, value))
            .or_fail("task_set_thread_local_storage_pointer", ())
    }

    pub fn task_get_thread_local_storage_pointer(&self, task: ExternalHandle, index: BaseType) -> usize {
        ensure(tls_index_valid(index), GateError::Precondition)
            .and_then(|()| self.resolve_task(task))
            .map(|task| self.kernel.task_thread_local_pointer(task, index))
            .or_fail("task_get_thread_local_storage_pointer", 0)
    }

    // ---------------------------------------------------------------------
    // Timeouts
    // ---------------------------------------------------------------------

    pub fn task_set_time_out_state(&self, timeout: UserPtr<TimeOut>) {
        self.user_mut(timeout, Permissions::WRITE)
            .map(|timeout| self.kernel.task_set_time_out_state(timeout))
            .or_fail("task_set_time_out_state", ())
    }

    pub fn task_check_for_time_out(&self, timeout: UserPtr<TimeOut>, ticks_to_wait: UserPtr<TickType>) -> bool {
        let result = (|| -> GateResult<_> {
            ensure_disjoint(
                timeout.addr(),
                core::mem::size_of::<TimeOut>(),
                ticks_to_wait.addr(),
                core::mem::size_of::<TickType>(),
            )?;
            let timeout_state = self.user_mut(timeout, RW)?;
            let ticks = self.user_mut(ticks_to_wait, RW)?;
            Ok(self.kernel.task_check_for_time_out(timeout_state, ticks))
        })();
        result.or_fail("task_check_for_time_out", false)
    }

    // ---------------------------------------------------------------------
    // Notifications
    // ---------------------------------------------------------------------

    #[cfg(feature = "task-notifications")]
    pub fn task_generic_notify(
        &self,
        task: ExternalHandle,
        index: UBaseType,
        value: u32,
        action: u32,
        previous_value: UserPtr<u32>,
    ) -> bool {
        let result = (|| -> GateResult<_> {
            ensure(notification_index_valid(index), GateError::Precondition)?;
            let action = NotifyAction::from_raw(action).ok_or(GateError::Precondition)?;
            let previous = self.user_opt_mut(previous_value, Permissions::WRITE)?;
            let task = self.resolve::<TaskHandle>(task)?;
            Ok(self.kernel.task_notify(task, index, value, action, previous))
        })();
        result.or_fail("task_generic_notify", false)
    }

    #[cfg(feature = "task-notifications")]
    pub fn task_generic_notify_from_isr(
        &self,
        task: ExternalHandle,
        index: UBaseType,
        value: u32,
        action: NotifyAction,
        previous_value: Option<&mut u32>,
        higher_priority_task_woken: Option<&mut bool>,
    ) -> bool {
        ensure(notification_index_valid(index), GateError::Precondition)
            .and_then(|()| self.resolve_trusted::<TaskHandle>(task))
            .map(|task| {
                self.kernel
                    .task_notify_from_isr(task, index, value, action, previous_value, higher_priority_task_woken)
            })
            .or_fail("task_generic_notify_from_isr", false)
    }

    #[cfg(feature = "task-notifications")]
    pub fn task_generic_notify_give_from_isr(
        &self,
        task: ExternalHandle,
        index: UBaseType,
        higher_priority_task_woken: Option<&mut bool>,
    ) {
        ensure(notification_index_valid(index), GateError::Precondition)
            .and_then(|()| self.resolve_trusted::<TaskHandle>(task))
            .map(|task| {
                self.kernel
                    .task_notify_give_from_isr(task, index, higher_priority_task_woken)
            })
            .or_fail("task_generic_notify_give_from_isr", ())
    }

    #[cfg(feature = "task-notifications")]
    pub fn task_generic_notify_wait(
        &self,
        index: UBaseType,
        clear_on_entry: u32,
        clear_on_exit: u32,
        value: UserPtr<u32>,
        ticks_to_wait: TickType,
    ) -> bool {
        let result = (|| -> GateResult<_> {
            ensure(notification_index_valid(index), GateError::Precondition)?;
            let value = self.user_opt_mut(value, Permissions::WRITE)?;
            Ok(self
                .kernel
                .task_notify_wait(index, clear_on_entry, clear_on_exit, value, ticks_to_wait))
        })();
        result.or_fail("task_generic_notify_wait", false)
    }

    #[cfg(feature = "task-notifications")]
    pub fn task_generic_notify_take(&self, index: UBaseType, clear_on_exit: bool, ticks_to_wait: TickType) -> u32 {
        ensure(notification_index_valid(index), GateError::Precondition)
            .map(|()| self.kernel.task_notify_take(index, clear_on_exit, ticks_to_wait))
            .or_fail("task_generic_notify_take", 0)
    }

    /// Clear a pending notification. Null means the calling task.
    #[cfg(feature = "task-notifications")]
    pub fn task_generic_notify_state_clear(&self, task: ExternalHandle, index: UBaseType) -> bool {
        ensure(notification_index_valid(index), GateError::Precondition)
            .and_then(|()| self.resolve_task(task))
            .map(|task| self.kernel.task_notify_state_clear(task, index))
            .or_fail("task_generic_notify_state_clear", false)
    }

    /// Clear bits of a notification value. Null means the calling task.
    #[cfg(feature = "task-notifications")]
    pub fn task_generic_notify_value_clear(&self, task: ExternalHandle, index: UBaseType, bits: u32) -> u32 {
        ensure(notification_index_valid(index), GateError::Precondition)
            .and_then(|()| self.resolve_task(task))
            .map(|task| self.kernel.task_notify_value_clear(task, index, bits))
            .or_fail("task_generic_notify_value_clear", 0)
    }
}

#[inline]
fn notification_index_valid(index: UBaseType) -> bool {
    index < TASK_NOTIFICATION_ARRAY_ENTRIES
}

#[inline]
fn tls_index_valid(index: BaseType) -> bool {
    (0..NUM_THREAD_LOCAL_STORAGE_POINTERS).contains(&index)
}
