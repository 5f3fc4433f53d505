//! Trusted Kernel Primitives
//!
//! The scheduler and object implementations the gate forwards to. Every
//! method takes internal handles and already-validated buffers; none of them
//! re-check access.
//!
//! `Option<TaskHandle>` parameters use `None` for "the calling task".

use crate::object::{EventGroupHandle, QueueHandle, StreamBufferHandle, TaskHandle, TimerHandle};
use crate::syscall::validate::MpuRegion;

use super::types::*;

/// Kernel services behind the gate.
pub trait Kernel {
    // ---------------------------------------------------------------------
    // Scheduler
    // ---------------------------------------------------------------------

    fn current_task(&self) -> Option<TaskHandle>;
    fn scheduler_state(&self) -> SchedulerState;
    /// Stop context switches without masking interrupts.
    fn suspend_all(&self);
    /// Undo one `suspend_all`. Returns true if a yield already happened.
    fn resume_all(&self) -> bool;
    fn tick_count(&self) -> TickType;
    fn number_of_tasks(&self) -> UBaseType;

    // ---------------------------------------------------------------------
    // Tasks
    // ---------------------------------------------------------------------

    fn task_create(
        &self,
        params: &TaskParameters<'_>,
        storage: Option<StaticStorage>,
    ) -> Option<TaskHandle>;
    fn task_create_restricted(
        &self,
        params: &TaskParameters<'_>,
        storage: Option<StaticStorage>,
    ) -> Option<TaskHandle>;
    fn task_delete(&self, task: TaskHandle);
    fn task_delay(&self, ticks: TickType);
    fn task_delay_until(&self, previous_wake_time: &mut TickType, increment: TickType) -> bool;
    fn task_abort_delay(&self, task: TaskHandle) -> bool;
    fn task_priority_get(&self, task: Option<TaskHandle>) -> UBaseType;
    fn task_priority_get_from_isr(&self, task: Option<TaskHandle>) -> UBaseType;
    fn task_base_priority_get(&self, task: Option<TaskHandle>) -> UBaseType;
    fn task_base_priority_get_from_isr(&self, task: Option<TaskHandle>) -> UBaseType;
    fn task_priority_set(&self, task: Option<TaskHandle>, priority: UBaseType);
    fn task_state(&self, task: TaskHandle) -> TaskState;
    fn task_info(
        &self,
        task: Option<TaskHandle>,
        status: &mut TaskStatus,
        include_free_stack: bool,
        state: TaskState,
    );
    /// Pass a report for every task to `visit`, in order, unless more than
    /// `capacity` tasks exist. Returns the number reported, zero in that
    /// case. The `handle` fields carry internal addresses.
    fn task_system_state(
        &self,
        capacity: UBaseType,
        visit: &mut dyn FnMut(TaskStatus),
        total_run_time: Option<&mut RunTimeCounter>,
    ) -> UBaseType;
    fn task_suspend(&self, task: Option<TaskHandle>);
    fn task_resume(&self, task: TaskHandle);
    fn task_resume_from_isr(&self, task: TaskHandle) -> bool;
    fn task_by_name(&self, name: &str) -> Option<TaskHandle>;
    fn task_name(&self, task: Option<TaskHandle>) -> usize;
    fn idle_task(&self) -> Option<TaskHandle>;
    fn task_allocate_regions(&self, task: Option<TaskHandle>, regions: &[MpuRegion]);
    fn task_stack_high_water_mark(&self, task: Option<TaskHandle>) -> UBaseType;
    fn task_stack_high_water_mark2(&self, task: Option<TaskHandle>) -> StackDepth;
    fn task_set_application_tag(&self, task: Option<TaskHandle>, tag: usize);
    fn task_application_tag(&self, task: Option<TaskHandle>) -> usize;
    fn task_application_tag_from_isr(&self, task: Option<TaskHandle>) -> usize;
    fn task_call_application_hook(&self, task: Option<TaskHandle>, parameter: usize) -> BaseType;
    fn task_set_thread_local_pointer(&self, task: Option<TaskHandle>, index: BaseType, value: usize);
    fn task_thread_local_pointer(&self, task: Option<TaskHandle>, index: BaseType) -> usize;
    fn task_set_time_out_state(&self, timeout: &mut TimeOut);
    fn task_check_for_time_out(&self, timeout: &mut TimeOut, ticks_to_wait: &mut TickType) -> bool;
    fn task_run_time_counter(&self, task: Option<TaskHandle>) -> RunTimeCounter;
    fn task_run_time_percent(&self, task: Option<TaskHandle>) -> RunTimeCounter;
    fn idle_run_time_counter(&self) -> RunTimeCounter;
    fn idle_run_time_percent(&self) -> RunTimeCounter;

    // ---------------------------------------------------------------------
    // Task notifications
    // ---------------------------------------------------------------------

    fn task_notify(
        &self,
        task: TaskHandle,
        index: UBaseType,
        value: u32,
        action: NotifyAction,
        previous_value: Option<&mut u32>,
    ) -> bool;
    fn task_notify_from_isr(
        &self,
        task: TaskHandle,
        index: UBaseType,
        value: u32,
        action: NotifyAction,
        previous_value: Option<&mut u32>,
        higher_priority_task_woken: Option<&mut bool>,
    ) -> bool;
    fn task_notify_give_from_isr(
        &self,
        task: TaskHandle,
        index: UBaseType,
        higher_priority_task_woken: Option<&mut bool>,
    );
    fn task_notify_wait(
        &self,
        index: UBaseType,
        clear_on_entry: u32,
        clear_on_exit: u32,
        value: Option<&mut u32>,
        ticks_to_wait: TickType,
    ) -> bool;
    fn task_notify_take(&self, index: UBaseType, clear_on_exit: bool, ticks_to_wait: TickType) -> u32;
    fn task_notify_state_clear(&self, task: Option<TaskHandle>, index: UBaseType) -> bool;
    fn task_notify_value_clear(&self, task: Option<TaskHandle>, index: UBaseType, bits: u32) -> u32;

    // ---------------------------------------------------------------------
    // Queues, semaphores, mutexes and queue sets
    // ---------------------------------------------------------------------

    fn queue_create(
        &self,
        length: UBaseType,
        item_size: UBaseType,
        queue_type: QueueType,
        storage: Option<StaticStorage>,
    ) -> Option<QueueHandle>;
    fn queue_create_mutex(&self, queue_type: QueueType, storage: Option<StaticStorage>) -> Option<QueueHandle>;
    fn queue_create_counting_semaphore(
        &self,
        max_count: UBaseType,
        initial_count: UBaseType,
        storage: Option<StaticStorage>,
    ) -> Option<QueueHandle>;
    fn queue_create_set(&self, length: UBaseType) -> Option<QueueHandle>;
    fn queue_delete(&self, queue: QueueHandle);
    fn queue_reset(&self, queue: QueueHandle, new_queue: bool) -> bool;
    fn queue_length(&self, queue: QueueHandle) -> UBaseType;
    fn queue_item_size(&self, queue: QueueHandle) -> UBaseType;
    fn queue_send(
        &self,
        queue: QueueHandle,
        item: &[u8],
        ticks_to_wait: TickType,
        position: CopyPosition,
    ) -> bool;
    fn queue_send_from_isr(
        &self,
        queue: QueueHandle,
        item: &[u8],
        higher_priority_task_woken: Option<&mut bool>,
        position: CopyPosition,
    ) -> bool;
    fn queue_give_from_isr(&self, queue: QueueHandle, higher_priority_task_woken: Option<&mut bool>) -> bool;
    fn queue_receive(&self, queue: QueueHandle, buffer: &mut [u8], ticks_to_wait: TickType) -> bool;
    fn queue_receive_from_isr(
        &self,
        queue: QueueHandle,
        buffer: &mut [u8],
        higher_priority_task_woken: Option<&mut bool>,
    ) -> bool;
    fn queue_peek(&self, queue: QueueHandle, buffer: &mut [u8], ticks_to_wait: TickType) -> bool;
    fn queue_peek_from_isr(&self, queue: QueueHandle, buffer: &mut [u8]) -> bool;
    fn queue_messages_waiting(&self, queue: QueueHandle) -> UBaseType;
    fn queue_messages_waiting_from_isr(&self, queue: QueueHandle) -> UBaseType;
    fn queue_spaces_available(&self, queue: QueueHandle) -> UBaseType;
    fn queue_is_empty_from_isr(&self, queue: QueueHandle) -> bool;
    fn queue_is_full_from_isr(&self, queue: QueueHandle) -> bool;
    fn queue_semaphore_take(&self, queue: QueueHandle, ticks_to_wait: TickType) -> bool;
    fn queue_mutex_holder(&self, queue: QueueHandle) -> Option<TaskHandle>;
    fn queue_mutex_holder_from_isr(&self, queue: QueueHandle) -> Option<TaskHandle>;
    fn queue_take_mutex_recursive(&self, queue: QueueHandle, ticks_to_wait: TickType) -> bool;
    fn queue_give_mutex_recursive(&self, queue: QueueHandle) -> bool;
    fn queue_add_to_set(&self, member: QueueHandle, set: QueueHandle) -> bool;
    fn queue_remove_from_set(&self, member: QueueHandle, set: QueueHandle) -> bool;
    fn queue_select_from_set(&self, set: QueueHandle, ticks_to_wait: TickType) -> Option<QueueHandle>;
    fn queue_select_from_set_from_isr(&self, set: QueueHandle) -> Option<QueueHandle>;
    fn queue_add_to_registry(&self, queue: QueueHandle, name: usize);
    fn queue_unregister(&self, queue: QueueHandle);
    fn queue_name(&self, queue: QueueHandle) -> usize;

    // ---------------------------------------------------------------------
    // Software timers
    // ---------------------------------------------------------------------

    /// Create a timer. Expiry must be reported through
    /// [`Gateway::timer_expired`](crate::Gateway::timer_expired).
    fn timer_create(
        &self,
        name: usize,
        period: TickType,
        auto_reload: bool,
        timer_id: usize,
        storage: Option<StaticStorage>,
    ) -> Option<TimerHandle>;
    fn timer_id(&self, timer: TimerHandle) -> usize;
    fn timer_set_id(&self, timer: TimerHandle, id: usize);
    fn timer_is_active(&self, timer: TimerHandle) -> bool;
    fn timer_daemon_task(&self) -> Option<TaskHandle>;
    fn timer_command(
        &self,
        timer: TimerHandle,
        command: BaseType,
        optional_value: TickType,
        higher_priority_task_woken: Option<&mut BaseType>,
        ticks_to_wait: TickType,
    ) -> bool;
    fn timer_command_from_isr(
        &self,
        timer: TimerHandle,
        command: BaseType,
        optional_value: TickType,
        higher_priority_task_woken: Option<&mut bool>,
    ) -> bool;
    fn timer_name(&self, timer: TimerHandle) -> usize;
    fn timer_set_reload_mode(&self, timer: TimerHandle, auto_reload: bool);
    fn timer_reload_mode(&self, timer: TimerHandle) -> bool;
    fn timer_period(&self, timer: TimerHandle) -> TickType;
    fn timer_expiry_time(&self, timer: TimerHandle) -> TickType;

    // ---------------------------------------------------------------------
    // Event groups
    // ---------------------------------------------------------------------

    fn event_group_create(&self, storage: Option<StaticStorage>) -> Option<EventGroupHandle>;
    fn event_group_delete(&self, group: EventGroupHandle);
    fn event_group_wait_bits(
        &self,
        group: EventGroupHandle,
        bits_to_wait_for: EventBits,
        clear_on_exit: bool,
        wait_for_all_bits: bool,
        ticks_to_wait: TickType,
    ) -> EventBits;
    fn event_group_clear_bits(&self, group: EventGroupHandle, bits: EventBits) -> EventBits;
    fn event_group_clear_bits_from_isr(&self, group: EventGroupHandle, bits: EventBits) -> bool;
    fn event_group_set_bits(&self, group: EventGroupHandle, bits: EventBits) -> EventBits;
    fn event_group_set_bits_from_isr(
        &self,
        group: EventGroupHandle,
        bits: EventBits,
        higher_priority_task_woken: Option<&mut bool>,
    ) -> bool;
    fn event_group_bits_from_isr(&self, group: EventGroupHandle) -> EventBits;
    fn event_group_sync(
        &self,
        group: EventGroupHandle,
        bits_to_set: EventBits,
        bits_to_wait_for: EventBits,
        ticks_to_wait: TickType,
    ) -> EventBits;
    fn event_group_number(&self, group: EventGroupHandle) -> UBaseType;
    fn event_group_set_number(&self, group: EventGroupHandle, number: UBaseType);

    // ---------------------------------------------------------------------
    // Stream and message buffers
    // ---------------------------------------------------------------------

    fn stream_buffer_create(
        &self,
        size: usize,
        trigger_level: usize,
        kind: StreamBufferKind,
        storage: Option<StaticStorage>,
    ) -> Option<StreamBufferHandle>;
    fn stream_buffer_delete(&self, buffer: StreamBufferHandle);
    fn stream_buffer_reset(&self, buffer: StreamBufferHandle) -> bool;
    fn stream_buffer_reset_from_isr(&self, buffer: StreamBufferHandle) -> bool;
    fn stream_buffer_send(&self, buffer: StreamBufferHandle, data: &[u8], ticks_to_wait: TickType) -> usize;
    fn stream_buffer_send_from_isr(
        &self,
        buffer: StreamBufferHandle,
        data: &[u8],
        higher_priority_task_woken: Option<&mut bool>,
    ) -> usize;
    fn stream_buffer_receive(
        &self,
        buffer: StreamBufferHandle,
        data: &mut [u8],
        ticks_to_wait: TickType,
    ) -> usize;
    fn stream_buffer_receive_from_isr(
        &self,
        buffer: StreamBufferHandle,
        data: &mut [u8],
        higher_priority_task_woken: Option<&mut bool>,
    ) -> usize;
    fn stream_buffer_send_completed_from_isr(
        &self,
        buffer: StreamBufferHandle,
        higher_priority_task_woken: Option<&mut bool>,
    ) -> bool;
    fn stream_buffer_receive_completed_from_isr(
        &self,
        buffer: StreamBufferHandle,
        higher_priority_task_woken: Option<&mut bool>,
    ) -> bool;
    fn stream_buffer_is_full(&self, buffer: StreamBufferHandle) -> bool;
    fn stream_buffer_is_empty(&self, buffer: StreamBufferHandle) -> bool;
    fn stream_buffer_spaces_available(&self, buffer: StreamBufferHandle) -> usize;
    fn stream_buffer_bytes_available(&self, buffer: StreamBufferHandle) -> usize;
    fn stream_buffer_set_trigger_level(&self, buffer: StreamBufferHandle, trigger_level: usize) -> bool;
    fn stream_buffer_next_message_length(&self, buffer: StreamBufferHandle) -> usize;
}
