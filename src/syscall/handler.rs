//! System Call Handlers
//!
//! One handler per system call. Each decodes raw argument registers into
//! the gate's typed arguments and encodes the result as a register value.
//!
//! Calls with five arguments receive a single pointer to a parameter block
//! in application memory. The block itself is checked for readability
//! before any field is used.

use crate::gate::{Gateway, OrFail};
use crate::kernel::*;
use crate::object::ExternalHandle;

use super::numbers::{self, NUM_SYSTEM_CALLS};
use super::validate::UserPtr;
use super::{SyscallArgs, SyscallFn};

/// Resolve a table entry, honouring enabled features.
macro_rules! gated {
    ($cfg:meta, $handler:expr) => {{
        #[cfg($cfg)]
        let entry: Option<SyscallFn<K, P>> = Some($handler);
        #[cfg(not($cfg))]
        let entry: Option<SyscallFn<K, P>> = None;
        entry
    }};
}

/// The dispatch table.
///
/// Built as data so the trap entry can only reach these handlers.
pub struct SystemCallTable<K, P>(core::marker::PhantomData<(K, P)>);

impl<K: Kernel, P: Port> SystemCallTable<K, P> {
    pub const ENTRIES: [Option<SyscallFn<K, P>>; NUM_SYSTEM_CALLS] = {
        let mut table: [Option<SyscallFn<K, P>>; NUM_SYSTEM_CALLS] = [None; NUM_SYSTEM_CALLS];

        table[numbers::TASK_GENERIC_NOTIFY] = gated!(feature = "task-notifications", task_generic_notify);
        table[numbers::TASK_GENERIC_NOTIFY_WAIT] =
            gated!(feature = "task-notifications", task_generic_notify_wait);
        table[numbers::TIMER_GENERIC_COMMAND_FROM_TASK] =
            gated!(feature = "timers", timer_generic_command_from_task);
        table[numbers::EVENT_GROUP_WAIT_BITS] = gated!(feature = "event-groups", event_group_wait_bits);
        table[numbers::TASK_DELAY_UNTIL] = Some(task_delay_until);
        table[numbers::TASK_ABORT_DELAY] = Some(task_abort_delay);
        table[numbers::TASK_DELAY] = Some(task_delay);
        table[numbers::TASK_PRIORITY_GET] = Some(task_priority_get);
        table[numbers::TASK_GET_STATE] = Some(task_get_state);
        table[numbers::TASK_GET_INFO] = gated!(feature = "trace-facility", task_get_info);
        table[numbers::TASK_GET_IDLE_TASK_HANDLE] = Some(task_get_idle_task_handle);
        table[numbers::TASK_SUSPEND] = Some(task_suspend);
        table[numbers::TASK_RESUME] = Some(task_resume);
        table[numbers::TASK_GET_TICK_COUNT] = Some(task_get_tick_count);
        table[numbers::TASK_GET_NUMBER_OF_TASKS] = Some(task_get_number_of_tasks);
        table[numbers::TASK_GET_RUN_TIME_COUNTER] = gated!(feature = "run-time-stats", task_get_run_time_counter);
        table[numbers::TASK_GET_RUN_TIME_PERCENT] = gated!(feature = "run-time-stats", task_get_run_time_percent);
        table[numbers::TASK_GET_IDLE_RUN_TIME_PERCENT] =
            gated!(feature = "run-time-stats", task_get_idle_run_time_percent);
        table[numbers::TASK_GET_IDLE_RUN_TIME_COUNTER] =
            gated!(feature = "run-time-stats", task_get_idle_run_time_counter);
        table[numbers::TASK_SET_APPLICATION_TASK_TAG] = Some(task_set_application_task_tag);
        table[numbers::TASK_GET_APPLICATION_TASK_TAG] = Some(task_get_application_task_tag);
        table[numbers::TASK_SET_THREAD_LOCAL_STORAGE_POINTER] = Some(task_set_thread_local_storage_pointer);
        table[numbers::TASK_GET_THREAD_LOCAL_STORAGE_POINTER] = Some(task_get_thread_local_storage_pointer);
        table[numbers::TASK_GET_SYSTEM_STATE] = gated!(feature = "trace-facility", task_get_system_state);
        table[numbers::TASK_GET_STACK_HIGH_WATER_MARK] = Some(task_get_stack_high_water_mark);
        table[numbers::TASK_GET_STACK_HIGH_WATER_MARK2] = Some(task_get_stack_high_water_mark2);
        table[numbers::TASK_GET_CURRENT_TASK_HANDLE] = Some(task_get_current_task_handle);
        table[numbers::TASK_GET_SCHEDULER_STATE] = Some(task_get_scheduler_state);
        table[numbers::TASK_SET_TIME_OUT_STATE] = Some(task_set_time_out_state);
        table[numbers::TASK_CHECK_FOR_TIME_OUT] = Some(task_check_for_time_out);
        table[numbers::TASK_GENERIC_NOTIFY_TAKE] = gated!(feature = "task-notifications", task_generic_notify_take);
        table[numbers::TASK_GENERIC_NOTIFY_STATE_CLEAR] =
            gated!(feature = "task-notifications", task_generic_notify_state_clear);
        table[numbers::TASK_GENERIC_NOTIFY_VALUE_CLEAR] =
            gated!(feature = "task-notifications", task_generic_notify_value_clear);
        table[numbers::QUEUE_GENERIC_SEND] = Some(queue_generic_send);
        table[numbers::QUEUE_MESSAGES_WAITING] = Some(queue_messages_waiting);
        table[numbers::QUEUE_SPACES_AVAILABLE] = Some(queue_spaces_available);
        table[numbers::QUEUE_RECEIVE] = Some(queue_receive);
        table[numbers::QUEUE_PEEK] = Some(queue_peek);
        table[numbers::QUEUE_SEMAPHORE_TAKE] = Some(queue_semaphore_take);
        table[numbers::QUEUE_GET_MUTEX_HOLDER] = Some(queue_get_mutex_holder);
        table[numbers::QUEUE_TAKE_MUTEX_RECURSIVE] = Some(queue_take_mutex_recursive);
        table[numbers::QUEUE_GIVE_MUTEX_RECURSIVE] = Some(queue_give_mutex_recursive);
        table[numbers::QUEUE_SELECT_FROM_SET] = gated!(feature = "queue-sets", queue_select_from_set);
        table[numbers::QUEUE_ADD_TO_SET] = gated!(feature = "queue-sets", queue_add_to_set);
        table[numbers::QUEUE_ADD_TO_REGISTRY] = gated!(feature = "queue-registry", queue_add_to_registry);
        table[numbers::QUEUE_UNREGISTER_QUEUE] = gated!(feature = "queue-registry", queue_unregister_queue);
        table[numbers::QUEUE_GET_NAME] = gated!(feature = "queue-registry", queue_get_name);
        table[numbers::TIMER_GET_TIMER_ID] = gated!(feature = "timers", timer_get_timer_id);
        table[numbers::TIMER_SET_TIMER_ID] = gated!(feature = "timers", timer_set_timer_id);
        table[numbers::TIMER_IS_TIMER_ACTIVE] = gated!(feature = "timers", timer_is_timer_active);
        table[numbers::TIMER_GET_TIMER_DAEMON_TASK_HANDLE] =
            gated!(feature = "timers", timer_get_timer_daemon_task_handle);
        table[numbers::TIMER_GET_NAME] = gated!(feature = "timers", timer_get_name);
        table[numbers::TIMER_SET_RELOAD_MODE] = gated!(feature = "timers", timer_set_reload_mode);
        table[numbers::TIMER_GET_RELOAD_MODE] = gated!(feature = "timers", timer_get_reload_mode);
        table[numbers::TIMER_GET_RELOAD_MODE_FLAG] = gated!(feature = "timers", timer_get_reload_mode_flag);
        table[numbers::TIMER_GET_PERIOD] = gated!(feature = "timers", timer_get_period);
        table[numbers::TIMER_GET_EXPIRY_TIME] = gated!(feature = "timers", timer_get_expiry_time);
        table[numbers::EVENT_GROUP_CLEAR_BITS] = gated!(feature = "event-groups", event_group_clear_bits);
        table[numbers::EVENT_GROUP_SET_BITS] = gated!(feature = "event-groups", event_group_set_bits);
        table[numbers::EVENT_GROUP_SYNC] = gated!(feature = "event-groups", event_group_sync);
        table[numbers::EVENT_GROUP_GET_NUMBER] = gated!(
            all(feature = "event-groups", feature = "trace-facility"),
            event_group_get_number
        );
        table[numbers::EVENT_GROUP_SET_NUMBER] = gated!(
            all(feature = "event-groups", feature = "trace-facility"),
            event_group_set_number
        );
        table[numbers::STREAM_BUFFER_SEND] = gated!(feature = "stream-buffers", stream_buffer_send);
        table[numbers::STREAM_BUFFER_RECEIVE] = gated!(feature = "stream-buffers", stream_buffer_receive);
        table[numbers::STREAM_BUFFER_IS_FULL] = gated!(feature = "stream-buffers", stream_buffer_is_full);
        table[numbers::STREAM_BUFFER_IS_EMPTY] = gated!(feature = "stream-buffers", stream_buffer_is_empty);
        table[numbers::STREAM_BUFFER_SPACES_AVAILABLE] =
            gated!(feature = "stream-buffers", stream_buffer_spaces_available);
        table[numbers::STREAM_BUFFER_BYTES_AVAILABLE] =
            gated!(feature = "stream-buffers", stream_buffer_bytes_available);
        table[numbers::STREAM_BUFFER_SET_TRIGGER_LEVEL] =
            gated!(feature = "stream-buffers", stream_buffer_set_trigger_level);
        table[numbers::STREAM_BUFFER_NEXT_MESSAGE_LENGTH_BYTES] =
            gated!(feature = "stream-buffers", stream_buffer_next_message_length_bytes);

        table
    };
}

// -------------------------------------------------------------------------
// Register decoding
// -------------------------------------------------------------------------

impl SyscallArgs {
    #[inline]
    fn word(&self, n: usize) -> usize {
        self.regs[n]
    }

    /// Narrow to the kernel's 32-bit types; the upper half is ignored.
    #[inline]
    fn u32(&self, n: usize) -> u32 {
        self.regs[n] as u32
    }

    #[inline]
    fn i32(&self, n: usize) -> i32 {
        self.regs[n] as i32
    }

    #[inline]
    fn flag(&self, n: usize) -> bool {
        self.regs[n] != 0
    }

    #[inline]
    fn handle(&self, n: usize) -> ExternalHandle {
        ExternalHandle::from_raw(self.regs[n])
    }

    #[inline]
    fn ptr<T>(&self, n: usize) -> UserPtr<T> {
        UserPtr::from_raw(self.regs[n])
    }
}

#[inline]
fn from_bool(value: bool) -> usize {
    usize::from(value)
}

// -------------------------------------------------------------------------
// Tasks
// -------------------------------------------------------------------------

#[cfg(feature = "task-notifications")]
fn task_generic_notify<K: Kernel, P: Port>(gate: &Gateway<K, P>, args: &SyscallArgs) -> usize {
    let notified = gate.user_read(args.ptr::<NotifyParams>(0)).map(|params| {
        gate.task_generic_notify(
            ExternalHandle::from_raw(params.task),
            params.index,
            params.value,
            params.action,
            UserPtr::from_raw(params.previous_value),
        )
    });
    from_bool(notified.or_fail("task_generic_notify", false))
}

#[cfg(feature = "task-notifications")]
fn task_generic_notify_wait<K: Kernel, P: Port>(gate: &Gateway<K, P>, args: &SyscallArgs) -> usize {
    let notified = gate.user_read(args.ptr::<NotifyWaitParams>(0)).map(|params| {
        gate.task_generic_notify_wait(
            params.index,
            params.clear_on_entry,
            params.clear_on_exit,
            UserPtr::from_raw(params.value),
            params.ticks_to_wait,
        )
    });
    from_bool(notified.or_fail("task_generic_notify_wait", false))
}

fn task_delay_until<K: Kernel, P: Port>(gate: &Gateway<K, P>, args: &SyscallArgs) -> usize {
    from_bool(gate.task_delay_until(args.ptr(0), args.u32(1)))
}

fn task_abort_delay<K: Kernel, P: Port>(gate: &Gateway<K, P>, args: &SyscallArgs) -> usize {
    from_bool(gate.task_abort_delay(args.handle(0)))
}

fn task_delay<K: Kernel, P: Port>(gate: &Gateway<K, P>, args: &SyscallArgs) -> usize {
    gate.task_delay(args.u32(0));
    0
}

fn task_priority_get<K: Kernel, P: Port>(gate: &Gateway<K, P>, args: &SyscallArgs) -> usize {
    gate.task_priority_get(args.handle(0)) as usize
}

fn task_get_state<K: Kernel, P: Port>(gate: &Gateway<K, P>, args: &SyscallArgs) -> usize {
    gate.task_get_state(args.handle(0)) as usize
}

#[cfg(feature = "trace-facility")]
fn task_get_info<K: Kernel, P: Port>(gate: &Gateway<K, P>, args: &SyscallArgs) -> usize {
    gate.task_get_info(args.handle(0), args.ptr(1), args.flag(2), TaskState::from_raw(args.word(3)));
    0
}

fn task_get_idle_task_handle<K: Kernel, P: Port>(gate: &Gateway<K, P>, _: &SyscallArgs) -> usize {
    gate.task_get_idle_task_handle().raw()
}

fn task_suspend<K: Kernel, P: Port>(gate: &Gateway<K, P>, args: &SyscallArgs) -> usize {
    gate.task_suspend(args.handle(0));
    0
}

fn task_resume<K: Kernel, P: Port>(gate: &Gateway<K, P>, args: &SyscallArgs) -> usize {
    gate.task_resume(args.handle(0));
    0
}

fn task_get_tick_count<K: Kernel, P: Port>(gate: &Gateway<K, P>, _: &SyscallArgs) -> usize {
    gate.task_get_tick_count() as usize
}

fn task_get_number_of_tasks<K: Kernel, P: Port>(gate: &Gateway<K, P>, _: &SyscallArgs) -> usize {
    gate.task_get_number_of_tasks() as usize
}

#[cfg(feature = "run-time-stats")]
fn task_get_run_time_counter<K: Kernel, P: Port>(gate: &Gateway<K, P>, args: &SyscallArgs) -> usize {
    gate.task_get_run_time_counter(args.handle(0)) as usize
}

#[cfg(feature = "run-time-stats")]
fn task_get_run_time_percent<K: Kernel, P: Port>(gate: &Gateway<K, P>, args: &SyscallArgs) -> usize {
    gate.task_get_run_time_percent(args.handle(0)) as usize
}

#[cfg(feature = "run-time-stats")]
fn task_get_idle_run_time_percent<K: Kernel, P: Port>(gate: &Gateway<K, P>, _: &SyscallArgs) -> usize {
    gate.task_get_idle_run_time_percent() as usize
}

#[cfg(feature = "run-time-stats")]
fn task_get_idle_run_time_counter<K: Kernel, P: Port>(gate: &Gateway<K, P>, _: &SyscallArgs) -> usize {
    gate.task_get_idle_run_time_counter() as usize
}

fn task_set_application_task_tag<K: Kernel, P: Port>(gate: &Gateway<K, P>, args: &SyscallArgs) -> usize {
    gate.task_set_application_task_tag(args.handle(0), args.word(1));
    0
}

fn task_get_application_task_tag<K: Kernel, P: Port>(gate: &Gateway<K, P>, args: &SyscallArgs) -> usize {
    gate.task_get_application_task_tag(args.handle(0))
}

fn task_set_thread_local_storage_pointer<K: Kernel, P: Port>(gate: &Gateway<K, P>, args: &SyscallArgs) -> usize {
    gate.task_set_thread_local_storage_pointer(args.handle(0), args.i32(1), args.word(2));
    0
}

fn task_get_thread_local_storage_pointer<K: Kernel, P: Port>(gate: &Gateway<K, P>, args: &SyscallArgs) -> usize {
    gate.task_get_thread_local_storage_pointer(args.handle(0), args.i32(1))
}

#[cfg(feature = "trace-facility")]
fn task_get_system_state<K: Kernel, P: Port>(gate: &Gateway<K, P>, args: &SyscallArgs) -> usize {
    gate.task_get_system_state(args.ptr(0), args.u32(1), args.ptr(2)) as usize
}

fn task_get_stack_high_water_mark<K: Kernel, P: Port>(gate: &Gateway<K, P>, args: &SyscallArgs) -> usize {
    gate.task_get_stack_high_water_mark(args.handle(0)) as usize
}

fn task_get_stack_high_water_mark2<K: Kernel, P: Port>(gate: &Gateway<K, P>, args: &SyscallArgs) -> usize {
    gate.task_get_stack_high_water_mark2(args.handle(0)) as usize
}

fn task_get_current_task_handle<K: Kernel, P: Port>(gate: &Gateway<K, P>, _: &SyscallArgs) -> usize {
    gate.task_get_current_task_handle().raw()
}

fn task_get_scheduler_state<K: Kernel, P: Port>(gate: &Gateway<K, P>, _: &SyscallArgs) -> usize {
    gate.task_get_scheduler_state() as usize
}

fn task_set_time_out_state<K: Kernel, P: Port>(gate: &Gateway<K, P>, args: &SyscallArgs) -> usize {
    gate.task_set_time_out_state(args.ptr(0));
    0
}

fn task_check_for_time_out<K: Kernel, P: Port>(gate: &Gateway<K, P>, args: &SyscallArgs) -> usize {
    from_bool(gate.task_check_for_time_out(args.ptr(0), args.ptr(1)))
}

#[cfg(feature = "task-notifications")]
fn task_generic_notify_take<K: Kernel, P: Port>(gate: &Gateway<K, P>, args: &SyscallArgs) -> usize {
    gate.task_generic_notify_take(args.u32(0), args.flag(1), args.u32(2)) as usize
}

#[cfg(feature = "task-notifications")]
fn task_generic_notify_state_clear<K: Kernel, P: Port>(gate: &Gateway<K, P>, args: &SyscallArgs) -> usize {
    from_bool(gate.task_generic_notify_state_clear(args.handle(0), args.u32(1)))
}

#[cfg(feature = "task-notifications")]
fn task_generic_notify_value_clear<K: Kernel, P: Port>(gate: &Gateway<K, P>, args: &SyscallArgs) -> usize {
    gate.task_generic_notify_value_clear(args.handle(0), args.u32(1), args.u32(2)) as usize
}

// -------------------------------------------------------------------------
// Queues
// -------------------------------------------------------------------------

fn queue_generic_send<K: Kernel, P: Port>(gate: &Gateway<K, P>, args: &SyscallArgs) -> usize {
    let Some(position) = CopyPosition::from_raw(args.word(3)) else {
        log::debug!("queue_generic_send: rejected: unknown copy position {}", args.word(3));
        return 0;
    };
    from_bool(gate.queue_generic_send(args.handle(0), args.ptr(1), args.u32(2), position))
}

fn queue_messages_waiting<K: Kernel, P: Port>(gate: &Gateway<K, P>, args: &SyscallArgs) -> usize {
    gate.queue_messages_waiting(args.handle(0)) as usize
}

fn queue_spaces_available<K: Kernel, P: Port>(gate: &Gateway<K, P>, args: &SyscallArgs) -> usize {
    gate.queue_spaces_available(args.handle(0)) as usize
}

fn queue_receive<K: Kernel, P: Port>(gate: &Gateway<K, P>, args: &SyscallArgs) -> usize {
    from_bool(gate.queue_receive(args.handle(0), args.ptr(1), args.u32(2)))
}

fn queue_peek<K: Kernel, P: Port>(gate: &Gateway<K, P>, args: &SyscallArgs) -> usize {
    from_bool(gate.queue_peek(args.handle(0), args.ptr(1), args.u32(2)))
}

fn queue_semaphore_take<K: Kernel, P: Port>(gate: &Gateway<K, P>, args: &SyscallArgs) -> usize {
    from_bool(gate.queue_semaphore_take(args.handle(0), args.u32(1)))
}

fn queue_get_mutex_holder<K: Kernel, P: Port>(gate: &Gateway<K, P>, args: &SyscallArgs) -> usize {
    gate.queue_get_mutex_holder(args.handle(0)).raw()
}

fn queue_take_mutex_recursive<K: Kernel, P: Port>(gate: &Gateway<K, P>, args: &SyscallArgs) -> usize {
    from_bool(gate.queue_take_mutex_recursive(args.handle(0), args.u32(1)))
}

fn queue_give_mutex_recursive<K: Kernel, P: Port>(gate: &Gateway<K, P>, args: &SyscallArgs) -> usize {
    from_bool(gate.queue_give_mutex_recursive(args.handle(0)))
}

#[cfg(feature = "queue-sets")]
fn queue_select_from_set<K: Kernel, P: Port>(gate: &Gateway<K, P>, args: &SyscallArgs) -> usize {
    gate.queue_select_from_set(args.handle(0), args.u32(1)).raw()
}

#[cfg(feature = "queue-sets")]
fn queue_add_to_set<K: Kernel, P: Port>(gate: &Gateway<K, P>, args: &SyscallArgs) -> usize {
    from_bool(gate.queue_add_to_set(args.handle(0), args.handle(1)))
}

#[cfg(feature = "queue-registry")]
fn queue_add_to_registry<K: Kernel, P: Port>(gate: &Gateway<K, P>, args: &SyscallArgs) -> usize {
    gate.queue_add_to_registry(args.handle(0), args.word(1));
    0
}

#[cfg(feature = "queue-registry")]
fn queue_unregister_queue<K: Kernel, P: Port>(gate: &Gateway<K, P>, args: &SyscallArgs) -> usize {
    gate.queue_unregister_queue(args.handle(0));
    0
}

#[cfg(feature = "queue-registry")]
fn queue_get_name<K: Kernel, P: Port>(gate: &Gateway<K, P>, args: &SyscallArgs) -> usize {
    gate.queue_get_name(args.handle(0))
}

// -------------------------------------------------------------------------
// Timers
// -------------------------------------------------------------------------

#[cfg(feature = "timers")]
fn timer_generic_command_from_task<K: Kernel, P: Port>(gate: &Gateway<K, P>, args: &SyscallArgs) -> usize {
    let accepted = gate.user_read(args.ptr::<TimerCommandParams>(0)).map(|params| {
        gate.timer_generic_command_from_task(
            ExternalHandle::from_raw(params.timer),
            params.command,
            params.optional_value,
            UserPtr::from_raw(params.higher_priority_task_woken),
            params.ticks_to_wait,
        )
    });
    from_bool(accepted.or_fail("timer_generic_command_from_task", false))
}

#[cfg(feature = "timers")]
fn timer_get_timer_id<K: Kernel, P: Port>(gate: &Gateway<K, P>, args: &SyscallArgs) -> usize {
    gate.timer_get_timer_id(args.handle(0))
}

#[cfg(feature = "timers")]
fn timer_set_timer_id<K: Kernel, P: Port>(gate: &Gateway<K, P>, args: &SyscallArgs) -> usize {
    gate.timer_set_timer_id(args.handle(0), args.word(1));
    0
}

#[cfg(feature = "timers")]
fn timer_is_timer_active<K: Kernel, P: Port>(gate: &Gateway<K, P>, args: &SyscallArgs) -> usize {
    from_bool(gate.timer_is_timer_active(args.handle(0)))
}

#[cfg(feature = "timers")]
fn timer_get_timer_daemon_task_handle<K: Kernel, P: Port>(gate: &Gateway<K, P>, _: &SyscallArgs) -> usize {
    gate.timer_get_timer_daemon_task_handle().raw()
}

#[cfg(feature = "timers")]
fn timer_get_name<K: Kernel, P: Port>(gate: &Gateway<K, P>, args: &SyscallArgs) -> usize {
    gate.timer_get_name(args.handle(0))
}

#[cfg(feature = "timers")]
fn timer_set_reload_mode<K: Kernel, P: Port>(gate: &Gateway<K, P>, args: &SyscallArgs) -> usize {
    gate.timer_set_reload_mode(args.handle(0), args.flag(1));
    0
}

#[cfg(feature = "timers")]
fn timer_get_reload_mode<K: Kernel, P: Port>(gate: &Gateway<K, P>, args: &SyscallArgs) -> usize {
    from_bool(gate.timer_get_reload_mode(args.handle(0)))
}

#[cfg(feature = "timers")]
fn timer_get_reload_mode_flag<K: Kernel, P: Port>(gate: &Gateway<K, P>, args: &SyscallArgs) -> usize {
    gate.timer_get_reload_mode_flag(args.handle(0)) as usize
}

#[cfg(feature = "timers")]
fn timer_get_period<K: Kernel, P: Port>(gate: &Gateway<K, P>, args: &SyscallArgs) -> usize {
    gate.timer_get_period(args.handle(0)) as usize
}

#[cfg(feature = "timers")]
fn timer_get_expiry_time<K: Kernel, P: Port>(gate: &Gateway<K, P>, args: &SyscallArgs) -> usize {
    gate.timer_get_expiry_time(args.handle(0)) as usize
}

// -------------------------------------------------------------------------
// Event groups
// -------------------------------------------------------------------------

#[cfg(feature = "event-groups")]
fn event_group_wait_bits<K: Kernel, P: Port>(gate: &Gateway<K, P>, args: &SyscallArgs) -> usize {
    let bits = gate.user_read(args.ptr::<WaitBitsParams>(0)).map(|params| {
        gate.event_group_wait_bits(
            ExternalHandle::from_raw(params.event_group),
            params.bits_to_wait_for,
            params.clear_on_exit != 0,
            params.wait_for_all_bits != 0,
            params.ticks_to_wait,
        )
    });
    bits.or_fail("event_group_wait_bits", 0) as usize
}

#[cfg(feature = "event-groups")]
fn event_group_clear_bits<K: Kernel, P: Port>(gate: &Gateway<K, P>, args: &SyscallArgs) -> usize {
    gate.event_group_clear_bits(args.handle(0), args.u32(1)) as usize
}

#[cfg(feature = "event-groups")]
fn event_group_set_bits<K: Kernel, P: Port>(gate: &Gateway<K, P>, args: &SyscallArgs) -> usize {
    gate.event_group_set_bits(args.handle(0), args.u32(1)) as usize
}

#[cfg(feature = "event-groups")]
fn event_group_sync<K: Kernel, P: Port>(gate: &Gateway<K, P>, args: &SyscallArgs) -> usize {
    gate.event_group_sync(args.handle(0), args.u32(1), args.u32(2), args.u32(3)) as usize
}

#[cfg(all(feature = "event-groups", feature = "trace-facility"))]
fn event_group_get_number<K: Kernel, P: Port>(gate: &Gateway<K, P>, args: &SyscallArgs) -> usize {
    gate.event_group_get_number(args.handle(0)) as usize
}

#[cfg(all(feature = "event-groups", feature = "trace-facility"))]
fn event_group_set_number<K: Kernel, P: Port>(gate: &Gateway<K, P>, args: &SyscallArgs) -> usize {
    gate.event_group_set_number(args.handle(0), args.u32(1));
    0
}

// -------------------------------------------------------------------------
// Stream buffers
// -------------------------------------------------------------------------

#[cfg(feature = "stream-buffers")]
fn stream_buffer_send<K: Kernel, P: Port>(gate: &Gateway<K, P>, args: &SyscallArgs) -> usize {
    gate.stream_buffer_send(args.handle(0), args.ptr(1), args.word(2), args.u32(3))
}

#[cfg(feature = "stream-buffers")]
fn stream_buffer_receive<K: Kernel, P: Port>(gate: &Gateway<K, P>, args: &SyscallArgs) -> usize {
    gate.stream_buffer_receive(args.handle(0), args.ptr(1), args.word(2), args.u32(3))
}

#[cfg(feature = "stream-buffers")]
fn stream_buffer_is_full<K: Kernel, P: Port>(gate: &Gateway<K, P>, args: &SyscallArgs) -> usize {
    from_bool(gate.stream_buffer_is_full(args.handle(0)))
}

#[cfg(feature = "stream-buffers")]
fn stream_buffer_is_empty<K: Kernel, P: Port>(gate: &Gateway<K, P>, args: &SyscallArgs) -> usize {
    from_bool(gate.stream_buffer_is_empty(args.handle(0)))
}

#[cfg(feature = "stream-buffers")]
fn stream_buffer_spaces_available<K: Kernel, P: Port>(gate: &Gateway<K, P>, args: &SyscallArgs) -> usize {
    gate.stream_buffer_spaces_available(args.handle(0))
}

#[cfg(feature = "stream-buffers")]
fn stream_buffer_bytes_available<K: Kernel, P: Port>(gate: &Gateway<K, P>, args: &SyscallArgs) -> usize {
    gate.stream_buffer_bytes_available(args.handle(0))
}

#[cfg(feature = "stream-buffers")]
fn stream_buffer_set_trigger_level<K: Kernel, P: Port>(gate: &Gateway<K, P>, args: &SyscallArgs) -> usize {
    from_bool(gate.stream_buffer_set_trigger_level(args.handle(0), args.word(1)))
}

#[cfg(feature = "stream-buffers")]
fn stream_buffer_next_message_length_bytes<K: Kernel, P: Port>(gate: &Gateway<K, P>, args: &SyscallArgs) -> usize {
    gate.stream_buffer_next_message_length_bytes(args.handle(0))
}
