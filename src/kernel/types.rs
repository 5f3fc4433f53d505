//! Kernel Data Types
//!
//! Scalar aliases, enumerations and the plain structures exchanged with
//! application code. Structures that live in application memory hold only
//! integer fields, so any bit pattern there is a valid value.

use crate::object::ExternalHandle;

pub type TickType = u32;
pub type BaseType = i32;
pub type UBaseType = u32;
pub type EventBits = u32;
pub type RunTimeCounter = u32;
pub type StackDepth = u32;

/// Block indefinitely.
pub const MAX_DELAY: TickType = TickType::MAX;

/// Event-group bits reserved for the kernel's own use.
pub const EVENT_BITS_CONTROL_BYTES: EventBits = 0xFF00_0000;

/// Priority bit requesting a privileged task.
pub const PRIVILEGE_BIT: UBaseType = 0x8000_0000;

/// Timer command identifiers.
pub mod timer_command {
    use super::BaseType;

    pub const EXECUTE_CALLBACK_FROM_ISR: BaseType = -2;
    pub const EXECUTE_CALLBACK: BaseType = -1;
    pub const START_DONT_TRACE: BaseType = 0;
    pub const START: BaseType = 1;
    pub const RESET: BaseType = 2;
    pub const STOP: BaseType = 3;
    pub const CHANGE_PERIOD: BaseType = 4;
    pub const DELETE: BaseType = 5;
    /// First command that may only be issued from an interrupt.
    pub const FIRST_FROM_ISR: BaseType = 6;
    pub const START_FROM_ISR: BaseType = 6;
    pub const RESET_FROM_ISR: BaseType = 7;
    pub const STOP_FROM_ISR: BaseType = 8;
    pub const CHANGE_PERIOD_FROM_ISR: BaseType = 9;
}

/// Task states as reported by the kernel.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[repr(u32)]
pub enum TaskState {
    Running = 0,
    Ready = 1,
    Blocked = 2,
    Suspended = 3,
    Deleted = 4,
    /// Failure value, and "query the state" when passed in.
    Invalid = 5,
}

impl TaskState {
    pub const fn from_raw(raw: usize) -> Self {
        match raw {
            0 => Self::Running,
            1 => Self::Ready,
            2 => Self::Blocked,
            3 => Self::Suspended,
            4 => Self::Deleted,
            _ => Self::Invalid,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[repr(i32)]
pub enum SchedulerState {
    Suspended = 0,
    NotStarted = 1,
    Running = 2,
}

/// What a notification does to the target's notification value.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[repr(u32)]
pub enum NotifyAction {
    NoAction = 0,
    SetBits = 1,
    Increment = 2,
    SetValueWithOverwrite = 3,
    SetValueWithoutOverwrite = 4,
}

impl NotifyAction {
    /// Decode an action received from application code.
    pub const fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            0 => Some(Self::NoAction),
            1 => Some(Self::SetBits),
            2 => Some(Self::Increment),
            3 => Some(Self::SetValueWithOverwrite),
            4 => Some(Self::SetValueWithoutOverwrite),
            _ => None,
        }
    }
}

/// Where a queue send places the item.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[repr(i32)]
pub enum CopyPosition {
    Back = 0,
    Front = 1,
    /// Replace the single item of a length-one queue.
    Overwrite = 2,
}

impl CopyPosition {
    pub const fn from_raw(raw: usize) -> Option<Self> {
        match raw {
            0 => Some(Self::Back),
            1 => Some(Self::Front),
            2 => Some(Self::Overwrite),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[repr(u8)]
pub enum QueueType {
    Base = 0,
    Mutex = 1,
    CountingSemaphore = 2,
    BinarySemaphore = 3,
    RecursiveMutex = 4,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[repr(u8)]
pub enum StreamBufferKind {
    Stream = 0,
    Message = 1,
    Batching = 2,
}

/// Timeout bookkeeping owned by the application.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
#[repr(C)]
pub struct TimeOut {
    pub overflow_count: BaseType,
    pub time_on_entering: TickType,
}

/// Per-task report written into application memory.
///
/// `handle` always carries an external handle, null for tasks outside the
/// pool.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
#[repr(C)]
pub struct TaskStatus {
    pub handle: usize,
    pub name: usize,
    pub task_number: UBaseType,
    pub current_state: u32,
    pub current_priority: UBaseType,
    pub base_priority: UBaseType,
    pub run_time_counter: RunTimeCounter,
    pub stack_high_water_mark: StackDepth,
    pub stack_base: usize,
}

impl TaskStatus {
    pub const fn state(&self) -> TaskState {
        TaskState::from_raw(self.current_state as usize)
    }

    pub const fn external_handle(&self) -> ExternalHandle {
        ExternalHandle::from_raw(self.handle)
    }
}

/// Memory backing a statically allocated object.
///
/// Addresses are privileged memory supplied by the creator; `buffer` is zero
/// for objects without a storage area.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct StaticStorage {
    pub buffer: usize,
    pub control_block: usize,
}

/// Task entry point.
pub type TaskFunction = fn(usize);

/// Parameters for creating a task.
#[derive(Clone, Copy, Debug)]
pub struct TaskParameters<'a> {
    pub entry: TaskFunction,
    pub name: &'a str,
    pub stack_depth: StackDepth,
    pub argument: usize,
    /// May carry [`PRIVILEGE_BIT`].
    pub priority: UBaseType,
    /// MPU regions for restricted tasks; empty otherwise.
    pub regions: &'a [crate::syscall::validate::MpuRegion],
}

impl TaskParameters<'_> {
    pub const fn is_privileged(&self) -> bool {
        self.priority & PRIVILEGE_BIT != 0
    }
}

/// Arguments of a task notification, read from application memory.
#[derive(Clone, Copy, Debug, Default)]
#[repr(C)]
pub struct NotifyParams {
    pub task: usize,
    pub index: UBaseType,
    pub value: u32,
    pub action: u32,
    pub previous_value: usize,
}

/// Arguments of a notification wait, read from application memory.
#[derive(Clone, Copy, Debug, Default)]
#[repr(C)]
pub struct NotifyWaitParams {
    pub index: UBaseType,
    pub clear_on_entry: u32,
    pub clear_on_exit: u32,
    pub value: usize,
    pub ticks_to_wait: TickType,
}

/// Arguments of a timer command, read from application memory.
#[derive(Clone, Copy, Debug, Default)]
#[repr(C)]
pub struct TimerCommandParams {
    pub timer: usize,
    pub command: BaseType,
    pub optional_value: TickType,
    pub higher_priority_task_woken: usize,
    pub ticks_to_wait: TickType,
}

/// Arguments of an event-group wait, read from application memory.
#[derive(Clone, Copy, Debug, Default)]
#[repr(C)]
pub struct WaitBitsParams {
    pub event_group: usize,
    pub bits_to_wait_for: EventBits,
    pub clear_on_exit: BaseType,
    pub wait_for_all_bits: BaseType,
    pub ticks_to_wait: TickType,
}
