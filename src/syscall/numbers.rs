//! System call numbers.
//!
//! Numbering is fixed across builds. A call whose feature is disabled keeps
//! its number and dispatches to nothing.

pub const TASK_GENERIC_NOTIFY: usize = 0;
pub const TASK_GENERIC_NOTIFY_WAIT: usize = 1;
pub const TIMER_GENERIC_COMMAND_FROM_TASK: usize = 2;
pub const EVENT_GROUP_WAIT_BITS: usize = 3;
pub const TASK_DELAY_UNTIL: usize = 4;
pub const TASK_ABORT_DELAY: usize = 5;
pub const TASK_DELAY: usize = 6;
pub const TASK_PRIORITY_GET: usize = 7;
pub const TASK_GET_STATE: usize = 8;
pub const TASK_GET_INFO: usize = 9;
pub const TASK_GET_IDLE_TASK_HANDLE: usize = 10;
pub const TASK_SUSPEND: usize = 11;
pub const TASK_RESUME: usize = 12;
pub const TASK_GET_TICK_COUNT: usize = 13;
pub const TASK_GET_NUMBER_OF_TASKS: usize = 14;
pub const TASK_GET_RUN_TIME_COUNTER: usize = 15;
pub const TASK_GET_RUN_TIME_PERCENT: usize = 16;
pub const TASK_GET_IDLE_RUN_TIME_PERCENT: usize = 17;
pub const TASK_GET_IDLE_RUN_TIME_COUNTER: usize = 18;
pub const TASK_SET_APPLICATION_TASK_TAG: usize = 19;
pub const TASK_GET_APPLICATION_TASK_TAG: usize = 20;
pub const TASK_SET_THREAD_LOCAL_STORAGE_POINTER: usize = 21;
pub const TASK_GET_THREAD_LOCAL_STORAGE_POINTER: usize = 22;
pub const TASK_GET_SYSTEM_STATE: usize = 23;
pub const TASK_GET_STACK_HIGH_WATER_MARK: usize = 24;
pub const TASK_GET_STACK_HIGH_WATER_MARK2: usize = 25;
pub const TASK_GET_CURRENT_TASK_HANDLE: usize = 26;
pub const TASK_GET_SCHEDULER_STATE: usize = 27;
pub const TASK_SET_TIME_OUT_STATE: usize = 28;
pub const TASK_CHECK_FOR_TIME_OUT: usize = 29;
pub const TASK_GENERIC_NOTIFY_TAKE: usize = 30;
pub const TASK_GENERIC_NOTIFY_STATE_CLEAR: usize = 31;
pub const TASK_GENERIC_NOTIFY_VALUE_CLEAR: usize = 32;
pub const QUEUE_GENERIC_SEND: usize = 33;
pub const QUEUE_MESSAGES_WAITING: usize = 34;
pub const QUEUE_SPACES_AVAILABLE: usize = 35;
pub const QUEUE_RECEIVE: usize = 36;
pub const QUEUE_PEEK: usize = 37;
pub const QUEUE_SEMAPHORE_TAKE: usize = 38;
pub const QUEUE_GET_MUTEX_HOLDER: usize = 39;
pub const QUEUE_TAKE_MUTEX_RECURSIVE: usize = 40;
pub const QUEUE_GIVE_MUTEX_RECURSIVE: usize = 41;
pub const QUEUE_SELECT_FROM_SET: usize = 42;
pub const QUEUE_ADD_TO_SET: usize = 43;
pub const QUEUE_ADD_TO_REGISTRY: usize = 44;
pub const QUEUE_UNREGISTER_QUEUE: usize = 45;
pub const QUEUE_GET_NAME: usize = 46;
pub const TIMER_GET_TIMER_ID: usize = 47;
pub const TIMER_SET_TIMER_ID: usize = 48;
pub const TIMER_IS_TIMER_ACTIVE: usize = 49;
pub const TIMER_GET_TIMER_DAEMON_TASK_HANDLE: usize = 50;
pub const TIMER_GET_NAME: usize = 51;
pub const TIMER_SET_RELOAD_MODE: usize = 52;
pub const TIMER_GET_RELOAD_MODE: usize = 53;
pub const TIMER_GET_RELOAD_MODE_FLAG: usize = 54;
pub const TIMER_GET_PERIOD: usize = 55;
pub const TIMER_GET_EXPIRY_TIME: usize = 56;
pub const EVENT_GROUP_CLEAR_BITS: usize = 57;
pub const EVENT_GROUP_SET_BITS: usize = 58;
pub const EVENT_GROUP_SYNC: usize = 59;
pub const EVENT_GROUP_GET_NUMBER: usize = 60;
pub const EVENT_GROUP_SET_NUMBER: usize = 61;
pub const STREAM_BUFFER_SEND: usize = 62;
pub const STREAM_BUFFER_RECEIVE: usize = 63;
pub const STREAM_BUFFER_IS_FULL: usize = 64;
pub const STREAM_BUFFER_IS_EMPTY: usize = 65;
pub const STREAM_BUFFER_SPACES_AVAILABLE: usize = 66;
pub const STREAM_BUFFER_BYTES_AVAILABLE: usize = 67;
pub const STREAM_BUFFER_SET_TRIGGER_LEVEL: usize = 68;
pub const STREAM_BUFFER_NEXT_MESSAGE_LENGTH_BYTES: usize = 69;

/// Size of the dispatch table.
pub const NUM_SYSTEM_CALLS: usize = 70;
