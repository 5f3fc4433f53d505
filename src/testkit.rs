//! In-memory kernel and port for exercising the gate on the host.
//!
//! The mock kernel keeps just enough object state for the wrappers to be
//! observable, and counts every primitive it is asked to run.

use std::collections::{HashMap, VecDeque};

use core::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use spin::Mutex;

use crate::gate::Gateway;
use crate::kernel::*;
use crate::object::{EventGroupHandle, ExternalHandle, Handle, QueueHandle, StreamBufferHandle, TaskHandle, TimerHandle};
use crate::syscall::validate::{MpuRegion, Permissions};

pub const RW: Permissions = Permissions::READ.union(Permissions::WRITE);

fn idle(_: usize) {}

/// An unprivileged task at priority 2.
pub const TASK_PARAMS: TaskParameters<'static> = TaskParameters {
    entry: idle,
    name: "task",
    stack_depth: 256,
    argument: 0,
    priority: 2,
    regions: &[],
};

pub type TestGate = Gateway<MockKernel, MockPort>;

/// A running scheduler, called from privileged code.
pub fn gate() -> TestGate {
    Gateway::new(MockKernel::new(), MockPort::new())
}

/// A gate that outlives the test, for code run from port hooks.
pub fn leaked_gate() -> &'static TestGate {
    Box::leak(Box::new(gate()))
}

/// Create an unprivileged task through the gate.
pub fn spawn_task(gate: &TestGate) -> ExternalHandle {
    let task = gate.task_create_restricted(&TASK_PARAMS, None);
    assert!(!task.is_null());
    task
}

/// Make `task` the running task.
pub fn enter_task(gate: &TestGate, task: ExternalHandle) {
    gate.kernel().set_current(gate.resolve_trusted(task).ok());
}

// -------------------------------------------------------------------------
// Kernel
// -------------------------------------------------------------------------

#[derive(Debug)]
struct MockTask {
    name: String,
    priority: UBaseType,
    base_priority: UBaseType,
    state: TaskState,
    tag: usize,
    tls: [usize; 8],
}

#[derive(Debug)]
struct MockQueue {
    length: UBaseType,
    item_size: UBaseType,
    queue_type: QueueType,
    items: VecDeque<Vec<u8>>,
    holder: Option<TaskHandle>,
    members: Vec<QueueHandle>,
    name: usize,
}

#[derive(Debug)]
struct MockTimer {
    name: usize,
    period: TickType,
    auto_reload: bool,
    id: usize,
    active: bool,
}

#[derive(Debug, Default)]
struct MockEventGroup {
    bits: EventBits,
    number: UBaseType,
}

#[derive(Debug)]
struct MockStreamBuffer {
    size: usize,
    trigger_level: usize,
    data: VecDeque<u8>,
}

#[derive(Debug)]
struct KernelState {
    next_address: usize,
    current: Option<TaskHandle>,
    scheduler: SchedulerState,
    fail_creates: bool,
    info_target: usize,
    calls: HashMap<&'static str, usize>,
    tasks: HashMap<usize, MockTask>,
    queues: HashMap<usize, MockQueue>,
    timers: HashMap<usize, MockTimer>,
    event_groups: HashMap<usize, MockEventGroup>,
    stream_buffers: HashMap<usize, MockStreamBuffer>,
}

impl KernelState {
    fn allocate<T>(&mut self) -> Option<Handle<T>> {
        if self.fail_creates {
            return None;
        }
        let address = self.next_address;
        self.next_address += 0x100;
        Handle::new(address)
    }

    fn task(&mut self, task: Option<TaskHandle>) -> Option<&mut MockTask> {
        let task = task.or(self.current)?;
        self.tasks.get_mut(&task.raw())
    }

    fn queue(&mut self, queue: QueueHandle) -> &mut MockQueue {
        self.queues
            .get_mut(&queue.raw())
            .unwrap_or_else(|| panic!("no such queue {:?}", queue))
    }

    fn timer(&mut self, timer: TimerHandle) -> &mut MockTimer {
        self.timers
            .get_mut(&timer.raw())
            .unwrap_or_else(|| panic!("no such timer {:?}", timer))
    }

    fn event_group(&mut self, group: EventGroupHandle) -> &mut MockEventGroup {
        self.event_groups
            .get_mut(&group.raw())
            .unwrap_or_else(|| panic!("no such event group {:?}", group))
    }

    fn stream_buffer(&mut self, buffer: StreamBufferHandle) -> &mut MockStreamBuffer {
        self.stream_buffers
            .get_mut(&buffer.raw())
            .unwrap_or_else(|| panic!("no such stream buffer {:?}", buffer))
    }

    fn new_queue(&mut self, length: UBaseType, item_size: UBaseType, queue_type: QueueType) -> Option<QueueHandle> {
        let handle = self.allocate()?;
        let queue = MockQueue {
            length,
            item_size,
            queue_type,
            items: VecDeque::new(),
            holder: None,
            members: Vec::new(),
            name: 0,
        };
        self.queues.insert(handle.raw(), queue);
        Some(handle)
    }

    fn new_task(&mut self, params: &TaskParameters<'_>) -> Option<TaskHandle> {
        let handle = self.allocate()?;
        let priority = params.priority & !PRIVILEGE_BIT;
        let task = MockTask {
            name: String::from(params.name),
            priority,
            base_priority: priority,
            state: TaskState::Ready,
            tag: 0,
            tls: [0; 8],
        };
        self.tasks.insert(handle.raw(), task);
        Some(handle)
    }
}

/// Kernel primitives backed by host collections.
pub struct MockKernel {
    state: Mutex<KernelState>,
}

impl MockKernel {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(KernelState {
                next_address: 0x2000_0000,
                current: None,
                scheduler: SchedulerState::Running,
                fail_creates: false,
                info_target: 0,
                calls: HashMap::new(),
                tasks: HashMap::new(),
                queues: HashMap::new(),
                timers: HashMap::new(),
                event_groups: HashMap::new(),
                stream_buffers: HashMap::new(),
            }),
        }
    }

    /// How many times primitive `name` ran.
    pub fn calls(&self, name: &str) -> usize {
        self.state.lock().calls.get(name).copied().unwrap_or(0)
    }

    pub fn set_current(&self, task: Option<TaskHandle>) {
        self.state.lock().current = task;
    }

    pub fn set_scheduler_state(&self, scheduler: SchedulerState) {
        self.state.lock().scheduler = scheduler;
    }

    /// Make every create primitive fail.
    pub fn fail_creates(&self, fail: bool) {
        self.state.lock().fail_creates = fail;
    }

    /// Address of the structure the last `task_info` filled.
    pub fn last_info_target(&self) -> usize {
        self.state.lock().info_target
    }

    fn run<R>(&self, name: &'static str, f: impl FnOnce(&mut KernelState) -> R) -> R {
        let mut state = self.state.lock();
        *state.calls.entry(name).or_insert(0) += 1;
        f(&mut state)
    }
}

fn wake(flag: Option<&mut bool>) {
    if let Some(flag) = flag {
        *flag = false;
    }
}

impl Kernel for MockKernel {
    fn current_task(&self) -> Option<TaskHandle> {
        self.state.lock().current
    }

    fn scheduler_state(&self) -> SchedulerState {
        self.state.lock().scheduler
    }

    fn suspend_all(&self) {
        self.run("suspend_all", |_| ());
    }

    fn resume_all(&self) -> bool {
        self.run("resume_all", |_| false)
    }

    fn tick_count(&self) -> TickType {
        self.run("tick_count", |_| 100)
    }

    fn number_of_tasks(&self) -> UBaseType {
        self.run("number_of_tasks", |state| state.tasks.len() as UBaseType)
    }

    fn task_create(&self, params: &TaskParameters<'_>, _: Option<StaticStorage>) -> Option<TaskHandle> {
        self.run("task_create", |state| state.new_task(params))
    }

    fn task_create_restricted(&self, params: &TaskParameters<'_>, _: Option<StaticStorage>) -> Option<TaskHandle> {
        self.run("task_create_restricted", |state| state.new_task(params))
    }

    fn task_delete(&self, task: TaskHandle) {
        self.run("task_delete", |state| {
            state.tasks.remove(&task.raw());
            if state.current == Some(task) {
                state.current = None;
            }
        });
    }

    fn task_delay(&self, _: TickType) {
        self.run("task_delay", |_| ());
    }

    fn task_delay_until(&self, previous_wake_time: &mut TickType, increment: TickType) -> bool {
        self.run("task_delay_until", |_| {
            *previous_wake_time = previous_wake_time.wrapping_add(increment);
            true
        })
    }

    fn task_abort_delay(&self, _: TaskHandle) -> bool {
        self.run("task_abort_delay", |_| false)
    }

    fn task_priority_get(&self, task: Option<TaskHandle>) -> UBaseType {
        self.run("task_priority_get", |state| state.task(task).map_or(0, |task| task.priority))
    }

    fn task_priority_get_from_isr(&self, task: Option<TaskHandle>) -> UBaseType {
        self.run("task_priority_get_from_isr", |state| {
            state.task(task).map_or(0, |task| task.priority)
        })
    }

    fn task_base_priority_get(&self, task: Option<TaskHandle>) -> UBaseType {
        self.run("task_base_priority_get", |state| {
            state.task(task).map_or(0, |task| task.base_priority)
        })
    }

    fn task_base_priority_get_from_isr(&self, task: Option<TaskHandle>) -> UBaseType {
        self.run("task_base_priority_get_from_isr", |state| {
            state.task(task).map_or(0, |task| task.base_priority)
        })
    }

    fn task_priority_set(&self, task: Option<TaskHandle>, priority: UBaseType) {
        self.run("task_priority_set", |state| {
            if let Some(task) = state.task(task) {
                task.priority = priority;
            }
        });
    }

    fn task_state(&self, task: TaskHandle) -> TaskState {
        self.run("task_state", |state| {
            state.task(Some(task)).map_or(TaskState::Deleted, |task| task.state)
        })
    }

    fn task_info(&self, task: Option<TaskHandle>, status: &mut TaskStatus, _: bool, _: TaskState) {
        self.run("task_info", |state| {
            state.info_target = status as *mut TaskStatus as usize;
            let Some(handle) = task.or(state.current) else {
                return;
            };
            if let Some(mock) = state.task(Some(handle)) {
                *status = TaskStatus {
                    handle: handle.raw(),
                    current_state: mock.state as u32,
                    current_priority: mock.priority,
                    base_priority: mock.base_priority,
                    ..TaskStatus::default()
                };
            }
        });
    }

    fn task_system_state(
        &self,
        capacity: UBaseType,
        visit: &mut dyn FnMut(TaskStatus),
        total_run_time: Option<&mut RunTimeCounter>,
    ) -> UBaseType {
        let reports = self.run("task_system_state", |state| {
            let mut addresses: Vec<usize> = state.tasks.keys().copied().collect();
            addresses.sort_unstable();
            if addresses.len() > capacity as usize {
                return Vec::new();
            }
            addresses
                .iter()
                .map(|address| {
                    let task = &state.tasks[address];
                    TaskStatus {
                        handle: *address,
                        current_state: task.state as u32,
                        current_priority: task.priority,
                        base_priority: task.base_priority,
                        ..TaskStatus::default()
                    }
                })
                .collect::<Vec<_>>()
        });
        if reports.is_empty() {
            return 0;
        }
        if let Some(total) = total_run_time {
            *total = 1000;
        }
        for report in &reports {
            visit(*report);
        }
        reports.len() as UBaseType
    }

    fn task_suspend(&self, task: Option<TaskHandle>) {
        self.run("task_suspend", |state| {
            if let Some(task) = state.task(task) {
                task.state = TaskState::Suspended;
            }
        });
    }

    fn task_resume(&self, task: TaskHandle) {
        self.run("task_resume", |state| {
            if let Some(task) = state.task(Some(task)) {
                task.state = TaskState::Ready;
            }
        });
    }

    fn task_resume_from_isr(&self, task: TaskHandle) -> bool {
        self.run("task_resume_from_isr", |state| {
            state
                .task(Some(task))
                .map(|task| task.state = TaskState::Ready)
                .is_some()
        })
    }

    fn task_by_name(&self, name: &str) -> Option<TaskHandle> {
        self.run("task_by_name", |state| {
            state
                .tasks
                .iter()
                .filter(|(_, task)| task.name == name)
                .map(|(address, _)| *address)
                .min()
                .and_then(Handle::new)
        })
    }

    fn task_name(&self, task: Option<TaskHandle>) -> usize {
        self.run("task_name", |state| state.task(task).map_or(0, |task| task.name.as_ptr() as usize))
    }

    fn idle_task(&self) -> Option<TaskHandle> {
        self.run("idle_task", |_| TaskHandle::new(0x1000))
    }

    fn task_allocate_regions(&self, _: Option<TaskHandle>, _: &[MpuRegion]) {
        self.run("task_allocate_regions", |_| ());
    }

    fn task_stack_high_water_mark(&self, _: Option<TaskHandle>) -> UBaseType {
        self.run("task_stack_high_water_mark", |_| 64)
    }

    fn task_stack_high_water_mark2(&self, _: Option<TaskHandle>) -> StackDepth {
        self.run("task_stack_high_water_mark2", |_| 64)
    }

    fn task_set_application_tag(&self, task: Option<TaskHandle>, tag: usize) {
        self.run("task_set_application_tag", |state| {
            if let Some(task) = state.task(task) {
                task.tag = tag;
            }
        });
    }

    fn task_application_tag(&self, task: Option<TaskHandle>) -> usize {
        self.run("task_application_tag", |state| state.task(task).map_or(0, |task| task.tag))
    }

    fn task_application_tag_from_isr(&self, task: Option<TaskHandle>) -> usize {
        self.run("task_application_tag_from_isr", |state| state.task(task).map_or(0, |task| task.tag))
    }

    fn task_call_application_hook(&self, task: Option<TaskHandle>, parameter: usize) -> BaseType {
        self.run("task_call_application_hook", |state| {
            state.task(task).map_or(0, |task| (task.tag + parameter) as BaseType)
        })
    }

    fn task_set_thread_local_pointer(&self, task: Option<TaskHandle>, index: BaseType, value: usize) {
        self.run("task_set_thread_local_pointer", |state| {
            if let Some(task) = state.task(task) {
                task.tls[index as usize] = value;
            }
        });
    }

    fn task_thread_local_pointer(&self, task: Option<TaskHandle>, index: BaseType) -> usize {
        self.run("task_thread_local_pointer", |state| {
            state.task(task).map_or(0, |task| task.tls[index as usize])
        })
    }

    fn task_set_time_out_state(&self, timeout: &mut TimeOut) {
        self.run("task_set_time_out_state", |_| {
            *timeout = TimeOut {
                overflow_count: 0,
                time_on_entering: 100,
            };
        });
    }

    fn task_check_for_time_out(&self, _: &mut TimeOut, ticks_to_wait: &mut TickType) -> bool {
        self.run("task_check_for_time_out", |_| *ticks_to_wait == 0)
    }

    fn task_run_time_counter(&self, _: Option<TaskHandle>) -> RunTimeCounter {
        self.run("task_run_time_counter", |_| 10)
    }

    fn task_run_time_percent(&self, _: Option<TaskHandle>) -> RunTimeCounter {
        self.run("task_run_time_percent", |_| 1)
    }

    fn idle_run_time_counter(&self) -> RunTimeCounter {
        self.run("idle_run_time_counter", |_| 900)
    }

    fn idle_run_time_percent(&self) -> RunTimeCounter {
        self.run("idle_run_time_percent", |_| 90)
    }

    fn task_notify(
        &self,
        _: TaskHandle,
        _: UBaseType,
        _: u32,
        _: NotifyAction,
        previous_value: Option<&mut u32>,
    ) -> bool {
        self.run("task_notify", |_| {
            if let Some(previous) = previous_value {
                *previous = 0;
            }
            true
        })
    }

    fn task_notify_from_isr(
        &self,
        _: TaskHandle,
        _: UBaseType,
        _: u32,
        _: NotifyAction,
        _: Option<&mut u32>,
        higher_priority_task_woken: Option<&mut bool>,
    ) -> bool {
        self.run("task_notify_from_isr", |_| wake(higher_priority_task_woken));
        true
    }

    fn task_notify_give_from_isr(&self, _: TaskHandle, _: UBaseType, higher_priority_task_woken: Option<&mut bool>) {
        self.run("task_notify_give_from_isr", |_| wake(higher_priority_task_woken));
    }

    fn task_notify_wait(&self, _: UBaseType, _: u32, _: u32, value: Option<&mut u32>, _: TickType) -> bool {
        self.run("task_notify_wait", |_| {
            if let Some(value) = value {
                *value = 0;
            }
            false
        })
    }

    fn task_notify_take(&self, _: UBaseType, _: bool, _: TickType) -> u32 {
        self.run("task_notify_take", |_| 0)
    }

    fn task_notify_state_clear(&self, _: Option<TaskHandle>, _: UBaseType) -> bool {
        self.run("task_notify_state_clear", |_| false)
    }

    fn task_notify_value_clear(&self, _: Option<TaskHandle>, _: UBaseType, _: u32) -> u32 {
        self.run("task_notify_value_clear", |_| 0)
    }

    fn queue_create(
        &self,
        length: UBaseType,
        item_size: UBaseType,
        queue_type: QueueType,
        _: Option<StaticStorage>,
    ) -> Option<QueueHandle> {
        self.run("queue_create", |state| state.new_queue(length, item_size, queue_type))
    }

    fn queue_create_mutex(&self, queue_type: QueueType, _: Option<StaticStorage>) -> Option<QueueHandle> {
        self.run("queue_create_mutex", |state| {
            let handle = state.new_queue(1, 0, queue_type)?;
            state.queue(handle).items.push_back(Vec::new());
            Some(handle)
        })
    }

    fn queue_create_counting_semaphore(
        &self,
        max_count: UBaseType,
        initial_count: UBaseType,
        _: Option<StaticStorage>,
    ) -> Option<QueueHandle> {
        self.run("queue_create_counting_semaphore", |state| {
            let handle = state.new_queue(max_count, 0, QueueType::CountingSemaphore)?;
            for _ in 0..initial_count {
                state.queue(handle).items.push_back(Vec::new());
            }
            Some(handle)
        })
    }

    fn queue_create_set(&self, length: UBaseType) -> Option<QueueHandle> {
        self.run("queue_create_set", |state| {
            state.new_queue(length, core::mem::size_of::<usize>() as UBaseType, QueueType::Base)
        })
    }

    fn queue_delete(&self, queue: QueueHandle) {
        self.run("queue_delete", |state| {
            state.queues.remove(&queue.raw());
        });
    }

    fn queue_reset(&self, queue: QueueHandle, _: bool) -> bool {
        self.run("queue_reset", |state| {
            state.queue(queue).items.clear();
            true
        })
    }

    fn queue_length(&self, queue: QueueHandle) -> UBaseType {
        self.run("queue_length", |state| state.queue(queue).length)
    }

    fn queue_item_size(&self, queue: QueueHandle) -> UBaseType {
        self.run("queue_item_size", |state| state.queue(queue).item_size)
    }

    fn queue_send(&self, queue: QueueHandle, item: &[u8], _: TickType, position: CopyPosition) -> bool {
        self.run("queue_send", |state| push_item(state.queue(queue), item, position))
    }

    fn queue_send_from_isr(
        &self,
        queue: QueueHandle,
        item: &[u8],
        higher_priority_task_woken: Option<&mut bool>,
        position: CopyPosition,
    ) -> bool {
        wake(higher_priority_task_woken);
        self.run("queue_send_from_isr", |state| push_item(state.queue(queue), item, position))
    }

    fn queue_give_from_isr(&self, queue: QueueHandle, higher_priority_task_woken: Option<&mut bool>) -> bool {
        wake(higher_priority_task_woken);
        self.run("queue_give_from_isr", |state| {
            push_item(state.queue(queue), &[], CopyPosition::Back)
        })
    }

    fn queue_receive(&self, queue: QueueHandle, buffer: &mut [u8], _: TickType) -> bool {
        self.run("queue_receive", |state| pop_item(state.queue(queue), buffer, true))
    }

    fn queue_receive_from_isr(
        &self,
        queue: QueueHandle,
        buffer: &mut [u8],
        higher_priority_task_woken: Option<&mut bool>,
    ) -> bool {
        wake(higher_priority_task_woken);
        self.run("queue_receive_from_isr", |state| pop_item(state.queue(queue), buffer, true))
    }

    fn queue_peek(&self, queue: QueueHandle, buffer: &mut [u8], _: TickType) -> bool {
        self.run("queue_peek", |state| pop_item(state.queue(queue), buffer, false))
    }

    fn queue_peek_from_isr(&self, queue: QueueHandle, buffer: &mut [u8]) -> bool {
        self.run("queue_peek_from_isr", |state| pop_item(state.queue(queue), buffer, false))
    }

    fn queue_messages_waiting(&self, queue: QueueHandle) -> UBaseType {
        self.run("queue_messages_waiting", |state| state.queue(queue).items.len() as UBaseType)
    }

    fn queue_messages_waiting_from_isr(&self, queue: QueueHandle) -> UBaseType {
        self.run("queue_messages_waiting_from_isr", |state| {
            state.queue(queue).items.len() as UBaseType
        })
    }

    fn queue_spaces_available(&self, queue: QueueHandle) -> UBaseType {
        self.run("queue_spaces_available", |state| {
            let queue = state.queue(queue);
            queue.length - queue.items.len() as UBaseType
        })
    }

    fn queue_is_empty_from_isr(&self, queue: QueueHandle) -> bool {
        self.run("queue_is_empty_from_isr", |state| state.queue(queue).items.is_empty())
    }

    fn queue_is_full_from_isr(&self, queue: QueueHandle) -> bool {
        self.run("queue_is_full_from_isr", |state| {
            let queue = state.queue(queue);
            queue.items.len() as UBaseType == queue.length
        })
    }

    fn queue_semaphore_take(&self, queue: QueueHandle, _: TickType) -> bool {
        self.run("queue_semaphore_take", |state| {
            let current = state.current;
            let queue = state.queue(queue);
            if queue.items.pop_front().is_none() {
                return false;
            }
            if matches!(queue.queue_type, QueueType::Mutex | QueueType::RecursiveMutex) {
                queue.holder = current;
            }
            true
        })
    }

    fn queue_mutex_holder(&self, queue: QueueHandle) -> Option<TaskHandle> {
        self.run("queue_mutex_holder", |state| state.queue(queue).holder)
    }

    fn queue_mutex_holder_from_isr(&self, queue: QueueHandle) -> Option<TaskHandle> {
        self.run("queue_mutex_holder_from_isr", |state| state.queue(queue).holder)
    }

    fn queue_take_mutex_recursive(&self, queue: QueueHandle, _: TickType) -> bool {
        self.run("queue_take_mutex_recursive", |state| {
            let current = state.current;
            let queue = state.queue(queue);
            if queue.holder.is_some() && queue.holder == current {
                return true;
            }
            if queue.items.pop_front().is_none() {
                return false;
            }
            queue.holder = current;
            true
        })
    }

    fn queue_give_mutex_recursive(&self, queue: QueueHandle) -> bool {
        self.run("queue_give_mutex_recursive", |state| {
            let current = state.current;
            let queue = state.queue(queue);
            if queue.holder.is_none() || queue.holder != current {
                return false;
            }
            queue.holder = None;
            queue.items.push_back(Vec::new());
            true
        })
    }

    fn queue_add_to_set(&self, member: QueueHandle, set: QueueHandle) -> bool {
        self.run("queue_add_to_set", |state| {
            state.queue(set).members.push(member);
            true
        })
    }

    fn queue_remove_from_set(&self, member: QueueHandle, set: QueueHandle) -> bool {
        self.run("queue_remove_from_set", |state| {
            let members = &mut state.queue(set).members;
            let before = members.len();
            members.retain(|queue| *queue != member);
            members.len() != before
        })
    }

    fn queue_select_from_set(&self, set: QueueHandle, _: TickType) -> Option<QueueHandle> {
        self.run("queue_select_from_set", |state| select_ready(state, set))
    }

    fn queue_select_from_set_from_isr(&self, set: QueueHandle) -> Option<QueueHandle> {
        self.run("queue_select_from_set_from_isr", |state| select_ready(state, set))
    }

    fn queue_add_to_registry(&self, queue: QueueHandle, name: usize) {
        self.run("queue_add_to_registry", |state| state.queue(queue).name = name);
    }

    fn queue_unregister(&self, queue: QueueHandle) {
        self.run("queue_unregister", |state| state.queue(queue).name = 0);
    }

    fn queue_name(&self, queue: QueueHandle) -> usize {
        self.run("queue_name", |state| state.queue(queue).name)
    }

    fn timer_create(
        &self,
        name: usize,
        period: TickType,
        auto_reload: bool,
        timer_id: usize,
        _: Option<StaticStorage>,
    ) -> Option<TimerHandle> {
        self.run("timer_create", |state| {
            let handle = state.allocate()?;
            let timer = MockTimer {
                name,
                period,
                auto_reload,
                id: timer_id,
                active: false,
            };
            state.timers.insert(handle.raw(), timer);
            Some(handle)
        })
    }

    fn timer_id(&self, timer: TimerHandle) -> usize {
        self.run("timer_id", |state| state.timer(timer).id)
    }

    fn timer_set_id(&self, timer: TimerHandle, id: usize) {
        self.run("timer_set_id", |state| state.timer(timer).id = id);
    }

    fn timer_is_active(&self, timer: TimerHandle) -> bool {
        self.run("timer_is_active", |state| state.timer(timer).active)
    }

    fn timer_daemon_task(&self) -> Option<TaskHandle> {
        self.run("timer_daemon_task", |_| TaskHandle::new(0x1100))
    }

    fn timer_command(
        &self,
        timer: TimerHandle,
        command: BaseType,
        optional_value: TickType,
        higher_priority_task_woken: Option<&mut BaseType>,
        _: TickType,
    ) -> bool {
        if let Some(woken) = higher_priority_task_woken {
            *woken = 0;
        }
        self.run("timer_command", |state| apply_timer_command(state.timer(timer), command, optional_value))
    }

    fn timer_command_from_isr(
        &self,
        timer: TimerHandle,
        command: BaseType,
        optional_value: TickType,
        higher_priority_task_woken: Option<&mut bool>,
    ) -> bool {
        wake(higher_priority_task_woken);
        self.run("timer_command_from_isr", |state| {
            apply_timer_command(state.timer(timer), command, optional_value)
        })
    }

    fn timer_name(&self, timer: TimerHandle) -> usize {
        self.run("timer_name", |state| state.timer(timer).name)
    }

    fn timer_set_reload_mode(&self, timer: TimerHandle, auto_reload: bool) {
        self.run("timer_set_reload_mode", |state| state.timer(timer).auto_reload = auto_reload);
    }

    fn timer_reload_mode(&self, timer: TimerHandle) -> bool {
        self.run("timer_reload_mode", |state| state.timer(timer).auto_reload)
    }

    fn timer_period(&self, timer: TimerHandle) -> TickType {
        self.run("timer_period", |state| state.timer(timer).period)
    }

    fn timer_expiry_time(&self, timer: TimerHandle) -> TickType {
        self.run("timer_expiry_time", |state| 100 + state.timer(timer).period)
    }

    fn event_group_create(&self, _: Option<StaticStorage>) -> Option<EventGroupHandle> {
        self.run("event_group_create", |state| {
            let handle = state.allocate()?;
            state.event_groups.insert(handle.raw(), MockEventGroup::default());
            Some(handle)
        })
    }

    fn event_group_delete(&self, group: EventGroupHandle) {
        self.run("event_group_delete", |state| {
            state.event_groups.remove(&group.raw());
        });
    }

    fn event_group_wait_bits(
        &self,
        group: EventGroupHandle,
        bits_to_wait_for: EventBits,
        clear_on_exit: bool,
        _: bool,
        _: TickType,
    ) -> EventBits {
        self.run("event_group_wait_bits", |state| {
            let group = state.event_group(group);
            let bits = group.bits;
            if clear_on_exit {
                group.bits &= !bits_to_wait_for;
            }
            bits
        })
    }

    fn event_group_clear_bits(&self, group: EventGroupHandle, bits: EventBits) -> EventBits {
        self.run("event_group_clear_bits", |state| {
            let group = state.event_group(group);
            let before = group.bits;
            group.bits &= !bits;
            before
        })
    }

    fn event_group_clear_bits_from_isr(&self, group: EventGroupHandle, bits: EventBits) -> bool {
        self.run("event_group_clear_bits_from_isr", |state| {
            state.event_group(group).bits &= !bits;
            true
        })
    }

    fn event_group_set_bits(&self, group: EventGroupHandle, bits: EventBits) -> EventBits {
        self.run("event_group_set_bits", |state| {
            let group = state.event_group(group);
            group.bits |= bits;
            group.bits
        })
    }

    fn event_group_set_bits_from_isr(
        &self,
        group: EventGroupHandle,
        bits: EventBits,
        higher_priority_task_woken: Option<&mut bool>,
    ) -> bool {
        wake(higher_priority_task_woken);
        self.run("event_group_set_bits_from_isr", |state| {
            state.event_group(group).bits |= bits;
            true
        })
    }

    fn event_group_bits_from_isr(&self, group: EventGroupHandle) -> EventBits {
        self.run("event_group_bits_from_isr", |state| state.event_group(group).bits)
    }

    fn event_group_sync(
        &self,
        group: EventGroupHandle,
        bits_to_set: EventBits,
        _: EventBits,
        _: TickType,
    ) -> EventBits {
        self.run("event_group_sync", |state| {
            let group = state.event_group(group);
            group.bits |= bits_to_set;
            group.bits
        })
    }

    fn event_group_number(&self, group: EventGroupHandle) -> UBaseType {
        self.run("event_group_number", |state| state.event_group(group).number)
    }

    fn event_group_set_number(&self, group: EventGroupHandle, number: UBaseType) {
        self.run("event_group_set_number", |state| state.event_group(group).number = number);
    }

    fn stream_buffer_create(
        &self,
        size: usize,
        trigger_level: usize,
        _: StreamBufferKind,
        _: Option<StaticStorage>,
    ) -> Option<StreamBufferHandle> {
        self.run("stream_buffer_create", |state| {
            let handle = state.allocate()?;
            let buffer = MockStreamBuffer {
                size,
                trigger_level,
                data: VecDeque::new(),
            };
            state.stream_buffers.insert(handle.raw(), buffer);
            Some(handle)
        })
    }

    fn stream_buffer_delete(&self, buffer: StreamBufferHandle) {
        self.run("stream_buffer_delete", |state| {
            state.stream_buffers.remove(&buffer.raw());
        });
    }

    fn stream_buffer_reset(&self, buffer: StreamBufferHandle) -> bool {
        self.run("stream_buffer_reset", |state| {
            state.stream_buffer(buffer).data.clear();
            true
        })
    }

    fn stream_buffer_reset_from_isr(&self, buffer: StreamBufferHandle) -> bool {
        self.run("stream_buffer_reset_from_isr", |state| {
            state.stream_buffer(buffer).data.clear();
            true
        })
    }

    fn stream_buffer_send(&self, buffer: StreamBufferHandle, data: &[u8], _: TickType) -> usize {
        self.run("stream_buffer_send", |state| write_stream(state.stream_buffer(buffer), data))
    }

    fn stream_buffer_send_from_isr(
        &self,
        buffer: StreamBufferHandle,
        data: &[u8],
        higher_priority_task_woken: Option<&mut bool>,
    ) -> usize {
        wake(higher_priority_task_woken);
        self.run("stream_buffer_send_from_isr", |state| {
            write_stream(state.stream_buffer(buffer), data)
        })
    }

    fn stream_buffer_receive(&self, buffer: StreamBufferHandle, data: &mut [u8], _: TickType) -> usize {
        self.run("stream_buffer_receive", |state| read_stream(state.stream_buffer(buffer), data))
    }

    fn stream_buffer_receive_from_isr(
        &self,
        buffer: StreamBufferHandle,
        data: &mut [u8],
        higher_priority_task_woken: Option<&mut bool>,
    ) -> usize {
        wake(higher_priority_task_woken);
        self.run("stream_buffer_receive_from_isr", |state| {
            read_stream(state.stream_buffer(buffer), data)
        })
    }

    fn stream_buffer_send_completed_from_isr(
        &self,
        _: StreamBufferHandle,
        higher_priority_task_woken: Option<&mut bool>,
    ) -> bool {
        wake(higher_priority_task_woken);
        self.run("stream_buffer_send_completed_from_isr", |_| false)
    }

    fn stream_buffer_receive_completed_from_isr(
        &self,
        _: StreamBufferHandle,
        higher_priority_task_woken: Option<&mut bool>,
    ) -> bool {
        wake(higher_priority_task_woken);
        self.run("stream_buffer_receive_completed_from_isr", |_| false)
    }

    fn stream_buffer_is_full(&self, buffer: StreamBufferHandle) -> bool {
        self.run("stream_buffer_is_full", |state| {
            let buffer = state.stream_buffer(buffer);
            buffer.data.len() == buffer.size
        })
    }

    fn stream_buffer_is_empty(&self, buffer: StreamBufferHandle) -> bool {
        self.run("stream_buffer_is_empty", |state| state.stream_buffer(buffer).data.is_empty())
    }

    fn stream_buffer_spaces_available(&self, buffer: StreamBufferHandle) -> usize {
        self.run("stream_buffer_spaces_available", |state| {
            let buffer = state.stream_buffer(buffer);
            buffer.size - buffer.data.len()
        })
    }

    fn stream_buffer_bytes_available(&self, buffer: StreamBufferHandle) -> usize {
        self.run("stream_buffer_bytes_available", |state| state.stream_buffer(buffer).data.len())
    }

    fn stream_buffer_set_trigger_level(&self, buffer: StreamBufferHandle, trigger_level: usize) -> bool {
        self.run("stream_buffer_set_trigger_level", |state| {
            let buffer = state.stream_buffer(buffer);
            if trigger_level > buffer.size {
                return false;
            }
            buffer.trigger_level = trigger_level;
            true
        })
    }

    fn stream_buffer_next_message_length(&self, buffer: StreamBufferHandle) -> usize {
        self.run("stream_buffer_next_message_length", |state| state.stream_buffer(buffer).data.len())
    }
}

fn push_item(queue: &mut MockQueue, item: &[u8], position: CopyPosition) -> bool {
    if position == CopyPosition::Overwrite {
        queue.items.clear();
    } else if queue.items.len() as UBaseType >= queue.length {
        return false;
    }
    match position {
        CopyPosition::Front => queue.items.push_front(item.to_vec()),
        CopyPosition::Back | CopyPosition::Overwrite => queue.items.push_back(item.to_vec()),
    }
    true
}

fn pop_item(queue: &mut MockQueue, buffer: &mut [u8], remove: bool) -> bool {
    let item = if remove {
        queue.items.pop_front()
    } else {
        queue.items.front().cloned()
    };
    match item {
        Some(item) => {
            buffer[..item.len()].copy_from_slice(&item);
            true
        }
        None => false,
    }
}

fn select_ready(state: &mut KernelState, set: QueueHandle) -> Option<QueueHandle> {
    let members = state.queue(set).members.clone();
    members
        .into_iter()
        .find(|member| state.queues.get(&member.raw()).is_some_and(|queue| !queue.items.is_empty()))
}

fn apply_timer_command(timer: &mut MockTimer, command: BaseType, optional_value: TickType) -> bool {
    use crate::kernel::timer_command::*;
    match command {
        START | START_DONT_TRACE | RESET | START_FROM_ISR | RESET_FROM_ISR => timer.active = true,
        STOP | STOP_FROM_ISR => timer.active = false,
        CHANGE_PERIOD | CHANGE_PERIOD_FROM_ISR => {
            timer.period = optional_value;
            timer.active = true;
        }
        DELETE => timer.active = false,
        _ => return false,
    }
    true
}

fn write_stream(buffer: &mut MockStreamBuffer, data: &[u8]) -> usize {
    let count = data.len().min(buffer.size - buffer.data.len());
    buffer.data.extend(&data[..count]);
    count
}

fn read_stream(buffer: &mut MockStreamBuffer, data: &mut [u8]) -> usize {
    let count = data.len().min(buffer.data.len());
    for (slot, byte) in data.iter_mut().zip(buffer.data.drain(..count)) {
        *slot = byte;
    }
    count
}

// -------------------------------------------------------------------------
// Port
// -------------------------------------------------------------------------

/// Code run at the start of a later critical section.
type Interleaved = Box<dyn FnOnce() + Send>;

/// Port with switchable privilege and a list of MPU regions.
pub struct MockPort {
    privileged: AtomicBool,
    scheduler_running: AtomicBool,
    regions: Mutex<Vec<MpuRegion>>,
    region_queries: AtomicUsize,
    interleaved: Mutex<Option<(usize, Interleaved)>>,
}

impl MockPort {
    pub fn new() -> Self {
        Self {
            privileged: AtomicBool::new(true),
            scheduler_running: AtomicBool::new(true),
            regions: Mutex::new(Vec::new()),
            region_queries: AtomicUsize::new(0),
            interleaved: Mutex::new(None),
        }
    }

    pub fn set_privileged(&self, privileged: bool) {
        self.privileged.store(privileged, Ordering::SeqCst);
    }

    pub fn set_scheduler_running(&self, running: bool) {
        self.scheduler_running.store(running, Ordering::SeqCst);
    }

    pub fn add_region(&self, start: usize, len: usize, permissions: Permissions) {
        let region = MpuRegion::new(start, len, permissions).expect("valid test region");
        self.regions.lock().push(region);
    }

    /// Run `f` on entry to a critical section, after `skip` others.
    ///
    /// Stands in for another context preempting the caller between two
    /// critical sections. Critical sections entered by `f` itself do not
    /// count.
    pub fn interleave(&self, skip: usize, f: impl FnOnce() + Send + 'static) {
        *self.interleaved.lock() = Some((skip, Box::new(f)));
    }

    /// How many region lookups the gate made.
    pub fn region_queries(&self) -> usize {
        self.region_queries.load(Ordering::SeqCst)
    }
}

impl Port for MockPort {
    fn is_privileged(&self) -> bool {
        self.privileged.load(Ordering::SeqCst)
    }

    fn scheduler_running(&self) -> bool {
        self.scheduler_running.load(Ordering::SeqCst)
    }

    fn region(&self, index: usize) -> Option<MpuRegion> {
        self.region_queries.fetch_add(1, Ordering::SeqCst);
        self.regions.lock().get(index).copied()
    }

    fn critical_section<R>(&self, f: impl FnOnce() -> R) -> R {
        let due = {
            let mut interleaved = self.interleaved.lock();
            match interleaved.as_mut() {
                Some((0, _)) => interleaved.take().map(|(_, run)| run),
                Some((skip, _)) => {
                    *skip -= 1;
                    None
                }
                None => None,
            }
        };
        if let Some(run) = due {
            run();
        }
        f()
    }
}
