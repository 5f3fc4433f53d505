//! Queue, semaphore, mutex and queue set wrappers.

use crate::error::{GateError, GateResult};
use crate::kernel::*;
use crate::object::{ExternalHandle, KernelObject, QueueHandle};
use crate::syscall::validate::UserPtr;

use super::{ensure, Gateway, OrFail};

impl<K: Kernel, P: Port> Gateway<K, P> {
    // ---------------------------------------------------------------------
    // Creation and deletion (privileged callers)
    // ---------------------------------------------------------------------

    fn install_queue(&self, create: impl FnOnce() -> Option<QueueHandle>) -> GateResult<ExternalHandle> {
        self.install(|| create().map(KernelObject::Queue))
            .map(|index| index.to_external())
    }

    pub fn queue_generic_create(&self, length: UBaseType, item_size: UBaseType, queue_type: QueueType) -> ExternalHandle {
        self.install_queue(|| self.kernel.queue_create(length, item_size, queue_type, None))
            .or_fail("queue_generic_create", ExternalHandle::NULL)
    }

    pub fn queue_generic_create_static(
        &self,
        length: UBaseType,
        item_size: UBaseType,
        storage: StaticStorage,
        queue_type: QueueType,
    ) -> ExternalHandle {
        self.install_queue(|| self.kernel.queue_create(length, item_size, queue_type, Some(storage)))
            .or_fail("queue_generic_create_static", ExternalHandle::NULL)
    }

    pub fn queue_create_mutex(&self, queue_type: QueueType) -> ExternalHandle {
        self.install_queue(|| self.kernel.queue_create_mutex(queue_type, None))
            .or_fail("queue_create_mutex", ExternalHandle::NULL)
    }

    pub fn queue_create_mutex_static(&self, queue_type: QueueType, storage: StaticStorage) -> ExternalHandle {
        self.install_queue(|| self.kernel.queue_create_mutex(queue_type, Some(storage)))
            .or_fail("queue_create_mutex_static", ExternalHandle::NULL)
    }

    pub fn queue_create_counting_semaphore(&self, max_count: UBaseType, initial_count: UBaseType) -> ExternalHandle {
        self.install_queue(|| {
            self.kernel
                .queue_create_counting_semaphore(max_count, initial_count, None)
        })
        .or_fail("queue_create_counting_semaphore", ExternalHandle::NULL)
    }

    pub fn queue_create_counting_semaphore_static(
        &self,
        max_count: UBaseType,
        initial_count: UBaseType,
        storage: StaticStorage,
    ) -> ExternalHandle {
        self.install_queue(|| {
            self.kernel
                .queue_create_counting_semaphore(max_count, initial_count, Some(storage))
        })
        .or_fail("queue_create_counting_semaphore_static", ExternalHandle::NULL)
    }

    #[cfg(feature = "queue-sets")]
    pub fn queue_create_set(&self, length: UBaseType) -> ExternalHandle {
        self.install_queue(|| self.kernel.queue_create_set(length))
            .or_fail("queue_create_set", ExternalHandle::NULL)
    }

    /// Delete a queue and free its slot.
    pub fn queue_delete(&self, queue: ExternalHandle) {
        match self.resolve_entry::<QueueHandle>(queue, true) {
            Ok((index, handle)) => {
                self.kernel.queue_delete(handle);
                self.release_object(index, handle);
            }
            Err(error) => log::debug!("queue_delete: rejected: {}", error),
        }
    }

    pub fn queue_generic_reset(&self, queue: ExternalHandle, new_queue: bool) -> bool {
        self.resolve_trusted::<QueueHandle>(queue)
            .map(|queue| self.kernel.queue_reset(queue, new_queue))
            .or_fail("queue_generic_reset", false)
    }

    // ---------------------------------------------------------------------
    // Send, receive and peek
    // ---------------------------------------------------------------------

    /// Copy one item into a queue.
    ///
    /// # Preconditions
    /// - `item` may only be null for zero-sized items
    /// - Overwrite is only valid on length-one queues
    /// - No blocking while the scheduler is suspended
    /// - `item` must be readable for the queue's item size
    pub fn queue_generic_send(
        &self,
        queue: ExternalHandle,
        item: UserPtr<u8>,
        ticks_to_wait: TickType,
        position: CopyPosition,
    ) -> bool {
        let result = (|| -> GateResult<_> {
            let queue = self.resolve::<QueueHandle>(queue)?;
            let item_size = self.kernel.queue_item_size(queue);
            ensure(!(item.is_null() && item_size != 0), GateError::Precondition)?;
            ensure(
                !(position == CopyPosition::Overwrite && self.kernel.queue_length(queue) != 1),
                GateError::Precondition,
            )?;
            ensure(!(self.scheduler_suspended() && ticks_to_wait != 0), GateError::Precondition)?;
            let item: &[u8] = if item_size == 0 {
                &[]
            } else {
                self.user_bytes(item, item_size)?
            };
            Ok(self.kernel.queue_send(queue, item, ticks_to_wait, position))
        })();
        result.or_fail("queue_generic_send", false)
    }

    fn receive_checked(
        &self,
        call: &'static str,
        queue: ExternalHandle,
        buffer: UserPtr<u8>,
        ticks_to_wait: TickType,
        receive: impl FnOnce(QueueHandle, &mut [u8]) -> bool,
    ) -> bool {
        let result = (|| -> GateResult<_> {
            let queue = self.resolve::<QueueHandle>(queue)?;
            let item_size = self.kernel.queue_item_size(queue);
            ensure(!(buffer.is_null() && item_size != 0), GateError::Precondition)?;
            ensure(!(self.scheduler_suspended() && ticks_to_wait != 0), GateError::Precondition)?;
            if item_size == 0 {
                return Ok(receive(queue, &mut []));
            }
            Ok(receive(queue, self.user_bytes_mut(buffer, item_size)?))
        })();
        result.or_fail(call, false)
    }

    /// Copy the head item out of a queue and remove it.
    pub fn queue_receive(&self, queue: ExternalHandle, buffer: UserPtr<u8>, ticks_to_wait: TickType) -> bool {
        self.receive_checked("queue_receive", queue, buffer, ticks_to_wait, |queue, buffer| {
            self.kernel.queue_receive(queue, buffer, ticks_to_wait)
        })
    }

    /// Copy the head item out of a queue, leaving it in place.
    pub fn queue_peek(&self, queue: ExternalHandle, buffer: UserPtr<u8>, ticks_to_wait: TickType) -> bool {
        self.receive_checked("queue_peek", queue, buffer, ticks_to_wait, |queue, buffer| {
            self.kernel.queue_peek(queue, buffer, ticks_to_wait)
        })
    }

    pub fn queue_messages_waiting(&self, queue: ExternalHandle) -> UBaseType {
        self.resolve::<QueueHandle>(queue)
            .map(|queue| self.kernel.queue_messages_waiting(queue))
            .or_fail("queue_messages_waiting", 0)
    }

    pub fn queue_spaces_available(&self, queue: ExternalHandle) -> UBaseType {
        self.resolve::<QueueHandle>(queue)
            .map(|queue| self.kernel.queue_spaces_available(queue))
            .or_fail("queue_spaces_available", 0)
    }

    // ---------------------------------------------------------------------
    // Semaphores and mutexes
    // ---------------------------------------------------------------------

    pub fn queue_semaphore_take(&self, queue: ExternalHandle, ticks_to_wait: TickType) -> bool {
        let result = (|| -> GateResult<_> {
            let queue = self.resolve::<QueueHandle>(queue)?;
            ensure(self.kernel.queue_item_size(queue) == 0, GateError::Precondition)?;
            ensure(!(self.scheduler_suspended() && ticks_to_wait != 0), GateError::Precondition)?;
            Ok(self.kernel.queue_semaphore_take(queue, ticks_to_wait))
        })();
        result.or_fail("queue_semaphore_take", false)
    }

    /// External handle of the task holding a mutex, null if none.
    pub fn queue_get_mutex_holder(&self, queue: ExternalHandle) -> ExternalHandle {
        self.resolve::<QueueHandle>(queue)
            .map(|queue| self.externalize(self.kernel.queue_mutex_holder(queue)))
            .or_fail("queue_get_mutex_holder", ExternalHandle::NULL)
    }

    pub fn queue_get_mutex_holder_from_isr(&self, queue: ExternalHandle) -> ExternalHandle {
        self.resolve_trusted::<QueueHandle>(queue)
            .map(|queue| self.externalize(self.kernel.queue_mutex_holder_from_isr(queue)))
            .or_fail("queue_get_mutex_holder_from_isr", ExternalHandle::NULL)
    }

    pub fn queue_take_mutex_recursive(&self, mutex: ExternalHandle, ticks_to_wait: TickType) -> bool {
        let result = (|| -> GateResult<_> {
            let mutex = self.resolve::<QueueHandle>(mutex)?;
            ensure(self.kernel.queue_item_size(mutex) == 0, GateError::Precondition)?;
            Ok(self.kernel.queue_take_mutex_recursive(mutex, ticks_to_wait))
        })();
        result.or_fail("queue_take_mutex_recursive", false)
    }

    pub fn queue_give_mutex_recursive(&self, mutex: ExternalHandle) -> bool {
        self.resolve::<QueueHandle>(mutex)
            .map(|mutex| self.kernel.queue_give_mutex_recursive(mutex))
            .or_fail("queue_give_mutex_recursive", false)
    }

    // ---------------------------------------------------------------------
    // Queue sets
    // ---------------------------------------------------------------------

    /// Wait on a set. Returns the external handle of the ready member.
    #[cfg(feature = "queue-sets")]
    pub fn queue_select_from_set(&self, set: ExternalHandle, ticks_to_wait: TickType) -> ExternalHandle {
        self.resolve::<QueueHandle>(set)
            .map(|set| self.externalize(self.kernel.queue_select_from_set(set, ticks_to_wait)))
            .or_fail("queue_select_from_set", ExternalHandle::NULL)
    }

    #[cfg(feature = "queue-sets")]
    pub fn queue_select_from_set_from_isr(&self, set: ExternalHandle) -> ExternalHandle {
        self.resolve_trusted::<QueueHandle>(set)
            .map(|set| self.externalize(self.kernel.queue_select_from_set_from_isr(set)))
            .or_fail("queue_select_from_set_from_isr", ExternalHandle::NULL)
    }

    /// Add a queue or semaphore to a set. The caller needs both.
    #[cfg(feature = "queue-sets")]
    pub fn queue_add_to_set(&self, member: ExternalHandle, set: ExternalHandle) -> bool {
        self.resolve::<QueueHandle>(member)
            .and_then(|member| Ok((member, self.resolve::<QueueHandle>(set)?)))
            .map(|(member, set)| self.kernel.queue_add_to_set(member, set))
            .or_fail("queue_add_to_set", false)
    }

    #[cfg(feature = "queue-sets")]
    pub fn queue_remove_from_set(&self, member: ExternalHandle, set: ExternalHandle) -> bool {
        self.resolve::<QueueHandle>(member)
            .and_then(|member| Ok((member, self.resolve::<QueueHandle>(set)?)))
            .map(|(member, set)| self.kernel.queue_remove_from_set(member, set))
            .or_fail("queue_remove_from_set", false)
    }

    // ---------------------------------------------------------------------
    // Registry
    // ---------------------------------------------------------------------

    #[cfg(feature = "queue-registry")]
    pub fn queue_add_to_registry(&self, queue: ExternalHandle, name: usize) {
        self.resolve::<QueueHandle>(queue)
            .map(|queue| self.kernel.queue_add_to_registry(queue, name))
            .or_fail("queue_add_to_registry", ())
    }

    #[cfg(feature = "queue-registry")]
    pub fn queue_unregister_queue(&self, queue: ExternalHandle) {
        self.resolve::<QueueHandle>(queue)
            .map(|queue| self.kernel.queue_unregister(queue))
            .or_fail("queue_unregister_queue", ())
    }

    #[cfg(feature = "queue-registry")]
    pub fn queue_get_name(&self, queue: ExternalHandle) -> usize {
        self.resolve::<QueueHandle>(queue)
            .map(|queue| self.kernel.queue_name(queue))
            .or_fail("queue_get_name", 0)
    }

    // ---------------------------------------------------------------------
    // Interrupt context
    // ---------------------------------------------------------------------

    pub fn queue_generic_send_from_isr(
        &self,
        queue: ExternalHandle,
        item: &[u8],
        higher_priority_task_woken: Option<&mut bool>,
        position: CopyPosition,
    ) -> bool {
        self.resolve_trusted::<QueueHandle>(queue)
            .map(|queue| {
                self.kernel
                    .queue_send_from_isr(queue, item, higher_priority_task_woken, position)
            })
            .or_fail("queue_generic_send_from_isr", false)
    }

    pub fn queue_give_from_isr(&self, queue: ExternalHandle, higher_priority_task_woken: Option<&mut bool>) -> bool {
        self.resolve_trusted::<QueueHandle>(queue)
            .map(|queue| self.kernel.queue_give_from_isr(queue, higher_priority_task_woken))
            .or_fail("queue_give_from_isr", false)
    }

    pub fn queue_receive_from_isr(
        &self,
        queue: ExternalHandle,
        buffer: &mut [u8],
        higher_priority_task_woken: Option<&mut bool>,
    ) -> bool {
        self.resolve_trusted::<QueueHandle>(queue)
            .map(|queue| {
                self.kernel
                    .queue_receive_from_isr(queue, buffer, higher_priority_task_woken)
            })
            .or_fail("queue_receive_from_isr", false)
    }

    pub fn queue_peek_from_isr(&self, queue: ExternalHandle, buffer: &mut [u8]) -> bool {
        self.resolve_trusted::<QueueHandle>(queue)
            .map(|queue| self.kernel.queue_peek_from_isr(queue, buffer))
            .or_fail("queue_peek_from_isr", false)
    }

    pub fn queue_is_queue_empty_from_isr(&self, queue: ExternalHandle) -> bool {
        self.resolve_trusted::<QueueHandle>(queue)
            .map(|queue| self.kernel.queue_is_empty_from_isr(queue))
            .or_fail("queue_is_queue_empty_from_isr", false)
    }

    pub fn queue_is_queue_full_from_isr(&self, queue: ExternalHandle) -> bool {
        self.resolve_trusted::<QueueHandle>(queue)
            .map(|queue| self.kernel.queue_is_full_from_isr(queue))
            .or_fail("queue_is_queue_full_from_isr", false)
    }

    pub fn queue_messages_waiting_from_isr(&self, queue: ExternalHandle) -> UBaseType {
        self.resolve_trusted::<QueueHandle>(queue)
            .map(|queue| self.kernel.queue_messages_waiting_from_isr(queue))
            .or_fail("queue_messages_waiting_from_isr", 0)
    }
}
