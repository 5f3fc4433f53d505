//! Stream and message buffer wrappers.

use crate::error::{GateError, GateResult};
use crate::kernel::*;
use crate::object::{ExternalHandle, KernelObject, StreamBufferHandle};
use crate::syscall::validate::UserPtr;

use super::{ensure, Gateway, OrFail};

/// A user byte count the region check can take.
fn byte_len(len: usize) -> GateResult<u32> {
    u32::try_from(len).map_err(|_| GateError::BadBuffer)
}

impl<K: Kernel, P: Port> Gateway<K, P> {
    fn install_stream_buffer(&self, create: impl FnOnce() -> Option<StreamBufferHandle>) -> ExternalHandle {
        self.install(|| create().map(KernelObject::StreamBuffer))
            .map(|index| index.to_external())
            .or_fail("stream_buffer_generic_create", ExternalHandle::NULL)
    }

    pub fn stream_buffer_generic_create(
        &self,
        size: usize,
        trigger_level: usize,
        kind: StreamBufferKind,
    ) -> ExternalHandle {
        self.install_stream_buffer(|| {
            self.kernel
                .stream_buffer_create(size, trigger_level, kind, None)
        })
    }

    pub fn stream_buffer_generic_create_static(
        &self,
        size: usize,
        trigger_level: usize,
        kind: StreamBufferKind,
        storage: StaticStorage,
    ) -> ExternalHandle {
        self.install_stream_buffer(|| {
            self.kernel
                .stream_buffer_create(size, trigger_level, kind, Some(storage))
        })
    }

    pub fn stream_buffer_delete(&self, buffer: ExternalHandle) {
        match self.resolve_entry::<StreamBufferHandle>(buffer, true) {
            Ok((index, handle)) => {
                self.kernel.stream_buffer_delete(handle);
                self.release_object(index, handle);
            }
            Err(error) => log::debug!("stream_buffer_delete: rejected: {}", error),
        }
    }

    pub fn stream_buffer_reset(&self, buffer: ExternalHandle) -> bool {
        self.resolve::<StreamBufferHandle>(buffer)
            .map(|buffer| self.kernel.stream_buffer_reset(buffer))
            .or_fail("stream_buffer_reset", false)
    }

    /// Copy `len` bytes from `data` into the buffer. Returns bytes sent.
    pub fn stream_buffer_send(
        &self,
        buffer: ExternalHandle,
        data: UserPtr<u8>,
        len: usize,
        ticks_to_wait: TickType,
    ) -> usize {
        let result = (|| -> GateResult<_> {
            ensure(!data.is_null(), GateError::BadBuffer)?;
            let data = self.user_bytes(data, byte_len(len)?)?;
            let buffer = self.resolve::<StreamBufferHandle>(buffer)?;
            Ok(self.kernel.stream_buffer_send(buffer, data, ticks_to_wait))
        })();
        result.or_fail("stream_buffer_send", 0)
    }

    /// Copy up to `len` bytes out of the buffer. Returns bytes received.
    pub fn stream_buffer_receive(
        &self,
        buffer: ExternalHandle,
        data: UserPtr<u8>,
        len: usize,
        ticks_to_wait: TickType,
    ) -> usize {
        let result = (|| -> GateResult<_> {
            ensure(!data.is_null(), GateError::BadBuffer)?;
            let data = self.user_bytes_mut(data, byte_len(len)?)?;
            let buffer = self.resolve::<StreamBufferHandle>(buffer)?;
            Ok(self.kernel.stream_buffer_receive(buffer, data, ticks_to_wait))
        })();
        result.or_fail("stream_buffer_receive", 0)
    }

    pub fn stream_buffer_is_full(&self, buffer: ExternalHandle) -> bool {
        self.resolve::<StreamBufferHandle>(buffer)
            .map(|buffer| self.kernel.stream_buffer_is_full(buffer))
            .or_fail("stream_buffer_is_full", false)
    }

    pub fn stream_buffer_is_empty(&self, buffer: ExternalHandle) -> bool {
        self.resolve::<StreamBufferHandle>(buffer)
            .map(|buffer| self.kernel.stream_buffer_is_empty(buffer))
            .or_fail("stream_buffer_is_empty", false)
    }

    pub fn stream_buffer_spaces_available(&self, buffer: ExternalHandle) -> usize {
        self.resolve::<StreamBufferHandle>(buffer)
            .map(|buffer| self.kernel.stream_buffer_spaces_available(buffer))
            .or_fail("stream_buffer_spaces_available", 0)
    }

    pub fn stream_buffer_bytes_available(&self, buffer: ExternalHandle) -> usize {
        self.resolve::<StreamBufferHandle>(buffer)
            .map(|buffer| self.kernel.stream_buffer_bytes_available(buffer))
            .or_fail("stream_buffer_bytes_available", 0)
    }

    pub fn stream_buffer_set_trigger_level(&self, buffer: ExternalHandle, trigger_level: usize) -> bool {
        self.resolve::<StreamBufferHandle>(buffer)
            .map(|buffer| self.kernel.stream_buffer_set_trigger_level(buffer, trigger_level))
            .or_fail("stream_buffer_set_trigger_level", false)
    }

    /// Length of the next message in a message buffer.
    pub fn stream_buffer_next_message_length_bytes(&self, buffer: ExternalHandle) -> usize {
        self.resolve::<StreamBufferHandle>(buffer)
            .map(|buffer| self.kernel.stream_buffer_next_message_length(buffer))
            .or_fail("stream_buffer_next_message_length_bytes", 0)
    }

    pub fn stream_buffer_reset_from_isr(&self, buffer: ExternalHandle) -> bool {
        self.resolve_trusted::<StreamBufferHandle>(buffer)
            .map(|buffer| self.kernel.stream_buffer_reset_from_isr(buffer))
            .or_fail("stream_buffer_reset_from_isr", false)
    }

    pub fn stream_buffer_send_from_isr(
        &self,
        buffer: ExternalHandle,
        data: &[u8],
        higher_priority_task_woken: Option<&mut bool>,
    ) -> usize {
        self.resolve_trusted::<StreamBufferHandle>(buffer)
            .map(|buffer| {
                self.kernel
                    .stream_buffer_send_from_isr(buffer, data, higher_priority_task_woken)
            })
            .or_fail("stream_buffer_send_from_isr", 0)
    }

    pub fn stream_buffer_receive_from_isr(
        &self,
        buffer: ExternalHandle,
        data: &mut [u8],
        higher_priority_task_woken: Option<&mut bool>,
    ) -> usize {
        self.resolve_trusted::<StreamBufferHandle>(buffer)
            .map(|buffer| {
                self.kernel
                    .stream_buffer_receive_from_isr(buffer, data, higher_priority_task_woken)
            })
            .or_fail("stream_buffer_receive_from_isr", 0)
    }

    pub fn stream_buffer_send_completed_from_isr(
        &self,
        buffer: ExternalHandle,
        higher_priority_task_woken: Option<&mut bool>,
    ) -> bool {
        self.resolve_trusted::<StreamBufferHandle>(buffer)
            .map(|buffer| {
                self.kernel
                    .stream_buffer_send_completed_from_isr(buffer, higher_priority_task_woken)
            })
            .or_fail("stream_buffer_send_completed_from_isr", false)
    }

    pub fn stream_buffer_receive_completed_from_isr(
        &self,
        buffer: ExternalHandle,
        higher_priority_task_woken: Option<&mut bool>,
    ) -> bool {
        self.resolve_trusted::<StreamBufferHandle>(buffer)
            .map(|buffer| {
                self.kernel
                    .stream_buffer_receive_completed_from_isr(buffer, higher_priority_task_woken)
            })
            .or_fail("stream_buffer_receive_completed_from_isr", false)
    }
}
