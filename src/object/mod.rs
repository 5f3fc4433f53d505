//! Kernel Object Indirection
//!
//! Unprivileged code names kernel objects by small integers instead of
//! addresses.
//!
//! # Design
//! - One statically allocated pool maps indices to internal handles
//! - Each slot records the object's kind; lookups are kind-checked
//! - External handles are pool indices shifted by one so zero stays null
//!
//! # Security Properties
//! - Internal addresses are never returned to unprivileged code
//! - A handle of one kind can never resolve to an object of another
//! - Freed slots stop resolving immediately

pub mod handle;
pub mod kind;
pub mod pool;

pub use handle::{ExternalHandle, PoolIndex, INDEX_OFFSET};
pub use kind::{
    EventGroupHandle, Handle, KernelObject, ObjectKind, PoolObject, QueueHandle,
    StreamBufferHandle, TaskHandle, TimerCallback, TimerHandle,
};
pub use pool::ObjectPool;
