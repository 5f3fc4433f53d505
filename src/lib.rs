//! kobject-gate - Kernel Object Gate for MPU-protected RTOS Tasks
//!
//! Unprivileged tasks reach kernel objects (queues, semaphores, tasks,
//! timers, event groups and stream buffers) only through this layer.
//!
//! # Security Features
//! - Objects are named by small pool indices, never by kernel addresses
//! - Every handle is range-, liveness- and kind-checked before use
//! - Per-task access bitmaps gate every object operation
//! - Every application buffer is checked against the caller's MPU regions
//! - Interrupt-only and privileged-only calls skip the access check
//!
//! # Architecture
//! - [`object`]: the object pool and handle translation
//! - [`access`]: the per-task access bitmaps
//! - [`kernel`]: the trusted kernel and port interfaces the gate forwards to
//! - [`gate`]: the checked wrappers, one module per object kind
//! - [`syscall`]: the fixed dispatch table used by the trap entry

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_op_in_unsafe_fn)]

pub mod access;
pub mod config;
pub mod error;
pub mod gate;
pub mod kernel;
pub mod object;
pub mod syscall;

#[cfg(test)]
mod testkit;

pub use error::{GateError, GateResult};
pub use gate::Gateway;
pub use kernel::{Kernel, Port};
pub use object::{ExternalHandle, TimerCallback};
pub use syscall::{SyscallArgs, UserPtr};
