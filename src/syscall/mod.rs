//! System Call Interface
//!
//! The only path from the untrusted trap entry into the gate.
//!
//! # Security Model
//! - Whitelist approach: the trap entry reaches only the handlers in a
//!   fixed table, indexed by a fixed call number
//! - Disabled features keep their number with an empty entry
//! - Unknown numbers and empty entries return zero, never panic
//! - Every handler goes through the gate's handle, access and buffer checks
//!
//! # Register Convention
//! Up to four argument registers are passed in; calls with five arguments
//! pass a pointer to a parameter block instead.

mod handler;
pub mod numbers;
pub mod validate;

use log::debug;

use crate::gate::Gateway;
use crate::kernel::{Kernel, Port};

pub use handler::SystemCallTable;
pub use numbers::NUM_SYSTEM_CALLS;
pub use validate::{MpuRegion, Permissions, UserPtr};

/// Raw argument registers of a trapped call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SyscallArgs {
    pub regs: [usize; 4],
}

impl SyscallArgs {
    pub const fn new(regs: [usize; 4]) -> Self {
        Self { regs }
    }
}

/// A privileged handler as stored in the dispatch table.
pub type SyscallFn<K, P> = fn(&Gateway<K, P>, &SyscallArgs) -> usize;

impl<K: Kernel, P: Port> Gateway<K, P> {
    /// Handler for `number`, if the call exists in this build.
    pub fn system_call(number: usize) -> Option<SyscallFn<K, P>> {
        SystemCallTable::<K, P>::ENTRIES.get(number).copied().flatten()
    }

    /// Run system call `number` for the calling task.
    ///
    /// # Returns
    /// The value for the caller's return register; zero for unknown or
    /// disabled calls
    pub fn dispatch(&self, number: usize, args: &SyscallArgs) -> usize {
        match Self::system_call(number) {
            Some(handler) => handler(self, args),
            None => {
                debug!("unknown or disabled system call {}", number);
                0
            }
        }
    }
}
