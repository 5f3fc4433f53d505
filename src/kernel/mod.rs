//! Downward Interfaces
//!
//! What the gate needs from the rest of the system: the kernel's own object
//! primitives, and the port's view of the calling context.

pub mod port;
pub mod primitives;
pub mod types;

pub use port::{Port, Regions};
pub use primitives::Kernel;
pub use types::*;
