//! Gate Errors
//!
//! Every rejection is classified internally, logged, and then collapsed to
//! the failure value of the call that was made. Callers cannot tell one
//! kind of rejection from another.

use thiserror::Error;

/// Why a call through the gate was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GateError {
    /// Null, out of range, not live, or of the wrong kind.
    #[error("handle does not name a live object of the requested kind")]
    BadHandle,
    /// The calling task holds no grant for the object.
    #[error("calling task is not authorized for the object")]
    Unauthorized,
    /// A buffer is not accessible to the calling task, or its size overflows.
    #[error("buffer is not accessible to the calling task")]
    BadBuffer,
    /// A call-specific argument rule was broken.
    #[error("argument precondition violated")]
    Precondition,
    /// No free pool slot for a new object.
    #[error("kernel object pool exhausted")]
    PoolExhausted,
    /// The kernel primitive itself failed.
    #[error("kernel primitive failed")]
    Kernel,
}

pub type GateResult<T> = Result<T, GateError>;
