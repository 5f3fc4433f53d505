//! Port Interface
//!
//! Hardware facts the gate needs about the calling context. Implemented by
//! the architecture port.

use crate::syscall::validate::MpuRegion;

/// Architecture services used by the gate.
pub trait Port {
    /// Whether the code that trapped into the gate runs privileged.
    fn is_privileged(&self) -> bool;

    /// Whether the scheduler has been started.
    ///
    /// Before it starts, every call comes from trusted start-up code.
    fn scheduler_running(&self) -> bool;

    /// The `index`th MPU region configured for the calling task.
    ///
    /// Returns None past the last region.
    fn region(&self, index: usize) -> Option<MpuRegion>;

    /// Run `f` with interrupts masked.
    ///
    /// Must nest, and must be callable from interrupt context.
    fn critical_section<R>(&self, f: impl FnOnce() -> R) -> R;
}

/// Iterator over the calling task's MPU regions.
pub struct Regions<'a, P: ?Sized> {
    port: &'a P,
    next: usize,
}

impl<'a, P: Port + ?Sized> Regions<'a, P> {
    pub fn new(port: &'a P) -> Self {
        Self { port, next: 0 }
    }
}

impl<P: Port + ?Sized> Iterator for Regions<'_, P> {
    type Item = MpuRegion;

    fn next(&mut self) -> Option<MpuRegion> {
        let region = self.port.region(self.next)?;
        self.next += 1;
        Some(region)
    }
}
