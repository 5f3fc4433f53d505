//! System Call Buffer Validation
//!
//! Decides whether the calling task may read or write a memory range, using
//! the MPU regions configured for that task.
//!
//! # Security Principles
//! - Deny by default: null, empty and wrapping ranges are refused
//! - The whole range must fall inside a single region
//! - Byte counts derived from element counts are overflow-checked first
//! - Structures passed by pointer are copied in before use (TOCTOU)

use core::marker::PhantomData;
use core::mem;

use bitflags::bitflags;

bitflags! {
    /// Access a task holds, or requests, on a memory region.
    #[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
    pub struct Permissions: u32 {
        const READ = 1 << 0;
        const WRITE = 1 << 1;
    }
}

/// One MPU region configured for a task.
///
/// Bounds are inclusive so a region may end at the top of the address space.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct MpuRegion {
    start: usize,
    end: usize,
    permissions: Permissions,
}

impl MpuRegion {
    /// Describe `len` bytes starting at `start`.
    ///
    /// Returns None for an empty region or one that wraps the address space.
    pub const fn new(start: usize, len: usize, permissions: Permissions) -> Option<Self> {
        if len == 0 {
            return None;
        }
        match start.checked_add(len - 1) {
            Some(end) => Some(Self {
                start,
                end,
                permissions,
            }),
            None => None,
        }
    }

    #[inline]
    pub const fn start(&self) -> usize {
        self.start
    }

    /// Last byte of the region.
    #[inline]
    pub const fn end(&self) -> usize {
        self.end
    }

    #[inline]
    pub const fn permissions(&self) -> Permissions {
        self.permissions
    }

    /// Check that `[first, last]` lies inside this region with `access`.
    #[inline]
    pub fn permits(&self, first: usize, last: usize, access: Permissions) -> bool {
        first >= self.start && last <= self.end && self.permissions.contains(access)
    }
}

/// Check a range against a task's regions.
///
/// # Security Checks
/// 1. Pointer is non-null and length is non-zero
/// 2. `addr + len - 1` does not wrap
/// 3. Some single region contains both ends with the requested access
pub fn within_regions<I>(regions: I, addr: usize, len: u32, access: Permissions) -> bool
where
    I: IntoIterator<Item = MpuRegion>,
{
    if addr == 0 || len == 0 {
        return false;
    }
    let Some(last) = addr.checked_add(len as usize - 1) else {
        return false;
    };
    regions
        .into_iter()
        .any(|region| region.permits(addr, last, access))
}

/// Byte length of `count` elements of `element_size` bytes.
///
/// Returns None if the product does not fit the length type.
#[inline]
pub const fn array_byte_len(count: u32, element_size: u32) -> Option<u32> {
    count.checked_mul(element_size)
}

/// Size of `T` as a buffer length.
#[inline]
pub const fn size_of_u32<T>() -> u32 {
    mem::size_of::<T>() as u32
}

/// A pointer received from unprivileged code.
///
/// Carries no validity guarantee. It must be checked against the caller's
/// regions before any of the `assume_*` accessors are used.
#[repr(transparent)]
pub struct UserPtr<T> {
    addr: usize,
    _phantom: PhantomData<*mut T>,
}

impl<T> UserPtr<T> {
    pub const NULL: Self = Self::from_raw(0);

    #[inline]
    pub const fn from_raw(addr: usize) -> Self {
        Self {
            addr,
            _phantom: PhantomData,
        }
    }

    #[inline]
    pub const fn addr(self) -> usize {
        self.addr
    }

    #[inline]
    pub const fn is_null(self) -> bool {
        self.addr == 0
    }

    #[inline]
    pub const fn is_aligned(self) -> bool {
        self.addr % mem::align_of::<T>() == 0
    }

    /// Reinterpret as a pointer to bytes.
    #[inline]
    pub const fn as_bytes(self) -> UserPtr<u8> {
        UserPtr::from_raw(self.addr)
    }

    /// Copy the pointee into kernel memory.
    ///
    /// # Safety
    /// The range `[addr, addr + size_of::<T>())` must be readable by the
    /// kernel and hold a valid `T`, and the pointer must be aligned.
    #[inline]
    pub(crate) unsafe fn read(self) -> T {
        // SAFETY: Caller authorized the range and checked alignment.
        unsafe { core::ptr::read_volatile(self.addr as *const T) }
    }

    /// Borrow the pointee mutably.
    ///
    /// # Safety
    /// As for [`read`](Self::read), plus the range must be writable and not
    /// aliased by another live reference.
    #[inline]
    pub(crate) unsafe fn assume_mut<'a>(self) -> &'a mut T {
        // SAFETY: See function contract.
        unsafe { &mut *(self.addr as *mut T) }
    }

    /// Borrow `len` elements.
    ///
    /// # Safety
    /// `len` elements starting at the pointer must be readable and aligned.
    #[inline]
    pub(crate) unsafe fn assume_slice<'a>(self, len: usize) -> &'a [T] {
        if len == 0 {
            return &[];
        }
        // SAFETY: See function contract; the pointer is non-null when len > 0.
        unsafe { core::slice::from_raw_parts(self.addr as *const T, len) }
    }

    /// Borrow `len` elements mutably.
    ///
    /// # Safety
    /// As for [`assume_slice`](Self::assume_slice), plus writable and not
    /// aliased.
    #[inline]
    pub(crate) unsafe fn assume_slice_mut<'a>(self, len: usize) -> &'a mut [T] {
        if len == 0 {
            return &mut [];
        }
        // SAFETY: See function contract.
        unsafe { core::slice::from_raw_parts_mut(self.addr as *mut T, len) }
    }
}

impl<T> Clone for UserPtr<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for UserPtr<T> {}

impl<T> PartialEq for UserPtr<T> {
    fn eq(&self, other: &Self) -> bool {
        self.addr == other.addr
    }
}

impl<T> Eq for UserPtr<T> {}

impl<T> core::fmt::Debug for UserPtr<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "UserPtr({:#x})", self.addr)
    }
}
