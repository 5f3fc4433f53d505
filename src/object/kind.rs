//! Kernel Object Kinds and Internal Handles
//!
//! Internal handles are the kernel's own references to its objects. They
//! never leave privileged code; the pool maps them to external handles.
//!
//! # Slot Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                     KernelObject                        │
//! ├─────────────────────────────────────────────────────────┤
//! │  Free                      - slot available             │
//! │  Reserved                  - claimed, not yet stored    │
//! │  Queue(QueueHandle)        - queue / semaphore / mutex  │
//! │  Task(TaskHandle)                                       │
//! │  StreamBuffer(..)          - stream or message buffer   │
//! │  EventGroup(..)                                         │
//! │  Timer(TimerHandle, cb)    - cb is the app callback     │
//! └─────────────────────────────────────────────────────────┘
//! ```

use core::fmt;
use core::hash::{Hash, Hasher};
use core::marker::PhantomData;
use core::num::NonZeroUsize;

use super::handle::ExternalHandle;

/// Kinds of kernel objects the pool can name.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
#[repr(u8)]
pub enum ObjectKind {
    /// Free or reserved slot.
    Invalid = 0,
    /// Queue, semaphore, mutex or queue set.
    Queue = 1,
    Task = 2,
    /// Stream or message buffer.
    StreamBuffer = 3,
    EventGroup = 4,
    Timer = 5,
}

/// Application timer callback. Receives the timer's external handle.
pub type TimerCallback = fn(ExternalHandle);

/// A kernel-internal object reference.
///
/// # Type Parameters
/// * `T` - Marker for the kind of object referenced
pub struct Handle<T> {
    raw: NonZeroUsize,
    _phantom: PhantomData<T>,
}

impl<T> Handle<T> {
    /// Wrap a raw kernel object address. Returns None for zero.
    #[inline]
    pub const fn new(raw: usize) -> Option<Self> {
        match NonZeroUsize::new(raw) {
            Some(raw) => Some(Self {
                raw,
                _phantom: PhantomData,
            }),
            None => None,
        }
    }

    /// Get the raw object address.
    #[inline]
    pub const fn raw(self) -> usize {
        self.raw.get()
    }
}

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Handle<T> {}

impl<T> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl<T> Eq for Handle<T> {}

impl<T> Hash for Handle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.raw.hash(state);
    }
}

impl<T: ObjectType> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}@{:#x}", T::KIND, self.raw.get())
    }
}

/// Marker types for kernel objects.
pub mod objects {
    #[derive(Debug)]
    pub struct Queue;

    #[derive(Debug)]
    pub struct Task;

    #[derive(Debug)]
    pub struct StreamBuffer;

    #[derive(Debug)]
    pub struct EventGroup;

    #[derive(Debug)]
    pub struct Timer;
}

pub type QueueHandle = Handle<objects::Queue>;
pub type TaskHandle = Handle<objects::Task>;
pub type StreamBufferHandle = Handle<objects::StreamBuffer>;
pub type EventGroupHandle = Handle<objects::EventGroup>;
pub type TimerHandle = Handle<objects::Timer>;

/// Associates a marker type with its object kind.
pub trait ObjectType {
    const KIND: ObjectKind;
}

impl ObjectType for objects::Queue {
    const KIND: ObjectKind = ObjectKind::Queue;
}

impl ObjectType for objects::Task {
    const KIND: ObjectKind = ObjectKind::Task;
}

impl ObjectType for objects::StreamBuffer {
    const KIND: ObjectKind = ObjectKind::StreamBuffer;
}

impl ObjectType for objects::EventGroup {
    const KIND: ObjectKind = ObjectKind::EventGroup;
}

impl ObjectType for objects::Timer {
    const KIND: ObjectKind = ObjectKind::Timer;
}

/// An internal handle type that can be recovered from a pool slot.
pub trait PoolObject: Copy + Eq + fmt::Debug {
    const KIND: ObjectKind;

    /// Extract the handle if the slot holds an object of this kind.
    fn from_slot(slot: &KernelObject) -> Option<Self>;
}

macro_rules! pool_object {
    ($marker:ty, $variant:ident) => {
        impl PoolObject for Handle<$marker> {
            const KIND: ObjectKind = ObjectKind::$variant;

            #[inline]
            fn from_slot(slot: &KernelObject) -> Option<Self> {
                match *slot {
                    KernelObject::$variant(handle) => Some(handle),
                    _ => None,
                }
            }
        }
    };
}

pool_object!(objects::Queue, Queue);
pool_object!(objects::Task, Task);
pool_object!(objects::StreamBuffer, StreamBuffer);
pool_object!(objects::EventGroup, EventGroup);

impl PoolObject for TimerHandle {
    const KIND: ObjectKind = ObjectKind::Timer;

    #[inline]
    fn from_slot(slot: &KernelObject) -> Option<Self> {
        match *slot {
            KernelObject::Timer(handle, _) => Some(handle),
            _ => None,
        }
    }
}

/// Contents of one pool slot.
#[derive(Clone, Copy, Debug, Default)]
pub enum KernelObject {
    #[default]
    Free,
    /// Claimed by an in-progress creation.
    Reserved,
    Queue(QueueHandle),
    Task(TaskHandle),
    StreamBuffer(StreamBufferHandle),
    EventGroup(EventGroupHandle),
    /// A timer and the application callback it was created with.
    Timer(TimerHandle, TimerCallback),
}

impl KernelObject {
    /// Kind of the object held, `Invalid` for free and reserved slots.
    pub const fn kind(&self) -> ObjectKind {
        match self {
            Self::Free | Self::Reserved => ObjectKind::Invalid,
            Self::Queue(_) => ObjectKind::Queue,
            Self::Task(_) => ObjectKind::Task,
            Self::StreamBuffer(_) => ObjectKind::StreamBuffer,
            Self::EventGroup(_) => ObjectKind::EventGroup,
            Self::Timer(..) => ObjectKind::Timer,
        }
    }

    #[inline]
    pub const fn is_free(&self) -> bool {
        matches!(self, Self::Free)
    }

    /// Raw internal address of a live object.
    pub const fn raw(&self) -> Option<usize> {
        match self {
            Self::Free | Self::Reserved => None,
            Self::Queue(h) => Some(h.raw()),
            Self::Task(h) => Some(h.raw()),
            Self::StreamBuffer(h) => Some(h.raw()),
            Self::EventGroup(h) => Some(h.raw()),
            Self::Timer(h, _) => Some(h.raw()),
        }
    }

    /// Application callback of a timer slot.
    pub const fn timer_callback(&self) -> Option<TimerCallback> {
        match self {
            Self::Timer(_, callback) => Some(*callback),
            _ => None,
        }
    }
}
