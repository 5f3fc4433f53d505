//! Build-time Configuration
//!
//! Sizes are generated by `build.rs` from environment overrides; optional
//! kernel services are selected with cargo features.
//!
//! # Settings
//! - `POOL_SIZE` (`KOBJECT_GATE_POOL_SIZE`, default 64)
//! - `MAX_PRIORITIES` (`KOBJECT_GATE_MAX_PRIORITIES`, default 5)
//! - `TASK_NOTIFICATION_ARRAY_ENTRIES` (`KOBJECT_GATE_NOTIFICATION_ENTRIES`, default 1)
//! - `NUM_THREAD_LOCAL_STORAGE_POINTERS` (`KOBJECT_GATE_TLS_POINTERS`, default 5)
//!
//! # Features
//! A disabled feature removes the matching wrappers and leaves its system
//! call numbers in place with empty table entries.

include!(concat!(env!("OUT_DIR"), "/config.rs"));

/// Words in one task's access bitmap.
pub const ACL_WORDS: usize = POOL_SIZE / 32 + 1;

/// Whether per-object access control is compiled in.
pub const ACCESS_CONTROL_LIST: bool = cfg!(feature = "access-control-list");
