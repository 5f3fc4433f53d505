//! Generates the compile-time configuration constants.
//!
//! Each setting can be overridden from the environment when the crate is
//! built, e.g. `KOBJECT_GATE_POOL_SIZE=128 cargo build`.

use std::env;
use std::fs;
use std::path::PathBuf;

struct Setting {
    env: &'static str,
    name: &'static str,
    ty: &'static str,
    default: u64,
    max: u64,
    doc: &'static str,
}

const SETTINGS: &[Setting] = &[
    Setting {
        env: "KOBJECT_GATE_POOL_SIZE",
        name: "POOL_SIZE",
        ty: "usize",
        default: 64,
        // External handles are index + 1 and must stay below i32::MAX.
        max: 0x7FFF_FFFE,
        doc: "Number of slots in the kernel object pool.",
    },
    Setting {
        env: "KOBJECT_GATE_MAX_PRIORITIES",
        name: "MAX_PRIORITIES",
        ty: "u32",
        default: 5,
        max: 0x7FFF_FFFF,
        doc: "Number of task priorities. Also the failure value of a priority query.",
    },
    Setting {
        env: "KOBJECT_GATE_NOTIFICATION_ENTRIES",
        name: "TASK_NOTIFICATION_ARRAY_ENTRIES",
        ty: "u32",
        default: 1,
        max: 0xFFFF,
        doc: "Number of notification slots per task.",
    },
    Setting {
        env: "KOBJECT_GATE_TLS_POINTERS",
        name: "NUM_THREAD_LOCAL_STORAGE_POINTERS",
        ty: "i32",
        default: 5,
        max: 0xFFFF,
        doc: "Number of thread-local storage pointers per task.",
    },
];

fn main() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").expect("OUT_DIR is set by cargo"));
    let mut generated = String::new();

    for setting in SETTINGS {
        println!("cargo:rerun-if-env-changed={}", setting.env);

        let value = match env::var(setting.env) {
            Ok(raw) => raw
                .trim()
                .parse::<u64>()
                .unwrap_or_else(|_| panic!("{} must be an unsigned integer, got {:?}", setting.env, raw)),
            Err(_) => setting.default,
        };
        if value == 0 || value > setting.max {
            panic!("{} must be in 1..={}, got {}", setting.env, setting.max, value);
        }

        generated.push_str(&format!(
            "/// {}\npub const {}: {} = {};\n",
            setting.doc, setting.name, setting.ty, value
        ));
    }

    fs::write(out_dir.join("config.rs"), generated).expect("failed to write generated config");
    println!("cargo:rerun-if-changed=build.rs");
}
