//! Named, core-pinned task threads.
//!
//! On ESP-IDF a `std` thread is a FreeRTOS task; the pthread config set
//! just before the spawn picks its core, priority and stack.  Host builds
//! spawn a plain named thread.

use std::io;
use std::thread::{Builder, JoinHandle};

/// ESP32 CPU cores.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum Core {
    Pro = 0,
    /// Runs the monitor and the measure ticker.
    App = 1,
}

/// Spawn `f` as task `name` (NUL-terminated, e.g. `"thermalMgr\0"`).
pub fn spawn_on_core(
    core: Core,
    priority: u8,
    stack_kb: usize,
    name: &'static str,
    f: impl FnOnce() + Send + 'static,
) -> io::Result<JoinHandle<()>> {
    let label = name.trim_end_matches('\0');
    let builder = Builder::new().name(label.into());

    #[cfg(target_os = "espidf")]
    let builder = {
        pin_next_spawn(core, priority, stack_kb, name)?;
        builder
    };

    // Host threads need more headroom than a FreeRTOS task for the same work.
    #[cfg(not(target_os = "espidf"))]
    let builder = builder.stack_size(stack_kb.max(64) * 1024);

    log::info!(
        "Task '{}' -> {:?} (pri={}, stack={}KB)",
        label,
        core,
        priority,
        stack_kb
    );
    builder.spawn(f)
}

/// Applies to the next `pthread_create` from this thread only.
#[cfg(target_os = "espidf")]
fn pin_next_spawn(core: Core, priority: u8, stack_kb: usize, name: &'static str) -> io::Result<()> {
    // SAFETY: the IDF default constructor fully initialises the struct and
    // `name` is 'static and NUL-terminated.
    let ret = unsafe {
        let mut cfg = esp_idf_sys::esp_create_default_pthread_config();
        cfg.pin_to_core = core as i32;
        cfg.prio = i32::from(priority);
        cfg.stack_size = (stack_kb * 1024) as _;
        cfg.thread_name = name.as_ptr().cast();
        esp_idf_sys::esp_pthread_set_cfg(&cfg)
    };
    if ret == esp_idf_sys::ESP_OK as i32 {
        Ok(())
    } else {
        Err(io::Error::other(format!("esp_pthread_set_cfg failed ({ret})")))
    }
}
