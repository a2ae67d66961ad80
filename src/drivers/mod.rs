//! Task spawning and periodic producers.

pub mod task_pin;
pub mod ticker;
