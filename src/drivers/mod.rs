//! Output drivers, peripheral bring-up, and task helpers.

pub mod hw_init;
pub mod relay;
pub mod task_pin;
