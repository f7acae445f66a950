//! Library side of the `sepsis-cdm` command.

pub mod config;
pub mod gate;
pub mod logging;
pub mod progress;
pub mod summary;
