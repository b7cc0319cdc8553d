//! Subcommand handlers

pub mod deploy;
pub mod logs;
pub mod rm;
pub mod status;
