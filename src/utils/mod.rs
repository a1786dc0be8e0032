//! Small helpers shared by collectors and modules

pub mod command;
pub mod file;
pub mod format;
pub mod parsing;
