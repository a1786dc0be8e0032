//! swiftstatus library
//!
//! Periodic status line for bars and terminals: a config of ordered modules,
//! polled on an interval and rendered as one line per tick.

pub mod collectors;
pub mod config;
pub mod data;
pub mod display;
pub mod error;
pub mod modules;
pub mod poller;
pub mod utils;

pub use collectors::{LinuxMetrics, SystemMetricsProvider};
pub use config::{load_config, parse_config, write_config, Configuration};
pub use error::{Result, StatusError};
pub use modules::{Module, ModuleRegistry, RenderedField, StatusColor};
pub use poller::Poller;
