//! Metric collection
//!
//! Modules never touch the OS directly; they ask a [`SystemMetricsProvider`].
//! [`LinuxMetrics`] answers from `/proc`, `/sys` and libc, [`FixedMetrics`]
//! answers from preset values.

pub mod fixed;
pub mod hardware;
pub mod network;
pub mod sensors;
pub mod system;

use crate::data::{BatteryMetrics, DiskMetrics, EthernetMetrics, LoadMetrics, MemoryMetrics, WirelessMetrics};
use crate::error::Result;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

pub use fixed::FixedMetrics;

/// Interface name that selects the first interface of the right kind
pub const FIRST_INTERFACE: &str = "_first_";

/// Which battery a module reads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatterySelector {
    All,
    Index(u32),
}

impl BatterySelector {
    /// `all` or a battery number; a missing instance means battery 0
    pub fn parse(instance: Option<&str>) -> Option<Self> {
        match instance {
            None => Some(BatterySelector::Index(0)),
            Some("all") => Some(BatterySelector::All),
            Some(n) => n.parse().ok().map(BatterySelector::Index),
        }
    }
}

/// One query per metric family. Implementations must be callable from
/// several threads at once: a tick issues its queries concurrently.
pub trait SystemMetricsProvider: Send + Sync {
    fn disk(&self, path: &Path) -> Result<DiskMetrics>;

    /// `interface` may be [`FIRST_INTERFACE`]
    fn wireless(&self, interface: &str) -> Result<WirelessMetrics>;

    /// `interface` may be [`FIRST_INTERFACE`]
    fn ethernet(&self, interface: &str) -> Result<EthernetMetrics>;

    /// `path_template` overrides where battery data lives; `%d` is the index
    fn battery(&self, selector: BatterySelector, path_template: Option<&str>) -> Result<BatteryMetrics>;

    fn now(&self) -> DateTime<Utc>;

    fn load_average(&self) -> Result<LoadMetrics>;

    fn memory(&self) -> Result<MemoryMetrics>;

    fn path_exists(&self, path: &Path) -> bool;

    /// Whether the process named by a pidfile is running
    fn process_alive(&self, pidfile: &Path) -> bool;
}

/// Provider backed by the running Linux system
#[derive(Debug, Clone)]
pub struct LinuxMetrics {
    root: PathBuf,
}

impl Default for LinuxMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl LinuxMetrics {
    pub fn new() -> Self {
        LinuxMetrics {
            root: PathBuf::from("/"),
        }
    }

    /// Read `/proc` and `/sys` below another root (used by tests).
    /// Syscall shortcuts such as `getloadavg` are only taken for `/`;
    /// disk usage always looks at the real filesystem.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        LinuxMetrics { root: root.into() }
    }

    fn path(&self, rel: &str) -> PathBuf {
        self.root.join(rel.trim_start_matches('/'))
    }
}

impl SystemMetricsProvider for LinuxMetrics {
    fn disk(&self, path: &Path) -> Result<DiskMetrics> {
        hardware::disk_usage(path)
    }

    fn wireless(&self, interface: &str) -> Result<WirelessMetrics> {
        network::wireless_info(
            &self.path("/sys/class/net"),
            &self.path("/proc/net/wireless"),
            interface,
        )
    }

    fn ethernet(&self, interface: &str) -> Result<EthernetMetrics> {
        network::ethernet_info(&self.path("/sys/class/net"), interface)
    }

    fn battery(&self, selector: BatterySelector, path_template: Option<&str>) -> Result<BatteryMetrics> {
        sensors::battery_info(&self.path("/sys/class/power_supply"), selector, path_template)
    }

    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn load_average(&self) -> Result<LoadMetrics> {
        let loadavg = self.path("/proc/loadavg");
        if self.root == Path::new("/") {
            system::load_average(&loadavg)
        } else {
            system::read_loadavg(&loadavg)
        }
    }

    fn memory(&self) -> Result<MemoryMetrics> {
        hardware::memory_info(&self.path("/proc/meminfo"))
    }

    fn path_exists(&self, path: &Path) -> bool {
        crate::utils::file::file_exists(path)
    }

    fn process_alive(&self, pidfile: &Path) -> bool {
        system::process_alive(pidfile)
    }
}
