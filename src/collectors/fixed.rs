//! Provider that answers from preset values

use super::{BatterySelector, SystemMetricsProvider, FIRST_INTERFACE};
use crate::data::{BatteryMetrics, DiskMetrics, EthernetMetrics, LoadMetrics, MemoryMetrics, WirelessMetrics};
use crate::error::{Result, StatusError};
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

/// Fixed metric values for tests and dry runs. Anything not set is
/// reported as unavailable.
#[derive(Debug, Clone, Default)]
pub struct FixedMetrics {
    disks: HashMap<PathBuf, DiskMetrics>,
    wireless: Option<WirelessMetrics>,
    ethernet: Option<EthernetMetrics>,
    batteries: Vec<BatteryMetrics>,
    time: Option<DateTime<Utc>>,
    load: Option<LoadMetrics>,
    memory: Option<MemoryMetrics>,
    paths: HashSet<PathBuf>,
    live_pidfiles: HashSet<PathBuf>,
}

impl FixedMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_disk(mut self, path: impl Into<PathBuf>, disk: DiskMetrics) -> Self {
        self.disks.insert(path.into(), disk);
        self
    }

    pub fn with_wireless(mut self, wireless: WirelessMetrics) -> Self {
        self.wireless = Some(wireless);
        self
    }

    pub fn with_ethernet(mut self, ethernet: EthernetMetrics) -> Self {
        self.ethernet = Some(ethernet);
        self
    }

    /// Batteries are numbered in the order they are added
    pub fn with_battery(mut self, battery: BatteryMetrics) -> Self {
        self.batteries.push(battery);
        self
    }

    pub fn with_time(mut self, time: DateTime<Utc>) -> Self {
        self.time = Some(time);
        self
    }

    pub fn with_load(mut self, one: f64, five: f64, fifteen: f64) -> Self {
        self.load = Some(LoadMetrics { one, five, fifteen });
        self
    }

    pub fn with_memory(mut self, memory: MemoryMetrics) -> Self {
        self.memory = Some(memory);
        self
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.paths.insert(path.into());
        self
    }

    pub fn with_live_pidfile(mut self, pidfile: impl Into<PathBuf>) -> Self {
        self.live_pidfiles.insert(pidfile.into());
        self
    }
}

impl SystemMetricsProvider for FixedMetrics {
    fn disk(&self, path: &Path) -> Result<DiskMetrics> {
        self.disks
            .get(path)
            .copied()
            .ok_or_else(|| StatusError::unavailable(format!("disk {}", path.display()), "not mounted"))
    }

    fn wireless(&self, interface: &str) -> Result<WirelessMetrics> {
        self.wireless
            .clone()
            .filter(|w| interface == FIRST_INTERFACE || w.interface == interface)
            .ok_or_else(|| StatusError::unavailable(format!("wireless {}", interface), "no such interface"))
    }

    fn ethernet(&self, interface: &str) -> Result<EthernetMetrics> {
        self.ethernet
            .clone()
            .filter(|e| interface == FIRST_INTERFACE || e.interface == interface)
            .ok_or_else(|| StatusError::unavailable(format!("ethernet {}", interface), "no such interface"))
    }

    fn battery(&self, selector: BatterySelector, _path_template: Option<&str>) -> Result<BatteryMetrics> {
        let found = match selector {
            BatterySelector::All => BatteryMetrics::combine(&self.batteries),
            BatterySelector::Index(i) => self.batteries.get(i as usize).copied(),
        };
        found.ok_or_else(|| StatusError::unavailable("battery", "no battery found"))
    }

    fn now(&self) -> DateTime<Utc> {
        self.time.unwrap_or_else(Utc::now)
    }

    fn load_average(&self) -> Result<LoadMetrics> {
        self.load
            .ok_or_else(|| StatusError::unavailable("load", "no load average"))
    }

    fn memory(&self) -> Result<MemoryMetrics> {
        self.memory
            .ok_or_else(|| StatusError::unavailable("memory", "no memory figures"))
    }

    fn path_exists(&self, path: &Path) -> bool {
        self.paths.contains(path)
    }

    fn process_alive(&self, pidfile: &Path) -> bool {
        self.live_pidfiles.contains(pidfile)
    }
}
