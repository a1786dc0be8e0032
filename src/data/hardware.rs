//! Hardware metric snapshots (disk, memory, battery)

/// Filesystem usage for one mount point, in bytes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiskMetrics {
    pub total: u64,
    /// Free including blocks reserved for root
    pub free: u64,
    /// Free for unprivileged users
    pub avail: u64,
}

impl DiskMetrics {
    pub fn used(&self) -> u64 {
        self.total.saturating_sub(self.free)
    }

    pub fn percentage_of(&self, bytes: u64) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            bytes as f64 / self.total as f64 * 100.0
        }
    }
}

/// System memory, in bytes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MemoryMetrics {
    pub total: u64,
    pub free: u64,
    pub available: u64,
}

impl MemoryMetrics {
    pub fn used(&self) -> u64 {
        self.total.saturating_sub(self.available)
    }
}

/// Charging state as reported by the power supply class
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatteryStatus {
    Charging,
    Discharging,
    Full,
    Unknown,
}

impl BatteryStatus {
    pub fn from_sysfs(status: &str) -> Self {
        match status.trim() {
            "Charging" => BatteryStatus::Charging,
            "Discharging" => BatteryStatus::Discharging,
            "Full" => BatteryStatus::Full,
            _ => BatteryStatus::Unknown,
        }
    }
}

/// Battery state. Energy values are in µWh, power in µW.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatteryMetrics {
    pub status: BatteryStatus,
    pub energy_now: u64,
    pub energy_full: u64,
    pub energy_full_design: u64,
    pub power_now: u64,
}

impl BatteryMetrics {
    /// Charge in percent against the last full or the design capacity
    pub fn percentage(&self, last_full_capacity: bool) -> f64 {
        let full = if last_full_capacity || self.energy_full_design == 0 {
            self.energy_full
        } else {
            self.energy_full_design
        };
        if full == 0 {
            return 0.0;
        }
        (self.energy_now as f64 / full as f64 * 100.0).min(100.0)
    }

    /// Seconds until empty (discharging) or full (charging)
    pub fn remaining_seconds(&self) -> Option<u64> {
        if self.power_now == 0 {
            return None;
        }
        let energy = match self.status {
            BatteryStatus::Discharging => self.energy_now,
            BatteryStatus::Charging => self.energy_full.saturating_sub(self.energy_now),
            _ => return None,
        };
        Some((energy as f64 / self.power_now as f64 * 3600.0) as u64)
    }

    /// Sum several batteries into one, as for `battery all`
    pub fn combine(batteries: &[BatteryMetrics]) -> Option<BatteryMetrics> {
        let first = batteries.first()?;
        let mut total = BatteryMetrics {
            status: first.status,
            energy_now: 0,
            energy_full: 0,
            energy_full_design: 0,
            power_now: 0,
        };
        for battery in batteries {
            total.energy_now += battery.energy_now;
            total.energy_full += battery.energy_full;
            total.energy_full_design += battery.energy_full_design;
            if battery.status == BatteryStatus::Charging || battery.status == BatteryStatus::Discharging {
                total.power_now += battery.power_now;
                total.status = battery.status;
            }
        }
        Some(total)
    }
}
