//! Metric snapshots handed from collectors to modules

pub mod hardware;
pub mod system;

pub use hardware::{BatteryMetrics, BatteryStatus, DiskMetrics, MemoryMetrics};
pub use system::{EthernetMetrics, LoadMetrics, WirelessMetrics};

#[cfg(test)]
mod tests {
    use super::*;

    fn battery(status: BatteryStatus, now: u64, full: u64, power: u64) -> BatteryMetrics {
        BatteryMetrics {
            status,
            energy_now: now,
            energy_full: full,
            energy_full_design: full,
            power_now: power,
        }
    }

    #[test]
    fn remaining_time_while_discharging() {
        let b = battery(BatteryStatus::Discharging, 20_000_000, 40_000_000, 10_000_000);
        assert_eq!(b.remaining_seconds(), Some(7200));
        assert_eq!(b.percentage(false), 50.0);
    }

    #[test]
    fn remaining_time_while_charging_counts_to_full() {
        let b = battery(BatteryStatus::Charging, 30_000_000, 40_000_000, 10_000_000);
        assert_eq!(b.remaining_seconds(), Some(3600));
    }

    #[test]
    fn full_battery_has_no_remaining_time() {
        let b = battery(BatteryStatus::Full, 40_000_000, 40_000_000, 0);
        assert_eq!(b.remaining_seconds(), None);
    }

    #[test]
    fn combine_sums_energy() {
        let a = battery(BatteryStatus::Discharging, 10, 100, 5);
        let b = battery(BatteryStatus::Full, 100, 100, 0);
        let all = BatteryMetrics::combine(&[a, b]).unwrap();
        assert_eq!(all.energy_now, 110);
        assert_eq!(all.energy_full, 200);
        assert_eq!(all.status, BatteryStatus::Discharging);
        assert!(BatteryMetrics::combine(&[]).is_none());
    }

    #[test]
    fn disk_percentages() {
        let d = DiskMetrics { total: 200, free: 50, avail: 40 };
        assert_eq!(d.used(), 150);
        assert_eq!(d.percentage_of(d.avail), 20.0);
        assert_eq!(DiskMetrics { total: 0, free: 0, avail: 0 }.percentage_of(0), 0.0);
    }
}
