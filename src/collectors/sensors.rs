//! Battery readings from the power supply class

use super::BatterySelector;
use crate::data::{BatteryMetrics, BatteryStatus};
use crate::error::{Result, StatusError};
use crate::utils::file::read_metric_file;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::trace;

/// Read one battery, or the sum of all of them
pub fn battery_info(
    power_supply: &Path,
    selector: BatterySelector,
    path_template: Option<&str>,
) -> Result<BatteryMetrics> {
    match selector {
        BatterySelector::Index(index) => {
            let path = uevent_path(power_supply, path_template, index);
            read_uevent(&path)
        }
        BatterySelector::All => {
            let paths: Vec<PathBuf> = match path_template {
                Some(template) => (0..10)
                    .map(|i| PathBuf::from(template.replace("%d", &i.to_string())))
                    .filter(|p| p.exists())
                    .collect(),
                None => battery_dirs(power_supply)
                    .into_iter()
                    .map(|dir| dir.join("uevent"))
                    .collect(),
            };
            let batteries: Vec<BatteryMetrics> = paths
                .iter()
                .filter_map(|p| read_uevent(p).ok())
                .collect();
            BatteryMetrics::combine(&batteries)
                .ok_or_else(|| StatusError::unavailable("battery all", "no battery found"))
        }
    }
}

fn uevent_path(power_supply: &Path, template: Option<&str>, index: u32) -> PathBuf {
    match template {
        Some(template) => PathBuf::from(template.replace("%d", &index.to_string())),
        None => power_supply.join(format!("BAT{}", index)).join("uevent"),
    }
}

/// `BAT*` entries of the power supply class, sorted by name
fn battery_dirs(power_supply: &Path) -> Vec<PathBuf> {
    let mut dirs: Vec<PathBuf> = match fs::read_dir(power_supply) {
        Ok(entries) => entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_name().to_string_lossy().starts_with("BAT"))
            .map(|entry| entry.path())
            .collect(),
        Err(_) => Vec::new(),
    };
    dirs.sort();
    dirs
}

fn read_uevent(path: &Path) -> Result<BatteryMetrics> {
    trace!(path = %path.display(), "Reading battery");
    let text = read_metric_file(path)?;
    parse_uevent(&text).ok_or_else(|| {
        StatusError::unavailable(path.display().to_string(), "battery not present or no charge data")
    })
}

/// Parse a power supply `uevent` file.
///
/// Batteries report either energy (µWh/µW) or charge (µAh/µA); charge figures
/// are converted to energy with the current voltage. Batteries exposing only
/// `CAPACITY` are read as a percentage of 100.
pub fn parse_uevent(text: &str) -> Option<BatteryMetrics> {
    let mut fields = std::collections::HashMap::new();
    for line in text.lines() {
        if let Some((key, value)) = line.trim().split_once('=') {
            fields.insert(key.trim_start_matches("POWER_SUPPLY_"), value.trim());
        }
    }

    if fields.get("PRESENT") == Some(&"0") {
        return None;
    }

    let num = |key: &str| fields.get(key).and_then(|v| v.parse::<i64>().ok()).map(|v| v.unsigned_abs());
    let status = BatteryStatus::from_sysfs(fields.get("STATUS").copied().unwrap_or(""));

    if let (Some(now), Some(full)) = (num("ENERGY_NOW"), num("ENERGY_FULL")) {
        return Some(BatteryMetrics {
            status,
            energy_now: now,
            energy_full: full,
            energy_full_design: num("ENERGY_FULL_DESIGN").unwrap_or(0),
            power_now: num("POWER_NOW").unwrap_or(0),
        });
    }

    if let (Some(now), Some(full)) = (num("CHARGE_NOW"), num("CHARGE_FULL")) {
        // µAh * µV / 1e6 = µWh
        let voltage = num("VOLTAGE_NOW").unwrap_or(1_000_000) as f64 / 1_000_000.0;
        let to_energy = |charge: u64| (charge as f64 * voltage) as u64;
        return Some(BatteryMetrics {
            status,
            energy_now: to_energy(now),
            energy_full: to_energy(full),
            energy_full_design: num("CHARGE_FULL_DESIGN").map(to_energy).unwrap_or(0),
            power_now: num("CURRENT_NOW").map(to_energy).unwrap_or(0),
        });
    }

    num("CAPACITY").map(|capacity| BatteryMetrics {
        status,
        energy_now: capacity,
        energy_full: 100,
        energy_full_design: 0,
        power_now: 0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENERGY: &str = "POWER_SUPPLY_NAME=BAT0\nPOWER_SUPPLY_STATUS=Discharging\nPOWER_SUPPLY_PRESENT=1\nPOWER_SUPPLY_POWER_NOW=10000000\nPOWER_SUPPLY_ENERGY_FULL_DESIGN=50000000\nPOWER_SUPPLY_ENERGY_FULL=40000000\nPOWER_SUPPLY_ENERGY_NOW=20000000\n";

    #[test]
    fn energy_based_uevent() {
        let b = parse_uevent(ENERGY).unwrap();
        assert_eq!(b.status, BatteryStatus::Discharging);
        assert_eq!(b.percentage(true), 50.0);
        assert_eq!(b.percentage(false), 40.0);
        assert_eq!(b.remaining_seconds(), Some(7200));
    }

    #[test]
    fn charge_based_uevent_uses_voltage() {
        let text = "POWER_SUPPLY_STATUS=Charging\nPOWER_SUPPLY_VOLTAGE_NOW=12000000\nPOWER_SUPPLY_CHARGE_NOW=1000000\nPOWER_SUPPLY_CHARGE_FULL=2000000\nPOWER_SUPPLY_CURRENT_NOW=500000\n";
        let b = parse_uevent(text).unwrap();
        assert_eq!(b.energy_now, 12_000_000);
        assert_eq!(b.energy_full, 24_000_000);
        assert_eq!(b.power_now, 6_000_000);
        assert_eq!(b.status, BatteryStatus::Charging);
    }

    #[test]
    fn absent_battery() {
        assert!(parse_uevent("POWER_SUPPLY_PRESENT=0\nPOWER_SUPPLY_CAPACITY=50\n").is_none());
        assert!(parse_uevent("POWER_SUPPLY_STATUS=Unknown\n").is_none());
    }

    #[test]
    fn all_batteries_from_a_fake_sysfs() {
        let dir = tempfile::tempdir().unwrap();
        for (name, now) in [("BAT0", 10_000_000), ("BAT1", 30_000_000)] {
            let bat = dir.path().join(name);
            fs::create_dir_all(&bat).unwrap();
            fs::write(
                bat.join("uevent"),
                format!("POWER_SUPPLY_STATUS=Full\nPOWER_SUPPLY_ENERGY_NOW={now}\nPOWER_SUPPLY_ENERGY_FULL=40000000\n"),
            )
            .unwrap();
        }
        fs::create_dir_all(dir.path().join("AC")).unwrap();

        let all = battery_info(dir.path(), BatterySelector::All, None).unwrap();
        assert_eq!(all.energy_now, 40_000_000);
        assert_eq!(all.percentage(true), 50.0);

        let second = battery_info(dir.path(), BatterySelector::Index(1), None).unwrap();
        assert_eq!(second.energy_now, 30_000_000);

        assert!(battery_info(dir.path(), BatterySelector::Index(5), None).is_err());
    }
}
