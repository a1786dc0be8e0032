//! Battery charge and time remaining

use super::{Module, RenderedField, StatusColor};
use crate::collectors::{BatterySelector, SystemMetricsProvider};
use crate::config::ModuleInstance;
use crate::data::{BatteryMetrics, BatteryStatus};
use crate::error::Result;
use crate::utils::format::expand;
use crate::utils::parsing::format_duration;
use chrono::Local;

#[derive(Debug, Clone, Copy, PartialEq)]
enum ThresholdType {
    Percentage,
    /// Minutes remaining
    Time,
}

#[derive(Debug)]
pub struct Battery {
    selector: BatterySelector,
    path: Option<String>,
    format: String,
    format_down: String,
    low_threshold: Option<f64>,
    threshold_type: ThresholdType,
    status_chr: String,
    status_bat: String,
    status_full: String,
    status_unk: String,
    integer_battery_capacity: bool,
    last_full_capacity: bool,
    hide_seconds: bool,
}

pub fn build(instance: &ModuleInstance) -> Result<Box<dyn Module>> {
    let selector = BatterySelector::parse(instance.key.instance.as_deref()).ok_or_else(|| {
        instance.invalid("instance", "battery instance must be a number or 'all'")
    })?;
    let threshold_type = match instance.string("threshold_type", "percentage").as_str() {
        "percentage" => ThresholdType::Percentage,
        "time" => ThresholdType::Time,
        other => {
            return Err(instance.invalid("threshold_type", format!("unknown threshold type '{}'", other)))
        }
    };
    let low_threshold = match instance.get("low_threshold") {
        Some(_) => Some(instance.float("low_threshold", 0.0)?),
        None => None,
    };

    Ok(Box::new(Battery {
        selector,
        path: instance.opt_string("path"),
        format: instance.string("format", "%status %percentage %remaining"),
        format_down: instance.string("format_down", "No battery"),
        low_threshold,
        threshold_type,
        status_chr: instance.string("status_chr", "CHR"),
        status_bat: instance.string("status_bat", "BAT"),
        status_full: instance.string("status_full", "FULL"),
        status_unk: instance.string("status_unk", "UNK"),
        integer_battery_capacity: instance.bool("integer_battery_capacity", false)?,
        last_full_capacity: instance.bool("last_full_capacity", false)?,
        hide_seconds: instance.bool("hide_seconds", false)?,
    }))
}

impl Battery {
    fn status_text(&self, status: BatteryStatus) -> &str {
        match status {
            BatteryStatus::Charging => &self.status_chr,
            BatteryStatus::Discharging => &self.status_bat,
            BatteryStatus::Full => &self.status_full,
            BatteryStatus::Unknown => &self.status_unk,
        }
    }

    fn color(&self, battery: &BatteryMetrics, percentage: f64) -> StatusColor {
        let low = match (self.low_threshold, self.threshold_type) {
            (None, _) => false,
            (Some(limit), ThresholdType::Percentage) => percentage < limit,
            (Some(limit), ThresholdType::Time) => battery.status == BatteryStatus::Discharging
                && battery
                    .remaining_seconds()
                    .map_or(false, |secs| (secs as f64 / 60.0) < limit),
        };
        if low {
            StatusColor::Bad
        } else {
            StatusColor::Good
        }
    }
}

impl Module for Battery {
    fn render(&self, metrics: &dyn SystemMetricsProvider) -> Result<RenderedField> {
        let battery = metrics.battery(self.selector, self.path.as_deref())?;
        let percentage = battery.percentage(self.last_full_capacity);
        let remaining = battery.remaining_seconds();

        let percentage_text = if self.integer_battery_capacity {
            format!("{:.0}%", percentage)
        } else {
            format!("{:.2}%", percentage)
        };
        let remaining_text = remaining
            .map(|secs| format_duration(secs, self.hide_seconds))
            .unwrap_or_default();
        let emptytime_text = match (battery.status, remaining) {
            (BatteryStatus::Discharging, Some(secs)) => {
                let empty_at = metrics.now() + chrono::Duration::seconds(secs as i64);
                let pattern = if self.hide_seconds { "%H:%M" } else { "%H:%M:%S" };
                empty_at.with_timezone(&Local).format(pattern).to_string()
            }
            _ => String::new(),
        };
        let consumption_text = if battery.power_now > 0 {
            format!("{:.2}W", battery.power_now as f64 / 1_000_000.0)
        } else {
            String::new()
        };

        let values = [
            ("status", self.status_text(battery.status).to_string()),
            ("percentage", percentage_text),
            ("remaining", remaining_text),
            ("emptytime", emptytime_text),
            ("consumption", consumption_text),
        ];
        let text = expand(&self.format, &values);
        Ok(RenderedField::new(text.trim_end(), Some(self.color(&battery, percentage))))
    }

    fn fallback(&self) -> RenderedField {
        RenderedField::bad(self.format_down.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collectors::FixedMetrics;
    use crate::config::parse_config;

    fn module(options: &str) -> Box<dyn Module> {
        let text = format!("order += \"battery 0\" battery 0 {{ {} }}", options);
        let config = parse_config(&text).unwrap();
        build(&config.instances()[0]).unwrap()
    }

    fn at_percent(percent: u64) -> FixedMetrics {
        FixedMetrics::new().with_battery(BatteryMetrics {
            status: BatteryStatus::Discharging,
            energy_now: percent * 1_000_000,
            energy_full: 100_000_000,
            energy_full_design: 100_000_000,
            power_now: 10_000_000,
        })
    }

    #[test]
    fn low_battery_is_bad_and_healthy_battery_is_good() {
        let battery = module("low_threshold = 10");
        assert_eq!(battery.render(&at_percent(5)).unwrap().color, Some(StatusColor::Bad));
        assert_eq!(battery.render(&at_percent(50)).unwrap().color, Some(StatusColor::Good));
    }

    #[test]
    fn default_format() {
        let battery = module("");
        let field = battery.render(&at_percent(50)).unwrap();
        assert_eq!(field.text, "BAT 50.00% 05:00:00");
    }

    #[test]
    fn integer_capacity_and_hidden_seconds() {
        let battery = module(r#"integer_battery_capacity = true hide_seconds = true format = "%percentage %remaining %consumption""#);
        assert_eq!(battery.render(&at_percent(25)).unwrap().text, "25% 02:30 10.00W");
    }

    #[test]
    fn time_threshold_uses_minutes_remaining() {
        // 5% at 10 W of 100 Wh is 30 minutes
        let battery = module(r#"low_threshold = 45 threshold_type = "time""#);
        assert_eq!(battery.render(&at_percent(5)).unwrap().color, Some(StatusColor::Bad));
        let battery = module(r#"low_threshold = 20 threshold_type = "time""#);
        assert_eq!(battery.render(&at_percent(5)).unwrap().color, Some(StatusColor::Good));
    }

    #[test]
    fn missing_battery_falls_back() {
        let battery = module(r#"format_down = "no power""#);
        assert!(battery.render(&FixedMetrics::new()).is_err());
        assert_eq!(battery.fallback(), RenderedField::bad("no power"));
    }

    #[test]
    fn named_instance_is_rejected() {
        let config = parse_config("order += \"battery main\"").unwrap();
        assert!(build(&config.instances()[0]).is_err());
    }
}
