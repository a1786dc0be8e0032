//! Clock, in local time or a fixed zone

use super::{Module, RenderedField};
use crate::collectors::SystemMetricsProvider;
use crate::config::ModuleInstance;
use crate::error::Result;
use chrono::format::{Item, StrftimeItems};
use chrono::{FixedOffset, Local};

#[derive(Debug, Clone, Copy, PartialEq)]
enum Zone {
    Local,
    Fixed(FixedOffset),
}

/// `UTC`, `Local`, or an offset such as `+02:00` / `-0530`
fn parse_zone(name: &str) -> Option<Zone> {
    match name {
        "" | "Local" | "local" => return Some(Zone::Local),
        "UTC" | "utc" | "Z" => return FixedOffset::east_opt(0).map(Zone::Fixed),
        _ => {}
    }

    let sign = match name.chars().next()? {
        '+' => 1,
        '-' => -1,
        _ => return None,
    };
    let digits: String = name[1..].chars().filter(|c| *c != ':').collect();
    if digits.len() != 4 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let hours: i32 = digits[..2].parse().ok()?;
    let minutes: i32 = digits[2..].parse().ok()?;
    if minutes >= 60 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60)).map(Zone::Fixed)
}

#[derive(Debug)]
pub struct TzTime {
    format: String,
    format_down: String,
    zone: Zone,
}

fn build_with_zone(instance: &ModuleInstance, zone: Zone) -> Result<Box<dyn Module>> {
    let format = instance.string("format", "%Y-%m-%d %H:%M:%S");
    // chrono panics on bad specifiers at display time, so reject them here
    if StrftimeItems::new(&format).any(|item| matches!(item, Item::Error)) {
        return Err(instance.invalid("format", format!("invalid strftime format '{}'", format)));
    }

    Ok(Box::new(TzTime {
        format,
        format_down: instance.string("format_down", "time unavailable"),
        zone,
    }))
}

pub fn build(instance: &ModuleInstance) -> Result<Box<dyn Module>> {
    let zone_name = instance.string("timezone", "Local");
    let zone = parse_zone(&zone_name)
        .ok_or_else(|| instance.invalid("timezone", format!("unsupported timezone '{}'", zone_name)))?;
    build_with_zone(instance, zone)
}

/// The plain `time` module always shows local time
pub fn build_local(instance: &ModuleInstance) -> Result<Box<dyn Module>> {
    build_with_zone(instance, Zone::Local)
}

impl Module for TzTime {
    fn render(&self, metrics: &dyn SystemMetricsProvider) -> Result<RenderedField> {
        let now = metrics.now();
        let text = match self.zone {
            Zone::Local => now.with_timezone(&Local).format(&self.format).to_string(),
            Zone::Fixed(offset) => now.with_timezone(&offset).format(&self.format).to_string(),
        };
        Ok(RenderedField::plain(text))
    }

    fn fallback(&self) -> RenderedField {
        RenderedField::plain(self.format_down.clone())
    }
}
