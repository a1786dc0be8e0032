//! Filesystem usage

use super::{expand_path, Module, RenderedField};
use crate::collectors::SystemMetricsProvider;
use crate::config::ModuleInstance;
use crate::data::DiskMetrics;
use crate::error::Result;
use crate::utils::format::expand;
use crate::utils::parsing::{format_bytes, PrefixType};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Measure {
    Free,
    Avail,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Threshold {
    Percentage(Measure),
    /// Bytes measured in units of the multiplier
    Bytes(Measure, u64),
}

impl Threshold {
    fn parse(name: &str) -> Option<Self> {
        let (unit, measure) = name.split_once('_')?;
        let measure = match measure {
            "free" => Measure::Free,
            "avail" => Measure::Avail,
            _ => return None,
        };
        let threshold = match unit {
            "percentage" => Threshold::Percentage(measure),
            "bytes" => Threshold::Bytes(measure, 1),
            "kbytes" => Threshold::Bytes(measure, 1 << 10),
            "mbytes" => Threshold::Bytes(measure, 1 << 20),
            "gbytes" => Threshold::Bytes(measure, 1 << 30),
            "tbytes" => Threshold::Bytes(measure, 1 << 40),
            _ => return None,
        };
        Some(threshold)
    }

    fn is_below(&self, disk: &DiskMetrics, limit: f64) -> bool {
        let bytes = |m: Measure| match m {
            Measure::Free => disk.free,
            Measure::Avail => disk.avail,
        };
        match *self {
            Threshold::Percentage(m) => disk.percentage_of(bytes(m)) < limit,
            Threshold::Bytes(m, unit) => (bytes(m) as f64 / unit as f64) < limit,
        }
    }
}

/// Free space of the filesystem holding a path
#[derive(Debug)]
pub struct Disk {
    path: PathBuf,
    format: String,
    format_below_threshold: Option<String>,
    format_down: String,
    low_threshold: Option<f64>,
    threshold: Threshold,
    prefix: PrefixType,
}

pub fn build(instance: &ModuleInstance) -> Result<Box<dyn Module>> {
    let raw_path = instance.key.instance_or("/");
    let threshold_name = instance.string("threshold_type", "percentage_free");
    let prefix_name = instance.string("prefix_type", "binary");

    let threshold = Threshold::parse(&threshold_name)
        .ok_or_else(|| instance.invalid("threshold_type", format!("unknown threshold type '{}'", threshold_name)))?;
    let prefix = PrefixType::parse(&prefix_name)
        .ok_or_else(|| instance.invalid("prefix_type", format!("unknown prefix type '{}'", prefix_name)))?;
    let low_threshold = match instance.get("low_threshold") {
        Some(_) => Some(instance.float("low_threshold", 0.0)?),
        None => None,
    };

    let format_down = instance
        .opt_string("format_not_mounted")
        .or_else(|| instance.opt_string("format_down"))
        .unwrap_or_else(|| format!("{}: not mounted", raw_path));

    Ok(Box::new(Disk {
        path: expand_path(raw_path),
        format: instance.string("format", "%free"),
        format_below_threshold: instance.opt_string("format_below_threshold"),
        format_down,
        low_threshold,
        threshold,
        prefix,
    }))
}

impl Module for Disk {
    fn render(&self, metrics: &dyn SystemMetricsProvider) -> Result<RenderedField> {
        let disk = metrics.disk(&self.path)?;
        let pct = |bytes: u64| format!("{:.1}%", disk.percentage_of(bytes));

        let values = [
            ("free", format_bytes(disk.free, self.prefix)),
            ("avail", format_bytes(disk.avail, self.prefix)),
            ("used", format_bytes(disk.used(), self.prefix)),
            ("total", format_bytes(disk.total, self.prefix)),
            ("percentage_free", pct(disk.free)),
            ("percentage_avail", pct(disk.avail)),
            ("percentage_used", pct(disk.used())),
        ];

        let below = self
            .low_threshold
            .map_or(false, |limit| self.threshold.is_below(&disk, limit));

        if below {
            let template = self.format_below_threshold.as_deref().unwrap_or(&self.format);
            Ok(RenderedField::bad(expand(template, &values)))
        } else {
            Ok(RenderedField::plain(expand(&self.format, &values)))
        }
    }

    fn fallback(&self) -> RenderedField {
        RenderedField::bad(self.format_down.clone())
    }
}
