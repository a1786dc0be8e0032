//! Memory usage

use super::{Module, RenderedField};
use crate::collectors::SystemMetricsProvider;
use crate::config::ModuleInstance;
use crate::data::MemoryMetrics;
use crate::error::Result;
use crate::utils::format::expand;
use crate::utils::parsing::{format_bytes, parse_byte_size, PrefixType};

/// Limit on available memory
#[derive(Debug, Clone, Copy, PartialEq)]
enum Threshold {
    Percent(f64),
    Bytes(u64),
}

impl Threshold {
    fn parse(text: &str) -> Option<Self> {
        match text.trim().strip_suffix('%') {
            Some(pct) => pct.trim().parse().ok().map(Threshold::Percent),
            None => parse_byte_size(text).map(Threshold::Bytes),
        }
    }

    fn exceeded_by(&self, memory: &MemoryMetrics) -> bool {
        match *self {
            Threshold::Percent(pct) => percent(memory.available, memory.total) < pct,
            Threshold::Bytes(bytes) => memory.available < bytes,
        }
    }
}

fn percent(part: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}

#[derive(Debug)]
pub struct Memory {
    format: String,
    format_degraded: Option<String>,
    format_down: String,
    degraded: Option<Threshold>,
    critical: Option<Threshold>,
}

fn threshold(instance: &ModuleInstance, name: &str) -> Result<Option<Threshold>> {
    match instance.opt_string(name) {
        None => Ok(None),
        Some(text) => Threshold::parse(&text)
            .map(Some)
            .ok_or_else(|| instance.invalid(name, format!("expected a percentage or size, got '{}'", text))),
    }
}

pub fn build(instance: &ModuleInstance) -> Result<Box<dyn Module>> {
    Ok(Box::new(Memory {
        format: instance.string("format", "%used / %total"),
        format_degraded: instance.opt_string("format_degraded"),
        format_down: instance.string("format_down", "memory: ?"),
        degraded: threshold(instance, "threshold_degraded")?,
        critical: threshold(instance, "threshold_critical")?,
    }))
}

impl Module for Memory {
    fn render(&self, metrics: &dyn SystemMetricsProvider) -> Result<RenderedField> {
        let memory = metrics.memory()?;
        let bytes = |b: u64| format_bytes(b, PrefixType::Binary);
        let pct = |b: u64| format!("{:.1}%", percent(b, memory.total));

        let values = [
            ("used", bytes(memory.used())),
            ("free", bytes(memory.free)),
            ("available", bytes(memory.available)),
            ("total", bytes(memory.total)),
            ("percentage_used", pct(memory.used())),
            ("percentage_free", pct(memory.free)),
            ("percentage_available", pct(memory.available)),
        ];

        let critical = self.critical.map_or(false, |t| t.exceeded_by(&memory));
        let degraded = critical || self.degraded.map_or(false, |t| t.exceeded_by(&memory));
        let template = match (degraded, &self.format_degraded) {
            (true, Some(format)) => format,
            _ => &self.format,
        };
        let text = expand(template, &values);

        Ok(if critical {
            RenderedField::bad(text)
        } else if degraded {
            RenderedField::degraded(text)
        } else {
            RenderedField::plain(text)
        })
    }

    fn fallback(&self) -> RenderedField {
        RenderedField::bad(self.format_down.clone())
    }
}
