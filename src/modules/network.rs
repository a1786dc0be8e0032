//! Wireless and ethernet link state

use super::{Module, RenderedField};
use crate::collectors::{SystemMetricsProvider, FIRST_INTERFACE};
use crate::config::ModuleInstance;
use crate::error::Result;
use crate::utils::format::expand;
use std::net::Ipv4Addr;

fn ip_text(ip: Option<Ipv4Addr>) -> String {
    ip.map_or_else(|| "no IP".to_string(), |ip| ip.to_string())
}

#[derive(Debug)]
struct LinkFormats {
    interface: String,
    format_up: String,
    format_down: String,
}

impl LinkFormats {
    fn from_instance(instance: &ModuleInstance, default_up: &str, default_down: &str) -> Self {
        LinkFormats {
            interface: instance.key.instance_or(FIRST_INTERFACE).to_string(),
            format_up: instance.string("format_up", default_up),
            format_down: instance.string("format_down", default_down),
        }
    }

    fn up(&self, values: &[(&str, String)], ip: Option<Ipv4Addr>) -> RenderedField {
        let text = expand(&self.format_up, values);
        if ip.is_some() {
            RenderedField::good(text)
        } else {
            RenderedField::degraded(text)
        }
    }

    fn down(&self) -> RenderedField {
        RenderedField::bad(self.format_down.clone())
    }
}

/// Wireless interface: quality, ESSID, bitrate and address
#[derive(Debug)]
pub struct Wireless {
    formats: LinkFormats,
}

pub fn build_wireless(instance: &ModuleInstance) -> Result<Box<dyn Module>> {
    Ok(Box::new(Wireless {
        formats: LinkFormats::from_instance(
            instance,
            "W: (%quality at %essid, %bitrate) %ip",
            "W: down",
        ),
    }))
}

impl Module for Wireless {
    fn render(&self, metrics: &dyn SystemMetricsProvider) -> Result<RenderedField> {
        let wifi = metrics.wireless(&self.formats.interface)?;
        if !wifi.up {
            return Ok(self.formats.down());
        }

        let unknown = || "?".to_string();
        let values = [
            ("quality", wifi.quality.map_or_else(unknown, |q| format!("{:03}%", q))),
            ("signal", wifi.signal_dbm.map_or_else(unknown, |s| format!("{} dBm", s))),
            ("essid", wifi.essid.clone().unwrap_or_else(unknown)),
            (
                "bitrate",
                wifi.bitrate
                    .map_or_else(unknown, |b| format!("{:.1} Mb/s", b as f64 / 1_000_000.0)),
            ),
            (
                "frequency",
                wifi.frequency
                    .map_or_else(unknown, |f| format!("{:.1} GHz", f as f64 / 1_000_000_000.0)),
            ),
            ("ip", ip_text(wifi.ip)),
        ];
        Ok(self.formats.up(&values, wifi.ip))
    }

    fn fallback(&self) -> RenderedField {
        self.formats.down()
    }
}

/// Wired interface: link speed and address
#[derive(Debug)]
pub struct Ethernet {
    formats: LinkFormats,
}

pub fn build_ethernet(instance: &ModuleInstance) -> Result<Box<dyn Module>> {
    Ok(Box::new(Ethernet {
        formats: LinkFormats::from_instance(instance, "E: %ip (%speed)", "E: down"),
    }))
}

impl Module for Ethernet {
    fn render(&self, metrics: &dyn SystemMetricsProvider) -> Result<RenderedField> {
        let eth = metrics.ethernet(&self.formats.interface)?;
        if !eth.up {
            return Ok(self.formats.down());
        }

        let values = [
            ("ip", ip_text(eth.ip)),
            (
                "speed",
                eth.speed_mbps
                    .map_or_else(|| "?".to_string(), |s| format!("{} Mbit/s", s)),
            ),
        ];
        Ok(self.formats.up(&values, eth.ip))
    }

    fn fallback(&self) -> RenderedField {
        self.formats.down()
    }
}
