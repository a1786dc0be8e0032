//! Presence checks: `path_exists` and `run_watch`

use super::{expand_path, Module, RenderedField};
use crate::collectors::SystemMetricsProvider;
use crate::config::ModuleInstance;
use crate::error::Result;
use crate::utils::format::expand;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Check {
    PathExists,
    ProcessAlive,
}

/// Shows whether a path exists or a pidfile names a running process
#[derive(Debug)]
pub struct Watch {
    check: Check,
    title: String,
    path: PathBuf,
    format: String,
    format_down: String,
}

fn build(instance: &ModuleInstance, check: Check, option: &str) -> Result<Box<dyn Module>> {
    let raw = instance
        .opt_string(option)
        .ok_or_else(|| instance.invalid(option, "option is required"))?;
    let format = instance.string("format", "%title: %status");

    Ok(Box::new(Watch {
        check,
        title: instance.key.instance_or(instance.kind()).to_string(),
        path: expand_path(&raw),
        format_down: instance.opt_string("format_down").unwrap_or_else(|| format.clone()),
        format,
    }))
}

pub fn build_path_exists(instance: &ModuleInstance) -> Result<Box<dyn Module>> {
    build(instance, Check::PathExists, "path")
}

pub fn build_run_watch(instance: &ModuleInstance) -> Result<Box<dyn Module>> {
    build(instance, Check::ProcessAlive, "pidfile")
}

impl Watch {
    fn field(&self, present: bool) -> RenderedField {
        let status = if present { "yes" } else { "no" };
        let values = [("title", self.title.clone()), ("status", status.to_string())];
        if present {
            RenderedField::good(expand(&self.format, &values))
        } else {
            RenderedField::bad(expand(&self.format_down, &values))
        }
    }
}

impl Module for Watch {
    fn render(&self, metrics: &dyn SystemMetricsProvider) -> Result<RenderedField> {
        let present = match self.check {
            Check::PathExists => metrics.path_exists(&self.path),
            Check::ProcessAlive => metrics.process_alive(&self.path),
        };
        Ok(self.field(present))
    }

    fn fallback(&self) -> RenderedField {
        self.field(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collectors::FixedMetrics;
    use crate::config::parse_config;

    fn instance(text: &str) -> ModuleInstance {
        parse_config(text).unwrap().instances().remove(0)
    }

    #[test]
    fn vpn_path() {
        let module = build_path_exists(&instance(
            r#"order += "path_exists VPN" path_exists VPN { path = "/proc/sys/net/ipv4/conf/tun0" }"#,
        ))
        .unwrap();
        let up = FixedMetrics::new().with_path("/proc/sys/net/ipv4/conf/tun0");
        assert_eq!(module.render(&up).unwrap(), RenderedField::good("VPN: yes"));
        assert_eq!(module.render(&FixedMetrics::new()).unwrap(), RenderedField::bad("VPN: no"));
    }

    #[test]
    fn run_watch_pidfile() {
        let module = build_run_watch(&instance(
            r#"order += "run_watch DHCP" run_watch DHCP { pidfile = "/var/run/dhclient.pid" format_down = "%title down" }"#,
        ))
        .unwrap();
        let alive = FixedMetrics::new().with_live_pidfile("/var/run/dhclient.pid");
        assert_eq!(module.render(&alive).unwrap(), RenderedField::good("DHCP: yes"));
        assert_eq!(module.fallback(), RenderedField::bad("DHCP down"));
    }

    #[test]
    fn path_is_required() {
        assert!(build_path_exists(&instance(r#"order += "path_exists VPN""#)).is_err());
    }
}
