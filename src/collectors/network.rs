//! Wireless and ethernet interface state

use super::FIRST_INTERFACE;
use crate::data::{EthernetMetrics, WirelessMetrics};
use crate::error::{Result, StatusError};
use crate::utils::command::{command_exists, run_command};
use crate::utils::file::{file_exists, read_first_line, read_metric_file};
use crate::utils::parsing::extract_after_colon;
use std::ffi::CStr;
use std::fs;
use std::net::Ipv4Addr;
use std::path::Path;
use tracing::debug;

fn is_wireless(net_class: &Path, name: &str) -> bool {
    let dir = net_class.join(name);
    file_exists(dir.join("wireless")) || file_exists(dir.join("phy80211"))
}

fn is_physical(net_class: &Path, name: &str) -> bool {
    name != "lo" && file_exists(net_class.join(name).join("device"))
}

/// Interfaces under the net class directory, sorted by name
fn interfaces(net_class: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(net_class)
        .map(|entries| {
            entries
                .filter_map(|e| e.ok())
                .map(|e| e.file_name().to_string_lossy().into_owned())
                .collect()
        })
        .unwrap_or_default();
    names.sort();
    names
}

fn resolve(net_class: &Path, requested: &str, wireless: bool) -> Result<String> {
    let kind = if wireless { "wireless" } else { "ethernet" };
    if requested != FIRST_INTERFACE {
        if net_class.join(requested).exists() {
            return Ok(requested.to_string());
        }
        return Err(StatusError::unavailable(
            format!("{} {}", kind, requested),
            "no such interface",
        ));
    }

    interfaces(net_class)
        .into_iter()
        .find(|name| {
            let w = is_wireless(net_class, name);
            if wireless {
                w
            } else {
                !w && is_physical(net_class, name)
            }
        })
        .ok_or_else(|| StatusError::unavailable(format!("{} {}", kind, requested), "no interface found"))
}

fn link_up(net_class: &Path, name: &str) -> bool {
    read_first_line(net_class.join(name).join("operstate"))
        .map(|state| state == "up")
        .unwrap_or(false)
}

/// First IPv4 address bound to `interface`
pub fn ipv4_address(interface: &str) -> Option<Ipv4Addr> {
    let mut addrs: *mut libc::ifaddrs = std::ptr::null_mut();

    unsafe {
        if libc::getifaddrs(&mut addrs) != 0 {
            return None;
        }

        let mut found = None;
        let mut cursor = addrs;
        while !cursor.is_null() {
            let entry = &*cursor;
            if !entry.ifa_addr.is_null()
                && (*entry.ifa_addr).sa_family as libc::c_int == libc::AF_INET
                && CStr::from_ptr(entry.ifa_name).to_bytes() == interface.as_bytes()
            {
                let sin = &*(entry.ifa_addr as *const libc::sockaddr_in);
                found = Some(Ipv4Addr::from(u32::from_be(sin.sin_addr.s_addr)));
                break;
            }
            cursor = entry.ifa_next;
        }

        libc::freeifaddrs(addrs);
        found
    }
}

/// Link quality (percent of 70) and signal level from `/proc/net/wireless`
pub fn parse_proc_wireless(text: &str, interface: &str) -> Option<(u8, i32)> {
    text.lines().skip(2).find_map(|line| {
        let (name, rest) = line.split_once(':')?;
        if name.trim() != interface {
            return None;
        }
        let mut fields = rest.split_whitespace().skip(1);
        let link: f64 = fields.next()?.trim_end_matches('.').parse().ok()?;
        let level: f64 = fields.next()?.trim_end_matches('.').parse().ok()?;
        let quality = (link / 70.0 * 100.0).round().clamp(0.0, 100.0) as u8;
        Some((quality, level as i32))
    })
}

/// Details reported by `iw dev <iface> link`
#[derive(Debug, Default, PartialEq)]
pub struct IwLink {
    pub essid: Option<String>,
    pub frequency: Option<u64>,
    pub bitrate: Option<u64>,
    pub signal_dbm: Option<i32>,
}

pub fn parse_iw_link(text: &str) -> IwLink {
    let mut link = IwLink::default();
    for line in text.lines() {
        let line = line.trim();
        if line.starts_with("SSID:") {
            link.essid = extract_after_colon(line);
        } else if line.starts_with("freq:") {
            link.frequency = extract_after_colon(line)
                .and_then(|v| v.parse::<f64>().ok())
                .map(|mhz| (mhz * 1_000_000.0).round() as u64);
        } else if line.starts_with("tx bitrate:") {
            link.bitrate = extract_after_colon(line)
                .and_then(|v| v.split_whitespace().next().and_then(|n| n.parse::<f64>().ok()))
                .map(|mbit| (mbit * 1_000_000.0).round() as u64);
        } else if line.starts_with("signal:") {
            link.signal_dbm = extract_after_colon(line)
                .and_then(|v| v.split_whitespace().next().and_then(|n| n.parse().ok()));
        }
    }
    link
}

pub fn wireless_info(net_class: &Path, proc_wireless: &Path, interface: &str) -> Result<WirelessMetrics> {
    let name = resolve(net_class, interface, true)?;
    let up = link_up(net_class, &name);

    let mut metrics = WirelessMetrics {
        interface: name.clone(),
        up,
        quality: None,
        signal_dbm: None,
        essid: None,
        bitrate: None,
        frequency: None,
        ip: None,
    };
    if !up {
        return Ok(metrics);
    }

    if let Ok(text) = read_metric_file(proc_wireless) {
        if let Some((quality, level)) = parse_proc_wireless(&text, &name) {
            metrics.quality = Some(quality);
            metrics.signal_dbm = Some(level);
        }
    }

    if command_exists("iw") {
        match run_command("iw", &["dev", &name, "link"]) {
            Ok(output) => {
                let link = parse_iw_link(&output);
                metrics.essid = link.essid;
                metrics.frequency = link.frequency;
                metrics.bitrate = link.bitrate;
                metrics.signal_dbm = metrics.signal_dbm.or(link.signal_dbm);
            }
            Err(err) => debug!(interface = %name, error = %err, "iw link query failed"),
        }
    }

    metrics.ip = ipv4_address(&name);
    Ok(metrics)
}

pub fn ethernet_info(net_class: &Path, interface: &str) -> Result<EthernetMetrics> {
    let name = resolve(net_class, interface, false)?;
    let up = link_up(net_class, &name);

    let speed_mbps = if up {
        read_first_line(net_class.join(&name).join("speed"))
            .ok()
            .and_then(|s| s.parse::<i64>().ok())
            .filter(|s| *s > 0)
            .map(|s| s as u32)
    } else {
        None
    };

    Ok(EthernetMetrics {
        ip: if up { ipv4_address(&name) } else { None },
        interface: name,
        up,
        speed_mbps,
    })
}
