//! Network and scheduler metric snapshots

use std::net::Ipv4Addr;

/// Run-queue load averages
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoadMetrics {
    pub one: f64,
    pub five: f64,
    pub fifteen: f64,
}

/// State of a wireless interface
#[derive(Debug, Clone, PartialEq)]
pub struct WirelessMetrics {
    pub interface: String,
    pub up: bool,
    /// Link quality in percent
    pub quality: Option<u8>,
    /// Signal level in dBm
    pub signal_dbm: Option<i32>,
    pub essid: Option<String>,
    /// Bitrate in bit/s
    pub bitrate: Option<u64>,
    /// Frequency in Hz
    pub frequency: Option<u64>,
    pub ip: Option<Ipv4Addr>,
}

/// State of a wired interface
#[derive(Debug, Clone, PartialEq)]
pub struct EthernetMetrics {
    pub interface: String,
    pub up: bool,
    /// Link speed in Mbit/s
    pub speed_mbps: Option<u32>,
    pub ip: Option<Ipv4Addr>,
}
