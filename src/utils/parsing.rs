//! String parsing and number formatting utilities

/// Extract the trimmed value after the first colon
pub fn extract_after_colon(line: &str) -> Option<String> {
    line.split_once(':')
        .map(|(_, value)| value.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Unit family used when printing byte counts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefixType {
    /// KiB, MiB, ... (base 1024)
    Binary,
    /// kB, MB, ... (base 1000)
    Decimal,
    /// K, M, ... (base 1024)
    Custom,
}

impl PrefixType {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "binary" => Some(PrefixType::Binary),
            "decimal" => Some(PrefixType::Decimal),
            "custom" => Some(PrefixType::Custom),
            _ => None,
        }
    }
}

/// Format a byte count the way status bars usually print sizes
pub fn format_bytes(bytes: u64, prefix: PrefixType) -> String {
    let (base, units): (f64, [&str; 5]) = match prefix {
        PrefixType::Binary => (1024.0, ["B", "KiB", "MiB", "GiB", "TiB"]),
        PrefixType::Decimal => (1000.0, ["B", "kB", "MB", "GB", "TB"]),
        PrefixType::Custom => (1024.0, ["B", "K", "M", "G", "T"]),
    };

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= base && unit < units.len() - 1 {
        value /= base;
        unit += 1;
    }

    if unit == 0 {
        format!("{} {}", bytes, units[0])
    } else {
        format!("{:.1} {}", value, units[unit])
    }
}

/// Parse a size such as `512M`, `1.5G` or `2048` (bytes, base 1024)
pub fn parse_byte_size(text: &str) -> Option<u64> {
    let text = text.trim();
    let split = text
        .find(|c: char| c.is_ascii_alphabetic())
        .unwrap_or(text.len());
    let (number, suffix) = text.split_at(split);
    let number: f64 = number.trim().parse().ok()?;
    let multiplier = match suffix.trim().to_ascii_uppercase().as_str() {
        "" | "B" => 1u64,
        "K" | "KB" | "KIB" => 1 << 10,
        "M" | "MB" | "MIB" => 1 << 20,
        "G" | "GB" | "GIB" => 1 << 30,
        "T" | "TB" | "TIB" => 1 << 40,
        _ => return None,
    };
    if number < 0.0 {
        return None;
    }
    Some((number * multiplier as f64) as u64)
}

/// Format a duration as `HH:MM:SS`, or `HH:MM` when seconds are hidden
pub fn format_duration(seconds: u64, hide_seconds: bool) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;

    if hide_seconds {
        format!("{:02}:{:02}", hours, minutes)
    } else {
        format!("{:02}:{:02}:{:02}", hours, minutes, secs)
    }
}
