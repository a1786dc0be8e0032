//! Configuration model and loading

pub mod parser;
pub mod writer;

use crate::error::{Result, StatusError};
use dirs::{config_dir, home_dir};
use serde::Deserialize;
use std::{collections::BTreeMap, fmt, fs, path::Path, path::PathBuf};
use tracing::{debug, warn};

use crate::display::is_valid_color;
use parser::is_word;

pub use parser::parse_config;
pub use writer::write_config;

/// Option mapping of a single module block
pub type Options = BTreeMap<String, OptionValue>;

/// A single option value
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl OptionValue {
    /// Classify an unquoted word
    pub fn from_word(word: &str) -> OptionValue {
        match word {
            "true" => return OptionValue::Bool(true),
            "false" => return OptionValue::Bool(false),
            _ => {}
        }
        if let Ok(n) = word.parse::<i64>() {
            return OptionValue::Int(n);
        }
        let numeric_start = word
            .chars()
            .next()
            .map_or(false, |c| c.is_ascii_digit() || c == '-' || c == '.');
        if numeric_start {
            if let Ok(f) = word.parse::<f64>() {
                if f.is_finite() {
                    return OptionValue::Float(f);
                }
            }
        }
        OptionValue::Str(word.to_string())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            OptionValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            OptionValue::Int(n) => Some(*n),
            OptionValue::Str(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            OptionValue::Float(f) => Some(*f),
            OptionValue::Int(n) => Some(*n as f64),
            OptionValue::Str(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            OptionValue::Bool(b) => Some(*b),
            OptionValue::Str(s) => match s.as_str() {
                "true" => Some(true),
                "false" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Bool(b) => write!(f, "{}", b),
            OptionValue::Int(n) => write!(f, "{}", n),
            OptionValue::Float(x) => write!(f, "{:?}", x),
            OptionValue::Str(s) => f.write_str(s),
        }
    }
}

/// Identifies a module instance: `disk /`, `wireless _first_`, `load`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ModuleKey {
    pub kind: String,
    pub instance: Option<String>,
}

impl ModuleKey {
    pub fn new(kind: impl Into<String>, instance: Option<&str>) -> Self {
        ModuleKey {
            kind: kind.into(),
            instance: instance
                .map(str::trim)
                .filter(|i| !i.is_empty())
                .map(String::from),
        }
    }

    /// Split an `order` entry such as `"disk /"` into type and instance
    pub fn parse(entry: &str) -> Option<Self> {
        let entry = entry.trim();
        if entry.is_empty() {
            return None;
        }
        match entry.split_once(char::is_whitespace) {
            Some((kind, instance)) => Some(ModuleKey::new(kind, Some(instance))),
            None => Some(ModuleKey::new(entry, None)),
        }
    }

    pub fn instance_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.instance.as_deref().unwrap_or(default)
    }
}

impl fmt::Display for ModuleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.instance {
            Some(instance) => write!(f, "{} {}", self.kind, instance),
            None => f.write_str(&self.kind),
        }
    }
}

/// Which output protocol the line renderer speaks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Term,
    None,
    I3bar,
}

impl OutputFormat {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "term" => Some(OutputFormat::Term),
            "none" => Some(OutputFormat::None),
            "i3bar" => Some(OutputFormat::I3bar),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Term => "term",
            OutputFormat::None => "none",
            OutputFormat::I3bar => "i3bar",
        }
    }
}

/// Longest accepted `interval`, in seconds (one day)
pub const MAX_INTERVAL: u64 = 86_400;

/// Settings of the `general` block
#[derive(Debug, Clone, PartialEq)]
pub struct General {
    pub interval: u64,
    pub colors: bool,
    pub color_good: String,
    pub color_bad: String,
    pub color_degraded: String,
    pub separator: String,
    pub output_format: OutputFormat,
}

impl Default for General {
    fn default() -> Self {
        General {
            interval: 5,
            colors: true,
            color_good: "#00FF00".to_string(),
            color_bad: "#FF0000".to_string(),
            color_degraded: "#FFFF00".to_string(),
            separator: " | ".to_string(),
            output_format: OutputFormat::Term,
        }
    }
}

impl General {
    /// Apply one `key = value` pair, returning a message on bad values
    pub fn set(&mut self, key: &str, value: &OptionValue) -> std::result::Result<(), String> {
        match key {
            "interval" => match value.as_int() {
                Some(n) if n > 0 && n as u64 <= MAX_INTERVAL => self.interval = n as u64,
                _ => {
                    return Err(format!(
                        "interval must be an integer between 1 and {}, got '{}'",
                        MAX_INTERVAL, value
                    ))
                }
            },
            "colors" => {
                self.colors = value
                    .as_bool()
                    .ok_or_else(|| format!("colors must be true or false, got '{}'", value))?
            }
            "color_good" => self.color_good = color_value(key, value)?,
            "color_bad" => self.color_bad = color_value(key, value)?,
            "color_degraded" => self.color_degraded = color_value(key, value)?,
            "separator" => self.separator = value.to_string(),
            "output_format" => {
                self.output_format = OutputFormat::parse(&value.to_string())
                    .ok_or_else(|| format!("unsupported output_format '{}'", value))?
            }
            other => warn!(option = other, "Ignoring unknown general option"),
        }
        Ok(())
    }
}

fn color_value(key: &str, value: &OptionValue) -> std::result::Result<String, String> {
    let color = value.to_string();
    if is_valid_color(&color) {
        Ok(color)
    } else {
        Err(format!("{} must be a color name or #RRGGBB, got '{}'", key, color))
    }
}

/// A module type, its instance name and its options. Immutable once loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleInstance {
    pub key: ModuleKey,
    pub options: Options,
}

impl ModuleInstance {
    pub fn new(key: ModuleKey, options: Options) -> Self {
        ModuleInstance { key, options }
    }

    pub fn kind(&self) -> &str {
        &self.key.kind
    }

    pub fn get(&self, name: &str) -> Option<&OptionValue> {
        self.options.get(name)
    }

    /// Option rendered as text, if present
    pub fn opt_string(&self, name: &str) -> Option<String> {
        self.options.get(name).map(|v| v.to_string())
    }

    pub fn string(&self, name: &str, default: &str) -> String {
        self.opt_string(name).unwrap_or_else(|| default.to_string())
    }

    pub fn int(&self, name: &str, default: i64) -> Result<i64> {
        match self.options.get(name) {
            None => Ok(default),
            Some(value) => value
                .as_int()
                .ok_or_else(|| self.invalid(name, format!("expected an integer, got '{}'", value))),
        }
    }

    pub fn float(&self, name: &str, default: f64) -> Result<f64> {
        match self.options.get(name) {
            None => Ok(default),
            Some(value) => value
                .as_float()
                .ok_or_else(|| self.invalid(name, format!("expected a number, got '{}'", value))),
        }
    }

    pub fn bool(&self, name: &str, default: bool) -> Result<bool> {
        match self.options.get(name) {
            None => Ok(default),
            Some(value) => value
                .as_bool()
                .ok_or_else(|| self.invalid(name, format!("expected true or false, got '{}'", value))),
        }
    }

    pub fn invalid(&self, option: &str, message: impl Into<String>) -> StatusError {
        StatusError::invalid_option(self.key.to_string(), option, message)
    }
}

/// A fully loaded configuration
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Configuration {
    pub general: General,
    /// Display order
    pub order: Vec<ModuleKey>,
    /// Option blocks keyed by module
    pub modules: BTreeMap<ModuleKey, Options>,
}

impl Configuration {
    /// The ordered module instances; entries without a block get empty options
    pub fn instances(&self) -> Vec<ModuleInstance> {
        self.order
            .iter()
            .map(|key| {
                let options = self.modules.get(key).cloned().unwrap_or_default();
                ModuleInstance::new(key.clone(), options)
            })
            .collect()
    }
}

#[derive(Deserialize, Debug)]
struct TomlConfig {
    #[serde(default)]
    general: Options,
    #[serde(default)]
    order: Vec<String>,
    #[serde(default)]
    modules: BTreeMap<String, Options>,
}

/// Parse the TOML form of a configuration
pub fn parse_toml_config(text: &str) -> Result<Configuration> {
    let raw: TomlConfig = toml::de::from_str(text)?;

    // same rules as the native `general` block, unknown keys included
    let mut config = Configuration::default();
    for (key, value) in &raw.general {
        config
            .general
            .set(key, value)
            .map_err(|msg| StatusError::Config(format!("[general] {}", msg)))?;
    }

    for entry in &raw.order {
        let key = ModuleKey::parse(entry)
            .ok_or_else(|| StatusError::Config("empty order entry".to_string()))?;
        if config.order.contains(&key) {
            return Err(StatusError::Config(format!("module '{}' listed twice in order", key)));
        }
        config.order.push(key);
    }

    for (name, options) in raw.modules {
        let key = ModuleKey::parse(&name)
            .ok_or_else(|| StatusError::Config("empty module table name".to_string()))?;
        check_writable_block(&key, &options)?;
        if config.modules.insert(key.clone(), options).is_some() {
            return Err(StatusError::Config(format!("duplicate module block '{}'", key)));
        }
    }

    warn_unused_blocks(&config);
    Ok(config)
}

/// TOML accepts names the native grammar cannot express; refuse them so the
/// configuration can always be written back out
fn check_writable_block(key: &ModuleKey, options: &Options) -> Result<()> {
    if !is_word(&key.kind) || matches!(key.kind.as_str(), "general" | "order") {
        return Err(StatusError::Config(format!("invalid module type '{}'", key.kind)));
    }
    for (name, value) in options {
        if !is_word(name) {
            return Err(StatusError::Config(format!(
                "module '{}': invalid option name '{}'",
                key, name
            )));
        }
        if let OptionValue::Float(f) = value {
            if !f.is_finite() {
                return Err(StatusError::Config(format!(
                    "module '{}': option '{}' must be a finite number",
                    key, name
                )));
            }
        }
    }
    Ok(())
}

pub(crate) fn warn_unused_blocks(config: &Configuration) {
    for key in config.modules.keys() {
        if !config.order.contains(key) {
            debug!(module = %key, "Block is not referenced by order, ignoring");
        }
    }
}

/// Read and parse a configuration file; `.toml` files use the TOML form
pub fn load_config(path: &Path) -> Result<Configuration> {
    let text = fs::read_to_string(path).map_err(|err| {
        StatusError::Config(format!("cannot read {}: {}", path.display(), err))
    })?;
    debug!(path = %path.display(), "Loading configuration");

    if path.extension().map_or(false, |ext| ext == "toml") {
        parse_toml_config(&text)
    } else {
        parse_config(&text)
    }
}

/// Candidate configuration locations, most specific first
pub fn config_search_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Some(dir) = config_dir() {
        paths.push(dir.join("swiftstatus/config"));
        paths.push(dir.join("swiftstatus/config.toml"));
    }
    if let Some(home) = home_dir() {
        paths.push(home.join(".swiftstatus.conf"));
    }
    paths.push(PathBuf::from("/etc/swiftstatus.conf"));
    paths
}

/// First existing configuration file, if any
pub fn default_config_path() -> Option<PathBuf> {
    config_search_paths().into_iter().find(|p| p.exists())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn words_are_classified() {
        assert_eq!(OptionValue::from_word("true"), OptionValue::Bool(true));
        assert_eq!(OptionValue::from_word("10"), OptionValue::Int(10));
        assert_eq!(OptionValue::from_word("-3"), OptionValue::Int(-3));
        assert_eq!(OptionValue::from_word("1.5"), OptionValue::Float(1.5));
        assert_eq!(OptionValue::from_word("inf"), OptionValue::Str("inf".into()));
        assert_eq!(OptionValue::from_word("_first_"), OptionValue::Str("_first_".into()));
    }

    #[test]
    fn module_keys_split_on_first_space() {
        let key = ModuleKey::parse("tztime New York").unwrap();
        assert_eq!(key.kind, "tztime");
        assert_eq!(key.instance.as_deref(), Some("New York"));
        assert_eq!(ModuleKey::parse("load").unwrap().instance, None);
        assert_eq!(ModuleKey::parse("load  ").unwrap().to_string(), "load");
        assert!(ModuleKey::parse("   ").is_none());
    }

    #[test]
    fn typed_accessors_accept_string_literals() {
        let mut options = Options::new();
        options.insert("low_threshold".into(), OptionValue::Str("10".into()));
        options.insert("hide_seconds".into(), OptionValue::Str("nope".into()));
        let instance = ModuleInstance::new(ModuleKey::new("battery", Some("0")), options);

        assert_eq!(instance.int("low_threshold", 0).unwrap(), 10);
        assert_eq!(instance.int("missing", 7).unwrap(), 7);
        assert!(matches!(
            instance.bool("hide_seconds", false),
            Err(StatusError::InvalidOption { .. })
        ));
    }

    #[test]
    fn general_rejects_zero_interval() {
        let mut general = General::default();
        assert!(general.set("interval", &OptionValue::Int(0)).is_err());
        assert!(general.set("interval", &OptionValue::Int(2)).is_ok());
        assert_eq!(general.interval, 2);
    }

    #[test]
    fn toml_form_matches_native_form() {
        let toml_text = r##"
order = ["disk /", "load"]

[general]
interval = 10
output_format = "none"

[modules."disk /"]
format = "%avail"
low_threshold = 10
"##;
        let native = r#"
general { interval = 10 output_format = "none" }
order += "disk /"
order += "load"
disk "/" { format = "%avail" low_threshold = 10 }
"#;
        assert_eq!(parse_toml_config(toml_text).unwrap(), parse_config(native).unwrap());
    }

    #[test]
    fn load_config_dispatches_on_extension() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "order = [\"load\"]").unwrap();
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.order, vec![ModuleKey::new("load", None)]);
    }

    #[test]
    fn interval_is_bounded() {
        let err = parse_config("general { interval = 9223372036854775807 }").unwrap_err();
        assert!(matches!(err, StatusError::Parse { ref token, .. } if token == "interval"));
        assert!(parse_config(&format!("general {{ interval = {} }}", MAX_INTERVAL)).is_ok());
        assert!(parse_toml_config("[general]\ninterval = 86401\n").is_err());
    }

    #[test]
    fn general_colors_are_validated() {
        let err = parse_config("general { color_bad = \"#a\u{e9}bbb\" }").unwrap_err();
        assert!(matches!(err, StatusError::Parse { .. }));
        assert!(parse_config(r##"general { color_bad = "red" color_good = "#00ff00" }"##).is_ok());
        assert!(matches!(
            parse_toml_config("[general]\ncolor_good = \"chartreuse-ish\"\n"),
            Err(StatusError::Config(_))
        ));
    }

    #[test]
    fn toml_names_must_be_writable() {
        let err = parse_toml_config("[modules.load]\n\"max threshold\" = 2\n").unwrap_err();
        assert!(matches!(err, StatusError::Config(_)));
        let err = parse_toml_config("[modules.general]\nformat = \"x\"\n").unwrap_err();
        assert!(matches!(err, StatusError::Config(_)));
        let err = parse_toml_config("[modules.\"lo{ad\"]\nformat = \"x\"\n").unwrap_err();
        assert!(matches!(err, StatusError::Config(_)));
        let err = parse_toml_config("[modules.load]\nmax_threshold = nan\n").unwrap_err();
        assert!(matches!(err, StatusError::Config(_)));
    }

    #[test]
    fn toml_config_writes_back_natively() {
        let toml_text = r##"
order = ["tztime New York", "load"]

[general]
separator = " \" "
color_good = "green"

[modules."tztime New York"]
format = "%H:%M"
label = "a \\ b"
max = 2.5
"##;
        let config = parse_toml_config(toml_text).unwrap();
        assert_eq!(parse_config(&write_config(&config)).unwrap(), config);
    }

    #[derive(Clone, Default)]
    struct LogBuffer(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn toml_unknown_general_keys_are_warned() {
        let logs = LogBuffer::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();

        let config = tracing::subscriber::with_default(subscriber, || {
            parse_toml_config("[general]\ninterval = 3\nvolume_step = 5\n")
        })
        .unwrap();
        assert_eq!(config.general.interval, 3);

        let logs = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        assert!(logs.contains("WARN"), "logs were {:?}", logs);
        assert!(logs.contains("volume_step"), "logs were {:?}", logs);
    }

    #[test]
    fn missing_file_is_a_config_error() {
        let err = load_config(Path::new("/nonexistent/swiftstatus.conf")).unwrap_err();
        assert!(matches!(err, StatusError::Config(_)));
    }
}
