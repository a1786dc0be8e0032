use std::collections::HashSet;
use std::io::Write;
use std::time::{Duration, Instant};

use proptest::prelude::*;
use swiftstatus::collectors::FixedMetrics;
use swiftstatus::config::{load_config, parse_config, write_config, ModuleKey, OptionValue};
use swiftstatus::data::{BatteryMetrics, BatteryStatus};
use swiftstatus::{ModuleRegistry, Poller, StatusColor, StatusError};

fn poller(config: &str, metrics: FixedMetrics) -> Poller {
    let config = parse_config(config).expect("parse config");
    Poller::new(&config, &ModuleRegistry::with_defaults(), Box::new(metrics)).expect("build poller")
}

fn battery_at(percent: u64) -> FixedMetrics {
    FixedMetrics::new().with_battery(BatteryMetrics {
        status: BatteryStatus::Discharging,
        energy_now: percent * 1_000_000,
        energy_full: 100_000_000,
        energy_full_design: 100_000_000,
        power_now: 0,
    })
}

#[test]
fn load_line_and_next_deadline() {
    let mut poller = poller(
        r#"general { interval = 5 } order += "load" load { format = "%5min" }"#,
        FixedMetrics::new().with_load(0.10, 0.42, 0.30),
    );

    let now = Instant::now();
    let report = poller.tick_at(now);
    assert!(report.line.contains("0.42"), "line was {:?}", report.line);
    assert!(report.line.ends_with('\n'));
    assert_eq!(report.next_deadline, now + Duration::from_secs(5));
    assert_eq!(poller.deadline(), Some(now + Duration::from_secs(5)));
}

#[test]
fn battery_colour_follows_low_threshold() {
    let config = r#"
general { output_format = "none" }
order += "battery 0"
battery 0 { low_threshold = 10 format = "%percentage" integer_battery_capacity = true }
"#;

    let report = poller(config, battery_at(5)).tick_at(Instant::now());
    assert_eq!(report.fields[0].text, "5%");
    assert_eq!(report.fields[0].color, Some(StatusColor::Bad));

    let report = poller(config, battery_at(50)).tick_at(Instant::now());
    assert_eq!(report.fields[0].text, "50%");
    assert_eq!(report.fields[0].color, Some(StatusColor::Good));
}

#[test]
fn unavailable_metrics_show_fallback_text() {
    let mut poller = poller(
        r#"
general { output_format = "none" separator = "|" }
order += "disk /"
order += "wireless _first_"
order += "battery 0"
disk "/" { format_not_mounted = "gone" }
"#,
        FixedMetrics::new(),
    );

    let report = poller.tick_at(Instant::now());
    assert_eq!(report.line, "gone|W: down|No battery\n");
    assert_eq!(report.fallbacks, 3);
}

#[test]
fn unknown_module_type_is_fatal() {
    let config = parse_config(r#"order += "cpu_temperature 0""#).unwrap();
    let result = Poller::new(&config, &ModuleRegistry::with_defaults(), Box::new(FixedMetrics::new()));
    match result {
        Err(StatusError::UnknownModuleType(kind)) => assert_eq!(kind, "cpu_temperature"),
        Err(other) => panic!("unexpected error: {}", other),
        Ok(_) => panic!("unknown module type accepted"),
    }
}

#[test]
fn duplicate_blocks_are_rejected() {
    let err = parse_config(r#"load { format = "a" } load { format = "b" }"#).unwrap_err();
    assert!(matches!(err, StatusError::Parse { .. }));
}

#[test]
fn i3bar_lines_are_json() {
    let mut poller = poller(
        r#"
general { output_format = "i3bar" interval = 1 }
order += "load"
order += "path_exists VPN"
path_exists VPN { path = "/run/vpn" }
"#,
        FixedMetrics::new().with_load(2.5, 1.0, 0.5),
    );

    let mut out = Vec::new();
    poller.run(&mut out, Some(2)).unwrap();
    let text = String::from_utf8(out).unwrap();
    let mut lines = text.lines();

    let header: serde_json::Value = serde_json::from_str(lines.next().unwrap()).unwrap();
    assert_eq!(header["version"], 1);
    assert_eq!(lines.next(), Some("["));

    let mut ticks = 0;
    for (i, line) in lines.enumerate() {
        let body = if i == 0 { line } else { line.strip_prefix(',').expect("separator comma") };
        let blocks: serde_json::Value = serde_json::from_str(body).unwrap();
        assert_eq!(blocks[0]["name"], "load");
        assert_eq!(blocks[0]["full_text"], "2.50 1.00 0.50");
        assert_eq!(blocks[1]["name"], "path_exists");
        assert_eq!(blocks[1]["instance"], "VPN");
        ticks += 1;
    }
    assert_eq!(ticks, 2);
}

#[test]
fn toml_config_file_is_loaded() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    write!(
        file,
        r#"
order = ["load", "memory"]

[general]
interval = 2
output_format = "none"

[modules.load]
format = "%1min"
"#
    )
    .unwrap();

    let config = load_config(file.path()).unwrap();
    assert_eq!(config.general.interval, 2);
    assert_eq!(config.order, vec![ModuleKey::new("load", None), ModuleKey::new("memory", None)]);

    let mut poller = Poller::new(
        &config,
        &ModuleRegistry::with_defaults(),
        Box::new(FixedMetrics::new().with_load(0.25, 0.0, 0.0)),
    )
    .unwrap();
    assert_eq!(poller.tick_at(Instant::now()).line, "0.25 | memory: ?\n");
}

#[test]
fn native_config_file_is_loaded() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "# status line").unwrap();
    writeln!(file, "order += \"tztime utc\"").unwrap();
    writeln!(file, "tztime utc {{ timezone = \"UTC\" format = \"%H\" }}").unwrap();

    let config = load_config(file.path()).unwrap();
    assert_eq!(config.order, vec![ModuleKey::new("tztime", Some("utc"))]);
    assert_eq!(
        config.modules[&config.order[0]]["timezone"],
        OptionValue::Str("UTC".to_string())
    );
}

#[test]
fn missing_config_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_config(&dir.path().join("absent.conf")).unwrap_err();
    assert!(matches!(err, StatusError::Config(_)));
}

fn key_strategy() -> impl Strategy<Value = (String, Option<String>)> {
    (
        "(load|disk|battery|wireless|tztime)",
        proptest::option::of("[a-z/_]{1,6}"),
    )
}

/// Instances that can only be written as quoted, escaped strings
fn quoted_key_strategy() -> impl Strategy<Value = (String, Option<String>)> {
    (
        "(load|disk|battery|wireless|tztime)",
        proptest::option::of("[a-z /\"\\\\{}#=]{1,8}"),
    )
}

fn value_strategy() -> impl Strategy<Value = OptionValue> {
    prop_oneof![
        any::<bool>().prop_map(OptionValue::Bool),
        any::<i64>().prop_map(OptionValue::Int),
        (-1.0e9f64..1.0e9).prop_map(OptionValue::Float),
        any::<f64>()
            .prop_filter("finite", |f| f.is_finite())
            .prop_map(OptionValue::Float),
        "[a-zA-Z0-9 %:\"\\\\{}#=]{0,8}".prop_map(OptionValue::Str),
    ]
}

proptest! {
    #[test]
    fn order_is_preserved(keys in proptest::collection::vec(key_strategy(), 1..10)) {
        let mut seen = HashSet::new();
        let keys: Vec<ModuleKey> = keys
            .into_iter()
            .map(|(kind, instance)| ModuleKey::new(kind, instance.as_deref()))
            .filter(|key| seen.insert(key.clone()))
            .collect();

        let text: String = keys.iter().map(|key| format!("order += \"{}\"\n", key)).collect();
        let config = parse_config(&text).unwrap();
        prop_assert_eq!(config.order, keys);
    }

    #[test]
    fn written_config_reads_back(
        interval in 1u64..600,
        keys in proptest::collection::vec(quoted_key_strategy(), 1..6),
        options in proptest::collection::btree_map("opt_[a-z]{1,5}", value_strategy(), 0..5),
    ) {
        let mut config = parse_config("").unwrap();
        config.general.interval = interval;
        for (kind, instance) in keys {
            let key = ModuleKey::new(kind, instance.as_deref());
            if !config.order.contains(&key) {
                config.order.push(key.clone());
                config.modules.insert(key, options.clone());
            }
        }

        let reparsed = parse_config(&write_config(&config)).unwrap();
        prop_assert_eq!(reparsed, config);
    }
}
