//! Serialise a [`Configuration`] back to the native text form

use super::{Configuration, OptionValue};
use std::fmt::Write;

fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        if c == '"' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}

fn value_text(value: &OptionValue) -> String {
    match value {
        OptionValue::Str(s) => quote(s),
        // Debug keeps the decimal point so the value reads back as a float
        OptionValue::Float(f) => format!("{:?}", f),
        other => other.to_string(),
    }
}

/// Render a configuration that [`super::parse_config`] reads back unchanged
pub fn write_config(config: &Configuration) -> String {
    let mut out = String::new();
    let general = &config.general;

    out.push_str("general {\n");
    let _ = writeln!(out, "        interval = {}", general.interval);
    let _ = writeln!(out, "        colors = {}", general.colors);
    let _ = writeln!(out, "        color_good = {}", quote(&general.color_good));
    let _ = writeln!(out, "        color_bad = {}", quote(&general.color_bad));
    let _ = writeln!(out, "        color_degraded = {}", quote(&general.color_degraded));
    let _ = writeln!(out, "        separator = {}", quote(&general.separator));
    let _ = writeln!(out, "        output_format = {}", quote(general.output_format.as_str()));
    out.push_str("}\n\n");

    for key in &config.order {
        let _ = writeln!(out, "order += {}", quote(&key.to_string()));
    }

    for (key, options) in &config.modules {
        out.push('\n');
        match &key.instance {
            Some(instance) => {
                let _ = writeln!(out, "{} {} {{", key.kind, quote(instance));
            }
            None => {
                let _ = writeln!(out, "{} {{", key.kind);
            }
        }
        for (name, value) in options {
            let _ = writeln!(out, "        {} = {}", name, value_text(value));
        }
        out.push_str("}\n");
    }

    out
}
