//! Line rendering: joins module fields into one status line

use crate::config::{General, ModuleInstance, ModuleKey, OptionValue, OutputFormat};
use crate::error::{Result, StatusError};
use crate::modules::{RenderedField, StatusColor};
use serde::Serialize;
use tracing::warn;
use unicode_width::UnicodeWidthStr;

const RESET: &str = "\x1b[0m";

/// Named colours with their SGR foreground code and the hex value sent to i3bar
const NAMED_COLORS: &[(&str, &str, &str)] = &[
    // Standard 8 colors (30-37)
    ("black", "30", "#000000"),
    ("red", "31", "#CD0000"),
    ("green", "32", "#00CD00"),
    ("yellow", "33", "#CDCD00"),
    ("blue", "34", "#0000EE"),
    ("magenta", "35", "#CD00CD"),
    ("purple", "35", "#CD00CD"),
    ("cyan", "36", "#00CDCD"),
    ("white", "37", "#E5E5E5"),
    // Bright colors (90-97)
    ("bright_black", "90", "#7F7F7F"),
    ("gray", "90", "#7F7F7F"),
    ("grey", "90", "#7F7F7F"),
    ("bright_red", "91", "#FF0000"),
    ("orange", "91", "#FF0000"),
    ("bright_green", "92", "#00FF00"),
    ("bright_yellow", "93", "#FFFF00"),
    ("bright_blue", "94", "#5C5CFF"),
    ("bright_magenta", "95", "#FF00FF"),
    ("violet", "95", "#FF00FF"),
    ("bright_cyan", "96", "#00FFFF"),
    ("bright_white", "97", "#FFFFFF"),
];

fn named_color(name: &str) -> Option<(&'static str, &'static str)> {
    let name = name.to_lowercase();
    NAMED_COLORS
        .iter()
        .find(|(known, _, _)| *known == name)
        .map(|(_, sgr, hex)| (*sgr, *hex))
}

/// `#RRGGBB` into its components
fn parse_hex(color: &str) -> Option<(u8, u8, u8)> {
    let hex = color.strip_prefix('#')?;
    if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| hex.get(range).and_then(|c| u8::from_str_radix(c, 16).ok());
    Some((channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

fn is_reset(color: &str) -> bool {
    color.eq_ignore_ascii_case("reset") || color.eq_ignore_ascii_case("default")
}

/// Whether `color` is a known colour name, `reset`/`default`, or `#RRGGBB`
pub fn is_valid_color(color: &str) -> bool {
    is_reset(color) || named_color(color).is_some() || parse_hex(color).is_some()
}

pub fn hex_to_ansi(color: &str) -> String {
    if is_reset(color) {
        return RESET.to_string();
    }
    if let Some((sgr, _)) = named_color(color) {
        return format!("\x1b[{}m", sgr);
    }
    if let Some((r, g, b)) = parse_hex(color) {
        return format!("\x1b[38;2;{};{};{}m", r, g, b);
    }

    warn!(color, "Unknown color, printing uncolored");
    RESET.to_string()
}

/// i3bar only understands `#RRGGBB`; names are translated, the rest dropped
fn i3bar_color(color: &str) -> Option<String> {
    if parse_hex(color).is_some() {
        return Some(color.to_string());
    }
    named_color(color).map(|(_, hex)| hex.to_string())
}

/// Horizontal alignment inside `min_width`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Right,
    Center,
}

impl Align {
    fn as_str(&self) -> &'static str {
        match self {
            Align::Left => "left",
            Align::Right => "right",
            Align::Center => "center",
        }
    }
}

/// Per-module presentation options shared by every module type
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FieldLayout {
    pub min_width: Option<usize>,
    pub align: Option<Align>,
    pub color_good: Option<String>,
    pub color_bad: Option<String>,
    pub color_degraded: Option<String>,
}

impl FieldLayout {
    pub fn from_instance(instance: &ModuleInstance) -> Result<Self> {
        // min_width is either a column count or a sample string to measure
        let min_width = match instance.get("min_width") {
            None => None,
            Some(OptionValue::Int(n)) if *n >= 0 => Some(*n as usize),
            Some(OptionValue::Str(sample)) => Some(UnicodeWidthStr::width(sample.as_str())),
            Some(other) => {
                return Err(instance.invalid("min_width", format!("expected a width or sample text, got '{}'", other)))
            }
        };
        let align = match instance.opt_string("align").as_deref() {
            None => None,
            Some("left") => Some(Align::Left),
            Some("right") => Some(Align::Right),
            Some("center") => Some(Align::Center),
            Some(other) => {
                return Err(instance.invalid("align", format!("expected left, right or center, got '{}'", other)))
            }
        };

        let color = |name: &str| -> Result<Option<String>> {
            match instance.opt_string(name) {
                Some(value) if !is_valid_color(&value) => Err(instance.invalid(
                    name,
                    format!("expected a color name or #RRGGBB, got '{}'", value),
                )),
                value => Ok(value),
            }
        };

        Ok(FieldLayout {
            min_width,
            align,
            color_good: color("color_good")?,
            color_bad: color("color_bad")?,
            color_degraded: color("color_degraded")?,
        })
    }

    fn pad(&self, text: &str) -> String {
        let width = UnicodeWidthStr::width(text);
        let min = match self.min_width {
            Some(min) if min > width => min,
            _ => return text.to_string(),
        };
        let fill = min - width;
        match self.align.unwrap_or(Align::Center) {
            Align::Left => format!("{}{}", text, " ".repeat(fill)),
            Align::Right => format!("{}{}", " ".repeat(fill), text),
            Align::Center => {
                let left = fill / 2;
                format!("{}{}{}", " ".repeat(left), text, " ".repeat(fill - left))
            }
        }
    }
}

/// One module's output plus what the renderer needs to place it
#[derive(Debug, Clone)]
pub struct Segment<'a> {
    pub key: &'a ModuleKey,
    pub field: RenderedField,
    pub layout: &'a FieldLayout,
}

#[derive(Serialize)]
struct I3barBlock<'a> {
    full_text: &'a str,
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    instance: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    min_width: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    align: Option<&'static str>,
}

/// Joins rendered fields according to the general options
#[derive(Debug, Clone)]
pub struct LineRenderer {
    format: OutputFormat,
    colors: bool,
    separator: String,
    color_good: String,
    color_bad: String,
    color_degraded: String,
}

impl LineRenderer {
    pub fn new(general: &General) -> Self {
        LineRenderer {
            format: general.output_format,
            colors: general.colors,
            separator: general.separator.clone(),
            color_good: general.color_good.clone(),
            color_bad: general.color_bad.clone(),
            color_degraded: general.color_degraded.clone(),
        }
    }

    /// Written once before the first line
    pub fn header(&self) -> String {
        match self.format {
            OutputFormat::I3bar => "{\"version\":1}\n[\n".to_string(),
            OutputFormat::Term | OutputFormat::None => String::new(),
        }
    }

    fn color_for<'a>(&'a self, color: Option<StatusColor>, layout: &'a FieldLayout) -> Option<&'a str> {
        if !self.colors {
            return None;
        }
        let chosen = match color? {
            StatusColor::Good => layout.color_good.as_deref().unwrap_or(&self.color_good),
            StatusColor::Bad => layout.color_bad.as_deref().unwrap_or(&self.color_bad),
            StatusColor::Degraded => layout.color_degraded.as_deref().unwrap_or(&self.color_degraded),
        };
        Some(chosen)
    }

    /// Render one tick's fields as a complete line, newline included.
    /// `tick` is the zero-based tick number; i3bar lines after the first
    /// carry a leading comma.
    pub fn render(&self, segments: &[Segment], tick: u64) -> String {
        match self.format {
            OutputFormat::I3bar => self.render_i3bar(segments, tick),
            OutputFormat::Term | OutputFormat::None => self.render_text(segments),
        }
    }

    fn render_text(&self, segments: &[Segment]) -> String {
        let mut line = String::new();
        for (i, segment) in segments.iter().enumerate() {
            if i > 0 {
                line.push_str(&self.separator);
            }
            let text = segment.layout.pad(&segment.field.text);
            let color = match self.format {
                OutputFormat::Term => self.color_for(segment.field.color, segment.layout),
                _ => None,
            };
            match color {
                Some(color) => {
                    line.push_str(&hex_to_ansi(color));
                    line.push_str(&text);
                    line.push_str(RESET);
                }
                None => line.push_str(&text),
            }
        }
        line.push('\n');
        line
    }

    fn render_i3bar(&self, segments: &[Segment], tick: u64) -> String {
        let blocks: Vec<I3barBlock> = segments
            .iter()
            .map(|segment| I3barBlock {
                full_text: &segment.field.text,
                name: &segment.key.kind,
                instance: segment.key.instance.as_deref(),
                color: self
                    .color_for(segment.field.color, segment.layout)
                    .and_then(i3bar_color),
                min_width: segment.layout.min_width,
                align: segment.layout.align.map(|a| a.as_str()),
            })
            .collect();

        match serde_json::to_string(&blocks) {
            Ok(json) => {
                let prefix = if tick > 0 { "," } else { "" };
                format!("{}{}\n", prefix, json)
            }
            Err(err) => self.render_failure(&StatusError::from(err), tick),
        }
    }

    /// A line made of a single degraded placeholder field
    pub fn render_failure(&self, err: &StatusError, tick: u64) -> String {
        let key = ModuleKey::new("swiftstatus", None);
        let layout = FieldLayout::default();
        let segment = Segment {
            key: &key,
            field: RenderedField::degraded(format!("error: {}", err)),
            layout: &layout,
        };
        match self.format {
            OutputFormat::I3bar => {
                let block = I3barBlock {
                    full_text: &segment.field.text,
                    name: &key.kind,
                    instance: None,
                    color: self.color_for(segment.field.color, &layout).and_then(i3bar_color),
                    min_width: None,
                    align: None,
                };
                let json = serde_json::to_string(&[block])
                    .unwrap_or_else(|_| "[{\"full_text\":\"error\"}]".to_string());
                let prefix = if tick > 0 { "," } else { "" };
                format!("{}{}\n", prefix, json)
            }
            OutputFormat::Term | OutputFormat::None => self.render_text(&[segment]),
        }
    }
}
