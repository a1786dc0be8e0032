//! System load averages

use super::{Module, RenderedField};
use crate::collectors::SystemMetricsProvider;
use crate::config::ModuleInstance;
use crate::error::Result;
use crate::utils::format::expand;

#[derive(Debug)]
pub struct Load {
    format: String,
    format_above_threshold: Option<String>,
    format_down: String,
    max_threshold: f64,
}

pub fn build(instance: &ModuleInstance) -> Result<Box<dyn Module>> {
    Ok(Box::new(Load {
        format: instance.string("format", "%1min %5min %15min"),
        format_above_threshold: instance.opt_string("format_above_threshold"),
        format_down: instance.string("format_down", "load: ?"),
        max_threshold: instance.float("max_threshold", 5.0)?,
    }))
}

impl Module for Load {
    fn render(&self, metrics: &dyn SystemMetricsProvider) -> Result<RenderedField> {
        let load = metrics.load_average()?;
        let values = [
            ("1min", format!("{:.2}", load.one)),
            ("5min", format!("{:.2}", load.five)),
            ("15min", format!("{:.2}", load.fifteen)),
        ];

        if load.one > self.max_threshold {
            let template = self.format_above_threshold.as_deref().unwrap_or(&self.format);
            Ok(RenderedField::bad(expand(template, &values)))
        } else {
            Ok(RenderedField::plain(expand(&self.format, &values)))
        }
    }

    fn fallback(&self) -> RenderedField {
        RenderedField::bad(self.format_down.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collectors::FixedMetrics;
    use crate::config::parse_config;
    use crate::modules::StatusColor;

    fn module(options: &str) -> Box<dyn Module> {
        let config = parse_config(&format!("order += \"load\" load {{ {} }}", options)).unwrap();
        build(&config.instances()[0]).unwrap()
    }

    #[test]
    fn default_format_shows_all_three() {
        let field = module("").render(&FixedMetrics::new().with_load(0.42, 0.3, 0.15)).unwrap();
        assert_eq!(field, RenderedField::plain("0.42 0.30 0.15"));
    }

    #[test]
    fn above_threshold_is_bad() {
        let load = module(r#"max_threshold = 1.5 format_above_threshold = "HOT %1min""#);
        let field = load.render(&FixedMetrics::new().with_load(2.0, 1.0, 1.0)).unwrap();
        assert_eq!(field, RenderedField::bad("HOT 2.00"));
    }

    #[test]
    fn unavailable_load_falls_back() {
        let load = module("");
        assert!(load.render(&FixedMetrics::new()).is_err());
        assert_eq!(load.fallback().color, Some(StatusColor::Bad));
    }
}
