//! Status line modules and the registry that builds them
//!
//! A module turns its options plus a [`SystemMetricsProvider`] into one
//! [`RenderedField`]. New module types are added by registering a
//! constructor; nothing in the poller or renderer needs to change.

pub mod battery;
pub mod disk;
pub mod load;
pub mod memory;
pub mod network;
pub mod tztime;
pub mod watch;

use crate::collectors::SystemMetricsProvider;
use crate::config::ModuleInstance;
use crate::error::{Result, StatusError};
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Status colour tag of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusColor {
    Good,
    Bad,
    Degraded,
}

/// One module's output for one tick
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedField {
    pub text: String,
    pub color: Option<StatusColor>,
}

impl RenderedField {
    pub fn new(text: impl Into<String>, color: Option<StatusColor>) -> Self {
        RenderedField {
            text: text.into(),
            color,
        }
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(text, None)
    }

    pub fn good(text: impl Into<String>) -> Self {
        Self::new(text, Some(StatusColor::Good))
    }

    pub fn bad(text: impl Into<String>) -> Self {
        Self::new(text, Some(StatusColor::Bad))
    }

    pub fn degraded(text: impl Into<String>) -> Self {
        Self::new(text, Some(StatusColor::Degraded))
    }
}

/// A configured status line segment
pub trait Module: Send + Sync {
    /// Query the metrics this module needs and format them
    fn render(&self, metrics: &dyn SystemMetricsProvider) -> Result<RenderedField>;

    /// What to show when `render` fails
    fn fallback(&self) -> RenderedField;
}

/// Builds a module from its configured options
pub type ModuleConstructor = Arc<dyn Fn(&ModuleInstance) -> Result<Box<dyn Module>> + Send + Sync>;

/// Maps module type tags to constructors
#[derive(Clone, Default)]
pub struct ModuleRegistry {
    constructors: HashMap<String, ModuleConstructor>,
}

impl fmt::Debug for ModuleRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleRegistry")
            .field("kinds", &self.kinds())
            .finish()
    }
}

impl ModuleRegistry {
    /// An empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every built-in module type
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register("disk", disk::build);
        registry.register("wireless", network::build_wireless);
        registry.register("ethernet", network::build_ethernet);
        registry.register("battery", battery::build);
        registry.register("tztime", tztime::build);
        registry.register("time", tztime::build_local);
        registry.register("load", load::build);
        registry.register("memory", memory::build);
        registry.register("path_exists", watch::build_path_exists);
        registry.register("run_watch", watch::build_run_watch);
        registry
    }

    /// Add a module type, replacing any earlier constructor for `kind`
    pub fn register<F>(&mut self, kind: impl Into<String>, constructor: F)
    where
        F: Fn(&ModuleInstance) -> Result<Box<dyn Module>> + Send + Sync + 'static,
    {
        self.constructors.insert(kind.into(), Arc::new(constructor));
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.constructors.contains_key(kind)
    }

    /// Registered type tags, sorted
    pub fn kinds(&self) -> Vec<&str> {
        let mut kinds: Vec<&str> = self.constructors.keys().map(String::as_str).collect();
        kinds.sort_unstable();
        kinds
    }

    /// Construct the module for one configured instance
    pub fn build(&self, instance: &ModuleInstance) -> Result<Box<dyn Module>> {
        let constructor = self
            .constructors
            .get(instance.kind())
            .ok_or_else(|| StatusError::UnknownModuleType(instance.kind().to_string()))?;
        constructor(instance)
    }
}

/// Expand `~` in a configured path
pub(crate) fn expand_path(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collectors::FixedMetrics;
    use crate::config::{ModuleKey, Options};

    struct Hello;

    impl Module for Hello {
        fn render(&self, _metrics: &dyn SystemMetricsProvider) -> Result<RenderedField> {
            Ok(RenderedField::plain("hello"))
        }

        fn fallback(&self) -> RenderedField {
            RenderedField::bad("no hello")
        }
    }

    fn instance(kind: &str) -> ModuleInstance {
        ModuleInstance::new(ModuleKey::new(kind, None), Options::new())
    }

    #[test]
    fn unknown_type_is_rejected() {
        let registry = ModuleRegistry::with_defaults();
        match registry.build(&instance("volume")) {
            Err(StatusError::UnknownModuleType(kind)) => assert_eq!(kind, "volume"),
            Err(other) => panic!("unexpected error {other:?}"),
            Ok(_) => panic!("volume is not a built-in module"),
        }
    }

    #[test]
    fn third_party_types_can_register() {
        let mut registry = ModuleRegistry::with_defaults();
        registry.register("hello", |_instance: &ModuleInstance| -> Result<Box<dyn Module>> {
            Ok(Box::new(Hello))
        });
        let module = registry.build(&instance("hello")).unwrap();
        let field = module.render(&FixedMetrics::new()).unwrap();
        assert_eq!(field.text, "hello");
    }

    #[test]
    fn defaults_cover_builtin_types() {
        let registry = ModuleRegistry::with_defaults();
        for kind in ["disk", "wireless", "ethernet", "battery", "tztime", "time", "load", "memory", "path_exists", "run_watch"] {
            assert!(registry.contains(kind), "{kind} missing");
        }
        assert_eq!(registry.kinds().len(), 10);
    }
}
