//! Plugin contract and host.
//!
//! Plugins only ever see the resolved [`Theme`] and a registrar. They run in
//! list order, each registering its variants and then its utilities, so a
//! later plugin can override a name an earlier one registered.

use crate::error::Error;
use crate::registry::{Registry, UtilityRegistrar};
use crate::theme::Theme;
use crate::variant::{VariantRegistrar, VariantRegistry};
use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

pub type PluginResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

pub trait Plugin: Send + Sync {
    fn name(&self) -> &str;

    fn register_variants(&self, _theme: &Theme, _variants: &mut VariantRegistrar<'_>) -> PluginResult {
        Ok(())
    }

    fn register_utilities(
        &self,
        _theme: &Theme,
        _utilities: &mut UtilityRegistrar<'_>,
    ) -> PluginResult {
        Ok(())
    }
}

type UtilityFn = dyn Fn(&Theme, &mut UtilityRegistrar<'_>) -> PluginResult + Send + Sync;
type VariantFn = dyn Fn(&Theme, &mut VariantRegistrar<'_>) -> PluginResult + Send + Sync;

/// A plugin assembled from closures.
pub struct FnPlugin {
    name: String,
    utilities: Option<Box<UtilityFn>>,
    variants: Option<Box<VariantFn>>,
}

impl FnPlugin {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            utilities: None,
            variants: None,
        }
    }

    pub fn with_utilities<F>(mut self, register: F) -> Self
    where
        F: Fn(&Theme, &mut UtilityRegistrar<'_>) -> PluginResult + Send + Sync + 'static,
    {
        self.utilities = Some(Box::new(register));
        self
    }

    pub fn with_variants<F>(mut self, register: F) -> Self
    where
        F: Fn(&Theme, &mut VariantRegistrar<'_>) -> PluginResult + Send + Sync + 'static,
    {
        self.variants = Some(Box::new(register));
        self
    }
}

impl Plugin for FnPlugin {
    fn name(&self) -> &str {
        &self.name
    }

    fn register_variants(&self, theme: &Theme, variants: &mut VariantRegistrar<'_>) -> PluginResult {
        match &self.variants {
            Some(register) => register(theme, variants),
            None => Ok(()),
        }
    }

    fn register_utilities(&self, theme: &Theme, utilities: &mut UtilityRegistrar<'_>) -> PluginResult {
        match &self.utilities {
            Some(register) => register(theme, utilities),
            None => Ok(()),
        }
    }
}

/// How configuration names a plugin.
#[derive(Clone)]
pub enum PluginRef {
    Named {
        name: String,
        options: serde_json::Value,
    },
    Inline(Arc<dyn Plugin>),
}

impl PluginRef {
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named {
            name: name.into(),
            options: serde_json::Value::Null,
        }
    }

    pub fn inline(plugin: impl Plugin + 'static) -> Self {
        Self::Inline(Arc::new(plugin))
    }

    pub fn name(&self) -> &str {
        match self {
            PluginRef::Named { name, .. } => name,
            PluginRef::Inline(plugin) => plugin.name(),
        }
    }
}

impl fmt::Debug for PluginRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PluginRef::Named { name, options } => f
                .debug_struct("Named")
                .field("name", name)
                .field("options", options)
                .finish(),
            PluginRef::Inline(plugin) => f.debug_tuple("Inline").field(&plugin.name()).finish(),
        }
    }
}

type Factory = dyn Fn(&serde_json::Value) -> Result<Arc<dyn Plugin>, String> + Send + Sync;

/// Named plugin factories available to configuration files.
#[derive(Clone)]
pub struct PluginCatalog {
    factories: BTreeMap<String, Arc<Factory>>,
}

impl PluginCatalog {
    pub fn empty() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }

    pub fn builtin() -> Self {
        let mut catalog = Self::empty();
        for name in ["typography", "@tailwindcss/typography"] {
            catalog.register(name, |options| {
                crate::plugins::typography::from_options(options)
                    .map(|plugin| Arc::new(plugin) as Arc<dyn Plugin>)
            });
        }
        catalog
    }

    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn(&serde_json::Value) -> Result<Arc<dyn Plugin>, String> + Send + Sync + 'static,
    {
        self.factories.insert(name.into(), Arc::new(factory));
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    pub fn instantiate(&self, reference: &PluginRef) -> Result<Arc<dyn Plugin>, Error> {
        match reference {
            PluginRef::Inline(plugin) => Ok(Arc::clone(plugin)),
            PluginRef::Named { name, options } => {
                let factory = self.factories.get(name).ok_or_else(|| Error::PluginLoad {
                    plugin: name.clone(),
                    message: "no plugin with this name is available".to_string(),
                })?;
                factory(options).map_err(|message| Error::PluginLoad {
                    plugin: name.clone(),
                    message,
                })
            }
        }
    }
}

impl Default for PluginCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl fmt::Debug for PluginCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

/// Instantiates every reference, collecting all failures.
pub fn load(references: &[PluginRef], catalog: &PluginCatalog) -> Result<Vec<Arc<dyn Plugin>>, Vec<Error>> {
    let mut plugins = Vec::with_capacity(references.len());
    let mut errors = Vec::new();
    for reference in references {
        match catalog.instantiate(reference) {
            Ok(plugin) => plugins.push(plugin),
            Err(error) => errors.push(error),
        }
    }
    if errors.is_empty() {
        Ok(plugins)
    } else {
        Err(errors)
    }
}

#[derive(Debug, Default)]
pub struct Registries {
    pub utilities: Registry,
    pub variants: VariantRegistry,
}

/// Runs every plugin in order. The first failing or panicking plugin aborts
/// with [`Error::PluginLoad`].
pub fn register_all(theme: &Theme, plugins: &[Arc<dyn Plugin>]) -> Result<Registries, Error> {
    let mut registries = Registries::default();
    for plugin in plugins {
        let name = plugin.name();
        guarded(name, || {
            plugin.register_variants(theme, &mut VariantRegistrar::new(&mut registries.variants, name))
        })?;
        guarded(name, || {
            plugin.register_utilities(
                theme,
                &mut UtilityRegistrar::new(&mut registries.utilities, name),
            )
        })?;
    }
    Ok(registries)
}

fn guarded<F>(plugin: &str, register: F) -> Result<(), Error>
where
    F: FnOnce() -> PluginResult,
{
    match panic::catch_unwind(AssertUnwindSafe(register)) {
        Ok(Ok(())) => Ok(()),
        Ok(Err(source)) => Err(Error::PluginLoad {
            plugin: plugin.to_string(),
            message: source.to_string(),
        }),
        Err(payload) => Err(Error::PluginLoad {
            plugin: plugin.to_string(),
            message: panic_message(payload.as_ref()),
        }),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        format!("panicked: {}", message)
    } else if let Some(message) = payload.downcast_ref::<String>() {
        format!("panicked: {}", message)
    } else {
        "panicked".to_string()
    }
}
