//! Built-in plugins.

pub mod core;
pub mod typography;

use crate::config::DarkMode;
use crate::plugin::Plugin;
use std::sync::Arc;

/// The plugins every build starts with, ahead of configured ones.
pub fn core_plugins(dark_mode: &DarkMode) -> Vec<Arc<dyn Plugin>> {
    let mut plugins = vec![core::variants(dark_mode.clone())];
    plugins.extend(core::utilities());
    plugins
}
