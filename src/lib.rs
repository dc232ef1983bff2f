//! Utility-class stylesheet generator.
//!
//! A build resolves configuration, scans content files for class candidates,
//! resolves the theme, runs plugins to fill the utility and variant
//! registries, then emits only the rules some candidate matched.

pub mod cli;
pub mod config;
pub mod css;
pub mod error;
pub mod extractor;
pub mod generator;
pub mod plugin;
pub mod plugins;
pub mod registry;
pub mod scanner;
pub mod theme;
pub mod variant;

pub use cli::{CliError, Command, parse_args, run, run_from_env};
pub use config::{Config, DarkMode, Important};
pub use error::{BuildError, ConfigError, Error, Warning};
pub use generator::{GenerateOptions, Generator, Stylesheet};
pub use plugin::{FnPlugin, Plugin, PluginCatalog, PluginRef};
pub use scanner::ScanOptions;
pub use theme::Theme;

use std::collections::BTreeSet;
use std::env;
use std::path::Path;
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    pub scan: ScanOptions,
    pub catalog: PluginCatalog,
    /// Overrides the configured `minify` when set.
    pub minify: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOutput {
    pub css: String,
    pub warnings: Vec<Warning>,
    pub files_scanned: usize,
    pub candidate_count: usize,
    pub rule_count: usize,
}

/// Runs one full build. Every fatal error found along the way is returned
/// together; partial output is never produced.
pub fn build(config: &Config, options: &BuildOptions) -> Result<BuildOutput, BuildError> {
    build_reporting(config, options, Vec::new())
}

/// Loads the configuration at `path` (and its presets) and builds it.
/// Config validation errors are reported together with scan, theme and
/// plugin errors.
pub fn build_from_path(path: &Path, options: &BuildOptions) -> Result<BuildOutput, BuildError> {
    let cwd = env::current_dir().map_err(|err| {
        BuildError::from(Error::from(ConfigError::Read {
            path: path.to_path_buf(),
            message: err.to_string(),
        }))
    })?;
    let (config, errors) = config::load_with_errors(path, &cwd)?;
    build_reporting(&config, options, errors)
}

/// Runs the build stages, adding their errors to the ones already found.
fn build_reporting(
    config: &Config,
    options: &BuildOptions,
    mut errors: Vec<Error>,
) -> Result<BuildOutput, BuildError> {
    let (scanned, theme) = rayon::join(
        || scanner::scan(&config.root, &config.content, &options.scan),
        || theme::resolve(&config.theme),
    );
    let configured = plugin::load(&config.plugins, &options.catalog);

    let scanned = scanned.map_err(|errs| errors.extend(errs)).ok();
    let theme = theme.map_err(|errs| errors.extend(errs)).ok();
    let configured = configured.map_err(|errs| errors.extend(errs)).ok();
    let (Some(scanned), Some(theme), Some(configured)) = (scanned, theme, configured) else {
        return Err(BuildError::new(errors));
    };
    if !errors.is_empty() {
        return Err(BuildError::new(errors));
    }

    let mut plugins: Vec<Arc<dyn Plugin>> = plugins::core_plugins(&config.dark_mode);
    plugins.extend(configured);
    let registries = plugin::register_all(&theme, &plugins)?;

    let candidates = scanned
        .candidates
        .iter()
        .map(|(raw, _)| raw)
        .chain(config.safelist.iter().map(String::as_str))
        .collect::<BTreeSet<_>>();

    let generate_options = GenerateOptions::from_config(config);
    let stylesheet = Generator::new(&registries, &generate_options).generate(candidates.iter().copied());
    let minify = options.minify.unwrap_or(config.minify);

    Ok(BuildOutput {
        css: stylesheet.to_css(minify),
        warnings: scanned.warnings,
        files_scanned: scanned.files.len(),
        candidate_count: scanned.candidates.len(),
        rule_count: stylesheet.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::{BuildOptions, build};
    use crate::config::{Config, DarkMode};
    use crate::error::Error;
    use crate::plugin::{FnPlugin, PluginCatalog, PluginRef};
    use crate::theme::ThemeValue;
    use std::fs;

    fn site() -> tempfile::TempDir {
        let dir = tempfile::tempdir().expect("temp dir should be created");
        fs::write(
            dir.path().join("index.html"),
            r#"<main class="p-4 m-2 unknown-token hover:text-center"></main>"#,
        )
        .expect("content should be written");
        dir
    }

    #[test]
    fn builds_only_matched_rules() {
        let dir = site();
        let config = Config::new(dir.path(), vec!["*.html".to_string()]);
        let output = build(&config, &BuildOptions::default()).expect("build should succeed");

        assert_eq!(output.files_scanned, 1);
        assert_eq!(output.rule_count, 3);
        assert!(output.css.contains(".p-4 {\n  padding: 1rem;\n}"));
        assert!(output.css.contains(".hover\\:text-center:hover"));
        assert!(!output.css.contains("unknown-token"));
    }

    #[test]
    fn safelist_adds_candidates_without_content() {
        let dir = site();
        let mut config = Config::new(dir.path(), vec!["*.html".to_string()]);
        config.safelist = vec!["flex".to_string()];
        let output = build(&config, &BuildOptions::default()).expect("build should succeed");
        assert!(output.css.contains(".flex {\n  display: flex;\n}"));
    }

    #[test]
    fn minify_option_overrides_config() {
        let dir = site();
        let config = Config::new(dir.path(), vec!["*.html".to_string()]);
        let options = BuildOptions {
            minify: Some(true),
            ..BuildOptions::default()
        };
        let output = build(&config, &options).expect("build should succeed");
        assert!(output.css.contains(".p-4{padding:1rem}"));
        assert!(!output.css.contains('\n'));
    }

    #[test]
    fn collects_errors_from_every_stage() {
        let dir = site();
        let mut config = Config::new(dir.path(), vec!["src/[".to_string()]);
        config.theme.overrides.insert("colors".to_string(), ThemeValue::reference("spacing"));
        config.theme.overrides.insert("spacing".to_string(), ThemeValue::reference("colors"));
        config.plugins = vec![PluginRef::named("missing")];

        let err = build(&config, &BuildOptions::default()).expect_err("build should fail");
        assert!(err.errors.iter().any(|e| matches!(e, Error::GlobPattern { .. })));
        assert!(err.errors.iter().any(|e| matches!(e, Error::CyclicThemeReference { .. })));
        assert!(err.errors.iter().any(|e| matches!(e, Error::PluginLoad { .. })));
    }

    #[test]
    fn configured_plugins_follow_core_plugins() {
        let dir = site();
        fs::write(dir.path().join("card.html"), r#"<div class="card"></div>"#)
            .expect("content should be written");
        let mut config = Config::new(dir.path(), vec!["*.html".to_string()]);
        config.dark_mode = DarkMode::Class(".dark".to_string());
        config.plugins = vec![
            PluginRef::inline(FnPlugin::new("card").with_utilities(|_, utilities| {
                utilities.add("card", &[("border-radius", "0.5rem")]);
                Ok(())
            })),
            PluginRef::named("typography"),
        ];
        let options = BuildOptions {
            catalog: PluginCatalog::builtin(),
            ..BuildOptions::default()
        };
        let output = build(&config, &options).expect("build should succeed");

        let padding = output.css.find(".p-4").expect("p-4 should be emitted");
        let card = output.css.find(".card").expect("card should be emitted");
        assert!(padding < card);
    }
}
