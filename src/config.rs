use crate::error::{ConfigError, Error};
use crate::plugin::PluginRef;
use crate::theme::{ThemeSources, ThemeTree, ThemeValue};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// One configuration source as written on disk.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawConfig {
    #[serde(default)]
    pub presets: Vec<String>,
    #[serde(default)]
    pub content: Option<RawContent>,
    #[serde(default)]
    pub theme: RawTheme,
    #[serde(default)]
    pub plugins: Vec<RawPlugin>,
    #[serde(default)]
    pub dark_mode: Option<RawDarkMode>,
    #[serde(default)]
    pub prefix: Option<String>,
    #[serde(default)]
    pub important: Option<RawImportant>,
    #[serde(default)]
    pub safelist: Vec<String>,
    #[serde(default)]
    pub blocklist: Vec<String>,
    #[serde(default)]
    pub minify: Option<bool>,
    /// Directory of the file this source was read from.
    #[serde(skip)]
    pub base_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawContent {
    Files(Vec<String>),
    Detailed {
        #[serde(default)]
        relative: bool,
        files: Vec<String>,
    },
}

/// `extend` merges on top of the defaults; every other key replaces the
/// default subtree of the same name.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawTheme {
    #[serde(default)]
    pub extend: serde_json::Map<String, serde_json::Value>,
    #[serde(flatten)]
    pub overrides: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawPlugin {
    Name(String),
    Detailed {
        name: String,
        #[serde(default)]
        options: serde_json::Value,
    },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawDarkMode {
    Strategy(String),
    Custom(Vec<String>),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawImportant {
    Flag(bool),
    Selector(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DarkMode {
    #[default]
    Media,
    /// Selector that marks dark mode on an ancestor, e.g. `.dark`.
    Class(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Important {
    #[default]
    Off,
    /// Every declaration gets `!important`.
    All,
    /// Every rule is scoped under this selector instead.
    Selector(String),
}

/// Merged, validated configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub content: Vec<String>,
    pub relative: bool,
    /// Directory content patterns are resolved against.
    pub root: PathBuf,
    pub theme: ThemeSources,
    pub plugins: Vec<PluginRef>,
    pub dark_mode: DarkMode,
    pub prefix: String,
    pub important: Important,
    pub safelist: Vec<String>,
    pub blocklist: Vec<String>,
    pub minify: bool,
}

impl Config {
    pub fn new(root: impl Into<PathBuf>, content: Vec<String>) -> Self {
        Self {
            content,
            relative: false,
            root: root.into(),
            theme: ThemeSources::default(),
            plugins: Vec::new(),
            dark_mode: DarkMode::default(),
            prefix: String::new(),
            important: Important::default(),
            safelist: Vec::new(),
            blocklist: Vec::new(),
            minify: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Toml,
    Json,
}

impl Format {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Format::Json,
            _ => Format::Toml,
        }
    }
}

pub fn parse_source(text: &str, format: Format, path: &Path) -> Result<RawConfig, ConfigError> {
    let parsed = match format {
        Format::Toml => toml::from_str::<RawConfig>(text).map_err(|err| err.to_string()),
        Format::Json => serde_json::from_str::<RawConfig>(text).map_err(|err| err.to_string()),
    };
    parsed.map_err(|message| ConfigError::Parse {
        path: path.to_path_buf(),
        message,
    })
}

/// Reads a config file and its presets, presets first.
pub fn load_sources(path: &Path) -> Result<Vec<RawConfig>, ConfigError> {
    let mut sources = Vec::new();
    load_into(path, &mut Vec::new(), &mut sources)?;
    Ok(sources)
}

fn load_into(
    path: &Path,
    chain: &mut Vec<PathBuf>,
    sources: &mut Vec<RawConfig>,
) -> Result<(), ConfigError> {
    let identity = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    if chain.contains(&identity) {
        let mut names = chain
            .iter()
            .map(|entry| entry.display().to_string())
            .collect::<Vec<_>>();
        names.push(identity.display().to_string());
        return Err(ConfigError::PresetCycle { chain: names });
    }

    let text = fs::read_to_string(path).map_err(|err| ConfigError::Read {
        path: path.to_path_buf(),
        message: err.to_string(),
    })?;
    let mut raw = parse_source(&text, Format::from_path(path), path)?;
    let base_dir = path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    raw.base_dir = Some(base_dir.clone());

    chain.push(identity);
    for preset in &raw.presets {
        load_into(&base_dir.join(preset), chain, sources)?;
    }
    chain.pop();
    sources.push(raw);
    Ok(())
}

/// Loads `path` with its presets and resolves them. Non-relative content
/// patterns resolve against `cwd`.
pub fn load(path: &Path, cwd: &Path) -> Result<Config, Vec<Error>> {
    let sources = load_sources(path).map_err(|err| vec![Error::from(err)])?;
    resolve(&sources, cwd)
}

/// Like [`load`], but validation errors come back next to the config instead
/// of replacing it. Only unreadable files, parse errors and preset cycles fail
/// outright.
pub fn load_with_errors(path: &Path, cwd: &Path) -> Result<(Config, Vec<Error>), Vec<Error>> {
    let sources = load_sources(path).map_err(|err| vec![Error::from(err)])?;
    Ok(resolve_with_errors(&sources, cwd))
}

/// Merges sources given lowest precedence first. All validation errors are
/// reported together.
pub fn resolve(sources: &[RawConfig], cwd: &Path) -> Result<Config, Vec<Error>> {
    let (config, errors) = resolve_with_errors(sources, cwd);
    if errors.is_empty() {
        Ok(config)
    } else {
        Err(errors)
    }
}

/// Merges sources and collects validation errors without stopping. Invalid
/// content patterns are reported and left out of the returned config.
///
/// Each source's patterns belong to that source's root: its own directory
/// when it declares `relative = true`, `cwd` otherwise. The last source that
/// declares content picks `root`; patterns from sources with another root are
/// anchored to theirs.
pub fn resolve_with_errors(sources: &[RawConfig], cwd: &Path) -> (Config, Vec<Error>) {
    let mut config = Config::new(cwd, Vec::new());
    let mut errors: Vec<Error> = Vec::new();
    let mut patterns: Vec<(PathBuf, &str)> = Vec::new();

    for source in sources {
        if let Some(content) = &source.content {
            let (relative, files) = match content {
                RawContent::Files(files) => (false, files),
                RawContent::Detailed { relative, files } => (*relative, files),
            };
            let (relative, root) = match (&source.base_dir, relative) {
                (Some(base_dir), true) => (true, base_dir.clone()),
                _ => (false, cwd.to_path_buf()),
            };
            patterns.extend(files.iter().map(|file| (root.clone(), file.as_str())));
            config.relative = relative;
            config.root = root;
        }

        for (key, value) in &source.theme.overrides {
            match ThemeValue::from_json(value) {
                Some(value) => {
                    config.theme.overrides.insert(key.clone(), value);
                }
                None => {
                    config.theme.overrides.remove(key);
                }
            }
        }
        if !source.theme.extend.is_empty() {
            let layer = source
                .theme
                .extend
                .iter()
                .filter_map(|(key, value)| ThemeValue::from_json(value).map(|v| (key.clone(), v)))
                .collect::<ThemeTree>();
            config.theme.extend.push(layer);
        }

        config
            .plugins
            .extend(source.plugins.iter().map(|plugin| match plugin {
                RawPlugin::Name(name) => PluginRef::named(name.as_str()),
                RawPlugin::Detailed { name, options } => PluginRef::Named {
                    name: name.clone(),
                    options: options.clone(),
                },
            }));

        if let Some(raw) = &source.dark_mode {
            match dark_mode(raw) {
                Ok(mode) => config.dark_mode = mode,
                Err(err) => errors.push(err.into()),
            }
        }
        if let Some(prefix) = &source.prefix {
            config.prefix = prefix.clone();
        }
        if let Some(important) = &source.important {
            config.important = match important {
                RawImportant::Flag(true) => Important::All,
                RawImportant::Flag(false) => Important::Off,
                RawImportant::Selector(selector) => Important::Selector(selector.clone()),
            };
        }
        if let Some(minify) = source.minify {
            config.minify = minify;
        }
        config.safelist.extend(source.safelist.iter().cloned());
        config.blocklist.extend(source.blocklist.iter().cloned());
    }

    if patterns.is_empty() {
        errors.push(ConfigError::EmptyContent.into());
    }
    for (root, pattern) in patterns {
        let glob = pattern.strip_prefix('!').unwrap_or(pattern);
        if let Err(err) = globset::Glob::new(glob) {
            errors.push(
                ConfigError::InvalidPattern {
                    pattern: pattern.to_string(),
                    message: err.kind().to_string(),
                }
                .into(),
            );
        } else if root == config.root {
            config.content.push(pattern.to_string());
        } else {
            config.content.push(anchor(&cwd.join(&root), pattern));
        }
    }

    (config, errors)
}

/// `pattern` rewritten to be absolute under `root`, keeping a leading `!`.
fn anchor(root: &Path, pattern: &str) -> String {
    let (negated, glob) = match pattern.strip_prefix('!') {
        Some(rest) => ("!", rest),
        None => ("", pattern),
    };
    if Path::new(glob).is_absolute() {
        return pattern.to_string();
    }
    let glob = glob.strip_prefix("./").unwrap_or(glob);
    let root = globset::escape(&root.to_string_lossy());
    format!("{}{}/{}", negated, root.trim_end_matches('/'), glob)
}

fn dark_mode(raw: &RawDarkMode) -> Result<DarkMode, ConfigError> {
    match raw {
        RawDarkMode::Strategy(strategy) => match strategy.as_str() {
            "media" => Ok(DarkMode::Media),
            "class" | "selector" => Ok(DarkMode::Class(".dark".to_string())),
            other => Err(ConfigError::InvalidValue {
                key: "darkMode".to_string(),
                message: format!("unknown strategy '{}'", other),
            }),
        },
        RawDarkMode::Custom(parts) => match parts.as_slice() {
            [strategy, selector] if strategy == "class" || strategy == "selector" => {
                Ok(DarkMode::Class(selector.clone()))
            }
            _ => Err(ConfigError::InvalidValue {
                key: "darkMode".to_string(),
                message: "expected [\"class\", \"<selector>\"]".to_string(),
            }),
        },
    }
}
