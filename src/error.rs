use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {message}", .path.display())]
    Read { path: PathBuf, message: String },
    #[error("failed to parse config {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },
    #[error("preset cycle: {}", .chain.join(" -> "))]
    PresetCycle { chain: Vec<String> },
    #[error("content patterns are empty after merging all configuration sources")]
    EmptyContent,
    #[error("invalid content pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },
    #[error("invalid value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

/// Fatal diagnostics. Any of these aborts stylesheet emission.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("invalid glob pattern '{pattern}': {message}")]
    GlobPattern { pattern: String, message: String },
    #[error("cyclic theme reference: {}", .cycle.join(" -> "))]
    CyclicThemeReference { cycle: Vec<String> },
    #[error("plugin '{plugin}' failed to load: {message}")]
    PluginLoad { plugin: String, message: String },
}

/// Every fatal error collected over one build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildError {
    pub errors: Vec<Error>,
}

impl BuildError {
    pub fn new(errors: Vec<Error>) -> Self {
        Self { errors }
    }
}

impl From<Error> for BuildError {
    fn from(error: Error) -> Self {
        Self::new(vec![error])
    }
}

impl From<Vec<Error>> for BuildError {
    fn from(errors: Vec<Error>) -> Self {
        Self::new(errors)
    }
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.errors.as_slice() {
            [] => f.write_str("build failed"),
            [single] => write!(f, "{}", single),
            many => {
                write!(f, "build failed with {} errors", many.len())?;
                for error in many {
                    write!(f, "\n  {}", error)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for BuildError {}

/// Non-fatal diagnostics; the scan keeps going.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    BinaryContent { path: PathBuf },
    Unreadable { path: PathBuf, message: String },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::BinaryContent { path } => {
                write!(f, "skipping binary file {}", path.display())
            }
            Warning::Unreadable { path, message } => {
                write!(f, "skipping unreadable file {}: {}", path.display(), message)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{BuildError, ConfigError, Error};

    #[test]
    fn cycle_message_names_every_step() {
        let error = Error::CyclicThemeReference {
            cycle: vec!["a".to_string(), "b".to_string(), "a".to_string()],
        };
        assert_eq!(error.to_string(), "cyclic theme reference: a -> b -> a");
    }

    #[test]
    fn build_error_lists_all_diagnostics() {
        let error = BuildError::new(vec![
            Error::Config(ConfigError::EmptyContent),
            Error::GlobPattern {
                pattern: "src/[".to_string(),
                message: "unclosed character class".to_string(),
            },
        ]);
        let text = error.to_string();
        assert!(text.starts_with("build failed with 2 errors"));
        assert!(text.contains("content patterns are empty"));
        assert!(text.contains("invalid glob pattern 'src/['"));
    }
}
