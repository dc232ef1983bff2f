use crate::{BuildOptions, build_from_path};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

const DEFAULT_CONFIG: &str = "tailforge.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Build {
        config: Option<String>,
        out: Option<String>,
        minify: bool,
    },
    Help,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliError {
    pub message: String,
}

pub fn run(command: Command) -> Result<(), CliError> {
    match command {
        Command::Build {
            config,
            out,
            minify,
        } => run_build(config, out, minify),
        Command::Help => {
            print_help();
            Ok(())
        }
    }
}

pub fn run_from_env() -> Result<(), CliError> {
    let command = parse_args(env::args().skip(1))?;
    run(command)
}

/// `tailforge [config] [-o|--output path] [--minify]`. A bare invocation
/// builds the default config file.
pub fn parse_args<I>(args: I) -> Result<Command, CliError>
where
    I: IntoIterator<Item = String>,
{
    let args = args.into_iter().collect::<Vec<_>>();
    let mut config = None;
    let mut out = None;
    let mut minify = false;
    let mut idx = 0;

    while idx < args.len() {
        match args[idx].as_str() {
            "-h" | "--help" | "help" => return Ok(Command::Help),
            "--out" | "--output" | "-o" => {
                idx += 1;
                if idx >= args.len() {
                    return Err(CliError {
                        message: "build requires a value for --output".to_string(),
                    });
                }
                out = Some(args[idx].clone());
            }
            "--minify" | "-m" => minify = true,
            value if value.starts_with('-') => {
                return Err(CliError {
                    message: format!("unknown option: {}", value),
                });
            }
            value => {
                if config.is_some() {
                    return Err(CliError {
                        message: format!("unexpected argument: {}", value),
                    });
                }
                config = Some(value.to_string());
            }
        }
        idx += 1;
    }

    Ok(Command::Build {
        config,
        out,
        minify,
    })
}

fn run_build(config: Option<String>, out: Option<String>, minify: bool) -> Result<(), CliError> {
    let config_path = PathBuf::from(config.unwrap_or_else(|| DEFAULT_CONFIG.to_string()));
    let options = BuildOptions {
        minify: minify.then_some(true),
        ..BuildOptions::default()
    };

    let output = build_from_path(&config_path, &options).map_err(|err| {
        for error in &err.errors {
            eprintln!("error: {}", error);
        }
        CliError {
            message: format!(
                "build failed with {} error{}",
                err.errors.len(),
                if err.errors.len() == 1 { "" } else { "s" }
            ),
        }
    })?;

    for warning in &output.warnings {
        eprintln!("warning: {}", warning);
    }

    if let Some(out) = out {
        write_output(Path::new(&out), &output.css)?;
    } else {
        print!("{}", output.css);
    }

    eprintln!(
        "scanned {} files, found {} classes",
        output.files_scanned, output.candidate_count
    );

    Ok(())
}

fn write_output(path: &Path, css: &str) -> Result<(), CliError> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|err| CliError {
            message: format!("failed to create {}: {}", parent.display(), err),
        })?;
    }
    fs::write(path, css).map_err(|err| CliError {
        message: format!("failed to write {}: {}", path.display(), err),
    })
}

fn print_help() {
    println!("tailforge");
    println!();
    println!("USAGE:");
    println!("  tailforge [config] [--output <path>] [--minify]");
    println!();
    println!("The config defaults to ./{}; JSON configs are read by extension.", DEFAULT_CONFIG);
    println!();
    println!("EXAMPLES:");
    println!("  tailforge");
    println!("  tailforge site.toml --output dist/site.css");
    println!("  tailforge tailforge.json -o dist/site.css --minify");
}

#[cfg(test)]
mod tests {
    use super::{Command, parse_args};

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn bare_invocation_builds_default_config() {
        let command = parse_args(Vec::new()).expect("empty args should parse");
        assert_eq!(
            command,
            Command::Build {
                config: None,
                out: None,
                minify: false,
            }
        );
    }

    #[test]
    fn parses_config_output_and_minify() {
        let command = parse_args(args(&["site.toml", "-o", "dist/site.css", "--minify"]))
            .expect("build args should parse");
        assert_eq!(
            command,
            Command::Build {
                config: Some("site.toml".to_string()),
                out: Some("dist/site.css".to_string()),
                minify: true,
            }
        );
    }

    #[test]
    fn output_requires_a_value() {
        let err = parse_args(args(&["--output"])).expect_err("missing value should fail");
        assert_eq!(err.message, "build requires a value for --output");
    }

    #[test]
    fn rejects_unknown_options_and_extra_configs() {
        assert!(parse_args(args(&["--watch"])).is_err());
        assert!(parse_args(args(&["a.toml", "b.toml"])).is_err());
    }

    #[test]
    fn help_wins_anywhere() {
        let command = parse_args(args(&["site.toml", "--help"])).expect("help should parse");
        assert_eq!(command, Command::Help);
    }
}
