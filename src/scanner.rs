use crate::error::{Error, Warning};
use crate::extractor::{self, CandidateSet};
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;
use rayon::prelude::*;
use std::collections::BTreeSet;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Bytes inspected for a NUL when deciding whether a file is binary.
const BINARY_SNIFF_LEN: usize = 8000;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanOptions {
    pub respect_gitignore: bool,
    pub follow_links: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanResult {
    pub candidates: CandidateSet,
    /// Scanned files; the index is the file id in candidate origins.
    pub files: Vec<PathBuf>,
    pub warnings: Vec<Warning>,
}

/// Expands `patterns` against `root`, then reads and tokenizes every matched
/// file in parallel.
pub fn scan(root: &Path, patterns: &[String], options: &ScanOptions) -> Result<ScanResult, Vec<Error>> {
    let files = discover(root, patterns, options)?;

    let (candidates, mut warnings) = files
        .par_iter()
        .enumerate()
        .map(|(id, path)| scan_file(id, path))
        .reduce(
            || (CandidateSet::new(), Vec::new()),
            |(left, mut left_warnings), (right, right_warnings)| {
                left_warnings.extend(right_warnings);
                (left.merge(right), left_warnings)
            },
        );
    warnings.sort_by(|left, right| warning_path(left).cmp(warning_path(right)));

    Ok(ScanResult {
        candidates,
        files,
        warnings,
    })
}

/// Matched files, deduplicated and sorted. Zero matches is not an error.
pub fn discover(root: &Path, patterns: &[String], options: &ScanOptions) -> Result<Vec<PathBuf>, Vec<Error>> {
    let root = absolute_root(root);
    let mut includes = Vec::new();
    let mut excludes = Vec::new();
    for pattern in patterns {
        match pattern.strip_prefix('!') {
            Some(excluded) => excludes.push((pattern.as_str(), absolute_pattern(&root, excluded))),
            None => includes.push((pattern.as_str(), absolute_pattern(&root, pattern))),
        }
    }

    let (include_set, exclude_set) = match (build_globset(&includes), build_globset(&excludes)) {
        (Ok(include_set), Ok(exclude_set)) => (include_set, exclude_set),
        (include, exclude) => {
            let mut errors = include.err().unwrap_or_default();
            errors.extend(exclude.err().unwrap_or_default());
            return Err(errors);
        }
    };

    let roots = walk_roots(includes.iter().map(|(_, pattern)| glob_root(pattern)));
    let Some((first, rest)) = roots.split_first() else {
        return Ok(Vec::new());
    };

    let mut builder = WalkBuilder::new(first);
    for extra in rest {
        builder.add(extra);
    }
    builder
        .standard_filters(false)
        .hidden(false)
        .follow_links(options.follow_links)
        .git_ignore(options.respect_gitignore)
        .git_global(options.respect_gitignore)
        .git_exclude(options.respect_gitignore)
        .require_git(false);

    let mut files = BTreeSet::new();
    for entry in builder.build() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(_) => continue,
        };
        if !entry.file_type().map(|ft| ft.is_file()).unwrap_or(false) {
            continue;
        }
        let path = entry.path();
        let candidate = normalize_dots(&path.to_string_lossy());
        if include_set.is_match(&candidate) && !exclude_set.is_match(&candidate) {
            files.insert(path.to_path_buf());
        }
    }

    Ok(files.into_iter().collect())
}

fn scan_file(id: usize, path: &Path) -> (CandidateSet, Vec<Warning>) {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) => {
            return (
                CandidateSet::new(),
                vec![Warning::Unreadable {
                    path: path.to_path_buf(),
                    message: err.to_string(),
                }],
            );
        }
    };
    let sniff = &bytes[..bytes.len().min(BINARY_SNIFF_LEN)];
    if sniff.contains(&0) {
        return (
            CandidateSet::new(),
            vec![Warning::BinaryContent {
                path: path.to_path_buf(),
            }],
        );
    }
    let text = String::from_utf8_lossy(&bytes);
    (extractor::extract(&text, id), Vec::new())
}

fn warning_path(warning: &Warning) -> &Path {
    match warning {
        Warning::BinaryContent { path } | Warning::Unreadable { path, .. } => path,
    }
}

fn build_globset(patterns: &[(&str, String)]) -> Result<GlobSet, Vec<Error>> {
    let mut builder = GlobSetBuilder::new();
    let mut errors = Vec::new();
    for (original, pattern) in patterns {
        match GlobBuilder::new(pattern).literal_separator(true).build() {
            Ok(glob) => {
                builder.add(glob);
            }
            Err(err) => errors.push(Error::GlobPattern {
                pattern: original.to_string(),
                message: err.kind().to_string(),
            }),
        }
    }
    if !errors.is_empty() {
        return Err(errors);
    }
    builder.build().map_err(|err| {
        vec![Error::GlobPattern {
            pattern: patterns
                .iter()
                .map(|(original, _)| *original)
                .collect::<Vec<_>>()
                .join(", "),
            message: err.to_string(),
        }]
    })
}

fn absolute_root(root: &Path) -> PathBuf {
    if root.is_absolute() {
        return root.to_path_buf();
    }
    env::current_dir()
        .map(|cwd| cwd.join(root))
        .unwrap_or_else(|_| root.to_path_buf())
}

/// Joins a pattern onto the root and folds `.` and `..` segments.
fn absolute_pattern(root: &Path, pattern: &str) -> String {
    let pattern = pattern.strip_prefix("./").unwrap_or(pattern);
    if Path::new(pattern).is_absolute() {
        return normalize_dots(pattern);
    }
    let root = root.to_string_lossy();
    normalize_dots(&format!("{}/{}", root.trim_end_matches('/'), pattern))
}

fn normalize_dots(path: &str) -> String {
    let absolute = path.starts_with('/');
    let mut parts: Vec<&str> = Vec::new();
    for part in path.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                if parts.last().is_some_and(|last| *last != ".." && !has_glob_meta(last)) {
                    parts.pop();
                } else if !absolute {
                    parts.push(part);
                }
            }
            _ => parts.push(part),
        }
    }
    let joined = parts.join("/");
    if absolute {
        format!("/{}", joined)
    } else if joined.is_empty() {
        ".".to_string()
    } else {
        joined
    }
}

fn has_glob_meta(segment: &str) -> bool {
    segment.contains(['*', '?', '[', '{'])
}

/// Literal directory prefix of a pattern: the only part that needs walking.
fn glob_root(pattern: &str) -> PathBuf {
    let Some(first_meta) = pattern.find(['*', '?', '[', '{']) else {
        let path = Path::new(pattern);
        if path.extension().is_some() {
            return path.parent().unwrap_or(Path::new("/")).to_path_buf();
        }
        return path.to_path_buf();
    };

    let prefix = &pattern[..first_meta];
    match prefix.rfind('/') {
        Some(0) => PathBuf::from("/"),
        Some(idx) => PathBuf::from(&pattern[..idx]),
        None => PathBuf::from("."),
    }
}

/// Deduplicated walk roots with nested roots folded into their ancestor.
fn walk_roots(roots: impl Iterator<Item = PathBuf>) -> Vec<PathBuf> {
    let sorted = roots.collect::<BTreeSet<_>>();
    let mut kept: Vec<PathBuf> = Vec::new();
    for root in sorted {
        if kept.iter().any(|ancestor| root.starts_with(ancestor)) {
            continue;
        }
        kept.push(root);
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::{
        ScanOptions, absolute_pattern, discover, glob_root, normalize_dots, scan, walk_roots,
    };
    use crate::error::{Error, Warning};
    use std::fs;
    use std::path::{Path, PathBuf};

    fn write(root: &Path, relative: &str, contents: &[u8]) {
        let path = root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("parent dirs should be created");
        }
        fs::write(path, contents).expect("file should be written");
    }

    fn patterns(items: &[&str]) -> Vec<String> {
        items.iter().map(|item| item.to_string()).collect()
    }

    #[test]
    fn scans_glob_patterns() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        write(dir.path(), "index.html", br#"<div class="p-4"></div>"#);
        write(dir.path(), "app/src/lib.rs", br#"view! { <p class="m-2"/> }"#);
        write(dir.path(), "app/src/deep/mod.rs", br#"class="flex""#);
        write(dir.path(), "app/README.md", b"grid");

        let result = scan(
            dir.path(),
            &patterns(&["*.html", "./app/src/**/*.rs"]),
            &ScanOptions::default(),
        )
        .expect("scan should succeed");

        assert_eq!(result.files.len(), 3);
        assert!(result.candidates.contains("p-4"));
        assert!(result.candidates.contains("m-2"));
        assert!(result.candidates.contains("flex"));
        assert!(!result.candidates.contains("grid"));
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn single_star_does_not_cross_directories() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        write(dir.path(), "a.html", b"");
        write(dir.path(), "nested/b.html", b"");

        let files = discover(dir.path(), &patterns(&["*.html"]), &ScanOptions::default())
            .expect("discover should succeed");
        assert_eq!(files, vec![dir.path().join("a.html")]);
    }

    #[test]
    fn expands_alternations_and_exclusions() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        write(dir.path(), "src/a.rs", b"");
        write(dir.path(), "src/b.html", b"");
        write(dir.path(), "src/generated/c.rs", b"");
        write(dir.path(), "src/d.css", b"");

        let files = discover(
            dir.path(),
            &patterns(&["src/**/*.{rs,html}", "!src/generated/**"]),
            &ScanOptions::default(),
        )
        .expect("discover should succeed");
        assert_eq!(
            files,
            vec![dir.path().join("src/a.rs"), dir.path().join("src/b.html")]
        );
    }

    #[test]
    fn overlapping_patterns_yield_each_file_once() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        write(dir.path(), "src/a.rs", b"");

        let files = discover(
            dir.path(),
            &patterns(&["src/**/*.rs", "src/*.rs", "**/a.rs"]),
            &ScanOptions::default(),
        )
        .expect("discover should succeed");
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn zero_matches_is_not_an_error() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let result = scan(dir.path(), &patterns(&["missing/**/*.html"]), &ScanOptions::default())
            .expect("scan should succeed");
        assert!(result.files.is_empty());
        assert!(result.candidates.is_empty());
    }

    #[test]
    fn collects_every_malformed_pattern() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let errors = scan(
            dir.path(),
            &patterns(&["src/[.html", "ok/*.html", "!{a,b"]),
            &ScanOptions::default(),
        )
        .expect_err("malformed patterns should fail");
        let reported = errors
            .iter()
            .map(|error| match error {
                Error::GlobPattern { pattern, .. } => pattern.as_str(),
                other => panic!("unexpected error: {other:?}"),
            })
            .collect::<Vec<_>>();
        assert_eq!(reported, vec!["src/[.html", "!{a,b"]);
    }

    #[test]
    fn binary_files_are_skipped_with_warning() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        write(dir.path(), "image.html", b"flex\0\x01\x02");
        write(dir.path(), "page.html", b"grid");

        let result = scan(dir.path(), &patterns(&["*.html"]), &ScanOptions::default())
            .expect("scan should succeed");
        assert!(result.candidates.contains("grid"));
        assert!(!result.candidates.contains("flex"));
        assert_eq!(
            result.warnings,
            vec![Warning::BinaryContent {
                path: dir.path().join("image.html"),
            }]
        );
    }

    #[test]
    fn gitignore_is_opt_in() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        write(dir.path(), ".gitignore", b"ignored.html\n");
        write(dir.path(), "ignored.html", b"flex");
        write(dir.path(), "kept.html", b"grid");

        let all = discover(dir.path(), &patterns(&["*.html"]), &ScanOptions::default())
            .expect("discover should succeed");
        assert_eq!(all.len(), 2);

        let options = ScanOptions {
            respect_gitignore: true,
            ..ScanOptions::default()
        };
        let filtered = discover(dir.path(), &patterns(&["*.html"]), &options)
            .expect("discover should succeed");
        assert_eq!(filtered, vec![dir.path().join("kept.html")]);
    }

    #[test]
    fn normalizes_patterns_against_root() {
        let root = Path::new("/project/site");
        assert_eq!(absolute_pattern(root, "./app/**/*.rs"), "/project/site/app/**/*.rs");
        assert_eq!(absolute_pattern(root, "../shared/*.html"), "/project/shared/*.html");
        assert_eq!(absolute_pattern(root, "/abs/*.html"), "/abs/*.html");
        assert_eq!(normalize_dots("a/./b/../c"), "a/c");
    }

    #[test]
    fn walk_roots_are_literal_prefixes() {
        assert_eq!(glob_root("/p/app/src/**/*.rs"), PathBuf::from("/p/app/src"));
        assert_eq!(glob_root("/p/*.html"), PathBuf::from("/p"));
        assert_eq!(glob_root("/p/index.html"), PathBuf::from("/p"));
        assert_eq!(glob_root("/*.html"), PathBuf::from("/"));

        let roots = walk_roots(
            vec![
                PathBuf::from("/p/app/src"),
                PathBuf::from("/p"),
                PathBuf::from("/p"),
                PathBuf::from("/q"),
            ]
            .into_iter(),
        );
        assert_eq!(roots, vec![PathBuf::from("/p"), PathBuf::from("/q")]);
    }
}
