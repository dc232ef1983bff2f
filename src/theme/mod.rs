//! Design-token theme: layered trees, lazy tokens and their resolution.
//!
//! A theme is built from three kinds of input:
//!
//! - the built-in defaults ([`defaults::default_theme`]),
//! - override keys (`theme.spacing = {...}`), which replace a whole default
//!   subtree,
//! - one `extend` tree per configuration source, merged on top additively.
//!
//! Defaults with overrides applied form layer 0; every `extend` tree is an
//! extra layer. The value at a path is the deep merge of that path in every
//! layer: maps merge key by key, lists concatenate, scalars of later layers
//! win.
//!
//! Tokens may be lazy: a function of the theme being resolved. Resolution is
//! an explicit depth-first walk with a visiting stack so a token that reaches
//! itself again fails with [`Error::CyclicThemeReference`] instead of looping.

pub mod defaults;

use crate::error::Error;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;

pub type ThemeTree = BTreeMap<String, ThemeValue>;

type LazyFn = dyn Fn(&mut ThemeResolver) -> Result<Option<ThemeValue>, Error> + Send + Sync;

/// A token computed from the rest of the theme on first use.
#[derive(Clone)]
pub struct LazyToken(Arc<LazyFn>);

impl fmt::Debug for LazyToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("LazyToken(..)")
    }
}

/// Unresolved theme value, as written in defaults or configuration.
#[derive(Debug, Clone)]
pub enum ThemeValue {
    Scalar(String),
    List(Vec<ThemeValue>),
    Map(ThemeTree),
    Lazy(LazyToken),
}

impl ThemeValue {
    pub fn scalar(value: impl Into<String>) -> Self {
        Self::Scalar(value.into())
    }

    pub fn map<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<ThemeValue>,
    {
        Self::Map(
            entries
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }

    pub fn lazy<F>(resolve: F) -> Self
    where
        F: Fn(&mut ThemeResolver) -> Result<Option<ThemeValue>, Error> + Send + Sync + 'static,
    {
        Self::Lazy(LazyToken(Arc::new(resolve)))
    }

    /// A token that reads another path, e.g. `spacing.4` or `spacing[0.5]`.
    pub fn reference(path: impl Into<String>) -> Self {
        let path = path.into();
        Self::lazy(move |theme| Ok(theme.get(&path)?.map(ThemeValue::from)))
    }

    /// Converts a configuration value. `"theme(path)"` strings become lazy
    /// references; `null` is dropped.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Null => None,
            serde_json::Value::Bool(flag) => Some(Self::Scalar(flag.to_string())),
            serde_json::Value::Number(number) => Some(Self::Scalar(number.to_string())),
            serde_json::Value::String(text) => Some(match parse_reference(text) {
                Some(path) => Self::reference(path),
                None => Self::Scalar(text.clone()),
            }),
            serde_json::Value::Array(items) => {
                Some(Self::List(items.iter().filter_map(Self::from_json).collect()))
            }
            serde_json::Value::Object(entries) => Some(Self::Map(
                entries
                    .iter()
                    .filter_map(|(key, value)| Self::from_json(value).map(|v| (key.clone(), v)))
                    .collect(),
            )),
        }
    }
}

impl From<&str> for ThemeValue {
    fn from(value: &str) -> Self {
        Self::Scalar(value.to_string())
    }
}

impl From<String> for ThemeValue {
    fn from(value: String) -> Self {
        Self::Scalar(value)
    }
}

impl From<Token> for ThemeValue {
    fn from(token: Token) -> Self {
        match token {
            Token::Scalar(value) => Self::Scalar(value),
            Token::List(items) => Self::List(items.into_iter().map(Self::from).collect()),
            Token::Map(entries) => Self::Map(
                entries
                    .into_iter()
                    .map(|(key, value)| (key, Self::from(value)))
                    .collect(),
            ),
        }
    }
}

/// Fully resolved theme value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Scalar(String),
    List(Vec<Token>),
    Map(BTreeMap<String, Token>),
}

impl Token {
    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            Token::Scalar(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, Token>> {
        match self {
            Token::Map(entries) => Some(entries),
            _ => None,
        }
    }

    pub fn get(&self, path: &str) -> Option<&Token> {
        self.lookup(&split_path(path))
    }

    fn lookup(&self, segments: &[String]) -> Option<&Token> {
        let mut current = self;
        for segment in segments {
            current = match current {
                Token::Map(entries) => entries.get(segment)?,
                Token::List(items) => items.get(segment.parse::<usize>().ok()?)?,
                Token::Scalar(_) => return None,
            };
        }
        Some(current)
    }

    fn descend(self, segments: &[String]) -> Option<Token> {
        let mut current = self;
        for segment in segments {
            current = match current {
                Token::Map(mut entries) => entries.remove(segment)?,
                Token::List(mut items) => {
                    let index = segment.parse::<usize>().ok()?;
                    if index >= items.len() {
                        return None;
                    }
                    items.swap_remove(index)
                }
                Token::Scalar(_) => return None,
            };
        }
        Some(current)
    }

    /// Layer merge: maps deep-merge, lists concatenate, otherwise `other` wins.
    pub fn merge(self, other: Token) -> Token {
        match (self, other) {
            (Token::Map(mut base), Token::Map(extension)) => {
                for (key, value) in extension {
                    let merged = match base.remove(&key) {
                        Some(existing) => existing.merge(value),
                        None => value,
                    };
                    base.insert(key, merged);
                }
                Token::Map(base)
            }
            (Token::List(mut base), Token::List(extension)) => {
                base.extend(extension);
                Token::List(base)
            }
            (_, other) => other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provenance {
    Default,
    Extend,
    Override,
}

/// Raw theme inputs, merged but not yet resolved.
#[derive(Debug, Clone)]
pub struct ThemeSources {
    pub defaults: ThemeTree,
    pub overrides: ThemeTree,
    pub extend: Vec<ThemeTree>,
}

impl Default for ThemeSources {
    fn default() -> Self {
        Self {
            defaults: defaults::default_theme(),
            overrides: ThemeTree::new(),
            extend: Vec::new(),
        }
    }
}

impl ThemeSources {
    fn layers(&self) -> Vec<ThemeTree> {
        let mut base = self.defaults.clone();
        for (key, value) in &self.overrides {
            base.insert(key.clone(), value.clone());
        }
        let mut layers = Vec::with_capacity(self.extend.len() + 1);
        layers.push(base);
        layers.extend(self.extend.iter().cloned());
        layers
    }

    fn provenance(&self, key: &str) -> Provenance {
        if self.extend.iter().any(|tree| tree.contains_key(key)) {
            Provenance::Extend
        } else if self.overrides.contains_key(key) {
            Provenance::Override
        } else {
            Provenance::Default
        }
    }
}

/// Read-only resolved theme handed to plugins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Theme {
    tokens: BTreeMap<String, Token>,
    provenance: BTreeMap<String, Provenance>,
}

impl Theme {
    pub fn get(&self, path: &str) -> Option<&Token> {
        let segments = split_path(path);
        let (first, rest) = segments.split_first()?;
        self.tokens.get(first)?.lookup(rest)
    }

    pub fn scalar(&self, path: &str) -> Option<&str> {
        self.get(path).and_then(Token::as_scalar)
    }

    /// Flattens a map into `name → value` pairs. Nested keys join with `-`
    /// and `DEFAULT` collapses onto its parent, so `colors` yields
    /// `red-500 → #ef4444`. List values contribute their first item.
    pub fn scale(&self, path: &str) -> Vec<(String, String)> {
        let mut out = Vec::new();
        if let Some(token) = self.get(path) {
            flatten_into("", token, &mut out);
        }
        out
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.tokens.keys().map(String::as_str)
    }

    pub fn provenance(&self, key: &str) -> Option<Provenance> {
        self.provenance.get(key).copied()
    }
}

fn flatten_into(prefix: &str, token: &Token, out: &mut Vec<(String, String)>) {
    match token {
        Token::Scalar(value) => out.push((prefix.to_string(), value.clone())),
        Token::List(items) => {
            if let Some(Token::Scalar(first)) = items.first() {
                out.push((prefix.to_string(), first.clone()));
            }
        }
        Token::Map(entries) => {
            for (key, child) in entries {
                let name = if key == "DEFAULT" {
                    prefix.to_string()
                } else if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{}-{}", prefix, key)
                };
                flatten_into(&name, child, out);
            }
        }
    }
}

enum Located {
    Missing,
    Static(ThemeValue),
    Lazy(LazyToken, usize),
}

/// Lazy tokens producing further lazy tokens for one path, before the chain
/// counts as a cycle.
const MAX_LAZY_CHAIN: usize = 64;

/// Depth-first resolver over the theme layers. Lazy tokens receive it to
/// look up the paths they depend on.
pub struct ThemeResolver {
    layers: Vec<ThemeTree>,
    resolved: HashMap<Vec<String>, Option<Token>>,
    evaluated: HashMap<(usize, Vec<String>), Option<Token>>,
    visiting: Vec<(usize, Vec<String>)>,
}

impl ThemeResolver {
    pub fn new(sources: &ThemeSources) -> Self {
        Self {
            layers: sources.layers(),
            resolved: HashMap::new(),
            evaluated: HashMap::new(),
            visiting: Vec::new(),
        }
    }

    /// Merged value at `path` across every layer. A missing path is `None`.
    pub fn get(&mut self, path: &str) -> Result<Option<Token>, Error> {
        self.get_segments(&split_path(path))
    }

    fn get_segments(&mut self, segments: &[String]) -> Result<Option<Token>, Error> {
        if segments.is_empty() {
            return Ok(None);
        }
        if let Some(hit) = self.resolved.get(segments) {
            return Ok(hit.clone());
        }

        let mut merged: Option<Token> = None;
        for layer in 0..self.layers.len() {
            if let Some(token) = self.layer_value(layer, segments)? {
                merged = Some(match merged {
                    Some(base) => base.merge(token),
                    None => token,
                });
            }
        }

        self.resolved.insert(segments.to_vec(), merged.clone());
        Ok(merged)
    }

    fn locate(&self, layer: usize, segments: &[String]) -> Located {
        let Some(mut node) = self.layers[layer].get(&segments[0]) else {
            return Located::Missing;
        };
        let mut depth = 1;
        loop {
            if let ThemeValue::Lazy(lazy) = node {
                return Located::Lazy(lazy.clone(), depth);
            }
            if depth == segments.len() {
                return Located::Static(node.clone());
            }
            match node {
                ThemeValue::Map(children) => match children.get(&segments[depth]) {
                    Some(child) => {
                        node = child;
                        depth += 1;
                    }
                    None => return Located::Missing,
                },
                _ => return Located::Missing,
            }
        }
    }

    fn layer_value(&mut self, layer: usize, segments: &[String]) -> Result<Option<Token>, Error> {
        match self.locate(layer, segments) {
            Located::Missing => Ok(None),
            Located::Static(value) => self.realize(layer, segments, value),
            Located::Lazy(lazy, consumed) => {
                let token = self.evaluate(layer, &segments[..consumed], &lazy)?;
                Ok(token.and_then(|token| token.descend(&segments[consumed..])))
            }
        }
    }

    fn realize(
        &mut self,
        layer: usize,
        path: &[String],
        value: ThemeValue,
    ) -> Result<Option<Token>, Error> {
        match value {
            ThemeValue::Scalar(value) => Ok(Some(Token::Scalar(value))),
            ThemeValue::List(items) => {
                let mut out = Vec::with_capacity(items.len());
                for (index, item) in items.into_iter().enumerate() {
                    let child = child_path(path, &index.to_string());
                    if let Some(token) = self.realize(layer, &child, item)? {
                        out.push(token);
                    }
                }
                Ok(Some(Token::List(out)))
            }
            ThemeValue::Map(entries) => {
                let mut out = BTreeMap::new();
                for (key, item) in entries {
                    let child = child_path(path, &key);
                    if let Some(token) = self.realize(layer, &child, item)? {
                        out.insert(key, token);
                    }
                }
                Ok(Some(Token::Map(out)))
            }
            ThemeValue::Lazy(lazy) => self.evaluate(layer, path, &lazy),
        }
    }

    fn evaluate(
        &mut self,
        layer: usize,
        path: &[String],
        lazy: &LazyToken,
    ) -> Result<Option<Token>, Error> {
        let key = (layer, path.to_vec());
        if let Some(hit) = self.evaluated.get(&key) {
            return Ok(hit.clone());
        }
        if let Some(start) = self.visiting.iter().position(|entry| *entry == key) {
            let mut cycle = self.visiting[start..]
                .iter()
                .map(|(_, segments)| display_path(segments))
                .collect::<Vec<_>>();
            cycle.push(display_path(path));
            return Err(Error::CyclicThemeReference { cycle });
        }

        self.visiting.push(key.clone());
        let mut chain = vec![lazy.clone()];
        let mut produced = (lazy.0)(self);
        while let Ok(Some(ThemeValue::Lazy(next))) = &produced {
            let repeats = chain.iter().any(|seen| Arc::ptr_eq(&seen.0, &next.0));
            if repeats || chain.len() >= MAX_LAZY_CHAIN {
                produced = Err(Error::CyclicThemeReference {
                    cycle: vec![display_path(path), display_path(path)],
                });
                break;
            }
            let next = next.clone();
            chain.push(next.clone());
            produced = (next.0)(self);
        }
        let outcome = match produced {
            Ok(Some(value)) => self.realize(layer, path, value),
            Ok(None) => Ok(None),
            Err(error) => Err(error),
        };
        self.visiting.pop();

        if let Ok(token) = &outcome {
            self.evaluated.insert(key, token.clone());
        }
        outcome
    }
}

/// Resolves every top-level key. All distinct cycles are reported together.
pub fn resolve(sources: &ThemeSources) -> Result<Theme, Vec<Error>> {
    let mut resolver = ThemeResolver::new(sources);
    let keys = resolver
        .layers
        .iter()
        .flat_map(|layer| layer.keys().cloned())
        .collect::<BTreeSet<_>>();

    let mut theme = Theme::default();
    let mut errors = Vec::new();
    for key in keys {
        match resolver.get_segments(std::slice::from_ref(&key)) {
            Ok(Some(token)) => {
                theme.provenance.insert(key.clone(), sources.provenance(&key));
                theme.tokens.insert(key, token);
            }
            Ok(None) => {}
            Err(error) => {
                let error = canonical_cycle(error);
                if !errors.contains(&error) {
                    errors.push(error);
                }
            }
        }
    }

    if errors.is_empty() {
        Ok(theme)
    } else {
        Err(errors)
    }
}

/// Rotates a cycle to start at its smallest path so `a -> b -> a` and
/// `b -> a -> b` compare equal.
fn canonical_cycle(error: Error) -> Error {
    match error {
        Error::CyclicThemeReference { mut cycle } if cycle.len() > 1 => {
            cycle.pop();
            let start = cycle
                .iter()
                .enumerate()
                .min_by(|left, right| left.1.cmp(right.1))
                .map(|(idx, _)| idx)
                .unwrap_or(0);
            cycle.rotate_left(start);
            if let Some(first) = cycle.first().cloned() {
                cycle.push(first);
            }
            Error::CyclicThemeReference { cycle }
        }
        other => other,
    }
}

/// `theme(spacing.4)`, `theme('spacing[0.5]')` → the path inside.
pub fn parse_reference(value: &str) -> Option<&str> {
    let inner = value
        .trim()
        .strip_prefix("theme(")?
        .strip_suffix(')')?
        .trim();
    let inner = inner
        .strip_prefix(['\'', '"'])
        .and_then(|rest| rest.strip_suffix(['\'', '"']))
        .unwrap_or(inner);
    if inner.is_empty() { None } else { Some(inner) }
}

/// Splits `a.b[0.5].c` into `["a", "b", "0.5", "c"]`.
pub fn split_path(path: &str) -> Vec<String> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut chars = path.chars();

    while let Some(ch) = chars.next() {
        match ch {
            '.' => {
                if !current.is_empty() {
                    segments.push(std::mem::take(&mut current));
                }
            }
            '[' => {
                if !current.is_empty() {
                    segments.push(std::mem::take(&mut current));
                }
                let mut inner = String::new();
                for next in chars.by_ref() {
                    if next == ']' {
                        break;
                    }
                    inner.push(next);
                }
                let inner = inner.trim().trim_matches(['\'', '"']);
                if !inner.is_empty() {
                    segments.push(inner.to_string());
                }
            }
            _ => current.push(ch),
        }
    }
    if !current.is_empty() {
        segments.push(current);
    }

    segments
}

fn display_path(segments: &[String]) -> String {
    let mut out = String::new();
    for (idx, segment) in segments.iter().enumerate() {
        if segment.contains('.') {
            out.push('[');
            out.push_str(segment);
            out.push(']');
        } else {
            if idx > 0 {
                out.push('.');
            }
            out.push_str(segment);
        }
    }
    out
}

fn child_path(path: &[String], key: &str) -> Vec<String> {
    let mut child = Vec::with_capacity(path.len() + 1);
    child.extend_from_slice(path);
    child.push(key.to_string());
    child
}
