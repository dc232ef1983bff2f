//! Variant registry and candidate expansion.
//!
//! A candidate is `variant:variant:base`. Each variant either rewrites the
//! selector (`&:hover`) or wraps the rule in an at-rule
//! (`@media (min-width: 768px)`). Variants are expanded per candidate on
//! demand, so the registry never holds a combination table.
//!
//! The variant chain is canonicalized by rank, highest first: `hover:md:p-4`
//! and `md:hover:p-4` are the same rule. Selector transforms apply in that
//! order and at-rules nest outermost first.

use crate::registry::decode_arbitrary;
use std::collections::HashMap;

pub const ARBITRARY_SELECTOR_RANK: u32 = 90;
pub const ARBITRARY_AT_RULE_RANK: u32 = 650;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VariantTransform {
    /// Template with `&` standing for the selector so far.
    Selector(String),
    /// At-rule prelude, e.g. `@media print`.
    AtRule(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variant {
    pub name: String,
    pub transform: VariantTransform,
    pub rank: u32,
}

#[derive(Debug, Default)]
pub struct VariantRegistry {
    variants: HashMap<String, Variant>,
}

impl VariantRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, variant: Variant) {
        self.variants.insert(variant.name.clone(), variant);
    }

    pub fn get(&self, name: &str) -> Option<&Variant> {
        self.variants.get(name)
    }

    pub fn len(&self) -> usize {
        self.variants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }
}

/// Plugin-facing handle for adding variants.
pub struct VariantRegistrar<'a> {
    registry: &'a mut VariantRegistry,
    plugin: &'a str,
}

impl<'a> VariantRegistrar<'a> {
    pub fn new(registry: &'a mut VariantRegistry, plugin: &'a str) -> Self {
        Self { registry, plugin }
    }

    pub fn plugin(&self) -> &str {
        self.plugin
    }

    pub fn add_selector(&mut self, name: impl Into<String>, template: impl Into<String>, rank: u32) {
        self.registry.register(Variant {
            name: name.into(),
            transform: VariantTransform::Selector(template.into()),
            rank,
        });
    }

    pub fn add_at_rule(&mut self, name: impl Into<String>, prelude: impl Into<String>, rank: u32) {
        self.registry.register(Variant {
            name: name.into(),
            transform: VariantTransform::AtRule(prelude.into()),
            rank,
        });
    }
}

/// A candidate split into its canonical variant chain and base utility.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expansion {
    pub variants: Vec<Variant>,
    pub base: String,
}

impl Expansion {
    /// `md:hover:` for any spelling of the same chain.
    pub fn canonical_prefix(&self) -> String {
        self.variants
            .iter()
            .map(|variant| format!("{}:", variant.name))
            .collect()
    }

    pub fn ranks(&self) -> Vec<u32> {
        self.variants.iter().map(|variant| variant.rank).collect()
    }

    pub fn apply_selector(&self, selector: &str) -> String {
        self.variants
            .iter()
            .fold(selector.to_string(), |current, variant| match &variant.transform {
                VariantTransform::Selector(template) => template.replace('&', &current),
                VariantTransform::AtRule(_) => current,
            })
    }

    pub fn at_rules(&self) -> Vec<String> {
        self.variants
            .iter()
            .filter_map(|variant| match &variant.transform {
                VariantTransform::AtRule(prelude) => Some(prelude.clone()),
                VariantTransform::Selector(_) => None,
            })
            .collect()
    }
}

pub struct VariantExpander<'a> {
    registry: &'a VariantRegistry,
}

impl<'a> VariantExpander<'a> {
    pub fn new(registry: &'a VariantRegistry) -> Self {
        Self { registry }
    }

    /// `None` when any variant in the chain is unknown or the base is empty.
    pub fn expand(&self, candidate: &str) -> Option<Expansion> {
        let (names, base) = split_variants(candidate);
        if base.is_empty() {
            return None;
        }
        let mut variants = names
            .into_iter()
            .map(|name| {
                self.registry
                    .get(name)
                    .cloned()
                    .or_else(|| arbitrary_variant(name))
            })
            .collect::<Option<Vec<_>>>()?;
        variants.sort_by(|left, right| {
            right
                .rank
                .cmp(&left.rank)
                .then_with(|| left.name.cmp(&right.name))
        });
        variants.dedup_by(|left, right| left.name == right.name);
        Some(Expansion {
            variants,
            base: base.to_string(),
        })
    }
}

/// Splits on `:` outside brackets and parentheses; the last part is the base.
pub fn split_variants(candidate: &str) -> (Vec<&str>, &str) {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;
    for (idx, byte) in candidate.bytes().enumerate() {
        match byte {
            b'[' | b'(' => depth += 1,
            b']' | b')' => depth = depth.saturating_sub(1),
            b':' if depth == 0 => {
                parts.push(&candidate[start..idx]);
                start = idx + 1;
            }
            _ => {}
        }
    }
    (parts, &candidate[start..])
}

/// `[&>*]` and `[@media(min-width:900px)]`-style variants, plus bracketed
/// `aria-`, `data-` and `supports-` values.
fn arbitrary_variant(name: &str) -> Option<Variant> {
    if let Some((functional, value)) = name.split_once("-[").filter(|_| !name.starts_with('[')) {
        let value = decode_arbitrary(value.strip_suffix(']')?);
        if value.is_empty() {
            return None;
        }
        let (transform, rank) = match functional {
            "aria" => (VariantTransform::Selector(format!("&[aria-{}]", value)), 300),
            "data" => (VariantTransform::Selector(format!("&[data-{}]", value)), 350),
            "supports" => {
                let query = if value.contains(':') || value.contains('(') {
                    value
                } else {
                    format!("{}: var(--tw)", value)
                };
                (VariantTransform::AtRule(format!("@supports ({})", query)), ARBITRARY_AT_RULE_RANK)
            }
            _ => return None,
        };
        return Some(Variant {
            name: name.to_string(),
            transform,
            rank,
        });
    }

    let inner = name.strip_prefix('[')?.strip_suffix(']')?;
    let decoded = decode_arbitrary(inner);
    if decoded.starts_with('@') {
        return Some(Variant {
            name: name.to_string(),
            transform: VariantTransform::AtRule(decoded),
            rank: ARBITRARY_AT_RULE_RANK,
        });
    }
    if decoded.contains('&') {
        return Some(Variant {
            name: name.to_string(),
            transform: VariantTransform::Selector(decoded),
            rank: ARBITRARY_SELECTOR_RANK,
        });
    }
    None
}
