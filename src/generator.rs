//! Matches candidates against the registries and emits ordered rules.
//!
//! Rules are grouped by identity: the canonical variant chain plus the base
//! utility. Candidates spelled differently but sharing an identity
//! (`hover:md:p-4`, `md:hover:p-4`) become one rule with both selectors.
//! Output order depends only on the variant ranks and the registration
//! order of the matched utility, never on where a candidate was found.

use crate::config::{Config, Important};
use crate::css::{self, Rule, escape_class};
use crate::plugin::Registries;
use crate::registry::{Declaration, RuleTemplate, decode_arbitrary, negate};
use crate::variant::{Expansion, VariantExpander};
use std::collections::{BTreeMap, BTreeSet, HashSet};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerateOptions {
    pub prefix: String,
    pub important: Important,
    pub blocklist: Vec<String>,
}

impl GenerateOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            prefix: config.prefix.clone(),
            important: config.important.clone(),
            blocklist: config.blocklist.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stylesheet {
    pub rules: Vec<Rule>,
}

impl Stylesheet {
    pub fn to_css(&self, minify: bool) -> String {
        css::stylesheet(&self.rules, minify)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct RuleSortKey {
    variant_ranks: Vec<u32>,
    registration_order: usize,
    identity: String,
}

/// A candidate resolved to its rule templates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    pub identity: String,
    expansion: Expansion,
    templates: Vec<RuleTemplate>,
    order: usize,
    important: bool,
}

struct Group {
    expansion: Expansion,
    templates: Vec<RuleTemplate>,
    important: bool,
    selectors: BTreeSet<String>,
}

pub struct Generator<'a> {
    registries: &'a Registries,
    options: &'a GenerateOptions,
    blocklist: HashSet<&'a str>,
}

impl<'a> Generator<'a> {
    pub fn new(registries: &'a Registries, options: &'a GenerateOptions) -> Self {
        Self {
            registries,
            options,
            blocklist: options.blocklist.iter().map(String::as_str).collect(),
        }
    }

    /// Resolves one candidate. `None` for anything that is not a utility.
    pub fn resolve(&self, candidate: &str) -> Option<Match> {
        if self.blocklist.contains(candidate) {
            return None;
        }
        let expansion = VariantExpander::new(&self.registries.variants).expand(candidate)?;
        let (important, written) = match expansion.base.strip_prefix('!') {
            Some(rest) => (true, rest),
            None => (false, expansion.base.as_str()),
        };
        let base = self.strip_prefix(written)?;
        let (templates, order) = self.lookup(&base)?;

        let identity = format!(
            "{}{}{}",
            expansion.canonical_prefix(),
            if important { "!" } else { "" },
            written
        );
        Some(Match {
            identity,
            expansion,
            templates,
            order,
            important,
        })
    }

    fn strip_prefix(&self, written: &str) -> Option<String> {
        let prefix = self.options.prefix.as_str();
        if prefix.is_empty() {
            return Some(written.to_string());
        }
        match written.strip_prefix('-') {
            Some(positive) => positive
                .strip_prefix(prefix)
                .map(|rest| format!("-{}", rest)),
            None => written.strip_prefix(prefix).map(str::to_string),
        }
    }

    /// Exact names first, then arbitrary-value templates, then arbitrary
    /// properties.
    fn lookup(&self, base: &str) -> Option<(Vec<RuleTemplate>, usize)> {
        let utilities = &self.registries.utilities;
        if let Some(definition) = utilities.exact(base) {
            return Some((definition.instantiate(None), definition.order));
        }
        if let Some((definition, value)) = utilities.arbitrary(base) {
            return Some((definition.instantiate(Some(&value)), definition.order));
        }
        if let Some(positive) = base.strip_prefix('-') {
            if let Some((definition, value)) = utilities.arbitrary(positive) {
                let value = negate(&value).unwrap_or_else(|| format!("calc({} * -1)", value));
                return Some((definition.instantiate(Some(&value)), definition.order));
            }
        }
        arbitrary_property(base).map(|declaration| {
            (vec![RuleTemplate::new(vec![declaration])], usize::MAX)
        })
    }

    pub fn generate<'c>(&self, candidates: impl IntoIterator<Item = &'c str>) -> Stylesheet {
        let mut groups: BTreeMap<RuleSortKey, Group> = BTreeMap::new();

        for candidate in candidates {
            let Some(matched) = self.resolve(candidate) else {
                continue;
            };
            let key = RuleSortKey {
                variant_ranks: matched.expansion.ranks(),
                registration_order: matched.order,
                identity: matched.identity.clone(),
            };
            let selector = matched
                .expansion
                .apply_selector(&format!(".{}", escape_class(candidate)));
            groups
                .entry(key)
                .or_insert_with(|| Group {
                    expansion: matched.expansion,
                    templates: matched.templates,
                    important: matched.important,
                    selectors: BTreeSet::new(),
                })
                .selectors
                .insert(selector);
        }

        let mut rules = Vec::new();
        for group in groups.into_values() {
            for template in &group.templates {
                rules.push(self.realize(&group, template));
            }
        }
        Stylesheet { rules }
    }

    fn realize(&self, group: &Group, template: &RuleTemplate) -> Rule {
        let mut important = group.important;
        let scope = match &self.options.important {
            Important::Off => None,
            Important::All => {
                important = true;
                None
            }
            Important::Selector(scope) => Some(scope.as_str()),
        };
        let selector = group
            .selectors
            .iter()
            .map(|single| {
                let selector = template.selector.replace('&', single);
                match scope {
                    Some(scope) => format!("{} {}", scope, selector),
                    None => selector,
                }
            })
            .collect::<Vec<_>>()
            .join(", ");

        let mut at_rules = group.expansion.at_rules();
        at_rules.extend(template.at_rule.iter().cloned());

        let declarations = template
            .declarations
            .iter()
            .map(|decl| {
                if important {
                    Declaration::new(&decl.property, format!("{} !important", decl.value))
                } else {
                    decl.clone()
                }
            })
            .collect();

        Rule {
            at_rules,
            selector,
            declarations,
        }
    }
}

/// `[mask-type:luminance]` → `mask-type: luminance`.
fn arbitrary_property(base: &str) -> Option<Declaration> {
    let inner = base.strip_prefix('[')?.strip_suffix(']')?;
    let (property, value) = inner.split_once(':')?;
    let custom_property = property.starts_with("--") && property.len() > 2;
    if !(custom_property || (!property.is_empty() && !property.starts_with('-'))) {
        return None;
    }
    if !property
        .bytes()
        .all(|byte| byte.is_ascii_lowercase() || byte.is_ascii_digit() || byte == b'-')
    {
        return None;
    }
    let value = decode_arbitrary(value);
    if value.trim().is_empty() {
        return None;
    }
    Some(Declaration::new(property, value))
}

#[cfg(test)]
mod tests {
    use super::{GenerateOptions, Generator, arbitrary_property};
    use crate::config::{DarkMode, Important};
    use crate::plugin::{FnPlugin, Plugin, Registries, register_all};
    use crate::plugins::core_plugins;
    use crate::theme::{ThemeSources, resolve};
    use std::sync::Arc;

    fn registries(extra: Vec<Arc<dyn Plugin>>) -> Registries {
        let theme = resolve(&ThemeSources::default()).expect("default theme should resolve");
        let mut plugins = core_plugins(&DarkMode::Media);
        plugins.extend(extra);
        register_all(&theme, &plugins).expect("plugins should register")
    }

    fn css(candidates: &[&str], options: &GenerateOptions) -> String {
        let registries = registries(Vec::new());
        Generator::new(&registries, options)
            .generate(candidates.iter().copied())
            .to_css(false)
    }

    #[test]
    fn emits_matched_candidates_in_registration_order() {
        let output = css(&["p-4", "m-2", "unknown-token"], &GenerateOptions::default());
        assert_eq!(
            output,
            ".m-2 {\n  margin: 0.5rem;\n}\n\n.p-4 {\n  padding: 1rem;\n}\n"
        );
    }

    #[test]
    fn variant_spellings_share_one_rule() {
        let output = css(&["hover:md:p-4", "md:hover:p-4"], &GenerateOptions::default());
        assert_eq!(
            output,
            "@media (min-width: 768px) {\n  .hover\\:md\\:p-4:hover, .md\\:hover\\:p-4:hover {\n    padding: 1rem;\n  }\n}\n"
        );
    }

    #[test]
    fn candidate_order_does_not_change_output() {
        let candidates = [
            "lg:hover:p-2",
            "p-4",
            "dark:text-white",
            "-mt-1",
            "md:p-4",
            "hover:md:p-4",
            "[mask-type:luminance]",
            "w-[10px]",
            "m-2",
        ];
        let mut reversed = candidates;
        reversed.reverse();

        let forward = css(&candidates, &GenerateOptions::default());
        let backward = css(&reversed, &GenerateOptions::default());
        assert!(!forward.is_empty());
        assert_eq!(forward, backward);
    }

    #[test]
    fn base_rules_precede_state_and_responsive_rules() {
        let output = css(
            &["md:p-4", "hover:p-4", "p-4", "md:hover:p-4"],
            &GenerateOptions::default(),
        );
        let base = output.find(".p-4 {").expect("base rule should exist");
        let hover = output.find(".hover\\:p-4:hover").expect("hover rule should exist");
        let md = output.find(".md\\:p-4 {").expect("md rule should exist");
        let md_hover = output
            .find(".md\\:hover\\:p-4:hover")
            .expect("md hover rule should exist");
        assert!(base < hover);
        assert!(hover < md);
        assert!(md < md_hover);
    }

    #[test]
    fn supports_negative_important_and_prefix() {
        let options = GenerateOptions {
            prefix: "tw-".to_string(),
            ..GenerateOptions::default()
        };
        let output = css(&["-tw-m-2", "!tw-p-4", "p-4", "md:tw-flex"], &options);
        assert!(output.contains(".-tw-m-2 {\n  margin: -0.5rem;\n}"));
        assert!(output.contains(".\\!tw-p-4 {\n  padding: 1rem !important;\n}"));
        assert!(output.contains(".md\\:tw-flex {\n    display: flex;\n  }"));
        assert!(!output.contains(".p-4"));
    }

    #[test]
    fn important_scope_and_blocklist() {
        let options = GenerateOptions {
            important: Important::Selector("#app".to_string()),
            blocklist: vec!["m-2".to_string()],
            ..GenerateOptions::default()
        };
        let output = css(&["p-4", "m-2"], &options);
        assert_eq!(output, "#app .p-4 {\n  padding: 1rem;\n}\n");

        let options = GenerateOptions {
            important: Important::All,
            ..GenerateOptions::default()
        };
        let output = css(&["p-4"], &options);
        assert!(output.contains("padding: 1rem !important;"));
    }

    #[test]
    fn resolves_arbitrary_values_and_properties() {
        let output = css(
            &["bg-[#bada55]", "w-[calc(100%_-_2rem)]", "[mask-type:luminance]", "-m-[3px]"],
            &GenerateOptions::default(),
        );
        assert!(output.contains(".bg-\\[\\#bada55\\] {\n  background-color: #bada55;\n}"));
        assert!(output.contains("width: calc(100% - 2rem);"));
        assert!(output.contains(".\\[mask-type\\:luminance\\] {\n  mask-type: luminance;\n}"));
        assert!(output.contains("margin: -3px;"));
        assert!(output.ends_with("mask-type: luminance;\n}\n"));
    }

    #[test]
    fn exact_names_win_over_arbitrary_templates() {
        let extra: Arc<dyn Plugin> = Arc::new(FnPlugin::new("odd").with_utilities(|_, u| {
            u.add("bg-[red]", &[("background", "papayawhip")]);
            Ok(())
        }));
        let registries = registries(vec![extra]);
        let options = GenerateOptions::default();
        let output = Generator::new(&registries, &options)
            .generate(["bg-[red]"])
            .to_css(false);
        assert!(output.contains("background: papayawhip;"));
        assert!(!output.contains("background-color"));
    }

    #[test]
    fn arbitrary_variants_and_group_selectors() {
        let output = css(
            &["[&>*]:p-4", "group-hover:underline", "dark:hover:bg-slate-600"],
            &GenerateOptions::default(),
        );
        assert!(output.contains(".\\[\\&\\>\\*\\]\\:p-4>* {"));
        assert!(output.contains(".group:hover .group-hover\\:underline {"));
        assert!(output.contains(
            "@media (prefers-color-scheme: dark) {\n  .dark\\:hover\\:bg-slate-600:hover {\n    background-color: #475569;\n  }\n}"
        ));
    }

    #[test]
    fn rejects_malformed_arbitrary_properties() {
        assert!(arbitrary_property("[color:red]").is_some());
        assert!(arbitrary_property("[--brand:#fff]").is_some());
        assert!(arbitrary_property("[Color:red]").is_none());
        assert!(arbitrary_property("[color:]").is_none());
        assert!(arbitrary_property("[&>*]").is_none());
    }
}
