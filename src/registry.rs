//! Utility registry filled by plugins, in plugin order.

use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub property: String,
    pub value: String,
}

impl Declaration {
    pub fn new(property: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            value: value.into(),
        }
    }
}

/// One rule of a utility. `&` in `selector` stands for the class selector;
/// `at_rule` wraps the rule inside any variant wrappers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleTemplate {
    pub selector: String,
    pub at_rule: Option<String>,
    pub declarations: Vec<Declaration>,
}

impl RuleTemplate {
    pub fn new(declarations: Vec<Declaration>) -> Self {
        Self {
            selector: "&".to_string(),
            at_rule: None,
            declarations,
        }
    }

    pub fn nested(selector: impl Into<String>, declarations: Vec<Declaration>) -> Self {
        Self {
            selector: selector.into(),
            at_rule: None,
            declarations,
        }
    }

    pub fn within(at_rule: impl Into<String>, declarations: Vec<Declaration>) -> Self {
        Self {
            selector: "&".to_string(),
            at_rule: Some(at_rule.into()),
            declarations,
        }
    }
}

/// What an arbitrary `[...]` value must look like for a template to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ValueKind {
    Any,
    Length,
    Color,
    Url,
    Number,
    Percentage,
}

impl ValueKind {
    fn from_hint(hint: &str) -> Option<Self> {
        match hint {
            "any" => Some(ValueKind::Any),
            "length" => Some(ValueKind::Length),
            "color" => Some(ValueKind::Color),
            "url" => Some(ValueKind::Url),
            "number" => Some(ValueKind::Number),
            "percentage" => Some(ValueKind::Percentage),
            _ => None,
        }
    }

    pub fn accepts(self, value: &str) -> bool {
        match self {
            ValueKind::Any => true,
            ValueKind::Url => value.starts_with("url("),
            ValueKind::Color => is_color(value),
            ValueKind::Length => is_length(value),
            ValueKind::Number => value.parse::<f64>().is_ok(),
            ValueKind::Percentage => value
                .strip_suffix('%')
                .is_some_and(|number| number.parse::<f64>().is_ok()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UtilityPattern {
    Exact(String),
    /// `root-[value]`; declaration values contain a `{value}` placeholder.
    Arbitrary { root: String, kind: ValueKind },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UtilityDefinition {
    pub pattern: UtilityPattern,
    pub rules: Vec<RuleTemplate>,
    pub plugin: String,
    pub order: usize,
}

impl UtilityDefinition {
    /// Rules with `{value}` substituted.
    pub fn instantiate(&self, value: Option<&str>) -> Vec<RuleTemplate> {
        let Some(value) = value else {
            return self.rules.clone();
        };
        self.rules
            .iter()
            .map(|rule| RuleTemplate {
                selector: rule.selector.clone(),
                at_rule: rule.at_rule.clone(),
                declarations: rule
                    .declarations
                    .iter()
                    .map(|decl| Declaration::new(&decl.property, decl.value.replace("{value}", value)))
                    .collect(),
            })
            .collect()
    }
}

/// Name → definition. A later registration under the same name replaces
/// the earlier one and takes the later order index.
#[derive(Debug, Default)]
pub struct Registry {
    exact: HashMap<String, UtilityDefinition>,
    arbitrary: HashMap<(String, ValueKind), UtilityDefinition>,
    next_order: usize,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, plugin: &str, pattern: UtilityPattern, rules: Vec<RuleTemplate>) {
        let definition = UtilityDefinition {
            pattern: pattern.clone(),
            rules,
            plugin: plugin.to_string(),
            order: self.next_order,
        };
        self.next_order += 1;
        match pattern {
            UtilityPattern::Exact(name) => {
                self.exact.insert(name, definition);
            }
            UtilityPattern::Arbitrary { root, kind } => {
                self.arbitrary.insert((root, kind), definition);
            }
        }
    }

    pub fn exact(&self, name: &str) -> Option<&UtilityDefinition> {
        self.exact.get(name)
    }

    /// Resolves `root-[value]`. Among templates for `root` whose kind accepts
    /// the value (or matches a `kind:` hint), the latest registration wins.
    /// Returns the definition and the decoded value.
    pub fn arbitrary(&self, base: &str) -> Option<(&UtilityDefinition, String)> {
        let (root, raw) = split_arbitrary(base)?;
        let (hint, raw) = match raw.split_once(':') {
            Some((prefix, rest)) => match ValueKind::from_hint(prefix) {
                Some(kind) => (Some(kind), rest),
                None => (None, raw),
            },
            None => (None, raw),
        };
        let value = decode_arbitrary(raw);
        if value.is_empty() {
            return None;
        }

        self.arbitrary
            .iter()
            .filter(|((candidate_root, kind), _)| {
                candidate_root == root
                    && match hint {
                        Some(hint) => *kind == hint || *kind == ValueKind::Any,
                        None => kind.accepts(&value),
                    }
            })
            .map(|(_, definition)| definition)
            .max_by_key(|definition| definition.order)
            .map(|definition| (definition, value))
    }

    pub fn len(&self) -> usize {
        self.exact.len() + self.arbitrary.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// `bg-[#123]` → (`bg`, `#123`).
pub fn split_arbitrary(base: &str) -> Option<(&str, &str)> {
    let inner = base.strip_suffix(']')?;
    let open = inner.find("-[")?;
    let root = &inner[..open];
    let raw = &inner[open + 2..];
    if root.is_empty() || raw.is_empty() {
        return None;
    }
    Some((root, raw))
}

/// Underscores stand for spaces outside `url(...)`; `\_` keeps a literal one.
pub fn decode_arbitrary(raw: &str) -> String {
    let keep_underscores = raw.starts_with("url(");
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '\\' if chars.peek() == Some(&'_') => {
                out.push('_');
                chars.next();
            }
            '_' if !keep_underscores => out.push(' '),
            _ => out.push(ch),
        }
    }
    out
}

fn is_color(value: &str) -> bool {
    if let Some(hex) = value.strip_prefix('#') {
        return matches!(hex.len(), 3 | 4 | 6 | 8) && hex.chars().all(|c| c.is_ascii_hexdigit());
    }
    const FUNCTIONS: [&str; 11] = [
        "rgb(", "rgba(", "hsl(", "hsla(", "hwb(", "lab(", "lch(", "oklab(", "oklch(", "color(",
        "var(",
    ];
    if FUNCTIONS.iter().any(|prefix| value.starts_with(prefix)) {
        return true;
    }
    !value.is_empty()
        && value.chars().all(|c| c.is_ascii_alphabetic())
        && !matches!(
            value,
            "auto" | "none" | "inherit" | "initial" | "unset" | "revert" | "normal"
        )
}

fn is_length(value: &str) -> bool {
    if value == "0" {
        return true;
    }
    if ["calc(", "min(", "max(", "clamp("]
        .iter()
        .any(|prefix| value.starts_with(prefix))
    {
        return true;
    }
    let split = value
        .char_indices()
        .find(|(_, ch)| !(ch.is_ascii_digit() || *ch == '.' || *ch == '-'))
        .map(|(idx, _)| idx);
    let Some(split) = split else {
        return false;
    };
    let (number, unit) = value.split_at(split);
    number.parse::<f64>().is_ok()
        && matches!(
            unit,
            "px" | "rem"
                | "em"
                | "%"
                | "vh"
                | "vw"
                | "vmin"
                | "vmax"
                | "dvh"
                | "svh"
                | "lvh"
                | "ch"
                | "ex"
                | "pt"
                | "pc"
                | "cm"
                | "mm"
                | "in"
        )
}

/// Negates a scale value for `-m-2`-style names; keywords have no negative.
pub fn negate(value: &str) -> Option<String> {
    if let Some(positive) = value.strip_prefix('-') {
        return Some(positive.to_string());
    }
    if value.starts_with("calc(") {
        return Some(format!("calc({} * -1)", value));
    }
    let first = value.chars().next()?;
    if !(first.is_ascii_digit() || first == '.') {
        return None;
    }
    if value.trim_start_matches(['0', '.']).chars().next().is_none_or(|c| !c.is_ascii_digit()) {
        return None;
    }
    Some(format!("-{}", value))
}

/// Plugin-facing handle for adding utilities.
pub struct UtilityRegistrar<'a> {
    registry: &'a mut Registry,
    plugin: &'a str,
}

impl<'a> UtilityRegistrar<'a> {
    pub fn new(registry: &'a mut Registry, plugin: &'a str) -> Self {
        Self { registry, plugin }
    }

    pub fn plugin(&self) -> &str {
        self.plugin
    }

    pub fn add(&mut self, name: impl Into<String>, declarations: &[(&str, &str)]) {
        self.add_rules(name, vec![RuleTemplate::new(to_declarations(declarations))]);
    }

    pub fn add_rules(&mut self, name: impl Into<String>, rules: Vec<RuleTemplate>) {
        self.registry
            .register(self.plugin, UtilityPattern::Exact(name.into()), rules);
    }

    pub fn add_arbitrary(&mut self, root: &str, kind: ValueKind, declarations: &[(&str, &str)]) {
        self.registry.register(
            self.plugin,
            UtilityPattern::Arbitrary {
                root: root.to_string(),
                kind,
            },
            vec![RuleTemplate::new(to_declarations(declarations))],
        );
    }

    /// One utility per scale entry: `prefix-key` (or `prefix` for an empty
    /// key), setting every property to the entry's value.
    pub fn add_scale(&mut self, prefix: &str, scale: &[(String, String)], properties: &[&str]) {
        for (key, value) in scale {
            let declarations = properties
                .iter()
                .map(|property| Declaration::new(*property, value.as_str()))
                .collect();
            self.add_rules(
                scale_name(prefix, key),
                vec![RuleTemplate::new(declarations)],
            );
        }
    }

    /// `-prefix-key` for every entry with a numeric value.
    pub fn add_negative_scale(
        &mut self,
        prefix: &str,
        scale: &[(String, String)],
        properties: &[&str],
    ) {
        let negated = scale
            .iter()
            .filter_map(|(key, value)| negate(value).map(|value| (key.clone(), value)))
            .collect::<Vec<_>>();
        self.add_scale(&format!("-{}", prefix), &negated, properties);
    }
}

fn scale_name(prefix: &str, key: &str) -> String {
    if key.is_empty() {
        prefix.to_string()
    } else {
        format!("{}-{}", prefix, key)
    }
}

fn to_declarations(pairs: &[(&str, &str)]) -> Vec<Declaration> {
    pairs
        .iter()
        .map(|(property, value)| Declaration::new(*property, *value))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{
        Registry, UtilityRegistrar, ValueKind, decode_arbitrary, negate, split_arbitrary,
    };

    #[test]
    fn later_registration_replaces_earlier_one() {
        let mut registry = Registry::new();
        UtilityRegistrar::new(&mut registry, "first").add("card", &[("padding", "1rem")]);
        UtilityRegistrar::new(&mut registry, "second").add("card", &[("padding", "2rem")]);

        let definition = registry.exact("card").expect("card should be registered");
        assert_eq!(definition.plugin, "second");
        assert_eq!(definition.order, 1);
        assert_eq!(definition.rules[0].declarations[0].value, "2rem");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn arbitrary_values_pick_template_by_kind() {
        let mut registry = Registry::new();
        let mut utilities = UtilityRegistrar::new(&mut registry, "core");
        utilities.add_arbitrary("text", ValueKind::Length, &[("font-size", "{value}")]);
        utilities.add_arbitrary("text", ValueKind::Color, &[("color", "{value}")]);

        let (size, value) = registry.arbitrary("text-[22px]").expect("length should match");
        assert_eq!(size.rules[0].declarations[0].property, "font-size");
        assert_eq!(value, "22px");

        let (color, value) = registry.arbitrary("text-[#bada55]").expect("color should match");
        assert_eq!(color.rules[0].declarations[0].property, "color");
        assert_eq!(value, "#bada55");

        let (hinted, value) = registry
            .arbitrary("text-[length:var(--size)]")
            .expect("hint should select the length template");
        assert_eq!(hinted.rules[0].declarations[0].property, "font-size");
        assert_eq!(value, "var(--size)");

        assert!(registry.arbitrary("text-[url(/a.png)]").is_none());
        assert!(registry.arbitrary("bg-[#fff]").is_none());
    }

    #[test]
    fn instantiates_value_placeholders() {
        let mut registry = Registry::new();
        UtilityRegistrar::new(&mut registry, "core").add_arbitrary(
            "m",
            ValueKind::Any,
            &[("margin", "{value}")],
        );
        let (definition, value) = registry
            .arbitrary("m-[calc(100%_-_1rem)]")
            .expect("any kind should accept");
        let rules = definition.instantiate(Some(&value));
        assert_eq!(rules[0].declarations[0].value, "calc(100% - 1rem)");
    }

    #[test]
    fn splits_and_decodes_arbitrary_values() {
        assert_eq!(split_arbitrary("bg-[#123]"), Some(("bg", "#123")));
        assert_eq!(split_arbitrary("grid-cols-[1fr_2fr]"), Some(("grid-cols", "1fr_2fr")));
        assert_eq!(split_arbitrary("[color:red]"), None);
        assert_eq!(split_arbitrary("bg-red-500"), None);
        assert_eq!(decode_arbitrary("1fr_2fr"), "1fr 2fr");
        assert_eq!(decode_arbitrary("'hello\\_world'"), "'hello_world'");
        assert_eq!(decode_arbitrary("url(/what_a_rush.png)"), "url(/what_a_rush.png)");
    }

    #[test]
    fn scales_register_one_utility_per_entry() {
        let mut registry = Registry::new();
        let scale = vec![
            ("".to_string(), "1px".to_string()),
            ("2".to_string(), "2px".to_string()),
            ("auto".to_string(), "auto".to_string()),
        ];
        let mut utilities = UtilityRegistrar::new(&mut registry, "core");
        utilities.add_scale("m", &scale, &["margin"]);
        utilities.add_negative_scale("m", &scale, &["margin"]);

        assert!(registry.exact("m").is_some());
        assert!(registry.exact("m-2").is_some());
        assert!(registry.exact("m-auto").is_some());
        let negative = registry.exact("-m-2").expect("negative margin should exist");
        assert_eq!(negative.rules[0].declarations[0].value, "-2px");
        assert!(registry.exact("-m-auto").is_none());
    }

    #[test]
    fn negates_only_numeric_values() {
        assert_eq!(negate("0.25rem"), Some("-0.25rem".to_string()));
        assert_eq!(negate("-1px"), Some("1px".to_string()));
        assert_eq!(negate("0px"), None);
        assert_eq!(negate("auto"), None);
        assert_eq!(negate("50%"), Some("-50%".to_string()));
    }
}
