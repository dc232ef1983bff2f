//! Prose styles for rendered markup: `prose`, size modifiers, gray themes,
//! `prose-invert`, and element variants such as `prose-headings:`.

use crate::plugin::{Plugin, PluginResult};
use crate::registry::{Declaration, RuleTemplate, UtilityRegistrar};
use crate::theme::Theme;
use crate::variant::VariantRegistrar;

const NOT_PROSE: &str = ":not(:where([class~=\"not-prose\"] *))";

/// (name suffix, elements) for element variants like `prose-a:`.
const ELEMENTS: [(&str, &str); 12] = [
    ("headings", "h1, h2, h3, h4, h5, h6, th"),
    ("lead", "[class~=\"lead\"]"),
    ("h1", "h1"),
    ("h2", "h2"),
    ("h3", "h3"),
    ("p", "p"),
    ("a", "a"),
    ("strong", "strong"),
    ("blockquote", "blockquote"),
    ("code", "code"),
    ("li", "li"),
    ("img", "img"),
];

/// Color variables and the shade each takes from a gray palette, light then
/// inverted.
const PALETTE_ROLES: [(&str, &str, &str); 8] = [
    ("body", "700", "300"),
    ("headings", "900", "50"),
    ("links", "900", "50"),
    ("bold", "900", "50"),
    ("counters", "500", "400"),
    ("bullets", "300", "600"),
    ("quotes", "900", "100"),
    ("code", "900", "50"),
];

const GRAYS: [&str; 3] = ["slate", "gray", "neutral"];

const SIZES: [(&str, &str, &str); 4] = [
    ("sm", "0.875rem", "1.7142857"),
    ("base", "1rem", "1.75"),
    ("lg", "1.125rem", "1.7777778"),
    ("xl", "1.25rem", "1.8"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypographyPlugin {
    class_name: String,
}

impl TypographyPlugin {
    pub fn new(class_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
        }
    }

    fn element_rule(&self, elements: &str, declarations: &[(&str, &str)]) -> RuleTemplate {
        RuleTemplate::nested(
            format!("& :where({}){}", elements, NOT_PROSE),
            declarations
                .iter()
                .map(|(property, value)| Declaration::new(*property, *value))
                .collect(),
        )
    }

    fn palette(&self, theme: &Theme, gray: &str) -> Option<Vec<Declaration>> {
        let mut declarations = Vec::new();
        for (role, light, dark) in PALETTE_ROLES {
            let light = theme.scalar(&format!("colors.{}.{}", gray, light))?;
            let dark = theme.scalar(&format!("colors.{}.{}", gray, dark))?;
            declarations.push(Declaration::new(format!("--tw-prose-{}", role), light));
            declarations.push(Declaration::new(format!("--tw-prose-invert-{}", role), dark));
        }
        Some(declarations)
    }
}

impl Default for TypographyPlugin {
    fn default() -> Self {
        Self::new("prose")
    }
}

impl Plugin for TypographyPlugin {
    fn name(&self) -> &str {
        "typography"
    }

    fn register_variants(&self, _theme: &Theme, variants: &mut VariantRegistrar<'_>) -> PluginResult {
        for (idx, (suffix, elements)) in (0..).zip(ELEMENTS) {
            variants.add_selector(
                format!("{}-{}", self.class_name, suffix),
                format!("& :is(:where({}){})", elements, NOT_PROSE),
                450 + idx,
            );
        }
        Ok(())
    }

    fn register_utilities(&self, theme: &Theme, utilities: &mut UtilityRegistrar<'_>) -> PluginResult {
        let class = self.class_name.as_str();
        let mut base = vec![
            Declaration::new("color", "var(--tw-prose-body)"),
            Declaration::new("max-width", "65ch"),
        ];
        if let Some(palette) = self.palette(theme, "gray") {
            base.extend(palette);
        }
        utilities.add_rules(
            class,
            vec![
                RuleTemplate::new(base),
                self.element_rule("p", &[("margin-top", "1.25em"), ("margin-bottom", "1.25em")]),
                self.element_rule(
                    "a",
                    &[
                        ("color", "var(--tw-prose-links)"),
                        ("text-decoration", "underline"),
                        ("font-weight", "500"),
                    ],
                ),
                self.element_rule(
                    "strong",
                    &[("color", "var(--tw-prose-bold)"), ("font-weight", "600")],
                ),
                self.element_rule(
                    "h1",
                    &[
                        ("color", "var(--tw-prose-headings)"),
                        ("font-weight", "800"),
                        ("font-size", "2.25em"),
                        ("margin-top", "0"),
                        ("margin-bottom", "0.8888889em"),
                        ("line-height", "1.1111111"),
                    ],
                ),
                self.element_rule(
                    "h2",
                    &[
                        ("color", "var(--tw-prose-headings)"),
                        ("font-weight", "700"),
                        ("font-size", "1.5em"),
                        ("margin-top", "2em"),
                        ("margin-bottom", "1em"),
                        ("line-height", "1.3333333"),
                    ],
                ),
                self.element_rule(
                    "h3",
                    &[
                        ("color", "var(--tw-prose-headings)"),
                        ("font-weight", "600"),
                        ("font-size", "1.25em"),
                        ("margin-top", "1.6em"),
                        ("margin-bottom", "0.6em"),
                        ("line-height", "1.6"),
                    ],
                ),
                self.element_rule(
                    "blockquote",
                    &[
                        ("font-weight", "500"),
                        ("font-style", "italic"),
                        ("color", "var(--tw-prose-quotes)"),
                        ("border-inline-start-width", "0.25rem"),
                        ("padding-inline-start", "1em"),
                    ],
                ),
                self.element_rule(
                    "code",
                    &[
                        ("color", "var(--tw-prose-code)"),
                        ("font-weight", "600"),
                        ("font-size", "0.875em"),
                    ],
                ),
                self.element_rule(
                    "ol",
                    &[("list-style-type", "decimal"), ("padding-inline-start", "1.625em")],
                ),
                self.element_rule(
                    "ul",
                    &[("list-style-type", "disc"), ("padding-inline-start", "1.625em")],
                ),
                self.element_rule("ol > li::marker", &[("color", "var(--tw-prose-counters)")]),
                self.element_rule("ul > li::marker", &[("color", "var(--tw-prose-bullets)")]),
            ],
        );

        for (size, font_size, line_height) in SIZES {
            utilities.add(
                format!("{}-{}", class, size),
                &[("font-size", font_size), ("line-height", line_height)],
            );
        }

        for gray in GRAYS {
            if let Some(palette) = self.palette(theme, gray) {
                utilities.add_rules(
                    format!("{}-{}", class, gray),
                    vec![RuleTemplate::new(palette)],
                );
            }
        }

        let invert = PALETTE_ROLES
            .iter()
            .map(|(role, _, _)| {
                Declaration::new(
                    format!("--tw-prose-{}", role),
                    format!("var(--tw-prose-invert-{})", role),
                )
            })
            .collect();
        utilities.add_rules(format!("{}-invert", class), vec![RuleTemplate::new(invert)]);
        Ok(())
    }
}

/// Builds the plugin from its configuration options: `null` or
/// `{ "className": "..." }`.
pub fn from_options(options: &serde_json::Value) -> Result<TypographyPlugin, String> {
    match options {
        serde_json::Value::Null => Ok(TypographyPlugin::default()),
        serde_json::Value::Object(map) => match map.get("className") {
            None => Ok(TypographyPlugin::default()),
            Some(serde_json::Value::String(name)) if !name.is_empty() => {
                Ok(TypographyPlugin::new(name.as_str()))
            }
            Some(other) => Err(format!("className must be a non-empty string, got {}", other)),
        },
        other => Err(format!("options must be an object, got {}", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::{TypographyPlugin, from_options};
    use crate::plugin::Plugin;
    use crate::registry::{Registry, UtilityRegistrar};
    use crate::theme::{ThemeSources, resolve};
    use crate::variant::{VariantRegistrar, VariantRegistry, VariantTransform};

    #[test]
    fn registers_prose_utilities_with_theme_palette() {
        let theme = resolve(&ThemeSources::default()).expect("default theme should resolve");
        let plugin = TypographyPlugin::default();
        let mut registry = Registry::new();
        plugin
            .register_utilities(&theme, &mut UtilityRegistrar::new(&mut registry, "typography"))
            .expect("typography should register");

        let prose = registry.exact("prose").expect("prose should be registered");
        assert!(prose.rules.len() > 1);
        assert!(
            prose.rules[0]
                .declarations
                .iter()
                .any(|decl| decl.property == "--tw-prose-body" && decl.value == "#374151")
        );
        assert!(registry.exact("prose-invert").is_some());
        assert!(registry.exact("prose-lg").is_some());
        assert!(registry.exact("prose-slate").is_some());
    }

    #[test]
    fn custom_class_name_renames_utilities_and_variants() {
        let theme = resolve(&ThemeSources::default()).expect("default theme should resolve");
        let plugin = from_options(&serde_json::json!({ "className": "markdown" }))
            .expect("options should parse");
        let mut utilities = Registry::new();
        let mut variants = VariantRegistry::new();
        plugin
            .register_utilities(&theme, &mut UtilityRegistrar::new(&mut utilities, "typography"))
            .expect("utilities should register");
        plugin
            .register_variants(&theme, &mut VariantRegistrar::new(&mut variants, "typography"))
            .expect("variants should register");

        assert!(utilities.exact("markdown").is_some());
        assert!(utilities.exact("prose").is_none());
        let headings = variants
            .get("markdown-headings")
            .expect("element variant should be registered");
        match &headings.transform {
            VariantTransform::Selector(template) => assert!(template.starts_with("& :is(:where(h1")),
            other => panic!("unexpected transform: {other:?}"),
        }
    }

    #[test]
    fn rejects_malformed_options() {
        assert!(from_options(&serde_json::json!({ "className": 3 })).is_err());
        assert!(from_options(&serde_json::json!("prose")).is_err());
        assert!(from_options(&serde_json::Value::Null).is_ok());
    }
}
