//! Core variants and utilities, registered ahead of configured plugins.
//!
//! Utility groups register in the order they should appear in the output;
//! variant ranks decide where variant rules land relative to each other.

use crate::config::DarkMode;
use crate::plugin::{FnPlugin, Plugin, PluginResult};
use crate::registry::{Declaration, RuleTemplate, UtilityRegistrar, ValueKind};
use crate::theme::{Theme, Token};
use crate::variant::VariantRegistrar;
use std::sync::Arc;

type RegisterFn = fn(&Theme, &mut UtilityRegistrar<'_>) -> PluginResult;

const PSEUDO_ELEMENTS: [(&str, &str); 8] = [
    ("placeholder", "&::placeholder"),
    ("file", "&::file-selector-button"),
    ("marker", "&::marker"),
    ("selection", "&::selection"),
    ("first-line", "&::first-line"),
    ("first-letter", "&::first-letter"),
    ("before", "&::before"),
    ("after", "&::after"),
];

const STATES: [(&str, &str); 31] = [
    ("first", ":first-child"),
    ("last", ":last-child"),
    ("only", ":only-child"),
    ("odd", ":nth-child(odd)"),
    ("even", ":nth-child(even)"),
    ("first-of-type", ":first-of-type"),
    ("last-of-type", ":last-of-type"),
    ("only-of-type", ":only-of-type"),
    ("visited", ":visited"),
    ("target", ":target"),
    ("open", "[open]"),
    ("default", ":default"),
    ("checked", ":checked"),
    ("indeterminate", ":indeterminate"),
    ("placeholder-shown", ":placeholder-shown"),
    ("autofill", ":autofill"),
    ("optional", ":optional"),
    ("required", ":required"),
    ("valid", ":valid"),
    ("invalid", ":invalid"),
    ("in-range", ":in-range"),
    ("out-of-range", ":out-of-range"),
    ("read-only", ":read-only"),
    ("empty", ":empty"),
    ("focus-within", ":focus-within"),
    ("hover", ":hover"),
    ("focus", ":focus"),
    ("focus-visible", ":focus-visible"),
    ("active", ":active"),
    ("enabled", ":enabled"),
    ("disabled", ":disabled"),
];

pub fn variants(dark_mode: DarkMode) -> Arc<dyn Plugin> {
    Arc::new(
        FnPlugin::new("core:variants")
            .with_variants(move |theme, variants| register_variants(theme, variants, &dark_mode)),
    )
}

fn register_variants(
    theme: &Theme,
    variants: &mut VariantRegistrar<'_>,
    dark_mode: &DarkMode,
) -> PluginResult {
    for (rank, (name, template)) in (10..).zip(PSEUDO_ELEMENTS) {
        variants.add_selector(name, template, rank);
    }
    for (idx, (name, pseudo)) in (0..).zip(STATES) {
        variants.add_selector(name, format!("&{}", pseudo), 100 + idx);
        variants.add_selector(format!("group-{}", name), format!(".group{} &", pseudo), 200 + idx);
        variants.add_selector(format!("peer-{}", name), format!(".peer{} ~ &", pseudo), 260 + idx);
    }
    for (idx, (name, attribute)) in (0..).zip(theme.scale("aria")) {
        variants.add_selector(format!("aria-{}", name), format!("&[aria-{}]", attribute), 300 + idx);
    }
    for (idx, (name, attribute)) in (0..).zip(theme.scale("data")) {
        variants.add_selector(format!("data-{}", name), format!("&[data-{}]", attribute), 350 + idx);
    }
    variants.add_selector("ltr", "&:where([dir=\"ltr\"], [dir=\"ltr\"] *)", 400);
    variants.add_selector("rtl", "&:where([dir=\"rtl\"], [dir=\"rtl\"] *)", 401);
    variants.add_at_rule(
        "motion-safe",
        "@media (prefers-reduced-motion: no-preference)",
        500,
    );
    variants.add_at_rule("motion-reduce", "@media (prefers-reduced-motion: reduce)", 501);
    match dark_mode {
        DarkMode::Media => {
            variants.add_at_rule("dark", "@media (prefers-color-scheme: dark)", 600)
        }
        DarkMode::Class(selector) => {
            variants.add_selector("dark", format!(":is({} &)", selector), 600)
        }
    }
    variants.add_at_rule("print", "@media print", 610);
    variants.add_at_rule("portrait", "@media (orientation: portrait)", 620);
    variants.add_at_rule("landscape", "@media (orientation: landscape)", 621);
    for (idx, (name, query)) in (0..).zip(theme.scale("supports")) {
        variants.add_at_rule(format!("supports-{}", name), format!("@supports ({})", query), 650 + idx);
    }
    for (idx, (name, width)) in (0..).zip(sorted_by_length(theme.scale("containers"))) {
        variants.add_at_rule(
            format!("@{}", name),
            format!("@container (min-width: {})", width),
            700 + idx,
        );
    }
    let screens = sorted_by_length(theme.scale("screens"));
    let count = screens.len() as u32;
    for (idx, (name, width)) in (0..).zip(screens) {
        variants.add_at_rule(
            format!("max-{}", name),
            format!("@media not all and (min-width: {})", width),
            900 + (count - 1 - idx),
        );
        variants.add_at_rule(name, format!("@media (min-width: {})", width), 1000 + idx);
    }
    Ok(())
}

pub fn utilities() -> Vec<Arc<dyn Plugin>> {
    const GROUPS: [(&str, RegisterFn); 24] = [
        ("container", container),
        ("position", position),
        ("inset", inset),
        ("visibility", visibility),
        ("z-index", z_index),
        ("grid", grid),
        ("margin", margin),
        ("display", display),
        ("sizing", sizing),
        ("flexbox", flexbox),
        ("gap", gap),
        ("overflow", overflow),
        ("border-radius", border_radius),
        ("border", border),
        ("background", background),
        ("gradient-stops", gradient_stops),
        ("svg", svg),
        ("padding", padding),
        ("text-align", text_align),
        ("typography", typography),
        ("opacity", opacity),
        ("box-shadow", box_shadow),
        ("transition", transition),
        ("interactivity", interactivity),
    ];
    GROUPS
        .into_iter()
        .map(|(name, register)| {
            Arc::new(FnPlugin::new(format!("core:{}", name)).with_utilities(register))
                as Arc<dyn Plugin>
        })
        .collect()
}

fn with_value<'a>(properties: &[&'a str]) -> Vec<(&'a str, &'static str)> {
    properties.iter().map(|property| (*property, "{value}")).collect()
}

fn keywords(utilities: &mut UtilityRegistrar<'_>, property: &str, entries: &[(&str, &str)]) {
    for (name, value) in entries {
        utilities.add(*name, &[(property, *value)]);
    }
}

/// Scale utilities with their negative and arbitrary forms.
fn spacing_family(
    utilities: &mut UtilityRegistrar<'_>,
    scale: &[(String, String)],
    family: &[(&str, &[&str])],
    negative: bool,
) {
    for (prefix, properties) in family {
        utilities.add_scale(prefix, scale, properties);
        if negative {
            utilities.add_negative_scale(prefix, scale, properties);
        }
        utilities.add_arbitrary(prefix, ValueKind::Any, &with_value(properties));
    }
}

fn container(theme: &Theme, utilities: &mut UtilityRegistrar<'_>) -> PluginResult {
    let mut rules = vec![RuleTemplate::new(vec![Declaration::new("width", "100%")])];
    for (_, width) in sorted_by_length(theme.scale("screens")) {
        rules.push(RuleTemplate::within(
            format!("@media (min-width: {})", width),
            vec![Declaration::new("max-width", width)],
        ));
    }
    utilities.add_rules("container", rules);
    utilities.add("@container", &[("container-type", "inline-size")]);
    Ok(())
}

fn position(_theme: &Theme, utilities: &mut UtilityRegistrar<'_>) -> PluginResult {
    for value in ["static", "fixed", "absolute", "relative", "sticky"] {
        utilities.add(value, &[("position", value)]);
    }
    Ok(())
}

fn inset(theme: &Theme, utilities: &mut UtilityRegistrar<'_>) -> PluginResult {
    spacing_family(
        utilities,
        &theme.scale("inset"),
        &[
            ("inset", &["inset"][..]),
            ("inset-x", &["left", "right"][..]),
            ("inset-y", &["top", "bottom"][..]),
            ("top", &["top"][..]),
            ("right", &["right"][..]),
            ("bottom", &["bottom"][..]),
            ("left", &["left"][..]),
        ],
        true,
    );
    Ok(())
}

fn visibility(_theme: &Theme, utilities: &mut UtilityRegistrar<'_>) -> PluginResult {
    keywords(
        utilities,
        "visibility",
        &[("visible", "visible"), ("invisible", "hidden"), ("collapse", "collapse")],
    );
    Ok(())
}

fn z_index(theme: &Theme, utilities: &mut UtilityRegistrar<'_>) -> PluginResult {
    let scale = theme.scale("zIndex");
    utilities.add_scale("z", &scale, &["z-index"]);
    utilities.add_negative_scale("z", &scale, &["z-index"]);
    utilities.add_arbitrary("z", ValueKind::Number, &[("z-index", "{value}")]);
    Ok(())
}

fn grid(theme: &Theme, utilities: &mut UtilityRegistrar<'_>) -> PluginResult {
    utilities.add_scale(
        "grid-cols",
        &theme.scale("gridTemplateColumns"),
        &["grid-template-columns"],
    );
    utilities.add_arbitrary("grid-cols", ValueKind::Any, &[("grid-template-columns", "{value}")]);
    utilities.add_scale("col", &theme.scale("gridColumn"), &["grid-column"]);
    utilities.add_arbitrary("col", ValueKind::Any, &[("grid-column", "{value}")]);
    Ok(())
}

fn margin(theme: &Theme, utilities: &mut UtilityRegistrar<'_>) -> PluginResult {
    spacing_family(
        utilities,
        &theme.scale("margin"),
        &[
            ("m", &["margin"][..]),
            ("mx", &["margin-left", "margin-right"][..]),
            ("my", &["margin-top", "margin-bottom"][..]),
            ("mt", &["margin-top"][..]),
            ("mr", &["margin-right"][..]),
            ("mb", &["margin-bottom"][..]),
            ("ml", &["margin-left"][..]),
        ],
        true,
    );
    Ok(())
}

fn display(_theme: &Theme, utilities: &mut UtilityRegistrar<'_>) -> PluginResult {
    keywords(
        utilities,
        "display",
        &[
            ("block", "block"),
            ("inline-block", "inline-block"),
            ("inline", "inline"),
            ("flex", "flex"),
            ("inline-flex", "inline-flex"),
            ("table", "table"),
            ("grid", "grid"),
            ("inline-grid", "inline-grid"),
            ("contents", "contents"),
            ("list-item", "list-item"),
            ("hidden", "none"),
        ],
    );
    Ok(())
}

fn sizing(theme: &Theme, utilities: &mut UtilityRegistrar<'_>) -> PluginResult {
    for (prefix, key, property) in [
        ("w", "width", "width"),
        ("h", "height", "height"),
        ("min-h", "minHeight", "min-height"),
        ("max-w", "maxWidth", "max-width"),
    ] {
        utilities.add_scale(prefix, &theme.scale(key), &[property]);
        utilities.add_arbitrary(prefix, ValueKind::Any, &[(property, "{value}")]);
    }
    Ok(())
}

fn flexbox(_theme: &Theme, utilities: &mut UtilityRegistrar<'_>) -> PluginResult {
    keywords(
        utilities,
        "flex",
        &[
            ("flex-1", "1 1 0%"),
            ("flex-auto", "1 1 auto"),
            ("flex-initial", "0 1 auto"),
            ("flex-none", "none"),
        ],
    );
    keywords(
        utilities,
        "flex-direction",
        &[
            ("flex-row", "row"),
            ("flex-row-reverse", "row-reverse"),
            ("flex-col", "column"),
            ("flex-col-reverse", "column-reverse"),
        ],
    );
    keywords(
        utilities,
        "flex-wrap",
        &[
            ("flex-wrap", "wrap"),
            ("flex-wrap-reverse", "wrap-reverse"),
            ("flex-nowrap", "nowrap"),
        ],
    );
    keywords(utilities, "flex-shrink", &[("shrink", "1"), ("shrink-0", "0")]);
    keywords(utilities, "flex-grow", &[("grow", "1"), ("grow-0", "0")]);
    keywords(
        utilities,
        "align-items",
        &[
            ("items-start", "flex-start"),
            ("items-end", "flex-end"),
            ("items-center", "center"),
            ("items-baseline", "baseline"),
            ("items-stretch", "stretch"),
        ],
    );
    keywords(
        utilities,
        "justify-content",
        &[
            ("justify-start", "flex-start"),
            ("justify-end", "flex-end"),
            ("justify-center", "center"),
            ("justify-between", "space-between"),
            ("justify-around", "space-around"),
            ("justify-evenly", "space-evenly"),
        ],
    );
    Ok(())
}

fn gap(theme: &Theme, utilities: &mut UtilityRegistrar<'_>) -> PluginResult {
    spacing_family(
        utilities,
        &theme.scale("gap"),
        &[("gap", &["gap"][..]), ("gap-x", &["column-gap"][..]), ("gap-y", &["row-gap"][..])],
        false,
    );
    Ok(())
}

fn overflow(_theme: &Theme, utilities: &mut UtilityRegistrar<'_>) -> PluginResult {
    for (prefix, property) in [
        ("overflow", "overflow"),
        ("overflow-x", "overflow-x"),
        ("overflow-y", "overflow-y"),
    ] {
        for value in ["auto", "hidden", "clip", "visible", "scroll"] {
            utilities.add(format!("{}-{}", prefix, value), &[(property, value)]);
        }
    }
    Ok(())
}

fn border_radius(theme: &Theme, utilities: &mut UtilityRegistrar<'_>) -> PluginResult {
    let scale = theme.scale("borderRadius");
    spacing_family(
        utilities,
        &scale,
        &[
            ("rounded", &["border-radius"][..]),
            (
                "rounded-t",
                &["border-top-left-radius", "border-top-right-radius"][..],
            ),
            (
                "rounded-r",
                &["border-top-right-radius", "border-bottom-right-radius"][..],
            ),
            (
                "rounded-b",
                &["border-bottom-right-radius", "border-bottom-left-radius"][..],
            ),
            (
                "rounded-l",
                &["border-top-left-radius", "border-bottom-left-radius"][..],
            ),
        ],
        false,
    );
    Ok(())
}

fn border(theme: &Theme, utilities: &mut UtilityRegistrar<'_>) -> PluginResult {
    let widths = theme.scale("borderWidth");
    for (prefix, properties) in [
        ("border", &["border-width"][..]),
        ("border-x", &["border-left-width", "border-right-width"][..]),
        ("border-y", &["border-top-width", "border-bottom-width"][..]),
        ("border-t", &["border-top-width"][..]),
        ("border-r", &["border-right-width"][..]),
        ("border-b", &["border-bottom-width"][..]),
        ("border-l", &["border-left-width"][..]),
    ] {
        utilities.add_scale(prefix, &widths, properties);
        utilities.add_arbitrary(prefix, ValueKind::Length, &with_value(properties));
    }
    keywords(
        utilities,
        "border-style",
        &[
            ("border-solid", "solid"),
            ("border-dashed", "dashed"),
            ("border-dotted", "dotted"),
            ("border-double", "double"),
            ("border-none", "none"),
        ],
    );
    utilities.add_scale("border", &theme.scale("borderColor"), &["border-color"]);
    utilities.add_arbitrary("border", ValueKind::Color, &[("border-color", "{value}")]);
    Ok(())
}

fn background(theme: &Theme, utilities: &mut UtilityRegistrar<'_>) -> PluginResult {
    keywords(
        utilities,
        "background-attachment",
        &[("bg-fixed", "fixed"), ("bg-local", "local"), ("bg-scroll", "scroll")],
    );
    utilities.add_scale("bg", &theme.scale("backgroundColor"), &["background-color"]);
    utilities.add_arbitrary("bg", ValueKind::Color, &[("background-color", "{value}")]);
    utilities.add_arbitrary("bg", ValueKind::Url, &[("background-image", "{value}")]);
    utilities.add("bg-none", &[("background-image", "none")]);
    for (suffix, direction) in [
        ("t", "top"),
        ("tr", "top right"),
        ("r", "right"),
        ("br", "bottom right"),
        ("b", "bottom"),
        ("bl", "bottom left"),
        ("l", "left"),
        ("tl", "top left"),
    ] {
        let image = format!("linear-gradient(to {}, var(--tw-gradient-stops))", direction);
        utilities.add(
            format!("bg-gradient-to-{}", suffix),
            &[("background-image", image.as_str())],
        );
    }
    keywords(
        utilities,
        "background-size",
        &[("bg-auto", "auto"), ("bg-cover", "cover"), ("bg-contain", "contain")],
    );
    keywords(
        utilities,
        "background-position",
        &[
            ("bg-bottom", "bottom"),
            ("bg-center", "center"),
            ("bg-left", "left"),
            ("bg-right", "right"),
            ("bg-top", "top"),
        ],
    );
    keywords(
        utilities,
        "background-repeat",
        &[
            ("bg-repeat", "repeat"),
            ("bg-no-repeat", "no-repeat"),
            ("bg-repeat-x", "repeat-x"),
            ("bg-repeat-y", "repeat-y"),
        ],
    );
    Ok(())
}

fn gradient_stops(theme: &Theme, utilities: &mut UtilityRegistrar<'_>) -> PluginResult {
    for (name, color) in theme.scale("gradientColorStops") {
        let from = format!("{} var(--tw-gradient-from-position)", color);
        let to = format!("{} var(--tw-gradient-to-position)", color);
        let fade = format!(
            "{} var(--tw-gradient-to-position)",
            transparent_version(&color)
        );
        let via_stops = format!(
            "var(--tw-gradient-from), {} var(--tw-gradient-via-position), var(--tw-gradient-to)",
            color
        );
        utilities.add(
            format!("from-{}", name),
            &[
                ("--tw-gradient-from", from.as_str()),
                ("--tw-gradient-to", fade.as_str()),
                (
                    "--tw-gradient-stops",
                    "var(--tw-gradient-from), var(--tw-gradient-to)",
                ),
            ],
        );
        utilities.add(
            format!("via-{}", name),
            &[
                ("--tw-gradient-to", fade.as_str()),
                ("--tw-gradient-stops", via_stops.as_str()),
            ],
        );
        utilities.add(format!("to-{}", name), &[("--tw-gradient-to", to.as_str())]);
    }
    let positions = theme.scale("gradientColorStopPositions");
    for (stop, property) in [
        ("from", "--tw-gradient-from-position"),
        ("via", "--tw-gradient-via-position"),
        ("to", "--tw-gradient-to-position"),
    ] {
        utilities.add_scale(stop, &positions, &[property]);
    }
    Ok(())
}

/// `#rrggbb` → `rgb(r g b / 0)`; other colors fade to `transparent`.
fn transparent_version(color: &str) -> String {
    let Some(hex) = color.strip_prefix('#').filter(|hex| hex.is_ascii()) else {
        return "transparent".to_string();
    };
    let expanded = match hex.len() {
        3 => hex.chars().flat_map(|c| [c, c]).collect::<String>(),
        6 => hex.to_string(),
        _ => return "transparent".to_string(),
    };
    let channel = |idx: usize| u8::from_str_radix(&expanded[idx..idx + 2], 16).ok();
    match (channel(0), channel(2), channel(4)) {
        (Some(r), Some(g), Some(b)) => format!("rgb({} {} {} / 0)", r, g, b),
        _ => "transparent".to_string(),
    }
}

fn svg(theme: &Theme, utilities: &mut UtilityRegistrar<'_>) -> PluginResult {
    utilities.add_scale("fill", &theme.scale("fill"), &["fill"]);
    utilities.add_scale("stroke", &theme.scale("stroke"), &["stroke"]);
    keywords(
        utilities,
        "stroke-width",
        &[("stroke-0", "0"), ("stroke-1", "1"), ("stroke-2", "2")],
    );
    Ok(())
}

fn padding(theme: &Theme, utilities: &mut UtilityRegistrar<'_>) -> PluginResult {
    spacing_family(
        utilities,
        &theme.scale("padding"),
        &[
            ("p", &["padding"][..]),
            ("px", &["padding-left", "padding-right"][..]),
            ("py", &["padding-top", "padding-bottom"][..]),
            ("pt", &["padding-top"][..]),
            ("pr", &["padding-right"][..]),
            ("pb", &["padding-bottom"][..]),
            ("pl", &["padding-left"][..]),
        ],
        false,
    );
    Ok(())
}

fn text_align(_theme: &Theme, utilities: &mut UtilityRegistrar<'_>) -> PluginResult {
    for value in ["left", "center", "right", "justify", "start", "end"] {
        utilities.add(format!("text-{}", value), &[("text-align", value)]);
    }
    Ok(())
}

fn typography(theme: &Theme, utilities: &mut UtilityRegistrar<'_>) -> PluginResult {
    if let Some(sizes) = theme.get("fontSize").and_then(Token::as_map) {
        for (name, token) in sizes {
            let mut declarations = Vec::new();
            match token {
                Token::Scalar(size) => declarations.push(Declaration::new("font-size", size)),
                Token::List(items) => {
                    let mut scalars = items.iter().filter_map(Token::as_scalar);
                    if let Some(size) = scalars.next() {
                        declarations.push(Declaration::new("font-size", size));
                    }
                    if let Some(line_height) = scalars.next() {
                        declarations.push(Declaration::new("line-height", line_height));
                    }
                }
                Token::Map(_) => continue,
            }
            utilities.add_rules(format!("text-{}", name), vec![RuleTemplate::new(declarations)]);
        }
    }
    utilities.add_arbitrary("text", ValueKind::Length, &[("font-size", "{value}")]);
    utilities.add_scale("font", &theme.scale("fontWeight"), &["font-weight"]);
    utilities.add_scale("text", &theme.scale("textColor"), &["color"]);
    utilities.add_arbitrary("text", ValueKind::Color, &[("color", "{value}")]);
    keywords(
        utilities,
        "font-style",
        &[("italic", "italic"), ("not-italic", "normal")],
    );
    keywords(
        utilities,
        "text-decoration-line",
        &[
            ("underline", "underline"),
            ("overline", "overline"),
            ("line-through", "line-through"),
            ("no-underline", "none"),
        ],
    );
    keywords(
        utilities,
        "text-transform",
        &[
            ("uppercase", "uppercase"),
            ("lowercase", "lowercase"),
            ("capitalize", "capitalize"),
            ("normal-case", "none"),
        ],
    );
    utilities.add(
        "truncate",
        &[
            ("overflow", "hidden"),
            ("text-overflow", "ellipsis"),
            ("white-space", "nowrap"),
        ],
    );
    keywords(
        utilities,
        "white-space",
        &[
            ("whitespace-normal", "normal"),
            ("whitespace-nowrap", "nowrap"),
            ("whitespace-pre", "pre"),
        ],
    );
    keywords(
        utilities,
        "list-style-type",
        &[
            ("list-none", "none"),
            ("list-disc", "disc"),
            ("list-decimal", "decimal"),
        ],
    );
    Ok(())
}

fn opacity(theme: &Theme, utilities: &mut UtilityRegistrar<'_>) -> PluginResult {
    utilities.add_scale("opacity", &theme.scale("opacity"), &["opacity"]);
    utilities.add_arbitrary("opacity", ValueKind::Number, &[("opacity", "{value}")]);
    Ok(())
}

fn box_shadow(theme: &Theme, utilities: &mut UtilityRegistrar<'_>) -> PluginResult {
    utilities.add_scale("shadow", &theme.scale("boxShadow"), &["box-shadow"]);
    utilities.add_arbitrary("shadow", ValueKind::Any, &[("box-shadow", "{value}")]);
    Ok(())
}

fn transition(theme: &Theme, utilities: &mut UtilityRegistrar<'_>) -> PluginResult {
    const EASE: &str = "cubic-bezier(0.4, 0, 0.2, 1)";
    for (name, properties) in [
        (
            "transition",
            "color, background-color, border-color, text-decoration-color, fill, stroke, opacity, box-shadow, transform, filter, backdrop-filter",
        ),
        (
            "transition-colors",
            "color, background-color, border-color, text-decoration-color, fill, stroke",
        ),
        ("transition-opacity", "opacity"),
        ("transition-shadow", "box-shadow"),
        ("transition-transform", "transform"),
        ("transition-all", "all"),
    ] {
        utilities.add(
            name,
            &[
                ("transition-property", properties),
                ("transition-timing-function", EASE),
                ("transition-duration", "150ms"),
            ],
        );
    }
    utilities.add("transition-none", &[("transition-property", "none")]);
    utilities.add_scale(
        "duration",
        &theme.scale("transitionDuration"),
        &["transition-duration"],
    );
    keywords(
        utilities,
        "transition-timing-function",
        &[
            ("ease-linear", "linear"),
            ("ease-in", "cubic-bezier(0.4, 0, 1, 1)"),
            ("ease-out", "cubic-bezier(0, 0, 0.2, 1)"),
            ("ease-in-out", EASE),
        ],
    );
    Ok(())
}

fn interactivity(theme: &Theme, utilities: &mut UtilityRegistrar<'_>) -> PluginResult {
    utilities.add_scale("accent", &theme.scale("accentColor"), &["accent-color"]);
    for value in ["auto", "default", "pointer", "wait", "text", "move", "not-allowed"] {
        utilities.add(format!("cursor-{}", value), &[("cursor", value)]);
    }
    keywords(
        utilities,
        "pointer-events",
        &[("pointer-events-none", "none"), ("pointer-events-auto", "auto")],
    );
    keywords(
        utilities,
        "user-select",
        &[
            ("select-none", "none"),
            ("select-text", "text"),
            ("select-all", "all"),
            ("select-auto", "auto"),
        ],
    );
    Ok(())
}

/// Orders `name → length` pairs by numeric length when units agree.
pub(crate) fn sorted_by_length(mut entries: Vec<(String, String)>) -> Vec<(String, String)> {
    entries.sort_by(|a, b| {
        if let (Some((a_num, a_unit)), Some((b_num, b_unit))) =
            (parse_length_value(&a.1), parse_length_value(&b.1))
        {
            if a_unit == b_unit {
                return a_num
                    .partial_cmp(&b_num)
                    .unwrap_or(std::cmp::Ordering::Equal);
            }
        }
        a.1.cmp(&b.1)
    });
    entries
}

fn parse_length_value(raw: &str) -> Option<(f64, &str)> {
    let value = raw.trim();
    let split_idx = value
        .char_indices()
        .find(|(_, ch)| !ch.is_ascii_digit() && *ch != '.')
        .map(|(idx, _)| idx)?;
    let number = value[..split_idx].parse::<f64>().ok()?;
    let unit = value[split_idx..].trim();
    if unit.is_empty() {
        return None;
    }
    Some((number, unit))
}

#[cfg(test)]
mod tests {
    use super::{sorted_by_length, transparent_version};
    use crate::config::DarkMode;
    use crate::plugin::register_all;
    use crate::plugins::core_plugins;
    use crate::theme::{ThemeSources, ThemeValue, resolve};
    use crate::variant::VariantTransform;

    fn registries(dark_mode: DarkMode) -> crate::plugin::Registries {
        let theme = resolve(&ThemeSources::default()).expect("default theme should resolve");
        register_all(&theme, &core_plugins(&dark_mode)).expect("core plugins should register")
    }

    #[test]
    fn registers_spacing_utilities_from_theme() {
        let registries = registries(DarkMode::Media);
        let padding = registries
            .utilities
            .exact("p-4")
            .expect("p-4 should be registered");
        assert_eq!(padding.rules[0].declarations[0].property, "padding");
        assert_eq!(padding.rules[0].declarations[0].value, "1rem");

        let margin = registries
            .utilities
            .exact("-mx-2")
            .expect("negative margins should be registered");
        assert_eq!(margin.rules[0].declarations.len(), 2);
        assert_eq!(margin.rules[0].declarations[0].value, "-0.5rem");

        let left = registries
            .utilities
            .exact("left-1/4")
            .expect("fractional insets should be registered");
        assert_eq!(left.rules[0].declarations[0].value, "25%");
    }

    #[test]
    fn margins_register_before_padding() {
        let registries = registries(DarkMode::Media);
        let margin = registries.utilities.exact("m-2").expect("m-2 should exist");
        let padding = registries.utilities.exact("p-4").expect("p-4 should exist");
        assert!(margin.order < padding.order);
    }

    #[test]
    fn screens_rank_by_width() {
        let registries = registries(DarkMode::Media);
        let sm = registries.variants.get("sm").expect("sm should exist");
        let xl2 = registries.variants.get("2xl").expect("2xl should exist");
        assert!(sm.rank < xl2.rank);
        assert_eq!(
            xl2.transform,
            VariantTransform::AtRule("@media (min-width: 1536px)".to_string())
        );
        let hover = registries.variants.get("hover").expect("hover should exist");
        assert!(hover.rank < sm.rank);
    }

    #[test]
    fn dark_mode_strategy_selects_transform() {
        let media = registries(DarkMode::Media);
        assert_eq!(
            media.variants.get("dark").map(|variant| &variant.transform),
            Some(&VariantTransform::AtRule(
                "@media (prefers-color-scheme: dark)".to_string()
            ))
        );

        let class = registries(DarkMode::Class(".dark".to_string()));
        assert_eq!(
            class.variants.get("dark").map(|variant| &variant.transform),
            Some(&VariantTransform::Selector(":is(.dark &)".to_string()))
        );
    }

    #[test]
    fn aria_variants_follow_theme() {
        let registries = registries(DarkMode::Media);
        let checked = registries
            .variants
            .get("aria-checked")
            .expect("aria-checked should exist");
        assert_eq!(
            checked.transform,
            VariantTransform::Selector("&[aria-checked=\"true\"]".to_string())
        );
    }

    #[test]
    fn fades_hex_colors_for_gradients() {
        assert_eq!(transparent_version("#000"), "rgb(0 0 0 / 0)");
        assert_eq!(transparent_version("#3b82f6"), "rgb(59 130 246 / 0)");
        assert_eq!(transparent_version("currentColor"), "transparent");
    }

    #[test]
    fn non_ascii_hex_colors_fade_to_transparent() {
        assert_eq!(transparent_version("#aébcd"), "transparent");
        assert_eq!(transparent_version("#aé"), "transparent");

        let mut sources = ThemeSources::default();
        sources.extend.push(
            [(
                "colors".to_string(),
                ThemeValue::map([("brand", "#aébcd")]),
            )]
            .into_iter()
            .collect(),
        );
        let theme = resolve(&sources).expect("theme should resolve");
        let registries = register_all(&theme, &core_plugins(&DarkMode::Media))
            .expect("odd colors should not fail registration");
        assert!(registries.utilities.exact("from-brand").is_some());
    }

    #[test]
    fn sorts_lengths_numerically() {
        let sorted = sorted_by_length(vec![
            ("xl".to_string(), "1280px".to_string()),
            ("sm".to_string(), "640px".to_string()),
            ("md".to_string(), "768px".to_string()),
        ]);
        let names = sorted.iter().map(|(name, _)| name.as_str()).collect::<Vec<_>>();
        assert_eq!(names, vec!["sm", "md", "xl"]);
    }
}
