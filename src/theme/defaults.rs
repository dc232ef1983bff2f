//! Built-in design tokens.

use super::{ThemeTree, ThemeValue, Token};
use std::collections::BTreeMap;

const SHADES: [&str; 11] = [
    "50", "100", "200", "300", "400", "500", "600", "700", "800", "900", "950",
];

const PALETTES: &[(&str, [&str; 11])] = &[
    (
        "slate",
        [
            "#f8fafc", "#f1f5f9", "#e2e8f0", "#cbd5e1", "#94a3b8", "#64748b", "#475569",
            "#334155", "#1e293b", "#0f172a", "#020617",
        ],
    ),
    (
        "gray",
        [
            "#f9fafb", "#f3f4f6", "#e5e7eb", "#d1d5db", "#9ca3af", "#6b7280", "#4b5563",
            "#374151", "#1f2937", "#111827", "#030712",
        ],
    ),
    (
        "neutral",
        [
            "#fafafa", "#f5f5f5", "#e5e5e5", "#d4d4d4", "#a3a3a3", "#737373", "#525252",
            "#404040", "#262626", "#171717", "#0a0a0a",
        ],
    ),
    (
        "red",
        [
            "#fef2f2", "#fee2e2", "#fecaca", "#fca5a5", "#f87171", "#ef4444", "#dc2626",
            "#b91c1c", "#991b1b", "#7f1d1d", "#450a0a",
        ],
    ),
    (
        "amber",
        [
            "#fffbeb", "#fef3c7", "#fde68a", "#fcd34d", "#fbbf24", "#f59e0b", "#d97706",
            "#b45309", "#92400e", "#78350f", "#451a03",
        ],
    ),
    (
        "green",
        [
            "#f0fdf4", "#dcfce7", "#bbf7d0", "#86efac", "#4ade80", "#22c55e", "#16a34a",
            "#15803d", "#166534", "#14532d", "#052e16",
        ],
    ),
    (
        "teal",
        [
            "#f0fdfa", "#ccfbf1", "#99f6e4", "#5eead4", "#2dd4bf", "#14b8a6", "#0d9488",
            "#0f766e", "#115e59", "#134e4a", "#042f2e",
        ],
    ),
    (
        "blue",
        [
            "#eff6ff", "#dbeafe", "#bfdbfe", "#93c5fd", "#60a5fa", "#3b82f6", "#2563eb",
            "#1d4ed8", "#1e40af", "#1e3a8a", "#172554",
        ],
    ),
    (
        "indigo",
        [
            "#eef2ff", "#e0e7ff", "#c7d2fe", "#a5b4fc", "#818cf8", "#6366f1", "#4f46e5",
            "#4338ca", "#3730a3", "#312e81", "#1e1b4b",
        ],
    ),
    (
        "purple",
        [
            "#faf5ff", "#f3e8ff", "#e9d5ff", "#d8b4fe", "#c084fc", "#a855f7", "#9333ea",
            "#7e22ce", "#6b21a8", "#581c87", "#3b0764",
        ],
    ),
    (
        "pink",
        [
            "#fdf2f8", "#fce7f3", "#fbcfe8", "#f9a8d4", "#f472b6", "#ec4899", "#db2777",
            "#be185d", "#9d174d", "#831843", "#500724",
        ],
    ),
];

const SPACING: &[(&str, &str)] = &[
    ("px", "1px"),
    ("0", "0px"),
    ("0.5", "0.125rem"),
    ("1", "0.25rem"),
    ("1.5", "0.375rem"),
    ("2", "0.5rem"),
    ("2.5", "0.625rem"),
    ("3", "0.75rem"),
    ("3.5", "0.875rem"),
    ("4", "1rem"),
    ("5", "1.25rem"),
    ("6", "1.5rem"),
    ("7", "1.75rem"),
    ("8", "2rem"),
    ("9", "2.25rem"),
    ("10", "2.5rem"),
    ("11", "2.75rem"),
    ("12", "3rem"),
    ("14", "3.5rem"),
    ("16", "4rem"),
    ("20", "5rem"),
    ("24", "6rem"),
    ("28", "7rem"),
    ("32", "8rem"),
    ("36", "9rem"),
    ("40", "10rem"),
    ("44", "11rem"),
    ("48", "12rem"),
    ("52", "13rem"),
    ("56", "14rem"),
    ("60", "15rem"),
    ("64", "16rem"),
    ("72", "18rem"),
    ("80", "20rem"),
    ("96", "24rem"),
];

const FRACTIONS: &[(&str, &str)] = &[
    ("1/2", "50%"),
    ("1/3", "33.333333%"),
    ("2/3", "66.666667%"),
    ("1/4", "25%"),
    ("3/4", "75%"),
    ("full", "100%"),
];

const FONT_SIZES: &[(&str, &str, &str)] = &[
    ("xs", "0.75rem", "1rem"),
    ("sm", "0.875rem", "1.25rem"),
    ("base", "1rem", "1.5rem"),
    ("lg", "1.125rem", "1.75rem"),
    ("xl", "1.25rem", "1.75rem"),
    ("2xl", "1.5rem", "2rem"),
    ("3xl", "1.875rem", "2.25rem"),
    ("4xl", "2.25rem", "2.5rem"),
    ("5xl", "3rem", "1"),
    ("6xl", "3.75rem", "1"),
    ("7xl", "4.5rem", "1"),
    ("8xl", "6rem", "1"),
    ("9xl", "8rem", "1"),
];

pub fn default_theme() -> ThemeTree {
    let mut theme = ThemeTree::new();

    theme.insert(
        "screens".to_string(),
        scalars(&[
            ("sm", "640px"),
            ("md", "768px"),
            ("lg", "1024px"),
            ("xl", "1280px"),
            ("2xl", "1536px"),
        ]),
    );
    theme.insert(
        "containers".to_string(),
        scalars(&[
            ("xs", "20rem"),
            ("sm", "24rem"),
            ("md", "28rem"),
            ("lg", "32rem"),
            ("xl", "36rem"),
            ("2xl", "42rem"),
            ("3xl", "48rem"),
            ("4xl", "56rem"),
            ("5xl", "64rem"),
            ("6xl", "72rem"),
            ("7xl", "80rem"),
        ]),
    );
    theme.insert("colors".to_string(), colors());
    theme.insert("spacing".to_string(), scalars(SPACING));

    theme.insert("padding".to_string(), ThemeValue::reference("spacing"));
    theme.insert("gap".to_string(), ThemeValue::reference("spacing"));
    theme.insert("margin".to_string(), spacing_with(&[("auto", "auto")], false));
    theme.insert(
        "inset".to_string(),
        spacing_with(&[("auto", "auto")], true),
    );
    theme.insert(
        "width".to_string(),
        spacing_with(
            &[
                ("auto", "auto"),
                ("screen", "100vw"),
                ("min", "min-content"),
                ("max", "max-content"),
                ("fit", "fit-content"),
            ],
            true,
        ),
    );
    theme.insert(
        "height".to_string(),
        spacing_with(
            &[
                ("auto", "auto"),
                ("screen", "100vh"),
                ("min", "min-content"),
                ("max", "max-content"),
                ("fit", "fit-content"),
            ],
            true,
        ),
    );
    theme.insert(
        "minHeight".to_string(),
        scalars(&[("0", "0px"), ("full", "100%"), ("screen", "100vh")]),
    );
    theme.insert(
        "maxWidth".to_string(),
        scalars(&[
            ("none", "none"),
            ("xs", "20rem"),
            ("sm", "24rem"),
            ("md", "28rem"),
            ("lg", "32rem"),
            ("xl", "36rem"),
            ("2xl", "42rem"),
            ("3xl", "48rem"),
            ("4xl", "56rem"),
            ("5xl", "64rem"),
            ("6xl", "72rem"),
            ("7xl", "80rem"),
            ("full", "100%"),
            ("prose", "65ch"),
        ]),
    );

    for key in [
        "textColor",
        "backgroundColor",
        "borderColor",
        "accentColor",
        "stroke",
        "fill",
        "gradientColorStops",
    ] {
        theme.insert(key.to_string(), ThemeValue::reference("colors"));
    }

    theme.insert(
        "fontSize".to_string(),
        ThemeValue::Map(
            FONT_SIZES
                .iter()
                .map(|(name, size, line_height)| {
                    (
                        name.to_string(),
                        ThemeValue::List(vec![(*size).into(), (*line_height).into()]),
                    )
                })
                .collect(),
        ),
    );
    theme.insert(
        "fontWeight".to_string(),
        scalars(&[
            ("thin", "100"),
            ("extralight", "200"),
            ("light", "300"),
            ("normal", "400"),
            ("medium", "500"),
            ("semibold", "600"),
            ("bold", "700"),
            ("extrabold", "800"),
            ("black", "900"),
        ]),
    );
    theme.insert(
        "borderRadius".to_string(),
        scalars(&[
            ("none", "0px"),
            ("sm", "0.125rem"),
            ("DEFAULT", "0.25rem"),
            ("md", "0.375rem"),
            ("lg", "0.5rem"),
            ("xl", "0.75rem"),
            ("2xl", "1rem"),
            ("3xl", "1.5rem"),
            ("full", "9999px"),
        ]),
    );
    theme.insert(
        "borderWidth".to_string(),
        scalars(&[
            ("DEFAULT", "1px"),
            ("0", "0px"),
            ("2", "2px"),
            ("4", "4px"),
            ("8", "8px"),
        ]),
    );
    theme.insert(
        "opacity".to_string(),
        ThemeValue::Map(
            (0..=20)
                .map(|step| {
                    let percent = step * 5;
                    let value = if percent == 100 {
                        "1".to_string()
                    } else {
                        format!("{}", f64::from(percent) / 100.0)
                    };
                    (percent.to_string(), ThemeValue::Scalar(value))
                })
                .collect(),
        ),
    );
    theme.insert(
        "gradientColorStopPositions".to_string(),
        ThemeValue::Map(
            (0..=20)
                .map(|step| {
                    let percent = format!("{}%", step * 5);
                    (percent.clone(), ThemeValue::Scalar(percent))
                })
                .collect(),
        ),
    );
    theme.insert(
        "zIndex".to_string(),
        scalars(&[
            ("auto", "auto"),
            ("0", "0"),
            ("10", "10"),
            ("20", "20"),
            ("30", "30"),
            ("40", "40"),
            ("50", "50"),
        ]),
    );
    theme.insert(
        "gridTemplateColumns".to_string(),
        ThemeValue::Map(
            std::iter::once(("none".to_string(), ThemeValue::scalar("none")))
                .chain((1..=12).map(|n| {
                    (
                        n.to_string(),
                        ThemeValue::Scalar(format!("repeat({}, minmax(0, 1fr))", n)),
                    )
                }))
                .collect(),
        ),
    );
    theme.insert(
        "gridColumn".to_string(),
        ThemeValue::Map(
            [
                ("auto".to_string(), ThemeValue::scalar("auto")),
                ("span-full".to_string(), ThemeValue::scalar("1 / -1")),
            ]
            .into_iter()
            .chain((1..=12).map(|n| {
                (
                    format!("span-{}", n),
                    ThemeValue::Scalar(format!("span {} / span {}", n, n)),
                )
            }))
            .collect(),
        ),
    );
    theme.insert(
        "boxShadow".to_string(),
        scalars(&[
            ("sm", "0 1px 2px 0 rgb(0 0 0 / 0.05)"),
            (
                "DEFAULT",
                "0 1px 3px 0 rgb(0 0 0 / 0.1), 0 1px 2px -1px rgb(0 0 0 / 0.1)",
            ),
            (
                "md",
                "0 4px 6px -1px rgb(0 0 0 / 0.1), 0 2px 4px -2px rgb(0 0 0 / 0.1)",
            ),
            (
                "lg",
                "0 10px 15px -3px rgb(0 0 0 / 0.1), 0 4px 6px -4px rgb(0 0 0 / 0.1)",
            ),
            ("none", "0 0 #0000"),
        ]),
    );
    theme.insert(
        "transitionDuration".to_string(),
        scalars(&[
            ("DEFAULT", "150ms"),
            ("75", "75ms"),
            ("100", "100ms"),
            ("150", "150ms"),
            ("200", "200ms"),
            ("300", "300ms"),
            ("500", "500ms"),
            ("700", "700ms"),
            ("1000", "1000ms"),
        ]),
    );
    theme.insert(
        "aria".to_string(),
        scalars(&[
            ("busy", "busy=\"true\""),
            ("checked", "checked=\"true\""),
            ("disabled", "disabled=\"true\""),
            ("expanded", "expanded=\"true\""),
            ("hidden", "hidden=\"true\""),
            ("pressed", "pressed=\"true\""),
            ("readonly", "readonly=\"true\""),
            ("required", "required=\"true\""),
            ("selected", "selected=\"true\""),
        ]),
    );
    theme.insert("data".to_string(), ThemeValue::Map(ThemeTree::new()));

    theme
}

fn colors() -> ThemeValue {
    let mut colors = scalars(&[
        ("inherit", "inherit"),
        ("current", "currentColor"),
        ("transparent", "transparent"),
        ("black", "#000"),
        ("white", "#fff"),
    ]);
    if let ThemeValue::Map(entries) = &mut colors {
        for (name, values) in PALETTES {
            entries.insert(
                name.to_string(),
                ThemeValue::Map(
                    SHADES
                        .iter()
                        .zip(values.iter())
                        .map(|(shade, value)| (shade.to_string(), ThemeValue::scalar(*value)))
                        .collect(),
                ),
            );
        }
    }
    colors
}

fn scalars(entries: &[(&str, &str)]) -> ThemeValue {
    ThemeValue::Map(
        entries
            .iter()
            .map(|(key, value)| (key.to_string(), ThemeValue::scalar(*value)))
            .collect(),
    )
}

/// The spacing scale plus fixed extras (and optionally the fraction keys).
/// Spacing entries win over an extra with the same key.
fn spacing_with(
    extras: &'static [(&'static str, &'static str)],
    with_fractions: bool,
) -> ThemeValue {
    ThemeValue::lazy(move |theme| {
        let mut entries = BTreeMap::new();
        for (key, value) in extras {
            entries.insert(key.to_string(), ThemeValue::scalar(*value));
        }
        if let Some(Token::Map(spacing)) = theme.get("spacing")? {
            for (key, value) in spacing {
                entries.insert(key, ThemeValue::from(value));
            }
        }
        for (key, value) in FRACTIONS.iter().filter(|_| with_fractions) {
            entries
                .entry(key.to_string())
                .or_insert_with(|| ThemeValue::scalar(*value));
        }
        Ok(Some(ThemeValue::Map(entries)))
    })
}

#[cfg(test)]
mod tests {
    use super::default_theme;
    use crate::theme::{ThemeSources, resolve};

    #[test]
    fn default_theme_resolves_without_errors() {
        let sources = ThemeSources {
            defaults: default_theme(),
            ..ThemeSources::default()
        };
        let theme = resolve(&sources).expect("default theme should resolve");
        assert_eq!(theme.scalar("colors.red.500"), Some("#ef4444"));
        assert_eq!(theme.scalar("textColor.slate.700"), Some("#334155"));
        assert_eq!(theme.scalar("margin.auto"), Some("auto"));
        assert_eq!(theme.scalar("inset.1/4"), Some("25%"));
        assert_eq!(theme.scalar("opacity.50"), Some("0.5"));
        assert_eq!(theme.scalar("gridColumn.span-2"), Some("span 2 / span 2"));
        assert_eq!(theme.scalar("fontSize.xl.0"), Some("1.25rem"));
    }
}
