//! CSS text output: selector escaping and rule serialization.

use crate::registry::Declaration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    /// Wrapping at-rule preludes, outermost first.
    pub at_rules: Vec<String>,
    pub selector: String,
    pub declarations: Vec<Declaration>,
}

impl Rule {
    pub fn to_css(&self, minify: bool) -> String {
        let mut rule = if minify {
            let body = self
                .declarations
                .iter()
                .map(|decl| format!("{}:{}", decl.property, decl.value))
                .collect::<Vec<_>>()
                .join(";");
            format!("{}{{{}}}", self.selector.replace(", ", ","), body)
        } else {
            let mut body = String::new();
            for decl in &self.declarations {
                body.push_str(&format!("  {}: {};\n", decl.property, decl.value));
            }
            format!("{} {{\n{}}}", self.selector, body)
        };
        for prelude in self.at_rules.iter().rev() {
            rule = wrap_rule(prelude, &rule, minify);
        }
        rule
    }
}

pub fn stylesheet(rules: &[Rule], minify: bool) -> String {
    if minify {
        return rules.iter().map(|rule| rule.to_css(true)).collect();
    }
    let mut css = rules
        .iter()
        .map(|rule| rule.to_css(false))
        .collect::<Vec<_>>()
        .join("\n\n");
    if !css.is_empty() {
        css.push('\n');
    }
    css
}

fn wrap_rule(prelude: &str, rule: &str, minify: bool) -> String {
    if minify {
        format!("{}{{{}}}", prelude, rule)
    } else {
        format!("{} {{\n{}\n}}", prelude, indent_css_block(rule, 2))
    }
}

fn indent_css_block(block: &str, width: usize) -> String {
    let pad = " ".repeat(width);
    block
        .lines()
        .map(|line| {
            if line.is_empty() {
                String::new()
            } else {
                format!("{}{}", pad, line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Escapes a class name for use after `.` in a selector.
pub fn escape_class(class: &str) -> String {
    let mut escaped = String::with_capacity(class.len() * 2);

    for (idx, ch) in class.chars().enumerate() {
        match ch {
            '0'..='9' if idx == 0 => escaped.push_str(&format!("\\{:x} ", ch as u32)),
            '-' if idx == 0 && class.len() == 1 => escaped.push_str("\\-"),
            ' ' => escaped.push_str("\\ "),
            'a'..='z' | 'A'..='Z' | '0'..='9' | '-' | '_' => escaped.push(ch),
            _ if !ch.is_ascii() => escaped.push(ch),
            _ => {
                escaped.push('\\');
                escaped.push(ch);
            }
        }
    }

    escaped
}

#[cfg(test)]
mod tests {
    use super::{Rule, escape_class, stylesheet};
    use crate::registry::Declaration;

    fn rule(at_rules: &[&str], selector: &str) -> Rule {
        Rule {
            at_rules: at_rules.iter().map(|prelude| prelude.to_string()).collect(),
            selector: selector.to_string(),
            declarations: vec![
                Declaration::new("padding", "1rem"),
                Declaration::new("margin", "0"),
            ],
        }
    }

    #[test]
    fn escapes_class_names() {
        assert_eq!(escape_class("md:hover:p-4"), "md\\:hover\\:p-4");
        assert_eq!(escape_class("w-1/2"), "w-1\\/2");
        assert_eq!(escape_class("p-0.5"), "p-0\\.5");
        assert_eq!(escape_class("bg-[#123]"), "bg-\\[\\#123\\]");
        assert_eq!(escape_class("!m-2"), "\\!m-2");
        assert_eq!(escape_class("2xl:p-4"), "\\32 xl\\:p-4");
        assert_eq!(escape_class("@md:flex"), "\\@md\\:flex");
    }

    #[test]
    fn pretty_output_nests_at_rules() {
        let css = rule(&["@media (min-width: 768px)", "@media print"], ".p-4").to_css(false);
        assert_eq!(
            css,
            "@media (min-width: 768px) {\n  @media print {\n    .p-4 {\n      padding: 1rem;\n      margin: 0;\n    }\n  }\n}"
        );
    }

    #[test]
    fn minified_output_has_no_whitespace_between_tokens() {
        let css = stylesheet(
            &[
                rule(&[], ".a, .b"),
                rule(&["@media (min-width: 768px)"], ".c"),
            ],
            true,
        );
        assert_eq!(
            css,
            ".a,.b{padding:1rem;margin:0}@media (min-width: 768px){.c{padding:1rem;margin:0}}"
        );
    }

    #[test]
    fn pretty_stylesheet_separates_rules_with_blank_lines() {
        let css = stylesheet(&[rule(&[], ".a"), rule(&[], ".b")], false);
        assert_eq!(
            css,
            ".a {\n  padding: 1rem;\n  margin: 0;\n}\n\n.b {\n  padding: 1rem;\n  margin: 0;\n}\n"
        );
        assert_eq!(stylesheet(&[], false), "");
    }
}
