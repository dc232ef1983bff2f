//! Language-agnostic class candidate extraction.
//!
//! Any maximal run of the class alphabet is a candidate, whatever the file
//! type. Over-extraction is harmless: candidates that match no utility are
//! dropped later.

use std::collections::HashMap;

/// Where a candidate was first seen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Origin {
    pub file: usize,
    pub offset: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassCandidate {
    pub raw: String,
    pub origin: Origin,
}

/// Distinct candidates. Each keeps its smallest origin so merging partial
/// sets in any order gives the same result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateSet {
    entries: HashMap<String, Origin>,
}

impl CandidateSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, raw: &str, origin: Origin) {
        match self.entries.get_mut(raw) {
            Some(existing) => {
                if origin < *existing {
                    *existing = origin;
                }
            }
            None => {
                self.entries.insert(raw.to_string(), origin);
            }
        }
    }

    /// Set union.
    pub fn merge(mut self, other: CandidateSet) -> CandidateSet {
        if self.entries.len() < other.entries.len() {
            return other.merge(self);
        }
        for (raw, origin) in other.entries {
            self.insert(&raw, origin);
        }
        self
    }

    pub fn contains(&self, raw: &str) -> bool {
        self.entries.contains_key(raw)
    }

    pub fn origin(&self, raw: &str) -> Option<Origin> {
        self.entries.get(raw).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Origin)> {
        self.entries.iter().map(|(raw, origin)| (raw.as_str(), *origin))
    }

    /// Candidates ordered by string.
    pub fn to_sorted_vec(&self) -> Vec<ClassCandidate> {
        let mut candidates = self
            .entries
            .iter()
            .map(|(raw, origin)| ClassCandidate {
                raw: raw.clone(),
                origin: *origin,
            })
            .collect::<Vec<_>>();
        candidates.sort_by(|left, right| left.raw.cmp(&right.raw));
        candidates
    }
}

pub fn extract(text: &str, file: usize) -> CandidateSet {
    let mut set = CandidateSet::new();
    extract_into(text, file, &mut set);
    set
}

pub fn extract_into(text: &str, file: usize, set: &mut CandidateSet) {
    for (offset, token) in tokenize(text) {
        let origin = Origin { file, offset };
        if is_valid_candidate(token) {
            set.insert(token, origin);
        }
        let trimmed = token.trim_end_matches(['.', ':']);
        if trimmed.len() != token.len() && is_valid_candidate(trimmed) {
            set.insert(trimmed, origin);
        }
    }
}

/// Maximal runs of the class alphabet with their byte offsets. Inside
/// brackets everything but whitespace and quote characters continues the run.
pub fn tokenize(text: &str) -> Vec<(usize, &str)> {
    let bytes = text.as_bytes();
    let mut tokens = Vec::new();
    let mut idx = 0;

    while idx < bytes.len() {
        if !is_token_byte(bytes[idx]) {
            idx += 1;
            continue;
        }

        let start = idx;
        let mut bracket_depth = 0usize;
        while idx < bytes.len() {
            let byte = bytes[idx];
            if bracket_depth > 0 {
                if byte.is_ascii_whitespace() || byte == b'"' || byte == b'`' {
                    break;
                }
                match byte {
                    b'[' => bracket_depth += 1,
                    b']' => bracket_depth -= 1,
                    _ => {}
                }
            } else if byte == b'[' {
                bracket_depth = 1;
            } else if !is_token_byte(byte) {
                break;
            }
            idx += 1;
        }
        tokens.push((start, &text[start..idx]));
    }

    tokens
}

fn is_token_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric()
        || matches!(
            byte,
            b'-' | b'_' | b':' | b'/' | b'.' | b'%' | b'!' | b'#' | b'@' | b'[' | b']'
        )
}

fn is_valid_candidate(token: &str) -> bool {
    if token.is_empty()
        || token.starts_with('.')
        || token.starts_with('/')
        || token.starts_with(':')
        || token.ends_with(':')
    {
        return false;
    }

    let mut has_letter_or_bracket = false;
    let mut bracket_depth = 0usize;

    for (idx, byte) in token.bytes().enumerate() {
        if byte.is_ascii_alphabetic() || byte == b'[' {
            has_letter_or_bracket = true;
        }
        match byte {
            b'[' => bracket_depth += 1,
            b']' => {
                if bracket_depth == 0 {
                    return false;
                }
                bracket_depth -= 1;
            }
            b'!' => {
                let after_variant = idx > 0 && token.as_bytes()[idx - 1] == b':';
                if bracket_depth == 0 && idx > 0 && !after_variant {
                    return false;
                }
            }
            _ => {}
        }
    }

    bracket_depth == 0 && has_letter_or_bracket
}

#[cfg(test)]
mod tests {
    use super::{CandidateSet, Origin, extract, tokenize};

    fn strings(set: &CandidateSet) -> Vec<String> {
        set.to_sorted_vec().into_iter().map(|c| c.raw).collect()
    }

    #[test]
    fn extracts_from_class_attribute() {
        let set = extract(r#"<div class="p-4 m-2 unknown-token"></div>"#, 0);
        assert!(set.contains("p-4"));
        assert!(set.contains("m-2"));
        assert!(set.contains("unknown-token"));
        assert!(set.contains("div"));
    }

    #[test]
    fn extracts_from_any_language() {
        let rust = r#"view! { <nav class="flex p-4 aria-current:font-bold">"#;
        let set = extract(rust, 0);
        assert!(set.contains("flex"));
        assert!(set.contains("aria-current:font-bold"));

        let script = "const cls = `md:hover:bg-slate-600 ${active}`;";
        let set = extract(script, 0);
        assert!(set.contains("md:hover:bg-slate-600"));
    }

    #[test]
    fn keeps_arbitrary_values_intact() {
        let set = extract(
            r#"<div class="bg-[url('/img/hero.png')] [&>*]:p-4 grid-cols-[1fr_2fr] [mask-type:luminance]">"#,
            0,
        );
        assert!(set.contains("bg-[url('/img/hero.png')]"));
        assert!(set.contains("[&>*]:p-4"));
        assert!(set.contains("grid-cols-[1fr_2fr]"));
        assert!(set.contains("[mask-type:luminance]"));
    }

    #[test]
    fn drops_unbalanced_and_letterless_tokens() {
        let set = extract("w-[10px 123 -- 4.5 ]oops", 0);
        assert!(!set.contains("w-[10px"));
        assert!(!set.contains("123"));
        assert!(!set.contains("--"));
        assert!(!set.contains("]oops"));
    }

    #[test]
    fn trims_trailing_punctuation() {
        let set = extract("Use flex. Then hover:", 0);
        assert!(set.contains("flex"));
        assert!(set.contains("hover"));
        assert!(!set.contains("hover:"));
    }

    #[test]
    fn important_marker_only_leads() {
        let set = extract("!m-2 md:!p-4 a!b", 0);
        assert!(set.contains("!m-2"));
        assert!(set.contains("md:!p-4"));
        assert!(!set.contains("a!b"));
    }

    #[test]
    fn tokenizes_with_offsets() {
        let tokens = tokenize("  p-4\tm-2");
        assert_eq!(tokens, vec![(2, "p-4"), (6, "m-2")]);
    }

    #[test]
    fn merge_keeps_smallest_origin() {
        let left = extract("flex", 3);
        let right = extract("grid flex", 1);
        let merged = left.clone().merge(right.clone());
        let other_way = right.merge(left);
        assert_eq!(merged, other_way);
        assert_eq!(merged.origin("flex"), Some(Origin { file: 1, offset: 5 }));
        assert_eq!(strings(&merged), vec!["flex", "grid"]);
    }
}
