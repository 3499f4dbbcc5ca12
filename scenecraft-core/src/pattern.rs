//! Name-matching patterns shared by rename propagation and rendering.
//!
//! Every pattern over character names is built here. Names are escaped
//! before they reach the regex compiler, so a name like `"A.J."` or `"C++"`
//! only ever matches its literal text.
//!
//! Two shapes are supported:
//!
//! - **Word** patterns find a name bounded on both sides by a string edge or
//!   a non-word character. `"Ann"` matches in `"Ann, Bob"` but not in
//!   `"Anna"`. A word character is alphanumeric or `_`. The check looks at
//!   the surrounding characters rather than using `\b`, so names that start
//!   or end with punctuation still match, even back to back.
//! - **Marker** patterns find `***name***`.
//!
//! Alternatives are ordered longest first so that `"Anna"` wins over `"Ann"`
//! when both are known.

use regex::{Regex, RegexBuilder};
use std::ops::Range;

/// Whether matching ignores letter case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseMode {
    Sensitive,
    Insensitive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shape {
    Word,
    Marker,
}

/// A compiled alternation over a set of names.
#[derive(Debug, Clone)]
pub struct NamePattern {
    /// `None` when there is nothing to match.
    regex: Option<Regex>,
    /// Distinct non-empty names in the caller's order, for canonical lookup.
    names: Vec<String>,
    case: CaseMode,
    shape: Shape,
}

/// One occurrence of a name in a haystack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameMatch<'p, 't> {
    /// Byte range to replace; includes the `***` fences for marker patterns.
    pub range: Range<usize>,
    /// The name exactly as it appears in the haystack.
    pub text: &'t str,
    /// The known name this occurrence resolves to.
    pub canonical: &'p str,
}

impl NamePattern {
    /// Build a whole-word pattern over `names`.
    pub fn words<I>(names: I, case: CaseMode) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        Self::build(names, case, Shape::Word)
    }

    /// Build a `***name***` marker pattern over `names`. Always case-insensitive.
    pub fn markers<I>(names: I) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        Self::build(names, CaseMode::Insensitive, Shape::Marker)
    }

    fn build<I>(names: I, case: CaseMode, shape: Shape) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut distinct: Vec<String> = Vec::new();
        for name in names {
            let name = name.as_ref();
            if !name.is_empty() && !distinct.iter().any(|n| n == name) {
                distinct.push(name.to_string());
            }
        }

        let regex = if distinct.is_empty() {
            None
        } else {
            let source = pattern_source(&distinct, shape);
            match RegexBuilder::new(&source)
                .case_insensitive(case == CaseMode::Insensitive)
                .build()
            {
                Ok(regex) => Some(regex),
                Err(e) => {
                    tracing::error!(
                        error = %e,
                        "failed to compile name pattern; matching disabled"
                    );
                    None
                }
            }
        };

        Self {
            regex,
            names: distinct,
            case,
            shape,
        }
    }

    /// True if this pattern can never match.
    pub fn is_empty(&self) -> bool {
        self.regex.is_none()
    }

    /// Iterate over non-overlapping matches from left to right.
    pub fn find_iter<'p, 't>(&'p self, haystack: &'t str) -> Matches<'p, 't> {
        Matches {
            pattern: self,
            haystack,
            pos: 0,
        }
    }

    /// Replace every match with the output of `replacement`.
    pub fn replace_all<F>(&self, haystack: &str, mut replacement: F) -> String
    where
        F: FnMut(&NameMatch<'_, '_>) -> String,
    {
        let mut out = String::with_capacity(haystack.len());
        let mut last = 0;
        for m in self.find_iter(haystack) {
            out.push_str(&haystack[last..m.range.start]);
            out.push_str(&replacement(&m));
            last = m.range.end;
        }
        out.push_str(&haystack[last..]);
        out
    }

    /// Resolve matched text back to the known name it came from.
    ///
    /// The first known name that is equal (under this pattern's case mode)
    /// wins.
    pub fn canonical<'p>(&'p self, matched: &str) -> Option<&'p str> {
        match self.case {
            CaseMode::Sensitive => self.names.iter().find(|n| *n == matched),
            CaseMode::Insensitive => {
                let lower = matched.to_lowercase();
                self.names.iter().find(|n| n.to_lowercase() == lower)
            }
        }
        .map(String::as_str)
    }
}

/// Escape every name and join them into one alternation.
fn pattern_source(names: &[String], shape: Shape) -> String {
    let mut ordered: Vec<&str> = names.iter().map(String::as_str).collect();
    // Stable, so equal-length names keep caller order.
    ordered.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()));

    let alternation = ordered
        .iter()
        .map(|n| regex::escape(n))
        .collect::<Vec<_>>()
        .join("|");

    match shape {
        // Only the trailing boundary lives in the regex, so a longer name that
        // fails it falls back to a shorter one. The leading boundary is
        // checked in `Matches::next` because the previous match may own it.
        Shape::Word => format!(r"(?P<name>{alternation})(?:[^\p{{Alphabetic}}\p{{N}}_]|$)"),
        Shape::Marker => format!(r"\*\*\*(?P<name>{alternation})\*\*\*"),
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Iterator over the matches of a [`NamePattern`].
pub struct Matches<'p, 't> {
    pattern: &'p NamePattern,
    haystack: &'t str,
    pos: usize,
}

impl<'p, 't> Iterator for Matches<'p, 't> {
    type Item = NameMatch<'p, 't>;

    fn next(&mut self) -> Option<Self::Item> {
        let regex = self.pattern.regex.as_ref()?;
        loop {
            if self.pos > self.haystack.len() {
                return None;
            }

            let caps = regex.captures_at(self.haystack, self.pos)?;
            let whole = caps.get(0)?;
            let name = caps.name("name")?;

            let range = match self.pattern.shape {
                Shape::Word => name.range(),
                Shape::Marker => whole.range(),
            };

            if self.pattern.shape == Shape::Word
                && self.haystack[..range.start]
                    .chars()
                    .next_back()
                    .is_some_and(is_word_char)
            {
                // Retry one character further on.
                let step = name.as_str().chars().next().map_or(1, char::len_utf8);
                self.pos = range.start + step;
                continue;
            }

            // Names are never empty, so this always moves forward.
            self.pos = range.end;

            // Lookup only misses if the regex engine's case folding disagrees
            // with `to_lowercase`; such a span is left as plain text.
            let text = name.as_str();
            if let Some(canonical) = self.pattern.canonical(text) {
                return Some(NameMatch {
                    range,
                    text,
                    canonical,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(names: &[&str]) -> NamePattern {
        NamePattern::words(names.iter().copied(), CaseMode::Sensitive)
    }

    fn found(pattern: &NamePattern, text: &str) -> Vec<String> {
        pattern.find_iter(text).map(|m| m.text.to_string()).collect()
    }

    #[test]
    fn test_word_boundaries() {
        let p = words(&["Ann"]);
        assert_eq!(found(&p, "Ann smiled at Anna."), vec!["Ann"]);
        assert!(found(&p, "Joanne and Annabel").is_empty());
        assert_eq!(found(&p, "Ann"), vec!["Ann"]);
        assert_eq!(found(&p, "(Ann)"), vec!["Ann"]);
        assert_eq!(found(&p, "Ann,Ann Ann"), vec!["Ann", "Ann", "Ann"]);
        assert!(found(&p, "Ann_x").is_empty());
        assert!(found(&p, "xAnn and _Ann").is_empty());
        assert_eq!(found(&p, "xAnn Ann"), vec!["Ann"]);
    }

    #[test]
    fn test_adjacent_punctuated_names() {
        let p = words(&["(Bob)"]);
        assert_eq!(found(&p, "(Bob)(Bob) left."), vec!["(Bob)", "(Bob)"]);
        let out = p.replace_all("(Bob)(Bob) left.", |_| "Rob".to_string());
        assert_eq!(out, "RobRob left.");
    }

    #[test]
    fn test_metacharacters_are_literal() {
        let p = words(&["A.J."]);
        assert_eq!(found(&p, "A.J. waved at AxJy."), vec!["A.J."]);
        assert!(found(&p, "ABJC").is_empty());

        let p = words(&["C++", "(Bob)"]);
        assert_eq!(found(&p, "C++ met (Bob) today"), vec!["C++", "(Bob)"]);
    }

    #[test]
    fn test_longest_name_wins() {
        let p = words(&["Ann", "Anna"]);
        assert_eq!(found(&p, "Anna met Ann"), vec!["Anna", "Ann"]);
    }

    #[test]
    fn test_shorter_name_used_when_longer_fails_boundary() {
        let p = words(&["Ann", "Ann B"]);
        assert_eq!(found(&p, "Ann Bx"), vec!["Ann"]);
    }

    #[test]
    fn test_case_modes() {
        let sensitive = words(&["Ann"]);
        assert!(found(&sensitive, "ANN left").is_empty());

        let insensitive = NamePattern::words(["Ann"], CaseMode::Insensitive);
        let m: Vec<_> = insensitive.find_iter("ANN left").collect();
        assert_eq!(m.len(), 1);
        assert_eq!(m[0].text, "ANN");
        assert_eq!(m[0].canonical, "Ann");
    }

    #[test]
    fn test_multibyte_boundaries() {
        let p = words(&["Zoë"]);
        assert_eq!(found(&p, "«Zoë» sang"), vec!["Zoë"]);
        assert!(found(&p, "Zoëy sang").is_empty());
    }

    #[test]
    fn test_empty_names_never_match() {
        let p = words(&[""]);
        assert!(p.is_empty());
        assert!(found(&p, "anything").is_empty());
        assert_eq!(p.replace_all("anything", |_| "X".into()), "anything");
    }

    #[test]
    fn test_replace_all() {
        let p = words(&["Ann"]);
        let out = p.replace_all("Ann smiled at Anna. Ann!", |_| "Annabelle".to_string());
        assert_eq!(out, "Annabelle smiled at Anna. Annabelle!");
    }

    #[test]
    fn test_markers() {
        let p = NamePattern::markers(["Ann", "Bob"]);
        let m: Vec<_> = p.find_iter("***ann*** and ***Bob*** and ***Cy***").collect();
        assert_eq!(m.len(), 2);
        assert_eq!(m[0].canonical, "Ann");
        assert_eq!(m[0].range, 0..9);
        assert_eq!(m[1].canonical, "Bob");
    }

    #[test]
    fn test_canonical_prefers_first_known() {
        let p = NamePattern::words(["ann", "Ann"], CaseMode::Insensitive);
        assert_eq!(p.canonical("ANN"), Some("ann"));
    }
}
