/*
 * matcher.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Finding the reference a citation token refers to.
//!
//! Two strategies exist and one is chosen per run:
//!
//! - [`LabelMatcher`]: the token is a label and must equal a record's `%L`
//!   field exactly. The first such record wins.
//! - [`KeywordMatcher`]: the token is a set of keywords scored against the
//!   words of every record's label. The best score wins.

use crate::query::QuerySyntax;
use crate::reference::Reference;

/// The outcome of a successful lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match {
    /// Index of the selected reference in the store.
    pub index: usize,
    /// How many references shared the winning score (1 when unambiguous).
    pub matches: usize,
}

impl Match {
    pub fn is_ambiguous(&self) -> bool {
        self.matches > 1
    }
}

/// A citation lookup strategy.
pub trait Matcher {
    /// Short name used in log output.
    fn name(&self) -> &'static str;

    /// How query text is split into tokens for this strategy.
    fn syntax(&self) -> QuerySyntax;

    /// Select the reference for `token`, if any.
    fn lookup(&self, references: &[Reference], token: &str) -> Option<Match>;
}

/// Exact label matching.
#[derive(Debug, Clone, Copy, Default)]
pub struct LabelMatcher;

impl Matcher for LabelMatcher {
    fn name(&self) -> &'static str {
        "label"
    }

    fn syntax(&self) -> QuerySyntax {
        QuerySyntax::Labels
    }

    fn lookup(&self, references: &[Reference], token: &str) -> Option<Match> {
        references
            .iter()
            .position(|r| r.label() == Some(token))
            .map(|index| Match { index, matches: 1 })
    }
}

/// Fuzzy keyword matching against label words.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordMatcher;

impl KeywordMatcher {
    /// Score of one reference for a keyword set, in thirds.
    ///
    /// A keyword found `count > 0` times among the label words contributes
    /// `1 + (count - 1) / 3`, i.e. `count + 2` thirds. Integer thirds keep
    /// equal scores exactly equal.
    pub fn score(reference: &Reference, keywords: &[String]) -> u32 {
        let Some(label) = reference.label() else {
            return 0;
        };
        let label = label.to_lowercase();
        let words: Vec<&str> = label.split_whitespace().collect();
        keywords
            .iter()
            .map(|keyword| {
                let count = words.iter().filter(|w| **w == keyword.as_str()).count() as u32;
                if count == 0 { 0 } else { count + 2 }
            })
            .sum()
    }

    fn keywords(token: &str) -> Vec<String> {
        token.split_whitespace().map(str::to_lowercase).collect()
    }
}

impl Matcher for KeywordMatcher {
    fn name(&self) -> &'static str {
        "keyword"
    }

    fn syntax(&self) -> QuerySyntax {
        QuerySyntax::KeywordGroups
    }

    fn lookup(&self, references: &[Reference], token: &str) -> Option<Match> {
        let keywords = Self::keywords(token);
        let mut best: Option<(usize, u32)> = None;
        let mut matches = 0;
        for (index, reference) in references.iter().enumerate() {
            let score = Self::score(reference, &keywords);
            if score == 0 {
                continue;
            }
            match best {
                Some((_, top)) if score < top => {}
                Some((_, top)) if score == top => matches += 1,
                _ => {
                    best = Some((index, score));
                    matches = 1;
                }
            }
        }
        best.map(|(index, _)| Match { index, matches })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::Tag;
    use proptest::prelude::*;

    fn labeled(label: &str) -> Reference {
        let mut reference = Reference::new();
        reference.set(Tag::Label, label);
        reference
    }

    fn keywords(text: &str) -> Vec<String> {
        KeywordMatcher::keywords(text)
    }

    #[test]
    fn test_label_first_match_wins() {
        let refs = vec![labeled("x"), labeled("dup"), labeled("dup")];
        let found = LabelMatcher.lookup(&refs, "dup").unwrap();
        assert_eq!(found, Match { index: 1, matches: 1 });
    }

    #[test]
    fn test_label_is_exact() {
        let refs = vec![labeled("Knuth84")];
        assert!(LabelMatcher.lookup(&refs, "knuth84").is_none());
        assert!(LabelMatcher.lookup(&refs, "Knuth").is_none());
        assert!(LabelMatcher.lookup(&refs, "Knuth84").is_some());
    }

    #[test]
    fn test_label_skips_unlabeled() {
        let refs = vec![Reference::new(), labeled("a")];
        assert_eq!(LabelMatcher.lookup(&refs, "a").map(|m| m.index), Some(1));
    }

    #[test]
    fn test_keyword_score_saturates() {
        let r = labeled("graph graph graph graph theory");
        // "graph" x4 -> 1 + 3/3 = 2, i.e. 6 thirds
        assert_eq!(KeywordMatcher::score(&r, &keywords("graph")), 6);
        assert_eq!(KeywordMatcher::score(&r, &keywords("theory")), 3);
        assert_eq!(KeywordMatcher::score(&r, &keywords("graph theory")), 9);
        assert_eq!(KeywordMatcher::score(&r, &keywords("trees")), 0);
    }

    #[test]
    fn test_keyword_is_case_insensitive() {
        let r = labeled("Knuth Literate Programming");
        assert_eq!(KeywordMatcher::score(&r, &keywords("literate KNUTH")), 6);
    }

    #[test]
    fn test_keyword_best_score_wins() {
        let refs = vec![
            labeled("knuth art programming"),
            labeled("knuth literate programming"),
            labeled("lamport latex"),
        ];
        let found = KeywordMatcher.lookup(&refs, "literate programming").unwrap();
        assert_eq!(found, Match { index: 1, matches: 1 });
    }

    #[test]
    fn test_keyword_tie_picks_first_and_counts() {
        let refs = vec![
            labeled("unrelated"),
            labeled("knuth art"),
            labeled("knuth tex"),
            labeled("knuth metafont"),
        ];
        let found = KeywordMatcher.lookup(&refs, "knuth").unwrap();
        assert_eq!(found.index, 1);
        assert_eq!(found.matches, 3);
        assert!(found.is_ambiguous());
    }

    #[test]
    fn test_keyword_tie_count_reflects_final_maximum() {
        let refs = vec![
            labeled("knuth"),
            labeled("knuth"),
            labeled("knuth tex"),
        ];
        let found = KeywordMatcher.lookup(&refs, "knuth tex").unwrap();
        assert_eq!(found, Match { index: 2, matches: 1 });
    }

    #[test]
    fn test_keyword_zero_score_is_not_found() {
        let refs = vec![labeled("knuth tex"), Reference::new()];
        assert!(KeywordMatcher.lookup(&refs, "lamport").is_none());
        assert!(KeywordMatcher.lookup(&refs, "").is_none());
        assert!(KeywordMatcher.lookup(&[], "knuth").is_none());
    }

    proptest! {
        #[test]
        fn adding_a_keyword_hit_never_lowers_score(
            words in proptest::collection::vec("[a-d]{1,2}", 0..6),
            query in proptest::collection::vec("[a-d]{1,2}", 1..4),
            pick in 0usize..4,
        ) {
            let before = labeled(&words.join(" "));
            let hit = &query[pick % query.len()];
            let mut extended = words.clone();
            extended.push(hit.clone());
            let after = labeled(&extended.join(" "));
            prop_assert!(
                KeywordMatcher::score(&after, &query) > KeywordMatcher::score(&before, &query)
            );
        }
    }
}
