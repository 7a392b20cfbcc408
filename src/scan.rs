// src/scan.rs
//! Keyword scanning over one entry's lowercased content.
//!
//! Matching is literal substring counting (non-overlapping, left to right),
//! so "war" also counts inside "warning" or "warszawa". Keywords are used
//! exactly as configured; content is lowercased by [`Entry::content`].

use serde::Serialize;
use std::sync::Arc;

use crate::config::KeywordSets;
use crate::ingest::types::Entry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightClass {
    Primary,
    Secondary,
}

impl WeightClass {
    pub fn weight(self) -> f64 {
        match self {
            WeightClass::Primary => 1.0,
            WeightClass::Secondary => 0.5,
        }
    }
}

/// One keyword found in one entry (however many times it occurred there).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeywordMatch {
    pub keyword: String,
    pub link: String,
    pub weight_class: WeightClass,
}

impl std::fmt::Display for KeywordMatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.keyword, self.link)
    }
}

/// Result of scanning a single entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryScan {
    pub primary_occurrences: u64,
    pub secondary_occurrences: u64,
    /// Primary matches first, then secondary; each in list order.
    pub matches: Vec<KeywordMatch>,
}

#[derive(Debug, Clone)]
pub struct KeywordScanner {
    keywords: Arc<KeywordSets>,
}

impl KeywordScanner {
    pub fn new(keywords: Arc<KeywordSets>) -> Self {
        Self { keywords }
    }

    pub fn scan_entry(&self, entry: &Entry) -> EntryScan {
        self.scan_content(&entry.content(), &entry.link)
    }

    /// Scan already-derived content; `link` only ends up in the evidence.
    pub fn scan_content(&self, content: &str, link: &str) -> EntryScan {
        let mut matches = Vec::new();
        let primary_occurrences = scan_list(
            content,
            link,
            &self.keywords.primary,
            WeightClass::Primary,
            &mut matches,
        );
        let secondary_occurrences = scan_list(
            content,
            link,
            &self.keywords.secondary,
            WeightClass::Secondary,
            &mut matches,
        );
        EntryScan {
            primary_occurrences,
            secondary_occurrences,
            matches,
        }
    }
}

fn scan_list(
    content: &str,
    link: &str,
    list: &[String],
    class: WeightClass,
    evidence: &mut Vec<KeywordMatch>,
) -> u64 {
    let mut total = 0u64;
    for kw in list {
        let n = count_occurrences(content, kw);
        if n > 0 {
            total += n;
            evidence.push(KeywordMatch {
                keyword: kw.clone(),
                link: link.to_string(),
                weight_class: class,
            });
        }
    }
    total
}

/// Non-overlapping occurrences of `needle` in `haystack`. Empty needles never match.
pub fn count_occurrences(haystack: &str, needle: &str) -> u64 {
    if needle.is_empty() {
        return 0;
    }
    haystack.matches(needle).count() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scanner(primary: &[&str], secondary: &[&str]) -> KeywordScanner {
        KeywordScanner::new(Arc::new(KeywordSets::new(
            primary.iter().copied(),
            secondary.iter().copied(),
        )))
    }

    fn entry(title: &str, description: &str, link: &str) -> Entry {
        Entry {
            title: title.into(),
            description: description.into(),
            link: link.into(),
        }
    }

    #[test]
    fn repeated_keyword_counts_all_but_cites_once() {
        let s = scanner(&["war"], &[]);
        let r = s.scan_entry(&entry("War, war", "and more war", "http://x/1"));
        assert_eq!(r.primary_occurrences, 3);
        assert_eq!(r.matches.len(), 1);
        assert_eq!(r.matches[0].to_string(), "war (http://x/1)");
    }

    #[test]
    fn substring_inside_longer_word_counts() {
        let s = scanner(&["war"], &[]);
        let r = s.scan_content("storm warning in warszawa", "l");
        assert_eq!(r.primary_occurrences, 2);
    }

    #[test]
    fn primary_before_secondary_in_list_order() {
        let s = scanner(&["krieg", "war"], &["bomba", "conflit"]);
        let r = s.scan_content("conflit war bomba krieg", "l");
        let kws: Vec<_> = r.matches.iter().map(|m| m.keyword.as_str()).collect();
        assert_eq!(kws, vec!["krieg", "war", "bomba", "conflit"]);
        assert_eq!(r.primary_occurrences, 2);
        assert_eq!(r.secondary_occurrences, 2);
    }

    #[test]
    fn keyword_in_both_lists_scores_twice() {
        let s = scanner(&["bomba"], &["bomba", "bomba"]);
        let r = s.scan_content("bomba", "l");
        assert_eq!(r.primary_occurrences, 1);
        assert_eq!(r.secondary_occurrences, 2);
        assert_eq!(r.matches.len(), 3);
    }

    #[test]
    fn keywords_are_not_case_folded() {
        // content is lowercased, so a capitalised keyword cannot match
        let s = scanner(&["Война", "война"], &[]);
        let r = s.scan_entry(&entry("Война", "", "l"));
        assert_eq!(r.primary_occurrences, 1);
        assert_eq!(r.matches[0].keyword, "война");
    }

    #[test]
    fn cjk_matches_as_substring() {
        let s = scanner(&[], &["冲突", "死亡"]);
        let r = s.scan_content("边境冲突造成死亡，冲突持续", "l");
        assert_eq!(r.secondary_occurrences, 3);
        assert_eq!(r.matches.len(), 2);
    }

    #[test]
    fn empty_needle_never_matches() {
        assert_eq!(count_occurrences("abc", ""), 0);
        assert_eq!(count_occurrences("aaaa", "aa"), 2);
    }
}
