//! Whole-word narrative keyword matching.
//!
//! Cause classification on FRA narratives matches keywords as whole words,
//! case-insensitively, so that `slide` matches "rock slide" but not
//! "slidemaster". Keywords are escaped before being joined into a single
//! alternation pattern.

use regex::{Regex, RegexBuilder, escape};

use crate::DatasetError;

/// A compiled whole-word, case-insensitive keyword matcher.
#[derive(Debug, Clone)]
pub struct KeywordMatcher {
    keywords: Vec<String>,
    pattern: Regex,
    per_keyword: Vec<Regex>,
}

impl KeywordMatcher {
    /// Compiles a matcher for the given keywords.
    ///
    /// # Errors
    ///
    /// Returns an error if the alternation pattern fails to compile (only
    /// possible with pathological keyword lists exceeding regex limits).
    pub fn new<S: AsRef<str>>(keywords: &[S]) -> Result<Self, DatasetError> {
        let escaped: Vec<String> = keywords.iter().map(|k| escape(k.as_ref())).collect();
        let pattern = RegexBuilder::new(&format!(r"\b(?:{})\b", escaped.join("|")))
            .case_insensitive(true)
            .build()?;
        let per_keyword = escaped
            .iter()
            .map(|k| {
                RegexBuilder::new(&format!(r"\b{k}\b"))
                    .case_insensitive(true)
                    .build()
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            keywords: keywords.iter().map(|k| k.as_ref().to_string()).collect(),
            pattern,
            per_keyword,
        })
    }

    /// Whether the text contains any keyword as a whole word.
    #[must_use]
    pub fn matches(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }

    /// Per-keyword match counts over a set of narratives, for the keyword
    /// breakdown tables in the classification reports.
    #[must_use]
    pub fn keyword_counts<'a, I>(&self, narratives: I) -> Vec<(String, usize)>
    where
        I: IntoIterator<Item = &'a str> + Clone,
    {
        self.keywords
            .iter()
            .zip(&self.per_keyword)
            .map(|(kw, re)| {
                let count = narratives
                    .clone()
                    .into_iter()
                    .filter(|n| re.is_match(n))
                    .count();
                (kw.clone(), count)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_whole_words_only() {
        let matcher = KeywordMatcher::new(&["slide", "landslide", "mudslide"]).unwrap();
        assert!(matcher.matches("rock slide near MP 12"));
        assert!(matcher.matches("Mudslide covered the track"));
        assert!(!matcher.matches("slidemaster equipment failure"));
    }

    #[test]
    fn is_case_insensitive() {
        let matcher = KeywordMatcher::new(&["washout", "rain", "flood"]).unwrap();
        assert!(matcher.matches("Track WASHOUT after heavy RAIN"));
    }

    #[test]
    fn escapes_regex_metacharacters() {
        let matcher = KeywordMatcher::new(&["sun kink (suspected)"]).unwrap();
        assert!(matcher.matches("report of sun kink (suspected) at siding"));
    }

    #[test]
    fn counts_per_keyword() {
        let matcher = KeywordMatcher::new(&["heat", "sun"]).unwrap();
        let narratives = ["extreme heat", "sun kink from heat", "broken rail"];
        let counts = matcher.keyword_counts(narratives);
        assert_eq!(counts, vec![("heat".to_string(), 2), ("sun".to_string(), 1)]);
    }
}
