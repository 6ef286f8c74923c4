//! Keyword relevance filter
//!
//! An article is relevant when its lower-cased text contains at least one of
//! the configured keywords as a substring.

/// Case-insensitive keyword predicate
#[derive(Debug, Clone)]
pub struct RelevanceFilter {
    keywords: Vec<String>,
}

impl RelevanceFilter {
    /// Builds a filter; blank keywords are ignored
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keywords = keywords
            .into_iter()
            .map(|k| k.as_ref().trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();

        Self { keywords }
    }

    /// Returns the first keyword found in `text`
    pub fn matching_keyword(&self, text: &str) -> Option<&str> {
        let text = text.to_lowercase();
        self.keywords
            .iter()
            .find(|keyword| text.contains(keyword.as_str()))
            .map(String::as_str)
    }

    pub fn is_relevant(&self, text: &str) -> bool {
        self.matching_keyword(text).is_some()
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }
}
