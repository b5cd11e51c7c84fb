//! Review text cleaning used before keyword matching.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::stopwords::stop_words;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NormalizeMode {
    /// Lowercase, strip URLs, punctuation and digits, collapse whitespace.
    #[default]
    Basic,
    /// Basic, then fold plural inflections and drop stop-words.
    Lemmatized,
}

pub struct TextNormalizer {
    mode: NormalizeMode,
    url_regex: Regex,
    punctuation_regex: Regex,
    digit_regex: Regex,
    whitespace_regex: Regex,
    stop_words: HashSet<&'static str>,
}

impl TextNormalizer {
    pub fn new(mode: NormalizeMode) -> Self {
        Self {
            mode,
            url_regex: Regex::new(r"http\S*").expect("valid URL pattern"),
            punctuation_regex: Regex::new(r"[^\w\s]").expect("valid punctuation pattern"),
            digit_regex: Regex::new(r"\d+").expect("valid digit pattern"),
            whitespace_regex: Regex::new(r"\s+").expect("valid whitespace pattern"),
            stop_words: stop_words(),
        }
    }

    /// Total and idempotent: `normalize(normalize(x)) == normalize(x)`.
    pub fn normalize(&self, text: &str) -> String {
        let basic = self.clean(text);
        match self.mode {
            NormalizeMode::Basic => basic,
            NormalizeMode::Lemmatized => self.lemmatize(&basic),
        }
    }

    fn clean(&self, text: &str) -> String {
        let lowercase = text.to_lowercase();
        let no_urls = self.url_regex.replace_all(&lowercase, "");
        let no_punctuation = self.punctuation_regex.replace_all(&no_urls, "");
        let no_digits = self.digit_regex.replace_all(&no_punctuation, "");
        // Dropping punctuation can glue a URL back together ("ht.tp://x" -> "httpx").
        let no_urls = self.url_regex.replace_all(&no_digits, "");
        self.whitespace_regex
            .replace_all(&no_urls, " ")
            .trim()
            .to_string()
    }

    fn lemmatize(&self, cleaned: &str) -> String {
        cleaned
            .split(' ')
            .filter(|token| !token.is_empty())
            .map(fold_plural)
            .filter(|token| !self.stop_words.contains(token.as_str()))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl Default for TextNormalizer {
    fn default() -> Self {
        Self::new(NormalizeMode::Basic)
    }
}

fn fold_plural(token: &str) -> String {
    let len = token.chars().count();
    if len > 4 && token.ends_with("ies") {
        return format!("{}y", &token[..token.len() - 3]);
    }
    if len > 3
        && token.ends_with('s')
        && !token.ends_with("ss")
        && !token.ends_with("us")
        && !token.ends_with("is")
    {
        return token[..token.len() - 1].to_string();
    }
    token.to_string()
}
