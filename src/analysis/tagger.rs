use regex::Regex;

use crate::error::{Error, Result};
use crate::models::ThemeSet;
use crate::taxonomy::ThemeTaxonomy;
use crate::text::TextNormalizer;

struct ThemeMatcher {
    name: String,
    pattern: Regex,
}

/// Rule-based multi-label theme tagging over normalized review text.
pub struct ThemeTagger {
    normalizer: TextNormalizer,
    matchers: Vec<ThemeMatcher>,
}

impl ThemeTagger {
    pub fn new(taxonomy: &ThemeTaxonomy, normalizer: TextNormalizer) -> Result<Self> {
        if taxonomy.is_empty() {
            return Err(Error::Taxonomy("taxonomy defines no themes".to_string()));
        }

        let matchers = taxonomy
            .themes()
            .iter()
            .map(|theme| {
                // Keywords go through the same cleaning as review text.
                let mut keywords: Vec<String> = Vec::with_capacity(theme.keywords.len());
                for keyword in &theme.keywords {
                    let cleaned = normalizer.normalize(keyword);
                    if cleaned.is_empty() {
                        return Err(Error::Taxonomy(format!(
                            "theme '{}' keyword '{}' is empty after normalization",
                            theme.name, keyword
                        )));
                    }
                    if !keywords.contains(&cleaned) {
                        keywords.push(cleaned);
                    }
                }

                let alternatives = keywords
                    .iter()
                    .map(|k| regex::escape(k))
                    .collect::<Vec<_>>()
                    .join("|");
                let pattern = Regex::new(&format!(r"\b(?:{})\b", alternatives)).map_err(|e| {
                    Error::Taxonomy(format!("theme '{}' keywords do not compile: {}", theme.name, e))
                })?;
                Ok(ThemeMatcher {
                    name: theme.name.clone(),
                    pattern,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            normalizer,
            matchers,
        })
    }

    /// Never empty: returns `{"Other"}` when no keyword matches.
    pub fn tag(&self, text: &str) -> ThemeSet {
        let cleaned = self.normalizer.normalize(text);
        self.tag_normalized(&cleaned)
    }

    fn tag_normalized(&self, cleaned: &str) -> ThemeSet {
        let matches = self
            .matchers
            .iter()
            .filter(|m| m.pattern.is_match(cleaned))
            .map(|m| m.name.clone())
            .collect();
        ThemeSet::from_matches(matches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::taxonomy::Theme;
    use crate::text::NormalizeMode;

    fn banking_tagger() -> ThemeTagger {
        ThemeTagger::new(&ThemeTaxonomy::banking().unwrap(), TextNormalizer::default()).unwrap()
    }

    fn labels(themes: &ThemeSet) -> Vec<&str> {
        themes.iter().collect()
    }

    #[test]
    fn test_single_theme() {
        let tagger = banking_tagger();
        assert_eq!(
            labels(&tagger.tag("Login keeps failing, please fix")),
            vec!["Account Access Issues"]
        );
        assert_eq!(
            labels(&tagger.tag("Great app, fast transfers")),
            vec!["Transaction Performance"]
        );
    }

    #[test]
    fn test_multiple_themes_follow_taxonomy_order() {
        let tagger = banking_tagger();
        let themes = tagger.tag("Please ADD a loan option, and my password reset never works!");
        assert_eq!(
            themes.label(),
            "Account Access Issues, Feature Requests"
        );
    }

    #[test]
    fn test_whole_word_matching_only() {
        let tagger = banking_tagger();
        // "accessible", "guide", "address" and "helpful" only contain keywords.
        assert!(tagger.tag("Very accessible guide, address helpful").is_other());
        assert!(tagger.tag("").is_other());
        assert!(tagger.tag("!!! 1234").is_other());
    }

    #[test]
    fn test_multi_word_keyword() {
        let tagger = banking_tagger();
        assert_eq!(
            labels(&tagger.tag("Called customer   care twice")),
            vec!["Customer Support"]
        );
        assert!(tagger.tag("customer  feedback; care").is_other());
    }

    #[test]
    fn test_keyword_split_by_punctuation_still_matches_after_cleaning() {
        let tagger = banking_tagger();
        assert_eq!(labels(&tagger.tag("log-in? no: LOGIN!")), vec!["Account Access Issues"]);
    }

    #[test]
    fn test_lemmatized_mode_matches_inflections() {
        let tagger = ThemeTagger::new(
            &ThemeTaxonomy::banking().unwrap(),
            TextNormalizer::new(NormalizeMode::Lemmatized),
        )
        .unwrap();
        assert_eq!(
            labels(&tagger.tag("Transfers never arrive")),
            vec!["Transaction Performance"]
        );
        assert_eq!(labels(&tagger.tag("Bill payments please")), vec![
            "Transaction Performance",
            "Feature Requests",
        ]);
    }

    #[test]
    fn test_keywords_are_normalized_like_reviews() {
        let taxonomy = ThemeTaxonomy::new(vec![
            Theme::new("Statements", &["e-statement"]),
            Theme::new("Fees", &["fees"]),
        ])
        .unwrap();

        let basic = ThemeTagger::new(&taxonomy, TextNormalizer::default()).unwrap();
        assert_eq!(labels(&basic.tag("my e-statement is missing")), vec!["Statements"]);
        assert_eq!(labels(&basic.tag("Fees are too high")), vec!["Fees"]);

        let lemmatized =
            ThemeTagger::new(&taxonomy, TextNormalizer::new(NormalizeMode::Lemmatized)).unwrap();
        assert_eq!(labels(&lemmatized.tag("hidden fees")), vec!["Fees"]);
        assert_eq!(labels(&lemmatized.tag("one fee")), vec!["Fees"]);
    }

    #[test]
    fn test_keyword_that_normalizes_to_nothing_is_rejected() {
        let digits = ThemeTaxonomy::new(vec![Theme::new("Availability", &["24/7"])]).unwrap();
        assert!(matches!(
            ThemeTagger::new(&digits, TextNormalizer::default()),
            Err(Error::Taxonomy(_))
        ));

        let stop_word = ThemeTaxonomy::new(vec![Theme::new("Courtesy", &["please"])]).unwrap();
        assert!(ThemeTagger::new(&stop_word, TextNormalizer::default()).is_ok());
        assert!(matches!(
            ThemeTagger::new(&stop_word, TextNormalizer::new(NormalizeMode::Lemmatized)),
            Err(Error::Taxonomy(_))
        ));
    }

    #[test]
    fn test_never_empty() {
        let taxonomy = ThemeTaxonomy::new(vec![Theme::new("Fees", &["fee"])]).unwrap();
        let tagger = ThemeTagger::new(&taxonomy, TextNormalizer::default()).unwrap();
        for text in ["fee", "fees", "", "no fee here", "f e e"] {
            assert!(!tagger.tag(text).is_empty());
        }
        assert_eq!(tagger.tag("fees").label(), "Other");
        assert_eq!(tagger.tag("no fee here").label(), "Fees");
    }
}
