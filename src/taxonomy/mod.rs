pub mod banking;

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use crate::error::{Error, Result};
use crate::models::OTHER_THEME;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Theme {
    pub name: String,
    pub keywords: Vec<String>,
}

impl Theme {
    pub fn new(name: &str, keywords: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }
}

/// Ordered theme to keyword mapping. Validated on construction and
/// read-only afterwards; definition order decides theme label order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThemeTaxonomy {
    themes: Vec<Theme>,
}

impl ThemeTaxonomy {
    pub fn new(themes: Vec<Theme>) -> Result<Self> {
        if themes.is_empty() {
            return Err(Error::Taxonomy("taxonomy defines no themes".to_string()));
        }

        let mut seen = HashSet::new();
        let mut normalized = Vec::with_capacity(themes.len());

        for theme in themes {
            let name = theme.name.trim().to_string();
            if name.is_empty() {
                return Err(Error::Taxonomy("theme name is empty".to_string()));
            }
            // Multi-theme labels are comma-joined.
            if name.contains(',') {
                return Err(Error::Taxonomy(format!(
                    "theme name '{}' must not contain a comma",
                    name
                )));
            }
            if name.eq_ignore_ascii_case(OTHER_THEME) {
                return Err(Error::Taxonomy(format!(
                    "'{}' is reserved for reviews without a theme",
                    OTHER_THEME
                )));
            }
            if !seen.insert(name.clone()) {
                return Err(Error::Taxonomy(format!("duplicate theme '{}'", name)));
            }
            if theme.keywords.is_empty() {
                return Err(Error::Taxonomy(format!("theme '{}' has no keywords", name)));
            }

            let mut keywords = Vec::with_capacity(theme.keywords.len());
            for keyword in &theme.keywords {
                // Keywords are matched against lowercased, single-spaced text.
                let keyword = keyword
                    .split_whitespace()
                    .collect::<Vec<_>>()
                    .join(" ")
                    .to_lowercase();
                if keyword.is_empty() {
                    return Err(Error::Taxonomy(format!(
                        "theme '{}' has a blank keyword",
                        name
                    )));
                }
                if !keywords.contains(&keyword) {
                    keywords.push(keyword);
                }
            }

            normalized.push(Theme { name, keywords });
        }

        Ok(Self { themes: normalized })
    }

    /// Built-in taxonomy for retail banking app reviews.
    pub fn banking() -> Result<Self> {
        Self::new(banking::themes())
    }

    /// Loads a JSON array of `{"name": ..., "keywords": [...]}` objects.
    pub fn from_json(json: &str) -> Result<Self> {
        let themes: Vec<Theme> = serde_json::from_str(json)
            .map_err(|e| Error::Taxonomy(format!("malformed taxonomy: {}", e)))?;
        Self::new(themes)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn themes(&self) -> &[Theme] {
        &self.themes
    }

    pub fn len(&self) -> usize {
        self.themes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.themes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_banking_taxonomy_order() {
        let taxonomy = ThemeTaxonomy::banking().unwrap();
        let names: Vec<_> = taxonomy.themes().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "Account Access Issues",
                "Transaction Performance",
                "User Interface & Experience",
                "Customer Support",
                "Feature Requests",
            ]
        );
        assert!(taxonomy.themes()[3].keywords.contains(&"customer care".to_string()));
    }

    #[test]
    fn test_rejects_empty_taxonomy() {
        assert!(matches!(ThemeTaxonomy::new(Vec::new()), Err(Error::Taxonomy(_))));
    }

    #[test]
    fn test_rejects_duplicate_and_reserved_names() {
        let duplicate = vec![Theme::new("Fees", &["fee"]), Theme::new("Fees", &["charge"])];
        assert!(matches!(ThemeTaxonomy::new(duplicate), Err(Error::Taxonomy(_))));

        let reserved = vec![Theme::new("other", &["misc"])];
        assert!(matches!(ThemeTaxonomy::new(reserved), Err(Error::Taxonomy(_))));
    }

    #[test]
    fn test_rejects_comma_in_theme_name() {
        let themes = vec![Theme::new("Fees, Charges", &["fee"])];
        assert!(matches!(ThemeTaxonomy::new(themes), Err(Error::Taxonomy(_))));
    }

    #[test]
    fn test_rejects_blank_keywords() {
        assert!(ThemeTaxonomy::new(vec![Theme::new("Fees", &[])]).is_err());
        assert!(ThemeTaxonomy::new(vec![Theme::new("Fees", &["fee", "  "])]).is_err());
    }

    #[test]
    fn test_keywords_are_lowercased_and_deduplicated() {
        let taxonomy =
            ThemeTaxonomy::new(vec![Theme::new("Fees", &["Service  Charge", "service charge", "FEE"])]).unwrap();
        assert_eq!(taxonomy.themes()[0].keywords, vec!["service charge", "fee"]);
    }

    #[test]
    fn test_from_json() {
        let json = r#"[
            {"name": "Fees", "keywords": ["fee", "charge"]},
            {"name": "Cards", "keywords": ["card", "atm"]}
        ]"#;
        let taxonomy = ThemeTaxonomy::from_json(json).unwrap();
        assert_eq!(taxonomy.len(), 2);
        assert_eq!(taxonomy.themes()[1].name, "Cards");

        assert!(matches!(ThemeTaxonomy::from_json("{}"), Err(Error::Taxonomy(_))));
        assert!(matches!(ThemeTaxonomy::from_json("[]"), Err(Error::Taxonomy(_))));
    }
}
