use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::sentiment::{SentimentLabel, SentimentPrediction};

/// Theme assigned when no taxonomy keyword matches.
pub const OTHER_THEME: &str = "Other";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub text: String,
    pub rating: u8,
    pub date: NaiveDate,
    pub organization: String,
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedReview {
    #[serde(flatten)]
    pub review: Review,
    pub sentiment_label: SentimentLabel,
    pub sentiment_score: f32,
    pub themes: ThemeSet,
}

impl AnnotatedReview {
    pub fn new(review: Review, sentiment: SentimentPrediction, themes: ThemeSet) -> Self {
        Self {
            review,
            sentiment_label: sentiment.label,
            sentiment_score: sentiment.score,
            themes,
        }
    }

    pub fn organization(&self) -> &str {
        &self.review.organization
    }

    pub fn sentiment_value(&self) -> i8 {
        self.sentiment_label.value()
    }
}

/// Ordered, never-empty set of theme names. Order follows the taxonomy.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThemeSet(Vec<String>);

impl ThemeSet {
    /// Builds a set from matched theme names, falling back to "Other" when empty.
    pub fn from_matches(matches: Vec<String>) -> Self {
        if matches.is_empty() {
            Self::other()
        } else {
            Self(matches)
        }
    }

    pub fn other() -> Self {
        Self(vec![OTHER_THEME.to_string()])
    }

    pub fn is_other(&self) -> bool {
        self.0.len() == 1 && self.0[0] == OTHER_THEME
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Display label, e.g. "Account Access Issues, Feature Requests".
    pub fn label(&self) -> String {
        self.0.join(", ")
    }

    /// Inverse of [`ThemeSet::label`].
    pub fn parse_label(label: &str) -> Self {
        let themes = label
            .split(", ")
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect();
        Self::from_matches(themes)
    }
}

impl std::fmt::Display for ThemeSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}
