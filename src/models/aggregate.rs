use serde::{Deserialize, Serialize};

use super::review::AnnotatedReview;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentAggregate {
    pub organization: String,
    pub rating: u8,
    pub mean_sentiment: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeAggregate {
    pub organization: String,
    pub theme: String,
    pub count: u32,
}

/// Everything a single run produces.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub reviews: Vec<AnnotatedReview>,
    pub sentiment_summary: Vec<SentimentAggregate>,
    pub theme_summary: Vec<ThemeAggregate>,
}

impl AnalysisReport {
    pub fn organizations(&self) -> Vec<String> {
        let mut organizations: Vec<String> = self
            .reviews
            .iter()
            .map(|r| r.organization().to_string())
            .collect();
        organizations.sort();
        organizations.dedup();
        organizations
    }

    pub fn reviews_for(&self, organization: &str) -> usize {
        self.reviews
            .iter()
            .filter(|r| r.organization() == organization)
            .count()
    }
}
