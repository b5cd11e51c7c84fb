use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::models::{AnnotatedReview, SentimentAggregate, ThemeAggregate};

/// How multi-theme reviews are counted in the theme summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThemeGrouping {
    /// One group per joined label, e.g. "Account Access Issues, Feature Requests".
    #[default]
    Combined,
    /// Each theme of a review counts once on its own.
    PerTheme,
}

pub struct Aggregator {
    grouping: ThemeGrouping,
}

impl Aggregator {
    pub fn new(grouping: ThemeGrouping) -> Self {
        Self { grouping }
    }

    pub fn aggregate(
        &self,
        reviews: &[AnnotatedReview],
    ) -> (Vec<SentimentAggregate>, Vec<ThemeAggregate>) {
        (self.sentiment_by_rating(reviews), self.theme_counts(reviews))
    }

    /// Mean of positive=1, negative=-1, neutral=0 per (organization, rating).
    pub fn sentiment_by_rating(&self, reviews: &[AnnotatedReview]) -> Vec<SentimentAggregate> {
        let mut groups: BTreeMap<(&str, u8), (i64, u32)> = BTreeMap::new();

        for review in reviews {
            let entry = groups
                .entry((review.organization(), review.review.rating))
                .or_insert((0, 0));
            entry.0 += review.sentiment_value() as i64;
            entry.1 += 1;
        }

        groups
            .into_iter()
            .map(|((organization, rating), (sum, count))| SentimentAggregate {
                organization: organization.to_string(),
                rating,
                mean_sentiment: sum as f64 / count as f64,
            })
            .collect()
    }

    /// Sorted by organization, then count descending, then theme.
    pub fn theme_counts(&self, reviews: &[AnnotatedReview]) -> Vec<ThemeAggregate> {
        let mut groups: BTreeMap<(String, String), u32> = BTreeMap::new();

        for review in reviews {
            let organization = review.organization().to_string();
            match self.grouping {
                ThemeGrouping::Combined => {
                    *groups
                        .entry((organization, review.themes.label()))
                        .or_insert(0) += 1;
                }
                ThemeGrouping::PerTheme => {
                    for theme in review.themes.iter() {
                        *groups
                            .entry((organization.clone(), theme.to_string()))
                            .or_insert(0) += 1;
                    }
                }
            }
        }

        let mut rows: Vec<ThemeAggregate> = groups
            .into_iter()
            .map(|((organization, theme), count)| ThemeAggregate {
                organization,
                theme,
                count,
            })
            .collect();

        rows.sort_by(|a, b| match a.organization.cmp(&b.organization) {
            Ordering::Equal => b.count.cmp(&a.count).then_with(|| a.theme.cmp(&b.theme)),
            other => other,
        });
        rows
    }
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::new(ThemeGrouping::Combined)
    }
}
