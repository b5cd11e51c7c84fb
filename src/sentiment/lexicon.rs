//! Offline polarity model for runs without an inference endpoint.

use async_trait::async_trait;
use std::collections::HashSet;

use crate::error::Result;
use crate::models::ClassScore;
use crate::sentiment::provider::SentimentModel;
use crate::text::TextNormalizer;

const NEUTRAL_PRIOR: f32 = 0.5;

pub struct LexiconModel {
    normalizer: TextNormalizer,
    positive_words: HashSet<&'static str>,
    negative_words: HashSet<&'static str>,
    negators: HashSet<&'static str>,
}

impl LexiconModel {
    pub fn new() -> Self {
        Self {
            normalizer: TextNormalizer::default(),
            positive_words: Self::build_positive_lexicon(),
            negative_words: Self::build_negative_lexicon(),
            negators: ["not", "no", "never", "dont", "doesnt", "didnt", "cant", "cannot", "wont", "isnt", "wasnt"]
                .into_iter()
                .collect(),
        }
    }

    /// Scores for neutral, positive and negative, summing to 1.
    pub fn score(&self, text: &str) -> Vec<ClassScore> {
        let cleaned = self.normalizer.normalize(text);
        let mut positive = 0u32;
        let mut negative = 0u32;
        let mut negated = false;

        for token in cleaned.split(' ') {
            if self.negators.contains(token) {
                negated = true;
                continue;
            }

            let polarity = if self.positive_words.contains(token) {
                1
            } else if self.negative_words.contains(token) {
                -1
            } else {
                0
            };

            match (polarity, negated) {
                (1, false) | (-1, true) => positive += 1,
                (-1, false) | (1, true) => negative += 1,
                _ => {}
            }
            if polarity != 0 {
                negated = false;
            }
        }

        // Neutral carries a prior of half a hit so a single polarity word decides.
        let total = positive as f32 + negative as f32 + NEUTRAL_PRIOR;
        vec![
            ClassScore::new("neutral", NEUTRAL_PRIOR / total),
            ClassScore::new("positive", positive as f32 / total),
            ClassScore::new("negative", negative as f32 / total),
        ]
    }

    fn build_positive_lexicon() -> HashSet<&'static str> {
        [
            "good", "great", "excellent", "amazing", "awesome", "best", "better",
            "fast", "quick", "easy", "simple", "smooth", "reliable", "convenient",
            "love", "like", "nice", "perfect", "helpful", "useful", "wonderful",
            "fantastic", "efficient", "secure", "safe", "friendly", "satisfied",
            "thanks", "thank", "recommend", "works", "working", "stable",
        ]
        .into_iter()
        .collect()
    }

    fn build_negative_lexicon() -> HashSet<&'static str> {
        [
            "bad", "worst", "worse", "terrible", "horrible", "awful", "poor",
            "slow", "fail", "fails", "failed", "failing", "failure", "error",
            "errors", "crash", "crashes", "crashed", "bug", "bugs", "broken",
            "problem", "problems", "issue", "issues", "stuck", "useless",
            "annoying", "disappointed", "disappointing", "hate", "fix", "fraud",
            "unable", "lost", "waste", "freeze", "freezes", "down",
        ]
        .into_iter()
        .collect()
    }
}

impl Default for LexiconModel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SentimentModel for LexiconModel {
    async fn predict(&self, texts: &[String]) -> Result<Vec<Vec<ClassScore>>> {
        Ok(texts.iter().map(|text| self.score(text)).collect())
    }

    fn name(&self) -> &str {
        "lexicon"
    }
}
