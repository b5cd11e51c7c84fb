use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl SentimentLabel {
    /// Numeric value used by the sentiment aggregate.
    pub fn value(self) -> i8 {
        match self {
            SentimentLabel::Positive => 1,
            SentimentLabel::Negative => -1,
            SentimentLabel::Neutral => 0,
        }
    }

    /// Case-folds a model class name. Unknown classes map to neutral.
    pub fn from_class(class: &str) -> Self {
        match class.trim().to_lowercase().as_str() {
            "positive" | "pos" => SentimentLabel::Positive,
            "negative" | "neg" => SentimentLabel::Negative,
            "neutral" => SentimentLabel::Neutral,
            other => {
                tracing::debug!("Unknown sentiment class '{}', treating as neutral", other);
                SentimentLabel::Neutral
            }
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SentimentLabel::Positive => "positive",
            SentimentLabel::Negative => "negative",
            SentimentLabel::Neutral => "neutral",
        }
    }
}

impl std::fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for SentimentLabel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "positive" => Ok(SentimentLabel::Positive),
            "negative" => Ok(SentimentLabel::Negative),
            "neutral" => Ok(SentimentLabel::Neutral),
            other => Err(format!("unknown sentiment label '{}'", other)),
        }
    }
}

/// One (class, score) pair as reported by a sentiment model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassScore {
    pub label: String,
    pub score: f32,
}

impl ClassScore {
    pub fn new(label: impl Into<String>, score: f32) -> Self {
        Self {
            label: label.into(),
            score,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SentimentPrediction {
    pub label: SentimentLabel,
    pub score: f32,
}

impl SentimentPrediction {
    pub const FALLBACK_SCORE: f32 = 0.5;

    /// Substituted for items of a failed batch and items without any class.
    pub fn fallback() -> Self {
        Self {
            label: SentimentLabel::Neutral,
            score: Self::FALLBACK_SCORE,
        }
    }

    /// Picks the highest scoring class; the first one wins on equal scores.
    pub fn from_scores(scores: &[ClassScore]) -> Self {
        let best = scores.iter().reduce(|best, candidate| {
            if candidate.score > best.score {
                candidate
            } else {
                best
            }
        });

        match best {
            Some(class) => Self {
                label: SentimentLabel::from_class(&class.label),
                score: class.score.clamp(0.0, 1.0),
            },
            None => Self::fallback(),
        }
    }
}
