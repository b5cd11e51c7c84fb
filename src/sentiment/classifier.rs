use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};

use crate::config::PipelineConfig;
use crate::error::{Error, Result};
use crate::models::{ClassScore, SentimentPrediction};
use crate::sentiment::provider::SentimentModel;

/// Batched sentiment inference. A failed batch degrades to neutral
/// predictions for its own items and never aborts the run.
pub struct SentimentClassifier {
    model: Arc<dyn SentimentModel>,
    batch_size: usize,
    batch_timeout: Option<Duration>,
    concurrency_limit: usize,
    show_progress: bool,
}

struct BatchOutcome {
    offset: usize,
    predictions: Vec<SentimentPrediction>,
}

impl SentimentClassifier {
    pub fn new(model: Arc<dyn SentimentModel>, config: &PipelineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            model,
            batch_size: config.batch_size,
            batch_timeout: config.batch_timeout,
            concurrency_limit: config.concurrency_limit,
            show_progress: config.show_progress,
        })
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// One prediction per input, in input order.
    pub async fn classify(&self, texts: &[String]) -> Vec<SentimentPrediction> {
        if texts.is_empty() {
            return Vec::new();
        }

        let batches: Vec<(usize, &[String])> = texts
            .chunks(self.batch_size)
            .enumerate()
            .map(|(i, batch)| (i * self.batch_size, batch))
            .collect();

        tracing::info!(
            "Classifying {} reviews in {} batches with {}",
            texts.len(),
            batches.len(),
            self.model.name()
        );

        let pb = self.progress_bar(batches.len() as u64);
        let pb_ref = &pb;

        let outcomes: Vec<BatchOutcome> = stream::iter(batches)
            .map(|(offset, batch)| async move {
                let outcome = self.classify_batch(offset, batch).await;
                pb_ref.inc(1);
                outcome
            })
            .buffered(self.concurrency_limit)
            .collect()
            .await;

        pb.finish_with_message("Sentiment analysis complete");

        let mut predictions = vec![SentimentPrediction::fallback(); texts.len()];
        for outcome in outcomes {
            let end = outcome.offset + outcome.predictions.len();
            predictions[outcome.offset..end].copy_from_slice(&outcome.predictions);
        }
        predictions
    }

    async fn classify_batch(&self, offset: usize, batch: &[String]) -> BatchOutcome {
        let predictions = match self.infer(batch).await {
            Ok(scores) => scores
                .iter()
                .map(|classes| SentimentPrediction::from_scores(classes))
                .collect(),
            Err(e) => {
                tracing::warn!(
                    transient = e.is_transient(),
                    "Error processing batch starting at index {}: {}; using neutral fallback for {} reviews",
                    offset,
                    e,
                    batch.len()
                );
                vec![SentimentPrediction::fallback(); batch.len()]
            }
        };

        BatchOutcome {
            offset,
            predictions,
        }
    }

    async fn infer(&self, batch: &[String]) -> Result<Vec<Vec<ClassScore>>> {
        let scores = match self.batch_timeout {
            Some(limit) => tokio::time::timeout(limit, self.model.predict(batch))
                .await
                .map_err(|_| Error::Timeout(limit))??,
            None => self.model.predict(batch).await?,
        };

        if scores.len() != batch.len() {
            return Err(Error::Inference(format!(
                "model returned {} results for {} inputs",
                scores.len(),
                batch.len()
            )));
        }

        Ok(scores)
    }

    fn progress_bar(&self, len: u64) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new(len);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} batches")
        {
            pb.set_style(style.progress_chars("#>-"));
        }
        pb
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::SentimentLabel;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Labels texts from a fixed table; fails any batch containing "boom".
    pub(crate) struct ScriptedModel {
        labels: HashMap<String, (&'static str, f32)>,
        pub(crate) calls: AtomicUsize,
    }

    impl ScriptedModel {
        pub(crate) fn new(labels: &[(&str, &'static str, f32)]) -> Self {
            Self {
                labels: labels
                    .iter()
                    .map(|(text, label, score)| (text.to_string(), (*label, *score)))
                    .collect(),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl SentimentModel for ScriptedModel {
        async fn predict(&self, texts: &[String]) -> Result<Vec<Vec<ClassScore>>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if texts.iter().any(|t| t == "boom") {
                return Err(Error::Inference("scripted failure".to_string()));
            }
            Ok(texts
                .iter()
                .map(|text| match self.labels.get(text) {
                    Some((label, score)) => vec![
                        ClassScore::new(label.to_uppercase(), *score),
                        ClassScore::new("OTHER", 1.0 - *score),
                    ],
                    None => vec![
                        ClassScore::new("POSITIVE", 0.6),
                        ClassScore::new("NEGATIVE", 0.4),
                    ],
                })
                .collect())
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    struct ShortModel;

    #[async_trait]
    impl SentimentModel for ShortModel {
        async fn predict(&self, texts: &[String]) -> Result<Vec<Vec<ClassScore>>> {
            Ok(vec![vec![ClassScore::new("POSITIVE", 0.9)]; texts.len().saturating_sub(1)])
        }

        fn name(&self) -> &str {
            "short"
        }
    }

    struct SlowModel;

    #[async_trait]
    impl SentimentModel for SlowModel {
        async fn predict(&self, texts: &[String]) -> Result<Vec<Vec<ClassScore>>> {
            tokio::time::sleep(Duration::from_millis(500)).await;
            Ok(vec![vec![ClassScore::new("POSITIVE", 0.9)]; texts.len()])
        }

        fn name(&self) -> &str {
            "slow"
        }
    }

    fn config(batch_size: usize) -> PipelineConfig {
        PipelineConfig {
            batch_size,
            show_progress: false,
            ..PipelineConfig::default()
        }
    }

    fn texts(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_output_length_matches_input_for_any_batch_size() {
        let inputs: Vec<String> = (0..23).map(|i| format!("review {}", i)).collect();
        for batch_size in [1, 2, 5, 16, 23, 64] {
            let classifier =
                SentimentClassifier::new(Arc::new(ScriptedModel::new(&[])), &config(batch_size)).unwrap();
            assert_eq!(classifier.classify(&inputs).await.len(), inputs.len());
        }
    }

    #[tokio::test]
    async fn test_failed_batch_is_isolated() {
        let model = Arc::new(ScriptedModel::new(&[
            ("a", "negative", 0.9),
            ("b", "positive", 0.8),
            ("c", "positive", 0.7),
            ("d", "negative", 0.95),
        ]));
        let classifier = SentimentClassifier::new(model.clone(), &config(2)).unwrap();

        let predictions = classifier.classify(&texts(&["a", "b", "boom", "c", "d"])).await;

        assert_eq!(model.calls.load(Ordering::SeqCst), 3);
        assert_eq!(predictions[0].label, SentimentLabel::Negative);
        assert_eq!(predictions[1].label, SentimentLabel::Positive);
        assert_eq!(predictions[2], SentimentPrediction::fallback());
        assert_eq!(predictions[3], SentimentPrediction::fallback());
        assert_eq!(predictions[4].label, SentimentLabel::Negative);
        assert!((predictions[4].score - 0.95).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_concurrent_batches_keep_order() {
        let model = Arc::new(ScriptedModel::new(&[
            ("a", "negative", 0.9),
            ("e", "positive", 0.9),
        ]));
        let pipeline_config = PipelineConfig {
            concurrency_limit: 4,
            ..config(1)
        };
        let classifier = SentimentClassifier::new(model, &pipeline_config).unwrap();

        let predictions = classifier.classify(&texts(&["a", "boom", "x", "e"])).await;

        assert_eq!(predictions[0].label, SentimentLabel::Negative);
        assert_eq!(predictions[1], SentimentPrediction::fallback());
        assert_eq!(predictions[2].label, SentimentLabel::Positive);
        assert_eq!(predictions[3].label, SentimentLabel::Positive);
    }

    #[tokio::test]
    async fn test_mismatched_result_count_counts_as_failure() {
        let classifier = SentimentClassifier::new(Arc::new(ShortModel), &config(4)).unwrap();
        let predictions = classifier.classify(&texts(&["a", "b", "c"])).await;
        assert_eq!(predictions, vec![SentimentPrediction::fallback(); 3]);
    }

    #[tokio::test]
    async fn test_timeout_counts_as_failure() {
        let pipeline_config = PipelineConfig {
            batch_timeout: Some(Duration::from_millis(20)),
            ..config(16)
        };
        let classifier = SentimentClassifier::new(Arc::new(SlowModel), &pipeline_config).unwrap();
        let predictions = classifier.classify(&texts(&["a", "b"])).await;
        assert_eq!(predictions, vec![SentimentPrediction::fallback(); 2]);
    }

    #[tokio::test]
    async fn test_empty_input() {
        let model = Arc::new(ScriptedModel::new(&[]));
        let classifier = SentimentClassifier::new(model.clone(), &config(16)).unwrap();
        assert!(classifier.classify(&[]).await.is_empty());
        assert_eq!(model.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        let result = SentimentClassifier::new(Arc::new(ScriptedModel::new(&[])), &config(0));
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
