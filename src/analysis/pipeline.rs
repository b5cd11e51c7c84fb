use std::sync::Arc;

use crate::analysis::aggregator::Aggregator;
use crate::analysis::tagger::ThemeTagger;
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::models::{AnalysisReport, AnnotatedReview, Review};
use crate::sentiment::{SentimentClassifier, SentimentModel};
use crate::taxonomy::ThemeTaxonomy;
use crate::text::TextNormalizer;

pub struct ClassificationPipeline {
    classifier: SentimentClassifier,
    tagger: ThemeTagger,
    aggregator: Aggregator,
}

impl ClassificationPipeline {
    /// Fails on an invalid configuration; a constructed pipeline never fails.
    pub fn new(
        model: impl SentimentModel + 'static,
        taxonomy: &ThemeTaxonomy,
        config: &PipelineConfig,
    ) -> Result<Self> {
        Self::with_model(Arc::new(model), taxonomy, config)
    }

    pub fn with_model(
        model: Arc<dyn SentimentModel>,
        taxonomy: &ThemeTaxonomy,
        config: &PipelineConfig,
    ) -> Result<Self> {
        let classifier = SentimentClassifier::new(model, config)?;
        let tagger = ThemeTagger::new(taxonomy, TextNormalizer::new(config.normalize_mode))?;

        tracing::debug!(
            "Pipeline ready: {} themes, batch size {}",
            taxonomy.len(),
            classifier.batch_size()
        );

        Ok(Self {
            classifier,
            tagger,
            aggregator: Aggregator::new(config.theme_grouping),
        })
    }

    /// Annotates every review; output order equals input order.
    pub async fn run(&self, reviews: &[Review]) -> Vec<AnnotatedReview> {
        if reviews.is_empty() {
            tracing::warn!("No reviews to classify");
            return Vec::new();
        }

        // Step 1: Sentiment over all texts, batched internally
        let texts: Vec<String> = reviews.iter().map(|r| r.text.clone()).collect();
        let sentiments = self.classifier.classify(&texts).await;

        // Step 2: Themes per review
        let themes: Vec<_> = reviews.iter().map(|r| self.tagger.tag(&r.text)).collect();

        // Step 3: Stitch by position
        let annotated: Vec<AnnotatedReview> = reviews
            .iter()
            .enumerate()
            .map(|(index, review)| {
                AnnotatedReview::new(review.clone(), sentiments[index], themes[index].clone())
            })
            .collect();

        tracing::info!("Annotated {} reviews", annotated.len());
        annotated
    }

    /// Classification followed by both aggregations.
    pub async fn analyze(&self, reviews: &[Review]) -> AnalysisReport {
        let annotated = self.run(reviews).await;
        let (sentiment_summary, theme_summary) = self.aggregator.aggregate(&annotated);

        tracing::info!(
            "Aggregated {} sentiment groups and {} theme groups",
            sentiment_summary.len(),
            theme_summary.len()
        );

        AnalysisReport {
            reviews: annotated,
            sentiment_summary,
            theme_summary,
        }
    }
}
