use async_trait::async_trait;
use crate::error::Result;
use crate::models::ClassScore;

/// A multi-class text classifier called once per batch.
///
/// Implementations return one class set per input, in input order.
#[async_trait]
pub trait SentimentModel: Send + Sync {
    async fn predict(&self, texts: &[String]) -> Result<Vec<Vec<ClassScore>>>;
    fn name(&self) -> &str;
}
