pub mod config;
pub mod error;
pub mod models;
pub mod text;
pub mod sentiment;
pub mod taxonomy;
pub mod analysis;
pub mod storage;
pub mod report;

pub use config::{Config, PipelineConfig};
pub use error::{Error, Result};
pub use sentiment::{HuggingFaceModel, LexiconModel, SentimentClassifier, SentimentModel};
pub use taxonomy::ThemeTaxonomy;
pub use analysis::{Aggregator, ClassificationPipeline, ThemeGrouping, ThemeTagger};
pub use storage::Storage;
