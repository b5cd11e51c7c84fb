pub mod tagger;
pub mod pipeline;
pub mod aggregator;

pub use tagger::ThemeTagger;
pub use pipeline::ClassificationPipeline;
pub use aggregator::{Aggregator, ThemeGrouping};
