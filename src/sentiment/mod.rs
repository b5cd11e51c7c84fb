pub mod provider;
pub mod huggingface;
pub mod lexicon;
pub mod parser;
pub mod classifier;

pub use provider::SentimentModel;
pub use huggingface::HuggingFaceModel;
pub use lexicon::LexiconModel;
pub use classifier::SentimentClassifier;
