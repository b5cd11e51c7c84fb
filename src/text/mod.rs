pub mod normalizer;
pub mod stopwords;

pub use normalizer::{NormalizeMode, TextNormalizer};
