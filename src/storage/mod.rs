pub mod sqlite;
pub mod tabular;

pub use sqlite::Storage;
pub use tabular::LoadedReviews;
