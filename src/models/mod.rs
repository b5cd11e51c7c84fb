pub mod review;
pub mod sentiment;
pub mod aggregate;

pub use review::*;
pub use sentiment::*;
pub use aggregate::*;
