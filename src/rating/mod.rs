pub mod aggregate;
pub mod types;

pub use aggregate::aggregate_ratings;
pub use types::{AggregateRating, ReviewBand};
