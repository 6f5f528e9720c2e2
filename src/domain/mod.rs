// Domain types and value objects
mod series;

// Re-export commonly used types to the world
pub use series::{DateRange, PriceStats, Series, SeriesPoint, SeriesSummary};
