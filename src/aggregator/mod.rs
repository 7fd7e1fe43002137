// Aggregator module: pure reductions over a filtered view.

pub mod group_stats;
pub mod match_stats;

pub use group_stats::{median_prices, top_categories, CategoryCount, CategoryField, GroupKey, GroupMedians};
pub use match_stats::{match_distribution, match_percentages, MatchDistribution, MatchPercentages};
