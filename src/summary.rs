// Presentation hand-off: everything the dashboard shows for one filter
// state, as plain structured data. No chart formatting happens here.
use crate::aggregator::{
    match_distribution, match_percentages, median_prices, top_categories, CategoryCount,
    CategoryField, GroupKey, GroupMedians, MatchDistribution, MatchPercentages,
};
use crate::filter::{apply_filters, control_bounds, FilterBounds, FilterSpec};
use crate::model::{CleanedDataset, EmptySelection, MatchAttribute};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// How many materials the distribution comparison shows.
pub const TOP_MATERIALS_SHOWN: usize = 10;

#[derive(Debug, Serialize)]
pub struct DashboardSummary {
    pub generated_at: DateTime<Utc>,
    /// Records in the filtered view.
    pub record_count: usize,
    /// Rows rejected as malformed during load.
    pub skipped_rows: usize,
    pub match_percentages: MatchPercentages,
    pub match_distributions: Vec<MatchDistribution>,
    pub median_prices_by_brand: Vec<GroupMedians>,
    pub top_materials: Vec<CategoryCount>,
    /// Selectable options and slider bounds for the filter controls.
    pub brand_options: Vec<String>,
    pub price_category_options: Vec<String>,
    pub material_options: Vec<String>,
    pub control_bounds: FilterBounds,
}

impl DashboardSummary {
    /// Recomputes the whole summary for one filter state. Returns the
    /// empty-selection signal untouched so the caller can prompt.
    pub fn build(dataset: &CleanedDataset, spec: &FilterSpec) -> Result<Self, EmptySelection> {
        let view = apply_filters(dataset, spec)?;

        Ok(Self {
            generated_at: Utc::now(),
            record_count: view.len(),
            skipped_rows: dataset.skipped_rows,
            match_percentages: match_percentages(&view),
            match_distributions: vec![
                match_distribution(&view, MatchAttribute::Price),
                match_distribution(&view, MatchAttribute::CaseDiameter),
                match_distribution(&view, MatchAttribute::CaseMaterial),
            ],
            median_prices_by_brand: median_prices(&view, GroupKey::Brand),
            top_materials: top_categories(&view, TOP_MATERIALS_SHOWN, CategoryField::CaseMaterial),
            brand_options: dataset.brand_options(),
            price_category_options: dataset
                .price_category_options()
                .iter()
                .map(|c| c.label().to_string())
                .collect(),
            material_options: dataset.material_universe.clone(),
            control_bounds: control_bounds(dataset, spec),
        })
    }
}
