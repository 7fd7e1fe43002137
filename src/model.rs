// Core structs: WatchRecord, CleanedDataset, match flags
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

/// Raw row as it comes out of the input file, before cleaning.
/// Numeric fields are already leniently coerced: anything unparseable is `None`.
#[derive(Debug, Clone)]
pub struct RawRecord {
    pub id: String,
    pub brand: String,
    pub price_reference: Option<f64>,
    pub price_vendor: Option<f64>,
    pub diameter_reference: Option<f64>,
    pub diameter_vendor: Option<f64>,
    pub material_reference: Option<String>,
    pub material_vendor: Option<String>,
}

/// One catalog entry with both sources' values and all derived fields.
/// Derived fields are computed once at load time and never mutated afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct WatchRecord {
    pub id: String,
    pub brand: String,
    pub price_reference: Option<f64>,
    pub price_vendor: Option<f64>,
    pub diameter_reference: Option<f64>,
    pub diameter_vendor: Option<f64>,
    pub material_reference: Option<String>,
    pub material_vendor: Option<String>,
    pub material_reference_canonical: Option<String>,
    pub material_vendor_canonical: Option<String>,
    pub price_category: PriceCategory,
    pub price_match: MatchStatus,
    pub diameter_match: MatchStatus,
    pub material_match: MatchStatus,
}

/// Price band derived from the reference price only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum PriceCategory {
    /// Reference price absent.
    Unknown,
    /// Reference price below the high-price threshold.
    Regular,
    /// Reference price at or above the high-price threshold.
    HighPriced,
}

impl PriceCategory {
    pub fn label(&self) -> &'static str {
        match self {
            PriceCategory::Unknown => "Unknown",
            PriceCategory::Regular => "Regular",
            PriceCategory::HighPriced => "High-Priced",
        }
    }
}

impl std::fmt::Display for PriceCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Outcome of comparing one attribute across the two sources.
///
/// Two absent values are deliberately not a match: they are surfaced as
/// `Incomparable`, distinct from a true mismatch of two present values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum MatchStatus {
    Match,
    Mismatch,
    Incomparable,
}

impl MatchStatus {
    pub fn is_match(&self) -> bool {
        matches!(self, MatchStatus::Match)
    }
}

/// The three per-record match flags.
#[derive(Debug, Clone, Copy)]
pub struct MatchFlags {
    pub price: MatchStatus,
    pub diameter: MatchStatus,
    pub material: MatchStatus,
}

/// Which compared attribute an aggregation refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MatchAttribute {
    Price,
    CaseDiameter,
    CaseMaterial,
}

/// The cleaned, immutable working dataset every downstream stage reads from.
#[derive(Debug, Clone)]
pub struct CleanedDataset {
    pub records: Vec<WatchRecord>,
    /// Canonical materials occurring often enough pooled across both sources,
    /// ordered by count descending. Ordering is significant: it drives the
    /// presentation layer's display order, not just membership.
    pub material_universe: Vec<String>,
    /// Rows rejected as malformed during load.
    pub skipped_rows: usize,
    pub loaded_at: DateTime<Utc>,
}

impl CleanedDataset {
    /// Distinct brands present in the dataset, sorted for display.
    pub fn brand_options(&self) -> Vec<String> {
        let mut brands: Vec<String> = self.records.iter().map(|r| r.brand.clone()).collect();
        brands.sort();
        brands.dedup();
        brands
    }

    /// Distinct price categories present in the dataset, sorted for display.
    pub fn price_category_options(&self) -> Vec<PriceCategory> {
        let mut categories: Vec<PriceCategory> =
            self.records.iter().map(|r| r.price_category).collect();
        categories.sort();
        categories.dedup();
        categories
    }
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read dataset: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse dataset: {0}")]
    Csv(#[from] csv::Error),
    #[error("dataset is missing required column '{0}'")]
    MissingColumn(&'static str),
}

/// A row missing a required identifying field. The loader logs and skips
/// these rather than aborting the whole load.
#[derive(Debug, Error)]
#[error("row {row}: missing required field '{field}'")]
pub struct MalformedRecordError {
    pub row: u64,
    pub field: &'static str,
}

#[derive(Debug, Error)]
pub enum NormalizerError {
    #[error("failed to read material table: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse material table: {0}")]
    Json(#[from] serde_json::Error),
    #[error("material table is not idempotent: canonical '{canonical}' resolves to '{resolved}'")]
    NotIdempotent { canonical: String, resolved: String },
}

/// A required multi-select filter resolved to an empty set. Recoverable:
/// the caller halts aggregation and prompts the user instead of computing
/// statistics over zero records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EmptySelection {
    #[error("no brands selected")]
    Brands,
    #[error("no price categories selected")]
    PriceCategories,
    #[error("no case materials selected")]
    Materials,
}
