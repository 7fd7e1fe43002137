// Declarative filtering over the cleaned dataset. Every predicate is a pure
// conjunction/disjunction over static per-record values, so the final
// membership does not depend on evaluation order.
use crate::model::{CleanedDataset, EmptySelection, PriceCategory, WatchRecord};
use serde::Serialize;
use std::collections::BTreeSet;

/// Reference prices above this are always excluded, regardless of the
/// configured range. Absent reference prices pass the ceiling.
pub const REFERENCE_PRICE_CEILING: f64 = 2_000_000.0;

/// Closed numeric interval for a range control.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RangeFilter {
    pub min: f64,
    pub max: f64,
}

impl RangeFilter {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn unbounded() -> Self {
        Self { min: f64::NEG_INFINITY, max: f64::INFINITY }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// The user's current filter selections, consumed from the presentation layer.
#[derive(Debug, Clone)]
pub struct FilterSpec {
    pub brands: BTreeSet<String>,
    pub price_categories: BTreeSet<PriceCategory>,
    /// Selected canonical materials, in selection order. Matching is
    /// case-insensitive substring containment, so selecting "gold" also
    /// matches "rose gold" records.
    pub materials: Vec<String>,
    pub reference_price: RangeFilter,
    pub vendor_price: RangeFilter,
    pub reference_diameter: RangeFilter,
    pub vendor_diameter: RangeFilter,
    /// Drop records with an absent price in either source before the price
    /// ranges apply; when off, missing prices pass the range filters.
    pub exclude_missing_price: bool,
    /// Drop records with an absent diameter in either source. Unlike prices,
    /// missing diameters always pass the range filters.
    pub exclude_missing_diameter: bool,
    /// Drop records with an absent canonical material in either source.
    pub exclude_missing_material: bool,
}

impl FilterSpec {
    /// The dashboard's default state: everything selected, full ranges,
    /// missing values excluded.
    pub fn select_all(dataset: &CleanedDataset) -> Self {
        let mut spec = Self {
            brands: dataset.brand_options().into_iter().collect(),
            price_categories: dataset.price_category_options().into_iter().collect(),
            materials: dataset.material_universe.clone(),
            reference_price: RangeFilter::unbounded(),
            vendor_price: RangeFilter::unbounded(),
            reference_diameter: RangeFilter::unbounded(),
            vendor_diameter: RangeFilter::unbounded(),
            exclude_missing_price: true,
            exclude_missing_diameter: true,
            exclude_missing_material: true,
        };
        let bounds = control_bounds(dataset, &spec);
        if let Some((min, max)) = bounds.reference_price {
            spec.reference_price = RangeFilter::new(min, max);
        }
        if let Some((min, max)) = bounds.vendor_price {
            spec.vendor_price = RangeFilter::new(min, max);
        }
        if let Some((min, max)) = bounds.reference_diameter {
            spec.reference_diameter = RangeFilter::new(min, max);
        }
        if let Some((min, max)) = bounds.vendor_diameter {
            spec.vendor_diameter = RangeFilter::new(min, max);
        }
        spec
    }
}

/// A filtered, borrowed view over the cleaned dataset. Filtering never
/// mutates the dataset; every recomputation builds a fresh view.
#[derive(Debug)]
pub struct FilteredView<'a> {
    pub records: Vec<&'a WatchRecord>,
}

impl<'a> FilteredView<'a> {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a WatchRecord> {
        self.records.iter().copied()
    }
}

/// The explicit recompute entry point: one pure call per filter-state change.
///
/// An empty brands, price-categories or materials selection is a recoverable
/// user-input state, returned as [`EmptySelection`] so the caller can halt
/// aggregation and prompt instead of reporting statistics over zero records.
pub fn apply_filters<'a>(
    dataset: &'a CleanedDataset,
    spec: &FilterSpec,
) -> Result<FilteredView<'a>, EmptySelection> {
    if spec.brands.is_empty() {
        return Err(EmptySelection::Brands);
    }
    if spec.price_categories.is_empty() {
        return Err(EmptySelection::PriceCategories);
    }
    if spec.materials.is_empty() {
        return Err(EmptySelection::Materials);
    }

    let records = dataset
        .records
        .iter()
        .filter(|r| passes_ceiling(r))
        .filter(|r| spec.brands.contains(&r.brand))
        .filter(|r| passes_missing_exclusions(r, spec))
        .filter(|r| passes_price_ranges(r, spec))
        .filter(|r| spec.price_categories.contains(&r.price_category))
        .filter(|r| passes_material_selection(r, &spec.materials))
        .filter(|r| passes_diameter_ranges(r, spec))
        .collect();

    Ok(FilteredView { records })
}

fn passes_ceiling(record: &WatchRecord) -> bool {
    record.price_reference.is_none_or(|p| p <= REFERENCE_PRICE_CEILING)
}

fn passes_missing_exclusions(record: &WatchRecord, spec: &FilterSpec) -> bool {
    if spec.exclude_missing_price
        && (record.price_reference.is_none() || record.price_vendor.is_none())
    {
        return false;
    }
    if spec.exclude_missing_diameter
        && (record.diameter_reference.is_none() || record.diameter_vendor.is_none())
    {
        return false;
    }
    if spec.exclude_missing_material
        && (record.material_reference_canonical.is_none()
            || record.material_vendor_canonical.is_none())
    {
        return false;
    }
    true
}

fn passes_price_ranges(record: &WatchRecord, spec: &FilterSpec) -> bool {
    // With missing prices excluded upstream, the ranges apply strictly;
    // otherwise an absent price passes.
    let in_range = |price: Option<f64>, range: &RangeFilter| match price {
        Some(p) => range.contains(p),
        None => !spec.exclude_missing_price,
    };
    in_range(record.price_reference, &spec.reference_price)
        && in_range(record.price_vendor, &spec.vendor_price)
}

fn passes_diameter_ranges(record: &WatchRecord, spec: &FilterSpec) -> bool {
    // Missing diameters are always included, regardless of the exclusion
    // toggle. Asymmetric with prices on purpose.
    let in_range = |diameter: Option<f64>, range: &RangeFilter| match diameter {
        Some(d) => range.contains(d),
        None => true,
    };
    in_range(record.diameter_reference, &spec.reference_diameter)
        && in_range(record.diameter_vendor, &spec.vendor_diameter)
}

/// OR across the two source columns, OR across selected values. Explicit
/// per-value containment checks rather than one constructed pattern, so
/// material names with reserved pattern syntax cannot inject anything.
fn passes_material_selection(record: &WatchRecord, selected: &[String]) -> bool {
    let column_matches = |column: Option<&str>| {
        let Some(material) = column else { return false };
        let material = material.to_lowercase();
        selected
            .iter()
            .any(|wanted| material.contains(&wanted.to_lowercase()))
    };
    column_matches(record.material_reference_canonical.as_deref())
        || column_matches(record.material_vendor_canonical.as_deref())
}

/// Numeric bounds for the four range controls, shown as slider defaults.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FilterBounds {
    pub reference_price: Option<(f64, f64)>,
    pub vendor_price: Option<(f64, f64)>,
    pub reference_diameter: Option<(f64, f64)>,
    pub vendor_diameter: Option<(f64, f64)>,
}

/// Computes control bounds from the post-missing-exclusion dataset, after the
/// hard price ceiling. The reference-price upper bound is additionally capped
/// at the ceiling. `None` means no record carries a value for that control.
pub fn control_bounds(dataset: &CleanedDataset, spec: &FilterSpec) -> FilterBounds {
    let eligible: Vec<&WatchRecord> = dataset
        .records
        .iter()
        .filter(|r| passes_ceiling(r))
        .filter(|r| passes_missing_exclusions(r, spec))
        .collect();

    let bounds = |values: &mut dyn Iterator<Item = f64>| -> Option<(f64, f64)> {
        values.fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((min, max)) => Some((min.min(v), max.max(v))),
        })
    };

    let reference_price = bounds(&mut eligible.iter().filter_map(|r| r.price_reference))
        .map(|(min, max)| (min, max.min(REFERENCE_PRICE_CEILING)));
    FilterBounds {
        reference_price,
        vendor_price: bounds(&mut eligible.iter().filter_map(|r| r.price_vendor)),
        reference_diameter: bounds(&mut eligible.iter().filter_map(|r| r.diameter_reference)),
        vendor_diameter: bounds(&mut eligible.iter().filter_map(|r| r.diameter_vendor)),
    }
}
