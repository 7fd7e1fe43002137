// Dataset ingestion and cleaning. Steps run in a fixed order: coercion,
// normalization, diameter cap, frequency universe, universe drop, price
// category, match flags. Later steps depend on earlier ones.
use crate::matcher;
use crate::model::{
    CleanedDataset, LoadError, MalformedRecordError, PriceCategory, RawRecord, WatchRecord,
};
use crate::normalizer::Normalizer;
use chrono::Utc;
use csv::StringRecord;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use tracing::{info, warn};

/// Records with a larger case diameter on either side are dropped at load time.
pub const MAX_CASE_DIAMETER_MM: f64 = 70.0;
/// Reference price at or above this is high-priced.
pub const HIGH_PRICE_THRESHOLD: f64 = 500_000.0;
/// A canonical material must occur this often, pooled across both sources,
/// to enter the selectable universe.
pub const MIN_MATERIAL_OCCURRENCES: usize = 5;

const COLUMNS: [&str; 8] = [
    "id",
    "brand",
    "price_reference",
    "price_vendor",
    "case_diameter_reference",
    "case_diameter_vendor",
    "case_material_reference",
    "case_material_vendor",
];

/// Reads the input file and runs the full cleaning pipeline.
///
/// Malformed rows (missing id or brand) are logged, counted and skipped;
/// a missing file or missing header column aborts the load.
pub fn load_dataset(
    path: impl AsRef<Path>,
    normalizer: &dyn Normalizer,
) -> Result<CleanedDataset, LoadError> {
    let mut reader = csv::Reader::from_path(path)?;

    let headers = reader.headers()?.clone();
    let mut indices = [0usize; COLUMNS.len()];
    for (slot, name) in indices.iter_mut().zip(COLUMNS) {
        *slot = headers
            .iter()
            .position(|h| h == name)
            .ok_or(LoadError::MissingColumn(name))?;
    }

    let mut raws = Vec::new();
    let mut skipped = 0usize;
    for (row_number, row) in reader.records().enumerate() {
        // A ragged or unreadable row is skipped like any other malformed row;
        // only file- and header-level errors abort the load.
        let row = match row {
            Ok(row) => row,
            Err(e) => {
                warn!("skipping unreadable row {}: {}", row_number as u64 + 2, e);
                skipped += 1;
                continue;
            }
        };
        match parse_row(&row, &indices, row_number as u64 + 2) {
            Ok(raw) => raws.push(raw),
            Err(e) => {
                warn!("skipping malformed row: {}", e);
                skipped += 1;
            }
        }
    }

    info!("parsed {} rows ({} skipped as malformed)", raws.len(), skipped);
    Ok(clean_records(raws, normalizer, skipped))
}

fn parse_row(
    row: &StringRecord,
    indices: &[usize; COLUMNS.len()],
    row_number: u64,
) -> Result<RawRecord, MalformedRecordError> {
    let field = |i: usize| row.get(indices[i]).unwrap_or("").trim();

    let id = field(0);
    if id.is_empty() {
        return Err(MalformedRecordError { row: row_number, field: "id" });
    }
    let brand = field(1);
    if brand.is_empty() {
        return Err(MalformedRecordError { row: row_number, field: "brand" });
    }

    Ok(RawRecord {
        id: id.to_string(),
        brand: brand.to_string(),
        price_reference: coerce_number(field(2)),
        price_vendor: coerce_number(field(3)),
        diameter_reference: coerce_number(field(4)),
        diameter_vendor: coerce_number(field(5)),
        material_reference: coerce_text(field(6)),
        material_vendor: coerce_text(field(7)),
    })
}

/// Lenient coercion: anything that does not parse as a number becomes absent.
fn coerce_number(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn coerce_text(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Cleans already-coerced rows. Split out from [`load_dataset`] so the
/// pipeline is testable without touching the filesystem.
pub fn clean_records(
    raws: Vec<RawRecord>,
    normalizer: &dyn Normalizer,
    skipped_rows: usize,
) -> CleanedDataset {
    // Normalize both material columns, then drop oversized diameters.
    // Absent diameters are never dropped by the cap.
    let normalized: Vec<(RawRecord, Option<String>, Option<String>)> = raws
        .into_iter()
        .map(|raw| {
            let reference = normalizer.normalize(raw.material_reference.as_deref());
            let vendor = normalizer.normalize(raw.material_vendor.as_deref());
            (raw, reference, vendor)
        })
        .filter(|(raw, _, _)| {
            raw.diameter_reference.is_none_or(|d| d <= MAX_CASE_DIAMETER_MM)
                && raw.diameter_vendor.is_none_or(|d| d <= MAX_CASE_DIAMETER_MM)
        })
        .collect();

    let material_universe = build_material_universe(
        normalized
            .iter()
            .flat_map(|(_, reference, vendor)| [reference.as_deref(), vendor.as_deref()])
            .flatten(),
    );
    let universe_set: HashSet<&str> = material_universe.iter().map(String::as_str).collect();

    let records: Vec<WatchRecord> = normalized
        .into_iter()
        .filter(|(_, reference, vendor)| {
            // Keep only records with at least one material in the universe.
            reference.as_deref().is_some_and(|m| universe_set.contains(m))
                || vendor.as_deref().is_some_and(|m| universe_set.contains(m))
        })
        .map(|(raw, reference, vendor)| {
            let flags = matcher::evaluate(&raw, reference.as_deref(), vendor.as_deref());
            WatchRecord {
                price_category: price_category(raw.price_reference),
                id: raw.id,
                brand: raw.brand,
                price_reference: raw.price_reference,
                price_vendor: raw.price_vendor,
                diameter_reference: raw.diameter_reference,
                diameter_vendor: raw.diameter_vendor,
                material_reference: raw.material_reference,
                material_vendor: raw.material_vendor,
                material_reference_canonical: reference,
                material_vendor_canonical: vendor,
                price_match: flags.price,
                diameter_match: flags.diameter,
                material_match: flags.material,
            }
        })
        .collect();

    info!(
        "cleaned dataset: {} records, {} selectable materials",
        records.len(),
        material_universe.len()
    );

    CleanedDataset {
        records,
        material_universe,
        skipped_rows,
        loaded_at: Utc::now(),
    }
}

/// Pools canonical materials from both sources, keeps those occurring at
/// least [`MIN_MATERIAL_OCCURRENCES`] times and orders them by count
/// descending, ties by name ascending so the list is deterministic.
fn build_material_universe<'a>(materials: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for material in materials {
        *counts.entry(material).or_insert(0) += 1;
    }

    let mut universe: Vec<(&str, usize)> = counts
        .into_iter()
        .filter(|&(_, count)| count >= MIN_MATERIAL_OCCURRENCES)
        .collect();
    universe.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    universe.into_iter().map(|(name, _)| name.to_string()).collect()
}

/// Three-way banding from the reference price only.
pub fn price_category(price_reference: Option<f64>) -> PriceCategory {
    match price_reference {
        None => PriceCategory::Unknown,
        Some(p) if p >= HIGH_PRICE_THRESHOLD => PriceCategory::HighPriced,
        Some(_) => PriceCategory::Regular,
    }
}
