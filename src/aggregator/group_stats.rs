use crate::filter::FilteredView;
use crate::model::WatchRecord;
use serde::Serialize;
use std::collections::HashMap;

/// How to group records for the median comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKey {
    Brand,
    PriceCategory,
}

impl GroupKey {
    fn of(&self, record: &WatchRecord) -> String {
        match self {
            GroupKey::Brand => record.brand.clone(),
            GroupKey::PriceCategory => record.price_category.label().to_string(),
        }
    }
}

/// Reference and vendor price medians for one group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupMedians {
    pub group: String,
    pub median_reference: Option<f64>,
    pub median_vendor: Option<f64>,
}

/// Median of the present values; `None` when no value is present. An
/// even-sized set yields the mean of the two middle values.
fn median(mut values: Vec<f64>) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| a.total_cmp(b));
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        Some((values[mid - 1] + values[mid]) / 2.0)
    } else {
        Some(values[mid])
    }
}

/// Per-group price medians for both sources, ordered by group name ascending.
/// Groups where both medians are absent are excluded.
pub fn median_prices(view: &FilteredView<'_>, key: GroupKey) -> Vec<GroupMedians> {
    let mut groups: HashMap<String, (Vec<f64>, Vec<f64>)> = HashMap::new();
    for record in view.iter() {
        let entry = groups.entry(key.of(record)).or_default();
        if let Some(price) = record.price_reference {
            entry.0.push(price);
        }
        if let Some(price) = record.price_vendor {
            entry.1.push(price);
        }
    }

    let mut medians: Vec<GroupMedians> = groups
        .into_iter()
        .map(|(group, (reference, vendor))| GroupMedians {
            group,
            median_reference: median(reference),
            median_vendor: median(vendor),
        })
        .filter(|m| m.median_reference.is_some() || m.median_vendor.is_some())
        .collect();
    medians.sort_by(|a, b| a.group.cmp(&b.group));
    medians
}

/// Which categorical field a top-N ranking runs over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryField {
    /// The two canonical material columns, counted per source.
    CaseMaterial,
    /// The shared brand label; both per-source counts are the record count.
    Brand,
}

/// Per-category occurrence counts for both sources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub category: String,
    pub reference_count: usize,
    pub vendor_count: usize,
}

/// Top `n` categories ranked by combined count descending, ties broken by
/// category name ascending so the ranking is deterministic.
pub fn top_categories(
    view: &FilteredView<'_>,
    n: usize,
    field: CategoryField,
) -> Vec<CategoryCount> {
    let mut counts: HashMap<String, (usize, usize)> = HashMap::new();
    for record in view.iter() {
        match field {
            CategoryField::CaseMaterial => {
                if let Some(material) = record.material_reference_canonical.as_deref() {
                    counts.entry(material.to_string()).or_default().0 += 1;
                }
                if let Some(material) = record.material_vendor_canonical.as_deref() {
                    counts.entry(material.to_string()).or_default().1 += 1;
                }
            }
            CategoryField::Brand => {
                let entry = counts.entry(record.brand.clone()).or_default();
                entry.0 += 1;
                entry.1 += 1;
            }
        }
    }

    let mut ranking: Vec<CategoryCount> = counts
        .into_iter()
        .map(|(category, (reference_count, vendor_count))| CategoryCount {
            category,
            reference_count,
            vendor_count,
        })
        .collect();
    ranking.sort_by(|a, b| {
        let combined_a = a.reference_count + a.vendor_count;
        let combined_b = b.reference_count + b.vendor_count;
        combined_b
            .cmp(&combined_a)
            .then_with(|| a.category.cmp(&b.category))
    });
    ranking.truncate(n);
    ranking
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::FilteredView;
    use crate::model::{MatchStatus, PriceCategory, WatchRecord};

    fn record(brand: &str, price_reference: Option<f64>, material: &str) -> WatchRecord {
        WatchRecord {
            id: format!("{brand}-{material}"),
            brand: brand.to_string(),
            price_reference,
            price_vendor: price_reference.map(|p| p + 100.0),
            diameter_reference: Some(40.0),
            diameter_vendor: Some(40.0),
            material_reference: Some(material.to_string()),
            material_vendor: Some(material.to_string()),
            material_reference_canonical: Some(material.to_string()),
            material_vendor_canonical: Some(material.to_string()),
            price_category: PriceCategory::Regular,
            price_match: MatchStatus::Match,
            diameter_match: MatchStatus::Match,
            material_match: MatchStatus::Match,
        }
    }

    #[test]
    fn medians_are_per_group_and_name_ordered() {
        let records = vec![
            record("Rolex", Some(10_000.0), "steel"),
            record("Rolex", Some(20_000.0), "steel"),
            record("Rolex", Some(90_000.0), "steel"),
            record("Omega", Some(5_000.0), "steel"),
            record("Omega", Some(7_000.0), "steel"),
        ];
        let view = FilteredView { records: records.iter().collect() };

        let medians = median_prices(&view, GroupKey::Brand);
        assert_eq!(medians.len(), 2);
        assert_eq!(medians[0].group, "Omega");
        // Even-sized group: mean of the two middle values.
        assert_eq!(medians[0].median_reference, Some(6_000.0));
        assert_eq!(medians[0].median_vendor, Some(6_100.0));
        assert_eq!(medians[1].group, "Rolex");
        assert_eq!(medians[1].median_reference, Some(20_000.0));
    }

    #[test]
    fn groups_with_no_prices_at_all_are_excluded() {
        let records = vec![
            record("Rolex", Some(10_000.0), "steel"),
            record("Ghost", None, "steel"),
        ];
        let mut records = records;
        records[1].price_vendor = None;
        let view = FilteredView { records: records.iter().collect() };

        let medians = median_prices(&view, GroupKey::Brand);
        assert_eq!(medians.len(), 1);
        assert_eq!(medians[0].group, "Rolex");
    }

    #[test]
    fn top_categories_ranked_by_combined_count_with_lexicographic_ties() {
        let mut records = vec![
            record("A", Some(1.0), "steel"),
            record("A", Some(1.0), "steel"),
            record("A", Some(1.0), "titanium"),
            record("A", Some(1.0), "ceramic"),
        ];
        // One vendor column disagrees, giving steel 2+1 and bronze 0+1.
        records[1].material_vendor_canonical = Some("bronze".to_string());
        let view = FilteredView { records: records.iter().collect() };

        let ranking = top_categories(&view, 10, CategoryField::CaseMaterial);
        let names: Vec<&str> = ranking.iter().map(|c| c.category.as_str()).collect();
        // ceramic and titanium tie at 2; lexicographic order breaks it.
        assert_eq!(names, vec!["steel", "ceramic", "titanium", "bronze"]);
        assert_eq!(ranking[0].reference_count, 2);
        assert_eq!(ranking[0].vendor_count, 1);

        let top_two = top_categories(&view, 2, CategoryField::CaseMaterial);
        assert_eq!(top_two.len(), 2);
    }

    #[test]
    fn brand_rankings_count_records_per_source() {
        let records = vec![
            record("Rolex", Some(1.0), "steel"),
            record("Rolex", Some(1.0), "steel"),
            record("Omega", Some(1.0), "steel"),
        ];
        let view = FilteredView { records: records.iter().collect() };
        let ranking = top_categories(&view, 10, CategoryField::Brand);
        assert_eq!(ranking[0].category, "Rolex");
        assert_eq!(ranking[0].reference_count, 2);
        assert_eq!(ranking[0].vendor_count, 2);
    }
}
