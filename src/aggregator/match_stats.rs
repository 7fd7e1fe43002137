use crate::filter::FilteredView;
use crate::model::{MatchAttribute, MatchStatus, WatchRecord};
use serde::Serialize;

/// Per-attribute share of records where both sources agree, in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MatchPercentages {
    pub price: f64,
    pub case_diameter: f64,
    pub case_material: f64,
}

fn status_of(record: &WatchRecord, attribute: MatchAttribute) -> MatchStatus {
    match attribute {
        MatchAttribute::Price => record.price_match,
        MatchAttribute::CaseDiameter => record.diameter_match,
        MatchAttribute::CaseMaterial => record.material_match,
    }
}

fn percentage(view: &FilteredView<'_>, attribute: MatchAttribute) -> f64 {
    let total = view.len();
    if total == 0 {
        // Defined, never a divide-by-zero fault.
        return 0.0;
    }
    let matched = view
        .iter()
        .filter(|r| status_of(r, attribute).is_match())
        .count();
    matched as f64 * 100.0 / total as f64
}

/// Match percentage per compared attribute over the whole view.
pub fn match_percentages(view: &FilteredView<'_>) -> MatchPercentages {
    MatchPercentages {
        price: percentage(view, MatchAttribute::Price),
        case_diameter: percentage(view, MatchAttribute::CaseDiameter),
        case_material: percentage(view, MatchAttribute::CaseMaterial),
    }
}

/// Counts per match outcome for one attribute. Incomparable records (a value
/// absent on either side) are reported separately from true mismatches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MatchDistribution {
    pub attribute: MatchAttribute,
    pub matches: usize,
    pub mismatches: usize,
    pub incomparable: usize,
}

pub fn match_distribution(view: &FilteredView<'_>, attribute: MatchAttribute) -> MatchDistribution {
    let mut distribution = MatchDistribution {
        attribute,
        matches: 0,
        mismatches: 0,
        incomparable: 0,
    };
    for record in view.iter() {
        match status_of(record, attribute) {
            MatchStatus::Match => distribution.matches += 1,
            MatchStatus::Mismatch => distribution.mismatches += 1,
            MatchStatus::Incomparable => distribution.incomparable += 1,
        }
    }
    distribution
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::FilteredView;
    use crate::model::{MatchStatus, PriceCategory, WatchRecord};

    fn record(price_match: MatchStatus) -> WatchRecord {
        WatchRecord {
            id: "w".to_string(),
            brand: "Omega".to_string(),
            price_reference: Some(600_000.0),
            price_vendor: Some(600_000.0),
            diameter_reference: Some(40.0),
            diameter_vendor: Some(40.0),
            material_reference: Some("stainless steel".to_string()),
            material_vendor: Some("stainless steel".to_string()),
            material_reference_canonical: Some("stainless steel".to_string()),
            material_vendor_canonical: Some("stainless steel".to_string()),
            price_category: PriceCategory::HighPriced,
            price_match,
            diameter_match: MatchStatus::Match,
            material_match: MatchStatus::Mismatch,
        }
    }

    #[test]
    fn empty_view_reports_zero_everywhere() {
        let view = FilteredView { records: vec![] };
        let percentages = match_percentages(&view);
        assert_eq!(percentages.price, 0.0);
        assert_eq!(percentages.case_diameter, 0.0);
        assert_eq!(percentages.case_material, 0.0);
    }

    #[test]
    fn all_matching_records_report_one_hundred_percent() {
        let records = vec![
            record(MatchStatus::Match),
            record(MatchStatus::Match),
            record(MatchStatus::Match),
        ];
        let view = FilteredView { records: records.iter().collect() };
        assert_eq!(match_percentages(&view).price, 100.0);
    }

    #[test]
    fn incomparable_counts_against_the_percentage_but_not_as_mismatch() {
        let records = vec![
            record(MatchStatus::Match),
            record(MatchStatus::Mismatch),
            record(MatchStatus::Incomparable),
            record(MatchStatus::Incomparable),
        ];
        let view = FilteredView { records: records.iter().collect() };

        assert_eq!(match_percentages(&view).price, 25.0);
        let distribution = match_distribution(&view, MatchAttribute::Price);
        assert_eq!(distribution.matches, 1);
        assert_eq!(distribution.mismatches, 1);
        assert_eq!(distribution.incomparable, 2);
    }
}
