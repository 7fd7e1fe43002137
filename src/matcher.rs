// Cross-source attribute comparison, always on canonicalized fields.
use crate::model::{MatchFlags, MatchStatus, RawRecord};

/// Exact equality, no tolerance. Either side absent means the pair is
/// incomparable rather than matched or mismatched.
pub fn numeric_match(a: Option<f64>, b: Option<f64>) -> MatchStatus {
    match (a, b) {
        (Some(a), Some(b)) if a == b => MatchStatus::Match,
        (Some(_), Some(_)) => MatchStatus::Mismatch,
        _ => MatchStatus::Incomparable,
    }
}

pub fn text_match(a: Option<&str>, b: Option<&str>) -> MatchStatus {
    match (a, b) {
        (Some(a), Some(b)) if a == b => MatchStatus::Match,
        (Some(_), Some(_)) => MatchStatus::Mismatch,
        _ => MatchStatus::Incomparable,
    }
}

/// Computes the three match flags for one record. Material comparison uses the
/// canonical columns, never the raw spellings.
pub fn evaluate(
    raw: &RawRecord,
    material_reference_canonical: Option<&str>,
    material_vendor_canonical: Option<&str>,
) -> MatchFlags {
    MatchFlags {
        price: numeric_match(raw.price_reference, raw.price_vendor),
        diameter: numeric_match(raw.diameter_reference, raw.diameter_vendor),
        material: text_match(material_reference_canonical, material_vendor_canonical),
    }
}
