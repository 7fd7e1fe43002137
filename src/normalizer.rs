use crate::model::NormalizerError;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Canonicalizes free-text categorical values.
pub trait Normalizer {
    fn normalize(&self, raw: Option<&str>) -> Option<String>;
}

/// One entry of the material table asset.
#[derive(Debug, Deserialize)]
pub struct MaterialMapping {
    pub raw: String,
    pub canonical: String,
}

/// Static lookup table from trimmed, lower-cased raw material names to
/// canonical ones. Unmapped values pass through unchanged (identity fallback);
/// that leaves rare spellings uncanonicalized on purpose.
#[derive(Debug, Clone)]
pub struct MaterialTable {
    entries: HashMap<String, String>,
}

impl MaterialTable {
    /// Builds the table, keying every raw spelling by its trimmed lower-cased
    /// form. Rejects tables where a canonical output would resolve to a
    /// different value when fed back in, so normalization stays idempotent.
    pub fn new(mappings: Vec<MaterialMapping>) -> Result<Self, NormalizerError> {
        let mut entries = HashMap::with_capacity(mappings.len());
        for mapping in mappings {
            entries.insert(mapping.raw.trim().to_lowercase(), mapping.canonical);
        }

        for canonical in entries.values() {
            let key = canonical.trim().to_lowercase();
            let resolved = entries.get(&key).unwrap_or(&key);
            if resolved != canonical {
                return Err(NormalizerError::NotIdempotent {
                    canonical: canonical.clone(),
                    resolved: resolved.clone(),
                });
            }
        }

        Ok(Self { entries })
    }

    pub fn from_json(json: &str) -> Result<Self, NormalizerError> {
        let mappings: Vec<MaterialMapping> = serde_json::from_str(json)?;
        Self::new(mappings)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, NormalizerError> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Normalizer backed by an injected, immutable [`MaterialTable`].
#[derive(Debug, Clone)]
pub struct MaterialNormalizer {
    table: MaterialTable,
}

impl MaterialNormalizer {
    pub fn new(table: MaterialTable) -> Self {
        Self { table }
    }
}

impl Normalizer for MaterialNormalizer {
    /// Trim, lower-case, look up. On a miss the trimmed lower-cased input is
    /// returned as-is. Total over any string, including the empty string.
    fn normalize(&self, raw: Option<&str>) -> Option<String> {
        let key = raw?.trim().to_lowercase();
        match self.table.entries.get(&key) {
            Some(canonical) => Some(canonical.clone()),
            None => Some(key),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalizer() -> MaterialNormalizer {
        let table = MaterialTable::from_json(
            r#"[
                { "raw": "polished stainless steel", "canonical": "stainless steel" },
                { "raw": "stainless steel", "canonical": "stainless steel" },
                { "raw": "18k rose gold", "canonical": "rose gold" },
                { "raw": "rose gold", "canonical": "rose gold" }
            ]"#,
        )
        .unwrap();
        MaterialNormalizer::new(table)
    }

    #[test]
    fn maps_known_spellings_case_and_whitespace_insensitively() {
        let n = normalizer();
        assert_eq!(
            n.normalize(Some("Polished Stainless Steel")),
            Some("stainless steel".to_string())
        );
        assert_eq!(
            n.normalize(Some("  18K ROSE GOLD  ")),
            Some("rose gold".to_string())
        );
    }

    #[test]
    fn unknown_values_pass_through_trimmed_and_lowercased() {
        let n = normalizer();
        assert_eq!(
            n.normalize(Some("Unknown-Alloy-X")),
            Some("unknown-alloy-x".to_string())
        );
    }

    #[test]
    fn absent_stays_absent_and_empty_string_is_a_literal_key() {
        let n = normalizer();
        assert_eq!(n.normalize(None), None);
        assert_eq!(n.normalize(Some("")), Some(String::new()));
        assert_eq!(n.normalize(Some("   ")), Some(String::new()));
    }

    #[test]
    fn normalization_is_idempotent() {
        let n = normalizer();
        for raw in ["Polished Stainless Steel", "18k Rose Gold", "weird metal"] {
            let once = n.normalize(Some(raw)).unwrap();
            let twice = n.normalize(Some(&once)).unwrap();
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn non_idempotent_table_is_rejected() {
        // "black carbon" is both a canonical output and a key mapping elsewhere.
        let result = MaterialTable::from_json(
            r#"[
                { "raw": "black carbon & rose gold", "canonical": "black carbon" },
                { "raw": "black carbon", "canonical": "carbon" }
            ]"#,
        );
        assert!(matches!(
            result,
            Err(crate::model::NormalizerError::NotIdempotent { .. })
        ));
    }

    #[test]
    fn shipped_table_parses_and_is_idempotent() {
        let table = MaterialTable::from_json(include_str!("../config/materials.json")).unwrap();
        assert!(table.len() >= 85);
    }
}
