use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Application configuration, read from a JSON file next to the binary.
#[derive(Debug, Deserialize)]
pub struct AppConfig {
    /// Path to the tabular input file, read once at startup.
    pub dataset_path: String,
    /// Path to the material normalization table asset.
    pub material_table_path: String,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Json(#[from] serde_json::Error),
}

pub fn load_config(path: impl AsRef<Path>) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: AppConfig = serde_json::from_str(&content)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parses_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "dataset_path": "data/watches.csv", "material_table_path": "config/materials.json" }}"#
        )
        .unwrap();
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.dataset_path, "data/watches.csv");
        assert_eq!(config.material_table_path, "config/materials.json");
    }

    #[test]
    fn missing_file_is_an_io_error() {
        assert!(matches!(
            load_config("does-not-exist.json"),
            Err(ConfigError::Io(_))
        ));
    }
}
