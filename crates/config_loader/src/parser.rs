//! Config parsing
//!
//! TOML is the primary format, JSON is accepted as well.

use contracts::{CaptureBlueprint, ContractError};

/// Config file format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Json,
}

impl ConfigFormat {
    /// Infer the format from a file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

pub fn parse_toml(content: &str) -> Result<CaptureBlueprint, ContractError> {
    toml::from_str(content).map_err(|e| ContractError::ConfigParse {
        message: format!("TOML parse error: {e}"),
        source: Some(Box::new(e)),
    })
}

pub fn parse_json(content: &str) -> Result<CaptureBlueprint, ContractError> {
    serde_json::from_str(content).map_err(|e| ContractError::ConfigParse {
        message: format!("JSON parse error: {e}"),
        source: Some(Box::new(e)),
    })
}

pub fn parse(content: &str, format: ConfigFormat) -> Result<CaptureBlueprint, ContractError> {
    match format {
        ConfigFormat::Toml => parse_toml(content),
        ConfigFormat::Json => parse_json(content),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::TimeUnit;

    #[test]
    fn test_parse_toml_full() {
        let content = r#"
version = "V1"

[corpus]
path = "uploads/"
depth_extension = "raw"

[[sources]]
id = "raspi1"
serial_number = "138322250306"

[sync]
depth_threshold = 500
unit = "microseconds"
[sync.clock_offsets]
raspi1 = -20

[workset]
output_dir = "work"
delete_remainder = true
"#;
        let bp = parse_toml(content).unwrap();
        assert_eq!(bp.corpus.depth_extension, "raw");
        assert_eq!(bp.sync.unit, TimeUnit::Microseconds);
        assert_eq!(bp.sync.clock_offsets.get("raspi1"), Some(&-20));
        assert!(bp.workset.delete_remainder);
    }

    #[test]
    fn test_parse_json_minimal() {
        let content = r#"{
            "corpus": { "path": "uploads" },
            "sources": [{ "id": "raspi1", "serial_number": "138322250306" }],
            "sync": { "depth_threshold": 66 }
        }"#;
        let result = parse_json(content);
        assert!(result.is_ok(), "Failed: {:?}", result.err());
    }

    #[test]
    fn test_parse_unknown_unit_fails() {
        let content = r#"
[corpus]
path = "uploads"

[[sources]]
id = "raspi1"
serial_number = "1"

[sync]
unit = "fortnights"
"#;
        assert!(matches!(
            parse_toml(content),
            Err(ContractError::ConfigParse { .. })
        ));
    }

    #[test]
    fn test_parse_toml_syntax_error() {
        let err = parse_toml("invalid toml [[[").unwrap_err();
        assert!(matches!(err, ContractError::ConfigParse { .. }));
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            ConfigFormat::from_extension("TOML"),
            Some(ConfigFormat::Toml)
        );
        assert_eq!(
            ConfigFormat::from_extension("json"),
            Some(ConfigFormat::Json)
        );
        assert_eq!(ConfigFormat::from_extension("yaml"), None);
    }
}
