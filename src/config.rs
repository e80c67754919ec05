//! Generator settings, loadable from a YAML file.

use crate::measure::LineMetrics;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    /// File name of the single consolidated unit.
    pub combined_output: String,
    /// Extension of per-namespace headers, without the dot.
    pub header_extension: String,
    /// Prepended to every include guard token.
    pub guard_prefix: Option<String>,
    /// Header providing the Geometry/Constraint/Variable base types.
    pub core_include: String,
    pub max_line_width: usize,
    pub indent: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            combined_output: "gcs_definitions.h".to_string(),
            header_extension: "h".to_string(),
            guard_prefix: None,
            core_include: "gcs/core/core.h".to_string(),
            max_line_width: 100,
            indent: 4,
        }
    }
}

impl GeneratorConfig {
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml(&text).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn from_yaml(text: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(text)
    }

    pub fn metrics(&self) -> LineMetrics {
        LineMetrics {
            max_width: self.max_line_width,
            indent: self.indent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config =
            GeneratorConfig::from_yaml("guard_prefix: GCS_LIB_INCLUDE\nmax_line_width: 80\n")
                .unwrap();

        assert_eq!(config.guard_prefix.as_deref(), Some("GCS_LIB_INCLUDE"));
        assert_eq!(config.max_line_width, 80);
        assert_eq!(config.header_extension, "h");
        assert_eq!(config.combined_output, "gcs_definitions.h");
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(GeneratorConfig::from_yaml("colour: blue\n").is_err());
    }

    #[test]
    fn test_missing_file() {
        let err = GeneratorConfig::from_path(Path::new("/nonexistent/gcsgen.yml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
