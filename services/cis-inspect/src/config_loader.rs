//! Configuration loading for cis-inspect
//!
//! Settings are layered: built-in defaults, then an optional YAML file,
//! then `CIS_*` environment variables, then command-line flags.
//!
//! ```yaml
//! epsilon: 1.0e-6
//! layout:
//!   fields: fastest
//!   order: row-major
//! ```

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use cis_coverage::{CoverageConfig, PayloadLayout};
use tracing::debug;

/// Command-line overrides applied on top of file and environment settings.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub epsilon: Option<f64>,
    pub layout: Option<PayloadLayout>,
}

/// Load a coverage configuration from a YAML file.
pub fn load_coverage_config<P: AsRef<Path>>(path: P) -> Result<CoverageConfig> {
    let content = fs::read_to_string(path.as_ref())
        .with_context(|| format!("Failed to read config from {:?}", path.as_ref()))?;
    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config YAML from {:?}", path.as_ref()))
}

/// Resolve the effective configuration and validate it.
pub fn resolve_config(file: Option<&Path>, overrides: &Overrides) -> Result<CoverageConfig> {
    let mut config = match file {
        Some(path) => load_coverage_config(path)?,
        None => CoverageConfig::default(),
    };
    config.apply_env();

    if let Some(epsilon) = overrides.epsilon {
        config.epsilon = epsilon;
    }
    if let Some(layout) = overrides.layout {
        config.layout = Some(layout);
    }

    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {}", e))?;

    debug!(
        epsilon = config.epsilon,
        layout = ?config.layout.map(|l| l.to_string()),
        "Resolved configuration"
    );
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cis_coverage::{AxisOrder, FieldPlacement};

    fn write_yaml(dir: &tempfile::TempDir, content: &str) -> std::path::PathBuf {
        let path = dir.path().join("inspect.yaml");
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_load_yaml_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_yaml(
            &dir,
            "epsilon: 1.0e-4\nlayout:\n  fields: slowest\n  order: column-major\n",
        );
        let config = load_coverage_config(&path).unwrap();
        assert_eq!(config.epsilon, 1e-4);
        assert_eq!(
            config.layout,
            Some(PayloadLayout::new(FieldPlacement::Slowest, AxisOrder::ColumnMajor))
        );
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_yaml(&dir, "epsilon: 1.0e-3\n");
        let config = load_coverage_config(&path).unwrap();
        assert_eq!(config.epsilon, 1e-3);
        assert!(config.layout.is_none());
    }

    #[test]
    fn test_missing_file_is_error() {
        let err = load_coverage_config("/nonexistent/inspect.yaml").unwrap_err();
        assert!(err.to_string().contains("Failed to read config"));
    }

    #[test]
    fn test_overrides_win() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_yaml(&dir, "epsilon: 1.0e-3\n");
        let overrides = Overrides {
            epsilon: Some(1e-5),
            layout: Some("field-fastest,row-major".parse().unwrap()),
        };
        let config = resolve_config(Some(path.as_path()), &overrides).unwrap();
        assert_eq!(config.epsilon, 1e-5);
        assert!(config.layout.is_some());
    }

    #[test]
    fn test_invalid_epsilon_rejected() {
        let overrides = Overrides {
            epsilon: Some(0.75),
            layout: None,
        };
        assert!(resolve_config(None, &overrides).is_err());
    }
}
