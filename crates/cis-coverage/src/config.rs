//! Configuration for decoding and validating coverages.

use serde::{Deserialize, Serialize};

use crate::axis::DEFAULT_EPSILON;
use crate::layout::PayloadLayout;

/// Settings shared by the codec and the coverage validator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoverageConfig {
    /// Relative tolerance for cell counts, domain checks and envelope equality.
    pub epsilon: f64,

    /// How inline payloads were flattened. `None` means undeclared, in which
    /// case documents carrying real inline values are rejected.
    pub layout: Option<PayloadLayout>,
}

impl Default for CoverageConfig {
    fn default() -> Self {
        Self {
            epsilon: DEFAULT_EPSILON,
            layout: None,
        }
    }
}

impl CoverageConfig {
    pub fn with_layout(mut self, layout: PayloadLayout) -> Self {
        self.layout = Some(layout);
        self
    }

    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Load configuration from environment variables.
    ///
    /// - `CIS_EPSILON`: relative tolerance
    /// - `CIS_PAYLOAD_LAYOUT`: e.g. `field-fastest,row-major`
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    /// Override fields from environment variables that are set and parse.
    pub fn apply_env(&mut self) {
        if let Ok(val) = std::env::var("CIS_EPSILON") {
            match val.parse() {
                Ok(epsilon) => self.epsilon = epsilon,
                Err(_) => tracing::warn!(value = %val, "Ignoring unparsable CIS_EPSILON"),
            }
        }

        if let Ok(val) = std::env::var("CIS_PAYLOAD_LAYOUT") {
            match val.parse() {
                Ok(layout) => self.layout = Some(layout),
                Err(e) => tracing::warn!(value = %val, error = %e, "Ignoring CIS_PAYLOAD_LAYOUT"),
            }
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if !self.epsilon.is_finite() || self.epsilon < 0.0 {
            return Err("epsilon must be a finite, non-negative number".to_string());
        }
        if self.epsilon >= 0.5 {
            return Err("epsilon must be < 0.5 to distinguish neighbouring cells".to_string());
        }
        Ok(())
    }
}
