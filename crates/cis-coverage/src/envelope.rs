//! Real-world bounding box of a coverage.
//!
//! The envelope repeats the axes of the general grid. A coverage never
//! stores it: it is checked against the domain set on assembly and
//! re-derived from the domain set on encode.

use crate::axis::RegularAxis;
use crate::error::{CoverageError, CoverageResult};

#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    pub srs_name: String,
    pub axis_labels: Vec<String>,
    pub axes: Vec<RegularAxis>,
}

impl Envelope {
    pub fn new(srs_name: impl Into<String>, axis_labels: Vec<String>, axes: Vec<RegularAxis>) -> Self {
        Self {
            srs_name: srs_name.into(),
            axis_labels,
            axes,
        }
    }

    /// Build an envelope whose labels follow the axis order.
    pub fn from_axes(srs_name: impl Into<String>, axes: Vec<RegularAxis>) -> Self {
        let axis_labels = axes.iter().map(|a| a.label().to_string()).collect();
        Self::new(srs_name, axis_labels, axes)
    }

    /// Find the first way in which this envelope differs from `other`.
    ///
    /// Label ordering problems are reported as `AxisOrderMismatch`, any other
    /// difference as `EnvelopeMismatch`.
    pub fn check_same_as(
        &self,
        srs_name: &str,
        axes: &[RegularAxis],
        epsilon: f64,
    ) -> CoverageResult<()> {
        let own_labels: Vec<String> = self.axes.iter().map(|a| a.label().to_string()).collect();
        if self.axis_labels != own_labels {
            return Err(CoverageError::AxisOrderMismatch {
                context: "envelope.axisLabels".to_string(),
                expected: own_labels,
                actual: self.axis_labels.clone(),
            });
        }

        let expected: Vec<String> = axes.iter().map(|a| a.label().to_string()).collect();
        if own_labels != expected {
            return Err(CoverageError::AxisOrderMismatch {
                context: "envelope.axis".to_string(),
                expected,
                actual: own_labels,
            });
        }

        if self.srs_name != srs_name {
            return Err(CoverageError::EnvelopeMismatch {
                label: "*".to_string(),
                reason: format!("srsName '{}' vs '{}'", self.srs_name, srs_name),
            });
        }

        for (own, theirs) in self.axes.iter().zip(axes) {
            if let Some(reason) = own.difference(theirs, epsilon) {
                return Err(CoverageError::EnvelopeMismatch {
                    label: own.label().to_string(),
                    reason,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SRS: &str = "http://www.opengis.net/def/crs/EPSG/0/4326";

    fn axes() -> Vec<RegularAxis> {
        vec![
            RegularAxis::numeric("lat", 52.49875, 50.00125, 0.0024975, "degrees_north").unwrap(),
            RegularAxis::numeric("lon", 0.00125, 4.99875, 0.00249875, "degrees_east").unwrap(),
        ]
    }

    #[test]
    fn test_identical_envelope_passes() {
        let env = Envelope::from_axes(SRS, axes());
        assert!(env.check_same_as(SRS, &axes(), 1e-6).is_ok());
    }

    #[test]
    fn test_swapped_axes_is_order_mismatch() {
        let mut swapped = axes();
        swapped.reverse();
        let env = Envelope::from_axes(SRS, swapped);
        let err = env.check_same_as(SRS, &axes(), 1e-6).unwrap_err();
        assert!(matches!(err, CoverageError::AxisOrderMismatch { .. }));
    }

    #[test]
    fn test_labels_disagree_with_axis_list() {
        let mut env = Envelope::from_axes(SRS, axes());
        env.axis_labels = vec!["lon".to_string(), "lat".to_string()];
        let err = env.check_same_as(SRS, &axes(), 1e-6).unwrap_err();
        assert!(matches!(err, CoverageError::AxisOrderMismatch { ref context, .. } if context == "envelope.axisLabels"));
    }

    #[test]
    fn test_diverging_bound_is_envelope_mismatch() {
        let mut diverged = axes();
        diverged[1] = RegularAxis::numeric("lon", 0.00125, 4.99875, 0.0025, "degrees_east").unwrap();
        let env = Envelope::from_axes(SRS, diverged);
        let err = env.check_same_as(SRS, &axes(), 1e-6).unwrap_err();
        assert!(matches!(err, CoverageError::EnvelopeMismatch { ref label, .. } if label == "lon"));
    }

    #[test]
    fn test_srs_difference() {
        let env = Envelope::from_axes("EPSG:3857", axes());
        let err = env.check_same_as(SRS, &axes(), 1e-6).unwrap_err();
        assert!(matches!(err, CoverageError::EnvelopeMismatch { .. }));
    }
}
