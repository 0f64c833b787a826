//! The geometric domain of a coverage: a general grid of regular axes.

use crate::axis::RegularAxis;
use crate::envelope::Envelope;
use crate::error::{CoverageError, CoverageResult};
use crate::grid_limits::GridLimits;
use crate::layout::payload_len;

/// Axis list, grid limits and CRS of a regular general grid.
///
/// The axis list is the single source of truth for the real-world
/// extent; [`DomainSet::real_space`] derives the envelope view from it.
#[derive(Debug, Clone, PartialEq)]
pub struct DomainSet {
    srs_name: String,
    axes: Vec<RegularAxis>,
    grid_limits: GridLimits,
}

impl DomainSet {
    /// Build a domain set.
    ///
    /// `axis_labels` is the declared label order; it must equal the order
    /// of `axes` and of the grid limits, otherwise `AxisOrderMismatch`.
    /// Cell counts are not checked here, see [`GridLimits::validate_against`].
    pub fn build(
        srs_name: impl Into<String>,
        axis_labels: &[String],
        axes: Vec<RegularAxis>,
        grid_limits: GridLimits,
    ) -> CoverageResult<Self> {
        let axis_order: Vec<String> = axes.iter().map(|a| a.label().to_string()).collect();

        if axis_labels != axis_order.as_slice() {
            return Err(CoverageError::AxisOrderMismatch {
                context: "generalGrid.axisLabels".to_string(),
                expected: axis_order,
                actual: axis_labels.to_vec(),
            });
        }

        let limit_order = grid_limits.labels();
        if limit_order != axis_order {
            return Err(CoverageError::AxisOrderMismatch {
                context: "gridLimits.axis".to_string(),
                expected: axis_order,
                actual: limit_order,
            });
        }

        let mut seen = std::collections::HashSet::new();
        if let Some(dup) = axis_order.iter().find(|l| !seen.insert(l.as_str())) {
            return Err(CoverageError::invalid_axis(dup, "label used by more than one axis"));
        }

        Ok(Self {
            srs_name: srs_name.into(),
            axes,
            grid_limits,
        })
    }

    /// Build a domain set whose grid limits are derived from the axes.
    pub fn from_axes(
        srs_name: impl Into<String>,
        axes: Vec<RegularAxis>,
        epsilon: f64,
    ) -> CoverageResult<Self> {
        let grid_limits = GridLimits::from_axes(&axes, epsilon)?;
        let labels: Vec<String> = axes.iter().map(|a| a.label().to_string()).collect();
        Self::build(srs_name, &labels, axes, grid_limits)
    }

    pub fn srs_name(&self) -> &str {
        &self.srs_name
    }

    pub fn axes(&self) -> &[RegularAxis] {
        &self.axes
    }

    pub fn axis_labels(&self) -> Vec<String> {
        self.axes.iter().map(|a| a.label().to_string()).collect()
    }

    pub fn axis(&self, label: &str) -> Option<&RegularAxis> {
        self.axes.iter().find(|a| a.label() == label)
    }

    /// Index-space bounding box.
    pub fn index_space(&self) -> &GridLimits {
        &self.grid_limits
    }

    /// Real-space bounding box, derived from the axis list on every call.
    pub fn real_space(&self) -> Envelope {
        Envelope::from_axes(self.srs_name.clone(), self.axes.clone())
    }

    /// Cell count of every axis, in axis order.
    pub fn shape(&self, epsilon: f64) -> CoverageResult<Vec<usize>> {
        self.axes.iter().map(|a| a.cell_count_within(epsilon)).collect()
    }

    /// Total number of grid cells, saturating at `usize::MAX`.
    pub fn total_cells(&self, epsilon: f64) -> CoverageResult<usize> {
        Ok(payload_len(&self.shape(epsilon)?, 1))
    }
}
