//! Integer index-space bounds of a general grid.

use crate::axis::RegularAxis;
use crate::error::{CoverageError, CoverageResult};

/// Index bounds for one axis. `upper_bound` is exclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexAxis {
    pub label: String,
    pub lower_bound: i64,
    pub upper_bound: i64,
}

impl IndexAxis {
    pub fn new(label: impl Into<String>, lower_bound: i64, upper_bound: i64) -> Self {
        Self {
            label: label.into(),
            lower_bound,
            upper_bound,
        }
    }

    /// Number of cells covered, `upper_bound - lower_bound`, or `None`
    /// when the difference does not fit in an `i64`.
    pub fn span(&self) -> Option<i64> {
        self.upper_bound.checked_sub(self.lower_bound)
    }
}

/// The index-space bounding box, one [`IndexAxis`] per grid axis in axis order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridLimits {
    pub srs_name: String,
    pub axes: Vec<IndexAxis>,
}

impl GridLimits {
    pub fn new(srs_name: impl Into<String>, axes: Vec<IndexAxis>) -> Self {
        Self {
            srs_name: srs_name.into(),
            axes,
        }
    }

    /// Derive limits starting at index 0 for every axis.
    pub fn from_axes(axes: &[RegularAxis], epsilon: f64) -> CoverageResult<Self> {
        let index_axes = axes
            .iter()
            .map(|axis| {
                Ok(IndexAxis::new(axis.label(), 0, index_cells(axis, epsilon)?))
            })
            .collect::<CoverageResult<Vec<_>>>()?;
        Ok(Self::new(index_srs_name(axes.len()), index_axes))
    }

    pub fn labels(&self) -> Vec<String> {
        self.axes.iter().map(|a| a.label.clone()).collect()
    }

    /// Check these limits against an ordered axis list.
    ///
    /// Fails with `AxisOrderMismatch` when the label sequences differ and
    /// with `InconsistentGridLimits` on the first axis whose index span
    /// differs from its cell count.
    pub fn validate_against(&self, axes: &[RegularAxis], epsilon: f64) -> CoverageResult<()> {
        let expected: Vec<String> = axes.iter().map(|a| a.label().to_string()).collect();
        let actual = self.labels();
        if expected != actual {
            return Err(CoverageError::AxisOrderMismatch {
                context: "gridLimits".to_string(),
                expected,
                actual,
            });
        }

        for (axis, limits) in axes.iter().zip(&self.axes) {
            let cells = index_cells(axis, epsilon)?;
            let span = limits.span().ok_or_else(|| {
                CoverageError::invalid_axis(
                    axis.label(),
                    format!(
                        "grid limits {}..{} overflow the index range",
                        limits.lower_bound, limits.upper_bound
                    ),
                )
            })?;
            if span != cells {
                return Err(CoverageError::InconsistentGridLimits {
                    label: axis.label().to_string(),
                    expected: cells,
                    actual: span,
                });
            }
        }
        Ok(())
    }
}

/// Cell count of `axis` as an index-space extent.
fn index_cells(axis: &RegularAxis, epsilon: f64) -> CoverageResult<i64> {
    let cells = axis.cell_count_within(epsilon)?;
    i64::try_from(cells).map_err(|_| {
        CoverageError::invalid_axis(
            axis.label(),
            format!("{} cells exceed the index range", cells),
        )
    })
}

/// OGC index CRS name for an `ndim`-dimensional grid.
pub fn index_srs_name(ndim: usize) -> String {
    format!("http://www.opengis.net/def/crs/OGC/0/Index{}D", ndim)
}
