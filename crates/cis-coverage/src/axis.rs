//! Regular axes and the grid-index <-> real-value mapping.
//!
//! An axis is described by its first and last coordinate, a resolution and
//! a unit label. The number of cells is `|upper - lower| / |resolution|`.
//! The stepping direction comes from the sign of `upper - lower`; the sign
//! of the declared resolution is ignored, so a latitude axis running north
//! to south with a positive resolution still decreases.

use chrono::{DateTime, Duration, Utc};

use crate::error::{CoverageError, CoverageResult};
use crate::time::{format_instant, TimeUnit};

/// Default relative tolerance for cell-count and domain checks.
pub const DEFAULT_EPSILON: f64 = 1e-6;

/// A coordinate on an axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AxisValue {
    /// Plain number (latitude, longitude, band index, ...).
    Number(f64),
    /// Instant on a temporal axis.
    Instant(DateTime<Utc>),
}

impl AxisValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            AxisValue::Number(v) => Some(*v),
            AxisValue::Instant(_) => None,
        }
    }

    pub fn as_instant(&self) -> Option<DateTime<Utc>> {
        match self {
            AxisValue::Number(_) => None,
            AxisValue::Instant(dt) => Some(*dt),
        }
    }

    fn kind_name(&self) -> &'static str {
        match self {
            AxisValue::Number(_) => "numeric",
            AxisValue::Instant(_) => "temporal",
        }
    }
}

impl std::fmt::Display for AxisValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AxisValue::Number(v) => write!(f, "{}", v),
            AxisValue::Instant(dt) => write!(f, "{}", format_instant(dt)),
        }
    }
}

/// Value kind of an axis, with the bounds typed accordingly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AxisKind {
    Numeric {
        lower: f64,
        upper: f64,
    },
    Temporal {
        lower: DateTime<Utc>,
        upper: DateTime<Utc>,
        unit: TimeUnit,
    },
}

/// One regular (constant step) axis of a general grid.
#[derive(Debug, Clone, PartialEq)]
pub struct RegularAxis {
    label: String,
    kind: AxisKind,
    resolution: f64,
    uom_label: String,
}

impl RegularAxis {
    /// Build an axis from its serialized parts.
    ///
    /// Fails with `InvalidAxis` when the resolution is zero or not finite,
    /// when the bounds are of different kinds, when a numeric bound is not
    /// finite, or when temporal bounds come with a non-temporal unit.
    pub fn from_spec(
        label: impl Into<String>,
        lower: AxisValue,
        upper: AxisValue,
        resolution: f64,
        uom_label: impl Into<String>,
    ) -> CoverageResult<Self> {
        let label = label.into();
        let uom_label = uom_label.into();

        if !resolution.is_finite() || resolution == 0.0 {
            return Err(CoverageError::invalid_axis(
                &label,
                format!("resolution must be finite and non-zero, got {}", resolution),
            ));
        }

        let kind = match (lower, upper) {
            (AxisValue::Number(lower), AxisValue::Number(upper)) => {
                if !lower.is_finite() || !upper.is_finite() {
                    return Err(CoverageError::invalid_axis(&label, "bounds must be finite"));
                }
                AxisKind::Numeric { lower, upper }
            }
            (AxisValue::Instant(lower), AxisValue::Instant(upper)) => {
                let unit = TimeUnit::from_uom(&uom_label).ok_or_else(|| {
                    CoverageError::invalid_axis(
                        &label,
                        format!("temporal bounds need a time unit, got '{}'", uom_label),
                    )
                })?;
                if (upper - lower).num_nanoseconds().is_none() {
                    return Err(CoverageError::invalid_axis(
                        &label,
                        "temporal extent exceeds nanosecond range",
                    ));
                }
                AxisKind::Temporal { lower, upper, unit }
            }
            (lower, upper) => {
                return Err(CoverageError::invalid_axis(
                    &label,
                    format!(
                        "bounds mix {} and {} values",
                        lower.kind_name(),
                        upper.kind_name()
                    ),
                ))
            }
        };

        Ok(Self {
            label,
            kind,
            resolution,
            uom_label,
        })
    }

    /// Convenience constructor for numeric axes.
    pub fn numeric(
        label: impl Into<String>,
        lower: f64,
        upper: f64,
        resolution: f64,
        uom_label: impl Into<String>,
    ) -> CoverageResult<Self> {
        Self::from_spec(
            label,
            AxisValue::Number(lower),
            AxisValue::Number(upper),
            resolution,
            uom_label,
        )
    }

    /// Convenience constructor for temporal axes.
    pub fn temporal(
        label: impl Into<String>,
        lower: DateTime<Utc>,
        upper: DateTime<Utc>,
        resolution: f64,
        uom_label: impl Into<String>,
    ) -> CoverageResult<Self> {
        Self::from_spec(
            label,
            AxisValue::Instant(lower),
            AxisValue::Instant(upper),
            resolution,
            uom_label,
        )
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn kind(&self) -> &AxisKind {
        &self.kind
    }

    pub fn resolution(&self) -> f64 {
        self.resolution
    }

    pub fn uom_label(&self) -> &str {
        &self.uom_label
    }

    pub fn is_temporal(&self) -> bool {
        matches!(self.kind, AxisKind::Temporal { .. })
    }

    pub fn lower_bound(&self) -> AxisValue {
        match self.kind {
            AxisKind::Numeric { lower, .. } => AxisValue::Number(lower),
            AxisKind::Temporal { lower, .. } => AxisValue::Instant(lower),
        }
    }

    pub fn upper_bound(&self) -> AxisValue {
        match self.kind {
            AxisKind::Numeric { upper, .. } => AxisValue::Number(upper),
            AxisKind::Temporal { upper, .. } => AxisValue::Instant(upper),
        }
    }

    /// Signed extent `upper - lower` in the axis arithmetic (nanoseconds for time).
    fn span(&self) -> f64 {
        match self.kind {
            AxisKind::Numeric { lower, upper } => upper - lower,
            AxisKind::Temporal { lower, upper, .. } => {
                // checked in from_spec
                (upper - lower).num_nanoseconds().unwrap_or(i64::MAX) as f64
            }
        }
    }

    /// Signed step between consecutive cells, in the same arithmetic as `span`.
    fn step(&self) -> f64 {
        let magnitude = match self.kind {
            AxisKind::Numeric { .. } => self.resolution.abs(),
            AxisKind::Temporal { unit, .. } => self.resolution.abs() * unit.nanos() as f64,
        };
        if self.span() < 0.0 {
            -magnitude
        } else {
            magnitude
        }
    }

    fn tolerance(cells: usize, epsilon: f64) -> f64 {
        epsilon * (cells.max(1) as f64)
    }

    /// Number of grid cells along the axis, using [`DEFAULT_EPSILON`].
    pub fn cell_count(&self) -> CoverageResult<usize> {
        self.cell_count_within(DEFAULT_EPSILON)
    }

    /// Number of grid cells along the axis.
    ///
    /// Fails with `NonIntegerCellCount` when `|span| / |step|` is further
    /// than `epsilon` (relative) from an integer.
    pub fn cell_count_within(&self, epsilon: f64) -> CoverageResult<usize> {
        let count = self.span().abs() / self.step().abs();
        let rounded = count.round();
        if !count.is_finite() || (count - rounded).abs() > Self::tolerance(rounded as usize, epsilon)
        {
            return Err(CoverageError::NonIntegerCellCount {
                label: self.label.clone(),
                count,
            });
        }
        Ok(rounded as usize)
    }

    /// Real-world coordinate of grid index `index`, using [`DEFAULT_EPSILON`].
    pub fn index_to_value(&self, index: usize) -> CoverageResult<AxisValue> {
        self.index_to_value_within(index, DEFAULT_EPSILON)
    }

    /// Real-world coordinate of grid index `index`.
    ///
    /// Valid indices run from `0` to `cell_count()` inclusive; the last one
    /// maps onto the upper bound.
    pub fn index_to_value_within(&self, index: usize, epsilon: f64) -> CoverageResult<AxisValue> {
        let cells = self.cell_count_within(epsilon)?;
        if index > cells {
            return Err(CoverageError::OutOfDomain {
                label: self.label.clone(),
                position: index as f64,
                cells,
            });
        }

        let offset = index as f64 * self.step();
        Ok(match self.kind {
            AxisKind::Numeric { lower, .. } => AxisValue::Number(lower + offset),
            AxisKind::Temporal { lower, .. } => {
                AxisValue::Instant(lower + Duration::nanoseconds(offset.round() as i64))
            }
        })
    }

    /// Fractional grid position of `value`, using [`DEFAULT_EPSILON`].
    pub fn value_to_index(&self, value: &AxisValue) -> CoverageResult<f64> {
        self.value_to_index_within(value, DEFAULT_EPSILON)
    }

    /// Fractional grid position of `value`, the inverse of `index_to_value`.
    ///
    /// Fails with `OutOfDomain` when the position lies outside
    /// `[0, cell_count()]` by more than the tolerance, and with
    /// `InvalidAxis` when the value kind does not match the axis.
    pub fn value_to_index_within(&self, value: &AxisValue, epsilon: f64) -> CoverageResult<f64> {
        let cells = self.cell_count_within(epsilon)?;
        let offset = match (&self.kind, value) {
            (AxisKind::Numeric { lower, .. }, AxisValue::Number(v)) => v - lower,
            (AxisKind::Temporal { lower, .. }, AxisValue::Instant(t)) => (*t - *lower)
                .num_nanoseconds()
                .map(|ns| ns as f64)
                .ok_or_else(|| {
                    CoverageError::invalid_axis(&self.label, "instant too far from axis origin")
                })?,
            (_, other) => {
                return Err(CoverageError::invalid_axis(
                    &self.label,
                    format!("cannot locate a {} value on this axis", other.kind_name()),
                ))
            }
        };

        let position = offset / self.step();
        let tolerance = Self::tolerance(cells, epsilon);
        if !position.is_finite() || position < -tolerance || position > cells as f64 + tolerance {
            return Err(CoverageError::OutOfDomain {
                label: self.label.clone(),
                position,
                cells,
            });
        }
        Ok(position)
    }

    /// Whether two axes describe the same axis within `epsilon` (relative).
    ///
    /// Returns a description of the first difference found.
    pub fn difference(&self, other: &RegularAxis, epsilon: f64) -> Option<String> {
        if self.label != other.label {
            return Some(format!("label '{}' vs '{}'", self.label, other.label));
        }
        if self.uom_label != other.uom_label {
            return Some(format!(
                "unit '{}' vs '{}'",
                self.uom_label, other.uom_label
            ));
        }
        if !approx_eq(self.resolution, other.resolution, epsilon) {
            return Some(format!(
                "resolution {} vs {}",
                self.resolution, other.resolution
            ));
        }
        let bounds = [
            ("lowerBound", self.lower_bound(), other.lower_bound()),
            ("upperBound", self.upper_bound(), other.upper_bound()),
        ];
        for (name, a, b) in bounds {
            let same = match (a, b) {
                (AxisValue::Number(a), AxisValue::Number(b)) => approx_eq(a, b, epsilon),
                (AxisValue::Instant(a), AxisValue::Instant(b)) => a == b,
                _ => false,
            };
            if !same {
                return Some(format!("{} {} vs {}", name, a, b));
            }
        }
        None
    }
}

fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
    (a - b).abs() <= epsilon * a.abs().max(b.abs()).max(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::parse_instant;

    fn lat() -> RegularAxis {
        RegularAxis::numeric("lat", 52.49875, 50.00125, 0.0024975, "degrees_north").unwrap()
    }

    #[test]
    fn test_zero_resolution_rejected() {
        let err = RegularAxis::numeric("x", 0.0, 1.0, 0.0, "m").unwrap_err();
        assert!(matches!(err, CoverageError::InvalidAxis { .. }));
    }

    #[test]
    fn test_mixed_bounds_rejected() {
        let t = parse_instant("2020-01-01").unwrap();
        let err = RegularAxis::from_spec(
            "time",
            AxisValue::Instant(t),
            AxisValue::Number(1.0),
            1.0,
            "d",
        )
        .unwrap_err();
        assert!(matches!(err, CoverageError::InvalidAxis { .. }));
    }

    #[test]
    fn test_temporal_bounds_need_time_unit() {
        let t0 = parse_instant("2020-01-01").unwrap();
        let t1 = parse_instant("2020-01-02").unwrap();
        let err = RegularAxis::temporal("time", t0, t1, 1.0, "degree").unwrap_err();
        assert!(matches!(err, CoverageError::InvalidAxis { ref label, .. } if label == "time"));
    }

    #[test]
    fn test_descending_axis_cell_count() {
        assert_eq!(lat().cell_count().unwrap(), 1000);
    }

    #[test]
    fn test_descending_axis_steps_down() {
        let axis = lat();
        let first = axis.index_to_value(1).unwrap().as_number().unwrap();
        assert!(first < 52.49875);
        let last = axis.index_to_value(1000).unwrap().as_number().unwrap();
        assert!((last - 50.00125).abs() < 1e-9);
    }

    #[test]
    fn test_negative_resolution_same_as_positive() {
        let a = RegularAxis::numeric("x", 0.0, 10.0, -0.5, "m").unwrap();
        assert_eq!(a.cell_count().unwrap(), 20);
        assert_eq!(a.index_to_value(2).unwrap(), AxisValue::Number(1.0));
    }

    #[test]
    fn test_non_integer_cell_count() {
        let axis = RegularAxis::numeric("x", 0.0, 1.0, 0.3, "m").unwrap();
        let err = axis.cell_count().unwrap_err();
        assert!(matches!(err, CoverageError::NonIntegerCellCount { .. }));
    }

    #[test]
    fn test_epsilon_is_configurable() {
        let axis = RegularAxis::numeric("x", 0.0, 1.0001, 0.5, "m").unwrap();
        assert!(axis.cell_count().is_err());
        assert_eq!(axis.cell_count_within(1e-3).unwrap(), 2);
    }

    #[test]
    fn test_value_to_index_out_of_domain() {
        let axis = lat();
        let err = axis.value_to_index(&AxisValue::Number(53.0)).unwrap_err();
        assert!(matches!(err, CoverageError::OutOfDomain { .. }));
        let err = axis.value_to_index(&AxisValue::Number(49.0)).unwrap_err();
        assert!(matches!(err, CoverageError::OutOfDomain { .. }));
    }

    #[test]
    fn test_value_to_index_kind_mismatch() {
        let t = parse_instant("2020-01-01").unwrap();
        let err = lat().value_to_index(&AxisValue::Instant(t)).unwrap_err();
        assert!(matches!(err, CoverageError::InvalidAxis { .. }));
    }

    #[test]
    fn test_index_past_upper_bound() {
        let err = lat().index_to_value(1001).unwrap_err();
        assert!(matches!(err, CoverageError::OutOfDomain { cells: 1000, .. }));
    }

    #[test]
    fn test_temporal_index_to_value() {
        let t0 = parse_instant("2017-01-16T10:09:21.834255872").unwrap();
        let t5 = parse_instant("2017-01-31T10:09:21.834255872").unwrap();
        let axis = RegularAxis::temporal("time", t0, t5, 3.0, "d").unwrap();
        assert_eq!(axis.cell_count().unwrap(), 5);
        let t1 = axis.index_to_value(1).unwrap().as_instant().unwrap();
        assert_eq!(t1, parse_instant("2017-01-19T10:09:21.834255872").unwrap());
        assert_eq!(axis.value_to_index(&AxisValue::Instant(t1)).unwrap(), 1.0);
    }

    #[test]
    fn test_difference_reports_first_mismatch() {
        let a = lat();
        let b = RegularAxis::numeric("lat", 52.49875, 50.0, 0.0024975, "degrees_north").unwrap();
        assert!(a.difference(&a.clone(), DEFAULT_EPSILON).is_none());
        let diff = a.difference(&b, DEFAULT_EPSILON).unwrap();
        assert!(diff.contains("upperBound"));
    }
}
