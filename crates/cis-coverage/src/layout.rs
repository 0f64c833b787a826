//! Flattening convention of inline range payloads.
//!
//! A CIS-JSON data block is a flat list of values. The document does not
//! say how the grid axes and the field dimension were flattened into it,
//! so the caller declares a [`PayloadLayout`] explicitly.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CoverageError, CoverageResult};

/// Position of the field dimension relative to the grid axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FieldPlacement {
    /// All values of field 0 first, then field 1, ...
    Slowest,
    /// The fields of one cell are adjacent.
    Fastest,
}

/// Iteration order of the grid axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AxisOrder {
    /// Last axis varies fastest.
    RowMajor,
    /// First axis varies fastest.
    ColumnMajor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PayloadLayout {
    pub fields: FieldPlacement,
    pub order: AxisOrder,
}

impl PayloadLayout {
    pub fn new(fields: FieldPlacement, order: AxisOrder) -> Self {
        Self { fields, order }
    }
}

impl FromStr for PayloadLayout {
    type Err = String;

    /// Parse `"<field placement>,<axis order>"`, e.g. `field-fastest,row-major`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut fields = None;
        let mut order = None;
        for part in s.split(',').map(|p| p.trim().to_ascii_lowercase()) {
            match part.as_str() {
                "field-slowest" | "fields-slowest" => fields = Some(FieldPlacement::Slowest),
                "field-fastest" | "fields-fastest" => fields = Some(FieldPlacement::Fastest),
                "row-major" | "c" => order = Some(AxisOrder::RowMajor),
                "column-major" | "f" => order = Some(AxisOrder::ColumnMajor),
                other => return Err(format!("unknown payload layout token '{}'", other)),
            }
        }
        match (fields, order) {
            (Some(fields), Some(order)) => Ok(Self { fields, order }),
            _ => Err(format!(
                "payload layout '{}' must name a field placement and an axis order",
                s
            )),
        }
    }
}

impl fmt::Display for PayloadLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields = match self.fields {
            FieldPlacement::Slowest => "field-slowest",
            FieldPlacement::Fastest => "field-fastest",
        };
        let order = match self.order {
            AxisOrder::RowMajor => "row-major",
            AxisOrder::ColumnMajor => "column-major",
        };
        write!(f, "{},{}", fields, order)
    }
}

/// Strides of a flattened `(axes..., fields)` payload under a given layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadGrid {
    axis_labels: Vec<String>,
    shape: Vec<usize>,
    field_names: Vec<String>,
    layout: PayloadLayout,
    axis_strides: Vec<usize>,
    field_stride: usize,
}

/// Number of values `fields` fields need over a grid of `shape`,
/// saturating at `usize::MAX`.
pub fn payload_len(shape: &[usize], fields: usize) -> usize {
    shape.iter().fold(fields, |acc, &n| acc.saturating_mul(n))
}

impl PayloadGrid {
    pub fn new(
        axis_labels: Vec<String>,
        shape: Vec<usize>,
        field_names: Vec<String>,
        layout: PayloadLayout,
    ) -> Self {
        let ndim = shape.len();
        let mut axis_strides = vec![1usize; ndim];
        match layout.order {
            AxisOrder::RowMajor => {
                for k in (0..ndim.saturating_sub(1)).rev() {
                    axis_strides[k] = axis_strides[k + 1].saturating_mul(shape[k + 1]);
                }
            }
            AxisOrder::ColumnMajor => {
                for k in 1..ndim {
                    axis_strides[k] = axis_strides[k - 1].saturating_mul(shape[k - 1]);
                }
            }
        }

        let total_cells = payload_len(&shape, 1);
        let field_stride = match layout.fields {
            FieldPlacement::Fastest => {
                for stride in &mut axis_strides {
                    *stride = stride.saturating_mul(field_names.len());
                }
                1
            }
            FieldPlacement::Slowest => total_cells,
        };

        Self {
            axis_labels,
            shape,
            field_names,
            layout,
            axis_strides,
            field_stride,
        }
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn field_names(&self) -> &[String] {
        &self.field_names
    }

    pub fn layout(&self) -> PayloadLayout {
        self.layout
    }

    /// Number of values a payload of this grid must hold.
    pub fn expected_len(&self) -> usize {
        payload_len(&self.shape, self.field_names.len())
    }

    /// Flat offset of `field` at grid position `index`.
    pub fn offset(&self, field: &str, index: &[usize]) -> CoverageResult<usize> {
        let field_index = self
            .field_names
            .iter()
            .position(|f| f == field)
            .ok_or_else(|| CoverageError::UnknownField(field.to_string()))?;

        if index.len() != self.shape.len() {
            return Err(CoverageError::IndexOutOfRange {
                dimension: format!("{}-dimensional grid index", self.shape.len()),
                index: index.len(),
                size: self.shape.len(),
            });
        }

        let mut offset = field_index * self.field_stride;
        for (k, &i) in index.iter().enumerate() {
            if i >= self.shape[k] {
                return Err(CoverageError::IndexOutOfRange {
                    dimension: self.axis_labels[k].clone(),
                    index: i,
                    size: self.shape[k],
                });
            }
            offset += i * self.axis_strides[k];
        }
        Ok(offset)
    }
}
