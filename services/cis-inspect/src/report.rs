//! Human- and machine-readable coverage summaries.

use std::collections::BTreeMap;
use std::fmt;

use cis_coverage::{payload_len, Coverage, RangeSet};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct AxisSummary {
    pub label: String,
    pub lower_bound: String,
    pub upper_bound: String,
    pub resolution: f64,
    pub uom_label: String,
    pub cells: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct FieldSummary {
    pub name: String,
    pub description: String,
    pub data_type: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PayloadSummary {
    Inline { values: usize, missing: usize, layout: String },
    Placeholder { entries: Vec<String> },
    Reference { href: String, media_type: Option<String> },
}

/// Overview of a validated coverage.
#[derive(Debug, Clone, Serialize)]
pub struct CoverageSummary {
    pub id: String,
    pub srs_name: String,
    pub shape: Vec<usize>,
    pub total_cells: usize,
    pub axes: Vec<AxisSummary>,
    pub fields: Vec<FieldSummary>,
    pub payload: PayloadSummary,
    pub metadata: BTreeMap<String, String>,
}

impl CoverageSummary {
    pub fn from_coverage(coverage: &Coverage) -> Self {
        let shape = coverage.shape();
        let axes = coverage
            .domain_set()
            .axes()
            .iter()
            .zip(&shape)
            .map(|(axis, &cells)| AxisSummary {
                label: axis.label().to_string(),
                lower_bound: axis.lower_bound().to_string(),
                upper_bound: axis.upper_bound().to_string(),
                resolution: axis.resolution(),
                uom_label: axis.uom_label().to_string(),
                cells,
            })
            .collect();

        let fields = coverage
            .range_type()
            .fields()
            .iter()
            .map(|f| FieldSummary {
                name: f.name.clone(),
                description: f.description.clone(),
                data_type: f.data_type.uri(),
            })
            .collect();

        let payload = match coverage.range_set() {
            RangeSet::Inline(inline) => PayloadSummary::Inline {
                values: inline.values().len(),
                missing: inline.values().iter().filter(|v| v.is_none()).count(),
                layout: inline.grid().layout().to_string(),
            },
            RangeSet::Placeholder(entries) => PayloadSummary::Placeholder {
                entries: entries.clone(),
            },
            RangeSet::Reference(reference) => PayloadSummary::Reference {
                href: reference.href.clone(),
                media_type: reference.media_type.clone(),
            },
        };

        Self {
            id: coverage.id().to_string(),
            srs_name: coverage.domain_set().srs_name().to_string(),
            total_cells: payload_len(&shape, 1),
            shape,
            axes,
            fields,
            payload,
            metadata: coverage.metadata().clone(),
        }
    }
}

impl fmt::Display for CoverageSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Coverage: {}", self.id)?;
        writeln!(f, "CRS:      {}", self.srs_name)?;
        writeln!(f, "Shape:    {:?} ({} cells)", self.shape, self.total_cells)?;

        writeln!(f, "Axes:")?;
        for axis in &self.axes {
            writeln!(
                f,
                "  {:<8} {} .. {} step {} {} ({} cells)",
                axis.label,
                axis.lower_bound,
                axis.upper_bound,
                axis.resolution,
                axis.uom_label,
                axis.cells
            )?;
        }

        writeln!(f, "Fields:")?;
        for field in &self.fields {
            writeln!(f, "  {:<16} {}  {}", field.name, field.data_type, field.description)?;
        }

        match &self.payload {
            PayloadSummary::Inline {
                values,
                missing,
                layout,
            } => writeln!(f, "Payload:  inline, {} values ({} missing), {}", values, missing, layout)?,
            PayloadSummary::Placeholder { entries } => {
                writeln!(f, "Payload:  placeholder {:?}", entries)?
            }
            PayloadSummary::Reference { href, media_type } => writeln!(
                f,
                "Payload:  reference {} ({})",
                href,
                media_type.as_deref().unwrap_or(cis_coverage::media_types::JSON)
            )?,
        }

        if !self.metadata.is_empty() {
            writeln!(f, "Metadata:")?;
            for (key, value) in &self.metadata {
                writeln!(f, "  {} = {}", key, value)?;
            }
        }
        Ok(())
    }
}
