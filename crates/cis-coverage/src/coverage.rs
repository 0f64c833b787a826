//! The coverage aggregate and its cross-part validation.

use std::collections::BTreeMap;

use tracing::debug;

use crate::axis::AxisValue;
use crate::config::CoverageConfig;
use crate::domain_set::DomainSet;
use crate::envelope::Envelope;
use crate::error::{CoverageError, CoverageResult, Violations};
use crate::layout::PayloadLayout;
use crate::range_set::{RangeLoader, RangeReference, RangeSet};
use crate::range_type::RangeType;

/// Range values as they appear in a document, before they are bound to a
/// domain and range type.
#[derive(Debug, Clone, PartialEq)]
pub enum RangePayload {
    Values(Vec<Option<f64>>),
    Placeholder(Vec<String>),
    Reference(RangeReference),
}

impl RangePayload {
    fn from_range_set(range_set: &RangeSet) -> Self {
        match range_set {
            RangeSet::Inline(inline) => RangePayload::Values(inline.values().to_vec()),
            RangeSet::Placeholder(entries) => RangePayload::Placeholder(entries.clone()),
            RangeSet::Reference(reference) => RangePayload::Reference(reference.clone()),
        }
    }
}

/// Unvalidated pieces of a coverage, as decoded or as rebuilt by a caller.
#[derive(Debug, Clone, PartialEq)]
pub struct CoverageParts {
    pub id: String,
    pub envelope: Envelope,
    pub domain_set: DomainSet,
    pub range_type: RangeType,
    pub range_set: RangePayload,
    pub metadata: BTreeMap<String, String>,
}

/// A validated regular-grid coverage. Immutable once assembled.
#[derive(Debug, Clone, PartialEq)]
pub struct Coverage {
    id: String,
    domain_set: DomainSet,
    range_type: RangeType,
    range_set: RangeSet,
    metadata: BTreeMap<String, String>,
    config: CoverageConfig,
}

impl Coverage {
    /// Assemble with the default configuration.
    pub fn assemble(parts: CoverageParts) -> Result<Self, Violations> {
        Self::assemble_with(parts, &CoverageConfig::default())
    }

    /// Validate the parts against each other and build the coverage.
    ///
    /// Checks, in order: envelope against the domain-set axes, grid limits
    /// against the axes, then the inline payload length against
    /// domain × range type. Every violation found is returned, not only the
    /// first.
    pub fn assemble_with(parts: CoverageParts, config: &CoverageConfig) -> Result<Self, Violations> {
        let epsilon = config.epsilon;
        let mut violations = Vec::new();

        if let Err(e) =
            parts
                .envelope
                .check_same_as(parts.domain_set.srs_name(), parts.domain_set.axes(), epsilon)
        {
            violations.push(e);
        }

        let mut grid_ok = true;
        for axis in parts.domain_set.axes() {
            if let Err(e) = axis.cell_count_within(epsilon) {
                violations.push(e);
                grid_ok = false;
            }
        }

        if grid_ok {
            if let Err(e) = parts
                .domain_set
                .index_space()
                .validate_against(parts.domain_set.axes(), epsilon)
            {
                violations.push(e);
            }
        }

        let range_set = match parts.range_set {
            RangePayload::Placeholder(entries) => Some(RangeSet::Placeholder(entries)),
            RangePayload::Reference(reference) => Some(RangeSet::Reference(reference)),
            RangePayload::Values(_) if !grid_ok => None,
            RangePayload::Values(values) => match config.layout {
                Some(layout) => match RangeSet::decode_inline(
                    values,
                    &parts.domain_set,
                    &parts.range_type,
                    layout,
                    epsilon,
                ) {
                    Ok(range_set) => Some(range_set),
                    Err(e) => {
                        violations.push(e);
                        None
                    }
                },
                None => {
                    violations.push(CoverageError::UndeclaredLayout);
                    if let Err(e) = RangeSet::check_cardinality(
                        values.len(),
                        &parts.domain_set,
                        &parts.range_type,
                        epsilon,
                    ) {
                        violations.push(e);
                    }
                    None
                }
            },
        };

        match range_set {
            Some(range_set) if violations.is_empty() => {
                debug!(id = %parts.id, "Assembled coverage");
                Ok(Self {
                    id: parts.id,
                    domain_set: parts.domain_set,
                    range_type: parts.range_type,
                    range_set,
                    metadata: parts.metadata,
                    config: *config,
                })
            }
            _ => {
                debug!(id = %parts.id, violations = violations.len(), "Coverage rejected");
                Err(Violations(violations))
            }
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Derived envelope view of the domain set.
    pub fn envelope(&self) -> Envelope {
        self.domain_set.real_space()
    }

    pub fn domain_set(&self) -> &DomainSet {
        &self.domain_set
    }

    pub fn range_type(&self) -> &RangeType {
        &self.range_type
    }

    pub fn range_set(&self) -> &RangeSet {
        &self.range_set
    }

    pub fn metadata(&self) -> &BTreeMap<String, String> {
        &self.metadata
    }

    pub fn config(&self) -> &CoverageConfig {
        &self.config
    }

    /// Grid shape, one cell count per axis.
    pub fn shape(&self) -> Vec<usize> {
        // cell counts were checked on assembly
        self.domain_set
            .shape(self.config.epsilon)
            .unwrap_or_default()
    }

    /// Value of `field` at grid position `index`.
    pub fn value_at(&self, field: &str, index: &[usize]) -> CoverageResult<Option<f64>> {
        self.range_type.field_index(field)?;
        self.range_set.value_at(field, index)
    }

    /// Grid position of the sample nearest to a real-world coordinate tuple.
    pub fn locate(&self, coords: &[AxisValue]) -> CoverageResult<Vec<usize>> {
        let axes = self.domain_set.axes();
        if coords.len() != axes.len() {
            return Err(CoverageError::IndexOutOfRange {
                dimension: format!("{}-dimensional coordinate", axes.len()),
                index: coords.len(),
                size: axes.len(),
            });
        }

        axes.iter()
            .zip(coords)
            .map(|(axis, value)| {
                let cells = axis.cell_count_within(self.config.epsilon)?;
                let position = axis.value_to_index_within(value, self.config.epsilon)?;
                // the upper bound belongs to the last cell
                Ok((position.round().max(0.0) as usize).min(cells.saturating_sub(1)))
            })
            .collect()
    }

    /// Value of `field` at the sample nearest to a real-world coordinate tuple.
    pub fn value_at_point(&self, field: &str, coords: &[AxisValue]) -> CoverageResult<Option<f64>> {
        let index = self.locate(coords)?;
        self.value_at(field, &index)
    }

    /// Split back into parts so a caller can build a modified copy.
    pub fn into_parts(self) -> CoverageParts {
        CoverageParts {
            envelope: self.domain_set.real_space(),
            range_set: RangePayload::from_range_set(&self.range_set),
            id: self.id,
            domain_set: self.domain_set,
            range_type: self.range_type,
            metadata: self.metadata,
        }
    }

    /// Payload layout this coverage was assembled with.
    pub fn layout(&self) -> Option<PayloadLayout> {
        self.config.layout
    }

    /// Copy of this coverage with a referenced range set fetched and inlined.
    pub fn resolve_range(&self, loader: &dyn RangeLoader) -> CoverageResult<Coverage> {
        if !matches!(self.range_set, RangeSet::Reference(_)) {
            return Ok(self.clone());
        }
        let layout = self.config.layout.ok_or(CoverageError::UndeclaredLayout)?;
        let range_set = self.range_set.resolve(
            loader,
            &self.domain_set,
            &self.range_type,
            layout,
            self.config.epsilon,
        )?;
        Ok(Coverage {
            range_set,
            ..self.clone()
        })
    }
}
