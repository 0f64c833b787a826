//! Value queries given on the command line.
//!
//! - `FIELD:i,j,...` looks up a grid index.
//! - `FIELD@c1,c2,...` looks up the sample nearest to a coordinate tuple;
//!   temporal axes take ISO-8601 instants, others plain numbers.

use std::fmt;
use std::str::FromStr;

use anyhow::{anyhow, bail, Context, Result};
use cis_coverage::{parse_instant, AxisValue, Coverage};

#[derive(Debug, Clone, PartialEq)]
pub enum ValueQuery {
    Index { field: String, index: Vec<usize> },
    Point { field: String, coords: Vec<String> },
}

impl FromStr for ValueQuery {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        // instants contain ':', so split on whichever separator comes first
        let split = s.find(|c: char| c == ':' || c == '@');
        let (field, sep, rest) = match split {
            Some(pos) => (&s[..pos], &s[pos..pos + 1], &s[pos + 1..]),
            None => bail!("query '{}' must look like FIELD:i,j,.. or FIELD@c1,c2,..", s),
        };
        let field = non_empty_field(field, s)?;

        if sep == ":" {
            let index = split_list(rest)
                .map(|p| {
                    p.parse::<usize>()
                        .with_context(|| format!("invalid grid index '{}' in '{}'", p, s))
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(ValueQuery::Index { field, index })
        } else {
            Ok(ValueQuery::Point {
                field,
                coords: split_list(rest).map(str::to_string).collect(),
            })
        }
    }
}

impl fmt::Display for ValueQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueQuery::Index { field, index } => write!(f, "{}{:?}", field, index),
            ValueQuery::Point { field, coords } => write!(f, "{}@({})", field, coords.join(", ")),
        }
    }
}

fn split_list(s: &str) -> impl Iterator<Item = &str> {
    s.split(',').map(str::trim).filter(|p| !p.is_empty())
}

fn non_empty_field(field: &str, query: &str) -> Result<String> {
    let field = field.trim();
    if field.is_empty() {
        bail!("query '{}' names no field", query);
    }
    Ok(field.to_string())
}

impl ValueQuery {
    /// Run the query against a coverage.
    pub fn evaluate(&self, coverage: &Coverage) -> Result<Option<f64>> {
        match self {
            ValueQuery::Index { field, index } => Ok(coverage.value_at(field, index)?),
            ValueQuery::Point { field, coords } => {
                let coords = parse_coords(coverage, coords)?;
                Ok(coverage.value_at_point(field, &coords)?)
            }
        }
    }
}

fn parse_coords(coverage: &Coverage, raw: &[String]) -> Result<Vec<AxisValue>> {
    let axes = coverage.domain_set().axes();
    if raw.len() != axes.len() {
        bail!(
            "expected {} coordinates ({}), got {}",
            axes.len(),
            coverage.domain_set().axis_labels().join(", "),
            raw.len()
        );
    }

    axes.iter()
        .zip(raw)
        .map(|(axis, text)| {
            if axis.is_temporal() {
                parse_instant(text)
                    .map(AxisValue::Instant)
                    .map_err(|e| anyhow!("axis '{}': {}", axis.label(), e))
            } else {
                text.parse::<f64>()
                    .map(AxisValue::Number)
                    .with_context(|| format!("axis '{}': invalid number '{}'", axis.label(), text))
            }
        })
        .collect()
}
