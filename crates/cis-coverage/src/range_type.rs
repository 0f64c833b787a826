//! Field schema of the sampled values.

use crate::error::{CoverageError, CoverageResult};

const OGC_DATATYPE_PREFIX: &str = "http://www.opengis.net/def/dataType/OGC/0/";
const UTC_DATATYPE: &str = "http://www.opengis.net/def/bipm/UTC";

/// Storage type of a field, identified on the wire by an OGC data-type URI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    Float32,
    Float64,
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    /// Instants on the UTC time scale.
    DateTime,
}

impl DataType {
    /// Parse a data-type URI. Unknown URIs yield `None`.
    pub fn from_uri(uri: &str) -> Option<Self> {
        if uri == UTC_DATATYPE {
            return Some(DataType::DateTime);
        }
        let name = uri.strip_prefix(OGC_DATATYPE_PREFIX)?;
        match name {
            "float32" => Some(DataType::Float32),
            "float64" | "double" => Some(DataType::Float64),
            "signedByte" => Some(DataType::Int8),
            "signedShort" => Some(DataType::Int16),
            "signedInt" => Some(DataType::Int32),
            "signedLong" => Some(DataType::Int64),
            "unsignedByte" => Some(DataType::UInt8),
            "unsignedShort" => Some(DataType::UInt16),
            "unsignedInt" => Some(DataType::UInt32),
            "unsignedLong" => Some(DataType::UInt64),
            _ => None,
        }
    }

    pub fn uri(&self) -> String {
        let name = match self {
            DataType::Float32 => "float32",
            DataType::Float64 => "float64",
            DataType::Int8 => "signedByte",
            DataType::Int16 => "signedShort",
            DataType::Int32 => "signedInt",
            DataType::Int64 => "signedLong",
            DataType::UInt8 => "unsignedByte",
            DataType::UInt16 => "unsignedShort",
            DataType::UInt32 => "unsignedInt",
            DataType::UInt64 => "unsignedLong",
            DataType::DateTime => return UTC_DATATYPE.to_string(),
        };
        format!("{}{}", OGC_DATATYPE_PREFIX, name)
    }
}

/// One sampled field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub name: String,
    pub description: String,
    pub data_type: DataType,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, description: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            data_type,
        }
    }
}

/// Ordered, uniquely named set of fields.
///
/// The order fixes the position of each field along the field dimension of
/// a flattened payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeType {
    fields: Vec<FieldDescriptor>,
}

impl RangeType {
    pub fn new(fields: Vec<FieldDescriptor>) -> CoverageResult<Self> {
        for (i, field) in fields.iter().enumerate() {
            if fields[..i].iter().any(|f| f.name == field.name) {
                return Err(CoverageError::DuplicateFieldName(field.name.clone()));
            }
        }
        Ok(Self { fields })
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn field_names(&self) -> Vec<String> {
        self.fields.iter().map(|f| f.name.clone()).collect()
    }

    pub fn field_index(&self, name: &str) -> CoverageResult<usize> {
        self.fields
            .iter()
            .position(|f| f.name == name)
            .ok_or_else(|| CoverageError::UnknownField(name.to_string()))
    }

    pub fn field(&self, name: &str) -> CoverageResult<&FieldDescriptor> {
        Ok(&self.fields[self.field_index(name)?])
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
