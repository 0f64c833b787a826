//! Common test fixtures for coverage tests.
//!
//! Documents are built as `serde_json::Value` so tests can break them in
//! targeted ways before handing them to the codec.

use serde_json::{json, Value};

/// Common CRS identifiers.
pub mod crs {
    /// WGS84 geographic
    pub const EPSG_4326: &str = "http://www.opengis.net/def/crs/EPSG/0/4326";

    /// Index CRS of a four-dimensional grid
    pub const INDEX_4D: &str = "http://www.opengis.net/def/crs/OGC/0/Index4D";

    /// Index CRS of a three-dimensional grid
    pub const INDEX_3D: &str = "http://www.opengis.net/def/crs/OGC/0/Index3D";
}

/// Common OGC data-type URIs.
pub mod data_types {
    pub const FLOAT32: &str = "http://www.opengis.net/def/dataType/OGC/0/float32";
    pub const FLOAT64: &str = "http://www.opengis.net/def/dataType/OGC/0/float64";
    pub const UNSIGNED_BYTE: &str = "http://www.opengis.net/def/dataType/OGC/0/unsignedByte";
    pub const SIGNED_INT: &str = "http://www.opengis.net/def/dataType/OGC/0/signedInt";
}

/// Ocean-colour demo cube: chlorophyll and suspended matter over the North Sea.
///
/// Axes are `lat` (descending), `bnds`, `lon` and `time`, giving a
/// 1000 x 2 x 2000 x 5 grid with five fields.
pub mod chl {
    pub const ID: &str = "demo-chl";

    pub const LAT: (f64, f64, f64) = (52.49875, 50.00125, 0.0024975);
    pub const BNDS: (f64, f64, f64) = (0.0, 1.0, 0.5);
    pub const LON: (f64, f64, f64) = (0.00125, 4.99875, 0.00249875);
    pub const TIME: (&str, &str, f64) = (
        "2017-01-16T10:09:21.834255872",
        "2017-01-31T10:09:21.834255872",
        3.0,
    );

    pub const AXIS_LABELS: [&str; 4] = ["lat", "bnds", "lon", "time"];
    pub const SHAPE: [usize; 4] = [1000, 2, 2000, 5];
    pub const FIELDS: [&str; 5] = ["conc_chl", "conc_tsm", "kd489", "c2rcc_flags", "quality_flags"];

    /// Number of grid cells.
    pub fn cells() -> usize {
        SHAPE.iter().product()
    }
}

/// A regular axis as it appears on the wire.
pub fn regular_axis(label: &str, lower: Value, upper: Value, resolution: f64, uom: &str) -> Value {
    json!({
        "type": "RegularAxis",
        "axisLabel": label,
        "lowerBound": lower,
        "upperBound": upper,
        "resolution": resolution,
        "uomLabel": uom,
    })
}

/// An index axis as it appears on the wire.
pub fn index_axis(label: &str, lower: i64, upper: i64) -> Value {
    json!({
        "type": "IndexAxis",
        "axisLabel": label,
        "lowerBound": lower,
        "upperBound": upper,
    })
}

/// A quantity field as it appears on the wire.
pub fn quantity(name: &str, description: &str, data_type: &str) -> Value {
    json!({
        "type": "Quantity",
        "name": name,
        "description": description,
        "encodingInfo": { "dataType": data_type },
    })
}

/// Assemble a complete document from its axes, limits, fields and values.
///
/// The same axis list is written to the envelope and the general grid.
pub fn coverage_doc(
    id: &str,
    axes: Vec<Value>,
    limits: Vec<Value>,
    index_srs: &str,
    fields: Vec<Value>,
    values: Vec<Value>,
) -> Value {
    let labels: Vec<Value> = axes.iter().map(|a| a["axisLabel"].clone()).collect();
    json!({
        "id": id,
        "type": "CoverageByDomainAndRange",
        "envelope": {
            "type": "EnvelopeByAxis",
            "srsName": crs::EPSG_4326,
            "axisLabels": labels,
            "axis": axes,
        },
        "domainSet": {
            "type": "DomainSet",
            "generalGrid": {
                "type": "GeneralGridCoverage",
                "srsName": crs::EPSG_4326,
                "axisLabels": labels,
                "axis": axes,
                "gridLimits": {
                    "type": "GridLimits",
                    "srsName": index_srs,
                    "axisLabels": labels,
                    "axis": limits,
                },
            },
        },
        "rangeSet": {
            "type": "RangeSet",
            "dataBlock": { "type": "VDataBlock", "values": values },
        },
        "rangeType": {
            "type": "DataRecord",
            "field": fields,
        },
        "metadata": { "Conventions": "CF-1.7" },
    })
}

/// The ocean-colour demo cube with a placeholder payload.
pub fn chl_coverage_doc() -> Value {
    let axes = vec![
        regular_axis("lat", json!(chl::LAT.0), json!(chl::LAT.1), chl::LAT.2, "degrees_north"),
        regular_axis("bnds", json!(chl::BNDS.0), json!(chl::BNDS.1), chl::BNDS.2, "1"),
        regular_axis("lon", json!(chl::LON.0), json!(chl::LON.1), chl::LON.2, "degrees_east"),
        regular_axis("time", json!(chl::TIME.0), json!(chl::TIME.1), chl::TIME.2, "d"),
    ];
    let limits = chl::AXIS_LABELS
        .iter()
        .zip(chl::SHAPE)
        .map(|(label, n)| index_axis(label, 0, n as i64))
        .collect();
    let fields = vec![
        quantity("conc_chl", "Chlorophyll concentration", data_types::FLOAT32),
        quantity("conc_tsm", "Total suspended matter dry weight concentration", data_types::FLOAT32),
        quantity("kd489", "Irradiance attenuation coefficient at 489 nm", data_types::FLOAT32),
        quantity("c2rcc_flags", "C2RCC quality flags", data_types::SIGNED_INT),
        quantity("quality_flags", "Classification and quality flags", data_types::SIGNED_INT),
    ];
    coverage_doc(
        chl::ID,
        axes,
        limits,
        crs::INDEX_4D,
        fields,
        vec![json!("data goes here")],
    )
}

/// The ocean-colour demo cube serialized to a JSON string.
pub fn chl_coverage_json() -> String {
    chl_coverage_doc().to_string()
}

/// A small 2 x 2 x 3 `time`/`lat`/`lon` grid with fields `t2m` and `rh`.
///
/// Time runs daily from 2020-01-01, latitude descends from 10 to 8 and
/// longitude ascends from 0 to 3, all at unit resolution.
pub fn small_coverage_doc(values: Vec<Value>) -> Value {
    let axes = vec![
        regular_axis(
            "time",
            json!("2020-01-01T00:00:00Z"),
            json!("2020-01-03T00:00:00Z"),
            1.0,
            "days",
        ),
        regular_axis("lat", json!(10.0), json!(8.0), 1.0, "degrees_north"),
        regular_axis("lon", json!(0.0), json!(3.0), 1.0, "degrees_east"),
    ];
    let limits = vec![
        index_axis("time", 0, 2),
        index_axis("lat", 0, 2),
        index_axis("lon", 0, 3),
    ];
    let fields = vec![
        quantity("t2m", "2 metre temperature", data_types::FLOAT64),
        quantity("rh", "Relative humidity", data_types::FLOAT32),
    ];
    coverage_doc("small", axes, limits, crs::INDEX_3D, fields, values)
}

/// Shape of [`small_coverage_doc`].
pub const SMALL_SHAPE: [usize; 3] = [2, 2, 3];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chl_cells() {
        assert_eq!(chl::cells(), 20_000_000);
    }

    #[test]
    fn test_chl_doc_shape() {
        let doc = chl_coverage_doc();
        let grid = &doc["domainSet"]["generalGrid"];
        assert_eq!(grid["axis"].as_array().unwrap().len(), 4);
        assert_eq!(grid["gridLimits"]["axis"][2]["upperBound"], 2000);
        assert_eq!(doc["envelope"]["axisLabels"], grid["axisLabels"]);
        assert_eq!(doc["rangeType"]["field"].as_array().unwrap().len(), 5);
    }

    #[test]
    fn test_small_doc_values() {
        let doc = small_coverage_doc(vec![json!(1.0), Value::Null]);
        assert_eq!(doc["rangeSet"]["dataBlock"]["values"][1], Value::Null);
        assert_eq!(doc["metadata"]["Conventions"], "CF-1.7");
    }
}
