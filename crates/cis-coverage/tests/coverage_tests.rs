//! Validation and lookup tests against the shared coverage fixtures.

use cis_coverage::{
    index_srs_name, AxisValue, CisJsonCodec, Coverage, CoverageConfig, CoverageError, DataType,
    FieldDescriptor, PayloadGrid, PayloadLayout, RangeSet, RangeType,
};
use serde_json::{json, Value};
use test_utils::{
    assert_approx_eq, chl, chl_coverage_doc, chl_coverage_json, coverage_doc, data_types,
    index_axis, indexed_payload_json, indexed_value, quantity, regular_axis, row_major_cell,
    small_coverage_doc, SMALL_SHAPE,
};

fn chl_coverage() -> Coverage {
    CisJsonCodec::default()
        .decode(chl_coverage_json().as_bytes())
        .unwrap()
}

fn layout_codec() -> CisJsonCodec {
    CisJsonCodec::new(CoverageConfig::default().with_layout("field-fastest,row-major".parse().unwrap()))
}

fn small_coverage(values: Vec<Value>) -> Coverage {
    layout_codec().decode_value(small_coverage_doc(values)).unwrap()
}

fn violations(doc: Value, codec: &CisJsonCodec) -> Vec<CoverageError> {
    match codec.decode_value(doc) {
        Err(CoverageError::Invalid(v)) => v.into_inner(),
        Err(other) => panic!("expected violations, got {}", other),
        Ok(_) => panic!("expected violations, document was accepted"),
    }
}

// ============================================================================
// Domain tests
// ============================================================================

#[test]
fn test_chl_cell_counts() {
    let cov = chl_coverage();
    let domain = cov.domain_set();
    assert_eq!(domain.axis("lat").unwrap().cell_count().unwrap(), 1000);
    assert_eq!(domain.axis("bnds").unwrap().cell_count().unwrap(), 2);
    assert_eq!(domain.axis("lon").unwrap().cell_count().unwrap(), 2000);
    assert_eq!(domain.axis("time").unwrap().cell_count().unwrap(), 5);
    assert_eq!(cov.shape(), chl::SHAPE.to_vec());
    assert!(domain.axis("time").unwrap().is_temporal());
}

#[test]
fn test_chl_axis_order_everywhere() {
    let cov = chl_coverage();
    let expected: Vec<String> = chl::AXIS_LABELS.iter().map(|s| s.to_string()).collect();
    assert_eq!(cov.domain_set().axis_labels(), expected);
    assert_eq!(cov.domain_set().index_space().labels(), expected);
    assert_eq!(cov.envelope().axis_labels, expected);
}

#[test]
fn test_chl_metadata_and_payload() {
    let cov = chl_coverage();
    assert_eq!(cov.id(), chl::ID);
    assert_eq!(cov.metadata()["Conventions"], "CF-1.7");
    assert!(matches!(cov.range_set(), RangeSet::Placeholder(_)));
    assert!(matches!(
        cov.value_at("conc_chl", &[0, 0, 0, 0]),
        Err(CoverageError::PayloadUnavailable(_))
    ));
}

#[test]
fn test_grid_limits_off_by_one() {
    let mut doc = chl_coverage_doc();
    doc["domainSet"]["generalGrid"]["gridLimits"]["axis"][0]["upperBound"] = json!(999);

    let found = violations(doc, &CisJsonCodec::default());
    assert_eq!(
        found,
        vec![CoverageError::InconsistentGridLimits {
            label: "lat".to_string(),
            expected: 1000,
            actual: 999,
        }]
    );
}

#[test]
fn test_grid_limits_span_overflow() {
    let mut doc = chl_coverage_doc();
    doc["domainSet"]["generalGrid"]["gridLimits"]["axis"][0]["lowerBound"] = json!(i64::MIN);
    doc["domainSet"]["generalGrid"]["gridLimits"]["axis"][0]["upperBound"] = json!(i64::MAX);

    let found = violations(doc, &CisJsonCodec::default());
    assert_eq!(found.len(), 1);
    assert!(matches!(&found[0], CoverageError::InvalidAxis { label, .. } if label == "lat"));
}

#[test]
fn test_non_integer_cell_count() {
    let mut doc = chl_coverage_doc();
    doc["envelope"]["axis"][2]["resolution"] = json!(0.003);
    doc["domainSet"]["generalGrid"]["axis"][2]["resolution"] = json!(0.003);

    let found = violations(doc, &CisJsonCodec::default());
    assert_eq!(found.len(), 1);
    assert!(matches!(
        &found[0],
        CoverageError::NonIntegerCellCount { label, .. } if label == "lon"
    ));
}

#[test]
fn test_envelope_mismatch() {
    let mut doc = chl_coverage_doc();
    doc["envelope"]["axis"][2]["upperBound"] = json!(5.5);

    let found = violations(doc, &CisJsonCodec::default());
    assert_eq!(found.len(), 1);
    assert!(matches!(
        &found[0],
        CoverageError::EnvelopeMismatch { label, .. } if label == "lon"
    ));
}

#[test]
fn test_envelope_axis_order_mismatch() {
    let mut doc = chl_coverage_doc();
    doc["envelope"]["axisLabels"] = json!(["lon", "bnds", "lat", "time"]);

    let found = violations(doc, &CisJsonCodec::default());
    assert!(matches!(
        &found[0],
        CoverageError::AxisOrderMismatch { context, .. } if context == "envelope.axisLabels"
    ));
}

#[test]
fn test_all_violations_reported() {
    let mut doc = small_coverage_doc(indexed_payload_json(&SMALL_SHAPE, 2, 0)[1..].to_vec());
    doc["envelope"]["srsName"] = json!("EPSG:3857");
    doc["domainSet"]["generalGrid"]["gridLimits"]["axis"][2]["upperBound"] = json!(4);

    let found = violations(doc, &layout_codec());
    assert_eq!(found.len(), 3);
    assert!(matches!(found[0], CoverageError::EnvelopeMismatch { .. }));
    assert!(matches!(found[1], CoverageError::InconsistentGridLimits { .. }));
    assert!(matches!(
        found[2],
        CoverageError::CardinalityMismatch { expected: 24, actual: 23 }
    ));
}

// ============================================================================
// Axis mapping tests
// ============================================================================

#[test]
fn test_numeric_inverse() {
    let cov = chl_coverage();
    let lat = cov.domain_set().axis("lat").unwrap();
    for i in [0usize, 1, 500, 999, 1000] {
        let value = lat.index_to_value(i).unwrap();
        assert_approx_eq!(lat.value_to_index(&value).unwrap(), i as f64, 1e-6);
    }
    assert_approx_eq!(lat.index_to_value(1000).unwrap().as_number().unwrap(), chl::LAT.1, 1e-9);
}

#[test]
fn test_temporal_inverse() {
    let cov = chl_coverage();
    let time = cov.domain_set().axis("time").unwrap();
    for i in 0..=5usize {
        let value = time.index_to_value(i).unwrap();
        assert_eq!(time.value_to_index(&value).unwrap(), i as f64);
    }
    assert_eq!(time.index_to_value(5).unwrap(), time.upper_bound());
}

#[test]
fn test_out_of_domain() {
    let cov = chl_coverage();
    let lat = cov.domain_set().axis("lat").unwrap();
    assert!(matches!(
        lat.index_to_value(1001),
        Err(CoverageError::OutOfDomain { .. })
    ));
    assert!(matches!(
        lat.value_to_index(&AxisValue::Number(53.0)),
        Err(CoverageError::OutOfDomain { .. })
    ));
}

// ============================================================================
// Range tests
// ============================================================================

#[test]
fn test_cardinality_at_scale() {
    let cov = chl_coverage();
    let expected = chl::cells() * chl::FIELDS.len();
    assert_eq!(expected, 100_000_000);

    let ok = RangeSet::check_cardinality(expected, cov.domain_set(), cov.range_type(), 1e-6);
    assert_eq!(ok.unwrap(), expected);

    let err = RangeSet::check_cardinality(expected - 1, cov.domain_set(), cov.range_type(), 1e-6)
        .unwrap_err();
    assert_eq!(
        err,
        CoverageError::CardinalityMismatch {
            expected: 100_000_000,
            actual: 99_999_999,
        }
    );
}

#[test]
fn test_inline_payload_length_at_scale() {
    let cov = chl_coverage();
    for layout in ["field-fastest,row-major", "field-slowest,column-major"] {
        let layout: PayloadLayout = layout.parse().unwrap();
        let grid = PayloadGrid::new(
            cov.domain_set().axis_labels(),
            cov.shape(),
            cov.range_type().field_names(),
            layout,
        );
        assert_eq!(grid.expected_len(), 100_000_000);
    }
}

#[test]
fn test_cardinality_saturates_on_huge_grid() {
    let axes = vec![
        regular_axis("y", json!(0.0), json!(1e10), 1.0, "m"),
        regular_axis("x", json!(0.0), json!(1e10), 1.0, "m"),
    ];
    let limits = vec![
        index_axis("y", 0, 10_000_000_000),
        index_axis("x", 0, 10_000_000_000),
    ];
    let fields = vec![quantity("v", "Value", data_types::FLOAT64)];
    let doc = coverage_doc(
        "huge",
        axes,
        limits,
        &index_srs_name(2),
        fields,
        vec![json!("data goes here")],
    );

    let cov = CisJsonCodec::default().decode_value(doc).unwrap();
    assert_eq!(cov.shape(), vec![10_000_000_000, 10_000_000_000]);
    assert_eq!(cov.domain_set().total_cells(1e-6).unwrap(), usize::MAX);

    let err = RangeSet::check_cardinality(5, cov.domain_set(), cov.range_type(), 1e-6).unwrap_err();
    assert_eq!(
        err,
        CoverageError::CardinalityMismatch {
            expected: usize::MAX,
            actual: 5,
        }
    );
}

#[test]
fn test_wrong_length_without_layout() {
    let mut values = indexed_payload_json(&SMALL_SHAPE, 2, 0);
    values.truncate(5);

    let found = violations(small_coverage_doc(values), &CisJsonCodec::default());
    assert_eq!(
        found,
        vec![
            CoverageError::UndeclaredLayout,
            CoverageError::CardinalityMismatch {
                expected: 24,
                actual: 5,
            },
        ]
    );
}

#[test]
fn test_duplicate_field_name() {
    let err = RangeType::new(vec![
        FieldDescriptor::new("conc_chl", "Chlorophyll concentration", DataType::Float32),
        FieldDescriptor::new("conc_chl", "Chlorophyll concentration", DataType::Float32),
    ])
    .unwrap_err();
    assert_eq!(err, CoverageError::DuplicateFieldName("conc_chl".to_string()));
}

#[test]
fn test_field_lookup() {
    let cov = chl_coverage();
    let range_type = cov.range_type();
    assert_eq!(range_type.field_names(), chl::FIELDS.to_vec());
    assert_eq!(range_type.field_index("kd489").unwrap(), 2);
    assert_eq!(range_type.field("c2rcc_flags").unwrap().data_type, DataType::Int32);
    assert_eq!(
        range_type.field_index("nonexistent").unwrap_err(),
        CoverageError::UnknownField("nonexistent".to_string())
    );
}

#[test]
fn test_value_at_indices() {
    let cov = small_coverage(indexed_payload_json(&SMALL_SHAPE, 2, 0));
    for index in [[0, 0, 0], [1, 0, 2], [1, 1, 2]] {
        let cell = row_major_cell(&SMALL_SHAPE, &index);
        assert_eq!(cov.value_at("t2m", &index).unwrap(), Some(indexed_value(cell, 0)));
        assert_eq!(cov.value_at("rh", &index).unwrap(), Some(indexed_value(cell, 1)));
    }
    assert!(matches!(
        cov.value_at("t2m", &[2, 0, 0]),
        Err(CoverageError::IndexOutOfRange { .. })
    ));
}

#[test]
fn test_missing_values() {
    let cov = small_coverage(indexed_payload_json(&SMALL_SHAPE, 2, 5));
    // flat offset 4 is cell 2, field 0
    assert_eq!(cov.value_at("t2m", &[0, 0, 2]).unwrap(), None);
    assert_eq!(cov.value_at("rh", &[0, 0, 2]).unwrap(), Some(indexed_value(2, 1)));
}

#[test]
fn test_value_at_point() {
    let cov = small_coverage(indexed_payload_json(&SMALL_SHAPE, 2, 0));
    let when = cis_coverage::parse_instant("2020-01-02T00:00:00Z").unwrap();
    let coords = [
        AxisValue::Instant(when),
        AxisValue::Number(9.0),
        AxisValue::Number(2.0),
    ];
    assert_eq!(cov.locate(&coords).unwrap(), vec![1, 1, 2]);
    assert_eq!(cov.value_at_point("t2m", &coords).unwrap(), Some(indexed_value(11, 0)));

    let wrong_kind = [
        AxisValue::Number(0.0),
        AxisValue::Number(9.0),
        AxisValue::Number(2.0),
    ];
    assert!(matches!(
        cov.locate(&wrong_kind),
        Err(CoverageError::InvalidAxis { .. })
    ));
}

#[test]
fn test_rebuild_from_parts() {
    let cov = small_coverage(indexed_payload_json(&SMALL_SHAPE, 2, 0));
    let mut parts = cov.clone().into_parts();
    parts.id = "small-copy".to_string();
    let copy = Coverage::assemble_with(parts, cov.config()).unwrap();
    assert_eq!(copy.id(), "small-copy");
    assert_eq!(copy.range_set(), cov.range_set());
    assert_eq!(copy.domain_set(), cov.domain_set());
}
