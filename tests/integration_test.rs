//! Integration tests for the full report pipeline
//!
//! Tests the complete path on real Parquet files:
//! 1. Write trial and state tables
//! 2. Load projected columns
//! 3. Join, filter, aggregate
//! 4. Convert to charts

use arrow::array::{
    Array, ArrayRef, BooleanArray, Float64Builder, Int32Array, ListBuilder, RecordBatch,
};
use arrow::datatypes::{DataType, Field, Schema};
use parquet::arrow::ArrowWriter;
use parquet::file::properties::WriterProperties;
use relaxation_report::aggregate::{DistanceFilter, FrequencyKey};
use relaxation_report::config::{GroupBy, ReportConfig, ValueColumn};
use relaxation_report::pipeline::ReportPipeline;
use relaxation_report::report::charts;
use relaxation_report::storage::StorageEngine;
use relaxation_report::Error;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

struct StateRow {
    trial: i32,
    state: i32,
    stable: bool,
    steps: i32,
    distances: Vec<f64>,
}

const fn row(trial: i32, state: i32, stable: bool, steps: i32) -> StateRow {
    StateRow {
        trial,
        state,
        stable,
        steps,
        distances: Vec::new(),
    }
}

fn with(mut r: StateRow, distances: &[f64]) -> StateRow {
    r.distances = distances.to_vec();
    r
}

/// Trial 3 has no states; it still counts towards stability ratios.
fn standard_states() -> Vec<StateRow> {
    vec![
        with(row(0, 0, true, 5), &[3.0, 1.0]),
        with(row(0, 1, false, 40), &[2.0, 2.0]),
        with(row(1, 0, true, 7), &[0.0, 4.0]),
        with(row(1, 1, true, 5), &[2.0, 6.0]),
        row(2, 0, false, 40),
        with(row(2, 1, true, 9), &[4.0]),
    ]
}

fn write_batch(path: &Path, batch: &RecordBatch) {
    let file = File::create(path).unwrap();
    let props = WriterProperties::builder()
        .set_max_row_group_size(4) // several row groups
        .build();
    let mut writer = ArrowWriter::try_new(file, batch.schema(), Some(props)).unwrap();
    writer.write(batch).unwrap();
    writer.close().unwrap();
}

fn write_trials(path: &Path, with_stable_counts: bool) {
    let mut fields = vec![
        Field::new("TrialIndex", DataType::Int32, false),
        Field::new("NumTargetStates", DataType::Int32, false),
        Field::new("UnitsUpdated", DataType::Int32, false),
    ];
    let mut columns: Vec<ArrayRef> = vec![
        Arc::new(Int32Array::from(vec![0, 1, 2, 3])),
        Arc::new(Int32Array::from(vec![2, 2, 4, 6])),
        Arc::new(Int32Array::from(vec![1, 4, 1, 4])),
    ];
    if with_stable_counts {
        fields.push(Field::new("NumberStableStates", DataType::Int32, false));
        columns.push(Arc::new(Int32Array::from(vec![500, 1000, 0, 250])));
    }
    let batch = RecordBatch::try_new(Arc::new(Schema::new(fields)), columns).unwrap();
    write_batch(path, &batch);
}

fn write_states(path: &Path, rows: &[StateRow]) {
    let mut distances = ListBuilder::new(Float64Builder::new());
    let mut energies = ListBuilder::new(Float64Builder::new());
    for r in rows {
        distances.values().append_slice(&r.distances);
        distances.append(true);
        energies.values().append_slice(&[-1.0, -2.0]);
        energies.append(true);
    }
    let distances = distances.finish();
    let energies = energies.finish();

    let schema = Schema::new(vec![
        Field::new("TrialIndex", DataType::Int32, false),
        Field::new("StateIndex", DataType::Int32, false),
        Field::new("Stable", DataType::Boolean, false),
        Field::new("NumSteps", DataType::Int32, false),
        Field::new("DistancesToLearned", distances.data_type().clone(), true),
        Field::new("EnergyProfile", energies.data_type().clone(), true),
    ]);
    let batch = RecordBatch::try_new(
        Arc::new(schema),
        vec![
            Arc::new(Int32Array::from_iter_values(rows.iter().map(|r| r.trial))),
            Arc::new(Int32Array::from_iter_values(rows.iter().map(|r| r.state))),
            Arc::new(BooleanArray::from(
                rows.iter().map(|r| r.stable).collect::<Vec<_>>(),
            )),
            Arc::new(Int32Array::from_iter_values(rows.iter().map(|r| r.steps))),
            Arc::new(distances),
            Arc::new(energies),
        ],
    )
    .unwrap();
    write_batch(path, &batch);
}

struct Fixture {
    _dir: TempDir,
    trials: PathBuf,
    states: PathBuf,
}

fn fixture(states: &[StateRow], with_stable_counts: bool) -> Fixture {
    let dir = TempDir::new().unwrap();
    let trials = dir.path().join("trialData.pq");
    let state_path = dir.path().join("stateData.pq");
    write_trials(&trials, with_stable_counts);
    write_states(&state_path, states);
    Fixture {
        _dir: dir,
        trials,
        states: state_path,
    }
}

fn config(f: &Fixture, group_by: GroupBy, value_column: ValueColumn) -> ReportConfig {
    ReportConfig {
        trial_path: f.trials.clone(),
        state_path: f.states.clone(),
        trial_size: 1000,
        group_by,
        value_column,
        log_scale: false,
        distance_filter: DistanceFilter::All,
    }
}

#[test]
fn test_loader_projects_requested_columns_in_order() {
    let f = fixture(&standard_states(), true);
    let storage =
        StorageEngine::load_parquet_columns(&f.states, "states", &["NumSteps", "TrialIndex"])
            .unwrap();

    let batch = storage.to_batch().unwrap();
    assert_eq!(batch.num_rows(), 6);
    let names: Vec<_> = batch.schema().fields().iter().map(|f| f.name().clone()).collect();
    assert_eq!(names, vec!["NumSteps", "TrialIndex"]);
}

#[test]
fn test_loader_missing_column() {
    let f = fixture(&standard_states(), false);
    let err = StorageEngine::load_parquet_columns(
        &f.trials,
        "trials",
        &["TrialIndex", "NumberStableStates"],
    )
    .unwrap_err();

    match err {
        Error::Load { dataset, message } => {
            assert_eq!(dataset, "trials");
            assert!(message.contains("NumberStableStates"));
        }
        other => panic!("expected load error, got {other:?}"),
    }
}

#[test]
fn test_loader_corrupt_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.pq");
    std::fs::write(&path, b"not a parquet file").unwrap();

    let err = StorageEngine::load_parquet_columns(&path, "states", &["Stable"]).unwrap_err();
    assert!(matches!(err, Error::Load { .. }));
}

#[test]
fn test_join_preserves_state_cardinality() {
    let f = fixture(&standard_states(), true);
    let pipeline = ReportPipeline::new(config(&f, GroupBy::NumTargetStates, ValueColumn::NumSteps));
    let prepared = pipeline.prepare().unwrap();

    assert_eq!(prepared.joined.num_rows(), prepared.states.num_rows());
    assert!(prepared.joined.column_by_name("NumTargetStates").is_some());
    assert!(prepared.joined.column_by_name("EnergyProfile").is_none());
}

#[test]
fn test_frequency_tables() {
    let f = fixture(&standard_states(), true);
    let tables = ReportPipeline::new(config(&f, GroupBy::NumTargetStates, ValueColumn::NumSteps))
        .run()
        .unwrap();

    assert_eq!(tables.stable_counts.get(FrequencyKey::Bool(true)), 4);
    assert_eq!(tables.stable_counts.get(FrequencyKey::Bool(false)), 2);
    assert_eq!(tables.stable_counts.total(), 6);

    let distances: Vec<_> = tables.minimum_distance_counts.iter().collect();
    assert_eq!(
        distances,
        vec![
            (FrequencyKey::Int(0), 1),
            (FrequencyKey::Int(1), 1),
            (FrequencyKey::Int(2), 1),
            (FrequencyKey::Int(4), 1),
        ]
    );

    let steps: Vec<_> = tables.num_steps_counts.iter().collect();
    assert_eq!(
        steps,
        vec![
            (FrequencyKey::Int(5), 2),
            (FrequencyKey::Int(7), 1),
            (FrequencyKey::Int(9), 1),
        ]
    );
}

#[test]
fn test_stability_ratio_by_num_target_states() {
    let f = fixture(&standard_states(), true);
    let tables =
        ReportPipeline::new(config(&f, GroupBy::NumTargetStates, ValueColumn::StabilityRatio))
            .run()
            .unwrap();

    let keys: Vec<i64> = tables.grouped.iter().map(|s| s.key).collect();
    assert_eq!(keys, vec![2, 4, 6]);

    let two = tables.grouped[0];
    assert_eq!(two.count, 2);
    assert!((two.mean - 0.75).abs() < 1e-12);
    assert!((two.std - 0.125f64.sqrt()).abs() < 1e-12);
    assert!((two.half_width - 1.96 * 0.125f64.sqrt() / 2f64.sqrt()).abs() < 1e-12);

    let four = tables.grouped[1];
    assert_eq!(four.count, 1);
    assert_eq!(four.mean, 0.0);
    assert_eq!(four.half_width, 0.0);

    assert!((tables.grouped[2].mean - 0.25).abs() < 1e-12);
}

#[test]
fn test_num_steps_by_units_updated() {
    let f = fixture(&standard_states(), true);
    let tables = ReportPipeline::new(config(&f, GroupBy::UnitsUpdated, ValueColumn::NumSteps))
        .run()
        .unwrap();

    assert_eq!(tables.grouped.len(), 2);
    assert_eq!(tables.grouped[0].key, 1);
    assert!((tables.grouped[0].mean - 7.0).abs() < 1e-12);
    assert_eq!(tables.grouped[1].key, 4);
    assert!((tables.grouped[1].mean - 6.0).abs() < 1e-12);
}

#[test]
fn test_minimum_distance_filters() {
    let f = fixture(&standard_states(), true);
    let mut cfg = config(
        &f,
        GroupBy::NumTargetStates,
        ValueColumn::MinimumDistanceToLearned,
    );

    let all = ReportPipeline::new(cfg.clone()).run().unwrap();
    assert_eq!(all.grouped[0].count, 3);
    assert!((all.grouped[0].mean - 1.0).abs() < 1e-12);

    cfg.distance_filter = DistanceFilter::NonZero;
    let non_zero = ReportPipeline::new(cfg.clone()).run().unwrap();
    assert_eq!(non_zero.grouped[0].count, 2);
    assert!((non_zero.grouped[0].mean - 1.5).abs() < 1e-12);
    // Frequency tables ignore the grouping filter
    assert_eq!(non_zero.minimum_distance_counts, all.minimum_distance_counts);

    cfg.distance_filter = DistanceFilter::Zero;
    let zero = ReportPipeline::new(cfg).run().unwrap();
    assert_eq!(zero.grouped.len(), 1);
    assert_eq!(zero.grouped[0].key, 2);
    assert_eq!(zero.grouped[0].count, 1);
}

#[test]
fn test_large_layout_without_stable_counts() {
    let f = fixture(&standard_states(), false);
    let mut cfg = config(&f, GroupBy::UnitsUpdated, ValueColumn::NumSteps);
    cfg.log_scale = true;

    let tables = ReportPipeline::new(cfg.clone()).run().unwrap();
    assert_eq!(tables.grouped.len(), 2);

    let charts = charts(&cfg, &tables);
    assert_eq!(charts[0].title(), "Log Count of Stable and Unstable States");

    let ratio = ReportPipeline::new(cfg.with_value_column(ValueColumn::StabilityRatio)).run();
    assert!(matches!(ratio, Err(Error::Load { .. })));
}

#[test]
fn test_unresolved_trial_reference() {
    let mut states = standard_states();
    states.push(with(row(9, 0, true, 3), &[1.0]));
    let f = fixture(&states, true);

    let err = ReportPipeline::new(config(&f, GroupBy::NumTargetStates, ValueColumn::NumSteps))
        .run()
        .unwrap_err();
    assert!(matches!(err, Error::Join(_)));
}

#[test]
fn test_stable_state_without_distances() {
    let mut states = standard_states();
    states.push(row(1, 2, true, 3));
    let f = fixture(&states, true);

    let err = ReportPipeline::new(config(&f, GroupBy::NumTargetStates, ValueColumn::NumSteps))
        .run()
        .unwrap_err();
    assert!(matches!(err, Error::EmptySequence { row: 6 }));
}

#[test]
fn test_invalid_trial_size_aborts_before_loading() {
    let mut cfg = ReportConfig::preset(
        relaxation_report::config::Preset::NumTargetStates,
        "/nonexistent",
    );
    cfg.trial_size = 0;

    let err = ReportPipeline::new(cfg).run().unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}

#[test]
fn test_pipeline_is_deterministic() {
    let f = fixture(&standard_states(), true);
    for value in ValueColumn::ALL {
        let cfg = config(&f, GroupBy::NumTargetStates, value);
        let first = ReportPipeline::new(cfg.clone()).run().unwrap();
        let second = ReportPipeline::new(cfg.clone()).run().unwrap();
        assert_eq!(first, second);

        let a = serde_json::to_string(&charts(&cfg, &first)).unwrap();
        let b = serde_json::to_string(&charts(&cfg, &second)).unwrap();
        assert_eq!(a, b);
    }
}
