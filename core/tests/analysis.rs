//! End-to-end analysis tests: sufficiency, comparison, scaling.

use hopcost_core::{
    config::AnalysisConfig,
    engine::AnalysisEngine,
    error::AnalysisError,
    sample::{CostType, Optimization, PartitionKey, TransferType},
};
use serde_json::{json, Value};

const EPSILON: f64 = 1e-9;

// ── Helpers ──────────────────────────────────────────────────────────────────

fn generated_engine() -> AnalysisEngine {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut engine = AnalysisEngine::new(AnalysisConfig::default());
    engine.generate();
    engine
}

fn record(amount: f64, tx_fee: f64, rent: f64, efficiency: f64, time_ms: f64) -> Value {
    json!({
        "amount": amount,
        "recipient_count": 1,
        "efficiency": efficiency,
        "time_ms": time_ms,
        "cost_breakdown": { "tx_fee": tx_fee, "rent": rent }
    })
}

fn ingest(engine: &mut AnalysisEngine, doc: Value) {
    engine
        .ingest_json(&doc.to_string())
        .expect("document should ingest");
}

// ── Sufficiency ──────────────────────────────────────────────────────────────

#[test]
fn empty_store_is_insufficient() {
    let engine = AnalysisEngine::build_test();
    assert!(!engine.has_sufficient_data());
    let err = engine.analyze().unwrap_err();
    assert!(matches!(err, AnalysisError::InsufficientData { found: 0, required: 3, .. }));
}

#[test]
fn two_samples_in_one_partition_is_insufficient() {
    let mut engine = AnalysisEngine::build_test();
    engine.generate();
    assert!(engine.has_sufficient_data());

    // A fresh engine with only two optimized single-recipient samples.
    let mut engine = AnalysisEngine::build_test();
    ingest(
        &mut engine,
        json!({
            "single_recipient": {
                "optimized": [
                    record(1e9, 100.0, 900.0, 98.0, 10.0),
                    record(2e9, 100.0, 900.0, 98.0, 10.0)
                ]
            }
        }),
    );
    assert!(!engine.has_sufficient_data());
    match engine.analyze().unwrap_err() {
        AnalysisError::InsufficientData { partition, found, required } => {
            assert_eq!(partition, PartitionKey::new(Optimization::Optimized, TransferType::SingleRecipient));
            assert_eq!(found, 2);
            assert_eq!(required, 3);
        }
        other => panic!("expected InsufficientData, got {other:?}"),
    }
}

/// A zero threshold still refuses empty partitions instead of averaging nothing.
#[test]
fn zero_threshold_still_requires_one_sample() {
    let config = AnalysisConfig {
        min_samples_per_partition: 0,
        ..AnalysisConfig::default_test()
    };
    let mut engine = AnalysisEngine::new(config);
    assert!(!engine.has_sufficient_data());
    let err = engine.analyze().unwrap_err();
    assert!(matches!(err, AnalysisError::InsufficientData { found: 0, required: 1, .. }));

    engine.generate();
    let result = engine.analyze().expect("one sample per partition is enough");
    assert!(result.single_recipient.optimized.efficiency.is_finite());
}

// ── Comparison ───────────────────────────────────────────────────────────────

#[test]
fn reference_run_improves_every_metric() {
    let result = generated_engine().analyze().expect("analysis");

    for transfer_type in TransferType::ALL {
        let i = &result.for_type(transfer_type).improvements;
        assert!((i.efficiency - 6.0).abs() < EPSILON, "{transfer_type:?}: {}", i.efficiency);
        assert!(i.cost_reduction.unwrap() > 0.0);
        assert!(i.time_improvement.unwrap() > 0.0);
        let rent = i.cost_reduction_by_type[&CostType::Rent];
        assert!((rent - 70.0).abs() < EPSILON, "rent reduction {rent}");
        // Overhead is only rounding noise, so it gets no reduction figure.
        assert!(!i.cost_reduction_by_type.contains_key(&CostType::Overhead));
    }

    let single = &result.single_recipient;
    assert_eq!(single.optimized.sample_count, 10);
    assert_eq!(single.optimized.accounts_remaining, 0.0);
    assert_eq!(single.unoptimized.accounts_remaining, 2.0);
    assert_eq!(single.optimized.accounts_created, 5.0);
    assert_eq!(result.multi_wallet.optimized.accounts_created, 10.0);
    assert!(result.comparison.efficiency_delta.abs() < EPSILON);
}

#[test]
fn equal_partitions_give_zero_improvement() {
    let mut engine = AnalysisEngine::build_test();
    let partition = || (1..=3).map(|i| record(i as f64 * 1e9, 100.0, 900.0, 95.0, 100.0)).collect::<Vec<_>>();
    let modes = json!({ "optimized": partition(), "unoptimized": partition() });
    ingest(&mut engine, json!({ "single_recipient": modes.clone(), "multi_wallet": modes }));

    let result = engine.analyze().expect("analysis");
    let i = &result.single_recipient.improvements;
    assert_eq!(i.efficiency, 0.0);
    assert_eq!(i.cost_reduction, Some(0.0));
    assert_eq!(i.time_improvement, Some(0.0));
    assert_eq!(result.average_cost_reduction(), Some(0.0));
}

#[test]
fn zero_unoptimized_share_is_omitted() {
    let mut engine = AnalysisEngine::build_test();
    let optimized = (1..=3).map(|i| record(i as f64 * 1e9, 50.0, 450.0, 98.0, 0.0)).collect::<Vec<_>>();
    let unoptimized = (1..=3).map(|i| record(i as f64 * 1e9, 0.0, 1000.0, 92.0, 0.0)).collect::<Vec<_>>();
    let modes = json!({ "optimized": optimized, "unoptimized": unoptimized });
    ingest(&mut engine, json!({ "single_recipient": modes.clone(), "multi_wallet": modes }));

    let result = engine.analyze().expect("zero denominators are not fatal");
    let i = &result.single_recipient.improvements;
    assert!(!i.cost_reduction_by_type.contains_key(&CostType::TxFee));
    assert!((i.cost_reduction_by_type[&CostType::Rent] - 55.0).abs() < EPSILON);
    assert_eq!(i.time_improvement, None, "zero unoptimized time must be omitted, not 0%");
    assert_eq!(result.comparison.time_improvement_delta, None);
    assert!((i.cost_reduction.unwrap() - 50.0).abs() < EPSILON);
}

#[test]
fn analyze_does_not_mutate_store() {
    let engine = generated_engine();
    let before = engine.store().to_document();
    let first = engine.analyze().expect("analysis");
    let second = engine.analyze().expect("analysis");
    assert_eq!(engine.store().to_document(), before);
    assert_eq!(first, second);
}

// ── Scaling ──────────────────────────────────────────────────────────────────

#[test]
fn reference_scaling_covers_every_size() {
    let result = generated_engine().analyze().expect("analysis");
    let scaling = &result.scaling;

    assert_eq!(scaling.by_amount.len(), 10);
    assert!(scaling
        .by_amount
        .windows(2)
        .all(|w| w[0].amount < w[1].amount));
    for point in &scaling.by_amount {
        assert!((point.improvement - 6.0).abs() < EPSILON, "at {}", point.amount);
        assert!((point.amount_in_base_units * 1e9 - point.amount).abs() < 1e-3);
    }

    let optimum = scaling.optimum.as_ref().expect("optimum exists");
    assert!(scaling.by_amount.iter().all(|p| p.improvement <= optimum.improvement));
    assert_eq!(scaling.cost_by_size.len(), 20, "10 sizes x 2 transfer types");
}

#[test]
fn optimum_is_the_largest_gain() {
    let mut engine = AnalysisEngine::build_test();
    // Gain grows with size up to 2e9, then shrinks.
    let gains = [(1e9, 2.0), (2e9, 8.0), (3e9, 4.0)];
    let optimized: Vec<Value> = gains.iter().map(|&(a, g)| record(a, 10.0, 90.0, 90.0 + g, 1.0)).collect();
    let unoptimized: Vec<Value> = gains.iter().map(|&(a, _)| record(a, 20.0, 180.0, 90.0, 2.0)).collect();
    let modes = json!({ "optimized": optimized, "unoptimized": unoptimized });
    ingest(&mut engine, json!({ "single_recipient": modes.clone(), "multi_wallet": modes }));

    let result = engine.analyze().expect("analysis");
    let optimum = result.scaling.optimum.expect("optimum exists");
    assert_eq!(optimum.amount, 2e9);
    assert!((optimum.improvement - 8.0).abs() < EPSILON);
}

#[test]
fn disjoint_amounts_give_empty_scaling() {
    let mut engine = AnalysisEngine::build_test();
    let optimized: Vec<Value> = (1..=3).map(|i| record(i as f64 * 1e9, 10.0, 90.0, 98.0, 1.0)).collect();
    let unoptimized: Vec<Value> = (4..=6).map(|i| record(i as f64 * 1e9, 20.0, 180.0, 92.0, 2.0)).collect();
    let modes = json!({ "optimized": optimized, "unoptimized": unoptimized });
    ingest(&mut engine, json!({ "single_recipient": modes.clone(), "multi_wallet": modes }));

    let result = engine.analyze().expect("analysis still succeeds");
    assert!(result.scaling.is_empty());
    assert!(result.scaling.optimum.is_none());
    assert!(result.scaling.cost_by_size.is_empty());
    assert!((result.single_recipient.improvements.efficiency - 6.0).abs() < EPSILON);
}
