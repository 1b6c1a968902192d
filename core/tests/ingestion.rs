//! Sample store ingestion tests.

use hopcost_core::{
    engine::AnalysisEngine,
    error::{AnalysisError, SampleDefect},
    sample::{Optimization, PartitionKey, TransferType},
    store::{IngestDocument, SampleStore},
};
use serde_json::{json, Value};

fn record(amount: f64, total_cost: f64, efficiency: f64) -> Value {
    json!({
        "amount": amount,
        "recipient_count": 1,
        "total_cost": total_cost,
        "received_amount": amount * efficiency / 100.0,
        "efficiency": efficiency,
        "time_ms": 1500.0,
        "cost_breakdown": {
            "tx_fee": 5000.0,
            "rent": total_cost - 5000.0,
            "compute": 0.0,
            "overhead": 0.0
        }
    })
}

fn partition(n: usize, total_cost: f64, efficiency: f64) -> Value {
    Value::Array(
        (1..=n)
            .map(|i| record(i as f64 * 1e9, total_cost, efficiency))
            .collect(),
    )
}

#[test]
fn ingest_merges_by_partition() {
    let doc = json!({
        "single_recipient": {
            "optimized": partition(3, 100_000.0, 98.0),
            "unoptimized": partition(2, 200_000.0, 92.0)
        },
        "multi_wallet": {
            "optimized": partition(1, 100_000.0, 98.0)
        }
    });

    let mut store = SampleStore::new();
    let added = store.ingest_json(&doc.to_string()).unwrap();
    assert_eq!(added, 6);

    let key = |o, t| PartitionKey::new(o, t);
    assert_eq!(store.samples(key(Optimization::Optimized, TransferType::SingleRecipient)).len(), 3);
    assert_eq!(store.samples(key(Optimization::Unoptimized, TransferType::SingleRecipient)).len(), 2);
    assert_eq!(store.samples(key(Optimization::Optimized, TransferType::MultiWallet)).len(), 1);
    assert_eq!(store.samples(key(Optimization::Unoptimized, TransferType::MultiWallet)).len(), 0);

    // Second ingestion concatenates.
    store.ingest_json(&doc.to_string()).unwrap();
    assert_eq!(store.samples(key(Optimization::Optimized, TransferType::SingleRecipient)).len(), 6);
}

#[test]
fn unknown_keys_are_ignored() {
    let doc = json!({
        "single_recipient": {
            "optimized": partition(1, 100_000.0, 98.0),
            "experimental": [{ "anything": true }]
        },
        "triple_hop": { "optimized": "not even a list" },
        "metadata": 42
    });

    let parsed: IngestDocument = serde_json::from_value(doc.clone()).unwrap();
    assert_eq!(
        parsed.unknown_keys(),
        vec!["metadata", "triple_hop", "single_recipient.experimental"]
    );

    let mut store = SampleStore::new();
    assert_eq!(store.ingest_json(&doc.to_string()).unwrap(), 1);
}

#[test]
fn missing_telemetry_is_coerced_to_zero() {
    let doc = json!({ "multi_wallet": { "unoptimized": [record(1e9, 100_000.0, 98.0)] } });

    let mut store = SampleStore::new();
    store.ingest_json(&doc.to_string()).unwrap();
    let sample = &store.samples(PartitionKey::new(Optimization::Unoptimized, TransferType::MultiWallet))[0];
    assert_eq!(sample.accounts_created, 0);
    assert_eq!(sample.accounts_remaining, 0);
}

/// One broken record fails the whole call and nothing is merged.
#[test]
fn malformed_record_rejects_whole_document() {
    let mut broken = record(2e9, 100_000.0, 98.0);
    broken.as_object_mut().unwrap().remove("cost_breakdown");
    let doc = json!({
        "single_recipient": {
            "optimized": partition(3, 100_000.0, 98.0),
            "unoptimized": [record(1e9, 200_000.0, 92.0), broken]
        }
    });

    let mut store = SampleStore::new();
    let err = store.ingest_json(&doc.to_string()).unwrap_err();
    match err {
        AnalysisError::MalformedSample { partition, index, source } => {
            assert_eq!(partition, PartitionKey::new(Optimization::Unoptimized, TransferType::SingleRecipient));
            assert_eq!(index, 1);
            assert_eq!(source, SampleDefect::MissingField("cost_breakdown"));
        }
        other => panic!("expected MalformedSample, got {other:?}"),
    }
    assert!(store.is_empty(), "no partial merge");
}

#[test]
fn missing_amount_and_recipients_are_malformed() {
    for field in ["amount", "recipient_count"] {
        let mut r = record(1e9, 100_000.0, 98.0);
        r.as_object_mut().unwrap().remove(field);
        let doc = json!({ "single_recipient": { "optimized": [r] } });
        let err = SampleStore::new().ingest_json(&doc.to_string()).unwrap_err();
        assert!(
            matches!(err, AnalysisError::MalformedSample { source: SampleDefect::MissingField(f), .. } if f == field),
            "field {field}: {err}"
        );
    }
}

#[test]
fn invalid_json_is_a_malformed_document() {
    let err = SampleStore::new().ingest_json("{ not json").unwrap_err();
    assert!(matches!(err, AnalysisError::MalformedDocument(_)));
}

#[test]
fn ingest_file_reads_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("samples.json");
    let doc = json!({ "single_recipient": { "optimized": partition(2, 100_000.0, 98.0) } });
    std::fs::write(&path, doc.to_string()).unwrap();

    let mut engine = AnalysisEngine::build_test();
    assert_eq!(engine.ingest_file(&path).unwrap(), 2);

    let err = engine.ingest_file(dir.path().join("missing.json")).unwrap_err();
    assert!(matches!(err, AnalysisError::Io { .. }));
    assert_eq!(engine.store().len(), 2);
}

/// A dumped store reloads into an identical store.
#[test]
fn sample_dump_reloads_identically() {
    let mut engine = AnalysisEngine::build_test();
    engine.generate();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dump.json");
    engine.store().write_document(&path).unwrap();

    let mut reloaded = AnalysisEngine::build_test();
    assert_eq!(reloaded.ingest_file(&path).unwrap(), engine.store().len());
    assert_eq!(reloaded.store().to_document(), engine.store().to_document());
}
