//! The analysis engine: owns one run's sample store and configuration.
//!
//! PIPELINE (fixed order, recomputed wholesale on every analyze()):
//!   1. Sufficiency check   (every partition >= min_samples_per_partition)
//!   2. Aggregation         (per transfer type, per optimization mode)
//!   3. Comparison          (optimized vs unoptimized, then multi vs single)
//!   4. Scaling analysis    (efficiency gain by transfer size)
//!
//! RULES:
//!   - Samples enter only through generate() or ingest_*().
//!   - analyze() never mutates the store.
//!   - The result is a plain value; nothing is cached between runs.

use crate::{
    aggregator::PartitionStats,
    comparator::{compare, compare_types, Improvements, TypeComparison},
    config::AnalysisConfig,
    error::CoreResult,
    generator::SampleGenerator,
    sample::{Optimization, PartitionKey, TransferType},
    scaling::{analyze_scaling, ScalingAnalysis},
    store::SampleStore,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Aggregates and improvements for one transfer type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferTypeAnalysis {
    pub optimized: PartitionStats,
    pub unoptimized: PartitionStats,
    pub improvements: Improvements,
}

impl TransferTypeAnalysis {
    pub fn stats(&self, optimization: Optimization) -> &PartitionStats {
        match optimization {
            Optimization::Optimized   => &self.optimized,
            Optimization::Unoptimized => &self.unoptimized,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub single_recipient: TransferTypeAnalysis,
    pub multi_wallet: TransferTypeAnalysis,
    pub comparison: TypeComparison,
    pub scaling: ScalingAnalysis,
}

impl AnalysisResult {
    pub fn for_type(&self, transfer_type: TransferType) -> &TransferTypeAnalysis {
        match transfer_type {
            TransferType::SingleRecipient => &self.single_recipient,
            TransferType::MultiWallet     => &self.multi_wallet,
        }
    }

    /// Mean of the two topologies' efficiency gains.
    pub fn average_efficiency_improvement(&self) -> f64 {
        (self.single_recipient.improvements.efficiency + self.multi_wallet.improvements.efficiency) / 2.0
    }

    /// Mean of the two topologies' cost reductions, if both exist.
    pub fn average_cost_reduction(&self) -> Option<f64> {
        let single = self.single_recipient.improvements.cost_reduction?;
        let multi = self.multi_wallet.improvements.cost_reduction?;
        Some((single + multi) / 2.0)
    }
}

pub struct AnalysisEngine {
    pub config: AnalysisConfig,
    store: SampleStore,
}

impl AnalysisEngine {
    pub fn new(config: AnalysisConfig) -> Self {
        Self {
            config,
            store: SampleStore::new(),
        }
    }

    /// Engine over the small test fixture config.
    pub fn build_test() -> Self {
        Self::new(AnalysisConfig::default_test())
    }

    pub fn store(&self) -> &SampleStore {
        &self.store
    }

    /// Append the synthetic grid. Returns the number of samples added.
    pub fn generate(&mut self) -> usize {
        SampleGenerator::new(&self.config.generator, &self.config.cost_model)
            .populate(&mut self.store)
    }

    pub fn ingest_json(&mut self, json: &str) -> CoreResult<usize> {
        self.store.ingest_json(json)
    }

    pub fn ingest_file(&mut self, path: impl AsRef<Path>) -> CoreResult<usize> {
        self.store.ingest_file(path)
    }

    pub fn has_sufficient_data(&self) -> bool {
        self.store.has_sufficient_data(self.config.min_samples_per_partition)
    }

    pub fn analyze(&self) -> CoreResult<AnalysisResult> {
        analyze(&self.store, self.config.min_samples_per_partition)
    }
}

/// Run the full pipeline over `store`.
pub fn analyze(store: &SampleStore, min_per_partition: usize) -> CoreResult<AnalysisResult> {
    store.check_sufficient(min_per_partition)?;
    log::info!("Analyzing {} samples", store.len());

    let single_recipient = analyze_transfer_type(store, TransferType::SingleRecipient);
    let multi_wallet = analyze_transfer_type(store, TransferType::MultiWallet);
    let comparison = compare_types(&single_recipient.improvements, &multi_wallet.improvements);
    let scaling = analyze_scaling(store);

    Ok(AnalysisResult {
        single_recipient,
        multi_wallet,
        comparison,
        scaling,
    })
}

fn analyze_transfer_type(store: &SampleStore, transfer_type: TransferType) -> TransferTypeAnalysis {
    let optimized = PartitionStats::from_samples(
        store.samples(PartitionKey::new(Optimization::Optimized, transfer_type)),
    );
    let unoptimized = PartitionStats::from_samples(
        store.samples(PartitionKey::new(Optimization::Unoptimized, transfer_type)),
    );
    log::debug!(
        "{}: optimized {:.2}% over {} samples, unoptimized {:.2}% over {} samples",
        transfer_type.key(),
        optimized.efficiency,
        optimized.sample_count,
        unoptimized.efficiency,
        unoptimized.sample_count
    );
    let improvements = compare(transfer_type.key(), &optimized, &unoptimized);
    TransferTypeAnalysis {
        optimized,
        unoptimized,
        improvements,
    }
}
