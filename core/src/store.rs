//! In-memory sample store, partitioned by (optimization × transfer type).
//!
//! RULE: the store is owned by exactly one analysis run. It is append-only;
//! aggregation reads it, never mutates it.
//!
//! External documents are shaped transfer_type -> optimization -> [sample].
//! Unknown partition keys are skipped with a debug log. A document is
//! validated in full before anything is merged, so a broken document leaves
//! the store as it was.

use crate::{
    error::{AnalysisError, CoreResult},
    sample::{CostSample, Optimization, PartitionKey, RawCostSample, TransferType},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

// ── Ingestion document ───────────────────────────────────────────────────────

/// Ingestion document. Unknown partition keys are kept aside, logged and
/// skipped.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IngestDocument {
    pub single_recipient: Option<IngestModes>,
    pub multi_wallet: Option<IngestModes>,
    #[serde(flatten)]
    pub unknown: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IngestModes {
    pub optimized: Option<Vec<RawCostSample>>,
    pub unoptimized: Option<Vec<RawCostSample>>,
    #[serde(flatten)]
    pub unknown: BTreeMap<String, serde_json::Value>,
}

impl IngestDocument {
    /// Dotted paths of every partition key that will be skipped,
    /// e.g. `triple_hop` or `single_recipient.experimental`.
    pub fn unknown_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.unknown.keys().cloned().collect();
        for transfer_type in TransferType::ALL {
            if let Some(modes) = self.modes(transfer_type) {
                keys.extend(
                    modes
                        .unknown
                        .keys()
                        .map(|k| format!("{}.{k}", transfer_type.key())),
                );
            }
        }
        keys
    }

    fn modes(&self, transfer_type: TransferType) -> Option<&IngestModes> {
        match transfer_type {
            TransferType::SingleRecipient => self.single_recipient.as_ref(),
            TransferType::MultiWallet     => self.multi_wallet.as_ref(),
        }
    }
}

impl IngestModes {
    fn records(&self, optimization: Optimization) -> Option<&Vec<RawCostSample>> {
        match optimization {
            Optimization::Optimized   => self.optimized.as_ref(),
            Optimization::Unoptimized => self.unoptimized.as_ref(),
        }
    }
}

/// Strictly-typed sample dump, readable back through `IngestDocument`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SampleDocument {
    pub single_recipient: ModeSamples,
    pub multi_wallet: ModeSamples,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModeSamples {
    pub optimized: Vec<CostSample>,
    pub unoptimized: Vec<CostSample>,
}

// ── Store ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct SampleStore {
    partitions: BTreeMap<PartitionKey, Vec<CostSample>>,
}

impl SampleStore {
    pub fn new() -> Self {
        let partitions = PartitionKey::all()
            .into_iter()
            .map(|key| (key, Vec::new()))
            .collect();
        Self { partitions }
    }

    /// Append one already-validated sample.
    pub fn push(&mut self, key: PartitionKey, sample: CostSample) {
        self.partitions.entry(key).or_default().push(sample);
    }

    pub fn samples(&self, key: PartitionKey) -> &[CostSample] {
        self.partitions.get(&key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every sample of one optimization mode, both transfer types,
    /// single_recipient first, insertion order within each.
    pub fn samples_for_mode(&self, optimization: Optimization) -> impl Iterator<Item = &CostSample> {
        TransferType::ALL
            .into_iter()
            .flat_map(move |t| self.samples(PartitionKey::new(optimization, t)).iter())
    }

    pub fn len(&self) -> usize {
        self.partitions.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True iff every one of the four partitions holds at least `min_per_partition` samples.
    pub fn has_sufficient_data(&self, min_per_partition: usize) -> bool {
        self.check_sufficient(min_per_partition).is_ok()
    }

    /// Like `has_sufficient_data`, but names the first short partition.
    /// An empty partition is never sufficient, whatever the threshold.
    pub fn check_sufficient(&self, min_per_partition: usize) -> CoreResult<()> {
        let min_per_partition = min_per_partition.max(1);
        for key in PartitionKey::all() {
            let found = self.samples(key).len();
            if found < min_per_partition {
                return Err(AnalysisError::InsufficientData {
                    partition: key,
                    found,
                    required: min_per_partition,
                });
            }
        }
        Ok(())
    }

    // ── Ingestion ──────────────────────────────────────────────

    /// Merge a parsed document by per-partition concatenation.
    /// Returns the number of samples added.
    pub fn ingest(&mut self, document: IngestDocument) -> CoreResult<usize> {
        for key in document.unknown_keys() {
            log::debug!("Skipping unknown partition key '{key}'");
        }
        let mut staged: Vec<(PartitionKey, Vec<CostSample>)> = Vec::new();

        for transfer_type in TransferType::ALL {
            let Some(modes) = document.modes(transfer_type) else {
                continue;
            };
            for optimization in Optimization::ALL {
                let Some(records) = modes.records(optimization) else {
                    continue;
                };
                let key = PartitionKey::new(optimization, transfer_type);
                let samples = records
                    .iter()
                    .cloned()
                    .enumerate()
                    .map(|(index, raw)| {
                        raw.into_sample().map_err(|source| AnalysisError::MalformedSample {
                            partition: key,
                            index,
                            source,
                        })
                    })
                    .collect::<CoreResult<Vec<_>>>()?;
                staged.push((key, samples));
            }
        }

        let mut added = 0;
        for (key, samples) in staged {
            log::debug!("Ingesting {} samples into {key}", samples.len());
            added += samples.len();
            self.partitions.entry(key).or_default().extend(samples);
        }
        Ok(added)
    }

    pub fn ingest_json(&mut self, json: &str) -> CoreResult<usize> {
        let document: IngestDocument = serde_json::from_str(json)?;
        self.ingest(document)
    }

    pub fn ingest_file(&mut self, path: impl AsRef<Path>) -> CoreResult<usize> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| AnalysisError::io(path, e))?;
        let added = self.ingest_json(&content)?;
        log::info!("Loaded {added} samples from {}", path.display());
        Ok(added)
    }

    // ── Dump ───────────────────────────────────────────────────

    pub fn to_document(&self) -> SampleDocument {
        let modes = |transfer_type| ModeSamples {
            optimized: self
                .samples(PartitionKey::new(Optimization::Optimized, transfer_type))
                .to_vec(),
            unoptimized: self
                .samples(PartitionKey::new(Optimization::Unoptimized, transfer_type))
                .to_vec(),
        };
        SampleDocument {
            single_recipient: modes(TransferType::SingleRecipient),
            multi_wallet: modes(TransferType::MultiWallet),
        }
    }

    pub fn write_document(&self, path: impl AsRef<Path>) -> CoreResult<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(&self.to_document())
            .map_err(AnalysisError::Serialization)?;
        std::fs::write(path, json).map_err(|e| AnalysisError::io(path, e))?;
        Ok(())
    }
}
