//! Sample model: one simulated or observed transfer and its partition key.
//!
//! Ingested samples pass `RawCostSample::into_sample`, which validates.
//! Generated samples come from a checked `AnalysisConfig` and are asserted
//! valid in debug builds. Either way every sample in the store satisfies:
//!   - total_cost equals the sum of its breakdown
//!   - efficiency equals received_amount / amount * 100
//!   - 0 <= received_amount <= amount

use crate::{
    error::SampleDefect,
    types::{Subunits, SAMPLE_TOLERANCE},
};
use serde::{Deserialize, Serialize};
use std::fmt;

// ── Cost types ───────────────────────────────────────────────────────────────

/// Closed set of cost categories a transfer can incur.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostType {
    TxFee,
    Rent,
    Compute,
    Overhead,
}

impl CostType {
    pub const ALL: [CostType; 4] = [
        CostType::TxFee,
        CostType::Rent,
        CostType::Compute,
        CostType::Overhead,
    ];

    /// Stable machine key, identical to the serialized form.
    pub fn key(self) -> &'static str {
        match self {
            CostType::TxFee    => "tx_fee",
            CostType::Rent     => "rent",
            CostType::Compute  => "compute",
            CostType::Overhead => "overhead",
        }
    }

    /// Human-readable label for reports and chart data.
    pub fn label(self) -> &'static str {
        match self {
            CostType::TxFee    => "Transaction fees",
            CostType::Rent     => "Account rent",
            CostType::Compute  => "Compute units",
            CostType::Overhead => "Protocol overhead",
        }
    }
}

impl fmt::Display for CostType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Per-cost-type shares of a total cost.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub tx_fee: f64,
    pub rent: f64,
    pub compute: f64,
    pub overhead: f64,
}

impl CostBreakdown {
    pub fn get(&self, cost_type: CostType) -> f64 {
        match cost_type {
            CostType::TxFee    => self.tx_fee,
            CostType::Rent     => self.rent,
            CostType::Compute  => self.compute,
            CostType::Overhead => self.overhead,
        }
    }

    pub fn set(&mut self, cost_type: CostType, value: f64) {
        match cost_type {
            CostType::TxFee    => self.tx_fee = value,
            CostType::Rent     => self.rent = value,
            CostType::Compute  => self.compute = value,
            CostType::Overhead => self.overhead = value,
        }
    }

    pub fn total(&self) -> f64 {
        CostType::ALL.iter().map(|t| self.get(*t)).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (CostType, f64)> + '_ {
        CostType::ALL.iter().map(move |t| (*t, self.get(*t)))
    }
}

// ── Partition key ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Optimization {
    Optimized,
    Unoptimized,
}

impl Optimization {
    pub const ALL: [Optimization; 2] = [Optimization::Optimized, Optimization::Unoptimized];

    pub fn key(self) -> &'static str {
        match self {
            Optimization::Optimized   => "optimized",
            Optimization::Unoptimized => "unoptimized",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferType {
    SingleRecipient,
    MultiWallet,
}

impl TransferType {
    pub const ALL: [TransferType; 2] = [TransferType::SingleRecipient, TransferType::MultiWallet];

    pub fn key(self) -> &'static str {
        match self {
            TransferType::SingleRecipient => "single_recipient",
            TransferType::MultiWallet     => "multi_wallet",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TransferType::SingleRecipient => "Single-Recipient",
            TransferType::MultiWallet     => "Multi-Wallet",
        }
    }
}

/// (optimization mode × transfer type) bucket of samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PartitionKey {
    pub optimization: Optimization,
    pub transfer_type: TransferType,
}

impl PartitionKey {
    pub const fn new(optimization: Optimization, transfer_type: TransferType) -> Self {
        Self { optimization, transfer_type }
    }

    /// All four partitions, transfer type major.
    pub fn all() -> [PartitionKey; 4] {
        [
            PartitionKey::new(Optimization::Optimized, TransferType::SingleRecipient),
            PartitionKey::new(Optimization::Unoptimized, TransferType::SingleRecipient),
            PartitionKey::new(Optimization::Optimized, TransferType::MultiWallet),
            PartitionKey::new(Optimization::Unoptimized, TransferType::MultiWallet),
        ]
    }
}

impl fmt::Display for PartitionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.transfer_type.key(), self.optimization.key())
    }
}

// ── CostSample ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostSample {
    pub amount: Subunits,
    pub recipient_count: u32,
    pub total_cost: Subunits,
    pub received_amount: Subunits,
    pub efficiency: f64,
    pub time_ms: f64,
    pub cost_breakdown: CostBreakdown,
    pub accounts_created: u32,
    pub accounts_remaining: u32,
}

impl CostSample {
    /// Efficiency in percent for a given received/nominal pair.
    pub fn efficiency_of(received_amount: Subunits, amount: Subunits) -> f64 {
        received_amount / amount * 100.0
    }

    /// Check every structural invariant of a sample.
    pub fn validate(&self) -> Result<(), SampleDefect> {
        let fail = |msg: String| Err(SampleDefect::Invariant(msg));

        if !(self.amount.is_finite() && self.amount > 0.0) {
            return fail(format!("amount must be positive, got {}", self.amount));
        }
        if self.recipient_count == 0 {
            return fail("recipient_count must be at least 1".into());
        }
        if !(self.total_cost.is_finite() && self.total_cost > 0.0) {
            return fail(format!("total_cost must be positive, got {}", self.total_cost));
        }
        for (cost_type, share) in self.cost_breakdown.iter() {
            if !share.is_finite() || share < -SAMPLE_TOLERANCE {
                return fail(format!("cost_breakdown.{cost_type} must be non-negative, got {share}"));
            }
        }
        let breakdown_sum = self.cost_breakdown.total();
        if (self.total_cost - breakdown_sum).abs() > SAMPLE_TOLERANCE * self.total_cost.max(1.0) {
            return fail(format!(
                "total_cost {} does not match cost_breakdown sum {}",
                self.total_cost, breakdown_sum
            ));
        }
        if !(self.received_amount >= 0.0 && self.received_amount <= self.amount) {
            return fail(format!(
                "received_amount {} outside [0, {}]",
                self.received_amount, self.amount
            ));
        }
        let expected = Self::efficiency_of(self.received_amount, self.amount);
        if (self.efficiency - expected).abs() > SAMPLE_TOLERANCE {
            return fail(format!(
                "efficiency {} inconsistent with received/amount ({expected})",
                self.efficiency
            ));
        }
        if !(self.time_ms.is_finite() && self.time_ms >= 0.0) {
            return fail(format!("time_ms must be non-negative, got {}", self.time_ms));
        }
        Ok(())
    }
}

// ── Raw ingestion records ────────────────────────────────────────────────────

/// Breakdown as found in external documents. Missing keys count as zero,
/// unknown keys are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawCostBreakdown {
    #[serde(default)]
    pub tx_fee: Option<f64>,
    #[serde(default)]
    pub rent: Option<f64>,
    #[serde(default)]
    pub compute: Option<f64>,
    #[serde(default)]
    pub overhead: Option<f64>,
}

/// A sample-shaped record from an external document, before validation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawCostSample {
    pub amount: Option<f64>,
    pub recipient_count: Option<u32>,
    pub total_cost: Option<f64>,
    pub received_amount: Option<f64>,
    pub efficiency: Option<f64>,
    pub time_ms: Option<f64>,
    pub cost_breakdown: Option<RawCostBreakdown>,
    pub accounts_created: Option<u32>,
    pub accounts_remaining: Option<u32>,
}

impl RawCostSample {
    /// Apply defaulting rules and validate.
    ///
    /// `amount`, `recipient_count` and `cost_breakdown` are load-bearing and
    /// must be present. Account telemetry defaults to zero, `total_cost` to
    /// the breakdown sum, and `received_amount` is derived from `efficiency`
    /// when only the latter is given.
    pub fn into_sample(self) -> Result<CostSample, SampleDefect> {
        let amount = self.amount.ok_or(SampleDefect::MissingField("amount"))?;
        let recipient_count = self
            .recipient_count
            .ok_or(SampleDefect::MissingField("recipient_count"))?;
        let raw_breakdown = self
            .cost_breakdown
            .ok_or(SampleDefect::MissingField("cost_breakdown"))?;

        let cost_breakdown = CostBreakdown {
            tx_fee: raw_breakdown.tx_fee.unwrap_or(0.0),
            rent: raw_breakdown.rent.unwrap_or(0.0),
            compute: raw_breakdown.compute.unwrap_or(0.0),
            overhead: raw_breakdown.overhead.unwrap_or(0.0),
        };

        let received_amount = match (self.received_amount, self.efficiency) {
            (Some(received), _) => received,
            (None, Some(efficiency)) => amount * efficiency / 100.0,
            (None, None) => return Err(SampleDefect::MissingField("received_amount")),
        };

        let sample = CostSample {
            amount,
            recipient_count,
            total_cost: self.total_cost.unwrap_or_else(|| cost_breakdown.total()),
            received_amount,
            efficiency: self
                .efficiency
                .unwrap_or_else(|| CostSample::efficiency_of(received_amount, amount)),
            time_ms: self.time_ms.unwrap_or(0.0),
            cost_breakdown,
            accounts_created: self.accounts_created.unwrap_or(0),
            accounts_remaining: self.accounts_remaining.unwrap_or(0),
        };
        sample.validate()?;
        Ok(sample)
    }
}
