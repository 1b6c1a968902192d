//! Analysis configuration: generator range, cost-model constants and the
//! sufficiency threshold.
//!
//! Every field has a default, so a config file only needs the values it
//! overrides. The defaults reproduce the reference cost model exactly.

use crate::{
    sample::Optimization,
    types::{from_base_units, Subunits, HOP_COUNT},
};
use serde::{Deserialize, Serialize};

pub const DEFAULT_MIN_SAMPLES_PER_PARTITION: usize = 3;

// ── Generator range ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Smallest transfer amount, in subunits.
    pub min_amount: Subunits,
    /// Largest transfer amount, in subunits.
    pub max_amount: Subunits,
    /// Number of evenly spaced transfer sizes between min and max (inclusive).
    pub steps: usize,
    /// Recipient count used for the multi-wallet topology.
    pub multi_recipients: u32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            min_amount: from_base_units(0.01),
            max_amount: from_base_units(10.0),
            steps: 10,
            multi_recipients: 6,
        }
    }
}

// ── Cost model ───────────────────────────────────────────────────────────────

/// Constants of one optimization mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModeParameters {
    /// tx_fee = base_tx_fee * (1 + tx_fee_per_recipient * recipients)
    pub tx_fee_per_recipient: f64,
    pub compute_base: f64,
    pub compute_per_recipient: f64,
    /// Fraction of base_rent held per hop.
    pub rent_factor: f64,
    /// Fraction of the nominal amount that reaches the recipients.
    pub received_ratio: f64,
    pub time_base_ms: f64,
    pub time_per_recipient_ms: f64,
    /// Accounts left behind after the transfer completes.
    pub accounts_remaining: u32,
}

impl ModeParameters {
    pub fn optimized() -> Self {
        Self {
            tx_fee_per_recipient: 0.05,
            compute_base: 200_000.0,
            compute_per_recipient: 10_000.0,
            rent_factor: 0.3,
            received_ratio: 0.98,
            time_base_ms: 1500.0,
            time_per_recipient_ms: 50.0,
            accounts_remaining: 0,
        }
    }

    pub fn unoptimized() -> Self {
        Self {
            tx_fee_per_recipient: 0.1,
            compute_base: 220_000.0,
            compute_per_recipient: 15_000.0,
            rent_factor: 1.0,
            received_ratio: 0.92,
            time_base_ms: 1700.0,
            time_per_recipient_ms: 100.0,
            accounts_remaining: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostModel {
    pub base_tx_fee: f64,
    pub base_rent: f64,
    pub hop_count: u32,
    pub optimized: ModeParameters,
    pub unoptimized: ModeParameters,
}

impl CostModel {
    pub fn mode(&self, optimization: Optimization) -> &ModeParameters {
        match optimization {
            Optimization::Optimized   => &self.optimized,
            Optimization::Unoptimized => &self.unoptimized,
        }
    }
}

impl Default for CostModel {
    fn default() -> Self {
        Self {
            base_tx_fee: 5000.0,
            base_rent: 890_880.0,
            hop_count: HOP_COUNT,
            optimized: ModeParameters::optimized(),
            unoptimized: ModeParameters::unoptimized(),
        }
    }
}

// ── Top-level config ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub generator: GeneratorConfig,
    pub cost_model: CostModel,
    /// Every partition needs at least this many samples before analysis runs.
    pub min_samples_per_partition: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            generator: GeneratorConfig::default(),
            cost_model: CostModel::default(),
            min_samples_per_partition: DEFAULT_MIN_SAMPLES_PER_PARTITION,
        }
    }
}

impl AnalysisConfig {
    /// Load from a JSON config file.
    /// In tests, use AnalysisConfig::default_test().
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: AnalysisConfig = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))?;
        config.check()?;
        Ok(config)
    }

    /// Small fixture: three sizes between 1 and 3 base units.
    pub fn default_test() -> Self {
        Self {
            generator: GeneratorConfig {
                min_amount: from_base_units(1.0),
                max_amount: from_base_units(3.0),
                steps: 3,
                multi_recipients: 6,
            },
            ..Self::default()
        }
    }

    /// Reject configs that would break sample or analysis invariants.
    /// `load` calls this; callers that edit a config afterwards call it again.
    pub fn check(&self) -> anyhow::Result<()> {
        let g = &self.generator;
        if !(g.min_amount > 0.0 && g.max_amount >= g.min_amount) {
            anyhow::bail!(
                "generator range invalid: min_amount={} max_amount={}",
                g.min_amount,
                g.max_amount
            );
        }
        if g.multi_recipients == 0 {
            anyhow::bail!("generator.multi_recipients must be at least 1");
        }
        if self.cost_model.hop_count == 0 {
            anyhow::bail!("cost_model.hop_count must be at least 1");
        }
        if self.min_samples_per_partition == 0 {
            anyhow::bail!("min_samples_per_partition must be at least 1");
        }
        Ok(())
    }
}
