//! Aggregator: per-partition means.
//!
//! Precondition: the partition is non-empty. The engine enforces this through
//! `SampleStore::check_sufficient` before any aggregation runs.

use crate::sample::{CostBreakdown, CostSample, CostType};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartitionStats {
    pub sample_count: usize,
    pub efficiency: f64,
    pub total_cost: f64,
    pub time_ms: f64,
    pub cost_breakdown: CostBreakdown,
    pub accounts_created: f64,
    pub accounts_remaining: f64,
}

impl PartitionStats {
    /// Arithmetic means over `samples`, in slice order.
    pub fn from_samples(samples: &[CostSample]) -> Self {
        debug_assert!(!samples.is_empty(), "aggregating an empty partition");

        let mut cost_breakdown = CostBreakdown::default();
        for cost_type in CostType::ALL {
            cost_breakdown.set(cost_type, mean(samples, |s| s.cost_breakdown.get(cost_type)));
        }

        Self {
            sample_count: samples.len(),
            efficiency: mean(samples, |s| s.efficiency),
            total_cost: mean(samples, |s| s.total_cost),
            time_ms: mean(samples, |s| s.time_ms),
            cost_breakdown,
            accounts_created: mean(samples, |s| f64::from(s.accounts_created)),
            accounts_remaining: mean(samples, |s| f64::from(s.accounts_remaining)),
        }
    }

    /// Share of rent in the mean total cost, in percent.
    pub fn rent_share(&self) -> Option<f64> {
        (self.total_cost > 0.0).then(|| self.cost_breakdown.rent / self.total_cost * 100.0)
    }
}

pub(crate) fn mean<T>(items: &[T], value: impl Fn(&T) -> f64) -> f64 {
    let sum: f64 = items.iter().map(value).sum();
    sum / items.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(efficiency: f64, total_cost: f64) -> CostSample {
        CostSample {
            amount: 100.0,
            recipient_count: 1,
            total_cost,
            received_amount: efficiency,
            efficiency,
            time_ms: 10.0,
            cost_breakdown: CostBreakdown {
                tx_fee: total_cost,
                ..CostBreakdown::default()
            },
            accounts_created: 5,
            accounts_remaining: 1,
        }
    }

    #[test]
    fn single_element_mean_is_exact() {
        let s = sample(97.123456789, 12345.6789);
        let stats = PartitionStats::from_samples(std::slice::from_ref(&s));
        assert_eq!(stats.efficiency, s.efficiency);
        assert_eq!(stats.total_cost, s.total_cost);
        assert_eq!(stats.time_ms, s.time_ms);
        assert_eq!(stats.cost_breakdown, s.cost_breakdown);
        assert_eq!(stats.accounts_remaining, 1.0);
        assert_eq!(stats.sample_count, 1);
    }

    #[test]
    fn means_over_partition() {
        let stats = PartitionStats::from_samples(&[sample(90.0, 100.0), sample(96.0, 300.0)]);
        assert_eq!(stats.efficiency, 93.0);
        assert_eq!(stats.total_cost, 200.0);
        assert_eq!(stats.cost_breakdown.tx_fee, 200.0);
        assert_eq!(stats.cost_breakdown.rent, 0.0);
    }
}
