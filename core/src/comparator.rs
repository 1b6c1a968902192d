//! Comparator: optimized vs unoptimized improvements for one transfer type,
//! and multi-wallet vs single-recipient deltas of those improvements.
//!
//! A ratio with a zero denominator is omitted (`None`, or absent from the
//! per-type map) and logged. It is never reported as 0%.
//!
//! Per-type shares at or below `SAMPLE_TOLERANCE` count as zero: the
//! generator's overhead residual is floating-point noise of that order.

use crate::{
    aggregator::PartitionStats,
    error::{AnalysisError, CoreResult},
    sample::CostType,
    types::SAMPLE_TOLERANCE,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Improvements {
    /// Percentage points, optimized minus unoptimized.
    pub efficiency: f64,
    /// Percent reduction of mean total cost.
    pub cost_reduction: Option<f64>,
    /// Percent reduction of mean time.
    pub time_improvement: Option<f64>,
    /// Only cost types whose unoptimized mean exceeds `SAMPLE_TOLERANCE`.
    pub cost_reduction_by_type: BTreeMap<CostType, f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeComparison {
    pub efficiency_delta: f64,
    pub cost_reduction_delta: Option<f64>,
    pub time_improvement_delta: Option<f64>,
}

/// `100 * (1 - optimized / unoptimized)`.
pub fn relative_reduction(metric: &str, optimized: f64, unoptimized: f64) -> CoreResult<f64> {
    if unoptimized == 0.0 {
        return Err(AnalysisError::DivisionByZero { metric: metric.to_string() });
    }
    Ok(100.0 * (1.0 - optimized / unoptimized))
}

pub(crate) fn omit_on_zero(result: CoreResult<f64>) -> Option<f64> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            log::warn!("{e}; metric omitted");
            None
        }
    }
}

pub fn compare(label: &str, optimized: &PartitionStats, unoptimized: &PartitionStats) -> Improvements {
    let cost_reduction = omit_on_zero(relative_reduction(
        &format!("{label}.cost_reduction"),
        optimized.total_cost,
        unoptimized.total_cost,
    ));
    let time_improvement = omit_on_zero(relative_reduction(
        &format!("{label}.time_improvement"),
        optimized.time_ms,
        unoptimized.time_ms,
    ));

    let cost_reduction_by_type = CostType::ALL
        .into_iter()
        .filter_map(|cost_type| {
            let unopt = unoptimized.cost_breakdown.get(cost_type);
            (unopt > SAMPLE_TOLERANCE).then(|| {
                let opt = optimized.cost_breakdown.get(cost_type);
                (cost_type, 100.0 * (1.0 - opt / unopt))
            })
        })
        .collect();

    Improvements {
        efficiency: optimized.efficiency - unoptimized.efficiency,
        cost_reduction,
        time_improvement,
        cost_reduction_by_type,
    }
}

/// Multi minus single for each improvement metric.
pub fn compare_types(single: &Improvements, multi: &Improvements) -> TypeComparison {
    let delta = |m: Option<f64>, s: Option<f64>| Some(m? - s?);
    TypeComparison {
        efficiency_delta: multi.efficiency - single.efficiency,
        cost_reduction_delta: delta(multi.cost_reduction, single.cost_reduction),
        time_improvement_delta: delta(multi.time_improvement, single.time_improvement),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::CostBreakdown;

    fn stats(total_cost: f64, time_ms: f64, tx_fee: f64) -> PartitionStats {
        PartitionStats {
            sample_count: 3,
            efficiency: 95.0,
            total_cost,
            time_ms,
            cost_breakdown: CostBreakdown {
                tx_fee,
                rent: total_cost - tx_fee,
                compute: 0.0,
                overhead: 0.0,
            },
            accounts_created: 5.0,
            accounts_remaining: 0.0,
        }
    }

    #[test]
    fn equal_costs_give_zero_reduction() {
        let a = stats(1000.0, 100.0, 10.0);
        let improvements = compare("t", &a, &a);
        assert_eq!(improvements.cost_reduction, Some(0.0));
        assert_eq!(improvements.efficiency, 0.0);
    }

    #[test]
    fn lower_optimized_cost_is_positive_reduction() {
        let opt = stats(500.0, 50.0, 10.0);
        let unopt = stats(1000.0, 100.0, 20.0);
        let improvements = compare("t", &opt, &unopt);
        assert_eq!(improvements.cost_reduction, Some(50.0));
        assert_eq!(improvements.time_improvement, Some(50.0));
        assert_eq!(improvements.cost_reduction_by_type.get(&CostType::TxFee), Some(&50.0));
    }

    #[test]
    fn zero_denominator_is_omitted_not_zero() {
        let opt = stats(500.0, 0.0, 10.0);
        let unopt = stats(1000.0, 0.0, 20.0);
        let improvements = compare("t", &opt, &unopt);
        assert_eq!(improvements.time_improvement, None);
        assert!(improvements.cost_reduction.is_some());
        // compute and overhead have zero unoptimized means
        assert!(!improvements.cost_reduction_by_type.contains_key(&CostType::Compute));
        assert!(!improvements.cost_reduction_by_type.contains_key(&CostType::Overhead));
    }

    #[test]
    fn rounding_noise_share_is_omitted() {
        let mut opt = stats(500.0, 50.0, 10.0);
        let mut unopt = stats(1000.0, 100.0, 20.0);
        opt.cost_breakdown.overhead = 9.3e-12;
        unopt.cost_breakdown.overhead = 5.59e-11;
        let improvements = compare("t", &opt, &unopt);
        assert!(!improvements.cost_reduction_by_type.contains_key(&CostType::Overhead));
        assert!(improvements.cost_reduction_by_type.contains_key(&CostType::Rent));
    }

    #[test]
    fn relative_reduction_reports_division_by_zero() {
        let err = relative_reduction("x", 1.0, 0.0).unwrap_err();
        assert!(matches!(err, AnalysisError::DivisionByZero { ref metric } if metric == "x"));
    }

    #[test]
    fn type_deltas_propagate_omission() {
        let single = compare("s", &stats(500.0, 50.0, 10.0), &stats(1000.0, 100.0, 20.0));
        let multi = compare("m", &stats(400.0, 0.0, 10.0), &stats(1000.0, 0.0, 20.0));
        let comparison = compare_types(&single, &multi);
        assert_eq!(comparison.efficiency_delta, 0.0);
        assert!((comparison.cost_reduction_delta.unwrap() - 10.0).abs() < 1e-9);
        assert_eq!(comparison.time_improvement_delta, None);
    }
}
