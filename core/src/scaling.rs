//! Scaling analyzer: how the efficiency gain varies with transfer size.
//!
//! Samples from both transfer types are grouped by exact amount. Only amounts
//! present in both optimization modes produce a point. The optimum is the
//! first point (in ascending amount order) with the largest improvement.

use crate::{
    aggregator::mean,
    comparator::{omit_on_zero, relative_reduction},
    sample::{CostSample, Optimization, PartitionKey, TransferType},
    store::SampleStore,
    types::{to_base_units, Subunits},
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalingPoint {
    pub amount: Subunits,
    pub amount_in_base_units: f64,
    pub optimized_efficiency: f64,
    pub unoptimized_efficiency: f64,
    pub improvement: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalingOptimum {
    pub amount: Subunits,
    pub amount_in_base_units: f64,
    pub improvement: f64,
}

/// Mean total cost of one transfer type at one size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostBySize {
    pub transfer_type: TransferType,
    pub amount: Subunits,
    pub amount_in_base_units: f64,
    pub unoptimized_cost: f64,
    pub optimized_cost: f64,
    pub absolute_saving: f64,
    pub cost_reduction: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScalingAnalysis {
    pub by_amount: Vec<ScalingPoint>,
    pub optimum: Option<ScalingOptimum>,
    pub cost_by_size: Vec<CostBySize>,
}

impl ScalingAnalysis {
    /// No amount was present in both modes.
    pub fn is_empty(&self) -> bool {
        self.by_amount.is_empty()
    }
}

/// Samples keyed by the exact bit pattern of their amount.
struct AmountGroups<'a> {
    groups: HashMap<u64, Vec<&'a CostSample>>,
}

impl<'a> AmountGroups<'a> {
    fn collect(samples: impl Iterator<Item = &'a CostSample>) -> Self {
        let mut groups: HashMap<u64, Vec<&'a CostSample>> = HashMap::new();
        for sample in samples {
            groups.entry(sample.amount.to_bits()).or_default().push(sample);
        }
        Self { groups }
    }

    fn get(&self, amount: Subunits) -> Option<&[&'a CostSample]> {
        self.groups.get(&amount.to_bits()).map(Vec::as_slice)
    }

    fn amounts(&self) -> impl Iterator<Item = Subunits> + '_ {
        self.groups.keys().map(|bits| f64::from_bits(*bits))
    }
}

/// Amounts present in both groupings, ascending.
fn shared_amounts(optimized: &AmountGroups, unoptimized: &AmountGroups) -> Vec<Subunits> {
    let mut amounts: Vec<Subunits> = optimized
        .amounts()
        .filter(|amount| unoptimized.get(*amount).is_some())
        .collect();
    amounts.sort_by(f64::total_cmp);
    amounts
}

pub fn analyze_scaling(store: &SampleStore) -> ScalingAnalysis {
    let optimized = AmountGroups::collect(store.samples_for_mode(Optimization::Optimized));
    let unoptimized = AmountGroups::collect(store.samples_for_mode(Optimization::Unoptimized));

    let by_amount: Vec<ScalingPoint> = shared_amounts(&optimized, &unoptimized)
        .into_iter()
        .filter_map(|amount| {
            let opt = optimized.get(amount)?;
            let unopt = unoptimized.get(amount)?;
            let optimized_efficiency = mean(opt, |s| s.efficiency);
            let unoptimized_efficiency = mean(unopt, |s| s.efficiency);
            Some(ScalingPoint {
                amount,
                amount_in_base_units: to_base_units(amount),
                optimized_efficiency,
                unoptimized_efficiency,
                improvement: optimized_efficiency - unoptimized_efficiency,
            })
        })
        .collect();

    let optimum = find_optimum(&by_amount);
    match &optimum {
        Some(o) => log::info!(
            "Scaling optimum at {:.2} units ({:.2} pp over {} sizes)",
            o.amount_in_base_units,
            o.improvement,
            by_amount.len()
        ),
        None => log::info!("No transfer size present in both modes; scaling analysis empty"),
    }

    ScalingAnalysis {
        by_amount,
        optimum,
        cost_by_size: cost_by_size(store),
    }
}

/// First entry with the maximal improvement.
pub fn find_optimum(points: &[ScalingPoint]) -> Option<ScalingOptimum> {
    let mut best: Option<&ScalingPoint> = None;
    for point in points {
        if best.map_or(true, |b| point.improvement > b.improvement) {
            best = Some(point);
        }
    }
    best.map(|p| ScalingOptimum {
        amount: p.amount,
        amount_in_base_units: p.amount_in_base_units,
        improvement: p.improvement,
    })
}

/// Per transfer type and shared amount: mean total cost in each mode.
fn cost_by_size(store: &SampleStore) -> Vec<CostBySize> {
    let mut rows = Vec::new();
    for transfer_type in TransferType::ALL {
        let optimized = AmountGroups::collect(
            store.samples(PartitionKey::new(Optimization::Optimized, transfer_type)).iter(),
        );
        let unoptimized = AmountGroups::collect(
            store.samples(PartitionKey::new(Optimization::Unoptimized, transfer_type)).iter(),
        );
        for amount in shared_amounts(&optimized, &unoptimized) {
            let (Some(opt), Some(unopt)) = (optimized.get(amount), unoptimized.get(amount)) else {
                continue;
            };
            let optimized_cost = mean(opt, |s| s.total_cost);
            let unoptimized_cost = mean(unopt, |s| s.total_cost);
            let metric = format!("{}.cost_reduction@{amount}", transfer_type.key());
            let cost_reduction =
                omit_on_zero(relative_reduction(&metric, optimized_cost, unoptimized_cost));
            rows.push(CostBySize {
                transfer_type,
                amount,
                amount_in_base_units: to_base_units(amount),
                unoptimized_cost,
                optimized_cost,
                absolute_saving: unoptimized_cost - optimized_cost,
                cost_reduction,
            });
        }
    }
    rows
}
