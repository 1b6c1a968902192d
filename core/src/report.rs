//! Markdown report renderer.
//!
//! Section order is fixed: summary, core metrics, total cost by size,
//! detailed analyses (rent, efficiency, scaling), conclusions. The scaling
//! section is left out when no transfer size had data in both modes.
//!
//! Number formats: efficiencies to one decimal with signed percentage-point
//! deltas, subunit amounts as grouped integers, reductions to one decimal
//! percent. An omitted metric renders as "n/a".

use crate::{
    engine::AnalysisResult,
    error::{AnalysisError, CoreResult},
    sample::{CostType, Optimization, TransferType},
    types::SUBUNITS_PER_UNIT,
};
use chrono::{DateTime, Utc};
use std::fmt::Write;
use std::path::Path;

const NOT_AVAILABLE: &str = "n/a";

// ── Formatting helpers ───────────────────────────────────────────────────────

/// Whole subunits with thousands separators, e.g. `1,069,056`.
pub fn fmt_subunits(value: f64) -> String {
    let rounded = value.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if rounded < 0.0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

pub fn fmt_percent(value: Option<f64>) -> String {
    value.map_or_else(|| NOT_AVAILABLE.to_string(), |v| format!("{v:.1}%"))
}

/// A reduction shown as a signed change: 70.0 -> "-70.0%".
pub fn fmt_reduction(value: Option<f64>) -> String {
    value.map_or_else(
        || NOT_AVAILABLE.to_string(),
        |v| {
            let change = if v == 0.0 { 0.0 } else { -v };
            format!("{change:+.1}%")
        },
    )
}

pub fn fmt_points(value: f64) -> String {
    format!("{value:+.1} pp")
}

fn reduction(optimized: f64, unoptimized: f64) -> Option<f64> {
    (unoptimized > 0.0).then(|| 100.0 * (1.0 - optimized / unoptimized))
}

// ── Rendering ────────────────────────────────────────────────────────────────

pub fn render_markdown(result: &AnalysisResult, generated_at: DateTime<Utc>) -> CoreResult<String> {
    let mut out = String::new();
    write_report(&mut out, result, generated_at)?;
    Ok(out)
}

pub fn write_markdown(result: &AnalysisResult, path: impl AsRef<Path>) -> CoreResult<()> {
    let path = path.as_ref();
    let markdown = render_markdown(result, Utc::now())?;
    std::fs::write(path, markdown).map_err(|e| AnalysisError::io(path, e))?;
    log::info!("Markdown report written to {}", path.display());
    Ok(())
}

fn write_report(out: &mut String, result: &AnalysisResult, generated_at: DateTime<Utc>) -> std::fmt::Result {
    writeln!(out, "# Multi-Hop Transfer Cost Efficiency Report\n")?;
    writeln!(out, "*Date: {}*\n", generated_at.format("%d %B %Y"))?;

    write_summary(out, result)?;
    write_core_metrics(out, result)?;
    write_cost_by_size(out, result)?;

    writeln!(out, "## Detailed Analysis\n")?;
    write_rent_analysis(out, result)?;
    write_efficiency_analysis(out, result)?;
    if !result.scaling.is_empty() {
        write_scaling_analysis(out, result)?;
    }
    write_conclusions(out, result)
}

fn write_summary(out: &mut String, result: &AnalysisResult) -> std::fmt::Result {
    writeln!(out, "## Summary\n")?;
    writeln!(
        out,
        "Optimized transfers deliver {} more of the nominal amount on average \
         and cost {} less in total across both recipient topologies.\n",
        fmt_points(result.average_efficiency_improvement()),
        fmt_percent(result.average_cost_reduction()),
    )
}

fn write_core_metrics(out: &mut String, result: &AnalysisResult) -> std::fmt::Result {
    writeln!(out, "### Core Metrics\n")?;
    writeln!(out, "| Metric | Unoptimized | Optimized | Change |")?;
    writeln!(out, "|--------|-------------|-----------|--------|")?;

    for transfer_type in TransferType::ALL {
        let a = result.for_type(transfer_type);
        writeln!(
            out,
            "| Transfer efficiency ({}) | {:.1}% | {:.1}% | {} |",
            transfer_type.label(),
            a.unoptimized.efficiency,
            a.optimized.efficiency,
            fmt_points(a.improvements.efficiency),
        )?;
    }
    for transfer_type in TransferType::ALL {
        let a = result.for_type(transfer_type);
        let rent = a.improvements.cost_reduction_by_type.get(&CostType::Rent).copied();
        writeln!(
            out,
            "| Rent cost ({}) | {} subunits | {} subunits | {} |",
            transfer_type.label(),
            fmt_subunits(a.unoptimized.cost_breakdown.rent),
            fmt_subunits(a.optimized.cost_breakdown.rent),
            fmt_reduction(rent),
        )?;
    }
    for transfer_type in TransferType::ALL {
        let a = result.for_type(transfer_type);
        let unopt = a.stats(Optimization::Unoptimized).accounts_remaining;
        let opt = a.stats(Optimization::Optimized).accounts_remaining;
        writeln!(
            out,
            "| Remaining accounts ({}) | {unopt:.1} | {opt:.1} | {} |",
            transfer_type.label(),
            fmt_reduction(reduction(opt, unopt)),
        )?;
    }
    writeln!(out)
}

fn write_cost_by_size(out: &mut String, result: &AnalysisResult) -> std::fmt::Result {
    writeln!(out, "### Total Cost by Transfer Size\n")?;
    if result.scaling.cost_by_size.is_empty() {
        return writeln!(out, "No transfer size has samples in both modes.\n");
    }
    writeln!(out, "| Transfer type | Transfer size | Total cost (unopt.) | Total cost (opt.) | Cost reduction |")?;
    writeln!(out, "|---------------|---------------|---------------------|-------------------|----------------|")?;
    for row in &result.scaling.cost_by_size {
        writeln!(
            out,
            "| {} | {:.2} units | {} subunits | {} subunits | {} |",
            row.transfer_type.label(),
            row.amount_in_base_units,
            fmt_subunits(row.unoptimized_cost),
            fmt_subunits(row.optimized_cost),
            fmt_reduction(row.cost_reduction),
        )?;
    }
    writeln!(out)
}

fn write_rent_analysis(out: &mut String, result: &AnalysisResult) -> std::fmt::Result {
    let single = &result.single_recipient;
    let rent = single
        .improvements
        .cost_reduction_by_type
        .get(&CostType::Rent)
        .copied();

    writeln!(out, "### 1. Rent Cost\n")?;
    writeln!(
        out,
        "Prompt reclamation of intermediate accounts changes the rent paid per \
         single-recipient transfer by {}.\n",
        fmt_reduction(rent),
    )?;
    match (single.unoptimized.rent_share(), single.optimized.rent_share()) {
        (Some(before), Some(after)) => writeln!(
            out,
            "Rent's share of the total cost moved from {before:.1}% to {after:.1}%, \
             a change of {}.\n",
            fmt_points(after - before),
        ),
        _ => writeln!(out, "Rent share of total cost is not available.\n"),
    }
}

fn write_efficiency_analysis(out: &mut String, result: &AnalysisResult) -> std::fmt::Result {
    let single = &result.single_recipient;
    let (unopt, opt) = (single.unoptimized.efficiency, single.optimized.efficiency);

    writeln!(out, "### 2. Transfer Efficiency\n")?;
    writeln!(
        out,
        "Efficiency is the share of the nominal amount that reaches the recipients. \
         It moved from {unopt:.1}% to {opt:.1}%:\n",
    )?;
    writeln!(
        out,
        "* a 1-unit transfer now delivers {:.2} units instead of {:.2}",
        opt / 100.0,
        unopt / 100.0,
    )?;
    writeln!(
        out,
        "* a 10-unit transfer delivers an extra {:.2} units\n",
        (opt - unopt) * 10.0 / 100.0,
    )?;
    writeln!(
        out,
        "Multi-wallet transfers differ from single-recipient ones by {} in efficiency gain.\n",
        fmt_points(result.comparison.efficiency_delta),
    )
}

fn write_scaling_analysis(out: &mut String, result: &AnalysisResult) -> std::fmt::Result {
    writeln!(out, "### 3. Scaling\n")?;
    writeln!(out, "| Transfer size (units) | Efficiency gain | Absolute cost saving (single recipient) |")?;
    writeln!(out, "|-----------------------|-----------------|-----------------------------------------|")?;
    for point in &result.scaling.by_amount {
        let saving = result
            .scaling
            .cost_by_size
            .iter()
            .find(|row| row.transfer_type == TransferType::SingleRecipient && row.amount == point.amount)
            .map_or_else(|| NOT_AVAILABLE.to_string(), |row| format!("{} subunits", fmt_subunits(row.absolute_saving)));
        writeln!(
            out,
            "| {:.2} | {} | {saving} |",
            point.amount / SUBUNITS_PER_UNIT,
            fmt_points(point.improvement),
        )?;
    }
    writeln!(out)?;
    if let Some(optimum) = &result.scaling.optimum {
        writeln!(
            out,
            "The largest efficiency gain, {}, occurs at {:.2} units.\n",
            fmt_points(optimum.improvement),
            optimum.amount_in_base_units,
        )?;
    }
    Ok(())
}

fn write_conclusions(out: &mut String, result: &AnalysisResult) -> std::fmt::Result {
    writeln!(out, "## Conclusions\n")?;
    writeln!(
        out,
        "1. **Transfer efficiency**: {} for single-recipient transfers means more value reaches recipients",
        fmt_points(result.single_recipient.improvements.efficiency),
    )?;
    writeln!(
        out,
        "2. **Cost**: average total cost change of {} across topologies",
        fmt_reduction(result.average_cost_reduction()),
    )?;
    writeln!(
        out,
        "3. **Resources**: fewer accounts left behind after each transfer",
    )?;
    writeln!(
        out,
        "4. **Multi-wallet viability**: multi-wallet cost reduction differs by {} from single-recipient",
        result
            .comparison
            .cost_reduction_delta
            .map_or_else(|| NOT_AVAILABLE.to_string(), fmt_points),
    )
}
