//! Flat-file exports: the JSON result document and CSV chart data.
//!
//! Files are written in one call each (open, write, close on every path);
//! a failed export never touches the in-memory result.

use crate::{
    engine::AnalysisResult,
    error::{AnalysisError, CoreResult},
    sample::{CostType, TransferType},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use uuid::Uuid;

pub const SCHEMA_VERSION: &str = "1.0";
pub const ANALYSIS_TYPE: &str = "cost_efficiency";
pub const SCALING_CSV: &str = "efficiency_scaling.csv";
pub const BREAKDOWN_CSV: &str = "cost_breakdown.csv";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportMetadata {
    pub generated_at: DateTime<Utc>,
    pub version: String,
    pub analysis_type: String,
    pub description: String,
    pub run_id: Uuid,
}

impl ExportMetadata {
    pub fn now(description: &str) -> Self {
        Self {
            generated_at: Utc::now(),
            version: SCHEMA_VERSION.to_string(),
            analysis_type: ANALYSIS_TYPE.to_string(),
            description: description.to_string(),
            run_id: Uuid::new_v4(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultDocument {
    pub results: AnalysisResult,
    pub metadata: ExportMetadata,
}

impl ResultDocument {
    pub fn new(results: AnalysisResult, description: &str) -> Self {
        Self {
            results,
            metadata: ExportMetadata::now(description),
        }
    }

    pub fn to_json(&self) -> CoreResult<String> {
        serde_json::to_string_pretty(self).map_err(AnalysisError::Serialization)
    }

    pub fn from_json(json: &str) -> CoreResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn write(&self, path: impl AsRef<Path>) -> CoreResult<()> {
        let path = path.as_ref();
        std::fs::write(path, self.to_json()?).map_err(|e| AnalysisError::io(path, e))?;
        log::info!("Results written to {}", path.display());
        Ok(())
    }

    pub fn read(path: impl AsRef<Path>) -> CoreResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| AnalysisError::io(path, e))?;
        Self::from_json(&content)
    }
}

/// Resolve a caller-supplied export name: append `.{extension}` when missing,
/// and place relative names under `output_dir`.
pub fn resolve_export_path(output_dir: &Path, name: &str, extension: &str) -> PathBuf {
    let suffix = format!(".{extension}");
    let file = if name.ends_with(&suffix) {
        name.to_string()
    } else {
        format!("{name}{suffix}")
    };
    let path = PathBuf::from(file);
    if path.is_absolute() {
        path
    } else {
        output_dir.join(path)
    }
}

// ── Chart data ───────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ScalingRow {
    amount: f64,
    amount_in_base_units: f64,
    optimized_efficiency: f64,
    unoptimized_efficiency: f64,
    improvement: f64,
}

#[derive(Debug, Serialize)]
struct BreakdownRow {
    transfer_type: TransferType,
    cost_type: CostType,
    label: &'static str,
    unoptimized: f64,
    optimized: f64,
    reduction: Option<f64>,
}

/// Write the series a plotting tool needs. Returns the files written.
pub fn write_chart_data(result: &AnalysisResult, output_dir: &Path) -> CoreResult<Vec<PathBuf>> {
    let mut written = Vec::new();

    if !result.scaling.is_empty() {
        let path = output_dir.join(SCALING_CSV);
        let mut writer = csv::Writer::from_path(&path)?;
        for point in &result.scaling.by_amount {
            writer.serialize(ScalingRow {
                amount: point.amount,
                amount_in_base_units: point.amount_in_base_units,
                optimized_efficiency: point.optimized_efficiency,
                unoptimized_efficiency: point.unoptimized_efficiency,
                improvement: point.improvement,
            })?;
        }
        writer.flush().map_err(|e| AnalysisError::io(&path, e))?;
        written.push(path);
    }

    let path = output_dir.join(BREAKDOWN_CSV);
    let mut writer = csv::Writer::from_path(&path)?;
    for transfer_type in TransferType::ALL {
        let analysis = result.for_type(transfer_type);
        for cost_type in CostType::ALL {
            writer.serialize(BreakdownRow {
                transfer_type,
                cost_type,
                label: cost_type.label(),
                unoptimized: analysis.unoptimized.cost_breakdown.get(cost_type),
                optimized: analysis.optimized.cost_breakdown.get(cost_type),
                reduction: analysis.improvements.cost_reduction_by_type.get(&cost_type).copied(),
            })?;
        }
    }
    writer.flush().map_err(|e| AnalysisError::io(&path, e))?;
    written.push(path);

    log::debug!("Chart data written: {written:?}");
    Ok(written)
}
