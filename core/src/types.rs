//! Shared primitive types used across the analysis.

/// An amount in the smallest indivisible unit of the transferred value.
/// Held as `f64` because cost models produce fractional shares.
pub type Subunits = f64;

/// 1 base unit = 1,000,000,000 subunits.
pub const SUBUNITS_PER_UNIT: f64 = 1_000_000_000.0;

/// Relay steps per transfer in the simulated model.
pub const HOP_COUNT: u32 = 4;

/// Absolute tolerance used by every sample invariant check.
pub const SAMPLE_TOLERANCE: f64 = 1e-6;

/// Convert a subunit amount to base units.
pub fn to_base_units(amount: Subunits) -> f64 {
    amount / SUBUNITS_PER_UNIT
}

/// Convert base units to (whole) subunits.
pub fn from_base_units(units: f64) -> Subunits {
    (units * SUBUNITS_PER_UNIT).round()
}
