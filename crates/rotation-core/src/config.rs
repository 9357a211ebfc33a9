use serde::{Deserialize, Serialize};

use crate::error::RotationError;
use crate::types::{Benchmark, SectorRollup, WeightScheme};

/// Immutable per-run configuration, constructed once and passed explicitly
/// to every component.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RotationConfig {
    /// Rolling z-score window for RS-Ratio and RS-Momentum
    pub window: usize,
    /// Number of trailing rotation points to keep (the trajectory tail)
    pub tail: usize,
    /// Stock-level weighting scheme for industry index construction
    pub weighting: WeightScheme,
    /// Rebase each constituent to 100 at the first common date before
    /// blending. Turning this off is only meaningful under `CapWeight`,
    /// which then blends raw price levels.
    pub rebase_constituents: bool,
    /// How industry indices combine into a sector index
    pub sector_rollup: SectorRollup,
    /// Constituents whose latest close is below this floor are discarded
    pub min_price: f64,
    /// Market-wide benchmark identifiers
    pub benchmark: Benchmark,
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            window: 14,
            tail: 6,
            weighting: WeightScheme::SqrtCapWeight,
            rebase_constituents: true,
            sector_rollup: SectorRollup::EqualWeight,
            min_price: 0.0,
            benchmark: Benchmark::default(),
        }
    }
}

impl RotationConfig {
    /// Validate once at the start of a run. Configuration problems are the
    /// only fatal errors in the pipeline; everything downstream degrades to
    /// empty results instead.
    pub fn validate(&self) -> Result<(), RotationError> {
        if self.window < 2 {
            return Err(RotationError::InvalidConfig(format!(
                "window must be at least 2, got {}",
                self.window
            )));
        }
        if self.tail == 0 {
            return Err(RotationError::InvalidConfig(
                "tail must be at least 1".to_string(),
            ));
        }
        if self.min_price < 0.0 || !self.min_price.is_finite() {
            return Err(RotationError::InvalidConfig(format!(
                "min_price must be a non-negative number, got {}",
                self.min_price
            )));
        }
        if self.benchmark.primary.is_empty() {
            return Err(RotationError::InvalidConfig(
                "primary benchmark symbol must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
