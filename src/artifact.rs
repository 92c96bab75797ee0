//! Artifact stats: CRIT Value calculation and validation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum CRIT Value an artifact can roll.
pub const MAX_CV: f64 = 54.6;

/// One submitted artifact. `cv` is always derived from the two stats.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Artifact {
    crit_rate: f64,
    crit_dmg: f64,
    cv: f64,
}

impl Artifact {
    /// Validates the stats and builds the artifact.
    pub fn new(crit_rate: f64, crit_dmg: f64) -> Result<Self, ValidationError> {
        let (crit_rate, crit_dmg) = validate_artifact_stats(crit_rate, crit_dmg)?;
        Ok(Self {
            crit_rate,
            crit_dmg,
            cv: calculate_cv(crit_rate, crit_dmg),
        })
    }

    /// Placeholder stored when a scanned artifact fails validation.
    pub fn zeroed() -> Self {
        Self {
            crit_rate: 0.0,
            crit_dmg: 0.0,
            cv: 0.0,
        }
    }

    pub fn crit_rate(&self) -> f64 {
        self.crit_rate
    }

    pub fn crit_dmg(&self) -> f64 {
        self.crit_dmg
    }

    pub fn cv(&self) -> f64 {
        self.cv
    }

    /// Re-derives `cv` from the stats, for artifacts read back from disk.
    pub(crate) fn recompute_cv(&mut self) {
        self.cv = calculate_cv(self.crit_rate, self.crit_dmg);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ValidationError {
    #[error("CRIT Rate and CRIT DMG must be numbers.")]
    NotANumber,
    #[error("CRIT Rate and CRIT DMG cannot be negative.")]
    Negative,
    #[error("CRIT Value cannot exceed 54.6. Submitted CV = {cv:.1}.")]
    ExceedsMax { cv: f64 },
}

impl ValidationError {
    /// The submitted CV rounded to one decimal, as shown in the message.
    pub fn reported_cv(&self) -> Option<f64> {
        match self {
            ValidationError::NotANumber | ValidationError::Negative => None,
            ValidationError::ExceedsMax { cv } => Some((cv * 10.0).round() / 10.0),
        }
    }
}

/// CRIT Value: CRIT Rate counts double.
pub fn calculate_cv(crit_rate: f64, crit_dmg: f64) -> f64 {
    crit_rate * 2.0 + crit_dmg
}

/// Checks CRIT Rate and CRIT DMG. Out-of-range values are rejected, never clamped.
pub fn validate_artifact_stats(
    crit_rate: f64,
    crit_dmg: f64,
) -> Result<(f64, f64), ValidationError> {
    if !crit_rate.is_finite() || !crit_dmg.is_finite() {
        return Err(ValidationError::NotANumber);
    }
    if crit_rate < 0.0 || crit_dmg < 0.0 {
        return Err(ValidationError::Negative);
    }

    let cv = calculate_cv(crit_rate, crit_dmg);
    if cv > MAX_CV {
        return Err(ValidationError::ExceedsMax { cv });
    }

    Ok((crit_rate, crit_dmg))
}
