//! Cost-to-likelihood conversion.
//!
//! Plan costs become probability mass through a Boltzmann-style model:
//! each branch gets the unnormalized weight `exp(-beta * cost)` (with
//! `exp(-beta * inf) = 0`) and the pair is normalized to sum to one. The
//! rationality parameter beta expresses how close to optimal the observed
//! agent is assumed to act: beta -> 0 flattens the pair toward (0.5, 0.5),
//! beta -> inf sends the cheaper branch's likelihood to 1.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Validated rationality/noise parameter. Must be finite and > 0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Beta(f64);

impl Beta {
    /// Creates a beta value.
    ///
    /// # Errors
    /// Returns [`ValidationError::BetaNotPositive`] unless `value` is
    /// finite and strictly positive.
    pub fn new(value: f64) -> Result<Self, ValidationError> {
        if !value.is_finite() || value <= 0.0 {
            return Err(ValidationError::BetaNotPositive { value });
        }
        Ok(Self(value))
    }

    /// Returns the raw value.
    #[must_use]
    pub const fn value(self) -> f64 {
        self.0
    }
}

impl Default for Beta {
    fn default() -> Self {
        Self(1.0)
    }
}

impl fmt::Display for Beta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The likelihood pair delivered for one recognition request, together with
/// the costs it was derived from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Likelihoods {
    /// Likelihood that the observed behavior is explained by the goal.
    pub compliant: f64,
    /// Likelihood of reaching the goal while ignoring the observations.
    pub not_compliant: f64,
    /// Optimal cost of the observation-compliant problem (inf if unsolvable).
    pub compliant_cost: f64,
    /// Optimal cost of the unconstrained problem (inf if unsolvable).
    pub not_compliant_cost: f64,
}

impl Likelihoods {
    /// Returns false when both branches were unsolvable: the pair is
    /// (0, 0) and the hypothesis contributes no probability mass. Callers
    /// must exclude such a goal rather than read the zeros as a split.
    #[must_use]
    pub fn is_supported(&self) -> bool {
        self.compliant_cost.is_finite() || self.not_compliant_cost.is_finite()
    }
}

/// Converts the two recorded plan costs into a normalized likelihood pair.
///
/// Computed via the cost gap rather than raw `exp(-beta * cost)` weights so
/// that large (but finite) costs cannot underflow both weights to zero:
/// `L_comp = 1 / (1 + exp(beta * (c_comp - c_not)))` when both costs are
/// finite, which is algebraically the normalized Boltzmann pair.
#[must_use]
pub fn likelihood_pair(beta: Beta, compliant_cost: f64, not_compliant_cost: f64) -> Likelihoods {
    let (compliant, not_compliant) = match (
        compliant_cost.is_finite(),
        not_compliant_cost.is_finite(),
    ) {
        (false, false) => (0.0, 0.0),
        (true, false) => (1.0, 0.0),
        (false, true) => (0.0, 1.0),
        (true, true) => {
            let gap = beta.value() * (compliant_cost - not_compliant_cost);
            // exp(gap) overflows for gap >~ 710; saturate instead.
            let compliant = if gap > f64::MAX.ln() {
                0.0
            } else {
                1.0 / (1.0 + gap.exp())
            };
            (compliant, 1.0 - compliant)
        }
    };

    Likelihoods {
        compliant,
        not_compliant,
        compliant_cost,
        not_compliant_cost,
    }
}
