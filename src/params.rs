//! Parameter set — weights, thresholds, rates, bias and step count for one run.
//!
//! # Invariants
//!
//! - Supplied once per run and shared read-only by every segment evaluation.
//! - The engine never validates. [`ParameterSet::validate`] is an optional layer
//!   for callers that want the contract checked (`theta_on ≥ theta_off`, rates in
//!   [0, 1], everything finite).
//! - `steps` is signed: N ≤ 0 is legal and degenerates to the zero state.

use core::fmt;

use crate::error::ParamError;

/// Default step count.
pub const DEFAULT_STEPS: i32 = 12;

/// Weights, hysteresis thresholds, gain/decay rates, bias and step count.
///
/// Defaults reproduce the published measurement run:
/// `w_a=1, w_b=1, w_cond=1.5, w_g=1, theta_on=1.2, theta_off=0.6,
/// k_gen_*=0.35, k_dec_*=0.15, g=0, steps=12`.
///
/// Override individual fields with struct-update syntax:
///
/// ```rust
/// use dg_core::params::ParameterSet;
///
/// let strict = ParameterSet { theta_on: 2.0, ..ParameterSet::default() };
/// assert_eq!(strict.theta_off, 0.6);
/// ```
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ParameterSet {
    /// Weight of the channel A accumulator in the potential.
    pub w_a: f64,
    /// Weight of the channel B accumulator in the potential.
    pub w_b: f64,
    /// Weight of the condition flag in the potential.
    pub w_cond: f64,
    /// Weight of the constant bias term in the potential.
    pub w_g: f64,
    /// Potential at or above which the decision switches on.
    pub theta_on: f64,
    /// Potential at or below which the decision switches off.
    pub theta_off: f64,
    /// Channel A gain per step.
    pub k_gen_a: f64,
    /// Channel A decay per step.
    pub k_dec_a: f64,
    /// Channel B gain per step.
    pub k_gen_b: f64,
    /// Channel B decay per step.
    pub k_dec_b: f64,
    /// Constant bias `G`.
    pub g: f64,
    /// Number of discrete steps in the dynamic run.
    pub steps: i32,
}

impl ParameterSet {
    /// Construct the default parameter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check the caller contract. Returns the first violation found.
    ///
    /// Legal but degenerate settings (`steps ≤ 0`, `theta_on == theta_off`) pass
    /// and are logged at `warn`.
    pub fn validate(&self) -> Result<(), ParamError> {
        for (name, value) in self.named_values() {
            if !value.is_finite() {
                return Err(ParamError::NonFinite { name });
            }
        }

        let rates = [
            ("k_gen_a", self.k_gen_a),
            ("k_dec_a", self.k_dec_a),
            ("k_gen_b", self.k_gen_b),
            ("k_dec_b", self.k_dec_b),
        ];
        for (name, value) in rates {
            if !(0.0..=1.0).contains(&value) {
                return Err(ParamError::RateOutOfRange { name, value });
            }
        }

        if self.theta_on < self.theta_off {
            return Err(ParamError::InvertedBand {
                theta_on: self.theta_on,
                theta_off: self.theta_off,
            });
        }

        if self.theta_on == self.theta_off {
            log::warn!(
                "theta_on == theta_off ({}): hysteresis collapses to a single threshold",
                self.theta_on
            );
        }
        if self.steps <= 0 {
            log::warn!(
                "steps={}: dynamic decisions stay at the zero state",
                self.steps
            );
        }
        Ok(())
    }

    /// Load a parameter set from JSON and validate it.
    ///
    /// Missing fields take their default value.
    #[cfg(all(feature = "serde", feature = "std"))]
    pub fn from_json(doc: &str) -> Result<Self, crate::error::ConfigError> {
        let params: Self = serde_json::from_str(doc)?;
        params.validate()?;
        Ok(params)
    }

    fn named_values(&self) -> [(&'static str, f64); 11] {
        [
            ("w_a", self.w_a),
            ("w_b", self.w_b),
            ("w_cond", self.w_cond),
            ("w_g", self.w_g),
            ("theta_on", self.theta_on),
            ("theta_off", self.theta_off),
            ("k_gen_a", self.k_gen_a),
            ("k_dec_a", self.k_dec_a),
            ("k_gen_b", self.k_gen_b),
            ("k_dec_b", self.k_dec_b),
            ("g", self.g),
        ]
    }
}

impl Default for ParameterSet {
    fn default() -> Self {
        Self {
            w_a: 1.0,
            w_b: 1.0,
            w_cond: 1.5,
            w_g: 1.0,
            theta_on: 1.2,
            theta_off: 0.6,
            k_gen_a: 0.35,
            k_dec_a: 0.15,
            k_gen_b: 0.35,
            k_dec_b: 0.15,
            g: 0.0,
            steps: DEFAULT_STEPS,
        }
    }
}

/// Reproducibility echo: `w_a=1.0,w_b=1.0,...,g=0.0`. Values always carry a
/// decimal point. The step count is reported separately on each result.
impl fmt::Display for ParameterSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (name, value)) in self.named_values().iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}={:?}", name, value)?;
        }
        Ok(())
    }
}
