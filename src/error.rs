//! Error types for the layers around the engine.
//!
//! The engine itself has no error path. These types belong to the optional
//! parameter validation, schema resolution and configuration loading.

use alloc::string::String;

use thiserror::Error;

/// A parameter set that breaks the caller contract.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParamError {
    /// The on-threshold is below the off-threshold; the dead-band is inverted.
    #[error("inverted hysteresis band: theta_on={theta_on} < theta_off={theta_off}")]
    InvertedBand {
        /// Configured on-threshold.
        theta_on: f64,
        /// Configured off-threshold.
        theta_off: f64,
    },

    /// A gain or decay rate lies outside [0, 1].
    #[error("rate {name}={value} outside [0, 1]")]
    RateOutOfRange {
        /// Parameter name as echoed in the parameter string.
        name: &'static str,
        /// Offending value.
        value: f64,
    },

    /// A parameter is NaN or infinite.
    #[error("parameter {name} is not finite")]
    NonFinite {
        /// Parameter name as echoed in the parameter string.
        name: &'static str,
    },
}

/// Failure resolving a column schema against a set of field names.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    /// A regular-expression fallback in the schema does not compile.
    #[error("invalid fallback pattern for {field}: /{pattern}/ ({reason})")]
    InvalidPattern {
        /// Canonical field the pattern belongs to.
        field: &'static str,
        /// The pattern as written.
        pattern: String,
        /// Compiler message.
        reason: String,
    },
}

/// Failure loading a parameter set from a JSON document.
#[cfg(all(feature = "serde", feature = "std"))]
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The document is not valid JSON or has wrongly typed fields.
    #[error("parameter document is malformed: {0}")]
    Parse(#[from] serde_json::Error),

    /// The document parsed but the parameter set fails validation.
    #[error("parameter set rejected: {0}")]
    Invalid(#[from] ParamError),
}
