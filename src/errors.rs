//! Error types produced while editing trench parameters or talking to the field solver.

use thiserror::Error;

use crate::constraints::Field;

/// Error returned when an arrangement name is not recognised.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("unknown arrangement {0:?}; expected trefoil, flat or right-angle")]
pub struct ParseArrangementError(pub String);

/// Reason a proposed parameter edit was discarded.
///
/// A rejected edit leaves the configuration untouched. Clamping is not a rejection: an
/// infeasible but finite value is moved to the nearest feasible one instead.
///
/// # Examples
///
/// ```
/// use trenchx::{apply_edit, EditRejection, ParameterEdit, TrenchConfiguration};
///
/// let config = TrenchConfiguration::default();
/// let outcome = apply_edit(&config, ParameterEdit::CircuitCount(9));
/// assert_eq!(
///     outcome.rejection(),
///     Some(&EditRejection::CircuitCountOutOfRange { requested: 9 })
/// );
/// assert_eq!(outcome.config, config);
/// ```
#[derive(Clone, Copy, Debug, Error, PartialEq)]
pub enum EditRejection {
    /// Returned when the circuit count lies outside `1..=5`.
    #[error("circuit count must be between 1 and 5 (received {requested})")]
    CircuitCountOutOfRange {
        /// Rejected circuit count.
        requested: u32,
    },
    /// Returned when a numeric field receives NaN or an infinite value.
    #[error("{field} must be a finite number (received {value})")]
    NonFinite {
        /// Field that received the value.
        field: Field,
        /// Rejected value.
        value: f64,
    },
    /// Returned when a strictly positive field receives zero or a negative value.
    #[error("{field} must be positive (received {value})")]
    NonPositive {
        /// Field that received the value.
        field: Field,
        /// Rejected value.
        value: f64,
    },
}

/// Error returned when a trench configuration file cannot be loaded.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Returned when the file cannot be read.
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
    /// Returned when the file is not a valid configuration document.
    #[error("failed to parse configuration: {0}")]
    Json(#[from] serde_json::Error),
}

/// Error returned when an external field calculation fails.
///
/// Any of these leaves the previous successful result in place; no partial result is
/// ever exposed.
#[derive(Debug, Error)]
pub enum SolverError {
    /// Returned when the request could not be delivered or the response not read.
    #[error("solver request failed: {0}")]
    Transport(String),
    /// Returned when the solver answers with a non-success status code.
    #[error("solver responded with status {0}")]
    Status(u16),
    /// Returned when the response body is not the expected JSON document.
    #[error("solver response could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),
    /// Returned when the field-map image is not valid base64.
    #[error("field map image is not valid base64: {0}")]
    Image(#[from] base64::DecodeError),
    /// Returned when the decoded field-map image is not a PNG file.
    #[error("field map image is not a PNG file")]
    NotPng,
    /// Returned when the sample series in a response have different lengths.
    #[error(
        "flux series are misaligned (x_coords = {x}, B_0m = {ground}, B_1m = {above})"
    )]
    MisalignedSeries {
        /// Number of x coordinates.
        x: usize,
        /// Number of ground-level samples.
        ground: usize,
        /// Number of samples at the calculation height.
        above: usize,
    },
}

impl From<ureq::Error> for SolverError {
    fn from(error: ureq::Error) -> Self {
        match error {
            ureq::Error::StatusCode(status) => SolverError::Status(status),
            other => SolverError::Transport(other.to_string()),
        }
    }
}
