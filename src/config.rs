//! Trench configuration owned by an editing session.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::arrangement::Arrangement;
use crate::errors::ConfigError;

/// Largest number of circuits a trench may hold.
pub const MAX_CIRCUITS: u32 = 5;

/// Transverse window sampled by the field solver, in metres.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalculationArea {
    /// Half width of the window; samples run from `-x_half_width` to `x_half_width`.
    #[serde(rename = "xVal")]
    pub x_half_width: f64,
    /// Upper edge of the window above ground.
    #[serde(rename = "yMax")]
    pub y_max: f64,
    /// Lower edge of the window, negative below ground.
    #[serde(rename = "yMin")]
    pub y_min: f64,
}

impl Default for CalculationArea {
    fn default() -> Self {
        Self {
            x_half_width: 15.0,
            y_max: 5.0,
            y_min: -5.0,
        }
    }
}

/// Electrical loading forwarded to the solver.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Load {
    /// Phase current set directly in amperes; the power parameters are ignored.
    Current(f64),
    /// Load derived from transmitted power.
    Power {
        /// Active power per circuit in MW.
        active: f64,
        /// Reactive power per circuit in MVAr.
        reactive: f64,
        /// Rated line voltage in kV.
        voltage: f64,
    },
}

/// Every parameter describing a cable trench and its field calculation.
///
/// Field names on the wire match the solver request, except that the arrangement is
/// stored as a name rather than the solver's `trefoil` flag. Missing fields fall back to
/// [`TrenchConfiguration::default`].
///
/// Mutate a configuration through [`apply_edit`](crate::apply_edit) so the feasibility
/// invariants keep holding.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrenchConfiguration {
    /// Number of three-phase circuits, between 1 and [`MAX_CIRCUITS`].
    pub circuits: u32,
    /// Bundling pattern shared by every circuit.
    pub arrangement: Arrangement,
    /// Active power per circuit in MW.
    pub active_power: f64,
    /// Reactive power per circuit in MVAr.
    pub reactive_power: f64,
    /// Rated line voltage in kV.
    pub voltage: f64,
    /// Phase current override in amperes; zero means "derive from power".
    pub current: f64,
    /// Burial depth of the reference cable level in metres.
    pub depth: f64,
    /// Centre-to-centre spacing between circuits in metres.
    pub distance_circuit: f64,
    /// Centre-to-centre spacing between phases of one circuit in metres.
    pub distance_phase: f64,
    /// Window sampled by the solver.
    #[serde(flatten)]
    pub calculation_area: CalculationArea,
    /// Regulatory exposure threshold in microtesla.
    #[serde(rename = "icnirpLimit")]
    pub icnirp_limit: f64,
    /// Height above ground of the second flux profile in metres.
    pub curve_above: f64,
    /// Outer cable diameter in metres.
    pub cable_diameter: f64,
}

impl Default for TrenchConfiguration {
    fn default() -> Self {
        Self {
            circuits: 2,
            arrangement: Arrangement::Flat,
            active_power: 400.0,
            reactive_power: 100.0,
            voltage: 230.0,
            current: 0.0,
            depth: 0.8,
            distance_circuit: 1.6,
            distance_phase: 0.3,
            calculation_area: CalculationArea::default(),
            icnirp_limit: 200.0,
            curve_above: 1.0,
            cable_diameter: 0.25,
        }
    }
}

impl TrenchConfiguration {
    /// Parse a configuration from a JSON document.
    ///
    /// The document is taken as-is; pass the result through
    /// [`enforce`](crate::enforce) to restore the feasibility invariants.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Json`] when `json` is not a valid configuration.
    ///
    /// # Examples
    /// ```
    /// use trenchx::{Arrangement, TrenchConfiguration};
    ///
    /// let config = TrenchConfiguration::from_json_str(r#"{"circuits": 3, "arrangement": "trefoil"}"#)
    ///     .expect("valid document");
    /// assert_eq!(config.circuits, 3);
    /// assert_eq!(config.arrangement, Arrangement::Trefoil);
    /// assert_eq!(config.depth, 0.8);
    /// ```
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] when the file cannot be read and
    /// [`ConfigError::Json`] when its contents are not a valid configuration.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        debug!(path = %path.display(), "loading trench configuration");
        let contents = fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Whether the phase current override is active.
    #[must_use]
    pub fn current_override(&self) -> bool {
        self.current > 0.0
    }

    /// Loading the solver should use.
    ///
    /// The power parameters are kept while the current override is active so they come
    /// back once the override is cleared.
    #[must_use]
    pub fn load(&self) -> Load {
        if self.current_override() {
            Load::Current(self.current)
        } else {
            Load::Power {
                active: self.active_power,
                reactive: self.reactive_power,
                voltage: self.voltage,
            }
        }
    }

    /// Radius of a single cable in metres.
    #[must_use]
    pub fn cable_radius(&self) -> f64 {
        self.cable_diameter / 2.0
    }
}
