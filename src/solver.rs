//! Client side of the external magnetic field solver.
//!
//! The solver is reached over HTTP with a fixed contract: the trench configuration is
//! posted as JSON to `/api/magnetic-field/calculate` and the answer carries a base64 PNG
//! field map plus the ground-level and calculation-height flux profiles. The transport is
//! hidden behind [`FieldSolver`] so sessions can be driven by any implementation.
//!
//! [`Calculation`] tracks the request lifecycle of one session as an explicit state
//! machine. Issuing a new request while one is outstanding is allowed; the older request
//! is superseded and its answer ignored when it eventually arrives.

use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::TrenchConfiguration;
use crate::errors::SolverError;
use crate::flux::{reduce, samples_from_series, FluxSample, ReducedProfile};

/// Path of the calculation endpoint relative to the solver base URL.
pub const CALCULATE_PATH: &str = "/api/magnetic-field/calculate";

/// Path of the liveness endpoint relative to the solver base URL.
pub const HEALTH_PATH: &str = "/health";

/// Timeout applied to a whole solver exchange unless configured otherwise.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// First eight bytes of every PNG file.
const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'];

/// JSON body of a calculation request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SolverRequest {
    /// Number of circuits.
    pub circuits: u32,
    /// Active power per circuit in MW.
    pub active_power: f64,
    /// Reactive power per circuit in MVAr.
    pub reactive_power: f64,
    /// Rated line voltage in kV.
    pub voltage: f64,
    /// Phase current override in amperes; the solver ignores the power fields when positive.
    pub current: f64,
    /// Burial depth in metres.
    pub depth: f64,
    /// Spacing between circuits in metres.
    pub distance_circuit: f64,
    /// Spacing between phases in metres.
    pub distance_phase: f64,
    /// Half width of the calculation area in metres.
    #[serde(rename = "xVal")]
    pub x_val: f64,
    /// Upper edge of the calculation area in metres.
    #[serde(rename = "yMax")]
    pub y_max: f64,
    /// Lower edge of the calculation area in metres.
    #[serde(rename = "yMin")]
    pub y_min: f64,
    /// Exposure threshold in microtesla.
    #[serde(rename = "icnirpLimit")]
    pub icnirp_limit: f64,
    /// Calculation height above ground in metres.
    pub curve_above: f64,
    /// Cable diameter in metres.
    pub cable_diameter: f64,
    /// Whether the circuits are laid in trefoil; every other arrangement is solved flat.
    pub trefoil: bool,
}

impl From<&TrenchConfiguration> for SolverRequest {
    fn from(config: &TrenchConfiguration) -> Self {
        Self {
            circuits: config.circuits,
            active_power: config.active_power,
            reactive_power: config.reactive_power,
            voltage: config.voltage,
            current: config.current,
            depth: config.depth,
            distance_circuit: config.distance_circuit,
            distance_phase: config.distance_phase,
            x_val: config.calculation_area.x_half_width,
            y_max: config.calculation_area.y_max,
            y_min: config.calculation_area.y_min,
            icnirp_limit: config.icnirp_limit,
            curve_above: config.curve_above,
            cable_diameter: config.cable_diameter,
            trefoil: config.arrangement.is_trefoil(),
        }
    }
}

/// JSON body of a successful calculation.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SolverResponse {
    /// Base64-encoded PNG of the field distribution.
    #[serde(default)]
    pub image: String,
    /// Transverse sample positions in metres.
    pub x_coords: Vec<f64>,
    /// Flux density at ground level in microtesla.
    #[serde(rename = "B_0m")]
    pub b_ground: Vec<f64>,
    /// Flux density at the calculation height in microtesla.
    #[serde(rename = "B_1m")]
    pub b_above: Vec<f64>,
}

impl SolverResponse {
    /// Zip the three profiles into samples.
    ///
    /// # Errors
    ///
    /// Returns [`SolverError::MisalignedSeries`] when the profiles differ in length.
    pub fn samples(&self) -> Result<Vec<FluxSample>, SolverError> {
        samples_from_series(&self.x_coords, &self.b_ground, &self.b_above)
    }

    /// Reduce the profiles for display against `threshold`.
    ///
    /// # Errors
    ///
    /// Returns [`SolverError::MisalignedSeries`] when the profiles differ in length.
    pub fn reduce(&self, threshold: f64) -> Result<ReducedProfile, SolverError> {
        Ok(reduce(&self.samples()?, threshold))
    }

    /// Whether the solver sent a field map at all.
    #[must_use]
    pub fn has_field_map(&self) -> bool {
        !self.image.trim().is_empty()
    }

    /// Check that the answer can be shown as a whole.
    ///
    /// The profiles must be index-aligned and a field map, when present, must decode to a
    /// PNG file. An absent field map is accepted.
    ///
    /// # Errors
    ///
    /// Returns [`SolverError::MisalignedSeries`], [`SolverError::Image`] or
    /// [`SolverError::NotPng`] for the first defect found.
    pub fn validate(&self) -> Result<(), SolverError> {
        self.samples()?;
        if self.has_field_map() {
            self.image_png()?;
        }
        Ok(())
    }

    /// Decode the field map into PNG bytes.
    ///
    /// # Errors
    ///
    /// Returns [`SolverError::Image`] when the payload is not base64 and
    /// [`SolverError::NotPng`] when the decoded bytes are not a PNG file.
    pub fn image_png(&self) -> Result<Vec<u8>, SolverError> {
        let bytes = STANDARD.decode(self.image.trim())?;
        if !bytes.starts_with(&PNG_SIGNATURE) {
            return Err(SolverError::NotPng);
        }
        Ok(bytes)
    }
}

/// Anything able to run a field calculation.
pub trait FieldSolver {
    /// Run one calculation.
    ///
    /// # Errors
    ///
    /// Returns [`SolverError`] when the calculation fails for any reason; no partial
    /// result is returned.
    fn calculate(&self, request: &SolverRequest) -> Result<SolverResponse, SolverError>;
}

/// Blocking HTTP client for the field solver.
#[derive(Clone, Debug)]
pub struct HttpSolver {
    /// Shared connection pool and timeouts.
    agent: ureq::Agent,
    /// Base URL without a trailing slash.
    base_url: String,
}

impl HttpSolver {
    /// Create a client for the solver at `base_url` with [`DEFAULT_TIMEOUT`].
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// Create a client whose whole exchange is bounded by `timeout`.
    #[must_use]
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .build()
            .into();
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { agent, base_url }
    }

    /// Full URL of an endpoint.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Check the solver's liveness endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`SolverError::Status`] for a non-success answer and
    /// [`SolverError::Transport`] when the solver cannot be reached.
    pub fn health(&self) -> Result<(), SolverError> {
        let url = self.endpoint(HEALTH_PATH);
        debug!(%url, "probing field solver");
        self.agent.get(&url).call()?;
        Ok(())
    }
}

impl FieldSolver for HttpSolver {
    fn calculate(&self, request: &SolverRequest) -> Result<SolverResponse, SolverError> {
        let url = self.endpoint(CALCULATE_PATH);
        info!(%url, circuits = request.circuits, trefoil = request.trefoil, "requesting field calculation");
        let mut response = self.agent.post(&url).send_json(request)?;
        let body = response.body_mut().read_to_string()?;
        Ok(serde_json::from_str(&body)?)
    }
}

/// Lifecycle of the calculation belonging to one session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CalculationState {
    /// Nothing has been requested yet.
    #[default]
    Idle,
    /// A request is outstanding.
    Requesting,
    /// The most recent request succeeded.
    Succeeded,
    /// The most recent request failed.
    Failed,
}

/// Identifies one issued request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ticket(u64);

/// Calculation state machine for one session.
///
/// # Examples
/// ```
/// use trenchx::solver::{Calculation, CalculationState, SolverResponse};
///
/// let mut calculation = Calculation::new();
/// let ticket = calculation.begin();
/// assert!(calculation.is_busy());
/// assert!(calculation.complete(ticket, Ok(SolverResponse::default())));
/// assert_eq!(calculation.state(), CalculationState::Succeeded);
/// ```
#[derive(Debug, Default)]
pub struct Calculation {
    /// State once no request is outstanding.
    settled: CalculationState,
    /// Request whose answer will be accepted.
    pending: Option<Ticket>,
    /// Ticket handed out by the next [`Calculation::begin`].
    next_ticket: u64,
    /// Last successful answer; kept across later failures.
    latest: Option<SolverResponse>,
    /// Error of the most recent request, cleared by the next success.
    last_error: Option<SolverError>,
}

impl Calculation {
    /// Create an idle calculation.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> CalculationState {
        if self.pending.is_some() {
            CalculationState::Requesting
        } else {
            self.settled
        }
    }

    /// Whether a request is outstanding; callers should hold further requests meanwhile.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    /// Last successful answer, if any.
    #[must_use]
    pub fn latest(&self) -> Option<&SolverResponse> {
        self.latest.as_ref()
    }

    /// Error of the most recent request, if it failed.
    #[must_use]
    pub fn last_error(&self) -> Option<&SolverError> {
        self.last_error.as_ref()
    }

    /// Mark a new request as outstanding, superseding any earlier one.
    pub fn begin(&mut self) -> Ticket {
        let ticket = Ticket(self.next_ticket);
        self.next_ticket += 1;
        if let Some(previous) = self.pending.replace(ticket) {
            debug!(?previous, ?ticket, "superseding outstanding calculation");
        }
        ticket
    }

    /// Record the answer to a request.
    ///
    /// Returns `false` and changes nothing when `ticket` was cancelled or superseded.
    /// Successful answers are validated first; one that fails [`SolverResponse::validate`]
    /// moves the calculation to `Failed` like any other error.
    pub fn complete(
        &mut self,
        ticket: Ticket,
        result: Result<SolverResponse, SolverError>,
    ) -> bool {
        if self.pending != Some(ticket) {
            debug!(?ticket, "ignoring answer to abandoned calculation");
            return false;
        }
        self.pending = None;
        // A malformed answer is a failure; it never replaces the last good one.
        match result.and_then(|response| response.validate().map(|()| response)) {
            Ok(response) => {
                self.latest = Some(response);
                self.last_error = None;
                self.settled = CalculationState::Succeeded;
            }
            Err(error) => {
                warn!(%error, "field calculation failed");
                self.last_error = Some(error);
                self.settled = CalculationState::Failed;
            }
        }
        true
    }

    /// Abandon the outstanding request, returning to the previous settled state.
    pub fn cancel(&mut self) {
        if let Some(ticket) = self.pending.take() {
            debug!(?ticket, "cancelled calculation");
        }
    }

    /// Run a whole calculation synchronously against `solver`.
    pub fn run<S: FieldSolver + ?Sized>(
        &mut self,
        solver: &S,
        config: &TrenchConfiguration,
    ) -> CalculationState {
        let ticket = self.begin();
        let result = solver.calculate(&SolverRequest::from(config));
        self.complete(ticket, result);
        self.state()
    }
}
