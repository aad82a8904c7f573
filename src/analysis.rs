use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};
use trenchx::{
    compose, Calculation, CalculationState, FieldSolver, ReducedProfile, SolverResponse,
    TrenchConfiguration, TrenchLayout,
};

/// What happened to the requested field map file.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldMapOutput {
    /// The PNG was written to this path.
    Written(PathBuf),
    /// The solver answered without a field map.
    Missing,
    /// Decoding or writing failed.
    Failed(String),
}

/// Summary of one trench study.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisSummary {
    /// Configuration that produced the result, exposed for reporting.
    pub config: TrenchConfiguration,
    /// Cross-section geometry; absent when the depth is not positive.
    pub layout: Option<TrenchLayout>,
    /// State of the field calculation; `Idle` when no solver was configured.
    pub state: CalculationState,
    /// Raw solver answer, kept so the field map can be saved.
    pub response: Option<SolverResponse>,
    /// Flux profiles reduced against the ICNIRP limit.
    pub profile: Option<ReducedProfile>,
    /// Reason the calculation produced no profile.
    pub error: Option<String>,
    /// Outcome of saving the field map; absent when no file was requested.
    pub field_map: Option<FieldMapOutput>,
}

/// Compose the cross-section and, when a solver is available, compute the flux profiles.
///
/// When `image_out` is given the field map of a successful calculation is saved there.
/// Saving is best effort: a failure is recorded in the summary so the rest of the report
/// is still produced.
pub fn run_analysis<S: FieldSolver + ?Sized>(
    config: &TrenchConfiguration,
    solver: Option<&S>,
    image_out: Option<&Path>,
) -> AnalysisSummary {
    let mut summary = AnalysisSummary {
        config: config.clone(),
        layout: compose(config),
        state: CalculationState::Idle,
        response: None,
        profile: None,
        error: None,
        field_map: None,
    };

    // Without a solver only the cross-section is available.
    let Some(solver) = solver else {
        return summary;
    };

    // Run the calculation through the state machine so malformed answers count as failures.
    let mut calculation = Calculation::new();
    summary.state = calculation.run(solver, config);
    summary.error = calculation.last_error().map(ToString::to_string);

    if let Some(response) = calculation.latest() {
        match response.reduce(config.icnirp_limit) {
            Ok(profile) => summary.profile = Some(profile),
            Err(error) => summary.error = Some(error.to_string()),
        }
        if let Some(path) = image_out {
            summary.field_map = Some(save_field_map(response, path));
        }
        summary.response = Some(response.clone());
    }

    summary
}

/// Write the field map of `response` to `path` as a PNG file.
fn save_field_map(response: &SolverResponse, path: &Path) -> FieldMapOutput {
    if !response.has_field_map() {
        warn!(path = %path.display(), "solver sent no field map; nothing written");
        return FieldMapOutput::Missing;
    }
    let written = response
        .image_png()
        .map_err(|error| error.to_string())
        .and_then(|png| fs::write(path, png).map_err(|error| error.to_string()));
    match written {
        Ok(()) => {
            info!(path = %path.display(), "field map written");
            FieldMapOutput::Written(path.to_path_buf())
        }
        Err(error) => {
            warn!(path = %path.display(), %error, "field map not written");
            FieldMapOutput::Failed(error)
        }
    }
}
