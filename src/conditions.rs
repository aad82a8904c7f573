use std::path::PathBuf;

use clap::Parser;
use trenchx::{
    apply_edit, enforce, Adjustment, Arrangement, ConfigError, EditOutcome, ParameterEdit,
    TrenchConfiguration,
};

/// Command-line options for a single trench study.
#[derive(Debug, Default, Parser)]
#[command(
    name = "trenchx",
    version,
    about = "Lay out an underground cable trench and its magnetic field profile",
    allow_negative_numbers = true
)]
pub struct Args {
    /// JSON configuration to start from instead of the defaults.
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Number of circuits (1-5).
    #[arg(long)]
    pub circuits: Option<u32>,
    /// Phase arrangement: trefoil, flat or right-angle.
    #[arg(long)]
    pub arrangement: Option<Arrangement>,
    /// Cable diameter [m].
    #[arg(long)]
    pub cable_diameter: Option<f64>,
    /// Distance between phases, centre to centre [m].
    #[arg(long)]
    pub distance_phase: Option<f64>,
    /// Distance between circuits, centre to centre [m].
    #[arg(long)]
    pub distance_circuit: Option<f64>,
    /// Burial depth of the reference cable level [m].
    #[arg(long)]
    pub depth: Option<f64>,
    /// Half width of the calculation area [m].
    #[arg(long)]
    pub x_half_width: Option<f64>,
    /// Upper edge of the calculation area [m].
    #[arg(long)]
    pub y_max: Option<f64>,
    /// Lower edge of the calculation area [m].
    #[arg(long)]
    pub y_min: Option<f64>,
    /// Height of the second flux profile above ground [m].
    #[arg(long)]
    pub curve_above: Option<f64>,
    /// ICNIRP exposure threshold [uT].
    #[arg(long)]
    pub icnirp_limit: Option<f64>,
    /// Active power per circuit [MW].
    #[arg(long)]
    pub active_power: Option<f64>,
    /// Reactive power per circuit [MVAr].
    #[arg(long)]
    pub reactive_power: Option<f64>,
    /// Rated line voltage [kV].
    #[arg(long)]
    pub voltage: Option<f64>,
    /// Phase current [A]; when positive the power settings are ignored by the solver.
    #[arg(long)]
    pub current: Option<f64>,
    /// Base URL of the field solver, e.g. http://localhost:5000.
    #[arg(long)]
    pub solver_url: Option<String>,
    /// Timeout for the whole solver exchange [s].
    #[arg(long, default_value_t = 60)]
    pub timeout_secs: u64,
    /// Where to write the field map PNG returned by the solver.
    #[arg(long)]
    pub image_out: Option<PathBuf>,
}

impl Args {
    /// Requested edits, ordered so that every bound is settled before its dependants.
    pub fn edits(&self) -> Vec<ParameterEdit> {
        // Circuit count and arrangement carry no bounds of their own, so they go first.
        // The numeric edits follow the dependency chain cable diameter, phase spacing,
        // circuit spacing and depth; the sampling window comes before the calculation
        // height it bounds.
        let numeric: [(Option<f64>, fn(f64) -> ParameterEdit); 13] = [
            (self.cable_diameter, ParameterEdit::CableDiameter),
            (self.distance_phase, ParameterEdit::DistancePhase),
            (self.distance_circuit, ParameterEdit::DistanceCircuit),
            (self.depth, ParameterEdit::Depth),
            (self.x_half_width, ParameterEdit::XHalfWidth),
            (self.y_max, ParameterEdit::YMax),
            (self.y_min, ParameterEdit::YMin),
            (self.curve_above, ParameterEdit::CurveAbove),
            (self.icnirp_limit, ParameterEdit::IcnirpLimit),
            (self.active_power, ParameterEdit::ActivePower),
            (self.reactive_power, ParameterEdit::ReactivePower),
            (self.voltage, ParameterEdit::Voltage),
            (self.current, ParameterEdit::Current),
        ];

        self.circuits
            .map(ParameterEdit::CircuitCount)
            .into_iter()
            .chain(self.arrangement.map(ParameterEdit::Arrangement))
            .chain(
                numeric
                    .into_iter()
                    .filter_map(|(value, edit)| value.map(edit)),
            )
            .collect()
    }
}

/// Configuration after loading, repair and the command-line edits.
#[derive(Debug)]
pub struct Conditions {
    /// Feasible configuration to study.
    pub config: TrenchConfiguration,
    /// Corrections needed to make the loaded configuration feasible.
    pub repairs: Vec<Adjustment>,
    /// Result of each command-line edit, in the order applied.
    pub outcomes: Vec<EditOutcome>,
}

/// Load the starting configuration and apply the requested edits.
///
/// Each edit goes through the same feasibility rules an interactive editor would use, so
/// the resulting configuration always satisfies every invariant.
pub fn apply_conditions(args: &Args) -> Result<Conditions, ConfigError> {
    // Start from the file when one is given. Missing fields fall back to the defaults of
    // the reference installation: two flat circuits 0.8 m deep.
    let loaded = match &args.config {
        Some(path) => TrenchConfiguration::from_path(path)?,
        None => TrenchConfiguration::default(),
    };

    // Files may come from elsewhere; bring them into the feasible region first. Every
    // correction is kept so the report can say which loaded values were changed.
    let enforced = enforce(&loaded);
    let mut config = enforced.config;

    // Apply the edits one at a time, each against the result of the previous one. This is
    // what an interactive editor does when fields are changed one after another, so a
    // later bound (say the depth) sees the phase spacing an earlier edit produced.
    let mut outcomes = Vec::new();
    for edit in args.edits() {
        let outcome = apply_edit(&config, edit);
        config = outcome.config.clone();
        outcomes.push(outcome);
    }

    Ok(Conditions {
        config,
        repairs: enforced.adjustments,
        outcomes,
    })
}
