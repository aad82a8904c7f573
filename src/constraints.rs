//! Feasibility rules linking the trench parameters.
//!
//! A configuration is feasible when
//!
//! * `distance_circuit >= 2 * distance_phase` (neighbouring circuits do not overlap),
//! * `distance_phase >= cable_diameter` (phases of one circuit do not overlap),
//! * `depth >= cable_diameter / 2 + distance_phase` (the top conductor stays below grade),
//! * `curve_above < y_max` (the second flux profile lies inside the sampling window),
//! * `1 <= circuits <= 5`,
//! * `cable_diameter > 0` and `icnirp_limit > 0`.
//!
//! [`apply_edit`] resolves one edit in a single pass: the edited value is clamped to its
//! bound, then the fields that depend on it are re-checked once in dependency order
//! (`cable_diameter -> distance_phase -> {distance_circuit, depth}` and
//! `y_max -> curve_above`). Every change is reported back so bound input controls can be
//! resynchronised.

use std::fmt;

use thiserror::Error;
use tracing::{debug, warn};

use crate::arrangement::Arrangement;
use crate::config::{TrenchConfiguration, MAX_CIRCUITS};
use crate::errors::EditRejection;

/// Margin kept between the calculation height and the top of the sampling window.
pub const CURVE_ABOVE_MARGIN: f64 = 0.1;

/// Identifies one editable parameter of a [`TrenchConfiguration`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Field {
    /// [`TrenchConfiguration::circuits`].
    CircuitCount,
    /// [`TrenchConfiguration::arrangement`].
    Arrangement,
    /// [`TrenchConfiguration::active_power`].
    ActivePower,
    /// [`TrenchConfiguration::reactive_power`].
    ReactivePower,
    /// [`TrenchConfiguration::voltage`].
    Voltage,
    /// [`TrenchConfiguration::current`].
    Current,
    /// [`TrenchConfiguration::depth`].
    Depth,
    /// [`TrenchConfiguration::distance_circuit`].
    DistanceCircuit,
    /// [`TrenchConfiguration::distance_phase`].
    DistancePhase,
    /// Half width of the calculation area.
    XHalfWidth,
    /// Upper edge of the calculation area.
    YMax,
    /// Lower edge of the calculation area.
    YMin,
    /// [`TrenchConfiguration::icnirp_limit`].
    IcnirpLimit,
    /// [`TrenchConfiguration::curve_above`].
    CurveAbove,
    /// [`TrenchConfiguration::cable_diameter`].
    CableDiameter,
}

impl Field {
    /// Name of the field in configuration documents and solver requests.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Field::CircuitCount => "circuits",
            Field::Arrangement => "arrangement",
            Field::ActivePower => "active_power",
            Field::ReactivePower => "reactive_power",
            Field::Voltage => "voltage",
            Field::Current => "current",
            Field::Depth => "depth",
            Field::DistanceCircuit => "distance_circuit",
            Field::DistancePhase => "distance_phase",
            Field::XHalfWidth => "xVal",
            Field::YMax => "yMax",
            Field::YMin => "yMin",
            Field::IcnirpLimit => "icnirpLimit",
            Field::CurveAbove => "curve_above",
            Field::CableDiameter => "cable_diameter",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A proposed change to exactly one parameter.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ParameterEdit {
    /// Set the number of circuits.
    CircuitCount(u32),
    /// Select the bundling pattern.
    Arrangement(Arrangement),
    /// Set the active power per circuit in MW.
    ActivePower(f64),
    /// Set the reactive power per circuit in MVAr.
    ReactivePower(f64),
    /// Set the rated line voltage in kV.
    Voltage(f64),
    /// Set the phase current override in amperes.
    Current(f64),
    /// Set the burial depth in metres.
    Depth(f64),
    /// Set the spacing between circuits in metres.
    DistanceCircuit(f64),
    /// Set the spacing between phases in metres.
    DistancePhase(f64),
    /// Set the half width of the calculation area in metres.
    XHalfWidth(f64),
    /// Set the upper edge of the calculation area in metres.
    YMax(f64),
    /// Set the lower edge of the calculation area in metres.
    YMin(f64),
    /// Set the exposure threshold in microtesla.
    IcnirpLimit(f64),
    /// Set the calculation height above ground in metres.
    CurveAbove(f64),
    /// Set the cable diameter in metres.
    CableDiameter(f64),
}

impl ParameterEdit {
    /// Field targeted by the edit.
    #[must_use]
    pub const fn field(self) -> Field {
        match self {
            ParameterEdit::CircuitCount(_) => Field::CircuitCount,
            ParameterEdit::Arrangement(_) => Field::Arrangement,
            ParameterEdit::ActivePower(_) => Field::ActivePower,
            ParameterEdit::ReactivePower(_) => Field::ReactivePower,
            ParameterEdit::Voltage(_) => Field::Voltage,
            ParameterEdit::Current(_) => Field::Current,
            ParameterEdit::Depth(_) => Field::Depth,
            ParameterEdit::DistanceCircuit(_) => Field::DistanceCircuit,
            ParameterEdit::DistancePhase(_) => Field::DistancePhase,
            ParameterEdit::XHalfWidth(_) => Field::XHalfWidth,
            ParameterEdit::YMax(_) => Field::YMax,
            ParameterEdit::YMin(_) => Field::YMin,
            ParameterEdit::IcnirpLimit(_) => Field::IcnirpLimit,
            ParameterEdit::CurveAbove(_) => Field::CurveAbove,
            ParameterEdit::CableDiameter(_) => Field::CableDiameter,
        }
    }

    /// Numeric payload of the edit, if any.
    fn value(self) -> Option<f64> {
        match self {
            ParameterEdit::CircuitCount(_) | ParameterEdit::Arrangement(_) => None,
            ParameterEdit::ActivePower(value)
            | ParameterEdit::ReactivePower(value)
            | ParameterEdit::Voltage(value)
            | ParameterEdit::Current(value)
            | ParameterEdit::Depth(value)
            | ParameterEdit::DistanceCircuit(value)
            | ParameterEdit::DistancePhase(value)
            | ParameterEdit::XHalfWidth(value)
            | ParameterEdit::YMax(value)
            | ParameterEdit::YMin(value)
            | ParameterEdit::IcnirpLimit(value)
            | ParameterEdit::CurveAbove(value)
            | ParameterEdit::CableDiameter(value) => Some(value),
        }
    }

    /// Check the edit on its own, before any cross-field rule is applied.
    fn screen(self) -> Result<(), EditRejection> {
        let field = self.field();
        if let ParameterEdit::CircuitCount(requested) = self {
            if !(1..=MAX_CIRCUITS).contains(&requested) {
                return Err(EditRejection::CircuitCountOutOfRange { requested });
            }
        }
        if let Some(value) = self.value() {
            if !value.is_finite() {
                return Err(EditRejection::NonFinite { field, value });
            }
            if matches!(field, Field::CableDiameter | Field::IcnirpLimit) && value <= 0.0 {
                return Err(EditRejection::NonPositive { field, value });
            }
        }
        Ok(())
    }
}

/// What happened to the edited field.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Disposition {
    /// The requested value was stored unchanged.
    Accepted,
    /// The requested value was infeasible and the bound was stored instead.
    Clamped {
        /// Value proposed by the caller.
        requested: f64,
        /// Value actually stored.
        accepted: f64,
    },
    /// The edit was discarded and the configuration left untouched.
    Rejected(EditRejection),
}

/// Corrective update applied to a field other than the edited one.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Adjustment {
    /// Field that was corrected.
    pub field: Field,
    /// Value before the correction.
    pub previous: f64,
    /// Value after the correction.
    pub value: f64,
}

/// Result of resolving one [`ParameterEdit`].
#[derive(Clone, Debug, PartialEq)]
pub struct EditOutcome {
    /// Configuration after the edit and every dependent correction.
    pub config: TrenchConfiguration,
    /// Field targeted by the edit.
    pub field: Field,
    /// What happened to the edited field.
    pub disposition: Disposition,
    /// Dependent fields that were corrected, in the order they were checked.
    pub adjustments: Vec<Adjustment>,
}

impl EditOutcome {
    /// Reason the edit was discarded, if it was.
    #[must_use]
    pub fn rejection(&self) -> Option<&EditRejection> {
        match &self.disposition {
            Disposition::Rejected(rejection) => Some(rejection),
            Disposition::Accepted | Disposition::Clamped { .. } => None,
        }
    }

    /// Whether any stored value differs from what the caller asked for.
    ///
    /// Input controls bound to the configuration need resynchronising when this is true.
    #[must_use]
    pub fn needs_resync(&self) -> bool {
        !matches!(self.disposition, Disposition::Accepted) || !self.adjustments.is_empty()
    }
}

/// Configuration brought back into the feasible region by [`enforce`].
#[derive(Clone, Debug, PartialEq)]
pub struct Enforced {
    /// Feasible configuration.
    pub config: TrenchConfiguration,
    /// Corrections applied, in dependency order.
    pub adjustments: Vec<Adjustment>,
}

/// A feasibility invariant broken by a configuration.
#[derive(Clone, Copy, Debug, Error, PartialEq)]
pub enum Violation {
    /// The circuit count lies outside `1..=5`.
    #[error("circuit count {0} is outside 1..=5")]
    CircuitCount(u32),
    /// The phases of a circuit overlap.
    #[error("phase spacing {distance_phase} m is smaller than the cable diameter {cable_diameter} m")]
    PhasesOverlap {
        /// Offending phase spacing.
        distance_phase: f64,
        /// Cable diameter.
        cable_diameter: f64,
    },
    /// Neighbouring circuits overlap.
    #[error("circuit spacing {distance_circuit} m is below the minimum {minimum} m")]
    CircuitsOverlap {
        /// Offending circuit spacing.
        distance_circuit: f64,
        /// Twice the phase spacing.
        minimum: f64,
    },
    /// The top conductor reaches above the ground surface.
    #[error("depth {depth} m is below the minimum {minimum} m")]
    TooShallow {
        /// Offending depth.
        depth: f64,
        /// Half the cable diameter plus the phase spacing.
        minimum: f64,
    },
    /// A strictly positive quantity is zero, negative or not finite.
    #[error("{field} must be a positive number (found {value})")]
    NotPositive {
        /// Offending field.
        field: Field,
        /// Its value.
        value: f64,
    },
    /// The calculation height lies outside the sampling window.
    #[error("calculation height {curve_above} m is not below y-max {y_max} m")]
    CurveOutsideWindow {
        /// Offending calculation height.
        curve_above: f64,
        /// Top of the sampling window.
        y_max: f64,
    },
}

/// Smallest feasible phase spacing.
#[must_use]
pub fn minimum_distance_phase(config: &TrenchConfiguration) -> f64 {
    config.cable_diameter
}

/// Smallest feasible circuit spacing.
#[must_use]
pub fn minimum_distance_circuit(config: &TrenchConfiguration) -> f64 {
    2.0 * config.distance_phase
}

/// Smallest feasible burial depth.
#[must_use]
pub fn minimum_depth(config: &TrenchConfiguration) -> f64 {
    config.cable_diameter / 2.0 + config.distance_phase
}

/// Value an infeasible calculation height is clamped to.
#[must_use]
pub fn clamped_curve_above(config: &TrenchConfiguration) -> f64 {
    config.calculation_area.y_max - CURVE_ABOVE_MARGIN
}

/// Resolve one edit against `config`.
///
/// The function is total: infeasible values are clamped, malformed ones rejected, and
/// neither case is an error for the caller.
///
/// # Examples
/// ```
/// use trenchx::{apply_edit, Disposition, ParameterEdit, TrenchConfiguration};
///
/// let config = TrenchConfiguration::default();
/// let outcome = apply_edit(&config, ParameterEdit::DistanceCircuit(0.4));
/// assert_eq!(
///     outcome.disposition,
///     Disposition::Clamped { requested: 0.4, accepted: 0.6 }
/// );
/// assert_eq!(outcome.config.distance_circuit, 0.6);
/// ```
#[must_use]
pub fn apply_edit(config: &TrenchConfiguration, edit: ParameterEdit) -> EditOutcome {
    let field = edit.field();
    let mut next = config.clone();

    if let Err(rejection) = edit.screen() {
        warn!(%field, %rejection, "rejected parameter edit");
        return EditOutcome {
            config: next,
            field,
            disposition: Disposition::Rejected(rejection),
            adjustments: Vec::new(),
        };
    }

    let disposition = match edit {
        ParameterEdit::CircuitCount(circuits) => {
            next.circuits = circuits;
            Disposition::Accepted
        }
        ParameterEdit::Arrangement(arrangement) => {
            next.arrangement = arrangement;
            Disposition::Accepted
        }
        ParameterEdit::ActivePower(value) => store(&mut next.active_power, value, None),
        ParameterEdit::ReactivePower(value) => store(&mut next.reactive_power, value, None),
        ParameterEdit::Voltage(value) => store(&mut next.voltage, value, None),
        ParameterEdit::Current(value) => {
            if value > 0.0 {
                debug!(current = value, "current override active; power parameters kept");
            }
            store(&mut next.current, value, None)
        }
        ParameterEdit::Depth(value) => {
            let bound = at_least(value, minimum_depth(&next));
            store(&mut next.depth, value, bound)
        }
        ParameterEdit::DistanceCircuit(value) => {
            let bound = at_least(value, minimum_distance_circuit(&next));
            store(&mut next.distance_circuit, value, bound)
        }
        ParameterEdit::DistancePhase(value) => {
            let bound = at_least(value, minimum_distance_phase(&next));
            store(&mut next.distance_phase, value, bound)
        }
        ParameterEdit::XHalfWidth(value) => {
            store(&mut next.calculation_area.x_half_width, value, None)
        }
        ParameterEdit::YMax(value) => store(&mut next.calculation_area.y_max, value, None),
        ParameterEdit::YMin(value) => store(&mut next.calculation_area.y_min, value, None),
        ParameterEdit::IcnirpLimit(value) => store(&mut next.icnirp_limit, value, None),
        ParameterEdit::CurveAbove(value) => {
            let bound = below_window(value, next.calculation_area.y_max);
            store(&mut next.curve_above, value, bound)
        }
        ParameterEdit::CableDiameter(value) => store(&mut next.cable_diameter, value, None),
    };

    if let Disposition::Clamped {
        requested,
        accepted,
    } = disposition
    {
        debug!(%field, requested, accepted, "clamped parameter edit");
    }

    let mut adjustments = Vec::new();
    match field {
        Field::CableDiameter => {
            settle_distance_phase(&mut next, &mut adjustments);
            settle_distance_circuit(&mut next, &mut adjustments);
            settle_depth(&mut next, &mut adjustments);
        }
        Field::DistancePhase => {
            settle_distance_circuit(&mut next, &mut adjustments);
            settle_depth(&mut next, &mut adjustments);
        }
        Field::YMax => settle_curve_above(&mut next, &mut adjustments),
        _ => {}
    }

    EditOutcome {
        config: next,
        field,
        disposition,
        adjustments,
    }
}

/// Bring a whole configuration into the feasible region.
///
/// Rules are applied once each in dependency order. A cable diameter or exposure limit
/// that is not a positive number is restored to its default before the spacing rules
/// run. Enforcing a feasible configuration returns it unchanged with no adjustments.
#[must_use]
pub fn enforce(config: &TrenchConfiguration) -> Enforced {
    let mut next = config.clone();
    let mut adjustments = Vec::new();

    let circuits = next.circuits.clamp(1, MAX_CIRCUITS);
    if circuits != next.circuits {
        record(
            &mut adjustments,
            Field::CircuitCount,
            f64::from(next.circuits),
            f64::from(circuits),
        );
        next.circuits = circuits;
    }
    let defaults = TrenchConfiguration::default();
    settle_positive(
        &mut next.cable_diameter,
        Field::CableDiameter,
        defaults.cable_diameter,
        &mut adjustments,
    );
    settle_positive(
        &mut next.icnirp_limit,
        Field::IcnirpLimit,
        defaults.icnirp_limit,
        &mut adjustments,
    );
    settle_distance_phase(&mut next, &mut adjustments);
    settle_distance_circuit(&mut next, &mut adjustments);
    settle_depth(&mut next, &mut adjustments);
    settle_curve_above(&mut next, &mut adjustments);

    Enforced {
        config: next,
        adjustments,
    }
}

/// List the invariants `config` currently breaks, without changing it.
#[must_use]
pub fn violations(config: &TrenchConfiguration) -> Vec<Violation> {
    let mut found = Vec::new();
    if !(1..=MAX_CIRCUITS).contains(&config.circuits) {
        found.push(Violation::CircuitCount(config.circuits));
    }
    for (field, value) in [
        (Field::CableDiameter, config.cable_diameter),
        (Field::IcnirpLimit, config.icnirp_limit),
    ] {
        if !is_positive(value) {
            found.push(Violation::NotPositive { field, value });
        }
    }
    if config.distance_phase < minimum_distance_phase(config) {
        found.push(Violation::PhasesOverlap {
            distance_phase: config.distance_phase,
            cable_diameter: config.cable_diameter,
        });
    }
    let minimum = minimum_distance_circuit(config);
    if config.distance_circuit < minimum {
        found.push(Violation::CircuitsOverlap {
            distance_circuit: config.distance_circuit,
            minimum,
        });
    }
    let minimum = minimum_depth(config);
    if config.depth < minimum {
        found.push(Violation::TooShallow {
            depth: config.depth,
            minimum,
        });
    }
    if config.curve_above >= config.calculation_area.y_max {
        found.push(Violation::CurveOutsideWindow {
            curve_above: config.curve_above,
            y_max: config.calculation_area.y_max,
        });
    }
    found
}

/// Whether `value` is a finite number above zero.
fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

/// Bound to clamp to when `value` falls short of `minimum`.
///
/// A value equal to the minimum is already feasible and maps to itself.
fn at_least(value: f64, minimum: f64) -> Option<f64> {
    (value < minimum).then_some(minimum)
}

/// Bound to clamp to when `value` reaches the top of the sampling window.
fn below_window(value: f64, y_max: f64) -> Option<f64> {
    (value >= y_max).then_some(y_max - CURVE_ABOVE_MARGIN)
}

/// Store the requested value, or the bound when one applies.
fn store(slot: &mut f64, requested: f64, bound: Option<f64>) -> Disposition {
    match bound {
        Some(accepted) => {
            *slot = accepted;
            Disposition::Clamped {
                requested,
                accepted,
            }
        }
        None => {
            *slot = requested;
            Disposition::Accepted
        }
    }
}

/// Log a correction and append it to `adjustments`.
fn record(adjustments: &mut Vec<Adjustment>, field: Field, previous: f64, value: f64) {
    debug!(%field, previous, value, "adjusted dependent parameter");
    adjustments.push(Adjustment {
        field,
        previous,
        value,
    });
}

/// Replace a value that must be positive with `fallback` when it is not.
///
/// There is no meaningful nearest value to clamp to, so the default is restored.
fn settle_positive(
    slot: &mut f64,
    field: Field,
    fallback: f64,
    adjustments: &mut Vec<Adjustment>,
) {
    if !is_positive(*slot) {
        record(adjustments, field, *slot, fallback);
        *slot = fallback;
    }
}

/// Raise the phase spacing to the cable diameter.
fn settle_distance_phase(config: &mut TrenchConfiguration, adjustments: &mut Vec<Adjustment>) {
    if let Some(value) = at_least(config.distance_phase, minimum_distance_phase(config)) {
        record(adjustments, Field::DistancePhase, config.distance_phase, value);
        config.distance_phase = value;
    }
}

/// Raise the circuit spacing to twice the phase spacing.
fn settle_distance_circuit(config: &mut TrenchConfiguration, adjustments: &mut Vec<Adjustment>) {
    if let Some(value) = at_least(config.distance_circuit, minimum_distance_circuit(config)) {
        record(
            adjustments,
            Field::DistanceCircuit,
            config.distance_circuit,
            value,
        );
        config.distance_circuit = value;
    }
}

/// Lower the reference level until the top conductor is buried.
fn settle_depth(config: &mut TrenchConfiguration, adjustments: &mut Vec<Adjustment>) {
    if let Some(value) = at_least(config.depth, minimum_depth(config)) {
        record(adjustments, Field::Depth, config.depth, value);
        config.depth = value;
    }
}

/// Pull the calculation height back inside the sampling window.
fn settle_curve_above(config: &mut TrenchConfiguration, adjustments: &mut Vec<Adjustment>) {
    if let Some(value) = below_window(config.curve_above, config.calculation_area.y_max) {
        record(adjustments, Field::CurveAbove, config.curve_above, value);
        config.curve_above = value;
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn cable_diameter_edit_pushes_phase_spacing_out() {
        let config = TrenchConfiguration::default();
        let outcome = apply_edit(&config, ParameterEdit::CableDiameter(0.5));

        assert_eq!(outcome.disposition, Disposition::Accepted);
        assert_relative_eq!(outcome.config.distance_phase, 0.5);
        assert_relative_eq!(outcome.config.distance_circuit, 1.6);
        assert_relative_eq!(outcome.config.depth, 0.8);
        assert_eq!(
            outcome.adjustments,
            vec![Adjustment {
                field: Field::DistancePhase,
                previous: 0.3,
                value: 0.5,
            }]
        );
        assert!(outcome.needs_resync());
    }

    #[test]
    fn cable_diameter_edit_cascades_once_through_dependants() {
        let config = TrenchConfiguration {
            distance_circuit: 0.6,
            depth: 0.5,
            ..TrenchConfiguration::default()
        };
        let outcome = apply_edit(&config, ParameterEdit::CableDiameter(0.5));
        let fields: Vec<Field> = outcome.adjustments.iter().map(|a| a.field).collect();
        assert_eq!(
            fields,
            vec![Field::DistancePhase, Field::DistanceCircuit, Field::Depth]
        );
        assert_relative_eq!(outcome.config.distance_circuit, 1.0);
        assert_relative_eq!(outcome.config.depth, 0.75);
        assert!(violations(&outcome.config).is_empty());
    }

    #[test]
    fn phase_spacing_is_clamped_to_cable_diameter() {
        let config = TrenchConfiguration::default();
        let outcome = apply_edit(&config, ParameterEdit::DistancePhase(0.1));
        assert_eq!(
            outcome.disposition,
            Disposition::Clamped {
                requested: 0.1,
                accepted: 0.25,
            }
        );
        assert_relative_eq!(outcome.config.distance_phase, 0.25);
    }

    #[test]
    fn widening_phase_spacing_raises_circuit_spacing_and_depth() {
        let config = TrenchConfiguration::default();
        let outcome = apply_edit(&config, ParameterEdit::DistancePhase(0.9));
        assert_eq!(outcome.disposition, Disposition::Accepted);
        assert_relative_eq!(outcome.config.distance_circuit, 1.8);
        assert_relative_eq!(outcome.config.depth, 0.125 + 0.9);
    }

    #[test]
    fn circuit_spacing_is_clamped_to_twice_phase_spacing() {
        let config = TrenchConfiguration::default();
        let outcome = apply_edit(&config, ParameterEdit::DistanceCircuit(0.4));
        assert_relative_eq!(outcome.config.distance_circuit, 0.6);
        assert!(outcome.adjustments.is_empty());
    }

    #[test]
    fn depth_is_clamped_below_grade() {
        let config = TrenchConfiguration::default();
        let outcome = apply_edit(&config, ParameterEdit::Depth(0.2));
        assert_relative_eq!(outcome.config.depth, 0.425);
    }

    #[test]
    fn curve_above_is_kept_inside_the_window() {
        let config = TrenchConfiguration::default();
        let outcome = apply_edit(&config, ParameterEdit::CurveAbove(6.0));
        assert_relative_eq!(outcome.config.curve_above, 4.9);

        let at_edge = apply_edit(&config, ParameterEdit::CurveAbove(5.0));
        assert_relative_eq!(at_edge.config.curve_above, 4.9);
    }

    #[test]
    fn lowering_the_window_lowers_the_curve() {
        let config = TrenchConfiguration::default();
        let outcome = apply_edit(&config, ParameterEdit::YMax(0.5));
        assert_eq!(outcome.disposition, Disposition::Accepted);
        assert_eq!(outcome.adjustments.len(), 1);
        assert_relative_eq!(outcome.config.curve_above, 0.4);
    }

    #[test]
    fn circuit_count_outside_range_is_a_no_op() {
        let config = TrenchConfiguration::default();
        for requested in [0, 6] {
            let outcome = apply_edit(&config, ParameterEdit::CircuitCount(requested));
            assert_eq!(
                outcome.rejection(),
                Some(&EditRejection::CircuitCountOutOfRange { requested })
            );
            assert_eq!(outcome.config, config);
        }
        let outcome = apply_edit(&config, ParameterEdit::CircuitCount(5));
        assert_eq!(outcome.config.circuits, 5);
    }

    #[test]
    fn malformed_numbers_are_rejected() {
        let config = TrenchConfiguration::default();
        let outcome = apply_edit(&config, ParameterEdit::Depth(f64::NAN));
        assert!(matches!(
            outcome.rejection(),
            Some(EditRejection::NonFinite {
                field: Field::Depth,
                ..
            })
        ));
        let outcome = apply_edit(&config, ParameterEdit::CableDiameter(0.0));
        assert!(matches!(
            outcome.rejection(),
            Some(EditRejection::NonPositive {
                field: Field::CableDiameter,
                ..
            })
        ));
        assert_eq!(outcome.config, config);
    }

    #[test]
    fn current_override_does_not_clear_power() {
        let config = TrenchConfiguration::default();
        let outcome = apply_edit(&config, ParameterEdit::Current(1_085.0));
        assert!(outcome.config.current_override());
        assert_relative_eq!(outcome.config.active_power, 400.0);
        assert_relative_eq!(outcome.config.reactive_power, 100.0);
        assert_relative_eq!(outcome.config.voltage, 230.0);
        assert!(!outcome.needs_resync());
    }

    #[test]
    fn feasible_edits_are_accepted_verbatim() {
        let config = TrenchConfiguration::default();
        let outcome = apply_edit(&config, ParameterEdit::DistancePhase(0.25));
        assert_eq!(outcome.disposition, Disposition::Accepted);
        assert!(!outcome.needs_resync());
    }

    #[test]
    fn enforce_repairs_every_invariant() {
        let config = TrenchConfiguration {
            circuits: 7,
            distance_phase: 0.1,
            distance_circuit: 0.1,
            depth: 0.1,
            curve_above: 8.0,
            ..TrenchConfiguration::default()
        };
        assert_eq!(violations(&config).len(), 5);

        let enforced = enforce(&config);
        assert_eq!(enforced.config.circuits, 5);
        assert_relative_eq!(enforced.config.distance_phase, 0.25);
        assert_relative_eq!(enforced.config.distance_circuit, 0.5);
        assert_relative_eq!(enforced.config.depth, 0.375);
        assert_relative_eq!(enforced.config.curve_above, 4.9);
        assert_eq!(enforced.adjustments.len(), 5);
        assert!(violations(&enforced.config).is_empty());
    }

    #[test]
    fn enforce_restores_positive_diameter_and_limit() {
        let config = TrenchConfiguration::from_json_str(
            r#"{ "cable_diameter": -0.4, "icnirpLimit": 0.0 }"#,
        )
        .expect("valid document");
        assert_eq!(
            violations(&config),
            vec![
                Violation::NotPositive {
                    field: Field::CableDiameter,
                    value: -0.4
                },
                Violation::NotPositive {
                    field: Field::IcnirpLimit,
                    value: 0.0
                },
            ]
        );

        let enforced = enforce(&config);
        assert_relative_eq!(enforced.config.cable_diameter, 0.25);
        assert_relative_eq!(enforced.config.icnirp_limit, 200.0);
        assert_eq!(enforced.adjustments[0].field, Field::CableDiameter);
        assert_eq!(enforced.adjustments[1].field, Field::IcnirpLimit);
        assert!(violations(&enforced.config).is_empty());
        assert!(enforced.config.cable_radius() > 0.0);
    }

    #[test]
    fn enforce_replaces_non_finite_diameter() {
        let config = TrenchConfiguration {
            cable_diameter: f64::NAN,
            ..TrenchConfiguration::default()
        };
        let enforced = enforce(&config);
        assert_relative_eq!(enforced.config.cable_diameter, 0.25);
        assert!(violations(&enforced.config).is_empty());
    }

    #[test]
    fn enforce_leaves_feasible_configuration_alone() {
        let config = TrenchConfiguration::default();
        let enforced = enforce(&config);
        assert_eq!(enforced.config, config);
        assert!(enforced.adjustments.is_empty());
    }

    #[test]
    fn field_names_match_wire_format() {
        assert_eq!(Field::IcnirpLimit.to_string(), "icnirpLimit");
        assert_eq!(ParameterEdit::YMin(-4.0).field(), Field::YMin);
    }
}
