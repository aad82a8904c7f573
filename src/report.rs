use crate::analysis::{AnalysisSummary, FieldMapOutput};
use crate::conditions::Conditions;
use std::fmt::Write;
use trenchx::{CalculationState, Disposition, LabelKind, ProfileMaximum};

/// Render a textual summary of the trench study.
///
/// Clamped and rejected edits come first so the reader knows which numbers were changed
/// before the geometry and flux results are listed.
#[must_use]
pub fn render_summary(conditions: &Conditions, summary: &AnalysisSummary) -> String {
    let mut output = String::new();
    let config = &summary.config;

    writeln!(
        &mut output,
        "Cable trench: {} circuit(s), {} arrangement, cable diameter = {} m",
        config.circuits, config.arrangement, config.cable_diameter
    )
    .expect("writing to string cannot fail");

    for repair in &conditions.repairs {
        writeln!(
            &mut output,
            "Loaded {} = {} was infeasible; using {}",
            repair.field, repair.previous, repair.value
        )
        .expect("writing to string cannot fail");
    }

    for outcome in &conditions.outcomes {
        match &outcome.disposition {
            Disposition::Accepted => {}
            Disposition::Clamped {
                requested,
                accepted,
            } => writeln!(
                &mut output,
                "Requested {} = {requested} clamped to {accepted}",
                outcome.field
            )
            .expect("writing to string cannot fail"),
            Disposition::Rejected(rejection) => {
                writeln!(&mut output, "Ignored edit: {rejection}")
                    .expect("writing to string cannot fail");
            }
        }
        for adjustment in &outcome.adjustments {
            writeln!(
                &mut output,
                "  {} raised from {} to {}",
                adjustment.field, adjustment.previous, adjustment.value
            )
            .expect("writing to string cannot fail");
        }
    }

    match &summary.layout {
        Some(layout) => {
            writeln!(&mut output, "Trench floor width: {:.2} m", layout.width)
                .expect("writing to string cannot fail");
            for conductor in &layout.conductors {
                writeln!(
                    &mut output,
                    "  circuit {} {}: x = {:+.3} m, y = {:+.3} m",
                    conductor.circuit + 1,
                    conductor.phase,
                    conductor.center.x,
                    conductor.center.y
                )
                .expect("writing to string cannot fail");
            }
            for kind in [
                LabelKind::Depth,
                LabelKind::TopFormationDepth,
                LabelKind::CircuitSpacing,
            ] {
                if let Some(label) = layout.label(kind) {
                    writeln!(&mut output, "{}", label.text)
                        .expect("writing to string cannot fail");
                }
            }
        }
        None => output.push_str("Layout: not available (depth must be positive)\n"),
    }

    if let Some(profile) = &summary.profile {
        writeln!(
            &mut output,
            "Flux profile: {} samples, ICNIRP limit = {} uT",
            profile.len(),
            profile.threshold
        )
        .expect("writing to string cannot fail");
        write_maximum(&mut output, "ground level", profile.max_ground, profile.threshold);
        write_maximum(
            &mut output,
            &format!("{} m above ground", config.curve_above),
            profile.max_above,
            profile.threshold,
        );
    } else if summary.state == CalculationState::Idle {
        output.push_str("Flux profile: not requested (no solver configured)\n");
    } else {
        writeln!(
            &mut output,
            "Flux profile: not available ({})",
            summary.error.as_deref().unwrap_or("no result")
        )
        .expect("writing to string cannot fail");
    }

    // Saving the field map is best effort, so say what became of it.
    match &summary.field_map {
        Some(FieldMapOutput::Written(path)) => {
            writeln!(&mut output, "Field map written to {}", path.display())
                .expect("writing to string cannot fail");
        }
        Some(FieldMapOutput::Missing) => {
            output.push_str("Field map: not written (solver sent no image)\n");
        }
        Some(FieldMapOutput::Failed(error)) => {
            writeln!(&mut output, "Field map: not written ({error})")
                .expect("writing to string cannot fail");
        }
        None => {}
    }

    output
}

/// Append one profile maximum and whether it reaches the limit.
fn write_maximum(output: &mut String, level: &str, maximum: Option<ProfileMaximum>, limit: f64) {
    let Some(maximum) = maximum else {
        return;
    };
    let verdict = if maximum.reaches(limit) {
        "at or above limit"
    } else {
        "below limit"
    };
    writeln!(
        output,
        "  max B at {level}: {:.2} uT at x = {:.1} m ({verdict})",
        maximum.value, maximum.x
    )
    .expect("writing to string cannot fail");
}
