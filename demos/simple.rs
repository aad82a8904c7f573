use trenchx::{apply_edit, compose, Arrangement, Disposition, ParameterEdit, TrenchConfiguration};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Start from two flat circuits and switch them to trefoil
    let config = TrenchConfiguration::default();
    let config = apply_edit(&config, ParameterEdit::Arrangement(Arrangement::Trefoil)).config;

    // Ask for circuits closer than the phases allow
    let outcome = apply_edit(&config, ParameterEdit::DistanceCircuit(0.4));
    if let Disposition::Clamped { requested, accepted } = outcome.disposition {
        println!("Distance between circuits {requested} m clamped to {accepted} m");
    }

    // Lay out the cross-section
    let layout = compose(&outcome.config).ok_or("depth must be positive")?;
    for conductor in &layout.conductors {
        println!(
            "Circuit {} {}: ({:+.3}, {:+.3}) m",
            conductor.circuit + 1,
            conductor.phase,
            conductor.center.x,
            conductor.center.y
        );
    }
    for label in &layout.labels {
        println!("{}", label.text);
    }

    // All done
    Ok(())
}
