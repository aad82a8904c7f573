mod analysis;
mod conditions;
mod report;

use analysis::run_analysis;
use clap::Parser;
use conditions::{apply_conditions, Args};
use report::render_summary;
use std::error::Error;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use trenchx::HttpSolver;

fn main() -> Result<(), Box<dyn Error>> {
    // Diagnostics go to stderr so the report on stdout stays clean. RUST_LOG picks the
    // verbosity; warnings are shown by default so rejected edits are never silent.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    // Load the starting configuration, repair it if it came from an older or hand-edited
    // file, and push every requested edit through the feasibility rules. From here on the
    // configuration satisfies every spacing and depth constraint.
    let conditions = apply_conditions(&args)?;

    // The field solver is optional; without it only the cross-section is produced. The
    // timeout bounds the whole exchange, including reading the response body.
    let solver = args
        .solver_url
        .as_deref()
        .map(|url| HttpSolver::with_timeout(url, Duration::from_secs(args.timeout_secs)));

    // Place the conductors, dimension the trench and, when a solver is available, reduce
    // its flux profiles against the ICNIRP limit. A field map that cannot be saved is
    // reported alongside the results rather than aborting the run.
    let summary = run_analysis(&conditions.config, solver.as_ref(), args.image_out.as_deref());

    // Render a report that lists clamped edits first, then the geometry and the flux
    // maxima, and print it to standard output for the CLI user.
    let report = render_summary(&conditions, &summary);
    println!("{report}");

    Ok(())
}
