#![warn(clippy::all)]
#![warn(missing_docs)]
#![warn(rustdoc::missing_doc_code_examples)]
#![warn(clippy::missing_docs_in_private_items)]
#![doc = include_str!("../README.md")]

pub mod arrangement;
pub mod config;
pub mod constraints;
pub mod errors;
pub mod flux;
pub mod geometry;
pub mod layout;
pub mod solver;

pub use arrangement::{Arrangement, Phase};
pub use config::{CalculationArea, Load, TrenchConfiguration, MAX_CIRCUITS};
pub use constraints::{
    apply_edit, enforce, violations, Adjustment, Disposition, EditOutcome, Enforced, Field,
    ParameterEdit, Violation,
};
pub use errors::{ConfigError, EditRejection, ParseArrangementError, SolverError};
pub use flux::{FluxSample, ProfileMaximum, ReducedProfile};
pub use geometry::{point, PhaseOffset, Point};
pub use layout::{
    compose, envelope_width, top_formation_depth, ConductorPlacement, Label, LabelKind, Line,
    LineKind, LineStyle, TextAnchor, TrenchLayout,
};
pub use solver::{
    Calculation, CalculationState, FieldSolver, HttpSolver, SolverRequest, SolverResponse,
};
