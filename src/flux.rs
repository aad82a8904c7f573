//! Display reduction of the flux-density profiles returned by the field solver.
//!
//! The solver samples the transverse axis densely; charts only need every second sample.
//! [`reduce`] decimates the three index-aligned series, finds the maximum of each flux
//! profile and flags the samples that exceed the exposure threshold. The source samples
//! are never modified.

use crate::errors::SolverError;

/// One transverse sample of the magnetic flux density.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FluxSample {
    /// Transverse position in metres.
    pub x: f64,
    /// Flux density at ground level in microtesla.
    pub ground: f64,
    /// Flux density at the calculation height in microtesla.
    pub above: f64,
}

/// Peak of a reduced flux profile.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProfileMaximum {
    /// Peak flux density in microtesla.
    pub value: f64,
    /// Transverse position of the first sample reaching the peak.
    pub x: f64,
    /// Index of that sample in the reduced series.
    pub index: usize,
}

impl ProfileMaximum {
    /// Whether the peak reaches `limit`.
    ///
    /// The peak annotation is flagged from the limit itself upwards, while the per-sample
    /// flags of [`ReducedProfile`] only mark values strictly above it.
    #[must_use]
    pub fn reaches(&self, limit: f64) -> bool {
        self.value >= limit
    }
}

/// Display-ready flux profiles.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ReducedProfile {
    /// Retained transverse positions.
    pub x: Vec<f64>,
    /// Retained ground-level flux densities.
    pub ground: Vec<f64>,
    /// Retained flux densities at the calculation height.
    pub above: Vec<f64>,
    /// Per-sample flag for ground-level values above the threshold.
    pub ground_exceeds: Vec<bool>,
    /// Per-sample flag for calculation-height values above the threshold.
    pub above_exceeds: Vec<bool>,
    /// Peak of the ground-level profile; absent for an empty profile.
    pub max_ground: Option<ProfileMaximum>,
    /// Peak of the calculation-height profile; absent for an empty profile.
    pub max_above: Option<ProfileMaximum>,
    /// Threshold the samples were compared against.
    pub threshold: f64,
}

impl ReducedProfile {
    /// Number of retained samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.x.len()
    }

    /// Whether no samples were retained.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Transverse positions formatted with one decimal, as chart axis labels.
    #[must_use]
    pub fn x_labels(&self) -> Vec<String> {
        self.x.iter().map(|x| format!("{x:.1}")).collect()
    }
}

/// Zip the solver's three parallel series into samples.
///
/// # Errors
///
/// Returns [`SolverError::MisalignedSeries`] when the series lengths differ.
pub fn samples_from_series(
    x: &[f64],
    ground: &[f64],
    above: &[f64],
) -> Result<Vec<FluxSample>, SolverError> {
    if x.len() != ground.len() || x.len() != above.len() {
        return Err(SolverError::MisalignedSeries {
            x: x.len(),
            ground: ground.len(),
            above: above.len(),
        });
    }
    Ok(x.iter()
        .zip(ground)
        .zip(above)
        .map(|((&x, &ground), &above)| FluxSample { x, ground, above })
        .collect())
}

/// Keep the samples at even indices.
#[must_use]
pub fn decimate<T: Copy>(series: &[T]) -> Vec<T> {
    series.iter().step_by(2).copied().collect()
}

/// Reduce a sample sequence for display against `threshold`.
///
/// # Examples
/// ```
/// use trenchx::flux::{reduce, FluxSample};
///
/// let samples: Vec<FluxSample> = (1..=6)
///     .map(|i| FluxSample { x: f64::from(i), ground: f64::from(i), above: 0.0 })
///     .collect();
/// let profile = reduce(&samples, 200.0);
/// assert_eq!(profile.ground, vec![1.0, 3.0, 5.0]);
/// let peak = profile.max_ground.expect("non-empty profile");
/// assert_eq!((peak.value, peak.index), (5.0, 2));
/// ```
#[must_use]
pub fn reduce(samples: &[FluxSample], threshold: f64) -> ReducedProfile {
    let kept = decimate(samples);
    let x: Vec<f64> = kept.iter().map(|sample| sample.x).collect();
    let ground: Vec<f64> = kept.iter().map(|sample| sample.ground).collect();
    let above: Vec<f64> = kept.iter().map(|sample| sample.above).collect();

    ReducedProfile {
        ground_exceeds: flag_exceedances(&ground, threshold),
        above_exceeds: flag_exceedances(&above, threshold),
        max_ground: maximum(&x, &ground),
        max_above: maximum(&x, &above),
        x,
        ground,
        above,
        threshold,
    }
}

/// Mark every value strictly above `threshold`.
fn flag_exceedances(series: &[f64], threshold: f64) -> Vec<bool> {
    series.iter().map(|&value| value > threshold).collect()
}

/// First occurrence of the largest value; NaN samples never win.
fn maximum(x: &[f64], series: &[f64]) -> Option<ProfileMaximum> {
    let mut best: Option<ProfileMaximum> = None;
    for (index, (&x, &value)) in x.iter().zip(series).enumerate() {
        let better = match best {
            None => !value.is_nan(),
            Some(current) => value > current.value,
        };
        if better {
            best = Some(ProfileMaximum { value, x, index });
        }
    }
    best
}
