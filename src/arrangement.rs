//! Installation arrangements and the fixed phase offsets they imply.
//!
//! Every circuit carries three single-core conductors (L1, L2, L3). How they are bundled
//! inside the trench is described by an [`Arrangement`], which resolves to a constant table
//! of [`PhaseOffset`]s expressed in units of the centre-to-centre phase spacing.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::ParseArrangementError;
use crate::geometry::PhaseOffset;

/// Height of an equilateral triangle with unit sides.
const TRIANGLE_HEIGHT: f64 = 0.866_025_403_784_438_6;

/// Apex conductor on top, the other two side by side below it.
const TREFOIL: [PhaseOffset; 3] = [
    PhaseOffset::new(0.0, -TRIANGLE_HEIGHT),
    PhaseOffset::new(-0.5, 0.0),
    PhaseOffset::new(0.5, 0.0),
];

/// Three conductors in one horizontal row.
const FLAT: [PhaseOffset; 3] = [
    PhaseOffset::new(-1.0, 0.0),
    PhaseOffset::new(0.0, 0.0),
    PhaseOffset::new(1.0, 0.0),
];

/// Two conductors side by side with the third stacked above the right one.
const RIGHT_ANGLE: [PhaseOffset; 3] = [
    PhaseOffset::new(0.5, -1.0),
    PhaseOffset::new(-0.5, 0.0),
    PhaseOffset::new(0.5, 0.0),
];

/// Bundling pattern of the three phases within a circuit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Arrangement {
    /// Triangular bundle with the apex conductor on top.
    Trefoil,
    /// Single horizontal row.
    #[default]
    Flat,
    /// L-shaped bundle.
    RightAngle,
}

impl Arrangement {
    /// All supported arrangements.
    pub const ALL: [Arrangement; 3] = [
        Arrangement::Trefoil,
        Arrangement::Flat,
        Arrangement::RightAngle,
    ];

    /// Unit offsets for L1, L2 and L3, in that order.
    ///
    /// # Examples
    /// ```
    /// use trenchx::Arrangement;
    ///
    /// let offsets = Arrangement::Flat.phase_offsets();
    /// assert_eq!(offsets[0].dx, -1.0);
    /// assert_eq!(offsets[2].dx, 1.0);
    /// ```
    #[must_use]
    pub const fn phase_offsets(self) -> [PhaseOffset; 3] {
        match self {
            Arrangement::Trefoil => TREFOIL,
            Arrangement::Flat => FLAT,
            Arrangement::RightAngle => RIGHT_ANGLE,
        }
    }

    /// Horizontal extent of one circuit in units of the phase spacing.
    #[must_use]
    pub fn horizontal_extent(self) -> f64 {
        let offsets = self.phase_offsets();
        let (min, max) = offsets
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), offset| {
                (min.min(offset.dx), max.max(offset.dx))
            });
        max - min
    }

    /// Vertical offset of the conductor used to dimension the top of the formation.
    ///
    /// Only the trefoil apex is lifted; the right-angle bundle is dimensioned from the
    /// reference level like the flat row.
    #[must_use]
    pub const fn top_formation_offset(self) -> f64 {
        match self {
            Arrangement::Trefoil => -TRIANGLE_HEIGHT,
            Arrangement::Flat | Arrangement::RightAngle => 0.0,
        }
    }

    /// Whether the external solver should model the circuit as a trefoil.
    #[must_use]
    pub const fn is_trefoil(self) -> bool {
        matches!(self, Arrangement::Trefoil)
    }

    /// Lower-case identifier used on the command line and in configuration files.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Arrangement::Trefoil => "trefoil",
            Arrangement::Flat => "flat",
            Arrangement::RightAngle => "right-angle",
        }
    }
}

impl fmt::Display for Arrangement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Arrangement {
    type Err = ParseArrangementError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase().replace('_', "-");
        if normalized == "right" {
            return Ok(Arrangement::RightAngle);
        }
        Arrangement::ALL
            .into_iter()
            .find(|arrangement| arrangement.name() == normalized)
            .ok_or_else(|| ParseArrangementError(value.to_string()))
    }
}

/// One of the three phase conductors of a circuit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    /// First phase.
    L1,
    /// Second phase.
    L2,
    /// Third phase.
    L3,
}

impl Phase {
    /// Phases in conductor order.
    pub const ALL: [Phase; 3] = [Phase::L1, Phase::L2, Phase::L3];

    /// Zero-based conductor index within a circuit.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Phase::L1 => 0,
            Phase::L2 => 1,
            Phase::L3 => 2,
        }
    }

    /// Fill colour used when drawing the conductor.
    #[must_use]
    pub const fn color(self) -> &'static str {
        match self {
            Phase::L1 => "#b27e59",
            Phase::L2 => "#000000",
            Phase::L3 => "#a6a6a6",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}", self.index() + 1)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn trefoil_offsets_form_an_apex_up_triangle() {
        let offsets = Arrangement::Trefoil.phase_offsets();
        assert_relative_eq!(offsets[0].dy, -(3.0_f64.sqrt()) / 2.0, epsilon = 1.0e-15);
        assert_eq!(offsets[1], PhaseOffset::new(-0.5, 0.0));
        assert_eq!(offsets[2], PhaseOffset::new(0.5, 0.0));
    }

    #[test]
    fn right_angle_offsets_form_an_l_shape() {
        let offsets = Arrangement::RightAngle.phase_offsets();
        assert_eq!(offsets[0], PhaseOffset::new(0.5, -1.0));
        assert_eq!(offsets[1], PhaseOffset::new(-0.5, 0.0));
        assert_eq!(offsets[2], PhaseOffset::new(0.5, 0.0));
    }

    #[test]
    fn horizontal_extent_matches_offset_tables() {
        assert_relative_eq!(Arrangement::Flat.horizontal_extent(), 2.0);
        assert_relative_eq!(Arrangement::Trefoil.horizontal_extent(), 1.0);
        assert_relative_eq!(Arrangement::RightAngle.horizontal_extent(), 1.0);
    }

    #[test]
    fn arrangement_names_parse_back() {
        for arrangement in Arrangement::ALL {
            let parsed: Arrangement = arrangement.to_string().parse().expect("name parses");
            assert_eq!(parsed, arrangement);
        }
        assert_eq!("Right_Angle".parse::<Arrangement>(), Ok(Arrangement::RightAngle));
        assert!("hexagonal".parse::<Arrangement>().is_err());
    }

    #[test]
    fn arrangement_serializes_in_kebab_case() {
        let json = serde_json::to_string(&Arrangement::RightAngle).expect("serializes");
        assert_eq!(json, "\"right-angle\"");
    }

    #[test]
    fn phases_are_labelled_and_coloured() {
        assert_eq!(Phase::L2.index(), 1);
        assert_eq!(Phase::L3.to_string(), "L3");
        assert_eq!(Phase::L1.color(), "#b27e59");
    }
}
