//! Cross-section layout of a cable trench.
//!
//! [`compose`] turns a feasible [`TrenchConfiguration`] into everything a renderer needs to
//! draw the trench: one circle per conductor plus the wall, leader and label primitives
//! that dimension the drawing. All coordinates are in metres in the layout frame described
//! on [`Point`]. The composition is a pure function of the configuration.

use tracing::debug;

use crate::arrangement::Phase;
use crate::config::TrenchConfiguration;
use crate::geometry::{point, Point};

/// Clearance added to the width occupied by the circuits.
pub const ENVELOPE_CLEARANCE: f64 = 0.3;

/// Distance from the reference cable level down to the trench floor.
pub const FLOOR_CLEARANCE: f64 = 0.3;

/// Vertical position of the circuit spacing leader.
const SPACING_LEADER_Y: f64 = 0.4;

/// Lower end of the dashed guides marking the spaced circuit origins.
const SPACING_GUIDE_Y: f64 = 0.42;

/// Vertical position of the circuit spacing label.
const SPACING_LABEL_Y: f64 = 0.55;

/// One conductor of one circuit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ConductorPlacement {
    /// Zero-based circuit index, counted from the left.
    pub circuit: usize,
    /// Phase carried by the conductor.
    pub phase: Phase,
    /// Centre of the cable.
    pub center: Point,
    /// Outer radius of the cable.
    pub radius: f64,
}

impl ConductorPlacement {
    /// Fill colour keyed by phase.
    #[must_use]
    pub fn color(&self) -> &'static str {
        self.phase.color()
    }
}

/// Stroke pattern of a line primitive.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineStyle {
    /// Continuous stroke.
    Solid,
    /// Dashed stroke for guides and reference ticks.
    Dashed,
}

/// Role of a line primitive in the drawing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LineKind {
    /// Bottom of the excavation.
    TrenchFloor,
    /// Ground surface across the trench opening.
    GroundLine,
    /// Sloped left wall.
    LeftWall,
    /// Sloped right wall.
    RightWall,
    /// Leader spanning the burial depth.
    DepthLeader,
    /// Dashed tick marking the reference cable level.
    DepthReference,
    /// Leader from the ground surface to the top of the formation.
    TopFormationLeader,
    /// Dashed guide from the top formation leader to the first circuit.
    TopFormationGuide,
    /// Leader between the first two circuit origins.
    CircuitSpacingLeader,
    /// Dashed guide dropped from a spaced circuit origin.
    CircuitSpacingGuide,
}

/// Straight line primitive.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Line {
    /// Role in the drawing.
    pub kind: LineKind,
    /// First end point.
    pub start: Point,
    /// Second end point.
    pub end: Point,
    /// Stroke pattern.
    pub style: LineStyle,
    /// Whether both ends carry an arrow head.
    pub arrows: bool,
}

impl Line {
    /// Plain solid stroke without arrow heads.
    fn solid(kind: LineKind, start: Point, end: Point) -> Self {
        Self {
            kind,
            start,
            end,
            style: LineStyle::Solid,
            arrows: false,
        }
    }

    /// Dashed guide or reference tick.
    fn dashed(kind: LineKind, start: Point, end: Point) -> Self {
        Self {
            style: LineStyle::Dashed,
            ..Self::solid(kind, start, end)
        }
    }

    /// Solid dimension leader with arrow heads at both ends.
    fn leader(kind: LineKind, start: Point, end: Point) -> Self {
        Self {
            arrows: true,
            ..Self::solid(kind, start, end)
        }
    }

    /// Length of the line in metres.
    #[must_use]
    pub fn length(&self) -> f64 {
        (self.end.to_vector() - self.start.to_vector()).norm()
    }
}

/// Horizontal alignment of a label relative to its position.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextAnchor {
    /// Text starts at the position.
    Start,
    /// Text is centred on the position.
    Middle,
    /// Text ends at the position.
    End,
}

/// Role of a label in the drawing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LabelKind {
    /// Burial depth of the reference level.
    Depth,
    /// Cover above the highest conductor.
    TopFormationDepth,
    /// Spacing between circuits.
    CircuitSpacing,
}

/// Text primitive carrying a dimension value.
#[derive(Clone, Debug, PartialEq)]
pub struct Label {
    /// Role in the drawing.
    pub kind: LabelKind,
    /// Anchor position.
    pub position: Point,
    /// Horizontal alignment.
    pub anchor: TextAnchor,
    /// Dimension value in metres.
    pub value: f64,
    /// Rendered text.
    pub text: String,
}

/// Everything needed to draw the trench cross-section.
#[derive(Clone, Debug, PartialEq)]
pub struct TrenchLayout {
    /// Width of the trench floor.
    pub width: f64,
    /// Horizontal extent of a single circuit.
    pub circuit_span: f64,
    /// Burial depth of the reference cable level.
    pub depth: f64,
    /// Conductors ordered by circuit, then phase.
    pub conductors: Vec<ConductorPlacement>,
    /// Wall, leader and guide primitives.
    pub lines: Vec<Line>,
    /// Dimension labels.
    pub labels: Vec<Label>,
}

impl TrenchLayout {
    /// Conductors belonging to one circuit.
    pub fn circuit(&self, circuit: usize) -> impl Iterator<Item = &ConductorPlacement> + '_ {
        self.conductors
            .iter()
            .filter(move |conductor| conductor.circuit == circuit)
    }

    /// Line primitives of one kind.
    pub fn lines_of(&self, kind: LineKind) -> impl Iterator<Item = &Line> + '_ {
        self.lines.iter().filter(move |line| line.kind == kind)
    }

    /// First line primitive of one kind.
    #[must_use]
    pub fn line(&self, kind: LineKind) -> Option<&Line> {
        self.lines_of(kind).next()
    }

    /// Label of one kind.
    #[must_use]
    pub fn label(&self, kind: LabelKind) -> Option<&Label> {
        self.labels.iter().find(|label| label.kind == kind)
    }

    /// Bounding box of every primitive as `(top_left, bottom_right)`.
    ///
    /// Renderers use this to fit the drawing into a view box.
    #[must_use]
    pub fn bounds(&self) -> (Point, Point) {
        let corners = self
            .conductors
            .iter()
            .flat_map(|conductor| {
                let r = conductor.radius;
                [
                    point(conductor.center.x - r, conductor.center.y - r),
                    point(conductor.center.x + r, conductor.center.y + r),
                ]
            })
            .chain(self.lines.iter().flat_map(|line| [line.start, line.end]))
            .chain(self.labels.iter().map(|label| label.position));

        let (min, max) = corners.fold(
            (
                point(f64::INFINITY, f64::INFINITY),
                point(f64::NEG_INFINITY, f64::NEG_INFINITY),
            ),
            |(min, max), corner| {
                (
                    point(min.x.min(corner.x), min.y.min(corner.y)),
                    point(max.x.max(corner.x), max.y.max(corner.y)),
                )
            },
        );
        (min, max)
    }
}

/// Horizontal extent of one circuit in metres.
#[must_use]
pub fn circuit_span(config: &TrenchConfiguration) -> f64 {
    config.arrangement.horizontal_extent() * config.distance_phase
}

/// Width of the trench floor in metres.
///
/// # Examples
/// ```
/// use trenchx::{envelope_width, TrenchConfiguration};
///
/// // Two flat circuits 1.6 m apart with 0.3 m phase spacing.
/// let width = envelope_width(&TrenchConfiguration::default());
/// assert!((width - 2.5).abs() < 1.0e-12);
/// ```
#[must_use]
pub fn envelope_width(config: &TrenchConfiguration) -> f64 {
    config.distance_circuit * f64::from(config.circuits.saturating_sub(1))
        + circuit_span(config)
        + ENVELOPE_CLEARANCE
}

/// Horizontal position of a circuit origin relative to the trench centre.
#[must_use]
pub fn circuit_origin_x(config: &TrenchConfiguration, circuit: usize) -> f64 {
    let centre_index = f64::from(config.circuits.saturating_sub(1)) / 2.0;
    config.distance_circuit * (circuit as f64 - centre_index)
}

/// Mirror factor applied to the horizontal phase offsets of a circuit.
///
/// Odd circuits are mirrored so neighbouring bundles nest against each other.
#[must_use]
pub const fn mirror_factor(circuit: usize) -> f64 {
    if circuit % 2 == 0 {
        1.0
    } else {
        -1.0
    }
}

/// Cover between the ground surface and the top of the highest conductor in metres.
///
/// # Examples
/// ```
/// use trenchx::{top_formation_depth, Arrangement, TrenchConfiguration};
///
/// let config = TrenchConfiguration {
///     arrangement: Arrangement::Trefoil,
///     ..TrenchConfiguration::default()
/// };
/// assert!((top_formation_depth(&config) - 0.415).abs() < 1.0e-3);
/// ```
#[must_use]
pub fn top_formation_depth(config: &TrenchConfiguration) -> f64 {
    config.depth + config.arrangement.top_formation_offset() * config.distance_phase
        - config.cable_radius()
}

/// Place every conductor of every circuit.
#[must_use]
pub fn place_conductors(config: &TrenchConfiguration) -> Vec<ConductorPlacement> {
    let offsets = config.arrangement.phase_offsets();
    let radius = config.cable_radius();
    let circuits = config.circuits as usize;

    let mut conductors = Vec::with_capacity(circuits * offsets.len());
    for circuit in 0..circuits {
        let origin_x = circuit_origin_x(config, circuit);
        let mirror = mirror_factor(circuit);
        for (phase, offset) in Phase::ALL.into_iter().zip(offsets) {
            conductors.push(ConductorPlacement {
                circuit,
                phase,
                center: point(
                    origin_x + mirror * config.distance_phase * offset.dx,
                    config.distance_phase * offset.dy,
                ),
                radius,
            });
        }
    }
    conductors
}

/// Compose the full cross-section drawing.
///
/// Returns `None` while the depth is not positive; the layout is then considered not yet
/// specified rather than invalid.
#[must_use]
pub fn compose(config: &TrenchConfiguration) -> Option<TrenchLayout> {
    if config.depth <= 0.0 {
        debug!(depth = config.depth, "depth not positive; no layout emitted");
        return None;
    }

    let width = envelope_width(config);
    let half = width / 2.0;
    let depth = config.depth;
    let ground = -depth;
    let flare = (depth + FLOOR_CLEARANCE) / 2.0;

    let mut lines = vec![
        Line::solid(
            LineKind::TrenchFloor,
            point(-half, FLOOR_CLEARANCE),
            point(half, FLOOR_CLEARANCE),
        ),
        Line::solid(
            LineKind::GroundLine,
            point(-(half + flare + FLOOR_CLEARANCE), ground),
            point(half + flare + FLOOR_CLEARANCE, ground),
        ),
        Line::solid(
            LineKind::LeftWall,
            point(-half, FLOOR_CLEARANCE),
            point(-(half + flare), ground),
        ),
        Line::solid(
            LineKind::RightWall,
            point(half, FLOOR_CLEARANCE),
            point(half + flare, ground),
        ),
    ];
    let mut labels = Vec::new();

    // Depth of the reference level, dimensioned on the right.
    let leader_offset = half + (depth + 0.5) / 2.0;
    lines.push(Line::leader(
        LineKind::DepthLeader,
        point(leader_offset, 0.0),
        point(leader_offset, ground),
    ));
    lines.push(Line::dashed(
        LineKind::DepthReference,
        point(half + (depth - 1.0) / 2.0, 0.0),
        point(half + (depth + 1.0) / 2.0, 0.0),
    ));
    labels.push(Label {
        kind: LabelKind::Depth,
        position: point(half + (depth + 0.8) / 2.0, ground / 2.0),
        anchor: TextAnchor::Middle,
        value: depth,
        text: format!("Depth = {depth} m"),
    });

    // Cover above the formation, dimensioned on the left.
    let cover = top_formation_depth(config);
    let apex_y = config.arrangement.top_formation_offset() * config.distance_phase
        - config.cable_radius();
    lines.push(Line::leader(
        LineKind::TopFormationLeader,
        point(-leader_offset, ground),
        point(-leader_offset, apex_y),
    ));
    lines.push(Line::dashed(
        LineKind::TopFormationGuide,
        point(-leader_offset, apex_y),
        point(circuit_origin_x(config, 0), apex_y),
    ));
    labels.push(Label {
        kind: LabelKind::TopFormationDepth,
        position: point(-(half + (depth + 0.8) / 2.0), apex_y),
        anchor: TextAnchor::End,
        value: cover,
        text: format!("Top Formation Depth = {cover:.2} m"),
    });

    if config.circuits > 1 {
        let first = circuit_origin_x(config, 0);
        let second = circuit_origin_x(config, 1);
        lines.push(Line::leader(
            LineKind::CircuitSpacingLeader,
            point(first, SPACING_LEADER_Y),
            point(second, SPACING_LEADER_Y),
        ));
        for origin in [first, second] {
            lines.push(Line::dashed(
                LineKind::CircuitSpacingGuide,
                point(origin, SPACING_GUIDE_Y),
                point(origin, 0.0),
            ));
        }
        labels.push(Label {
            kind: LabelKind::CircuitSpacing,
            position: point(first, SPACING_LABEL_Y),
            anchor: TextAnchor::Start,
            value: config.distance_circuit,
            text: format!("Distance between circuits = {}", config.distance_circuit),
        });
    }

    let conductors = place_conductors(config);
    debug!(
        circuits = config.circuits,
        arrangement = %config.arrangement,
        width,
        conductors = conductors.len(),
        "composed trench layout"
    );

    Some(TrenchLayout {
        width,
        circuit_span: circuit_span(config),
        depth,
        conductors,
        lines,
        labels,
    })
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::arrangement::Arrangement;

    /// Default trench with the given arrangement and circuit count.
    fn config(arrangement: Arrangement, circuits: u32) -> TrenchConfiguration {
        TrenchConfiguration {
            arrangement,
            circuits,
            ..TrenchConfiguration::default()
        }
    }

    #[test]
    fn envelope_width_covers_circuits_and_clearance() {
        assert_relative_eq!(
            envelope_width(&config(Arrangement::Flat, 2)),
            1.6 + 0.6 + 0.3,
            epsilon = 1.0e-12
        );
        assert_relative_eq!(
            envelope_width(&config(Arrangement::Trefoil, 3)),
            3.2 + 0.3 + 0.3,
            epsilon = 1.0e-12
        );
        assert_relative_eq!(
            envelope_width(&config(Arrangement::RightAngle, 1)),
            0.3 + 0.3,
            epsilon = 1.0e-12
        );
    }

    #[test]
    fn circuits_are_centred_on_the_trench() {
        let config = config(Arrangement::Flat, 3);
        assert_relative_eq!(circuit_origin_x(&config, 0), -1.6);
        assert_relative_eq!(circuit_origin_x(&config, 1), 0.0);
        assert_relative_eq!(circuit_origin_x(&config, 2), 1.6);
    }

    #[test]
    fn conductors_are_ordered_by_circuit_then_phase() {
        let conductors = place_conductors(&config(Arrangement::Flat, 2));
        assert_eq!(conductors.len(), 6);
        assert_eq!(conductors[0].circuit, 0);
        assert_eq!(conductors[0].phase, Phase::L1);
        assert_eq!(conductors[5].circuit, 1);
        assert_eq!(conductors[5].phase, Phase::L3);
        assert_eq!(conductors[4].color(), "#000000");
        for conductor in &conductors {
            assert_relative_eq!(conductor.radius, 0.125);
        }
    }

    #[test]
    fn odd_circuits_are_mirrored() {
        let config = config(Arrangement::RightAngle, 2);
        let conductors = place_conductors(&config);
        // L1 sits on the right of the first circuit and on the left of the second.
        assert_relative_eq!(conductors[0].center.x, -0.8 + 0.15, epsilon = 1.0e-12);
        assert_relative_eq!(conductors[3].center.x, 0.8 - 0.15, epsilon = 1.0e-12);
        // Vertical offsets are never mirrored.
        assert_relative_eq!(conductors[0].center.y, -0.3);
        assert_relative_eq!(conductors[3].center.y, -0.3);
    }

    #[test]
    fn trefoil_apex_is_lifted() {
        let conductors = place_conductors(&config(Arrangement::Trefoil, 1));
        assert_relative_eq!(conductors[0].center.x, 0.0);
        assert_relative_eq!(conductors[0].center.y, -0.3 * 0.75_f64.sqrt(), epsilon = 1.0e-12);
        assert_relative_eq!(conductors[1].center.x, -0.15, epsilon = 1.0e-12);
        assert_relative_eq!(conductors[2].center.y, 0.0);
    }

    #[test]
    fn top_formation_depth_depends_on_arrangement() {
        assert_relative_eq!(
            top_formation_depth(&config(Arrangement::Flat, 2)),
            0.675,
            epsilon = 1.0e-12
        );
        assert_relative_eq!(
            top_formation_depth(&config(Arrangement::RightAngle, 2)),
            0.675,
            epsilon = 1.0e-12
        );
        assert_relative_eq!(
            top_formation_depth(&config(Arrangement::Trefoil, 2)),
            0.8 - 0.75_f64.sqrt() * 0.3 - 0.125,
            epsilon = 1.0e-12
        );
    }

    #[test]
    fn walls_slope_outwards_from_the_floor() {
        let layout = compose(&config(Arrangement::Flat, 2)).expect("positive depth");
        let floor = layout.line(LineKind::TrenchFloor).expect("floor drawn");
        assert_relative_eq!(floor.length(), layout.width, epsilon = 1.0e-12);
        assert_relative_eq!(floor.start.y, FLOOR_CLEARANCE);

        let left = layout.line(LineKind::LeftWall).expect("left wall drawn");
        let right = layout.line(LineKind::RightWall).expect("right wall drawn");
        assert_relative_eq!(left.end.y, -0.8);
        assert_relative_eq!(left.end.x, -(1.25 + 0.55), epsilon = 1.0e-12);
        assert_relative_eq!(right.end.x, 1.25 + 0.55, epsilon = 1.0e-12);

        let ground = layout.line(LineKind::GroundLine).expect("ground drawn");
        assert!(ground.start.x < left.end.x);
        assert!(ground.end.x > right.end.x);
    }

    #[test]
    fn depth_is_dimensioned_on_the_right() {
        let layout = compose(&config(Arrangement::Flat, 2)).expect("positive depth");
        let leader = layout.line(LineKind::DepthLeader).expect("leader drawn");
        assert!(leader.arrows);
        assert_relative_eq!(leader.length(), 0.8, epsilon = 1.0e-12);
        assert!(leader.start.x > layout.width / 2.0);

        let label = layout.label(LabelKind::Depth).expect("label drawn");
        assert_eq!(label.text, "Depth = 0.8 m");
        assert_eq!(label.anchor, TextAnchor::Middle);

        let tick = layout.line(LineKind::DepthReference).expect("tick drawn");
        assert_eq!(tick.style, LineStyle::Dashed);
        assert_relative_eq!(tick.length(), 1.0, epsilon = 1.0e-12);
    }

    #[test]
    fn top_formation_is_dimensioned_on_the_left() {
        let layout = compose(&config(Arrangement::Trefoil, 2)).expect("positive depth");
        let label = layout
            .label(LabelKind::TopFormationDepth)
            .expect("label drawn");
        assert_eq!(label.text, "Top Formation Depth = 0.42 m");
        assert_eq!(label.anchor, TextAnchor::End);

        let leader = layout
            .line(LineKind::TopFormationLeader)
            .expect("leader drawn");
        assert!(leader.start.x < 0.0);
        assert_relative_eq!(leader.length(), label.value, epsilon = 1.0e-12);

        let guide = layout
            .line(LineKind::TopFormationGuide)
            .expect("guide drawn");
        assert_relative_eq!(guide.end.x, -0.8, epsilon = 1.0e-12);
    }

    #[test]
    fn spacing_is_only_dimensioned_for_several_circuits() {
        let single = compose(&config(Arrangement::Flat, 1)).expect("positive depth");
        assert!(single.line(LineKind::CircuitSpacingLeader).is_none());
        assert!(single.label(LabelKind::CircuitSpacing).is_none());

        let triple = compose(&config(Arrangement::Flat, 3)).expect("positive depth");
        let leader = triple
            .line(LineKind::CircuitSpacingLeader)
            .expect("leader drawn");
        assert_relative_eq!(leader.start.x, -1.6, epsilon = 1.0e-12);
        assert_relative_eq!(leader.end.x, 0.0, epsilon = 1.0e-12);
        assert_eq!(triple.lines_of(LineKind::CircuitSpacingGuide).count(), 2);
        let label = triple.label(LabelKind::CircuitSpacing).expect("label drawn");
        assert_eq!(label.text, "Distance between circuits = 1.6");
    }

    #[test]
    fn no_layout_without_positive_depth() {
        let mut config = config(Arrangement::Flat, 2);
        config.depth = 0.0;
        assert!(compose(&config).is_none());
        config.depth = -1.0;
        assert!(compose(&config).is_none());
    }

    #[test]
    fn bounds_enclose_every_primitive() {
        let layout = compose(&config(Arrangement::Trefoil, 4)).expect("positive depth");
        let (min, max) = layout.bounds();
        let ground = layout.line(LineKind::GroundLine).expect("ground drawn");
        assert!(min.x <= ground.start.x);
        assert!(max.x >= ground.end.x);
        assert_relative_eq!(min.y, -0.8);
        assert!(max.y >= SPACING_LABEL_Y);
    }
}
