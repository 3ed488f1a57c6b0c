//! Benchmark scenarios: procedural mesh + handles + motion + config.
//!
//! Three canonical scenarios for regression testing:
//! 1. **Translate triangle**: one vertex of a lone triangle is dragged, the
//!    result must be an exact translation
//! 2. **Grid bend**: one grid corner fixed, the opposite corner swung 90°
//!    out of plane
//! 3. **Strip twist**: one end of a long strip fixed, the other twisted 180°

use std::f64::consts::{FRAC_PI_2, PI};

use serde::{Deserialize, Serialize};

use rigid_math::{DAffine3, DVec3};
use rigid_mesh::generators::{quad_grid, single_triangle};
use rigid_mesh::TriangleMesh;
use rigid_solver::ArapConfig;

/// Which benchmark scenario to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScenarioKind {
    /// Single triangle, one handle translated.
    TranslateTriangle,
    /// Planar grid, corner swung about a fixed corner.
    GridBend,
    /// Long strip, far end twisted about the strip axis.
    StripTwist,
}

impl ScenarioKind {
    /// Returns all scenario kinds.
    pub fn all() -> &'static [ScenarioKind] {
        &[
            ScenarioKind::TranslateTriangle,
            ScenarioKind::GridBend,
            ScenarioKind::StripTwist,
        ]
    }

    /// Returns a human-readable name.
    pub fn name(&self) -> &'static str {
        match self {
            ScenarioKind::TranslateTriangle => "translate_triangle",
            ScenarioKind::GridBend => "grid_bend",
            ScenarioKind::StripTwist => "strip_twist",
        }
    }

    /// Parses a name produced by [`ScenarioKind::name`].
    pub fn from_name(name: &str) -> Option<Self> {
        Self::all().iter().copied().find(|k| k.name() == name)
    }
}

/// Rigid motion applied to the moving handle group, reached at the last frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HandleMotion {
    /// Straight-line translation.
    Translate(DVec3),
    /// Rotation by `angle` radians about `axis` through `pivot`.
    Rotate { axis: DVec3, pivot: DVec3, angle: f64 },
}

impl HandleMotion {
    /// Transform at progress `t` in `[0, 1]`.
    pub fn transform_at(&self, t: f64) -> DAffine3 {
        match *self {
            HandleMotion::Translate(offset) => DAffine3::from_translation(offset * t),
            HandleMotion::Rotate { axis, pivot, angle } => {
                DAffine3::from_translation(pivot)
                    * DAffine3::from_axis_angle(axis.normalize(), angle * t)
                    * DAffine3::from_translation(-pivot)
            }
        }
    }
}

/// A fully specified benchmark scenario.
pub struct Scenario {
    /// Scenario type.
    pub kind: ScenarioKind,
    /// Rest mesh.
    pub mesh: TriangleMesh,
    /// Handle vertices held at rest.
    pub fixed: Vec<u32>,
    /// Handle vertices driven by `motion`.
    pub moving: Vec<u32>,
    /// Motion of the moving group over the run.
    pub motion: HandleMotion,
    /// Solver configuration.
    pub config: ArapConfig,
    /// Number of frames to step.
    pub frames: u32,
}

impl Scenario {
    /// Create the translate-triangle scenario.
    ///
    /// Vertex 0 of the unit right triangle is dragged by (0.5, 0.25, 0.1);
    /// the two free vertices must follow exactly.
    pub fn translate_triangle() -> Self {
        Self {
            kind: ScenarioKind::TranslateTriangle,
            mesh: single_triangle(),
            fixed: Vec::new(),
            moving: vec![0],
            motion: HandleMotion::Translate(DVec3::new(0.5, 0.25, 0.1)),
            config: ArapConfig::with_iterations(5),
            frames: 10,
        }
    }

    /// Create the grid bend scenario.
    ///
    /// A 1m × 1m grid at 8×8 resolution. The bottom-left corner is fixed and
    /// the top-right corner is rotated 90° about the Y axis through it.
    pub fn grid_bend() -> Self {
        let cols = 8;
        let rows = 8;
        let mesh = quad_grid(cols, rows, 1.0, 1.0);
        let verts_x = cols + 1;
        let bottom_left = (rows * verts_x) as u32;
        let top_right = (verts_x - 1) as u32;
        let pivot = mesh.position_dvec3(bottom_left as usize);

        Self {
            kind: ScenarioKind::GridBend,
            mesh,
            fixed: vec![bottom_left],
            moving: vec![top_right],
            motion: HandleMotion::Rotate {
                axis: DVec3::Y,
                pivot,
                angle: FRAC_PI_2,
            },
            config: ArapConfig::with_iterations(10),
            frames: 30,
        }
    }

    /// Create the strip twist scenario.
    ///
    /// A 4m × 0.5m strip at 24×3 resolution. The left column is fixed and the
    /// right column is twisted 180° about the strip's long axis.
    pub fn strip_twist() -> Self {
        let cols = 24;
        let rows = 3;
        let mesh = quad_grid(cols, rows, 4.0, 0.5);
        let verts_x = cols + 1;
        let column = |i: usize| -> Vec<u32> {
            (0..=rows).map(|j| (j * verts_x + i) as u32).collect()
        };
        let fixed = column(0);
        let moving = column(cols);
        let pivot = moving
            .iter()
            .map(|&v| mesh.position_dvec3(v as usize))
            .sum::<DVec3>()
            / moving.len() as f64;

        Self {
            kind: ScenarioKind::StripTwist,
            mesh,
            fixed,
            moving,
            motion: HandleMotion::Rotate {
                axis: DVec3::X,
                pivot,
                angle: PI,
            },
            config: ArapConfig::interactive(),
            frames: 24,
        }
    }

    /// Create a scenario by kind.
    pub fn from_kind(kind: ScenarioKind) -> Self {
        match kind {
            ScenarioKind::TranslateTriangle => Self::translate_triangle(),
            ScenarioKind::GridBend => Self::grid_bend(),
            ScenarioKind::StripTwist => Self::strip_twist(),
        }
    }

    /// Replace the solver configuration.
    pub fn with_config(mut self, config: ArapConfig) -> Self {
        self.config = config;
        self
    }

    /// Total handle vertex count.
    pub fn handle_count(&self) -> usize {
        self.fixed.len() + self.moving.len()
    }

    /// Moving-group transform for frame `frame` (zero-based).
    pub fn transform_at(&self, frame: u32) -> DAffine3 {
        let t = if self.frames == 0 {
            1.0
        } else {
            f64::from(frame + 1) / f64::from(self.frames)
        };
        self.motion.transform_at(t.min(1.0))
    }
}
