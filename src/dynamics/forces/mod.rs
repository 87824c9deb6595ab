//! Force library.
//!
//! Each function reads the current positions and topology of a mesh and
//! accumulates forces into a [`ParticleSystem`](super::ParticleSystem). Inputs
//! are validated before the first force is applied, so a rejected call leaves
//! every particle untouched.
//!
//! Forces that measure a shape error (planarity, developability, rigid lines)
//! return a [`ForceReport`]. Callers keep iterating until every report they
//! care about has `exit == true`.
//!
//! | Module | Forces |
//! |--------|--------|
//! | [`basic`] | gravity, drag, load, vector alignment |
//! | [`spring`] | edge springs, distance, rigid lines |
//! | [`planarity`] | quad, volume, target-plane, vertex-group and plane forces |
//! | [`developability`] | angle-defect reduction |
//! | [`area`] | minimal area |
//! | [`angle`] | hinge angles |

pub mod angle;
pub mod area;
pub mod basic;
pub mod developability;
pub mod planarity;
pub mod spring;

use nalgebra::Vector3;

pub use angle::{add_angle_force, add_angle_forces, Hinge};
pub use area::add_minimize_area_force;
pub use basic::{add_drag_force, add_gravity_force, add_load_force, add_vector_force};
pub use developability::add_developability_force;
pub use planarity::{
    add_plane_force, add_planarity_force, add_planarity_force_target_plane,
    add_planarity_force_vertex_groups, PlanarityKind,
};
pub use spring::{
    add_distance_force, add_edge_spring_force, add_edge_spring_forces, add_rigid_line_force,
    add_spring_forces,
};

/// Shape error measured while applying a force.
#[derive(Debug, Clone, PartialEq)]
pub struct ForceReport {
    /// One deviation per measured element (face, vertex, group or pair).
    ///
    /// A negative value marks an element the force does not handle.
    pub deviations: Vec<f64>,

    /// Unit direction of the force applied to each vertex, zero where none was applied.
    pub force_dir: Vec<Vector3<f64>>,

    /// Whether every deviation is within tolerance.
    pub exit: bool,
}

impl ForceReport {
    pub(crate) fn new(num_elements: usize, num_vertices: usize, initial: f64) -> Self {
        Self {
            deviations: vec![initial; num_elements],
            force_dir: vec![Vector3::zeros(); num_vertices],
            exit: true,
        }
    }

    /// Largest deviation, or zero if there are none.
    pub fn max_deviation(&self) -> f64 {
        self.deviations.iter().copied().fold(0.0, f64::max)
    }

    pub(crate) fn normalize_directions(&mut self) {
        for dir in &mut self.force_dir {
            if let Some(unit) = dir.try_normalize(0.0) {
                *dir = unit;
            }
        }
    }
}

/// World axes along which a force is suppressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AxisConstraint {
    /// Every component is kept.
    #[default]
    None,
    /// Zero the X component.
    X,
    /// Zero the Y component.
    Y,
    /// Zero the Z component.
    Z,
    /// Zero the X and Y components.
    XY,
    /// Zero the Y and Z components.
    YZ,
    /// Zero the Z and X components.
    ZX,
}

impl AxisConstraint {
    /// Apply the mask to a force.
    pub fn apply(self, mut force: Vector3<f64>) -> Vector3<f64> {
        let (x, y, z) = match self {
            AxisConstraint::None => (false, false, false),
            AxisConstraint::X => (true, false, false),
            AxisConstraint::Y => (false, true, false),
            AxisConstraint::Z => (false, false, true),
            AxisConstraint::XY => (true, true, false),
            AxisConstraint::YZ => (false, true, true),
            AxisConstraint::ZX => (true, false, true),
        };
        if x {
            force.x = 0.0;
        }
        if y {
            force.y = 0.0;
        }
        if z {
            force.z = 0.0;
        }
        force
    }
}
