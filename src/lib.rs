//! # Formfind
//!
//! Half-edge polygon meshes and explicit particle-force relaxation for
//! architectural form-finding.
//!
//! A mesh is built once from a vertex list and a face list, then made
//! dynamic: every vertex gets a particle, force laws push the particles
//! towards a design goal (planar panels, developable strips, target edge
//! lengths, minimal area) and an integrator moves the vertices. The loop
//! repeats until the force laws report convergence.
//!
//! ## Features
//!
//! - **Half-edge data structure**: O(1) adjacency queries with type-safe indices
//! - **Flexible indexing**: Support for 16-bit, 32-bit, and 64-bit indices
//! - **Polygon faces**: triangles, quads and arbitrary n-gons in one mesh
//! - **Force library**: gravity, drag, loads, springs, rigid lines, planarity,
//!   developability, minimal area, hinge angles
//! - **Integrators**: explicit Euler and a fourth-order scheme
//!
//! ## Building Meshes Programmatically
//!
//! ```
//! use formfind::prelude::*;
//! use nalgebra::Point3;
//!
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.5, 1.0, 0.0),
//!     Point3::new(0.5, 0.5, 1.0),
//! ];
//!
//! let faces = vec![
//!     [0, 2, 1],  // bottom
//!     [0, 1, 3],  // front
//!     [1, 2, 3],  // right
//!     [2, 0, 3],  // left
//! ];
//!
//! let mesh: HalfEdgeMesh = build_from_triangles(&vertices, &faces).unwrap();
//! assert_eq!(mesh.num_vertices(), 4);
//! assert_eq!(mesh.num_edges(), 6);
//! ```
//!
//! ## Relaxing a Mesh
//!
//! ```
//! use formfind::prelude::*;
//! use formfind::dynamics::forces::add_gravity_force;
//! use nalgebra::{Point3, Vector3};
//!
//! let mut positions = Vec::new();
//! for j in 0..3 {
//!     for i in 0..3 {
//!         positions.push(Point3::new(i as f64, j as f64, 0.0));
//!     }
//! }
//! let faces = [[0, 1, 4, 3], [1, 2, 5, 4], [3, 4, 7, 6], [4, 5, 8, 7]];
//! let mesh: HalfEdgeMesh = build_from_quads(&positions, &faces).unwrap();
//!
//! // boundary vertices are pinned, the center sags
//! let mut dynamics = MeshDynamics::create(mesh, true);
//! let gravity = Vector3::new(0.0, 0.0, -1.0);
//!
//! for _ in 0..10 {
//!     let (_, particles) = dynamics.split().unwrap();
//!     add_gravity_force(particles, &gravity, 0.1);
//!     dynamics.update(&StepOptions::default()).unwrap();
//! }
//!
//! assert!(dynamics.mesh().position(VertexId::new(4)).z < 0.0);
//! assert_eq!(dynamics.mesh().position(VertexId::new(0)).z, 0.0);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod algo;
pub mod dynamics;
pub mod error;
pub mod mesh;

/// Prelude module for convenient imports.
///
/// This module re-exports the most commonly used types and functions:
///
/// ```
/// use formfind::prelude::*;
/// ```
pub mod prelude {
    pub use crate::dynamics::forces::{AxisConstraint, ForceReport};
    pub use crate::dynamics::{
        DynamicsState, IntegrationScheme, MeshDynamics, ParticleSystem, RelaxOptions,
        RelaxOutcome, StepOptions,
    };
    pub use crate::error::{FormError, Result};
    pub use crate::mesh::{
        build, build_from_flat, build_from_polygons, build_from_quads, build_from_triangles,
        to_face_vertex, to_flat_arrays, EdgeId, FaceId, HalfEdgeId, HalfEdgeMesh, MeshIndex,
        VertexId,
    };
}

// Re-export nalgebra types for convenience
pub use nalgebra;
