//! Discrete Gaussian curvature on polygonal meshes.
//!
//! The Gaussian curvature of a vertex is measured by its angle defect: the
//! amount by which the corner angles of the incident faces fall short of a
//! flat neighbourhood.
//!
//! - Interior vertex: `2π - Σθ`
//! - Boundary vertex: `π - Σθ`
//! - Isolated vertex: `0`
//!
//! Corner angles are taken at each face corner between the previous and next
//! vertex of the face loop, so quads and n-gons contribute their true polygon
//! angles rather than the angles of a triangulation. The defect is not divided
//! by a vertex area; developability only needs it to reach zero.
//!
//! # Example
//!
//! ```
//! use formfind::prelude::*;
//! use formfind::algo::curvature::gaussian_curvature;
//! use nalgebra::Point3;
//!
//! let positions = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(1.0, 1.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//! ];
//! let mesh: HalfEdgeMesh = build_from_quads(&positions, &[[0, 1, 2, 3]]).unwrap();
//!
//! // each corner of a flat square is a boundary vertex with a right angle
//! let k = gaussian_curvature(&mesh);
//! assert!((k[0] - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
//! ```

use std::f64::consts::PI;

use crate::algo::geometry::corner_angle;
use crate::mesh::{HalfEdgeMesh, MeshIndex, VertexId};

/// Sum of the face corner angles at a vertex.
pub fn angle_sum<I: MeshIndex>(mesh: &HalfEdgeMesh<I>, v: VertexId<I>) -> f64 {
    let p = mesh.position(v);
    mesh.vertex_halfedges(v)
        .filter(|&he| !mesh.is_boundary_halfedge(he))
        .map(|he| {
            // he leaves v inside its face; prev(he) arrives at v in the same face
            let next = mesh.position(mesh.target(he));
            let prev = mesh.position(mesh.origin(mesh.prev(he)));
            corner_angle(p, prev, next)
        })
        .sum()
}

/// Angle defect at a single vertex.
pub fn vertex_gaussian_curvature<I: MeshIndex>(mesh: &HalfEdgeMesh<I>, v: VertexId<I>) -> f64 {
    if !mesh.vertex(v).halfedge.is_valid() {
        return 0.0;
    }
    let full = if mesh.is_boundary_vertex(v) { PI } else { 2.0 * PI };
    full - angle_sum(mesh, v)
}

/// Angle defect for every vertex, indexed by vertex index.
///
/// Inactive vertices report zero.
pub fn gaussian_curvature<I: MeshIndex>(mesh: &HalfEdgeMesh<I>) -> Vec<f64> {
    (0..mesh.num_vertices())
        .map(|i| {
            let v = VertexId::new(i);
            if mesh.vertex(v).is_active() {
                vertex_gaussian_curvature(mesh, v)
            } else {
                0.0
            }
        })
        .collect()
}

/// Sum of the angle defects of all vertices.
///
/// For a closed surface this is `2π · χ` (Gauss-Bonnet).
pub fn total_curvature<I: MeshIndex>(mesh: &HalfEdgeMesh<I>) -> f64 {
    gaussian_curvature(mesh).iter().sum()
}
