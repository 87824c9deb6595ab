//! Developability force.
//!
//! A surface is developable when it unrolls flat without stretching, which
//! for a polygonal mesh means every interior vertex has zero angle defect.
//! The force moves interior vertices along the sum of their unit edge vectors
//! (towards their one-ring) proportionally to the defect, and moves boundary
//! vertices so as to reduce the defect of their interior neighbours.

use nalgebra::Vector3;

use super::ForceReport;
use crate::algo::curvature::gaussian_curvature;
use crate::algo::geometry::sign;
use crate::dynamics::ParticleSystem;
use crate::error::Result;
use crate::mesh::{HalfEdgeId, HalfEdgeMesh, MeshIndex, VertexId};

/// Push the mesh towards zero Gaussian curvature.
///
/// The report holds the signed angle defect of every vertex, measured before
/// the force is applied. `exit` is set once every interior vertex is within
/// `tolerance` of zero; boundary defects do not block convergence.
pub fn add_developability_force<I: MeshIndex>(
    mesh: &HalfEdgeMesh<I>,
    particles: &mut ParticleSystem<I>,
    strength: f64,
    tolerance: f64,
) -> Result<ForceReport> {
    particles.check_layout(mesh)?;

    let curvature = gaussian_curvature(mesh);
    let mut report = ForceReport::new(0, mesh.num_vertices(), 0.0);

    for v in mesh.vertex_ids() {
        if !mesh.vertex(v).halfedge.is_valid() {
            continue;
        }
        let k = curvature[v.index()];

        if mesh.is_boundary_vertex(v) {
            let Some((grad, k_neighbor)) = boundary_gradient(mesh, v, &curvature) else {
                continue;
            };
            if let Some(dir) = grad.try_normalize(0.0) {
                particles.add_force(v, dir * (k_neighbor * strength))?;
                report.force_dir[v.index()] = dir * sign(k);
            }
        } else {
            if k.abs() > tolerance {
                report.exit = false;
            }

            let p = mesh.position(v);
            let sum: Vector3<f64> = mesh
                .vertex_neighbors(v)
                .filter_map(|n| (mesh.position(n) - p).try_normalize(0.0))
                .sum();
            match sum.try_normalize(0.0) {
                Some(dir) => {
                    particles.add_force(v, dir * (k * strength))?;
                    report.force_dir[v.index()] = dir * sign(k);
                }
                None if k.abs() > tolerance => {
                    log::warn!("vertex {:?} has a balanced one-ring, no developability direction", v)
                }
                None => {}
            }
        }
    }

    report.deviations = curvature;
    Ok(report)
}

/// Gradient direction for a boundary vertex and the defect that scales it.
///
/// For each outgoing half-edge `i -> j` whose target `j` is interior, the two
/// faces on either side of the edge contribute the in-plane direction
/// perpendicular to the edge. When several interior neighbours exist the last
/// one visited wins.
fn boundary_gradient<I: MeshIndex>(
    mesh: &HalfEdgeMesh<I>,
    v: VertexId<I>,
    curvature: &[f64],
) -> Option<(Vector3<f64>, f64)> {
    let mut result = None;

    for he in mesh.vertex_halfedges(v) {
        let j = mesh.target(he);
        if mesh.is_boundary_vertex(j) {
            continue;
        }
        result = Some((edge_gradient(mesh, he), curvature[j.index()]));
    }

    result
}

fn edge_gradient<I: MeshIndex>(mesh: &HalfEdgeMesh<I>, he: HalfEdgeId<I>) -> Vector3<f64> {
    let i = mesh.origin(he);
    let j = mesh.target(he);
    let k = mesh.target(mesh.next(he));
    let l = mesh.origin(mesh.prev(mesh.sym(he)));

    let pj = mesh.position(j);
    let e = mesh.position(i) - pj;
    let ek = mesh.position(k) - pj;
    let el = mesh.position(l) - pj;

    let g1 = e.cross(&ek).cross(&e).try_normalize(0.0).unwrap_or_else(Vector3::zeros);
    let g2 = e.cross(&el).cross(&e).try_normalize(0.0).unwrap_or_else(Vector3::zeros);
    -(g1 + g2)
}
