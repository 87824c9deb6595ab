//! Planarity forces.
//!
//! Two ways of measuring how far a face is from flat are supported, chosen
//! with [`PlanarityKind`]:
//!
//! - **Quad**: the distance between the two diagonals of a quad. A planar quad
//!   has intersecting diagonals. The force pulls the diagonals towards each
//!   other. Triangles are always planar; other polygons are skipped.
//! - **Volume**: the largest distance of a face vertex to the plane through
//!   the face center with the face normal. Works for any polygon.
//!
//! The target-plane and vertex-group variants measure the same point-to-plane
//! distance against planes supplied by the caller.

use nalgebra::{Point3, Vector3};

use super::{AxisConstraint, ForceReport};
use crate::algo::geometry::{line_line_closest_points, point_plane_distance};
use crate::dynamics::ParticleSystem;
use crate::error::{FormError, Result};
use crate::mesh::{FaceId, HalfEdgeMesh, MeshIndex, VertexId};

/// How face planarity is measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlanarityKind {
    /// Diagonal distance of quads.
    #[default]
    Quad,
    /// Point-to-plane distance against the face's own plane.
    Volume,
}

/// Push every face towards planarity.
///
/// The report holds one deviation per face index. Faces the chosen kind does
/// not handle report `-1`.
///
/// Volume planarity reads the cached face normals, which are refreshed by
/// [`MeshDynamics::update`](crate::dynamics::MeshDynamics::update) and
/// [`HalfEdgeMesh::compute_normals`].
pub fn add_planarity_force<I: MeshIndex>(
    mesh: &HalfEdgeMesh<I>,
    particles: &mut ParticleSystem<I>,
    kind: PlanarityKind,
    strength: f64,
    tolerance: f64,
    constraint: AxisConstraint,
) -> Result<ForceReport> {
    particles.check_layout(mesh)?;

    let mut report = ForceReport::new(mesh.num_faces(), mesh.num_vertices(), -1.0);
    for f in mesh.face_ids() {
        match kind {
            PlanarityKind::Quad => {
                quad_face(mesh, particles, f, strength, tolerance, constraint, &mut report)?
            }
            PlanarityKind::Volume => {
                let center = mesh.face_center(f);
                let normal = mesh.face_normal(f);
                plane_face(
                    mesh, particles, f, &center, &normal, strength, tolerance, constraint,
                    &mut report,
                )?
            }
        }
    }

    report.normalize_directions();
    Ok(report)
}

fn quad_face<I: MeshIndex>(
    mesh: &HalfEdgeMesh<I>,
    particles: &mut ParticleSystem<I>,
    f: FaceId<I>,
    strength: f64,
    tolerance: f64,
    constraint: AxisConstraint,
    report: &mut ForceReport,
) -> Result<()> {
    let verts: Vec<VertexId<I>> = mesh.face_vertices(f).collect();
    match verts.len() {
        3 => {
            report.deviations[f.index()] = 0.0;
            return Ok(());
        }
        4 => {}
        _ => return Ok(()),
    }

    let cp = line_line_closest_points(
        mesh.position(verts[0]),
        mesh.position(verts[2]),
        mesh.position(verts[1]),
        mesh.position(verts[3]),
    );
    if cp.parallel {
        log::warn!("face {:?} has parallel diagonals", f);
    }

    let deviation = cp.distance();
    report.deviations[f.index()] = deviation;
    if deviation <= tolerance {
        return Ok(());
    }
    report.exit = false;

    let dir = cp.gap().try_normalize(0.0).unwrap_or_else(Vector3::zeros);
    let force = dir * (deviation * 0.5 * strength);
    let force_a = constraint.apply(force);
    let force_b = constraint.apply(-force);

    for (k, &v) in verts.iter().enumerate() {
        let fv = if k % 2 == 0 { force_a } else { force_b };
        particles.add_force(v, fv)?;
        report.force_dir[v.index()] += fv;
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn plane_face<I: MeshIndex>(
    mesh: &HalfEdgeMesh<I>,
    particles: &mut ParticleSystem<I>,
    f: FaceId<I>,
    center: &Point3<f64>,
    normal: &Vector3<f64>,
    strength: f64,
    tolerance: f64,
    constraint: AxisConstraint,
    report: &mut ForceReport,
) -> Result<()> {
    let dists: Vec<(VertexId<I>, f64)> = mesh
        .face_vertices(f)
        .map(|v| (v, point_plane_distance(mesh.position(v), center, normal)))
        .collect();

    let deviation = dists.iter().map(|(_, d)| d.abs()).fold(0.0, f64::max);
    report.deviations[f.index()] = deviation;
    if deviation <= tolerance {
        return Ok(());
    }
    report.exit = false;

    for (v, d) in dists {
        let force = constraint.apply(normal * (-d * strength));
        particles.add_force(v, force)?;
        report.force_dir[v.index()] += force;
    }
    Ok(())
}

/// Push every face towards a caller-supplied plane, one per face index.
///
/// # Errors
/// `SizeMismatch` unless there is exactly one center and one normal per face.
pub fn add_planarity_force_target_plane<I: MeshIndex>(
    mesh: &HalfEdgeMesh<I>,
    particles: &mut ParticleSystem<I>,
    centers: &[Point3<f64>],
    normals: &[Vector3<f64>],
    strength: f64,
    tolerance: f64,
) -> Result<ForceReport> {
    particles.check_layout(mesh)?;
    if centers.len() != mesh.num_faces() {
        return Err(FormError::size_mismatch("centers", mesh.num_faces(), centers.len()));
    }
    if normals.len() != mesh.num_faces() {
        return Err(FormError::size_mismatch("normals", mesh.num_faces(), normals.len()));
    }

    let mut report = ForceReport::new(mesh.num_faces(), mesh.num_vertices(), -1.0);
    for f in mesh.face_ids() {
        let i = f.index();
        let normal = unit(&normals[i]);
        plane_face(
            mesh,
            particles,
            f,
            &centers[i],
            &normal,
            strength,
            tolerance,
            AxisConstraint::None,
            &mut report,
        )?;
    }

    report.normalize_directions();
    Ok(report)
}

/// Push groups of vertices towards one plane per group.
///
/// Only vertices farther than `tolerance` from their plane are pushed. The
/// report holds one deviation per group.
///
/// # Errors
/// `SizeMismatch` unless there is one center and one normal per group,
/// `IndexOutOfRange` for an unknown vertex.
pub fn add_planarity_force_vertex_groups<I: MeshIndex>(
    mesh: &HalfEdgeMesh<I>,
    particles: &mut ParticleSystem<I>,
    groups: &[Vec<usize>],
    centers: &[Point3<f64>],
    normals: &[Vector3<f64>],
    strength: f64,
    tolerance: f64,
) -> Result<ForceReport> {
    particles.check_layout(mesh)?;
    if centers.len() != groups.len() {
        return Err(FormError::size_mismatch("centers", groups.len(), centers.len()));
    }
    if normals.len() != groups.len() {
        return Err(FormError::size_mismatch("normals", groups.len(), normals.len()));
    }
    let groups = groups
        .iter()
        .map(|g| g.iter().map(|&v| mesh.checked_vertex(v)).collect::<Result<Vec<_>>>())
        .collect::<Result<Vec<_>>>()?;

    let mut report = ForceReport::new(groups.len(), mesh.num_vertices(), -1.0);
    for (i, group) in groups.iter().enumerate() {
        let normal = unit(&normals[i]);
        let dists: Vec<f64> = group
            .iter()
            .map(|&v| point_plane_distance(mesh.position(v), &centers[i], &normal))
            .collect();

        let deviation = dists.iter().map(|d| d.abs()).fold(0.0, f64::max);
        report.deviations[i] = deviation;
        if deviation <= tolerance {
            continue;
        }
        report.exit = false;

        for (&v, &d) in group.iter().zip(&dists) {
            if d.abs() > tolerance {
                let force = normal * (-d * strength);
                particles.add_force(v, force)?;
                report.force_dir[v.index()] += force;
            }
        }
    }

    report.normalize_directions();
    Ok(report)
}

/// Pull the given vertices onto a plane without measuring convergence.
pub fn add_plane_force<I: MeshIndex>(
    mesh: &HalfEdgeMesh<I>,
    particles: &mut ParticleSystem<I>,
    vertices: &[usize],
    center: &Point3<f64>,
    normal: &Vector3<f64>,
    strength: f64,
) -> Result<()> {
    particles.check_layout(mesh)?;
    let vertices = vertices
        .iter()
        .map(|&v| mesh.checked_vertex(v))
        .collect::<Result<Vec<_>>>()?;

    let normal = unit(normal);
    for v in vertices {
        let d = point_plane_distance(mesh.position(v), center, &normal);
        particles.add_force(v, normal * (-d * strength))?;
    }
    Ok(())
}

fn unit(n: &Vector3<f64>) -> Vector3<f64> {
    n.try_normalize(0.0).unwrap_or_else(Vector3::zeros)
}
