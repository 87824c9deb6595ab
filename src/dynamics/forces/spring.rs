//! Length forces: edge springs, vertex-pair distances and rigid lines.
//!
//! All of them act on a vertex pair `(a, b)` and apply equal and opposite
//! forces along the segment between the two, so they never add net momentum.

use nalgebra::Vector3;

use super::ForceReport;
use crate::dynamics::ParticleSystem;
use crate::error::{FormError, Result};
use crate::mesh::{HalfEdgeMesh, MeshIndex, VertexId};

/// Spring law for one vertex pair.
///
/// With `Δ = |b - a| - rest`, `a` is pushed towards `b` by `strength · Δ / 2`
/// and `b` by the same amount towards `a`. A compressed pair (`Δ < 0`) is
/// pushed apart.
fn apply_spring<I: MeshIndex>(
    mesh: &HalfEdgeMesh<I>,
    particles: &mut ParticleSystem<I>,
    a: VertexId<I>,
    b: VertexId<I>,
    rest: f64,
    strength: f64,
) -> Result<()> {
    let delta = mesh.position(b) - mesh.position(a);
    let len = delta.norm();
    let Some(dir) = delta.try_normalize(0.0) else {
        log::warn!("spring between {:?} and {:?} has zero length", a, b);
        return Ok(());
    };

    let force = dir * (strength * (len - rest) * 0.5);
    particles.add_force(a, force)?;
    particles.add_force(b, -force)
}

/// Spring force on every edge, one rest length per edge index.
///
/// # Errors
/// `SizeMismatch` if `rest_lengths` is shorter than the edge count.
pub fn add_spring_forces<I: MeshIndex>(
    mesh: &HalfEdgeMesh<I>,
    particles: &mut ParticleSystem<I>,
    rest_lengths: &[f64],
    strength: f64,
) -> Result<()> {
    particles.check_layout(mesh)?;
    if rest_lengths.len() < mesh.num_edges() {
        return Err(FormError::size_mismatch(
            "rest_lengths",
            mesh.num_edges(),
            rest_lengths.len(),
        ));
    }

    for e in mesh.edge_ids() {
        let [a, b] = mesh.edge_vertices(e);
        apply_spring(mesh, particles, a, b, rest_lengths[e.index()], strength)?;
    }
    Ok(())
}

/// Spring force on a single edge.
pub fn add_edge_spring_force<I: MeshIndex>(
    mesh: &HalfEdgeMesh<I>,
    particles: &mut ParticleSystem<I>,
    edge: usize,
    rest_length: f64,
    strength: f64,
) -> Result<()> {
    add_edge_spring_forces(mesh, particles, &[edge], rest_length, strength)
}

/// Spring force on a subset of edges sharing one rest length.
pub fn add_edge_spring_forces<I: MeshIndex>(
    mesh: &HalfEdgeMesh<I>,
    particles: &mut ParticleSystem<I>,
    edges: &[usize],
    rest_length: f64,
    strength: f64,
) -> Result<()> {
    particles.check_layout(mesh)?;
    let edges = edges
        .iter()
        .map(|&e| mesh.checked_edge(e))
        .collect::<Result<Vec<_>>>()?;

    for e in edges {
        let [a, b] = mesh.edge_vertices(e);
        apply_spring(mesh, particles, a, b, rest_length, strength)?;
    }
    Ok(())
}

/// Spring force between two arbitrary vertices.
pub fn add_distance_force<I: MeshIndex>(
    mesh: &HalfEdgeMesh<I>,
    particles: &mut ParticleSystem<I>,
    v0: usize,
    v1: usize,
    rest_distance: f64,
    strength: f64,
) -> Result<()> {
    particles.check_layout(mesh)?;
    let a = mesh.checked_vertex(v0)?;
    let b = mesh.checked_vertex(v1)?;
    apply_spring(mesh, particles, a, b, rest_distance, strength)
}

/// Drive vertex pairs towards target distances.
///
/// Each pair outside `tolerance` is pulled together (too long) or pushed
/// apart (too short) by half its deviation per vertex, scaled by `strength`.
/// The report holds one absolute deviation per pair, measured before any
/// force is applied.
///
/// # Errors
/// `SizeMismatch` if `pairs` and `target_lengths` differ in length,
/// `IndexOutOfRange` for an unknown vertex.
pub fn add_rigid_line_force<I: MeshIndex>(
    mesh: &HalfEdgeMesh<I>,
    particles: &mut ParticleSystem<I>,
    pairs: &[[usize; 2]],
    target_lengths: &[f64],
    strength: f64,
    tolerance: f64,
) -> Result<ForceReport> {
    particles.check_layout(mesh)?;
    if pairs.len() != target_lengths.len() {
        return Err(FormError::size_mismatch(
            "target_lengths",
            pairs.len(),
            target_lengths.len(),
        ));
    }
    let pairs = pairs
        .iter()
        .map(|&[a, b]| Ok([mesh.checked_vertex(a)?, mesh.checked_vertex(b)?]))
        .collect::<Result<Vec<_>>>()?;

    let mut report = ForceReport::new(pairs.len(), mesh.num_vertices(), -1.0);

    for (i, (&[a, b], &target)) in pairs.iter().zip(target_lengths).enumerate() {
        let delta = mesh.position(b) - mesh.position(a);
        let dist = delta.norm();
        let dir = delta.try_normalize(0.0).unwrap_or_else(Vector3::zeros);

        let diff = dist - target;
        let deviation = diff.abs();
        report.deviations[i] = deviation;

        if deviation > tolerance && dist > 0.0 {
            let towards_b = if diff < 0.0 { -dir } else { dir };
            let force = towards_b * (deviation * 0.5 * strength);

            particles.add_force(a, force)?;
            particles.add_force(b, -force)?;
            report.force_dir[a.index()] += force;
            report.force_dir[b.index()] -= force;
            report.exit = false;
        }
    }

    report.normalize_directions();
    Ok(report)
}
