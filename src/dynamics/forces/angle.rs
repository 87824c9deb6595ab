//! Hinge angle forces.

use crate::algo::geometry::corner_angle;
use crate::dynamics::ParticleSystem;
use crate::error::Result;
use crate::mesh::{HalfEdgeMesh, MeshIndex, VertexId};

/// Two edges meeting at a hinge vertex, with the angle they should open to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hinge {
    /// Vertex where the two edges meet.
    pub hinge: usize,
    /// End of the first edge.
    pub first: usize,
    /// End of the second edge.
    pub second: usize,
    /// Target angle in radians.
    pub rest_angle: f64,
}

impl Hinge {
    /// Create a hinge.
    pub fn new(hinge: usize, first: usize, second: usize, rest_angle: f64) -> Self {
        Self {
            hinge,
            first,
            second,
            rest_angle,
        }
    }
}

struct CheckedHinge<I: MeshIndex> {
    hinge: VertexId<I>,
    first: VertexId<I>,
    second: VertexId<I>,
    rest_angle: f64,
}

fn check<I: MeshIndex>(mesh: &HalfEdgeMesh<I>, h: &Hinge) -> Result<CheckedHinge<I>> {
    Ok(CheckedHinge {
        hinge: mesh.checked_vertex(h.hinge)?,
        first: mesh.checked_vertex(h.first)?,
        second: mesh.checked_vertex(h.second)?,
        rest_angle: h.rest_angle,
    })
}

/// Restore the angle of one hinge.
///
/// With `F = (u0 + u2) · (rest - current) · strength`, where `u0` and `u2`
/// are the unit edge directions leaving the hinge, the hinge receives `F`
/// when `move_hinge` is set. Otherwise the two outer vertices receive `-F/2`
/// each.
pub fn add_angle_force<I: MeshIndex>(
    mesh: &HalfEdgeMesh<I>,
    particles: &mut ParticleSystem<I>,
    hinge: &Hinge,
    strength: f64,
    move_hinge: bool,
) -> Result<()> {
    add_angle_forces(mesh, particles, std::slice::from_ref(hinge), strength, move_hinge)
}

/// Restore the angles of several hinges. Every hinge is checked first.
pub fn add_angle_forces<I: MeshIndex>(
    mesh: &HalfEdgeMesh<I>,
    particles: &mut ParticleSystem<I>,
    hinges: &[Hinge],
    strength: f64,
    move_hinge: bool,
) -> Result<()> {
    particles.check_layout(mesh)?;
    let hinges = hinges
        .iter()
        .map(|h| check(mesh, h))
        .collect::<Result<Vec<_>>>()?;

    for h in hinges {
        let ph = mesh.position(h.hinge);
        let p0 = mesh.position(h.first);
        let p2 = mesh.position(h.second);

        let (Some(u0), Some(u2)) = ((p0 - ph).try_normalize(0.0), (p2 - ph).try_normalize(0.0))
        else {
            log::warn!("hinge at {:?} has a zero-length edge", h.hinge);
            continue;
        };

        let current = corner_angle(ph, p0, p2);
        let force = (u0 + u2) * ((h.rest_angle - current) * strength);

        if move_hinge {
            particles.add_force(h.hinge, force)?;
        } else {
            particles.add_force(h.first, -force * 0.5)?;
            particles.add_force(h.second, -force * 0.5)?;
        }
    }
    Ok(())
}
