//! Minimal-area force, a discrete soap film.

use nalgebra::Vector3;

use crate::dynamics::ParticleSystem;
use crate::error::Result;
use crate::mesh::{HalfEdgeMesh, MeshIndex};

/// Move every vertex down the gradient of total surface area.
///
/// Each face is split into a fan of triangles. For a triangle `(a, b, c)`
/// with unit normal `n`, the corner opposite an edge receives
/// `½ · (edge × n) · strength`, which points inwards, perpendicular to
/// that edge.
pub fn add_minimize_area_force<I: MeshIndex>(
    mesh: &HalfEdgeMesh<I>,
    particles: &mut ParticleSystem<I>,
    strength: f64,
) -> Result<()> {
    particles.check_layout(mesh)?;

    for f in mesh.face_ids() {
        for [a, b, c] in mesh.face_triangles(f) {
            let pa = mesh.position(a);
            let pb = mesh.position(b);
            let pc = mesh.position(c);

            let ab = pb - pa;
            let bc = pc - pb;
            let ca = pa - pc;

            let Some(n) = ab.cross(&bc).try_normalize(0.0) else {
                log::warn!("face {:?} has a degenerate triangle", f);
                continue;
            };

            let ga: Vector3<f64> = bc.cross(&n) * 0.5;
            let gb: Vector3<f64> = ca.cross(&n) * 0.5;

            particles.add_force(a, ga * strength)?;
            particles.add_force(b, gb * strength)?;
            particles.add_force(c, (-ga - gb) * strength)?;
        }
    }
    Ok(())
}
