//! Forces without per-face geometry: gravity, drag, point loads and vector alignment.

use nalgebra::{Point3, Vector3};

use crate::dynamics::ParticleSystem;
use crate::error::Result;
use crate::mesh::{HalfEdgeMesh, MeshIndex};

/// Add `gravity · strength` to every free particle.
pub fn add_gravity_force<I: MeshIndex>(
    particles: &mut ParticleSystem<I>,
    gravity: &Vector3<f64>,
    strength: f64,
) {
    let force = gravity * strength;
    for p in particles.particles_mut().iter_mut().filter(|p| !p.fixed) {
        p.force += force;
    }
}

/// Add a damping force `-velocity · drag · strength` to every free particle.
pub fn add_drag_force<I: MeshIndex>(particles: &mut ParticleSystem<I>, drag: f64, strength: f64) {
    for p in particles.particles_mut().iter_mut().filter(|p| !p.fixed) {
        p.force -= p.velocity * (drag * strength);
    }
}

/// Push a single vertex along `direction` with magnitude `strength`.
///
/// A zero direction applies nothing.
pub fn add_load_force<I: MeshIndex>(
    mesh: &HalfEdgeMesh<I>,
    particles: &mut ParticleSystem<I>,
    vertex: usize,
    direction: &Vector3<f64>,
    strength: f64,
) -> Result<()> {
    particles.check_layout(mesh)?;
    let v = mesh.checked_vertex(vertex)?;

    match direction.try_normalize(0.0) {
        Some(dir) => particles.add_force(v, dir * strength),
        None => {
            log::warn!("load force on vertex {} has no direction", vertex);
            Ok(())
        }
    }
}

/// Pull a vertex onto the ray from `origin` along `align`, keeping its distance to `origin`.
pub fn add_vector_force<I: MeshIndex>(
    mesh: &HalfEdgeMesh<I>,
    particles: &mut ParticleSystem<I>,
    vertex: usize,
    origin: &Point3<f64>,
    align: &Vector3<f64>,
    strength: f64,
) -> Result<()> {
    particles.check_layout(mesh)?;
    let v = mesh.checked_vertex(vertex)?;

    let Some(axis) = align.try_normalize(0.0) else {
        log::warn!("vector force on vertex {} has no alignment axis", vertex);
        return Ok(());
    };

    let p = mesh.position(v);
    let target = origin + axis * (p - origin).norm();
    particles.add_force(v, (target - p) * strength)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::dynamics::fixtures::unit_square;
    use crate::error::FormError;
    use crate::mesh::VertexId;

    #[test]
    fn test_gravity_skips_fixed() {
        let mesh = unit_square();
        let mut particles = ParticleSystem::attach(&mesh, false);
        particles.set_fixed(&[0], true).unwrap();

        add_gravity_force(&mut particles, &Vector3::new(0.0, 0.0, -9.8), 0.5);

        assert_eq!(particles.force(VertexId::new(0)).unwrap(), Vector3::zeros());
        assert_relative_eq!(particles.force(VertexId::new(1)).unwrap().z, -4.9);
    }

    #[test]
    fn test_drag_opposes_velocity() {
        let mesh = unit_square();
        let mut particles = ParticleSystem::attach(&mesh, false);
        let v = VertexId::new(2);
        particles.set_velocity(v, Vector3::new(2.0, 0.0, 0.0)).unwrap();

        add_drag_force(&mut particles, 0.5, 1.0);

        assert_relative_eq!(particles.force(v).unwrap().x, -1.0);
    }

    #[test]
    fn test_load_is_normalized() {
        let mesh = unit_square();
        let mut particles = ParticleSystem::attach(&mesh, false);

        add_load_force(&mesh, &mut particles, 3, &Vector3::new(0.0, 0.0, 10.0), 2.0).unwrap();

        assert_eq!(particles.force(VertexId::new(3)).unwrap(), Vector3::new(0.0, 0.0, 2.0));
        assert_eq!(particles.force(VertexId::new(0)).unwrap(), Vector3::zeros());

        let err = add_load_force(&mesh, &mut particles, 7, &Vector3::z(), 1.0).unwrap_err();
        assert!(matches!(err, FormError::IndexOutOfRange { index: 7, .. }));
    }

    #[test]
    fn test_vector_force_rotates_onto_axis() {
        let mesh = unit_square();
        let mut particles = ParticleSystem::attach(&mesh, false);

        // vertex 3 sits at (0, 1, 0): its target on the x axis is (1, 0, 0)
        add_vector_force(
            &mesh,
            &mut particles,
            3,
            &Point3::origin(),
            &Vector3::new(5.0, 0.0, 0.0),
            0.5,
        )
        .unwrap();

        let f = particles.force(VertexId::new(3)).unwrap();
        assert_relative_eq!(f.x, 0.5);
        assert_relative_eq!(f.y, -0.5);
        assert_relative_eq!(f.z, 0.0);
    }
}
