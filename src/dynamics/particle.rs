//! Particle state and explicit integration.
//!
//! Every active vertex of a mesh gets one [`Particle`]. A particle does not
//! own its position: it refers to the vertex, and integration writes straight
//! into the mesh's position array. Forces accumulate between steps and are
//! consumed by [`ParticleSystem::integrate`].

use nalgebra::Vector3;

use crate::error::{FormError, Result};
use crate::mesh::{HalfEdgeMesh, MeshIndex, VertexId};

/// Default particle mass.
pub const DEFAULT_MASS: f64 = 1.0;

/// Time derivative of a particle's state at one integration stage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Derivative {
    /// Rate of change of position.
    pub dx: Vector3<f64>,
    /// Rate of change of velocity.
    pub dv: Vector3<f64>,
}

impl Default for Derivative {
    fn default() -> Self {
        Self {
            dx: Vector3::zeros(),
            dv: Vector3::zeros(),
        }
    }
}

/// A point mass bound to a mesh vertex.
#[derive(Debug, Clone, Copy)]
pub struct Particle<I: MeshIndex = u32> {
    /// The vertex whose position this particle moves.
    pub vertex: VertexId<I>,
    /// Current velocity.
    pub velocity: Vector3<f64>,
    /// Force accumulated since the last step.
    pub force: Vector3<f64>,
    /// Mass, always positive.
    pub mass: f64,
    /// Fixed particles ignore forces and never move.
    pub fixed: bool,
    /// Stage derivatives of the last RK4 step.
    pub derivatives: [Derivative; 4],
}

impl<I: MeshIndex> Particle<I> {
    /// A free particle at rest.
    pub fn new(vertex: VertexId<I>) -> Self {
        Self {
            vertex,
            velocity: Vector3::zeros(),
            force: Vector3::zeros(),
            mass: DEFAULT_MASS,
            fixed: false,
            derivatives: [Derivative::default(); 4],
        }
    }

    /// Acceleration from the accumulated force.
    #[inline]
    pub fn acceleration(&self) -> Vector3<f64> {
        self.force / self.mass
    }
}

/// Explicit integration scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IntegrationScheme {
    /// Semi-implicit Euler: velocity first, then position.
    #[default]
    Euler,
    /// Four-stage Runge-Kutta against a force sampled once per step.
    ///
    /// The force is not re-evaluated between stages, so a step reduces to
    /// `x += v·dt + ½·a·dt²` and `v += a·dt`.
    Rk4,
}

/// Options for a single integration step.
#[derive(Debug, Clone)]
pub struct StepOptions {
    /// Time step, must be positive.
    pub dt: f64,

    /// Integration scheme.
    pub scheme: IntegrationScheme,

    /// Reset accumulated forces after the step (default: true).
    pub clear_force: bool,

    /// Reset velocities after the step (default: false).
    pub clear_velocity: bool,

    /// Reset the RK4 stage buffers after the step (default: false).
    pub clear_derivatives: bool,
}

impl Default for StepOptions {
    fn default() -> Self {
        Self {
            dt: 0.1,
            scheme: IntegrationScheme::Euler,
            clear_force: true,
            clear_velocity: false,
            clear_derivatives: false,
        }
    }
}

impl StepOptions {
    /// Set the time step.
    pub fn with_dt(mut self, dt: f64) -> Self {
        self.dt = dt;
        self
    }

    /// Set the integration scheme.
    pub fn with_scheme(mut self, scheme: IntegrationScheme) -> Self {
        self.scheme = scheme;
        self
    }

    /// Keep accumulated forces after the step.
    pub fn keep_force(mut self) -> Self {
        self.clear_force = false;
        self
    }

    /// Zero velocities after every step, giving a damped, quasi-static relaxation.
    pub fn with_clear_velocity(mut self, clear: bool) -> Self {
        self.clear_velocity = clear;
        self
    }

    /// Zero the RK4 stage buffers after every step.
    pub fn with_clear_derivatives(mut self, clear: bool) -> Self {
        self.clear_derivatives = clear;
        self
    }

    fn validate(&self) -> Result<()> {
        if !(self.dt.is_finite() && self.dt > 0.0) {
            return Err(FormError::invalid_param("dt", self.dt, "must be positive and finite"));
        }
        Ok(())
    }
}

/// Particles for every active vertex of one mesh.
#[derive(Debug, Clone)]
pub struct ParticleSystem<I: MeshIndex = u32> {
    particles: Vec<Particle<I>>,
    /// Vertex index to particle slot; `None` for inactive vertices.
    by_vertex: Vec<Option<usize>>,
}

impl<I: MeshIndex> ParticleSystem<I> {
    /// Create one particle per active vertex.
    ///
    /// With `fix_boundary`, particles of boundary vertices start fixed.
    pub fn attach(mesh: &HalfEdgeMesh<I>, fix_boundary: bool) -> Self {
        let mut particles = Vec::with_capacity(mesh.num_vertices());
        let mut by_vertex = vec![None; mesh.num_vertices()];

        for v in mesh.vertex_ids() {
            let mut particle = Particle::new(v);
            particle.fixed = fix_boundary && mesh.is_boundary_vertex(v);
            by_vertex[v.index()] = Some(particles.len());
            particles.push(particle);
        }

        log::debug!(
            "attached {} particles ({} fixed)",
            particles.len(),
            particles.iter().filter(|p| p.fixed).count()
        );

        Self {
            particles,
            by_vertex,
        }
    }

    /// Number of particles.
    #[inline]
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    /// Whether there are no particles.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// All particles in creation order.
    #[inline]
    pub fn particles(&self) -> &[Particle<I>] {
        &self.particles
    }

    #[inline]
    pub(crate) fn particles_mut(&mut self) -> &mut [Particle<I>] {
        &mut self.particles
    }

    /// Fail unless the particles were attached to a mesh with this vertex count.
    pub(crate) fn check_layout(&self, mesh: &HalfEdgeMesh<I>) -> Result<()> {
        if self.by_vertex.len() != mesh.num_vertices() {
            return Err(FormError::size_mismatch(
                "vertices",
                self.by_vertex.len(),
                mesh.num_vertices(),
            ));
        }
        Ok(())
    }

    fn slot(&self, v: VertexId<I>) -> Result<usize> {
        match self.by_vertex.get(v.index()) {
            Some(Some(slot)) => Ok(*slot),
            _ => Err(FormError::IndexOutOfRange {
                kind: "vertex",
                index: v.index(),
                len: self.by_vertex.len(),
            }),
        }
    }

    /// The particle of a vertex.
    pub fn particle(&self, v: VertexId<I>) -> Result<&Particle<I>> {
        let slot = self.slot(v)?;
        Ok(&self.particles[slot])
    }

    /// Whether the particle of a vertex is fixed.
    pub fn is_fixed(&self, v: VertexId<I>) -> Result<bool> {
        Ok(self.particle(v)?.fixed)
    }

    /// Fix or release the particles of the given vertex indices.
    ///
    /// Every index is checked before any particle changes.
    pub fn set_fixed(&mut self, vertices: &[usize], fixed: bool) -> Result<()> {
        let slots = vertices
            .iter()
            .map(|&i| self.slot(VertexId::new(i)))
            .collect::<Result<Vec<_>>>()?;
        for slot in slots {
            self.particles[slot].fixed = fixed;
        }
        Ok(())
    }

    /// Fix every particle whose vertex lies on the boundary.
    pub fn set_fixed_boundary(&mut self, mesh: &HalfEdgeMesh<I>) -> Result<()> {
        self.check_layout(mesh)?;
        for p in &mut self.particles {
            if mesh.is_boundary_vertex(p.vertex) {
                p.fixed = true;
            }
        }
        Ok(())
    }

    /// Set the mass of a particle.
    pub fn set_mass(&mut self, v: VertexId<I>, mass: f64) -> Result<()> {
        if !(mass.is_finite() && mass > 0.0) {
            return Err(FormError::invalid_param("mass", mass, "must be positive and finite"));
        }
        let slot = self.slot(v)?;
        self.particles[slot].mass = mass;
        Ok(())
    }

    /// Set the velocity of a particle.
    pub fn set_velocity(&mut self, v: VertexId<I>, velocity: Vector3<f64>) -> Result<()> {
        let slot = self.slot(v)?;
        self.particles[slot].velocity = velocity;
        Ok(())
    }

    /// Accumulate a force on the particle of `v`. Fixed particles ignore it.
    pub fn add_force(&mut self, v: VertexId<I>, force: Vector3<f64>) -> Result<()> {
        let slot = self.slot(v)?;
        let p = &mut self.particles[slot];
        if !p.fixed {
            p.force += force;
        }
        Ok(())
    }

    /// Accumulated force on the particle of `v`.
    pub fn force(&self, v: VertexId<I>) -> Result<Vector3<f64>> {
        Ok(self.particle(v)?.force)
    }

    /// Reset every accumulated force.
    pub fn clear_forces(&mut self) {
        for p in &mut self.particles {
            p.force = Vector3::zeros();
        }
    }

    /// Advance every free particle by one step, writing new positions into `mesh`.
    ///
    /// # Errors
    /// Fails before moving anything if `dt` is not positive or the mesh no
    /// longer matches the particle layout.
    pub fn integrate(&mut self, mesh: &mut HalfEdgeMesh<I>, options: &StepOptions) -> Result<()> {
        options.validate()?;
        self.check_layout(mesh)?;

        let dt = options.dt;
        let positions = mesh.positions_mut();
        let mut moved = 0usize;

        for p in &mut self.particles {
            if !p.fixed {
                let a = p.acceleration();
                let dx = match options.scheme {
                    IntegrationScheme::Euler => {
                        p.velocity += a * dt;
                        p.velocity * dt
                    }
                    IntegrationScheme::Rk4 => {
                        let v = p.velocity;
                        let k1 = Derivative { dx: v, dv: a };
                        let k2 = Derivative {
                            dx: v + k1.dv * (dt * 0.5),
                            dv: a,
                        };
                        let k3 = Derivative {
                            dx: v + k2.dv * (dt * 0.5),
                            dv: a,
                        };
                        let k4 = Derivative {
                            dx: v + k3.dv * dt,
                            dv: a,
                        };
                        p.derivatives = [k1, k2, k3, k4];

                        let dxdt = (k1.dx + (k2.dx + k3.dx) * 2.0 + k4.dx) / 6.0;
                        let dvdt = (k1.dv + (k2.dv + k3.dv) * 2.0 + k4.dv) / 6.0;
                        p.velocity += dvdt * dt;
                        dxdt * dt
                    }
                };
                positions[p.vertex.index()] += dx;
                moved += 1;

                if options.clear_velocity {
                    p.velocity = Vector3::zeros();
                }
                if options.clear_derivatives {
                    p.derivatives = [Derivative::default(); 4];
                }
            }

            if options.clear_force {
                p.force = Vector3::zeros();
            }
        }

        log::trace!("integrated {} particles (dt = {})", moved, dt);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use nalgebra::Point3;

    use super::*;
    use crate::mesh::build_from_quads;

    fn grid() -> HalfEdgeMesh {
        let mut positions = Vec::new();
        for j in 0..3 {
            for i in 0..3 {
                positions.push(Point3::new(i as f64, j as f64, 0.0));
            }
        }
        let faces = [[0, 1, 4, 3], [1, 2, 5, 4], [3, 4, 7, 6], [4, 5, 8, 7]];
        build_from_quads(&positions, &faces).unwrap()
    }

    #[test]
    fn test_attach_fixes_boundary() {
        let mesh = grid();
        let particles = ParticleSystem::attach(&mesh, true);

        assert_eq!(particles.len(), 9);
        let fixed: Vec<usize> = particles
            .particles()
            .iter()
            .filter(|p| p.fixed)
            .map(|p| p.vertex.index())
            .collect();
        assert_eq!(fixed, vec![0, 1, 2, 3, 5, 6, 7, 8]);

        let free = ParticleSystem::attach(&mesh, false);
        assert!(free.particles().iter().all(|p| !p.fixed));
        assert_eq!(free.particle(VertexId::new(4)).unwrap().mass, DEFAULT_MASS);
    }

    #[test]
    fn test_add_force_ignores_fixed() {
        let mesh = grid();
        let mut particles = ParticleSystem::attach(&mesh, true);

        let f = Vector3::new(0.0, 0.0, 1.0);
        particles.add_force(VertexId::new(0), f).unwrap();
        particles.add_force(VertexId::new(4), f).unwrap();
        particles.add_force(VertexId::new(4), f).unwrap();

        assert_eq!(particles.force(VertexId::new(0)).unwrap(), Vector3::zeros());
        assert_eq!(particles.force(VertexId::new(4)).unwrap(), f * 2.0);
    }

    #[test]
    fn test_add_force_out_of_range() {
        let mesh = grid();
        let mut particles = ParticleSystem::attach(&mesh, false);
        let err = particles
            .add_force(VertexId::new(42), Vector3::x())
            .unwrap_err();
        assert_eq!(
            err,
            FormError::IndexOutOfRange {
                kind: "vertex",
                index: 42,
                len: 9
            }
        );
    }

    #[test]
    fn test_euler_step() {
        let mut mesh = grid();
        let mut particles = ParticleSystem::attach(&mesh, false);
        let v = VertexId::new(4);

        particles.add_force(v, Vector3::new(0.0, 0.0, 2.0)).unwrap();
        particles.set_mass(v, 2.0).unwrap();

        let options = StepOptions::default().with_dt(0.5);
        particles.integrate(&mut mesh, &options).unwrap();

        // a = 1, v = 0.5, dx = 0.25
        assert_relative_eq!(mesh.position(v).z, 0.25);
        assert_relative_eq!(particles.particle(v).unwrap().velocity.z, 0.5);
        assert_eq!(particles.force(v).unwrap(), Vector3::zeros());
    }

    #[test]
    fn test_rk4_step() {
        let mut mesh = grid();
        let mut particles = ParticleSystem::attach(&mesh, false);
        let v = VertexId::new(4);

        particles.set_velocity(v, Vector3::new(1.0, 0.0, 0.0)).unwrap();
        particles.add_force(v, Vector3::new(0.0, 0.0, 2.0)).unwrap();

        let options = StepOptions::default()
            .with_dt(1.0)
            .with_scheme(IntegrationScheme::Rk4);
        particles.integrate(&mut mesh, &options).unwrap();

        // x += v dt + a dt^2 / 2
        let p = mesh.position(v);
        assert_relative_eq!(p.x, 2.0, epsilon = 1e-12);
        assert_relative_eq!(p.z, 1.0, epsilon = 1e-12);

        let particle = particles.particle(v).unwrap();
        assert_relative_eq!(particle.velocity.z, 2.0, epsilon = 1e-12);
        assert_relative_eq!(particle.derivatives[3].dx.z, 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_fixed_particles_stay_put() {
        let mut mesh = grid();
        let before = mesh.positions().to_vec();
        let mut particles = ParticleSystem::attach(&mesh, false);
        particles.set_fixed(&[0, 4], true).unwrap();

        particles
            .set_velocity(VertexId::new(0), Vector3::new(1.0, 1.0, 1.0))
            .unwrap();
        for i in 0..9 {
            particles.add_force(VertexId::new(i), Vector3::z()).unwrap();
        }
        particles.integrate(&mut mesh, &StepOptions::default()).unwrap();

        assert_eq!(mesh.positions()[0], before[0]);
        assert_eq!(mesh.positions()[4], before[4]);
        assert!(mesh.positions()[1].z > 0.0);
        assert_eq!(
            particles.particle(VertexId::new(0)).unwrap().velocity,
            Vector3::new(1.0, 1.0, 1.0)
        );
    }

    #[test]
    fn test_fixed_particles_keep_velocity_when_clearing() {
        let mut mesh = grid();
        let mut particles = ParticleSystem::attach(&mesh, false);
        let pinned = VertexId::new(0);
        let free = VertexId::new(4);

        particles.set_velocity(pinned, Vector3::x()).unwrap();
        particles.set_fixed(&[0], true).unwrap();
        particles.add_force(free, Vector3::z()).unwrap();

        for scheme in [IntegrationScheme::Euler, IntegrationScheme::Rk4] {
            let options = StepOptions::default()
                .with_scheme(scheme)
                .with_clear_velocity(true)
                .with_clear_derivatives(true);
            particles.integrate(&mut mesh, &options).unwrap();

            let p = particles.particle(pinned).unwrap();
            assert_eq!(p.velocity, Vector3::x());
            assert_eq!(*mesh.position(pinned), Point3::new(0.0, 0.0, 0.0));
            assert_eq!(particles.particle(free).unwrap().velocity, Vector3::zeros());
        }
    }

    #[test]
    fn test_fixed_boundary_checks_layout() {
        let mesh = grid();
        let mut particles = ParticleSystem::attach(&mesh, false);

        let positions = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        let small: HalfEdgeMesh =
            crate::mesh::build_from_triangles(&positions, &[[0, 1, 2]]).unwrap();
        let err = particles.set_fixed_boundary(&small).unwrap_err();
        assert!(matches!(err, FormError::SizeMismatch { name: "vertices", .. }));
        assert!(particles.particles().iter().all(|p| !p.fixed));

        particles.set_fixed_boundary(&mesh).unwrap();
        assert!(!particles.is_fixed(VertexId::new(4)).unwrap());
        assert!(particles.is_fixed(VertexId::new(0)).unwrap());
    }

    #[test]
    fn test_clear_flags() {
        let mut mesh = grid();
        let mut particles = ParticleSystem::attach(&mesh, false);
        let v = VertexId::new(4);

        particles.add_force(v, Vector3::z()).unwrap();
        let options = StepOptions::default()
            .keep_force()
            .with_clear_velocity(true)
            .with_scheme(IntegrationScheme::Rk4)
            .with_clear_derivatives(true);
        particles.integrate(&mut mesh, &options).unwrap();

        let p = particles.particle(v).unwrap();
        assert_eq!(p.force, Vector3::z());
        assert_eq!(p.velocity, Vector3::zeros());
        assert_eq!(p.derivatives, [Derivative::default(); 4]);
    }

    #[test]
    fn test_invalid_parameters() {
        let mut mesh = grid();
        let mut particles = ParticleSystem::attach(&mesh, false);

        let err = particles
            .integrate(&mut mesh, &StepOptions::default().with_dt(0.0))
            .unwrap_err();
        assert!(matches!(err, FormError::InvalidParameter { name: "dt", .. }));

        assert!(particles.set_mass(VertexId::new(0), -1.0).is_err());
        assert!(particles.set_fixed(&[1, 99], true).is_err());
        assert!(!particles.is_fixed(VertexId::new(1)).unwrap());
    }
}
