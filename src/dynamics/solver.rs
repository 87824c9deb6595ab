//! Dynamics orchestrator.
//!
//! [`MeshDynamics`] owns a mesh and, once made dynamic, its particles. A
//! simulation tick is: apply forces through [`split`](MeshDynamics::split),
//! then [`update`](MeshDynamics::update) to integrate and refresh normals.
//! [`relax`](MeshDynamics::relax) runs that tick in a bounded loop.
//!
//! # Example
//!
//! ```
//! use formfind::prelude::*;
//! use formfind::dynamics::forces::{add_planarity_force, AxisConstraint, PlanarityKind};
//! use nalgebra::Point3;
//!
//! let positions = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(1.0, 1.0, 0.2),
//!     Point3::new(0.0, 1.0, 0.0),
//! ];
//! let mesh: HalfEdgeMesh = build_from_quads(&positions, &[[0, 1, 2, 3]]).unwrap();
//! let mut dynamics = MeshDynamics::create(mesh, false);
//!
//! let options = RelaxOptions::default()
//!     .with_max_iterations(100)
//!     .with_step(StepOptions::default().with_dt(1.0).with_clear_velocity(true));
//!
//! let outcome = dynamics
//!     .relax(&options, |mesh, particles| {
//!         let report = add_planarity_force(
//!             mesh,
//!             particles,
//!             PlanarityKind::Quad,
//!             0.5,
//!             1e-6,
//!             AxisConstraint::None,
//!         )?;
//!         Ok(report.exit)
//!     })
//!     .unwrap();
//! assert!(outcome.converged);
//! ```

use super::particle::{ParticleSystem, StepOptions};
use super::progress::{Progress, Tick};
use crate::error::{FormError, Result};
use crate::mesh::{Color, HalfEdgeMesh, MeshIndex, VertexId};

/// Whether particles are attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DynamicsState {
    /// Topology only.
    Static,
    /// Particles attached; forces and integration are available.
    Dynamic,
}

/// Options for [`MeshDynamics::relax`].
#[derive(Debug)]
pub struct RelaxOptions {
    /// Upper bound on force evaluations.
    pub max_iterations: usize,

    /// Integration settings for every tick.
    pub step: StepOptions,

    /// Observer notified after every iteration.
    pub progress: Progress,
}

impl Default for RelaxOptions {
    fn default() -> Self {
        Self {
            max_iterations: 1000,
            step: StepOptions::default(),
            progress: Progress::none(),
        }
    }
}

impl RelaxOptions {
    /// Set the iteration budget.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Set the integration settings.
    pub fn with_step(mut self, step: StepOptions) -> Self {
        self.step = step;
        self
    }

    /// Set the progress observer.
    pub fn with_progress(mut self, progress: Progress) -> Self {
        self.progress = progress;
        self
    }
}

/// How a relaxation loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelaxOutcome {
    /// Number of force evaluations performed.
    pub iterations: usize,
    /// Whether the force closure reported convergence.
    pub converged: bool,
}

/// A mesh together with its particle state.
#[derive(Debug, Clone)]
pub struct MeshDynamics<I: MeshIndex = u32> {
    mesh: HalfEdgeMesh<I>,
    particles: Option<ParticleSystem<I>>,
}

impl<I: MeshIndex> MeshDynamics<I> {
    /// Wrap a mesh without particles.
    pub fn new(mesh: HalfEdgeMesh<I>) -> Self {
        Self {
            mesh,
            particles: None,
        }
    }

    /// Wrap a mesh and attach particles right away.
    pub fn create(mesh: HalfEdgeMesh<I>, fix_boundary: bool) -> Self {
        let mut dynamics = Self::new(mesh);
        dynamics.make_dynamic(fix_boundary);
        dynamics
    }

    /// Attach fresh particles, replacing any existing ones.
    ///
    /// Vertices of free particles are colored blue.
    pub fn make_dynamic(&mut self, fix_boundary: bool) {
        let particles = ParticleSystem::attach(&self.mesh, fix_boundary);
        for p in particles.particles().iter().filter(|p| !p.fixed) {
            self.mesh.set_vertex_color(p.vertex, Color::BLUE);
        }
        self.particles = Some(particles);
        log::debug!("mesh dynamics: static -> dynamic");
    }

    /// Drop the particles and return to the static state. The mesh is kept.
    pub fn clear(&mut self) {
        if self.particles.take().is_some() {
            log::debug!("mesh dynamics: dynamic -> static");
        }
    }

    /// Current state.
    pub fn state(&self) -> DynamicsState {
        if self.particles.is_some() {
            DynamicsState::Dynamic
        } else {
            DynamicsState::Static
        }
    }

    /// Number of particles, zero while static.
    pub fn num_particles(&self) -> usize {
        self.particles.as_ref().map_or(0, ParticleSystem::len)
    }

    /// The mesh.
    #[inline]
    pub fn mesh(&self) -> &HalfEdgeMesh<I> {
        &self.mesh
    }

    /// Give the mesh back, dropping the particles.
    pub fn into_mesh(self) -> HalfEdgeMesh<I> {
        self.mesh
    }

    /// The particles.
    pub fn particles(&self) -> Result<&ParticleSystem<I>> {
        self.particles.as_ref().ok_or_else(static_error)
    }

    /// Borrow the mesh and the particles at once, for applying forces.
    pub fn split(&mut self) -> Result<(&HalfEdgeMesh<I>, &mut ParticleSystem<I>)> {
        let particles = self.particles.as_mut().ok_or_else(static_error)?;
        Ok((&self.mesh, particles))
    }

    /// Fix the particles of the given vertex indices.
    pub fn set_fixed(&mut self, vertices: &[usize]) -> Result<()> {
        let (_, particles) = self.split()?;
        particles.set_fixed(vertices, true)
    }

    /// Fix every boundary particle.
    pub fn set_fixed_boundary(&mut self) -> Result<()> {
        let (mesh, particles) = self.split()?;
        particles.set_fixed_boundary(mesh)
    }

    /// Accumulate a force on one vertex.
    pub fn add_force(&mut self, vertex: usize, force: nalgebra::Vector3<f64>) -> Result<()> {
        let (mesh, particles) = self.split()?;
        let v: VertexId<I> = mesh.checked_vertex(vertex)?;
        particles.add_force(v, force)
    }

    /// Integrate one step and refresh the cached normals.
    pub fn update(&mut self, options: &StepOptions) -> Result<()> {
        let particles = self.particles.as_mut().ok_or_else(static_error)?;
        particles.integrate(&mut self.mesh, options)?;
        self.mesh.compute_normals();
        Ok(())
    }

    /// Run force evaluation and integration until convergence or the budget runs out.
    ///
    /// `forces` applies the forces of one tick and returns whether the shape
    /// has converged. On convergence the forces of that last evaluation are
    /// discarded and no further step is taken.
    pub fn relax<F>(&mut self, options: &RelaxOptions, mut forces: F) -> Result<RelaxOutcome>
    where
        F: FnMut(&HalfEdgeMesh<I>, &mut ParticleSystem<I>) -> Result<bool>,
    {
        let max_iterations = options.max_iterations;

        for iteration in 0..max_iterations {
            let (mesh, particles) = self.split()?;
            let converged = forces(mesh, particles)?;

            if converged {
                particles.clear_forces();
            } else {
                self.update(&options.step)?;
            }

            options.progress.report(&Tick {
                iteration,
                max_iterations,
                converged,
            });

            if converged {
                log::debug!("relaxation converged after {} iterations", iteration + 1);
                return Ok(RelaxOutcome {
                    iterations: iteration + 1,
                    converged: true,
                });
            }
        }

        log::debug!("relaxation stopped after {} iterations without converging", max_iterations);
        Ok(RelaxOutcome {
            iterations: max_iterations,
            converged: false,
        })
    }
}

fn static_error() -> FormError {
    FormError::InvalidState("mesh has no particles; call make_dynamic first".to_string())
}
