//! Particle dynamics for form-finding.
//!
//! Every active vertex of a mesh carries a [`Particle`]. Force functions in
//! [`forces`] read the current geometry and accumulate forces on the
//! particles; [`ParticleSystem::integrate`] then moves the vertices.
//! [`MeshDynamics`] ties the two together and runs relaxation loops.
//!
//! Forces accumulate until a step consumes them, so several force laws can
//! be combined in one tick by calling them one after another.

pub mod forces;
mod particle;
mod progress;
mod solver;

pub use particle::{
    Derivative, IntegrationScheme, Particle, ParticleSystem, StepOptions, DEFAULT_MASS,
};
pub use progress::{Progress, Tick};
pub use solver::{DynamicsState, MeshDynamics, RelaxOptions, RelaxOutcome};
