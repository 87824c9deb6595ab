//! Progress reporting for relaxation loops.
//!
//! A [`Progress`] observer is handed to [`relax`](super::MeshDynamics::relax)
//! through [`RelaxOptions`](super::RelaxOptions) and receives one [`Tick`] per
//! iteration. Nothing is global: independent simulations carry independent
//! observers.
//!
//! # Example
//!
//! ```
//! use formfind::dynamics::{Progress, RelaxOptions};
//!
//! let progress = Progress::new(|tick| {
//!     if tick.converged {
//!         println!("converged after {} iterations", tick.iteration + 1);
//!     }
//! });
//!
//! let options = RelaxOptions::default().with_progress(progress);
//! ```

/// State of a relaxation loop after one iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    /// Zero-based iteration that just finished.
    pub iteration: usize,
    /// Iteration budget of the loop.
    pub max_iterations: usize,
    /// Whether the force closure reported convergence on this iteration.
    pub converged: bool,
}

/// Observer receiving per-iteration notifications.
pub struct Progress {
    callback: Box<dyn Fn(&Tick) + Send + Sync>,
}

impl Progress {
    /// Create an observer from a callback.
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(&Tick) + Send + Sync + 'static,
    {
        Self {
            callback: Box::new(callback),
        }
    }

    /// Notify the observer.
    #[inline]
    pub fn report(&self, tick: &Tick) {
        (self.callback)(tick);
    }

    /// An observer that discards every notification.
    pub fn none() -> Self {
        Self::new(|_| {})
    }
}

impl Default for Progress {
    fn default() -> Self {
        Self::none()
    }
}

impl std::fmt::Debug for Progress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Progress").finish_non_exhaustive()
    }
}
