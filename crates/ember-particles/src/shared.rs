//! Thread-shareable particle system handle.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::resources::AnimationService;
use crate::system::ParticleSystem;

/// Cloneable handle to a particle system behind a mutex.
///
/// All access goes through [`with_lock`](Self::with_lock), so no call can
/// observe the store mid-sweep.
pub struct SharedParticleSystem<A: AnimationService> {
    inner: Arc<Mutex<ParticleSystem<A>>>,
}

impl<A: AnimationService> SharedParticleSystem<A> {
    /// Wraps an owned system.
    pub fn new(system: ParticleSystem<A>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(system)),
        }
    }

    /// Runs `f` with exclusive access to the system.
    pub fn with_lock<R>(&self, f: impl FnOnce(&mut ParticleSystem<A>) -> R) -> R {
        let mut guard = self.inner.lock();
        f(&mut guard)
    }
}

impl<A: AnimationService> Clone for SharedParticleSystem<A> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<A: AnimationService> std::fmt::Debug for SharedParticleSystem<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedParticleSystem")
            .field("handles", &Arc::strong_count(&self.inner))
            .finish_non_exhaustive()
    }
}
