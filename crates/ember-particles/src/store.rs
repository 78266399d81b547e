//! Dense particle storage with generation-checked handles.
//!
//! Live particles are packed contiguously so the per-frame sweep walks a
//! flat slice. Removal is O(1): the last particle is moved into the hole.
//! Callers hold [`ParticleHandle`]s, which go through a slot table so they
//! survive that reordering and observe `None` once the particle is gone,
//! even after the slot has been handed to a newer particle.

use tracing::debug;

use crate::particle::Particle;

/// Non-owning, generation-checked reference to a particle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParticleHandle {
    slot: u32,
    generation: u32,
}

impl ParticleHandle {
    /// Slot the handle refers to.
    #[must_use]
    pub const fn slot(self) -> u32 {
        self.slot
    }

    /// Generation the slot had when the particle was created.
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

/// Verdict returned by a sweep callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sweep {
    /// Keep the particle.
    Keep,
    /// Remove the particle.
    Remove,
}

#[derive(Debug, Clone, Copy, Default)]
struct Slot {
    generation: u32,
    dense: Option<u32>,
}

/// Owns every live particle.
#[derive(Debug, Default)]
pub struct ParticleStore {
    particles: Vec<Particle>,
    /// Slot owning each dense entry.
    owners: Vec<u32>,
    slots: Vec<Slot>,
    free_slots: Vec<u32>,
    high_water_mark: usize,
}

impl ParticleStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty store with room for `capacity` particles.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            particles: Vec::with_capacity(capacity),
            owners: Vec::with_capacity(capacity),
            slots: Vec::with_capacity(capacity),
            free_slots: Vec::new(),
            high_water_mark: 0,
        }
    }

    /// Inserts a particle and returns its handle.
    ///
    /// The particle's `index` is set to its slot.
    pub fn insert(&mut self, mut particle: Particle) -> ParticleHandle {
        let slot = match self.free_slots.pop() {
            Some(slot) => slot,
            None => {
                self.slots.push(Slot::default());
                (self.slots.len() - 1) as u32
            },
        };

        let dense = self.particles.len();
        particle.index = slot;
        self.particles.push(particle);
        self.owners.push(slot);

        let entry = &mut self.slots[slot as usize];
        entry.dense = Some(dense as u32);

        if self.particles.len() > self.high_water_mark {
            self.high_water_mark = self.particles.len();
            if cfg!(debug_assertions) {
                debug!("Particle high water mark = {}", self.high_water_mark);
            }
        }

        ParticleHandle {
            slot,
            generation: entry.generation,
        }
    }

    /// Removes the particle at dense position `dense`.
    ///
    /// The last particle moves into the vacated position unless it is the
    /// one being removed, in which case the store just shrinks.
    pub fn remove_at(&mut self, dense: usize) -> Option<Particle> {
        let last = self.particles.len().checked_sub(1)?;
        if dense > last {
            return None;
        }

        let slot = self.owners[dense];
        let removed = if dense == last {
            self.owners.pop();
            self.particles.pop()?
        } else {
            self.owners.swap_remove(dense);
            let removed = self.particles.swap_remove(dense);
            let moved = self.owners[dense] as usize;
            self.slots[moved].dense = Some(dense as u32);
            removed
        };

        self.release(slot);
        Some(removed)
    }

    /// Removes the particle referenced by `handle`, if still alive.
    pub fn remove(&mut self, handle: ParticleHandle) -> Option<Particle> {
        let dense = self.dense_index(handle)?;
        self.remove_at(dense)
    }

    fn release(&mut self, slot: u32) {
        let entry = &mut self.slots[slot as usize];
        entry.dense = None;
        entry.generation = entry.generation.wrapping_add(1);
        self.free_slots.push(slot);
    }

    fn dense_index(&self, handle: ParticleHandle) -> Option<usize> {
        let entry = self.slots.get(handle.slot as usize)?;
        if entry.generation != handle.generation {
            return None;
        }
        entry.dense.map(|dense| dense as usize)
    }

    /// Visits every particle once, removing those the callback rejects.
    ///
    /// After a removal the same position is examined again, since it now
    /// holds the particle swapped in from the end. Returns the number of
    /// particles removed.
    pub fn sweep<F>(&mut self, mut visit: F) -> usize
    where
        F: FnMut(&mut Particle) -> Sweep,
    {
        let mut removed = 0;
        let mut i = 0;
        while i < self.particles.len() {
            match visit(&mut self.particles[i]) {
                Sweep::Keep => i += 1,
                Sweep::Remove => {
                    self.remove_at(i);
                    removed += 1;
                },
            }
        }
        removed
    }

    /// Drops every particle and resets the high-water mark.
    ///
    /// Outstanding handles become stale.
    pub fn clear(&mut self) {
        for &slot in &self.owners {
            let entry = &mut self.slots[slot as usize];
            entry.dense = None;
            entry.generation = entry.generation.wrapping_add(1);
            self.free_slots.push(slot);
        }
        self.particles.clear();
        self.owners.clear();
        self.high_water_mark = 0;
    }

    /// Particle referenced by `handle`, if still alive.
    #[must_use]
    pub fn get(&self, handle: ParticleHandle) -> Option<&Particle> {
        self.dense_index(handle).map(|dense| &self.particles[dense])
    }

    /// Mutable access to the particle referenced by `handle`.
    pub fn get_mut(&mut self, handle: ParticleHandle) -> Option<&mut Particle> {
        self.dense_index(handle).map(|dense| &mut self.particles[dense])
    }

    /// Whether `handle` still refers to a live particle.
    #[must_use]
    pub fn contains(&self, handle: ParticleHandle) -> bool {
        self.dense_index(handle).is_some()
    }

    /// Iterates live particles in storage order.
    pub fn iter(&self) -> std::slice::Iter<'_, Particle> {
        self.particles.iter()
    }

    /// Mutably iterates live particles in storage order.
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Particle> {
        self.particles.iter_mut()
    }

    /// Number of live particles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    /// Whether the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Peak number of live particles since the last [`clear`](Self::clear).
    #[must_use]
    pub const fn high_water_mark(&self) -> usize {
        self.high_water_mark
    }
}

impl<'a> IntoIterator for &'a ParticleStore {
    type Item = &'a Particle;
    type IntoIter = std::slice::Iter<'a, Particle>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::particle::{ParticleInfo, ParticleType};
    use glam::Vec3;
    use proptest::prelude::*;

    fn tagged(tag: f32) -> Particle {
        Particle::from_info(&ParticleInfo::new(
            Vec3::new(tag, 0.0, 0.0),
            Vec3::ZERO,
            1.0,
            1.0,
            ParticleType::Debug,
        ))
    }

    fn tag_of(particle: &Particle) -> usize {
        particle.position.x as usize
    }

    #[test]
    fn test_insert_and_get() {
        let mut store = ParticleStore::new();
        let a = store.insert(tagged(1.0));
        let b = store.insert(tagged(2.0));

        assert_eq!(store.len(), 2);
        assert_eq!(store.get(a).map(tag_of), Some(1));
        assert_eq!(store.get(b).map(tag_of), Some(2));
        assert_eq!(store.get(a).map(|p| p.index), Some(a.slot()));
    }

    #[test]
    fn test_remove_middle_swaps_last_in() {
        let mut store = ParticleStore::new();
        let a = store.insert(tagged(0.0));
        let b = store.insert(tagged(1.0));
        let c = store.insert(tagged(2.0));

        assert_eq!(store.remove(a).map(|p| tag_of(&p)), Some(0));
        assert_eq!(store.len(), 2);
        assert_eq!(store.iter().next().map(tag_of), Some(2));
        assert_eq!(store.get(c).map(tag_of), Some(2));
        assert_eq!(store.get(b).map(tag_of), Some(1));
        assert!(!store.contains(a));
    }

    #[test]
    fn test_remove_last_element_only_shrinks() {
        let mut store = ParticleStore::new();
        let a = store.insert(tagged(0.0));
        let b = store.insert(tagged(1.0));

        assert!(store.remove_at(1).is_some());
        assert_eq!(store.len(), 1);
        assert!(store.contains(a));
        assert!(!store.contains(b));
        assert!(store.remove_at(1).is_none());
    }

    #[test]
    fn test_stale_handle_after_slot_reuse() {
        let mut store = ParticleStore::new();
        let old = store.insert(tagged(0.0));
        store.remove(old);
        let new = store.insert(tagged(5.0));

        assert_eq!(old.slot(), new.slot());
        assert_ne!(old.generation(), new.generation());
        assert!(store.get(old).is_none());
        assert_eq!(store.get(new).map(tag_of), Some(5));
    }

    #[test]
    fn test_sweep_removing_everything() {
        let mut store = ParticleStore::new();
        for i in 0..10 {
            store.insert(tagged(i as f32));
        }
        let mut visited = 0;
        let removed = store.sweep(|_| {
            visited += 1;
            Sweep::Remove
        });
        assert_eq!(removed, 10);
        assert_eq!(visited, 10);
        assert!(store.is_empty());
    }

    #[test]
    fn test_high_water_mark_reset_by_clear() {
        let mut store = ParticleStore::new();
        let handles: Vec<_> = (0..5).map(|i| store.insert(tagged(i as f32))).collect();
        store.remove(handles[0]);
        store.remove(handles[1]);
        assert_eq!(store.high_water_mark(), 5);

        store.clear();
        assert_eq!(store.high_water_mark(), 0);
        assert!(store.is_empty());
        assert!(handles.iter().all(|&h| !store.contains(h)));

        store.insert(tagged(0.0));
        assert_eq!(store.high_water_mark(), 1);
    }

    proptest! {
        #[test]
        fn prop_sweep_removes_exactly_marked(mask in proptest::collection::vec(any::<bool>(), 0..64)) {
            let mut store = ParticleStore::new();
            let handles: Vec<_> = (0..mask.len()).map(|i| store.insert(tagged(i as f32))).collect();

            let mut seen = vec![0_u32; mask.len()];
            let removed = store.sweep(|p| {
                let tag = tag_of(p);
                seen[tag] += 1;
                if mask[tag] { Sweep::Remove } else { Sweep::Keep }
            });

            let expected_removed = mask.iter().filter(|&&m| m).count();
            prop_assert_eq!(removed, expected_removed);
            prop_assert_eq!(store.len(), mask.len() - expected_removed);
            prop_assert!(seen.iter().all(|&count| count == 1));

            for (i, handle) in handles.iter().enumerate() {
                if mask[i] {
                    prop_assert!(store.get(*handle).is_none());
                } else {
                    prop_assert_eq!(store.get(*handle).map(tag_of), Some(i));
                }
            }

            let mut tags: Vec<_> = store.iter().map(tag_of).collect();
            tags.sort_unstable();
            tags.dedup();
            prop_assert_eq!(tags.len(), store.len());
        }
    }
}
