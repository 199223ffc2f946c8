//! Interning of render states.
//!
//! The pool keeps one canonical [`CompiledState`] per distinct [`State`],
//! sorted by value. Each entry carries a dense "compiled index" equal to its
//! position in the pool, which the renderer uses to address its per-state
//! triangle buckets directly.
//!
//! Inserting a new state shifts everything after it, so every index is
//! recompiled on insert. States are expected to settle after the first few
//! frames, which keeps that cost out of the steady state.

use std::ops::Deref;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::State;

/// A pooled state and its current compiled index.
#[derive(Debug)]
pub struct CompiledState {
    state: State,
    index: AtomicUsize,
}

impl CompiledState {
    pub fn state(&self) -> &State {
        &self.state
    }

    /// Position in the pool. Changes whenever a smaller state is interned.
    pub fn compiled_index(&self) -> usize {
        self.index.load(Ordering::Relaxed)
    }
}

impl Deref for CompiledState {
    type Target = State;

    fn deref(&self) -> &State {
        &self.state
    }
}

/// Outcome of [`StatePool::intern`].
#[derive(Debug, Clone)]
pub struct Interned {
    pub state: Arc<CompiledState>,
    /// `true` if the state was not in the pool before this call.
    pub inserted: bool,
}

/// Sorted pool of distinct render states.
#[derive(Debug, Default)]
pub struct StatePool {
    states: Vec<Arc<CompiledState>>,
}

impl StatePool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Find the canonical instance of `state`, adding it if necessary.
    pub fn intern(&mut self, state: &State) -> Interned {
        match self.states.binary_search_by(|pooled| pooled.state.cmp(state)) {
            Ok(index) => Interned {
                state: Arc::clone(&self.states[index]),
                inserted: false,
            },
            Err(index) => {
                let compiled = Arc::new(CompiledState {
                    state: *state,
                    index: AtomicUsize::new(index),
                });
                self.states.insert(index, Arc::clone(&compiled));
                self.recompile();
                tracing::debug!(
                    "Interned new render state at index {} ({} distinct)",
                    index,
                    self.states.len()
                );
                Interned {
                    state: compiled,
                    inserted: true,
                }
            }
        }
    }

    /// Look up a state without inserting it.
    pub fn find(&self, state: &State) -> Option<&Arc<CompiledState>> {
        self.states
            .binary_search_by(|pooled| pooled.state.cmp(state))
            .ok()
            .map(|index| &self.states[index])
    }

    pub fn get(&self, index: usize) -> Option<&Arc<CompiledState>> {
        self.states.get(index)
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// States in ascending compiled-index order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<CompiledState>> {
        self.states.iter()
    }

    fn recompile(&self) {
        for (index, compiled) in self.states.iter().enumerate() {
            compiled.index.store(index, Ordering::Relaxed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BlendMode, TextureId};

    #[test]
    fn test_equal_states_share_instance() {
        let mut pool = StatePool::new();
        let a = State::new().with_texture(TextureId(4));
        let b = State::new().with_texture(TextureId(4));

        let first = pool.intern(&a);
        let second = pool.intern(&b);

        assert!(first.inserted);
        assert!(!second.inserted);
        assert!(Arc::ptr_eq(&first.state, &second.state));
        assert_eq!(first.state.compiled_index(), second.state.compiled_index());
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn test_indices_stay_dense_and_sorted() {
        let mut pool = StatePool::new();
        let additive = pool.intern(&State::new().with_blend(BlendMode::Additive)).state;
        let alpha = pool.intern(&State::new().with_blend(BlendMode::Alpha)).state;
        assert_eq!(additive.compiled_index(), 1);
        assert_eq!(alpha.compiled_index(), 0);

        // Smaller than both: everything shifts up.
        let replace = pool.intern(&State::new().with_blend(BlendMode::Replace)).state;
        assert_eq!(replace.compiled_index(), 0);
        assert_eq!(alpha.compiled_index(), 1);
        assert_eq!(additive.compiled_index(), 2);

        let indices: Vec<usize> = pool.iter().map(|s| s.compiled_index()).collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn test_find() {
        let mut pool = StatePool::new();
        let state = State::new().with_blend(BlendMode::Multiply);
        assert!(pool.find(&state).is_none());
        pool.intern(&state);
        assert!(pool.find(&state).is_some());
    }
}
