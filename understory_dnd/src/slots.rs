// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Generational identifiers and the slot storage behind them.
//!
//! ## Semantics
//!
//! - On insert, a fresh slot is allocated with generation `1`.
//! - On remove, the slot is freed; any existing identifier that pointed to that slot is now stale.
//! - On reuse of a freed slot, its generation is incremented, producing a new, distinct identifier.
//!
//! Stale identifiers never alias a different live entry because the generation must match.

use core::marker::PhantomData;

pub(crate) trait SlotKey: Copy {
    fn from_parts(idx: u32, generation: u32) -> Self;
    fn idx(self) -> usize;
    fn generation(self) -> u32;
}

macro_rules! slot_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
        pub struct $name(u32, u32);

        impl SlotKey for $name {
            #[inline]
            fn from_parts(idx: u32, generation: u32) -> Self {
                Self(idx, generation)
            }

            #[inline]
            fn idx(self) -> usize {
                self.0 as usize
            }

            #[inline]
            fn generation(self) -> u32 {
                self.1
            }
        }
    };
}

slot_id! {
    /// Handle of a drag session attached to an element.
    SessionId
}

slot_id! {
    /// Handle of a drop zone attached to an element.
    ZoneId
}

slot_id! {
    /// Handle of a sortable container attached to an element.
    ContainerId
}

/// Slot storage keyed by a generational identifier.
pub(crate) struct Slots<K, T> {
    entries: Vec<Option<T>>,
    generations: Vec<u32>, // last generation per slot (persists across frees)
    free_list: Vec<usize>,
    _key: PhantomData<fn() -> K>,
}

impl<K, T> core::fmt::Debug for Slots<K, T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let alive = self.entries.iter().filter(|e| e.is_some()).count();
        f.debug_struct("Slots")
            .field("total", &self.entries.len())
            .field("alive", &alive)
            .field("free_list", &self.free_list.len())
            .finish()
    }
}

impl<K, T> Default for Slots<K, T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
            _key: PhantomData,
        }
    }
}

impl<K: SlotKey, T> Slots<K, T> {
    /// Insert a value built from its own key.
    pub(crate) fn insert_with(&mut self, build: impl FnOnce(K) -> T) -> K {
        let (idx, generation) = if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            (idx, generation)
        } else {
            self.entries.push(None);
            self.generations.push(1);
            (self.entries.len() - 1, 1)
        };
        #[allow(
            clippy::cast_possible_truncation,
            reason = "Identifiers use 32-bit slot indices by design."
        )]
        let key = K::from_parts(idx as u32, generation);
        self.entries[idx] = Some(build(key));
        key
    }

    pub(crate) fn remove(&mut self, key: K) -> Option<T> {
        if !self.contains(key) {
            return None;
        }
        let value = self.entries[key.idx()].take();
        self.free_list.push(key.idx());
        value
    }

    pub(crate) fn contains(&self, key: K) -> bool {
        self.entries
            .get(key.idx())
            .is_some_and(|e| e.is_some() && self.generations[key.idx()] == key.generation())
    }

    pub(crate) fn get(&self, key: K) -> Option<&T> {
        if !self.contains(key) {
            return None;
        }
        self.entries[key.idx()].as_ref()
    }

    pub(crate) fn get_mut(&mut self, key: K) -> Option<&mut T> {
        if !self.contains(key) {
            return None;
        }
        self.entries[key.idx()].as_mut()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (K, &T)> + '_ {
        self.entries.iter().enumerate().filter_map(|(i, e)| {
            let value = e.as_ref()?;
            #[allow(
                clippy::cast_possible_truncation,
                reason = "Identifiers use 32-bit slot indices by design."
            )]
            let key = K::from_parts(i as u32, self.generations[i]);
            Some((key, value))
        })
    }

    pub(crate) fn keys(&self) -> Vec<K> {
        self.iter().map(|(k, _)| k).collect()
    }
}
