//! Double-buffered roster storage.
//!
//! [`RosterStore`] publishes the last committed [`Generation`] through an
//! [`ArcSwap`], so report readers never lock and always observe a complete
//! generation. A poll cycle assembles the next generation privately inside a
//! [`CycleHandle`] and makes it visible with a single [`RosterStore::commit`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use arc_swap::ArcSwap;
use chrono::Utc;
use indexmap::IndexMap;

use crate::character::Character;
use crate::error::RosterError;
use crate::types::{GenerationId, Timestamp};

/// Sentinel stored in `open_cycle` while no cycle is building.
const NO_CYCLE: GenerationId = 0;

// ---------------------------------------------------------------------------
// Generation
// ---------------------------------------------------------------------------

/// One complete, immutable roster snapshot.
///
/// Characters keep the order in which the data source returned them. A
/// repeated name overwrites the earlier record but keeps its position.
#[derive(Debug, Clone, Default)]
pub struct Generation {
    id: GenerationId,
    committed_at: Option<Timestamp>,
    characters: IndexMap<String, Character>,
}

impl Generation {
    /// The empty generation every store starts from.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a generation directly from records (used by tests and tools
    /// that diff two polls without a store).
    pub fn from_characters(
        id: GenerationId,
        characters: impl IntoIterator<Item = Character>,
    ) -> Self {
        let mut generation = Self {
            id,
            ..Self::default()
        };
        for character in characters {
            generation.insert(character);
        }
        generation
    }

    pub fn id(&self) -> GenerationId {
        self.id
    }

    /// When this generation was published, `None` for uncommitted ones.
    pub fn committed_at(&self) -> Option<Timestamp> {
        self.committed_at
    }

    pub fn get(&self, name: &str) -> Option<&Character> {
        self.characters.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.characters.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.characters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.characters.is_empty()
    }

    /// Characters in source order.
    pub fn iter(&self) -> impl Iterator<Item = &Character> {
        self.characters.values()
    }

    /// Character names in source order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.characters.keys().map(String::as_str)
    }

    fn insert(&mut self, character: Character) {
        self.characters.insert(character.name().to_string(), character);
    }
}

// ---------------------------------------------------------------------------
// CycleHandle
// ---------------------------------------------------------------------------

/// Exclusive access to the generation being built by the current cycle.
///
/// Obtained from [`RosterStore::begin_cycle`]. Dropping the handle without
/// committing discards the building generation and leaves the committed
/// one untouched.
#[derive(Debug)]
pub struct CycleHandle<'a> {
    store: &'a RosterStore,
    building: Generation,
    finished: bool,
}

impl CycleHandle<'_> {
    /// Generation number this cycle will publish on commit.
    pub fn id(&self) -> GenerationId {
        self.building.id
    }

    /// Add or overwrite a record by name.
    pub fn insert(&mut self, character: Character) {
        self.building.insert(character);
    }

    /// Read-only view of the generation assembled so far.
    pub fn building(&self) -> &Generation {
        &self.building
    }
}

impl Drop for CycleHandle<'_> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        let id = self.building.id;
        let released = self
            .store
            .open_cycle
            .compare_exchange(id, NO_CYCLE, Ordering::AcqRel, Ordering::Acquire)
            .is_ok();
        tracing::debug!(generation = id, released, "Discarded building generation");
    }
}

// ---------------------------------------------------------------------------
// RosterStore
// ---------------------------------------------------------------------------

/// Holds the last committed generation and arbitrates poll cycles.
#[derive(Debug)]
pub struct RosterStore {
    committed: ArcSwap<Generation>,
    /// Id of the generation currently being built, or [`NO_CYCLE`].
    open_cycle: AtomicU64,
}

impl RosterStore {
    /// Create a store whose committed generation is empty (generation 0).
    pub fn new() -> Self {
        Self {
            committed: ArcSwap::from_pointee(Generation::empty()),
            open_cycle: AtomicU64::new(NO_CYCLE),
        }
    }

    /// Open a new, empty building generation.
    ///
    /// Fails with [`RosterError::CycleInProgress`] while another handle is
    /// still alive.
    pub fn begin_cycle(&self) -> Result<CycleHandle<'_>, RosterError> {
        let id = self.committed.load().id + 1;
        if let Err(open) = self.open_cycle.compare_exchange(
            NO_CYCLE,
            id,
            Ordering::AcqRel,
            Ordering::Acquire,
        ) {
            return Err(RosterError::CycleInProgress(open));
        }

        Ok(CycleHandle {
            store: self,
            building: Generation {
                id,
                ..Generation::default()
            },
            finished: false,
        })
    }

    /// Publish the handle's generation as the new committed one.
    ///
    /// Returns `(old, new)`. This is the only place the committed
    /// generation changes; concurrent [`snapshot`](Self::snapshot) calls see
    /// either `old` or `new` in full.
    pub fn commit(
        &self,
        mut handle: CycleHandle<'_>,
    ) -> Result<(Arc<Generation>, Arc<Generation>), RosterError> {
        let id = handle.id();
        if !std::ptr::eq(handle.store, self) || self.open_cycle.load(Ordering::Acquire) != id {
            return Err(RosterError::StaleCycle { handle: id });
        }

        let mut building = std::mem::take(&mut handle.building);
        handle.finished = true;
        building.committed_at = Some(Utc::now());

        let new = Arc::new(building);
        let old = self.committed.swap(Arc::clone(&new));
        self.open_cycle.store(NO_CYCLE, Ordering::Release);

        tracing::debug!(
            generation = id,
            characters = new.len(),
            previous_characters = old.len(),
            "Committed roster generation"
        );
        Ok((old, new))
    }

    /// Abandon a building generation. The committed one is left unchanged.
    pub fn discard(&self, handle: CycleHandle<'_>) {
        drop(handle);
    }

    /// The last committed generation.
    pub fn snapshot(&self) -> Arc<Generation> {
        self.committed.load_full()
    }

    /// Whether a cycle currently holds a building generation.
    pub fn cycle_open(&self) -> bool {
        self.open_cycle.load(Ordering::Acquire) != NO_CYCLE
    }
}

impl Default for RosterStore {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
