//! Storage collaborators for confcentral
//!
//! Two contracts live here:
//!
//! - `EntityStore`: keyed entities with ancestor-scoped iteration, projection
//!   reads and atomic update
//! - `CounterCache`: memcache-style cache with atomic increment, set-if-absent
//!   and prefix reads
//!
//! Both ship with an in-memory engine. Callers hold them as trait objects so
//! every test gets a fresh, isolated instance.

mod counter;
mod entity;
mod entity_store;
mod errors;

pub use counter::{CacheValue, CounterCache, MemoryCounterCache};
pub use entity::{Entity, EntityKey};
pub use entity_store::{EntityStore, MemoryEntityStore};
pub use errors::{CacheError, CacheResult, StoreError, StoreResult};
