//! Featured Speaker Tally Tests
//!
//! Properties of the speaker tally and the featured speaker resolver:
//! - Concurrent bumps are never lost
//! - Ties are kept as a set
//! - An empty tally yields an empty result, never an error
//! - Resolving is idempotent and writes the set back onto the conference

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use confcentral::featured::{
    FeaturedSpeakerResolver, SpeakerTallyStore, FEATURED_SPEAKERS_ATTRIBUTE,
};
use confcentral::observability::MetricsRegistry;
use confcentral::store::{
    CacheError, CacheResult, CacheValue, CounterCache, Entity, EntityKey, EntityStore,
    MemoryCounterCache, MemoryEntityStore, StoreError, StoreResult,
};
use serde_json::json;

// =============================================================================
// Helper Functions
// =============================================================================

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

fn set(list: &[&str]) -> BTreeSet<String> {
    list.iter().map(|s| s.to_string()).collect()
}

struct Fixture {
    cache: Arc<MemoryCounterCache>,
    store: Arc<MemoryEntityStore>,
    metrics: Arc<MetricsRegistry>,
    resolver: FeaturedSpeakerResolver,
    conference: EntityKey,
}

fn setup() -> Fixture {
    let cache = Arc::new(MemoryCounterCache::new());
    let store = Arc::new(MemoryEntityStore::new());
    let metrics = Arc::new(MetricsRegistry::new());

    let conference = EntityKey::root("Conference", "1");
    let mut entity = Entity::new(conference.clone());
    entity.set("name", json!("RustConf"));
    store.put(entity).unwrap();

    let resolver = FeaturedSpeakerResolver::new(
        SpeakerTallyStore::new(cache.clone()),
        store.clone(),
        metrics.clone(),
    );

    Fixture {
        cache,
        store,
        metrics,
        resolver,
        conference,
    }
}

/// Cache whose backend is unreachable
struct DownCache;

impl DownCache {
    fn down<T>() -> CacheResult<T> {
        Err(CacheError::Unavailable("connection refused".into()))
    }
}

impl CounterCache for DownCache {
    fn get(&self, _key: &str) -> CacheResult<Option<CacheValue>> {
        Self::down()
    }
    fn set(&self, _key: &str, _value: CacheValue) -> CacheResult<()> {
        Self::down()
    }
    fn add(&self, _key: &str, _value: CacheValue) -> CacheResult<bool> {
        Self::down()
    }
    fn incr(&self, _key: &str, _delta: u64) -> CacheResult<Option<u64>> {
        Self::down()
    }
    fn get_multi(&self, _prefix: &str) -> CacheResult<HashMap<String, CacheValue>> {
        Self::down()
    }
    fn delete(&self, _key: &str) -> CacheResult<bool> {
        Self::down()
    }
    fn flush(&self) -> CacheResult<()> {
        Self::down()
    }
}

/// Store that reads normally but refuses every update
struct ReadOnlyStore {
    inner: MemoryEntityStore,
}

impl EntityStore for ReadOnlyStore {
    fn get(&self, key: &EntityKey) -> StoreResult<Option<Entity>> {
        self.inner.get(key)
    }
    fn put(&self, entity: Entity) -> StoreResult<()> {
        self.inner.put(entity)
    }
    fn insert_if_absent(&self, entity: Entity) -> StoreResult<bool> {
        self.inner.insert_if_absent(entity)
    }
    fn scan(&self, kind: &str, ancestor: Option<&EntityKey>) -> StoreResult<Vec<Entity>> {
        self.inner.scan(kind, ancestor)
    }
    fn update(&self, _key: &EntityKey, _mutate: &mut dyn FnMut(&mut Entity)) -> StoreResult<()> {
        Err(StoreError::Unavailable("read-only replica".into()))
    }
}

// =============================================================================
// Concurrency Tests
// =============================================================================

/// N concurrent first mentions of the same speaker count N.
#[test]
fn test_concurrent_bumps_are_not_lost() {
    let cache = Arc::new(MemoryCounterCache::new());
    let tally = SpeakerTallyStore::new(cache.clone());
    let conference = EntityKey::root("Conference", "1");
    let threads = 16;
    let bumps_per_thread = 250;

    std::thread::scope(|scope| {
        for _ in 0..threads {
            let tally = tally.clone();
            let conference = conference.clone();
            scope.spawn(move || {
                for _ in 0..bumps_per_thread {
                    tally.bump(&conference, &names(&["Ada", "Grace"])).unwrap();
                }
            });
        }
    });

    let snapshot = tally.snapshot(&conference).unwrap();
    let expected = (threads * bumps_per_thread) as u64;
    assert_eq!(snapshot.get("Ada"), Some(&expected));
    assert_eq!(snapshot.get("Grace"), Some(&expected));
}

/// Concurrent bumps on different conferences stay separate.
#[test]
fn test_concurrent_bumps_are_scoped_per_conference() {
    let tally = SpeakerTallyStore::new(Arc::new(MemoryCounterCache::new()));
    let first = EntityKey::root("Conference", "1");
    let second = EntityKey::root("Conference", "2");

    std::thread::scope(|scope| {
        for conference in [&first, &second, &first] {
            let tally = tally.clone();
            scope.spawn(move || {
                for _ in 0..100 {
                    tally.bump(conference, &names(&["Ada"])).unwrap();
                }
            });
        }
    });

    assert_eq!(tally.snapshot(&first).unwrap().get("Ada"), Some(&200));
    assert_eq!(tally.snapshot(&second).unwrap().get("Ada"), Some(&100));
}

// =============================================================================
// Resolver Tests
// =============================================================================

/// Several speakers sharing the top count are all featured.
#[test]
fn test_ties_are_kept_as_a_set() {
    let fx = setup();
    for roster in [&["Ada", "Grace"][..], &["Grace", "Linus"], &["Ada"]] {
        fx.resolver
            .record_session_speakers(&fx.conference, &names(roster))
            .unwrap();
    }

    let featured = fx.resolver.resolve(&fx.conference).unwrap();
    assert_eq!(featured.speakers, set(&["Ada", "Grace"]));
}

/// A conference nobody has spoken at has no featured speaker.
#[test]
fn test_empty_tally_yields_empty_result() {
    let fx = setup();

    let featured = fx.resolver.resolve(&fx.conference).unwrap();
    assert!(featured.is_empty());

    let stored = fx.store.get(&fx.conference).unwrap().unwrap();
    assert!(stored.get(FEATURED_SPEAKERS_ATTRIBUTE).is_none());
}

/// Empty rosters leave the tally untouched.
#[test]
fn test_empty_roster_is_ignored() {
    let fx = setup();
    fx.resolver
        .record_session_speakers(&fx.conference, &[])
        .unwrap();

    assert!(fx.cache.is_empty());
    assert_eq!(fx.metrics.snapshot().tally_bumps, 0);
}

/// Resolving twice without new sessions gives the same answer.
#[test]
fn test_resolve_is_idempotent() {
    let fx = setup();
    fx.resolver
        .record_session_speakers(&fx.conference, &names(&["Ada", "Ada", "Grace"]))
        .unwrap();
    fx.resolver
        .record_session_speakers(&fx.conference, &names(&["Grace"]))
        .unwrap();

    let first = fx.resolver.resolve(&fx.conference).unwrap();
    let second = fx.resolver.resolve(&fx.conference).unwrap();

    assert_eq!(first, second);
    assert_eq!(first.speakers, set(&["Ada", "Grace"]));
}

/// A name listed twice in one roster is counted twice.
#[test]
fn test_repeated_name_counts_per_listing() {
    let fx = setup();
    fx.resolver
        .record_session_speakers(&fx.conference, &names(&["Ada", "Ada"]))
        .unwrap();
    fx.resolver
        .record_session_speakers(&fx.conference, &names(&["Grace"]))
        .unwrap();

    let featured = fx.resolver.resolve(&fx.conference).unwrap();
    assert_eq!(featured.speakers, set(&["Ada"]));
}

/// The featured set is written onto the conference record.
#[test]
fn test_resolve_writes_featured_set_back() {
    let fx = setup();
    fx.resolver
        .record_session_speakers(&fx.conference, &names(&["Grace", "Ada"]))
        .unwrap();
    fx.resolver.resolve(&fx.conference).unwrap();

    let stored = fx.store.get(&fx.conference).unwrap().unwrap();
    assert_eq!(
        stored.get(FEATURED_SPEAKERS_ATTRIBUTE),
        Some(&json!(["Ada", "Grace"]))
    );
}

/// A lost write-back does not fail the resolve.
#[test]
fn test_missing_conference_write_back_is_best_effort() {
    let fx = setup();
    let orphan = EntityKey::root("Conference", "404");
    fx.resolver
        .record_session_speakers(&orphan, &names(&["Ada"]))
        .unwrap();

    let featured = fx.resolver.resolve(&orphan).unwrap();
    assert_eq!(featured.speakers, set(&["Ada"]));
    assert_eq!(fx.metrics.snapshot().writeback_failures, 1);
}

/// A flushed cache starts every tally from zero.
#[test]
fn test_flush_resets_tally() {
    let fx = setup();
    fx.resolver
        .record_session_speakers(&fx.conference, &names(&["Ada"]))
        .unwrap();
    fx.cache.flush().unwrap();

    assert!(fx.resolver.resolve(&fx.conference).unwrap().is_empty());
}

// =============================================================================
// Transport Failure Tests
// =============================================================================

/// A cache outage fails both the bump and the resolve.
#[test]
fn test_cache_outage_propagates() {
    let metrics = Arc::new(MetricsRegistry::new());
    let resolver = FeaturedSpeakerResolver::new(
        SpeakerTallyStore::new(Arc::new(DownCache)),
        Arc::new(MemoryEntityStore::new()),
        metrics.clone(),
    );
    let conference = EntityKey::root("Conference", "1");

    let err = resolver
        .record_session_speakers(&conference, &names(&["Ada"]))
        .unwrap_err();
    assert_eq!(err.status_code(), 503);

    let err = resolver.resolve(&conference).unwrap_err();
    assert_eq!(err.status_code(), 503);

    assert_eq!(metrics.snapshot().tally_bumps, 0);
}

/// An empty roster never reaches the cache, so an outage does not matter.
#[test]
fn test_empty_roster_skips_unavailable_cache() {
    let resolver = FeaturedSpeakerResolver::new(
        SpeakerTallyStore::new(Arc::new(DownCache)),
        Arc::new(MemoryEntityStore::new()),
        Arc::new(MetricsRegistry::new()),
    );

    assert!(resolver
        .record_session_speakers(&EntityKey::root("Conference", "1"), &[])
        .is_ok());
}

/// A refused write-back still returns the computed set.
#[test]
fn test_refused_write_back_still_resolves() {
    let store = Arc::new(ReadOnlyStore {
        inner: MemoryEntityStore::new(),
    });
    let conference = EntityKey::root("Conference", "1");
    let mut entity = Entity::new(conference.clone());
    entity.set("name", json!("RustConf"));
    store.put(entity).unwrap();

    let metrics = Arc::new(MetricsRegistry::new());
    let resolver = FeaturedSpeakerResolver::new(
        SpeakerTallyStore::new(Arc::new(MemoryCounterCache::new())),
        store.clone(),
        metrics.clone(),
    );
    resolver
        .record_session_speakers(&conference, &names(&["Ada", "Grace", "Ada"]))
        .unwrap();

    let featured = resolver.resolve(&conference).unwrap();
    assert_eq!(featured.speakers, set(&["Ada"]));
    assert_eq!(metrics.snapshot().writeback_failures, 1);

    let stored = store.get(&conference).unwrap().unwrap();
    assert!(stored.get(FEATURED_SPEAKERS_ATTRIBUTE).is_none());
}
