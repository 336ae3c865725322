//! Speaker tally over the counter cache.
//!
//! One counter per `(conference, speaker)`, keyed
//! `tally:<websafe conference key>:<speaker>`. Web-safe keys never contain
//! `:`, so a conference prefix cannot match another conference's entries.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::debug;

use crate::store::{CacheResult, CacheValue, CounterCache, EntityKey};

const TALLY_PREFIX: &str = "tally";

/// Per-conference speaker counters
#[derive(Clone)]
pub struct SpeakerTallyStore {
    cache: Arc<dyn CounterCache>,
}

impl SpeakerTallyStore {
    pub fn new(cache: Arc<dyn CounterCache>) -> Self {
        Self { cache }
    }

    fn conference_prefix(conference: &EntityKey) -> String {
        format!("{}:{}:", TALLY_PREFIX, conference.to_websafe())
    }

    /// Adds one mention for every name listed in `speakers`.
    ///
    /// A name listed twice counts twice, and so does a repeated delivery; an
    /// increment is never lost.
    pub fn bump(&self, conference: &EntityKey, speakers: &[String]) -> CacheResult<()> {
        let prefix = Self::conference_prefix(conference);

        for speaker in speakers {
            let key = format!("{}{}", prefix, speaker);
            let count = self.increment_or_init(&key)?;
            debug!(conference = %conference, speaker = %speaker, count, "tally bumped");
        }
        Ok(())
    }

    fn increment_or_init(&self, key: &str) -> CacheResult<u64> {
        loop {
            if let Some(count) = self.cache.incr(key, 1)? {
                return Ok(count);
            }
            if self.cache.add(key, CacheValue::Counter(1))? {
                return Ok(1);
            }
            // Another caller initialised the key between our incr and add
        }
    }

    /// Current counts for one conference; empty if nothing was recorded
    pub fn snapshot(&self, conference: &EntityKey) -> CacheResult<BTreeMap<String, u64>> {
        let entries = self.cache.get_multi(&Self::conference_prefix(conference))?;
        Ok(entries
            .into_iter()
            .filter_map(|(speaker, value)| value.as_counter().map(|n| (speaker, n)))
            .collect())
    }

    /// Clears the whole cache
    pub fn reset(&self) -> CacheResult<()> {
        self.cache.flush()
    }
}
