//! Featured speaker resolution.
//!
//! The featured set for a conference is every speaker whose tally equals the
//! maximum tally. Ties are all featured. An empty tally means "no featured
//! speaker yet", never an error.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::observability::MetricsRegistry;
use crate::query::EntityKind;
use crate::store::{EntityKey, EntityStore};

use super::errors::FeaturedResult;
use super::tally::SpeakerTallyStore;

/// Attribute on the conference entity holding the last resolved set
pub const FEATURED_SPEAKERS_ATTRIBUTE: &str = "featured_speakers";

/// Result of one resolution; recomputed per call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeaturedSpeakers {
    pub conference: EntityKey,
    pub speakers: BTreeSet<String>,
}

impl FeaturedSpeakers {
    pub fn is_empty(&self) -> bool {
        self.speakers.is_empty()
    }
}

/// Outcome of a full cache refresh
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RefreshSummary {
    /// Sessions whose rosters were replayed into the tally
    pub sessions: usize,
    /// Conferences resolved after the replay
    pub conferences: usize,
}

/// Maintains speaker tallies and derives featured sets from them
pub struct FeaturedSpeakerResolver {
    tally: SpeakerTallyStore,
    store: Arc<dyn EntityStore>,
    metrics: Arc<MetricsRegistry>,
}

impl FeaturedSpeakerResolver {
    pub fn new(
        tally: SpeakerTallyStore,
        store: Arc<dyn EntityStore>,
        metrics: Arc<MetricsRegistry>,
    ) -> Self {
        Self {
            tally,
            store,
            metrics,
        }
    }

    /// Records one session's roster. Empty rosters are ignored.
    pub fn record_session_speakers(
        &self,
        conference: &EntityKey,
        speakers: &[String],
    ) -> FeaturedResult<()> {
        if speakers.is_empty() {
            return Ok(());
        }
        self.tally.bump(conference, speakers)?;
        self.metrics.increment_tally_bumps();
        Ok(())
    }

    /// Computes the featured set and writes it back onto the conference.
    ///
    /// The write-back is best-effort: a failure is logged and the computed
    /// result is still returned.
    pub fn resolve(&self, conference: &EntityKey) -> FeaturedResult<FeaturedSpeakers> {
        let snapshot = self.tally.snapshot(conference)?;
        self.metrics.increment_featured_resolves();

        let speakers: BTreeSet<String> = match snapshot.values().max() {
            Some(&max) => snapshot
                .into_iter()
                .filter(|(_, count)| *count == max)
                .map(|(speaker, _)| speaker)
                .collect(),
            None => BTreeSet::new(),
        };

        let result = FeaturedSpeakers {
            conference: conference.clone(),
            speakers,
        };

        if result.is_empty() {
            debug!(conference = %conference, "no featured speaker yet");
        } else {
            self.write_back(&result);
        }

        Ok(result)
    }

    fn write_back(&self, result: &FeaturedSpeakers) {
        let value = Value::from(result.speakers.iter().cloned().collect::<Vec<_>>());
        let outcome = self.store.update(&result.conference, &mut |entity| {
            entity.set(FEATURED_SPEAKERS_ATTRIBUTE, value.clone());
        });

        if let Err(e) = outcome {
            self.metrics.increment_writeback_failures();
            warn!(
                conference = %result.conference,
                error = %e,
                "featured speaker write-back failed"
            );
        }
    }

    /// Rebuilds every tally from the stored sessions.
    ///
    /// Resets the cache, replays each session roster, then resolves every
    /// conference so the write-through attribute is current.
    pub fn refresh_all(&self) -> FeaturedResult<RefreshSummary> {
        self.tally.reset()?;

        let sessions = self.store.scan_projection(
            EntityKind::Session.kind_name(),
            None,
            &["speakers"],
        )?;

        let mut summary = RefreshSummary::default();
        for session in &sessions {
            let Some(conference) = session.key.parent() else {
                continue;
            };
            let speakers = session
                .get("speakers")
                .and_then(Value::as_array)
                .map(|items| {
                    items
                        .iter()
                        .filter_map(Value::as_str)
                        .map(str::to_string)
                        .collect::<Vec<_>>()
                })
                .unwrap_or_default();

            self.record_session_speakers(conference, &speakers)?;
            summary.sessions += 1;
        }

        for conference in self.store.scan(EntityKind::Conference.kind_name(), None)? {
            self.resolve(&conference.key)?;
            summary.conferences += 1;
        }

        info!(
            sessions = summary.sessions,
            conferences = summary.conferences,
            "featured speaker cache refreshed"
        );
        Ok(summary)
    }
}
