//! Near-sold-out announcement, cached as a single text entry.

use std::sync::Arc;

use serde_json::Value;
use tracing::info;

use crate::executor::QueryExecutor;
use crate::observability::MetricsRegistry;
use crate::query::{EntityKind, FilterClause, OperatorKind, QueryPlan};
use crate::store::{CacheValue, CounterCache, EntityStore};

use super::errors::FeaturedResult;

/// Cache key of the current announcement
pub const ANNOUNCEMENT_KEY: &str = "RECENT_ANNOUNCEMENTS";

/// Conferences with this many seats or fewer (but at least one) are listed
pub const NEARLY_SOLD_OUT_SEATS: i64 = 5;

const ANNOUNCEMENT_LEAD: &str =
    "Last chance to attend! The following conferences are nearly sold out:";

/// Publishes the near-sold-out announcement into the cache
pub struct AnnouncementAggregator {
    cache: Arc<dyn CounterCache>,
    store: Arc<dyn EntityStore>,
    metrics: Arc<MetricsRegistry>,
}

impl AnnouncementAggregator {
    pub fn new(
        cache: Arc<dyn CounterCache>,
        store: Arc<dyn EntityStore>,
        metrics: Arc<MetricsRegistry>,
    ) -> Self {
        Self {
            cache,
            store,
            metrics,
        }
    }

    /// Recomputes the announcement, stores it and returns it.
    ///
    /// With no qualifying conference the cache entry is removed and the
    /// empty string is returned.
    pub fn refresh(&self) -> FeaturedResult<String> {
        let plan = QueryPlan::new(EntityKind::Conference)
            .with_clause(FilterClause::integer(
                "seats_available",
                OperatorKind::Lteq,
                NEARLY_SOLD_OUT_SEATS,
            ))?
            .with_clause(FilterClause::integer(
                "seats_available",
                OperatorKind::Gt,
                0,
            ))?;

        let result = QueryExecutor::new(self.store.as_ref()).execute_projection(&plan, &["name"])?;
        let names: Vec<&str> = result
            .iter()
            .filter_map(|conf| conf.get("name").and_then(Value::as_str))
            .collect();

        let announcement = if names.is_empty() {
            self.cache.delete(ANNOUNCEMENT_KEY)?;
            String::new()
        } else {
            let text = format!("{} {}", ANNOUNCEMENT_LEAD, names.join(", "));
            self.cache
                .set(ANNOUNCEMENT_KEY, CacheValue::Text(text.clone()))?;
            text
        };

        self.metrics.increment_announcements_refreshed();
        info!(conferences = names.len(), "announcement refreshed");
        Ok(announcement)
    }

    /// Current announcement; empty if none is cached
    pub fn current(&self) -> FeaturedResult<String> {
        Ok(self
            .cache
            .get(ANNOUNCEMENT_KEY)?
            .and_then(|value| value.as_text().map(str::to_string))
            .unwrap_or_default())
    }
}
