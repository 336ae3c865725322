//! Conference service
//!
//! Composes the entity store, the query builder and executor, the featured
//! speaker resolver, the announcement aggregator and the task dispatcher.
//! Every client query goes through `QueryBuilder`, so invalid filters are
//! rejected before the store is touched.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info};

use crate::executor::QueryExecutor;
use crate::featured::{
    AnnouncementAggregator, FeaturedSpeakerResolver, RefreshSummary, SpeakerTallyStore,
};
use crate::observability::MetricsRegistry;
use crate::query::{
    EntityKind, FilterClause, OperatorKind, QueryBuilder, QueryPlan, QueryResult, RawFilter,
};
use crate::store::{CounterCache, Entity, EntityKey, EntityStore};
use crate::tasks::{
    Task, TaskDispatcher, SEND_CONFERENCE_CONFIRMATION_EMAIL, SEND_SESSION_CONFIRMATION_EMAIL,
    SET_FEATURED_SPEAKER,
};

use super::errors::{ServiceError, ServiceResult};
use super::models::{
    Conference, ConferenceForm, ConferenceResponse, FeaturedSpeakerResponse, Profile,
    ProfileForm, ProfileResponse, Session, SessionForm, SessionResponse, NO_FEATURED_SPEAKER,
    PROFILE_KIND,
};

/// Evening sessions start at or after this hour
pub const EVENING_START_HOUR: i64 = 18;
/// Session type excluded from the evening listing
pub const WORKSHOP: &str = "Workshop";

pub struct ConferenceService {
    store: Arc<dyn EntityStore>,
    resolver: FeaturedSpeakerResolver,
    announcements: AnnouncementAggregator,
    dispatcher: Arc<dyn TaskDispatcher>,
    metrics: Arc<MetricsRegistry>,
}

impl ConferenceService {
    pub fn new(
        store: Arc<dyn EntityStore>,
        cache: Arc<dyn CounterCache>,
        dispatcher: Arc<dyn TaskDispatcher>,
        metrics: Arc<MetricsRegistry>,
    ) -> Self {
        let resolver = FeaturedSpeakerResolver::new(
            SpeakerTallyStore::new(cache.clone()),
            store.clone(),
            metrics.clone(),
        );
        let announcements = AnnouncementAggregator::new(cache, store.clone(), metrics.clone());

        Self {
            store,
            resolver,
            announcements,
            dispatcher,
            metrics,
        }
    }

    pub fn metrics(&self) -> &MetricsRegistry {
        &self.metrics
    }

    // Conferences

    pub fn create_conference(&self, form: ConferenceForm) -> ServiceResult<ConferenceResponse> {
        let conference = Conference::from_form(form)?;
        let key = self.store.allocate_key(EntityKind::Conference.kind_name(), None);
        self.store.put(Entity::from_record(key.clone(), &conference)?)?;
        info!(conference = %key, name = %conference.name, "conference created");

        if let Some(email) = &conference.organizer_email {
            self.dispatcher.dispatch(
                Task::new(SEND_CONFERENCE_CONFIRMATION_EMAIL)
                    .with_param("email", email.clone())
                    .with_param("info", conference.name.clone()),
            )?;
        }

        Ok(ConferenceResponse {
            websafe_key: key.to_websafe(),
            conference,
        })
    }

    pub fn get_conference(&self, websafe_key: &str) -> ServiceResult<ConferenceResponse> {
        let (key, conference) = self.load_conference(websafe_key)?;
        Ok(ConferenceResponse {
            websafe_key: key.to_websafe(),
            conference,
        })
    }

    /// Applies the non-empty fields of `form` to an existing conference
    pub fn update_conference(
        &self,
        websafe_key: &str,
        form: ConferenceForm,
    ) -> ServiceResult<ConferenceResponse> {
        let (key, _) = self.load_conference(websafe_key)?;
        let changes = Conference::update_attributes(form)?;

        self.store.update(&key, &mut |entity| {
            for (attribute, value) in &changes {
                entity.set(attribute.clone(), value.clone());
            }
        })?;

        self.get_conference(websafe_key)
    }

    pub fn query_conferences(&self, filters: &[RawFilter]) -> ServiceResult<Vec<ConferenceResponse>> {
        let plan = self.checked_plan(QueryBuilder::new(EntityKind::Conference).build(filters))?;
        QueryExecutor::new(self.store.as_ref())
            .execute(&plan)?
            .iter()
            .map(conference_response)
            .collect()
    }

    /// Conferences whose organizer is `organizer_email`
    pub fn conferences_created(&self, organizer_email: &str) -> ServiceResult<Vec<ConferenceResponse>> {
        if organizer_email.trim().is_empty() {
            return Err(ServiceError::BadRequest("'organizer_email' is required".into()));
        }
        let plan = QueryPlan::new(EntityKind::Conference)
            .with_clause(FilterClause::text_eq("organizer_email", organizer_email))?;
        QueryExecutor::new(self.store.as_ref())
            .execute(&plan)?
            .iter()
            .map(conference_response)
            .collect()
    }

    // Sessions

    /// Stores a session under its conference and queues the follow-up work
    pub fn create_session(
        &self,
        websafe_conference_key: &str,
        form: SessionForm,
    ) -> ServiceResult<SessionResponse> {
        let (conference_key, conference) = self.load_conference(websafe_conference_key)?;
        let session = Session::from_form(form)?;

        let key = self
            .store
            .allocate_key(EntityKind::Session.kind_name(), Some(&conference_key));
        self.store.put(Entity::from_record(key.clone(), &session)?)?;
        info!(session = %key, name = %session.name, "session created");

        if !session.speakers.is_empty() {
            let speakers = serde_json::to_string(&session.speakers)
                .map_err(|e| ServiceError::BadRequest(e.to_string()))?;
            self.dispatcher.dispatch(
                Task::new(SET_FEATURED_SPEAKER)
                    .with_param("conference", conference_key.to_websafe())
                    .with_param("speakers", speakers),
            )?;
        }

        if let Some(email) = &conference.organizer_email {
            self.dispatcher.dispatch(
                Task::new(SEND_SESSION_CONFIRMATION_EMAIL)
                    .with_param("email", email.clone())
                    .with_param("info", session.name.clone()),
            )?;
        }

        Ok(SessionResponse {
            websafe_key: key.to_websafe(),
            websafe_conference_key: conference_key.to_websafe(),
            session,
        })
    }

    pub fn conference_sessions(&self, websafe_conference_key: &str) -> ServiceResult<Vec<SessionResponse>> {
        let (key, _) = self.load_conference(websafe_conference_key)?;
        self.run_session_plan(&QueryPlan::new(EntityKind::Session).with_ancestor(key))
    }

    pub fn sessions_by_type(
        &self,
        websafe_conference_key: &str,
        type_of_session: &str,
    ) -> ServiceResult<Vec<SessionResponse>> {
        let (key, _) = self.load_conference(websafe_conference_key)?;
        let plan = QueryPlan::new(EntityKind::Session)
            .with_ancestor(key)
            .with_clause(FilterClause::text_eq("type_of_session", type_of_session))?;
        self.run_session_plan(&plan)
    }

    pub fn sessions_by_speaker(
        &self,
        websafe_conference_key: &str,
        speaker: &str,
    ) -> ServiceResult<Vec<SessionResponse>> {
        let (key, _) = self.load_conference(websafe_conference_key)?;
        let plan = QueryPlan::new(EntityKind::Session)
            .with_ancestor(key)
            .with_clause(FilterClause::contains("speakers", speaker))?;
        self.run_session_plan(&plan)
    }

    pub fn query_sessions(&self, filters: &[RawFilter]) -> ServiceResult<Vec<SessionResponse>> {
        let plan = self.checked_plan(QueryBuilder::new(EntityKind::Session).build(filters))?;
        self.run_session_plan(&plan)
    }

    /// Evening sessions that are not workshops.
    ///
    /// `start_time` is the plan's inequality field, so the session type test
    /// runs on the results.
    pub fn query_sessions_special(&self) -> ServiceResult<Vec<SessionResponse>> {
        let plan = QueryPlan::new(EntityKind::Session).with_clause(FilterClause::integer(
            "start_time",
            OperatorKind::Gteq,
            EVENING_START_HOUR,
        ))?;

        Ok(self
            .run_session_plan(&plan)?
            .into_iter()
            .filter(|s| s.session.type_of_session != WORKSHOP)
            .collect())
    }

    // Profiles

    /// Returns the caller's profile, creating it on first visit
    pub fn get_profile(
        &self,
        user_id: &str,
        main_email: Option<String>,
    ) -> ServiceResult<ProfileResponse> {
        let key = profile_key(user_id)?;
        if let Some(entity) = self.store.get(&key)? {
            return profile_response(user_id, &entity);
        }

        let profile = Profile::new(user_id, main_email);
        if self
            .store
            .insert_if_absent(Entity::from_record(key.clone(), &profile)?)?
        {
            info!(profile = %key, "profile created");
            return Ok(ProfileResponse {
                user_id: user_id.to_string(),
                profile,
            });
        }

        // Lost a race with a concurrent first visit
        self.existing_profile(user_id, &key)
    }

    /// Applies the editable fields of `form` to the caller's profile
    pub fn save_profile(&self, user_id: &str, form: ProfileForm) -> ServiceResult<ProfileResponse> {
        let key = profile_key(user_id)?;
        self.get_profile(user_id, None)?;

        let changes = Profile::update_attributes(form);
        self.store.update(&key, &mut |entity| {
            for (attribute, value) in &changes {
                entity.set(attribute.clone(), value.clone());
            }
        })?;

        self.existing_profile(user_id, &key)
    }

    /// Adds a session to the caller's wishlist; adding it twice is a no-op
    pub fn add_session_to_wishlist(
        &self,
        user_id: &str,
        websafe_session_key: &str,
    ) -> ServiceResult<ProfileResponse> {
        let session_key = EntityKey::from_websafe(websafe_session_key)?;
        if session_key.kind != EntityKind::Session.kind_name() {
            return Err(ServiceError::BadRequest(format!(
                "Key is not a session: {}",
                websafe_session_key
            )));
        }
        if self.store.get(&session_key)?.is_none() {
            return Err(ServiceError::NotFound(format!(
                "No session found with key: {}",
                websafe_session_key
            )));
        }

        let key = profile_key(user_id)?;
        self.get_profile(user_id, None)?;

        let websafe = session_key.to_websafe();
        let mut added = false;
        self.store.update(&key, &mut |entity| {
            let mut wishlist: Vec<String> = entity
                .get("session_keys_wishlist")
                .and_then(|v| serde_json::from_value(v.clone()).ok())
                .unwrap_or_default();
            if !wishlist.contains(&websafe) {
                wishlist.push(websafe.clone());
                added = true;
            }
            entity.set("session_keys_wishlist", Value::from(wishlist));
        })?;
        debug!(profile = %key, session = %websafe, added, "wishlist updated");

        self.existing_profile(user_id, &key)
    }

    /// Sessions on the caller's wishlist, in the order they were added.
    ///
    /// Keys whose session no longer exists are skipped.
    pub fn sessions_in_wishlist(&self, user_id: &str) -> ServiceResult<Vec<SessionResponse>> {
        let wishlist = self.get_profile(user_id, None)?.profile.session_keys_wishlist;

        let mut sessions = Vec::with_capacity(wishlist.len());
        for websafe in &wishlist {
            let key = EntityKey::from_websafe(websafe)?;
            if let Some(entity) = self.store.get(&key)? {
                sessions.push(session_response(&entity)?);
            }
        }
        Ok(sessions)
    }

    // Featured speakers and announcements

    pub fn featured_speaker(&self, websafe_conference_key: &str) -> ServiceResult<FeaturedSpeakerResponse> {
        let (key, conference) = self.load_conference(websafe_conference_key)?;
        let featured = self.resolver.resolve(&key)?;

        let featured_speakers = if featured.is_empty() {
            vec![NO_FEATURED_SPEAKER.to_string()]
        } else {
            featured.speakers.into_iter().collect()
        };

        Ok(FeaturedSpeakerResponse {
            name: conference.name,
            featured_speakers,
        })
    }

    /// Records a roster and refreshes the conference's featured set
    pub fn record_session_speakers(
        &self,
        conference: &EntityKey,
        speakers: &[String],
    ) -> ServiceResult<()> {
        self.resolver.record_session_speakers(conference, speakers)?;
        let featured = self.resolver.resolve(conference)?;
        debug!(conference = %conference, featured = featured.speakers.len(), "featured speakers updated");
        Ok(())
    }

    /// Rebuilds the tally from every stored session.
    ///
    /// The reset clears the whole cache, so the announcement is recomputed
    /// afterwards.
    pub fn refresh_featured_speakers(&self) -> ServiceResult<RefreshSummary> {
        let summary = self.resolver.refresh_all()?;
        self.announcements.refresh()?;
        Ok(summary)
    }

    pub fn announcement(&self) -> ServiceResult<String> {
        Ok(self.announcements.current()?)
    }

    pub fn refresh_announcement(&self) -> ServiceResult<String> {
        Ok(self.announcements.refresh()?)
    }

    // Helpers

    fn load_conference(&self, websafe_key: &str) -> ServiceResult<(EntityKey, Conference)> {
        let key = EntityKey::from_websafe(websafe_key)?;
        if key.kind != EntityKind::Conference.kind_name() {
            return Err(not_found(websafe_key));
        }

        let entity = self
            .store
            .get(&key)?
            .ok_or_else(|| not_found(websafe_key))?;
        Ok((key, entity.to_record()?))
    }

    fn existing_profile(&self, user_id: &str, key: &EntityKey) -> ServiceResult<ProfileResponse> {
        let entity = self
            .store
            .get(key)?
            .ok_or_else(|| ServiceError::NotFound(format!("No profile found for user: {}", user_id)))?;
        profile_response(user_id, &entity)
    }

    fn checked_plan(&self, result: QueryResult<QueryPlan>) -> ServiceResult<QueryPlan> {
        match result {
            Ok(plan) => {
                self.metrics.increment_queries_planned();
                Ok(plan)
            }
            Err(e) => {
                self.metrics.increment_queries_rejected();
                debug!(error = %e, "query rejected");
                Err(e.into())
            }
        }
    }

    fn run_session_plan(&self, plan: &QueryPlan) -> ServiceResult<Vec<SessionResponse>> {
        QueryExecutor::new(self.store.as_ref())
            .execute(plan)?
            .iter()
            .map(session_response)
            .collect()
    }
}

fn not_found(websafe_key: &str) -> ServiceError {
    ServiceError::NotFound(format!("No conference found with key: {}", websafe_key))
}

fn profile_key(user_id: &str) -> ServiceResult<EntityKey> {
    if user_id.trim().is_empty() {
        return Err(ServiceError::BadRequest("A user id is required".into()));
    }
    Ok(EntityKey::root(PROFILE_KIND, user_id))
}

fn profile_response(user_id: &str, entity: &Entity) -> ServiceResult<ProfileResponse> {
    Ok(ProfileResponse {
        user_id: user_id.to_string(),
        profile: entity.to_record()?,
    })
}

fn conference_response(entity: &Entity) -> ServiceResult<ConferenceResponse> {
    Ok(ConferenceResponse {
        websafe_key: entity.key.to_websafe(),
        conference: entity.to_record()?,
    })
}

fn session_response(entity: &Entity) -> ServiceResult<SessionResponse> {
    let conference_key = entity
        .key
        .parent()
        .map(EntityKey::to_websafe)
        .unwrap_or_default();

    Ok(SessionResponse {
        websafe_key: entity.key.to_websafe(),
        websafe_conference_key: conference_key,
        session: entity.to_record()?,
    })
}

/// Speaker names carried by the `speakers` task parameter
pub fn parse_speakers(raw: &str) -> Option<Vec<String>> {
    match serde_json::from_str::<Value>(raw).ok()? {
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        _ => None,
    }
}
