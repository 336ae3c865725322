//! Conference HTTP Routes
//!
//! Conference, session, profile, featured speaker and announcement endpoints,
//! plus the cron entry points.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};

use serde::Deserialize;

use crate::conference::{
    AnnouncementResponse, ConferenceForm, ConferenceResponse, ConferenceService,
    FeaturedSpeakerResponse, ProfileForm, ProfileResponse, QueryForm, SessionForm,
    SessionResponse,
};

use super::errors::ApiResult;

/// Shared state of the conference routes
pub struct AppState {
    pub service: Arc<ConferenceService>,
}

impl AppState {
    pub fn new(service: Arc<ConferenceService>) -> Self {
        Self { service }
    }
}

// ==================
// Conference Routes
// ==================

/// Create conference routes
pub fn conference_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/conference", post(create_conference_handler))
        .route(
            "/conference/:key",
            get(get_conference_handler).put(update_conference_handler),
        )
        .route(
            "/conference/:key/sessions",
            get(conference_sessions_handler).post(create_session_handler),
        )
        .route(
            "/conference/:key/sessions/type/:type_of_session",
            get(sessions_by_type_handler),
        )
        .route(
            "/conference/:key/sessions/speaker/:speaker",
            get(sessions_by_speaker_handler),
        )
        .route("/conference/:key/featuredspeaker", get(featured_speaker_handler))
        .route("/getConferencesCreated", get(conferences_created_handler))
        .route("/queryConferences", post(query_conferences_handler))
        .route("/querySessions", post(query_sessions_handler))
        .route("/querySessionsSpecial", get(query_sessions_special_handler))
        .route(
            "/profile/:user_id",
            get(get_profile_handler).post(save_profile_handler),
        )
        .route("/profile/:user_id/wishlist", get(wishlist_handler))
        .route(
            "/profile/:user_id/wishlist/:session_key",
            post(add_to_wishlist_handler),
        )
        .route(
            "/announcement",
            get(announcement_handler).post(refresh_announcement_handler),
        )
        .with_state(state)
}

/// Cron entry points, answered with 204 once the work is done
pub fn cron_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/set_announcement", get(cron_announcement_handler))
        .route(
            "/refresh_featured_speaker_cache",
            get(cron_featured_refresh_handler),
        )
        .with_state(state)
}

// ==================
// Conference Handlers
// ==================

async fn create_conference_handler(
    State(state): State<Arc<AppState>>,
    Json(form): Json<ConferenceForm>,
) -> ApiResult<(StatusCode, Json<ConferenceResponse>)> {
    let conference = state.service.create_conference(form)?;
    Ok((StatusCode::CREATED, Json(conference)))
}

async fn get_conference_handler(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> ApiResult<Json<ConferenceResponse>> {
    Ok(Json(state.service.get_conference(&key)?))
}

async fn update_conference_handler(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
    Json(form): Json<ConferenceForm>,
) -> ApiResult<Json<ConferenceResponse>> {
    Ok(Json(state.service.update_conference(&key, form)?))
}

#[derive(Debug, Deserialize)]
struct OrganizerParams {
    #[serde(default)]
    organizer_email: String,
}

async fn conferences_created_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<OrganizerParams>,
) -> ApiResult<Json<Vec<ConferenceResponse>>> {
    Ok(Json(state.service.conferences_created(&params.organizer_email)?))
}

async fn query_conferences_handler(
    State(state): State<Arc<AppState>>,
    Json(form): Json<QueryForm>,
) -> ApiResult<Json<Vec<ConferenceResponse>>> {
    Ok(Json(state.service.query_conferences(&form.filters)?))
}

// ==================
// Session Handlers
// ==================

async fn create_session_handler(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
    Json(form): Json<SessionForm>,
) -> ApiResult<(StatusCode, Json<SessionResponse>)> {
    let session = state.service.create_session(&key, form)?;
    Ok((StatusCode::CREATED, Json(session)))
}

async fn conference_sessions_handler(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> ApiResult<Json<Vec<SessionResponse>>> {
    Ok(Json(state.service.conference_sessions(&key)?))
}

async fn sessions_by_type_handler(
    State(state): State<Arc<AppState>>,
    Path((key, type_of_session)): Path<(String, String)>,
) -> ApiResult<Json<Vec<SessionResponse>>> {
    Ok(Json(state.service.sessions_by_type(&key, &type_of_session)?))
}

async fn sessions_by_speaker_handler(
    State(state): State<Arc<AppState>>,
    Path((key, speaker)): Path<(String, String)>,
) -> ApiResult<Json<Vec<SessionResponse>>> {
    Ok(Json(state.service.sessions_by_speaker(&key, &speaker)?))
}

async fn query_sessions_handler(
    State(state): State<Arc<AppState>>,
    Json(form): Json<QueryForm>,
) -> ApiResult<Json<Vec<SessionResponse>>> {
    Ok(Json(state.service.query_sessions(&form.filters)?))
}

async fn query_sessions_special_handler(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<SessionResponse>>> {
    Ok(Json(state.service.query_sessions_special()?))
}

// ==================
// Profile Handlers
// ==================

#[derive(Debug, Deserialize)]
struct ProfileParams {
    main_email: Option<String>,
}

async fn get_profile_handler(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    Query(params): Query<ProfileParams>,
) -> ApiResult<Json<ProfileResponse>> {
    Ok(Json(state.service.get_profile(&user_id, params.main_email)?))
}

async fn save_profile_handler(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    Json(form): Json<ProfileForm>,
) -> ApiResult<Json<ProfileResponse>> {
    Ok(Json(state.service.save_profile(&user_id, form)?))
}

async fn add_to_wishlist_handler(
    State(state): State<Arc<AppState>>,
    Path((user_id, session_key)): Path<(String, String)>,
) -> ApiResult<Json<ProfileResponse>> {
    Ok(Json(state.service.add_session_to_wishlist(&user_id, &session_key)?))
}

async fn wishlist_handler(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<Vec<SessionResponse>>> {
    Ok(Json(state.service.sessions_in_wishlist(&user_id)?))
}

// ==================
// Featured Speaker & Announcement Handlers
// ==================

async fn featured_speaker_handler(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> ApiResult<Json<FeaturedSpeakerResponse>> {
    Ok(Json(state.service.featured_speaker(&key)?))
}

async fn announcement_handler(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<AnnouncementResponse>> {
    let data = state.service.announcement()?;
    Ok(Json(AnnouncementResponse { data }))
}

async fn refresh_announcement_handler(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<AnnouncementResponse>> {
    let data = state.service.refresh_announcement()?;
    Ok(Json(AnnouncementResponse { data }))
}

// ==================
// Cron Handlers
// ==================

async fn cron_announcement_handler(State(state): State<Arc<AppState>>) -> ApiResult<StatusCode> {
    state.service.refresh_announcement()?;
    Ok(StatusCode::NO_CONTENT)
}

async fn cron_featured_refresh_handler(
    State(state): State<Arc<AppState>>,
) -> ApiResult<StatusCode> {
    let summary = state.service.refresh_featured_speakers()?;
    tracing::info!(
        sessions = summary.sessions,
        conferences = summary.conferences,
        "featured speaker cache rebuilt"
    );
    Ok(StatusCode::NO_CONTENT)
}
