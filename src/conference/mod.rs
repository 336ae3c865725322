//! # Conference
//!
//! Conference, session and profile records and the service operations over
//! them.

mod errors;
mod models;
mod service;
mod tasks;

pub use errors::{ServiceError, ServiceResult};
pub use models::{
    AnnouncementResponse, Conference, ConferenceForm, ConferenceResponse,
    FeaturedSpeakerResponse, Profile, ProfileForm, ProfileResponse, QueryForm, Session,
    SessionForm, SessionResponse, TeeShirtSize, NO_FEATURED_SPEAKER, PROFILE_KIND,
};
pub use service::{ConferenceService, EVENING_START_HOUR, WORKSHOP};
pub use tasks::ConferenceTaskHandler;
