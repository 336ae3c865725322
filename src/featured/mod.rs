//! Featured speakers and announcements
//!
//! Both consumers share the counter cache:
//!
//! - `SpeakerTallyStore` counts speaker mentions per conference
//! - `FeaturedSpeakerResolver` derives the featured set (ties included) and
//!   writes it back onto the conference, best-effort
//! - `AnnouncementAggregator` caches the near-sold-out announcement

mod announcement;
mod errors;
mod resolver;
mod tally;

pub use announcement::{AnnouncementAggregator, ANNOUNCEMENT_KEY, NEARLY_SOLD_OUT_SEATS};
pub use errors::{FeaturedError, FeaturedResult};
pub use resolver::{
    FeaturedSpeakerResolver, FeaturedSpeakers, RefreshSummary, FEATURED_SPEAKERS_ATTRIBUTE,
};
pub use tally::SpeakerTallyStore;
