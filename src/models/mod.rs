//! Data model and DTOs for the aggregator
//!
//! Entities as delivered by the upstream service, plus the types used for
//! serializing/deserializing HTTP request and response bodies.

pub mod entity;
pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use entity::{Entity, ItemId};
pub use requests::{ListingQuery, PageRequest, DEFAULT_LIMIT, DEFAULT_PAGE, MAX_LIMIT};
pub use responses::{ErrorResponse, HealthResponse, ListingResponse, StatsResponse};
