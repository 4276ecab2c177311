//! API Module
//!
//! HTTP handlers and routing for the aggregator REST API.
//!
//! # Endpoints
//! - `GET /api/topstories` - Page of the top stories feed
//! - `GET /api/stories/:feed` - Page of any feed (top, new, best, ask, show, job)
//! - `GET /api/item/:id` - Single item
//! - `GET /api/user/:name` - Single user profile
//! - `GET /stats` - Cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
