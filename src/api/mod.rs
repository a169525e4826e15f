//! HTTP surface for the recommendation engine.
//!
//! Routes are nested under `/api/`. The router is composable:
//! `recommend_router()` returns a `Router` that can be mounted on any
//! axum server instance.

pub mod endpoints;
pub mod error;
pub mod router;
pub mod server;
pub mod types;

pub use router::recommend_router;
pub use server::{start_server_on, RecommendServer, ServerSession};
pub use types::ApiContext;
