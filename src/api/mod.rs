//! HTTP API layer.
//!
//! Exposes the medication-reminder core as JSON endpoints under `/api/`.
//! The router is composable — `api_router()` returns a `Router` that can be
//! mounted on any axum server instance; `server::serve` is the standalone
//! lifecycle used by the binary.

pub mod endpoints;
pub mod error;
pub mod router;
pub mod server;
pub mod types;

pub use router::api_router;
pub use server::serve;
pub use types::ApiContext;
