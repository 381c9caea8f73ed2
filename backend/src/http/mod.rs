//! HTTP server exposing the dashboard aggregates as a JSON API.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  HTTP Layer (axum handlers)                               │
//! │  - Filter / period parsing and validation                 │
//! │  - CORS, compression, tracing, error mapping              │
//! └───────────────────┬──────────────────────────────────────┘
//!                     │ Arc<DashboardSnapshot>
//! ┌───────────────────▼──────────────────────────────────────┐
//! │  Aggregation services (services/)                         │
//! └───────────────────┬──────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼──────────────────────────────────────┐
//! │  Dataset source (datasource/)                             │
//! │  - LocalRepository / MemoryRepository / HttpRepository    │
//! └──────────────────────────────────────────────────────────┘
//! ```

pub mod dto;
pub mod error;
pub mod handlers;
pub mod router;
pub mod state;

#[cfg(test)]
mod router_tests;

pub use error::{ApiError, AppError};
pub use router::create_router;
pub use state::AppState;
