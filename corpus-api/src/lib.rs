//! Corpus API - Synthetic Corpus Generation Coordinator
//!
//! Ties the scheduler, generator, codec, validator, and storage crates
//! together behind one axum HTTP surface: `GET /health`, `GET
//! /dashboard`, `GET|POST /next-instruction`, and `POST /submit-case`.
//! All mutating state lives in one `CoordinatorState` guarded by a
//! single `tokio::sync::Mutex` so bucket selection, target generation,
//! and log append happen as one exclusive section per request.

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

pub use config::Cli;
pub use error::{ApiError, ErrorCode};
pub use routes::router;
pub use state::{AppState, CoordinatorError, CoordinatorState};
