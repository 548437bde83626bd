//! # pdfpress-api
//!
//! HTTP API layer for PdfPress built on Axum.
//!
//! Provides the job intake, status, and download endpoints, the health
//! probe, middleware (CORS, request logging), DTOs, and error mapping.

pub mod app;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{build_app, run_server};
pub use state::AppState;
