//! Maps domain `AppError` to HTTP responses.
//!
//! The `IntoResponse` impl for `AppError` lives in `pdfpress_core::error`
//! next to the type (trait coherence forbids implementing it here); this
//! module re-exports the response body shape it produces.

pub use pdfpress_core::error::ApiErrorResponse;
