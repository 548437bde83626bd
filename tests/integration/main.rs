//! Integration test suite for the PdfPress HTTP API.

mod helpers;

mod health_test;
mod jobs_test;
mod lifecycle_test;
