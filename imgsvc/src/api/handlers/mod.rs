//! HTTP request handlers for the API endpoints.
//!
//! Handlers extract request data, call into the [`crate::pipeline::ImagePipeline`] held in
//! [`crate::AppState`], and return JSON (or raw bytes) responses. Errors are returned as
//! [`crate::errors::Error`] and mapped to status codes by its `IntoResponse` implementation.

pub mod images;
