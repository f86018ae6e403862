//! API request and response data models.
//!
//! These models define the public API contract and are kept distinct from the database
//! models in [`crate::db::models`]. All of them are annotated with `utoipa` for the
//! generated OpenAPI document.

pub mod images;
pub mod pagination;
