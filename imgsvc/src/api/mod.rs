//! API layer for HTTP request handling and data models.
//!
//! - **[`handlers`]**: Axum route handlers
//! - **[`models`]**: Request/response data structures
//!
//! # Routes
//!
//! - `POST /images`: multipart upload (field `file`)
//! - `GET /images?page=&count=`: upload history, newest first
//! - `GET /images/view/{name}`: raw stored image

pub mod handlers;
pub mod models;
