//! Persistence layer for processed-image records.
//!
//! ```text
//! ┌─────────────┐
//! │  Pipeline   │  (crate::pipeline - upload orchestration)
//! └──────┬──────┘
//!        │
//!        ↓
//! ┌─────────────┐
//! │ Repositories│  (db::handlers - ImageRepository implementations)
//! └──────┬──────┘
//!        │
//!        ↓
//! ┌─────────────┐
//! │   Models    │  (db::models - database records)
//! └──────┬──────┘
//!        │
//!        ↓
//! ┌─────────────────────────┐
//! │ PostgreSQL / in-memory  │
//! └─────────────────────────┘
//! ```
//!
//! # Migrations
//!
//! Migrations live in the `migrations/` directory and are applied on startup when the
//! PostgreSQL backend is configured:
//!
//! ```ignore
//! imgsvc::migrator().run(&pool).await?;
//! ```

pub mod errors;
pub mod handlers;
pub mod models;
