//! Record repository implementations.
//!
//! Every repository implements [`ImageRepository`], which is what the upload pipeline
//! depends on. The concrete backend is picked from `database.type` at startup.
//!
//! - [`PostgresImageRepository`]: `images` table in PostgreSQL, used in production
//! - [`InMemoryImageRepository`]: process-local storage for development and tests

pub mod images;
pub mod in_memory;
pub mod repository;

pub use images::PostgresImageRepository;
pub use in_memory::InMemoryImageRepository;
pub use repository::ImageRepository;
