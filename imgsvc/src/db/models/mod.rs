//! Database record models matching table schemas.
//!
//! Models here mirror table rows and are kept apart from the API models in
//! [`crate::api::models`], so the stored representation can evolve independently of
//! the wire format.
//!
//! - [`images`]: processed-image records (stored object name, task results, upload time)

pub mod images;
