pub mod api;
pub mod internal;

pub use internal::{CacheError, DatabaseError, IngestError, ValidationFailure};
