// Coordinators layer - orchestration of the write path
pub mod batch_coordinator;
pub mod ingest_coordinator;

pub use batch_coordinator::BatchCoordinator;
pub use ingest_coordinator::{IngestCoordinator, IngestOutcome};
