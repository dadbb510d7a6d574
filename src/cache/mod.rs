// Cache layer - shared key-value store access behind trait seams so the
// write path can run against in-memory implementations in tests.
pub mod counter;
pub mod queue;

pub use counter::{InMemoryWindowCounter, RedisWindowCounter, WindowCounter};
pub use queue::{EventQueue, InMemoryEventQueue, QueueEnvelope, RedisEventQueue};
