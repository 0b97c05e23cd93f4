//! Persistence interfaces and the in-memory backend.

pub mod memory;
pub mod traits;

pub use memory::MemoryStore;
pub use traits::{Message, MessageRole, ProgressSnapshot, Storage, WeightRecord};
