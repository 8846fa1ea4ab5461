//! Entity storage boundary for the non-event-sourced records (directory
//! entries, submitted orders).

pub mod in_memory;
pub mod r#trait;

pub use in_memory::InMemoryRepository;
pub use r#trait::{Repository, RepositoryError};
