//! Infrastructure layer: storage, command dispatch, configuration.

pub mod command_dispatcher;
pub mod config;
pub mod event_store;
pub mod product_catalog;
pub mod repository;

pub use command_dispatcher::{CommandDispatcher, DispatchError};
pub use config::{AppConfig, ConfigError};
pub use event_store::{EventStore, EventStoreError, InMemoryEventStore};
pub use product_catalog::ProductCatalog;
pub use repository::{InMemoryRepository, Repository, RepositoryError};
