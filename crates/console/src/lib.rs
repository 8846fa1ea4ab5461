//! Pledge console application layer.
//!
//! Wires the directory, the delivery fleet, the product catalog with
//! distributor offers, pricing and order submission behind
//! permission-checked operations.

pub mod demo;
pub mod error;
pub mod service;

pub use error::{ServiceError, ServiceResult};
pub use service::{ConsoleService, Repositories, VariantEdit};
