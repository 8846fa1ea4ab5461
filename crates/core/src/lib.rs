//! `pledge-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! identifiers, the domain error model, money, list filters and the aggregate
//! contract.

pub mod aggregate;
pub mod entity;
pub mod error;
pub mod filter;
pub mod id;
pub mod money;
pub mod value_object;

pub use aggregate::{Aggregate, AggregateRoot, ExpectedVersion};
pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use filter::{contains_ci, Filter};
pub use id::{AggregateId, FilialeId, LivreurId, RegionId, ShopId, TruckId, UserId};
pub use money::Money;
pub use value_object::ValueObject;
