//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects have no identity: two instances with the same attribute values
/// are interchangeable. `Money`, `OptionAxis` and `DeliveryPolicy` are value
/// objects; `Product` and `User` are entities.
///
/// ```ignore
/// #[derive(Debug, Clone, PartialEq, Eq)]
/// struct DeliveryPolicy { flat_fee: Money, free_threshold: Money }
///
/// impl ValueObject for DeliveryPolicy {}
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
