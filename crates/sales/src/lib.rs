//! Shop orders: carts, pricing and order submission.
//!
//! Pure domain logic (no IO, no HTTP, no storage). Prices always come from the
//! catalog passed in, never from values cached on cart lines.

pub mod cart;
pub mod order;
pub mod pricing;

pub use cart::{Cart, CartLine, Quote};
pub use order::{submit_order, Order, OrderId, OrderRequest, OrderSettings};
pub use pricing::{
    price, resolve_unit_price, validate_quantity, Catalog, DeliveryPolicy, OfferCatalog,
    OrderTotals, PriceList, PricedLine, VariantOffer,
};
