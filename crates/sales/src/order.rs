use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use pledge_core::{AggregateId, DomainError, DomainResult, Entity, FilialeId, Money, UserId};

use crate::cart::Cart;
use crate::pricing::{Catalog, DeliveryPolicy, PricedLine};

/// Submitted order identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(pub AggregateId);

impl OrderId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for OrderId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Distributor-level order rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderSettings {
    pub min_qty_per_order: u32,
    pub max_qty_per_order: u32,
    pub min_order_price: Money,
    pub delivery: DeliveryPolicy,
}

impl Default for OrderSettings {
    fn default() -> Self {
        Self {
            min_qty_per_order: 5,
            max_qty_per_order: 1000,
            min_order_price: Money::from_major(100),
            delivery: DeliveryPolicy {
                flat_fee: Money::from_major(25),
                free_threshold: Money::from_major(500),
            },
        }
    }
}

impl OrderSettings {
    pub fn validate(&self) -> DomainResult<()> {
        if self.min_qty_per_order < 1 {
            return Err(DomainError::validation(
                "min_qty_per_order",
                "minimum quantity per order must be at least 1",
            ));
        }
        if self.max_qty_per_order < self.min_qty_per_order {
            return Err(DomainError::validation(
                "max_qty_per_order",
                "maximum quantity per order cannot be below the minimum",
            ));
        }
        Ok(())
    }
}

/// Everything a shop submits, before validation.
#[derive(Debug, Clone)]
pub struct OrderRequest<'a> {
    pub order_id: OrderId,
    pub placed_by: UserId,
    pub filiale_id: FilialeId,
    pub cart: &'a Cart,
    pub delivery_date: Option<NaiveDate>,
    pub notes: String,
    pub submitted_at: DateTime<Utc>,
}

/// A submitted order. Prices and totals are frozen at submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub placed_by: UserId,
    pub filiale_id: FilialeId,
    pub lines: Vec<PricedLine>,
    pub delivery_date: NaiveDate,
    pub notes: String,
    pub subtotal: Money,
    pub delivery_fee: Money,
    pub total: Money,
    pub submitted_at: DateTime<Utc>,
}

impl Entity for Order {
    type Id = OrderId;

    fn id(&self) -> Self::Id {
        self.id
    }
}

/// Validate a shop's cart against the catalog and distributor settings and
/// produce the final order with freshly computed totals.
pub fn submit_order<C: Catalog + ?Sized>(
    request: OrderRequest<'_>,
    catalog: &C,
    settings: &OrderSettings,
) -> DomainResult<Order> {
    if request.cart.is_empty() {
        return Err(DomainError::validation(
            "lines",
            "order must contain at least one item",
        ));
    }

    let delivery_date = request
        .delivery_date
        .ok_or_else(|| DomainError::validation("delivery_date", "delivery date is required"))?;
    if delivery_date < request.submitted_at.date_naive() {
        return Err(DomainError::validation(
            "delivery_date",
            "delivery date cannot be in the past",
        ));
    }

    let quote = request.cart.quote(catalog, &settings.delivery)?;

    for (i, line) in quote.lines.iter().enumerate() {
        let min = catalog
            .product(line.product_id)
            .map(|p| p.min_order_qty())
            .unwrap_or(1);
        if line.quantity < min {
            return Err(DomainError::validation(
                format!("lines[{i}].quantity"),
                format!("minimum order quantity for this product is {min}"),
            ));
        }
    }

    let total_qty = request.cart.total_quantity();
    if total_qty < u64::from(settings.min_qty_per_order) {
        return Err(DomainError::validation(
            "lines",
            format!(
                "order must contain at least {} units",
                settings.min_qty_per_order
            ),
        ));
    }
    if total_qty > u64::from(settings.max_qty_per_order) {
        return Err(DomainError::validation(
            "lines",
            format!(
                "order cannot exceed {} units",
                settings.max_qty_per_order
            ),
        ));
    }

    if quote.totals.subtotal < settings.min_order_price {
        return Err(DomainError::validation(
            "subtotal",
            format!("minimum order amount is {}", settings.min_order_price),
        ));
    }

    Ok(Order {
        id: request.order_id,
        placed_by: request.placed_by,
        filiale_id: request.filiale_id,
        lines: quote.lines,
        delivery_date,
        notes: request.notes.trim().to_string(),
        subtotal: quote.totals.subtotal,
        delivery_fee: quote.totals.delivery_fee,
        total: quote.totals.total,
        submitted_at: request.submitted_at,
    })
}
