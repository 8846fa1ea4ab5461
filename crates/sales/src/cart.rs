//! Shop cart: what a shop intends to order, before prices are applied.

use serde::{Deserialize, Serialize};

use pledge_core::{DomainError, DomainResult};
use pledge_products::{ProductId, VariantId};

use crate::pricing::{price, resolve_unit_price, validate_quantity, Catalog, DeliveryPolicy, OrderTotals, PricedLine};

/// A cart line references a product variant; its price is looked up at quote time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: ProductId,
    pub variant_id: VariantId,
    pub quantity: u32,
}

/// Priced snapshot of a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub lines: Vec<PricedLine>,
    pub totals: OrderTotals,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn total_quantity(&self) -> u64 {
        self.lines.iter().map(|l| u64::from(l.quantity)).sum()
    }

    /// Add a variant to the cart. Adding a variant already in the cart increases
    /// that line's quantity.
    pub fn add(
        &mut self,
        product_id: ProductId,
        variant_id: VariantId,
        quantity: i64,
    ) -> DomainResult<()> {
        let quantity = validate_quantity("quantity", quantity)?;

        match self
            .lines
            .iter_mut()
            .find(|l| l.product_id == product_id && l.variant_id == variant_id)
        {
            Some(line) => {
                line.quantity = line
                    .quantity
                    .checked_add(quantity)
                    .ok_or_else(|| DomainError::validation("quantity", "quantity is too large"))?;
            }
            None => self.lines.push(CartLine {
                product_id,
                variant_id,
                quantity,
            }),
        }
        Ok(())
    }

    pub fn set_quantity(&mut self, index: usize, quantity: i64) -> DomainResult<()> {
        let quantity = validate_quantity(format!("lines[{index}].quantity"), quantity)?;
        let line = self
            .lines
            .get_mut(index)
            .ok_or_else(|| DomainError::not_found(format!("cart line {index}")))?;
        line.quantity = quantity;
        Ok(())
    }

    pub fn remove(&mut self, index: usize) -> DomainResult<CartLine> {
        if index >= self.lines.len() {
            return Err(DomainError::not_found(format!("cart line {index}")));
        }
        Ok(self.lines.remove(index))
    }

    /// Resolve every line against the current catalog.
    ///
    /// Unknown products or variants are not found; archived products, disabled
    /// variants and variants the distributor marked out of stock cannot be
    /// ordered.
    pub fn priced_lines<C: Catalog + ?Sized>(&self, catalog: &C) -> DomainResult<Vec<PricedLine>> {
        self.lines
            .iter()
            .enumerate()
            .map(|(i, line)| {
                let product = catalog
                    .product(line.product_id)
                    .ok_or_else(|| DomainError::not_found(format!("product {}", line.product_id)))?;
                if !product.can_be_ordered() {
                    return Err(DomainError::validation(
                        format!("lines[{i}].product_id"),
                        format!("'{}' is no longer available", product.name()),
                    ));
                }

                let offer = catalog.offer(line.product_id, line.variant_id);
                let unit_price = resolve_unit_price(product, line.variant_id, offer)?;
                if product.variant(line.variant_id).is_some_and(|v| !v.enabled) {
                    return Err(DomainError::validation(
                        format!("lines[{i}].variant_id"),
                        "variant is not available",
                    ));
                }
                if offer.is_some_and(|o| !o.in_stock) {
                    return Err(DomainError::validation(
                        format!("lines[{i}].variant_id"),
                        "variant is out of stock",
                    ));
                }

                Ok(PricedLine {
                    product_id: line.product_id,
                    variant_id: line.variant_id,
                    unit_price,
                    quantity: line.quantity,
                })
            })
            .collect()
    }

    /// Price the cart with fresh catalog prices.
    pub fn quote<C: Catalog + ?Sized>(&self, catalog: &C, policy: &DeliveryPolicy) -> DomainResult<Quote> {
        let lines = self.priced_lines(catalog)?;
        let totals = price(&lines, policy)?;
        Ok(Quote { lines, totals })
    }
}
