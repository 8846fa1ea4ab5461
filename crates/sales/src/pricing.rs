//! Order pricing: unit price resolution, subtotal, delivery fee, total.
//!
//! All amounts are `Money` (integer cents), so repeated additions never drift.
//! Unit prices are resolved against the live catalog on every quote; lines in a
//! cart only hold references and quantities.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use pledge_core::{DomainError, DomainResult, Money, ValueObject};
use pledge_products::{Product, ProductId, VariantId};

/// Delivery fee rule: a flat fee, waived once the subtotal reaches the threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryPolicy {
    pub flat_fee: Money,
    pub free_threshold: Money,
}

impl ValueObject for DeliveryPolicy {}

impl Default for DeliveryPolicy {
    /// The shop order screen's rule: 5.00, free from 100.00.
    fn default() -> Self {
        Self {
            flat_fee: Money::from_major(5),
            free_threshold: Money::from_major(100),
        }
    }
}

impl DeliveryPolicy {
    /// Fee for the given subtotal. Reaching the threshold exactly counts as free.
    pub fn fee_for(&self, subtotal: Money) -> Money {
        if subtotal >= self.free_threshold {
            Money::ZERO
        } else {
            self.flat_fee
        }
    }
}

/// A line with its resolved unit price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricedLine {
    pub product_id: ProductId,
    pub variant_id: VariantId,
    pub unit_price: Money,
    pub quantity: u32,
}

impl PricedLine {
    pub fn line_total(&self) -> DomainResult<Money> {
        self.unit_price
            .checked_mul(self.quantity)
            .ok_or_else(|| DomainError::invariant("line total overflows"))
    }
}

/// Result of pricing a set of lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderTotals {
    pub subtotal: Money,
    pub delivery_fee: Money,
    pub total: Money,
}

impl ValueObject for OrderTotals {}

impl OrderTotals {
    /// How much more must be added to the order for delivery to become free.
    pub fn amount_to_free_delivery(&self, policy: &DeliveryPolicy) -> Money {
        policy.free_threshold.saturating_sub(self.subtotal)
    }
}

/// A distributor's own terms for one variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantOffer {
    /// Replaces the variant and default prices when set.
    pub price: Option<Money>,
    pub in_stock: bool,
}

impl ValueObject for VariantOffer {}

impl Default for VariantOffer {
    fn default() -> Self {
        Self {
            price: None,
            in_stock: true,
        }
    }
}

/// Distributor offers keyed by product variant.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PriceList {
    offers: HashMap<(ProductId, VariantId), VariantOffer>,
}

impl PriceList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, product_id: ProductId, variant_id: VariantId) -> Option<&VariantOffer> {
        self.offers.get(&(product_id, variant_id))
    }

    pub fn set(&mut self, product_id: ProductId, variant_id: VariantId, offer: VariantOffer) {
        self.offers.insert((product_id, variant_id), offer);
    }

    pub fn clear(&mut self, product_id: ProductId, variant_id: VariantId) -> Option<VariantOffer> {
        self.offers.remove(&(product_id, variant_id))
    }

    /// Offers for one product, ordered by variant id.
    pub fn for_product(&self, product_id: ProductId) -> Vec<(VariantId, VariantOffer)> {
        let mut offers: Vec<_> = self
            .offers
            .iter()
            .filter(|((p, _), _)| *p == product_id)
            .map(|((_, v), offer)| (*v, *offer))
            .collect();
        offers.sort_by_key(|(v, _)| *v);
        offers
    }

    pub fn is_empty(&self) -> bool {
        self.offers.is_empty()
    }
}

/// Source of current product data for price resolution.
pub trait Catalog {
    fn product(&self, product_id: ProductId) -> Option<&Product>;

    /// Distributor terms for a variant, if any.
    fn offer(&self, _product_id: ProductId, _variant_id: VariantId) -> Option<&VariantOffer> {
        None
    }
}

/// A product catalog seen through a distributor's price list.
#[derive(Debug, Clone, Copy)]
pub struct OfferCatalog<'a, C: ?Sized> {
    pub products: &'a C,
    pub offers: &'a PriceList,
}

impl<C: Catalog + ?Sized> Catalog for OfferCatalog<'_, C> {
    fn product(&self, product_id: ProductId) -> Option<&Product> {
        self.products.product(product_id)
    }

    fn offer(&self, product_id: ProductId, variant_id: VariantId) -> Option<&VariantOffer> {
        self.offers.get(product_id, variant_id)
    }
}

impl Catalog for HashMap<ProductId, Product> {
    fn product(&self, product_id: ProductId) -> Option<&Product> {
        self.get(&product_id)
    }
}

impl Catalog for [Product] {
    fn product(&self, product_id: ProductId) -> Option<&Product> {
        self.iter().find(|p| p.id_typed() == product_id)
    }
}

impl Catalog for Vec<Product> {
    fn product(&self, product_id: ProductId) -> Option<&Product> {
        self.as_slice().product(product_id)
    }
}

/// Convert a requested quantity into a line quantity.
///
/// Zero and negative requests are rejected, never clamped.
pub fn validate_quantity(field: impl Into<String>, quantity: i64) -> DomainResult<u32> {
    if quantity < 1 {
        return Err(DomainError::validation(
            field.into(),
            "quantity must be at least 1",
        ));
    }
    u32::try_from(quantity)
        .map_err(|_| DomainError::validation(field.into(), "quantity is too large"))
}

/// Effective unit price of a variant: the distributor's offer price when set,
/// then the variant's own price, then the product's default price.
pub fn resolve_unit_price(
    product: &Product,
    variant_id: VariantId,
    offer: Option<&VariantOffer>,
) -> DomainResult<Money> {
    let variant = product.variant(variant_id).ok_or_else(|| {
        DomainError::not_found(format!(
            "variant {variant_id} of product {}",
            product.id_typed()
        ))
    })?;
    Ok(offer
        .and_then(|o| o.price)
        .or(variant.price)
        .unwrap_or(product.default_price()))
}

/// Price a set of lines under a delivery policy.
///
/// The result does not depend on line order. Lines are not modified.
pub fn price(lines: &[PricedLine], policy: &DeliveryPolicy) -> DomainResult<OrderTotals> {
    let mut subtotal = Money::ZERO;

    for (i, line) in lines.iter().enumerate() {
        if line.quantity < 1 {
            return Err(DomainError::validation(
                format!("lines[{i}].quantity"),
                "quantity must be at least 1",
            ));
        }
        subtotal = subtotal
            .checked_add(line.line_total()?)
            .ok_or_else(|| DomainError::invariant("subtotal overflows"))?;
    }

    let delivery_fee = policy.fee_for(subtotal);
    let total = subtotal
        .checked_add(delivery_fee)
        .ok_or_else(|| DomainError::invariant("total overflows"))?;

    Ok(OrderTotals {
        subtotal,
        delivery_fee,
        total,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use pledge_core::{Aggregate, AggregateId, FilialeId};
    use pledge_products::{
        ConfigureVariants, CreateProduct, OptionAxis, ProductCommand, ProductDetails,
        UpdateVariant,
    };

    fn line(cents: u64, quantity: u32) -> PricedLine {
        PricedLine {
            product_id: ProductId::new(AggregateId::new()),
            variant_id: VariantId(1),
            unit_price: Money::from_cents(cents),
            quantity,
        }
    }

    fn policy_5_100() -> DeliveryPolicy {
        DeliveryPolicy {
            flat_fee: Money::from_major(5),
            free_threshold: Money::from_major(100),
        }
    }

    /// Product with default 25.00 and two variants: Standard (no price) and
    /// Premium (28.99).
    fn gas_13kg() -> Product {
        let filiale_id = FilialeId::new();
        let product_id = ProductId::new(AggregateId::new());
        let mut product = Product::empty(product_id);
        let commands = [
            ProductCommand::CreateProduct(CreateProduct {
                filiale_id,
                product_id,
                details: ProductDetails {
                    name: "Bouteille Gaz 13kg".to_string(),
                    description: "Butane".to_string(),
                    min_order_qty: 1,
                    default_price: Money::from_major(25),
                },
                occurred_at: Utc::now(),
            }),
            ProductCommand::ConfigureVariants(ConfigureVariants {
                filiale_id,
                product_id,
                axes: vec![OptionAxis::new("Type", ["Standard", "Premium"])],
                occurred_at: Utc::now(),
            }),
            ProductCommand::UpdateVariant(UpdateVariant {
                filiale_id,
                product_id,
                variant_id: VariantId(2),
                sku: "BG13-PRM".to_string(),
                price: Some(Money::from_cents(2899)),
                enabled: true,
                occurred_at: Utc::now(),
            }),
        ];
        for cmd in commands {
            for e in product.handle(&cmd).unwrap() {
                product.apply(&e);
            }
        }
        product
    }

    #[test]
    fn below_threshold_pays_flat_fee() {
        let totals = price(&[line(2599, 2)], &policy_5_100()).unwrap();
        assert_eq!(totals.subtotal.to_string(), "51.98");
        assert_eq!(totals.delivery_fee.to_string(), "5.00");
        assert_eq!(totals.total.to_string(), "56.98");
        assert_eq!(totals.amount_to_free_delivery(&policy_5_100()).to_string(), "48.02");
    }

    #[test]
    fn above_threshold_delivers_free() {
        let totals = price(&[line(2599, 4)], &policy_5_100()).unwrap();
        assert_eq!(totals.subtotal.to_string(), "103.96");
        assert_eq!(totals.delivery_fee, Money::ZERO);
        assert_eq!(totals.total.to_string(), "103.96");
        assert_eq!(totals.amount_to_free_delivery(&policy_5_100()), Money::ZERO);
    }

    #[test]
    fn threshold_is_inclusive() {
        let totals = price(&[line(2500, 4)], &policy_5_100()).unwrap();
        assert_eq!(totals.subtotal, Money::from_major(100));
        assert_eq!(totals.delivery_fee, Money::ZERO);
        assert_eq!(totals.total, Money::from_major(100));
    }

    #[test]
    fn empty_order_pays_only_the_fee() {
        let totals = price(&[], &policy_5_100()).unwrap();
        assert_eq!(totals.subtotal, Money::ZERO);
        assert_eq!(totals.total, Money::from_major(5));
    }

    #[test]
    fn zero_quantity_is_rejected() {
        let err = price(&[line(2599, 1), line(1599, 0)], &policy_5_100()).unwrap_err();
        assert_eq!(err.field(), Some("lines[1].quantity"));
    }

    #[test]
    fn overflow_is_an_invariant_violation() {
        let err = price(&[line(u64::MAX, 2)], &policy_5_100()).unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
    }

    #[test]
    fn requested_quantities_must_be_positive() {
        assert_eq!(validate_quantity("quantity", 3).unwrap(), 3);
        for bad in [0, -1, i64::MIN] {
            let err = validate_quantity("quantity", bad).unwrap_err();
            assert_eq!(err.field(), Some("quantity"));
        }
        assert!(validate_quantity("quantity", i64::from(u32::MAX) + 1).is_err());
    }

    #[test]
    fn variant_price_overrides_default() {
        let product = gas_13kg();
        assert_eq!(
            resolve_unit_price(&product, VariantId(2), None).unwrap(),
            Money::from_cents(2899)
        );
    }

    #[test]
    fn absent_variant_price_falls_back_to_default() {
        let product = gas_13kg();
        assert_eq!(
            resolve_unit_price(&product, VariantId(1), None).unwrap(),
            Money::from_major(25)
        );
    }

    #[test]
    fn distributor_offer_takes_precedence() {
        let product = gas_13kg();
        let offer = VariantOffer {
            price: Some(Money::from_cents(2650)),
            in_stock: true,
        };
        assert_eq!(
            resolve_unit_price(&product, VariantId(1), Some(&offer)).unwrap(),
            Money::from_cents(2650)
        );
        assert_eq!(
            resolve_unit_price(&product, VariantId(2), Some(&offer)).unwrap(),
            Money::from_cents(2650)
        );

        let stock_only = VariantOffer {
            price: None,
            in_stock: false,
        };
        assert_eq!(
            resolve_unit_price(&product, VariantId(2), Some(&stock_only)).unwrap(),
            Money::from_cents(2899)
        );
    }

    #[test]
    fn offer_catalog_reads_through_the_price_list() {
        let product = gas_13kg();
        let id = product.id_typed();
        let products = vec![product];
        let mut offers = PriceList::new();
        offers.set(id, VariantId(2), VariantOffer::default());
        offers.set(
            id,
            VariantId(1),
            VariantOffer {
                price: Some(Money::from_major(26)),
                in_stock: true,
            },
        );

        let catalog = OfferCatalog {
            products: products.as_slice(),
            offers: &offers,
        };
        assert!(catalog.product(id).is_some());
        assert_eq!(catalog.offer(id, VariantId(1)).and_then(|o| o.price), Some(Money::from_major(26)));
        assert!(products.offer(id, VariantId(1)).is_none());

        let listed: Vec<VariantId> = offers.for_product(id).into_iter().map(|(v, _)| v).collect();
        assert_eq!(listed, [VariantId(1), VariantId(2)]);

        assert_eq!(offers.clear(id, VariantId(2)), Some(VariantOffer::default()));
        assert_eq!(offers.for_product(id).len(), 1);
    }

    #[test]
    fn unknown_variant_cannot_be_priced() {
        let err = resolve_unit_price(&gas_13kg(), VariantId(42), None).unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[test]
    fn catalog_lookup_over_slices_and_maps() {
        let product = gas_13kg();
        let id = product.id_typed();
        let list = vec![product.clone()];
        let map: HashMap<ProductId, Product> = [(id, product)].into_iter().collect();
        assert!(list.product(id).is_some());
        assert!(map.product(id).is_some());
        assert!(map.product(ProductId::new(AggregateId::new())).is_none());
    }

    mod proptest_tests {
        use super::*;
        use proptest::collection::vec;
        use proptest::prelude::*;

        fn lines() -> impl Strategy<Value = Vec<PricedLine>> {
            vec((0u64..100_000, 1u32..500), 0..12)
                .prop_map(|raw| raw.into_iter().map(|(c, q)| line(c, q)).collect())
        }

        proptest! {
            /// Property: permuting the lines does not change the totals.
            #[test]
            fn pricing_is_order_independent(
                (ls, shuffled) in lines().prop_flat_map(|ls| (Just(ls.clone()), Just(ls).prop_shuffle()))
            ) {
                let policy = policy_5_100();
                prop_assert_eq!(price(&shuffled, &policy).unwrap(), price(&ls, &policy).unwrap());
            }

            /// Property: total is subtotal plus fee, and the fee follows the threshold.
            #[test]
            fn total_is_subtotal_plus_fee(ls in lines(), fee in 0u64..10_000, threshold in 0u64..1_000_000) {
                let policy = DeliveryPolicy {
                    flat_fee: Money::from_cents(fee),
                    free_threshold: Money::from_cents(threshold),
                };
                let totals = price(&ls, &policy).unwrap();

                let expected_subtotal: u64 = ls.iter().map(|l| l.unit_price.cents() * u64::from(l.quantity)).sum();
                prop_assert_eq!(totals.subtotal.cents(), expected_subtotal);
                if expected_subtotal >= threshold {
                    prop_assert_eq!(totals.delivery_fee, Money::ZERO);
                } else {
                    prop_assert_eq!(totals.delivery_fee, policy.flat_fee);
                }
                prop_assert_eq!(totals.total.cents(), totals.subtotal.cents() + totals.delivery_fee.cents());
            }
        }
    }
}
