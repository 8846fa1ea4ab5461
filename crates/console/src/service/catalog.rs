//! Products, their variants and distributor offers.

use std::collections::HashMap;

use chrono::Utc;

use pledge_auth::{authorize, authorize_in_filiale, Permission, Principal};
use pledge_core::{AggregateId, DomainError, FilialeId, Money, UserId};
use pledge_infra::EventStore;
use pledge_products::{
    generate_combinations, ArchiveProduct, ConfigureVariants, CreateProduct, OptionAxis, Product,
    ProductCommand, ProductDetails, ProductId, RemoveVariant, UpdateProduct, UpdateVariant,
    VariantCombination, VariantId,
};
use pledge_sales::{PriceList, VariantOffer};

use super::{guard, scope, ConsoleService};
use crate::error::ServiceResult;

/// Edits an administrator makes to one variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantEdit {
    pub variant_id: VariantId,
    pub sku: String,
    pub price: Option<Money>,
    pub enabled: bool,
}

impl<S: EventStore> ConsoleService<S> {
    pub fn create_product(
        &self,
        caller: UserId,
        filiale_id: FilialeId,
        details: ProductDetails,
    ) -> ServiceResult<Product> {
        let principal = self.principal(caller)?;
        guard(
            &principal,
            "create_product",
            authorize_in_filiale(&principal, &Permission::PRODUCTS_MANAGE, filiale_id),
        )?;
        self.repos.filiales.get(filiale_id)?;

        let product = self.products.execute(ProductCommand::CreateProduct(CreateProduct {
            filiale_id,
            product_id: ProductId::new(AggregateId::new()),
            details,
            occurred_at: Utc::now(),
        }))?;
        tracing::info!(product_id = %product.id_typed(), name = product.name(), "product created");
        Ok(product)
    }

    pub fn update_product(
        &self,
        caller: UserId,
        product_id: ProductId,
        details: ProductDetails,
    ) -> ServiceResult<Product> {
        let principal = self.principal(caller)?;
        let filiale_id = self.editable_product(&principal, product_id, "update_product")?;
        Ok(self.products.execute(ProductCommand::UpdateProduct(UpdateProduct {
            filiale_id,
            product_id,
            details,
            occurred_at: Utc::now(),
        }))?)
    }

    pub fn archive_product(&self, caller: UserId, product_id: ProductId) -> ServiceResult<Product> {
        let principal = self.principal(caller)?;
        let filiale_id = self.editable_product(&principal, product_id, "archive_product")?;
        let product = self.products.execute(ProductCommand::ArchiveProduct(ArchiveProduct {
            filiale_id,
            product_id,
            occurred_at: Utc::now(),
        }))?;
        tracing::info!(%product_id, "product archived");
        Ok(product)
    }

    /// Products visible to the caller. Callers without `products.manage` only
    /// see products that can be ordered.
    pub fn list_products(&self, caller: UserId) -> ServiceResult<Vec<Product>> {
        let principal = self.principal(caller)?;
        guard(&principal, "list_products", authorize(&principal, &Permission::PRODUCTS_READ))?;

        let mut products = match scope(&principal)? {
            Some(own) => self.products.list_for_filiale(own)?,
            None => self.products.list()?,
        };
        if authorize(&principal, &Permission::PRODUCTS_MANAGE).is_err() {
            products.retain(Product::can_be_ordered);
        }
        Ok(products)
    }

    /// Combinations the axes would generate, without changing any product.
    pub fn preview_combinations(
        &self,
        caller: UserId,
        axes: &[OptionAxis],
    ) -> ServiceResult<Vec<VariantCombination>> {
        let principal = self.principal(caller)?;
        guard(
            &principal,
            "preview_combinations",
            authorize(&principal, &Permission::PRODUCTS_MANAGE),
        )?;
        Ok(generate_combinations(axes)?)
    }

    /// Replace the product's variants with one fresh variant per combination.
    pub fn configure_variants(
        &self,
        caller: UserId,
        product_id: ProductId,
        axes: Vec<OptionAxis>,
    ) -> ServiceResult<Product> {
        let principal = self.principal(caller)?;
        let filiale_id = self.editable_product(&principal, product_id, "configure_variants")?;
        let product = self.products.execute(ProductCommand::ConfigureVariants(ConfigureVariants {
            filiale_id,
            product_id,
            axes,
            occurred_at: Utc::now(),
        }))?;
        tracing::info!(%product_id, variants = product.variants().len(), "variants configured");
        Ok(product)
    }

    pub fn update_variant(
        &self,
        caller: UserId,
        product_id: ProductId,
        edit: VariantEdit,
    ) -> ServiceResult<Product> {
        let principal = self.principal(caller)?;
        let filiale_id = self.editable_product(&principal, product_id, "update_variant")?;
        Ok(self.products.execute(ProductCommand::UpdateVariant(UpdateVariant {
            filiale_id,
            product_id,
            variant_id: edit.variant_id,
            sku: edit.sku,
            price: edit.price,
            enabled: edit.enabled,
            occurred_at: Utc::now(),
        }))?)
    }

    pub fn remove_variant(
        &self,
        caller: UserId,
        product_id: ProductId,
        variant_id: VariantId,
    ) -> ServiceResult<Product> {
        let principal = self.principal(caller)?;
        let filiale_id = self.editable_product(&principal, product_id, "remove_variant")?;
        let product = self.products.execute(ProductCommand::RemoveVariant(RemoveVariant {
            filiale_id,
            product_id,
            variant_id,
            occurred_at: Utc::now(),
        }))?;
        if let Some(offers) = self.write_offers()?.get_mut(&filiale_id) {
            offers.clear(product_id, variant_id);
        }
        Ok(product)
    }

    /// Set the distributor's own price and stock for one variant.
    pub fn set_variant_offer(
        &self,
        caller: UserId,
        product_id: ProductId,
        variant_id: VariantId,
        offer: VariantOffer,
    ) -> ServiceResult<VariantOffer> {
        let principal = self.principal(caller)?;
        let filiale_id = self.offered_variant(&principal, product_id, variant_id, "set_variant_offer")?;
        self.write_offers()?
            .entry(filiale_id)
            .or_default()
            .set(product_id, variant_id, offer);
        tracing::info!(%product_id, %variant_id, in_stock = offer.in_stock, "variant offer set");
        Ok(offer)
    }

    /// Drop the distributor's terms so the catalog price applies again.
    pub fn clear_variant_offer(
        &self,
        caller: UserId,
        product_id: ProductId,
        variant_id: VariantId,
    ) -> ServiceResult<()> {
        let principal = self.principal(caller)?;
        let filiale_id = self.offered_variant(&principal, product_id, variant_id, "clear_variant_offer")?;
        if let Some(offers) = self.write_offers()?.get_mut(&filiale_id) {
            offers.clear(product_id, variant_id);
        }
        tracing::info!(%product_id, %variant_id, "variant offer cleared");
        Ok(())
    }

    pub fn variant_offers(
        &self,
        caller: UserId,
        product_id: ProductId,
    ) -> ServiceResult<Vec<(VariantId, VariantOffer)>> {
        let principal = self.principal(caller)?;
        let product = self.product(product_id)?;
        let filiale_id = owning_filiale(&product)?;
        guard(
            &principal,
            "variant_offers",
            authorize_in_filiale(&principal, &Permission::OFFERS_MANAGE, filiale_id),
        )?;
        Ok(self
            .read_offers()?
            .get(&filiale_id)
            .map(|offers| offers.for_product(product_id))
            .unwrap_or_default())
    }

    fn product(&self, product_id: ProductId) -> ServiceResult<Product> {
        Ok(self
            .products
            .get(product_id)?
            .ok_or_else(|| DomainError::not_found(format!("product {product_id}")))?)
    }

    /// Owning filiale of a product the caller may edit.
    fn editable_product(
        &self,
        principal: &Principal,
        product_id: ProductId,
        action: &'static str,
    ) -> ServiceResult<FilialeId> {
        let filiale_id = owning_filiale(&self.product(product_id)?)?;
        guard(
            principal,
            action,
            authorize_in_filiale(principal, &Permission::PRODUCTS_MANAGE, filiale_id),
        )?;
        Ok(filiale_id)
    }

    /// Owning filiale of a variant the caller may set offers on.
    fn offered_variant(
        &self,
        principal: &Principal,
        product_id: ProductId,
        variant_id: VariantId,
        action: &'static str,
    ) -> ServiceResult<FilialeId> {
        let product = self.product(product_id)?;
        let filiale_id = owning_filiale(&product)?;
        guard(
            principal,
            action,
            authorize_in_filiale(principal, &Permission::OFFERS_MANAGE, filiale_id),
        )?;
        if product.variant(variant_id).is_none() {
            return Err(DomainError::not_found(format!("variant {variant_id}")).into());
        }
        Ok(filiale_id)
    }

    /// Orderable products for the caller, keyed for price lookup.
    pub(super) fn catalog_for(&self, principal: &Principal) -> ServiceResult<HashMap<ProductId, Product>> {
        let mut catalog = self.products.snapshot()?;
        if let Some(own) = scope(principal)? {
            catalog.retain(|_, p| p.filiale_id() == Some(own));
        }
        Ok(catalog)
    }

    /// The filiale's price list; empty for admins and filiales without offers.
    pub(super) fn price_list(&self, filiale_id: Option<FilialeId>) -> ServiceResult<PriceList> {
        let offers = self.read_offers()?;
        Ok(filiale_id
            .and_then(|id| offers.get(&id))
            .cloned()
            .unwrap_or_default())
    }
}

fn owning_filiale(product: &Product) -> ServiceResult<FilialeId> {
    Ok(product
        .filiale_id()
        .ok_or_else(|| DomainError::invariant("created product without filiale"))?)
}
