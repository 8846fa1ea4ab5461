//! Product storage: event-sourced products behind the command dispatcher,
//! with an id index for listing.

use std::collections::HashMap;
use std::sync::RwLock;

use pledge_core::{AggregateId, FilialeId};
use pledge_products::{Product, ProductCommand, ProductId, PRODUCT_AGGREGATE_TYPE};

use crate::command_dispatcher::{CommandDispatcher, DispatchError};
use crate::event_store::{EventStore, EventStoreError};

fn rehydrate(id: AggregateId) -> Product {
    Product::empty(ProductId::new(id))
}

#[derive(Debug)]
pub struct ProductCatalog<S> {
    dispatcher: CommandDispatcher<S>,
    /// Created products, in creation order.
    index: RwLock<Vec<ProductId>>,
}

impl<S: EventStore> ProductCatalog<S> {
    pub fn new(store: S) -> Self {
        Self {
            dispatcher: CommandDispatcher::new(store),
            index: RwLock::new(Vec::new()),
        }
    }

    /// Execute a product command and return the resulting product state.
    pub fn execute(&self, command: ProductCommand) -> Result<Product, DispatchError> {
        let product_id = command.product_id();
        let is_create = matches!(command, ProductCommand::CreateProduct(_));

        self.dispatcher
            .dispatch(PRODUCT_AGGREGATE_TYPE, product_id.0, command, rehydrate)?;

        if is_create {
            let mut index = self.index.write().map_err(|_| poisoned())?;
            if !index.contains(&product_id) {
                index.push(product_id);
            }
        }

        self.dispatcher.load(PRODUCT_AGGREGATE_TYPE, product_id.0, rehydrate)
    }

    /// Current state of a product, or `None` if it was never created.
    pub fn get(&self, product_id: ProductId) -> Result<Option<Product>, DispatchError> {
        let product = self
            .dispatcher
            .load(PRODUCT_AGGREGATE_TYPE, product_id.0, rehydrate)?;
        Ok(product.is_created().then_some(product))
    }

    pub fn list(&self) -> Result<Vec<Product>, DispatchError> {
        let ids = self.index.read().map_err(|_| poisoned())?.clone();
        let mut products = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(p) = self.get(id)? {
                products.push(p);
            }
        }
        Ok(products)
    }

    pub fn list_for_filiale(&self, filiale_id: FilialeId) -> Result<Vec<Product>, DispatchError> {
        Ok(self
            .list()?
            .into_iter()
            .filter(|p| p.filiale_id() == Some(filiale_id))
            .collect())
    }

    /// Point-in-time copy of the catalog, used to price carts.
    pub fn snapshot(&self) -> Result<HashMap<ProductId, Product>, DispatchError> {
        Ok(self
            .list()?
            .into_iter()
            .map(|p| (p.id_typed(), p))
            .collect())
    }
}

fn poisoned() -> DispatchError {
    DispatchError::Store(EventStoreError::Poisoned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use pledge_core::{DomainError, Money};
    use pledge_products::{
        ArchiveProduct, CreateProduct, ProductDetails, ProductStatus, UpdateProduct,
    };
    use pledge_sales::Catalog;

    use crate::event_store::InMemoryEventStore;

    fn details(name: &str, cents: u64) -> ProductDetails {
        ProductDetails {
            name: name.to_string(),
            description: "Gaz domestique".to_string(),
            min_order_qty: 1,
            default_price: Money::from_cents(cents),
        }
    }

    fn create(catalog: &ProductCatalog<InMemoryEventStore>, filiale_id: FilialeId, name: &str) -> Product {
        catalog
            .execute(ProductCommand::CreateProduct(CreateProduct {
                filiale_id,
                product_id: ProductId::new(AggregateId::new()),
                details: details(name, 2500),
                occurred_at: Utc::now(),
            }))
            .unwrap()
    }

    #[test]
    fn execute_returns_the_new_state() {
        let catalog = ProductCatalog::new(InMemoryEventStore::new());
        let filiale_id = FilialeId::new();
        let product = create(&catalog, filiale_id, "Bouteille Gaz 13kg");

        let updated = catalog
            .execute(ProductCommand::UpdateProduct(UpdateProduct {
                filiale_id,
                product_id: product.id_typed(),
                details: details("Bouteille Gaz 13kg", 2599),
                occurred_at: Utc::now(),
            }))
            .unwrap();
        assert_eq!(updated.default_price(), Money::from_cents(2599));
        assert_eq!(catalog.get(product.id_typed()).unwrap(), Some(updated));
    }

    #[test]
    fn listing_follows_creation_order_and_filiale() {
        let catalog = ProductCatalog::new(InMemoryEventStore::new());
        let west = FilialeId::new();
        let east = FilialeId::new();
        create(&catalog, west, "Bouteille Gaz 13kg");
        create(&catalog, east, "Bouteille Gaz 6kg");
        create(&catalog, west, "Bouteille Gaz 3kg");

        let names: Vec<String> = catalog.list().unwrap().iter().map(|p| p.name().to_string()).collect();
        assert_eq!(names, ["Bouteille Gaz 13kg", "Bouteille Gaz 6kg", "Bouteille Gaz 3kg"]);
        assert_eq!(catalog.list_for_filiale(west).unwrap().len(), 2);
    }

    #[test]
    fn failed_create_is_not_indexed() {
        let catalog = ProductCatalog::new(InMemoryEventStore::new());
        let err = catalog
            .execute(ProductCommand::CreateProduct(CreateProduct {
                filiale_id: FilialeId::new(),
                product_id: ProductId::new(AggregateId::new()),
                details: details("", 2500),
                occurred_at: Utc::now(),
            }))
            .unwrap_err();
        assert!(matches!(err, DispatchError::Domain(DomainError::Validation { .. })));
        assert!(catalog.list().unwrap().is_empty());
    }

    #[test]
    fn unknown_products_are_none() {
        let catalog = ProductCatalog::new(InMemoryEventStore::new());
        assert_eq!(catalog.get(ProductId::new(AggregateId::new())).unwrap(), None);
    }

    #[test]
    fn snapshot_serves_as_price_catalog() {
        let catalog = ProductCatalog::new(InMemoryEventStore::new());
        let filiale_id = FilialeId::new();
        let product = create(&catalog, filiale_id, "Bouteille Gaz 13kg");
        catalog
            .execute(ProductCommand::ArchiveProduct(ArchiveProduct {
                filiale_id,
                product_id: product.id_typed(),
                occurred_at: Utc::now(),
            }))
            .unwrap();

        let snapshot = catalog.snapshot().unwrap();
        let archived = snapshot.product(product.id_typed()).unwrap();
        assert_eq!(archived.status(), ProductStatus::Archived);
    }
}
