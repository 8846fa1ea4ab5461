use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use pledge_core::error::require_non_blank;
use pledge_core::{Aggregate, AggregateId, AggregateRoot, DomainError, FilialeId, Money};
use pledge_events::Event;

use crate::variant::{generate_combinations, normalize_axes, OptionAxis, Variant, VariantId};

/// Product identifier (filiale-scoped via `filiale_id` fields in events/commands).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub AggregateId);

impl ProductId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for ProductId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Product status lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus {
    Active,
    Archived,
}

/// Editable catalog fields of a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDetails {
    pub name: String,
    pub description: String,
    /// Smallest quantity a shop may order in one line.
    pub min_order_qty: u32,
    /// Unit price used by variants without their own price.
    pub default_price: Money,
}

impl ProductDetails {
    pub fn validate(&self) -> Result<(), DomainError> {
        require_non_blank("name", &self.name)?;
        require_non_blank("description", &self.description)?;
        if self.min_order_qty < 1 {
            return Err(DomainError::validation(
                "min_order_qty",
                "minimum order quantity must be at least 1",
            ));
        }
        Ok(())
    }
}

/// Stream name for product events.
pub const PRODUCT_AGGREGATE_TYPE: &str = "products.product";

/// Aggregate root: Product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    id: ProductId,
    filiale_id: Option<FilialeId>,
    details: ProductDetails,
    option_axes: Vec<OptionAxis>,
    variants: Vec<Variant>,
    next_variant_no: u32,
    status: ProductStatus,
    version: u64,
    created: bool,
}

impl Product {
    /// Create an empty, not-yet-created aggregate instance for rehydration.
    pub fn empty(id: ProductId) -> Self {
        Self {
            id,
            filiale_id: None,
            details: ProductDetails {
                name: String::new(),
                description: String::new(),
                min_order_qty: 1,
                default_price: Money::ZERO,
            },
            option_axes: Vec::new(),
            variants: Vec::new(),
            next_variant_no: 1,
            status: ProductStatus::Active,
            version: 0,
            created: false,
        }
    }

    pub fn id_typed(&self) -> ProductId {
        self.id
    }

    pub fn filiale_id(&self) -> Option<FilialeId> {
        self.filiale_id
    }

    pub fn is_created(&self) -> bool {
        self.created
    }

    pub fn details(&self) -> &ProductDetails {
        &self.details
    }

    pub fn name(&self) -> &str {
        &self.details.name
    }

    pub fn default_price(&self) -> Money {
        self.details.default_price
    }

    pub fn min_order_qty(&self) -> u32 {
        self.details.min_order_qty
    }

    pub fn option_axes(&self) -> &[OptionAxis] {
        &self.option_axes
    }

    pub fn variants(&self) -> &[Variant] {
        &self.variants
    }

    pub fn variant(&self, variant_id: VariantId) -> Option<&Variant> {
        self.variants.iter().find(|v| v.id == variant_id)
    }

    pub fn status(&self) -> ProductStatus {
        self.status
    }

    /// Archived products stay in the catalog for history but cannot be ordered.
    pub fn can_be_ordered(&self) -> bool {
        self.created && self.status == ProductStatus::Active
    }
}

impl AggregateRoot for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: CreateProduct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateProduct {
    pub filiale_id: FilialeId,
    pub product_id: ProductId,
    pub details: ProductDetails,
    pub occurred_at: DateTime<Utc>,
}

/// Command: UpdateProduct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateProduct {
    pub filiale_id: FilialeId,
    pub product_id: ProductId,
    pub details: ProductDetails,
    pub occurred_at: DateTime<Utc>,
}

/// Command: ConfigureVariants.
///
/// Regenerates the whole variant list from the axes. Existing variants, with
/// their SKUs and prices, are discarded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigureVariants {
    pub filiale_id: FilialeId,
    pub product_id: ProductId,
    pub axes: Vec<OptionAxis>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: UpdateVariant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateVariant {
    pub filiale_id: FilialeId,
    pub product_id: ProductId,
    pub variant_id: VariantId,
    pub sku: String,
    /// `None` falls back to the product default price.
    pub price: Option<Money>,
    pub enabled: bool,
    pub occurred_at: DateTime<Utc>,
}

/// Command: RemoveVariant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveVariant {
    pub filiale_id: FilialeId,
    pub product_id: ProductId,
    pub variant_id: VariantId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: ArchiveProduct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveProduct {
    pub filiale_id: FilialeId,
    pub product_id: ProductId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProductCommand {
    CreateProduct(CreateProduct),
    UpdateProduct(UpdateProduct),
    ConfigureVariants(ConfigureVariants),
    UpdateVariant(UpdateVariant),
    RemoveVariant(RemoveVariant),
    ArchiveProduct(ArchiveProduct),
}

impl ProductCommand {
    pub fn product_id(&self) -> ProductId {
        match self {
            ProductCommand::CreateProduct(c) => c.product_id,
            ProductCommand::UpdateProduct(c) => c.product_id,
            ProductCommand::ConfigureVariants(c) => c.product_id,
            ProductCommand::UpdateVariant(c) => c.product_id,
            ProductCommand::RemoveVariant(c) => c.product_id,
            ProductCommand::ArchiveProduct(c) => c.product_id,
        }
    }

    pub fn filiale_id(&self) -> FilialeId {
        match self {
            ProductCommand::CreateProduct(c) => c.filiale_id,
            ProductCommand::UpdateProduct(c) => c.filiale_id,
            ProductCommand::ConfigureVariants(c) => c.filiale_id,
            ProductCommand::UpdateVariant(c) => c.filiale_id,
            ProductCommand::RemoveVariant(c) => c.filiale_id,
            ProductCommand::ArchiveProduct(c) => c.filiale_id,
        }
    }
}

/// Event: ProductCreated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductCreated {
    pub filiale_id: FilialeId,
    pub product_id: ProductId,
    pub details: ProductDetails,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ProductUpdated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductUpdated {
    pub filiale_id: FilialeId,
    pub product_id: ProductId,
    pub details: ProductDetails,
    pub occurred_at: DateTime<Utc>,
}

/// Event: VariantsConfigured. Carries the full replacement variant list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantsConfigured {
    pub filiale_id: FilialeId,
    pub product_id: ProductId,
    pub axes: Vec<OptionAxis>,
    pub variants: Vec<Variant>,
    pub occurred_at: DateTime<Utc>,
}

/// Event: VariantUpdated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantUpdated {
    pub filiale_id: FilialeId,
    pub product_id: ProductId,
    pub variant: Variant,
    pub occurred_at: DateTime<Utc>,
}

/// Event: VariantRemoved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantRemoved {
    pub filiale_id: FilialeId,
    pub product_id: ProductId,
    pub variant_id: VariantId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ProductArchived.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductArchived {
    pub filiale_id: FilialeId,
    pub product_id: ProductId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProductEvent {
    ProductCreated(ProductCreated),
    ProductUpdated(ProductUpdated),
    VariantsConfigured(VariantsConfigured),
    VariantUpdated(VariantUpdated),
    VariantRemoved(VariantRemoved),
    ProductArchived(ProductArchived),
}

impl Event for ProductEvent {
    fn event_type(&self) -> &'static str {
        match self {
            ProductEvent::ProductCreated(_) => "products.product.created",
            ProductEvent::ProductUpdated(_) => "products.product.updated",
            ProductEvent::VariantsConfigured(_) => "products.product.variants_configured",
            ProductEvent::VariantUpdated(_) => "products.product.variant_updated",
            ProductEvent::VariantRemoved(_) => "products.product.variant_removed",
            ProductEvent::ProductArchived(_) => "products.product.archived",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            ProductEvent::ProductCreated(e) => e.occurred_at,
            ProductEvent::ProductUpdated(e) => e.occurred_at,
            ProductEvent::VariantsConfigured(e) => e.occurred_at,
            ProductEvent::VariantUpdated(e) => e.occurred_at,
            ProductEvent::VariantRemoved(e) => e.occurred_at,
            ProductEvent::ProductArchived(e) => e.occurred_at,
        }
    }
}

impl Aggregate for Product {
    type Command = ProductCommand;
    type Event = ProductEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            ProductEvent::ProductCreated(e) => {
                self.id = e.product_id;
                self.filiale_id = Some(e.filiale_id);
                self.details = e.details.clone();
                self.status = ProductStatus::Active;
                self.created = true;
            }
            ProductEvent::ProductUpdated(e) => {
                self.details = e.details.clone();
            }
            ProductEvent::VariantsConfigured(e) => {
                self.option_axes = e.axes.clone();
                self.variants = e.variants.clone();
                if let Some(last) = e.variants.iter().map(|v| v.id.0).max() {
                    self.next_variant_no = self.next_variant_no.max(last + 1);
                }
            }
            ProductEvent::VariantUpdated(e) => {
                if let Some(slot) = self.variants.iter_mut().find(|v| v.id == e.variant.id) {
                    *slot = e.variant.clone();
                }
            }
            ProductEvent::VariantRemoved(e) => {
                self.variants.retain(|v| v.id != e.variant_id);
            }
            ProductEvent::ProductArchived(_) => {
                self.status = ProductStatus::Archived;
            }
        }

        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            ProductCommand::CreateProduct(cmd) => self.handle_create(cmd),
            ProductCommand::UpdateProduct(cmd) => self.handle_update(cmd),
            ProductCommand::ConfigureVariants(cmd) => self.handle_configure_variants(cmd),
            ProductCommand::UpdateVariant(cmd) => self.handle_update_variant(cmd),
            ProductCommand::RemoveVariant(cmd) => self.handle_remove_variant(cmd),
            ProductCommand::ArchiveProduct(cmd) => self.handle_archive(cmd),
        }
    }
}

impl Product {
    /// Common guard for every command on an existing product.
    fn ensure_editable(
        &self,
        filiale_id: FilialeId,
        product_id: ProductId,
    ) -> Result<(), DomainError> {
        if !self.created {
            return Err(DomainError::not_found(format!("product {product_id}")));
        }
        if self.filiale_id != Some(filiale_id) {
            return Err(DomainError::invariant("filiale mismatch"));
        }
        if self.id != product_id {
            return Err(DomainError::invariant("product_id mismatch"));
        }
        if self.status == ProductStatus::Archived {
            return Err(DomainError::invariant("archived products cannot be modified"));
        }
        Ok(())
    }

    fn ensure_variant(&self, variant_id: VariantId) -> Result<&Variant, DomainError> {
        self.variant(variant_id)
            .ok_or_else(|| DomainError::not_found(format!("variant {variant_id}")))
    }

    fn handle_create(&self, cmd: &CreateProduct) -> Result<Vec<ProductEvent>, DomainError> {
        if self.created {
            return Err(DomainError::conflict("product already exists"));
        }
        cmd.details.validate()?;

        Ok(vec![ProductEvent::ProductCreated(ProductCreated {
            filiale_id: cmd.filiale_id,
            product_id: cmd.product_id,
            details: cmd.details.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_update(&self, cmd: &UpdateProduct) -> Result<Vec<ProductEvent>, DomainError> {
        self.ensure_editable(cmd.filiale_id, cmd.product_id)?;
        cmd.details.validate()?;

        Ok(vec![ProductEvent::ProductUpdated(ProductUpdated {
            filiale_id: cmd.filiale_id,
            product_id: cmd.product_id,
            details: cmd.details.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_configure_variants(
        &self,
        cmd: &ConfigureVariants,
    ) -> Result<Vec<ProductEvent>, DomainError> {
        self.ensure_editable(cmd.filiale_id, cmd.product_id)?;

        let axes = normalize_axes(&cmd.axes)?;
        let combinations = generate_combinations(&axes)?;

        let variants = combinations
            .iter()
            .zip(self.next_variant_no..)
            .map(|(combo, no)| Variant::shell(VariantId(no), combo))
            .collect();

        Ok(vec![ProductEvent::VariantsConfigured(VariantsConfigured {
            filiale_id: cmd.filiale_id,
            product_id: cmd.product_id,
            axes,
            variants,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_update_variant(
        &self,
        cmd: &UpdateVariant,
    ) -> Result<Vec<ProductEvent>, DomainError> {
        self.ensure_editable(cmd.filiale_id, cmd.product_id)?;
        let current = self.ensure_variant(cmd.variant_id)?;

        let sku = cmd.sku.trim();
        require_non_blank("sku", sku)?;
        if self
            .variants
            .iter()
            .any(|v| v.id != cmd.variant_id && v.sku == sku)
        {
            return Err(DomainError::conflict(format!("SKU '{sku}' is already used")));
        }

        Ok(vec![ProductEvent::VariantUpdated(VariantUpdated {
            filiale_id: cmd.filiale_id,
            product_id: cmd.product_id,
            variant: Variant {
                id: current.id,
                combination_label: current.combination_label.clone(),
                sku: sku.to_string(),
                price: cmd.price,
                enabled: cmd.enabled,
            },
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_remove_variant(
        &self,
        cmd: &RemoveVariant,
    ) -> Result<Vec<ProductEvent>, DomainError> {
        self.ensure_editable(cmd.filiale_id, cmd.product_id)?;
        self.ensure_variant(cmd.variant_id)?;

        Ok(vec![ProductEvent::VariantRemoved(VariantRemoved {
            filiale_id: cmd.filiale_id,
            product_id: cmd.product_id,
            variant_id: cmd.variant_id,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_archive(&self, cmd: &ArchiveProduct) -> Result<Vec<ProductEvent>, DomainError> {
        if self.created && self.status == ProductStatus::Archived {
            return Err(DomainError::conflict("product is already archived"));
        }
        self.ensure_editable(cmd.filiale_id, cmd.product_id)?;

        Ok(vec![ProductEvent::ProductArchived(ProductArchived {
            filiale_id: cmd.filiale_id,
            product_id: cmd.product_id,
            occurred_at: cmd.occurred_at,
        })])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_time() -> DateTime<Utc> {
        Utc::now()
    }

    fn details(name: &str) -> ProductDetails {
        ProductDetails {
            name: name.to_string(),
            description: "Bouteille de gaz butane".to_string(),
            min_order_qty: 10,
            default_price: Money::from_major(25),
        }
    }

    /// Execute a command and apply the resulting events.
    fn exec(product: &mut Product, cmd: ProductCommand) -> Result<Vec<ProductEvent>, DomainError> {
        let events = product.handle(&cmd)?;
        for e in &events {
            product.apply(e);
        }
        Ok(events)
    }

    fn created_product() -> (Product, FilialeId, ProductId) {
        let filiale_id = FilialeId::new();
        let product_id = ProductId::new(AggregateId::new());
        let mut product = Product::empty(product_id);
        exec(
            &mut product,
            ProductCommand::CreateProduct(CreateProduct {
                filiale_id,
                product_id,
                details: details("Bouteille Gaz 13kg"),
                occurred_at: test_time(),
            }),
        )
        .unwrap();
        (product, filiale_id, product_id)
    }

    fn configure(
        product: &mut Product,
        filiale_id: FilialeId,
        product_id: ProductId,
        axes: Vec<OptionAxis>,
    ) -> Result<Vec<ProductEvent>, DomainError> {
        exec(
            product,
            ProductCommand::ConfigureVariants(ConfigureVariants {
                filiale_id,
                product_id,
                axes,
                occurred_at: test_time(),
            }),
        )
    }

    fn update_variant_cmd(
        filiale_id: FilialeId,
        product_id: ProductId,
        variant_id: VariantId,
        sku: &str,
        price: Option<Money>,
    ) -> ProductCommand {
        ProductCommand::UpdateVariant(UpdateVariant {
            filiale_id,
            product_id,
            variant_id,
            sku: sku.to_string(),
            price,
            enabled: true,
            occurred_at: test_time(),
        })
    }

    #[test]
    fn create_product_emits_product_created_event() {
        let (product, filiale_id, product_id) = created_product();
        assert_eq!(product.version(), 1);
        assert_eq!(product.filiale_id(), Some(filiale_id));
        assert_eq!(product.id_typed(), product_id);
        assert_eq!(product.name(), "Bouteille Gaz 13kg");
        assert_eq!(product.default_price(), Money::from_major(25));
        assert!(product.can_be_ordered());
    }

    #[test]
    fn create_product_rejects_blank_name() {
        let product_id = ProductId::new(AggregateId::new());
        let product = Product::empty(product_id);
        let err = product
            .handle(&ProductCommand::CreateProduct(CreateProduct {
                filiale_id: FilialeId::new(),
                product_id,
                details: details("   "),
                occurred_at: test_time(),
            }))
            .unwrap_err();
        assert_eq!(err.field(), Some("name"));
    }

    #[test]
    fn create_product_rejects_zero_min_order_qty() {
        let product_id = ProductId::new(AggregateId::new());
        let product = Product::empty(product_id);
        let mut d = details("Bouteille Gaz 6kg");
        d.min_order_qty = 0;
        let err = product
            .handle(&ProductCommand::CreateProduct(CreateProduct {
                filiale_id: FilialeId::new(),
                product_id,
                details: d,
                occurred_at: test_time(),
            }))
            .unwrap_err();
        assert_eq!(err.field(), Some("min_order_qty"));
    }

    #[test]
    fn create_product_rejects_duplicate_creation() {
        let (product, filiale_id, product_id) = created_product();
        let err = product
            .handle(&ProductCommand::CreateProduct(CreateProduct {
                filiale_id,
                product_id,
                details: details("Again"),
                occurred_at: test_time(),
            }))
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[test]
    fn update_product_replaces_details() {
        let (mut product, filiale_id, product_id) = created_product();
        let mut d = details("Bouteille Gaz 12.5kg");
        d.default_price = Money::from_cents(2650);
        exec(
            &mut product,
            ProductCommand::UpdateProduct(UpdateProduct {
                filiale_id,
                product_id,
                details: d.clone(),
                occurred_at: test_time(),
            }),
        )
        .unwrap();
        assert_eq!(product.details(), &d);
    }

    #[test]
    fn configure_variants_generates_shell_variants_in_order() {
        let (mut product, filiale_id, product_id) = created_product();
        configure(
            &mut product,
            filiale_id,
            product_id,
            vec![
                OptionAxis::new("Color", ["Red", "Blue"]),
                OptionAxis::new("Size", ["L", "XL"]),
                OptionAxis::new("", Vec::<String>::new()),
            ],
        )
        .unwrap();

        let labels: Vec<&str> = product
            .variants()
            .iter()
            .map(|v| v.combination_label.as_str())
            .collect();
        assert_eq!(labels, ["Red / L", "Red / XL", "Blue / L", "Blue / XL"]);
        assert!(product.variants().iter().all(|v| v.sku.is_empty() && v.price.is_none()));
        assert_eq!(product.option_axes().len(), 2);
        assert_eq!(
            product.variants().iter().map(|v| v.id).collect::<Vec<_>>(),
            [VariantId(1), VariantId(2), VariantId(3), VariantId(4)]
        );
    }

    #[test]
    fn reconfiguring_replaces_all_variants_and_never_reuses_ids() {
        let (mut product, filiale_id, product_id) = created_product();
        configure(
            &mut product,
            filiale_id,
            product_id,
            vec![OptionAxis::new("Type", ["Standard", "Premium"])],
        )
        .unwrap();
        exec(
            &mut product,
            update_variant_cmd(filiale_id, product_id, VariantId(2), "BG13-PRM", Some(Money::from_major(28))),
        )
        .unwrap();

        configure(
            &mut product,
            filiale_id,
            product_id,
            vec![OptionAxis::new("Type", ["Standard", "Premium", "Export"])],
        )
        .unwrap();

        assert_eq!(product.variants().len(), 3);
        assert!(product.variants().iter().all(|v| v.sku.is_empty() && v.price.is_none()));
        assert_eq!(product.variants()[0].id, VariantId(3));
    }

    #[test]
    fn configure_variants_rejects_unnamed_axis() {
        let (mut product, filiale_id, product_id) = created_product();
        let err = configure(
            &mut product,
            filiale_id,
            product_id,
            vec![OptionAxis::new("", ["Red"])],
        )
        .unwrap_err();
        assert_eq!(err.field(), Some("option_axes[0].name"));
        assert_eq!(product.version(), 1);
    }

    #[test]
    fn update_variant_sets_sku_and_price_override() {
        let (mut product, filiale_id, product_id) = created_product();
        configure(
            &mut product,
            filiale_id,
            product_id,
            vec![OptionAxis::new("Type", ["Standard", "Premium"])],
        )
        .unwrap();

        exec(
            &mut product,
            update_variant_cmd(filiale_id, product_id, VariantId(2), " BG13-PRM ", Some(Money::from_cents(2899))),
        )
        .unwrap();

        let variant = product.variant(VariantId(2)).unwrap();
        assert_eq!(variant.sku, "BG13-PRM");
        assert_eq!(variant.price, Some(Money::from_cents(2899)));
        assert_eq!(variant.combination_label, "Premium");
    }

    #[test]
    fn update_variant_requires_sku() {
        let (mut product, filiale_id, product_id) = created_product();
        configure(&mut product, filiale_id, product_id, vec![OptionAxis::new("Type", ["Standard"])])
            .unwrap();
        let err = product
            .handle(&update_variant_cmd(filiale_id, product_id, VariantId(1), "  ", None))
            .unwrap_err();
        assert_eq!(err.field(), Some("sku"));
    }

    #[test]
    fn update_variant_rejects_duplicate_sku() {
        let (mut product, filiale_id, product_id) = created_product();
        configure(
            &mut product,
            filiale_id,
            product_id,
            vec![OptionAxis::new("Type", ["Standard", "Premium"])],
        )
        .unwrap();
        exec(&mut product, update_variant_cmd(filiale_id, product_id, VariantId(1), "BG13", None))
            .unwrap();
        let err = product
            .handle(&update_variant_cmd(filiale_id, product_id, VariantId(2), "BG13", None))
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[test]
    fn unknown_variant_is_not_found() {
        let (product, filiale_id, product_id) = created_product();
        let err = product
            .handle(&update_variant_cmd(filiale_id, product_id, VariantId(99), "X", None))
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));

        let err = product
            .handle(&ProductCommand::RemoveVariant(RemoveVariant {
                filiale_id,
                product_id,
                variant_id: VariantId(99),
                occurred_at: test_time(),
            }))
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[test]
    fn remove_variant_drops_it() {
        let (mut product, filiale_id, product_id) = created_product();
        configure(
            &mut product,
            filiale_id,
            product_id,
            vec![OptionAxis::new("Type", ["Standard", "Premium"])],
        )
        .unwrap();
        exec(
            &mut product,
            ProductCommand::RemoveVariant(RemoveVariant {
                filiale_id,
                product_id,
                variant_id: VariantId(1),
                occurred_at: test_time(),
            }),
        )
        .unwrap();
        assert!(product.variant(VariantId(1)).is_none());
        assert_eq!(product.variants().len(), 1);
    }

    #[test]
    fn archived_products_reject_further_commands() {
        let (mut product, filiale_id, product_id) = created_product();
        let archive = ProductCommand::ArchiveProduct(ArchiveProduct {
            filiale_id,
            product_id,
            occurred_at: test_time(),
        });
        exec(&mut product, archive.clone()).unwrap();
        assert_eq!(product.status(), ProductStatus::Archived);
        assert!(!product.can_be_ordered());

        let err = product.handle(&archive).unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));

        let err = configure(
            &mut product,
            filiale_id,
            product_id,
            vec![OptionAxis::new("Type", ["Standard"])],
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
    }

    #[test]
    fn commands_from_another_filiale_are_rejected() {
        let (product, _, product_id) = created_product();
        let err = product
            .handle(&ProductCommand::ArchiveProduct(ArchiveProduct {
                filiale_id: FilialeId::new(),
                product_id,
                occurred_at: test_time(),
            }))
            .unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
    }

    #[test]
    fn commands_on_missing_product_are_not_found() {
        let product_id = ProductId::new(AggregateId::new());
        let product = Product::empty(product_id);
        let err = product
            .handle(&ProductCommand::ArchiveProduct(ArchiveProduct {
                filiale_id: FilialeId::new(),
                product_id,
                occurred_at: test_time(),
            }))
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[test]
    fn handle_does_not_mutate_state() {
        let (product, filiale_id, product_id) = created_product();
        let before = product.clone();
        let cmd = ProductCommand::ConfigureVariants(ConfigureVariants {
            filiale_id,
            product_id,
            axes: vec![OptionAxis::new("Type", ["Standard", "Premium"])],
            occurred_at: test_time(),
        });

        let events1 = product.handle(&cmd).unwrap();
        let events2 = product.handle(&cmd).unwrap();

        assert_eq!(product, before);
        assert_eq!(events1, events2);
    }

    #[test]
    fn rehydration_from_events_is_deterministic() {
        let (mut product, filiale_id, product_id) = created_product();
        let mut history = vec![ProductEvent::ProductCreated(ProductCreated {
            filiale_id,
            product_id,
            details: product.details().clone(),
            occurred_at: test_time(),
        })];
        history.extend(
            configure(
                &mut product,
                filiale_id,
                product_id,
                vec![OptionAxis::new("Color", ["Red", "Blue"])],
            )
            .unwrap(),
        );

        let mut replayed = Product::empty(product_id);
        for e in &history {
            replayed.apply(e);
        }
        assert_eq!(replayed.variants(), product.variants());
        assert_eq!(replayed.version(), product.version());
    }
}
