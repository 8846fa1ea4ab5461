//! Products domain module (event-sourced).
//!
//! Catalog rules for gas products and their variants, implemented purely as
//! deterministic domain logic (no IO, no HTTP, no storage).

pub mod product;
pub mod variant;

pub use product::{
    ArchiveProduct, ConfigureVariants, CreateProduct, Product, ProductArchived, ProductCommand,
    ProductCreated, ProductDetails, ProductEvent, ProductId, ProductStatus, ProductUpdated,
    PRODUCT_AGGREGATE_TYPE,
    RemoveVariant, UpdateProduct, UpdateVariant, VariantRemoved, VariantUpdated,
    VariantsConfigured,
};
pub use variant::{
    generate_combinations, normalize_axes, OptionAxis, Variant, VariantCombination, VariantId,
    LABEL_SEPARATOR,
};
