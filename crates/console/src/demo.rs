//! Demo data: one filiale with a country manager, a distributor, a shop
//! account and two gas bottle products.

use pledge_auth::Role;
use pledge_core::{FilialeId, Money};
use pledge_directory::{Filiale, NewUser, User};
use pledge_infra::EventStore;
use pledge_products::{OptionAxis, Product, ProductDetails, VariantId};

use crate::error::ServiceResult;
use crate::service::{ConsoleService, VariantEdit};

pub struct DemoData {
    pub admin: User,
    pub filiale: Filiale,
    pub manager: User,
    pub distributor: User,
    pub shop: User,
    pub bottle_13kg: Product,
    pub bottle_6kg: Product,
}

fn input(fullname: &str, email: &str, role: Role, filiale_id: FilialeId) -> NewUser {
    NewUser {
        fullname: fullname.to_string(),
        email: email.to_string(),
        role,
        filiale_id: Some(filiale_id),
        is_active: true,
    }
}

pub fn seed<S: EventStore>(service: &ConsoleService<S>) -> ServiceResult<DemoData> {
    let admin = service.bootstrap_admin(NewUser {
        fullname: "Amina Diallo".to_string(),
        email: "admin@pledge.com".to_string(),
        role: Role::Admin,
        filiale_id: None,
        is_active: true,
    })?;

    let filiale = service.create_filiale(admin.id, "Pledge West Africa", "Nigeria")?;
    service.create_region(admin.id, "Lagos Region", filiale.id)?;
    service.create_region(admin.id, "Abuja Region", filiale.id)?;

    let manager = service.create_user(
        admin.id,
        input("Samuel Okoro", "samuel.okoro@pledge.com", Role::CountryManager, filiale.id),
    )?;
    let distributor = service.create_user(
        manager.id,
        input("Lagos Gas Depot", "depot@lagosgas.ng", Role::Distributor, filiale.id),
    )?;
    let shop = service.create_user(
        manager.id,
        input("Gaz Express Ikeja", "ikeja@gazexpress.ng", Role::Shop, filiale.id),
    )?;

    let bottle_13kg = service.create_product(
        manager.id,
        filiale.id,
        ProductDetails {
            name: "Bouteille Gaz 13kg".to_string(),
            description: "Butane, usage domestique".to_string(),
            min_order_qty: 1,
            default_price: Money::from_cents(2599),
        },
    )?;
    let bottle_13kg = service.configure_variants(
        manager.id,
        bottle_13kg.id_typed(),
        vec![OptionAxis::new("Type", ["Standard", "Premium"])],
    )?;
    let bottle_13kg = service.update_variant(
        manager.id,
        bottle_13kg.id_typed(),
        VariantEdit {
            variant_id: VariantId(2),
            sku: "BG13-PRM".to_string(),
            price: Some(Money::from_cents(2899)),
            enabled: true,
        },
    )?;

    let bottle_6kg = service.create_product(
        manager.id,
        filiale.id,
        ProductDetails {
            name: "Bouteille Gaz 6kg".to_string(),
            description: "Propane".to_string(),
            min_order_qty: 2,
            default_price: Money::from_major(15),
        },
    )?;
    let bottle_6kg = service.configure_variants(
        manager.id,
        bottle_6kg.id_typed(),
        vec![
            OptionAxis::new("Color", ["Red", "Blue"]),
            OptionAxis::new("Size", ["L", "XL"]),
        ],
    )?;

    Ok(DemoData {
        admin,
        filiale,
        manager,
        distributor,
        shop,
        bottle_13kg,
        bottle_6kg,
    })
}
