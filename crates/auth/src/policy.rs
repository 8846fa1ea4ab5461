//! Role → permission mapping.

use crate::{Permission, Role};

/// Permissions granted to a role.
pub fn permissions_for(role: Role) -> Vec<Permission> {
    match role {
        Role::Admin => vec![Permission::WILDCARD],
        Role::CountryManager => vec![
            Permission::REGIONS_MANAGE,
            Permission::USERS_MANAGE,
            Permission::DISTRIBUTORS_MANAGE,
            Permission::SHOPS_MANAGE,
            Permission::PRODUCTS_READ,
            Permission::PRODUCTS_MANAGE,
            Permission::SETTINGS_MANAGE,
        ],
        Role::Commercial => vec![
            Permission::DISTRIBUTORS_MANAGE,
            Permission::SHOPS_MANAGE,
            Permission::PRODUCTS_READ,
        ],
        Role::Distributor => vec![
            Permission::PRODUCTS_READ,
            Permission::ORDERS_MANAGE,
            Permission::TRUCKS_MANAGE,
            Permission::LIVREURS_MANAGE,
            Permission::OFFERS_MANAGE,
            Permission::SETTINGS_MANAGE,
        ],
        Role::Shop => vec![Permission::PRODUCTS_READ, Permission::ORDERS_PLACE],
    }
}

/// Roles whose accounts a user with `role` may list and manage.
///
/// Admins manage the top of the hierarchy only (admins and country managers);
/// country managers manage the roles below them.
pub fn manageable_roles(role: Role) -> &'static [Role] {
    match role {
        Role::Admin => &[Role::Admin, Role::CountryManager],
        Role::CountryManager => &[Role::Commercial, Role::Distributor, Role::Shop],
        Role::Commercial => &[Role::Distributor, Role::Shop],
        Role::Distributor | Role::Shop => &[],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_holds_the_wildcard() {
        assert!(permissions_for(Role::Admin).iter().any(Permission::is_wildcard));
    }

    #[test]
    fn only_admin_manages_filiales() {
        for role in Role::ALL {
            let has = permissions_for(role)
                .iter()
                .any(|p| p.is_wildcard() || *p == Permission::FILIALES_MANAGE);
            assert_eq!(has, role == Role::Admin, "{role}");
        }
    }

    #[test]
    fn shops_can_order_but_not_manage_products() {
        let perms = permissions_for(Role::Shop);
        assert!(perms.contains(&Permission::ORDERS_PLACE));
        assert!(!perms.contains(&Permission::PRODUCTS_MANAGE));
    }

    #[test]
    fn fleet_and_offers_belong_to_distributors() {
        let perms = permissions_for(Role::Distributor);
        for p in [
            Permission::TRUCKS_MANAGE,
            Permission::LIVREURS_MANAGE,
            Permission::OFFERS_MANAGE,
        ] {
            assert!(perms.contains(&p), "{p}");
            assert!(!permissions_for(Role::CountryManager).contains(&p), "{p}");
        }
    }

    #[test]
    fn admins_manage_admins_and_country_managers_only() {
        assert_eq!(manageable_roles(Role::Admin), [Role::Admin, Role::CountryManager]);
        assert!(manageable_roles(Role::Shop).is_empty());
    }
}
