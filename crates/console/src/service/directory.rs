//! Filiales, regions, console accounts and shop records.

use pledge_auth::{
    authorize, authorize_any, authorize_in_filiale, manageable_roles, within_filiale, AuthzError,
    Permission, Principal, Role,
};
use pledge_core::{DomainError, FilialeId, RegionId, ShopId, UserId};
use pledge_directory::{
    Filiale, FilialeFilter, Filter, NewShop, NewUser, Region, RegionFilter, Shop, ShopFilter,
    User, UserFilter,
};
use pledge_infra::EventStore;

use super::{deny, guard, scope, today, unique, ConsoleService};
use crate::error::ServiceResult;

fn same_email(a: &User, b: &User) -> bool {
    a.email == b.email
}

fn same_code(a: &Shop, b: &Shop) -> bool {
    a.same_code(b)
}

impl<S: EventStore> ConsoleService<S> {
    pub fn create_filiale(&self, caller: UserId, name: &str, country: &str) -> ServiceResult<Filiale> {
        let principal = self.principal(caller)?;
        guard(&principal, "create_filiale", authorize(&principal, &Permission::FILIALES_MANAGE))?;

        let filiale = Filiale::new(FilialeId::new(), name, country, today())?;
        self.repos.filiales.insert(filiale.clone())?;
        tracing::info!(filiale_id = %filiale.id, name = %filiale.name, "filiale created");
        Ok(filiale)
    }

    /// Rename a filiale. Its regions pick up the new name.
    pub fn update_filiale(
        &self,
        caller: UserId,
        filiale_id: FilialeId,
        name: &str,
        country: &str,
    ) -> ServiceResult<Filiale> {
        let principal = self.principal(caller)?;
        guard(&principal, "update_filiale", authorize(&principal, &Permission::FILIALES_MANAGE))?;

        let mut filiale = self.repos.filiales.get(filiale_id)?;
        filiale.rename(name, country)?;
        self.repos.filiales.update(filiale.clone())?;

        for mut region in self.repos.regions.list()? {
            if region.filiale_id == filiale_id {
                let name = region.name.clone();
                region.update(&name, &filiale)?;
                self.repos.regions.update(region)?;
            }
        }
        tracing::info!(%filiale_id, name = %filiale.name, "filiale updated");
        Ok(filiale)
    }

    /// Delete a filiale that no longer owns any record.
    pub fn delete_filiale(&self, caller: UserId, filiale_id: FilialeId) -> ServiceResult<()> {
        let principal = self.principal(caller)?;
        guard(&principal, "delete_filiale", authorize(&principal, &Permission::FILIALES_MANAGE))?;

        let filiale = self.repos.filiales.get(filiale_id)?;
        let in_use = self.repos.regions.list()?.iter().any(|r| r.filiale_id == filiale_id)
            || self.repos.users.list()?.iter().any(|u| u.filiale_id == Some(filiale_id))
            || self.repos.shops.list()?.iter().any(|s| s.filiale_id == filiale_id)
            || self.repos.livreurs.list()?.iter().any(|l| l.filiale_id == filiale_id)
            || self.repos.trucks.list()?.iter().any(|t| t.filiale_id == filiale_id)
            || self.repos.orders.list()?.iter().any(|o| o.filiale_id == filiale_id)
            || !self.products.list_for_filiale(filiale_id)?.is_empty();
        if in_use {
            return Err(DomainError::conflict(format!(
                "filiale '{}' still has dependent records",
                filiale.name
            ))
            .into());
        }

        self.repos.filiales.delete(filiale_id)?;
        self.write_settings()?.remove(&filiale_id);
        self.write_offers()?.remove(&filiale_id);
        tracing::info!(%filiale_id, "filiale deleted");
        Ok(())
    }

    pub fn list_filiales(&self, caller: UserId, filter: &FilialeFilter) -> ServiceResult<Vec<Filiale>> {
        let principal = self.principal(caller)?;
        guard(
            &principal,
            "list_filiales",
            authorize_any(
                &principal,
                &[Permission::FILIALES_MANAGE, Permission::REGIONS_MANAGE],
            ),
        )?;
        let scope = scope(&principal)?;
        Ok(filter
            .apply(self.repos.filiales.list()?)
            .into_iter()
            .filter(|f| scope.is_none_or(|own| f.id == own))
            .collect())
    }

    pub fn create_region(&self, caller: UserId, name: &str, filiale_id: FilialeId) -> ServiceResult<Region> {
        let principal = self.principal(caller)?;
        guard(
            &principal,
            "create_region",
            authorize_in_filiale(&principal, &Permission::REGIONS_MANAGE, filiale_id),
        )?;

        let filiale = self.repos.filiales.get(filiale_id)?;
        let region = Region::new(RegionId::new(), name, &filiale, today())?;
        self.repos.regions.insert(region.clone())?;
        tracing::info!(region_id = %region.id, %filiale_id, "region created");
        Ok(region)
    }

    /// Rename a region or move it to another filiale. Both filiales must be
    /// within the caller's reach.
    pub fn update_region(
        &self,
        caller: UserId,
        region_id: RegionId,
        name: &str,
        filiale_id: FilialeId,
    ) -> ServiceResult<Region> {
        let principal = self.principal(caller)?;
        let mut region = self.repos.regions.get(region_id)?;
        for target in [region.filiale_id, filiale_id] {
            guard(
                &principal,
                "update_region",
                authorize_in_filiale(&principal, &Permission::REGIONS_MANAGE, target),
            )?;
        }

        let filiale = self.repos.filiales.get(filiale_id)?;
        region.update(name, &filiale)?;
        self.repos.regions.update(region.clone())?;
        tracing::info!(%region_id, %filiale_id, "region updated");
        Ok(region)
    }

    pub fn delete_region(&self, caller: UserId, region_id: RegionId) -> ServiceResult<()> {
        let principal = self.principal(caller)?;
        let region = self.repos.regions.get(region_id)?;
        guard(
            &principal,
            "delete_region",
            authorize_in_filiale(&principal, &Permission::REGIONS_MANAGE, region.filiale_id),
        )?;
        self.repos.regions.delete(region_id)?;
        tracing::info!(%region_id, "region deleted");
        Ok(())
    }

    pub fn list_regions(&self, caller: UserId, filter: &RegionFilter) -> ServiceResult<Vec<Region>> {
        let principal = self.principal(caller)?;
        guard(&principal, "list_regions", authorize(&principal, &Permission::REGIONS_MANAGE))?;
        let scope = scope(&principal)?;
        Ok(filter
            .apply(self.repos.regions.list()?)
            .into_iter()
            .filter(|r| scope.is_none_or(|own| r.filiale_id == own))
            .collect())
    }

    /// Create an account. Callers may only create accounts of the roles they
    /// manage, inside their own filiale. Emails are unique.
    pub fn create_user(&self, caller: UserId, input: NewUser) -> ServiceResult<User> {
        let principal = self.principal(caller)?;
        check_account(&principal, "create_user", input.role, input.filiale_id)?;
        if let Some(filiale_id) = input.filiale_id {
            self.repos.filiales.get(filiale_id)?;
        }

        let user = User::new(UserId::new(), input, today())?;
        unique(self.repos.users.insert_unique(user.clone(), &same_email), || {
            format!("email '{}' is already registered", user.email)
        })?;
        tracing::info!(user_id = %user.id, role = %user.role, "user created");
        Ok(user)
    }

    /// Edit an account. The caller must manage both its current and its new
    /// role and filiale.
    pub fn update_user(&self, caller: UserId, user_id: UserId, input: NewUser) -> ServiceResult<User> {
        let principal = self.principal(caller)?;
        let mut user = self.repos.users.get(user_id)?;
        check_account(&principal, "update_user", user.role, user.filiale_id)?;
        check_account(&principal, "update_user", input.role, input.filiale_id)?;
        if let Some(filiale_id) = input.filiale_id {
            self.repos.filiales.get(filiale_id)?;
        }

        user.update(input)?;
        unique(self.repos.users.update_unique(user.clone(), &same_email), || {
            format!("email '{}' is already registered", user.email)
        })?;
        tracing::info!(%user_id, role = %user.role, active = user.is_active, "user updated");
        Ok(user)
    }

    pub fn delete_user(&self, caller: UserId, user_id: UserId) -> ServiceResult<()> {
        let principal = self.principal(caller)?;
        if user_id == principal.user_id {
            return Err(DomainError::conflict("an account cannot delete itself").into());
        }
        let user = self.repos.users.get(user_id)?;
        check_account(&principal, "delete_user", user.role, user.filiale_id)?;
        self.repos.users.delete(user_id)?;
        tracing::info!(%user_id, role = %user.role, "user deleted");
        Ok(())
    }

    /// Accounts the caller may manage, narrowed by `filter`.
    pub fn list_users(&self, caller: UserId, filter: UserFilter) -> ServiceResult<Vec<User>> {
        let principal = self.principal(caller)?;
        guard(
            &principal,
            "list_users",
            authorize_any(
                &principal,
                &[
                    Permission::USERS_MANAGE,
                    Permission::DISTRIBUTORS_MANAGE,
                    Permission::SHOPS_MANAGE,
                ],
            ),
        )?;
        let scope = scope(&principal)?;
        let filter = filter.restricted_to(manageable_roles(principal.role));
        Ok(filter
            .apply(self.repos.users.list()?)
            .into_iter()
            .filter(|u| scope.is_none_or(|own| u.filiale_id == Some(own)))
            .collect())
    }

    /// Register a shop. Shop codes are unique, ignoring case.
    pub fn create_shop(&self, caller: UserId, input: NewShop) -> ServiceResult<Shop> {
        let principal = self.principal(caller)?;
        guard(
            &principal,
            "create_shop",
            authorize_in_filiale(&principal, &Permission::SHOPS_MANAGE, input.filiale_id),
        )?;
        self.repos.filiales.get(input.filiale_id)?;

        let shop = Shop::new(ShopId::new(), input, today())?;
        unique(self.repos.shops.insert_unique(shop.clone(), &same_code), || {
            format!("shop code '{}' is already in use", shop.code)
        })?;
        tracing::info!(shop_id = %shop.id, code = %shop.code, "shop registered");
        Ok(shop)
    }

    pub fn update_shop(&self, caller: UserId, shop_id: ShopId, input: NewShop) -> ServiceResult<Shop> {
        let principal = self.principal(caller)?;
        let mut shop = self.repos.shops.get(shop_id)?;
        for target in [shop.filiale_id, input.filiale_id] {
            guard(
                &principal,
                "update_shop",
                authorize_in_filiale(&principal, &Permission::SHOPS_MANAGE, target),
            )?;
        }
        self.repos.filiales.get(input.filiale_id)?;

        shop.update(input)?;
        unique(self.repos.shops.update_unique(shop.clone(), &same_code), || {
            format!("shop code '{}' is already in use", shop.code)
        })?;
        tracing::info!(%shop_id, "shop updated");
        Ok(shop)
    }

    pub fn delete_shop(&self, caller: UserId, shop_id: ShopId) -> ServiceResult<()> {
        let principal = self.principal(caller)?;
        let shop = self.repos.shops.get(shop_id)?;
        guard(
            &principal,
            "delete_shop",
            authorize_in_filiale(&principal, &Permission::SHOPS_MANAGE, shop.filiale_id),
        )?;
        self.repos.shops.delete(shop_id)?;
        tracing::info!(%shop_id, "shop deleted");
        Ok(())
    }

    pub fn list_shops(&self, caller: UserId, filter: &ShopFilter) -> ServiceResult<Vec<Shop>> {
        let principal = self.principal(caller)?;
        guard(&principal, "list_shops", authorize(&principal, &Permission::SHOPS_MANAGE))?;
        let scope = scope(&principal)?;
        Ok(filter
            .apply(self.repos.shops.list()?)
            .into_iter()
            .filter(|s| scope.is_none_or(|own| s.filiale_id == own))
            .collect())
    }
}

/// The caller may manage accounts of `role` in `filiale_id`.
fn check_account(
    principal: &Principal,
    action: &'static str,
    role: Role,
    filiale_id: Option<FilialeId>,
) -> ServiceResult<()> {
    guard(principal, action, authorize(principal, &account_permission(role)))?;
    if !manageable_roles(principal.role).contains(&role) {
        return Err(deny(
            principal,
            action,
            AuthzError::Forbidden(format!("manage {role} accounts")),
        ));
    }
    match filiale_id {
        Some(filiale_id) => guard(principal, action, within_filiale(principal, filiale_id)),
        None => Ok(()),
    }
}

fn account_permission(role: Role) -> Permission {
    match role {
        Role::Distributor => Permission::DISTRIBUTORS_MANAGE,
        Role::Shop => Permission::SHOPS_MANAGE,
        Role::Admin | Role::CountryManager | Role::Commercial => Permission::USERS_MANAGE,
    }
}
