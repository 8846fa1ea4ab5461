use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Permission identifier.
///
/// Permissions are opaque strings (e.g. "products.manage"). The wildcard `"*"`
/// grants everything.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permission(Cow<'static, str>);

impl Permission {
    pub const WILDCARD: Permission = Permission::from_static("*");

    pub const FILIALES_MANAGE: Permission = Permission::from_static("filiales.manage");
    pub const REGIONS_MANAGE: Permission = Permission::from_static("regions.manage");
    pub const USERS_MANAGE: Permission = Permission::from_static("users.manage");
    pub const PRODUCTS_READ: Permission = Permission::from_static("products.read");
    pub const PRODUCTS_MANAGE: Permission = Permission::from_static("products.manage");
    pub const SETTINGS_MANAGE: Permission = Permission::from_static("settings.manage");
    pub const DISTRIBUTORS_MANAGE: Permission = Permission::from_static("distributors.manage");
    pub const SHOPS_MANAGE: Permission = Permission::from_static("shops.manage");
    pub const ORDERS_PLACE: Permission = Permission::from_static("orders.place");
    pub const ORDERS_MANAGE: Permission = Permission::from_static("orders.manage");
    pub const TRUCKS_MANAGE: Permission = Permission::from_static("trucks.manage");
    pub const LIVREURS_MANAGE: Permission = Permission::from_static("livreurs.manage");
    pub const OFFERS_MANAGE: Permission = Permission::from_static("offers.manage");

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_wildcard(&self) -> bool {
        self.as_str() == "*"
    }
}

impl core::fmt::Display for Permission {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}
