//! Order settings, quoting and order submission.

use chrono::{NaiveDate, Utc};

use pledge_auth::{authorize, authorize_any, authorize_in_filiale, within_filiale, Permission};
use pledge_core::{AggregateId, FilialeId, UserId};
use pledge_infra::EventStore;
use pledge_sales::{
    submit_order, Cart, OfferCatalog, Order, OrderId, OrderRequest, OrderSettings, Quote,
};

use super::{guard, guard_filiale, scope, ConsoleService};
use crate::error::ServiceResult;

impl<S: EventStore> ConsoleService<S> {
    /// Settings in force for a filiale.
    pub fn order_settings(&self, caller: UserId, filiale_id: FilialeId) -> ServiceResult<OrderSettings> {
        let principal = self.principal(caller)?;
        guard(
            &principal,
            "order_settings",
            authorize_any(
                &principal,
                &[Permission::SETTINGS_MANAGE, Permission::ORDERS_PLACE],
            ),
        )?;
        guard(&principal, "order_settings", within_filiale(&principal, filiale_id))?;
        self.settings_for(Some(filiale_id))
    }

    pub fn update_order_settings(
        &self,
        caller: UserId,
        filiale_id: FilialeId,
        settings: OrderSettings,
    ) -> ServiceResult<()> {
        let principal = self.principal(caller)?;
        guard(
            &principal,
            "update_order_settings",
            authorize_in_filiale(&principal, &Permission::SETTINGS_MANAGE, filiale_id),
        )?;
        self.repos.filiales.get(filiale_id)?;
        settings.validate()?;

        self.write_settings()?.insert(filiale_id, settings);
        tracing::info!(
            %filiale_id,
            min_qty = settings.min_qty_per_order,
            max_qty = settings.max_qty_per_order,
            min_order_price = %settings.min_order_price,
            "order settings updated"
        );
        Ok(())
    }

    /// Price a cart with the caller's catalog, offers and delivery rule.
    pub fn quote_cart(&self, caller: UserId, cart: &Cart) -> ServiceResult<Quote> {
        let principal = self.principal(caller)?;
        guard(&principal, "quote_cart", authorize(&principal, &Permission::ORDERS_PLACE))?;
        let products = self.catalog_for(&principal)?;
        let offers = self.price_list(principal.filiale_id)?;
        let settings = self.settings_for(principal.filiale_id)?;

        let catalog = OfferCatalog {
            products: &products,
            offers: &offers,
        };
        Ok(cart.quote(&catalog, &settings.delivery)?)
    }

    pub fn submit_order(
        &self,
        caller: UserId,
        cart: &Cart,
        delivery_date: Option<NaiveDate>,
        notes: &str,
    ) -> ServiceResult<Order> {
        let principal = self.principal(caller)?;
        guard(&principal, "submit_order", authorize(&principal, &Permission::ORDERS_PLACE))?;
        let filiale_id = guard_filiale(&principal, "submit_order")?;
        let products = self.catalog_for(&principal)?;
        let offers = self.price_list(Some(filiale_id))?;
        let settings = self.settings_for(Some(filiale_id))?;

        let order = submit_order(
            OrderRequest {
                order_id: OrderId::new(AggregateId::new()),
                placed_by: principal.user_id,
                filiale_id,
                cart,
                delivery_date,
                notes: notes.to_string(),
                submitted_at: Utc::now(),
            },
            &OfferCatalog {
                products: &products,
                offers: &offers,
            },
            &settings,
        )?;
        self.repos.orders.insert(order.clone())?;
        tracing::info!(
            order_id = %order.id,
            placed_by = %order.placed_by,
            %filiale_id,
            total = %order.total,
            "order submitted"
        );
        Ok(order)
    }

    /// Orders of the caller's filiale for order managers, otherwise the
    /// caller's own orders.
    pub fn list_orders(&self, caller: UserId) -> ServiceResult<Vec<Order>> {
        let principal = self.principal(caller)?;
        let orders = self.repos.orders.list()?;
        if authorize(&principal, &Permission::ORDERS_MANAGE).is_ok() {
            let scope = scope(&principal)?;
            return Ok(orders
                .into_iter()
                .filter(|o| scope.is_none_or(|own| o.filiale_id == own))
                .collect());
        }

        guard(&principal, "list_orders", authorize(&principal, &Permission::ORDERS_PLACE))?;
        Ok(orders
            .into_iter()
            .filter(|o| o.placed_by == principal.user_id)
            .collect())
    }

    fn settings_for(&self, filiale_id: Option<FilialeId>) -> ServiceResult<OrderSettings> {
        let settings = self.read_settings()?;
        Ok(filiale_id
            .and_then(|id| settings.get(&id))
            .copied()
            .unwrap_or(self.default_settings))
    }
}
