use anyhow::Context;
use chrono::{Duration, Utc};

use pledge_console::demo;
use pledge_console::ConsoleService;
use pledge_infra::AppConfig;
use pledge_products::VariantId;
use pledge_sales::Cart;

fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("failed to load configuration")?;
    pledge_observability::init(config.log_format);

    let service = ConsoleService::in_memory(config.order_settings);
    let data = demo::seed(&service).context("failed to seed demo data")?;
    let shop = data.shop.id;

    let mut cart = Cart::new();
    cart.add(data.bottle_13kg.id_typed(), VariantId(1), 2)?;
    cart.add(data.bottle_13kg.id_typed(), VariantId(2), 3)?;
    cart.add(data.bottle_6kg.id_typed(), VariantId(3), 2)?;

    let settings = service.order_settings(shop, data.filiale.id)?;
    let quote = service.quote_cart(shop, &cart)?;
    tracing::info!(
        lines = quote.lines.len(),
        subtotal = %quote.totals.subtotal,
        delivery_fee = %quote.totals.delivery_fee,
        total = %quote.totals.total,
        to_free_delivery = %quote.totals.amount_to_free_delivery(&settings.delivery),
        "cart quoted"
    );

    let delivery_date = Utc::now().date_naive() + Duration::days(1);
    match service.submit_order(shop, &cart, Some(delivery_date), "Livraison le matin") {
        Ok(order) => tracing::info!(order_id = %order.id, total = %order.total, "demo order placed"),
        Err(err) => tracing::warn!(error = %err, field = err.field(), "demo order rejected"),
    }

    println!("{}", serde_json::to_string_pretty(&quote)?);
    Ok(())
}
