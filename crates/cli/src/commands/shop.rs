//! Catalog, cart and checkout commands.
//!
//! # Usage
//!
//! ```bash
//! vm-cli products --category Audio
//! vm-cli cart add 65f1c0a2
//! vm-cli cart update 65f1c0a2 2
//! vm-cli checkout --street "12 MG Road" --city Bengaluru --state Karnataka \
//!     --postal-code 560001 --payment online --payment-id pay_Nf3x8
//! ```

use clap::{Args, Subcommand};
use voltmart_admin::components::data_table::{RenderedTable, TableColumn};
use voltmart_admin::tables::format_money;
use voltmart_core::{PaymentMethod, ProductId, Quantity};
use voltmart_storefront::api::{Address, OrderConfirmation};
use voltmart_storefront::cart::{CartError, CartReconciler, EntryState};
use voltmart_storefront::catalog::{Catalog, CategoryFilter};
use voltmart_storefront::checkout::{Checkout, CollectedPayment};
use voltmart_storefront::error::Result;

use super::Context;
use crate::render;

const CATALOG_COLUMNS: &[TableColumn] = &[
    TableColumn::new("id", "ID"),
    TableColumn::new("name", "Name"),
    TableColumn::new("brand", "Brand"),
    TableColumn::new("category", "Category"),
    TableColumn::numeric("price", "Price"),
    TableColumn::new("cart", "Cart"),
];

const CART_COLUMNS: &[TableColumn] = &[
    TableColumn::new("id", "ID"),
    TableColumn::new("name", "Product"),
    TableColumn::numeric("price", "Price"),
    TableColumn::numeric("qty", "Qty"),
    TableColumn::numeric("total", "Total"),
    TableColumn::new("state", ""),
];

#[derive(Subcommand)]
pub enum CartAction {
    /// Show the cart and its total
    Show,
    /// Add one unit of a product
    Add { product_id: String },
    /// Set the quantity of a cart line (at least 1)
    Update {
        product_id: String,

        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Remove a cart line
    Remove { product_id: String },
}

#[derive(Args)]
pub struct CheckoutArgs {
    #[arg(long)]
    pub street: String,

    #[arg(long)]
    pub city: String,

    #[arg(long)]
    pub state: String,

    #[arg(long)]
    pub postal_code: String,

    /// `cod` or `online`
    #[arg(long, default_value = "cod")]
    pub payment: PaymentMethod,

    /// Id of the payment completed with the gateway
    #[arg(long, required_if_eq("payment", "online"))]
    pub payment_id: Option<String>,

    /// Buy one unit of this product instead of the cart
    #[arg(long)]
    pub product: Option<String>,
}

pub async fn products(ctx: &Context, category: &str, page: usize) -> Result<()> {
    let mut catalog = Catalog::new(ctx.api.clone());
    catalog.load().await?;
    catalog.set_filter(CategoryFilter::parse(category));
    catalog.go_to(page);

    let view = catalog.page();
    let rows = view
        .products
        .iter()
        .map(|product| {
            vec![
                product.id.to_string(),
                product.name.clone(),
                product.brand.clone(),
                product
                    .category
                    .as_ref()
                    .map_or_else(|| "-".to_string(), |category| category.label().to_string()),
                product.price.display(),
                if catalog.in_cart(product) { "Added" } else { "" }.to_string(),
            ]
        })
        .collect();

    render::table(&RenderedTable {
        columns: CATALOG_COLUMNS,
        rows,
        page: view.page,
        total_pages: view.total_pages,
        empty_message: "No products found.",
    });
    Ok(())
}

pub async fn cart(ctx: &Context, action: CartAction) -> Result<()> {
    let cart = CartReconciler::new(ctx.api.clone(), ctx.session().clone());

    match action {
        CartAction::Show => {
            cart.refresh().await?;
            render::table(&cart_table(&cart));
            if !cart.is_empty() {
                render::message(&format!("\nTotal: {}", format_money(cart.total())));
            }
        }
        CartAction::Add { product_id } => {
            cart.add_to_cart(&ProductId::new(product_id)).await?;
            render::message(&format!("Added to cart ({} items).", cart.item_count()));
        }
        CartAction::Update {
            product_id,
            quantity,
        } => {
            // Reject bad input before the refresh round trip.
            Quantity::new(quantity).map_err(CartError::from)?;
            cart.refresh().await?;
            cart.update_quantity(&ProductId::new(product_id), quantity)
                .await?;
            render::message(&format!("Cart total: {}", format_money(cart.total())));
        }
        CartAction::Remove { product_id } => {
            cart.refresh().await?;
            cart.remove_item(&ProductId::new(product_id)).await?;
            render::message(&format!("Removed. {} items left.", cart.item_count()));
        }
    }
    Ok(())
}

pub async fn checkout(ctx: &Context, args: CheckoutArgs) -> Result<()> {
    let cart = CartReconciler::new(ctx.api.clone(), ctx.session().clone());
    let checkout = match &args.product {
        Some(id) => {
            let product = ctx.api.get_product(&ProductId::new(id.as_str())).await?;
            Checkout::buy_now(ctx.api.clone(), product)
        }
        None => {
            cart.refresh().await?;
            Checkout::from_cart(ctx.api.clone(), cart.snapshot())?
        }
    };

    render::message(&format!(
        "Placing order for {} line(s), {}",
        checkout.lines().len(),
        format_money(checkout.total())
    ));

    let address = Address {
        street: args.street,
        city: args.city,
        state: args.state,
        postal_code: args.postal_code,
    };
    let confirmation = match args.payment {
        PaymentMethod::Cod => checkout.place_cod(address).await?,
        PaymentMethod::Online => {
            if ctx.config.payment_key_id.is_none() {
                tracing::warn!("VOLTMART_PAYMENT_KEY_ID is not set");
            }
            let gateway = CollectedPayment::new(args.payment_id.unwrap_or_default());
            checkout.place_online(address, &gateway).await?
        }
    };

    if args.product.is_none() {
        // The server empties the cart; keep the cached count in step
        if let Err(e) = cart.refresh().await {
            tracing::warn!(error = %e, "Could not refresh cart after checkout");
        }
    }

    print_confirmation(&confirmation);
    Ok(())
}

fn print_confirmation(confirmation: &OrderConfirmation) {
    let mut lines = vec![(
        "Result",
        confirmation
            .message
            .clone()
            .unwrap_or_else(|| "Order placed.".to_string()),
    )];
    if let Some(order) = &confirmation.order {
        lines.push(("Order", order.id.to_string()));
        lines.push(("Status", order.status.to_string()));
        lines.push(("Total", format_money(order.total_price)));
    }
    render::fields(&lines);
}

fn cart_table(cart: &CartReconciler) -> RenderedTable {
    let rows = cart
        .entries()
        .iter()
        .map(|entry| {
            vec![
                entry.product.id.to_string(),
                entry.product.name.clone(),
                entry.product.price.display(),
                entry.quantity.get().to_string(),
                format_money(entry.line_total()),
                match &entry.state {
                    EntryState::Idle => String::new(),
                    EntryState::Updating => "updating".to_string(),
                    EntryState::Error(message) => format!("error: {message}"),
                },
            ]
        })
        .collect();

    RenderedTable {
        columns: CART_COLUMNS,
        rows,
        page: 1,
        total_pages: 1,
        empty_message: "Your cart is empty.",
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use voltmart_storefront::api::ApiClient;
    use voltmart_storefront::config::StorefrontConfig;
    use voltmart_storefront::error::AppError;
    use voltmart_storefront::session::{Scope, SessionStore, keys};

    use super::*;

    /// Logged-in context whose API is unreachable, so any request fails as
    /// a transport error.
    fn offline_context() -> Context {
        let config = StorefrontConfig::for_base_url("http://127.0.0.1:9").unwrap();
        let session = SessionStore::in_memory();
        session.set(keys::USER_ID, "u-1", Scope::Persistent).unwrap();
        session.set(keys::TOKEN, "tok-u-1", Scope::Persistent).unwrap();
        let api = ApiClient::new(&config, session).unwrap();
        Context { config, api }
    }

    #[tokio::test]
    async fn test_cart_update_rejects_quantity_before_fetching() {
        let ctx = offline_context();

        for quantity in [0, -2] {
            let err = cart(
                &ctx,
                CartAction::Update {
                    product_id: "p1".to_string(),
                    quantity,
                },
            )
            .await
            .unwrap_err();
            assert!(matches!(err, AppError::Cart(CartError::InvalidQuantity(_))));
        }
    }
}
