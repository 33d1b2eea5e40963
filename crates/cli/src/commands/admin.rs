//! Admin console commands.
//!
//! # Usage
//!
//! ```bash
//! vm-cli admin dashboard
//! vm-cli admin products list --page 2
//! vm-cli admin products create --name "USB-C hub" --description "7-in-1 aluminium hub" \
//!     --price 2499 --category 64f0a1 --brand Voltmart --image hub.png
//! vm-cli admin categories edit 64f0a1 --name Audio --description "Headphones and speakers"
//! vm-cli admin orders status 66a0be11 shipped
//! vm-cli admin users edit 65aa01 --mobile 9812345678
//! ```
//!
//! Every mutation reloads or updates its table and prints the current page.

use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use voltmart_admin::tables::users::UserEditForm;
use voltmart_admin::tables::{format_date, format_money};
use voltmart_admin::{AdminTable, CategoryTable, OrderTable, ProductTable, UserTable, dashboard};
use voltmart_core::validation::FieldErrors;
use voltmart_core::{CategoryId, OrderId, OrderStatus, ProductId, UserId};
use voltmart_storefront::api::{CategoryRef, ImageUpload, Product, ProductDraft};
use voltmart_storefront::error::Result;

use super::Context;
use crate::render;

#[derive(Subcommand)]
pub enum AdminSection {
    /// Totals and the most recent orders
    Dashboard,
    /// Manage products
    Products {
        #[command(subcommand)]
        action: ProductAction,
    },
    /// Manage categories
    Categories {
        #[command(subcommand)]
        action: CategoryAction,
    },
    /// Manage orders
    Orders {
        #[command(subcommand)]
        action: OrderAction,
    },
    /// Manage users
    Users {
        #[command(subcommand)]
        action: UserAction,
    },
}

#[derive(Subcommand)]
pub enum ProductAction {
    /// List products, five per page
    List {
        #[arg(short, long, default_value_t = 1)]
        page: usize,
    },
    /// Create a product
    Create(ProductArgs),
    /// Edit a product; omitted fields keep their current value
    Edit {
        id: String,

        #[command(flatten)]
        fields: ProductEditArgs,
    },
    /// Delete a product
    Delete { id: String },
}

#[derive(Args)]
pub struct ProductArgs {
    #[arg(long)]
    pub name: String,

    #[arg(long)]
    pub description: String,

    #[arg(long)]
    pub price: String,

    /// Category id
    #[arg(long)]
    pub category: String,

    #[arg(long)]
    pub brand: String,

    /// Image file to upload
    #[arg(long)]
    pub image: Option<PathBuf>,
}

#[derive(Args)]
pub struct ProductEditArgs {
    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub description: Option<String>,

    #[arg(long)]
    pub price: Option<String>,

    /// Category id
    #[arg(long)]
    pub category: Option<String>,

    #[arg(long)]
    pub brand: Option<String>,

    /// Replacement image file
    #[arg(long)]
    pub image: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum CategoryAction {
    /// List categories, five per page
    List {
        #[arg(short, long, default_value_t = 1)]
        page: usize,
    },
    /// Show one category
    Show { id: String },
    /// Create a category
    Create {
        #[arg(long)]
        name: String,

        #[arg(long)]
        description: String,
    },
    /// Rename or redescribe a category
    Edit {
        id: String,

        #[arg(long)]
        name: String,

        #[arg(long)]
        description: String,
    },
    /// Delete a category
    Delete { id: String },
}

#[derive(Subcommand)]
pub enum OrderAction {
    /// List orders, five per page
    List {
        #[arg(short, long, default_value_t = 1)]
        page: usize,
    },
    /// Show one order in full
    Details { id: String },
    /// Move an order to a new status
    Status {
        id: String,

        /// `pending`, `processing`, `shipped`, `delivered` or `cancelled`
        status: OrderStatus,
    },
    /// Cancel an order
    Cancel { id: String },
}

#[derive(Subcommand)]
pub enum UserAction {
    /// List users, five per page
    List {
        #[arg(short, long, default_value_t = 1)]
        page: usize,
    },
    /// Edit a user; omitted fields keep their current value
    Edit {
        id: String,

        #[arg(long)]
        name: Option<String>,

        /// Exactly ten digits
        #[arg(long)]
        mobile: Option<String>,

        #[arg(long)]
        gender: Option<String>,
    },
    /// Delete a user
    Delete { id: String },
}

pub async fn run(ctx: &Context, section: AdminSection) -> Result<()> {
    match section {
        AdminSection::Dashboard => show_dashboard(ctx).await,
        AdminSection::Products { action } => products(ctx, action).await,
        AdminSection::Categories { action } => categories(ctx, action).await,
        AdminSection::Orders { action } => orders(ctx, action).await,
        AdminSection::Users { action } => users(ctx, action).await,
    }
}

async fn show_dashboard(ctx: &Context) -> Result<()> {
    let stats = dashboard::load(&ctx.api).await?;
    render::fields(&[
        ("Users", stats.total_users.to_string()),
        ("Orders", stats.total_orders.to_string()),
        ("Products", stats.total_products.to_string()),
        ("Pending orders", stats.pending_orders.to_string()),
    ]);
    render::message("\nRecent orders");
    render::table(&dashboard::recent_orders_table(&stats));
    Ok(())
}

async fn products(ctx: &Context, action: ProductAction) -> Result<()> {
    let mut table = ProductTable::new(ctx.api.clone());
    table.load().await?;

    let message = match action {
        ProductAction::List { page } => {
            table.go_to(page);
            None
        }
        ProductAction::Create(args) => {
            let draft = ProductDraft {
                name: args.name,
                description: args.description,
                price: args.price,
                category: args.category,
                brand: args.brand,
                image: read_image(args.image.as_deref()).await?,
            };
            Some(table.create(draft).await?)
        }
        ProductAction::Edit { id, fields } => {
            let id = ProductId::new(id);
            let current = table.get(&id)?;
            let draft = edited_draft(current, fields).await?;
            Some(table.edit(&id, draft).await?)
        }
        ProductAction::Delete { id } => Some(table.delete(&ProductId::new(id)).await?),
    };

    if let Some(message) = message {
        render::server_message(message, "Done.");
    }
    render::table(&table.render());
    Ok(())
}

async fn categories(ctx: &Context, action: CategoryAction) -> Result<()> {
    let mut table = CategoryTable::new(ctx.api.clone());

    if let CategoryAction::Show { id } = &action {
        let category = table.get(&CategoryId::new(id.as_str())).await?;
        render::fields(&[
            ("Id", category.id.to_string()),
            ("Name", category.name),
            ("Description", category.description),
        ]);
        return Ok(());
    }

    table.load().await?;
    let message = match action {
        CategoryAction::List { page } => {
            table.go_to(page);
            None
        }
        CategoryAction::Show { .. } => None,
        CategoryAction::Create { name, description } => Some(table.create(&name, &description).await?),
        CategoryAction::Edit {
            id,
            name,
            description,
        } => Some(table.edit(&CategoryId::new(id), &name, &description).await?),
        CategoryAction::Delete { id } => Some(table.delete(&CategoryId::new(id)).await?),
    };

    if let Some(message) = message {
        render::server_message(message, "Done.");
    }
    render::table(&table.render());
    Ok(())
}

async fn orders(ctx: &Context, action: OrderAction) -> Result<()> {
    let mut table = OrderTable::new(ctx.api.clone());
    table.load().await?;

    let message = match action {
        OrderAction::List { page } => {
            table.go_to(page);
            None
        }
        OrderAction::Details { id } => {
            let order = table.details(&OrderId::new(id))?;
            let items = order
                .items
                .iter()
                .map(|item| {
                    format!(
                        "{} x{}",
                        item.product_name.as_deref().unwrap_or("(removed product)"),
                        item.quantity.get()
                    )
                })
                .collect::<Vec<_>>()
                .join(", ");
            render::fields(&[
                ("Order", order.id.to_string()),
                (
                    "Customer",
                    order
                        .customer
                        .as_ref()
                        .and_then(|customer| customer.name.clone())
                        .unwrap_or_else(|| "Unknown".to_string()),
                ),
                ("Items", items),
                ("Total", format_money(order.total_price)),
                (
                    "Address",
                    order
                        .address
                        .as_ref()
                        .map_or_else(|| "-".to_string(), ToString::to_string),
                ),
                ("Payment", order.payment_method.to_string()),
                (
                    "Payment id",
                    order
                        .payment_info
                        .as_ref()
                        .map_or_else(|| "-".to_string(), |info| info.payment_id.clone()),
                ),
                ("Status", order.status.to_string()),
                ("Placed", format_date(order.created_at)),
            ]);
            return Ok(());
        }
        OrderAction::Status { id, status } => Some(table.update_status(&OrderId::new(id), status).await?),
        OrderAction::Cancel { id } => Some(table.cancel(&OrderId::new(id)).await?),
    };

    if let Some(message) = message {
        render::server_message(message, "Done.");
    }
    render::table(&table.render());
    Ok(())
}

async fn users(ctx: &Context, action: UserAction) -> Result<()> {
    let mut table = UserTable::new(ctx.api.clone());
    table.load().await?;

    let message = match action {
        UserAction::List { page } => {
            table.go_to(page);
            None
        }
        UserAction::Edit {
            id,
            name,
            mobile,
            gender,
        } => {
            let id = UserId::new(id);
            let current = table
                .table()
                .find(|user| user.id == id)
                .map(UserEditForm::from)
                .unwrap_or_default();
            let form = UserEditForm {
                name: name.unwrap_or(current.name),
                mobile: mobile.unwrap_or(current.mobile),
                gender: gender.unwrap_or(current.gender),
            };
            Some(table.edit(&id, &form).await?)
        }
        UserAction::Delete { id } => Some(table.delete(&UserId::new(id)).await?),
    };

    if let Some(message) = message {
        render::server_message(message, "Done.");
    }
    render::table(&table.render());
    Ok(())
}

async fn edited_draft(current: &Product, fields: ProductEditArgs) -> Result<ProductDraft> {
    let category = current.category.as_ref().map(|category| match category {
        CategoryRef::Ref(raw) => raw.clone(),
        CategoryRef::Named { id, .. } => id.to_string(),
    });
    Ok(ProductDraft {
        name: fields.name.unwrap_or_else(|| current.name.clone()),
        description: fields
            .description
            .unwrap_or_else(|| current.description.clone()),
        price: fields
            .price
            .unwrap_or_else(|| current.price.amount().to_string()),
        category: fields.category.or(category).unwrap_or_default(),
        brand: fields.brand.unwrap_or_else(|| current.brand.clone()),
        image: read_image(fields.image.as_deref()).await?,
    })
}

/// Load an image for upload. An unreadable file is reported against the
/// image field.
async fn read_image(path: Option<&Path>) -> Result<Option<ImageUpload>> {
    let Some(path) = path else {
        return Ok(None);
    };

    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) => {
            let mut errors = FieldErrors::new();
            errors.record(
                "product_image",
                Some(format!("Cannot read {}: {e}", path.display())),
            );
            return Err(errors.into());
        }
    };

    let file_name = path
        .file_name()
        .map_or_else(|| "image".to_string(), |name| name.to_string_lossy().into_owned());
    Ok(Some(ImageUpload {
        mime_type: mime_type(path).to_string(),
        file_name,
        bytes,
    }))
}

fn mime_type(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_mime_type() {
        assert_eq!(mime_type(Path::new("hub.PNG")), "image/png");
        assert_eq!(mime_type(Path::new("a/b/photo.jpeg")), "image/jpeg");
        assert_eq!(mime_type(Path::new("README")), "application/octet-stream");
    }

    #[tokio::test]
    async fn test_unreadable_image_is_a_field_error() {
        let err = read_image(Some(Path::new("/nonexistent/voltmart/hub.png")))
            .await
            .unwrap_err();
        assert!(err.field_errors().is_some_and(|errors| errors.get("product_image").is_some()));
    }
}
