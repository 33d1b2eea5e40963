//! Login, registration, profile and order history commands.
//!
//! # Usage
//!
//! ```bash
//! vm-cli register -n "Asha Verma" -e asha@voltmart.in -m 9876543210 -p 'hunter2!' -g female
//! vm-cli login -e asha@voltmart.in -p 'hunter2!'
//! vm-cli profile update --phone +919812345678
//! vm-cli orders cancel 66a0be11
//! ```

use clap::{Args, Subcommand};
use voltmart_admin::components::data_table::{RenderedTable, TableColumn};
use voltmart_admin::tables::{format_date, format_money};
use voltmart_core::OrderId;
use voltmart_core::validation::{MOBILE_PREFIX, RegistrationForm};
use voltmart_storefront::account::{Account, Landing, OrderHistory, ProfileForm};
use voltmart_storefront::error::Result;
use voltmart_storefront::session::keys;

use super::Context;
use crate::render;

const ORDER_COLUMNS: &[TableColumn] = &[
    TableColumn::new("id", "Order"),
    TableColumn::numeric("items", "Items"),
    TableColumn::numeric("total", "Total"),
    TableColumn::new("payment", "Payment"),
    TableColumn::new("status", "Status"),
    TableColumn::new("date", "Date"),
    TableColumn::new("cancel", "Cancellable"),
];

#[derive(Args)]
pub struct RegisterArgs {
    #[arg(short, long)]
    pub name: String,

    #[arg(short, long)]
    pub email: String,

    /// Mobile number; the +91 prefix is added when missing
    #[arg(short, long)]
    pub mobile: String,

    #[arg(short, long)]
    pub password: String,

    /// `male`, `female` or `other`
    #[arg(short, long)]
    pub gender: String,
}

#[derive(Subcommand)]
pub enum OrdersAction {
    /// List your orders, newest first as the server sends them
    List,
    /// Cancel an order that has not shipped yet
    Cancel { order_id: String },
}

#[derive(Subcommand)]
pub enum ProfileAction {
    /// Show your profile
    Show,
    /// Change profile fields; omitted fields keep their current value
    Update {
        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        email: Option<String>,

        #[arg(long)]
        phone: Option<String>,

        #[arg(long)]
        gender: Option<String>,
    },
}

pub async fn login(ctx: &Context, email: &str, password: &str) -> Result<()> {
    let landing = Account::new(ctx.api.clone()).login(email, password).await?;
    let name = ctx.session().get(keys::NAME).unwrap_or_default();
    match landing {
        Landing::AdminConsole => render::message(&format!(
            "Welcome back, {name}. Use `vm-cli admin dashboard` to open the console."
        )),
        Landing::Home => render::message(&format!("Welcome back, {name}.")),
    }
    Ok(())
}

pub fn logout(ctx: &Context) -> Result<()> {
    Account::new(ctx.api.clone()).logout()?;
    render::message("Logged out.");
    Ok(())
}

pub async fn register(ctx: &Context, args: RegisterArgs) -> Result<()> {
    let mut form = RegistrationForm::new();
    form.name = args.name;
    form.email = args.email;
    form.password = args.password;
    form.gender = args.gender;
    if !form.set_mobile(&args.mobile) {
        form.set_mobile(&format!("{MOBILE_PREFIX}{}", args.mobile));
    }

    Account::new(ctx.api.clone()).register(&form).await?;
    render::message("Account created. You can log in now.");
    Ok(())
}

pub fn whoami(ctx: &Context) {
    let session = ctx.session();
    let Some(user_id) = session.user_id().filter(|_| session.is_logged_in()) else {
        render::message("Not logged in.");
        return;
    };

    render::fields(&[
        ("Id", user_id.to_string()),
        ("Name", session.get(keys::NAME).unwrap_or_default()),
        ("Email", session.get(keys::EMAIL).unwrap_or_default()),
        ("Role", session.role().to_string()),
        ("Cart items", session.cart_count().to_string()),
    ]);
}

pub async fn orders(ctx: &Context, action: OrdersAction) -> Result<()> {
    let account = Account::new(ctx.api.clone());
    let mut history = account.my_orders().await?;

    match action {
        OrdersAction::List => render::table(&orders_table(&history)),
        OrdersAction::Cancel { order_id } => {
            let message = history.cancel(&OrderId::new(order_id)).await?;
            render::server_message(message, "Order cancelled.");
        }
    }
    Ok(())
}

pub async fn profile(ctx: &Context, action: ProfileAction) -> Result<()> {
    let account = Account::new(ctx.api.clone());
    let user = account.profile().await?;

    match action {
        ProfileAction::Show => render::fields(&[
            ("Name", user.name.clone()),
            ("Email", user.email.clone()),
            ("Phone", user.mobile.clone()),
            (
                "Gender",
                user.gender.map_or_else(|| "-".to_string(), |g| g.to_string()),
            ),
            ("Role", user.role.to_string()),
        ]),
        ProfileAction::Update {
            name,
            email,
            phone,
            gender,
        } => {
            let current = ProfileForm::from(&user);
            let form = ProfileForm {
                name: name.unwrap_or(current.name),
                email: email.unwrap_or(current.email),
                phone: phone.unwrap_or(current.phone),
                gender: gender.unwrap_or(current.gender),
            };
            account.update_profile(&form).await?;
            render::message("Profile updated.");
        }
    }
    Ok(())
}

fn orders_table(history: &OrderHistory) -> RenderedTable {
    let rows = history
        .orders()
        .iter()
        .map(|order| {
            let units: u32 = order.items.iter().map(|item| item.quantity.get()).sum();
            vec![
                order.id.to_string(),
                units.to_string(),
                format_money(order.total_price),
                order.payment_method.to_string(),
                order.status.to_string(),
                format_date(order.created_at),
                if OrderHistory::can_cancel(order) { "yes" } else { "no" }.to_string(),
            ]
        })
        .collect();

    RenderedTable {
        columns: ORDER_COLUMNS,
        rows,
        page: 1,
        total_pages: 1,
        empty_message: "You have not placed any orders yet.",
    }
}
