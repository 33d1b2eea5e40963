//! Dashboard statistics.

use tracing::instrument;
use voltmart_storefront::api::{ApiClient, DashboardStats};

use crate::components::data_table::{RenderedTable, TableColumn};
use crate::error::Result;
use crate::tables::{format_date, format_money};

/// Columns of the recent-orders panel.
pub const RECENT_ORDER_COLUMNS: &[TableColumn] = &[
    TableColumn::new("order", "Order"),
    TableColumn::new("customer", "Customer"),
    TableColumn::numeric("total", "Total"),
    TableColumn::new("status", "Status"),
    TableColumn::new("date", "Date"),
];

/// Fetch the five dashboard statistics concurrently. Any failure fails the
/// whole dashboard.
///
/// # Errors
///
/// Returns the first API error.
#[instrument(skip(api))]
pub async fn load(api: &ApiClient) -> Result<DashboardStats> {
    let (total_users, total_orders, total_products, pending_orders, recent_orders) = tokio::try_join!(
        api.total_users(),
        api.total_orders(),
        api.total_products(),
        api.pending_orders(),
        api.recent_orders(),
    )?;

    tracing::debug!(
        total_users,
        total_orders,
        total_products,
        pending_orders,
        "Dashboard loaded"
    );

    Ok(DashboardStats {
        total_users,
        total_orders,
        total_products,
        pending_orders,
        recent_orders,
    })
}

/// Recent orders as a table.
#[must_use]
pub fn recent_orders_table(stats: &DashboardStats) -> RenderedTable {
    RenderedTable {
        columns: RECENT_ORDER_COLUMNS,
        rows: stats
            .recent_orders
            .iter()
            .map(|order| {
                vec![
                    order.number.clone(),
                    order.customer_name.clone(),
                    format_money(order.total_price),
                    order.status.to_string(),
                    format_date(order.created_at),
                ]
            })
            .collect(),
        page: 1,
        total_pages: 1,
        empty_message: "No recent orders",
    }
}
