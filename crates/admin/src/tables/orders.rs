//! Order management table.
//!
//! Status changes are server-authoritative: after the server confirms a
//! transition or a cancellation the whole list is fetched again.

use tracing::instrument;
use voltmart_core::{OrderId, OrderStatus};
use voltmart_storefront::api::{ApiClient, Order};

use super::{AdminTable, Table, format_date, format_money};
use crate::components::data_table::TableColumn;
use crate::error::{AdminError, Result};

/// Orders in the admin console.
#[derive(Debug)]
pub struct OrderTable {
    api: ApiClient,
    table: Table<Order>,
}

impl AdminTable for OrderTable {
    type Row = Order;

    const COLUMNS: &'static [TableColumn] = &[
        TableColumn::new("id", "Order"),
        TableColumn::new("customer", "Customer"),
        TableColumn::numeric("items", "Items"),
        TableColumn::numeric("total", "Total"),
        TableColumn::new("payment", "Payment"),
        TableColumn::new("status", "Status"),
        TableColumn::new("date", "Date"),
    ];

    const EMPTY_MESSAGE: &'static str = "No orders found";

    fn table(&self) -> &Table<Order> {
        &self.table
    }

    fn table_mut(&mut self) -> &mut Table<Order> {
        &mut self.table
    }

    fn cells(order: &Order) -> Vec<String> {
        let customer = order.customer.as_ref().map_or_else(
            || "Unknown".to_string(),
            |customer| {
                customer
                    .name
                    .clone()
                    .unwrap_or_else(|| customer.id.to_string())
            },
        );
        let units: u32 = order.items.iter().map(|item| item.quantity.get()).sum();
        vec![
            order.number.clone().unwrap_or_else(|| order.id.to_string()),
            customer,
            units.to_string(),
            format_money(order.total_price),
            order.payment_method.to_string(),
            order.status.to_string(),
            format_date(order.created_at),
        ]
    }
}

impl OrderTable {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            table: Table::default(),
        }
    }

    /// Fetch every order.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self))]
    pub async fn load(&mut self) -> Result<()> {
        let orders = self.api.all_orders().await?;
        tracing::debug!(count = orders.len(), "Orders loaded");
        self.table.replace(orders);
        Ok(())
    }

    /// Request a status change, then refetch the list so the displayed
    /// status is the server's.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails; the list is then unchanged.
    #[instrument(skip(self), fields(order_id = %id, status = %status))]
    pub async fn update_status(&mut self, id: &OrderId, status: OrderStatus) -> Result<Option<String>> {
        let message = self.api.update_order_status(id, status).await?;
        tracing::info!("Order status updated");
        self.load().await?;
        Ok(message)
    }

    /// Cancel an order, then refetch the list.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails; the list is then unchanged.
    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn cancel(&mut self, id: &OrderId) -> Result<Option<String>> {
        let message = self.api.cancel_order(id).await?;
        tracing::info!("Order cancelled");
        self.load().await?;
        Ok(message)
    }

    /// Full details of a loaded order.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::NotFound`] when the order is not in the list.
    pub fn details(&self, id: &OrderId) -> Result<&Order> {
        self.table
            .find(|order| &order.id == id)
            .ok_or_else(|| AdminError::NotFound(format!("order {id}")))
    }
}
