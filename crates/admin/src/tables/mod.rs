//! Paginated admin tables.
//!
//! Every table holds the full fetched list and a [`PageCursor`] with the
//! admin page size. Mutations that change the list length clamp the cursor
//! so the current page never points past the end.

pub mod categories;
pub mod orders;
pub mod products;
pub mod users;

pub use categories::CategoryTable;
pub use orders::OrderTable;
pub use products::ProductTable;
pub use users::UserTable;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use voltmart_core::pager::Page;
use voltmart_core::{CurrencyCode, PageCursor, format_amount};

use crate::components::data_table::{RenderedTable, TableColumn};

/// Rows plus a page cursor.
#[derive(Debug, Clone)]
pub struct Table<T> {
    rows: Vec<T>,
    cursor: PageCursor,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            cursor: PageCursor::admin_table(),
        }
    }
}

impl<T> Table<T> {
    /// Replace every row, keeping the page if it is still in range.
    pub fn replace(&mut self, rows: Vec<T>) {
        self.rows = rows;
        self.cursor.clamp(self.rows.len());
    }

    /// Drop rows matching `predicate`; returns how many were removed.
    pub fn remove_where(&mut self, predicate: impl Fn(&T) -> bool) -> usize {
        let before = self.rows.len();
        self.rows.retain(|row| !predicate(row));
        self.cursor.clamp(self.rows.len());
        before - self.rows.len()
    }

    #[must_use]
    pub fn rows(&self) -> &[T] {
        &self.rows
    }

    #[must_use]
    pub fn find(&self, predicate: impl Fn(&T) -> bool) -> Option<&T> {
        self.rows.iter().find(|row| predicate(row))
    }

    #[must_use]
    pub fn page(&self) -> Page<'_, T> {
        self.cursor.slice(&self.rows)
    }

    #[must_use]
    pub const fn current_page(&self) -> usize {
        self.cursor.page()
    }

    pub const fn next_page(&mut self) -> bool {
        self.cursor.next(self.rows.len())
    }

    pub const fn prev_page(&mut self) -> bool {
        self.cursor.prev()
    }

    pub fn go_to(&mut self, page: usize) {
        self.cursor.go_to(page, self.rows.len());
    }
}

/// Shared shape of the admin tables.
pub trait AdminTable {
    type Row;

    /// Column headers.
    const COLUMNS: &'static [TableColumn];

    /// Shown when a page has no rows.
    const EMPTY_MESSAGE: &'static str;

    fn table(&self) -> &Table<Self::Row>;

    fn table_mut(&mut self) -> &mut Table<Self::Row>;

    /// Cell text for one row, in column order.
    fn cells(row: &Self::Row) -> Vec<String>;

    /// The visible page.
    fn page(&self) -> Page<'_, Self::Row> {
        self.table().page()
    }

    /// Advance one page; returns whether the cursor moved.
    fn next_page(&mut self) -> bool {
        self.table_mut().next_page()
    }

    /// Go back one page; returns whether the cursor moved.
    fn prev_page(&mut self) -> bool {
        self.table_mut().prev_page()
    }

    /// Jump to a page, clamped into range.
    fn go_to(&mut self, page: usize) {
        self.table_mut().go_to(page);
    }

    /// The visible page rendered as text cells.
    fn render(&self) -> RenderedTable {
        let table = self.table();
        RenderedTable::from_page(
            Self::COLUMNS,
            &table.page(),
            table.current_page(),
            Self::EMPTY_MESSAGE,
            Self::cells,
        )
    }
}

/// Rupee amount as shown in every table.
#[must_use]
pub fn format_money(amount: Decimal) -> String {
    format_amount(amount, CurrencyCode::INR)
}

/// Order date, or `-` when the server sent none.
#[must_use]
pub fn format_date(at: Option<DateTime<Utc>>) -> String {
    at.map_or_else(|| "-".to_string(), |at| at.format("%d %b %Y").to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_pages_of_five() {
        let mut table = Table::default();
        table.replace((1..=12).collect::<Vec<u32>>());

        assert_eq!(table.page().visible, &[1, 2, 3, 4, 5]);
        assert_eq!(table.page().total_pages, 3);
        assert!(table.next_page());
        assert!(table.next_page());
        assert!(!table.next_page());
        assert_eq!(table.page().visible, &[11, 12]);
    }

    #[test]
    fn test_removal_clamps_page() {
        let mut table = Table::default();
        table.replace((1..=6).collect::<Vec<u32>>());
        table.go_to(2);
        assert_eq!(table.page().visible, &[6]);

        assert_eq!(table.remove_where(|n| *n == 6), 1);

        assert_eq!(table.current_page(), 1);
        assert_eq!(table.page().visible.len(), 5);
    }

    #[test]
    fn test_replace_with_empty_list() {
        let mut table: Table<u32> = Table::default();
        table.replace(Vec::new());
        assert!(table.page().visible.is_empty());
        assert_eq!(table.page().total_pages, 1);
        assert!(!table.prev_page());
    }

    #[test]
    fn test_formatting() {
        assert_eq!(format_money(Decimal::new(149_950, 2)), "₹1499.50");
        assert_eq!(format_date(None), "-");
        let at = DateTime::parse_from_rfc3339("2025-03-09T10:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(format_date(Some(at)), "09 Mar 2025");
    }
}
