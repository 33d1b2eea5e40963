//! Data table component types.
//!
//! Each admin table describes its columns and how a row renders into cells,
//! so any front end can draw it without knowing the row type.

use voltmart_core::pager::Page;

/// Column definition for a data table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableColumn {
    /// Unique key for the column.
    pub key: &'static str,
    /// Display label for the column header.
    pub label: &'static str,
    /// Whether the column holds numbers or money (right-aligned).
    pub numeric: bool,
}

impl TableColumn {
    /// Create a new text column.
    #[must_use]
    pub const fn new(key: &'static str, label: &'static str) -> Self {
        Self {
            key,
            label,
            numeric: false,
        }
    }

    /// Create a new numeric column.
    #[must_use]
    pub const fn numeric(key: &'static str, label: &'static str) -> Self {
        Self {
            key,
            label,
            numeric: true,
        }
    }
}

/// A rendered page: headers, cell text and the pagination footer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedTable {
    pub columns: &'static [TableColumn],
    pub rows: Vec<Vec<String>>,
    pub page: usize,
    pub total_pages: usize,
    /// Shown instead of rows when the page is empty.
    pub empty_message: &'static str,
}

impl RenderedTable {
    /// Render one page of rows with `cells`.
    pub fn from_page<T>(
        columns: &'static [TableColumn],
        page: &Page<'_, T>,
        current: usize,
        empty_message: &'static str,
        cells: impl Fn(&T) -> Vec<String>,
    ) -> Self {
        Self {
            columns,
            rows: page.visible.iter().map(cells).collect(),
            page: current,
            total_pages: page.total_pages,
            empty_message,
        }
    }

    /// Width of each column: the longest of its label and its cells.
    #[must_use]
    pub fn widths(&self) -> Vec<usize> {
        self.columns
            .iter()
            .enumerate()
            .map(|(index, column)| {
                self.rows
                    .iter()
                    .filter_map(|row| row.get(index))
                    .map(|cell| cell.chars().count())
                    .chain(std::iter::once(column.label.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use voltmart_core::paginate;

    use super::*;

    const COLUMNS: &[TableColumn] = &[
        TableColumn::new("name", "Name"),
        TableColumn::numeric("qty", "Qty"),
    ];

    #[test]
    fn test_render_and_widths() {
        let items = [("Headphones", 2), ("USB-C cable", 10), ("Mouse", 1)];
        let page = paginate(&items, 2, 1).unwrap();
        let table = RenderedTable::from_page(COLUMNS, &page, 1, "Nothing here", |(name, qty)| {
            vec![(*name).to_string(), qty.to_string()]
        });

        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.total_pages, 2);
        assert_eq!(table.widths(), vec![11, 3]);
    }
}
