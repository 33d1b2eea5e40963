//! Product grid view model.

use std::collections::HashSet;

use tracing::instrument;
use voltmart_core::{PageCursor, ProductId};

use crate::api::{ApiClient, ApiError, Category, Product};
use crate::checkout::Checkout;

/// Which products the grid shows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CategoryFilter {
    #[default]
    All,
    /// Products whose category reference matches this id (or name).
    Category(String),
}

impl CategoryFilter {
    /// `"all"` (any case) or an empty string selects every product.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if value.is_empty() || value.eq_ignore_ascii_case("all") {
            Self::All
        } else {
            Self::Category(value.to_owned())
        }
    }

    fn admits(&self, product: &Product) -> bool {
        match self {
            Self::All => true,
            Self::Category(needle) => product
                .category
                .as_ref()
                .is_some_and(|category| category.matches(needle)),
        }
    }
}

/// One page of the grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogPage<'a> {
    pub products: Vec<&'a Product>,
    pub page: usize,
    pub total_pages: usize,
}

/// Product grid with category filter, paging and "already in cart" marks.
#[derive(Debug)]
pub struct Catalog {
    api: ApiClient,
    products: Vec<Product>,
    categories: Vec<Category>,
    in_cart: HashSet<ProductId>,
    filter: CategoryFilter,
    cursor: PageCursor,
}

impl Catalog {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            products: Vec::new(),
            categories: Vec::new(),
            in_cart: HashSet::new(),
            filter: CategoryFilter::All,
            cursor: PageCursor::catalog(),
        }
    }

    /// Fetch products and categories, and the cart's product ids when a user
    /// is logged in. Only the product list is required: a failed category
    /// fetch leaves the filter choices empty, and a failed cart fetch only
    /// loses the "Added" marks.
    ///
    /// # Errors
    ///
    /// Returns error if the product list cannot be fetched.
    #[instrument(skip(self))]
    pub async fn load(&mut self) -> Result<(), ApiError> {
        self.products = self.api.list_products().await?;
        match self.api.list_categories().await {
            Ok(categories) => self.categories = categories,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load categories for catalog");
                self.categories.clear();
            }
        }

        if let Some(user_id) = self.api.session().user_id() {
            match self.api.get_cart(&user_id).await {
                Ok(lines) => {
                    self.mark_in_cart(lines.into_iter().map(|line| line.product.id));
                    if let Err(e) = self.api.session().set_cart_count(self.in_cart.len()) {
                        tracing::warn!(error = %e, "Failed to store cart count");
                    }
                }
                Err(e) => tracing::warn!(error = %e, "Failed to load cart for catalog"),
            }
        }

        self.cursor.clamp(self.filtered_len());
        tracing::debug!(
            products = self.products.len(),
            categories = self.categories.len(),
            "Catalog loaded"
        );
        Ok(())
    }

    /// Replace the set of products marked as in the cart.
    pub fn mark_in_cart(&mut self, ids: impl IntoIterator<Item = ProductId>) {
        self.in_cart = ids.into_iter().collect();
    }

    /// Whether the product already has a cart line ("Added" vs "Add to cart").
    #[must_use]
    pub fn in_cart(&self, product: &Product) -> bool {
        self.in_cart.contains(&product.id)
    }

    /// Change the filter and go back to page 1.
    pub fn set_filter(&mut self, filter: CategoryFilter) {
        self.filter = filter;
        self.cursor = PageCursor::catalog();
    }

    #[must_use]
    pub const fn filter(&self) -> &CategoryFilter {
        &self.filter
    }

    #[must_use]
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    #[must_use]
    pub fn product(&self, id: &ProductId) -> Option<&Product> {
        self.products.iter().find(|product| &product.id == id)
    }

    fn filtered(&self) -> Vec<&Product> {
        self.products
            .iter()
            .filter(|product| self.filter.admits(product))
            .collect()
    }

    fn filtered_len(&self) -> usize {
        self.products
            .iter()
            .filter(|product| self.filter.admits(product))
            .count()
    }

    /// The visible page of the filtered grid.
    #[must_use]
    pub fn page(&self) -> CatalogPage<'_> {
        let filtered = self.filtered();
        let page = self.cursor.slice(&filtered);
        CatalogPage {
            products: page.visible.to_vec(),
            page: self.cursor.page(),
            total_pages: page.total_pages,
        }
    }

    /// Advance one page; returns whether the cursor moved.
    pub fn next_page(&mut self) -> bool {
        let len = self.filtered_len();
        self.cursor.next(len)
    }

    /// Go back one page; returns whether the cursor moved.
    pub const fn prev_page(&mut self) -> bool {
        self.cursor.prev()
    }

    /// Jump to a page, clamped into range.
    pub fn go_to(&mut self, page: usize) {
        let len = self.filtered_len();
        self.cursor.go_to(page, len);
    }

    /// Single-item checkout for a product, bypassing the cart.
    #[must_use]
    pub fn buy_now(&self, product: &Product) -> Checkout {
        Checkout::buy_now(self.api.clone(), product.clone())
    }
}
