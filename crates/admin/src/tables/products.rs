//! Product management table.

use tracing::instrument;
use voltmart_core::ProductId;
use voltmart_core::validation::{FieldErrors, ProductField};
use voltmart_storefront::api::{ApiClient, Product, ProductDraft};

use super::{AdminTable, Table};
use crate::components::data_table::TableColumn;
use crate::error::{AdminError, Result};

/// Validate every product field. The image is optional.
///
/// # Errors
///
/// Returns the failing fields, keyed by their form names.
pub fn validate_product(draft: &ProductDraft) -> std::result::Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();
    for (field, value) in [
        (ProductField::Name, &draft.name),
        (ProductField::Description, &draft.description),
        (ProductField::Price, &draft.price),
        (ProductField::Category, &draft.category),
        (ProductField::Brand, &draft.brand),
    ] {
        errors.record(field.key(), field.check(value));
    }
    errors.into_result()
}

/// Products in the admin console.
#[derive(Debug)]
pub struct ProductTable {
    api: ApiClient,
    table: Table<Product>,
}

impl AdminTable for ProductTable {
    type Row = Product;

    const COLUMNS: &'static [TableColumn] = &[
        TableColumn::new("id", "ID"),
        TableColumn::new("name", "Name"),
        TableColumn::new("brand", "Brand"),
        TableColumn::new("category", "Category"),
        TableColumn::numeric("price", "Price"),
    ];

    const EMPTY_MESSAGE: &'static str = "No products found";

    fn table(&self) -> &Table<Product> {
        &self.table
    }

    fn table_mut(&mut self) -> &mut Table<Product> {
        &mut self.table
    }

    fn cells(product: &Product) -> Vec<String> {
        vec![
            product.id.to_string(),
            product.name.clone(),
            product.brand.clone(),
            product
                .category
                .as_ref()
                .map_or_else(|| "-".to_string(), |category| category.label().to_string()),
            product.price.display(),
        ]
    }
}

impl ProductTable {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            table: Table::default(),
        }
    }

    /// Fetch every product.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self))]
    pub async fn load(&mut self) -> Result<()> {
        let products = self.api.list_products().await?;
        tracing::debug!(count = products.len(), "Products loaded");
        self.table.replace(products);
        Ok(())
    }

    /// Create a product, then reload the list.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::Validation`] without a network call, or the API
    /// error.
    #[instrument(skip(self, draft), fields(name = %draft.name))]
    pub async fn create(&mut self, draft: ProductDraft) -> Result<Option<String>> {
        validate_product(&draft)?;
        let message = self.api.add_product(draft).await?;
        tracing::info!("Product created");
        self.load().await?;
        Ok(message)
    }

    /// Replace a product's fields, then reload the list.
    ///
    /// # Errors
    ///
    /// Same as [`Self::create`].
    #[instrument(skip(self, draft), fields(product_id = %id))]
    pub async fn edit(&mut self, id: &ProductId, draft: ProductDraft) -> Result<Option<String>> {
        validate_product(&draft)?;
        let message = self.api.edit_product(id, draft).await?;
        tracing::info!("Product updated");
        self.load().await?;
        Ok(message)
    }

    /// Delete a product and drop it from the list.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails; the list is then unchanged.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn delete(&mut self, id: &ProductId) -> Result<Option<String>> {
        let message = self.api.delete_product(id).await?;
        self.table.remove_where(|product| &product.id == id);
        tracing::info!("Product deleted");
        Ok(message)
    }

    /// A loaded product.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::NotFound`] when the product is not in the list.
    pub fn get(&self, id: &ProductId) -> Result<&Product> {
        self.table
            .find(|product| &product.id == id)
            .ok_or_else(|| AdminError::NotFound(format!("product {id}")))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;
    use voltmart_core::Price;
    use voltmart_storefront::config::StorefrontConfig;
    use voltmart_storefront::session::SessionStore;

    use super::*;

    fn table() -> ProductTable {
        let config = StorefrontConfig::for_base_url("http://127.0.0.1:9").unwrap();
        ProductTable::new(ApiClient::new(&config, SessionStore::in_memory()).unwrap())
    }

    fn draft() -> ProductDraft {
        ProductDraft {
            name: "Noise-cancelling headphones".to_string(),
            description: "Over-ear, 30h battery".to_string(),
            price: "4999".to_string(),
            category: "c-audio".to_string(),
            brand: "Voltmart".to_string(),
            image: None,
        }
    }

    #[test]
    fn test_validate_product() {
        assert!(validate_product(&draft()).is_ok());

        let mut bad = draft();
        bad.price = "-5".to_string();
        bad.brand = "  ".to_string();
        let errors = validate_product(&bad).unwrap_err();
        assert_eq!(errors.get("product_price"), Some("Please enter a valid price."));
        assert_eq!(errors.get("product_brand"), Some("Product brand is required."));
        assert_eq!(errors.len(), 2);
    }

    #[tokio::test]
    async fn test_create_invalid_sends_nothing() {
        let mut table = table();
        let mut bad = draft();
        bad.name.clear();
        assert!(matches!(
            table.create(bad).await,
            Err(AdminError::Validation(_))
        ));
    }

    #[test]
    fn test_render_rows() {
        let mut table = table();
        table.table.replace(vec![Product {
            id: ProductId::new("p1"),
            name: "Mouse".to_string(),
            description: String::new(),
            price: Price::inr(Decimal::from(799)).unwrap(),
            category: None,
            brand: "Voltmart".to_string(),
            image: None,
        }]);

        let rendered = table.render();
        assert_eq!(
            rendered.rows.first().unwrap(),
            &vec!["p1", "Mouse", "Voltmart", "-", "₹799.00"]
        );
        assert!(table.get(&ProductId::new("p1")).is_ok());
        assert!(matches!(
            table.get(&ProductId::new("p2")),
            Err(AdminError::NotFound(_))
        ));
    }
}
