//! Category management table.

use tracing::instrument;
use voltmart_core::CategoryId;
use voltmart_core::validation::validate_category;
use voltmart_storefront::api::{ApiClient, ApiError, Category};

use super::{AdminTable, Table};
use crate::components::data_table::TableColumn;
use crate::error::{AdminError, Result};

/// Categories in the admin console.
#[derive(Debug)]
pub struct CategoryTable {
    api: ApiClient,
    table: Table<Category>,
}

impl AdminTable for CategoryTable {
    type Row = Category;

    const COLUMNS: &'static [TableColumn] = &[
        TableColumn::new("id", "ID"),
        TableColumn::new("name", "Name"),
        TableColumn::new("description", "Description"),
    ];

    const EMPTY_MESSAGE: &'static str = "No categories found";

    fn table(&self) -> &Table<Category> {
        &self.table
    }

    fn table_mut(&mut self) -> &mut Table<Category> {
        &mut self.table
    }

    fn cells(category: &Category) -> Vec<String> {
        vec![
            category.id.to_string(),
            category.name.clone(),
            category.description.clone(),
        ]
    }
}

impl CategoryTable {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            table: Table::default(),
        }
    }

    /// Fetch every category.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self))]
    pub async fn load(&mut self) -> Result<()> {
        let categories = self.api.list_categories().await?;
        tracing::debug!(count = categories.len(), "Categories loaded");
        self.table.replace(categories);
        Ok(())
    }

    /// Fetch one category for the edit form.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::NotFound`] for unknown ids.
    #[instrument(skip(self), fields(category_id = %id))]
    pub async fn get(&self, id: &CategoryId) -> Result<Category> {
        self.api.get_category(id).await.map_err(|e| match e {
            ApiError::NotFound(_) => AdminError::NotFound(format!("category {id}")),
            other => other.into(),
        })
    }

    /// Create a category, then reload the list.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::Validation`] without a network call, or the API
    /// error.
    #[instrument(skip(self, description))]
    pub async fn create(&mut self, name: &str, description: &str) -> Result<Option<String>> {
        validate_category(name, description)?;
        let message = self
            .api
            .add_category(name.trim(), description.trim())
            .await?;
        tracing::info!("Category created");
        self.load().await?;
        Ok(message)
    }

    /// Update a category, then reload the list.
    ///
    /// # Errors
    ///
    /// Same as [`Self::create`].
    #[instrument(skip(self, description), fields(category_id = %id))]
    pub async fn edit(
        &mut self,
        id: &CategoryId,
        name: &str,
        description: &str,
    ) -> Result<Option<String>> {
        validate_category(name, description)?;
        let message = self
            .api
            .update_category(id, name.trim(), description.trim())
            .await?;
        tracing::info!("Category updated");
        self.load().await?;
        Ok(message)
    }

    /// Delete a category and drop it from the list.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails; the list is then unchanged.
    #[instrument(skip(self), fields(category_id = %id))]
    pub async fn delete(&mut self, id: &CategoryId) -> Result<Option<String>> {
        let message = self.api.delete_category(id).await?;
        self.table.remove_where(|category| &category.id == id);
        tracing::info!("Category deleted");
        Ok(message)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use voltmart_storefront::config::StorefrontConfig;
    use voltmart_storefront::session::SessionStore;

    use super::*;

    fn table() -> CategoryTable {
        let config = StorefrontConfig::for_base_url("http://127.0.0.1:9").unwrap();
        CategoryTable::new(ApiClient::new(&config, SessionStore::in_memory()).unwrap())
    }

    #[tokio::test]
    async fn test_create_validates_lengths() {
        let mut table = table();
        let Err(AdminError::Validation(errors)) = table.create("TV", "Big").await else {
            panic!("expected validation error");
        };
        assert_eq!(
            errors.get("category_name"),
            Some("Category name must be at least 3 characters")
        );
        assert_eq!(
            errors.get("category_description"),
            Some("Description must be at least 5 characters")
        );
    }

    #[tokio::test]
    async fn test_edit_validates_before_network() {
        let mut table = table();
        let long = "x".repeat(201);
        assert!(matches!(
            table.edit(&CategoryId::new("c1"), "Audio", &long).await,
            Err(AdminError::Validation(_))
        ));
    }

    #[test]
    fn test_cells() {
        let category = Category {
            id: CategoryId::new("c1"),
            name: "Audio".to_string(),
            description: "Headphones and speakers".to_string(),
        };
        assert_eq!(
            CategoryTable::cells(&category),
            vec!["c1", "Audio", "Headphones and speakers"]
        );
    }
}
