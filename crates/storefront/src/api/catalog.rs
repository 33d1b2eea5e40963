//! Product and category endpoints.

use reqwest::Method;
use reqwest::multipart::{Form, Part};
use tracing::instrument;
use voltmart_core::{CategoryId, ProductId};

use super::wire::{CategoryRequest, CategoryWire, DataEnvelope, ProductWire, TotalProducts};
use super::{ApiClient, ApiError, Category, Product, ProductDraft};

impl ApiClient {
    /// List every product.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails or a product is malformed.
    #[instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Vec<Product>, ApiError> {
        let envelope: DataEnvelope<Vec<ProductWire>> =
            self.get(&["products", "getProduct"]).await?;
        envelope.data.into_iter().map(Product::try_from).collect()
    }

    /// Get a single product.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] for unknown ids.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_product(&self, id: &ProductId) -> Result<Product, ApiError> {
        let wire: ProductWire = self
            .get(&["products", "getProductById", id.as_str()])
            .await?;
        wire.try_into()
    }

    /// Create a product. The draft must already be validated.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self, draft), fields(name = %draft.name))]
    pub async fn add_product(&self, draft: ProductDraft) -> Result<Option<String>, ApiError> {
        let form = product_form(draft)?;
        self.acknowledge_multipart(Method::POST, &["products", "addProduct"], form)
            .await
    }

    /// Replace a product's fields, optionally uploading a new image.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self, draft), fields(product_id = %id))]
    pub async fn edit_product(
        &self,
        id: &ProductId,
        draft: ProductDraft,
    ) -> Result<Option<String>, ApiError> {
        let form = product_form(draft)?;
        self.acknowledge_multipart(Method::PUT, &["products", "editProduct", id.as_str()], form)
            .await
    }

    /// Delete a product.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn delete_product(&self, id: &ProductId) -> Result<Option<String>, ApiError> {
        self.acknowledge::<()>(
            Method::DELETE,
            &["products", "deleteProduct", id.as_str()],
            None,
        )
        .await
    }

    /// Number of products in the catalog.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self))]
    pub async fn total_products(&self) -> Result<u64, ApiError> {
        let total: TotalProducts = self.get(&["products", "totalProducts"]).await?;
        Ok(total.total)
    }

    /// List every category.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_categories(&self) -> Result<Vec<Category>, ApiError> {
        let envelope: DataEnvelope<Vec<CategoryWire>> =
            self.get(&["categories", "getCategory"]).await?;
        Ok(envelope.data.into_iter().map(Category::from).collect())
    }

    /// Get a single category.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] for unknown ids.
    #[instrument(skip(self), fields(category_id = %id))]
    pub async fn get_category(&self, id: &CategoryId) -> Result<Category, ApiError> {
        let envelope: DataEnvelope<Option<CategoryWire>> = self
            .get(&["categories", "singleCategory", id.as_str()])
            .await?;
        envelope
            .data
            .map(Category::from)
            .ok_or_else(|| ApiError::NotFound(format!("category {id}")))
    }

    /// Create a category.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self, description))]
    pub async fn add_category(
        &self,
        name: &str,
        description: &str,
    ) -> Result<Option<String>, ApiError> {
        let body = CategoryRequest {
            category_name: name,
            category_description: description,
        };
        self.acknowledge(Method::POST, &["categories", "addCategory"], Some(&body))
            .await
    }

    /// Update a category.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self, description), fields(category_id = %id))]
    pub async fn update_category(
        &self,
        id: &CategoryId,
        name: &str,
        description: &str,
    ) -> Result<Option<String>, ApiError> {
        let body = CategoryRequest {
            category_name: name,
            category_description: description,
        };
        self.acknowledge(
            Method::PUT,
            &["categories", "updateCategory", id.as_str()],
            Some(&body),
        )
        .await
    }

    /// Delete a category.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self), fields(category_id = %id))]
    pub async fn delete_category(&self, id: &CategoryId) -> Result<Option<String>, ApiError> {
        self.acknowledge::<()>(
            Method::DELETE,
            &["categories", "deleteCategory", id.as_str()],
            None,
        )
        .await
    }
}

/// Multipart body for product create/edit. Text fields are trimmed.
fn product_form(draft: ProductDraft) -> Result<Form, ApiError> {
    let mut form = Form::new()
        .text("product_name", draft.name.trim().to_owned())
        .text("product_description", draft.description.trim().to_owned())
        .text("product_price", draft.price.trim().to_owned())
        .text("product_category", draft.category.trim().to_owned())
        .text("product_brand", draft.brand.trim().to_owned());

    if let Some(image) = draft.image {
        let part = Part::bytes(image.bytes)
            .file_name(image.file_name)
            .mime_str(&image.mime_type)
            .map_err(|e| ApiError::Parse(format!("Invalid image type: {e}")))?;
        form = form.part("product_image", part);
    }
    Ok(form)
}
