//! Product CRUD and image upload.

use robe_core::wire::inserted_id;
use robe_core::{Product, ProductId};
use serde::Deserialize;
use tracing::{info, instrument};

use super::{AdminApiError, AdminClient};
use crate::products::{ImagePayload, NewProduct, ProductUpdate};

#[derive(Deserialize)]
struct UploadResponse {
    url: String,
}

impl AdminClient {
    /// List every product.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or returns an error response.
    #[instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Vec<Product>, AdminApiError> {
        self.list("products").await
    }

    /// Get a product by id.
    ///
    /// # Errors
    ///
    /// Returns `AdminApiError::NotFound` for unknown ids.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_product(&self, id: &ProductId) -> Result<Product, AdminApiError> {
        self.fetch("products", "product", id.as_str())
            .await?
            .ok_or_else(|| AdminApiError::NotFound(format!("Product not found: {id}")))
    }

    /// Create a product. Returns the new id when the backend reports one.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or returns an error response.
    #[instrument(skip(self, product), fields(name = %product.name))]
    pub async fn create_product(&self, product: &NewProduct) -> Result<Option<ProductId>, AdminApiError> {
        let body = self.send(self.post(&["products"])?.json(product)).await?;
        let id = inserted_id(&body).map(ProductId::from);
        info!(product_id = ?id, "Product created");
        Ok(id)
    }

    /// Replace the editable fields of a product.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or returns an error response.
    #[instrument(skip(self, update), fields(product_id = %id))]
    pub async fn update_product(&self, id: &ProductId, update: &ProductUpdate) -> Result<(), AdminApiError> {
        self.send(self.put(&["products", id.as_str()])?.json(update))
            .await?;
        info!("Product updated");
        Ok(())
    }

    /// Delete a product.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or returns an error response.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn delete_product(&self, id: &ProductId) -> Result<(), AdminApiError> {
        self.send(self.delete(&["products", id.as_str()])?).await?;
        info!("Product deleted");
        Ok(())
    }

    /// Upload an image and return its public URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the upload fails or the response has no URL.
    #[instrument(skip(self, image), fields(mime = %image.mime(), bytes = image.len()))]
    pub async fn upload_image(&self, image: &ImagePayload) -> Result<String, AdminApiError> {
        let request = self
            .post(&["upload"])?
            .json(&serde_json::json!({ "image": image.data_url() }));
        let response: UploadResponse = self.execute(request).await?;
        info!(url = %response.url, "Image uploaded");
        Ok(response.url)
    }
}
