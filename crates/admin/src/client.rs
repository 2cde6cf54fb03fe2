//! Dashboard API calls.
//!
//! [`AdminClient`] wraps the storefront [`ApiClient`], so every call carries
//! the same headers and goes through the same 401 interceptor as the shop.

use reqwest::Method;
use serde_json::{Value, json};
use shopfront_core::{OrderId, OrderStatus, ProductId, UserRole};
use shopfront_storefront::api::{Auth, ApiClient, FilePart, Order, RequestBody, unwrap_envelope};
use shopfront_storefront::persistence::keys;
use tracing::{info, instrument, warn};

use crate::error::{AdminError, Result};
use crate::forms::{ProductForm, ValidProduct};

/// Dashboard client. Cheap to clone.
#[derive(Debug, Clone)]
pub struct AdminClient {
    api: ApiClient,
}

impl AdminClient {
    #[must_use]
    pub const fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Require a stored staff session.
    ///
    /// # Errors
    ///
    /// `Unauthenticated` without a token, `Forbidden` for non-staff roles.
    pub fn require_staff(&self) -> Result<UserRole> {
        let persistence = self.api.persistence();
        if persistence.token().is_none() {
            return Err(AdminError::Unauthenticated);
        }
        let role = persistence.load::<UserRole>(keys::ROLE).unwrap_or_default();
        if role.is_staff() {
            Ok(role)
        } else {
            Err(AdminError::Forbidden(format!("{role} accounts cannot manage the store")))
        }
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// Create a product with uploaded images.
    ///
    /// # Errors
    ///
    /// `Invalid` if the form fails validation, otherwise the session or API
    /// error.
    #[instrument(skip(self, form, images), fields(title = %form.title, images = images.len()))]
    pub async fn create_product(&self, form: &ProductForm, images: Vec<FilePart>) -> Result<Value> {
        let product = form.validate(images.len()).map_err(AdminError::Invalid)?;
        self.require_staff()?;

        let value = self
            .api
            .execute(
                Method::POST,
                "/products/create",
                &[],
                RequestBody::Multipart(product.to_multipart(images)),
                Auth::Bearer,
            )
            .await
            .inspect_err(|e| warn!(error = %e, "Product create failed"))?;
        info!(title = %product.title, "Product created");
        Ok(unwrap_envelope(value))
    }

    /// Update a product: new field values, the existing images to keep, and
    /// new image files.
    ///
    /// # Errors
    ///
    /// `Invalid` if the form fails validation or the images exceed the limit,
    /// otherwise the session or API error.
    #[instrument(skip(self, form, existing_images, new_images), fields(product_id = %id))]
    pub async fn update_product(
        &self,
        id: &ProductId,
        form: &ProductForm,
        existing_images: &[String],
        new_images: Vec<FilePart>,
    ) -> Result<Value> {
        let product: ValidProduct = form
            .validate(existing_images.len() + new_images.len())
            .map_err(AdminError::Invalid)?;
        self.require_staff()?;

        let body = product
            .to_multipart(new_images)
            .text("existingImages", json!(existing_images).to_string());
        let value = self
            .api
            .execute(
                Method::PUT,
                &format!("/products/update/{id}"),
                &[],
                RequestBody::Multipart(body),
                Auth::Bearer,
            )
            .await?;
        self.api.invalidate_product(id).await;
        info!("Product updated");
        Ok(unwrap_envelope(value))
    }

    /// Delete a product.
    ///
    /// # Errors
    ///
    /// Returns the session or API error.
    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: &ProductId) -> Result<()> {
        self.require_staff()?;
        self.api
            .execute(
                Method::DELETE,
                &format!("/products/{id}"),
                &[],
                RequestBody::Empty,
                Auth::Bearer,
            )
            .await?;
        self.api.invalidate_product(id).await;
        info!("Product deleted");
        Ok(())
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// Every order in the store. Malformed entries are skipped.
    ///
    /// # Errors
    ///
    /// Returns the session or API error.
    #[instrument(skip(self))]
    pub async fn list_orders(&self) -> Result<Vec<Order>> {
        self.require_staff()?;
        let value = self
            .api
            .execute(Method::GET, "/orders/all", &[], RequestBody::Empty, Auth::Bearer)
            .await?;
        let Value::Array(entries) = unwrap_envelope(value) else {
            return Ok(Vec::new());
        };
        Ok(entries
            .into_iter()
            .filter_map(|entry| {
                serde_json::from_value(entry)
                    .inspect_err(|e| warn!(error = %e, "Skipping malformed order"))
                    .ok()
            })
            .collect())
    }

    /// Set an order's status.
    ///
    /// # Errors
    ///
    /// Returns the session or API error.
    #[instrument(skip(self))]
    pub async fn update_order_status(&self, id: OrderId, status: OrderStatus) -> Result<()> {
        self.require_staff()?;
        self.api
            .execute(
                Method::PATCH,
                &format!("/orders/update/status/{id}"),
                &[],
                RequestBody::Json(json!({ "status": status })),
                Auth::Bearer,
            )
            .await?;
        info!(order_id = %id, %status, "Order status updated");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use shopfront_core::{CategoryId, ImageResolver};
    use shopfront_storefront::Persistence;
    use shopfront_storefront::api::ScriptedTransport;
    use url::Url;

    use super::*;
    use crate::forms::image_part;

    fn client(role: Option<&str>) -> (AdminClient, Arc<ScriptedTransport>) {
        let transport = ScriptedTransport::new();
        let persistence = Persistence::in_memory();
        if let Some(role) = role {
            persistence.save(keys::TOKEN, "tok");
            persistence.save(keys::ROLE, role);
        }
        let api = ApiClient::new(
            Url::parse("https://api.shop.test/api").unwrap(),
            Some("acme".to_string()),
            ImageResolver::new(""),
            persistence,
            transport.clone(),
        );
        (AdminClient::new(api), transport)
    }

    fn form() -> ProductForm {
        ProductForm {
            title: "Mug".to_string(),
            description: "Stoneware".to_string(),
            price: "12".to_string(),
            stock: "3".to_string(),
            brand: String::new(),
            category_id: Some(CategoryId::new(1)),
            sub_category_id: None,
        }
    }

    #[tokio::test]
    async fn test_requires_staff_role() {
        let (anonymous, transport) = client(None);
        assert!(matches!(anonymous.list_orders().await, Err(AdminError::Unauthenticated)));

        let (customer, _) = client(Some("CUSTOMER"));
        assert!(matches!(customer.list_orders().await, Err(AdminError::Forbidden(_))));
        assert_eq!(transport.total(), 0);
    }

    #[tokio::test]
    async fn test_invalid_form_sends_nothing() {
        let (admin, transport) = client(Some("ADMIN"));
        let result = admin
            .create_product(
                &ProductForm {
                    title: String::new(),
                    ..form()
                },
                vec![],
            )
            .await;
        assert!(matches!(result, Err(AdminError::Invalid(_))));
        assert_eq!(transport.total(), 0);
    }

    #[tokio::test]
    async fn test_update_carries_retained_images() {
        let (admin, transport) = client(Some("SUPER_ADMIN"));
        transport.respond(Method::PUT, "/products/update/p1", 200, json!({ "data": {} }));

        admin
            .update_product(
                &ProductId::new("p1"),
                &form(),
                &["/a.jpg".to_string()],
                vec![image_part("b.png", "image/png", vec![0])],
            )
            .await
            .unwrap();

        let request = transport.last_request().unwrap();
        let RequestBody::Multipart(body) = &request.body else {
            panic!("expected multipart body");
        };
        assert_eq!(body.field("existingImages"), Some(r#"["/a.jpg"]"#));
        assert_eq!(body.files.len(), 1);
        assert_eq!(request.header("Authorization"), Some("Bearer tok"));
    }

    #[tokio::test]
    async fn test_update_rejects_too_many_images() {
        let (admin, transport) = client(Some("ADMIN"));
        let existing: Vec<String> = (0..5).map(|i| format!("/{i}.jpg")).collect();
        let result = admin
            .update_product(
                &ProductId::new("p1"),
                &form(),
                &existing,
                vec![image_part("x.png", "image/png", vec![0])],
            )
            .await;
        assert!(matches!(result, Err(AdminError::Invalid(_))));
        assert_eq!(transport.total(), 0);
    }

    #[tokio::test]
    async fn test_list_orders_and_status_update() {
        let (admin, transport) = client(Some("ADMIN"));
        transport.respond(
            Method::GET,
            "/orders/all",
            200,
            json!({ "data": [{ "id": 1, "totalAmount": 5, "status": "pending" }, { "bogus": true }] }),
        );
        transport.respond(Method::PATCH, "/orders/update/status/1", 200, json!({ "data": {} }));

        let orders = admin.list_orders().await.unwrap();
        assert_eq!(orders.len(), 1);

        admin
            .update_order_status(OrderId::new(1), OrderStatus::Shipped)
            .await
            .unwrap();
        let RequestBody::Json(body) = transport.last_request().unwrap().body else {
            panic!("expected JSON body");
        };
        assert_eq!(body, json!({ "status": "shipped" }));
    }

    #[tokio::test]
    async fn test_unauthorized_goes_through_shared_interceptor() {
        let (admin, transport) = client(Some("ADMIN"));
        transport.respond(Method::DELETE, "/products/p1", 401, json!({ "message": "Unauthorized" }));
        let mut events = admin.api.subscribe_session();

        let result = admin.delete_product(&ProductId::new("p1")).await;
        assert!(matches!(result, Err(AdminError::Api(_))));
        assert!(admin.api.persistence().token().is_none());
        assert!(events.try_recv().is_ok());
    }
}
