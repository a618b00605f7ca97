use jc_closet_core::{OrderId, OrderStatus};
use reqwest::Method;
use tracing::instrument;

use crate::client::{ApiContext, segment};
use crate::error::ApiResult;
use crate::models::{Customer, CustomerQuery, NewOrder, Order, OrderQuery, OrderReceipt, Page};
use crate::session::SessionCache;

impl<S: SessionCache> ApiContext<'_, S> {
    /// Place an order from the storefront checkout.
    ///
    /// # Errors
    ///
    /// Returns `Validation` if the backend rejects the order, or another error
    /// if the API request fails.
    #[instrument(skip(self, order), fields(items = order.items.len()))]
    pub async fn create_order(&self, order: &NewOrder) -> ApiResult<OrderReceipt> {
        self.post("/orders", order).await
    }

    /// Fetch an order for the confirmation page.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown id, or another error if the API
    /// request fails.
    #[instrument(skip(self), fields(id = %id))]
    pub async fn get_order(&self, id: &OrderId) -> ApiResult<Order> {
        self.get(&format!("/orders/{}", segment(id.as_str())?)).await
    }

    /// Admin order list.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn admin_list_orders(&self, query: &OrderQuery) -> ApiResult<Page<Order>> {
        self.get_query("/admin/orders", query).await
    }

    /// Admin order detail.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(id = %id))]
    pub async fn admin_get_order(&self, id: &OrderId) -> ApiResult<Order> {
        self.get(&format!("/admin/orders/{}", segment(id.as_str())?)).await
    }

    /// Move an order to a new status.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(id = %id, status = status.as_str()))]
    pub async fn admin_update_order_status(
        &self,
        id: &OrderId,
        status: OrderStatus,
    ) -> ApiResult<Order> {
        self.send_json(
            Method::PATCH,
            &format!("/admin/orders/{}/status", segment(id.as_str())?),
            &serde_json::json!({ "status": status }),
        )
        .await
    }

    /// Admin customer list.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn admin_list_customers(&self, query: &CustomerQuery) -> ApiResult<Page<Customer>> {
        self.get_query("/admin/customers", query).await
    }
}
