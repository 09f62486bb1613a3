//! `/api/ServiceOrder/*`

use super::JoaliClient;
use crate::error::ApiError;
use crate::http::ApiRequest;
use crate::models::{NewServiceOrder, ServiceOrder};

const CREATE_ORDER: &str = "/api/ServiceOrder/Create";
const MY_ORDERS: &str = "/api/ServiceOrder/MyOrders";

/// GET `/api/ServiceOrder/{id}`
fn order_by_id(id: i64) -> String {
    format!("/api/ServiceOrder/{id}")
}

/// PUT `/api/ServiceOrder/Cancel/{id}`
fn order_cancel(id: i64) -> String {
    format!("/api/ServiceOrder/Cancel/{id}")
}

impl JoaliClient {
    /// Book a service for the signed-in customer
    #[tracing::instrument(skip(self, order), fields(service_id = order.service_id, quantity = order.quantity))]
    pub async fn place_service_order(
        &self,
        order: &NewServiceOrder,
    ) -> Result<Option<ServiceOrder>, ApiError> {
        let req = ApiRequest::post(CREATE_ORDER).authenticated().json(order)?;
        self.fetch_optional(req, "Failed to place booking").await
    }

    /// Orders placed by the signed-in user
    #[tracing::instrument(skip(self))]
    pub async fn get_my_orders(&self) -> Result<Vec<ServiceOrder>, ApiError> {
        let req = ApiRequest::get(MY_ORDERS).authenticated();
        self.fetch_list(req, "Failed to fetch orders").await
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_service_order(&self, id: i64) -> Result<Option<ServiceOrder>, ApiError> {
        let req = ApiRequest::get(order_by_id(id)).authenticated();
        self.fetch_optional(req, "Failed to fetch order").await
    }

    #[tracing::instrument(skip(self))]
    pub async fn cancel_service_order(&self, id: i64) -> Result<Option<ServiceOrder>, ApiError> {
        let req = ApiRequest::put(order_cancel(id)).authenticated();
        self.fetch_optional(req, "Failed to cancel order").await
    }
}
