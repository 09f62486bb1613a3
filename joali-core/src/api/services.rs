//! `/api/Service/*`

use serde_json::Value;

use super::JoaliClient;
use crate::error::ApiError;
use crate::http::ApiRequest;
use crate::models::{NewService, NewServiceType, Service, ServiceFilter};

const SERVICES: &str = "/api/Service";
const CREATE_SERVICE: &str = "/api/Service/Create";
const CREATE_SERVICE_TYPE: &str = "/api/Service/CreateType";

impl JoaliClient {
    /// List bookable services (rooms, ferry seats, park tickets, beach events)
    #[tracing::instrument(skip(self))]
    pub async fn get_all_services(&self, filter: &ServiceFilter) -> Result<Vec<Service>, ApiError> {
        let mut req = ApiRequest::get(SERVICES)
            .authenticated()
            .query("apiKey", self.api_key());
        if let Some(org_id) = filter.org_id {
            req = req.query("orgId", org_id);
        }
        if let Some(type_id) = filter.type_id {
            req = req.query("typeId", type_id);
        }

        self.fetch_list(req, "Failed to fetch services").await
    }

    #[tracing::instrument(skip(self, service), fields(name = %service.name, org_id = service.org_id))]
    pub async fn create_service(&self, service: &NewService) -> Result<Option<Service>, ApiError> {
        let req = ApiRequest::post(CREATE_SERVICE).authenticated().json(service)?;
        self.fetch_optional(req, "Failed to create service").await
    }

    #[tracing::instrument(skip(self))]
    pub async fn create_service_type(&self, name: &str) -> Result<Option<Value>, ApiError> {
        let req = ApiRequest::post(CREATE_SERVICE_TYPE)
            .authenticated()
            .json(&NewServiceType {
                name: name.to_string(),
            })?;

        self.fetch_optional(req, "Failed to create service type").await
    }
}
