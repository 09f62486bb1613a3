//! `/api/Organization/*`

use serde_json::Value;

use super::JoaliClient;
use crate::error::ApiError;
use crate::http::ApiRequest;
use crate::models::{NewOrganization, Organization};

const ORGANIZATIONS: &str = "/api/Organization";
const CREATE_ORGANIZATION: &str = "/api/Organization/Create";

/// GET `/api/Organization/{id}`
fn organization_by_id(id: i64) -> String {
    format!("{ORGANIZATIONS}/{id}")
}

/// PUT `/api/Organization/toggle/{id}`
fn organization_toggle(id: i64) -> String {
    format!("{ORGANIZATIONS}/toggle/{id}")
}

impl JoaliClient {
    /// List organizations, optionally restricted to one organization type
    #[tracing::instrument(skip(self))]
    pub async fn get_all_organizations(
        &self,
        org_type: Option<i32>,
    ) -> Result<Vec<Organization>, ApiError> {
        let mut req = ApiRequest::get(ORGANIZATIONS).authenticated();
        if let Some(org_type) = org_type {
            req = req.query("orgtype", org_type);
        }

        self.fetch_list(req, "Failed to fetch organizations").await
    }

    /// Fetch one organization; `None` when the backend returns no usable body
    #[tracing::instrument(skip(self))]
    pub async fn get_organization_by_id(&self, id: i64) -> Result<Option<Organization>, ApiError> {
        let req = ApiRequest::get(organization_by_id(id)).authenticated();
        self.fetch_optional(req, "Failed to fetch organization").await
    }

    #[tracing::instrument(skip(self, org), fields(name = %org.name))]
    pub async fn create_organization(
        &self,
        org: &NewOrganization,
    ) -> Result<Option<Organization>, ApiError> {
        let req = ApiRequest::post(CREATE_ORGANIZATION)
            .authenticated()
            .json(org)?;

        self.fetch_optional(req, "Failed to create organization").await
    }

    /// Flip the active flag of an organization
    #[tracing::instrument(skip(self))]
    pub async fn toggle_organization(&self, id: i64) -> Result<Option<Value>, ApiError> {
        let req = ApiRequest::put(organization_toggle(id)).authenticated();
        self.fetch_optional(req, "Failed to toggle organization").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths() {
        assert_eq!(organization_by_id(12), "/api/Organization/12");
        assert_eq!(organization_toggle(12), "/api/Organization/toggle/12");
    }
}
