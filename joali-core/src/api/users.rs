//! `/api/User/*`

use serde_json::Value;

use super::JoaliClient;
use crate::error::ApiError;
use crate::http::ApiRequest;
use crate::models::{NewStaff, User};

const ALL_USERS: &str = "/api/User/AllUsers";
const TOGGLE_USER: &str = "/api/User/ToggleUser";
const NEW_STAFF: &str = "/api/User/NewStaff";

impl JoaliClient {
    /// List every user account (customers and staff)
    #[tracing::instrument(skip(self))]
    pub async fn get_all_users(&self) -> Result<Vec<User>, ApiError> {
        let req = ApiRequest::get(ALL_USERS)
            .authenticated()
            .query("apiKey", self.api_key());

        self.fetch_list(req, "Failed to fetch users").await
    }

    /// Activate or deactivate the account registered under `email`
    #[tracing::instrument(skip(self))]
    pub async fn toggle_user(&self, email: &str) -> Result<Option<Value>, ApiError> {
        let req = ApiRequest::put(TOGGLE_USER)
            .authenticated()
            .query("apiKey", self.api_key())
            .query("Email", email);

        self.fetch_optional(req, "Failed to toggle user").await
    }

    /// Create a staff account attached to an organization
    #[tracing::instrument(skip(self, staff), fields(email = %staff.email, org_id = staff.org_id))]
    pub async fn create_staff(&self, staff: &NewStaff) -> Result<Option<Value>, ApiError> {
        let req = ApiRequest::post(NEW_STAFF)
            .authenticated()
            .query("apiKey", self.api_key())
            .json(staff)?;

        self.fetch_optional(req, "Failed to create staff").await
    }
}
