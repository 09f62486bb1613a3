//! Records exchanged with the booking backend
//!
//! These mirror the backend's JSON payloads (camelCase). Optional fields
//! default rather than fail so that partially populated records still decode.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Role attached to the signed-in user
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum UserRole {
    Admin,
    Staff,
    Customer,
    /// Any role string the client does not know about
    Other(String),
}

impl UserRole {
    pub fn as_str(&self) -> &str {
        match self {
            UserRole::Admin => "Admin",
            UserRole::Staff => "Staff",
            UserRole::Customer => "Customer",
            UserRole::Other(s) => s,
        }
    }
}

impl FromStr for UserRole {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim() {
            r if r.eq_ignore_ascii_case("admin") => UserRole::Admin,
            r if r.eq_ignore_ascii_case("staff") => UserRole::Staff,
            r if r.eq_ignore_ascii_case("customer") => UserRole::Customer,
            other => UserRole::Other(other.to_string()),
        })
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for UserRole {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for UserRole {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(s.parse().unwrap_or(UserRole::Other(s)))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Organization {
    pub id: i64,
    pub name: String,
    pub registration_number: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub country: String,
    pub website: Option<String>,
    pub logo_url: Option<String>,
    pub is_active: bool,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub parent_organization_id: Option<i64>,
    /// Organization kind (hotel, ferry operator, park, ...) as a backend enum value
    #[serde(rename = "type")]
    pub org_type: i32,
}

/// Payload for creating an organization
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrganization {
    pub name: String,
    pub registration_number: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub country: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    #[serde(rename = "type")]
    pub org_type: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub phone_number: Option<String>,
    pub is_active: bool,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub organization_id: Option<i64>,
    pub org_id: Option<i64>,
    pub staff_role: Option<String>,
}

/// Payload for self-registration of a customer account
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerRegistration {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    pub password_confirm: String,
}

/// Payload for creating a staff member under an organization
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewStaff {
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub org_id: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceTypeRef {
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Service {
    pub id: Option<i64>,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub org_id: i64,
    pub service_type_id: i64,
    pub capacity: Option<i32>,
    pub duration_in_minutes: Option<i32>,
    pub image_url: Option<String>,
    pub service_type: Option<ServiceTypeRef>,
}

/// Payload for creating a service (room, ferry seat, event ticket, ...)
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewService {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub org_id: i64,
    pub service_type_id: i64,
    pub capacity: i32,
    pub duration_in_minutes: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewServiceType {
    pub name: String,
}

/// Query filter for service listings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceFilter {
    pub org_id: Option<i64>,
    pub type_id: Option<i64>,
}

impl ServiceFilter {
    pub fn for_organization(org_id: i64) -> Self {
        Self {
            org_id: Some(org_id),
            type_id: None,
        }
    }

    pub fn with_type(mut self, type_id: i64) -> Self {
        self.type_id = Some(type_id);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServiceOrder {
    pub id: i64,
    pub service_id: i64,
    pub quantity: u32,
    pub scheduled_for: Option<String>,
    pub status: Option<String>,
    pub total_price: Option<f64>,
    pub created_at: Option<String>,
    pub service: Option<Service>,
}

/// Payload for booking a service
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewServiceOrder {
    pub service_id: i64,
    pub quantity: u32,
    #[serde(serialize_with = "serialize_iso8601")]
    pub scheduled_for: DateTime<Utc>,
}

impl NewServiceOrder {
    /// Order scheduled for the current instant
    pub fn now(service_id: i64, quantity: u32) -> Self {
        Self {
            service_id,
            quantity,
            scheduled_for: Utc::now(),
        }
    }
}

fn serialize_iso8601<S: Serializer>(dt: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&dt.to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// Accept an identifier encoded either as a JSON string or a number
pub(crate) fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) if !s.is_empty() => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}
