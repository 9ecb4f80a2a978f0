//! Wire schemas for the booking API.
//!
//! Every response is decoded into one of these types; a payload that does not fit
//! (missing field, unknown status, out-of-range rating) surfaces as
//! `AppError::Malformed` instead of flowing into the views half-parsed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{AppError, AppResult};

pub type Id = i64;

/// Ids arrive as numbers from most endpoints and as numeric strings from a few.
pub fn de_id<'de, D: Deserializer<'de>>(d: D) -> Result<Id, D::Error> {
    use serde::de::Error;
    match serde_json::Value::deserialize(d)? {
        serde_json::Value::Number(n) => n.as_i64().ok_or_else(|| D::Error::custom(format!("id {} is not an integer", n))),
        serde_json::Value::String(s) => s.trim().parse::<i64>().map_err(|_| D::Error::custom(format!("id '{}' is not numeric", s))),
        other => Err(D::Error::custom(format!("unexpected id {}", other))),
    }
}

// Prices travel as decimal strings ("150.00") but some payloads send numbers.
fn de_price<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    use serde::de::Error;
    match serde_json::Value::deserialize(d)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(D::Error::custom(format!("unexpected price {}", other))),
    }
}

/// Post-decode checks the type system cannot express.
pub trait Validate {
    fn validate(&self) -> AppResult<()>;
}

impl<T: Validate> Validate for Vec<T> {
    fn validate(&self) -> AppResult<()> { self.iter().try_for_each(Validate::validate) }
}

fn check_price(owner: &str, id: Id, price: &str) -> AppResult<()> {
    match price.trim().parse::<f64>() {
        Ok(p) if p.is_finite() && p >= 0.0 => Ok(()),
        _ => Err(AppError::Malformed { code: "invalid_price".into(), message: format!("{} {} has price '{}'", owner, id, price) }),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    Canceled,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Pending => "pending",
            AppointmentStatus::Confirmed => "confirmed",
            AppointmentStatus::Canceled => "canceled",
        }
    }

    pub fn parse(s: &str) -> AppResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(AppointmentStatus::Pending),
            "confirmed" => Ok(AppointmentStatus::Confirmed),
            "canceled" | "cancelled" => Ok(AppointmentStatus::Canceled),
            other => Err(AppError::Validation { code: "invalid_status".into(), message: format!("unknown appointment status '{}'", other) }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRef {
    #[serde(deserialize_with = "de_id")]
    pub id: Id,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientSummary {
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreatmentSummary {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(deserialize_with = "de_price")]
    pub price: String,
    /// Minutes.
    pub duration: u32,
    #[serde(default)]
    pub categories: Vec<CategoryRef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    #[serde(deserialize_with = "de_id")]
    pub id: Id,
    pub date: DateTime<Utc>,
    pub status: AppointmentStatus,
    /// Present on admin listings.
    #[serde(default)]
    pub client: Option<ClientSummary>,
    pub treatment: TreatmentSummary,
}

impl Validate for Appointment {
    fn validate(&self) -> AppResult<()> { check_price("appointment", self.id, &self.treatment.price) }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Treatment {
    #[serde(deserialize_with = "de_id")]
    pub id: Id,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Minutes.
    pub duration: u32,
    #[serde(deserialize_with = "de_price")]
    pub price: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub categories: Vec<CategoryRef>,
}

fn default_true() -> bool { true }

impl Validate for Treatment {
    fn validate(&self) -> AppResult<()> { check_price("treatment", self.id, &self.price) }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreatmentCategory {
    #[serde(deserialize_with = "de_id")]
    pub id: Id,
    pub name: String,
    #[serde(default)]
    pub treatments: Vec<Treatment>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreatmentGroup {
    #[serde(deserialize_with = "de_id")]
    pub id: Id,
    pub name: String,
    #[serde(default)]
    pub categories: Vec<TreatmentCategory>,
}

impl Validate for TreatmentGroup {
    fn validate(&self) -> AppResult<()> {
        self.categories.iter().try_for_each(|c| c.treatments.validate())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EquipmentStatus {
    Available,
    Maintenance,
    /// Any status the client has no label for.
    #[serde(other)]
    Other,
}

impl EquipmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EquipmentStatus::Available => "available",
            EquipmentStatus::Maintenance => "maintenance",
            EquipmentStatus::Other => "other",
        }
    }

    pub fn parse(s: &str) -> AppResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "available" => Ok(EquipmentStatus::Available),
            "maintenance" => Ok(EquipmentStatus::Maintenance),
            other => Err(AppError::Validation { code: "invalid_status".into(), message: format!("unknown equipment status '{}'", other) }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Equipment {
    #[serde(deserialize_with = "de_id")]
    pub id: Id,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub status: EquipmentStatus,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl Validate for Equipment {
    fn validate(&self) -> AppResult<()> { Ok(()) }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackClient {
    #[serde(deserialize_with = "de_id")]
    pub id: Id,
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreatmentRef {
    #[serde(deserialize_with = "de_id")]
    pub id: Id,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    #[serde(deserialize_with = "de_id")]
    pub id: Id,
    pub rating: u8,
    #[serde(default)]
    pub comment: String,
    /// Wire name kept as the API spells it.
    pub readed: bool,
    pub client: FeedbackClient,
    pub treatment: TreatmentRef,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Validate for Feedback {
    fn validate(&self) -> AppResult<()> {
        if (1..=5).contains(&self.rating) {
            Ok(())
        } else {
            Err(AppError::Malformed { code: "invalid_rating".into(), message: format!("feedback {} has rating {}", self.id, self.rating) })
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(deserialize_with = "de_id")]
    pub id: Id,
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

// ---- request/response bodies ----

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Shared by `/auth/login` and `/auth/renew-token`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub user: User,
}

impl Validate for AuthResponse {
    fn validate(&self) -> AppResult<()> {
        if self.access_token.trim().is_empty() {
            return Err(AppError::Malformed { code: "empty_token".into(), message: "login response carries an empty access_token".into() });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RenewTokenRequest {
    pub token: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAppointment {
    pub client_id: Id,
    pub treatment_id: Id,
    pub date: DateTime<Utc>,
    pub status: AppointmentStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<AppointmentStatus>,
}

impl AppointmentPatch {
    pub fn status(status: AppointmentStatus) -> Self { Self { date: None, status: Some(status) } }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TreatmentUpdate {
    pub name: String,
    pub description: String,
    pub price: String,
    pub duration: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentUpdate {
    pub name: String,
    pub description: String,
    pub status: EquipmentStatus,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FeedbackPatch {
    pub readed: bool,
}
