//! Raw form input and its validation into request bodies.
//!
//! A form that fails validation never produces a body, so nothing reaches the network.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

use crate::api::models::{
    AppointmentPatch, AppointmentStatus, Equipment, EquipmentStatus, EquipmentUpdate, Id, LoginRequest,
    NewAppointment, ProfileUpdate, Treatment, TreatmentUpdate,
};
use crate::error::{AppError, AppResult};

const FILL_ALL_FIELDS: &str = "Please fill in all fields.";

fn missing(field: &str) -> AppError {
    AppError::validation(format!("missing_{}", field), FILL_ALL_FIELDS.to_string())
}

fn required(value: &str, field: &str) -> AppResult<String> {
    let v = value.trim();
    if v.is_empty() { Err(missing(field)) } else { Ok(v.to_string()) }
}

fn optional(value: &Option<String>) -> Option<String> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    pub fn new(email: &str, password: &str) -> Self {
        Self { email: email.to_string(), password: password.to_string() }
    }

    pub fn validate(&self) -> AppResult<LoginRequest> {
        let email = required(&self.email, "email")?;
        // passwords are sent as typed
        if self.password.is_empty() {
            return Err(missing("password"));
        }
        Ok(LoginRequest { email, password: self.password.clone() })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreatmentForm {
    pub name: String,
    pub description: String,
    pub price: String,
    pub duration: String,
}

impl TreatmentForm {
    pub fn from_treatment(t: &Treatment) -> Self {
        Self { name: t.name.clone(), description: t.description.clone(), price: t.price.clone(), duration: t.duration.to_string() }
    }

    pub fn validate(&self) -> AppResult<TreatmentUpdate> {
        let name = required(&self.name, "name")?;
        let description = required(&self.description, "description")?;
        let price = required(&self.price, "price")?.replace(',', ".");
        let duration = required(&self.duration, "duration")?;

        match price.parse::<f64>() {
            Ok(p) if p.is_finite() && p >= 0.0 => {}
            _ => return Err(AppError::validation("invalid_price".to_string(), format!("'{}' is not a valid price.", self.price.trim()))),
        }
        let duration = match duration.parse::<u32>() {
            Ok(d) if d > 0 => d,
            _ => return Err(AppError::validation("invalid_duration".to_string(), format!("'{}' is not a duration in minutes.", duration))),
        };
        Ok(TreatmentUpdate { name, description, price, duration })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EquipmentForm {
    pub name: String,
    pub description: String,
    pub status: String,
    pub is_active: bool,
}

impl EquipmentForm {
    pub fn from_equipment(e: &Equipment) -> Self {
        Self { name: e.name.clone(), description: e.description.clone(), status: e.status.as_str().to_string(), is_active: e.is_active }
    }

    pub fn validate(&self) -> AppResult<EquipmentUpdate> {
        let name = required(&self.name, "name")?;
        let status = EquipmentStatus::parse(&self.status)?;
        Ok(EquipmentUpdate { name, description: self.description.trim().to_string(), status, is_active: self.is_active })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileForm {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub avatar_url: Option<String>,
}

impl ProfileForm {
    pub fn validate(&self) -> AppResult<ProfileUpdate> {
        let name = required(&self.name, "name")?;
        let email = required(&self.email, "email")?;
        if !email.contains('@') {
            return Err(AppError::validation("invalid_email".to_string(), format!("'{}' is not an email address.", email)));
        }
        Ok(ProfileUpdate {
            name,
            email,
            phone: optional(&self.phone),
            address: optional(&self.address),
            avatar_url: optional(&self.avatar_url),
        })
    }
}

/// New booking. Date and time are edited separately, in UTC.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppointmentForm {
    pub treatment_id: Option<Id>,
    pub when: DateTime<Utc>,
}

impl AppointmentForm {
    pub fn new(when: DateTime<Utc>) -> Self { Self { treatment_id: None, when } }

    pub fn with_treatment(mut self, id: Id) -> Self {
        self.treatment_id = Some(id);
        self
    }

    /// Replace the calendar day, keeping the time of day.
    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.when = date.and_time(self.when.time()).and_utc();
        self
    }

    /// Replace the time of day, keeping the calendar day.
    pub fn with_time(mut self, time: NaiveTime) -> Self {
        self.when = self.when.date_naive().and_time(time).and_utc();
        self
    }

    pub fn validate(&self, client_id: Id) -> AppResult<NewAppointment> {
        let treatment_id = self
            .treatment_id
            .ok_or_else(|| AppError::validation("missing_treatment", "Select a treatment."))?;
        Ok(NewAppointment { client_id, treatment_id, date: self.when, status: AppointmentStatus::Pending })
    }
}

/// Admin edit of an existing appointment: new date, optionally a new status.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppointmentEdit {
    pub date: Option<DateTime<Utc>>,
    pub status: Option<String>,
}

impl AppointmentEdit {
    pub fn validate(&self) -> AppResult<AppointmentPatch> {
        let date = self.date.ok_or_else(|| missing("date"))?;
        let status = match optional(&self.status) {
            Some(s) => Some(AppointmentStatus::parse(&s)?),
            None => None,
        };
        Ok(AppointmentPatch { date: Some(date), status })
    }
}
