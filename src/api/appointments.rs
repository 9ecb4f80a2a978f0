use reqwest::Method;

use crate::error::AppResult;

use super::models::{Appointment, AppointmentPatch, Id, NewAppointment};
use super::ApiClient;

impl ApiClient {
    /// Appointments visible to the caller: all of them for admins, their own for users.
    pub async fn list_appointments(&self) -> AppResult<Vec<Appointment>> {
        let rb = self.request(Method::GET, "appointment")?;
        self.fetch(rb, "GET /appointment").await
    }

    pub async fn create_appointment(&self, appointment: &NewAppointment) -> AppResult<()> {
        let rb = self.request(Method::POST, "appointment")?.json(appointment);
        self.submit(rb, "POST /appointment").await
    }

    pub async fn update_appointment(&self, id: Id, patch: &AppointmentPatch) -> AppResult<()> {
        let rb = self.request(Method::PATCH, &format!("appointment/{}", id))?.json(patch);
        self.submit(rb, "PATCH /appointment/{id}").await
    }

    pub async fn delete_appointment(&self, id: Id) -> AppResult<()> {
        let rb = self.request(Method::DELETE, &format!("appointment/{}", id))?;
        self.submit(rb, "DELETE /appointment/{id}").await
    }
}
