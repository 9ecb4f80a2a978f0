//! Session-aware facade over the API client.
//!
//! One method per user action. Each is an independent sequence of awaits: no
//! deduplication, no cancellation and no locking beyond what the token store does.

use std::sync::Arc;

use tracing::{debug, info};

use crate::api::models::{Appointment, AppointmentPatch, AppointmentStatus, Equipment, Feedback, Id, Treatment, TreatmentGroup};
use crate::api::ApiClient;
use crate::config::ClientConfig;
use crate::error::{AppError, AppResult};
use crate::identity::{require, Capability, SessionResolver, SessionStatus, SessionView};
use crate::storage::{KvStore, MemoryStore, SharedTokenStore, TOKEN_KEY};
use crate::views::{
    filter_by_name, AppointmentEdit, AppointmentForm, Dashboard, EquipmentForm, LoginForm, ProfileForm, TreatmentForm,
};

#[derive(Clone)]
pub struct ClinicClient {
    store: SharedTokenStore,
    session: SessionResolver,
    api: ApiClient,
}

impl ClinicClient {
    pub fn new(cfg: &ClientConfig, store: SharedTokenStore) -> AppResult<Self> {
        let api = ApiClient::from_config(cfg, store.clone())?;
        Ok(Self { session: SessionResolver::new(store.clone()), store, api })
    }

    /// Client persisting its session under `cfg.state_dir`.
    pub fn open(cfg: &ClientConfig) -> AppResult<Self> {
        let store: SharedTokenStore = Arc::new(KvStore::open(&cfg.state_dir)?);
        Self::new(cfg, store)
    }

    /// Client whose session lives only as long as the process.
    pub fn ephemeral(cfg: &ClientConfig) -> AppResult<Self> {
        Self::new(cfg, Arc::new(MemoryStore::new()))
    }

    pub fn api(&self) -> &ApiClient { &self.api }

    pub fn store(&self) -> &SharedTokenStore { &self.store }

    pub fn session(&self) -> SessionStatus { self.session.resolve() }

    fn authenticated(&self) -> AppResult<SessionView> {
        match self.session.resolve() {
            SessionStatus::Authenticated(v) => Ok(v),
            SessionStatus::Unauthenticated(reason) => {
                Err(AppError::auth("not_logged_in".to_string(), format!("no usable session ({:?})", reason)))
            }
        }
    }

    /// Fails with an auth error unless the current session has `cap`.
    fn gate(&self, cap: Capability) -> AppResult<SessionView> {
        let view = self.authenticated()?;
        require(&view.role, cap)?;
        Ok(view)
    }

    pub async fn login(&self, form: &LoginForm) -> AppResult<SessionView> {
        let body = form.validate()?;
        let auth = self.api.login(&body.email, &body.password).await?;
        self.session.establish(&auth.access_token, &auth.user)?;
        let view = self.authenticated().map_err(|_| {
            AppError::decode("invalid_token".to_string(), "login succeeded but the issued token does not decode".to_string())
        })?;
        info!(user_id = view.id, role = %view.role, "logged in");
        Ok(view)
    }

    pub fn logout(&self) -> AppResult<()> {
        self.session.clear()?;
        info!("logged out");
        Ok(())
    }

    pub async fn dashboard(&self, hour: u32) -> AppResult<Dashboard> {
        let view = self.authenticated()?;
        let appointments = self.api.list_appointments().await?;
        debug!(count = appointments.len(), "appointments loaded");
        Ok(Dashboard::build(&view, &appointments, hour))
    }

    pub async fn appointments(&self) -> AppResult<Vec<Appointment>> {
        self.authenticated()?;
        self.api.list_appointments().await
    }

    async fn set_status(&self, id: Id, status: AppointmentStatus) -> AppResult<()> {
        self.gate(Capability::ManageAppointments)?;
        self.api.update_appointment(id, &AppointmentPatch::status(status)).await
    }

    pub async fn confirm_appointment(&self, id: Id) -> AppResult<()> {
        self.set_status(id, AppointmentStatus::Confirmed).await
    }

    pub async fn cancel_appointment(&self, id: Id) -> AppResult<()> {
        self.set_status(id, AppointmentStatus::Canceled).await
    }

    pub async fn delete_appointment(&self, id: Id) -> AppResult<()> {
        self.gate(Capability::ManageAppointments)?;
        self.api.delete_appointment(id).await
    }

    pub async fn edit_appointment(&self, id: Id, edit: &AppointmentEdit) -> AppResult<()> {
        let patch = edit.validate()?;
        self.gate(Capability::ManageAppointments)?;
        self.api.update_appointment(id, &patch).await
    }

    /// Books for the logged-in user. Falls back to the cached id when the token omits it.
    pub async fn book_appointment(&self, form: &AppointmentForm) -> AppResult<()> {
        let view = self.gate(Capability::BookAppointment)?;
        let client_id = if view.id > 0 { view.id } else {
            self.session.cached_user_id().ok_or_else(|| AppError::auth("not_logged_in", "no user id in session"))?
        };
        let body = form.validate(client_id)?;
        self.api.create_appointment(&body).await
    }

    pub async fn treatment_groups(&self) -> AppResult<Vec<TreatmentGroup>> {
        self.api.list_treatment_groups().await
    }

    pub async fn treatments(&self, filter: &str) -> AppResult<Vec<Treatment>> {
        let all = self.api.list_treatments().await?;
        Ok(filter_by_name(&all, filter).into_iter().cloned().collect())
    }

    pub async fn update_treatment(&self, id: Id, form: &TreatmentForm) -> AppResult<()> {
        let body = form.validate()?;
        self.gate(Capability::ManageTreatments)?;
        self.api.update_treatment(id, &body).await
    }

    pub async fn equipment(&self, filter: &str) -> AppResult<Vec<Equipment>> {
        let all = self.api.list_equipment().await?;
        Ok(filter_by_name(&all, filter).into_iter().cloned().collect())
    }

    pub async fn update_equipment(&self, id: Id, form: &EquipmentForm) -> AppResult<()> {
        let body = form.validate()?;
        self.gate(Capability::ManageEquipment)?;
        self.api.update_equipment(id, &body).await
    }

    pub async fn feedback(&self, unread: bool) -> AppResult<Vec<Feedback>> {
        self.gate(Capability::ReviewFeedback)?;
        self.api.list_feedback(unread).await
    }

    /// Flip the read flag of `feedback` as last seen by the caller.
    pub async fn toggle_feedback_read(&self, feedback: &Feedback) -> AppResult<()> {
        self.gate(Capability::ReviewFeedback)?;
        self.api.set_feedback_read(feedback.id, !feedback.readed).await
    }

    pub async fn delete_feedback(&self, id: Id) -> AppResult<()> {
        self.gate(Capability::ReviewFeedback)?;
        self.api.delete_feedback(id).await
    }

    /// Update the profile, then swap the token for one carrying the new claims.
    pub async fn save_profile(&self, form: &ProfileForm) -> AppResult<SessionView> {
        let body = form.validate()?;
        let view = self.gate(Capability::EditProfile)?;
        self.api.update_user(view.id, &body).await?;

        let old_token = self
            .store
            .get(TOKEN_KEY)?
            .ok_or_else(|| AppError::auth("not_logged_in", "session ended during profile update"))?;
        let renewed = self.api.renew_token(&old_token).await?;
        self.session.establish(&renewed.access_token, &renewed.user)?;
        info!(user_id = view.id, "profile updated");
        self.authenticated()
    }
}
