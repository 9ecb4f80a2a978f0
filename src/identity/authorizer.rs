use crate::api::models::AppointmentStatus;
use crate::error::{AppError, AppResult};

use super::claims::Role;

/// Actions an administrator can take on an appointment card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AppointmentAction {
    Confirm,
    Edit,
    Cancel,
    Delete,
}

impl AppointmentAction {
    pub fn label(&self) -> &'static str {
        match self {
            AppointmentAction::Confirm => "Confirm",
            AppointmentAction::Edit => "Edit",
            AppointmentAction::Cancel => "Cancel",
            AppointmentAction::Delete => "Delete",
        }
    }

    /// Status the appointment moves to once the action succeeds, if it changes at all.
    pub fn resulting_status(&self) -> Option<AppointmentStatus> {
        match self {
            AppointmentAction::Confirm => Some(AppointmentStatus::Confirmed),
            AppointmentAction::Cancel => Some(AppointmentStatus::Canceled),
            AppointmentAction::Edit | AppointmentAction::Delete => None,
        }
    }
}

/// Admin action set per status; non-admins get none.
pub fn appointment_actions(role: &Role, status: AppointmentStatus) -> Vec<AppointmentAction> {
    if !role.is_admin() {
        return Vec::new();
    }
    match status {
        AppointmentStatus::Pending => vec![AppointmentAction::Confirm, AppointmentAction::Edit, AppointmentAction::Cancel],
        AppointmentStatus::Confirmed => vec![AppointmentAction::Edit, AppointmentAction::Cancel],
        AppointmentStatus::Canceled => vec![AppointmentAction::Edit, AppointmentAction::Delete],
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    BookAppointment,
    EditProfile,
    ManageAppointments,
    ManageTreatments,
    ManageEquipment,
    ReviewFeedback,
}

pub fn capabilities(role: &Role) -> Vec<Capability> {
    let mut caps = vec![Capability::BookAppointment, Capability::EditProfile];
    if role.is_admin() {
        caps.extend([
            Capability::ManageAppointments,
            Capability::ManageTreatments,
            Capability::ManageEquipment,
            Capability::ReviewFeedback,
        ]);
    }
    caps
}

/// Client-side pre-check before attempting an admin call. Advisory: the API still decides.
pub fn require(role: &Role, cap: Capability) -> AppResult<()> {
    if capabilities(role).contains(&cap) {
        Ok(())
    } else {
        Err(AppError::Auth { code: "forbidden".into(), message: format!("{:?} requires an administrator", cap) })
    }
}
