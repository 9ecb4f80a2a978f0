use std::fmt::{Display, Formatter};

use crate::error::AppError;
use crate::identity::UnauthenticatedReason;

/// The user-visible outcome of an operation: what a front end pops up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub title: String,
    pub message: String,
}

/// Everything the client can attempt on the user's behalf.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Login,
    Logout,
    LoadUser,
    LoadAppointments,
    ConfirmAppointment,
    CancelAppointment,
    DeleteAppointment,
    EditAppointment,
    BookAppointment,
    LoadTreatmentGroups,
    LoadTreatments,
    UpdateTreatment,
    LoadEquipment,
    UpdateEquipment,
    LoadFeedback,
    ToggleFeedback,
    DeleteFeedback,
    SaveProfile,
}

impl Operation {
    pub fn failure_message(&self) -> &'static str {
        match self {
            Operation::Login => "Login failed. Check your credentials.",
            Operation::Logout => "Could not log out.",
            Operation::LoadUser => "Failed to load user information",
            Operation::LoadAppointments => "Failed to load appointments",
            Operation::ConfirmAppointment => "Failed to confirm appointment",
            Operation::CancelAppointment => "Failed to cancel appointment",
            Operation::DeleteAppointment => "Failed to delete appointment",
            Operation::EditAppointment => "Failed to update the appointment.",
            Operation::BookAppointment => "Failed to book the appointment.",
            Operation::LoadTreatmentGroups => "Failed to load treatment groups.",
            Operation::LoadTreatments => "Failed to load treatments.",
            Operation::UpdateTreatment => "Failed to update the treatment.",
            Operation::LoadEquipment => "Failed to load equipment.",
            Operation::UpdateEquipment => "Failed to update the equipment.",
            Operation::LoadFeedback => "Failed to load feedback.",
            Operation::ToggleFeedback => "Failed to mark feedback as read.",
            Operation::DeleteFeedback => "Failed to delete feedback.",
            Operation::SaveProfile => "Failed to update profile",
        }
    }

    /// Only mutations confirm success to the user.
    pub fn success_message(&self) -> Option<&'static str> {
        match self {
            Operation::EditAppointment => Some("Appointment updated successfully!"),
            Operation::BookAppointment => Some("Appointment booked successfully!"),
            Operation::UpdateTreatment => Some("Treatment updated successfully!"),
            Operation::UpdateEquipment => Some("Equipment updated successfully!"),
            Operation::SaveProfile => Some("Profile updated successfully"),
            _ => None,
        }
    }
}

impl Alert {
    pub fn new<S: Into<String>>(title: S, message: S) -> Self {
        Self { title: title.into(), message: message.into() }
    }

    /// Validation failures show their own message; anything else shows the
    /// operation's failure text, with the server's reason when it gave one.
    pub fn failure(op: Operation, err: &AppError) -> Self {
        match err {
            AppError::Validation { message, .. } => Alert::new("Error", message.as_str()),
            AppError::Decode { .. } => Alert::new("Error", Operation::LoadUser.failure_message()),
            AppError::Rejected { message, .. } if !message.is_empty() => {
                Alert::new("Error".to_string(), format!("{} ({})", op.failure_message(), message))
            }
            _ => Alert::new("Error", op.failure_message()),
        }
    }

    pub fn success(op: Operation) -> Option<Self> {
        op.success_message().map(|m| Alert::new("Success", m))
    }

    /// Alert for a session that could not be read. A plain logged-out state needs none.
    pub fn session(reason: &UnauthenticatedReason) -> Option<Self> {
        match reason {
            UnauthenticatedReason::NoToken => None,
            UnauthenticatedReason::MalformedToken(_) | UnauthenticatedReason::StoreUnavailable(_) => {
                Some(Alert::new("Error", Operation::LoadUser.failure_message()))
            }
        }
    }
}

impl Display for Alert {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.title, self.message)
    }
}
