use chrono::Local;

use crate::api::models::{Appointment, AppointmentStatus, Id};
use crate::identity::{appointment_actions, AppointmentAction, Role, SessionView};

use super::format::{duration_label, format_datetime, format_price_br, permission_label, status_label};

pub fn greeting(hour: u32) -> &'static str {
    match hour {
        0..=11 => "Good morning",
        12..=17 => "Good afternoon",
        _ => "Good evening",
    }
}

/// Status an appointment ends up in after `action` succeeds.
pub fn apply_action(status: AppointmentStatus, action: AppointmentAction) -> AppointmentStatus {
    action.resulting_status().unwrap_or(status)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub greeting: String,
    pub name: String,
    pub avatar_url: String,
    pub role: Role,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabKind {
    Confirmed,
    Pending,
    Canceled,
}

impl TabKind {
    pub const ALL: [TabKind; 3] = [TabKind::Confirmed, TabKind::Pending, TabKind::Canceled];

    pub fn status(&self) -> AppointmentStatus {
        match self {
            TabKind::Confirmed => AppointmentStatus::Confirmed,
            TabKind::Pending => AppointmentStatus::Pending,
            TabKind::Canceled => AppointmentStatus::Canceled,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            TabKind::Confirmed => "Confirmed",
            TabKind::Pending => "Pending",
            TabKind::Canceled => "Canceled",
        }
    }

    pub fn empty_message(&self) -> &'static str {
        match self {
            TabKind::Confirmed => "You have no confirmed appointments. Check your pending appointments in the \"PENDING\" tab or book a new treatment with the \"+\" button.",
            TabKind::Pending => "No pending appointments",
            TabKind::Canceled => "No canceled appointments",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardDetail {
    Admin {
        client_name: String,
        client_phone: String,
        actions: Vec<AppointmentAction>,
    },
    User {
        categories: String,
        duration: String,
        /// Empty for canceled appointments.
        price_label: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppointmentCard {
    pub id: Id,
    pub treatment: String,
    pub when: String,
    pub status: AppointmentStatus,
    pub status_label: &'static str,
    pub detail: CardDetail,
}

impl AppointmentCard {
    pub fn build(role: &Role, a: &Appointment) -> Self {
        let detail = if role.is_admin() {
            let (client_name, client_phone) = a
                .client
                .as_ref()
                .map(|c| (c.name.clone(), c.phone.clone().unwrap_or_default()))
                .unwrap_or_default();
            CardDetail::Admin { client_name, client_phone, actions: appointment_actions(role, a.status) }
        } else {
            let price = format_price_br(&a.treatment.price);
            let price_label = match a.status {
                AppointmentStatus::Confirmed => format!("Paid {}", price),
                AppointmentStatus::Pending => price,
                AppointmentStatus::Canceled => String::new(),
            };
            CardDetail::User {
                categories: a.treatment.categories.iter().map(|c| c.name.as_str()).collect::<Vec<_>>().join(", "),
                duration: duration_label(a.treatment.duration),
                price_label,
            }
        };
        Self {
            id: a.id,
            treatment: a.treatment.name.clone(),
            when: format_datetime(&a.date.with_timezone(&Local)),
            status: a.status,
            status_label: status_label(a.status),
            detail,
        }
    }

    /// Admin actions on this card; always empty for user cards.
    pub fn actions(&self) -> &[AppointmentAction] {
        match &self.detail {
            CardDetail::Admin { actions, .. } => actions,
            CardDetail::User { .. } => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tab {
    pub kind: TabKind,
    pub cards: Vec<AppointmentCard>,
}

impl Tab {
    pub fn title(&self) -> &'static str { self.kind.title() }

    /// `None` when there is something to list.
    pub fn empty_message(&self) -> Option<&'static str> {
        if self.cards.is_empty() { Some(self.kind.empty_message()) } else { None }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dashboard {
    pub header: Header,
    pub tabs: Vec<Tab>,
}

impl Dashboard {
    /// Split `appointments` into the three status tabs, keeping server order within each.
    pub fn build(session: &SessionView, appointments: &[Appointment], hour: u32) -> Self {
        let header = Header {
            greeting: greeting(hour).to_string(),
            name: session.name.clone(),
            avatar_url: session.avatar_url.clone(),
            role: session.role.clone(),
        };
        let tabs = TabKind::ALL
            .iter()
            .map(|kind| Tab {
                kind: *kind,
                cards: appointments
                    .iter()
                    .filter(|a| a.status == kind.status())
                    .map(|a| AppointmentCard::build(&session.role, a))
                    .collect(),
            })
            .collect();
        Self { header, tabs }
    }

    pub fn tab(&self, kind: TabKind) -> Option<&Tab> { self.tabs.iter().find(|t| t.kind == kind) }

    pub fn card(&self, id: Id) -> Option<&AppointmentCard> {
        self.tabs.iter().flat_map(|t| t.cards.iter()).find(|c| c.id == id)
    }
}

/// Profile screen summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileView {
    pub name: String,
    pub email: String,
    pub avatar_url: String,
    pub permission: &'static str,
}

impl ProfileView {
    pub fn from_session(view: &SessionView) -> Self {
        Self {
            name: view.name.clone(),
            email: view.email.clone().unwrap_or_default(),
            avatar_url: view.avatar_url.clone(),
            permission: permission_label(&view.role),
        }
    }
}
