//! View models for the client screens.
//!
//! Pure and synchronous: everything here takes already-fetched data (or raw form
//! input) and produces what a front end displays or submits. No I/O.

pub mod alert;
pub mod catalog;
pub mod dashboard;
pub mod format;
pub mod forms;

pub use alert::{Alert, Operation};
pub use catalog::{filter_by_name, Named, TreatmentPicker};
pub use dashboard::{apply_action, greeting, AppointmentCard, CardDetail, Dashboard, Header, ProfileView, Tab, TabKind};
pub use format::{duration_label, equipment_status_label, format_datetime, format_price_br, permission_label, stars, status_label};
pub use forms::{AppointmentEdit, AppointmentForm, EquipmentForm, LoginForm, ProfileForm, TreatmentForm};
