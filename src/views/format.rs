use chrono::{DateTime, TimeZone};

use crate::api::models::{AppointmentStatus, EquipmentStatus};
use crate::identity::Role;

/// Brazilian currency rendering: `"1234.5"` becomes `"R$ 1.234,50"`.
///
/// Input that is not a number is returned unchanged behind the currency prefix.
pub fn format_price_br(price: &str) -> String {
    let value = match price.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => return format!("R$ {}", price.trim()),
    };
    let cents = (value.abs() * 100.0).round() as u64;
    let (units, frac) = (cents / 100, cents % 100);

    let digits = units.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    let sign = if value < 0.0 && cents > 0 { "-" } else { "" };
    format!("{}R$ {},{:02}", sign, grouped, frac)
}

/// `dd/MM/yyyy HH:mm` in whatever zone `dt` carries.
pub fn format_datetime<Tz: TimeZone>(dt: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    dt.format("%d/%m/%Y %H:%M").to_string()
}

pub fn status_label(status: AppointmentStatus) -> &'static str {
    match status {
        AppointmentStatus::Confirmed => "Confirmed",
        AppointmentStatus::Pending => "Pending",
        AppointmentStatus::Canceled => "Canceled",
    }
}

pub fn equipment_status_label(status: EquipmentStatus) -> &'static str {
    match status {
        EquipmentStatus::Available => "Available",
        // the list screen shows anything not available as under maintenance
        EquipmentStatus::Maintenance | EquipmentStatus::Other => "Under maintenance",
    }
}

pub fn permission_label(role: &Role) -> &'static str {
    if role.is_admin() { "Administrator" } else { "User" }
}

pub fn duration_label(minutes: u32) -> String { format!("{} minutes", minutes) }

/// Five-slot star bar; ratings above five are capped.
pub fn stars(rating: u8) -> String {
    let filled = rating.min(5) as usize;
    format!("{}{}", "★".repeat(filled), "☆".repeat(5 - filled))
}
