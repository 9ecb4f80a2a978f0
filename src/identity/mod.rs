//! Session identity for the booking client.
//! The bearer token is decoded locally for display and branching only; the API
//! remains the sole enforcer of access control.

mod claims;
mod token;
mod session;
mod authorizer;

pub use claims::{Claims, Role};
pub use token::{decode_claims, decode_role_claim, TokenDecodeError};
pub use session::{SessionResolver, SessionStatus, SessionView, UnauthenticatedReason, DEFAULT_AVATAR_URL};
pub use authorizer::{appointment_actions, capabilities, require, AppointmentAction, Capability};
