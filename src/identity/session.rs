use tracing::{debug, warn};

use crate::api::models::User;
use crate::error::AppResult;
use crate::storage::{SharedTokenStore, ID_KEY, NAME_KEY, ROLE_KEY, SESSION_KEYS, TOKEN_KEY};

use super::claims::{Claims, Role};
use super::token::{decode_claims, decode_role_claim};

/// Shown when the token carries no avatar.
pub const DEFAULT_AVATAR_URL: &str = "https://www.gravatar.com/avatar/";

/// Display-ready identity derived from the current token. Recomputed on every read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionView {
    pub id: i64,
    pub name: String,
    pub role: Role,
    pub avatar_url: String,
    pub email: Option<String>,
}

impl SessionView {
    pub fn from_claims(c: &Claims) -> Self {
        Self {
            id: c.id,
            name: c.name.clone(),
            role: c.role.clone(),
            avatar_url: c.avatar_url.clone().filter(|u| !u.is_empty()).unwrap_or_else(|| DEFAULT_AVATAR_URL.to_string()),
            email: c.email.clone(),
        }
    }

    pub fn is_admin(&self) -> bool { self.role.is_admin() }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnauthenticatedReason {
    NoToken,
    /// A token is stored but its payload does not decode; callers alert on this.
    MalformedToken(String),
    StoreUnavailable(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStatus {
    Authenticated(SessionView),
    Unauthenticated(UnauthenticatedReason),
}

impl SessionStatus {
    pub fn view(&self) -> Option<&SessionView> {
        match self {
            SessionStatus::Authenticated(v) => Some(v),
            SessionStatus::Unauthenticated(_) => None,
        }
    }

    pub fn into_view(self) -> Option<SessionView> {
        match self {
            SessionStatus::Authenticated(v) => Some(v),
            SessionStatus::Unauthenticated(_) => None,
        }
    }

    pub fn is_authenticated(&self) -> bool { matches!(self, SessionStatus::Authenticated(_)) }

    /// Role for branching; unauthenticated sessions branch as plain users.
    pub fn role(&self) -> Role {
        self.view().map(|v| v.role.clone()).unwrap_or(Role::User)
    }
}

/// Reads and writes the session entries of a token store.
///
/// Holds no state of its own: every `resolve` re-reads and re-decodes, so the view
/// always reflects the latest stored token.
#[derive(Clone)]
pub struct SessionResolver {
    store: SharedTokenStore,
}

impl SessionResolver {
    pub fn new(store: SharedTokenStore) -> Self { Self { store } }

    pub fn store(&self) -> &SharedTokenStore { &self.store }

    /// Never fails: absent, undecodable or unreadable tokens all resolve to unauthenticated.
    pub fn resolve(&self) -> SessionStatus {
        let token = match self.store.get(TOKEN_KEY) {
            Ok(Some(t)) => t,
            Ok(None) => return SessionStatus::Unauthenticated(UnauthenticatedReason::NoToken),
            Err(e) => {
                warn!("token store read failed: {}", e);
                return SessionStatus::Unauthenticated(UnauthenticatedReason::StoreUnavailable(e.message().to_string()));
            }
        };
        match decode_claims(&token) {
            Ok(claims) => {
                debug!(user_id = claims.id, role = %claims.role, "session resolved");
                SessionStatus::Authenticated(SessionView::from_claims(&claims))
            }
            Err(e) => {
                warn!("stored token does not decode: {}", e);
                SessionStatus::Unauthenticated(UnauthenticatedReason::MalformedToken(e.to_string()))
            }
        }
    }

    pub fn current(&self) -> Option<SessionView> { self.resolve().into_view() }

    /// Persist a freshly issued token (login or renewal), replacing any previous one.
    pub fn establish(&self, token: &str, user: &User) -> AppResult<()> {
        self.store.set(TOKEN_KEY, token)?;
        self.store.set(NAME_KEY, &user.name)?;
        self.store.set(ID_KEY, &user.id.to_string())?;
        match decode_role_claim(token) {
            Ok(Some(role)) => self.store.set(ROLE_KEY, &role)?,
            Ok(None) => {}
            // keep whatever the interceptor cached last; resolve() will report the token
            Err(e) => warn!("issued token does not decode: {}", e),
        }
        debug!(user_id = user.id, "session established");
        Ok(())
    }

    /// Logout. Removing already-absent keys is a no-op, so this is idempotent.
    pub fn clear(&self) -> AppResult<()> {
        for key in SESSION_KEYS {
            self.store.remove(key)?;
        }
        debug!("session cleared");
        Ok(())
    }

    pub fn cached_name(&self) -> Option<String> { self.store.get(NAME_KEY).ok().flatten() }

    pub fn cached_role(&self) -> Option<Role> { self.store.get(ROLE_KEY).ok().flatten().map(|r| Role::parse(&r)) }

    /// Stored user id, used when the token itself is unavailable.
    pub fn cached_user_id(&self) -> Option<i64> {
        self.store.get(ID_KEY).ok().flatten().and_then(|s| s.trim().parse().ok())
    }
}
