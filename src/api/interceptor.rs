use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use tracing::{debug, warn};

use crate::identity::decode_role_claim;
use crate::storage::{SharedTokenStore, ROLE_KEY, TOKEN_KEY};

/// Attaches the stored bearer token to outgoing requests.
///
/// Best effort throughout: a missing, unreadable or undecodable token means the
/// request goes out without credentials and the server answers 401.
#[derive(Clone)]
pub struct RequestInterceptor {
    store: SharedTokenStore,
}

impl RequestInterceptor {
    pub fn new(store: SharedTokenStore) -> Self { Self { store } }

    pub fn authorize(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        let token = match self.store.get(TOKEN_KEY) {
            Ok(Some(t)) => t,
            Ok(None) => return headers,
            Err(e) => {
                warn!("token store read failed, sending request unauthenticated: {}", e);
                return headers;
            }
        };

        match decode_role_claim(&token) {
            Ok(Some(role)) => {
                if let Err(e) = self.store.set(ROLE_KEY, &role) {
                    warn!("could not cache role: {}", e);
                }
            }
            Ok(None) => {}
            Err(e) => {
                warn!("stored token payload unreadable, sending request unauthenticated: {}", e);
                return headers;
            }
        }

        match HeaderValue::from_str(&format!("Bearer {}", token)) {
            Ok(mut value) => {
                value.set_sensitive(true);
                headers.insert(AUTHORIZATION, value);
            }
            Err(_) => warn!("stored token is not a valid header value; request sent without it"),
        }
        debug!(authorized = headers.contains_key(AUTHORIZATION), "request intercepted");
        headers
    }
}
