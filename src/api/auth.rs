use reqwest::Method;

use crate::error::AppResult;

use super::models::{AuthResponse, LoginRequest, RenewTokenRequest};
use super::ApiClient;

impl ApiClient {
    /// `POST /auth/login`. Sent without credentials if none are stored.
    pub async fn login(&self, email: &str, password: &str) -> AppResult<AuthResponse> {
        let body = LoginRequest { email: email.to_string(), password: password.to_string() };
        let rb = self.request(Method::POST, "auth/login")?.json(&body);
        self.fetch(rb, "POST /auth/login").await
    }

    /// Exchange `token` for a fresh one carrying updated claims.
    pub async fn renew_token(&self, token: &str) -> AppResult<AuthResponse> {
        let body = RenewTokenRequest { token: token.to_string() };
        let rb = self.request(Method::POST, "auth/renew-token")?.json(&body);
        self.fetch(rb, "POST /auth/renew-token").await
    }
}
