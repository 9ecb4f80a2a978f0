use reqwest::Method;

use crate::error::AppResult;

use super::models::{Id, ProfileUpdate};
use super::ApiClient;

impl ApiClient {
    pub async fn update_user(&self, id: Id, update: &ProfileUpdate) -> AppResult<()> {
        let rb = self.request(Method::PATCH, &format!("user/{}", id))?.json(update);
        self.submit(rb, "PATCH /user/{id}").await
    }
}
