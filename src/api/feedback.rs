use reqwest::Method;

use crate::error::AppResult;

use super::models::{Feedback, FeedbackPatch, Id};
use super::ApiClient;

impl ApiClient {
    /// `unread` selects the inbox; otherwise the already-read archive.
    pub async fn list_feedback(&self, unread: bool) -> AppResult<Vec<Feedback>> {
        let (path, endpoint) = if unread {
            ("feedback/unreaded", "GET /feedback/unreaded")
        } else {
            ("feedback/readed", "GET /feedback/readed")
        };
        let rb = self.request(Method::GET, path)?;
        self.fetch(rb, endpoint).await
    }

    pub async fn set_feedback_read(&self, id: Id, readed: bool) -> AppResult<()> {
        let rb = self.request(Method::PATCH, &format!("feedback/{}", id))?.json(&FeedbackPatch { readed });
        self.submit(rb, "PATCH /feedback/{id}").await
    }

    pub async fn delete_feedback(&self, id: Id) -> AppResult<()> {
        let rb = self.request(Method::DELETE, &format!("feedback/{}", id))?;
        self.submit(rb, "DELETE /feedback/{id}").await
    }
}
