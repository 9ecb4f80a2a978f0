use reqwest::Method;

use crate::error::AppResult;

use super::models::{Equipment, EquipmentUpdate, Id, Treatment, TreatmentGroup, TreatmentUpdate};
use super::ApiClient;

impl ApiClient {
    pub async fn list_treatments(&self) -> AppResult<Vec<Treatment>> {
        let rb = self.request(Method::GET, "treatment")?;
        self.fetch(rb, "GET /treatment").await
    }

    pub async fn update_treatment(&self, id: Id, update: &TreatmentUpdate) -> AppResult<()> {
        let rb = self.request(Method::PATCH, &format!("treatment/{}", id))?.json(update);
        self.submit(rb, "PATCH /treatment/{id}").await
    }

    /// Groups with their categories and treatments nested, for the booking picker.
    pub async fn list_treatment_groups(&self) -> AppResult<Vec<TreatmentGroup>> {
        let rb = self.request(Method::GET, "treatment-group")?;
        self.fetch(rb, "GET /treatment-group").await
    }

    pub async fn list_equipment(&self) -> AppResult<Vec<Equipment>> {
        let rb = self.request(Method::GET, "equipment")?;
        self.fetch(rb, "GET /equipment").await
    }

    pub async fn update_equipment(&self, id: Id, update: &EquipmentUpdate) -> AppResult<()> {
        let rb = self.request(Method::PATCH, &format!("equipment/{}", id))?.json(update);
        self.submit(rb, "PATCH /equipment/{id}").await
    }
}
