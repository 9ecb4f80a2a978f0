use crate::api::models::{Equipment, Id, Treatment, TreatmentCategory, TreatmentGroup};
use crate::error::{AppError, AppResult};

use super::format::format_price_br;

pub trait Named {
    fn name(&self) -> &str;
}

impl Named for Treatment {
    fn name(&self) -> &str { &self.name }
}

impl Named for Equipment {
    fn name(&self) -> &str { &self.name }
}

impl Named for TreatmentGroup {
    fn name(&self) -> &str { &self.name }
}

impl Named for TreatmentCategory {
    fn name(&self) -> &str { &self.name }
}

/// Case-insensitive substring search on the display name. Blank text keeps everything.
pub fn filter_by_name<'a, T: Named>(items: &'a [T], text: &str) -> Vec<&'a T> {
    let needle = text.trim().to_lowercase();
    items.iter().filter(|i| needle.is_empty() || i.name().to_lowercase().contains(&needle)).collect()
}

/// Cascading group → category → treatment selection used when booking.
#[derive(Debug, Clone, Default)]
pub struct TreatmentPicker {
    groups: Vec<TreatmentGroup>,
    group: Option<Id>,
    category: Option<Id>,
    treatment: Option<Id>,
}

impl TreatmentPicker {
    pub fn new(groups: Vec<TreatmentGroup>) -> Self {
        Self { groups, ..Default::default() }
    }

    pub fn groups(&self) -> &[TreatmentGroup] { &self.groups }

    fn selected_group(&self) -> Option<&TreatmentGroup> {
        self.group.and_then(|id| self.groups.iter().find(|g| g.id == id))
    }

    fn selected_category(&self) -> Option<&TreatmentCategory> {
        let id = self.category?;
        self.selected_group()?.categories.iter().find(|c| c.id == id)
    }

    /// Categories of the selected group; empty until a group is chosen.
    pub fn categories(&self) -> &[TreatmentCategory] {
        self.selected_group().map(|g| g.categories.as_slice()).unwrap_or(&[])
    }

    pub fn treatments(&self) -> &[Treatment] {
        self.selected_category().map(|c| c.treatments.as_slice()).unwrap_or(&[])
    }

    pub fn selected_treatment(&self) -> Option<&Treatment> {
        let id = self.treatment?;
        self.treatments().iter().find(|t| t.id == id)
    }

    pub fn select_group(&mut self, id: Id) -> AppResult<()> {
        if !self.groups.iter().any(|g| g.id == id) {
            return Err(unknown("group", id));
        }
        if self.group != Some(id) {
            self.group = Some(id);
            self.category = None;
            self.treatment = None;
        }
        Ok(())
    }

    pub fn select_category(&mut self, id: Id) -> AppResult<()> {
        if !self.categories().iter().any(|c| c.id == id) {
            return Err(unknown("category", id));
        }
        if self.category != Some(id) {
            self.category = Some(id);
            self.treatment = None;
        }
        Ok(())
    }

    pub fn select_treatment(&mut self, id: Id) -> AppResult<()> {
        if !self.treatments().iter().any(|t| t.id == id) {
            return Err(unknown("treatment", id));
        }
        self.treatment = Some(id);
        Ok(())
    }

    /// Price of the chosen treatment, `R$ 0,00` before one is chosen.
    pub fn price_label(&self) -> String {
        format_price_br(self.selected_treatment().map(|t| t.price.as_str()).unwrap_or("0"))
    }

    /// Locate a treatment anywhere in the tree and select its whole path.
    pub fn select_by_treatment(&mut self, treatment_id: Id) -> AppResult<()> {
        let path = self.groups.iter().find_map(|g| {
            g.categories.iter().find_map(|c| {
                c.treatments.iter().any(|t| t.id == treatment_id).then_some((g.id, c.id))
            })
        });
        let (group, category) = path.ok_or_else(|| unknown("treatment", treatment_id))?;
        self.select_group(group)?;
        self.select_category(category)?;
        self.select_treatment(treatment_id)
    }
}

fn unknown(what: &str, id: Id) -> AppError {
    AppError::validation("unknown_selection".to_string(), format!("no {} with id {}", what, id))
}
