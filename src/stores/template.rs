//! Defines the recurring template store trait.

use time::Date;

use crate::{
    Error,
    database_id::TemplateId,
    recurring::{NewRecurringTemplate, RecurringTemplate, TemplatePatch},
};

/// Handles the retrieval and scheduling updates of recurring templates.
pub trait RecurringTemplateStore {
    /// Create a new template in the store.
    fn create(&mut self, template: NewRecurringTemplate) -> Result<RecurringTemplate, Error>;

    /// Retrieve a template from the store.
    fn get(&self, id: TemplateId) -> Result<RecurringTemplate, Error>;

    /// Retrieve templates from the store in the way defined by `query`.
    ///
    /// Templates are returned in the order they are stored.
    fn get_query(&self, query: TemplateQuery) -> Result<Vec<RecurringTemplate>, Error>;

    /// Apply `patch` to the template with `id`.
    ///
    /// Only the fields named by the patch are written.
    fn update(&mut self, id: TemplateId, patch: TemplatePatch) -> Result<(), Error>;
}

/// Defines how templates should be fetched from [RecurringTemplateStore::get_query].
///
/// Filters that are `None` are not applied.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TemplateQuery {
    /// Include templates whose `is_active` equals this value.
    pub is_active: Option<bool>,
    /// Include templates whose `auto_create` equals this value.
    pub auto_create: Option<bool>,
    /// Include templates whose next occurrence is on or before this date.
    pub due_on_or_before: Option<Date>,
}

impl TemplateQuery {
    /// The templates the generator should process on `today`: active, auto-creating and due.
    pub fn due(today: Date) -> Self {
        Self {
            is_active: Some(true),
            auto_create: Some(true),
            due_on_or_before: Some(today),
        }
    }

    /// Whether `template` satisfies every filter in the query.
    pub fn matches(&self, template: &RecurringTemplate) -> bool {
        self.is_active
            .is_none_or(|is_active| template.is_active == is_active)
            && self
                .auto_create
                .is_none_or(|auto_create| template.auto_create == auto_create)
            && self
                .due_on_or_before
                .is_none_or(|date| template.next_occurrence <= date)
    }
}
