//! In-memory stores with failure injection for exercising the generator.

use std::collections::HashSet;

use time::Date;

use crate::{
    Error,
    database_id::TemplateId,
    ledger::{LedgerTransaction, NewLedgerTransaction, TransactionType},
    recurring::{Frequency, NewRecurringTemplate, RecurringTemplate, TemplatePatch},
    stores::{RecurringTemplateStore, TemplateQuery, TransactionStore},
};

/// An active, auto-creating monthly expense named "Template {id}".
pub(crate) fn template(id: TemplateId, next_occurrence: Date) -> RecurringTemplate {
    RecurringTemplate {
        id,
        user_id: 1,
        account_id: 2,
        amount: 20.0,
        transaction_type: TransactionType::Expense,
        category: "Subscriptions".to_owned(),
        subcategory: None,
        description: format!("Template {id}"),
        merchant: None,
        frequency: Frequency::Monthly,
        custom_interval_days: None,
        next_occurrence,
        end_date: None,
        is_active: true,
        auto_create: true,
        last_generated: None,
    }
}

#[derive(Debug, Default)]
pub(crate) struct FakeTemplateStore {
    pub templates: Vec<RecurringTemplate>,
    /// Every update that was attempted, in order.
    pub updates: Vec<(TemplateId, TemplatePatch)>,
    /// Updates to these templates fail.
    pub fail_updates_for: HashSet<TemplateId>,
    /// Queries fail.
    pub fail_query: bool,
}

impl FakeTemplateStore {
    pub fn with(templates: Vec<RecurringTemplate>) -> Self {
        Self {
            templates,
            ..Default::default()
        }
    }
}

impl RecurringTemplateStore for FakeTemplateStore {
    fn create(&mut self, template: NewRecurringTemplate) -> Result<RecurringTemplate, Error> {
        let id = self.templates.len() as TemplateId + 1;
        let template = RecurringTemplate {
            id,
            user_id: template.user_id,
            account_id: template.account_id,
            amount: template.amount,
            transaction_type: template.transaction_type,
            category: template.category,
            subcategory: template.subcategory,
            description: template.description,
            merchant: template.merchant,
            frequency: template.frequency,
            custom_interval_days: template.custom_interval_days,
            next_occurrence: template.next_occurrence,
            end_date: template.end_date,
            is_active: true,
            auto_create: template.auto_create,
            last_generated: None,
        };
        self.templates.push(template.clone());

        Ok(template)
    }

    fn get(&self, id: TemplateId) -> Result<RecurringTemplate, Error> {
        self.templates
            .iter()
            .find(|template| template.id == id)
            .cloned()
            .ok_or(Error::NotFound)
    }

    fn get_query(&self, query: TemplateQuery) -> Result<Vec<RecurringTemplate>, Error> {
        if self.fail_query {
            return Err(Error::DatabaseLockError);
        }

        Ok(self
            .templates
            .iter()
            .filter(|template| query.matches(template))
            .cloned()
            .collect())
    }

    fn update(&mut self, id: TemplateId, patch: TemplatePatch) -> Result<(), Error> {
        self.updates.push((id, patch));

        if self.fail_updates_for.contains(&id) {
            return Err(Error::DatabaseLockError);
        }

        let template = self
            .templates
            .iter_mut()
            .find(|template| template.id == id)
            .ok_or(Error::UpdateMissingTemplate)?;

        match patch {
            TemplatePatch::Advance {
                next_occurrence,
                last_generated,
            } => {
                template.next_occurrence = next_occurrence;
                template.last_generated = Some(last_generated);
            }
            TemplatePatch::Deactivate => template.is_active = false,
        }

        Ok(())
    }
}

#[derive(Debug, Default)]
pub(crate) struct FakeTransactionStore {
    pub transactions: Vec<LedgerTransaction>,
    /// Inserts of transactions with these descriptions fail.
    pub fail_for: HashSet<String>,
}

impl TransactionStore for FakeTransactionStore {
    fn create(&mut self, transaction: NewLedgerTransaction) -> Result<LedgerTransaction, Error> {
        if self.fail_for.contains(&transaction.description) {
            return Err(Error::DatabaseLockError);
        }

        let transaction = transaction.with_id(self.transactions.len() as i64 + 1);
        self.transactions.push(transaction.clone());

        Ok(transaction)
    }

    fn get_all(&self) -> Result<Vec<LedgerTransaction>, Error> {
        Ok(self.transactions.clone())
    }
}
