//! The generation cycle: turns due recurring templates into ledger transactions.

use std::fmt::Display;

use serde::Serialize;
use time::Date;

use crate::{
    Error,
    database_id::{TemplateId, TransactionId},
    ledger::NewLedgerTransaction,
    recurring::{RecurringTemplate, TemplatePatch, next_occurrence},
    stores::{RecurringTemplateStore, TemplateQuery, TransactionStore},
};

/// What happened to a template that was processed without error.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemOutcome {
    /// A ledger transaction was created and the schedule advanced.
    Generated {
        /// The template that fired.
        template_id: TemplateId,
        /// The ledger transaction that was created.
        transaction_id: TransactionId,
        /// The template's new next occurrence.
        next_occurrence: Date,
    },
    /// The template's end date had passed so it was deactivated.
    Deactivated {
        /// The template that was deactivated.
        template_id: TemplateId,
    },
}

/// The step at which processing a template failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureStage {
    /// Setting `is_active` to false on an expired template failed.
    Deactivate,
    /// Creating the ledger transaction failed. The schedule was not advanced.
    Insert,
    /// The ledger transaction was created but advancing the schedule failed.
    Advance,
}

/// A template that could not be processed, recorded so the rest of the batch can continue.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemFailure {
    /// The template that failed.
    pub template_id: TemplateId,
    /// The template's description, used as its name in messages.
    pub description: String,
    /// Where processing stopped.
    pub stage: FailureStage,
    /// The store's error message.
    pub message: String,
}

impl ItemFailure {
    fn new(template: &RecurringTemplate, stage: FailureStage, error: Error) -> Self {
        Self {
            template_id: template.id,
            description: template.description.clone(),
            stage,
            message: error.to_string(),
        }
    }
}

impl Display for ItemFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let action = match self.stage {
            FailureStage::Deactivate => "deactivate",
            FailureStage::Insert => "create transaction for",
            FailureStage::Advance => "update schedule for",
        };

        write!(
            f,
            "Failed to {action} \"{}\" (template {}): {}",
            self.description, self.template_id, self.message
        )
    }
}

/// The result of one generation cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    /// The date the cycle ran against.
    pub run_date: Date,
    /// The outcome of every template that was processed without error, in processing order.
    pub outcomes: Vec<ItemOutcome>,
    /// Every template that failed, in processing order.
    pub failures: Vec<ItemFailure>,
}

impl RunReport {
    fn new(run_date: Date) -> Self {
        Self {
            run_date,
            outcomes: Vec::new(),
            failures: Vec::new(),
        }
    }

    /// The number of due templates that were processed.
    pub fn processed(&self) -> usize {
        self.outcomes.len() + self.failures.len()
    }

    /// The number of templates that produced a ledger transaction and had their schedule advanced.
    pub fn succeeded(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| matches!(outcome, ItemOutcome::Generated { .. }))
            .count()
    }

    /// The number of expired templates that were deactivated.
    pub fn deactivated(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| matches!(outcome, ItemOutcome::Deactivated { .. }))
            .count()
    }

    /// The number of templates that failed.
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    /// One human readable message per failure.
    pub fn error_details(&self) -> Vec<String> {
        self.failures.iter().map(ToString::to_string).collect()
    }

    fn record(&mut self, result: Result<ItemOutcome, ItemFailure>) {
        match result {
            Ok(outcome) => self.outcomes.push(outcome),
            Err(failure) => self.failures.push(failure),
        }
    }
}

/// Run one generation cycle for the calendar date `today`.
///
/// Every active, auto-creating template with a next occurrence on or before `today` is processed
/// in the order the store returns them:
/// - a template whose end date is before `today` is deactivated and nothing else happens,
/// - otherwise a ledger transaction dated `today` is created, then the template's next occurrence
///   is advanced from its current value and `last_generated` is set to `today`.
///
/// Each template gets exactly one template store update. A failure for one template is recorded
/// in the returned [RunReport] and the cycle moves on to the next one. When the transaction
/// insert fails the schedule is left alone so the template is retried on the next run. When the
/// schedule update fails after the insert succeeded, the next run creates a second transaction
/// for the same occurrence.
///
/// # Errors
/// Returns the store's error if the due templates could not be queried. No template is processed
/// in that case.
pub fn run_generation_cycle<T, L>(
    today: Date,
    templates: &mut T,
    ledger: &mut L,
) -> Result<RunReport, Error>
where
    T: RecurringTemplateStore,
    L: TransactionStore,
{
    let due_templates = templates.get_query(TemplateQuery::due(today))?;
    let mut report = RunReport::new(today);

    if due_templates.is_empty() {
        tracing::info!("No recurring transactions due on {today}");
        return Ok(report);
    }

    tracing::info!(
        "Processing {} recurring transactions due on or before {today}",
        due_templates.len()
    );

    for template in &due_templates {
        let result = process_template(template, today, templates, ledger);

        if let Err(failure) = &result {
            tracing::error!("{failure}");
        }

        report.record(result);
    }

    tracing::info!(
        "Generation cycle for {today} finished: {} generated, {} deactivated, {} failed",
        report.succeeded(),
        report.deactivated(),
        report.failed()
    );

    Ok(report)
}

fn process_template<T, L>(
    template: &RecurringTemplate,
    today: Date,
    templates: &mut T,
    ledger: &mut L,
) -> Result<ItemOutcome, ItemFailure>
where
    T: RecurringTemplateStore,
    L: TransactionStore,
{
    if template.has_expired(today) {
        templates
            .update(template.id, TemplatePatch::Deactivate)
            .map_err(|error| ItemFailure::new(template, FailureStage::Deactivate, error))?;

        tracing::warn!(
            "Deactivated \"{}\" (template {}), its end date {:?} has passed",
            template.description,
            template.id,
            template.end_date
        );

        return Ok(ItemOutcome::Deactivated {
            template_id: template.id,
        });
    }

    let transaction = ledger
        .create(NewLedgerTransaction::from_template(template, today))
        .map_err(|error| ItemFailure::new(template, FailureStage::Insert, error))?;

    let next = next_occurrence(
        template.next_occurrence,
        &template.frequency,
        template.custom_interval_days,
    );

    templates
        .update(
            template.id,
            TemplatePatch::Advance {
                next_occurrence: next,
                last_generated: today,
            },
        )
        .map_err(|error| ItemFailure::new(template, FailureStage::Advance, error))?;

    tracing::debug!(
        "Generated transaction {} from \"{}\" (template {}), next occurrence {next}",
        transaction.id,
        template.description,
        template.id
    );

    Ok(ItemOutcome::Generated {
        template_id: template.id,
        transaction_id: transaction.id,
        next_occurrence: next,
    })
}
