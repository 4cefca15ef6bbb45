//! Recurring transaction templates and the generation cycle that turns them into ledger
//! transactions.

mod core;
mod endpoint;
mod generator;
mod schedule;

pub use core::{
    Frequency, NewRecurringTemplate, RecurringTemplate, TEMPLATE_COLUMNS, TemplatePatch,
    create_recurring_template_table, map_row_to_template,
};
pub use endpoint::{GenerationResponse, generate_recurring_endpoint};
pub use generator::{FailureStage, ItemFailure, ItemOutcome, RunReport, run_generation_cycle};
pub use schedule::next_occurrence;
