//! Implements a SQLite backed recurring template store.
use std::sync::{Arc, Mutex};

use rusqlite::{Connection, params, params_from_iter, types::Value};

use crate::{
    Error,
    database_id::TemplateId,
    recurring::{
        NewRecurringTemplate, RecurringTemplate, TEMPLATE_COLUMNS, TemplatePatch,
        map_row_to_template,
    },
    stores::{RecurringTemplateStore, TemplateQuery},
};

/// Stores recurring templates in a SQLite database.
///
/// The table must have been created with [crate::initialize_db].
#[derive(Debug, Clone)]
pub struct SQLiteTemplateStore {
    connection: Arc<Mutex<Connection>>,
}

impl SQLiteTemplateStore {
    /// Create a new store for the SQLite `connection`.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }
}

impl RecurringTemplateStore for SQLiteTemplateStore {
    /// Create a new template in the database.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::DatabaseLockError] if the database lock is poisoned,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn create(&mut self, template: NewRecurringTemplate) -> Result<RecurringTemplate, Error> {
        let connection = self
            .connection
            .lock()
            .map_err(|_| Error::DatabaseLockError)?;

        let template = connection
            .prepare(&format!(
                "INSERT INTO recurring_transaction (user_id, account_id, amount, type, category,
                    subcategory, description, merchant, frequency, custom_interval_days,
                    next_occurrence, end_date, is_active, auto_create, last_generated)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, 1, ?13, NULL)
                 RETURNING {TEMPLATE_COLUMNS}"
            ))?
            .query_row(
                params![
                    template.user_id,
                    template.account_id,
                    template.amount,
                    template.transaction_type,
                    template.category,
                    template.subcategory,
                    template.description,
                    template.merchant,
                    template.frequency,
                    template.custom_interval_days,
                    template.next_occurrence,
                    template.end_date,
                    template.auto_create,
                ],
                map_row_to_template,
            )?;

        Ok(template)
    }

    /// Retrieve a template in the database by its `id`.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NotFound] if `id` does not refer to a valid template,
    /// - [Error::DatabaseLockError] if the database lock is poisoned,
    /// - or [Error::SqlError] there is some other SQL error.
    fn get(&self, id: TemplateId) -> Result<RecurringTemplate, Error> {
        let template = self
            .connection
            .lock()
            .map_err(|_| Error::DatabaseLockError)?
            .prepare(&format!(
                "SELECT {TEMPLATE_COLUMNS} FROM recurring_transaction WHERE id = :id"
            ))?
            .query_row(&[(":id", &id)], map_row_to_template)?;

        Ok(template)
    }

    /// Query for templates in the database.
    ///
    /// Dates are compared as `yyyy-MM-dd` text, which orders the same way as the dates themselves.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::DatabaseLockError] if the database lock is poisoned,
    /// - or [Error::SqlError] there is a SQL error, including rows that cannot be read.
    fn get_query(&self, query: TemplateQuery) -> Result<Vec<RecurringTemplate>, Error> {
        let mut query_string_parts =
            vec![format!("SELECT {TEMPLATE_COLUMNS} FROM recurring_transaction")];
        let mut where_clause_parts = vec![];
        let mut query_parameters = vec![];

        if let Some(is_active) = query.is_active {
            where_clause_parts.push(format!("is_active = ?{}", query_parameters.len() + 1));
            query_parameters.push(Value::Integer(is_active.into()));
        }

        if let Some(auto_create) = query.auto_create {
            where_clause_parts.push(format!("auto_create = ?{}", query_parameters.len() + 1));
            query_parameters.push(Value::Integer(auto_create.into()));
        }

        if let Some(date) = query.due_on_or_before {
            where_clause_parts.push(format!(
                "next_occurrence <= ?{}",
                query_parameters.len() + 1
            ));
            query_parameters.push(Value::Text(crate::format_date(date)));
        }

        if !where_clause_parts.is_empty() {
            query_string_parts.push(String::from("WHERE ") + &where_clause_parts.join(" AND "));
        }

        query_string_parts.push("ORDER BY id ASC".to_owned());

        let query_string = query_string_parts.join(" ");
        let params = params_from_iter(query_parameters.iter());

        self.connection
            .lock()
            .map_err(|_| Error::DatabaseLockError)?
            .prepare(&query_string)?
            .query_map(params, map_row_to_template)?
            .map(|maybe_template| maybe_template.map_err(Error::from))
            .collect()
    }

    /// Apply `patch` to the template with `id`.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::UpdateMissingTemplate] if `id` does not refer to a valid template,
    /// - [Error::DatabaseLockError] if the database lock is poisoned,
    /// - or [Error::SqlError] there is some other SQL error.
    fn update(&mut self, id: TemplateId, patch: TemplatePatch) -> Result<(), Error> {
        let connection = self
            .connection
            .lock()
            .map_err(|_| Error::DatabaseLockError)?;

        let rows_affected = match patch {
            TemplatePatch::Advance {
                next_occurrence,
                last_generated,
            } => connection.execute(
                "UPDATE recurring_transaction
                 SET next_occurrence = ?1, last_generated = ?2
                 WHERE id = ?3",
                params![next_occurrence, last_generated, id],
            )?,
            TemplatePatch::Deactivate => connection.execute(
                "UPDATE recurring_transaction SET is_active = 0 WHERE id = ?1",
                params![id],
            )?,
        };

        if rows_affected == 0 {
            return Err(Error::UpdateMissingTemplate);
        }

        Ok(())
    }
}
