//! Defines the recurring template models and table schema.

use std::fmt::Display;

use rusqlite::{
    Connection, Row,
    types::{FromSql, FromSqlResult, ToSql, ToSqlOutput, ValueRef},
};
use time::Date;

use crate::{
    database_id::{AccountId, TemplateId, UserId},
    ledger::TransactionType,
};

// ============================================================================
// MODELS
// ============================================================================

/// How often a recurring template fires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frequency {
    /// Every day.
    Daily,
    /// Every seven days.
    Weekly,
    /// Every calendar month.
    Monthly,
    /// Every calendar year.
    Yearly,
    /// Every `custom_interval_days` days.
    Custom,
    /// A frequency this app does not know about, kept as stored.
    ///
    /// Templates with an unrecognized frequency are still generated but their schedule does not
    /// advance.
    Unrecognized(String),
}

impl Frequency {
    /// The text used to store the frequency in the database.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
            Self::Custom => "custom",
            Self::Unrecognized(text) => text,
        }
    }
}

impl From<&str> for Frequency {
    fn from(value: &str) -> Self {
        match value {
            "daily" => Self::Daily,
            "weekly" => Self::Weekly,
            "monthly" => Self::Monthly,
            "yearly" => Self::Yearly,
            "custom" => Self::Custom,
            other => Self::Unrecognized(other.to_owned()),
        }
    }
}

impl Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ToSql for Frequency {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for Frequency {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value.as_str().map(Frequency::from)
    }
}

/// A standing instruction to create one ledger transaction on a schedule, e.g. rent or wages.
#[derive(Debug, Clone, PartialEq)]
pub struct RecurringTemplate {
    /// The ID of the template.
    pub id: TemplateId,
    /// The user that owns the template.
    pub user_id: UserId,
    /// The account generated transactions are booked against.
    pub account_id: AccountId,
    /// The fixed amount of each generated transaction, never negative.
    ///
    /// Whether it is money in or out is given by `transaction_type`.
    pub amount: f64,
    /// Whether generated transactions are income or expenses.
    pub transaction_type: TransactionType,
    /// The category, e.g. "Housing".
    pub category: String,
    /// An optional finer grained category, e.g. "Mortgage".
    pub subcategory: Option<String>,
    /// The description copied onto generated transactions, also used as the template's name.
    pub description: String,
    /// Who is paid or who pays.
    pub merchant: Option<String>,
    /// How often the template fires.
    pub frequency: Frequency,
    /// The number of days between occurrences when `frequency` is [Frequency::Custom].
    pub custom_interval_days: Option<i64>,
    /// The next date the template is due.
    pub next_occurrence: Date,
    /// The last date the template may fire on, `None` for templates that never end.
    pub end_date: Option<Date>,
    /// Whether the template is still in effect.
    pub is_active: bool,
    /// Whether the template should be generated automatically by the scheduled job.
    pub auto_create: bool,
    /// The run date of the last successful generation.
    pub last_generated: Option<Date>,
}

impl RecurringTemplate {
    /// Whether the template's validity window ended before `today`.
    ///
    /// A template whose end date is `today` still fires today.
    pub fn has_expired(&self, today: Date) -> bool {
        self.end_date.is_some_and(|end_date| end_date < today)
    }
}

/// The fields needed to insert a [RecurringTemplate].
///
/// New templates are active and have never been generated.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRecurringTemplate {
    /// The user that owns the template.
    pub user_id: UserId,
    /// The account generated transactions are booked against.
    pub account_id: AccountId,
    /// The fixed amount of each generated transaction, never negative.
    ///
    /// Whether it is money in or out is given by `transaction_type`.
    pub amount: f64,
    /// Whether generated transactions are income or expenses.
    pub transaction_type: TransactionType,
    /// The category, e.g. "Housing".
    pub category: String,
    /// An optional finer grained category.
    pub subcategory: Option<String>,
    /// The description copied onto generated transactions.
    pub description: String,
    /// Who is paid or who pays.
    pub merchant: Option<String>,
    /// How often the template fires.
    pub frequency: Frequency,
    /// The number of days between occurrences for [Frequency::Custom].
    pub custom_interval_days: Option<i64>,
    /// The first date the template is due.
    pub next_occurrence: Date,
    /// The last date the template may fire on.
    pub end_date: Option<Date>,
    /// Whether the template should be generated automatically.
    pub auto_create: bool,
}

impl NewRecurringTemplate {
    /// Start a template with the required fields, the rest can be set on the returned struct.
    ///
    /// The template is created with `auto_create` enabled and no end date.
    pub fn build(
        description: &str,
        amount: f64,
        transaction_type: TransactionType,
        frequency: Frequency,
        next_occurrence: Date,
    ) -> Self {
        Self {
            user_id: 1,
            account_id: 1,
            amount,
            transaction_type,
            category: "Uncategorized".to_owned(),
            subcategory: None,
            description: description.to_owned(),
            merchant: None,
            frequency,
            custom_interval_days: None,
            next_occurrence,
            end_date: None,
            auto_create: true,
        }
    }
}

/// A partial update the generator applies to a template.
///
/// A patch either advances the schedule or deactivates the template, never both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplatePatch {
    /// A transaction was generated: move the schedule forward.
    Advance {
        /// The newly computed next occurrence.
        next_occurrence: Date,
        /// The run date the transaction was generated on.
        last_generated: Date,
    },
    /// The template's end date has passed: set `is_active` to false.
    Deactivate,
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// The columns of the template table in the order [map_row_to_template] expects.
pub const TEMPLATE_COLUMNS: &str = "id, user_id, account_id, amount, type, category, subcategory, \
    description, merchant, frequency, custom_interval_days, next_occurrence, end_date, \
    is_active, auto_create, last_generated";

/// Create the recurring template table.
///
/// # Errors
/// Returns an error if there is an SQL error.
pub fn create_recurring_template_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS recurring_transaction (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            account_id INTEGER NOT NULL,
            amount REAL NOT NULL CHECK (amount >= 0),
            type TEXT NOT NULL CHECK (type IN ('income', 'expense')),
            category TEXT NOT NULL,
            subcategory TEXT,
            description TEXT NOT NULL,
            merchant TEXT,
            frequency TEXT NOT NULL,
            custom_interval_days INTEGER,
            next_occurrence TEXT NOT NULL,
            end_date TEXT,
            is_active INTEGER NOT NULL DEFAULT 1,
            auto_create INTEGER NOT NULL DEFAULT 1,
            last_generated TEXT
        )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_recurring_transaction_due
         ON recurring_transaction(is_active, auto_create, next_occurrence)",
        (),
    )?;

    Ok(())
}

/// Map a row selected with [TEMPLATE_COLUMNS] to a [RecurringTemplate].
pub fn map_row_to_template(row: &Row) -> Result<RecurringTemplate, rusqlite::Error> {
    Ok(RecurringTemplate {
        id: row.get(0)?,
        user_id: row.get(1)?,
        account_id: row.get(2)?,
        amount: row.get(3)?,
        transaction_type: row.get(4)?,
        category: row.get(5)?,
        subcategory: row.get(6)?,
        description: row.get(7)?,
        merchant: row.get(8)?,
        frequency: row.get(9)?,
        custom_interval_days: row.get(10)?,
        next_occurrence: row.get(11)?,
        end_date: row.get(12)?,
        is_active: row.get(13)?,
        auto_create: row.get(14)?,
        last_generated: row.get(15)?,
    })
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        recurring::{Frequency, create_recurring_template_table},
        test_utils::template,
    };

    #[test]
    fn sql_is_valid() {
        let connection =
            Connection::open_in_memory().expect("Could not initialise in-memory SQLite database");

        assert_eq!(Ok(()), create_recurring_template_table(&connection));
    }

    #[test]
    fn known_frequencies_round_trip_through_text() {
        for text in ["daily", "weekly", "monthly", "yearly", "custom"] {
            let frequency = Frequency::from(text);

            assert!(
                !matches!(frequency, Frequency::Unrecognized(_)),
                "{text} should be recognized"
            );
            assert_eq!(frequency.as_str(), text);
        }
    }

    #[test]
    fn unknown_frequency_is_kept_verbatim() {
        let frequency = Frequency::from("fortnightly");

        assert_eq!(frequency, Frequency::Unrecognized("fortnightly".to_owned()));
        assert_eq!(frequency.to_string(), "fortnightly");
    }

    #[test]
    fn frequency_text_is_case_sensitive() {
        assert_eq!(
            Frequency::from("Monthly"),
            Frequency::Unrecognized("Monthly".to_owned())
        );
    }

    #[test]
    fn expiry_is_strictly_before_today() {
        let today = date!(2024 - 06 - 15);
        let mut template = template(1, date!(2024 - 06 - 01));

        template.end_date = None;
        assert!(!template.has_expired(today));

        template.end_date = Some(today);
        assert!(!template.has_expired(today));

        template.end_date = Some(date!(2024 - 06 - 14));
        assert!(template.has_expired(today));
    }
}
