//! Defines the expense entry models and how creation requests become entries.

use rust_decimal::Decimal;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error,
    date::parse_date,
    user::{User, UserID},
};

/// Database identifier for an expense entry.
pub type ExpenseId = i64;

/// The type label clients send for income.
pub const INCOME_LABEL: &str = "รายได้";

/// The type label clients send for spending.
pub const EXPENSE_LABEL: &str = "ค่าใช้จ่าย";

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

/// Whether an entry records money coming in or going out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EntryType {
    /// Money earned.
    Income,
    /// Money spent.
    Expense,
}

impl EntryType {
    /// Get the entry type for a client's type label.
    ///
    /// Only the exact income label maps to [EntryType::Income]. Every other
    /// label, including unknown ones, maps to [EntryType::Expense].
    pub fn from_label(label: &str) -> Self {
        if label == INCOME_LABEL {
            EntryType::Income
        } else {
            EntryType::Expense
        }
    }

    /// The type label clients use for this entry type.
    pub fn label(&self) -> &'static str {
        match self {
            EntryType::Income => INCOME_LABEL,
            EntryType::Expense => EXPENSE_LABEL,
        }
    }

    /// The name used when storing the entry type.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryType::Income => "INCOME",
            EntryType::Expense => "EXPENSE",
        }
    }
}

impl ToSql for EntryType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

impl FromSql for EntryType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value.as_str()? {
            "INCOME" => Ok(EntryType::Income),
            "EXPENSE" => Ok(EntryType::Expense),
            other => Err(FromSqlError::Other(
                format!("invalid entry type {other:?}").into(),
            )),
        }
    }
}

/// The body of a request to record an income or expense entry.
///
/// Any owner fields sent by the client are ignored, the owner always comes
/// from the session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateExpenseRequest {
    /// The free-text type label, see [EntryType::from_label].
    #[serde(rename = "type")]
    pub type_label: String,
    /// What the money was for, e.g. "Food".
    pub category: String,
    /// How much money was earned or spent.
    pub amount: Decimal,
    /// Extra details about the entry.
    pub note: Option<String>,
    /// Where the money was spent or earned.
    pub place: Option<String>,
    /// When the entry happened, in one of the formats accepted by
    /// [parse_date].
    #[serde(default)]
    pub date: Option<String>,
    /// How the entry was paid, e.g. "cash".
    pub payment_method: Option<String>,
    /// The icon the client shows next to the entry.
    pub icon_key: Option<String>,
}

/// A validated entry that is ready to be saved to an
/// [ExpenseStore](crate::expense::ExpenseStore).
#[derive(Debug, Clone, PartialEq)]
pub struct NewExpense {
    /// The user that owns the entry.
    pub owner_id: UserID,
    /// Whether the entry is income or spending.
    pub entry_type: EntryType,
    /// What the money was for.
    pub category: String,
    /// How much money was earned or spent. No sign convention is enforced.
    pub amount: Decimal,
    /// Extra details about the entry.
    pub note: Option<String>,
    /// Where the money was spent or earned.
    pub place: Option<String>,
    /// When the entry happened.
    pub date: Date,
    /// How the entry was paid.
    pub payment_method: Option<String>,
    /// The icon the client shows next to the entry.
    pub icon_key: Option<String>,
}

/// An income or expense entry that has been saved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    /// The ID assigned by the store.
    pub id: ExpenseId,
    /// The user that owns the entry.
    pub owner_id: UserID,
    /// Whether the entry is income or spending.
    pub entry_type: EntryType,
    /// What the money was for.
    pub category: String,
    /// How much money was earned or spent.
    pub amount: Decimal,
    /// Extra details about the entry.
    pub note: Option<String>,
    /// Where the money was spent or earned.
    pub place: Option<String>,
    /// When the entry happened.
    #[serde(with = "iso_date")]
    pub date: Date,
    /// How the entry was paid.
    pub payment_method: Option<String>,
    /// The icon the client shows next to the entry.
    pub icon_key: Option<String>,
}

/// Turn a creation request into an entry owned by `owner`.
///
/// # Errors
///
/// Returns [Error::InvalidDateFormat] if the request's date is missing or cannot be parsed.
pub fn build_expense(request: CreateExpenseRequest, owner: &User) -> Result<NewExpense, Error> {
    let date = parse_date(request.date.as_deref().unwrap_or_default())?;

    Ok(NewExpense {
        owner_id: owner.id,
        entry_type: EntryType::from_label(&request.type_label),
        category: request.category,
        amount: request.amount,
        note: request.note,
        place: request.place,
        date,
        payment_method: request.payment_method,
        icon_key: request.icon_key,
    })
}
