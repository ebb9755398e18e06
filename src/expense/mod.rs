//! Income and expense entries: the models, how they are stored and the
//! route handlers that record and list them.

mod core;
mod endpoints;
mod sqlite;
mod store;

pub use core::{
    CreateExpenseRequest, EXPENSE_LABEL, EntryType, Expense, ExpenseId, INCOME_LABEL, NewExpense,
    build_expense,
};
pub use endpoints::{
    create_expense_endpoint, create_income_endpoint, create_spending_endpoint,
    list_expenses_endpoint, list_expenses_in_range_endpoint,
};
pub use sqlite::{SQLiteExpenseStore, create_expense_table};
pub use store::{AdminExpenseStore, DateRange, ExpenseStore};
