//! Pocketbook is a personal finance tracker for recording income and spending.
//!
//! This library provides a JSON REST API where each logged in user records
//! entries and lists their own entries, optionally within a date range.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum_server::Handle;
use tokio::signal;

mod app_state;
mod date;
mod db;
mod endpoints;
mod error;
mod expense;
mod logging;
mod owner;
mod routing;
mod session;
mod user;

pub use app_state::{AppState, SQLAppState, create_app_state, create_cookie_key};
pub use date::{parse_date, parse_optional_date};
pub use db::initialize as initialize_db;
pub use error::{Error, UNAUTHORIZED_MESSAGE};
pub use expense::{
    AdminExpenseStore, CreateExpenseRequest, DateRange, EXPENSE_LABEL, EntryType, Expense,
    ExpenseId, ExpenseStore, INCOME_LABEL, NewExpense, SQLiteExpenseStore, build_expense,
};
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use owner::resolve_owner;
pub use routing::build_router;
pub use session::{
    COOKIE_SESSION, DEFAULT_SESSION_DURATION, SessionContext, close_session, open_session,
};
pub use user::{SQLiteUserStore, User, UserID, UserStore, Username};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}
