//! Implements a struct that holds the state of the REST server.

use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use rusqlite::Connection;
use sha2::{Digest, Sha512};

use crate::{Error, db::initialize, expense::SQLiteExpenseStore, user::SQLiteUserStore};

/// The state of the REST server.
///
/// `E` is the store for expense entries and `U` is the store used to look up users.
#[derive(Debug, Clone)]
pub struct AppState<E, U> {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,

    /// The store that holds income and expense entries.
    pub expense_store: E,

    /// The store used to find the user that owns a session.
    pub user_store: U,
}

impl<E, U> AppState<E, U> {
    /// Create a new [AppState].
    pub fn new(cookie_secret: &str, expense_store: E, user_store: U) -> Self {
        Self {
            cookie_key: create_cookie_key(cookie_secret),
            expense_store,
            user_store,
        }
    }
}

/// An alias for an [AppState] that uses SQLite for the backend.
pub type SQLAppState = AppState<SQLiteExpenseStore, SQLiteUserStore>;

/// Creates an [AppState] instance that uses SQLite for the backend.
///
/// This function will modify the database by adding the tables for the domain
/// models to the database.
///
/// # Errors
/// Returns an error if the database cannot be initialized.
pub fn create_app_state(db_connection: Connection, cookie_secret: &str) -> Result<SQLAppState, Error> {
    initialize(&db_connection)?;

    let connection = Arc::new(Mutex::new(db_connection));

    Ok(AppState::new(
        cookie_secret,
        SQLiteExpenseStore::new(connection.clone()),
        SQLiteUserStore::new(connection),
    ))
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl<E, U> FromRef<AppState<E, U>> for Key {
    fn from_ref(state: &AppState<E, U>) -> Self {
        state.cookie_key.clone()
    }
}

/// Create a signing key for cookies from a `secret`s string.
pub fn create_cookie_key(secret: &str) -> Key {
    let hash = Sha512::digest(secret);

    Key::from(&hash)
}
