//! Defines the app level error type and its conversion into HTTP responses.
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// The message sent to clients that are not logged in.
///
/// The same message is used whether the session is missing or refers to a
/// user that no longer exists so that clients cannot probe for usernames.
pub const UNAUTHORIZED_MESSAGE: &str = "Unauthorized: no login session";

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The request did not carry a session, or the session had no username.
    #[error("no login session")]
    Unauthenticated,

    /// None of the supported date formats matched the given string.
    ///
    /// Holds the raw string that was rejected.
    #[error("could not parse \"{0}\" as a date")]
    InvalidDateFormat(String),

    /// A date range was requested where the start date comes after the end date.
    #[error("the start date {0} is after the end date {1}")]
    InvalidRange(time::Date, time::Date),

    /// An empty string was used to create a username.
    #[error("username cannot be empty")]
    EmptyUsername,

    /// The username is already taken by another user.
    #[error("the username \"{0}\" is already in use")]
    DuplicateUsername(String),

    /// The requested resource was not found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// The session token could not be written to the cookie jar.
    #[error("could not serialize the session token: {0}")]
    SessionSerializationError(String),

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            // A session for a deleted user is treated the same as no session.
            Error::Unauthenticated | Error::NotFound => {
                (StatusCode::UNAUTHORIZED, UNAUTHORIZED_MESSAGE).into_response()
            }
            Error::InvalidDateFormat(_) | Error::InvalidRange(_, _) => {
                (StatusCode::BAD_REQUEST, self.to_string()).into_response()
            }
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An unexpected error occurred, check the server logs for more details.",
                )
                    .into_response()
            }
        }
    }
}
