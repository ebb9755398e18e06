//! Reads the caller's identity from the encrypted session cookie.
//!
//! Creating sessions is the job of whatever authenticates users. This module
//! only defines the cookie format and the request-scoped [SessionContext]
//! that handlers use to find out who is making a request.

use std::convert::Infallible;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::extract::{
    PrivateCookieJar,
    cookie::{Cookie, Key, SameSite},
};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::{Error, user::Username};

/// The name of the cookie that holds the session token.
pub const COOKIE_SESSION: &str = "session";

/// The default duration for which a session is valid.
pub const DEFAULT_SESSION_DURATION: Duration = Duration::hours(1);

mod datetime_format {
    //! Specifies how to serialize a [time::OffsetDateTime] in a custom format that
    //! avoids serialisations with datetimes containing midnight.
    //!
    //! The default serializer for [time::OffsetDateTime] will serialize
    //! "00:00:00.000000" as "0:00:00.0" and the deserializer would error out
    //! because it expects the hours to be two digits, not one.
    use serde::{Deserialize, Deserializer, Serializer};
    use time::{
        OffsetDateTime, format_description::BorrowedFormatItem, macros::format_description,
    };

    /// Date time format for the session expiry, e.g. "2021-01-01 00:00:00.000000 +00:00:00".
    const DATE_TIME_FORMAT: &[BorrowedFormatItem] = format_description!(
        "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond] [offset_hour \
             sign:mandatory]:[offset_minute]:[offset_second]"
    );

    pub fn serialize<S>(dt: &OffsetDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let formatted = dt
            .format(DATE_TIME_FORMAT)
            .map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&formatted)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<OffsetDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        OffsetDateTime::parse(&s, DATE_TIME_FORMAT).map_err(serde::de::Error::custom)
    }
}

/// The token stored in the session cookie.
#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct Session {
    /// The username of the logged in user.
    pub username: String,

    /// When the session stops being valid.
    #[serde(
        serialize_with = "datetime_format::serialize",
        deserialize_with = "datetime_format::deserialize"
    )]
    pub expires_at: OffsetDateTime,
}

/// Add a session cookie to `jar` for the user `username`, valid for `duration`
/// from now.
///
/// Call this once a user has been authenticated.
///
/// # Errors
///
/// Returns [Error::SessionSerializationError] if the session token cannot be serialized.
pub fn open_session(
    jar: PrivateCookieJar,
    username: &Username,
    duration: Duration,
) -> Result<PrivateCookieJar, Error> {
    let expires_at = OffsetDateTime::now_utc() + duration;
    let session = Session {
        username: username.to_string(),
        expires_at,
    };
    let value = serde_json::to_string(&session)
        .map_err(|error| Error::SessionSerializationError(error.to_string()))?;

    Ok(jar.add(
        Cookie::build((COOKIE_SESSION, value))
            .expires(expires_at)
            .http_only(true)
            .same_site(SameSite::Strict)
            .secure(true),
    ))
}

/// Set the session cookie to an invalid value and set its max age to zero,
/// which should delete the cookie on the client side.
pub fn close_session(jar: PrivateCookieJar) -> PrivateCookieJar {
    jar.add(
        Cookie::build((COOKIE_SESSION, "deleted"))
            .expires(OffsetDateTime::UNIX_EPOCH)
            .max_age(Duration::ZERO)
            .http_only(true)
            .same_site(SameSite::Strict)
            .secure(true),
    )
}

/// Get the unexpired session from `jar`, if there is one.
pub(crate) fn get_session_from_cookies(jar: &PrivateCookieJar) -> Option<Session> {
    let cookie = jar.get(COOKIE_SESSION)?;

    let session: Session = match serde_json::from_str(cookie.value_trimmed()) {
        Ok(session) => session,
        Err(error) => {
            tracing::debug!("Ignoring malformed session cookie: {error}");
            return None;
        }
    };

    if session.expires_at <= OffsetDateTime::now_utc() {
        tracing::debug!("Ignoring session that expired at {}", session.expires_at);
        return None;
    }

    Some(session)
}

/// The identity of the caller of a single request.
///
/// Extracting this never fails: a missing, expired or tampered session cookie
/// gives a context without an identity.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionContext {
    identity: Option<String>,
}

impl SessionContext {
    /// Create a session context for `identity`.
    ///
    /// Blank identities are treated as absent.
    pub fn new(identity: Option<String>) -> Self {
        let identity = identity.filter(|name| !name.trim().is_empty());

        Self { identity }
    }

    /// The username stored in the session, if any.
    pub fn identity(&self) -> Option<&str> {
        self.identity.as_deref()
    }
}

impl<S> FromRequestParts<S> for SessionContext
where
    Key: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let jar = PrivateCookieJar::<Key>::from_request_parts(parts, state).await?;
        let identity = get_session_from_cookies(&jar).map(|session| session.username);

        Ok(Self::new(identity))
    }
}
