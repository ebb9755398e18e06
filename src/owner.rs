//! Maps the identity in a request's session to the user who owns the request.

use crate::{
    Error,
    session::SessionContext,
    user::{User, UserStore, Username},
};

/// Look up the user named in `session`.
///
/// This is read-only: nothing is written to the session or the store.
///
/// # Errors
///
/// Returns [Error::Unauthenticated] if the session has no identity or if the
/// identity does not belong to a registered user, e.g. because the user has
/// been deleted since the session was opened. Store failures are passed on
/// unchanged.
pub fn resolve_owner(session: &SessionContext, users: &impl UserStore) -> Result<User, Error> {
    let Some(identity) = session.identity() else {
        return Err(Error::Unauthenticated);
    };

    let username = Username::new(identity).map_err(|_| Error::Unauthenticated)?;

    match users.get_by_username(&username) {
        Ok(user) => Ok(user),
        Err(Error::NotFound) => {
            tracing::warn!("Session refers to unknown user {username}");
            Err(Error::Unauthenticated)
        }
        Err(error) => Err(error),
    }
}
