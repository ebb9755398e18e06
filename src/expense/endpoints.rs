//! Defines the route handlers for recording and listing a user's entries.
//!
//! Every handler resolves the owner from the session before looking at the
//! request body or query, so a caller without a session always gets a 401.

use axum::{
    Json,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use crate::{
    AppState, Error,
    date::{parse_date, parse_optional_date},
    expense::{CreateExpenseRequest, DateRange, EntryType, ExpenseStore, build_expense},
    owner::resolve_owner,
    session::SessionContext,
    user::{User, UserStore},
};

/// The optional date bounds for listing a user's entries.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// The first date to include.
    pub start: Option<String>,
    /// The last date to include.
    pub end: Option<String>,
}

/// The date bounds for listing a user's entries within a range.
#[derive(Debug, Deserialize)]
pub struct RangeQuery {
    /// The first date to include.
    pub start: String,
    /// The last date to include.
    pub end: String,
}

/// A route handler for recording an entry, the entry type comes from the
/// request's type label.
pub async fn create_expense_endpoint<E, U>(
    State(state): State<AppState<E, U>>,
    session: SessionContext,
    request: Result<Json<CreateExpenseRequest>, JsonRejection>,
) -> Response
where
    E: ExpenseStore,
    U: UserStore,
{
    create(&state, &session, request, None)
}

/// A route handler for recording an income entry regardless of the request's
/// type label.
pub async fn create_income_endpoint<E, U>(
    State(state): State<AppState<E, U>>,
    session: SessionContext,
    request: Result<Json<CreateExpenseRequest>, JsonRejection>,
) -> Response
where
    E: ExpenseStore,
    U: UserStore,
{
    create(&state, &session, request, Some(EntryType::Income))
}

/// A route handler for recording a spending entry regardless of the
/// request's type label.
pub async fn create_spending_endpoint<E, U>(
    State(state): State<AppState<E, U>>,
    session: SessionContext,
    request: Result<Json<CreateExpenseRequest>, JsonRejection>,
) -> Response
where
    E: ExpenseStore,
    U: UserStore,
{
    create(&state, &session, request, Some(EntryType::Expense))
}

/// A route handler for listing the caller's entries, optionally limited to
/// the dates between `start` and `end`.
///
/// Either bound may be left out to leave that side of the range open.
pub async fn list_expenses_endpoint<E, U>(
    State(state): State<AppState<E, U>>,
    session: SessionContext,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Response
where
    E: ExpenseStore,
    U: UserStore,
{
    let owner = match resolve_owner(&session, &state.user_store) {
        Ok(owner) => owner,
        Err(error) => return error.into_response(),
    };

    let Query(query) = match query {
        Ok(query) => query,
        Err(rejection) => return rejection.into_response(),
    };

    let range = parse_optional_date(query.start.as_deref()).and_then(|start| {
        let end = parse_optional_date(query.end.as_deref())?;
        DateRange::from_bounds(start, end)
    });

    let expenses = match range {
        Ok(Some(range)) => state.expense_store.list_by_owner_in_range(owner.id, range),
        Ok(None) => state.expense_store.list_by_owner(owner.id),
        Err(error) => return error.into_response(),
    };

    match expenses {
        Ok(expenses) => Json(expenses).into_response(),
        Err(error) => error.into_response(),
    }
}

/// A route handler for listing the caller's entries dated from `start` to
/// `end`, inclusive.
pub async fn list_expenses_in_range_endpoint<E, U>(
    State(state): State<AppState<E, U>>,
    session: SessionContext,
    query: Result<Query<RangeQuery>, QueryRejection>,
) -> Response
where
    E: ExpenseStore,
    U: UserStore,
{
    let owner = match resolve_owner(&session, &state.user_store) {
        Ok(owner) => owner,
        Err(error) => return error.into_response(),
    };

    let Query(query) = match query {
        Ok(query) => query,
        Err(rejection) => return rejection.into_response(),
    };

    let expenses = get_range(&query)
        .and_then(|range| state.expense_store.list_by_owner_in_range(owner.id, range));

    match expenses {
        Ok(expenses) => Json(expenses).into_response(),
        Err(error) => error.into_response(),
    }
}

fn get_range(query: &RangeQuery) -> Result<DateRange, Error> {
    let start = parse_date(&query.start)?;
    let end = parse_date(&query.end)?;

    DateRange::new(start, end)
}

fn create<E, U>(
    state: &AppState<E, U>,
    session: &SessionContext,
    request: Result<Json<CreateExpenseRequest>, JsonRejection>,
    entry_type: Option<EntryType>,
) -> Response
where
    E: ExpenseStore,
    U: UserStore,
{
    let owner = match resolve_owner(session, &state.user_store) {
        Ok(owner) => owner,
        Err(error) => return error.into_response(),
    };

    let Json(mut request) = match request {
        Ok(request) => request,
        Err(rejection) => return rejection.into_response(),
    };

    if let Some(entry_type) = entry_type {
        request.type_label = entry_type.label().to_owned();
    }

    match save(&state.expense_store, request, &owner) {
        Ok(response) => response,
        Err(error) => error.into_response(),
    }
}

fn save(
    store: &impl ExpenseStore,
    request: CreateExpenseRequest,
    owner: &User,
) -> Result<Response, Error> {
    tracing::info!(
        "User {} is recording an entry with the date {:?}",
        owner.username,
        request.date
    );

    let expense = build_expense(request, owner).inspect_err(|error| {
        tracing::warn!("Rejected entry for user {}: {error}", owner.username);
    })?;
    let expense = store.save(expense)?;

    tracing::info!("Saved entry {} for user {}", expense.id, owner.username);

    Ok(Json(expense).into_response())
}
