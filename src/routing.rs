//! Application router configuration.

use axum::{
    Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};

use crate::{
    AppState, endpoints,
    expense::{
        ExpenseStore, create_expense_endpoint, create_income_endpoint, create_spending_endpoint,
        list_expenses_endpoint, list_expenses_in_range_endpoint,
    },
    user::UserStore,
};

/// Return a router with all the app's routes.
pub fn build_router<E, U>(state: AppState<E, U>) -> Router
where
    E: ExpenseStore + Clone + Send + Sync + 'static,
    U: UserStore + Clone + Send + Sync + 'static,
{
    Router::new()
        .route(endpoints::COFFEE, get(get_coffee))
        .route(
            endpoints::EXPENSES,
            post(create_expense_endpoint::<E, U>).get(list_expenses_endpoint::<E, U>),
        )
        .route(endpoints::INCOMES, post(create_income_endpoint::<E, U>))
        .route(endpoints::SPENDINGS, post(create_spending_endpoint::<E, U>))
        .route(
            endpoints::EXPENSES_RANGE,
            get(list_expenses_in_range_endpoint::<E, U>),
        )
        .fallback(get_404_not_found)
        .with_state(state)
}

/// Attempt to get a cup of coffee from the server.
async fn get_coffee() -> Response {
    (StatusCode::IM_A_TEAPOT, "I'm a teapot").into_response()
}

async fn get_404_not_found() -> Response {
    (StatusCode::NOT_FOUND, "Not found").into_response()
}
