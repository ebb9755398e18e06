//! The API endpoints URIs.

/// The route to request a cup of coffee (experimental).
pub const COFFEE: &str = "/api/coffee";
/// The route to record an entry or list the caller's entries.
pub const EXPENSES: &str = "/api/expenses";
/// The route to record an income entry.
pub const INCOMES: &str = "/api/expenses/incomes";
/// The route to record a spending entry.
pub const SPENDINGS: &str = "/api/expenses/spendings";
/// The route to list the caller's entries between two dates.
pub const EXPENSES_RANGE: &str = "/api/expenses/range";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expense_routes_share_a_prefix() {
        for endpoint in [INCOMES, SPENDINGS, EXPENSES_RANGE] {
            assert!(
                endpoint.starts_with(EXPENSES),
                "want {endpoint} to be nested under {EXPENSES}"
            );
        }
    }
}
