//! Defines the expense store traits and the date ranges used to query them.

use time::Date;

use crate::{
    Error,
    expense::{Expense, NewExpense},
    user::UserID,
};

/// An inclusive range of dates where the start is never after the end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: Date,
    end: Date,
}

impl DateRange {
    /// Create the range of dates from `start` to `end`, including both ends.
    ///
    /// # Errors
    ///
    /// Returns [Error::InvalidRange] if `start` is after `end`.
    pub fn new(start: Date, end: Date) -> Result<Self, Error> {
        if start > end {
            return Err(Error::InvalidRange(start, end));
        }

        Ok(Self { start, end })
    }

    /// Create a range from optional bounds.
    ///
    /// A missing bound leaves that side of the range open. If both bounds are
    /// missing there is no range and `None` is returned.
    ///
    /// # Errors
    ///
    /// Returns [Error::InvalidRange] if `start` is after `end`.
    pub fn from_bounds(start: Option<Date>, end: Option<Date>) -> Result<Option<Self>, Error> {
        match (start, end) {
            (None, None) => Ok(None),
            (start, end) => {
                Self::new(start.unwrap_or(Date::MIN), end.unwrap_or(Date::MAX)).map(Some)
            }
        }
    }

    /// The first date in the range.
    pub fn start(&self) -> Date {
        self.start
    }

    /// The last date in the range.
    pub fn end(&self) -> Date {
        self.end
    }

    /// Whether `date` falls within the range.
    pub fn contains(&self, date: Date) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Saves entries and reads them back for their owner.
///
/// Every read is scoped to a single owner. Results are ordered newest date
/// first, with entries on the same date ordered newest ID first.
pub trait ExpenseStore {
    /// Save `expense` and return it with its assigned ID.
    ///
    /// IDs are unique and never reused, even when many saves happen at once.
    fn save(&self, expense: NewExpense) -> Result<Expense, Error>;

    /// Get every entry owned by `owner_id`.
    fn list_by_owner(&self, owner_id: UserID) -> Result<Vec<Expense>, Error>;

    /// Get the entries owned by `owner_id` that are dated within `range`.
    fn list_by_owner_in_range(
        &self,
        owner_id: UserID,
        range: DateRange,
    ) -> Result<Vec<Expense>, Error>;
}

/// Reads entries across all owners.
///
/// This is for administrative tools only and must never back a request from
/// a logged in user. Results use the same ordering as [ExpenseStore].
pub trait AdminExpenseStore {
    /// Get every entry in the store.
    fn list_all(&self) -> Result<Vec<Expense>, Error>;

    /// Get every entry in the store dated within `range`.
    fn list_in_range(&self, range: DateRange) -> Result<Vec<Expense>, Error>;
}

#[cfg(test)]
mod tests {
    use time::{Date, macros::date};

    use crate::Error;

    use super::DateRange;

    #[test]
    fn range_includes_both_ends() {
        let range = DateRange::new(date!(2025 - 01 - 01), date!(2025 - 01 - 31)).unwrap();

        assert!(range.contains(date!(2025 - 01 - 01)));
        assert!(range.contains(date!(2025 - 01 - 31)));
        assert!(!range.contains(date!(2024 - 12 - 31)));
        assert!(!range.contains(date!(2025 - 02 - 01)));
    }

    #[test]
    fn single_day_range_is_valid() {
        let day = date!(2025 - 09 - 08);

        assert!(DateRange::new(day, day).is_ok());
    }

    #[test]
    fn start_after_end_is_invalid() {
        let start = date!(2025 - 02 - 01);
        let end = date!(2025 - 01 - 01);

        assert_eq!(
            DateRange::new(start, end),
            Err(Error::InvalidRange(start, end))
        );
    }

    #[test]
    fn missing_bounds_are_open() {
        let day = date!(2025 - 09 - 08);

        assert_eq!(DateRange::from_bounds(None, None), Ok(None));
        assert_eq!(
            DateRange::from_bounds(Some(day), None),
            Ok(Some(DateRange::new(day, Date::MAX).unwrap()))
        );
        assert_eq!(
            DateRange::from_bounds(None, Some(day)),
            Ok(Some(DateRange::new(Date::MIN, day).unwrap()))
        );
    }
}
