//! Implements a SQLite backed expense store.
use std::{
    str::FromStr,
    sync::{Arc, Mutex},
};

use rusqlite::{
    Connection, Row, params_from_iter,
    types::{Type, Value},
};
use rust_decimal::Decimal;
use time::Date;

use crate::{
    Error,
    expense::{AdminExpenseStore, DateRange, Expense, ExpenseStore, NewExpense},
    user::UserID,
};

const SELECT_COLUMNS: &str = "SELECT id, owner_id, entry_type, category, amount, note, place, \
     date, payment_method, icon_key FROM expense";

/// Stores income and expense entries in a SQLite database.
///
/// Entries reference their owner in the user table, so the user table must
/// be set up in the same database.
#[derive(Debug, Clone)]
pub struct SQLiteExpenseStore {
    connection: Arc<Mutex<Connection>>,
}

impl SQLiteExpenseStore {
    /// Create a new store for the SQLite `connection`.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }

    /// Select entries, optionally filtered by owner and date range.
    fn select(
        &self,
        owner_id: Option<UserID>,
        range: Option<DateRange>,
    ) -> Result<Vec<Expense>, Error> {
        let mut query_string_parts = vec![SELECT_COLUMNS.to_owned()];
        let mut where_clause_parts = vec![];
        let mut query_parameters = vec![];

        if let Some(owner_id) = owner_id {
            where_clause_parts.push(format!("owner_id = ?{}", query_parameters.len() + 1));
            query_parameters.push(Value::Integer(owner_id.as_i64()));
        }

        if let Some(range) = range {
            where_clause_parts.push(format!(
                "date BETWEEN ?{} AND ?{}",
                query_parameters.len() + 1,
                query_parameters.len() + 2,
            ));
            query_parameters.push(Value::Integer(range.start().to_julian_day().into()));
            query_parameters.push(Value::Integer(range.end().to_julian_day().into()));
        }

        if !where_clause_parts.is_empty() {
            query_string_parts.push(String::from("WHERE ") + &where_clause_parts.join(" AND "));
        }

        // Sort by date, and then ID so that entries on the same day keep a stable order.
        query_string_parts.push("ORDER BY date DESC, id DESC".to_owned());

        let query_string = query_string_parts.join(" ");
        let params = params_from_iter(query_parameters.iter());

        let connection = self
            .connection
            .lock()
            .map_err(|_| Error::DatabaseLockError)?;

        connection
            .prepare(&query_string)?
            .query_map(params, map_expense_row)?
            .map(|maybe_expense| maybe_expense.map_err(Error::SqlError))
            .collect()
    }
}

impl ExpenseStore for SQLiteExpenseStore {
    /// Insert `expense` into the database.
    ///
    /// The insert and the ID assignment happen in a single statement, so
    /// concurrent saves cannot be given the same ID.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::DatabaseLockError] if the database lock is poisoned,
    /// - or [Error::SqlError] if there is some SQL error, e.g. the owner does not exist.
    fn save(&self, expense: NewExpense) -> Result<Expense, Error> {
        let connection = self
            .connection
            .lock()
            .map_err(|_| Error::DatabaseLockError)?;

        let expense = connection
            .prepare(
                "INSERT INTO expense (owner_id, entry_type, category, amount, note, place, date, payment_method, icon_key)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                 RETURNING id, owner_id, entry_type, category, amount, note, place, date, payment_method, icon_key",
            )?
            .query_row(
                (
                    expense.owner_id.as_i64(),
                    expense.entry_type,
                    expense.category,
                    expense.amount.to_string(),
                    expense.note,
                    expense.place,
                    expense.date.to_julian_day(),
                    expense.payment_method,
                    expense.icon_key,
                ),
                map_expense_row,
            )?;

        Ok(expense)
    }

    fn list_by_owner(&self, owner_id: UserID) -> Result<Vec<Expense>, Error> {
        self.select(Some(owner_id), None)
    }

    fn list_by_owner_in_range(
        &self,
        owner_id: UserID,
        range: DateRange,
    ) -> Result<Vec<Expense>, Error> {
        self.select(Some(owner_id), Some(range))
    }
}

impl AdminExpenseStore for SQLiteExpenseStore {
    fn list_all(&self) -> Result<Vec<Expense>, Error> {
        self.select(None, None)
    }

    fn list_in_range(&self, range: DateRange) -> Result<Vec<Expense>, Error> {
        self.select(None, Some(range))
    }
}

/// Create the expense table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_expense_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    // AUTOINCREMENT stops the IDs of deleted rows from being handed out again.
    // Dates are stored as Julian day numbers so they sort and compare numerically.
    connection.execute(
        "CREATE TABLE IF NOT EXISTS expense (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                owner_id INTEGER NOT NULL,
                entry_type TEXT NOT NULL CHECK (entry_type IN ('INCOME', 'EXPENSE')),
                category TEXT NOT NULL,
                amount TEXT NOT NULL,
                note TEXT,
                place TEXT,
                date INTEGER NOT NULL,
                payment_method TEXT,
                icon_key TEXT,
                FOREIGN KEY(owner_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_expense_owner_date ON expense(owner_id, date);",
        (),
    )?;

    Ok(())
}

/// Map a database row to an [Expense].
pub fn map_expense_row(row: &Row) -> Result<Expense, rusqlite::Error> {
    let raw_amount: String = row.get(4)?;
    let amount = Decimal::from_str(&raw_amount).map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(error))
    })?;
    let date = Date::from_julian_day(row.get(7)?).map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(7, Type::Integer, Box::new(error))
    })?;

    Ok(Expense {
        id: row.get(0)?,
        owner_id: UserID::new(row.get(1)?),
        entry_type: row.get(2)?,
        category: row.get(3)?,
        amount,
        note: row.get(5)?,
        place: row.get(6)?,
        date,
        payment_method: row.get(8)?,
        icon_key: row.get(9)?,
    })
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{Arc, Mutex},
        thread,
    };

    use rusqlite::Connection;
    use rust_decimal_macros::dec;
    use time::{Date, Duration, Month, macros::date};

    use crate::{
        Error,
        db::initialize,
        expense::{
            AdminExpenseStore, DateRange, EntryType, Expense, ExpenseStore, NewExpense,
            SQLiteExpenseStore,
        },
        user::{SQLiteUserStore, User, UserID, UserStore, Username},
    };

    fn get_stores() -> (SQLiteExpenseStore, SQLiteUserStore) {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        let conn = Arc::new(Mutex::new(conn));

        (
            SQLiteExpenseStore::new(conn.clone()),
            SQLiteUserStore::new(conn),
        )
    }

    fn create_user(store: &SQLiteUserStore, name: &str) -> User {
        store.create(Username::new_unchecked(name)).unwrap()
    }

    fn new_expense(owner: &User, date: Date) -> NewExpense {
        NewExpense {
            owner_id: owner.id,
            entry_type: EntryType::Expense,
            category: "Food".to_owned(),
            amount: dec!(12.30),
            note: Some("noodles".to_owned()),
            place: Some("market".to_owned()),
            date,
            payment_method: None,
            icon_key: Some("bowl".to_owned()),
        }
    }

    #[track_caller]
    fn assert_same_entry(stored: &Expense, want: &NewExpense) {
        assert_eq!(stored.owner_id, want.owner_id);
        assert_eq!(stored.entry_type, want.entry_type);
        assert_eq!(stored.category, want.category);
        assert_eq!(stored.amount, want.amount);
        assert_eq!(stored.note, want.note);
        assert_eq!(stored.place, want.place);
        assert_eq!(stored.date, want.date);
        assert_eq!(stored.payment_method, want.payment_method);
        assert_eq!(stored.icon_key, want.icon_key);
    }

    #[test]
    fn save_assigns_id() {
        let (store, users) = get_stores();
        let alice = create_user(&users, "alice");
        let want = new_expense(&alice, date!(2025 - 09 - 08));

        let first = store.save(want.clone()).unwrap();
        let second = store.save(want.clone()).unwrap();

        assert!(first.id > 0);
        assert!(second.id > first.id);
        assert_same_entry(&first, &want);
    }

    #[test]
    fn save_keeps_exact_amount() {
        let (store, users) = get_stores();
        let alice = create_user(&users, "alice");
        let mut want = new_expense(&alice, date!(2025 - 09 - 08));
        want.amount = dec!(0.1) + dec!(0.2);

        store.save(want).unwrap();
        let got = store.list_by_owner(alice.id).unwrap();

        assert_eq!(got[0].amount, dec!(0.3));
        assert_eq!(got[0].amount.to_string(), "0.3");
    }

    #[test]
    fn save_fails_for_unknown_owner() {
        let (store, _users) = get_stores();
        let ghost = User {
            id: UserID::new(999),
            username: Username::new_unchecked("ghost"),
        };

        let result = store.save(new_expense(&ghost, date!(2025 - 09 - 08)));

        assert!(matches!(result, Err(Error::SqlError(_))));
    }

    #[test]
    fn saved_entry_round_trips() {
        let (store, users) = get_stores();
        let alice = create_user(&users, "alice");
        let want = NewExpense {
            entry_type: EntryType::Income,
            note: None,
            place: None,
            icon_key: None,
            payment_method: Some("transfer".to_owned()),
            ..new_expense(&alice, date!(2024 - 02 - 29))
        };

        let saved = store.save(want.clone()).unwrap();
        let got = store.list_by_owner(alice.id).unwrap();

        assert_eq!(got, vec![saved]);
        assert_same_entry(&got[0], &want);
    }

    #[test]
    fn list_by_owner_only_returns_owners_entries() {
        let (store, users) = get_stores();
        let alice = create_user(&users, "alice");
        let bob = create_user(&users, "bob");
        let today = date!(2025 - 09 - 08);
        for i in 0..5 {
            store
                .save(new_expense(&alice, today - Duration::days(i)))
                .unwrap();
            store.save(new_expense(&bob, today - Duration::days(i))).unwrap();
        }

        let got = store.list_by_owner(alice.id).unwrap();

        assert_eq!(got.len(), 5);
        assert!(got.iter().all(|expense| expense.owner_id == alice.id));
    }

    #[test]
    fn list_by_owner_orders_by_date_then_id_descending() {
        let (store, users) = get_stores();
        let alice = create_user(&users, "alice");
        let dates = [
            date!(2025 - 09 - 07),
            date!(2025 - 09 - 08),
            date!(2025 - 09 - 07),
            date!(2025 - 08 - 30),
            date!(2025 - 09 - 08),
        ];
        let mut want = Vec::new();
        for date in dates {
            want.push(store.save(new_expense(&alice, date)).unwrap());
        }
        want.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));

        let got = store.list_by_owner(alice.id).unwrap();

        assert_eq!(got, want);
    }

    #[test]
    fn list_in_range_includes_both_ends() {
        let (store, users) = get_stores();
        let alice = create_user(&users, "alice");
        let bob = create_user(&users, "bob");
        let today = date!(2025 - 09 - 08);
        for i in 0..10 {
            store
                .save(new_expense(&alice, today - Duration::days(i)))
                .unwrap();
            store.save(new_expense(&bob, today - Duration::days(i))).unwrap();
        }
        let range = DateRange::new(today - Duration::days(6), today - Duration::days(2)).unwrap();

        let got = store.list_by_owner_in_range(alice.id, range).unwrap();

        let want: Vec<Expense> = store
            .list_by_owner(alice.id)
            .unwrap()
            .into_iter()
            .filter(|expense| range.contains(expense.date))
            .collect();
        assert_eq!(got.len(), 5, "got {} entries, want 5", got.len());
        assert_eq!(got, want);
        assert_eq!(got.first().unwrap().date, range.end());
        assert_eq!(got.last().unwrap().date, range.start());
    }

    #[test]
    fn range_with_only_a_start_is_open_ended() {
        let (store, users) = get_stores();
        let alice = create_user(&users, "alice");
        store
            .save(new_expense(&alice, date!(1999 - 01 - 01)))
            .unwrap();
        let later = store
            .save(new_expense(&alice, date!(2030 - 12 - 31)))
            .unwrap();
        let range = DateRange::from_bounds(Some(date!(2000 - 01 - 01)), None)
            .unwrap()
            .unwrap();

        let got = store.list_by_owner_in_range(alice.id, range).unwrap();

        assert_eq!(got, vec![later]);
    }

    #[test]
    fn negative_years_sort_and_filter_by_date() {
        let (store, users) = get_stores();
        let alice = create_user(&users, "alice");
        let one_bc = Date::from_calendar_date(-1, Month::January, 1).unwrap();
        let five_hundred_bc = Date::from_calendar_date(-500, Month::January, 1).unwrap();
        let dates = [
            one_bc,
            date!(2025 - 09 - 08),
            five_hundred_bc,
        ];
        for date in dates {
            store.save(new_expense(&alice, date)).unwrap();
        }
        let range = DateRange::from_bounds(None, Some(date!(2000 - 01 - 01)))
            .unwrap()
            .unwrap();

        let all: Vec<_> = store
            .list_by_owner(alice.id)
            .unwrap()
            .iter()
            .map(|expense| expense.date)
            .collect();
        let before_2000: Vec<_> = store
            .list_by_owner_in_range(alice.id, range)
            .unwrap()
            .iter()
            .map(|expense| expense.date)
            .collect();

        assert_eq!(
            all,
            vec![date!(2025 - 09 - 08), one_bc, five_hundred_bc]
        );
        assert_eq!(before_2000, vec![one_bc, five_hundred_bc]);
    }

    #[test]
    fn admin_reads_span_all_owners() {
        let (store, users) = get_stores();
        let alice = create_user(&users, "alice");
        let bob = create_user(&users, "bob");
        store
            .save(new_expense(&alice, date!(2025 - 09 - 01)))
            .unwrap();
        store.save(new_expense(&bob, date!(2025 - 09 - 05))).unwrap();
        store.save(new_expense(&bob, date!(2025 - 10 - 01))).unwrap();

        let all = store.list_all().unwrap();
        let september = store
            .list_in_range(DateRange::new(date!(2025 - 09 - 01), date!(2025 - 09 - 30)).unwrap())
            .unwrap();

        assert_eq!(all.len(), 3);
        assert_eq!(all[0].date, date!(2025 - 10 - 01));
        assert_eq!(september.len(), 2);
        assert_eq!(september[0].owner_id, bob.id);
        assert_eq!(september[1].owner_id, alice.id);
    }

    #[test]
    fn concurrent_saves_get_unique_ids() {
        let (store, users) = get_stores();
        let alice = create_user(&users, "alice");

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                let expense = new_expense(&alice, date!(2025 - 09 - 08));
                thread::spawn(move || store.save(expense).unwrap().id)
            })
            .collect();
        let mut ids: Vec<_> = handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect();
        ids.sort();
        ids.dedup();

        assert_eq!(ids.len(), 8);
    }
}
