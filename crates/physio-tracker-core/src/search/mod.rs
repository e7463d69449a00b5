//! Text folding for patient search.
//!
//! Search is case- and diacritic-insensitive: both the stored columns and
//! the query are folded to lowercase ASCII-ish text before comparison.
//! SQLite sees the same folding through the `fold_text` SQL function.

mod fold;

pub use fold::fold;

use rusqlite::functions::FunctionFlags;
use rusqlite::Connection;

/// Name of the SQL function registered by [`register_functions`].
pub const FOLD_FUNCTION: &str = "fold_text";

/// Register search helpers on a connection. Must run before any query uses them.
pub fn register_functions(conn: &Connection) -> rusqlite::Result<()> {
    conn.create_scalar_function(
        FOLD_FUNCTION,
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let text: Option<String> = ctx.get(0)?;
            Ok(text.map(|t| fold(&t)))
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sql_function() {
        let conn = Connection::open_in_memory().unwrap();
        register_functions(&conn).unwrap();

        let folded: String = conn
            .query_row("SELECT fold_text('José ÅNGSTRÖM')", [], |row| row.get(0))
            .unwrap();
        assert_eq!(folded, "jose angstrom");

        let null: Option<String> = conn
            .query_row("SELECT fold_text(NULL)", [], |row| row.get(0))
            .unwrap();
        assert!(null.is_none());
    }
}
