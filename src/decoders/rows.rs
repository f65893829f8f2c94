//! Best-effort column readers.
//!
//! Vendor stores are loosely typed: a "number" column may hold text, an
//! integer, or NULL depending on the release. These readers coerce instead
//! of failing so one odd cell never sinks a whole artifact.

use rusqlite::types::ValueRef;
use rusqlite::{Connection, Row};

use crate::error::Result;

/// Run `sql` and map every row; mapping itself cannot fail
pub fn query_all<T, F>(conn: &Connection, sql: &str, mut map: F) -> Result<Vec<T>>
where
    F: FnMut(&Row<'_>) -> T,
{
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query([])?;
    let mut out = Vec::new();
    while let Some(row) = rows.next()? {
        out.push(map(row));
    }
    Ok(out)
}

/// Cell as text, or None for NULL / missing columns
pub fn opt_text(row: &Row<'_>, idx: usize) -> Option<String> {
    match row.get_ref(idx).ok()? {
        ValueRef::Null => None,
        ValueRef::Integer(i) => Some(i.to_string()),
        ValueRef::Real(f) => Some(f.to_string()),
        ValueRef::Text(t) | ValueRef::Blob(t) => Some(String::from_utf8_lossy(t).into_owned()),
    }
}

/// Cell as text, empty when unknown
pub fn text(row: &Row<'_>, idx: usize) -> String {
    opt_text(row, idx).unwrap_or_default()
}

pub fn opt_int(row: &Row<'_>, idx: usize) -> Option<i64> {
    match row.get_ref(idx).ok()? {
        ValueRef::Integer(i) => Some(i),
        ValueRef::Real(f) => Some(f as i64),
        ValueRef::Text(t) => std::str::from_utf8(t).ok()?.trim().parse().ok(),
        ValueRef::Null | ValueRef::Blob(_) => None,
    }
}

/// Cell as integer, zero when unknown
pub fn int(row: &Row<'_>, idx: usize) -> i64 {
    opt_int(row, idx).unwrap_or(0)
}

/// Raw bytes of a non-empty blob cell
pub fn blob(row: &Row<'_>, idx: usize) -> Option<Vec<u8>> {
    match row.get_ref(idx).ok()? {
        ValueRef::Blob(b) if !b.is_empty() => Some(b.to_vec()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coercions() {
        let conn = Connection::open_in_memory().unwrap();
        let values = query_all(
            &conn,
            "SELECT NULL, 42, ' 17 ', 'abc', x'0102', 2.5",
            |row| {
                (
                    text(row, 0),
                    text(row, 1),
                    int(row, 2),
                    int(row, 3),
                    blob(row, 4),
                    int(row, 5),
                    text(row, 99),
                )
            },
        )
        .unwrap();

        assert_eq!(
            values,
            vec![(
                String::new(),
                "42".to_string(),
                17,
                0,
                Some(vec![1, 2]),
                2,
                String::new()
            )]
        );
    }

    #[test]
    fn test_query_error_propagates() {
        let conn = Connection::open_in_memory().unwrap();
        assert!(query_all(&conn, "SELECT * FROM nope", |_| ()).is_err());
    }
}
