//! Table and column presence checks run before every SQL normalizer.

use log::debug;
use rusqlite::{Connection, OptionalExtension};

/// A named requirement: one table carrying at least the listed columns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemaShape {
    pub table: &'static str,
    pub columns: &'static [&'static str],
}

impl SchemaShape {
    pub const fn new(table: &'static str, columns: &'static [&'static str]) -> Self {
        Self { table, columns }
    }

    pub fn is_present(&self, conn: &Connection) -> bool {
        SchemaProbe::probe(conn, self.table, self.columns)
    }

    /// True when every shape in the set is present
    pub fn all_present(conn: &Connection, shapes: &[SchemaShape]) -> bool {
        shapes.iter().all(|shape| shape.is_present(conn))
    }
}

pub struct SchemaProbe;

impl SchemaProbe {
    /// Check that `table` exists and carries every name in `columns`.
    ///
    /// Never fails: any error while inspecting the store counts as absent.
    /// Only reads `sqlite_master` and `pragma_table_info`.
    pub fn probe(conn: &Connection, table: &str, columns: &[&str]) -> bool {
        match Self::table_columns(conn, table) {
            Ok(Some(present)) => {
                let missing: Vec<&&str> = columns
                    .iter()
                    .filter(|wanted| !present.iter().any(|have| have.eq_ignore_ascii_case(wanted)))
                    .collect();
                if !missing.is_empty() {
                    debug!("Table {} lacks columns {:?}", table, missing);
                }
                missing.is_empty()
            }
            Ok(None) => {
                debug!("Table {} not present", table);
                false
            }
            Err(e) => {
                debug!("Schema probe for {} failed: {}", table, e);
                false
            }
        }
    }

    fn table_columns(conn: &Connection, table: &str) -> rusqlite::Result<Option<Vec<String>>> {
        let found: Option<String> = conn
            .query_row(
                "SELECT name FROM sqlite_master WHERE type IN ('table', 'view') AND name = ?1 COLLATE NOCASE",
                [table],
                |row| row.get(0),
            )
            .optional()?;

        let name = match found {
            Some(name) => name,
            None => return Ok(None),
        };

        let mut stmt = conn.prepare("SELECT name FROM pragma_table_info(?1)")?;
        let columns = stmt
            .query_map([&name], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(Some(columns))
    }
}
