use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::Connection;

use crate::output::{COLUMNS, TABLE};
use crate::record::Record;

pub fn connect(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path)
        .with_context(|| format!("abrindo banco {}", path.display()))?;
    conn.execute_batch("PRAGMA journal_mode=WAL;")?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(&format!(
        "
        CREATE TABLE IF NOT EXISTS {TABLE} (
            id         INTEGER PRIMARY KEY,
            name       TEXT,
            identifier TEXT,
            birth_date TEXT,
            sex        TEXT CHECK(sex IN ('M','F')),
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );
        CREATE INDEX IF NOT EXISTS idx_{TABLE}_identifier ON {TABLE}(identifier);
        "
    ))?;
    Ok(())
}

/// Insert records with bound parameters, in one transaction.
pub fn save_records(conn: &Connection, records: &[Record]) -> Result<usize> {
    let tx = conn.unchecked_transaction()?;
    let mut count = 0;
    {
        let mut stmt = tx.prepare(&format!(
            "INSERT INTO {TABLE} ({}) VALUES (?1, ?2, ?3, ?4)",
            COLUMNS.join(", ")
        ))?;
        for r in records {
            count += stmt.execute(rusqlite::params![
                Some(r.name()).filter(|s| !s.is_empty()),
                Some(r.identifier()).filter(|s| !s.is_empty()),
                r.birth_date().map(|d| d.format("%Y-%m-%d").to_string()),
                r.sex().code(),
            ])?;
        }
    }
    tx.commit()?;
    Ok(count)
}

pub fn count_records(conn: &Connection) -> Result<usize> {
    let n: usize = conn.query_row(&format!("SELECT COUNT(*) FROM {TABLE}"), [], |r| r.get(0))?;
    Ok(n)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::output::render_sql;
    use crate::record::{Fields, Sex};

    fn records() -> Vec<Record> {
        let today = NaiveDate::from_ymd_opt(2025, 4, 16).unwrap();
        vec![
            Record::new(
                Fields {
                    name: "D'AVILA".into(),
                    identifier: "12345678901".into(),
                    birth_date: NaiveDate::from_ymd_opt(1985, 4, 15),
                    sex: Some(Sex::Female),
                },
                "",
                today,
            ),
            Record::new(Fields::default(), "", today),
        ]
    }

    fn memory() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        conn
    }

    #[test]
    fn save_with_parameters() {
        let conn = memory();
        assert_eq!(save_records(&conn, &records()).unwrap(), 2);
        assert_eq!(count_records(&conn).unwrap(), 2);
        let nulls: usize = conn
            .query_row(
                "SELECT COUNT(*) FROM people WHERE name IS NULL AND sex IS NULL",
                [],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(nulls, 1);
    }

    #[test]
    fn rendered_sql_matches_schema() {
        let conn = memory();
        conn.execute_batch(&render_sql(&records())).unwrap();
        let name: String = conn
            .query_row(
                "SELECT name FROM people WHERE identifier = '12345678901'",
                [],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(name, "D'AVILA");
        assert_eq!(count_records(&conn).unwrap(), 2);
    }
}
