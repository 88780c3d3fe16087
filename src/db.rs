use anyhow::Result;
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::Serialize;

/// A bank, identified by a synthetic sequential id assigned at seed time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bank {
    pub id: i64,
    pub name: String,
}

/// A branch, identified by its IFSC routing code.
///
/// `bank_id` is the storage-level foreign key; it is skipped during
/// serialization because the API nests the owning bank as an object instead.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Branch {
    pub ifsc: String,
    #[serde(skip)]
    pub bank_id: i64,
    pub branch: String,
    pub address: String,
    pub city: String,
    pub district: String,
    pub state: String,
}

pub fn setup_database(conn: &Connection) -> Result<()> {
    // Enable WAL mode for crash recovery
    conn.pragma_update(None, "journal_mode", "WAL")?;

    // Branch rows must always point at an existing bank
    conn.pragma_update(None, "foreign_keys", "ON")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS banks (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS branches (
            ifsc TEXT PRIMARY KEY,
            bank_id INTEGER NOT NULL REFERENCES banks(id),
            branch TEXT NOT NULL,
            address TEXT NOT NULL,
            city TEXT NOT NULL,
            district TEXT NOT NULL,
            state TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_branches_bank_id ON branches(bank_id)",
        [],
    )?;

    Ok(())
}

/// Number of banks currently stored. The loader treats a non-zero count as
/// "already seeded".
pub fn bank_count(conn: &Connection) -> Result<i64> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM banks", [], |row| row.get(0))?;

    Ok(count)
}

pub fn get_all_banks(conn: &Connection) -> Result<Vec<Bank>> {
    let mut stmt = conn.prepare("SELECT id, name FROM banks ORDER BY id")?;

    let banks = stmt
        .query_map([], |row| {
            Ok(Bank {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(banks)
}

pub fn get_bank(conn: &Connection, id: i64) -> Result<Option<Bank>> {
    let bank = conn
        .query_row(
            "SELECT id, name FROM banks WHERE id = ?1",
            params![id],
            |row| {
                Ok(Bank {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            },
        )
        .optional()?;

    Ok(bank)
}

fn branch_from_row(row: &Row<'_>) -> rusqlite::Result<Branch> {
    Ok(Branch {
        ifsc: row.get(0)?,
        bank_id: row.get(1)?,
        branch: row.get(2)?,
        address: row.get(3)?,
        city: row.get(4)?,
        district: row.get(5)?,
        state: row.get(6)?,
    })
}

pub fn get_branches_for_bank(conn: &Connection, bank_id: i64) -> Result<Vec<Branch>> {
    let mut stmt = conn.prepare(
        "SELECT ifsc, bank_id, branch, address, city, district, state
         FROM branches
         WHERE bank_id = ?1",
    )?;

    let branches = stmt
        .query_map(params![bank_id], branch_from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(branches)
}

/// Look up a single branch by its IFSC code (primary key).
pub fn get_branch(conn: &Connection, ifsc: &str) -> Result<Option<Branch>> {
    let branch = conn
        .query_row(
            "SELECT ifsc, bank_id, branch, address, city, district, state
             FROM branches
             WHERE ifsc = ?1",
            params![ifsc],
            branch_from_row,
        )
        .optional()?;

    Ok(branch)
}

pub fn branch_count(conn: &Connection) -> Result<i64> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM branches", [], |row| row.get(0))?;

    Ok(count)
}
