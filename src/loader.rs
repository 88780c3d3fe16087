use anyhow::{Context, Result};
use rusqlite::{params, Connection};
use serde::Deserialize;
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

/// Sentinel bank name for rows whose bank name is blank after trimming.
pub const UNKNOWN_BANK: &str = "UNKNOWN_BANK";

/// How many skipped IFSC codes to keep for the operator report.
const SKIPPED_SAMPLE_LIMIT: usize = 5;

/// One row of the source CSV. A missing column fails deserialization of the
/// whole file, which aborts the load.
#[derive(Debug, Clone, Deserialize)]
pub struct BranchRecord {
    pub bank_name: String,
    pub ifsc: String,
    pub branch: String,
    pub address: String,
    pub city: String,
    pub district: String,
    pub state: String,
}

/// Outcome of one seed load.
#[derive(Debug, Default, Clone)]
pub struct LoadReport {
    pub banks_loaded: usize,
    pub branches_loaded: usize,
    pub branches_skipped: usize,
    /// At most [`SKIPPED_SAMPLE_LIMIT`] IFSC codes of skipped rows.
    pub skipped_sample: Vec<String>,
}

/// Normalize a bank name into the deduplication key: trim, uppercase,
/// blank becomes [`UNKNOWN_BANK`].
pub fn normalize_bank_name(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        UNKNOWN_BANK.to_string()
    } else {
        trimmed.to_uppercase()
    }
}

pub fn read_records(csv_path: &Path) -> Result<Vec<BranchRecord>> {
    let file = std::fs::File::open(csv_path)
        .with_context(|| format!("Failed to open CSV file {:?}", csv_path))?;
    parse_records(file)
}

pub fn parse_records<R: Read>(reader: R) -> Result<Vec<BranchRecord>> {
    let mut rdr = csv::Reader::from_reader(reader);

    let mut records = Vec::new();
    for result in rdr.deserialize() {
        let record: BranchRecord = result.context("Failed to deserialize branch record")?;
        records.push(record);
    }

    Ok(records)
}

/// Seed the store from a CSV extract.
///
/// Returns `None` without touching the store when banks are already present;
/// the load runs once per deployment, not once per call. On success everything
/// is committed in a single transaction and a [`LoadReport`] is returned. Rows
/// that violate a constraint (duplicate IFSC, unresolvable bank) are dropped
/// and counted, never fatal; any other failure rolls the whole batch back.
pub fn seed_from_csv(conn: &mut Connection, csv_path: &Path) -> Result<Option<LoadReport>> {
    if crate::db::bank_count(conn)? > 0 {
        println!("✓ Database already populated, skipping data load");
        return Ok(None);
    }

    let records = read_records(csv_path)?;
    let report = seed_records(conn, &records)?;

    println!(
        "✓ Loaded {} banks and {} branches",
        report.banks_loaded, report.branches_loaded
    );
    if report.branches_skipped > 0 {
        println!(
            "✓ Skipped {} branches: {:?}...",
            report.branches_skipped, report.skipped_sample
        );
    }

    Ok(Some(report))
}

/// Insert banks then branches inside one transaction.
///
/// Bank ids are assigned 1..N over distinct normalized names in first-seen
/// order, and are visible to the branch inserts before commit.
pub fn seed_records(conn: &mut Connection, records: &[BranchRecord]) -> Result<LoadReport> {
    let tx = conn.transaction()?;
    let mut report = LoadReport::default();

    let mut bank_ids: HashMap<String, i64> = HashMap::new();
    for record in records {
        let name = normalize_bank_name(&record.bank_name);
        if bank_ids.contains_key(&name) {
            continue;
        }
        let id = bank_ids.len() as i64 + 1;
        tx.execute(
            "INSERT INTO banks (id, name) VALUES (?1, ?2)",
            params![id, name],
        )?;
        bank_ids.insert(name, id);
    }
    report.banks_loaded = bank_ids.len();

    for record in records {
        let name = normalize_bank_name(&record.bank_name);

        // Every name was registered above; a miss here means the row is
        // unlinkable, so drop it and keep going.
        let Some(&bank_id) = bank_ids.get(&name) else {
            eprintln!("⚠ Skipping branch {} with missing bank: {}", record.ifsc, name);
            record_skip(&mut report, &record.ifsc);
            continue;
        };

        let result = tx.execute(
            "INSERT INTO branches (ifsc, bank_id, branch, address, city, district, state)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                record.ifsc,
                bank_id,
                record.branch,
                record.address,
                record.city,
                record.district,
                record.state,
            ],
        );

        match result {
            Ok(_) => report.branches_loaded += 1,
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                eprintln!("⚠ Failed to add branch {}: {}", record.ifsc, err);
                record_skip(&mut report, &record.ifsc);
            }
            // Anything else aborts the batch; dropping `tx` rolls back.
            Err(e) => return Err(e).context("Failed to insert branch"),
        }
    }

    tx.commit()?;

    Ok(report)
}

fn record_skip(report: &mut LoadReport, ifsc: &str) {
    report.branches_skipped += 1;
    if report.skipped_sample.len() < SKIPPED_SAMPLE_LIMIT {
        report.skipped_sample.push(ifsc.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    fn test_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        db::setup_database(&conn).unwrap();
        conn
    }

    fn record(bank_name: &str, ifsc: &str) -> BranchRecord {
        BranchRecord {
            bank_name: bank_name.to_string(),
            ifsc: ifsc.to_string(),
            branch: "Test Branch".to_string(),
            address: "123 Test Road".to_string(),
            city: "Test City".to_string(),
            district: "Test District".to_string(),
            state: "Test State".to_string(),
        }
    }

    #[test]
    fn test_normalize_bank_name() {
        assert_eq!(normalize_bank_name("  hdfc bank  "), "HDFC BANK");
        assert_eq!(normalize_bank_name("HDFC BANK"), "HDFC BANK");
        assert_eq!(normalize_bank_name(""), UNKNOWN_BANK);
        assert_eq!(normalize_bank_name("   "), UNKNOWN_BANK);
    }

    #[test]
    fn test_sequential_ids_in_first_seen_order() {
        let mut conn = test_conn();
        let records = vec![
            record("  hdfc bank ", "HDFC0000001"),
            record("ICICI BANK", "ICIC0000001"),
            record("HDFC BANK", "HDFC0000002"),
        ];

        let report = seed_records(&mut conn, &records).unwrap();

        assert_eq!(report.banks_loaded, 2);
        assert_eq!(report.branches_loaded, 3);
        assert_eq!(report.branches_skipped, 0);

        let banks = db::get_all_banks(&conn).unwrap();
        assert_eq!(banks.len(), 2);
        assert_eq!(banks[0].id, 1);
        assert_eq!(banks[0].name, "HDFC BANK");
        assert_eq!(banks[1].id, 2);
        assert_eq!(banks[1].name, "ICICI BANK");

        // Both spellings of HDFC resolve to bank 1
        assert_eq!(
            db::get_branch(&conn, "HDFC0000002").unwrap().unwrap().bank_id,
            1
        );
    }

    #[test]
    fn test_blank_bank_name_gets_sentinel() {
        let mut conn = test_conn();
        let records = vec![record("   ", "UNKN0000001")];

        seed_records(&mut conn, &records).unwrap();

        let branch = db::get_branch(&conn, "UNKN0000001").unwrap().unwrap();
        let bank = db::get_bank(&conn, branch.bank_id).unwrap().unwrap();
        assert_eq!(bank.name, UNKNOWN_BANK);
    }

    #[test]
    fn test_duplicate_ifsc_skipped_without_aborting() {
        let mut conn = test_conn();
        let records = vec![
            record("HDFC BANK", "HDFC0000001"),
            record("HDFC BANK", "HDFC0000001"),
            record("ICICI BANK", "ICIC0000001"),
        ];

        let report = seed_records(&mut conn, &records).unwrap();

        assert_eq!(report.branches_loaded, 2);
        assert_eq!(report.branches_skipped, 1);
        assert_eq!(report.skipped_sample, vec!["HDFC0000001".to_string()]);

        // The row after the defect still landed
        assert!(db::get_branch(&conn, "ICIC0000001").unwrap().is_some());
    }

    #[test]
    fn test_skipped_sample_is_bounded() {
        let mut report = LoadReport::default();
        for i in 0..10 {
            record_skip(&mut report, &format!("DUPE000000{}", i));
        }

        assert_eq!(report.branches_skipped, 10);
        assert_eq!(report.skipped_sample.len(), 5);
    }

    #[test]
    fn test_seed_is_idempotent_per_deployment() {
        let mut conn = test_conn();
        let csv = "bank_name,ifsc,branch,address,city,district,state\n\
                   Test Bank,TEST0001234,Test Branch,123 Test Road,Test City,Test District,Test State\n";

        let dir = std::env::temp_dir().join(format!("bank-seed-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("branches.csv");
        std::fs::write(&path, csv).unwrap();

        let first = seed_from_csv(&mut conn, &path).unwrap();
        assert!(first.is_some());
        assert_eq!(db::bank_count(&conn).unwrap(), 1);

        let second = seed_from_csv(&mut conn, &path).unwrap();
        assert!(second.is_none());
        assert_eq!(db::bank_count(&conn).unwrap(), 1);
        assert_eq!(db::branch_count(&conn).unwrap(), 1);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_parse_records() {
        let csv = "bank_name,ifsc,branch,address,city,district,state\n\
                   Test Bank,TEST0001234,Test Branch,123 Test Road,Test City,Test District,Test State\n";

        let records = parse_records(csv.as_bytes()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].bank_name, "Test Bank");
        assert_eq!(records[0].ifsc, "TEST0001234");
    }

    #[test]
    fn test_missing_column_is_fatal() {
        // No ifsc column at all
        let csv = "bank_name,branch,address,city,district,state\n\
                   Test Bank,Test Branch,123 Test Road,Test City,Test District,Test State\n";

        assert!(parse_records(csv.as_bytes()).is_err());
    }

    #[test]
    fn test_missing_file_is_fatal() {
        assert!(read_records(Path::new("/nonexistent/branches.csv")).is_err());
    }
}
