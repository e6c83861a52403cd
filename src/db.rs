use anyhow::{Context, Result};
use sqlx::MySqlPool;

// Ids and dates are matched byte for byte in Rust, so they use a binary
// collation here too. `e001` and `E001` are two employees.
const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS employees (
        id BIGINT UNSIGNED AUTO_INCREMENT PRIMARY KEY,
        employee_id VARCHAR(191) COLLATE utf8mb4_bin NOT NULL,
        name VARCHAR(255) NOT NULL DEFAULT '',
        directorate VARCHAR(255) NOT NULL DEFAULT '',
        department VARCHAR(255) NOT NULL DEFAULT '',
        UNIQUE KEY uq_employees_employee_id (employee_id)
    )
    "#,
    // no foreign keys: swipes and leave may name employees missing from the directory
    r#"
    CREATE TABLE IF NOT EXISTS card_logins (
        id BIGINT UNSIGNED AUTO_INCREMENT PRIMARY KEY,
        employee_id VARCHAR(191) COLLATE utf8mb4_bin NOT NULL,
        date VARCHAR(191) COLLATE utf8mb4_bin NOT NULL DEFAULT '',
        time VARCHAR(191) NOT NULL DEFAULT '',
        KEY idx_card_logins_employee_id (employee_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS official_leaves (
        id BIGINT UNSIGNED AUTO_INCREMENT PRIMARY KEY,
        employee_id VARCHAR(191) COLLATE utf8mb4_bin NOT NULL,
        date VARCHAR(191) COLLATE utf8mb4_bin NOT NULL DEFAULT '',
        reason TEXT NOT NULL,
        KEY idx_official_leaves_employee_id (employee_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS source_snapshots (
        source VARCHAR(32) NOT NULL PRIMARY KEY,
        version BIGINT UNSIGNED NOT NULL,
        record_count BIGINT UNSIGNED NOT NULL,
        replaced_at TIMESTAMP NOT NULL
    )
    "#,
];

pub async fn init_db(database_url: &str) -> Result<MySqlPool> {
    let pool = MySqlPool::connect(database_url)
        .await
        .context("Failed to connect to database")?;

    for statement in SCHEMA {
        sqlx::query(statement)
            .execute(&pool)
            .await
            .context("Failed to create schema")?;
    }

    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(table: &str, name: &str) -> &'static str {
        let statement = SCHEMA
            .iter()
            .find(|s| s.contains(&format!("EXISTS {table} (")))
            .unwrap();
        statement
            .lines()
            .map(str::trim)
            .find(|line| line.starts_with(&format!("{name} ")))
            .unwrap()
    }

    #[test]
    fn test_keys_compare_byte_for_byte() {
        for table in ["employees", "card_logins", "official_leaves"] {
            assert!(column(table, "employee_id").contains("COLLATE utf8mb4_bin"));
        }
        assert!(column("card_logins", "date").contains("COLLATE utf8mb4_bin"));
        assert!(column("official_leaves", "date").contains("COLLATE utf8mb4_bin"));
    }

    #[test]
    fn test_leave_reason_is_unbounded() {
        assert!(column("official_leaves", "reason").starts_with("reason TEXT"));
    }
}
