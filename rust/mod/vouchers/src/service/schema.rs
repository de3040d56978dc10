use portal_core::ServiceError;
use portal_sql::SQLStore;

/// SQL DDL statements to initialize the voucher database schema.
///
/// One relational table keyed by the internal identifier with a unique
/// secondary key on `code`. Timestamps are RFC 3339 TEXT; `used_at` and
/// `expires_at` stay NULL until redemption.
const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS vouchers (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        code TEXT NOT NULL UNIQUE,
        status TEXT NOT NULL,
        duration TEXT NOT NULL,
        data_limit TEXT NOT NULL,
        created_at TEXT NOT NULL,
        used_at TEXT,
        expires_at TEXT
    )",
    // Indexes
    "CREATE INDEX IF NOT EXISTS idx_voucher_status ON vouchers(status)",
    "CREATE INDEX IF NOT EXISTS idx_voucher_created ON vouchers(created_at)",
];

pub fn init_schema(sql: &dyn SQLStore) -> Result<(), ServiceError> {
    for stmt in SCHEMA {
        sql.exec(stmt, &[])
            .map_err(|e| ServiceError::Storage(format!("schema init failed: {}", e)))?;
    }
    Ok(())
}
