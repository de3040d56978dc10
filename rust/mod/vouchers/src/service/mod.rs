pub mod redeem;
pub mod report;
pub mod schema;
pub mod voucher;

use portal_core::ServiceError;
use portal_sql::{Row, SQLStore, Value};

use crate::model::{Voucher, VoucherStatus};

/// Column list shared by every voucher SELECT.
pub(crate) const VOUCHER_COLUMNS: &str =
    "id, code, status, duration, data_limit, created_at, used_at, expires_at";

/// Voucher service — holds the storage backend and enforces the voucher
/// lifecycle rules (creation, redemption, reporting).
pub struct VoucherService {
    pub(crate) sql: Box<dyn SQLStore>,
}

impl VoucherService {
    pub fn new(sql: Box<dyn SQLStore>) -> Result<Self, ServiceError> {
        schema::init_schema(sql.as_ref())?;
        Ok(Self { sql })
    }

    // ── Row mapping ──

    pub(crate) fn voucher_from_row(row: &Row) -> Result<Voucher, ServiceError> {
        let status_str = row
            .get_str("status")
            .ok_or_else(|| ServiceError::Internal("missing status column".into()))?;
        let status = VoucherStatus::parse(status_str).ok_or_else(|| {
            ServiceError::Internal(format!("unknown voucher status '{}'", status_str))
        })?;

        let text = |name: &str| -> Result<String, ServiceError> {
            row.get_str(name)
                .map(String::from)
                .ok_or_else(|| ServiceError::Internal(format!("missing {} column", name)))
        };

        Ok(Voucher {
            id: row
                .get_i64("id")
                .ok_or_else(|| ServiceError::Internal("missing id column".into()))?,
            code: text("code")?,
            status,
            duration: text("duration")?,
            data_limit: text("data_limit")?,
            created_at: text("created_at")?,
            used_at: row.get_str("used_at").map(String::from),
            expires_at: row.get_str("expires_at").map(String::from),
        })
    }

    /// Fetch one voucher by internal id.
    pub(crate) fn fetch_by_id(&self, id: i64) -> Result<Option<Voucher>, ServiceError> {
        let sql = format!("SELECT {} FROM vouchers WHERE id = ?1", VOUCHER_COLUMNS);
        let rows = self
            .sql
            .query(&sql, &[Value::Integer(id)])
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        rows.first().map(Self::voucher_from_row).transpose()
    }

    /// Fetch one voucher by code.
    pub(crate) fn fetch_by_code(&self, code: &str) -> Result<Option<Voucher>, ServiceError> {
        let sql = format!("SELECT {} FROM vouchers WHERE code = ?1", VOUCHER_COLUMNS);
        let rows = self
            .sql
            .query(&sql, &[Value::Text(code.to_string())])
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        rows.first().map(Self::voucher_from_row).transpose()
    }

    /// Count vouchers matching an optional status filter.
    pub(crate) fn count_by_status(
        &self,
        status: Option<VoucherStatus>,
    ) -> Result<u64, ServiceError> {
        let (sql, params): (&str, Vec<Value>) = match status {
            Some(s) => (
                "SELECT COUNT(*) AS cnt FROM vouchers WHERE status = ?1",
                vec![Value::Text(s.as_str().to_string())],
            ),
            None => ("SELECT COUNT(*) AS cnt FROM vouchers", vec![]),
        };
        let rows = self
            .sql
            .query(sql, &params)
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        Ok(rows.first().and_then(|r| r.get_i64("cnt")).unwrap_or(0) as u64)
    }
}
