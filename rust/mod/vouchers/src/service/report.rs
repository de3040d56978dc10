use chrono::{DateTime, Utc};
use portal_core::ServiceError;
use portal_sql::Value;
use serde::Serialize;

use crate::model::VoucherStatus;
use super::{VOUCHER_COLUMNS, VoucherService};

/// CSV header, columns in persisted order.
pub const CSV_HEADER: &str = "code,status,duration,data_limit,created_at,used_at,expires_at";

/// Maximum number of entries in the activity feed.
const ACTIVITY_LIMIT: usize = 10;

/// Point-in-time aggregate over all vouchers.
#[derive(Debug, Serialize, PartialEq)]
pub struct VoucherStats {
    pub total: u64,
    pub active: u64,
    pub used_today: u64,
    /// Percent of vouchers redeemed, one decimal place (`"42.3%"`);
    /// `"0%"` for an empty store.
    pub success_rate: String,
}

/// One entry of the recent-activity feed.
#[derive(Debug, Serialize)]
pub struct ActivityEntry {
    pub code: String,
    pub status: VoucherStatus,
    /// `created_at` reduced to `YYYY-MM-DD HH:MM`.
    pub time: String,
}

/// Quote a CSV field per RFC 4180 when it contains a separator, quote,
/// or line break.
fn csv_escape(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Reduce an RFC 3339 timestamp to `YYYY-MM-DD HH:MM` for display.
fn format_activity_time(ts: &str) -> String {
    match DateTime::parse_from_rfc3339(ts) {
        Ok(dt) => dt.with_timezone(&Utc).format("%Y-%m-%d %H:%M").to_string(),
        Err(_) => ts.to_string(),
    }
}

impl VoucherService {
    // ── Stats ──

    pub fn stats(&self) -> Result<VoucherStats, ServiceError> {
        let total = self.count_by_status(None)?;
        let active = self.count_by_status(Some(VoucherStatus::Active))?;
        let used = self.count_by_status(Some(VoucherStatus::Used))?;

        let today = Utc::now().format("%Y-%m-%d").to_string();
        let rows = self
            .sql
            .query(
                "SELECT COUNT(*) AS cnt FROM vouchers
                 WHERE status = ?1 AND substr(used_at, 1, 10) = ?2",
                &[
                    Value::Text(VoucherStatus::Used.as_str().to_string()),
                    Value::Text(today),
                ],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        let used_today = rows.first().and_then(|r| r.get_i64("cnt")).unwrap_or(0) as u64;

        let success_rate = if total == 0 {
            "0%".to_string()
        } else {
            format!("{:.1}%", used as f64 / total as f64 * 100.0)
        };

        Ok(VoucherStats {
            total,
            active,
            used_today,
            success_rate,
        })
    }

    // ── Export ──

    /// Render every voucher as CSV: one header row, one row per voucher
    /// in store order. Null timestamps render blank.
    pub fn export_csv(&self) -> Result<String, ServiceError> {
        let sql = format!("SELECT {} FROM vouchers ORDER BY id", VOUCHER_COLUMNS);
        let rows = self
            .sql
            .query(&sql, &[])
            .map_err(|e| ServiceError::Storage(e.to_string()))?;

        let mut out = String::from(CSV_HEADER);
        out.push_str("\r\n");
        for row in &rows {
            let v = Self::voucher_from_row(row)?;
            let fields = [
                v.code.as_str(),
                v.status.as_str(),
                v.duration.as_str(),
                v.data_limit.as_str(),
                v.created_at.as_str(),
                v.used_at.as_deref().unwrap_or(""),
                v.expires_at.as_deref().unwrap_or(""),
            ];
            let line: Vec<String> = fields.iter().map(|f| csv_escape(f)).collect();
            out.push_str(&line.join(","));
            out.push_str("\r\n");
        }
        Ok(out)
    }

    // ── Activity ──

    /// The 10 most recently created vouchers, newest first.
    pub fn activity(&self) -> Result<Vec<ActivityEntry>, ServiceError> {
        let sql = format!(
            "SELECT {} FROM vouchers ORDER BY created_at DESC, id DESC LIMIT ?1",
            VOUCHER_COLUMNS
        );
        let rows = self
            .sql
            .query(&sql, &[Value::Integer(ACTIVITY_LIMIT as i64)])
            .map_err(|e| ServiceError::Storage(e.to_string()))?;

        rows.iter()
            .map(|row| {
                let v = Self::voucher_from_row(row)?;
                Ok(ActivityEntry {
                    code: v.code,
                    status: v.status,
                    time: format_activity_time(&v.created_at),
                })
            })
            .collect()
    }
}
