use chrono::{Duration, Utc};
use portal_core::ServiceError;
use portal_sql::Value;

use crate::model::{Voucher, VoucherStatus};
use super::VoucherService;

/// Result of a redemption attempt.
///
/// The portal page collapses `NotActive` and `NotFound` into one generic
/// message so a guest cannot probe which codes exist; the distinction only
/// lives here, for logging and tests.
#[derive(Debug)]
pub enum RedeemOutcome {
    Redeemed(Voucher),
    /// The code exists but is not in `active` status (pending, used,
    /// expired, or disabled).
    NotActive,
    NotFound,
}

/// Parse a duration string of the form `<integer><m|h|d>` (case-insensitive,
/// anchored at the start; trailing characters are ignored).
///
/// Returns `None` when the string does not match or the magnitude does
/// not fit a `Duration` — callers fall back to one hour, mirroring the
/// lenient behavior the portal has always had. Stored durations are not
/// validated at creation, so any absurd value must parse without panic.
pub fn parse_duration(s: &str) -> Option<Duration> {
    let lower = s.to_ascii_lowercase();
    let digits_end = lower.find(|c: char| !c.is_ascii_digit())?;
    if digits_end == 0 {
        return None;
    }
    let value: i64 = lower[..digits_end].parse().ok()?;
    match lower.as_bytes()[digits_end] {
        b'm' => Duration::try_minutes(value),
        b'h' => Duration::try_hours(value),
        b'd' => Duration::try_days(value),
        _ => None,
    }
}

impl VoucherService {
    /// Redeem a voucher by code: `active → used`, stamping `used_at` and
    /// computing `expires_at` from the voucher's duration.
    ///
    /// The transition runs as a guarded UPDATE (`WHERE code = ? AND
    /// status = 'active'`) with an affected-row check, so two concurrent
    /// attempts on the same code can succeed at most once.
    pub fn redeem(&self, code: &str) -> Result<RedeemOutcome, ServiceError> {
        let Some(voucher) = self.fetch_by_code(code)? else {
            return Ok(RedeemOutcome::NotFound);
        };
        if voucher.status != VoucherStatus::Active {
            return Ok(RedeemOutcome::NotActive);
        }

        let now = Utc::now();
        let offset = parse_duration(&voucher.duration).unwrap_or_else(|| Duration::hours(1));
        // A Duration can fit while the resulting instant does not; fall
        // back to the 1-hour window rather than overflow.
        let expires = now
            .checked_add_signed(offset)
            .or_else(|| now.checked_add_signed(Duration::hours(1)))
            .unwrap_or(now);
        let used_at = now.to_rfc3339();
        let expires_at = expires.to_rfc3339();

        let affected = self
            .sql
            .exec(
                "UPDATE vouchers SET status = ?1, used_at = ?2, expires_at = ?3
                 WHERE code = ?4 AND status = ?5",
                &[
                    Value::Text(VoucherStatus::Used.as_str().to_string()),
                    Value::Text(used_at.clone()),
                    Value::Text(expires_at.clone()),
                    Value::Text(code.to_string()),
                    Value::Text(VoucherStatus::Active.as_str().to_string()),
                ],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;

        if affected == 0 {
            // Lost the race to another redemption between lookup and update.
            return Ok(RedeemOutcome::NotActive);
        }

        tracing::info!(code, expires_at = %expires_at, "voucher redeemed");
        Ok(RedeemOutcome::Redeemed(Voucher {
            status: VoucherStatus::Used,
            used_at: Some(used_at),
            expires_at: Some(expires_at),
            ..voucher
        }))
    }
}
