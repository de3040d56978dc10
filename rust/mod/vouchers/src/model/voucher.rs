use rand::Rng;
use serde::{Deserialize, Serialize};

/// Voucher code prefix. Codes are `MRNI-XXXXXX` where the suffix is six
/// characters drawn from uppercase letters and digits.
pub const CODE_PREFIX: &str = "MRNI";

/// Length of the random code suffix.
pub const CODE_SUFFIX_LEN: usize = 6;

const CODE_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Voucher lifecycle status.
///
/// Only `active → used` is driven by a guarded business rule (redemption);
/// the remaining transitions are reachable through generic field update.
/// Nothing in this service sets `expired` or `disabled` automatically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoucherStatus {
    #[default]
    Pending,
    Active,
    Used,
    Expired,
    Disabled,
}

impl VoucherStatus {
    /// Wire/storage representation (lowercase).
    pub fn as_str(self) -> &'static str {
        match self {
            VoucherStatus::Pending => "pending",
            VoucherStatus::Active => "active",
            VoucherStatus::Used => "used",
            VoucherStatus::Expired => "expired",
            VoucherStatus::Disabled => "disabled",
        }
    }

    /// Parse the storage representation. Returns `None` for unknown values.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(VoucherStatus::Pending),
            "active" => Some(VoucherStatus::Active),
            "used" => Some(VoucherStatus::Used),
            "expired" => Some(VoucherStatus::Expired),
            "disabled" => Some(VoucherStatus::Disabled),
            _ => None,
        }
    }
}

/// Voucher — a single-use network access credential. PK = id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Voucher {
    /// Internal identifier (SQLite rowid).
    pub id: i64,

    /// Unique access code, system-generated at creation.
    pub code: String,

    #[serde(default)]
    pub status: VoucherStatus,

    /// Validity window as `<integer><m|h|d>`. Not validated at creation;
    /// parsed at redemption with a 1-hour fallback.
    pub duration: String,

    /// Data cap label. Opaque to this service — no enforcement exists.
    pub data_limit: String,

    /// RFC 3339 UTC timestamp, set once at creation.
    pub created_at: String,

    /// Set exactly once, at successful redemption.
    #[serde(default)]
    pub used_at: Option<String>,

    /// Set exactly once, at successful redemption, computed from `duration`.
    #[serde(default)]
    pub expires_at: Option<String>,
}

/// Generate a fresh voucher code: `MRNI-` plus six random characters
/// drawn uniformly from `A-Z0-9`.
///
/// Uniqueness is enforced by the store's UNIQUE constraint; the creation
/// path retries with a fresh draw on collision.
pub fn generate_code() -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..CODE_SUFFIX_LEN)
        .map(|_| CODE_CHARSET[rng.gen_range(0..CODE_CHARSET.len())] as char)
        .collect();
    format!("{}-{}", CODE_PREFIX, suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_code_format() {
        for _ in 0..100 {
            let code = generate_code();
            let (prefix, suffix) = code.split_once('-').expect("code has a dash");
            assert_eq!(prefix, CODE_PREFIX);
            assert_eq!(suffix.len(), CODE_SUFFIX_LEN);
            assert!(
                suffix
                    .chars()
                    .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()),
                "unexpected character in {code}"
            );
        }
    }

    #[test]
    fn status_default_is_pending() {
        assert_eq!(VoucherStatus::default(), VoucherStatus::Pending);
    }

    #[test]
    fn status_str_roundtrip() {
        for s in [
            VoucherStatus::Pending,
            VoucherStatus::Active,
            VoucherStatus::Used,
            VoucherStatus::Expired,
            VoucherStatus::Disabled,
        ] {
            assert_eq!(VoucherStatus::parse(s.as_str()), Some(s));
        }
        assert_eq!(VoucherStatus::parse("ACTIVE"), None);
        assert_eq!(VoucherStatus::parse("bogus"), None);
    }

    #[test]
    fn status_serde_is_lowercase() {
        let json = serde_json::to_string(&VoucherStatus::Active).unwrap();
        assert_eq!(json, "\"active\"");
        let back: VoucherStatus = serde_json::from_str("\"disabled\"").unwrap();
        assert_eq!(back, VoucherStatus::Disabled);
    }

    #[test]
    fn voucher_json_roundtrip() {
        let v = Voucher {
            id: 1,
            code: "MRNI-A1B2C3".into(),
            status: VoucherStatus::Pending,
            duration: "2h".into(),
            data_limit: "1GB".into(),
            created_at: "2026-08-27T10:00:00+00:00".into(),
            used_at: None,
            expires_at: None,
        };
        let json = serde_json::to_string(&v).unwrap();
        let back: Voucher = serde_json::from_str(&json).unwrap();
        assert_eq!(v, back);
    }
}
