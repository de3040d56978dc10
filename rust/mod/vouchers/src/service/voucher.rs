use portal_core::{ListParams, ListResult, ServiceError, merge_patch, now_rfc3339};
use portal_sql::Value;
use serde::Serialize;

use crate::model::{Voucher, VoucherStatus, generate_code};
use super::{VOUCHER_COLUMNS, VoucherService};

/// Attempts to allocate a unique generated code before giving up.
/// Collisions are vanishingly rare (36^6 suffixes) so this bound is
/// effectively never reached.
const CODE_RETRY_ATTEMPTS: usize = 5;

/// Input for a single voucher creation. All fields arrive optional so
/// per-item validation can report missing values instead of failing the
/// whole request at deserialization.
#[derive(Debug, Default, Clone)]
pub struct CreateVoucherInput {
    pub duration: Option<String>,
    pub data_limit: Option<String>,
    pub status: Option<String>,
}

/// Result of a bulk creation: successfully created vouchers plus the
/// validation errors of failed items. A failure in one item never rolls
/// back the others.
#[derive(Debug, Serialize)]
pub struct BulkCreateOutcome {
    pub created: Vec<Voucher>,
    pub errors: Vec<String>,
}

struct ValidatedInput {
    duration: String,
    data_limit: String,
    status: VoucherStatus,
}

fn validate(input: &CreateVoucherInput) -> Result<ValidatedInput, ServiceError> {
    let duration = input
        .duration
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ServiceError::Validation("duration is required".into()))?;

    let data_limit = input
        .data_limit
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ServiceError::Validation("data_limit is required".into()))?;

    let status = match input.status.as_deref() {
        None => VoucherStatus::default(),
        Some(s) => VoucherStatus::parse(s)
            .ok_or_else(|| ServiceError::Validation(format!("'{}' is not a valid status", s)))?,
    };

    Ok(ValidatedInput {
        duration: duration.to_string(),
        data_limit: data_limit.to_string(),
        status,
    })
}

impl VoucherService {
    // ── Create ──

    /// Create a single voucher with a freshly generated code.
    ///
    /// Retries code generation on a uniqueness collision rather than
    /// surfacing the constraint violation to the caller.
    pub fn create_voucher(&self, input: &CreateVoucherInput) -> Result<Voucher, ServiceError> {
        let validated = validate(input)?;
        let created_at = now_rfc3339();

        for _ in 0..CODE_RETRY_ATTEMPTS {
            let code = generate_code();
            let result = self.sql.insert(
                "INSERT INTO vouchers (code, status, duration, data_limit, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                &[
                    Value::Text(code.clone()),
                    Value::Text(validated.status.as_str().to_string()),
                    Value::Text(validated.duration.clone()),
                    Value::Text(validated.data_limit.clone()),
                    Value::Text(created_at.clone()),
                ],
            );

            match result {
                Ok(id) => {
                    return Ok(Voucher {
                        id,
                        code,
                        status: validated.status,
                        duration: validated.duration,
                        data_limit: validated.data_limit,
                        created_at,
                        used_at: None,
                        expires_at: None,
                    });
                }
                Err(e) if e.is_unique_violation() => continue,
                Err(e) => return Err(ServiceError::Storage(e.to_string())),
            }
        }

        Err(ServiceError::Conflict(
            "could not allocate a unique voucher code".into(),
        ))
    }

    /// Create `quantity` vouchers from the same input.
    ///
    /// Each item validates and persists independently; errors are collected
    /// per item while already-created vouchers are kept.
    pub fn create_vouchers(
        &self,
        input: &CreateVoucherInput,
        quantity: u32,
    ) -> BulkCreateOutcome {
        let mut created = Vec::new();
        let mut errors = Vec::new();

        for _ in 0..quantity {
            match self.create_voucher(input) {
                Ok(v) => created.push(v),
                Err(e) => errors.push(e.to_string()),
            }
        }

        tracing::info!(
            created = created.len(),
            failed = errors.len(),
            "bulk voucher creation"
        );
        BulkCreateOutcome { created, errors }
    }

    // ── Read ──

    pub fn get_voucher(&self, id: i64) -> Result<Voucher, ServiceError> {
        self.fetch_by_id(id)?
            .ok_or_else(|| ServiceError::NotFound(format!("voucher {} not found", id)))
    }

    /// List vouchers ordered by creation time, newest first.
    pub fn list_vouchers(&self, params: &ListParams) -> Result<ListResult<Voucher>, ServiceError> {
        let total = self.count_by_status(None)? as usize;

        // SQLite treats LIMIT -1 as unbounded.
        let limit = params.limit.map_or(-1i64, |l| l as i64);
        let sql = format!(
            "SELECT {} FROM vouchers ORDER BY created_at DESC, id DESC LIMIT ?1 OFFSET ?2",
            VOUCHER_COLUMNS
        );
        let rows = self
            .sql
            .query(
                &sql,
                &[Value::Integer(limit), Value::Integer(params.offset as i64)],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;

        let items = rows
            .iter()
            .map(Self::voucher_from_row)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ListResult { items, total })
    }

    // ── Update / Delete ──

    /// Apply a JSON merge-patch to a voucher.
    ///
    /// `id` and `created_at` are immutable and stripped from the patch.
    /// Changing `code` is allowed but subject to uniqueness.
    pub fn update_voucher(
        &self,
        id: i64,
        patch: serde_json::Value,
    ) -> Result<Voucher, ServiceError> {
        let current = self.get_voucher(id)?;

        let mut json = serde_json::to_value(&current)
            .map_err(|e| ServiceError::Internal(e.to_string()))?;

        let mut patch = patch;
        if let Some(obj) = patch.as_object_mut() {
            obj.remove("id");
            obj.remove("created_at");
        }
        merge_patch(&mut json, &patch);

        let updated: Voucher = serde_json::from_value(json)
            .map_err(|e| ServiceError::Validation(e.to_string()))?;

        let affected = self
            .sql
            .exec(
                "UPDATE vouchers
                 SET code = ?1, status = ?2, duration = ?3, data_limit = ?4,
                     used_at = ?5, expires_at = ?6
                 WHERE id = ?7",
                &[
                    Value::Text(updated.code.clone()),
                    Value::Text(updated.status.as_str().to_string()),
                    Value::Text(updated.duration.clone()),
                    Value::Text(updated.data_limit.clone()),
                    Value::opt_text(updated.used_at.as_deref()),
                    Value::opt_text(updated.expires_at.as_deref()),
                    Value::Integer(id),
                ],
            )
            .map_err(|e| {
                if e.is_unique_violation() {
                    ServiceError::Conflict(format!("voucher code '{}' already exists", updated.code))
                } else {
                    ServiceError::Storage(e.to_string())
                }
            })?;

        if affected == 0 {
            return Err(ServiceError::NotFound(format!("voucher {} not found", id)));
        }

        Ok(updated)
    }

    pub fn delete_voucher(&self, id: i64) -> Result<(), ServiceError> {
        let affected = self
            .sql
            .exec("DELETE FROM vouchers WHERE id = ?1", &[Value::Integer(id)])
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        if affected == 0 {
            return Err(ServiceError::NotFound(format!("voucher {} not found", id)));
        }
        Ok(())
    }
}
