use axum::{
    Router,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
    Json,
};
use serde::Deserialize;

use portal_core::ListParams;
use crate::model::Voucher;
use crate::service::report::{ActivityEntry, VoucherStats};
use crate::service::voucher::CreateVoucherInput;
use super::{ApiError, AppState, ok_json};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/export", get(export))
        .route("/stats", get(stats))
        .route("/activity", get(activity))
        .route(
            "/{id}",
            get(get_one).put(update).patch(update).delete(delete_one),
        )
}

#[derive(Deserialize)]
struct CreateVoucherBody {
    duration: Option<String>,
    data_limit: Option<String>,
    status: Option<String>,
    quantity: Option<u32>,
}

async fn list(
    State(svc): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<portal_core::ListResult<Voucher>>, ApiError> {
    ok_json(svc.list_vouchers(&params))
}

/// Bulk create. Partial success is preserved: on any per-item failure the
/// response is 400 with both the created vouchers and the error list.
async fn create(State(svc): State<AppState>, Json(body): Json<CreateVoucherBody>) -> Response {
    let quantity = body.quantity.unwrap_or(1);
    let input = CreateVoucherInput {
        duration: body.duration,
        data_limit: body.data_limit,
        status: body.status,
    };

    let outcome = svc.create_vouchers(&input, quantity);
    if outcome.errors.is_empty() {
        (StatusCode::CREATED, Json(outcome.created)).into_response()
    } else {
        (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({
                "errors": outcome.errors,
                "created": outcome.created,
            })),
        )
            .into_response()
    }
}

async fn get_one(
    State(svc): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Voucher>, ApiError> {
    ok_json(svc.get_voucher(id))
}

async fn update(
    State(svc): State<AppState>,
    Path(id): Path<i64>,
    Json(patch): Json<serde_json::Value>,
) -> Result<Json<Voucher>, ApiError> {
    ok_json(svc.update_voucher(id, patch))
}

async fn delete_one(
    State(svc): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    svc.delete_voucher(id).map_err(ApiError::from)?;
    Ok(Json(serde_json::json!({"ok": true})))
}

async fn export(State(svc): State<AppState>) -> Result<Response, ApiError> {
    let csv = svc.export_csv().map_err(ApiError::from)?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"vouchers.csv\"",
            ),
        ],
        csv,
    )
        .into_response())
}

async fn stats(State(svc): State<AppState>) -> Result<Json<VoucherStats>, ApiError> {
    ok_json(svc.stats())
}

async fn activity(State(svc): State<AppState>) -> Result<Json<Vec<ActivityEntry>>, ApiError> {
    ok_json(svc.activity())
}
