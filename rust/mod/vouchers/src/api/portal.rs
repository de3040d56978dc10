//! Captive portal login — the guest-facing redemption endpoint.
//!
//! Always answers 200 with a display message. Every failure shape
//! (unknown code, pending, used, expired, disabled, even a storage
//! hiccup) yields the same generic message so the page leaks nothing
//! about which codes exist.

use axum::{Form, Router, extract::State, routing::post};
use serde::Deserialize;

use crate::service::redeem::RedeemOutcome;
use super::AppState;

/// Uniform failure message shown on the portal page.
pub const FAILURE_MESSAGE: &str = "Invalid or already used voucher code.";

pub fn routes() -> Router<AppState> {
    Router::new().route("/login", post(login))
}

#[derive(Debug, Deserialize)]
struct LoginForm {
    #[serde(default)]
    code: String,
}

async fn login(State(svc): State<AppState>, Form(form): Form<LoginForm>) -> String {
    let code = form.code.trim();
    match svc.redeem(code) {
        Ok(RedeemOutcome::Redeemed(v)) => {
            format!("Voucher {} accepted! You are now connected.", v.code)
        }
        Ok(RedeemOutcome::NotActive | RedeemOutcome::NotFound) => FAILURE_MESSAGE.to_string(),
        Err(e) => {
            tracing::error!("redemption failed: {}", e);
            FAILURE_MESSAGE.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use portal_sql::SqliteStore;

    use crate::service::VoucherService;
    use crate::service::voucher::CreateVoucherInput;
    use super::*;

    fn state() -> AppState {
        Arc::new(VoucherService::new(Box::new(SqliteStore::open_in_memory().unwrap())).unwrap())
    }

    fn create(svc: &AppState, status: &str) -> String {
        svc.create_voucher(&CreateVoucherInput {
            duration: Some("30m".into()),
            data_limit: Some("1GB".into()),
            status: Some(status.into()),
        })
        .unwrap()
        .code
    }

    #[tokio::test]
    async fn login_accepts_active_voucher() {
        let svc = state();
        let code = create(&svc, "active");
        let msg = login(
            State(svc),
            Form(LoginForm { code: code.clone() }),
        )
        .await;
        assert_eq!(msg, format!("Voucher {} accepted! You are now connected.", code));
    }

    #[tokio::test]
    async fn login_trims_whitespace() {
        let svc = state();
        let code = create(&svc, "active");
        let msg = login(
            State(svc),
            Form(LoginForm {
                code: format!("  {}  ", code),
            }),
        )
        .await;
        assert!(msg.contains("accepted"));
    }

    #[tokio::test]
    async fn login_failure_message_is_uniform() {
        let svc = state();
        let pending = create(&svc, "pending");
        let disabled = create(&svc, "disabled");
        let expired = create(&svc, "expired");
        let used = create(&svc, "active");
        // Consume the active one so a second attempt fails.
        login(State(svc.clone()), Form(LoginForm { code: used.clone() })).await;

        for code in [pending, disabled, expired, used, "MRNI-XX0000".to_string()] {
            let msg = login(State(svc.clone()), Form(LoginForm { code })).await;
            assert_eq!(msg, FAILURE_MESSAGE);
        }
    }
}
