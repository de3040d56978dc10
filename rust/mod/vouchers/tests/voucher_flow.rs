//! End-to-end exercise of the voucher service against an in-memory store:
//! operator generates a batch, a guest redeems one at the portal, and the
//! dashboard endpoints reflect the change.

use std::collections::HashSet;

use portal_core::ListParams;
use portal_sql::SqliteStore;
use portal_vouchers::model::VoucherStatus;
use portal_vouchers::service::VoucherService;
use portal_vouchers::service::redeem::RedeemOutcome;
use portal_vouchers::service::report::CSV_HEADER;
use portal_vouchers::service::voucher::CreateVoucherInput;

fn service() -> VoucherService {
    VoucherService::new(Box::new(SqliteStore::open_in_memory().unwrap())).unwrap()
}

#[test]
fn operator_batch_then_guest_redemption() {
    let svc = service();

    // Operator generates a batch of 10 active vouchers.
    let outcome = svc.create_vouchers(
        &CreateVoucherInput {
            duration: Some("2h".into()),
            data_limit: Some("5GB".into()),
            status: Some("active".into()),
        },
        10,
    );
    assert!(outcome.errors.is_empty());
    assert_eq!(outcome.created.len(), 10);

    let codes: HashSet<_> = outcome.created.iter().map(|v| v.code.clone()).collect();
    assert_eq!(codes.len(), 10, "batch codes are unique");
    for v in &outcome.created {
        assert!(v.code.starts_with("MRNI-"));
        assert_eq!(v.status, VoucherStatus::Active);
    }

    // A guest redeems one code at the portal.
    let code = &outcome.created[3].code;
    let RedeemOutcome::Redeemed(redeemed) = svc.redeem(code).unwrap() else {
        panic!("first redemption should succeed");
    };
    assert_eq!(redeemed.status, VoucherStatus::Used);
    assert!(redeemed.used_at.is_some());
    assert!(redeemed.expires_at.is_some());

    // Second attempt on the same code fails.
    assert!(matches!(svc.redeem(code).unwrap(), RedeemOutcome::NotActive));

    // Dashboard: stats reflect the redemption.
    let stats = svc.stats().unwrap();
    assert_eq!(stats.total, 10);
    assert_eq!(stats.active, 9);
    assert_eq!(stats.used_today, 1);
    assert_eq!(stats.success_rate, "10.0%");

    // Activity feed caps at 10 and leads with the newest creation.
    let feed = svc.activity().unwrap();
    assert_eq!(feed.len(), 10);
    assert_eq!(feed[0].code, outcome.created.last().unwrap().code);

    // CSV export: header plus one row per voucher.
    let csv = svc.export_csv().unwrap();
    let lines: Vec<&str> = csv.split("\r\n").filter(|l| !l.is_empty()).collect();
    assert_eq!(lines[0], CSV_HEADER);
    assert_eq!(lines.len(), 11);

    // Listing stays newest-first and complete.
    let list = svc.list_vouchers(&ListParams::default()).unwrap();
    assert_eq!(list.total, 10);
    assert_eq!(list.items.len(), 10);
}

#[test]
fn partial_success_on_mixed_batch_input() {
    let svc = service();

    // Missing data_limit: every item fails validation, nothing persists.
    let outcome = svc.create_vouchers(
        &CreateVoucherInput {
            duration: Some("1d".into()),
            data_limit: None,
            status: None,
        },
        4,
    );
    assert!(outcome.created.is_empty());
    assert_eq!(outcome.errors.len(), 4);
    assert_eq!(svc.stats().unwrap().total, 0);
}

#[test]
fn lifecycle_via_generic_update() {
    let svc = service();
    let v = svc
        .create_voucher(&CreateVoucherInput {
            duration: Some("30m".into()),
            data_limit: Some("1GB".into()),
            status: None,
        })
        .unwrap();
    assert_eq!(v.status, VoucherStatus::Pending);

    // Pending vouchers are not redeemable.
    assert!(matches!(svc.redeem(&v.code).unwrap(), RedeemOutcome::NotActive));

    // Operator activates it through the generic update path.
    let activated = svc
        .update_voucher(v.id, serde_json::json!({"status": "active"}))
        .unwrap();
    assert_eq!(activated.status, VoucherStatus::Active);

    // Now it redeems.
    assert!(matches!(
        svc.redeem(&v.code).unwrap(),
        RedeemOutcome::Redeemed(_)
    ));
}
