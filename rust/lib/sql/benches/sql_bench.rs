use criterion::{black_box, criterion_group, criterion_main, Criterion};

use portal_sql::{SQLStore, SqliteStore, Value};

const COLUMNS: &str = "id, code, status, duration, data_limit, created_at, used_at, expires_at";

fn voucher_store() -> SqliteStore {
    let store = SqliteStore::open_in_memory().unwrap();
    store
        .exec(
            "CREATE TABLE vouchers (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                code TEXT NOT NULL UNIQUE,
                status TEXT NOT NULL,
                duration TEXT NOT NULL,
                data_limit TEXT NOT NULL,
                created_at TEXT NOT NULL,
                used_at TEXT,
                expires_at TEXT
            )",
            &[],
        )
        .unwrap();
    store
}

fn insert_voucher(store: &SqliteStore, code: &str, status: &str) {
    store
        .insert(
            "INSERT INTO vouchers (code, status, duration, data_limit, created_at)
             VALUES (?1, ?2, '1h', '1GB', '2026-01-01T00:00:00+00:00')",
            &[Value::Text(code.to_string()), Value::Text(status.to_string())],
        )
        .unwrap();
}

fn bench_insert_code_keyed(c: &mut Criterion) {
    let store = voucher_store();
    let mut i = 0i64;
    c.bench_function("voucher_insert", |b| {
        b.iter(|| {
            insert_voucher(&store, &format!("MRNI-{:09}", black_box(i)), "pending");
            i += 1;
        });
    });
}

fn bench_lookup_by_code(c: &mut Criterion) {
    let store = voucher_store();
    for i in 0..10000 {
        insert_voucher(&store, &format!("MRNI-{:09}", i), "active");
    }

    let sql = format!("SELECT {} FROM vouchers WHERE code = ?1", COLUMNS);
    let mut i = 0i64;
    c.bench_function("voucher_lookup_by_code", |b| {
        b.iter(|| {
            let code = format!("MRNI-{:09}", black_box(i % 10000));
            let rows = store.query(&sql, &[Value::Text(code)]).unwrap();
            assert_eq!(rows.len(), 1);
            i += 1;
        });
    });
}

fn bench_guarded_status_update(c: &mut Criterion) {
    let store = voucher_store();
    for i in 0..10000 {
        insert_voucher(&store, &format!("MRNI-{:09}", i), "active");
    }

    // Re-arm before each transition so the guard always matches a row.
    let mut i = 0i64;
    c.bench_function("voucher_guarded_redeem", |b| {
        b.iter(|| {
            let code = format!("MRNI-{:09}", black_box(i % 10000));
            store
                .exec(
                    "UPDATE vouchers SET status = 'active', used_at = NULL, expires_at = NULL
                     WHERE code = ?1",
                    &[Value::Text(code.clone())],
                )
                .unwrap();
            let affected = store
                .exec(
                    "UPDATE vouchers SET status = 'used',
                         used_at = '2026-01-01T12:00:00+00:00',
                         expires_at = '2026-01-01T13:00:00+00:00'
                     WHERE code = ?1 AND status = 'active'",
                    &[Value::Text(code)],
                )
                .unwrap();
            assert_eq!(affected, 1);
            i += 1;
        });
    });
}

criterion_group!(
    benches,
    bench_insert_code_keyed,
    bench_lookup_by_code,
    bench_guarded_status_update
);
criterion_main!(benches);
