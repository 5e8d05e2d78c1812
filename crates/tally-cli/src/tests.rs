//! CLI command tests
//!
//! This module contains all tests for the CLI commands.

use rust_decimal_macros::dec;
use tally_core::db::{Database, TransactionFilter};
use tally_core::models::TransactionType;

use crate::commands::{self, truncate, ListQuery};

const EMAIL: &str = "cli@example.com";

fn setup_test_db() -> Database {
    let db = Database::in_memory().unwrap();
    db.seed_default_categories().unwrap();
    db
}

fn setup_with_user() -> (Database, i64) {
    let db = setup_test_db();
    let user = db.upsert_user(EMAIL, Some("cli")).unwrap();
    (db, user.id)
}

fn query(limit: i64) -> ListQuery {
    ListQuery {
        limit,
        ..Default::default()
    }
}

// ========== User Command Tests ==========

#[test]
fn test_cmd_users_add_and_list() {
    let db = setup_test_db();
    assert!(commands::cmd_users_list(&db).is_ok());

    commands::cmd_users_add(&db, "a@example.com", Some("alice")).unwrap();
    let user = db.get_user_by_email("a@example.com").unwrap().unwrap();
    assert_eq!(user.username, "alice");

    // Adding again is a no-op
    commands::cmd_users_add(&db, "a@example.com", Some("other")).unwrap();
    assert_eq!(db.list_users().unwrap().len(), 1);

    assert!(commands::cmd_users_list(&db).is_ok());
}

#[test]
fn test_resolve_user_unknown() {
    let db = setup_test_db();
    let err = commands::resolve_user(&db, "nobody@example.com").unwrap_err();
    assert!(err.to_string().contains("Unknown user"));
}

// ========== Category Command Tests ==========

#[test]
fn test_cmd_categories() {
    let db = setup_test_db();
    assert!(commands::cmd_categories(&db).is_ok());

    let empty = Database::in_memory().unwrap();
    assert!(commands::cmd_categories(&empty).is_ok());
}

// ========== Transaction Command Tests ==========

#[test]
fn test_cmd_transactions_add_defaults() {
    let (db, user_id) = setup_with_user();

    commands::cmd_transactions_add(&db, EMAIL, "12.50", "Food", "expense", "  lunch ", None)
        .unwrap();

    let txs = db
        .list_transactions(TransactionFilter::for_user(user_id))
        .unwrap();
    assert_eq!(txs.len(), 1);
    assert_eq!(txs[0].amount, dec!(12.50));
    assert_eq!(txs[0].category.name, "Food");
    assert_eq!(txs[0].transaction_type, TransactionType::Expense);
    assert_eq!(txs[0].description, "lunch");
}

#[test]
fn test_cmd_transactions_add_with_date_and_income() {
    let (db, user_id) = setup_with_user();

    commands::cmd_transactions_add(
        &db,
        EMAIL,
        "3000",
        "salary",
        "Income",
        "",
        Some("2024-05-01"),
    )
    .unwrap();

    let txs = db
        .list_transactions(TransactionFilter::for_user(user_id))
        .unwrap();
    assert_eq!(txs[0].transaction_type, TransactionType::Income);
    assert_eq!(txs[0].category.name, "Salary");
    assert_eq!(
        txs[0].transaction_date.format("%Y-%m-%d %H:%M:%S").to_string(),
        "2024-05-01 00:00:00"
    );
}

#[test]
fn test_cmd_transactions_add_rejects_bad_input() {
    let (db, user_id) = setup_with_user();

    assert!(
        commands::cmd_transactions_add(&db, "ghost@example.com", "1", "Food", "expense", "", None)
            .is_err()
    );
    assert!(commands::cmd_transactions_add(&db, EMAIL, "abc", "Food", "expense", "", None).is_err());
    assert!(commands::cmd_transactions_add(&db, EMAIL, "-5", "Food", "expense", "", None).is_err());
    assert!(
        commands::cmd_transactions_add(&db, EMAIL, "2000000000000", "Food", "expense", "", None)
            .is_err()
    );
    assert!(
        commands::cmd_transactions_add(&db, EMAIL, "5", "Nonexistent", "expense", "", None)
            .is_err()
    );
    assert!(commands::cmd_transactions_add(&db, EMAIL, "5", "Food", "refund", "", None).is_err());
    assert!(
        commands::cmd_transactions_add(&db, EMAIL, "5", "Food", "expense", "", Some("05/01/2024"))
            .is_err()
    );

    let count = db
        .count_transactions(TransactionFilter::for_user(user_id))
        .unwrap();
    assert_eq!(count, 0);
}

#[test]
fn test_cmd_transactions_list() {
    let (db, _) = setup_with_user();

    // Empty list prints a hint
    assert!(commands::cmd_transactions_list(&db, EMAIL, &query(20)).is_ok());

    commands::cmd_transactions_add(&db, EMAIL, "10", "Food", "expense", "a very long description that will be truncated in the listing", None).unwrap();
    commands::cmd_transactions_add(&db, EMAIL, "2500", "Salary", "income", "", None).unwrap();

    assert!(commands::cmd_transactions_list(&db, EMAIL, &query(20)).is_ok());
    assert!(commands::cmd_transactions_list(&db, "ghost@example.com", &query(20)).is_err());
}

#[test]
fn test_build_filter_translates_flags() {
    let (db, user_id) = setup_with_user();
    let food = db.get_category_by_name("food").unwrap().unwrap();

    let q = ListQuery {
        kind: Some("expense".into()),
        category: Some("FOOD".into()),
        from: Some("2024-01-01".into()),
        to: Some("2024-01-31".into()),
        min: Some("5".into()),
        max: Some("100.50".into()),
        limit: 0,
    };
    let filter = commands::build_filter(&db, user_id, &q).unwrap();

    assert_eq!(filter.user_id, user_id);
    assert_eq!(filter.transaction_type, Some(TransactionType::Expense));
    assert_eq!(filter.category_id, Some(food.id));
    assert_eq!(
        filter.date_from.unwrap().format("%Y-%m-%d %H:%M:%S").to_string(),
        "2024-01-01 00:00:00"
    );
    assert_eq!(
        filter.date_to.unwrap().format("%Y-%m-%d %H:%M:%S").to_string(),
        "2024-01-31 23:59:59"
    );
    assert_eq!(filter.amount_min, Some(dec!(5)));
    assert_eq!(filter.amount_max, Some(dec!(100.50)));
    // Limit is clamped to at least one row
    assert_eq!(filter.limit, Some(1));
}

#[test]
fn test_build_filter_rejects_bad_flags() {
    let (db, user_id) = setup_with_user();

    let bad = [
        ListQuery {
            kind: Some("refund".into()),
            ..query(10)
        },
        ListQuery {
            category: Some("Nonexistent".into()),
            ..query(10)
        },
        ListQuery {
            from: Some("yesterday".into()),
            ..query(10)
        },
        ListQuery {
            max: Some("lots".into()),
            ..query(10)
        },
    ];

    for q in &bad {
        assert!(commands::build_filter(&db, user_id, q).is_err(), "{:?}", q);
    }
}

#[test]
fn test_to_date_includes_whole_day() {
    let (db, user_id) = setup_with_user();
    commands::cmd_transactions_add(&db, EMAIL, "7", "Food", "expense", "", Some("2024-01-31"))
        .unwrap();

    let q = ListQuery {
        to: Some("2024-01-31".into()),
        ..query(20)
    };
    let filter = commands::build_filter(&db, user_id, &q).unwrap();
    assert_eq!(db.count_transactions(filter).unwrap(), 1);
}

// ========== Report Command Tests ==========

#[test]
fn test_cmd_dashboard() {
    let (db, _) = setup_with_user();
    commands::cmd_transactions_add(&db, EMAIL, "1000", "Salary", "income", "", None).unwrap();
    commands::cmd_transactions_add(&db, EMAIL, "300", "Food", "expense", "", None).unwrap();

    assert!(commands::cmd_dashboard(&db, EMAIL, false).is_ok());
    assert!(commands::cmd_dashboard(&db, EMAIL, true).is_ok());
    assert!(commands::cmd_dashboard(&db, "ghost@example.com", false).is_err());
}

#[test]
fn test_cmd_analytics() {
    let (db, _) = setup_with_user();

    // Works with no data
    assert!(commands::cmd_analytics(&db, EMAIL, false).is_ok());

    commands::cmd_transactions_add(&db, EMAIL, "42", "Travel", "expense", "", None).unwrap();
    assert!(commands::cmd_analytics(&db, EMAIL, false).is_ok());
    assert!(commands::cmd_analytics(&db, EMAIL, true).is_ok());
}

// ========== Audit Command Tests ==========

#[test]
fn test_cmd_audit() {
    let db = setup_test_db();
    assert!(commands::cmd_audit(&db, 50).is_ok());

    db.log_audit(EMAIL, "view", Some("dashboard"), None, None)
        .unwrap();
    db.log_audit(EMAIL, "create", Some("transaction"), Some(1), Some("amount=5"))
        .unwrap();
    assert!(commands::cmd_audit(&db, 50).is_ok());
    assert!(commands::cmd_audit(&db, 0).is_ok());
}

// ========== Init Command Tests ==========

#[test]
fn test_cmd_init_unencrypted() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tally.db");

    commands::cmd_init(&path, true).unwrap();
    assert!(path.exists());

    // Re-running is idempotent
    commands::cmd_init(&path, true).unwrap();

    let db = commands::open_db(&path, true).unwrap();
    assert_eq!(db.list_categories().unwrap().len(), 10);
}

#[test]
fn test_parse_date() {
    let date = commands::parse_date("2024-02-29", "--date").unwrap();
    assert_eq!(date.to_string(), "2024-02-29");

    let err = commands::parse_date("2023-02-29", "--date").unwrap_err();
    assert!(err.to_string().contains("--date"));
}

// ========== Utility Tests ==========

#[test]
fn test_truncate() {
    assert_eq!(truncate("short", 10), "short");
    assert_eq!(truncate("exactly10!", 10), "exactly10!");
    assert_eq!(truncate("this is too long", 10), "this is...");
    assert_eq!(truncate("café au lait", 7), "café...");
}
