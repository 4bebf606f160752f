mod common;

use chrono::{Duration, NaiveDate};
use common::{memory_harness, start_instant};
use expense_core::{
    domain::{Income, IncomeCycle, NewExpense, UserDocument},
    storage::{
        session_cache::{user_key, CURRENT_USER_KEY, LEGACY_STORE_KEY},
        DocumentStore, SessionCache,
    },
    StoreState,
};

const USER: &str = "user-123";

fn income(amount: f64, day: u32) -> Income {
    Income::new(amount, NaiveDate::from_ymd_opt(2025, 3, day).unwrap(), 30)
}

fn lunch(amount: f64) -> NewExpense {
    NewExpense::new("Lunch", amount, "Food", start_instant())
}

#[tokio::test]
async fn fetch_creates_skeleton_for_new_user_and_keeps_it() {
    let h = memory_harness();

    h.store.fetch_user_data(USER).await.unwrap();
    let remote = h.documents.get(USER).await.unwrap().expect("skeleton written");
    assert_eq!(remote, UserDocument::skeleton());

    let state = h.store.snapshot();
    assert!(state.income.is_none());
    assert!(state.categories.is_empty());
    assert!(state.expenses.is_empty());
    assert!(!state.loading);

    h.store.fetch_user_data(USER).await.unwrap();
    assert_eq!(h.documents.get(USER).await.unwrap(), Some(UserDocument::skeleton()));
    assert_eq!(h.store.snapshot().document(), UserDocument::skeleton());
}

#[tokio::test]
async fn fetch_failure_records_error_and_keeps_prior_state() {
    let h = memory_harness();
    h.store.fetch_user_data(USER).await.unwrap();
    h.store.add_category(USER, "Food").await.unwrap();

    h.documents.fail_reads(true);
    let err = h.store.fetch_user_data(USER).await.unwrap_err();
    assert!(err.to_string().contains("unavailable"));

    let state = h.store.snapshot();
    assert!(!state.loading);
    assert_eq!(state.categories, vec!["Food"]);
    assert!(state.error.as_deref().unwrap_or_default().contains("unavailable"));

    h.store.clear_error();
    let state = h.store.snapshot();
    assert!(state.error.is_none());
    assert_eq!(state.categories, vec!["Food"]);
}

#[tokio::test]
async fn adding_a_category_twice_keeps_one_entry() {
    let h = memory_harness();
    h.store.fetch_user_data(USER).await.unwrap();

    h.store.add_category(USER, "Travel").await.unwrap();
    h.store.add_category(USER, "Travel").await.unwrap();

    assert_eq!(h.store.snapshot().categories, vec!["Travel"]);
    let remote = h.documents.get(USER).await.unwrap().unwrap();
    assert_eq!(remote.categories, vec!["Travel"]);
}

#[tokio::test]
async fn add_expense_never_touches_income() {
    let h = memory_harness();
    h.store.fetch_user_data(USER).await.unwrap();
    h.store.set_income(USER, income(1000.0, 1)).await.unwrap();

    for amount in [0.01, 5.0, 999.99, 5000.0] {
        h.store.add_expense(USER, lunch(amount)).await.unwrap();
    }

    assert_eq!(h.store.snapshot().income, Some(income(1000.0, 1)));
    let remote = h.documents.get(USER).await.unwrap().unwrap();
    assert_eq!(remote.income, Some(income(1000.0, 1)));
    assert_eq!(remote.expenses.len(), 4);
}

#[tokio::test]
async fn identical_expenses_are_both_kept() {
    let h = memory_harness();
    h.store.fetch_user_data(USER).await.unwrap();

    h.store.add_expense(USER, lunch(8.0)).await.unwrap();
    h.store.add_expense(USER, lunch(8.0)).await.unwrap();

    assert_eq!(h.store.snapshot().expenses.len(), 2);
    assert_eq!(h.documents.get(USER).await.unwrap().unwrap().expenses.len(), 2);
}

#[tokio::test]
async fn added_expense_carries_store_timestamp() {
    let h = memory_harness();
    h.store.fetch_user_data(USER).await.unwrap();
    h.clock.advance(Duration::minutes(5));

    let stored = h.store.add_expense(USER, lunch(3.0)).await.unwrap();
    let expected = start_instant() + Duration::minutes(5);
    assert_eq!(stored.created_at, Some(expected));
    assert_eq!(h.store.snapshot().expenses[0].created_at, Some(expected));
    let remote = h.documents.get(USER).await.unwrap().unwrap();
    assert_eq!(remote.expenses[0].created_at, Some(expected));
}

#[tokio::test]
async fn set_income_clears_any_reset_state() {
    let h = memory_harness();
    h.store.fetch_user_data(USER).await.unwrap();
    h.store.reset_income(USER).await.unwrap();
    assert!(h.store.snapshot().reset_for_add_expense_ui);

    h.store.set_income(USER, income(500.0, 10)).await.unwrap();

    let state = h.store.snapshot();
    assert!(state.reset_date.is_none());
    assert!(!state.reset_for_add_expense_ui);
    let remote = h.documents.get(USER).await.unwrap().unwrap();
    assert!(remote.reset_date.is_none());
    assert!(!remote.reset_for_add_expense_ui);
    assert_eq!(
        state.cycle(),
        IncomeCycle::ActiveCycle {
            received_date: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
        }
    );
}

#[tokio::test]
async fn set_income_replaces_previous_income_entirely() {
    let h = memory_harness();
    h.store.fetch_user_data(USER).await.unwrap();
    h.store.set_income(USER, income(500.0, 1)).await.unwrap();
    h.store.set_income(USER, income(750.0, 15)).await.unwrap();

    let remote = h.documents.get(USER).await.unwrap().unwrap();
    assert_eq!(remote.income, Some(income(750.0, 15)));
}

#[tokio::test]
async fn reset_income_keeps_every_expense() {
    let h = memory_harness();
    h.store.fetch_user_data(USER).await.unwrap();
    h.store.set_income(USER, income(900.0, 1)).await.unwrap();
    h.store.add_expense(USER, lunch(10.0)).await.unwrap();
    h.store.add_expense(USER, lunch(20.0)).await.unwrap();

    h.store.reset_income(USER).await.unwrap();

    let state = h.store.snapshot();
    assert!(state.income.is_none());
    assert!(state.reset_for_add_expense_ui);
    assert_eq!(state.reset_date, Some(start_instant()));
    assert_eq!(state.expenses.len(), 2);

    h.store.fetch_user_data(USER).await.unwrap();
    assert_eq!(h.store.snapshot().expenses.len(), 2);
}

#[tokio::test]
async fn repeated_resets_move_the_window_forward() {
    let h = memory_harness();
    h.store.fetch_user_data(USER).await.unwrap();

    h.store.reset_income(USER).await.unwrap();
    h.clock.advance(Duration::hours(2));
    h.store.reset_income(USER).await.unwrap();

    let state = h.store.snapshot();
    assert_eq!(state.reset_date, Some(start_instant() + Duration::hours(2)));
    assert!(state.reset_for_add_expense_ui);
}

#[tokio::test]
async fn reset_window_excludes_expenses_at_the_reset_instant() {
    let h = memory_harness();
    h.store.fetch_user_data(USER).await.unwrap();
    h.store.reset_income(USER).await.unwrap();
    let reset = start_instant();

    for offset in [-1, 0, 1] {
        let date = reset + Duration::days(offset);
        let expense = NewExpense::new(format!("day {offset}"), 10.0, "Food", date);
        h.store.add_expense(USER, expense).await.unwrap();
    }

    let state = h.store.snapshot();
    let scoped = state.in_scope_expenses();
    assert_eq!(scoped.len(), 1);
    assert_eq!(scoped[0].name, "day 1");
    assert_eq!(state.expenses.len(), 3);
    assert!(state.balance().is_none(), "no income means no balance");
}

#[tokio::test]
async fn clear_expense_ui_reset_keeps_filtering_from_now() {
    let h = memory_harness();
    h.store.fetch_user_data(USER).await.unwrap();
    h.store.reset_income(USER).await.unwrap();
    h.clock.advance(Duration::days(1));

    h.store.clear_expense_ui_reset(USER).await.unwrap();

    let later = start_instant() + Duration::days(1);
    let state = h.store.snapshot();
    assert!(!state.reset_for_add_expense_ui);
    assert_eq!(state.reset_date, Some(later));
    assert_eq!(state.cycle(), IncomeCycle::ResetPending { reset_date: later });
    let remote = h.documents.get(USER).await.unwrap().unwrap();
    assert_eq!(remote.reset_date, Some(later));
}

#[tokio::test]
async fn balance_counts_expenses_from_the_received_date() {
    let h = memory_harness();
    h.store.fetch_user_data(USER).await.unwrap();
    h.store.set_income(USER, income(1000.0, 1)).await.unwrap();
    h.store.add_expense(USER, lunch(150.0)).await.unwrap();
    let before = NewExpense::new("Old", 99.0, "Food", start_instant() - Duration::days(2));
    h.store.add_expense(USER, before).await.unwrap();

    let balance = h.store.snapshot().balance().unwrap();
    assert_eq!(balance.spent, 150.0);
    assert_eq!(balance.remaining, 850.0);
}

#[tokio::test]
async fn add_expense_recreates_externally_deleted_document() {
    let h = memory_harness();
    h.store.fetch_user_data(USER).await.unwrap();
    h.store.add_expense(USER, lunch(1.0)).await.unwrap();
    assert!(h.documents.inner().remove(USER).await);

    let stored = h.store.add_expense(USER, lunch(42.0)).await.unwrap();

    let remote = h.documents.get(USER).await.unwrap().expect("document recreated");
    assert_eq!(remote.expenses.len(), 1);
    assert_eq!(remote.expenses[0], stored);
    assert!(remote.categories.is_empty());

    let state = h.store.snapshot();
    assert_eq!(state.expenses, vec![stored]);
    assert!(state.error.is_none());
}

#[tokio::test]
async fn add_category_recreates_externally_deleted_document() {
    let h = memory_harness();
    h.store.fetch_user_data(USER).await.unwrap();
    h.store.add_category(USER, "Food").await.unwrap();
    h.documents.inner().remove(USER).await;

    h.store.add_category(USER, "Rent").await.unwrap();

    let remote = h.documents.get(USER).await.unwrap().unwrap();
    assert_eq!(remote.categories, vec!["Rent"]);
    assert_eq!(h.store.snapshot().categories, vec!["Rent"]);
}

#[tokio::test]
async fn failed_writes_are_recorded_and_leave_state_untouched() {
    let h = memory_harness();
    h.store.fetch_user_data(USER).await.unwrap();
    h.store.add_category(USER, "Food").await.unwrap();
    h.documents.fail_writes(true);

    assert!(h.store.add_category(USER, "Rent").await.is_err());
    assert!(h.store.add_expense(USER, lunch(5.0)).await.is_err());
    assert!(h.store.set_income(USER, income(10.0, 1)).await.is_err());

    let state = h.store.snapshot();
    assert_eq!(state.categories, vec!["Food"]);
    assert!(state.expenses.is_empty());
    assert!(state.income.is_none());
    assert!(state.error.is_some());

    let remote = h.documents.get(USER).await.unwrap().unwrap();
    assert_eq!(remote.categories, vec!["Food"]);
}

#[tokio::test]
async fn transient_failures_do_not_trigger_fallback_writes() {
    let h = memory_harness();
    h.store.fetch_user_data(USER).await.unwrap();
    h.documents.fail_writes(true);
    let before = h.documents.write_count();

    assert!(h.store.add_category(USER, "Rent").await.is_err());
    assert_eq!(h.documents.write_count(), before + 1);
}

#[tokio::test]
async fn logout_clears_state_and_purges_cache() {
    let h = memory_harness();
    h.store.set_current_user_id(USER);
    h.cache.set(&user_key(USER), "stale").unwrap();
    h.cache.set(LEGACY_STORE_KEY, "{}").unwrap();
    h.cache.set("unrelated", "keep").unwrap();
    h.store.fetch_user_data(USER).await.unwrap();
    h.store.add_category(USER, "Food").await.unwrap();
    assert_eq!(h.cache.get(CURRENT_USER_KEY).unwrap().as_deref(), Some(USER));

    h.store.logout();

    assert_eq!(h.store.snapshot(), StoreState::default());
    assert_eq!(h.cache.keys(), vec!["unrelated".to_string()]);
    let remote = h.documents.get(USER).await.unwrap().unwrap();
    assert_eq!(remote.categories, vec!["Food"], "logout never touches the remote document");
}

#[tokio::test]
async fn subscribers_observe_each_assignment() {
    let h = memory_harness();
    let mut updates = h.store.subscribe();

    h.store.fetch_user_data(USER).await.unwrap();
    assert!(updates.has_changed().unwrap());
    assert!(!updates.borrow_and_update().loading);

    h.store.add_category(USER, "Food").await.unwrap();
    updates.changed().await.unwrap();
    assert_eq!(updates.borrow().categories, vec!["Food"]);
}

#[tokio::test]
async fn concurrent_writers_lose_no_data() {
    let h = memory_harness();
    h.store.fetch_user_data(USER).await.unwrap();

    let mut tasks = Vec::new();
    for index in 0..20 {
        let store = h.store.clone();
        tasks.push(tokio::spawn(async move {
            store.add_category(USER, &format!("cat-{index}")).await.unwrap();
            store
                .add_expense(USER, NewExpense::new("x", 1.0, "cat", start_instant()))
                .await
                .unwrap();
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }

    let remote = h.documents.get(USER).await.unwrap().unwrap();
    assert_eq!(remote.categories.len(), 20);
    assert_eq!(remote.expenses.len(), 20);
    let state = h.store.snapshot();
    assert_eq!(state.categories.len(), 20);
    assert_eq!(state.expenses.len(), 20);
}
