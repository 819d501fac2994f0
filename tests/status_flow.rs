mod common;

use common::{date, installment_spec, money, recurring_spec, FixedClock};
use obligation_core::{
    core::services::{SeriesService, StatusService},
    DueState, EngineConfig, MemoryStore, ObligationError, ObligationManager, ObligationStatus,
    RecurringPeriod,
};

#[test]
fn test_confirm_payment_touches_only_target() {
    let store = MemoryStore::new();
    let spec = installment_spec("900.00", 3, date(2024, 1, 15), 15);
    let batch = SeriesService::create(&store, &spec, &EngineConfig::default()).expect("create series");
    let before = store.snapshot().expect("snapshot");

    StatusService::confirm_payment(&store, batch[1].id, date(2024, 2, 14), money("300.00"))
        .expect("confirm payment");

    let after = store.snapshot().expect("snapshot");
    assert_eq!(before.len(), after.len());
    for (old, new) in before.iter().zip(&after) {
        if old.id == batch[1].id {
            assert_eq!(new.status, ObligationStatus::Paid);
            assert_eq!(new.payment_date, Some(date(2024, 2, 14)));
            assert_eq!(new.paid_amount, Some(money("300.00")));
        } else {
            assert_eq!(old, new);
        }
    }
}

#[test]
fn test_receipt_rounds_paid_amount_to_cents() {
    let manager = ObligationManager::new(Box::new(MemoryStore::new()));
    let spec = recurring_spec(RecurringPeriod::Quarterly, "1500.00", date(2024, 1, 10), 10);
    let batch = manager.create_series(&spec).expect("create series");

    let settled = manager
        .confirm_payment(batch[0].id, date(2024, 1, 12), money("1499.995"))
        .expect("confirm receipt");
    assert_eq!(settled.status, ObligationStatus::Received);
    assert_eq!(settled.amount, money("1500.00"));
    assert_eq!(settled.paid_amount, Some(money("1500.00")));

    let err = manager
        .confirm_payment(batch[0].id, date(2024, 1, 13), money("1.00"))
        .expect_err("already settled");
    assert!(matches!(
        err,
        ObligationError::InvalidTransition {
            from: ObligationStatus::Received,
            ..
        }
    ));
}

#[test]
fn test_cancel_then_series_snapshot() {
    let manager = ObligationManager::new(Box::new(MemoryStore::new()))
        .with_clock(Box::new(FixedClock::on(date(2024, 3, 12))));
    let spec = installment_spec("400.00", 4, date(2024, 1, 15), 15);
    let batch = manager.create_series(&spec).expect("create series");

    manager
        .confirm_payment(batch[0].id, date(2024, 1, 15), money("100.00"))
        .expect("pay first");
    manager.cancel(batch[3].id).expect("cancel last");

    assert_eq!(manager.due_state(&batch[1]), Some(DueState::Overdue));
    assert_eq!(manager.due_state(&batch[2]), Some(DueState::DueSoon));

    let snapshot = manager.series_snapshot(batch[2].id).expect("snapshot");
    assert_eq!(snapshot.head_id, batch[0].id);
    assert_eq!(snapshot.members, 4);
    assert_eq!(snapshot.settled, 1);
    assert_eq!(snapshot.canceled, 1);
    assert_eq!(snapshot.pending, 2);
    assert_eq!(snapshot.overdue, 1);
    assert_eq!(snapshot.due_soon, 1);
    assert_eq!(snapshot.next_due, Some(date(2024, 2, 15)));
    assert_eq!(snapshot.outstanding_amount, money("200.00"));
    assert_eq!(snapshot.settled_amount, money("100.00"));
}
