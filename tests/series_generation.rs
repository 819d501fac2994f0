mod common;

use chrono::{Datelike, NaiveDate};
use common::{date, installment_spec, money, recurring_spec};
use obligation_core::{
    core::services::SeriesService, EngineConfig, MemoryStore, ObligationError, ObligationKind,
    ObligationManager, OccurrenceType, RecurringPeriod, RemainderPolicy, SeriesRequest,
};
use rust_decimal::Decimal;
use uuid::Uuid;

fn months_between(from: NaiveDate, to: NaiveDate) -> i32 {
    (to.year() - from.year()) * 12 + to.month() as i32 - from.month() as i32
}

#[test]
fn test_twelve_installments_of_equal_value() {
    let manager = ObligationManager::new(Box::new(MemoryStore::new()));
    let spec = installment_spec("1200.00", 12, date(2024, 1, 10), 10);
    let batch = manager.create_series(&spec).expect("create series");

    let rendered = batch
        .iter()
        .map(|row| {
            format!(
                "{}/{} {} {:.2}",
                row.installment_number.expect("installment number"),
                row.total_installments.expect("total installments"),
                row.due_date,
                row.amount
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    insta::assert_snapshot!(rendered, @r"
    1/12 2024-01-10 100.00
    2/12 2024-02-10 100.00
    3/12 2024-03-10 100.00
    4/12 2024-04-10 100.00
    5/12 2024-05-10 100.00
    6/12 2024-06-10 100.00
    7/12 2024-07-10 100.00
    8/12 2024-08-10 100.00
    9/12 2024-09-10 100.00
    10/12 2024-10-10 100.00
    11/12 2024-11-10 100.00
    12/12 2024-12-10 100.00
    ");

    let head = &batch[0];
    assert!(head.is_head());
    assert!(batch[1..].iter().all(|row| row.parent_id == Some(head.id)));
    assert!(batch
        .iter()
        .all(|row| row.occurrence_type == OccurrenceType::Parcelada));
}

#[test]
fn test_monthly_series_runs_twelve_months() {
    let spec = recurring_spec(RecurringPeriod::Monthly, "300.00", date(2024, 1, 5), 5);
    let batch = SeriesService::generate(&spec, &EngineConfig::default()).expect("generate");

    assert_eq!(batch.len(), 12);
    for (index, row) in batch.iter().enumerate() {
        assert_eq!(row.due_date, date(2024, index as u32 + 1, 5));
        assert_eq!(row.amount, money("300.00"));
        assert_eq!(row.occurrence_type, OccurrenceType::Mensal);
        assert_eq!(row.due_day, Some(5));
        assert_eq!(row.installment_number, None);
        assert_eq!(row.category.as_deref(), Some("services"));
    }
}

#[test]
fn test_installment_totals_are_exact() {
    let cases = [
        ("100.00", 3),
        ("1000.00", 7),
        ("0.05", 4),
        ("999.99", 12),
        ("12345.67", 48),
        ("10.00", 1),
    ];
    for policy in [RemainderPolicy::LastInstallment, RemainderPolicy::Spread] {
        let config = EngineConfig {
            remainder_policy: policy,
            ..EngineConfig::default()
        };
        for (total, count) in cases {
            let spec = installment_spec(total, count, date(2024, 1, 31), 31);
            let batch = SeriesService::generate(&spec, &config).expect("generate");

            assert_eq!(batch.len(), count as usize);
            let sum: Decimal = batch.iter().map(|row| row.amount).sum();
            assert_eq!(sum, money(total), "{total} over {count} with {policy:?}");
            assert!(batch.iter().all(|row| row.amount.scale() <= 2));
            assert_eq!(batch.iter().filter(|row| row.parent_id.is_none()).count(), 1);

            for (index, row) in batch.iter().enumerate() {
                assert_eq!(months_between(batch[0].due_date, row.due_date), index as i32);
                assert_eq!(row.installment_number, Some(index as u32 + 1));
            }
        }
    }
}

#[test]
fn test_recurring_types_step_by_their_period() {
    let first = date(2024, 1, 31);
    for (period, step) in [
        (RecurringPeriod::Monthly, 1),
        (RecurringPeriod::Quarterly, 3),
        (RecurringPeriod::SemiAnnual, 6),
        (RecurringPeriod::Annual, 12),
    ] {
        let spec = recurring_spec(period, "45.90", first, 31);
        let batch = SeriesService::generate(&spec, &EngineConfig::default()).expect("generate");

        assert_eq!(batch.len(), 12, "{period:?}");
        for (index, row) in batch.iter().enumerate() {
            assert_eq!(row.amount, money("45.90"));
            assert_eq!(months_between(first, row.due_date), step * index as i32);
            assert_eq!(row.occurrence_type, period.occurrence_type());
        }
        if period == RecurringPeriod::Monthly {
            // Short months clamp to their last day without dragging later members.
            assert_eq!(batch[1].due_date, date(2024, 2, 29));
            assert_eq!(batch[2].due_date, date(2024, 3, 31));
            assert_eq!(batch[3].due_date, date(2024, 4, 30));
        }
    }
}

#[test]
fn test_one_off_request_ignores_series_fields() {
    let manager = ObligationManager::new(Box::new(MemoryStore::new()));
    let request = SeriesRequest {
        kind: ObligationKind::Payable,
        counterpart_id: Uuid::new_v4(),
        description: "Consulting invoice".into(),
        category: None,
        payment_method: None,
        notes: Some("net 30".into()),
        amount: money("780.50"),
        issue_date: date(2024, 5, 2),
        due_date: date(2024, 6, 1),
        occurrence_type: OccurrenceType::Unica,
        due_day: None,
        installments: None,
    };

    let batch = manager.create_from_request(request).expect("create one-off");
    assert_eq!(batch.len(), 1);
    assert_eq!(batch[0].due_date, date(2024, 6, 1));
    assert_eq!(batch[0].parent_id, None);
    assert_eq!(batch[0].notes.as_deref(), Some("net 30"));
}

#[test]
fn test_invalid_requests_write_nothing() {
    let store = MemoryStore::new();
    let base = SeriesRequest {
        kind: ObligationKind::Receivable,
        counterpart_id: Uuid::new_v4(),
        description: "Tuition".into(),
        category: None,
        payment_method: None,
        notes: None,
        amount: money("500.00"),
        issue_date: date(2024, 2, 1),
        due_date: date(2024, 2, 10),
        occurrence_type: OccurrenceType::Parcelada,
        due_day: Some(10),
        installments: Some(6),
    };

    let missing_day = SeriesRequest {
        due_day: None,
        ..base.clone()
    };
    let bad_day = SeriesRequest {
        due_day: Some(32),
        ..base.clone()
    };
    let zero_installments = SeriesRequest {
        installments: Some(0),
        ..base.clone()
    };
    let endless = SeriesRequest {
        installments: Some(u32::MAX),
        ..base.clone()
    };
    let below_one_cent_each = SeriesRequest {
        amount: money("0.05"),
        ..base.clone()
    };
    let zero_amount = SeriesRequest {
        amount: Decimal::ZERO,
        ..base
    };

    let manager = ObligationManager::new(Box::new(store));
    for request in [
        missing_day,
        bad_day,
        zero_installments,
        endless,
        below_one_cent_each,
        zero_amount,
    ] {
        let err = manager.create_from_request(request).expect_err("rejected");
        assert!(matches!(err, ObligationError::Validation(_)), "{err}");
    }
}
