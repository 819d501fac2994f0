//! Cent-precise arithmetic for installment amounts.

use std::num::NonZeroU32;

use rust_decimal::{prelude::ToPrimitive, Decimal, RoundingStrategy};

use crate::config::RemainderPolicy;

const CENT_DIGITS: u32 = 2;

/// Rounds half away from zero to whole cents.
pub fn round_cents(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(CENT_DIGITS, RoundingStrategy::MidpointAwayFromZero)
}

fn truncate_cents(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(CENT_DIGITS, RoundingStrategy::ToZero)
}

/// Splits `total` into `count` cent-precise shares whose sum equals `total`
/// rounded to cents. Every share starts at `total / count` truncated to cents;
/// `policy` decides where the leftover cents go.
pub fn split_installments(
    total: Decimal,
    count: NonZeroU32,
    policy: RemainderPolicy,
) -> Vec<Decimal> {
    let total = round_cents(total);
    let divisor = Decimal::from(count.get());
    let base = truncate_cents(total / divisor);
    let remainder = total - base * divisor;
    let mut shares = vec![base; count.get() as usize];

    match policy {
        RemainderPolicy::LastInstallment => {
            if let Some(last) = shares.last_mut() {
                *last += remainder;
            }
        }
        RemainderPolicy::Spread => {
            let cent = if remainder.is_sign_negative() {
                Decimal::new(-1, CENT_DIGITS)
            } else {
                Decimal::new(1, CENT_DIGITS)
            };
            let extra = (remainder.abs() * Decimal::ONE_HUNDRED)
                .trunc()
                .to_usize()
                .unwrap_or(0);
            for share in shares.iter_mut().rev().take(extra) {
                *share += cent;
            }
        }
    }

    shares
}
