//! Payment ledger arithmetic shared by team and customer settlements.

use crate::billing::round_currency;
use crate::error::CoreError;
pub use crate::status::PaymentStatus;

/// Status implied by `paid` against `total`.
///
/// Completed once the total is covered, partial for any payment short of it,
/// pending when nothing has been paid.
pub fn derive_status(paid: f64, total: f64) -> PaymentStatus {
    if paid >= total {
        PaymentStatus::Completed
    } else if paid > 0.0 {
        PaymentStatus::Partial
    } else {
        PaymentStatus::Pending
    }
}

pub fn total_paid<I>(amounts: I) -> f64
where
    I: IntoIterator<Item = f64>,
{
    round_currency(amounts.into_iter().sum())
}

/// Outstanding amount, never negative.
pub fn balance(paid: f64, total: f64) -> f64 {
    round_currency((total - paid).max(0.0))
}

/// A payment must be a positive, finite amount.
pub fn validate_payment(amount: f64) -> Result<(), CoreError> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(CoreError::Validation(format!(
            "Payment amount must be greater than zero, got {amount}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_follows_paid_against_total() {
        assert_eq!(derive_status(0.0, 100.0), PaymentStatus::Pending);
        assert_eq!(derive_status(40.0, 100.0), PaymentStatus::Partial);
        assert_eq!(derive_status(100.0, 100.0), PaymentStatus::Completed);
        assert_eq!(derive_status(120.0, 100.0), PaymentStatus::Completed);
    }

    #[test]
    fn zero_total_is_settled() {
        assert_eq!(derive_status(0.0, 0.0), PaymentStatus::Completed);
    }

    #[test]
    fn totals_and_balance_round_to_cents() {
        let paid = total_paid([10.1, 20.2, 0.003]);
        assert_eq!(paid, 30.3);
        assert_eq!(balance(paid, 100.0), 69.7);
        assert_eq!(balance(150.0, 100.0), 0.0);
    }

    #[test]
    fn payments_must_be_positive() {
        assert!(validate_payment(1.0).is_ok());
        assert!(validate_payment(0.0).is_err());
        assert!(validate_payment(-5.0).is_err());
        assert!(validate_payment(f64::NAN).is_err());
    }
}
