//! Totals of the pending dues amounts and the submit gate.

use serde::Serialize;

/// Count and sum of the strictly positive pending amounts.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Serialize)]
pub struct Totals {
    pub count: usize,
    pub total: i64,
}

impl Totals {
    /// Whether dues can be submitted with these totals.
    pub fn ready(&self, has_week: bool, has_date: bool) -> bool {
        submission_ready(has_week, has_date, self.count > 0)
    }
}

/// Zero and negative amounts count for nothing, neither in `count` nor in `total`.
pub fn compute_totals<I>(amounts: I) -> Totals
where
    I: IntoIterator<Item = i64>,
{
    amounts
        .into_iter()
        .filter(|a| *a > 0)
        .fold(Totals::default(), |acc, a| Totals {
            count: acc.count + 1,
            total: acc.total.saturating_add(a),
        })
}

/// Submission needs a week, a date and at least one payment.
pub fn submission_ready(has_week: bool, has_date: bool, has_payments: bool) -> bool {
    has_week && has_date && has_payments
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_totals_excludes_non_positive() {
        let totals = compute_totals([100, -5, 0, 200]);
        assert_eq!(totals.count, 2);
        assert_eq!(totals.total, 300);
    }

    #[test]
    fn test_compute_totals_empty() {
        assert_eq!(compute_totals(Vec::new()), Totals::default());
        assert_eq!(compute_totals([0, -1]).count, 0);
    }

    #[test]
    fn test_no_payments_is_never_ready() {
        let totals = compute_totals([0, 0]);
        for week in [true, false] {
            for date in [true, false] {
                assert!(!totals.ready(week, date));
            }
        }
    }

    #[test]
    fn test_missing_week_or_date_is_not_ready() {
        let totals = compute_totals([10_000]);
        assert!(totals.ready(true, true));
        assert!(!totals.ready(false, true));
        assert!(!totals.ready(true, false));
        assert!(!totals.ready(false, false));
    }
}
