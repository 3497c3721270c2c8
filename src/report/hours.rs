//! Effort arithmetic. Every hour figure that leaves a detector passes
//! through here, so all reported hours are exact multiples of 0.5.

/// Working hours in one estimated day.
pub const HOURS_PER_DAY: f64 = 8.0;

/// Linear scaling: `base_hours * occurrences`, rounded to the nearest half hour.
pub fn estimate_hours(base_hours: f64, occurrences: usize) -> f64 {
    round_to_half_hour(base_hours * occurrences as f64)
}

/// Round to 0.5h granularity, half away from zero.
pub fn round_to_half_hour(hours: f64) -> f64 {
    (hours * 2.0).round() / 2.0
}

/// Convert hours to days (8h = 1 day), rounded to one decimal place.
pub fn hours_to_days(hours: f64) -> f64 {
    (hours / HOURS_PER_DAY * 10.0).round() / 10.0
}

/// Split a lump-sum estimate across `parts` findings.
///
/// The lump sum is rounded to a half hour first, then handed out in
/// half-hour units; earlier parts absorb the remainder. The shares sum
/// back to the rounded total.
pub fn distribute_hours(total_hours: f64, parts: usize) -> Vec<f64> {
    if parts == 0 {
        return Vec::new();
    }
    let units = (round_to_half_hour(total_hours.max(0.0)) * 2.0) as usize;
    let per_part = units / parts;
    let remainder = units % parts;

    (0..parts)
        .map(|i| {
            let share = per_part + usize::from(i < remainder);
            share as f64 / 2.0
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn is_half_multiple(h: f64) -> bool {
        (h * 2.0).fract() == 0.0
    }

    #[test]
    fn linear_scaling() {
        assert_eq!(estimate_hours(0.5, 3), 1.5);
        assert_eq!(estimate_hours(1.0, 0), 0.0);
        assert_eq!(estimate_hours(0.3, 1), 0.5);
        assert_eq!(estimate_hours(0.2, 1), 0.0);
    }

    #[test]
    fn rounds_half_away_from_zero() {
        assert_eq!(round_to_half_hour(0.25), 0.5);
        assert_eq!(round_to_half_hour(0.75), 1.0);
        assert_eq!(round_to_half_hour(2.0 / 3.0), 0.5);
    }

    #[test]
    fn days_round_to_one_decimal() {
        assert_eq!(hours_to_days(40.0), 5.0);
        assert_eq!(hours_to_days(4.25), 0.5);
        assert_eq!(hours_to_days(4.0), 0.5);
        assert_eq!(hours_to_days(0.0), 0.0);
    }

    #[test]
    fn distribution_preserves_total() {
        assert_eq!(distribute_hours(2.0, 3), vec![1.0, 0.5, 0.5]);
        assert_eq!(distribute_hours(2.5, 1), vec![2.5]);
        assert_eq!(distribute_hours(2.0, 0), Vec::<f64>::new());
        let shares = distribute_hours(2.5, 10);
        assert_eq!(shares.iter().sum::<f64>(), 2.5);
        assert_eq!(shares.iter().filter(|h| **h == 0.5).count(), 5);
    }

    proptest! {
        #[test]
        fn estimate_is_non_negative_half_multiple(base in 0.0f64..100.0, n in 0usize..1000) {
            let h = estimate_hours(base, n);
            prop_assert!(h >= 0.0);
            prop_assert!(is_half_multiple(h));
            prop_assert_eq!(h, estimate_hours(base, n));
        }

        #[test]
        fn days_match_definition(hours in 0.0f64..10_000.0) {
            prop_assert_eq!(hours_to_days(hours), (hours / 8.0 * 10.0).round() / 10.0);
        }

        #[test]
        fn distributed_shares_sum_to_rounded_total(total in 0.0f64..200.0, parts in 1usize..60) {
            let shares = distribute_hours(total, parts);
            prop_assert_eq!(shares.len(), parts);
            prop_assert!(shares.iter().all(|h| is_half_multiple(*h)));
            prop_assert_eq!(shares.iter().sum::<f64>(), round_to_half_hour(total));
        }
    }
}
