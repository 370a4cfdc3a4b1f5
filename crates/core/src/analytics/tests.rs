//! Tests for analytics rollups.

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

use super::service::{AnalyticsService, MONTHS_IN_SERIES, TOP_LIMIT};
use super::types::MonthKey;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn test_series_is_continuous_and_zero_filled() {
    let today = date(2026, 3, 15);
    let sales = vec![(date(2026, 3, 1), dec!(100)), (date(2026, 1, 20), dec!(40))];
    let purchases = vec![(date(2026, 1, 2), dec!(25))];

    let series = AnalyticsService::monthly_series(today, &sales, &purchases);

    let labels: Vec<&str> = series.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(
        labels,
        vec!["Oct 2025", "Nov 2025", "Dec 2025", "Jan 2026", "Feb 2026", "Mar 2026"]
    );
    assert_eq!(series[0].sales, Decimal::ZERO);
    assert_eq!(series[3].sales, dec!(40));
    assert_eq!(series[3].purchases, dec!(25));
    assert_eq!(series[3].profit, dec!(15));
    assert_eq!(series[5].sales, dec!(100));
    assert_eq!(series[5].profit, dec!(100));
}

#[test]
fn test_series_ignores_points_outside_window() {
    let today = date(2026, 6, 30);
    let sales = vec![(date(2025, 12, 31), dec!(999)), (date(2026, 7, 1), dec!(1))];

    let series = AnalyticsService::monthly_series(today, &sales, &[]);

    assert!(series.iter().all(|s| s.sales == Decimal::ZERO));
}

#[test]
fn test_series_start_crosses_year() {
    assert_eq!(
        AnalyticsService::series_start(date(2026, 2, 10)),
        MonthKey { year: 2025, month: 9 }
    );
    assert_eq!(
        AnalyticsService::series_start(date(2026, 2, 10)).first_day(),
        Some(date(2025, 9, 1))
    );
}

#[test]
fn test_rank_sums_and_orders_descending() {
    let a = Uuid::new_v4();
    let b = Uuid::new_v4();
    let c = Uuid::new_v4();
    let ranked = AnalyticsService::rank(vec![
        (a, dec!(10)),
        (b, dec!(30)),
        (a, dec!(25)),
        (c, dec!(5)),
    ]);

    assert_eq!(ranked, vec![(a, dec!(35)), (b, dec!(30)), (c, dec!(5))]);
}

#[test]
fn test_report_sums_saturate_instead_of_overflowing() {
    assert_eq!(AnalyticsService::total([Decimal::MAX, dec!(1)]), Decimal::MAX);
    assert_eq!(AnalyticsService::total([dec!(2.5), dec!(4)]), dec!(6.5));

    let ranked = AnalyticsService::rank([("a", Decimal::MAX), ("a", Decimal::MAX)]);
    assert_eq!(ranked, vec![("a", Decimal::MAX)]);

    let today = NaiveDate::from_ymd_opt(2026, 6, 15).unwrap();
    let sales = [(today, Decimal::MAX), (today, Decimal::MAX)];
    let series = AnalyticsService::monthly_series(today, &sales, &[]);
    let june = series.last().unwrap();
    assert_eq!(june.sales, Decimal::MAX);
    assert_eq!(june.profit, Decimal::MAX);
}

#[test]
fn test_top_named_skips_unresolved_keys() {
    let kept = Uuid::new_v4();
    let deleted = Uuid::new_v4();
    let ranked = vec![(deleted, dec!(100)), (kept, dec!(50))];

    let top = AnalyticsService::top_named(ranked, |id| (*id == kept).then(|| "Vaccine".to_string()));

    assert_eq!(top.len(), 1);
    assert_eq!(top[0].name, "Vaccine");
    assert_eq!(top[0].value, dec!(50));
}

#[test]
fn test_top_treatments_counts_occurrences() {
    let names = ["Dog", "Cat", "Dog", "Bird", "Dog", "Cat"]
        .iter()
        .map(ToString::to_string);

    let top = AnalyticsService::top_treatments(names);

    assert_eq!(top[0].name, "Dog");
    assert_eq!(top[0].value, dec!(3));
    assert_eq!(top[1].name, "Cat");
    assert_eq!(top[2].name, "Bird");
}

#[test]
fn test_expiry_window() {
    let today = date(2026, 1, 1);
    assert!(AnalyticsService::is_expiring(today, today));
    assert!(AnalyticsService::is_expiring(date(2026, 1, 31), today));
    assert!(!AnalyticsService::is_expiring(date(2026, 2, 1), today));
    assert!(!AnalyticsService::is_expiring(date(2025, 12, 31), today));
}

#[test]
fn test_low_stock_threshold_is_inclusive() {
    assert!(AnalyticsService::is_low_stock(5, 5));
    assert!(!AnalyticsService::is_low_stock(6, 5));
}

proptest! {
    #[test]
    fn prop_series_has_fixed_length_and_consistent_profit(
        day in 0i64..20_000,
        points in prop::collection::vec((0i64..20_000, 0i64..100_000), 0..30),
    ) {
        let base = date(2000, 1, 1);
        let today = base + chrono::Duration::days(day);
        let sales: Vec<(NaiveDate, Decimal)> = points
            .iter()
            .map(|(d, cents)| (base + chrono::Duration::days(*d), Decimal::new(*cents, 2)))
            .collect();

        let series = AnalyticsService::monthly_series(today, &sales, &[]);

        prop_assert_eq!(series.len(), MONTHS_IN_SERIES as usize);
        for pair in series.windows(2) {
            let first = MonthKey { year: pair[0].year, month: pair[0].month };
            let second = MonthKey { year: pair[1].year, month: pair[1].month };
            prop_assert_eq!(first.next(), second);
        }
        for stat in &series {
            prop_assert_eq!(stat.profit, stat.sales - stat.purchases);
        }
    }

    #[test]
    fn prop_rankings_are_bounded(values in prop::collection::vec((0u8..20, 0i64..1_000), 0..60)) {
        let ranked = AnalyticsService::rank(
            values.into_iter().map(|(k, v)| (k, Decimal::from(v))),
        );
        for pair in ranked.windows(2) {
            prop_assert!(pair[0].1 >= pair[1].1);
        }
        let top = AnalyticsService::top_named(ranked, |k| Some(k.to_string()));
        prop_assert!(top.len() <= TOP_LIMIT);
    }
}
