//! Aggregation service.

use std::collections::HashMap;
use std::hash::Hash;

use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;

use super::types::{MonthKey, MonthlyStat, RankedItem};

/// Months covered by the monthly series, current month included.
pub const MONTHS_IN_SERIES: u32 = 6;
/// Entries kept in each ranking.
pub const TOP_LIMIT: usize = 5;
/// Days ahead a product expiry counts as a warning.
pub const EXPIRY_WARNING_DAYS: u64 = 30;
/// Maximum rows in each dashboard warning list.
pub const WARNING_LIMIT: u64 = 10;
/// Rows in each "recent operations" list.
pub const RECENT_LIMIT: u64 = 5;

/// Service for building analytics rollups.
pub struct AnalyticsService;

impl AnalyticsService {
    /// First month of the series ending at `today`'s month.
    #[must_use]
    pub fn series_start(today: NaiveDate) -> MonthKey {
        MonthKey::of(today).minus_months(MONTHS_IN_SERIES - 1)
    }

    /// Builds the zero-filled monthly series ending at `today`'s month.
    ///
    /// Points dated outside the window are ignored.
    #[must_use]
    pub fn monthly_series(
        today: NaiveDate,
        sales: &[(NaiveDate, Decimal)],
        purchases: &[(NaiveDate, Decimal)],
    ) -> Vec<MonthlyStat> {
        let sales_by_month = Self::sum_by_month(sales);
        let purchases_by_month = Self::sum_by_month(purchases);

        let mut month = Self::series_start(today);
        let mut series = Vec::with_capacity(MONTHS_IN_SERIES as usize);
        for _ in 0..MONTHS_IN_SERIES {
            let sales = sales_by_month.get(&month).copied().unwrap_or_default();
            let purchases = purchases_by_month.get(&month).copied().unwrap_or_default();
            series.push(MonthlyStat {
                name: month.label(),
                year: month.year,
                month: month.month,
                sales,
                purchases,
                profit: sales.saturating_sub(purchases),
            });
            month = month.next();
        }
        series
    }

    /// Sums amounts for a report, saturating at the decimal bounds.
    #[must_use]
    pub fn total<I>(amounts: I) -> Decimal
    where
        I: IntoIterator<Item = Decimal>,
    {
        amounts.into_iter().fold(Decimal::ZERO, Decimal::saturating_add)
    }

    fn sum_by_month(points: &[(NaiveDate, Decimal)]) -> HashMap<MonthKey, Decimal> {
        let mut sums = HashMap::new();
        for (date, amount) in points {
            let sum = sums.entry(MonthKey::of(*date)).or_insert(Decimal::ZERO);
            *sum = sum.saturating_add(*amount);
        }
        sums
    }

    /// Sums values per key and orders keys by descending sum.
    ///
    /// Ties keep the order in which keys were first seen.
    #[must_use]
    pub fn rank<K, I>(pairs: I) -> Vec<(K, Decimal)>
    where
        K: Eq + Hash + Clone,
        I: IntoIterator<Item = (K, Decimal)>,
    {
        let mut order: Vec<K> = Vec::new();
        let mut sums: HashMap<K, Decimal> = HashMap::new();
        for (key, value) in pairs {
            match sums.get_mut(&key) {
                Some(sum) => *sum = sum.saturating_add(value),
                None => {
                    order.push(key.clone());
                    sums.insert(key, value);
                }
            }
        }

        let mut ranked: Vec<(K, Decimal)> = order
            .into_iter()
            .map(|key| {
                let sum = sums.get(&key).copied().unwrap_or_default();
                (key, sum)
            })
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked
    }

    /// Resolves ranked keys to names and keeps the first `TOP_LIMIT`.
    ///
    /// Keys that no longer resolve (a deleted product) are skipped.
    #[must_use]
    pub fn top_named<K, F>(ranked: Vec<(K, Decimal)>, resolve: F) -> Vec<RankedItem>
    where
        F: Fn(&K) -> Option<String>,
    {
        ranked
            .into_iter()
            .filter_map(|(key, value)| resolve(&key).map(|name| RankedItem { name, value }))
            .take(TOP_LIMIT)
            .collect()
    }

    /// Ranks treatment names by how often they were performed.
    #[must_use]
    pub fn top_treatments<I>(names: I) -> Vec<RankedItem>
    where
        I: IntoIterator<Item = String>,
    {
        let ranked = Self::rank(names.into_iter().map(|name| (name, Decimal::ONE)));
        Self::top_named(ranked, |name| Some(name.clone()))
    }

    /// Whether a product is at or below its warning threshold.
    #[must_use]
    pub const fn is_low_stock(quantity: i32, min_limit: i32) -> bool {
        quantity <= min_limit
    }

    /// Last day (inclusive) of the expiry warning window starting `today`.
    #[must_use]
    pub fn expiry_horizon(today: NaiveDate) -> NaiveDate {
        today
            .checked_add_days(Days::new(EXPIRY_WARNING_DAYS))
            .unwrap_or(NaiveDate::MAX)
    }

    /// Whether an expiry date falls inside the warning window.
    #[must_use]
    pub fn is_expiring(expiry: NaiveDate, today: NaiveDate) -> bool {
        expiry >= today && expiry <= Self::expiry_horizon(today)
    }
}
