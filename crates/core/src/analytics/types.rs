//! Analytics data types.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

const MONTH_ABBREVIATIONS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// A calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MonthKey {
    /// Calendar year.
    pub year: i32,
    /// Month number, 1 to 12.
    pub month: u32,
}

impl MonthKey {
    /// The month containing `date`.
    #[must_use]
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    fn index(self) -> i64 {
        i64::from(self.year) * 12 + i64::from(self.month) - 1
    }

    fn from_index(index: i64) -> Self {
        let year = index.div_euclid(12);
        let month = index.rem_euclid(12) + 1;
        Self {
            year: i32::try_from(year).unwrap_or(i32::MIN),
            month: u32::try_from(month).unwrap_or(1),
        }
    }

    /// The month `n` months before this one.
    #[must_use]
    pub fn minus_months(self, n: u32) -> Self {
        Self::from_index(self.index() - i64::from(n))
    }

    /// The month after this one.
    #[must_use]
    pub fn next(self) -> Self {
        Self::from_index(self.index() + 1)
    }

    /// First day of the month.
    #[must_use]
    pub fn first_day(self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }

    /// Short label such as `Mar 2026`.
    #[must_use]
    pub fn label(self) -> String {
        let name = self
            .month
            .checked_sub(1)
            .and_then(|i| usize::try_from(i).ok())
            .and_then(|i| MONTH_ABBREVIATIONS.get(i))
            .copied()
            .unwrap_or("???");
        format!("{name} {}", self.year)
    }
}

/// One point of the monthly series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyStat {
    /// Display label of the month.
    pub name: String,
    /// Calendar year.
    pub year: i32,
    /// Month number, 1 to 12.
    pub month: u32,
    /// Sum of sale totals dated in the month.
    pub sales: Decimal,
    /// Sum of purchase totals dated in the month.
    pub purchases: Decimal,
    /// `sales - purchases`.
    pub profit: Decimal,
}

/// A named ranking entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedItem {
    /// Product or treatment name.
    pub name: String,
    /// Revenue, quantity or count depending on the ranking.
    pub value: Decimal,
}

/// `GET /analysis` payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    /// Last six months, oldest first, zero-filled.
    pub monthly_stats: Vec<MonthlyStat>,
    /// Top products by sales revenue.
    pub top_products: Vec<RankedItem>,
    /// Top products by purchased quantity.
    pub top_purchased_products: Vec<RankedItem>,
    /// Most frequent treatments.
    pub top_treatments: Vec<RankedItem>,
}

/// Headline dashboard numbers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    /// Number of products in the clinic.
    pub total_products: u64,
    /// Sum of all sale totals.
    pub total_sales_value: Decimal,
    /// Sum of all purchase totals.
    pub total_purchases_value: Decimal,
}
