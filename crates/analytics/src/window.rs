use crate::error::AnalyticsError;
use chrono::{DateTime, Duration, Months, Utc};
use core_types::Trade;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The look-back windows offered on the analytics view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TimeWindow {
    #[serde(rename = "1W")]
    OneWeek,
    #[default]
    #[serde(rename = "1M")]
    OneMonth,
    #[serde(rename = "3M")]
    ThreeMonths,
    #[serde(rename = "6M")]
    SixMonths,
    #[serde(rename = "1Y")]
    OneYear,
    #[serde(rename = "ALL")]
    All,
}

impl TimeWindow {
    pub const ALL_WINDOWS: [TimeWindow; 6] = [
        TimeWindow::OneWeek,
        TimeWindow::OneMonth,
        TimeWindow::ThreeMonths,
        TimeWindow::SixMonths,
        TimeWindow::OneYear,
        TimeWindow::All,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeWindow::OneWeek => "1W",
            TimeWindow::OneMonth => "1M",
            TimeWindow::ThreeMonths => "3M",
            TimeWindow::SixMonths => "6M",
            TimeWindow::OneYear => "1Y",
            TimeWindow::All => "ALL",
        }
    }

    /// The earliest open time kept by this window, or `None` for all-time.
    ///
    /// Month and year windows are calendar offsets; a day that does not exist
    /// in the target month clamps to that month's last day.
    pub fn cutoff(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let months = match self {
            TimeWindow::All => return None,
            TimeWindow::OneWeek => return Some(now - Duration::days(7)),
            TimeWindow::OneMonth => 1,
            TimeWindow::ThreeMonths => 3,
            TimeWindow::SixMonths => 6,
            TimeWindow::OneYear => 12,
        };
        Some(
            now.checked_sub_months(Months::new(months))
                .unwrap_or(DateTime::<Utc>::MIN_UTC),
        )
    }

    /// The trades opened at or after the cutoff, in input order.
    pub fn filter(&self, trades: &[Trade], now: DateTime<Utc>) -> Vec<Trade> {
        match self.cutoff(now) {
            None => trades.to_vec(),
            Some(cutoff) => trades
                .iter()
                .filter(|t| t.opened_at >= cutoff)
                .cloned()
                .collect(),
        }
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeWindow {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim().to_ascii_uppercase();
        TimeWindow::ALL_WINDOWS
            .into_iter()
            .find(|w| w.as_str() == tag)
            .ok_or_else(|| AnalyticsError::UnknownWindow(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{at, trade};
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    #[test]
    fn parses_tags_case_insensitively() {
        assert_eq!("1w".parse::<TimeWindow>().unwrap(), TimeWindow::OneWeek);
        assert_eq!("ALL".parse::<TimeWindow>().unwrap(), TimeWindow::All);
        assert_eq!(
            "2W".parse::<TimeWindow>().unwrap_err(),
            AnalyticsError::UnknownWindow("2W".to_string())
        );
        assert_eq!(TimeWindow::default(), TimeWindow::OneMonth);
    }

    #[test]
    fn keeps_trades_on_or_after_the_cutoff() {
        let now = at(2024, 6, 30);
        let trades = vec![
            trade("BTC", dec!(1), at(2024, 5, 30)),
            trade("BTC", dec!(2), at(2024, 5, 29)),
            trade("BTC", dec!(3), at(2024, 6, 23)),
        ];

        let kept = TimeWindow::OneMonth.filter(&trades, now);
        assert_eq!(kept.len(), 2);
        assert!(kept.iter().all(|t| t.opened_at >= at(2024, 5, 30)));

        let kept = TimeWindow::OneWeek.filter(&trades, now);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].pnl, dec!(3));
    }

    #[test]
    fn all_time_is_the_identity() {
        let trades = vec![
            trade("BTC", dec!(1), at(2019, 1, 1)),
            trade("ETH", dec!(2), at(2024, 6, 1)),
        ];
        assert_eq!(TimeWindow::All.filter(&trades, at(2024, 6, 30)), trades);
    }

    #[test]
    fn month_offsets_clamp_to_the_end_of_month() {
        let now = Utc.with_ymd_and_hms(2024, 3, 31, 12, 0, 0).unwrap();
        let cutoff = TimeWindow::OneMonth.cutoff(now).unwrap();
        assert_eq!(cutoff, Utc.with_ymd_and_hms(2024, 2, 29, 12, 0, 0).unwrap());

        let cutoff = TimeWindow::OneYear.cutoff(now).unwrap();
        assert_eq!(cutoff, Utc.with_ymd_and_hms(2023, 3, 31, 12, 0, 0).unwrap());
    }
}
