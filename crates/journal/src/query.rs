use core_types::{CoreError, Trade, TradeSide, TradeStatus};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    OpenTime,
    /// Open trades (no close time) sort before every closed one.
    CloseTime,
    Pnl,
    Asset,
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::OpenTime => "open-time",
            SortKey::CloseTime => "close-time",
            SortKey::Pnl => "pnl",
            SortKey::Asset => "asset",
        }
    }

    fn compare(&self, a: &Trade, b: &Trade) -> Ordering {
        match self {
            SortKey::OpenTime => a.opened_at.cmp(&b.opened_at),
            SortKey::CloseTime => a.closed_at.cmp(&b.closed_at),
            SortKey::Pnl => a.pnl.cmp(&b.pnl),
            SortKey::Asset => a.asset.cmp(&b.asset),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "open" | "open-time" => Ok(SortKey::OpenTime),
            "close" | "close-time" => Ok(SortKey::CloseTime),
            "pnl" => Ok(SortKey::Pnl),
            "asset" => Ok(SortKey::Asset),
            other => Err(CoreError::InvalidInput(
                "sort".to_string(),
                format!("expected open-time, close-time, pnl or asset, got '{}'", other),
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl FromStr for SortOrder {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(CoreError::InvalidInput(
                "order".to_string(),
                format!("expected asc or desc, got '{}'", other),
            )),
        }
    }
}

/// Search, filters and ordering for the trade list.
///
/// The default query keeps every trade, newest opened first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TradeQuery {
    /// Case-insensitive substring matched against asset and notes.
    pub search: Option<String>,
    /// Keep only these symbols. Empty keeps all.
    pub assets: Vec<String>,
    pub side: Option<TradeSide>,
    pub status: Option<TradeStatus>,
    pub sort_by: SortKey,
    pub order: SortOrder,
}

impl TradeQuery {
    pub fn matches(&self, trade: &Trade) -> bool {
        let search_match = match self.search.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(term) => {
                let term = term.to_lowercase();
                trade.asset.to_lowercase().contains(&term)
                    || trade.notes.to_lowercase().contains(&term)
            }
        };
        let asset_match = self.assets.is_empty()
            || self
                .assets
                .iter()
                .any(|asset| asset.eq_ignore_ascii_case(&trade.asset));
        let side_match = self.side.is_none_or(|side| side == trade.side);
        let status_match = self.status.is_none_or(|status| status == trade.status());

        search_match && asset_match && side_match && status_match
    }

    /// Filters and sorts. Ties keep their incoming order.
    pub fn apply(&self, trades: Vec<Trade>) -> Vec<Trade> {
        let mut kept: Vec<Trade> = trades.into_iter().filter(|t| self.matches(t)).collect();
        kept.sort_by(|a, b| {
            let ordering = self.sort_by.compare(a, b);
            match self.order {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            }
        });
        kept
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};
    use core_types::{PnlType, UserId};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, d, 12, 0, 0).unwrap()
    }

    fn trade(asset: &str, side: TradeSide, pnl: Decimal, opened: u32, closed: Option<u32>, notes: &str) -> Trade {
        Trade {
            id: Uuid::new_v4(),
            owner: UserId::new(Uuid::nil()),
            asset: asset.to_string(),
            side,
            leverage: 1,
            quantity: dec!(1),
            open_price: Some(dec!(100)),
            close_price: None,
            pnl,
            pnl_type: PnlType::Realized,
            opened_at: day(opened),
            closed_at: closed.map(day),
            notes: notes.to_string(),
            tags: Vec::new(),
            created_at: None,
        }
    }

    fn sample() -> Vec<Trade> {
        vec![
            trade("BTC", TradeSide::Long, dec!(120), 3, Some(4), "breakout retest"),
            trade("ETH", TradeSide::Short, dec!(-40), 1, Some(2), "faded the pump"),
            trade("SOL", TradeSide::Long, dec!(15), 5, None, ""),
            trade("btc", TradeSide::Short, dec!(0), 2, None, "hedge"),
        ]
    }

    fn assets(trades: &[Trade]) -> Vec<&str> {
        trades.iter().map(|t| t.asset.as_str()).collect()
    }

    #[test]
    fn default_query_sorts_newest_opened_first() {
        let result = TradeQuery::default().apply(sample());
        assert_eq!(assets(&result), vec!["SOL", "BTC", "btc", "ETH"]);
    }

    #[test]
    fn search_covers_asset_and_notes_ignoring_case() {
        let query = TradeQuery {
            search: Some("PUMP".to_string()),
            ..Default::default()
        };
        assert_eq!(assets(&query.apply(sample())), vec!["ETH"]);

        let query = TradeQuery {
            search: Some("bt".to_string()),
            ..Default::default()
        };
        assert_eq!(query.apply(sample()).len(), 2);

        let blank = TradeQuery {
            search: Some("  ".to_string()),
            ..Default::default()
        };
        assert_eq!(blank.apply(sample()).len(), 4);
    }

    #[test]
    fn side_status_and_asset_filters_combine() {
        let query = TradeQuery {
            assets: vec!["BTC".to_string()],
            status: Some(TradeStatus::Open),
            ..Default::default()
        };
        let result = query.apply(sample());
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].notes, "hedge");

        let longs = TradeQuery {
            side: Some(TradeSide::Long),
            ..Default::default()
        };
        assert!(longs.apply(sample()).iter().all(|t| t.side == TradeSide::Long));
    }

    #[test]
    fn sorts_by_pnl_and_close_time() {
        let by_pnl = TradeQuery {
            sort_by: SortKey::Pnl,
            order: SortOrder::Asc,
            ..Default::default()
        };
        let pnls: Vec<Decimal> = by_pnl.apply(sample()).iter().map(|t| t.pnl).collect();
        assert_eq!(pnls, vec![dec!(-40), dec!(0), dec!(15), dec!(120)]);

        let by_close = TradeQuery {
            sort_by: SortKey::CloseTime,
            ..Default::default()
        };
        let result = by_close.apply(sample());
        assert_eq!(result[0].asset, "BTC");
        assert!(result[2].is_open() && result[3].is_open());
    }

    #[test]
    fn sort_keys_parse_from_cli_spellings() {
        assert_eq!("close_time".parse::<SortKey>().unwrap(), SortKey::CloseTime);
        assert_eq!("OPEN".parse::<SortKey>().unwrap(), SortKey::OpenTime);
        assert_eq!("sort", "size".parse::<SortKey>().unwrap_err().field());
        assert_eq!("ASC".parse::<SortOrder>().unwrap(), SortOrder::Asc);
    }
}
