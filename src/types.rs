//! Payload types exchanged with the bot backend
//!
//! `StatusSnapshot` mirrors `GET /api/status`, `ConfigState` mirrors
//! `GET/POST /api/config`.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// One complete status payload. Every fetch supersedes the previous one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    pub balance: f64,
    pub total_profit: f64,
    pub daily_profit: f64,
    pub connected: bool,
    pub running: bool,
    /// Oldest first; only the last one is considered per tick
    pub notifications: Vec<Notification>,
    pub market_data: MarketBoard,
    pub logs: Vec<String>,
}

/// A toast-worthy event raised by the bot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    /// Epoch seconds (fractional) as produced by the backend
    pub time: f64,
    pub msg: String,
    #[serde(rename = "type", default)]
    pub kind: NotificationKind,
}

/// Notification category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Info,
    #[default]
    #[serde(other)]
    Other,
}

/// Per-symbol indicators and trading state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketEntry {
    pub price: f64,
    pub rsi: f64,
    pub lower_band: f64,
    pub upper_band: f64,
    /// Formatted PnL, `"-"` when no position is held
    pub pnl: String,
    #[serde(default)]
    pub signal_color: SignalColor,
    /// Contains `EM CARTEIRA` while a position is held
    pub wallet_status: String,
    pub status: String,
}

/// Signal dot color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalColor {
    Green,
    Red,
    /// Position in operation
    Blue,
    #[default]
    #[serde(other)]
    Other,
}

/// `market_data` in document order.
///
/// A JSON object decodes into entries in the order they appear, so the
/// table follows the backend's iteration order. A repeated key replaces the
/// earlier value in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarketBoard(Vec<(String, MarketEntry)>);

impl MarketBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace, keeping the first position of the symbol
    pub fn insert(&mut self, symbol: impl Into<String>, entry: MarketEntry) {
        let symbol = symbol.into();
        match self.0.iter_mut().find(|(s, _)| *s == symbol) {
            Some(slot) => slot.1 = entry,
            None => self.0.push((symbol, entry)),
        }
    }

    pub fn get(&self, symbol: &str) -> Option<&MarketEntry> {
        self.0.iter().find(|(s, _)| s == symbol).map(|(_, e)| e)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MarketEntry)> {
        self.0.iter().map(|(s, e)| (s.as_str(), e))
    }
}

impl FromIterator<(String, MarketEntry)> for MarketBoard {
    fn from_iter<I: IntoIterator<Item = (String, MarketEntry)>>(iter: I) -> Self {
        let mut board = MarketBoard::new();
        for (symbol, entry) in iter {
            board.insert(symbol, entry);
        }
        board
    }
}

impl Serialize for MarketBoard {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter())
    }
}

impl<'de> Deserialize<'de> for MarketBoard {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct BoardVisitor;

        impl<'de> Visitor<'de> for BoardVisitor {
            type Value = MarketBoard;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map from symbol to market entry")
            }

            fn visit_map<M: MapAccess<'de>>(self, mut access: M) -> std::result::Result<Self::Value, M::Error> {
                let mut board = MarketBoard(Vec::with_capacity(access.size_hint().unwrap_or(0)));
                while let Some((symbol, entry)) = access.next_entry::<String, MarketEntry>()? {
                    board.insert(symbol, entry);
                }
                Ok(board)
            }
        }

        deserializer.deserialize_map(BoardVisitor)
    }
}

/// Operator configuration as persisted by the backend.
///
/// Every field is optional: `GET` may return any subset and `POST` only
/// changes the fields that are present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pairs: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_live: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub telegram_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub telegram_chat_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub running: Option<bool>,
}

impl ConfigState {
    /// Partial update that only flips the bot on or off
    pub fn running_only(running: bool) -> Self {
        Self {
            running: Some(running),
            ..Self::default()
        }
    }
}

/// Acknowledgment of `POST /api/config`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Ack {
    #[serde(default)]
    pub status: String,
}

impl Ack {
    pub fn is_ok(&self) -> bool {
        self.status.is_empty() || self.status.eq_ignore_ascii_case("ok")
    }
}
