//! Snapshot to page mapping
//!
//! Every tick re-derives every region from the snapshot alone and replaces
//! it wholesale. Nothing is patched incrementally, so painting the same
//! snapshot twice leaves the page exactly as after the first paint, and a
//! row for a symbol that disappeared can never linger.
//!
//! [`Frame::render`] is pure; [`Frame::paint`] pushes the result through a
//! [`Surface`].

use std::fmt::Write as _;

use crate::dom::{Surface, ids};
use crate::error::Result;
use crate::types::{MarketEntry, NotificationKind, SignalColor, StatusSnapshot};

/// Columns of the market table
pub const MARKET_COLUMNS: usize = 9;

/// Marker that the backend puts in `wallet_status` while holding a position
pub const HELD_MARKER: &str = "EM CARTEIRA";

const PLACEHOLDER_TEXT: &str = "Nenhuma moeda monitorada ou aguardando dados...";

/// `$` plus two decimals
pub fn format_currency(value: f64) -> String {
    format!("${}", to_fixed(value, 2))
}

/// Fixed-point rendering the way the page's number formatting does it:
/// exact halfway values round away from zero and `-0` prints unsigned.
#[allow(clippy::float_cmp)]
pub fn to_fixed(value: f64, digits: u8) -> String {
    let precision = usize::from(digits);
    if value == 0.0 || !value.is_finite() {
        return format!("{:.precision$}", value.abs());
    }

    let scale = 10f64.powi(i32::from(digits));
    let mut abs = value.abs();
    let scaled = abs * scale;
    // A tie is only representable when abs is a multiple of 2^-(digits + 1)
    if (abs * 2f64.powi(i32::from(digits) + 1)).fract() == 0.0 && scaled.fract() == 0.5 {
        abs = (scaled + 0.5) / scale;
    }

    let sign = if value < 0.0 { "-" } else { "" };
    format!("{sign}{abs:.precision$}")
}

/// Minimal HTML escaping for text placed inside markup
pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Parses the longest numeric prefix of `s`, ignoring leading whitespace.
/// `"1.25%"` reads as 1.25; `"abc"` reads as nothing.
pub fn leading_number(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    if s[end..].starts_with("Infinity") {
        return s[..end + "Infinity".len()].parse().ok();
    }

    let int_start = end;
    while bytes.get(end).is_some_and(u8::is_ascii_digit) {
        end += 1;
    }
    let mut digits = end - int_start;

    if bytes.get(end) == Some(&b'.') {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while bytes.get(frac_end).is_some_and(u8::is_ascii_digit) {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        if digits > 0 {
            end = frac_end;
        }
    }
    if digits == 0 {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while bytes.get(exp_end).is_some_and(u8::is_ascii_digit) {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    s[..end].parse().ok()
}

/// Color of the daily profit figure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfitStyle {
    Gain,
    Loss,
}

impl ProfitStyle {
    /// Zero counts as a gain
    pub fn of(value: f64) -> Self {
        if value >= 0.0 { Self::Gain } else { Self::Loss }
    }

    pub fn class(self) -> &'static str {
        match self {
            Self::Gain => "text-success",
            Self::Loss => "text-danger",
        }
    }
}

/// Connection banner. `connected` wins over `running`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionBanner {
    Connected,
    Error,
    Idle,
}

impl ConnectionBanner {
    pub fn of(connected: bool, running: bool) -> Self {
        match (connected, running) {
            (true, _) => Self::Connected,
            (false, true) => Self::Error,
            (false, false) => Self::Idle,
        }
    }

    pub fn class(self) -> &'static str {
        match self {
            Self::Connected => "alert alert-success py-2 text-center mb-3",
            Self::Error => "alert alert-danger py-2 text-center mb-3",
            Self::Idle => "alert alert-secondary py-2 text-center mb-3",
        }
    }

    pub fn html(self) -> &'static str {
        match self {
            Self::Connected => "<small>⚡ API Conectada &amp; Rodando</small>",
            Self::Error => "<small>❌ Erro de Conexão</small>",
            Self::Idle => "<small>🔌 Desconectado</small>",
        }
    }
}

/// On/off toggle button. Follows `running` only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Power {
    On,
    Off,
}

impl Power {
    pub fn of(running: bool) -> Self {
        if running { Self::On } else { Self::Off }
    }

    pub fn is_running(self) -> bool {
        self == Self::On
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::On => "ROBÔ LIGADO (Clique p/ Parar)",
            Self::Off => "ROBÔ PARADO (Clique p/ Iniciar)",
        }
    }

    /// `(remove, add)` button classes
    pub fn classes(self) -> (&'static str, &'static str) {
        match self {
            Self::On => ("btn-danger", "btn-success"),
            Self::Off => ("btn-success", "btn-danger"),
        }
    }
}

/// PnL cell style.
///
/// Two steps, in this order: any literal `-` in the string means flat/no
/// position, regardless of the number it might spell; otherwise the numeric
/// prefix decides. A string without a readable number lands on `Loss`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PnlStyle {
    Flat,
    Gain,
    Loss,
}

impl PnlStyle {
    pub fn classify(pnl: &str) -> Self {
        if pnl.contains('-') {
            return Self::Flat;
        }
        match leading_number(pnl) {
            Some(v) if v >= 0.0 => Self::Gain,
            _ => Self::Loss,
        }
    }

    pub fn class(self) -> &'static str {
        match self {
            Self::Flat => "text-muted",
            Self::Gain => "text-success fw-bold",
            Self::Loss => "text-danger fw-bold",
        }
    }
}

/// Signal dot for a market row
pub fn signal_dot(color: SignalColor) -> &'static str {
    match color {
        SignalColor::Green => "🟢",
        SignalColor::Red => "🔴",
        SignalColor::Blue => "🔵",
        SignalColor::Other => "⚪",
    }
}

/// Wallet column class
pub fn wallet_class(wallet_status: &str) -> &'static str {
    if wallet_status.contains(HELD_MARKER) {
        "text-primary fw-bold"
    } else {
        "text-muted"
    }
}

/// Toast header class for a notification kind
pub fn toast_header_class(kind: NotificationKind) -> &'static str {
    match kind {
        NotificationKind::Success => "toast-header bg-success text-white",
        NotificationKind::Info => "toast-header bg-info text-dark",
        NotificationKind::Other => "toast-header bg-secondary text-white",
    }
}

/// One rendered market row
#[derive(Debug, Clone, PartialEq)]
pub struct MarketRow {
    pub symbol: String,
    pub dot: &'static str,
    pub wallet_class: &'static str,
    pub wallet_status: String,
    pub price: String,
    pub rsi: String,
    pub lower_band: String,
    pub upper_band: String,
    pub pnl_style: PnlStyle,
    pub pnl: String,
    pub status: String,
}

impl MarketRow {
    pub fn new(symbol: &str, entry: &MarketEntry) -> Self {
        Self {
            symbol: symbol.to_string(),
            dot: signal_dot(entry.signal_color),
            wallet_class: wallet_class(&entry.wallet_status),
            wallet_status: entry.wallet_status.clone(),
            price: format!("${}", to_fixed(entry.price, 4)),
            rsi: to_fixed(entry.rsi, 2),
            lower_band: format!("${}", to_fixed(entry.lower_band, 4)),
            upper_band: format!("${}", to_fixed(entry.upper_band, 4)),
            pnl_style: PnlStyle::classify(&entry.pnl),
            pnl: entry.pnl.clone(),
            status: entry.status.clone(),
        }
    }

    fn write_html(&self, out: &mut String) {
        let _ = write!(
            out,
            "<tr>\
             <td class=\"fs-4 text-center\">{dot}</td>\
             <td><span class=\"badge bg-secondary\">{symbol}</span></td>\
             <td class=\"{wallet_class}\"><small>{wallet}</small></td>\
             <td>{price}</td>\
             <td>{rsi}</td>\
             <td class=\"text-info\">{lower}</td>\
             <td class=\"text-warning\">{upper}</td>\
             <td class=\"{pnl_class}\">{pnl}</td>\
             <td><small>{status}</small></td>\
             </tr>",
            dot = self.dot,
            symbol = escape_html(&self.symbol),
            wallet_class = self.wallet_class,
            wallet = escape_html(&self.wallet_status),
            price = self.price,
            rsi = self.rsi,
            lower = self.lower_band,
            upper = self.upper_band,
            pnl_class = self.pnl_style.class(),
            pnl = escape_html(&self.pnl),
            status = escape_html(&self.status),
        );
    }
}

/// Body of the market table
#[derive(Debug, Clone, PartialEq)]
pub enum MarketTable {
    /// No symbols monitored yet
    Placeholder,
    Rows(Vec<MarketRow>),
}

impl MarketTable {
    pub fn of(snapshot: &StatusSnapshot) -> Self {
        if snapshot.market_data.is_empty() {
            return Self::Placeholder;
        }
        Self::Rows(
            snapshot
                .market_data
                .iter()
                .map(|(symbol, entry)| MarketRow::new(symbol, entry))
                .collect(),
        )
    }

    /// Number of `<tr>` elements the body will hold
    pub fn row_count(&self) -> usize {
        match self {
            Self::Placeholder => 1,
            Self::Rows(rows) => rows.len(),
        }
    }

    pub fn html(&self) -> String {
        match self {
            Self::Placeholder => format!(
                "<tr><td colspan=\"{MARKET_COLUMNS}\" class=\"text-center text-muted\">{PLACEHOLDER_TEXT}</td></tr>"
            ),
            Self::Rows(rows) => {
                let mut out = String::new();
                for row in rows {
                    row.write_html(&mut out);
                }
                out
            }
        }
    }
}

/// Everything painted for one snapshot
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub balance: String,
    pub total_profit: String,
    pub daily_profit: String,
    pub daily_style: ProfitStyle,
    pub banner: ConnectionBanner,
    pub power: Power,
    pub market: MarketTable,
    pub logs: Vec<String>,
}

impl Frame {
    /// Derive the frame; keeps at most `max_log_lines` of the tail of `logs`.
    /// The cap treats `logs` as oldest first. A backend that prepends new
    /// lines loses its newest ones once it sends more than the cap.
    pub fn render(snapshot: &StatusSnapshot, max_log_lines: usize) -> Self {
        let skip = snapshot.logs.len().saturating_sub(max_log_lines);
        Self {
            balance: format_currency(snapshot.balance),
            total_profit: format_currency(snapshot.total_profit),
            daily_profit: format_currency(snapshot.daily_profit),
            daily_style: ProfitStyle::of(snapshot.daily_profit),
            banner: ConnectionBanner::of(snapshot.connected, snapshot.running),
            power: Power::of(snapshot.running),
            market: MarketTable::of(snapshot),
            logs: snapshot.logs[skip..].to_vec(),
        }
    }

    pub fn logs_html(&self) -> String {
        let mut out = String::new();
        for line in &self.logs {
            let _ = write!(out, "<div>{}</div>", escape_html(line));
        }
        out
    }

    /// Replace every region of the page with this frame
    pub fn paint<S: Surface + ?Sized>(&self, surface: &S) -> Result<()> {
        surface.set_text(ids::BALANCE, &self.balance)?;
        surface.set_text(ids::TOTAL_PROFIT, &self.total_profit)?;
        surface.set_text(ids::DAILY_PROFIT, &self.daily_profit)?;
        surface.set_class(ids::DAILY_PROFIT, self.daily_style.class())?;

        surface.set_class(ids::CONNECTION, self.banner.class())?;
        surface.set_html(ids::CONNECTION, self.banner.html())?;

        let (remove, add) = self.power.classes();
        surface.swap_class(ids::TOGGLE, remove, add)?;
        surface.set_text(ids::TOGGLE, self.power.label())?;

        surface.set_html(ids::MARKET_TABLE, &self.market.html())?;
        surface.set_html(ids::LOGS, &self.logs_html())?;
        Ok(())
    }
}
