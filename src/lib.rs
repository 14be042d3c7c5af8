//! Bot Dashboard - browser front end for a 24/7 crypto trading bot
//!
//! Compiled to wasm and loaded by the dashboard page. Polls the bot's
//! status endpoint every 2 seconds and repaints the page from each
//! snapshot.
//!
//! # Architecture
//! - `client`: `/api/status` and `/api/config` over reqwest
//! - `notifications`: high-water mark de-duplication of toasts
//! - `render`: pure snapshot -> frame mapping, full repaint per tick
//! - `config_sync`: settings form save/load and the on/off toggle
//! - `dashboard`: the tick driver owning the session state
//! - `browser`: `web-sys` page binding and entry point (wasm32 only)
//!
//! Everything except `browser` is target-independent and tested natively
//! against [`MemoryDom`].

#![allow(clippy::doc_markdown)] // Doc style flexibility
#![allow(clippy::cast_precision_loss)] // Float casts OK for display

mod client;
mod config;
mod config_sync;
mod dashboard;
mod dom;
mod error;
mod logging;
mod notifications;
mod render;
mod types;

#[cfg(target_arch = "wasm32")]
mod browser;

pub use client::{CONFIG_PATH, DashboardApi, HttpApi, STATUS_PATH};
pub use config::{DEFAULT_MAX_LOG_LINES, DashboardConfig, POLL_INTERVAL_MS};
pub use config_sync::{ConfigSync, MISSING_KEYS, MISSING_PAIRS, SAVE_FAILED, SAVED};
pub use dashboard::{Dashboard, SessionState, TickOutcome};
pub use dom::{ConfigForm, Element, MemoryDom, Surface, Toast, ids};
pub use error::{DashboardError, Result};
pub use logging::{debug_requested, init as init_logging};
pub use notifications::NotificationTracker;
pub use render::{
    ConnectionBanner, Frame, MARKET_COLUMNS, MarketRow, MarketTable, PnlStyle, Power, ProfitStyle,
    format_currency,
};
pub use types::*;

#[cfg(target_arch = "wasm32")]
pub use browser::{BrowserDom, start};
