//! Page seam
//!
//! The reconciliation core never touches `web-sys` directly. It writes
//! through [`Surface`] and reads the settings form through [`ConfigForm`].
//! The browser binding implements both over the real document;
//! [`MemoryDom`] implements them in memory for tests and headless runs.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};

use crate::error::{DashboardError, Result};

/// Element ids used by the page
pub mod ids {
    pub const BALANCE: &str = "balanceDisplay";
    pub const TOTAL_PROFIT: &str = "totalProfitDisplay";
    pub const DAILY_PROFIT: &str = "dailyProfitDisplay";
    pub const CONNECTION: &str = "connectionStatus";
    pub const TOGGLE: &str = "btnToggle";
    pub const SAVE: &str = "btnSave";
    pub const MARKET_TABLE: &str = "marketTableBody";
    pub const LOGS: &str = "logsArea";
    pub const TOAST: &str = "liveToast";
    pub const TOAST_BODY: &str = "toastBody";

    pub const API_KEY: &str = "apiKey";
    pub const SECRET_KEY: &str = "secretKey";
    pub const LIVE_MODE: &str = "liveModeToggle";
    pub const RISK_MODE: &str = "riskMode";
    pub const TELEGRAM_TOKEN: &str = "telegramToken";
    pub const TELEGRAM_CHAT_ID: &str = "telegramChatId";

    /// Class shared by the trading pair checkboxes
    pub const PAIR_CHECKBOX_CLASS: &str = "pair-checkbox";
}

/// Write side of the page
pub trait Surface {
    fn set_text(&self, id: &str, text: &str) -> Result<()>;

    /// Replace the whole class attribute
    fn set_class(&self, id: &str, class: &str) -> Result<()>;

    /// Remove one class token and add another, leaving the rest alone
    fn swap_class(&self, id: &str, remove: &str, add: &str) -> Result<()>;

    fn set_html(&self, id: &str, html: &str) -> Result<()>;

    /// Show the toast with `message`, header styled with `header_class`
    fn show_toast(&self, message: &str, header_class: &str) -> Result<()>;

    /// Blocking operator alert
    fn alert(&self, message: &str);
}

/// Read/write access to the settings form
pub trait ConfigForm {
    /// Current value of a text input or select
    fn input_value(&self, id: &str) -> Result<String>;

    fn set_input_value(&self, id: &str, value: &str) -> Result<()>;

    fn is_checked(&self, id: &str) -> Result<bool>;

    fn set_checked(&self, id: &str, checked: bool) -> Result<()>;

    /// Values of the checked pair checkboxes, in page order
    fn checked_pairs(&self) -> Vec<String>;

    /// Uncheck every pair checkbox
    fn clear_pairs(&self);

    /// Check the box for `pair`; false when the page has no such box
    fn check_pair(&self, pair: &str) -> bool;
}

/// State of one element in [`MemoryDom`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    pub text: String,
    pub class: String,
    pub html: String,
    pub value: String,
    pub checked: bool,
}

/// A toast that was shown
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub message: String,
    pub header_class: String,
}

/// In-memory page. Elements spring into existence on first write, unless
/// [`MemoryDom::remove`] took them off the page.
#[derive(Debug, Default)]
pub struct MemoryDom {
    elements: RefCell<BTreeMap<String, Element>>,
    removed: RefCell<BTreeSet<String>>,
    pairs: RefCell<Vec<(String, bool)>>,
    toasts: RefCell<Vec<Toast>>,
    alerts: RefCell<Vec<String>>,
}

impl MemoryDom {
    pub fn new() -> Self {
        Self::default()
    }

    /// Page with one checkbox per pair, all unchecked
    pub fn with_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let dom = Self::new();
        *dom.pairs.borrow_mut() = pairs.into_iter().map(|p| (p.into(), false)).collect();
        dom
    }

    pub fn element(&self, id: &str) -> Element {
        self.elements.borrow().get(id).cloned().unwrap_or_default()
    }

    /// Every element, keyed by id
    pub fn elements(&self) -> BTreeMap<String, Element> {
        self.elements.borrow().clone()
    }

    pub fn toasts(&self) -> Vec<Toast> {
        self.toasts.borrow().clone()
    }

    pub fn alerts(&self) -> Vec<String> {
        self.alerts.borrow().clone()
    }

    /// Take `id` off the page; form reads and writes on it fail from now on
    pub fn remove(&self, id: &str) {
        self.elements.borrow_mut().remove(id);
        self.removed.borrow_mut().insert(id.to_string());
    }

    fn present(&self, id: &str) -> Result<()> {
        if self.removed.borrow().contains(id) {
            return Err(DashboardError::Dom(format!("#{id} not found")));
        }
        Ok(())
    }

    fn update(&self, id: &str, f: impl FnOnce(&mut Element)) {
        f(self.elements.borrow_mut().entry(id.to_string()).or_default());
    }
}

impl Surface for MemoryDom {
    fn set_text(&self, id: &str, text: &str) -> Result<()> {
        self.update(id, |el| text.clone_into(&mut el.text));
        Ok(())
    }

    fn set_class(&self, id: &str, class: &str) -> Result<()> {
        self.update(id, |el| class.clone_into(&mut el.class));
        Ok(())
    }

    fn swap_class(&self, id: &str, remove: &str, add: &str) -> Result<()> {
        self.update(id, |el| {
            let mut tokens: Vec<&str> = el
                .class
                .split_whitespace()
                .filter(|t| *t != remove && *t != add)
                .collect();
            tokens.push(add);
            el.class = tokens.join(" ");
        });
        Ok(())
    }

    fn set_html(&self, id: &str, html: &str) -> Result<()> {
        self.update(id, |el| html.clone_into(&mut el.html));
        Ok(())
    }

    fn show_toast(&self, message: &str, header_class: &str) -> Result<()> {
        self.toasts.borrow_mut().push(Toast {
            message: message.to_string(),
            header_class: header_class.to_string(),
        });
        Ok(())
    }

    fn alert(&self, message: &str) {
        self.alerts.borrow_mut().push(message.to_string());
    }
}

impl ConfigForm for MemoryDom {
    fn input_value(&self, id: &str) -> Result<String> {
        self.present(id)?;
        Ok(self.element(id).value)
    }

    fn set_input_value(&self, id: &str, value: &str) -> Result<()> {
        self.present(id)?;
        self.update(id, |el| value.clone_into(&mut el.value));
        Ok(())
    }

    fn is_checked(&self, id: &str) -> Result<bool> {
        self.present(id)?;
        Ok(self.element(id).checked)
    }

    fn set_checked(&self, id: &str, checked: bool) -> Result<()> {
        self.present(id)?;
        self.update(id, |el| el.checked = checked);
        Ok(())
    }

    fn checked_pairs(&self) -> Vec<String> {
        self.pairs
            .borrow()
            .iter()
            .filter(|(_, checked)| *checked)
            .map(|(pair, _)| pair.clone())
            .collect()
    }

    fn clear_pairs(&self) {
        for (_, checked) in self.pairs.borrow_mut().iter_mut() {
            *checked = false;
        }
    }

    fn check_pair(&self, pair: &str) -> bool {
        match self.pairs.borrow_mut().iter_mut().find(|(p, _)| p == pair) {
            Some((_, checked)) => {
                *checked = true;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_swap_class_keeps_other_tokens() {
        let dom = MemoryDom::new();
        dom.set_class(ids::TOGGLE, "btn btn-lg btn-danger").unwrap();
        dom.swap_class(ids::TOGGLE, "btn-danger", "btn-success").unwrap();
        assert_eq!(dom.element(ids::TOGGLE).class, "btn btn-lg btn-success");

        dom.swap_class(ids::TOGGLE, "btn-danger", "btn-success").unwrap();
        assert_eq!(dom.element(ids::TOGGLE).class, "btn btn-lg btn-success");
    }

    #[test]
    fn test_pair_checkboxes() {
        let dom = MemoryDom::with_pairs(["BTC/USDT", "ETH/USDT"]);
        assert!(dom.check_pair("ETH/USDT"));
        assert!(!dom.check_pair("DOGE/USDT"));
        assert_eq!(dom.checked_pairs(), vec!["ETH/USDT".to_string()]);

        dom.clear_pairs();
        assert!(dom.checked_pairs().is_empty());
    }

    #[test]
    fn test_removed_input_fails() {
        let dom = MemoryDom::new();
        dom.set_input_value(ids::TELEGRAM_TOKEN, "t").unwrap();
        dom.remove(ids::TELEGRAM_TOKEN);

        assert!(matches!(dom.input_value(ids::TELEGRAM_TOKEN), Err(DashboardError::Dom(_))));
        assert!(dom.set_input_value(ids::TELEGRAM_TOKEN, "t").is_err());
        assert!(dom.input_value(ids::API_KEY).is_ok());
    }
}
