//! Operator settings form <-> backend configuration
//!
//! - `save`: validate the form, then submit the full configuration
//! - `load`: hydrate the form from the persisted configuration
//! - `toggle`: submit `{running}` only

use tracing::{debug, info, warn};

use crate::client::DashboardApi;
use crate::dom::{ConfigForm, Surface, ids};
use crate::error::{DashboardError, Result};
use crate::types::ConfigState;

pub const MISSING_KEYS: &str = "Por favor, preencha as chaves da API.";
pub const MISSING_PAIRS: &str = "Selecione pelo menos uma moeda.";
pub const SAVED: &str = "Configuração Salva!";
pub const SAVE_FAILED: &str = "Erro ao salvar configuração.";

/// Form synchronization over a backend and a page
pub struct ConfigSync<'a, A, F> {
    api: &'a A,
    form: &'a F,
}

impl<'a, A, F> ConfigSync<'a, A, F>
where
    A: DashboardApi,
    F: ConfigForm + Surface,
{
    pub fn new(api: &'a A, form: &'a F) -> Self {
        Self { api, form }
    }

    /// Read the form into a full configuration, failing on missing keys or
    /// an empty pair selection.
    pub fn read_form(&self) -> Result<ConfigState> {
        let api_key = self.form.input_value(ids::API_KEY)?;
        let secret_key = self.form.input_value(ids::SECRET_KEY)?;
        let is_live = self.form.is_checked(ids::LIVE_MODE)?;
        let risk_mode = self.form.input_value(ids::RISK_MODE)?;
        let telegram_token = self.form.input_value(ids::TELEGRAM_TOKEN)?;
        let telegram_chat_id = self.form.input_value(ids::TELEGRAM_CHAT_ID)?;
        let pairs = self.form.checked_pairs();

        if api_key.is_empty() || secret_key.is_empty() {
            return Err(DashboardError::Validation(MISSING_KEYS.into()));
        }
        if pairs.is_empty() {
            return Err(DashboardError::Validation(MISSING_PAIRS.into()));
        }

        Ok(ConfigState {
            api_key: Some(api_key),
            secret_key: Some(secret_key),
            pairs: Some(pairs),
            is_live: Some(is_live),
            risk_mode: Some(risk_mode),
            telegram_token: Some(telegram_token),
            telegram_chat_id: Some(telegram_chat_id),
            running: None,
        })
    }

    /// Validate and submit the form. Validation failures alert the operator
    /// and never reach the network; so does a form that cannot be read.
    pub async fn save(&self) -> Result<()> {
        let config = match self.read_form() {
            Ok(config) => config,
            Err(DashboardError::Validation(msg)) => {
                self.form.alert(&msg);
                return Err(DashboardError::Validation(msg));
            }
            Err(e) => {
                warn!(error = %e, "failed to read settings form");
                self.form.alert(SAVE_FAILED);
                return Err(e);
            }
        };

        let pairs = config.pairs.as_ref().map_or(0, Vec::len);
        let result = match self.api.submit_config(&config).await {
            Ok(ack) if ack.is_ok() => Ok(()),
            Ok(ack) => Err(DashboardError::Network(format!("config rejected: {}", ack.status))),
            Err(e) => Err(e),
        };

        match &result {
            Ok(()) => {
                info!(pairs, "configuration saved");
                self.form.alert(SAVED);
            }
            Err(e) => {
                warn!(error = %e, "failed to save configuration");
                self.form.alert(SAVE_FAILED);
            }
        }
        result
    }

    /// Fetch the persisted configuration and hydrate the form
    pub async fn load(&self) -> Result<()> {
        let config = self.api.fetch_config().await?;
        self.hydrate(&config)
    }

    /// Copy each present, non-empty field into its input. Absent fields
    /// leave the input as it is. Pairs are re-derived from scratch when
    /// the loaded list is non-empty; unknown pairs are skipped.
    pub fn hydrate(&self, config: &ConfigState) -> Result<()> {
        let texts = [
            (ids::API_KEY, &config.api_key),
            (ids::SECRET_KEY, &config.secret_key),
            (ids::RISK_MODE, &config.risk_mode),
            (ids::TELEGRAM_TOKEN, &config.telegram_token),
            (ids::TELEGRAM_CHAT_ID, &config.telegram_chat_id),
        ];
        for (id, value) in texts {
            if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
                self.form.set_input_value(id, value)?;
            }
        }

        if let Some(is_live) = config.is_live {
            self.form.set_checked(ids::LIVE_MODE, is_live)?;
        }

        if let Some(pairs) = config.pairs.as_ref().filter(|p| !p.is_empty()) {
            self.form.clear_pairs();
            for pair in pairs {
                if !self.form.check_pair(pair) {
                    debug!(pair = %pair, "saved pair has no checkbox, skipping");
                }
            }
        }
        Ok(())
    }

    /// Ask the backend to flip `running`; returns the requested state
    pub async fn toggle(&self, is_running: bool) -> Result<bool> {
        let requested = !is_running;
        self.api.submit_config(&ConfigState::running_only(requested)).await?;
        info!(running = requested, "toggle requested");
        Ok(requested)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::MemoryDom;
    use crate::types::{Ack, StatusSnapshot};
    use std::cell::RefCell;

    #[derive(Default)]
    struct RecordingApi {
        config: ConfigState,
        ack: Ack,
        submitted: RefCell<Vec<ConfigState>>,
    }

    impl DashboardApi for RecordingApi {
        async fn fetch_status(&self) -> Result<StatusSnapshot> {
            Err(DashboardError::Network("not scripted".into()))
        }

        async fn fetch_config(&self) -> Result<ConfigState> {
            Ok(self.config.clone())
        }

        async fn submit_config(&self, update: &ConfigState) -> Result<Ack> {
            self.submitted.borrow_mut().push(update.clone());
            Ok(self.ack.clone())
        }
    }

    fn filled_form() -> MemoryDom {
        let dom = MemoryDom::with_pairs(["BTC/USDT", "ETH/USDT", "SOL/USDT"]);
        dom.set_input_value(ids::API_KEY, "key").unwrap();
        dom.set_input_value(ids::SECRET_KEY, "secret").unwrap();
        dom.set_input_value(ids::RISK_MODE, "moderate").unwrap();
        dom
    }

    #[tokio::test]
    async fn test_save_requires_keys() {
        let api = RecordingApi::default();
        let dom = filled_form();
        dom.set_input_value(ids::SECRET_KEY, "").unwrap();
        dom.check_pair("BTC/USDT");

        let result = ConfigSync::new(&api, &dom).save().await;
        assert!(matches!(result, Err(DashboardError::Validation(_))));
        assert_eq!(dom.alerts(), vec![MISSING_KEYS.to_string()]);
        assert!(api.submitted.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_save_requires_a_pair() {
        let api = RecordingApi::default();
        let dom = filled_form();

        let result = ConfigSync::new(&api, &dom).save().await;
        assert!(matches!(result, Err(DashboardError::Validation(_))));
        assert_eq!(dom.alerts(), vec![MISSING_PAIRS.to_string()]);
        assert!(api.submitted.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_save_submits_full_config() {
        let api = RecordingApi::default();
        let dom = filled_form();
        dom.check_pair("ETH/USDT");
        dom.set_checked(ids::LIVE_MODE, true).unwrap();

        ConfigSync::new(&api, &dom).save().await.expect("save should succeed");

        let submitted = api.submitted.borrow();
        assert_eq!(submitted.len(), 1);
        assert_eq!(submitted[0].pairs, Some(vec!["ETH/USDT".to_string()]));
        assert_eq!(submitted[0].is_live, Some(true));
        assert_eq!(submitted[0].risk_mode.as_deref(), Some("moderate"));
        assert_eq!(submitted[0].telegram_token.as_deref(), Some(""));
        assert!(submitted[0].running.is_none());
        assert_eq!(dom.alerts(), vec![SAVED.to_string()]);
    }

    #[tokio::test]
    async fn test_rejected_save_alerts_failure() {
        let api = RecordingApi {
            ack: Ack { status: "error".into() },
            ..RecordingApi::default()
        };
        let dom = filled_form();
        dom.check_pair("BTC/USDT");

        let result = ConfigSync::new(&api, &dom).save().await;
        assert!(matches!(result, Err(DashboardError::Network(_))));
        assert_eq!(api.submitted.borrow().len(), 1);
        assert_eq!(dom.alerts(), vec![SAVE_FAILED.to_string()]);
    }

    #[tokio::test]
    async fn test_unreadable_form_alerts_failure() {
        let api = RecordingApi::default();
        let dom = filled_form();
        dom.check_pair("BTC/USDT");
        dom.remove(ids::TELEGRAM_TOKEN);

        let result = ConfigSync::new(&api, &dom).save().await;
        assert!(matches!(result, Err(DashboardError::Dom(_))));
        assert!(api.submitted.borrow().is_empty());
        assert_eq!(dom.alerts(), vec![SAVE_FAILED.to_string()]);
    }

    #[tokio::test]
    async fn test_partial_hydration() {
        let api = RecordingApi {
            config: ConfigState {
                api_key: Some("X".into()),
                ..ConfigState::default()
            },
            ..RecordingApi::default()
        };
        let dom = MemoryDom::with_pairs(["BTC/USDT", "ETH/USDT"]);
        dom.set_input_value(ids::RISK_MODE, "conservative").unwrap();

        ConfigSync::new(&api, &dom).load().await.expect("load should succeed");

        assert_eq!(dom.element(ids::API_KEY).value, "X");
        assert_eq!(dom.element(ids::SECRET_KEY).value, "");
        assert_eq!(dom.element(ids::RISK_MODE).value, "conservative");
        assert!(!dom.element(ids::LIVE_MODE).checked);
        assert!(dom.checked_pairs().is_empty());
    }

    #[test]
    fn test_hydrate_rederives_pairs() {
        let api = RecordingApi::default();
        let dom = MemoryDom::with_pairs(["BTC/USDT", "ETH/USDT", "SOL/USDT"]);
        dom.check_pair("BTC/USDT");

        let config = ConfigState {
            pairs: Some(vec!["SOL/USDT".into(), "PEPE/USDT".into()]),
            is_live: Some(false),
            ..ConfigState::default()
        };
        ConfigSync::new(&api, &dom).hydrate(&config).unwrap();

        assert_eq!(dom.checked_pairs(), vec!["SOL/USDT".to_string()]);
    }

    #[tokio::test]
    async fn test_toggle_sends_running_only() {
        let api = RecordingApi::default();
        let dom = MemoryDom::new();

        let requested = ConfigSync::new(&api, &dom).toggle(false).await.unwrap();
        assert!(requested);
        assert_eq!(*api.submitted.borrow(), vec![ConfigState::running_only(true)]);
    }
}
