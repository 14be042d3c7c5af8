//! Browser binding (wasm32 only)
//!
//! Implements the page seam over `web-sys` and wires the dashboard into
//! the page: first tick and config load as separate tasks, the 2 s interval, and the save and
//! toggle buttons.

use std::future::Future;
use std::rc::Rc;

use tracing::{debug, info, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Document, Element, HtmlInputElement, HtmlSelectElement, Window};

use crate::client::HttpApi;
use crate::config::DashboardConfig;
use crate::dashboard::Dashboard;
use crate::dom::{ConfigForm, Surface, ids};
use crate::error::{DashboardError, Result};
use crate::logging;

type PageDashboard = Dashboard<HttpApi, BrowserDom>;

#[wasm_bindgen]
extern "C" {
    /// The page's `bootstrap.Toast` widget
    #[wasm_bindgen(js_namespace = bootstrap, js_name = Toast)]
    type BootstrapToast;

    #[wasm_bindgen(catch, constructor, js_namespace = bootstrap, js_class = "Toast")]
    fn new(element: &Element) -> std::result::Result<BootstrapToast, JsValue>;

    #[wasm_bindgen(method)]
    fn show(this: &BootstrapToast);
}

fn js_error(err: JsValue) -> DashboardError {
    DashboardError::Dom(err.as_string().unwrap_or_else(|| format!("{err:?}")))
}

/// The live document
pub struct BrowserDom {
    window: Window,
    document: Document,
}

impl BrowserDom {
    pub fn new(window: Window, document: Document) -> Self {
        Self { window, document }
    }

    pub fn element(&self, id: &str) -> Result<Element> {
        self.document
            .get_element_by_id(id)
            .ok_or_else(|| DashboardError::Dom(format!("#{id} not found")))
    }

    fn input(&self, id: &str) -> Result<HtmlInputElement> {
        self.element(id)?
            .dyn_into::<HtmlInputElement>()
            .map_err(|_| DashboardError::Dom(format!("#{id} is not an input")))
    }

    fn pair_boxes(&self) -> Vec<HtmlInputElement> {
        let selector = format!(".{}", ids::PAIR_CHECKBOX_CLASS);
        let Ok(nodes) = self.document.query_selector_all(&selector) else {
            return Vec::new();
        };
        (0..nodes.length())
            .filter_map(|i| nodes.get(i))
            .filter_map(|node| node.dyn_into::<HtmlInputElement>().ok())
            .collect()
    }
}

impl Surface for BrowserDom {
    fn set_text(&self, id: &str, text: &str) -> Result<()> {
        self.element(id)?.set_text_content(Some(text));
        Ok(())
    }

    fn set_class(&self, id: &str, class: &str) -> Result<()> {
        self.element(id)?.set_class_name(class);
        Ok(())
    }

    fn swap_class(&self, id: &str, remove: &str, add: &str) -> Result<()> {
        let classes = self.element(id)?.class_list();
        classes.remove_1(remove).map_err(js_error)?;
        classes.add_1(add).map_err(js_error)
    }

    fn set_html(&self, id: &str, html: &str) -> Result<()> {
        self.element(id)?.set_inner_html(html);
        Ok(())
    }

    fn show_toast(&self, message: &str, header_class: &str) -> Result<()> {
        let toast = self.element(ids::TOAST)?;
        self.element(ids::TOAST_BODY)?.set_text_content(Some(message));
        if let Some(header) = toast.query_selector(".toast-header").map_err(js_error)? {
            header.set_class_name(header_class);
        }
        BootstrapToast::new(&toast).map_err(js_error)?.show();
        Ok(())
    }

    fn alert(&self, message: &str) {
        if let Err(e) = self.window.alert_with_message(message) {
            warn!(error = %js_error(e), "alert failed");
        }
    }
}

impl ConfigForm for BrowserDom {
    fn input_value(&self, id: &str) -> Result<String> {
        let element = self.element(id)?;
        if let Some(input) = element.dyn_ref::<HtmlInputElement>() {
            return Ok(input.value());
        }
        if let Some(select) = element.dyn_ref::<HtmlSelectElement>() {
            return Ok(select.value());
        }
        Err(DashboardError::Dom(format!("#{id} has no value")))
    }

    fn set_input_value(&self, id: &str, value: &str) -> Result<()> {
        let element = self.element(id)?;
        if let Some(input) = element.dyn_ref::<HtmlInputElement>() {
            input.set_value(value);
            return Ok(());
        }
        if let Some(select) = element.dyn_ref::<HtmlSelectElement>() {
            select.set_value(value);
            return Ok(());
        }
        Err(DashboardError::Dom(format!("#{id} has no value")))
    }

    fn is_checked(&self, id: &str) -> Result<bool> {
        Ok(self.input(id)?.checked())
    }

    fn set_checked(&self, id: &str, checked: bool) -> Result<()> {
        self.input(id)?.set_checked(checked);
        Ok(())
    }

    fn checked_pairs(&self) -> Vec<String> {
        self.pair_boxes()
            .into_iter()
            .filter(HtmlInputElement::checked)
            .map(|b| b.value())
            .collect()
    }

    fn clear_pairs(&self) {
        for b in self.pair_boxes() {
            b.set_checked(false);
        }
    }

    fn check_pair(&self, pair: &str) -> bool {
        match self.pair_boxes().into_iter().find(|b| b.value() == pair) {
            Some(b) => {
                b.set_checked(true);
                true
            }
            None => false,
        }
    }
}

/// Spawn `action` on every click of `#id`
fn on_click<F, Fut>(dashboard: &Rc<PageDashboard>, id: &str, action: F) -> Result<()>
where
    F: Fn(Rc<PageDashboard>) -> Fut + 'static,
    Fut: Future<Output = ()> + 'static,
{
    let element = dashboard.surface().element(id)?;
    let dashboard = Rc::clone(dashboard);
    let handler = Closure::<dyn FnMut()>::new(move || spawn_local(action(Rc::clone(&dashboard))));
    element
        .add_event_listener_with_callback("click", handler.as_ref().unchecked_ref())
        .map_err(js_error)?;
    handler.forget();
    Ok(())
}

/// Page entry point
#[wasm_bindgen(start)]
pub fn start() -> std::result::Result<(), JsValue> {
    console_error_panic_hook::set_once();

    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window.document().ok_or_else(|| JsValue::from_str("no document"))?;
    let location = window.location();
    logging::init(location.search().is_ok_and(|q| logging::debug_requested(&q)));

    let config = DashboardConfig::for_origin(&location.origin()?);
    config.validate().map_err(|e| JsValue::from_str(&e.to_string()))?;
    let interval_ms = i32::try_from(config.poll_interval.as_millis()).unwrap_or(i32::MAX);
    info!(api = %config.api_base, interval_ms, "dashboard starting");

    let api = HttpApi::new(&config);
    let dashboard = Rc::new(Dashboard::new(api, BrowserDom::new(window.clone(), document), config));

    let wire = |dashboard: &Rc<PageDashboard>| -> Result<()> {
        on_click(dashboard, ids::SAVE, |d| async move {
            // already alerted and logged by `save`
            if let Err(e) = d.save().await {
                debug!(error = %e, "save aborted");
            }
        })?;
        on_click(dashboard, ids::TOGGLE, |d| async move {
            if let Err(e) = d.toggle().await {
                warn!(error = %e, "toggle failed");
            }
        })
    };
    wire(&dashboard).map_err(|e| JsValue::from_str(&e.to_string()))?;

    let ticker = {
        let dashboard = Rc::clone(&dashboard);
        Closure::<dyn FnMut()>::new(move || {
            let dashboard = Rc::clone(&dashboard);
            spawn_local(async move {
                let _ = dashboard.tick().await;
            });
        })
    };
    window.set_interval_with_callback_and_timeout_and_arguments_0(
        ticker.as_ref().unchecked_ref(),
        interval_ms,
    )?;
    ticker.forget();

    dashboard.boot(|task| spawn_local(task));
    Ok(())
}
