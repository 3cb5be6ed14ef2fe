//! WASM front-end for the expense tracker
//!
//! ## Usage (JavaScript)
//!
//! ```javascript
//! import init, { ExpenseApp } from './pkg/expense_wasm.js';
//!
//! await init();
//! const app = new ExpenseApp(SERVICE_URL, ANON_KEY);
//! app.bindExpenseForm();
//! document.getElementById('sign-in').onclick = () => app.signIn();
//! ```

mod dom;
mod fetch;

use expense_core::{ExpenseTracker, Feedback, HostedClient, ServiceConfig};
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{future_to_promise, spawn_local};

pub use fetch::FetchTransport;

type Tracker = ExpenseTracker<FetchTransport>;

#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

#[wasm_bindgen]
pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

#[wasm_bindgen]
pub struct ExpenseApp {
    tracker: Rc<Tracker>,
    form_listener: Option<Closure<dyn FnMut(web_sys::Event)>>,
}

fn log(message: &str) {
    web_sys::console::log_1(&JsValue::from_str(message));
}

fn to_js(feedback: &Feedback) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(feedback)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

/// Auth feedback goes to an alert and decides whether the tracker shows
fn show_auth_feedback(feedback: &Feedback) -> Result<JsValue, JsValue> {
    dom::alert(&feedback.message)?;
    dom::set_tracker_visible(feedback.tracker_visible)?;
    to_js(feedback)
}

#[wasm_bindgen]
impl ExpenseApp {
    #[wasm_bindgen(constructor)]
    pub fn new(service_url: &str, anon_key: &str) -> Result<ExpenseApp, JsValue> {
        let config =
            ServiceConfig::new(service_url, anon_key).map_err(|e| JsValue::from_str(&e.to_string()))?;
        log(&format!("Expense tracker using {}", config.url));

        Ok(Self {
            tracker: Rc::new(ExpenseTracker::new(HostedClient::new(config, FetchTransport))),
            form_listener: None,
        })
    }

    #[wasm_bindgen(getter, js_name = isSignedIn)]
    pub fn is_signed_in(&self) -> bool {
        self.tracker.is_signed_in()
    }

    /// Resolves to `{message, tracker_visible}` after alerting the message
    #[wasm_bindgen(js_name = signUp)]
    pub fn sign_up(&self) -> js_sys::Promise {
        let tracker = Rc::clone(&self.tracker);
        future_to_promise(async move {
            let feedback = tracker
                .sign_up(&dom::field_value("email"), &dom::field_value("password"))
                .await;
            show_auth_feedback(&feedback)
        })
    }

    #[wasm_bindgen(js_name = signIn)]
    pub fn sign_in(&self) -> js_sys::Promise {
        let tracker = Rc::clone(&self.tracker);
        future_to_promise(async move {
            let feedback = tracker
                .sign_in(&dom::field_value("email"), &dom::field_value("password"))
                .await;
            show_auth_feedback(&feedback)
        })
    }

    #[wasm_bindgen(js_name = signOut)]
    pub fn sign_out(&self) -> js_sys::Promise {
        let tracker = Rc::clone(&self.tracker);
        future_to_promise(async move {
            let feedback = tracker.sign_out().await;
            show_auth_feedback(&feedback)
        })
    }

    /// Submit the expense form programmatically; the result goes to `#message`
    #[wasm_bindgen(js_name = addExpense)]
    pub fn add_expense(&self) -> js_sys::Promise {
        let tracker = Rc::clone(&self.tracker);
        future_to_promise(async move {
            let feedback = submit_expense(&tracker).await?;
            to_js(&feedback)
        })
    }

    /// Handle `submit` on `#expense-form` without a page reload
    #[wasm_bindgen(js_name = bindExpenseForm)]
    pub fn bind_expense_form(&mut self) -> Result<(), JsValue> {
        let form = dom::element(dom::EXPENSE_FORM)?;
        if let Some(previous) = self.form_listener.take() {
            form.remove_event_listener_with_callback("submit", previous.as_ref().unchecked_ref())?;
        }

        let tracker = Rc::clone(&self.tracker);
        let listener = Closure::<dyn FnMut(web_sys::Event)>::new(move |event: web_sys::Event| {
            event.prevent_default();
            let tracker = Rc::clone(&tracker);
            spawn_local(async move {
                if let Err(e) = submit_expense(&tracker).await {
                    web_sys::console::error_1(&e);
                }
            });
        });

        form.add_event_listener_with_callback("submit", listener.as_ref().unchecked_ref())?;
        self.form_listener = Some(listener);
        Ok(())
    }
}

async fn submit_expense(tracker: &Tracker) -> Result<Feedback, JsValue> {
    let form = dom::read_expense_form();
    let feedback = tracker.add_expense(&form).await;
    dom::set_message(&feedback.message)?;
    Ok(feedback)
}
