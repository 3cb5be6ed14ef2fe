//! `fetch`-backed transport for the browser

use async_trait::async_trait;
use expense_core::{ExpenseError, HttpRequest, HttpResponse, HttpTransport};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestInit, RequestMode, Response};

#[derive(Debug, Clone, Copy, Default)]
pub struct FetchTransport;

fn transport_error(value: JsValue) -> ExpenseError {
    ExpenseError::Transport(value.as_string().unwrap_or_else(|| format!("{:?}", value)))
}

#[async_trait(?Send)]
impl HttpTransport for FetchTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ExpenseError> {
        let window =
            web_sys::window().ok_or_else(|| ExpenseError::Transport("No window".into()))?;

        let opts = RequestInit::new();
        opts.set_method(request.method.as_str());
        opts.set_mode(RequestMode::Cors);
        if let Some(body) = &request.body {
            opts.set_body(&JsValue::from_str(body));
        }

        let js_request =
            Request::new_with_str_and_init(&request.url, &opts).map_err(transport_error)?;
        for (name, value) in &request.headers {
            js_request
                .headers()
                .set(name, value)
                .map_err(transport_error)?;
        }

        let response = JsFuture::from(window.fetch_with_request(&js_request))
            .await
            .map_err(transport_error)?;
        let response: Response = response.dyn_into().map_err(transport_error)?;

        let text = JsFuture::from(response.text().map_err(transport_error)?)
            .await
            .map_err(transport_error)?;

        Ok(HttpResponse {
            status: response.status(),
            body: text.as_string().unwrap_or_default(),
        })
    }
}
