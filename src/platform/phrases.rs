//! Remote phrase supplier
//!
//! `GET {endpoint}?count=N` answering `{"phrase": "..."}`. The request is
//! aborted after `timeout_ms`; the session still applies its own timeout in
//! case the host never settles the promise.

use serde::Deserialize;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{AbortSignal, Request, RequestInit, RequestMode, Response};

use crate::error::FeedbackError;
use crate::feedback::{PhraseFuture, PhraseSource};

#[derive(Debug, Deserialize)]
struct PhraseReply {
    phrase: String,
}

#[derive(Debug, Clone)]
pub struct RemotePhrases {
    endpoint: String,
    timeout_ms: u32,
}

impl RemotePhrases {
    pub fn new(endpoint: impl Into<String>, timeout_ms: u32) -> Self {
        Self {
            endpoint: endpoint.into(),
            timeout_ms,
        }
    }
}

fn js_error(e: wasm_bindgen::JsValue) -> FeedbackError {
    FeedbackError::Request(format!("{:?}", e))
}

async fn fetch_phrase(url: String, timeout_ms: u32) -> Result<String, FeedbackError> {
    let window = web_sys::window().ok_or_else(|| FeedbackError::Request("no window".into()))?;

    let init = RequestInit::new();
    init.set_method("GET");
    init.set_mode(RequestMode::Cors);
    let signal = AbortSignal::timeout_with_u32(timeout_ms);
    init.set_signal(Some(&signal));

    let request = Request::new_with_str_and_init(&url, &init).map_err(js_error)?;
    let response = JsFuture::from(window.fetch_with_request(&request))
        .await
        .map_err(|e| {
            if signal.aborted() {
                FeedbackError::Timeout
            } else {
                js_error(e)
            }
        })?;
    let response: Response = response.dyn_into().map_err(js_error)?;
    if !response.ok() {
        return Err(FeedbackError::Request(format!("HTTP {}", response.status())));
    }

    let body = JsFuture::from(response.text().map_err(js_error)?)
        .await
        .map_err(js_error)?;
    let body = body.as_string().unwrap_or_default();
    let reply: PhraseReply =
        serde_json::from_str(&body).map_err(|e| FeedbackError::Request(e.to_string()))?;
    Ok(reply.phrase)
}

impl PhraseSource for RemotePhrases {
    fn phrase_for(&self, milestone: u64) -> PhraseFuture {
        let url = format!("{}?count={}", self.endpoint, milestone);
        Box::pin(fetch_phrase(url, self.timeout_ms))
    }
}
