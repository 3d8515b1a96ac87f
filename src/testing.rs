//! In-memory [`HttpTransport`] used by the unit tests.
//!
//! Responses are keyed by the full request URL; every request is recorded so
//! tests can assert on what was sent and in which order.

use std::cell::RefCell;
use std::collections::HashMap;

use reqwest::Url;
use serde_json::Value;

use crate::scraping::{HttpResponse, HttpTransport, TransportError};

#[derive(Debug, Clone, PartialEq)]
pub enum Method {
    Get,
    Put,
}

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub url: String,
    pub bearer_token: Option<String>,
    pub body: Option<Value>,
}

#[derive(Default)]
pub struct MockTransport {
    responses: RefCell<HashMap<String, Result<HttpResponse, String>>>,
    requests: RefCell<Vec<RecordedRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, url: &str, status: u16, body: impl Into<String>) {
        self.responses.borrow_mut().insert(
            url.to_string(),
            Ok(HttpResponse {
                status,
                body: body.into(),
            }),
        );
    }

    pub fn respond_json(&self, url: &str, body: &Value) {
        self.respond(url, 200, body.to_string());
    }

    pub fn fail(&self, url: &str, message: &str) {
        self.responses
            .borrow_mut()
            .insert(url.to_string(), Err(message.to_string()));
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.borrow().clone()
    }

    pub fn gets(&self) -> Vec<String> {
        self.requests()
            .into_iter()
            .filter(|req| req.method == Method::Get)
            .map(|req| req.url)
            .collect()
    }

    pub fn puts(&self) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|req| req.method == Method::Put)
            .collect()
    }

    fn lookup(&self, url: &Url) -> Result<HttpResponse, TransportError> {
        match self.responses.borrow().get(url.as_str()) {
            Some(Ok(response)) => Ok(response.clone()),
            Some(Err(message)) => Err(TransportError(message.clone())),
            None => Err(TransportError(format!("no canned response for {url}"))),
        }
    }
}

impl HttpTransport for MockTransport {
    fn get(&self, url: &Url) -> Result<HttpResponse, TransportError> {
        self.requests.borrow_mut().push(RecordedRequest {
            method: Method::Get,
            url: url.to_string(),
            bearer_token: None,
            body: None,
        });
        self.lookup(url)
    }

    fn put_json(
        &self,
        url: &Url,
        bearer_token: &str,
        body: &Value,
    ) -> Result<HttpResponse, TransportError> {
        self.requests.borrow_mut().push(RecordedRequest {
            method: Method::Put,
            url: url.to_string(),
            bearer_token: Some(bearer_token.to_string()),
            body: Some(body.clone()),
        });
        self.lookup(url)
    }
}

pub mod fixtures {
    use std::collections::HashMap;

    use serde_json::{json, Value};

    use crate::config::VenueConfig;

    pub const LAKE_ID: &str = "69c8438b-5aef-442f-a70d-e0d783ea2b38";

    pub fn config() -> VenueConfig {
        let vars: HashMap<String, String> = [
            ("LAKE_NAME", "woog-island"),
            ("LARGE_WOOG_UUID", LAKE_ID),
            ("API_KEY", "test-token"),
            ("TICKETING_API_URL", "http://ticketing.test"),
            ("LAKE_STATUS_API_URL", "http://status.test"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        VenueConfig::from_map(&vars).expect("fixture config")
    }

    pub fn raw_event(id: u64) -> Value {
        json!({
            "pf_id": id,
            "link": format!("https://www.ztix.de/hp//events/{id}"),
            "title": "Badezeit",
        })
    }

    pub fn events_page(events: Vec<Value>, page: u32, total_pages: u32) -> Value {
        json!({
            "events": events,
            "meta": {"current_page": page, "total_pages": total_pages},
        })
    }

    pub fn detail(begin: &str, end: &str, sale_start: &str, products: Value) -> Value {
        json!({
            "begin_time": begin,
            "end_time": end,
            "sale_configs": [{"start_date": sale_start}],
            "products": products,
        })
    }
}
