//! Shared test utilities and constants.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use base64::prelude::*;
use futures_util::future::BoxFuture;
use zeroize::Zeroizing;

use spreadlog::PriceClient;
use spreadlog::config::RobinhoodConfig;
use spreadlog::transport::{HttpRequest, HttpResponse, HttpTransport, TransportError};

pub const MOCK_BASE_URL: &str = "https://mock.robinhood.test";
pub const TEST_API_KEY: &str = "rh-api-test-key";

pub const TRADING_PAIRS_JSON: &str = include_str!("../fixtures/trading_pairs.json");
pub const SHIB_TRADING_PAIR_JSON: &str = include_str!("../fixtures/shib_trading_pair.json");
pub const ESTIMATED_BOTH_JSON: &str = include_str!("../fixtures/estimated_price_both.json");
pub const ESTIMATED_TWO_BIDS_JSON: &str =
    include_str!("../fixtures/estimated_price_two_bids.json");
pub const ESTIMATED_ASK_ONLY_JSON: &str =
    include_str!("../fixtures/estimated_price_ask_only.json");
pub const ESTIMATED_MISMATCH_JSON: &str =
    include_str!("../fixtures/estimated_price_mismatch.json");
pub const ESTIMATED_BID_ONLY_JSON: &str =
    include_str!("../fixtures/estimated_price_bid_only.json");
pub const ESTIMATED_TWO_ASKS_JSON: &str =
    include_str!("../fixtures/estimated_price_two_asks.json");
pub const ESTIMATED_MULTI_QUANTITY_JSON: &str =
    include_str!("../fixtures/estimated_price_multi_quantity.json");

/// Base64 of 32 bytes of 0x2a, a valid Ed25519 seed.
pub fn test_seed() -> String {
    BASE64_STANDARD.encode([0x2a_u8; 32])
}

pub fn test_config(ttl: Duration) -> RobinhoodConfig {
    RobinhoodConfig {
        base_url: MOCK_BASE_URL.to_string(),
        api_key: TEST_API_KEY.to_string(),
        private_key: Zeroizing::new(test_seed()),
        trading_pair_ttl: ttl,
    }
}

struct Route {
    path_prefix: String,
    response: Result<HttpResponse, TransportError>,
}

/// Scripted transport: answers by path prefix and records every request.
///
/// The most recently added matching route wins; unmatched paths get a 404.
#[derive(Default)]
pub struct MockTransport {
    routes: Mutex<Vec<Route>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn respond(&self, path_prefix: &str, status: u16, body: &str) {
        self.routes.lock().unwrap().push(Route {
            path_prefix: path_prefix.to_string(),
            response: Ok(HttpResponse::new(status, body)),
        });
    }

    pub fn fail(&self, path_prefix: &str, error: TransportError) {
        self.routes.lock().unwrap().push(Route {
            path_prefix: path_prefix.to_string(),
            response: Err(error),
        });
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Number of requests whose path starts with `path_prefix`.
    pub fn calls(&self, path_prefix: &str) -> usize {
        self.requests()
            .iter()
            .filter(|r| path_of(r).starts_with(path_prefix))
            .count()
    }
}

/// Path and query of a recorded request, without the base URL.
pub fn path_of(request: &HttpRequest) -> &str {
    request
        .url
        .strip_prefix(MOCK_BASE_URL)
        .unwrap_or(&request.url)
}

impl HttpTransport for MockTransport {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> BoxFuture<'a, Result<HttpResponse, TransportError>> {
        let path = path_of(&request).to_string();
        let response = self
            .routes
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|route| path.starts_with(&route.path_prefix))
            .map(|route| route.response.clone())
            .unwrap_or_else(|| Ok(HttpResponse::new(404, r#"{"detail":"not found"}"#)));

        self.requests.lock().unwrap().push(request);
        Box::pin(async move { response })
    }
}

/// Client wired to `mock` with the test credentials.
pub fn mock_client(mock: &Arc<MockTransport>, ttl: Duration) -> PriceClient {
    PriceClient::with_transport(&test_config(ttl), mock.clone()).expect("valid test key")
}
