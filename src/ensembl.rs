use std::thread;
use std::time::Duration;

use reqwest::Url;
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue, USER_AGENT};
use serde::Deserialize;
use tracing::debug;

use crate::config::ResolverConfig;
use crate::domain::{EnsemblId, GeneSymbol, Species};
use crate::error::{FailureCause, LookupError, LookupFailure};

/// Resolves one gene symbol for one species.
pub trait SymbolLookup {
    fn lookup(&self, species: &Species, symbol: &GeneSymbol) -> Result<EnsemblId, LookupFailure>;
}

impl<T: SymbolLookup + ?Sized> SymbolLookup for &T {
    fn lookup(&self, species: &Species, symbol: &GeneSymbol) -> Result<EnsemblId, LookupFailure> {
        (**self).lookup(species, symbol)
    }
}

#[derive(Debug, Deserialize)]
struct LookupRecord {
    #[serde(default)]
    id: Option<String>,
}

#[derive(Clone)]
pub struct EnsemblHttpClient {
    client: Client,
    base_url: String,
    max_retries: usize,
}

impl EnsemblHttpClient {
    pub fn new(config: &ResolverConfig) -> Result<Self, LookupError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent)
                .map_err(|err| LookupError::HttpClient(err.to_string()))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        // No explicit timeout: reqwest's blocking default applies.
        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|err| LookupError::HttpClient(err.to_string()))?;
        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            max_retries: config.max_retries,
        })
    }

    /// `{base}/lookup/symbol/{species}/{symbol}` with both segments
    /// percent-encoded.
    pub fn lookup_url(
        base_url: &str,
        species: &Species,
        symbol: &GeneSymbol,
    ) -> Result<Url, FailureCause> {
        let mut url =
            Url::parse(base_url).map_err(|err| FailureCause::Transport(err.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| FailureCause::Transport(format!("cannot use {base_url} as a base URL")))?
            .pop_if_empty()
            .extend(["lookup", "symbol", species.as_str(), symbol.as_str()]);
        Ok(url)
    }

    fn send_with_retries<F>(&self, mut make_req: F) -> Result<Response, FailureCause>
    where
        F: FnMut() -> RequestBuilder,
    {
        const BASE_DELAY_MS: u64 = 200;
        let mut attempt = 0usize;
        loop {
            match make_req().send() {
                Ok(resp) => {
                    let status = resp.status().as_u16();
                    if attempt < self.max_retries && is_retryable_status(status) {
                        let delay = BASE_DELAY_MS * (attempt as u64 + 1);
                        debug!(status, attempt, delay_ms = delay, "retrying Ensembl lookup");
                        thread::sleep(Duration::from_millis(delay));
                        attempt += 1;
                        continue;
                    }
                    return Ok(resp);
                }
                Err(err) => {
                    if attempt < self.max_retries && is_retryable_error(&err) {
                        let delay = BASE_DELAY_MS * (attempt as u64 + 1);
                        debug!(error = %err, attempt, delay_ms = delay, "retrying Ensembl lookup");
                        thread::sleep(Duration::from_millis(delay));
                        attempt += 1;
                        continue;
                    }
                    return Err(FailureCause::Transport(err.to_string()));
                }
            }
        }
    }

    fn handle_status(response: Response) -> Result<Response, FailureCause> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let message = response
            .text()
            .unwrap_or_else(|_| "Ensembl request failed".to_string());
        Err(FailureCause::Status { status, message })
    }

    fn fetch_id(&self, species: &Species, symbol: &GeneSymbol) -> Result<EnsemblId, FailureCause> {
        let url = Self::lookup_url(&self.base_url, species, symbol)?;
        debug!(%url, "looking up gene symbol");
        let response = self.send_with_retries(|| self.client.get(url.clone()))?;
        let response = Self::handle_status(response)?;
        let body = response
            .text()
            .map_err(|err| FailureCause::Transport(err.to_string()))?;
        parse_lookup_body(&body)
    }
}

/// Pulls `id` out of a lookup response body.
pub fn parse_lookup_body(body: &str) -> Result<EnsemblId, FailureCause> {
    let record: LookupRecord =
        serde_json::from_str(body).map_err(|err| FailureCause::Decode(err.to_string()))?;
    record.id.map(EnsemblId::new).ok_or(FailureCause::MissingId)
}

impl SymbolLookup for EnsemblHttpClient {
    fn lookup(&self, species: &Species, symbol: &GeneSymbol) -> Result<EnsemblId, LookupFailure> {
        self.fetch_id(species, symbol)
            .map_err(|cause| LookupFailure::new(symbol, cause))
    }
}

fn is_retryable_status(status: u16) -> bool {
    matches!(status, 429 | 500 | 502 | 503 | 504)
}

fn is_retryable_error(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_connect()
}
