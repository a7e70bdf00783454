use reqwest::{StatusCode, Url};
use serde_json::Value;
use std::future::Future;
use std::time::Duration;

/// The HTTP collaborator the controller POSTs through.
///
/// `Config` is passed through untouched; only the client knows what it
/// means.
pub trait PostClient {
    type Config: Clone + Default + 'static;

    fn post(
        &self,
        url: &str,
        body: &Value,
        config: &Self::Config,
    ) -> impl Future<Output = Result<Value, ClientError>>;
}

/// Per-request options for [`ReqwestPostClient`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestConfig {
    pub headers: Vec<(String, String)>,
    /// Ignored in the browser, where fetch has no timeout.
    pub timeout: Option<Duration>,
    /// Browser only: send cookies on cross-origin requests.
    pub include_credentials: bool,
}

impl RequestConfig {
    pub fn with_header(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// Settings for building a native client, usually read from the
/// environment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClientConfig {
    /// Relative urls are joined onto this address.
    pub address: Option<String>,
    pub timeout: Option<Duration>,
}

impl ClientConfig {
    /// Reads `POST_BASE_URL` and `POST_TIMEOUT_SECS`. Both are optional.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    fn from_vars(
        var: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let address = var("POST_BASE_URL")
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty());

        let timeout = match var("POST_TIMEOUT_SECS") {
            Some(raw) => {
                let secs = raw
                    .trim()
                    .parse::<u64>()
                    .map_err(|_| ConfigError::InvalidTimeout(raw.clone()))?;
                Some(Duration::from_secs(secs))
            }
            None => None,
        };

        Ok(Self { address, timeout })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("POST_TIMEOUT_SECS must be a whole number of seconds, got {0:?}")]
    InvalidTimeout(String),
    #[error("Failed to build http client: {0}")]
    Client(#[from] reqwest::Error),
}

/// A [`PostClient`] backed by reqwest, usable natively and in the browser.
pub struct ReqwestPostClient {
    pub address: Option<String>,
    pub inner_client: reqwest::Client,
}

impl ReqwestPostClient {
    pub fn new(address: Option<String>) -> Self {
        Self {
            address,
            inner_client: reqwest::Client::new(),
        }
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self, ConfigError> {
        let builder = reqwest::Client::builder();

        #[cfg(not(target_arch = "wasm32"))]
        let builder = match config.timeout {
            Some(timeout) => builder.timeout(timeout),
            None => builder,
        };

        Ok(Self {
            address: config.address.clone(),
            inner_client: builder.build()?,
        })
    }

    /// Absolute urls are used as-is; anything else is joined onto the
    /// client's address.
    pub fn resolve_url(&self, url: &str) -> Result<Url, ClientError> {
        if let Ok(absolute) = Url::parse(url) {
            return Ok(absolute);
        }

        let Some(address) = &self.address else {
            return Err(ClientError::InvalidUrl(format!(
                "{url} is relative and no base address is configured"
            )));
        };

        Url::parse(address)
            .and_then(|base| base.join(url))
            .map_err(|e| ClientError::InvalidUrl(format!("{url}: {e}")))
    }
}

impl PostClient for ReqwestPostClient {
    type Config = RequestConfig;

    async fn post(
        &self,
        url: &str,
        body: &Value,
        config: &RequestConfig,
    ) -> Result<Value, ClientError> {
        let url = self.resolve_url(url)?;
        let mut request = self.inner_client.post(url).json(body);

        for (name, value) in &config.headers {
            request = request.header(name, value);
        }

        #[cfg(not(target_arch = "wasm32"))]
        if let Some(timeout) = config.timeout {
            request = request.timeout(timeout);
        }

        #[cfg(target_arch = "wasm32")]
        if config.include_credentials {
            request = request.fetch_credentials_include();
        }

        let response = request.send().await?;
        ok_value(response).await
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// A non-success status, containing response text.
    #[error("{1}")]
    APIError(StatusCode, String),
    #[error("Network error. Please check your connection.")]
    Network(#[from] reqwest::Error),
    #[error("Invalid url: {0}")]
    InvalidUrl(String),
}

/// Parse a successful response into a JSON value, or return an appropriate
/// error.
///
/// An empty body becomes `null` and a body that is not JSON is kept as a
/// string.
pub async fn ok_value(
    response: reqwest::Response,
) -> Result<Value, ClientError> {
    if !response.status().is_success() {
        return Err(ClientError::APIError(
            response.status(),
            response.text().await?,
        ));
    }

    let text = response.text().await?;
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }

    match serde_json::from_str(&text) {
        Ok(value) => Ok(value),
        Err(_) => Ok(Value::String(text)),
    }
}
