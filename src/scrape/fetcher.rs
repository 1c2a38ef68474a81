//! HTTP fetcher implementation
//!
//! One GET per run against the configured listings page. No retries and no
//! backoff: any failure ends the run.

use crate::config::SourceConfig;
use crate::FetchError;
use reqwest::Client;
use std::time::Duration;

/// Builds an HTTP client with proper configuration
///
/// Redirects follow the client defaults. The whole request, body included,
/// is bounded by the configured timeout.
///
/// # Example
///
/// ```no_run
/// use finn_scout::config::SourceConfig;
/// use finn_scout::scrape::build_http_client;
/// use std::time::Duration;
///
/// let config = SourceConfig {
///     url: "https://www.finn.no/realestate/homes/search.html".to_string(),
///     timeout: Duration::from_secs(30),
///     user_agent: "finn-scout/0.1.0".to_string(),
/// };
///
/// let client = build_http_client(&config).unwrap();
/// ```
pub fn build_http_client(config: &SourceConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(config.timeout)
        .connect_timeout(config.timeout.min(Duration::from_secs(10)))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches the listings page and returns its body
///
/// # Returns
///
/// * `Ok(String)` - The response body of a 2xx response
/// * `Err(FetchError)` - Transport failure, timeout, non-2xx status, or an
///   unreadable body
pub async fn fetch_page(client: &Client, url: &str) -> Result<String, FetchError> {
    tracing::debug!("GET {}", url);

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| classify_error(url, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let body = response.text().await.map_err(|e| {
        if e.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
            }
        } else {
            FetchError::Body {
                url: url.to_string(),
                source: e,
            }
        }
    })?;

    tracing::debug!("Fetched {} bytes from {}", body.len(), url);
    Ok(body)
}

fn classify_error(url: &str, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else {
        FetchError::Transport {
            url: url.to_string(),
            source: error,
        }
    }
}
