use tracing::{debug, info, warn};
use ureq::Agent;

use crate::config::SoapConfig;
use crate::errors::{Result, SoapClientError};

/// One HTTP request as built by an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub url: String,
    pub method: &'static str,
    pub body: Vec<u8>,
    pub headers: Vec<(String, String)>,
}

impl HttpRequest {
    pub fn post(url: impl Into<String>, body: Vec<u8>) -> Self {
        Self {
            url: url.into(),
            method: "POST",
            body,
            headers: Vec::new(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Sends a request and returns the raw response body.
///
/// Implementations perform a single blocking round trip; no retry.
pub trait Transport: Send + Sync {
    fn send(&self, request: &HttpRequest) -> Result<Vec<u8>>;
}

/// HTTP/HTTPS transport backed by `ureq`.
///
/// Non-2xx statuses are not errors: SOAP services deliver faults with
/// HTTP 500 and the body still has to be decoded. Interim `100 Continue`
/// responses are consumed by ureq.
pub struct UreqTransport {
    agent: Agent,
    debug: bool,
}

impl UreqTransport {
    pub fn new(config: &SoapConfig) -> Self {
        let agent_config = Agent::config_builder()
            .timeout_global(Some(config.timeout()))
            .http_status_as_error(false)
            .build();

        let agent: Agent = agent_config.into();

        Self {
            agent,
            debug: config.debug,
        }
    }
}

impl Transport for UreqTransport {
    fn send(&self, request: &HttpRequest) -> Result<Vec<u8>> {
        check_scheme(&request.url)?;

        if request.method != "POST" {
            return Err(SoapClientError::transport(format!(
                "unsupported method {}",
                request.method
            )));
        }

        debug!(url = %request.url, bytes = request.body.len(), "Sending SOAP request");
        if self.debug {
            info!(
                target: "pmosoap::wire",
                url = %request.url,
                "send: {}",
                String::from_utf8_lossy(&request.body)
            );
        }

        let mut builder = self.agent.post(request.url.as_str());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let mut response = builder.send(request.body.as_slice()).map_err(|e| {
            SoapClientError::transport(format!("HTTP error when sending to {}: {e}", request.url))
        })?;

        let status = response.status();
        // The whole envelope is needed to decode; no size cap
        let body = response
            .body_mut()
            .with_config()
            .limit(u64::MAX)
            .read_to_vec()?;

        if !status.is_success() {
            warn!(url = %request.url, status = %status, "SOAP endpoint answered with non-success status");
        }
        debug!(url = %request.url, status = %status, bytes = body.len(), "Received SOAP response");
        if self.debug {
            info!(
                target: "pmosoap::wire",
                url = %request.url,
                "reply: {}",
                String::from_utf8_lossy(&body)
            );
        }

        Ok(body)
    }
}

fn check_scheme(url: &str) -> Result<()> {
    let lower = url.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        Ok(())
    } else {
        Err(SoapClientError::transport(format!(
            "unsupported URL scheme in {url}"
        )))
    }
}
