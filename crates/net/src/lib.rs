//! Blocking document fetches over HTTP(S).
//!
//! One [`HttpClient`] is built per network runtime and reused for every
//! request, so connections and the TLS setup are shared. Bodies are read in
//! chunks and a shared cancel flag is checked between chunks.

use std::io::Read;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use thiserror::Error;

const CHUNK_SIZE: usize = 16 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResult {
    /// What we asked for.
    pub requested_url: String,
    /// Final URL after redirects.
    pub url: String,
    pub status: u16,
    pub content_type: Option<String>,
    pub body: String,
    pub duration_ms: u128,
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid request: {0}")]
    Client(String),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("server answered with status {0}")]
    Status(u16),
    #[error("failed to read response body: {0}")]
    Read(#[from] std::io::Error),
    #[error("response body exceeds {limit} bytes")]
    TooLarge { limit: usize },
    #[error("request cancelled")]
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetOptions {
    pub timeout: Duration,
    pub user_agent: String,
    pub max_body_bytes: usize,
}

impl Default for NetOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            user_agent: "Burrowser/0.1 (+https://burrowser)".to_string(),
            max_body_bytes: 4 * 1024 * 1024,
        }
    }
}

pub struct HttpClient {
    agent: ureq::Agent,
    max_body_bytes: usize,
}

impl HttpClient {
    pub fn new(opts: &NetOptions) -> Self {
        let mut builder = ureq::AgentBuilder::new()
            .timeout(opts.timeout)
            .user_agent(&opts.user_agent);
        match native_tls_config() {
            Some(tls) => builder = builder.tls_config(Arc::new(tls)),
            None => log::warn!(target: "net", "no native root certificates; using bundled roots"),
        }
        Self {
            agent: builder.build(),
            max_body_bytes: opts.max_body_bytes,
        }
    }

    pub fn fetch(&self, url: &str, cancel: &AtomicBool) -> Result<FetchResult, FetchError> {
        let start = Instant::now();
        if cancel.load(Ordering::Acquire) {
            return Err(FetchError::Cancelled);
        }

        let response = match self.agent.get(url).call() {
            Ok(response) => response,
            Err(ureq::Error::Status(code, _)) => return Err(FetchError::Status(code)),
            Err(ureq::Error::Transport(t)) => {
                return Err(match t.kind() {
                    ureq::ErrorKind::InvalidUrl | ureq::ErrorKind::UnknownScheme => {
                        FetchError::Client(t.to_string())
                    }
                    _ => FetchError::Transport(t.to_string()),
                });
            }
        };

        let status = response.status();
        let final_url = response.get_url().to_string();
        let content_type = response.header("content-type").map(str::to_string);

        let mut reader = response.into_reader();
        let mut body = Vec::new();
        let mut chunk = vec![0u8; CHUNK_SIZE];
        loop {
            if cancel.load(Ordering::Acquire) {
                return Err(FetchError::Cancelled);
            }
            let n = reader.read(&mut chunk)?;
            if n == 0 {
                break;
            }
            if body.len() + n > self.max_body_bytes {
                return Err(FetchError::TooLarge {
                    limit: self.max_body_bytes,
                });
            }
            body.extend_from_slice(&chunk[..n]);
        }

        let result = FetchResult {
            requested_url: url.to_string(),
            url: final_url,
            status,
            content_type,
            body: String::from_utf8_lossy(&body).into_owned(),
            duration_ms: start.elapsed().as_millis(),
        };
        log::debug!(
            target: "net",
            "fetched {} ({} bytes, status {}) in {} ms",
            result.url,
            body.len(),
            result.status,
            result.duration_ms
        );
        Ok(result)
    }
}

/// rustls config rooted in the platform trust store, or `None` when it is empty.
fn native_tls_config() -> Option<rustls::ClientConfig> {
    let loaded = rustls_native_certs::load_native_certs();
    for err in &loaded.errors {
        log::warn!(target: "net", "native certificate error: {err}");
    }
    let mut roots = rustls::RootCertStore::empty();
    let (added, ignored) = roots.add_parsable_certificates(loaded.certs);
    log::debug!(target: "net", "native roots: {added} added, {ignored} ignored");
    if roots.is_empty() {
        return None;
    }

    let provider = Arc::new(rustls::crypto::ring::default_provider());
    let config = rustls::ClientConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()
        .map_err(|e| log::warn!(target: "net", "rustls protocol setup failed: {e}"))
        .ok()?
        .with_root_certificates(roots)
        .with_no_client_auth();
    Some(config)
}
