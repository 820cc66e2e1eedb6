use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, Url};
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};
use tracing::{error, info, warn};

use crate::config::{self, Config, OverlapPolicy};
use crate::parser::parse_appcast;
use crate::record::ReleaseRecord;
use crate::render;

/// Errors that can occur while retrieving the feed bytes.
///
/// Transport-class failures are kept apart from parse failures: a transport
/// failure leaves the display untouched, while a parse failure replaces it
/// with the fallback error document.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network-level error (DNS, connection, TLS, timeout)
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// HTTP response with non-2xx status code
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
}

/// Receives the final rendered document.
///
/// The host implements this as the seam to its display surface. `present`
/// is called from the fetch task; an implementation that owns a display
/// context should marshal the string over (e.g. through a channel) rather
/// than touch the surface directly.
pub trait RenderTarget: Send + Sync {
    fn present(&self, document: String);
}

/// Loading flag observed by the host.
///
/// `loading` holds strictly between the start of a fetch cycle and its
/// terminal; success, parse failure, and transport failure all settle back
/// to not-loading. Errors are never distinguished at the signal level.
#[derive(Clone, Default)]
pub struct LoadSignal {
    inner: Arc<RwLock<bool>>,
}

impl LoadSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn is_loading(&self) -> bool {
        *self.inner.read().await
    }

    pub async fn set(&self, loading: bool) {
        *self.inner.write().await = loading;
    }
}

/// Release-notes pipeline: fetch, parse, transform, render, present.
///
/// Holds no feed state between cycles; each successful cycle fully replaces
/// the previously presented document.
pub struct ReleaseNotesView {
    client: Client,
    target: Arc<dyn RenderTarget>,
    loading: LoadSignal,
    policy: OverlapPolicy,
    /// Bumped by every `render_feed` call; under `LatestWins`, a cycle whose
    /// generation is no longer current drops its result
    generation: AtomicU64,
    gate: Mutex<()>,
}

impl ReleaseNotesView {
    pub fn new(target: Arc<dyn RenderTarget>) -> Self {
        Self::build(
            config::default_timeout_secs(),
            &config::default_user_agent(),
            OverlapPolicy::default(),
            target,
        )
    }

    pub fn with_config(config: &Config, target: Arc<dyn RenderTarget>) -> Self {
        Self::build(config.timeout_secs, &config.user_agent, config.overlap, target)
    }

    fn build(
        timeout_secs: u64,
        user_agent: &str,
        policy: OverlapPolicy,
        target: Arc<dyn RenderTarget>,
    ) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(user_agent)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            target,
            loading: LoadSignal::new(),
            policy,
            generation: AtomicU64::new(0),
            gate: Mutex::new(()),
        }
    }

    /// Handle to the loading flag, for the host to read (or reset).
    pub fn load_signal(&self) -> LoadSignal {
        self.loading.clone()
    }

    /// Drives one full pipeline cycle for the given feed URL.
    ///
    /// The host may call this at any point and any number of times. Nothing
    /// is returned: a string that does not parse as a URL is a silent no-op,
    /// a transport failure leaves the current document in place, and an
    /// unparsable feed presents the fallback error document. Only the
    /// loading flag is visible to the host.
    pub async fn render_feed(&self, url: &str) {
        let url = match Url::parse(url) {
            Ok(url) => url,
            Err(e) => {
                warn!(url, error = %e, "ignoring invalid feed URL");
                return;
            }
        };

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let _gate = match self.policy {
            OverlapPolicy::Serialize => Some(self.gate.lock().await),
            OverlapPolicy::LatestWins => None,
        };

        self.loading.set(true).await;
        let document = self.run_cycle(&url).await;
        self.loading.set(false).await;

        let Some(document) = document else { return };

        if self.policy == OverlapPolicy::LatestWins
            && self.generation.load(Ordering::SeqCst) != generation
        {
            info!(url = %url, "dropping stale fetch result");
            return;
        }

        self.target.present(document);
    }

    async fn run_cycle(&self, url: &Url) -> Option<String> {
        let bytes = match self.fetch(url).await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(url = %url, error = %e, "feed fetch failed, keeping current document");
                return None;
            }
        };

        let rendered = match parse_appcast(&bytes) {
            Ok(items) => {
                let records: Vec<ReleaseRecord> =
                    items.into_iter().map(ReleaseRecord::from_raw).collect();
                info!(url = %url, releases = records.len(), "rendering release notes");
                render::render_releases(&records)
            }
            Err(e) => {
                error!(url = %url, error = %e, "failed to parse appcast");
                render::render_error()
            }
        };

        match rendered {
            Ok(document) => Some(document),
            Err(e) => {
                error!(error = %e, "failed to render release notes template");
                None
            }
        }
    }

    async fn fetch(&self, url: &Url) -> Result<Vec<u8>, FetchError> {
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus(status.as_u16()));
        }
        Ok(response.bytes().await?.to_vec())
    }
}
