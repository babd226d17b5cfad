//! Country boundary topology, fetched once per session.
//!
//! Lifecycle: Loading → Ready | Unavailable. A failed fetch is terminal; views
//! attached to an unavailable source draw nothing.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use formats::{FeatureCollection, TopologyError, DEFAULT_OBJECT, decode_topology_document};
use tokio::sync::OnceCell;

/// world-atlas 110m countries, the topology the maps were authored against.
pub const DEFAULT_TOPOLOGY_URL: &str = "https://cdn.jsdelivr.net/npm/world-atlas@2/countries-110m.json";

/// Type alias for a boxed future that can be sent between threads.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

#[derive(Debug, Clone, PartialEq)]
pub enum TopologyLoadError {
    Request { url: String, reason: String },
    Status { url: String, status: u16 },
    Decode(TopologyError),
}

impl std::fmt::Display for TopologyLoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TopologyLoadError::Request { url, reason } => {
                write!(f, "topology request to {url} failed: {reason}")
            }
            TopologyLoadError::Status { url, status } => {
                write!(f, "topology request to {url} returned HTTP {status}")
            }
            TopologyLoadError::Decode(err) => write!(f, "topology decode failed: {err}"),
        }
    }
}

impl std::error::Error for TopologyLoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TopologyLoadError::Decode(err) => Some(err),
            _ => None,
        }
    }
}

impl From<TopologyError> for TopologyLoadError {
    fn from(err: TopologyError) -> Self {
        TopologyLoadError::Decode(err)
    }
}

/// Produces the raw topology document.
///
/// Implementations must be `Send + Sync`; the method returns a boxed future for
/// dyn-compatibility.
pub trait TopologyFetcher: Send + Sync {
    /// Where the document comes from, for logs.
    fn origin(&self) -> &str;

    fn fetch(&self) -> BoxFuture<'_, Result<String, TopologyLoadError>>;
}

pub struct HttpTopologyFetcher {
    url: String,
    client: reqwest::Client,
}

impl HttpTopologyFetcher {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            client: reqwest::Client::new(),
        }
    }

    pub fn with_timeout(
        url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, TopologyLoadError> {
        let url = url.into();
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TopologyLoadError::Request {
                url: url.clone(),
                reason: e.to_string(),
            })?;
        Ok(Self { url, client })
    }
}

impl TopologyFetcher for HttpTopologyFetcher {
    fn origin(&self) -> &str {
        &self.url
    }

    fn fetch(&self) -> BoxFuture<'_, Result<String, TopologyLoadError>> {
        Box::pin(async move {
            let request_error = |e: reqwest::Error| TopologyLoadError::Request {
                url: self.url.clone(),
                reason: e.to_string(),
            };

            let resp = self.client.get(&self.url).send().await.map_err(request_error)?;
            if !resp.status().is_success() {
                return Err(TopologyLoadError::Status {
                    url: self.url.clone(),
                    status: resp.status().as_u16(),
                });
            }
            resp.text().await.map_err(request_error)
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TopologyState {
    Loading,
    Ready(Arc<FeatureCollection>),
    Unavailable,
}

pub struct TopologySource {
    fetcher: Arc<dyn TopologyFetcher>,
    object_name: String,
    loaded: OnceCell<Result<Arc<FeatureCollection>, TopologyLoadError>>,
}

impl TopologySource {
    pub fn new(fetcher: impl TopologyFetcher + 'static) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
            object_name: DEFAULT_OBJECT.to_string(),
            loaded: OnceCell::new(),
        }
    }

    /// A source that is already resolved, for embedders that ship the topology.
    pub fn ready(features: FeatureCollection) -> Self {
        Self {
            fetcher: Arc::new(NoFetch),
            object_name: DEFAULT_OBJECT.to_string(),
            loaded: OnceCell::new_with(Some(Ok(Arc::new(features)))),
        }
    }

    pub fn with_object_name(mut self, name: impl Into<String>) -> Self {
        self.object_name = name.into();
        self
    }

    /// Fetches and decodes on first call. Concurrent callers await the same
    /// in-flight fetch; later callers get the cached outcome, success or not.
    pub async fn load(&self) -> Result<Arc<FeatureCollection>, TopologyLoadError> {
        self.loaded
            .get_or_init(|| self.fetch_and_decode())
            .await
            .clone()
    }

    pub fn state(&self) -> TopologyState {
        match self.loaded.get() {
            None => TopologyState::Loading,
            Some(Ok(features)) => TopologyState::Ready(features.clone()),
            Some(Err(_)) => TopologyState::Unavailable,
        }
    }

    async fn fetch_and_decode(&self) -> Result<Arc<FeatureCollection>, TopologyLoadError> {
        let origin = self.fetcher.origin().to_string();
        tracing::info!(origin = %origin, "fetching boundary topology");

        let outcome = match self.fetcher.fetch().await {
            Ok(payload) => decode_topology_document(&payload, &self.object_name)
                .map(Arc::new)
                .map_err(TopologyLoadError::from),
            Err(err) => Err(err),
        };

        match &outcome {
            Ok(features) => {
                let countries = features.len();
                tracing::info!(origin = %origin, countries, "boundary topology ready")
            }
            Err(err) => {
                tracing::error!(origin = %origin, error = %err, "boundary topology unavailable")
            }
        }
        outcome
    }
}

struct NoFetch;

impl TopologyFetcher for NoFetch {
    fn origin(&self) -> &str {
        "embedded"
    }

    fn fetch(&self) -> BoxFuture<'_, Result<String, TopologyLoadError>> {
        Box::pin(async {
            Err(TopologyLoadError::Request {
                url: "embedded".to_string(),
                reason: "no fetcher configured".to_string(),
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const TOPOLOGY: &str = r#"{
        "type": "Topology",
        "arcs": [[[0, 0], [10, 0], [10, 10], [0, 10], [0, 0]]],
        "objects": {
            "countries": {
                "type": "GeometryCollection",
                "geometries": [{ "type": "Polygon", "arcs": [[0]], "properties": { "name": "Square" } }]
            }
        }
    }"#;

    struct FakeFetcher {
        calls: Arc<AtomicUsize>,
        response: Result<String, TopologyLoadError>,
    }

    impl TopologyFetcher for FakeFetcher {
        fn origin(&self) -> &str {
            "fake://topology"
        }

        fn fetch(&self) -> BoxFuture<'_, Result<String, TopologyLoadError>> {
            Box::pin(async move {
                self.calls.fetch_add(1, Ordering::SeqCst);
                tokio::task::yield_now().await;
                self.response.clone()
            })
        }
    }

    fn source(response: Result<String, TopologyLoadError>) -> (TopologySource, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let fetcher = FakeFetcher {
            calls: calls.clone(),
            response,
        };
        (TopologySource::new(fetcher), calls)
    }

    #[tokio::test]
    async fn fetches_once_for_concurrent_callers() {
        let (source, calls) = source(Ok(TOPOLOGY.to_string()));
        assert_eq!(source.state(), TopologyState::Loading);

        let (a, b) = tokio::join!(source.load(), source.load());
        let a = a.expect("ready");
        let b = b.expect("ready");
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        source.load().await.expect("cached");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(matches!(
            source.state(),
            TopologyState::Ready(fc) if fc.feature("Square").is_some()
        ));
    }

    #[tokio::test]
    async fn failure_is_terminal() {
        let err = TopologyLoadError::Status {
            url: "fake://topology".into(),
            status: 503,
        };
        let (source, calls) = source(Err(err.clone()));

        assert_eq!(source.load().await.unwrap_err(), err);
        assert_eq!(source.state(), TopologyState::Unavailable);

        assert_eq!(source.load().await.unwrap_err(), err);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn undecodable_payload_is_unavailable() {
        let (source, _) = source(Ok("{ not json".to_string()));
        assert!(matches!(
            source.load().await,
            Err(TopologyLoadError::Decode(TopologyError::Json(_)))
        ));
        assert_eq!(source.state(), TopologyState::Unavailable);
    }

    #[tokio::test]
    async fn preloaded_source_never_fetches() {
        let source = TopologySource::ready(FeatureCollection::default());
        assert!(matches!(source.state(), TopologyState::Ready(_)));
        assert!(source.load().await.expect("ready").is_empty());
    }
}
