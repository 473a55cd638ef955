//! Loading of the datasets.
//!
//! A [DatasetCache] owns every payload fetched through it. Concurrent requests
//! for the same dataset wait on a single fetch. A successful payload stays in
//! the cache until [DatasetCache::clear]; a failed fetch is handed to every
//! waiter and then forgotten, so that the next request fetches again.

use futures::future::{BoxFuture, FutureExt, Shared};
use log::{debug, info, warn};
use serde::Deserialize;
use serde_json::Value as JSValue;
use snafu::prelude::*;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::model::Record;

#[derive(Debug, Clone, PartialEq, Eq, Snafu)]
#[snafu(visibility(pub))]
pub enum LoadError {
    #[snafu(display("fetching {name}: HTTP status {status}"))]
    Status { name: String, status: u16 },
    #[snafu(display("fetching {name}: {message}"))]
    Transport { name: String, message: String },
    #[snafu(display("reading {name}: {message}"))]
    Io { name: String, message: String },
    #[snafu(display("decoding {name}: {message}"))]
    Parse { name: String, message: String },
}

pub type Payload = Arc<JSValue>;

type SharedFetch = Shared<BoxFuture<'static, Result<Payload, LoadError>>>;

/// Where the raw dataset payloads come from.
pub trait DatasetSource: Send + Sync {
    fn fetch(&self, name: &str) -> BoxFuture<'static, Result<JSValue, LoadError>>;
}

/// Fetches `<base>/data/<name>.json`.
pub struct HttpSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpSource {
    pub fn new(base_url: &str) -> HttpSource {
        HttpSource {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn url(&self, name: &str) -> String {
        format!("{}/data/{}.json", self.base_url, name)
    }
}

async fn get_json(
    client: reqwest::Client,
    url: String,
    name: String,
) -> Result<JSValue, LoadError> {
    debug!("GET {}", url);
    let resp = client.get(&url).send().await.map_err(|e| LoadError::Transport {
        name: name.clone(),
        message: e.to_string(),
    })?;
    let status = resp.status();
    ensure!(
        status.is_success(),
        StatusSnafu {
            name: name.clone(),
            status: status.as_u16()
        }
    );
    let text = resp.text().await.map_err(|e| LoadError::Transport {
        name: name.clone(),
        message: e.to_string(),
    })?;
    serde_json::from_str(&text).map_err(|e| LoadError::Parse {
        name,
        message: e.to_string(),
    })
}

impl DatasetSource for HttpSource {
    fn fetch(&self, name: &str) -> BoxFuture<'static, Result<JSValue, LoadError>> {
        get_json(self.client.clone(), self.url(name), name.to_string()).boxed()
    }
}

/// Reads `<dir>/<name>.json`.
pub struct DirSource {
    dir: PathBuf,
}

impl DirSource {
    pub fn new(dir: impl Into<PathBuf>) -> DirSource {
        DirSource { dir: dir.into() }
    }
}

async fn read_json(path: PathBuf, name: String) -> Result<JSValue, LoadError> {
    debug!("reading {:?}", path);
    let text = tokio::fs::read_to_string(&path)
        .await
        .map_err(|e| LoadError::Io {
            name: name.clone(),
            message: format!("{}: {}", path.display(), e),
        })?;
    serde_json::from_str(&text).map_err(|e| LoadError::Parse {
        name,
        message: e.to_string(),
    })
}

impl DatasetSource for DirSource {
    fn fetch(&self, name: &str) -> BoxFuture<'static, Result<JSValue, LoadError>> {
        let path = self.dir.join(format!("{}.json", name));
        read_json(path, name.to_string()).boxed()
    }
}

/// Selects the source of the datasets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoaderConfig {
    Directory(PathBuf),
    BaseUrl(String),
}

impl LoaderConfig {
    pub fn source(&self) -> Arc<dyn DatasetSource> {
        match self {
            LoaderConfig::Directory(dir) => Arc::new(DirSource::new(dir.clone())),
            LoaderConfig::BaseUrl(url) => Arc::new(HttpSource::new(url)),
        }
    }

    pub fn cache(&self) -> DatasetCache {
        DatasetCache::new(self.source())
    }
}

/// Decodes a payload into records and normalizes them.
pub fn decode<T: Record>(payload: &JSValue) -> Result<Vec<T>, LoadError> {
    let rows = Vec::<T>::deserialize(payload).map_err(|e| LoadError::Parse {
        name: T::DATASET.to_string(),
        message: e.to_string(),
    })?;
    Ok(rows.into_iter().map(T::normalize).collect())
}

pub struct DatasetCache {
    source: Arc<dyn DatasetSource>,
    entries: Mutex<HashMap<String, SharedFetch>>,
}

impl DatasetCache {
    pub fn new(source: Arc<dyn DatasetSource>) -> DatasetCache {
        DatasetCache {
            source,
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, SharedFetch>> {
        // The map is left consistent by every holder of the lock.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// The raw payload of a dataset, fetched at most once at a time.
    pub async fn get_raw(&self, name: &str) -> Result<Payload, LoadError> {
        let fetch = {
            let mut entries = self.entries();
            match entries.get(name) {
                Some(f) => {
                    debug!("get_raw: {} already requested", name);
                    f.clone()
                }
                None => {
                    info!("loading dataset {}", name);
                    let f = self
                        .source
                        .fetch(name)
                        .map(|r| r.map(Arc::new))
                        .boxed()
                        .shared();
                    entries.insert(name.to_string(), f.clone());
                    f
                }
            }
        };
        let res = fetch.clone().await;
        if let Err(e) = &res {
            let mut entries = self.entries();
            // Another request may have replaced the entry already.
            if entries
                .get(name)
                .map(|f| Shared::ptr_eq(f, &fetch))
                .unwrap_or(false)
            {
                warn!("get_raw: dropping failed fetch of {}: {}", name, e);
                entries.remove(name);
            }
        }
        res
    }

    pub async fn load<T: Record>(&self) -> Result<Vec<T>, LoadError> {
        let payload = self.get_raw(T::DATASET.file_name()).await?;
        let rows = decode::<T>(&payload)?;
        debug!("load: {} records from {}", rows.len(), T::DATASET);
        Ok(rows)
    }

    pub fn clear(&self) {
        self.entries().clear();
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }
}

/// The loading state of one dataset, as seen by one consumer.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadState<T> {
    pub data: Option<Vec<T>>,
    pub loading: bool,
    pub error: Option<LoadError>,
}

impl<T> Default for LoadState<T> {
    fn default() -> Self {
        LoadState {
            data: None,
            loading: false,
            error: None,
        }
    }
}

impl<T> LoadState<T> {
    pub fn is_loaded(&self) -> bool {
        self.data.is_some()
    }
}

/// A consumer of one dataset.
///
/// Once [DatasetView::unmount] has been called, a response still in flight is
/// dropped instead of being committed.
pub struct DatasetView<T> {
    state: Arc<Mutex<LoadState<T>>>,
    mounted: Arc<AtomicBool>,
}

impl<T> Clone for DatasetView<T> {
    fn clone(&self) -> Self {
        DatasetView {
            state: self.state.clone(),
            mounted: self.mounted.clone(),
        }
    }
}

impl<T: Record> Default for DatasetView<T> {
    fn default() -> Self {
        DatasetView::new()
    }
}

impl<T: Record> DatasetView<T> {
    pub fn new() -> DatasetView<T> {
        DatasetView {
            state: Arc::new(Mutex::new(LoadState::default())),
            mounted: Arc::new(AtomicBool::new(true)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, LoadState<T>> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn state(&self) -> LoadState<T> {
        self.lock().clone()
    }

    pub fn unmount(&self) {
        self.mounted.store(false, Ordering::SeqCst);
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.load(Ordering::SeqCst)
    }

    pub async fn load(&self, cache: &DatasetCache) {
        self.lock().loading = true;
        let res = cache.load::<T>().await;
        if !self.is_mounted() {
            debug!("load: {} arrived after unmount, ignored", T::DATASET);
            return;
        }
        let mut state = self.lock();
        state.loading = false;
        match res {
            Ok(rows) => {
                state.data = Some(rows);
                state.error = None;
            }
            Err(e) => {
                state.data = None;
                state.error = Some(e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{PartySymbol, PoliticalHistory};
    use serde_json::json;
    use std::sync::atomic::AtomicUsize;
    use tokio::sync::Notify;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    struct GatedSource {
        calls: AtomicUsize,
        failures: usize,
        gate: Arc<Notify>,
        payload: JSValue,
    }

    impl GatedSource {
        fn new(payload: JSValue, failures: usize) -> GatedSource {
            GatedSource {
                calls: AtomicUsize::new(0),
                failures,
                gate: Arc::new(Notify::new()),
                payload,
            }
        }

        fn open(&self) -> Arc<Notify> {
            self.gate.clone()
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl DatasetSource for GatedSource {
        fn fetch(&self, name: &str) -> BoxFuture<'static, Result<JSValue, LoadError>> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            let fail = n < self.failures;
            let gate = self.gate.clone();
            let payload = self.payload.clone();
            let name = name.to_string();
            async move {
                gate.notified().await;
                if fail {
                    StatusSnafu { name, status: 503u16 }.fail()
                } else {
                    Ok(payload)
                }
            }
            .boxed()
        }
    }

    fn symbols() -> JSValue {
        json!([{"party_name_en": "A", "symbol_url": "/a.png"}])
    }

    #[tokio::test]
    async fn concurrent_requests_share_one_fetch() {
        init();
        let source = Arc::new(GatedSource::new(symbols(), 0));
        let cache = DatasetCache::new(source.clone());
        let gate = source.open();
        let (a, b) = tokio::join!(cache.load::<PartySymbol>(), async {
            gate.notify_one();
            cache.load::<PartySymbol>().await
        });
        assert_eq!(source.calls(), 1);
        assert_eq!(a.unwrap(), b.unwrap());

        // Resolved payloads stay cached.
        let c = cache.load::<PartySymbol>().await.unwrap();
        assert_eq!(c.len(), 1);
        assert_eq!(source.calls(), 1);

        cache.clear();
        assert!(cache.is_empty());
        gate.notify_one();
        cache.load::<PartySymbol>().await.unwrap();
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn failed_fetch_is_retried() {
        init();
        let source = Arc::new(GatedSource::new(symbols(), 1));
        let cache = DatasetCache::new(source.clone());
        let gate = source.open();
        gate.notify_one();
        let err = cache.load::<PartySymbol>().await.unwrap_err();
        assert_eq!(
            err,
            LoadError::Status {
                name: "political_party_symbols".to_string(),
                status: 503
            }
        );
        assert!(cache.is_empty());
        gate.notify_one();
        assert!(cache.load::<PartySymbol>().await.is_ok());
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn wrong_shape_is_a_parse_error() {
        let source = Arc::new(GatedSource::new(json!({"not": "a list"}), 0));
        let cache = DatasetCache::new(source.clone());
        source.open().notify_one();
        let err = cache.load::<PoliticalHistory>().await.unwrap_err();
        assert!(matches!(err, LoadError::Parse { .. }));
    }

    #[tokio::test]
    async fn late_response_after_unmount_is_ignored() {
        init();
        let source = Arc::new(GatedSource::new(symbols(), 0));
        let cache = Arc::new(DatasetCache::new(source.clone()));
        let view: DatasetView<PartySymbol> = DatasetView::new();

        let task = {
            let view = view.clone();
            let cache = cache.clone();
            tokio::spawn(async move { view.load(&cache).await })
        };
        tokio::task::yield_now().await;
        view.unmount();
        source.open().notify_one();
        task.await.unwrap();
        let state = view.state();
        assert!(state.data.is_none());
        assert!(state.error.is_none());

        let mounted: DatasetView<PartySymbol> = DatasetView::new();
        mounted.load(&cache).await;
        let state = mounted.state();
        assert!(state.is_loaded());
        assert!(!state.loading);
        assert_eq!(state.data.map(|d| d.len()), Some(1));
    }

    #[tokio::test]
    async fn reads_from_a_directory() {
        let dir = std::env::temp_dir().join(format!("election_lookup_{}", std::process::id()));
        tokio::fs::create_dir_all(&dir).await.unwrap();
        tokio::fs::write(
            dir.join("political_party_symbols.json"),
            symbols().to_string(),
        )
        .await
        .unwrap();
        let cache = LoaderConfig::Directory(dir.clone()).cache();
        let rows = cache.load::<PartySymbol>().await.unwrap();
        assert_eq!(rows[0].symbol_url.as_deref(), Some("/a.png"));
        let err = cache.load::<PoliticalHistory>().await.unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }

    #[test]
    fn http_urls() {
        let s = HttpSource::new("https://example.org/");
        assert_eq!(
            s.url("dim_parties_profile"),
            "https://example.org/data/dim_parties_profile.json"
        );
    }
}
