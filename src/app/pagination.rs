use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use thiserror::Error;

use super::queue::{ItemPayload, Queue};

/// One page of queue items as served by the `more` endpoint
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Batch {
    /// Authoritative number of items checked out to this reviewer
    pub count: usize,
    #[serde(default)]
    pub items: Vec<ItemPayload>,
    /// Server notice, e.g. when the reviewer holds the maximum number of locks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server answered {0}")]
    Status(reqwest::StatusCode),
    #[error("could not read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed batch: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("fetch worker exited without a result")]
    Disconnected,
}

/// Where additional queue pages come from
pub trait PageSource: Send + Sync {
    /// Fetch the next batch, keyed by the current total count
    fn fetch(&self, count: usize) -> Result<Batch, FetchError>;

    /// Short label for the top bar and logs
    fn describe(&self) -> String;
}

// ── HTTP ──

pub struct HttpSource {
    url: String,
    client: reqwest::blocking::Client,
}

impl HttpSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::blocking::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            url: url.into(),
            client,
        })
    }
}

impl PageSource for HttpSource {
    fn fetch(&self, count: usize) -> Result<Batch, FetchError> {
        tracing::debug!(url = %self.url, count, "requesting queue page");
        let response = self
            .client
            .get(&self.url)
            .query(&[("count", count)])
            .send()?;
        if !response.status().is_success() {
            return Err(FetchError::Status(response.status()));
        }
        Ok(response.json::<Batch>()?)
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

// ── Local pool ──

/// Serves pages out of a JSON array of items on disk
pub struct FileSource {
    path: PathBuf,
    batch_size: usize,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>, batch_size: usize) -> Self {
        Self {
            path: path.into(),
            batch_size: batch_size.max(1),
        }
    }

    fn read_pool(&self) -> Result<Vec<ItemPayload>, FetchError> {
        let content = std::fs::read_to_string(&self.path).map_err(|source| FetchError::Io {
            path: self.path.clone(),
            source,
        })?;
        Ok(serde_json::from_str(&content)?)
    }
}

impl PageSource for FileSource {
    fn fetch(&self, count: usize) -> Result<Batch, FetchError> {
        let pool = self.read_pool()?;
        let start = count.min(pool.len());
        let end = (start + self.batch_size).min(pool.len());

        let items: Vec<ItemPayload> = pool[start..end]
            .iter()
            .cloned()
            .enumerate()
            .map(|(k, mut item)| {
                item.form_index = k;
                item
            })
            .collect();

        let message = if items.is_empty() {
            Some("No more items in the pool".to_string())
        } else {
            None
        };

        Ok(Batch {
            count: count + items.len(),
            items,
            message,
        })
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

// ── Loader ──

/// Single-flight fetcher. The receiver of the worker's channel doubles as the
/// in-flight lock: a request is outstanding exactly while it is held.
pub struct Loader {
    source: Arc<dyn PageSource>,
    in_flight: Option<Receiver<Result<Batch, FetchError>>>,
    requests_issued: usize,
}

impl Loader {
    pub fn new(source: Arc<dyn PageSource>) -> Self {
        Self {
            source,
            in_flight: None,
            requests_issued: 0,
        }
    }

    pub fn describe(&self) -> String {
        self.source.describe()
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Requests that actually reached the source
    #[cfg(test)]
    pub fn requests_issued(&self) -> usize {
        self.requests_issued
    }

    /// Blocking first page, fetched before the UI starts
    pub fn load_initial(&mut self) -> Result<Batch, FetchError> {
        self.requests_issued += 1;
        self.source.fetch(0)
    }

    /// Start a background fetch for the next page if the queue allows one.
    /// Returns true when a request was issued.
    pub fn request_more(&mut self, queue: &Queue) -> bool {
        if self.in_flight.is_some() {
            tracing::debug!("fetch already in flight");
            return false;
        }
        if !queue.has_room() {
            tracing::debug!(len = queue.len(), "queue at materialization ceiling");
            return false;
        }
        if !queue.all_reviewed() {
            return false;
        }

        let (tx, rx) = mpsc::channel();
        let source = Arc::clone(&self.source);
        let count = queue.total_count;
        thread::spawn(move || {
            let result = source.fetch(count);
            let _ = tx.send(result);
        });

        self.in_flight = Some(rx);
        self.requests_issued += 1;
        tracing::info!(count, issued = self.requests_issued, "requesting more items");
        true
    }

    /// Non-blocking check for a finished fetch. Any outcome releases the lock.
    pub fn poll(&mut self) -> Option<Result<Batch, FetchError>> {
        let rx = self.in_flight.as_ref()?;
        match rx.try_recv() {
            Ok(result) => {
                self.in_flight = None;
                Some(result)
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                self.in_flight = None;
                Some(Err(FetchError::Disconnected))
            }
        }
    }

    /// Block until the outstanding fetch finishes
    #[cfg(test)]
    pub fn wait(&mut self) -> Option<Result<Batch, FetchError>> {
        let rx = self.in_flight.take()?;
        Some(
            rx.recv_timeout(Duration::from_secs(5))
                .unwrap_or(Err(FetchError::Disconnected)),
        )
    }
}
