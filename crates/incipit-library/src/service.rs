//! The library service: a single-writer actor owning the index snapshot.
//!
//! Each instance runs one worker task with exclusive access to the current
//! snapshot. Operations arrive as messages on a queue and run to completion
//! strictly in arrival order, so snapshot replacement and reads never
//! interleave and no locking is needed. Published snapshots are immutable
//! and `Arc`-shared; a refresh only swaps the pointer.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};

use incipit_core::{Index, Query, SearchResult, Track};

use crate::catalogue::CatalogueReader;
use crate::error::{LibraryError, Result};

enum Request {
    Refresh {
        uri: Option<String>,
        reply: oneshot::Sender<Result<()>>,
    },
    Lookup {
        uri: String,
        reply: oneshot::Sender<Vec<Track>>,
    },
    FindExact {
        query: Query,
        reply: oneshot::Sender<Vec<SearchResult>>,
    },
    Search {
        query: Query,
        reply: oneshot::Sender<Vec<SearchResult>>,
    },
    Close {
        reply: oneshot::Sender<()>,
    },
}

/// Handle to a running library service instance.
///
/// Cheap to clone; all clones feed the same worker. The creator owns the
/// lifecycle: [`Library::close`] stops the worker after the already-queued
/// requests finish, as does dropping every handle. Once the worker is gone,
/// every call fails with [`LibraryError::ServiceUnavailable`].
#[derive(Debug, Clone)]
pub struct Library {
    requests: mpsc::UnboundedSender<Request>,
}

impl Library {
    /// Spawn a service instance reading from `reader`.
    ///
    /// The instance starts empty; queries return empty results until the
    /// first successful [`Library::refresh`]. `provider` identifies this
    /// instance in search results.
    ///
    /// Must be called from within a tokio runtime.
    #[must_use]
    pub fn spawn(provider: impl Into<String>, reader: Arc<dyn CatalogueReader>) -> Self {
        let (requests, inbox) = mpsc::unbounded_channel();
        let worker = Worker {
            provider: provider.into(),
            reader,
            snapshot: None,
        };
        tokio::spawn(worker.run(inbox));
        Self { requests }
    }

    /// Rebuild the index from the catalogue, or re-resolve a single uri.
    ///
    /// A full refresh (`uri` = `None`) reads the whole catalogue and swaps
    /// in a fresh snapshot. With a uri, the catalogue is still re-read but
    /// only that uri's entry changes in the derived snapshot; a uri no
    /// longer present in the catalogue is removed.
    ///
    /// # Errors
    /// [`LibraryError::SourceUnavailable`] when the catalogue cannot be
    /// read; the previous snapshot, if any, stays published.
    /// [`LibraryError::ServiceUnavailable`] when the worker is gone.
    pub async fn refresh(&self, uri: Option<&str>) -> Result<()> {
        let uri = uri.map(str::to_string);
        self.request(|reply| Request::Refresh { uri, reply }).await?
    }

    /// All tracks registered under `uri`, in catalogue order.
    ///
    /// An unknown uri yields an empty sequence.
    ///
    /// # Errors
    /// [`LibraryError::ServiceUnavailable`] when the worker is gone.
    pub async fn lookup(&self, uri: &str) -> Result<Vec<Track>> {
        let uri = uri.to_string();
        self.request(|reply| Request::Lookup { uri, reply }).await
    }

    /// Exact-match query against the current snapshot.
    ///
    /// Produces exactly one [`SearchResult`] for this instance, with an
    /// empty track list when nothing matches.
    ///
    /// # Errors
    /// [`LibraryError::ServiceUnavailable`] when the worker is gone.
    pub async fn find_exact(&self, query: Query) -> Result<Vec<SearchResult>> {
        self.request(|reply| Request::FindExact { query, reply })
            .await
    }

    /// Fuzzy query against the current snapshot; same shape guarantees as
    /// [`Library::find_exact`].
    ///
    /// # Errors
    /// [`LibraryError::ServiceUnavailable`] when the worker is gone.
    pub async fn search(&self, query: Query) -> Result<Vec<SearchResult>> {
        self.request(|reply| Request::Search { query, reply }).await
    }

    /// Stop the worker after the already-queued requests finish.
    ///
    /// # Errors
    /// [`LibraryError::ServiceUnavailable`] when the worker was already
    /// gone.
    pub async fn close(&self) -> Result<()> {
        self.request(|reply| Request::Close { reply }).await
    }

    async fn request<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<T>) -> Request,
    ) -> Result<T> {
        let (reply, response) = oneshot::channel();
        self.requests
            .send(make(reply))
            .map_err(|_| LibraryError::ServiceUnavailable)?;
        response.await.map_err(|_| LibraryError::ServiceUnavailable)
    }
}

/// The worker task: exclusive owner of the current snapshot.
#[derive(Debug)]
struct Worker {
    provider: String,
    reader: Arc<dyn CatalogueReader>,
    snapshot: Option<Arc<Index>>,
}

impl Worker {
    async fn run(mut self, mut inbox: mpsc::UnboundedReceiver<Request>) {
        while let Some(request) = inbox.recv().await {
            match request {
                Request::Refresh { uri, reply } => {
                    let outcome = self.refresh(uri).await;
                    let fatal = outcome.as_ref().err().is_some_and(LibraryError::is_fatal);
                    if reply.send(outcome).is_err() {
                        log::debug!("{}: refresh caller went away", self.provider);
                    }
                    if fatal {
                        break;
                    }
                }
                Request::Lookup { uri, reply } => {
                    let tracks = self
                        .snapshot
                        .as_ref()
                        .map(|snapshot| snapshot.lookup(&uri))
                        .unwrap_or_default();
                    if reply.send(tracks).is_err() {
                        log::debug!("{}: lookup caller went away", self.provider);
                    }
                }
                Request::FindExact { query, reply } => {
                    let tracks = self
                        .snapshot
                        .as_ref()
                        .map(|snapshot| snapshot.find_exact(&query))
                        .unwrap_or_default();
                    if reply.send(self.wrap(tracks)).is_err() {
                        log::debug!("{}: find_exact caller went away", self.provider);
                    }
                }
                Request::Search { query, reply } => {
                    let tracks = self
                        .snapshot
                        .as_ref()
                        .map(|snapshot| snapshot.search(&query))
                        .unwrap_or_default();
                    if reply.send(self.wrap(tracks)).is_err() {
                        log::debug!("{}: search caller went away", self.provider);
                    }
                }
                Request::Close { reply } => {
                    if reply.send(()).is_err() {
                        log::debug!("{}: close caller went away", self.provider);
                    }
                    break;
                }
            }
        }
        log::debug!("Library worker for {} stopped", self.provider);
    }

    /// One result per instance, empty or not.
    fn wrap(&self, tracks: Vec<Track>) -> Vec<SearchResult> {
        vec![SearchResult::new(self.provider.clone(), tracks)]
    }

    async fn refresh(&mut self, uri: Option<String>) -> Result<()> {
        let started = std::time::Instant::now();
        let reader = Arc::clone(&self.reader);
        let loaded = tokio::task::spawn_blocking(move || reader.load()).await;
        let records = match loaded {
            Ok(Ok(records)) => records,
            Ok(Err(err)) => {
                log::warn!("{}: refresh failed: {err}", self.provider);
                return Err(err);
            }
            Err(join_err) => {
                log::error!("{}: catalogue load did not complete: {join_err}", self.provider);
                return Err(LibraryError::ServiceUnavailable);
            }
        };

        let next = match uri {
            None => Index::build(records),
            Some(uri) => self.rederive(&uri, records),
        };
        log::info!(
            "{}: indexed {} tracks in {:?}",
            self.provider,
            next.len(),
            started.elapsed()
        );
        self.snapshot = Some(Arc::new(next));
        Ok(())
    }

    /// Derive the next snapshot from the current one with only `uri`'s
    /// entry re-resolved against `records`.
    ///
    /// Fresh records replace the old ones at their first old position, are
    /// appended when the uri is new, and are dropped when the uri has left
    /// the catalogue.
    fn rederive(&self, uri: &str, records: Vec<Track>) -> Index {
        let fresh: Vec<Track> = records.into_iter().filter(|t| t.uri == uri).collect();
        let current: Vec<Track> = self
            .snapshot
            .as_ref()
            .map(|snapshot| snapshot.tracks().to_vec())
            .unwrap_or_default();

        let mut next = Vec::with_capacity(current.len() + fresh.len());
        let mut placed = false;
        for track in current {
            if track.uri == uri {
                if !placed {
                    next.extend(fresh.iter().cloned());
                    placed = true;
                }
            } else {
                next.push(track);
            }
        }
        if !placed {
            next.extend(fresh);
        }
        Index::build(next)
    }
}
