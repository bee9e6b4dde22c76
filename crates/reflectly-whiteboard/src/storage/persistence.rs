//! Local-first persistence with best-effort remote mirroring.
//!
//! The local store is authoritative for the running session: its errors are
//! returned. The remote store is a mirror keyed by owner identity. Its write
//! is handed back as a detached [`RemoteWrite`] for the host to spawn, so a
//! slow or hung remote never holds up the local save; its errors are logged
//! and dropped, and the next debounced save retries with the current state.
//! Saves are last-write-wins; there is no version check.

use super::{
    BoxFuture, Debouncer, Duration, Instant, MemoryStorage, Storage, StorageError, StorageResult,
};
use crate::config::EditorConfig;
use crate::document::Document;
use std::sync::Arc;

/// Prefix of local storage keys.
pub const LOCAL_KEY_PREFIX: &str = "whiteboard";

/// Owner segment used when no identity is available.
pub const ANONYMOUS_OWNER: &str = "anonymous";

/// Local storage key for an owner: `whiteboard:<owner>` or `whiteboard:anonymous`.
pub fn local_key(owner: Option<&str>) -> String {
    format!("{}:{}", LOCAL_KEY_PREFIX, owner.unwrap_or(ANONYMOUS_OWNER))
}

/// Pending remote mirror write returned by [`PersistenceAdapter::save`].
///
/// Owns everything it needs. Spawn it on the host's executor (or drop it to
/// skip the mirror); it never fails, remote errors are logged.
pub type RemoteWrite = BoxFuture<'static, ()>;

/// Loads and saves one whiteboard through a local and an optional remote store.
pub struct PersistenceAdapter<L: Storage, R: Storage = MemoryStorage> {
    local: Arc<L>,
    remote: Option<Arc<R>>,
    owner: Option<String>,
    debounce: Debouncer,
    dirty: bool,
    last_save: Option<Instant>,
}

impl<L: Storage> PersistenceAdapter<L> {
    /// Adapter with only a local store.
    pub fn local_only(local: Arc<L>, debounce: Duration) -> Self {
        Self::new(local, None, debounce)
    }
}

impl<L: Storage, R: Storage + 'static> PersistenceAdapter<L, R> {
    pub fn new(local: Arc<L>, remote: Option<Arc<R>>, debounce: Duration) -> Self {
        Self {
            local,
            remote,
            owner: None,
            debounce: Debouncer::new(debounce),
            dirty: false,
            last_save: None,
        }
    }

    /// Adapter debounced by the editor's `autosave_debounce_ms`.
    pub fn from_config(local: Arc<L>, remote: Option<Arc<R>>, config: &EditorConfig) -> Self {
        Self::new(local, remote, config.autosave_debounce())
    }

    /// Set the owner identity (builder style).
    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    pub fn set_owner(&mut self, owner: Option<String>) {
        self.owner = owner;
    }

    pub fn owner(&self) -> Option<&str> {
        self.owner.as_deref()
    }

    /// Key of this whiteboard in the local store.
    pub fn local_key(&self) -> String {
        local_key(self.owner.as_deref())
    }

    /// Read the persisted document.
    ///
    /// Tries the local store, then (with an owner) the remote store. A remote
    /// hit is written through to the local store. Unreadable data and store
    /// failures count as a miss, so `None` means "start empty".
    pub async fn load(&self) -> Option<Document> {
        let key = self.local_key();
        match self.local.load(&key).await {
            Ok(document) => {
                log::info!("Loaded whiteboard {} from local store", key);
                return Some(document);
            }
            Err(StorageError::NotFound(_)) => {}
            Err(e) => log::warn!("Ignoring unreadable local whiteboard {}: {}", key, e),
        }

        let (Some(remote), Some(owner)) = (self.remote.as_ref(), self.owner.as_deref()) else {
            return None;
        };
        match remote.load(owner).await {
            Ok(document) => {
                log::info!("Loaded whiteboard for {} from remote store", owner);
                if let Err(e) = self.local.save(&key, &document).await {
                    log::warn!("Failed to cache remote whiteboard locally: {}", e);
                }
                Some(document)
            }
            Err(StorageError::NotFound(_)) => None,
            Err(e) => {
                log::warn!("Remote load failed for {}: {}", owner, e);
                None
            }
        }
    }

    /// Record a mutation at `now`, (re)arming the debounce.
    pub fn mark_dirty(&mut self, now: Instant) {
        self.dirty = true;
        self.debounce.schedule(now);
    }

    /// Whether there are unsaved changes.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Whether a debounced save is scheduled.
    pub fn is_pending(&self) -> bool {
        self.debounce.is_pending()
    }

    /// When the scheduled save becomes due.
    pub fn deadline(&self) -> Option<Instant> {
        self.debounce.deadline()
    }

    pub fn last_save(&self) -> Option<Instant> {
        self.last_save
    }

    /// Save now: write the local store, then hand back the remote upsert.
    ///
    /// Only the local write can fail the call. A failed local write leaves
    /// the adapter dirty. The returned [`RemoteWrite`] is a no-op without a
    /// remote store or owner.
    pub async fn save(&mut self, document: &Document) -> StorageResult<RemoteWrite> {
        self.debounce.cancel();
        let key = self.local_key();
        self.local.save(&key, document).await?;
        self.dirty = false;
        self.last_save = Some(Instant::now());
        log::debug!("Saved whiteboard {}", key);
        Ok(self.remote_write(document))
    }

    /// Save if the debounce has elapsed at `now`. Returns the remote write
    /// when it saved.
    pub async fn maybe_save(
        &mut self,
        now: Instant,
        document: &Document,
    ) -> StorageResult<Option<RemoteWrite>> {
        if !self.debounce.take_due(now) {
            return Ok(None);
        }
        self.save(document).await.map(Some)
    }

    fn remote_write(&self, document: &Document) -> RemoteWrite {
        let (Some(remote), Some(owner)) = (self.remote.clone(), self.owner.clone()) else {
            return Box::pin(std::future::ready(()));
        };
        let document = document.clone();
        Box::pin(async move {
            match remote.save(&owner, &document).await {
                Ok(()) => log::debug!("Mirrored whiteboard for {} to remote store", owner),
                Err(e) => log::warn!("Remote save failed for {}: {}", owner, e),
            }
        })
    }

    /// Teardown: cancel the pending debounce and flush to the local store.
    ///
    /// The remote store is not written; the next session's save mirrors it.
    pub async fn shutdown(&mut self, document: &Document) -> StorageResult<()> {
        self.debounce.cancel();
        let key = self.local_key();
        self.local.save(&key, document).await?;
        self.dirty = false;
        self.last_save = Some(Instant::now());
        log::info!("Flushed whiteboard {} on shutdown", key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{Shape, ShapeKind};
    use crate::storage::block_on;
    use kurbo::Point;
    use std::future::Future;
    use std::task::{Context, Waker};

    const DEBOUNCE: Duration = Duration::from_millis(800);

    /// A store whose every call fails.
    struct FailingStorage;

    impl Storage for FailingStorage {
        fn save(&self, _id: &str, _document: &Document) -> BoxFuture<'_, StorageResult<()>> {
            Box::pin(async { Err(StorageError::Other("offline".into())) })
        }

        fn load(&self, _id: &str) -> BoxFuture<'_, StorageResult<Document>> {
            Box::pin(async { Err(StorageError::Other("offline".into())) })
        }
    }

    /// A store whose calls never complete.
    struct HungStorage;

    impl Storage for HungStorage {
        fn save(&self, _id: &str, _document: &Document) -> BoxFuture<'_, StorageResult<()>> {
            Box::pin(std::future::pending())
        }

        fn load(&self, _id: &str) -> BoxFuture<'_, StorageResult<Document>> {
            Box::pin(std::future::pending())
        }
    }

    fn sample() -> Document {
        let mut doc = Document::new();
        doc.shapes
            .add(Shape::new(ShapeKind::Rectangle, Point::new(100.0, 100.0), 150.0, 60.0));
        doc
    }

    #[test]
    fn test_local_key() {
        assert_eq!(local_key(Some("alice")), "whiteboard:alice");
        assert_eq!(local_key(None), "whiteboard:anonymous");
    }

    #[test]
    fn test_load_miss_is_none() {
        let adapter = PersistenceAdapter::local_only(Arc::new(MemoryStorage::new()), DEBOUNCE);
        assert!(block_on(adapter.load()).is_none());
    }

    #[test]
    fn test_save_then_load_local() {
        let local = Arc::new(MemoryStorage::new());
        let mut adapter = PersistenceAdapter::local_only(local.clone(), DEBOUNCE);
        let doc = sample();

        block_on(block_on(adapter.save(&doc)).unwrap());
        assert!(local.contains("whiteboard:anonymous"));
        assert_eq!(block_on(adapter.load()), Some(doc));
    }

    #[test]
    fn test_remote_fallback_writes_through() {
        let local = Arc::new(MemoryStorage::new());
        let remote = Arc::new(MemoryStorage::new());
        let doc = sample();
        block_on(remote.save("alice", &doc)).unwrap();

        let adapter =
            PersistenceAdapter::new(local.clone(), Some(remote), DEBOUNCE).with_owner("alice");
        assert_eq!(block_on(adapter.load()), Some(doc.clone()));
        assert_eq!(block_on(local.load("whiteboard:alice")).ok(), Some(doc));
    }

    #[test]
    fn test_remote_skipped_without_owner() {
        let remote = Arc::new(MemoryStorage::new());
        block_on(remote.save("alice", &sample())).unwrap();

        let adapter = PersistenceAdapter::new(Arc::new(MemoryStorage::new()), Some(remote), DEBOUNCE);
        assert!(block_on(adapter.load()).is_none());
    }

    #[test]
    fn test_remote_failures_are_swallowed() {
        let local = Arc::new(MemoryStorage::new());
        let mut adapter = PersistenceAdapter::new(local.clone(), Some(Arc::new(FailingStorage)), DEBOUNCE)
            .with_owner("alice");

        assert!(block_on(adapter.load()).is_none());

        let doc = sample();
        let remote_write = block_on(adapter.save(&doc)).unwrap();
        block_on(remote_write);
        assert!(!adapter.is_dirty());
        assert_eq!(block_on(local.load("whiteboard:alice")).ok(), Some(doc));
    }

    #[test]
    fn test_save_mirrors_to_remote() {
        let local = Arc::new(MemoryStorage::new());
        let remote = Arc::new(MemoryStorage::new());
        let mut adapter = PersistenceAdapter::new(local, Some(remote.clone()), DEBOUNCE)
            .with_owner("alice");
        let doc = sample();

        let remote_write = block_on(adapter.save(&doc)).unwrap();
        // Nothing reaches the remote until the host runs the write.
        assert!(!remote.contains("alice"));
        block_on(remote_write);
        assert_eq!(block_on(remote.load("alice")).ok(), Some(doc));
    }

    #[test]
    fn test_hung_remote_does_not_block_save() {
        let local = Arc::new(MemoryStorage::new());
        let mut adapter = PersistenceAdapter::new(local.clone(), Some(Arc::new(HungStorage)), DEBOUNCE)
            .with_owner("alice");
        let doc = sample();
        let mut cx = Context::from_waker(Waker::noop());

        adapter.mark_dirty(Instant::now());
        let mut save = Box::pin(adapter.save(&doc));
        let std::task::Poll::Ready(result) = save.as_mut().poll(&mut cx) else {
            panic!("local save should complete without waiting on the remote");
        };
        drop(save);
        let mut remote_write = result.unwrap();
        assert!(remote_write.as_mut().poll(&mut cx).is_pending());

        assert!(!adapter.is_dirty());
        assert_eq!(block_on(local.load("whiteboard:alice")).ok(), Some(doc.clone()));

        // The next edit can be saved while the first mirror is still pending.
        let mut edited = doc;
        edited
            .shapes
            .add(Shape::new(ShapeKind::Circle, Point::ZERO, 10.0, 10.0));
        adapter.mark_dirty(Instant::now());
        let _second = block_on(adapter.save(&edited)).unwrap();
        assert_eq!(block_on(local.load("whiteboard:alice")).ok(), Some(edited));
    }

    #[test]
    fn test_local_failure_is_returned() {
        let mut adapter = PersistenceAdapter::local_only(Arc::new(FailingStorage), DEBOUNCE);
        adapter.mark_dirty(Instant::now());

        assert!(block_on(adapter.save(&sample())).is_err());
        assert!(adapter.is_dirty());
        // Load degrades to a miss.
        assert!(block_on(adapter.load()).is_none());
    }

    #[test]
    fn test_debounced_save() {
        let local = Arc::new(MemoryStorage::new());
        let mut adapter = PersistenceAdapter::local_only(local.clone(), DEBOUNCE);
        let doc = sample();
        let t0 = Instant::now();

        adapter.mark_dirty(t0);
        adapter.mark_dirty(t0 + Duration::from_millis(400));
        assert!(block_on(adapter.maybe_save(t0 + DEBOUNCE, &doc)).unwrap().is_none());
        assert!(!local.contains("whiteboard:anonymous"));

        let saved = block_on(adapter.maybe_save(t0 + Duration::from_millis(1200), &doc)).unwrap();
        assert!(saved.is_some());
        assert!(!adapter.is_dirty());
        assert!(!adapter.is_pending());
        assert!(local.contains("whiteboard:anonymous"));
    }

    #[test]
    fn test_from_config_uses_autosave_debounce() {
        let config = EditorConfig {
            autosave_debounce_ms: 250,
            ..EditorConfig::default()
        };
        let mut adapter: PersistenceAdapter<MemoryStorage> =
            PersistenceAdapter::from_config(Arc::new(MemoryStorage::new()), None, &config);
        let t0 = Instant::now();

        adapter.mark_dirty(t0);
        assert_eq!(adapter.deadline(), Some(t0 + Duration::from_millis(250)));
        let early = block_on(adapter.maybe_save(t0 + Duration::from_millis(249), &sample()));
        assert!(early.unwrap().is_none());
        let due = block_on(adapter.maybe_save(t0 + Duration::from_millis(250), &sample()));
        assert!(due.unwrap().is_some());
    }

    #[test]
    fn test_shutdown_flushes_local_only() {
        let local = Arc::new(MemoryStorage::new());
        let remote = Arc::new(MemoryStorage::new());
        let mut adapter = PersistenceAdapter::new(local.clone(), Some(remote.clone()), DEBOUNCE)
            .with_owner("bob");
        let doc = sample();

        adapter.mark_dirty(Instant::now());
        block_on(adapter.shutdown(&doc)).unwrap();

        assert!(!adapter.is_pending());
        assert_eq!(block_on(local.load("whiteboard:bob")).ok(), Some(doc));
        assert!(!remote.contains("bob"));
    }
}
