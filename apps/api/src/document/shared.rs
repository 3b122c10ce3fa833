//! Async handle around the `DocumentStore`.
//!
//! Every mutation funnels through `SharedStore::mutate`, which holds the lock for the
//! whole state transition (mutations are atomic and totally ordered) and publishes the
//! new snapshot on a `watch` channel when the revision changed. Subscribers such as
//! the persistence task only ever see complete snapshots.

use std::sync::Arc;

use tokio::sync::{watch, Mutex};

use crate::document::models::CvDocument;
use crate::document::store::DocumentStore;

#[derive(Clone)]
pub struct SharedStore {
    inner: Arc<Mutex<DocumentStore>>,
    tx: Arc<watch::Sender<Arc<CvDocument>>>,
}

impl SharedStore {
    pub fn new(store: DocumentStore) -> Self {
        let (tx, _rx) = watch::channel(store.snapshot());
        Self {
            inner: Arc::new(Mutex::new(store)),
            tx: Arc::new(tx),
        }
    }

    /// Latest published snapshot. Does not wait for in-flight mutations.
    pub fn snapshot(&self) -> Arc<CvDocument> {
        self.tx.borrow().clone()
    }

    /// A receiver that is notified after every effective mutation.
    pub fn subscribe(&self) -> watch::Receiver<Arc<CvDocument>> {
        self.tx.subscribe()
    }

    /// Runs one state transition. The snapshot is published only when the
    /// transition changed the document.
    pub async fn mutate<T>(&self, f: impl FnOnce(&mut DocumentStore) -> T) -> T {
        let mut store = self.inner.lock().await;
        let before = store.revision();
        let out = f(&mut store);
        if store.revision() != before {
            self.tx.send_replace(store.snapshot());
        }
        out
    }
}
