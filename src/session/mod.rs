//! Per-client chain registry.
//!
//! Each client host owns at most one [`RetrievalQaChain`]. Indexing a new
//! document replaces the previous chain; when the registry is full the least
//! recently used host is evicted. Either way the displaced chain's vector
//! collection is released when the last reference to the chain is dropped.

use crate::rag::chain::RetrievalQaChain;
use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use std::sync::Arc;

pub struct SessionStore {
    chains: Mutex<LruCache<String, Arc<RetrievalQaChain>>>,
}

impl SessionStore {
    /// `capacity` of zero is treated as one.
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            chains: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Register `chain` for `host`.
    ///
    /// The displaced chain's collection is discarded once its last holder
    /// (usually an in-flight `/ask`) lets go of it.
    pub fn insert(&self, host: &str, chain: RetrievalQaChain) {
        let displaced = self.chains.lock().push(host.to_string(), Arc::new(chain));

        if let Some((old_host, old_chain)) = displaced {
            if old_host == host {
                tracing::debug!(host = %host, "Replacing chain");
            } else {
                tracing::info!(host = %old_host, "Evicting least recently used chain");
            }

            let holders = Arc::strong_count(&old_chain) - 1;
            if holders > 0 {
                tracing::debug!(
                    host = %old_host,
                    collection = %old_chain.index().collection(),
                    holders,
                    "Displaced chain still in use"
                );
            }
        }
    }

    /// Current chain for `host`, marking it recently used.
    pub fn get(&self, host: &str) -> Option<Arc<RetrievalQaChain>> {
        self.chains.lock().get(host).cloned()
    }

    pub fn contains(&self, host: &str) -> bool {
        self.chains.lock().contains(host)
    }

    pub fn len(&self) -> usize {
        self.chains.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.chains.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.chains.lock().cap().get()
    }
}
