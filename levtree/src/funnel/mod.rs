//! write coalescing in front of the store
//!
//! Many stores do not allow more than one open write transaction, and writing
//! lots of small transactions is slow anyway. The funnel stages all mutations in a
//! map from key to node and periodically writes the whole map as one atomic batch.
//!
//! Reads through [Funnel::open_update] see the staged state. All other reads go to
//! the store directly, so a node that was just staged is not visible to them before
//! the next flush.
//!
//! Staged nodes are values. Callers always get clones, and a change to a clone only
//! becomes visible to others once it is staged again.
use crate::{
    error::{Error, Result},
    keychain::KeyChain,
    node::Node,
    store::{Store, WriteBatch},
};
use fnv::FnvHashMap;
use parking_lot::{Mutex, MutexGuard};
use std::{fmt, sync::Arc, time::Instant};
use tracing::{debug, trace};

mod flusher;
#[cfg(feature = "metrics")]
mod prom;

pub use flusher::Flusher;
#[cfg(feature = "metrics")]
pub(crate) use prom::register as register_metrics;

type Staged = FnvHashMap<Vec<u8>, Node>;

/// Staging area for node mutations, shared between all writers and the flusher
pub struct Funnel<S>(Arc<Inner<S>>);

struct Inner<S> {
    store: S,
    staged: Mutex<Staged>,
}

impl<S> Clone for Funnel<S> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<S> fmt::Debug for Funnel<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Funnel").finish_non_exhaustive()
    }
}

impl<S: Store> Funnel<S> {
    pub fn new(store: S) -> Self {
        Self(Arc::new(Inner {
            store,
            staged: Mutex::new(Staged::default()),
        }))
    }

    /// the store behind the funnel, for direct reads
    pub fn store(&self) -> &S {
        &self.0.store
    }

    /// number of staged nodes
    pub fn len(&self) -> usize {
        self.0.staged.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Take the funnel lock without staging anything.
    ///
    /// Blocks until the lock is available. The lock is released when the guard is dropped.
    pub fn lock(&self) -> UpdateGuard<'_, S> {
        UpdateGuard {
            store: &self.0.store,
            staged: self.0.staged.lock(),
        }
    }

    /// Take the funnel lock and get the most recent version of each of the given nodes.
    ///
    /// Nodes that are not staged yet are loaded from the store and staged. The lock is held
    /// until the guard is closed with the updated nodes, or dropped.
    pub fn open_update<K: AsRef<KeyChain>>(
        &self,
        keychains: &[K],
    ) -> Result<(UpdateGuard<'_, S>, Vec<Node>)> {
        let mut guard = self.lock();
        let nodes = keychains
            .iter()
            .map(|kc| guard.stage_for_read(kc.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Ok((guard, nodes))
    }

    /// Stage the given nodes and release the lock of an update
    pub fn close_update(&self, guard: UpdateGuard<'_, S>, nodes: impl IntoIterator<Item = Node>) {
        guard.close(nodes)
    }

    /// Update some nodes atomically with respect to all other funnel operations.
    ///
    /// `f` gets copies of the most recent versions. If it succeeds, the copies are staged.
    /// If it fails, nothing is staged. The lock is released in both cases.
    pub fn update<K, R, E>(
        &self,
        keychains: &[K],
        f: impl FnOnce(&mut [Node]) -> std::result::Result<R, E>,
    ) -> std::result::Result<R, E>
    where
        K: AsRef<KeyChain>,
        E: From<Error>,
    {
        let (guard, mut nodes) = self.open_update(keychains)?;
        let res = f(&mut nodes)?;
        guard.close(nodes);
        Ok(res)
    }

    /// Stage some nodes, replacing earlier staged versions with the same key
    pub fn stage(&self, nodes: impl IntoIterator<Item = Node>) {
        self.lock().bulk_stage(nodes)
    }

    /// Write all staged nodes to the store in one atomic batch.
    ///
    /// The lock is held until the store has accepted or rejected the batch. The staged
    /// nodes are only dropped after a successful write, so a failed flush can be retried.
    /// Returns the number of nodes written.
    pub fn flush(&self) -> Result<usize> {
        let mut staged = self.0.staged.lock();
        if staged.is_empty() {
            return Ok(0);
        }
        let t0 = Instant::now();
        let mut batch = WriteBatch::with_capacity(staged.len());
        for (key, node) in staged.iter() {
            batch.put(key.clone(), node.serialize()?);
        }
        let count = batch.len();
        let bytes = batch.size();
        if let Err(cause) = self.0.store.write_batch(batch) {
            #[cfg(feature = "metrics")]
            prom::FLUSH_FAILURES.inc();
            return Err(Error::WriteFailure { count, cause });
        }
        staged.clear();
        drop(staged);
        #[cfg(feature = "metrics")]
        {
            prom::FLUSH_TIME_HIST.observe(t0.elapsed().as_secs_f64());
            prom::FLUSH_SIZE_HIST.observe(count as f64);
            prom::FLUSHED_NODES.inc_by(count as u64);
            prom::STAGED_NODES.set(0);
        }
        debug!(count, bytes, elapsed = ?t0.elapsed(), "flushed funnel");
        Ok(count)
    }
}

/// Exclusive access to the staged nodes.
///
/// Only one guard exists at any time. Dropping it releases the funnel lock, whether or
/// not it was closed.
pub struct UpdateGuard<'a, S> {
    store: &'a S,
    staged: MutexGuard<'a, Staged>,
}

impl<'a, S> fmt::Debug for UpdateGuard<'a, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpdateGuard")
            .field("staged", &self.staged.len())
            .finish()
    }
}

impl<'a, S: Store> UpdateGuard<'a, S> {
    /// Get a copy of the most recent version of a node, staging it if it is not staged yet.
    pub fn stage_for_read(&mut self, keychain: &KeyChain) -> Result<Node> {
        let key = keychain.key();
        if let Some(node) = self.staged.get(&key) {
            trace!(key = ?keychain.loc(), "read staged node");
            return Ok(node.clone());
        }
        let bytes = self
            .store
            .get(&key)
            .map_err(Error::Io)?
            .ok_or_else(|| Error::not_found(&key))?;
        let node = Node::deserialize(&bytes)?;
        self.staged.insert(key, node.clone());
        #[cfg(feature = "metrics")]
        prom::STAGED_NODES.set(self.staged.len() as i64);
        Ok(node)
    }

    /// Stage nodes while holding the lock, last one wins for duplicate keys
    pub fn bulk_stage(&mut self, nodes: impl IntoIterator<Item = Node>) {
        for node in nodes {
            self.staged.insert(node.key(), node);
        }
        #[cfg(feature = "metrics")]
        prom::STAGED_NODES.set(self.staged.len() as i64);
    }

    /// number of staged nodes
    pub fn len(&self) -> usize {
        self.staged.len()
    }

    pub fn is_empty(&self) -> bool {
        self.staged.is_empty()
    }

    /// Stage the updated nodes and release the lock
    pub fn close(mut self, nodes: impl IntoIterator<Item = Node>) {
        self.bulk_stage(nodes)
    }
}
