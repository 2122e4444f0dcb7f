//! the public surface: creating, reading and updating nodes
use crate::{
    config::Config,
    error::{Error, Result},
    funnel::{Flusher, Funnel, UpdateGuard},
    keychain::KeyChain,
    node::Node,
    store::{Store, WriteBatch},
};
use parking_lot::Mutex;
use std::{collections::VecDeque, fmt};
use tracing::{debug, info};

/// A tree database on top of an ordered key value store.
///
/// Writes are staged in a [Funnel] and written in batches by a background flusher.
/// Reads go to the store directly, so they only see nodes that have been flushed.
/// Use [LevTree::open_update] or [LevTree::update] to read the most recent version
/// of a node in order to change it.
pub struct LevTree<S: Store + 'static> {
    funnel: Funnel<S>,
    flusher: Mutex<Option<Flusher>>,
}

impl<S: Store + 'static> fmt::Debug for LevTree<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LevTree")
            .field("staged", &self.funnel.len())
            .finish()
    }
}

impl<S: Store + 'static> LevTree<S> {
    /// Open a tree database on a store, creating the root node if needed, and start
    /// the background flusher.
    pub fn open(store: S, config: Config) -> Result<Self> {
        config.validate().map_err(Error::InvalidConfig)?;
        init_root(&store)?;
        let funnel = Funnel::new(store);
        let flusher = Flusher::spawn(funnel.clone(), config.flush_interval)
            .map_err(|e| Error::Io(e.into()))?;
        Ok(Self {
            funnel,
            flusher: Mutex::new(Some(flusher)),
        })
    }

    pub fn funnel(&self) -> &Funnel<S> {
        &self.funnel
    }

    pub fn store(&self) -> &S {
        self.funnel.store()
    }

    /// Create a tree attached to the root. Forests are the top level namespaces.
    pub fn new_forest(&self, data: impl Into<Vec<u8>>) -> Result<KeyChain> {
        self.create(KeyChain::root().make_child_tree()?, data)
    }

    /// Create a tree below `parent`. The children of the tree get a bucket of their own.
    pub fn new_tree(
        &self,
        parent: impl AsRef<KeyChain>,
        data: impl Into<Vec<u8>>,
    ) -> Result<KeyChain> {
        self.create(parent.as_ref().make_child_tree()?, data)
    }

    /// Create a branch below `parent`. The children of the branch share its bucket.
    pub fn new_branch(
        &self,
        parent: impl AsRef<KeyChain>,
        data: impl Into<Vec<u8>>,
    ) -> Result<KeyChain> {
        self.create(parent.as_ref().make_child_branch()?, data)
    }

    /// Create a node of the same kind and with the same parent as `sibling`
    pub fn new_sibling(
        &self,
        sibling: impl AsRef<KeyChain>,
        data: impl Into<Vec<u8>>,
    ) -> Result<KeyChain> {
        self.create(sibling.as_ref().make_sibling()?, data)
    }

    fn create(&self, keychain: KeyChain, data: impl Into<Vec<u8>>) -> Result<KeyChain> {
        debug!(key = ?keychain.loc(), tree = keychain.is_tree(), "staging new node");
        self.funnel.stage(Some(Node::new(keychain.clone(), data)));
        Ok(keychain)
    }

    /// Read a node from the store
    pub fn get(&self, node: impl AsRef<KeyChain>) -> Result<Node> {
        self.get_by_key(&node.as_ref().key())
    }

    /// Read the node stored at a key
    pub fn get_by_key(&self, key: &[u8]) -> Result<Node> {
        let bytes = self
            .store()
            .get(key)
            .map_err(Error::Io)?
            .ok_or_else(|| Error::not_found(key))?;
        Node::deserialize(&bytes)
    }

    /// Read the parent of a node. The root is its own parent.
    pub fn get_parent(&self, node: impl AsRef<KeyChain>) -> Result<Node> {
        self.get_by_key(&node.as_ref().parent_key())
    }

    /// All immediate children of a node
    pub fn get_children(&self, node: impl AsRef<KeyChain>) -> Result<Vec<Node>> {
        self.scan(&node.as_ref().child_key_prefix())
    }

    /// All nodes with the same parent, including the node itself
    pub fn get_siblings(&self, node: impl AsRef<KeyChain>) -> Result<Vec<Node>> {
        let node = node.as_ref();
        if node.is_root() {
            return Ok(vec![self.get(node)?]);
        }
        self.scan(&node.sibling_key_prefix())
    }

    /// All nodes below a node.
    ///
    /// The descendants of a tree are a single prefix scan. For a branch the children
    /// have to be visited one by one, until a tree or a childless node is reached.
    pub fn get_descendants(&self, node: impl AsRef<KeyChain>) -> Result<Vec<Node>> {
        let node = node.as_ref();
        if node.is_tree() {
            return self.scan(&node.descendant_key_prefix());
        }
        let mut res = Vec::new();
        let mut queue = VecDeque::new();
        queue.push_back(node.clone());
        while let Some(branch) = queue.pop_front() {
            for child in self.get_children(&branch)? {
                if child.keychain().is_tree() {
                    res.extend(self.scan(&child.keychain().descendant_key_prefix())?);
                } else {
                    queue.push_back(child.keychain().clone());
                }
                res.push(child);
            }
        }
        Ok(res)
    }

    /// All trees attached to the root
    pub fn get_forests(&self) -> Result<Vec<Node>> {
        self.get_children(KeyChain::root())
    }

    fn scan(&self, prefix: &[u8]) -> Result<Vec<Node>> {
        self.store()
            .scan_prefix(prefix)
            .map_err(Error::Io)?
            .map(|kv| {
                let (_, value) = kv.map_err(Error::Io)?;
                Node::deserialize(&value)
            })
            .collect()
    }

    /// Get the most recent versions of some nodes for updating them.
    ///
    /// All other writers are blocked until the guard is closed or dropped.
    pub fn open_update<K: AsRef<KeyChain>>(
        &self,
        nodes: &[K],
    ) -> Result<(UpdateGuard<'_, S>, Vec<Node>)> {
        self.funnel.open_update(nodes)
    }

    /// Stage updated nodes and release the update lock
    pub fn close_update(&self, guard: UpdateGuard<'_, S>, nodes: impl IntoIterator<Item = Node>) {
        self.funnel.close_update(guard, nodes)
    }

    /// Update some nodes atomically, see [Funnel::update]
    pub fn update<K, R, E>(
        &self,
        nodes: &[K],
        f: impl FnOnce(&mut [Node]) -> std::result::Result<R, E>,
    ) -> std::result::Result<R, E>
    where
        K: AsRef<KeyChain>,
        E: From<Error>,
    {
        self.funnel.update(nodes, f)
    }

    /// Write all staged nodes now instead of waiting for the flusher
    pub fn flush(&self) -> Result<usize> {
        self.funnel.flush()
    }

    /// Stop the flusher, writing all staged nodes
    pub fn close(self) -> Result<usize> {
        let flusher = self.flusher.lock().take();
        match flusher {
            Some(flusher) => flusher.stop(),
            None => self.funnel.flush(),
        }
    }
}

/// Write the root node unless the store already has one. Returns true if it was created.
pub fn init_root<S: Store>(store: &S) -> Result<bool> {
    let root = Node::root();
    let key = root.key();
    if store.get(&key).map_err(Error::Io)?.is_some() {
        return Ok(false);
    }
    let mut batch = WriteBatch::with_capacity(1);
    batch.put(key, root.serialize()?);
    store
        .write_batch(batch)
        .map_err(|cause| Error::WriteFailure { count: 1, cause })?;
    info!("initialized root node");
    Ok(true)
}
