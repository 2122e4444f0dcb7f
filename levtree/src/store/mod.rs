//! interface to an ordered key value store
//!
//! The store is an external collaborator. All the tree needs from it is point
//! reads, prefix scans and atomic batch writes.
use crate::util::BoxedIter;
use anyhow::Result;
use std::sync::Arc;

mod mem_store;

pub use mem_store::MemStore;

/// A key value pair as read from the store
pub type KeyValue = (Box<[u8]>, Box<[u8]>);

pub trait ReadOnlyStore: Send + Sync {
    /// get the value at a key, None if there is no entry
    fn get(&self, key: &[u8]) -> Result<Option<Box<[u8]>>>;

    /// Lazily iterate over all entries whose key starts with `prefix`, in key order.
    ///
    /// Resources held by the scan are released when the iterator is dropped.
    fn scan_prefix<'a>(&'a self, prefix: &[u8]) -> Result<BoxedIter<'a, Result<KeyValue>>>;
}

pub trait BatchWriter: Send + Sync {
    /// Write all entries of the batch, or none of them
    fn write_batch(&self, batch: WriteBatch) -> Result<()>;
}

/// A set of puts to be applied atomically
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteBatch {
    entries: Vec<KeyValue>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    pub fn put(&mut self, key: impl Into<Box<[u8]>>, value: impl Into<Box<[u8]>>) {
        self.entries.push((key.into(), value.into()));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// total size of keys and values, in bytes
    pub fn size(&self) -> usize {
        self.entries.iter().map(|(k, v)| k.len() + v.len()).sum()
    }
}

impl IntoIterator for WriteBatch {
    type Item = KeyValue;
    type IntoIter = std::vec::IntoIter<KeyValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<S: ReadOnlyStore + ?Sized> ReadOnlyStore for Arc<S> {
    fn get(&self, key: &[u8]) -> Result<Option<Box<[u8]>>> {
        self.as_ref().get(key)
    }

    fn scan_prefix<'a>(&'a self, prefix: &[u8]) -> Result<BoxedIter<'a, Result<KeyValue>>> {
        self.as_ref().scan_prefix(prefix)
    }
}

impl<S: BatchWriter + ?Sized> BatchWriter for Arc<S> {
    fn write_batch(&self, batch: WriteBatch) -> Result<()> {
        self.as_ref().write_batch(batch)
    }
}

/// Everything the tree needs from a store
pub trait Store: ReadOnlyStore + BatchWriter {}

impl<S: ReadOnlyStore + BatchWriter + ?Sized> Store for S {}
