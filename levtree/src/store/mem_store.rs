use super::{BatchWriter, KeyValue, ReadOnlyStore, WriteBatch};
use crate::util::{prefix_end, BoxedIter, IterExt};
use anyhow::anyhow;
use parking_lot::Mutex;
use std::{collections::BTreeMap, ops::Bound, sync::Arc};

/// A MemStore is a pure in memory ordered store. Mostly useful for testing.
#[derive(Clone, Default)]
pub struct MemStore(Arc<Inner>);

#[derive(Default)]
struct Inner {
    entries: Mutex<Entries>,
}

#[derive(Debug, Default)]
struct Entries {
    map: BTreeMap<Box<[u8]>, Box<[u8]>>,
    /// number of batches that were applied
    batches: usize,
    /// number of upcoming batches to reject
    fail_writes: usize,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// number of entries
    pub fn len(&self) -> usize {
        self.0.entries.lock().map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// number of batches that have been written successfully
    pub fn batches_written(&self) -> usize {
        self.0.entries.lock().batches
    }

    /// Reject the next `n` batch writes, leaving the content untouched
    pub fn fail_next_writes(&self, n: usize) {
        self.0.entries.lock().fail_writes = n;
    }

    /// all entries, in key order
    pub fn entries(&self) -> Vec<KeyValue> {
        let entries = self.0.entries.lock();
        entries
            .map
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

impl ReadOnlyStore for MemStore {
    fn get(&self, key: &[u8]) -> anyhow::Result<Option<Box<[u8]>>> {
        Ok(self.0.entries.lock().map.get(key).cloned())
    }

    fn scan_prefix<'a>(
        &'a self,
        prefix: &[u8],
    ) -> anyhow::Result<BoxedIter<'a, anyhow::Result<KeyValue>>> {
        let end = prefix_end(prefix);
        let upper = match &end {
            Bound::Excluded(end) => Bound::Excluded(end.as_slice()),
            _ => Bound::Unbounded,
        };
        // snapshot, so the lock is not held while the caller iterates
        let items = self
            .0
            .entries
            .lock()
            .map
            .range::<[u8], _>((Bound::Included(prefix), upper))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect::<Vec<_>>();
        Ok(items.into_iter().map(Ok).boxed())
    }
}

impl BatchWriter for MemStore {
    fn write_batch(&self, batch: WriteBatch) -> anyhow::Result<()> {
        let mut entries = self.0.entries.lock();
        if entries.fail_writes > 0 {
            entries.fail_writes -= 1;
            return Err(anyhow!("injected write failure"));
        }
        for (key, value) in batch {
            entries.map.insert(key, value);
        }
        entries.batches += 1;
        Ok(())
    }
}
