//! levtree store on top of a sled database
use anyhow::Result;
use levtree::{
    store::{BatchWriter, KeyValue, ReadOnlyStore, WriteBatch},
    BoxedIter,
};
use std::path::Path;
use tracing::debug;

#[derive(Clone)]
pub struct SledStore(sled::Db);

impl SledStore {
    /// Open or create the database at `path`
    pub fn open(path: impl AsRef<Path>) -> levtree::Result<Self> {
        let path = path.as_ref();
        let db = sled::open(path).map_err(|e| {
            levtree::Error::StoreUnavailable(
                anyhow::Error::new(e).context(format!("opening {}", path.display())),
            )
        })?;
        debug!(path = %path.display(), "opened sled store");
        Ok(Self(db))
    }

    /// A database that lives only as long as this store
    pub fn temporary() -> levtree::Result<Self> {
        let db = sled::Config::new()
            .temporary(true)
            .open()
            .map_err(|e| levtree::Error::StoreUnavailable(e.into()))?;
        Ok(Self(db))
    }

    pub fn new(db: sled::Db) -> Self {
        Self(db)
    }

    pub fn db(&self) -> &sled::Db {
        &self.0
    }
}

impl ReadOnlyStore for SledStore {
    fn get(&self, key: &[u8]) -> Result<Option<Box<[u8]>>> {
        Ok(self.0.get(key)?.map(|v| Box::from(v.as_ref())))
    }

    fn scan_prefix<'a>(&'a self, prefix: &[u8]) -> Result<BoxedIter<'a, Result<KeyValue>>> {
        let iter = self.0.scan_prefix(prefix).map(|kv| -> Result<KeyValue> {
            let (k, v) = kv?;
            Ok((Box::from(k.as_ref()), Box::from(v.as_ref())))
        });
        Ok(Box::new(iter))
    }
}

impl BatchWriter for SledStore {
    fn write_batch(&self, batch: WriteBatch) -> Result<()> {
        let count = batch.len();
        let mut sled_batch = sled::Batch::default();
        for (key, value) in batch {
            sled_batch.insert(key, value);
        }
        self.0.apply_batch(sled_batch)?;
        let bytes = self.0.flush()?;
        debug!(count, bytes, "applied sled batch");
        Ok(())
    }
}
