#![allow(dead_code)]
//! helper methods for the tests
use levtree::{store::MemStore, Config, KeyChain, LevTree, Node};
use std::collections::BTreeSet;

pub type Db = LevTree<MemStore>;

/// A db on a fresh memory store that only flushes when asked to
pub fn db() -> anyhow::Result<(Db, MemStore)> {
    init_logging();
    let store = MemStore::new();
    let db = LevTree::open(store.clone(), Config::debug())?;
    Ok((db, store))
}

/// create a forest and flush it, checking that it reads back
pub fn forest(db: &Db, data: &[u8]) -> anyhow::Result<Node> {
    let kc = db.new_forest(data)?;
    checked(db, kc, data)
}

pub fn tree(db: &Db, parent: &Node, data: &[u8]) -> anyhow::Result<Node> {
    let kc = db.new_tree(parent, data)?;
    checked(db, kc, data)
}

pub fn branch(db: &Db, parent: &Node, data: &[u8]) -> anyhow::Result<Node> {
    let kc = db.new_branch(parent, data)?;
    checked(db, kc, data)
}

fn checked(db: &Db, kc: KeyChain, data: &[u8]) -> anyhow::Result<Node> {
    db.flush()?;
    let node = db.get(&kc)?;
    anyhow::ensure!(
        node.keychain() == &kc,
        "node saved at wrong location {}",
        hex::encode(kc.key())
    );
    anyhow::ensure!(
        node.data() == data,
        "node at {} saved with wrong data {}",
        hex::encode(kc.key()),
        hex::encode(node.data())
    );
    Ok(node)
}

/// log to stderr, filtered by RUST_LOG
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// the first data byte of each node, as a set
pub fn tags(nodes: &[Node]) -> BTreeSet<u8> {
    nodes.iter().map(|n| n.data()[0]).collect()
}
