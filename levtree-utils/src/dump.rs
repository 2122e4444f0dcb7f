//! render nodes as json lines
use levtree::{store::ReadOnlyStore, Node};
use serde::Serialize;
use std::io::Write;

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct NodeDescriptor {
    /// store key, hex encoded. Empty for the root.
    pub key: String,
    pub kind: Kind,
    pub height: u64,
    /// payload, hex encoded
    pub data: String,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    Root,
    Tree,
    Branch,
}

impl From<&Node> for NodeDescriptor {
    fn from(node: &Node) -> Self {
        let kc = node.keychain();
        let kind = if kc.is_root() {
            Kind::Root
        } else if kc.is_tree() {
            Kind::Tree
        } else {
            Kind::Branch
        };
        Self {
            key: hex::encode(kc.key()),
            kind,
            height: kc.height(),
            data: hex::encode(node.data()),
        }
    }
}

/// Write the nodes as json, one per line
pub fn nodes<'a>(
    nodes: impl IntoIterator<Item = &'a Node>,
    w: &mut impl Write,
) -> anyhow::Result<usize> {
    let mut n = 0;
    for node in nodes {
        serde_json::to_writer(&mut *w, &NodeDescriptor::from(node))?;
        writeln!(w)?;
        n += 1;
    }
    Ok(n)
}

/// Write every node in the store as json, one per line, in key order
pub fn store(store: &impl ReadOnlyStore, w: &mut impl Write) -> anyhow::Result<usize> {
    let mut n = 0;
    for kv in store.scan_prefix(&[])? {
        let (_, value) = kv?;
        let node = Node::deserialize(&value)?;
        serde_json::to_writer(&mut *w, &NodeDescriptor::from(&node))?;
        writeln!(w)?;
        n += 1;
    }
    Ok(n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use levtree::{store::MemStore, Config, LevTree};

    #[test]
    fn dump_store() -> anyhow::Result<()> {
        let store = MemStore::new();
        let db = LevTree::open(store.clone(), Config::debug())?;
        let forest = db.new_forest(vec![0xab])?;
        let _ = db.new_branch(&forest, vec![])?;
        db.close()?;
        let mut out = Vec::new();
        assert_eq!(super::store(&store, &mut out)?, 3);
        let lines = String::from_utf8(out)?;
        let lines = lines.lines().collect::<Vec<_>>();
        assert_eq!(lines.len(), 3);
        // the root has the empty key, so it comes first
        assert_eq!(
            lines[0],
            r#"{"key":"","kind":"root","height":0,"data":""}"#
        );
        assert!(lines[1].contains(r#""kind":"tree","height":1,"data":"ab""#));
        assert!(lines[2].contains(r#""kind":"branch","height":2"#));
        Ok(())
    }
}
