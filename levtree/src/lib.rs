//! # levtree
//!
//! Trees of trees on top of an ordered key value store.
//!
//! Every node of the hierarchy is stored under a key that is derived from its position.
//! The keys are built so that the children, the siblings and the descendants of a node
//! always occupy a contiguous key range. Finding them is a single prefix scan, there
//! are no secondary indexes and no stored links between nodes.
//!
//! ## Ids, locations and keychains
//!
//! An [id::Id] is a random identifier together with the height of the entity it names.
//! A [location::Location] is a sequence of ids and is encoded as the concatenation of
//! their fixed width keys. A [keychain::KeyChain] knows the namespace, the parent and
//! the grand parent of an entity, which is enough to compute the location of the entity,
//! the location of its parent and the prefixes of its children, siblings and descendants.
//!
//! ## Trees and branches
//!
//! There are two kinds of nodes. They do not differ in what they can store, only in how
//! their children are bucketed.
//!
//! *Branch* - a "normal" node. Children of a branch are in the same bucket as the branch.
//! Most nodes should be branches, since trees make the keys longer.
//!
//! *Tree* - a node whose children use the tree's id as an additional bucket level. All
//! descendants of a tree can be read with one sequential scan.
//!
//! A *forest* is a tree attached to the root node. Forests are the top level namespaces,
//! similar to tables. The *root* is the node at the empty key, the parent of all forests.
//!
//! ## The funnel
//!
//! Writes are not applied to the store immediately. They are staged in a [funnel::Funnel]
//! and a background thread periodically writes all staged nodes in one atomic batch.
//! This keeps the number of write transactions low, which matters for stores that
//! refuse to open a second write transaction instead of blocking.
//!
//! As a consequence, a plain read does not see a node that was just created or updated
//! until the next flush. Updates go through [LevTree::update], which reads the most
//! recent version of a node, staged or stored.
pub mod config;
pub mod db;
pub mod error;
pub mod funnel;
pub mod id;
pub mod keychain;
pub mod location;
pub mod node;
pub mod payload;
pub mod store;
mod util;

pub use config::Config;
pub use db::LevTree;
pub use error::{Error, Result};
pub use id::Id;
pub use keychain::KeyChain;
pub use location::Location;
pub use node::Node;
pub use util::BoxedIter;

#[cfg(test)]
extern crate quickcheck;
#[cfg(test)]
#[macro_use(quickcheck)]
extern crate quickcheck_macros;

/// Register the funnel metrics with a prometheus registry
#[cfg(feature = "metrics")]
pub fn register_metrics(registry: &prometheus::Registry) -> anyhow::Result<()> {
    funnel::register_metrics(registry)
}
