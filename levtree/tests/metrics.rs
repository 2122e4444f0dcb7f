//! The metrics are process wide, so they get a test binary of their own
#![cfg(feature = "metrics")]
use levtree::{store::MemStore, Config, LevTree};
use prometheus::Registry;

fn value(registry: &Registry, name: &str) -> Option<f64> {
    registry
        .gather()
        .iter()
        .find(|family| family.get_name() == name)
        .and_then(|family| family.get_metric().first().cloned())
        .map(|m| {
            if m.has_gauge() {
                m.get_gauge().get_value()
            } else {
                m.get_counter().get_value()
            }
        })
}

#[test]
fn funnel_metrics() -> anyhow::Result<()> {
    let registry = Registry::new();
    levtree::register_metrics(&registry)?;
    let db = LevTree::open(MemStore::new(), Config::debug())?;
    let forest = db.new_forest(vec![1])?;
    assert_eq!(value(&registry, "levtree_staged_nodes"), Some(1.0));
    db.flush()?;
    assert_eq!(value(&registry, "levtree_staged_nodes"), Some(0.0));
    assert_eq!(value(&registry, "levtree_flushed_nodes"), Some(1.0));

    // reading a stored node for an update stages it
    let (guard, nodes) = db.open_update(&[&forest])?;
    assert_eq!(guard.len(), 1);
    assert_eq!(value(&registry, "levtree_staged_nodes"), Some(1.0));
    db.close_update(guard, nodes);
    db.flush()?;
    assert_eq!(value(&registry, "levtree_staged_nodes"), Some(0.0));
    assert_eq!(value(&registry, "levtree_flushed_nodes"), Some(2.0));

    db.store().fail_next_writes(1);
    let _ = db.new_forest(vec![2])?;
    assert!(db.flush().is_err());
    assert_eq!(value(&registry, "levtree_flush_failures"), Some(1.0));
    assert_eq!(value(&registry, "levtree_staged_nodes"), Some(1.0));
    Ok(())
}
