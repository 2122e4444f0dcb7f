use levtree::{Config, LevTree};
use levtree_utils::{dump, sled_store::SledStore};
use std::{thread, time::Duration};

#[test]
fn persists_across_reopen() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("db");
    let (forest, tree, branch) = {
        let db = LevTree::open(SledStore::open(&path)?, Config::debug())?;
        let forest = db.new_forest(vec![1])?;
        let tree = db.new_tree(&forest, vec![2])?;
        let branch = db.new_branch(&tree, vec![3])?;
        assert_eq!(db.close()?, 3);
        (forest, tree, branch)
    };
    let db = LevTree::open(SledStore::open(&path)?, Config::debug())?;
    assert_eq!(db.get_forests()?.len(), 1);
    assert_eq!(db.get(&forest)?.data(), &[1]);
    assert_eq!(db.get_children(&forest)?[0].keychain(), &tree);
    assert_eq!(db.get_parent(&branch)?.keychain(), &tree);
    assert_eq!(db.get_descendants(&forest)?.len(), 2);
    Ok(())
}

#[test]
fn background_flush() -> anyhow::Result<()> {
    let db = LevTree::open(SledStore::temporary()?, Config::debug_fast())?;
    let forest = db.new_forest(vec![1])?;
    let mut found = false;
    for _ in 0..100 {
        if db.get(&forest).is_ok() {
            found = true;
            break;
        }
        thread::sleep(Duration::from_millis(10));
    }
    assert!(found, "flusher did not write the forest");
    Ok(())
}

#[test]
fn dump_sled_store() -> anyhow::Result<()> {
    let store = SledStore::temporary()?;
    let db = LevTree::open(store.clone(), Config::debug())?;
    let forest = db.new_forest(vec![])?;
    for i in 0..3u8 {
        let _ = db.new_branch(&forest, vec![i])?;
    }
    db.close()?;
    let mut out = Vec::new();
    assert_eq!(dump::store(&store, &mut out)?, 5);
    assert_eq!(String::from_utf8(out)?.matches(r#""kind":"branch""#).count(), 3);
    Ok(())
}
