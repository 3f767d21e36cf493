use btree_index::{BTree, Error};
use log::{error, info, warn};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        error!("{e}");
        std::process::exit(1);
    }
}

fn run() -> btree_index::Result<()> {
    let mut btree = BTree::new(3)?;

    for key in [10, 20, 5, 6, 12, 30, 7, 17] {
        btree.insert(key);
    }
    info!("keys before removal: {:?}", btree);
    println!("{btree}");

    let removed = btree.remove(&6)?;
    info!("removed {removed}, keys now: {:?}", btree);
    println!("{btree}");

    match btree.remove(&6) {
        Err(Error::KeyNotFound) => warn!("key 6 is not in the tree"),
        other => info!("second removal of 6 returned {other:?}"),
    }

    if let Err(violation) = btree.check_invariants() {
        error!("tree is malformed: {violation}");
    }
    Ok(())
}
