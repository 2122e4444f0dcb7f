use anyhow::Context;
use levtree::{
    store::{BatchWriter, KeyValue, MemStore, ReadOnlyStore, WriteBatch},
    BoxedIter, Config, LevTree,
};
use levtree_utils::{dump, parse_hex, parse_key, sled_store::SledStore};
use std::{str::FromStr, time::Duration};
use structopt::StructOpt;
use tracing::Level;

#[cfg(target_env = "musl")]
#[global_allocator]
static ALLOC: jemallocator::Jemalloc = jemallocator::Jemalloc;

pub type Result<T> = anyhow::Result<T>;

#[derive(Clone)]
enum Storage {
    Memory(MemStore),
    Sled(SledStore),
}

impl ReadOnlyStore for Storage {
    fn get(&self, key: &[u8]) -> Result<Option<Box<[u8]>>> {
        match self {
            Self::Memory(m) => m.get(key),
            Self::Sled(s) => s.get(key),
        }
    }

    fn scan_prefix<'a>(&'a self, prefix: &[u8]) -> Result<BoxedIter<'a, Result<KeyValue>>> {
        match self {
            Self::Memory(m) => m.scan_prefix(prefix),
            Self::Sled(s) => s.scan_prefix(prefix),
        }
    }
}

impl BatchWriter for Storage {
    fn write_batch(&self, batch: WriteBatch) -> Result<()> {
        match self {
            Self::Memory(m) => m.write_batch(batch),
            Self::Sled(s) => s.write_batch(batch),
        }
    }
}

impl FromStr for Storage {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self> {
        let s = match s {
            "memory" => Self::Memory(MemStore::new()),
            path => Self::Sled(SledStore::open(path)?),
        };
        Ok(s)
    }
}

#[derive(StructOpt)]
#[structopt(about = "CLI to work with levtree databases")]
struct Opts {
    #[structopt(short, parse(from_occurrences = set_log_level), global = true)]
    #[allow(dead_code)] // log level will be set in [`set_log_level`]
    /// Increase verbosity
    verbosity: u64,
    #[structopt(long, default_value = "memory", global = true)]
    /// Storage, "memory" or a path to a sled database (will create it if it doesn't exist)
    storage: Storage,
    #[structopt(long, default_value = "1000", global = true)]
    /// Milliseconds between two flushes of staged writes
    flush_interval_ms: u64,
    #[structopt(subcommand)]
    cmd: Command,
}

fn set_log_level(verbosity: u64) -> u64 {
    let level = match verbosity {
        0 => Level::ERROR,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
    verbosity
}

#[derive(StructOpt)]
enum Command {
    /// Create the root node if the store does not have one yet
    Init,
    /// Create a forest
    Forest {
        #[structopt(long, default_value = "")]
        /// The payload, hex encoded
        data: String,
    },
    /// Create a tree below a node
    Tree {
        #[structopt(long)]
        /// The key of the parent, hex encoded. Empty for the root.
        parent: String,
        #[structopt(long, default_value = "")]
        /// The payload, hex encoded
        data: String,
    },
    /// Create a branch below a node
    Branch {
        #[structopt(long)]
        /// The key of the parent, hex encoded. Empty for the root.
        parent: String,
        #[structopt(long, default_value = "")]
        /// The payload, hex encoded
        data: String,
    },
    /// List the children of a node as json, newline separated
    Children {
        #[structopt(long, default_value = "")]
        /// The key of the node, hex encoded
        key: String,
    },
    /// List the descendants of a node as json, newline separated
    Descendants {
        #[structopt(long, default_value = "")]
        /// The key of the node, hex encoded
        key: String,
    },
    /// Dump all nodes as json to stdout, newline separated
    Dump,
}

fn main() -> Result<()> {
    let opts = Opts::from_args();
    let config = Config::with_flush_interval(Duration::from_millis(opts.flush_interval_ms));
    let store = opts.storage;
    if let Command::Init = opts.cmd {
        let created = levtree::db::init_root(&store)?;
        println!("{}", if created { "created root" } else { "root exists" });
        return Ok(());
    }
    let db = LevTree::open(store.clone(), config)?;
    let mut stdout = std::io::stdout();
    match opts.cmd {
        Command::Init => {}
        Command::Forest { data } => {
            let kc = db.new_forest(parse_hex(&data)?)?;
            println!("{}", hex::encode(kc.key()));
        }
        Command::Tree { parent, data } => {
            let parent = db
                .get_by_key(&parse_key(&parent)?.key())
                .context("loading parent")?;
            let kc = db.new_tree(&parent, parse_hex(&data)?)?;
            println!("{}", hex::encode(kc.key()));
        }
        Command::Branch { parent, data } => {
            let parent = db
                .get_by_key(&parse_key(&parent)?.key())
                .context("loading parent")?;
            let kc = db.new_branch(&parent, parse_hex(&data)?)?;
            println!("{}", hex::encode(kc.key()));
        }
        Command::Children { key } => {
            let node = db.get_by_key(&parse_key(&key)?.key())?;
            dump::nodes(&db.get_children(&node)?, &mut stdout)?;
        }
        Command::Descendants { key } => {
            let node = db.get_by_key(&parse_key(&key)?.key())?;
            dump::nodes(&db.get_descendants(&node)?, &mut stdout)?;
        }
        Command::Dump => {
            dump::store(&store, &mut stdout)?;
        }
    }
    let flushed = db.close()?;
    tracing::info!(flushed, "closed");
    Ok(())
}
