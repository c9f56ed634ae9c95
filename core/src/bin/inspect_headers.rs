//! Small CLI for poking at an on-disk header store without a wallet attached
//! to it: open a `headers_dir`, print the tip, and optionally check whether
//! a hash is reachable at a given height. Mirrors the shape of the teacher's
//! own `bin/` binaries (argument parsing via `clap`, one `fn main` per
//! tool) - this one just drives [`meowchain_headers`] instead of the node.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use meowchain_headers::{ChainManager, Hash256, NetworkParams, Result};

#[derive(Parser, Debug)]
#[command(author, version, about = "Inspect a block-header chain store", long_about = None)]
struct Args {
    /// Directory containing `blockchain_headers` and `forks/`.
    #[arg(long)]
    headers_dir: PathBuf,

    /// Which network's parameters to validate against.
    #[arg(long, default_value = "mainnet")]
    network: String,

    /// Also check whether `hash` is reachable at `height` on the best chain.
    #[arg(long, requires = "hash")]
    height: Option<u32>,

    #[arg(long, requires = "height")]
    hash: Option<String>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let params = match args.network.as_str() {
        "testnet" => NetworkParams::testnet(),
        "mainnet" => NetworkParams::mainnet(),
        other => {
            eprintln!("unknown network {other:?}; expected mainnet or testnet");
            std::process::exit(2);
        }
    };

    let manager = ChainManager::open(Arc::new(params), &args.headers_dir)?;
    let best = manager.get_best_chain()?;

    println!("headers_dir: {}", args.headers_dir.display());
    println!("height: {}", manager.height(&best));
    println!("tip hash: {}", manager.hash_at(&best, manager.height(&best) as i64)?);
    println!("chain work: {}", manager.chain_work(&best)?);
    println!("tip stale: {}", manager.is_tip_stale(&best)?);

    if let (Some(height), Some(hash)) = (args.height, &args.hash) {
        let hash = Hash256::from_hex(hash)?;
        let chains = manager.get_chains_that_contain(height, hash)?;
        println!(
            "chains containing {hash} at height {height}: {}",
            chains.len()
        );
    }

    Ok(())
}
