use std::{process::exit, sync::Arc};

use bin::executor::StoreServerArgs;
use clap::Parser;
use kv_store::{bind, MemoryStore};
use log::{error, info};

#[tokio::main]
async fn main() {
    env_logger::init();
    let args = StoreServerArgs::parse();

    let store = Arc::new(MemoryStore::new());
    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("failed to listen for ctrl-c: {e}");
        }
    };

    let (addr, server) = match bind(store, args.addr(), shutdown) {
        Ok(bound) => bound,
        Err(e) => {
            eprintln!("store-server failed: {e}");
            exit(1);
        }
    };
    println!("store server ready on http://{addr}, press Ctrl+C to exit");
    server.await;
    info!("store server stopped");
}
