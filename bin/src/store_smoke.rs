use std::process::exit;

use bin::executor::{SmokeSession, StoreSmokeArgs};
use clap::Parser;
use kv_store::CancellationToken;
use log::info;

fn main() {
    env_logger::init();
    let args = StoreSmokeArgs::parse();

    // SIGINT and SIGTERM both cancel
    let token = CancellationToken::new();
    let handler_token = token.clone();
    if let Err(e) = ctrlc::set_handler(move || handler_token.cancel()) {
        eprintln!("store-smoke failed to install signal handler: {e}");
        exit(1);
    }

    let session = match SmokeSession::start(&args, token) {
        Ok(session) => session,
        Err(e) => {
            eprintln!("store-smoke failed: {e}");
            exit(1);
        }
    };

    let passed = session.report.passed();
    println!(
        "smoke test {} against {}",
        if passed { "passed" } else { "FAILED" },
        args.endpoint
    );
    println!("store client running, press Ctrl+C to exit");

    let stats = session.wait();
    info!(
        "eviction stopped: {} cycles, {} keys removed, {} errors",
        stats.cycles, stats.removed, stats.errors
    );
    println!("connection closed");

    if !passed {
        exit(1);
    }
}
