use anyhow::Result;
use std::env;

use spendbook::data;
use spendbook::expenses::ledger::{LedgerStore, DEFAULT_LEDGER_PATH};

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    if args.len() > 2 {
        eprintln!("Usage: cargo run -- [ledger_file]");
        std::process::exit(1);
    }

    let path = args.get(1).map(String::as_str).unwrap_or(DEFAULT_LEDGER_PATH);
    let ledger = LedgerStore::open(path);
    data::export_summary(&ledger.summarize(), std::io::stdout())?;

    Ok(())
}
