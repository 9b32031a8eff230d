//! FlatKV CLI
//!
//! Command-line interface over a local FlatKV store file.

use clap::{Parser, Subcommand};
use flatkv::{Config, Store};
use serde_json::Value;
use tracing_subscriber::{fmt, EnvFilter};

/// FlatKV CLI
#[derive(Parser, Debug)]
#[command(name = "flatkv")]
#[command(about = "CLI for the FlatKV single-file key-value store")]
#[command(version)]
struct Args {
    /// Store file
    #[arg(short, long, default_value = "./flatkv.db")]
    path: String,

    /// Skip flushing each write to disk
    #[arg(long)]
    no_fsync: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Get a value by key
    Get {
        /// The key to get
        key: String,
    },

    /// Set a key-value pair
    Put {
        /// The key to set
        key: String,

        /// The value (JSON; anything else is stored as a string)
        value: String,
    },

    /// Delete a key
    Del {
        /// The key to delete
        key: String,
    },

    /// List all keys
    Keys,

    /// Show allocator and recovery statistics
    Stats,
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    fmt().with_env_filter(filter).with_target(true).init();

    let args = Args::parse();

    if let Err(e) = run(args) {
        tracing::error!("{}", e);
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> flatkv::Result<()> {
    let config = Config::builder()
        .path(&args.path)
        .fsync_on_write(!args.no_fsync)
        .build();

    let store = Store::open(config)?;

    match args.command {
        Commands::Get { key } => match store.get(&key)? {
            Some(value) => println!("{}", value),
            None => println!("(nil)"),
        },
        Commands::Put { key, value } => {
            let value = serde_json::from_str::<Value>(&value).unwrap_or(Value::String(value));
            store.put(&key, value)?.wait()?;
            println!("OK");
        }
        Commands::Del { key } => {
            store.delete(&key)?.wait()?;
            println!("OK");
        }
        Commands::Keys => {
            let mut keys = store.keys()?;
            keys.sort();
            for key in keys {
                println!("{}", key);
            }
        }
        Commands::Stats => {
            let stats = store.stats();
            let recovery = store.recovery();
            println!("keys:              {}", stats.keys);
            println!("head:              {}", stats.head);
            println!("free slots:        {}", stats.free_slots);
            println!("free bytes:        {}", stats.free_bytes);
            println!("tick:              {}", stats.tick);
            println!("records recovered: {}", recovery.records_recovered);
            println!("records corrupted: {}", recovery.records_corrupted);
            println!("tombstones:        {}", recovery.tombstones);
            println!("leaked bytes:      {}", recovery.leaked_bytes);
        }
    }

    store.close()
}
