use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::info;

use model_store::logging::init_tracing;
use model_store::{Model, Store, StoreConfig};

/// Drives a counter model through a composed async action and prints what
/// a subscribed view would observe.
#[derive(Debug, Parser)]
#[command(name = "model-store-demo", version)]
struct Cli {
    /// Config file (default: the user config path, if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of increments to run
    #[arg(long, default_value_t = 3)]
    clicks: u32,

    /// Make the K-th increment (1-based) fail
    #[arg(long)]
    fail_at: Option<u32>,

    /// Simulated latency of each increment, in milliseconds
    #[arg(long, default_value_t = 20)]
    latency_ms: u64,
}

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
struct Counter {
    count: u32,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => StoreConfig::load_from(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => StoreConfig::load()?,
    };
    init_tracing(&config.logging);

    let store = Store::new(config);
    let counter = Model::persisted(&store, "counter", Counter::default())?;

    let target = counter.clone();
    let latency = Duration::from_millis(cli.latency_ms);
    let fail_at = cli.fail_at;
    let increment = counter
        .compose(move |click: u32| {
            let target = target.clone();
            async move {
                tokio::time::sleep(latency).await;
                if fail_at == Some(click) {
                    bail!("increment #{} refused", click);
                }
                target.change_data("increment", |d| d.count += 1);
                Ok(target.data().count)
            }
        })
        .named("increment");

    let mut view = counter.use_data_with(|d| d.count, false);
    println!("count = {}", *view);

    for click in 1..=cli.clicks {
        match increment.call(click).await {
            Ok(count) => info!(click, count, "increment settled"),
            Err(e) => println!("click {}: {}", click, e),
        }
        if view.refresh() {
            println!("count = {}", *view);
        }
    }

    println!("{:?}", increment.meta());
    store.flush()?;
    Ok(())
}
