//! shopdb-seed
//!
//! Opens the product store, inserts the sample catalog concurrently, lists
//! it, applies an optional update and deletes one product.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use shopdb::{
    sample_catalog, Engine, ProductPatch, ProductStore, RecordId, ShopConfig, UpdateOutcome,
};
use tokio::task::JoinSet;
use tracing_subscriber::{fmt, EnvFilter};

/// Seed and exercise a shopdb product store
#[derive(Parser, Debug)]
#[command(name = "shopdb-seed")]
#[command(version)]
struct Args {
    /// Data directory
    #[arg(short, long, default_value = "./shopdb_data")]
    data_dir: PathBuf,

    /// Database name
    #[arg(long, default_value = "shopDB")]
    db_name: String,

    /// Schema version to open at
    #[arg(long, default_value_t = 1)]
    version: u32,

    /// Use an in-memory engine instead of a file
    #[arg(long)]
    memory: bool,

    /// Product to update with --price / --stock
    #[arg(long)]
    update: Option<u64>,

    /// New price for --update
    #[arg(long, requires = "update")]
    price: Option<f64>,

    /// New stock for --update
    #[arg(long, requires = "update")]
    stock: Option<u32>,

    /// Product to delete
    #[arg(long, default_value_t = 2)]
    delete: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,shopdb=debug"));
    fmt().with_env_filter(filter).with_target(true).init();

    let args = Args::parse();
    let config = ShopConfig::new()
        .data_dir(&args.data_dir)
        .db_name(&args.db_name)
        .version(args.version);

    if args.memory {
        let store = ProductStore::in_memory(config)
            .await
            .context("failed to open in-memory store")?;
        run(store, &args).await
    } else {
        tracing::info!(path = %config.db_path().display(), "opening database");
        let store = ProductStore::open(config)
            .await
            .context("failed to open database")?;
        run(store, &args).await
    }
}

async fn run<E: Engine + 'static>(store: ProductStore<E>, args: &Args) -> anyhow::Result<()> {
    // Issue every insert before awaiting any of them.
    let mut inserts = JoinSet::new();
    for product in sample_catalog() {
        let store = store.clone();
        inserts.spawn(async move { store.insert(&product).await });
    }
    while let Some(joined) = inserts.join_next().await {
        let id = joined.context("insert task panicked")??;
        tracing::debug!(%id, "seeded");
    }

    log_products(&store, "all products").await?;

    if let Some(id) = args.update {
        let mut patch = ProductPatch::new();
        if let Some(price) = args.price {
            patch = patch.price(price);
        }
        if let Some(stock) = args.stock {
            patch = patch.stock(stock);
        }
        match store.update(RecordId::new(id), &patch).await? {
            UpdateOutcome::Updated(product) => tracing::info!(?product, "updated"),
            UpdateOutcome::NotFound => tracing::warn!(id, "nothing to update"),
        }
    }

    store.delete(RecordId::new(args.delete)).await?;
    log_products(&store, "after delete").await
}

async fn log_products<E: Engine>(store: &ProductStore<E>, label: &str) -> anyhow::Result<()> {
    let products = store.fetch_all().await?;
    tracing::info!(count = products.len(), "{}", label);
    for product in &products {
        tracing::info!(
            id = %product.id,
            name = %product.name,
            price = product.price,
            stock = product.stock,
            "product"
        );
    }
    Ok(())
}
