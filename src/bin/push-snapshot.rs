//! Copy local snapshot collections up to the remote store.
//! Run after a remote outage so writes that fell back to the local file are
//! not shadowed by older remote data.
//!
//! Usage: push-snapshot [--collection NAME] [--dry-run]
//!   --collection NAME : Push only this collection (all if not specified)
//!   --dry-run         : Show what would be pushed without writing

use clap::Parser;

use mess_api::{
    config::StorageConfig,
    db::{local::LocalSnapshot, remote::RemoteStore, Collection},
};

#[derive(Parser)]
#[command(name = "push-snapshot", about = "Replicate the local snapshot to the remote document store")]
struct Args {
    /// Collection to push (optional, all if not specified)
    #[arg(long)]
    collection: Option<Collection>,

    /// Only report record counts
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let args = Args::parse();
    let storage = StorageConfig::from_env()?;

    let url = storage
        .remote_url
        .as_deref()
        .ok_or("REMOTE_DB_URL environment variable not set")?;
    let remote = RemoteStore::new(url, storage.remote_auth.clone(), storage.remote_timeout)?;
    remote.probe().await?;

    let local = LocalSnapshot::new(&storage.snapshot_path);
    let collections = match args.collection {
        Some(c) => vec![c],
        None => Collection::ALL.to_vec(),
    };

    tracing::info!("Pushing {} collection(s) from {:?}", collections.len(), local.path());

    let mut failures = 0usize;
    for collection in collections {
        let records = local.read(collection).await;
        if args.dry_run {
            tracing::info!("{collection}: {} record(s) would be pushed", records.len());
            continue;
        }
        match remote.replace(collection, &records).await {
            Ok(()) => tracing::info!("{collection}: pushed {} record(s)", records.len()),
            Err(e) => {
                failures += 1;
                tracing::error!("Error pushing {collection}: {e}");
            }
        }
    }

    if failures > 0 {
        return Err(format!("{failures} collection(s) failed to push").into());
    }
    tracing::info!("Snapshot push completed");
    Ok(())
}
