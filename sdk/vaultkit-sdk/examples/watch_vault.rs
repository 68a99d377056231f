// Example: Watching a vault
//
// Polls the vault owned by OWNER (base58) and prints every snapshot until
// interrupted. No signer is needed to watch.

use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use vaultkit_sdk::{
    parse_owner, DetachedSigner, RpcConnection, VaultClient, VaultConfig, VaultSession,
    VaultSnapshot,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("vaultkit_sdk=debug")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = VaultConfig::from_env()?;
    let owner = parse_owner(&std::env::var("OWNER")?)?;

    let connection = Arc::new(RpcConnection::new(&config));
    let client = VaultClient::new(config, connection, Arc::new(DetachedSigner));
    let watcher = client.watcher();

    let mut session = VaultSession::new();
    session.follow(&watcher, Some(owner));
    println!("Watching {} on {}", owner, watcher.cluster());

    loop {
        tokio::select! {
            snapshot = session.next() => match snapshot {
                Some(VaultSnapshot::Loaded(view)) => println!(
                    "{} SOL (initialized: {})",
                    view.balance, view.vault_exists
                ),
                Some(VaultSnapshot::Unavailable { reason }) => println!("unavailable: {}", reason),
                Some(VaultSnapshot::Disconnected) => println!("disconnected"),
                Some(VaultSnapshot::Loading) => println!("loading"),
                None => break,
            },
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    Ok(())
}
