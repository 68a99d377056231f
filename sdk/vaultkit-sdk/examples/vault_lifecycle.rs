// Example: Full vault lifecycle against a live cluster
//
// This example demonstrates how to:
// 1. Load configuration from the environment (VAULT_CLUSTER, RPC_URL, PROGRAM_ID)
// 2. Derive the vault and state PDAs for a wallet
// 3. Initialize, deposit, withdraw and close, reading the vault after each step
//
// Set KEYPAIR to a funded keypair file; a fresh keypair is used otherwise.

use solana_sdk::signature::{read_keypair_file, Keypair, Signer};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use vaultkit_sdk::{KeypairSigner, RpcConnection, VaultClient, VaultConfig, VaultSnapshot};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("vaultkit_sdk=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    // 1. Configuration
    let config = VaultConfig::from_env()?;
    println!("Cluster: {} ({})", config.cluster, config.rpc_url());
    println!("Program: {}", config.program_id);

    // 2. Wallet
    let keypair = match std::env::var("KEYPAIR") {
        Ok(path) => read_keypair_file(path)?,
        Err(_) => Keypair::new(),
    };
    let owner = keypair.pubkey();
    let connection = Arc::new(RpcConnection::new(&config));
    let signer = Arc::new(KeypairSigner::new(keypair, Arc::clone(&connection)));
    let client = VaultClient::new(config, connection, signer);

    println!("Owner: {}", owner);
    println!("  Vault PDA: {}", client.vault_pda(&owner)?.address);
    println!("  State PDA: {}", client.vault_state_pda(&owner)?.address);

    // 3. Lifecycle
    client.initialize().await?;
    print_vault(&client.read().await);

    client.deposit(0.5).await?;
    tokio::time::sleep(client.config().settle_delay()).await;
    print_vault(&client.read().await);

    client.withdraw(0.2).await?;
    tokio::time::sleep(client.config().settle_delay()).await;
    print_vault(&client.read().await);

    client.close().await?;
    tokio::time::sleep(client.config().settle_delay()).await;
    print_vault(&client.read().await);

    Ok(())
}

fn print_vault(snapshot: &VaultSnapshot) {
    match snapshot {
        VaultSnapshot::Disconnected => println!("No wallet connected"),
        VaultSnapshot::Loading => println!("Vault loading"),
        VaultSnapshot::Unavailable { reason } => println!("Vault unavailable: {}", reason),
        VaultSnapshot::Loaded(view) => {
            println!("Vault {}:", view.vault_address);
            println!("  Initialized: {}", view.vault_exists);
            println!("  Balance: {} SOL ({} lamports)", view.balance, view.lamports);
            if let Some(state) = &view.vault_state {
                println!("  Bumps: vault={} state={}", state.vault_bump, state.state_bump);
            }
        },
    }
}
