//! Aurum gateway daemon
//!
//! Starts the HTTP/WebSocket gateway in front of an in-process engine.

use aurum_gateway::engine::MemoryEngine;
use aurum_gateway::gateway::{create_router, GatewayState, NotificationHub};
use aurum_gateway::wallet::{vault, Wallet};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Notify;

#[derive(Parser)]
#[command(name = "aurumd")]
#[command(version = "0.1.0")]
#[command(about = "Public HTTP/WebSocket gateway for an aurum node", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the gateway server
    Serve {
        /// Address to bind
        #[arg(long, default_value = "0.0.0.0")]
        host: String,

        /// Port to listen on
        #[arg(short, long, default_value = "7001")]
        port: u16,
    },

    /// Wallet operations
    Wallet {
        #[command(subcommand)]
        action: WalletCommands,
    },
}

#[derive(Subcommand)]
enum WalletCommands {
    /// Generate a wallet and write it sealed to a file
    New {
        /// Wallet name
        #[arg(short, long)]
        name: String,

        /// Password to seal the wallet with
        #[arg(short, long)]
        password: String,

        /// Output file (defaults to <name>.wallet)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Serve { host, port } => serve(&host, port),
        Commands::Wallet { action } => match action {
            WalletCommands::New {
                name,
                password,
                output,
            } => wallet_new(&name, &password, output),
        },
    }
}

fn wallet_new(
    name: &str,
    password: &str,
    output: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let wallet = Wallet::generate(name);
    let blob = vault::seal(password, &wallet)?;
    let path = output.unwrap_or_else(|| PathBuf::from(format!("{}.wallet", name)));
    std::fs::write(&path, blob)?;

    println!("Wallet:  {}", name);
    println!("Address: {}", wallet.address());
    println!("Sealed:  {}", path.display());
    Ok(())
}

fn serve(host: &str, port: u16) -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;

    rt.block_on(async {
        let hub = Arc::new(NotificationHub::new());
        let engine = Arc::new(MemoryEngine::with_bus(hub.clone()));
        let shutdown = Arc::new(Notify::new());

        let state = GatewayState {
            chain: engine.clone(),
            accounts: engine.clone(),
            miner: engine.clone(),
            identity: engine.clone(),
            hub,
            shutdown: shutdown.clone(),
        };
        let app = create_router(state);

        let addr = format!("{}:{}", host, port);
        let listener = tokio::net::TcpListener::bind(&addr).await?;
        log::info!("Gateway listening on http://{}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {
                        log::info!("Interrupt received, shutting down");
                    }
                    _ = shutdown.notified() => {}
                }
            })
            .await?;

        engine.stop();
        log::info!("Closed gateway");
        Ok::<(), Box<dyn std::error::Error>>(())
    })?;

    Ok(())
}
