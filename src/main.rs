// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Headless driver: connect the configured wallet, optionally bind a display
//! name and run one purchase.

use std::sync::Arc;

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use wallet_identity_checkout::blockchain::{ChainClient, LocalWalletSigner, MessageSigner};
use wallet_identity_checkout::config::{Config, LogFormat};
use wallet_identity_checkout::error::IdentityError;
use wallet_identity_checkout::purchase::{PurchaseMachine, PurchasePhase};
use wallet_identity_checkout::session::Session;
use wallet_identity_checkout::storage::{KvDatabase, StoragePaths};

#[tokio::main]
async fn main() {
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            std::process::exit(2);
        }
    };

    init_tracing(config.log_format);

    if let Err(e) = run(config).await {
        error!("Run failed: {e}");
        std::process::exit(1);
    }
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}

async fn run(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let paths = StoragePaths::new(&config.data_dir);
    let store = Arc::new(KvDatabase::open(&paths.identity_db())?);
    let session = Session::with_max_name_length(store, config.max_name_length);

    let Some(key_path) = &config.wallet_key_path else {
        warn!("WALLET_KEY_PATH is not set; no wallet to connect");
        return Ok(());
    };
    let wallet = LocalWalletSigner::from_pem(&std::fs::read(key_path)?)?;
    let address = wallet.address();

    let shutdown = session.shutdown_token();
    let interrupt = tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Interrupted; abandoning pending requests");
                shutdown.cancel();
            }
        }
    });

    match session.connect(address.clone(), Some(&wallet)).await {
        Ok(status) => info!(
            address = %address,
            display_name = ?status.display_name(),
            "Wallet connected"
        ),
        Err(IdentityError::Abandoned) => return Ok(()),
        Err(e) if e.is_rejection() => warn!(address = %address, "Login not attested"),
        Err(e) => return Err(e.into()),
    }

    if let Some(name) = &config.display_name {
        session.open_name_editor()?;
        match session.save_name(name, Some(&wallet)).await {
            Ok(binding) => info!(name = %binding.name, "Display name saved"),
            Err(e) => {
                warn!(error = %e, "Display name not saved");
                session.editor().close();
            }
        }
    }

    if let Some(price) = &config.purchase_price {
        let contract = config
            .purchase_contract
            .as_ref()
            .ok_or("PURCHASE_CONTRACT must be set to make a purchase")?;

        let client = ChainClient::connect(config.network.clone(), &config.rpc_url, wallet.wallet())?;
        let token = client.token(config.token_address.as_str())?;
        let checkout = client.checkout(contract.as_str())?;

        let mut machine = PurchaseMachine::new(&token, &checkout, &address, price.clone())
            .with_buyer_label(session.display_name());
        let state = machine.run(&session.connection_token()).await;

        match state.phase {
            PurchasePhase::Completed => info!(
                price = %state.price,
                tx = ?state.purchase_tx.as_deref().map(|h| client.network().tx_url(h)),
                "Purchase completed"
            ),
            PurchasePhase::Error => error!(
                error = state.error_message.as_deref().unwrap_or_default(),
                "Purchase failed"
            ),
            _ => info!("Purchase abandoned"),
        }
    }

    session.disconnect();
    interrupt.abort();
    Ok(())
}
