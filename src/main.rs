//! multinotify - command-line front end
//!
//! Loads the configured backends and sends one message to a single provider
//! or broadcasts it to all of them.

use anyhow::{bail, Result};
use clap::Parser;
use multinotify::{cli::Cli, config::Config, services::build_manager, CancellationToken, Manager};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration by layering sources: defaults, file, environment, and CLI args.
    let config = Config::load(&cli)?;

    // Initialize logging. RUST_LOG wins over the configured level.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if config.has_no_backends() {
        warn!("No notification backends are configured.");
    }
    let manager = build_manager(&config)?;

    if cli.list {
        for name in manager.list() {
            println!("{}", name);
        }
        return Ok(());
    }

    // Cancel in-flight deliveries on Ctrl-C.
    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Interrupt received, cancelling notifications.");
                cancel.cancel();
            }
        });
    }

    let failures = dispatch(&cli, &manager, &cancel).await;
    if failures > 0 {
        bail!("{} notification(s) failed", failures);
    }
    Ok(())
}

/// Runs the dispatch selected on the command line and returns the number of
/// failed deliveries.
async fn dispatch(cli: &Cli, manager: &Manager, cancel: &CancellationToken) -> usize {
    let message = cli.to_message();

    if let Some(provider) = &cli.provider {
        let outcome = if cli.wants_options() {
            manager.send_with_options(cancel, provider, &message).await
        } else {
            manager.send(cancel, provider, &message.text).await
        };
        return match outcome {
            Ok(()) => {
                println!("{}: ok", provider);
                0
            }
            Err(e) => {
                error!(error = %e, "Send failed");
                println!("{}: {}", provider, e);
                1
            }
        };
    }

    if cli.stream {
        let results = if cli.wants_options() {
            manager.broadcast_async_with_options(cancel, &message)
        } else {
            manager.broadcast_async(cancel, &message.text)
        };
        let mut failures = 0;
        while let Ok(result) = results.recv().await {
            match &result.error {
                None => println!("{}: ok", result.provider),
                Some(e) => {
                    failures += 1;
                    println!("{}: {}", result.provider, e);
                }
            }
        }
        return failures;
    }

    let errors = if cli.wants_options() {
        manager.broadcast_with_options(cancel, &message).await
    } else {
        manager.broadcast(cancel, &message.text).await
    };
    for e in &errors {
        println!("{}", e);
    }
    info!(
        providers = manager.len(),
        failed = errors.len(),
        "Broadcast complete."
    );
    errors.len()
}
