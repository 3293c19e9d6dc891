//! # shelfscan Terminal Shell
//!
//! Thin presentation shell over the scan session engine.
//!
//! ## Usage
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  $ scan-cli                                                             │
//! │                                                                         │
//! │  Type a barcode and press Enter to resolve it, or:                      │
//! │    /focus    toggle auto-focus                                          │
//! │    /flash    toggle the flash                                           │
//! │    /camera   flip between back and front camera                         │
//! │    /manual   request manual entry                                       │
//! │    /status   print a session status snapshot                            │
//! │    /quit     end the session                                            │
//! │                                                                         │
//! │  Environment:                                                           │
//! │    SHELFSCAN_API_URL   override the product database base URL           │
//! │    RUST_LOG            tracing filter (default: info)                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! stdin plays the role of a single-shot/manual decode source: each line of
//! digits is one decode event. Camera capture and frame decoding live behind
//! the same `submit_decode` entry point and are out of scope here.

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use shelfscan_core::{barcode, ScanOutcome, ScannerConfig};
use shelfscan_session::{
    HttpResolver, MemoryPreferenceStore, PreferenceStore, ResolverConfig, ScanSession,
    ScanSessionHandle, SessionOptions, TomlPreferenceStore,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting shelfscan terminal shell");

    // Durable preferences, with in-memory fallback per the persistence
    // failure policy
    let prefs: Arc<dyn PreferenceStore> = match TomlPreferenceStore::open_default() {
        Ok(store) => Arc::new(store),
        Err(e) => {
            warn!(error = %e, "Preference store unavailable, falling back to in-memory defaults");
            Arc::new(MemoryPreferenceStore::new())
        }
    };

    // Resolver, with env override for the database URL
    let mut resolver_config = ResolverConfig::default();
    if let Ok(url) = std::env::var("SHELFSCAN_API_URL") {
        info!(url = %url, "Overriding product database URL from environment");
        resolver_config.base_url = url;
    }
    let resolver = Arc::new(HttpResolver::new(resolver_config)?);

    let session = ScanSession::spawn(prefs, resolver, SessionOptions::default());

    print_config(&session.config());

    // React to configuration changes
    let mut config_rx = session.watch_config();
    tokio::spawn(async move {
        while config_rx.changed().await.is_ok() {
            let config = *config_rx.borrow_and_update();
            print_config(&config);
        }
    });

    // React to outcome events
    let mut outcomes = session.subscribe_outcomes();
    tokio::spawn(async move {
        loop {
            match outcomes.recv().await {
                Ok(outcome) => print_outcome(&outcome),
                Err(tokio::sync::broadcast::error::RecvError::Lagged(missed)) => {
                    warn!(missed, "Outcome subscriber lagged");
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    run_input_loop(&session).await?;

    session.shutdown().await.ok();
    info!("Session ended");
    Ok(())
}

/// Reads stdin lines and forwards them into the session.
async fn run_input_loop(session: &ScanSessionHandle) -> Result<(), Box<dyn std::error::Error>> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("Scan a barcode (type digits + Enter), or /focus /flash /camera /manual /status /quit");

    while let Some(line) = lines.next_line().await? {
        let input = line.trim();

        match input {
            "/quit" => break,
            "/focus" => session.toggle_auto_focus().await?,
            "/flash" => session.toggle_flash().await?,
            "/camera" => session.flip_camera().await?,
            "/manual" => session.request_manual_entry().await?,
            "/status" => {
                let status = session.status().await?;
                println!("{}", serde_json::to_string_pretty(&status)?);
            }
            "" => {
                // An empty decode event: the session maps it to manual entry
                session.submit_decode(None).await?;
            }
            code => {
                // Manual entry is gated by validation; decoder hardware would
                // bypass this and submit directly
                match barcode::validate(code) {
                    Ok(()) => session.submit_decode(Some(code.to_string())).await?,
                    Err(e) => println!("✗ {e}"),
                }
            }
        }
    }

    Ok(())
}

fn print_config(config: &ScannerConfig) {
    println!(
        "[scanner] camera={} auto-focus={} flash={} ml-decoder={}",
        config.facing,
        on_off(config.auto_focus_enabled),
        on_off(config.flash_enabled),
        on_off(config.ml_decoder_enabled),
    );
}

fn print_outcome(outcome: &ScanOutcome) {
    match outcome {
        ScanOutcome::Found(product) => {
            println!("✓ {} [{}]", product.name, product.barcode);
            if let Some(brands) = &product.brands {
                println!("  brands:    {brands}");
            }
            if let Some(quantity) = &product.quantity {
                println!("  quantity:  {quantity}");
            }
            if let Some(grade) = &product.nutrition_grade {
                println!("  nutrition: {}", grade.to_uppercase());
            }
        }
        ScanOutcome::NotFound => println!("✗ No product found for this barcode"),
        ScanOutcome::ManualEntryRequested => {
            println!("… Enter the barcode manually (digits + Enter)");
        }
        ScanOutcome::ConnectionError => {
            println!("✗ Could not reach the product database, try again");
        }
    }
}

fn on_off(value: bool) -> &'static str {
    if value {
        "on"
    } else {
        "off"
    }
}
