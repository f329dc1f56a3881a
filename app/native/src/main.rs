//! Halo - a desktop overlay with mode-aware window coordination.
//!
//! Usage: `halo [config.json]`. Without an argument the built-in defaults
//! are used; logging is controlled through `RUST_LOG`.

use halo_lib::config::OverlayConfig;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => match OverlayConfig::load(&path) {
            Ok(config) => config,
            Err(err) => {
                eprintln!("halo: {err}");
                std::process::exit(1);
            }
        },
        None => OverlayConfig::default(),
    };

    if let Err(err) = halo_lib::run(config) {
        eprintln!("halo: {err}");
        std::process::exit(1);
    }
}
