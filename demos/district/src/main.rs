use configure::{Configure, ConfigureError};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Copies one district's collection.
///
/// Pass flags (`-district_id=abc123`) or a single JSON object
/// (`'{"district_id":"abc123"}'`).
#[derive(Debug, Default, Serialize, Configure)]
struct Config {
    /// District to copy.
    #[config("district_id,required")]
    district_id: String,

    #[config("collection")]
    collection: String,

    /// Log what would be copied without writing anything.
    #[config("dry")]
    dry: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut config = Config {
        collection: "schools".into(),
        ..Default::default()
    };

    match config.configure() {
        Ok(()) => {
            let rendered = serde_json::to_string(&config).unwrap_or_else(|_| format!("{config:?}"));
            info!(config = %rendered, "config loaded");
        }
        Err(ConfigureError::HelpPrinted) => {
            // help text already written to stderr
            std::process::exit(0);
        }
        Err(err) => {
            eprintln!("Config error: {err}");
            std::process::exit(1);
        }
    }
}
