//! Diagnostic logging setup.
//!
//! Operator-facing progress stays on stdout via `println!`; everything else goes
//! through `tracing` to stderr so it can be filtered with `RUST_LOG`.

use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset, e.g. `warn` or `guide_flow=info`
    pub level: String,

    /// Include the module path of each event
    pub with_target: bool,

    /// Colourise output
    pub ansi: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: String::from("warn"),
            with_target: false,
            ansi: true,
        }
    }
}

impl LoggingConfig {
    /// Filter directive for this run; `verbose` lifts this crate to `debug`.
    pub fn directive(&self, verbose: bool) -> String {
        if verbose {
            format!("{},guide_flow=debug", self.level)
        } else {
            self.level.clone()
        }
    }
}

/// Installs the global subscriber. A second call is a no-op.
pub fn init(config: &LoggingConfig, verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.directive(verbose)))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(config.with_target)
        .with_ansi(config.ansi)
        .with_writer(std::io::stderr)
        .try_init();

    if let Err(e) = installed {
        tracing::debug!("tracing subscriber already installed: {}", e);
    }
}
