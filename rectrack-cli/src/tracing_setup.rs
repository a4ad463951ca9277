//! Log output for the rectrack CLI
//!
//! Without `RUST_LOG`, only the tracker's own crates and the request spans from
//! `tower_http` are shown; sqlx statement logging stays at `warn` unless
//! `--debug` is given.
//!
//!   rectrack --debug serve ...               # tracker crates at debug
//!   RUST_LOG=rectrack_server::db=trace ...   # overrides the defaults entirely

use anyhow::{anyhow, Result};
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "rectrack=info,rectrack_server=info,tower_http=info,sqlx=warn";
const DEBUG_FILTER: &str = "rectrack=debug,rectrack_server=debug,tower_http=debug,sqlx=info";

#[derive(Debug, Clone, Default)]
pub struct TracingConfig {
    pub debug: bool,
}

impl TracingConfig {
    fn default_filter(&self) -> &'static str {
        if self.debug {
            DEBUG_FILTER
        } else {
            DEFAULT_FILTER
        }
    }
}

/// Install the global subscriber. `RUST_LOG` wins over `--debug`.
pub fn init_tracing(config: &TracingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.default_filter()))
        .map_err(|err| anyhow!(err))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(config.debug)
        .compact()
        .try_init()
        .map_err(|err| anyhow!(err))
}
