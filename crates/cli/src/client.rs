//! Session handling for CLI commands
//!
//! Every subcommand that talks to the endpoint opens one session, does
//! its work, and closes the session on success and failure alike.

use anyhow::{Context, Result};
use vperf_lib::models::ManagedEntityType;
use vperf_lib::{HttpVimApi, Session, SessionConfig};

/// Open an authenticated session against the configured endpoint.
pub async fn connect(config: &SessionConfig) -> Result<Session> {
    HttpVimApi::login(config)
        .await
        .with_context(|| format!("login to {} failed", config.url))
}

/// Parse entity type arguments, falling back to the default collection
/// set when none were given.
pub fn parse_entity_types(args: &[String]) -> Result<Vec<ManagedEntityType>> {
    if args.is_empty() {
        return Ok(vec![
            ManagedEntityType::HostSystem,
            ManagedEntityType::VirtualMachine,
        ]);
    }
    args.iter()
        .map(|raw| {
            raw.parse::<ManagedEntityType>()
                .with_context(|| format!("unknown entity type '{}'", raw))
        })
        .collect()
}
