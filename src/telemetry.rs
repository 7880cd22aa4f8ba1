//! Tracing setup and log-safe identifiers.

use sha2::{Digest, Sha256};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub const ENV_LOG_FORMAT: &str = "CREDIBILITY_LOG_FORMAT";
const DEFAULT_FILTER: &str = "skill_credibility=info,warn";

/// Install a global subscriber: `RUST_LOG` filter (default
/// `skill_credibility=info,warn`), compact output or JSON when
/// `CREDIBILITY_LOG_FORMAT=json`. A subscriber installed earlier (e.g. by the
/// deployment runtime) is left in place.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let json = std::env::var(ENV_LOG_FORMAT)
        .ok()
        .is_some_and(|v| v.eq_ignore_ascii_case("json"));

    let result = if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().compact())
            .try_init()
    };

    if result.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}

/// Short stable id for text that must not be logged verbatim (resume excerpts).
pub fn anon_hash(text: &str) -> String {
    let digest = Sha256::digest(text.as_bytes());
    digest[..6].iter().map(|b| format!("{b:02x}")).collect()
}
