// src/config.rs
use crate::constants::{DEFAULT_CACHE_TTL, DEFAULT_REQUEST_DEADLINE};
use crate::types::{ApiKey, NotionId};
use clap::Parser;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

/// Command-line flags, each falling back to an environment variable
/// (a `.env` file in the working directory is loaded first).
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct CommandLineInput {
    /// Address to bind
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    #[arg(long, env = "PORT", default_value_t = 8000)]
    pub port: u16,

    /// Log level: error, warn, info, debug or trace
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// How long listings and pages are reused, in seconds
    #[arg(long, env = "CACHE_TTL_SECS", default_value_t = DEFAULT_CACHE_TTL.as_secs())]
    pub cache_ttl_secs: u64,

    /// Time budget for assembling one page, in seconds
    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value_t = DEFAULT_REQUEST_DEADLINE.as_secs())]
    pub request_timeout_secs: u64,

    /// Directory served under /static
    #[arg(long, env = "STATIC_DIR", default_value = "static")]
    pub static_dir: PathBuf,

    /// Notion integration token
    #[arg(long, env = "NOTION_TOKEN", hide_env_values = true)]
    pub notion_token: Option<String>,

    /// ID of the gallery database
    #[arg(long, env = "NOTION_DATABASE_ID")]
    pub notion_database_id: Option<String>,
}

/// Resolved service configuration.
///
/// Credentials are optional: without them the server still starts and
/// reports what is missing on `/health` and on every data endpoint.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub bind_address: String,
    pub api_key: Option<ApiKey>,
    pub database_id: Option<NotionId>,
    pub cache_ttl: Duration,
    pub request_deadline: Duration,
    pub static_dir: PathBuf,
}

impl ServiceConfig {
    /// Resolves the configuration. Unusable credentials are logged and
    /// treated as missing.
    pub fn resolve(cli: CommandLineInput) -> Self {
        let api_key = match cli.notion_token.as_deref().map(str::trim) {
            None | Some("") => {
                log::warn!("NOTION_TOKEN is not set; data endpoints will fail");
                None
            }
            Some(token) => ApiKey::new(token)
                .map_err(|e| log::error!("NOTION_TOKEN rejected: {}", e))
                .ok(),
        };

        let database_id = match cli.notion_database_id.as_deref().map(str::trim) {
            None | Some("") => {
                log::warn!("NOTION_DATABASE_ID is not set; listings will fail");
                None
            }
            Some(id) => NotionId::parse(id)
                .map_err(|e| log::error!("NOTION_DATABASE_ID rejected: {}", e))
                .ok(),
        };

        Self {
            bind_address: bind_address(&cli.host, cli.port),
            api_key,
            database_id,
            cache_ttl: Duration::from_secs(cli.cache_ttl_secs),
            request_deadline: Duration::from_secs(cli.request_timeout_secs.max(1)),
            static_dir: cli.static_dir,
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind_address: bind_address("0.0.0.0", 8000),
            api_key: None,
            database_id: None,
            cache_ttl: DEFAULT_CACHE_TTL,
            request_deadline: DEFAULT_REQUEST_DEADLINE,
            static_dir: PathBuf::from("static"),
        }
    }
}

fn bind_address(host: &str, port: u16) -> String {
    // IP literals go through SocketAddr so IPv6 gets its brackets
    match host.parse::<IpAddr>() {
        Ok(ip) => SocketAddr::new(ip, port).to_string(),
        Err(_) => format!("{}:{}", host, port),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(args: &[&str]) -> CommandLineInput {
        CommandLineInput::try_parse_from(std::iter::once("notion-image-bed").chain(args.iter().copied()))
            .unwrap()
    }

    #[test]
    fn test_credentials_resolve() {
        let config = ServiceConfig::resolve(parse(&[
            "--notion-token",
            "secret_abcdefghijklmnopqrstuvwxyz",
            "--notion-database-id",
            "550e8400-e29b-41d4-a716-446655440000",
            "--port",
            "9000",
            "--host",
            "127.0.0.1",
        ]));

        assert!(config.api_key.is_some());
        assert_eq!(
            config.database_id.map(|id| id.to_hyphenated()).as_deref(),
            Some("550e8400-e29b-41d4-a716-446655440000")
        );
        assert_eq!(config.bind_address, "127.0.0.1:9000");
    }

    #[test]
    fn test_bad_credentials_count_as_missing() {
        let config = ServiceConfig::resolve(parse(&[
            "--notion-token",
            "not-a-token",
            "--notion-database-id",
            "zzz",
        ]));
        assert!(config.api_key.is_none());
        assert!(config.database_id.is_none());
    }

    #[test]
    fn test_ipv6_host_is_bracketed() {
        assert_eq!(bind_address("::1", 8000), "[::1]:8000");
    }
}
