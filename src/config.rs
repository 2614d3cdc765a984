//! Command line and environment configuration for `hallon-web`

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::bail;
use clap::{Parser, ValueEnum};

/// Where the native engine gets its data.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Backend {
    /// Built-in demo catalog, no network access
    Memory,
    /// The Spotify Web API, using client credentials
    WebApi,
}

#[derive(Parser, Debug, Clone)]
#[command(name = "hallon-web", about = "Web front-end for the hallon media binding", version)]
pub struct Config {
    /// Address to listen on
    #[arg(short, long, default_value = "127.0.0.1:4567", env = "HALLON_BIND")]
    pub bind: SocketAddr,

    /// Data source for the native engine
    #[arg(long, value_enum, default_value_t = Backend::Memory, env = "HALLON_BACKEND")]
    pub backend: Backend,

    #[arg(long, env = "SPOTIFY_CLIENT_ID")]
    pub client_id: Option<String>,

    #[arg(long, env = "SPOTIFY_CLIENT_SECRET", hide_env_values = true)]
    pub client_secret: Option<String>,

    /// How long a search request waits for its results
    #[arg(long, default_value = "10000", env = "HALLON_SEARCH_TIMEOUT_MS")]
    pub search_timeout_ms: u64,

    /// Directory for the rolling log files
    #[arg(long, default_value = ".logs", env = "HALLON_LOG_DIR")]
    pub log_dir: PathBuf,
}

impl Config {
    pub fn search_timeout(&self) -> Duration {
        Duration::from_millis(self.search_timeout_ms)
    }

    /// Client id and secret for the Web API backend.
    pub fn credentials(&self) -> anyhow::Result<(&str, &str)> {
        match (self.client_id.as_deref(), self.client_secret.as_deref()) {
            (Some(id), Some(secret)) if !id.is_empty() && !secret.is_empty() => Ok((id, secret)),
            _ => bail!("the web-api backend needs --client-id and --client-secret"),
        }
    }

    /// Rejects combinations that cannot start.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.backend == Backend::WebApi {
            self.credentials()?;
        }
        if self.search_timeout_ms == 0 {
            bail!("--search-timeout-ms must be greater than zero");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::try_parse_from(["hallon-web"]).unwrap();
        assert_eq!(config.backend, Backend::Memory);
        assert_eq!(config.search_timeout(), Duration::from_secs(10));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_web_api_requires_credentials() {
        let config = Config::try_parse_from([
            "hallon-web",
            "--backend",
            "web-api",
            "--client-id",
            "abc",
        ])
        .unwrap();
        assert!(config.validate().is_err());

        let config = Config::try_parse_from([
            "hallon-web",
            "--backend",
            "web-api",
            "--client-id",
            "abc",
            "--client-secret",
            "def",
        ])
        .unwrap();
        assert_eq!(config.credentials().unwrap(), ("abc", "def"));
    }

    #[test]
    fn test_rejects_bad_bind_address() {
        assert!(Config::try_parse_from(["hallon-web", "--bind", "nowhere"]).is_err());
    }
}
