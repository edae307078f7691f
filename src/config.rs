use std::net::SocketAddr;

use anyhow::Context;

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Runtime settings, read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// `None` runs the server on the in-memory store.
    pub database_url: Option<String>,
    pub bind_addr: SocketAddr,
    pub max_connections: u32,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").filter(|url| !url.is_empty());

        let bind_addr = lookup("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .context("BIND_ADDR is not a valid socket address")?;

        let max_connections = match lookup("DATABASE_MAX_CONNECTIONS") {
            Some(value) => value
                .parse::<u32>()
                .with_context(|| format!("DATABASE_MAX_CONNECTIONS `{}` is not a number", value))?,
            None => DEFAULT_MAX_CONNECTIONS,
        };

        Ok(Self {
            database_url,
            bind_addr,
            max_connections,
        })
    }
}
