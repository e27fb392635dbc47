use anyhow::Context as _;
use std::net::{IpAddr, Ipv4Addr};

/// Startup settings, read from the environment.
#[derive(Debug)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    /// When absent, flows are only kept in memory.
    pub pg_url: Option<tokio_postgres::Config>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = match lookup("HOST") {
            Some(host) => host.parse().with_context(|| alloc::format!("invalid HOST {host:?}"))?,
            None => IpAddr::V4(Ipv4Addr::LOCALHOST),
        };
        let port = match lookup("PORT") {
            Some(port) => port.parse().with_context(|| alloc::format!("invalid PORT {port:?}"))?,
            None => 8080,
        };
        let pg_url = lookup("PG_URL")
            .map(|url| url.parse::<tokio_postgres::Config>())
            .transpose()
            .context("invalid PG_URL")?;
        Ok(Self { host, port, pg_url })
    }
}
